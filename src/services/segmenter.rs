//! 分段服务 - 业务能力层
//!
//! 按行扫描源文档文本，识别单元标题和题目起始行，把连续的行分组为题目块。
//!
//! 状态（当前单元、正在收集的块）只存在于一次 `segment` 调用之内，
//! 不同文档的分段互不影响。

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::models::{QuestionBlock, RawLine, Unit};
use crate::services::noise_filter::NoiseFilter;
use crate::utils::logging::truncate_text;

/// 题目起始：1-2 位数字后跟 `.`、`)` 或空白
pub(crate) const QUESTION_START_PATTERN: &str = r"^(\d{1,2})([.)\s])\s*";

/// 单元标题：行内任意位置的 `UNIT`，后跟分隔符和罗马数字/英文单词/阿拉伯数字
///
/// 例如 `UNIT-II`、`PART-B UNIT 3`。编号必须独立成词，`Unit conversion` 不算标题。
const UNIT_HEADER_PATTERN: &str =
    r"\bUNIT\b[\s:\-–—]*([IVXLC]+|\d+|ONE|TWO|THREE|FOUR|FIVE)\b";

/// 单行的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// 页眉页脚等样板文字
    Noise,
    /// 单元标题；`None` 表示编号无法识别
    UnitHeader(Option<Unit>),
    /// 新题目的第一行
    QuestionStart,
    /// 单独一行的 "OR"
    OrMarker,
    /// 上一道题的续行
    Continuation,
}

/// 判断文本是否为"二选一"记号
pub(crate) fn is_or_marker(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.eq_ignore_ascii_case("OR") || trimmed.eq_ignore_ascii_case("(OR)")
}

/// 分段服务
pub struct BlockSegmenter {
    noise_filter: NoiseFilter,
    unit_header: Regex,
    question_start: Regex,
}

impl BlockSegmenter {
    /// 创建新的分段服务
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            noise_filter: NoiseFilter::new()?,
            unit_header: RegexBuilder::new(UNIT_HEADER_PATTERN)
                .case_insensitive(true)
                .build()?,
            question_start: Regex::new(QUESTION_START_PATTERN)?,
        })
    }

    /// 对一行（已去除首尾空白、非空）分类，按优先级依次判断
    ///
    /// 以题号开头的行总是新题目，正文里出现的 `unit 2` 不会切换单元。
    pub fn classify(&self, line: &str) -> LineKind {
        if self.noise_filter.is_noise(line) {
            return LineKind::Noise;
        }
        if self.question_start.is_match(line) {
            return LineKind::QuestionStart;
        }
        if let Some(caps) = self.unit_header.captures(line) {
            let unit = caps.get(1).and_then(|m| Unit::from_header_token(m.as_str()));
            return LineKind::UnitHeader(unit);
        }
        if is_or_marker(line) {
            return LineKind::OrMarker;
        }
        LineKind::Continuation
    }

    /// 把整篇文本切分为题目块
    pub fn segment(&self, raw_text: &str) -> Vec<QuestionBlock> {
        let lines = raw_text
            .lines()
            .enumerate()
            .map(|(ordinal, text)| RawLine::new(ordinal, text.trim()))
            .filter(|line| !line.text.is_empty());
        self.segment_lines(lines)
    }

    /// 对已编号的行进行分段
    pub fn segment_lines(&self, lines: impl IntoIterator<Item = RawLine>) -> Vec<QuestionBlock> {
        let mut state = SegmentState::default();

        for line in lines {
            match self.classify(&line.text) {
                LineKind::Noise => {}
                LineKind::UnitHeader(unit) => {
                    state.close_block();
                    match unit {
                        Some(unit) => state.current_unit = unit,
                        None => debug!(
                            "第 {} 行单元编号无法识别，保持单元 {}: {}",
                            line.ordinal + 1,
                            state.current_unit,
                            truncate_text(&line.text, 40)
                        ),
                    }
                }
                LineKind::QuestionStart => {
                    state.close_block();
                    state.open_block = Some(vec![line]);
                }
                LineKind::OrMarker => {}
                LineKind::Continuation => match state.open_block.as_mut() {
                    Some(block) => block.push(line),
                    None => debug!(
                        "第 {} 行不属于任何题目，已丢弃: {}",
                        line.ordinal + 1,
                        truncate_text(&line.text, 40)
                    ),
                },
            }
        }

        state.close_block();
        state.finished
    }
}

/// 一次分段过程的累加器
#[derive(Default)]
struct SegmentState {
    current_unit: Unit,
    open_block: Option<Vec<RawLine>>,
    finished: Vec<QuestionBlock>,
}

impl SegmentState {
    /// 结束当前块，归入当前单元；空块不产生任何输出
    fn close_block(&mut self) {
        if let Some(lines) = self.open_block.take() {
            if !lines.is_empty() {
                self.finished.push(QuestionBlock {
                    unit: self.current_unit,
                    lines,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> BlockSegmenter {
        BlockSegmenter::new().unwrap()
    }

    fn texts(blocks: &[QuestionBlock]) -> Vec<(Unit, String)> {
        blocks.iter().map(|b| (b.unit, b.joined_text())).collect()
    }

    #[test]
    fn test_unit_aliases_assign_identical_units() {
        let s = segmenter();
        for header in ["UNIT-II", "UNIT TWO", "UNIT 2", "Unit: ii", "UNIT – 2"] {
            let text = format!("{}\n1. Define routing.", header);
            let blocks = s.segment(&text);
            assert_eq!(blocks.len(), 1, "标题: {}", header);
            assert_eq!(blocks[0].unit, Unit::Two, "标题: {}", header);
        }
    }

    #[test]
    fn test_defaults_to_unit_one_before_any_header() {
        let blocks = segmenter().segment("1. What is a protocol?\n2) What is a port?");
        assert_eq!(
            texts(&blocks),
            vec![
                (Unit::One, "1. What is a protocol?".to_string()),
                (Unit::One, "2) What is a port?".to_string()),
            ]
        );
    }

    #[test]
    fn test_continuation_lines_join_open_block() {
        let text = "UNIT-I\n1. Explain the following:\na) Hub\nb) Switch\n2. Define a bridge.";
        let blocks = segmenter().segment(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].joined_text(), "1. Explain the following:\na) Hub\nb) Switch");
        assert_eq!(blocks[0].lines[1].ordinal, 2);
    }

    #[test]
    fn test_orphan_continuation_is_dropped() {
        let text = "Some preface text\nUNIT III\nIntroduction to transport layer\n1. Explain UDP.";
        let blocks = segmenter().segment(text);
        assert_eq!(texts(&blocks), vec![(Unit::Three, "1. Explain UDP.".to_string())]);
    }

    #[test]
    fn test_or_line_is_discarded() {
        let text = "1. Explain TCP.\nOR\n2. Explain UDP.\n(or)\n3. Explain SCTP.";
        let blocks = segmenter().segment(text);
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| !b.joined_text().contains("OR")));
    }

    #[test]
    fn test_unrecognized_unit_keeps_current_unit() {
        let text = "UNIT-IV\n1. Q four\nUNIT-VII\n2. Still four\nUNIT-V\n3. Q five";
        let blocks = segmenter().segment(text);
        assert_eq!(
            blocks.iter().map(|b| b.unit).collect::<Vec<_>>(),
            vec![Unit::Four, Unit::Four, Unit::Five]
        );
    }

    #[test]
    fn test_header_finalizes_block_under_previous_unit() {
        let text = "UNIT-I\n1. Last of unit one\ncontinued\nUNIT-II\n1. First of unit two";
        let blocks = segmenter().segment(text);
        assert_eq!(
            texts(&blocks),
            vec![
                (Unit::One, "1. Last of unit one\ncontinued".to_string()),
                (Unit::Two, "1. First of unit two".to_string()),
            ]
        );
    }

    #[test]
    fn test_prefixed_header_starts_new_unit() {
        let text = "UNIT-I\n1. Define a frame.\nPART-B UNIT-II\n2. Define a packet.";
        let blocks = segmenter().segment(text);
        assert_eq!(
            texts(&blocks),
            vec![
                (Unit::One, "1. Define a frame.".to_string()),
                (Unit::Two, "2. Define a packet.".to_string()),
            ]
        );
        assert_eq!(
            segmenter().classify("Part A - Unit: III"),
            LineKind::UnitHeader(Some(Unit::Three))
        );
    }

    #[test]
    fn test_units_may_be_restated_out_of_order() {
        let text = "UNIT-II\n1. two\nUNIT-I\n2. one\nUNIT-II\n3. two again";
        let units: Vec<Unit> = segmenter().segment(text).iter().map(|b| b.unit).collect();
        assert_eq!(units, vec![Unit::Two, Unit::One, Unit::Two]);
    }

    #[test]
    fn test_noise_never_enters_a_block() {
        let text = "1. Explain ARP.\nPage 3 of 10\nCourse Code: 20MC9114\nwith an example.";
        let blocks = segmenter().segment(text);
        assert_eq!(blocks[0].joined_text(), "1. Explain ARP.\nwith an example.");
    }

    #[test]
    fn test_unit_word_inside_prose_is_not_a_header() {
        let s = segmenter();
        assert_eq!(s.classify("Unit conversion basics"), LineKind::Continuation);
        assert_eq!(s.classify("Units of measurement"), LineKind::Continuation);
        assert_eq!(s.classify("explain each unit in detail"), LineKind::Continuation);
        assert_eq!(s.classify("4. Explain unit 2 topics"), LineKind::QuestionStart);
        assert_eq!(s.classify("UNIT-IX"), LineKind::UnitHeader(None));
    }

    #[test]
    fn test_question_start_variants() {
        let s = segmenter();
        assert_eq!(s.classify("1. Define"), LineKind::QuestionStart);
        assert_eq!(s.classify("12) Define"), LineKind::QuestionStart);
        assert_eq!(s.classify("7 Define"), LineKind::QuestionStart);
        assert_eq!(s.classify("2023 batch"), LineKind::Continuation);
        assert_eq!(s.classify("a) Define"), LineKind::Continuation);
    }
}
