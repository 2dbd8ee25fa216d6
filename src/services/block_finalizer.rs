//! 题目块定稿服务 - 业务能力层
//!
//! 把分段得到的原始题目块变成最终的题目记录：
//!
//! 1. 以换行拼接所有行
//! 2. 删除混入正文的页脚残留（课程代码、规则编号、准考证号等）
//! 3. 提取评分标记
//! 4. 拆出行首题号，题号单独保存，不留在正文里
//!
//! 定稿后文本只剩 "OR" 的块直接丢弃。

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::models::{QuestionBlock, QuestionRecord};
use crate::services::metadata_tagger::MetadataTagger;
use crate::services::segmenter::{is_or_marker, QUESTION_START_PATTERN};

/// 正文中的页脚残留，按顺序逐个删除
const FOOTER_PATTERNS: &[&str] = &[
    r"Course\s+Code\s*:?.*",
    r"Regulation\s*(?::|R\d+).*",
    r"H\.T\.No\..*",
    r"\b\d+[A-Z]{2}\d+.*",
    r"\bR\d+$",
];

/// 题目块定稿服务
pub struct BlockFinalizer {
    tagger: MetadataTagger,
    footers: Vec<Regex>,
    question_start: Regex,
}

impl BlockFinalizer {
    pub fn new() -> Result<Self, regex::Error> {
        let footers = FOOTER_PATTERNS
            .iter()
            .map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            tagger: MetadataTagger::new()?,
            footers,
            question_start: Regex::new(QUESTION_START_PATTERN)?,
        })
    }

    /// 删除页脚残留
    pub fn strip_footers(&self, text: &str) -> String {
        self.footers.iter().fold(text.trim().to_string(), |acc, footer| {
            footer.replace_all(&acc, "").trim().to_string()
        })
    }

    /// 定稿一个题目块，空块或只剩 "OR" 的块返回 `None`
    pub fn finalize(&self, block: &QuestionBlock) -> Option<QuestionRecord> {
        if block.lines.is_empty() {
            return None;
        }

        let cleaned = self.strip_footers(&block.joined_text());
        let tagged = self.tagger.tag(&cleaned);
        let (serial_number, body) = self.split_serial(&tagged.text);

        if body.is_empty() && serial_number.is_none() {
            debug!("单元 {} 的题目块定稿后为空，已丢弃", block.unit);
            return None;
        }
        if is_or_marker(&body) {
            debug!("单元 {} 的题目块只剩 OR，已丢弃", block.unit);
            return None;
        }

        Some(QuestionRecord {
            unit: block.unit,
            serial_number,
            question_text: body,
            grading_tag: tagged.tag(),
        })
    }

    /// 拆出行首题号，返回（题号, 剩余正文）
    fn split_serial(&self, text: &str) -> (Option<u32>, String) {
        match self.question_start.captures(text) {
            Some(caps) => {
                let serial = caps.get(1).and_then(|m| m.as_str().parse().ok());
                let rest_start = caps.get(0).map(|m| m.end()).unwrap_or(0);
                (serial, text[rest_start..].trim().to_string())
            }
            None => (None, text.trim().to_string()),
        }
    }
}
