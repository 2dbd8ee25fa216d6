//! 组卷服务 - 业务能力层
//!
//! 只负责"从题库里为一套试卷选题"，不关心渲染和输出。
//!
//! 每个单元选出一对"二选一"的题目：
//! - 题目数 ≥ 2：无放回随机抽取两道不同的题
//! - 题目数 = 1：同一道题同时作为主题和备选题
//! - 题目数 = 0：使用固定的占位题
//!
//! 只取题库中的前 5 个单元（按题库顺序），不足 5 个时照实渲染，不补齐。

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use tracing::debug;

use crate::models::paper::{MARKS_PER_QUESTION, MAX_UNITS_PER_PAPER};
use crate::models::{
    GradingTag, PaperDocument, PoolEntry, QuestionPool, QuestionSlot, UnitSection, VariantLabel,
};

/// 空单元使用的占位题
pub const PLACEHOLDER_TEXT: &str = "No questions available";

/// 选题策略
///
/// 对于 `len ≥ 2` 的单元，返回两个互不相同、均小于 `len` 的下标。
pub trait QuestionPicker {
    fn pick_pair(&mut self, len: usize) -> (usize, usize);
}

/// 以种子初始化的伪随机选题
pub struct SeededPicker {
    rng: StdRng,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl QuestionPicker for SeededPicker {
    fn pick_pair(&mut self, len: usize) -> (usize, usize) {
        let picked = sample(&mut self.rng, len, 2);
        (picked.index(0), picked.index(1))
    }
}

/// 由本次生成的时间戳和套卷序号推导种子
///
/// 同一次请求内各套试卷可相互复现，不同时间的请求结果不同。
pub fn derive_seed(timestamp: i64, variant_index: usize) -> u64 {
    (timestamp as u64).wrapping_add(variant_index as u64)
}

fn placeholder_entry() -> PoolEntry {
    PoolEntry::new(PLACEHOLDER_TEXT, GradingTag::new(2, 1, MARKS_PER_QUESTION))
}

fn slot(serial: u32, entry: &PoolEntry) -> QuestionSlot {
    QuestionSlot {
        serial,
        text: entry.text.clone(),
        tag: entry.metadata,
        marks: MARKS_PER_QUESTION,
    }
}

/// 为一个单元选出（主题, 备选题）
fn pick_for_unit<'a>(
    questions: &'a [PoolEntry],
    placeholder: &'a PoolEntry,
    picker: &mut dyn QuestionPicker,
) -> (&'a PoolEntry, &'a PoolEntry) {
    match questions.len() {
        0 => (placeholder, placeholder),
        1 => (&questions[0], &questions[0]),
        len => {
            let (first, second) = picker.pick_pair(len);
            (&questions[first], &questions[second])
        }
    }
}

/// 组装一套试卷
pub fn assemble_variant(
    pool: &QuestionPool,
    label: VariantLabel,
    seed: u64,
    picker: &mut dyn QuestionPicker,
) -> PaperDocument {
    let placeholder = placeholder_entry();

    let sections = pool
        .units()
        .take(MAX_UNITS_PER_PAPER)
        .enumerate()
        .map(|(index, unit_questions)| {
            let position = index + 1;
            let (primary, alternative) =
                pick_for_unit(&unit_questions.questions, &placeholder, picker);

            let primary_serial = 2 * index as u32 + 1;
            if unit_questions.questions.is_empty() {
                debug!("{} 单元 {} 没有题目，使用占位题", label, unit_questions.unit);
            }

            UnitSection {
                position,
                unit: unit_questions.unit,
                primary: slot(primary_serial, primary),
                alternative: slot(primary_serial + 1, alternative),
            }
        })
        .collect();

    PaperDocument {
        label,
        seed,
        sections,
    }
}

/// 使用推导出的种子组装一套试卷
pub fn assemble_seeded(pool: &QuestionPool, label: VariantLabel, timestamp: i64) -> PaperDocument {
    let seed = derive_seed(timestamp, label.index());
    let mut picker = SeededPicker::new(seed);
    assemble_variant(pool, label, seed, &mut picker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;

    /// 按脚本返回下标的选题器
    struct ScriptedPicker {
        picks: Vec<(usize, usize)>,
        calls: Vec<usize>,
    }

    impl QuestionPicker for ScriptedPicker {
        fn pick_pair(&mut self, len: usize) -> (usize, usize) {
            self.calls.push(len);
            self.picks.remove(0)
        }
    }

    fn entry(text: &str) -> PoolEntry {
        PoolEntry::new(text, GradingTag::new(1, 1, 6))
    }

    fn label(index: usize) -> VariantLabel {
        VariantLabel::from_index(index).unwrap()
    }

    #[test]
    fn test_scripted_selection_and_serials() {
        let mut pool = QuestionPool::new();
        for text in ["a", "b", "c"] {
            pool.push(Unit::One, entry(text));
        }
        for text in ["d", "e"] {
            pool.push(Unit::Two, entry(text));
        }

        let mut picker = ScriptedPicker {
            picks: vec![(2, 0), (1, 0)],
            calls: Vec::new(),
        };
        let paper = assemble_variant(&pool, label(0), 7, &mut picker);

        assert_eq!(picker.calls, vec![3, 2]);
        assert_eq!(paper.sections.len(), 2);
        let first = &paper.sections[0];
        assert_eq!((first.primary.text.as_str(), first.alternative.text.as_str()), ("c", "a"));
        assert_eq!((first.primary.serial, first.alternative.serial), (1, 2));
        let second = &paper.sections[1];
        assert_eq!((second.primary.text.as_str(), second.alternative.text.as_str()), ("e", "d"));
        assert_eq!((second.primary.serial, second.alternative.serial), (3, 4));
        assert!(paper.sections.iter().all(|s| s.primary.marks == 12));
    }

    #[test]
    fn test_single_question_fills_both_slots() {
        let mut pool = QuestionPool::new();
        pool.push(Unit::Three, entry("only one"));

        for index in 0..4 {
            let paper = assemble_seeded(&pool, label(index), 1_700_000_000_000);
            let section = &paper.sections[0];
            assert_eq!(section.primary.text, "only one");
            assert_eq!(section.alternative.text, "only one");
        }
    }

    #[test]
    fn test_empty_unit_uses_placeholder() {
        let mut pool = QuestionPool::new();
        pool.unit_mut(Unit::Two);

        let paper = assemble_seeded(&pool, label(0), 42);
        let section = &paper.sections[0];
        assert_eq!(section.primary.text, PLACEHOLDER_TEXT);
        assert_eq!(section.alternative.text, PLACEHOLDER_TEXT);
        assert_eq!(section.primary.tag, GradingTag::new(2, 1, 12));
    }

    #[test]
    fn test_only_first_five_units_are_used() {
        let mut pool = QuestionPool::new();
        for unit in [Unit::Five, Unit::Four, Unit::Three, Unit::Two, Unit::One] {
            pool.push(unit, entry("q"));
        }
        // 重复出现的单元不会新增位置
        pool.push(Unit::Five, entry("q2"));

        let paper = assemble_seeded(&pool, label(1), 5);
        let units: Vec<Unit> = paper.sections.iter().map(|s| s.unit).collect();
        assert_eq!(units, vec![Unit::Five, Unit::Four, Unit::Three, Unit::Two, Unit::One]);
        assert_eq!(paper.sections[4].alternative.serial, 10);
    }

    #[test]
    fn test_seeded_picks_are_distinct_and_reproducible() {
        let mut pool = QuestionPool::new();
        for i in 0..10 {
            pool.push(Unit::One, entry(&format!("q{}", i)));
        }

        for index in 0..26 {
            let first = assemble_seeded(&pool, label(index), 1_234_567);
            let again = assemble_seeded(&pool, label(index), 1_234_567);
            assert_eq!(first, again);
            assert_ne!(first.sections[0].primary.text, first.sections[0].alternative.text);
        }
    }

    #[test]
    fn test_seed_derivation() {
        assert_eq!(derive_seed(1000, 0), 1000);
        assert_eq!(derive_seed(1000, 3), 1003);
    }
}
