//! 评分标记提取服务 - 业务能力层
//!
//! 从单道题的文本中识别并剥离评分标记，支持两种写法：
//!
//! 1. 方括号写法：`[L2][CO1][10M]`
//! 2. 裸写法：`CO1 L2 10M`
//!
//! 按优先级依次尝试，第一个命中的写法生效。没有标记不是错误。

use regex::{Regex, RegexBuilder};

use crate::models::GradingTag;

/// 标记写法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagNotation {
    Bracketed,
    Bare,
}

/// 标记匹配结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMatch {
    NoTag,
    Bracketed(GradingTag),
    Bare(GradingTag),
}

impl TagMatch {
    /// 提取到的标记，未命中时为空标记
    pub fn tag(&self) -> GradingTag {
        match self {
            TagMatch::NoTag => GradingTag::default(),
            TagMatch::Bracketed(tag) | TagMatch::Bare(tag) => *tag,
        }
    }

    pub fn notation(&self) -> Option<TagNotation> {
        match self {
            TagMatch::NoTag => None,
            TagMatch::Bracketed(_) => Some(TagNotation::Bracketed),
            TagMatch::Bare(_) => Some(TagNotation::Bare),
        }
    }
}

/// 去除标记后的文本及匹配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedText {
    pub text: String,
    pub tag_match: TagMatch,
}

impl TaggedText {
    pub fn tag(&self) -> GradingTag {
        self.tag_match.tag()
    }
}

/// 单个写法的匹配器
struct TagMatcher {
    notation: TagNotation,
    pattern: Regex,
    /// 捕获组下标：(level, co, marks)
    groups: (usize, usize, usize),
}

impl TagMatcher {
    fn new(notation: TagNotation, pattern: &str, groups: (usize, usize, usize)) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            notation,
            pattern,
            groups,
        })
    }

    fn try_match(&self, text: &str) -> Option<TaggedText> {
        let caps = self.pattern.captures(text)?;
        let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");
        let tag = GradingTag::from_digits(group(self.groups.0), group(self.groups.1), group(self.groups.2));

        let tag_match = match self.notation {
            TagNotation::Bracketed => TagMatch::Bracketed(tag),
            TagNotation::Bare => TagMatch::Bare(tag),
        };

        Some(TaggedText {
            text: self.pattern.replace_all(text, "").trim().to_string(),
            tag_match,
        })
    }
}

/// 评分标记提取服务
pub struct MetadataTagger {
    matchers: Vec<TagMatcher>,
}

impl MetadataTagger {
    /// 创建新的标记提取服务，匹配器按优先级排列
    pub fn new() -> Result<Self, regex::Error> {
        let matchers = vec![
            TagMatcher::new(
                TagNotation::Bracketed,
                r"\[\s*L\s*(\d+)\s*\]\s*\[\s*CO\s*(\d+)\s*\]\s*\[\s*(\d+)\s*M\s*\]",
                (1, 2, 3),
            )?,
            TagMatcher::new(TagNotation::Bare, r"CO(\d+)\s+L(\d+)\s+(\d+)M", (2, 1, 3))?,
        ];
        Ok(Self { matchers })
    }

    /// 提取标记
    ///
    /// 命中时从文本中删除标记片段并去除首尾空白；未命中时原样返回文本和空标记。
    pub fn tag(&self, text: &str) -> TaggedText {
        self.matchers
            .iter()
            .find_map(|matcher| matcher.try_match(text))
            .unwrap_or_else(|| TaggedText {
                text: text.to_string(),
                tag_match: TagMatch::NoTag,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagger() -> MetadataTagger {
        MetadataTagger::new().unwrap()
    }

    #[test]
    fn test_bracketed_tag() {
        let tagged = tagger().tag("Explain caching. [L2][CO1][10M]");
        assert_eq!(tagged.text, "Explain caching.");
        assert_eq!(tagged.tag_match, TagMatch::Bracketed(GradingTag::new(2, 1, 10)));
        assert_eq!(tagged.tag().canonical(), "CO1    L2    10M");
    }

    #[test]
    fn test_bare_tag() {
        let tagged = tagger().tag("Explain caching. CO1 L2 10M");
        assert_eq!(tagged.text, "Explain caching.");
        assert_eq!(tagged.tag_match, TagMatch::Bare(GradingTag::new(2, 1, 10)));
    }

    #[test]
    fn test_bare_tag_glued_to_last_word() {
        let tagged = tagger().tag("Explain cachingCO1 L2 10M");
        assert_eq!(tagged.text, "Explain caching");
        assert_eq!(tagged.tag_match, TagMatch::Bare(GradingTag::new(2, 1, 10)));
    }

    #[test]
    fn test_bracketed_tolerates_whitespace_and_case() {
        let tagged = tagger().tag("Define a socket. [ l3 ] [ co 2 ] [ 6 m ]");
        assert_eq!(tagged.text, "Define a socket.");
        assert_eq!(tagged.tag(), GradingTag::new(3, 2, 6));
    }

    #[test]
    fn test_bracketed_takes_precedence_over_bare() {
        let tagged = tagger().tag("Compare CO4 L5 8M styles. [L2][CO1][12M]");
        assert_eq!(tagged.tag_match.notation(), Some(TagNotation::Bracketed));
        assert_eq!(tagged.tag(), GradingTag::new(2, 1, 12));
        assert_eq!(tagged.text, "Compare CO4 L5 8M styles.");
    }

    #[test]
    fn test_no_tag_passes_through_unchanged() {
        let text = "  Explain the OSI model in detail.  ";
        let tagged = tagger().tag(text);
        assert_eq!(tagged.text, text);
        assert_eq!(tagged.tag_match, TagMatch::NoTag);
        assert!(tagged.tag().is_empty());
    }

    #[test]
    fn test_levels_are_not_range_checked() {
        let tagged = tagger().tag("Odd tag [L99][CO7][100M]");
        assert_eq!(tagged.tag(), GradingTag::new(99, 7, 100));
    }

    #[test]
    fn test_multiline_text_keeps_inner_newlines() {
        let tagged = tagger().tag("Explain:\na) TCP\nb) UDP CO2 L3 12M");
        assert_eq!(tagged.text, "Explain:\na) TCP\nb) UDP");
        assert_eq!(tagged.tag(), GradingTag::new(3, 2, 12));
    }
}
