//! 噪声过滤服务 - 业务能力层
//!
//! 只负责判断"这一行是不是文档页眉/页脚等样板文字"

use regex::{RegexSet, RegexSetBuilder};

/// 样板行的特征，均锚定在行首，大小写不敏感
const NOISE_PATTERNS: &[&str] = &[
    r"^Prepared\s+by",
    r"^Section\s+[IVX]+",
    r"^No\.?\s*of\s*workers",
    r"^Page\s+\d+",
    r"^Course\s+Code",
    r"^Regulation",
    r"^H\.T\.No",
    r"^SIDDHARTH",
    r"^Subject\s+with",
    r"^Question\s+Bank",
    r"^Year\s*&\s*Sem",
];

/// 噪声过滤服务
///
/// 纯分类，无副作用。被判定为噪声的行在分段之前就被丢弃。
pub struct NoiseFilter {
    patterns: RegexSet,
}

impl NoiseFilter {
    /// 创建新的噪声过滤服务
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = RegexSetBuilder::new(NOISE_PATTERNS)
            .case_insensitive(true)
            .build()?;
        Ok(Self { patterns })
    }

    /// 判断一行（已去除首尾空白）是否为样板文字
    pub fn is_noise(&self, line: &str) -> bool {
        self.patterns.is_match(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boilerplate_lines_are_noise() {
        let filter = NoiseFilter::new().unwrap();
        for line in [
            "Prepared by: Dr. K. Rao",
            "SECTION II",
            "No. of workers: 3",
            "Page 4 of 12",
            "Course Code: 20MC9114",
            "Regulation: R20",
            "H.T.No.",
            "Siddharth Institute of Engineering & Technology",
            "Subject with Code: Computer Networks",
            "QUESTION BANK (DESCRIPTIVE)",
            "Year & Sem: I-MCA & II-Sem",
        ] {
            assert!(filter.is_noise(line), "应为噪声: {}", line);
        }
    }

    #[test]
    fn test_content_lines_pass_through() {
        let filter = NoiseFilter::new().unwrap();
        for line in [
            "1. Explain the page replacement algorithms. [L2][CO1][12M]",
            "Discuss the course of events in TCP handshake",
            "UNIT-II",
            "OR",
            "a) Define regulation of flow control",
        ] {
            assert!(!filter.is_noise(line), "不应为噪声: {}", line);
        }
    }
}
