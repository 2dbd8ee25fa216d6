use serde::{Deserialize, Serialize};

/// 科目信息（由外部的科目/规程登记服务提供）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    /// 规程，例如 `R20`
    #[serde(default)]
    pub regulation: String,
}

impl SubjectMeta {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        regulation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            regulation: regulation.into(),
        }
    }

    /// 试卷抬头显示的科目代码，缺省为 `XXXXXX`
    pub fn display_code(&self) -> &str {
        non_blank(&self.code).unwrap_or("XXXXXX")
    }

    /// 试卷抬头显示的规程，缺省为 `R20`
    pub fn display_regulation(&self) -> &str {
        non_blank(&self.regulation).unwrap_or("R20")
    }

    /// 试卷抬头显示的科目名称（大写），缺省为 `SUBJECT NAME`
    pub fn display_name(&self) -> String {
        non_blank(&self.name).unwrap_or("SUBJECT NAME").to_uppercase()
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl std::fmt::Display for SubjectMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.display_code(), self.display_regulation())
    }
}
