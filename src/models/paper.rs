use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 一篇候选（或已评审）论文
///
/// `identifier` 是去重和评审记录的唯一键，取自规范化后的标题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub summary: String,
    /// PDF 地址
    #[serde(default)]
    pub document_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// 来源条目 ID（arXiv entry id）
    #[serde(default)]
    pub source_id: String,
}

impl PaperRecord {
    /// 由标题创建记录，标识符由标题规范化得到
    ///
    /// 标识符为空时返回 `None`
    pub fn from_title(title: &str) -> Option<Self> {
        let identifier = normalize_identifier(title);
        if identifier.is_empty() {
            return None;
        }
        Some(Self {
            title: collapse_whitespace(title),
            identifier,
            authors: Vec::new(),
            summary: String::new(),
            document_location: String::new(),
            published_at: None,
            source_id: String::new(),
        })
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    pub fn with_document_location(mut self, location: impl Into<String>) -> Self {
        self.document_location = location.into();
        self
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = source_id.into();
        self
    }
}

/// 标识符规范化：连续空白折叠为单个空格，去掉首尾空白和开头的 `#`
///
/// 不做大小写或 Unicode 归一化。结果不含换行也不以 `#` 开头，
/// 写入记录文件后不会被当成注释行
pub fn normalize_identifier(raw: &str) -> String {
    collapse_whitespace(raw)
        .trim_start_matches(|c: char| c == '#' || c.is_whitespace())
        .to_string()
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
