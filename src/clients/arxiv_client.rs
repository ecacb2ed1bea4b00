/// arXiv API 客户端
///
/// 封装 arXiv 查询接口的调用和 Atom feed 解析
use std::time::Duration;

use feed_rs::model::Entry;
use reqwest::Client;
use tracing::{debug, warn};

use crate::clients::{PaperSearch, SortOrder};
use crate::config::Config;
use crate::error::SearchError;
use crate::infrastructure::build_client;
use crate::models::PaperRecord;

/// arXiv 客户端
pub struct ArxivClient {
    http: Client,
    api_base_url: String,
}

impl ArxivClient {
    /// 创建新的 arXiv 客户端
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        Ok(Self {
            http: build_client(Duration::from_secs(config.search_timeout_secs))?,
            api_base_url: config.arxiv_api_base_url.clone(),
        })
    }

    pub fn with_base_url(http: Client, api_base_url: impl Into<String>) -> Self {
        Self {
            http,
            api_base_url: api_base_url.into(),
        }
    }
}

impl PaperSearch for ArxivClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        sort: SortOrder,
    ) -> Result<Vec<PaperRecord>, SearchError> {
        let sort_by = match sort {
            SortOrder::MostRecent => "submittedDate",
            SortOrder::Relevance => "relevance",
        };
        debug!("arXiv 查询: {} (最多 {} 条, 排序: {})", query, max_results, sort_by);

        let response = self
            .http
            .get(&self.api_base_url)
            .query(&[
                ("search_query", query.to_string()),
                ("start", "0".to_string()),
                ("max_results", max_results.to_string()),
                ("sortBy", sort_by.to_string()),
                ("sortOrder", "descending".to_string()),
            ])
            .send()
            .await
            .map_err(|source| SearchError::RequestFailed {
                query: query.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::BadStatus {
                query: query.to_string(),
                status,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| SearchError::RequestFailed {
                query: query.to_string(),
                source,
            })?;

        parse_atom_feed(&bytes, query)
    }
}

/// 解析 arXiv 返回的 Atom feed
///
/// 缺少 id 或标题的条目单独跳过，不影响其他条目
pub fn parse_atom_feed(bytes: &[u8], query: &str) -> Result<Vec<PaperRecord>, SearchError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|source| SearchError::FeedParseFailed {
        query: query.to_string(),
        source,
    })?;

    let mut records = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        match entry_to_record(entry) {
            Some(record) => records.push(record),
            None => warn!("⚠️ 跳过缺少标题或 ID 的条目 (查询: {})", query),
        }
    }
    Ok(records)
}

fn entry_to_record(entry: Entry) -> Option<PaperRecord> {
    if entry.id.trim().is_empty() {
        return None;
    }
    let title = entry.title.as_ref().map(|t| t.content.as_str())?;
    let record = PaperRecord::from_title(title)?;

    let summary = entry
        .summary
        .as_ref()
        .map(|s| s.content.trim().to_string())
        .unwrap_or_default();
    let authors = entry
        .authors
        .iter()
        .map(|person| person.name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    Some(
        record
            .with_summary(summary)
            .with_authors(authors)
            .with_document_location(pdf_location(&entry))
            .with_published_at(entry.published.or(entry.updated))
            .with_source_id(entry.id.trim()),
    )
}

/// PDF 链接：优先使用 `application/pdf` 链接，否则把 `/abs/` 换成 `/pdf/`
fn pdf_location(entry: &Entry) -> String {
    entry
        .links
        .iter()
        .find(|link| {
            link.media_type.as_deref() == Some("application/pdf")
                || link.title.as_deref() == Some("pdf")
        })
        .map(|link| link.href.clone())
        .unwrap_or_else(|| entry.id.trim().replace("/abs/", "/pdf/"))
}
