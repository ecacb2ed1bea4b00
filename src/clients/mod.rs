//! 外部协作方客户端
//!
//! 每个外部系统一个 trait，流程层只依赖 trait，测试时可替换为假实现

pub mod arxiv_client;
pub mod gemini_client;
pub mod pdf_client;

pub use arxiv_client::ArxivClient;
pub use gemini_client::GeminiClient;
pub use pdf_client::PdfTextExtractor;

use crate::error::{GenerationError, SearchError};
use crate::models::PaperRecord;

/// 搜索结果排序方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// 按提交时间，最新在前
    MostRecent,
    /// 按相关度
    Relevance,
}

/// 论文搜索能力
#[allow(async_fn_in_trait)]
pub trait PaperSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        sort: SortOrder,
    ) -> Result<Vec<PaperRecord>, SearchError>;
}

/// 文档文本提取能力
///
/// 任何失败都返回空文本，不向上抛错
#[allow(async_fn_in_trait)]
pub trait TextExtractor {
    async fn extract(&self, location: &str) -> String;
}

/// 文本生成能力
#[allow(async_fn_in_trait)]
pub trait GenerationBackend {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
