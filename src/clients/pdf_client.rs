/// PDF 文本提取客户端
///
/// 下载 PDF，提取前若干页文本，折叠空白并截断
use std::time::Duration;

use lopdf::Document;
use reqwest::Client;
use tracing::{debug, warn};

use crate::clients::TextExtractor;
use crate::config::ExtractionLimits;
use crate::error::ExtractionError;
use crate::infrastructure::build_client;

/// PDF 文本提取器
pub struct PdfTextExtractor {
    http: Client,
    max_pages: usize,
    max_chars: usize,
}

impl PdfTextExtractor {
    pub fn new(limits: &ExtractionLimits) -> reqwest::Result<Self> {
        Ok(Self::with_client(
            build_client(Duration::from_secs(limits.timeout_secs))?,
            limits,
        ))
    }

    pub fn with_client(http: Client, limits: &ExtractionLimits) -> Self {
        Self {
            http,
            max_pages: limits.max_pages,
            max_chars: limits.max_chars,
        }
    }

    async fn try_extract(&self, url: &str) -> Result<String, ExtractionError> {
        if url.trim().is_empty() {
            return Err(ExtractionError::EmptyLocation);
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ExtractionError::DownloadFailed {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::BadStatus {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ExtractionError::DownloadFailed {
                url: url.to_string(),
                source,
            })?;
        debug!("PDF 下载完成: {} ({} 字节)", url, bytes.len());

        // lopdf 解析是 CPU 密集操作，放到阻塞线程池
        let max_pages = self.max_pages;
        let raw = tokio::task::spawn_blocking(move || extract_pages(&bytes, max_pages))
            .await?
            .map_err(|source| ExtractionError::PdfParseFailed {
                url: url.to_string(),
                source,
            })?;

        Ok(clean_text(&raw, self.max_chars))
    }
}

impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, location: &str) -> String {
        match self.try_extract(location).await {
            Ok(text) => text,
            Err(e) => {
                warn!("⚠️ PDF 文本提取失败，使用空文本继续: {}", e);
                String::new()
            }
        }
    }
}

fn extract_pages(bytes: &[u8], max_pages: usize) -> Result<String, lopdf::Error> {
    if max_pages == 0 {
        return Ok(String::new());
    }
    let document = Document::load_mem(bytes)?;
    let page_numbers: Vec<u32> = document
        .get_pages()
        .keys()
        .copied()
        .take(max_pages)
        .collect();
    if page_numbers.is_empty() {
        return Ok(String::new());
    }
    document.extract_text(&page_numbers)
}

/// 连续空白折叠为单个空格，并截断到 `max_chars` 个字符
pub fn clean_text(raw: &str, max_chars: usize) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(max_chars)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn limits() -> ExtractionLimits {
        ExtractionLimits {
            max_pages: 10,
            max_chars: 15000,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_clean_text_collapses_and_truncates() {
        assert_eq!(clean_text("  a\n\n b\t c  ", 100), "a b c");
        assert_eq!(clean_text("abcdef", 3), "abc");
        assert_eq!(clean_text("安全 对齐", 4), "安全 对");
    }

    #[tokio::test]
    async fn test_empty_location_gives_empty_text() {
        let extractor = PdfTextExtractor::with_client(Client::new(), &limits());
        assert_eq!(extractor.extract("").await, "");
    }

    /// 下载失败不向上抛错
    #[tokio::test]
    async fn test_bad_status_gives_empty_text() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/pdf/2405.00001v1")
            .with_status(404)
            .create_async()
            .await;

        let extractor = PdfTextExtractor::with_client(Client::new(), &limits());
        let text = extractor
            .extract(&format!("{}/pdf/2405.00001v1", server.url()))
            .await;
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_non_pdf_body_gives_empty_text() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/pdf/broken")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("definitely not a pdf")
            .create_async()
            .await;

        let extractor = PdfTextExtractor::with_client(Client::new(), &limits());
        let text = extractor
            .extract(&format!("{}/pdf/broken", server.url()))
            .await;
        assert_eq!(text, "");
    }
}
