/// Gemini API 客户端
///
/// 封装 `generateContent` 调用和模型列表查询
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::GenerationBackend;
use crate::config::{Config, GenerationParams};
use crate::error::{AppResult, GenerationError};
use crate::infrastructure::build_client;

/// Gemini 客户端
pub struct GeminiClient {
    http: Client,
    api_key: String,
    api_base_url: String,
    model_name: String,
    params: GenerationParams,
}

// ========== 请求 / 响应结构 ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// 模型信息
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
    pub input_token_limit: Option<u64>,
    pub output_token_limit: Option<u64>,
}

impl ModelInfo {
    /// 是否可用于文本生成
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

impl GeminiClient {
    /// 创建新的 Gemini 客户端
    ///
    /// 缺少 API 凭据时直接返回 `MissingCredential`
    pub fn new(config: &Config) -> AppResult<Self> {
        let api_key = config.require_api_key()?.to_string();
        let http = build_client(Duration::from_secs(config.generation_timeout_secs)).map_err(
            |source| GenerationError::RequestFailed {
                model: config.gemini_model_name.clone(),
                source,
            },
        )?;

        Ok(Self::with_client(http, api_key, config))
    }

    pub fn with_client(http: Client, api_key: impl Into<String>, config: &Config) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            api_base_url: config.gemini_api_base_url.trim_end_matches('/').to_string(),
            model_name: config.gemini_model_name.clone(),
            params: config.generation.clone(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base_url, self.model_name)
    }

    /// 列出当前凭据可用的模型
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, GenerationError> {
        let url = format!("{}/models", self.api_base_url);
        let response = self
            .http
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|source| self.request_failed(source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::BadStatus {
                model: self.model_name.clone(),
                status,
                body,
            });
        }

        let parsed: ListModelsResponse = response
            .json()
            .await
            .map_err(|_| self.malformed())?;
        Ok(parsed.models)
    }

    fn request_failed(&self, source: reqwest::Error) -> GenerationError {
        GenerationError::RequestFailed {
            model: self.model_name.clone(),
            source,
        }
    }

    fn malformed(&self) -> GenerationError {
        GenerationError::MalformedResponse {
            model: self.model_name.clone(),
        }
    }
}

impl GenerationBackend for GeminiClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!("调用 Gemini API，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.chars().count());

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.params.temperature,
                max_output_tokens: self.params.max_output_tokens,
                top_p: self.params.top_p,
                top_k: self.params.top_k,
            },
        };

        let response = self
            .http
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| self.request_failed(source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::BadStatus {
                model: self.model_name.clone(),
                status,
                body,
            });
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|_| self.malformed())?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| self.malformed())?;

        debug!("Gemini API 调用成功");
        Ok(text)
    }
}
