use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "review.toml";

/// API 凭据所在的环境变量
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 每次运行生成的评审数量
    pub num_reviews: usize,
    /// 所有查询合计的最大搜索结果数
    pub max_results: usize,
    /// 搜索查询列表
    pub search_queries: Vec<String>,
    /// 已评审记录文件
    pub reviewed_file: PathBuf,
    /// 评审输出根目录
    pub output_root: PathBuf,
    /// 评审文件名中标题的最大长度
    pub max_title_len: usize,
    /// 两次生成调用之间的最小间隔（毫秒）
    pub pacing_interval_ms: u64,
    /// 随机抽样种子（为空时使用系统熵）
    pub sample_seed: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- arXiv 配置 ---
    pub arxiv_api_base_url: String,
    pub search_timeout_secs: u64,
    // --- Gemini 配置 ---
    pub gemini_api_key: Option<String>,
    pub gemini_api_base_url: String,
    pub gemini_model_name: String,
    pub generation_timeout_secs: u64,
    pub generation: GenerationParams,
    // --- PDF 提取 ---
    pub extraction: ExtractionLimits,
    // --- 提示词截断 ---
    pub prompt: PromptLimits,
}

/// 生成参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

/// PDF 提取上限
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExtractionLimits {
    pub max_pages: usize,
    pub max_chars: usize,
    pub timeout_secs: u64,
}

/// 提示词中各部分的截断长度（字符数）
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PromptLimits {
    pub summary_chars: usize,
    pub document_chars: usize,
    pub fallback_summary_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_reviews: 10,
            max_results: 100,
            search_queries: vec![
                "LLM safety alignment".to_string(),
                "jailbreak language model".to_string(),
                "adversarial prompt attack".to_string(),
                "AI safety evaluation".to_string(),
                "harmful content detection LLM".to_string(),
            ],
            reviewed_file: PathBuf::from("reviewed_papers.txt"),
            output_root: PathBuf::from("result"),
            max_title_len: 100,
            pacing_interval_ms: 2000,
            sample_seed: None,
            verbose_logging: false,
            arxiv_api_base_url: "http://export.arxiv.org/api/query".to_string(),
            search_timeout_secs: 30,
            gemini_api_key: None,
            gemini_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_model_name: "gemini-2.5-pro".to_string(),
            generation_timeout_secs: 60,
            generation: GenerationParams::default(),
            extraction: ExtractionLimits::default(),
            prompt: PromptLimits::default(),
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 4000,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_pages: 10,
            max_chars: 15000,
            timeout_secs: 30,
        }
    }
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self {
            summary_chars: 1000,
            document_chars: 8000,
            fallback_summary_chars: 1500,
        }
    }
}

impl Config {
    /// 加载配置：TOML 文件（可选）+ 环境变量覆盖
    ///
    /// 文件不存在时使用默认值；文件存在但无法解析时报错
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => std::env::var("REVIEW_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };

        let base = if path.exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };

        base.with_env_overrides()
    }

    /// 从 TOML 文件读取配置
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖配置项
    pub fn with_env_overrides(mut self) -> AppResult<Self> {
        if let Some(key) = env_string(API_KEY_ENV) {
            self.gemini_api_key = Some(key);
        }
        if let Some(v) = env_string("GEMINI_API_BASE_URL") {
            self.gemini_api_base_url = v;
        }
        if let Some(v) = env_string("GEMINI_MODEL_NAME") {
            self.gemini_model_name = v;
        }
        if let Some(v) = env_string("ARXIV_API_BASE_URL") {
            self.arxiv_api_base_url = v;
        }
        if let Some(v) = env_string("REVIEWED_FILE") {
            self.reviewed_file = PathBuf::from(v);
        }
        if let Some(v) = env_string("OUTPUT_ROOT") {
            self.output_root = PathBuf::from(v);
        }
        if let Some(v) = env_parsed("NUM_REVIEWS", "usize")? {
            self.num_reviews = v;
        }
        if let Some(v) = env_parsed("MAX_RESULTS", "usize")? {
            self.max_results = v;
        }
        if let Some(v) = env_parsed("PACING_INTERVAL_MS", "u64")? {
            self.pacing_interval_ms = v;
        }
        if let Some(v) = env_parsed("SAMPLE_SEED", "u64")? {
            self.sample_seed = Some(v);
        }
        if let Some(v) = env_parsed("VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        Ok(self)
    }

    /// 获取 API 凭据，缺失时立即失败
    pub fn require_api_key(&self) -> AppResult<&str> {
        match self.gemini_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::MissingCredential {
                var_name: API_KEY_ENV.to_string(),
            }
            .into()),
        }
    }

    pub fn pacing_interval(&self) -> Duration {
        Duration::from_millis(self.pacing_interval_ms)
    }

    /// 每个查询请求的结果数
    pub fn results_per_query(&self) -> usize {
        if self.search_queries.is_empty() {
            return 0;
        }
        self.max_results / self.search_queries.len()
    }
}

fn env_string(var_name: &str) -> Option<String> {
    std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T: FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match env_string(var_name) {
        None => Ok(None),
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
    }
}
