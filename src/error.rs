use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 论文搜索错误
    #[error("搜索错误: {0}")]
    Search(#[from] SearchError),
    /// PDF 文本提取错误
    #[error("文本提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 评审生成错误
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 文件持久化错误
    #[error("持久化错误: {0}")]
    Persistence(#[from] PersistenceError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 论文搜索错误
#[derive(Debug, Error)]
pub enum SearchError {
    /// 网络请求失败
    #[error("搜索请求失败 (查询: {query}): {source}")]
    RequestFailed {
        query: String,
        #[source]
        source: reqwest::Error,
    },
    /// 返回非 2xx 状态码
    #[error("搜索接口返回错误状态 (查询: {query}): {status}")]
    BadStatus {
        query: String,
        status: reqwest::StatusCode,
    },
    /// Atom feed 解析失败
    #[error("无法解析搜索结果 (查询: {query}): {source}")]
    FeedParseFailed {
        query: String,
        #[source]
        source: feed_rs::parser::ParseFeedError,
    },
    /// 所有查询都失败
    #[error("全部 {query_count} 个查询均失败，无法获取候选论文")]
    AllQueriesFailed { query_count: usize },
}

/// PDF 文本提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 文档地址为空
    #[error("文档地址为空")]
    EmptyLocation,
    /// 下载失败
    #[error("下载 PDF 失败 ({url}): {source}")]
    DownloadFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// 返回非 2xx 状态码
    #[error("下载 PDF 返回错误状态 ({url}): {status}")]
    BadStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    /// PDF 解析失败
    #[error("解析 PDF 失败 ({url}): {source}")]
    PdfParseFailed {
        url: String,
        #[source]
        source: lopdf::Error,
    },
    /// 后台解析任务异常退出
    #[error("PDF 解析任务异常退出: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// 评审生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// API 调用失败（网络、超时）
    #[error("生成 API 调用失败 (模型: {model}): {source}")]
    RequestFailed {
        model: String,
        #[source]
        source: reqwest::Error,
    },
    /// 返回非 2xx 状态码
    #[error("生成 API 返回错误状态 (模型: {model}): {status}, 响应: {body}")]
    BadStatus {
        model: String,
        status: reqwest::StatusCode,
        body: String,
    },
    /// 返回结构不符合预期
    #[error("生成 API 返回格式异常 (模型: {model})")]
    MalformedResponse { model: String },
}

/// 文件持久化错误
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// 评审文件写入失败
    #[error("写入评审文件失败 ({}): {source}", path.display())]
    ArtifactWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 输出目录创建失败
    #[error("创建输出目录失败 ({}): {source}", path.display())]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 已评审记录读取失败
    #[error("读取已评审记录失败 ({}): {source}", path.display())]
    StoreReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 已评审记录追加失败
    #[error("追加已评审记录失败 ({}): {source}", path.display())]
    StoreAppendFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少 API 凭据
    #[error("缺少 API 凭据，请设置环境变量 {var_name} 或在配置文件中填写")]
    MissingCredential { var_name: String },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建评审文件写入错误
    pub fn artifact_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Persistence(PersistenceError::ArtifactWriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建已评审记录追加错误
    pub fn store_append_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Persistence(PersistenceError::StoreAppendFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建缺少凭据错误
    pub fn missing_credential(var_name: impl Into<String>) -> Self {
        AppError::Config(ConfigError::MissingCredential {
            var_name: var_name.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
