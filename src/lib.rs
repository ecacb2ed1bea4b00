//! # Paper Review Bot
//!
//! 从 arXiv 搜索大模型安全相关论文，随机挑选尚未评审的论文，为每篇生成一篇 Markdown 评审
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `infrastructure/` - HTTP 连接池
//! - `clients/` - arXiv 搜索、PDF 文本提取、Gemini 生成，每个外部系统一个 trait
//!
//! ### ② 业务能力层（Services）
//! - `ReviewedStore` - 已评审记录（追加写入，跨运行持久）
//! - `CandidatePipeline` - 搜索 → 相关性 → 去重 → 排除已评审
//! - `ReviewGenerator` - 提示词 + 生成 + 兜底评审
//! - `ReviewWriter` - 写评审文件
//!
//! ### ③ 流程层（Workflow）
//! - `ReviewCtx` - 上下文封装（序号 + 处理阶段）
//! - `ReviewFlow` - 单篇流程（extract → generate → write → commit）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 应用生命周期，构建候选池
//! - `orchestrator/review_processor` - 抽样、逐篇处理、节流、统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::PaperRecord;
pub use orchestrator::{App, ReviewOrchestrator, RunSummary};
pub use services::ReviewedStore;
pub use workflow::{ReviewCtx, ReviewFlow};
