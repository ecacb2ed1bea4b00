//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用生命周期
//! - 创建客户端和服务（arXiv / PDF / Gemini）
//! - 持有已评审记录（ReviewedStore）
//! - 构建候选池
//! - 输出全局统计信息
//!
//! ### `review_processor` - 评审批处理器
//! - 随机抽样（可注入随机数生成器）
//! - 逐篇调用 ReviewFlow，单篇失败不影响其他论文
//! - 生成调用节流
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (App：候选池 + 资源)
//!     ↓
//! review_processor (处理 Vec<PaperRecord>)
//!     ↓
//! workflow::ReviewFlow (处理单篇 PaperRecord)
//!     ↓
//! services (能力层：pipeline / generator / writer / store)
//!     ↓
//! clients + infrastructure (arXiv / PDF / Gemini / HTTP)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管资源，review_processor 管批量
//! 2. **向下依赖**：编排层 → workflow → services → clients
//! 3. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod batch_processor;
pub mod review_processor;

// 重新导出主要类型
pub use batch_processor::App;
pub use review_processor::{select_sample, ReviewFailure, ReviewOrchestrator, RunSummary};
