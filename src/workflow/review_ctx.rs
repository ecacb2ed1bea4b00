//! 评审处理上下文
//!
//! 封装"我正在处理本次运行的第几篇论文"这一信息

use std::fmt::Display;

use tracing::debug;

/// 单篇论文的处理阶段
///
/// `Selected → ExtractionAttempted → GenerationAttempted → Persisted → Committed`，
/// 只有 `Persisted` / `Committed` 两步的失败会让这篇论文失败
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStage {
    Selected,
    ExtractionAttempted,
    GenerationAttempted { fallback: bool },
    Persisted,
    Committed,
}

/// 评审处理上下文
#[derive(Debug, Clone)]
pub struct ReviewCtx {
    /// 本次运行中的序号（从1开始，也用于文件名）
    pub seq: usize,

    /// 本次运行的目标数量
    pub total: usize,

    stage: ReviewStage,

    /// 生成接口是否成功返回（用于调用节流）
    generated: bool,
}

impl ReviewCtx {
    pub fn new(seq: usize, total: usize) -> Self {
        Self {
            seq,
            total,
            stage: ReviewStage::Selected,
            generated: false,
        }
    }

    pub fn stage(&self) -> ReviewStage {
        self.stage
    }

    pub fn advance(&mut self, stage: ReviewStage) {
        debug!("{} 阶段: {:?} → {:?}", self, self.stage, stage);
        if let ReviewStage::GenerationAttempted { fallback } = stage {
            self.generated = !fallback;
        }
        self.stage = stage;
    }

    /// 本篇论文是否真正调用成功了生成接口
    pub fn generation_succeeded(&self) -> bool {
        self.generated
    }
}

impl Display for ReviewCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[论文 {}/{}]", self.seq, self.total)
    }
}
