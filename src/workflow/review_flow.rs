//! 评审处理流程 - 流程层
//!
//! 核心职责：定义"一篇论文"的完整处理流程
//!
//! 流程顺序：
//! 1. 提取 PDF 文本（失败 → 空文本）
//! 2. 生成评审（失败 → 兜底评审）
//! 3. 写入评审文件
//! 4. 记录为已评审
//!
//! 第 3 步失败时不会执行第 4 步

use std::path::PathBuf;

use tracing::info;

use crate::clients::{GenerationBackend, TextExtractor};
use crate::error::AppResult;
use crate::models::PaperRecord;
use crate::services::{ReviewGenerator, ReviewSource, ReviewWriter, ReviewedStore};
use crate::utils::truncate_text;
use crate::workflow::review_ctx::{ReviewCtx, ReviewStage};

/// 单篇论文的处理结果
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub artifact: PathBuf,
    pub source: ReviewSource,
}

/// 评审处理流程
///
/// - 编排单篇论文的处理流程
/// - 不持有已评审记录，调用时借用
/// - 只依赖业务能力（services / clients trait）
pub struct ReviewFlow<E, G> {
    extractor: E,
    generator: ReviewGenerator<G>,
    writer: ReviewWriter,
}

impl<E: TextExtractor, G: GenerationBackend> ReviewFlow<E, G> {
    pub fn new(extractor: E, generator: ReviewGenerator<G>, writer: ReviewWriter) -> Self {
        Self {
            extractor,
            generator,
            writer,
        }
    }

    pub fn writer(&self) -> &ReviewWriter {
        &self.writer
    }

    /// 处理单篇论文
    pub async fn process_one(
        &self,
        paper: &PaperRecord,
        ctx: &mut ReviewCtx,
        store: &mut ReviewedStore,
    ) -> AppResult<ReviewOutcome> {
        info!("{} 处理中: {}", ctx, truncate_text(&paper.title, 80));

        // ========== 1. 提取正文 ==========
        let document_text = self.extractor.extract(&paper.document_location).await;
        if document_text.is_empty() {
            info!("{} 未获得 PDF 正文，仅使用摘要", ctx);
        }
        ctx.advance(ReviewStage::ExtractionAttempted);

        // ========== 2. 生成评审 ==========
        let review = self.generator.generate_review(paper, &document_text).await;
        ctx.advance(ReviewStage::GenerationAttempted {
            fallback: review.source == ReviewSource::Fallback,
        });

        // ========== 3. 写入文件 ==========
        let artifact = self.writer.write(ctx.seq, &paper.title, &review.text).await?;
        ctx.advance(ReviewStage::Persisted);

        // ========== 4. 记录已评审 ==========
        store.mark_reviewed(&paper.identifier)?;
        ctx.advance(ReviewStage::Committed);

        Ok(ReviewOutcome {
            artifact,
            source: review.source,
        })
    }
}
