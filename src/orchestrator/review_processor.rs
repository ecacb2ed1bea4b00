//! 评审批处理器 - 编排层
//!
//! ## 职责
//!
//! 从候选池中随机抽取若干篇论文，逐篇交给 `ReviewFlow` 处理。
//!
//! ## 核心功能
//!
//! 1. **随机抽样**：无放回均匀抽样，候选不足时缩小目标数量
//! 2. **顺序处理**：一次只处理一篇论文
//! 3. **失败隔离**：单篇失败只记录，不中断本次运行
//! 4. **调用节流**：两次成功的生成调用之间至少间隔 `pacing_interval`
//! 5. **统计输出**：尝试 / 成功 / 失败数量

use std::path::PathBuf;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::clients::{GenerationBackend, TextExtractor};
use crate::models::PaperRecord;
use crate::services::{ReviewSource, ReviewedStore};
use crate::workflow::{ReviewCtx, ReviewFlow};

/// 单篇失败记录
#[derive(Debug, Clone)]
pub struct ReviewFailure {
    pub seq: usize,
    pub identifier: String,
    pub error: String,
}

/// 运行统计
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// 请求的评审数量
    pub requested: usize,
    pub attempted: usize,
    pub succeeded: usize,
    /// 成功中使用兜底评审的数量
    pub fallbacks: usize,
    pub failures: Vec<ReviewFailure>,
    pub artifacts: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// 运行结束时累计已评审数量
    pub reviewed_total: usize,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// 无放回均匀抽取 `min(n, pool.len())` 篇
pub fn select_sample<R: Rng + ?Sized>(pool: &[PaperRecord], n: usize, rng: &mut R) -> Vec<PaperRecord> {
    if pool.len() < n {
        warn!(
            "⚠️ 只有 {} 篇未评审论文可用，目标数量调整为 {}",
            pool.len(),
            pool.len()
        );
    }
    let mut sample = pool.to_vec();
    sample.shuffle(rng);
    sample.truncate(n);
    sample
}

/// 生成调用节流器
struct Pacer {
    interval: Duration,
    last_call: Option<Instant>,
}

impl Pacer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: None,
        }
    }

    /// 距离上一次成功调用不足 `interval` 时等待
    async fn wait(&self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed).await;
            }
        }
    }

    fn record_call(&mut self) {
        self.last_call = Some(Instant::now());
    }
}

/// 评审编排器
pub struct ReviewOrchestrator<E, G> {
    flow: ReviewFlow<E, G>,
    pacing_interval: Duration,
}

impl<E: TextExtractor, G: GenerationBackend> ReviewOrchestrator<E, G> {
    pub fn new(flow: ReviewFlow<E, G>, pacing_interval: Duration) -> Self {
        Self {
            flow,
            pacing_interval,
        }
    }

    /// 抽样并逐篇处理
    pub async fn run<R: Rng + ?Sized>(
        &self,
        pool: &[PaperRecord],
        n: usize,
        store: &mut ReviewedStore,
        rng: &mut R,
    ) -> RunSummary {
        let selected = select_sample(pool, n, rng);
        let total = selected.len();
        let mut pacer = Pacer::new(self.pacing_interval);
        let mut summary = RunSummary {
            requested: n,
            output_dir: self.flow.writer().run_dir().to_path_buf(),
            ..Default::default()
        };

        for (index, paper) in selected.iter().enumerate() {
            let mut ctx = ReviewCtx::new(index + 1, total);
            pacer.wait().await;
            summary.attempted += 1;

            let result = self.flow.process_one(paper, &mut ctx, store).await;
            if ctx.generation_succeeded() {
                pacer.record_call();
            }

            match result {
                Ok(outcome) => {
                    info!(
                        "{} ✓ 评审已保存: {}",
                        ctx,
                        outcome
                            .artifact
                            .file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                    );
                    if outcome.source == ReviewSource::Fallback {
                        summary.fallbacks += 1;
                    }
                    summary.succeeded += 1;
                    summary.artifacts.push(outcome.artifact);
                }
                Err(e) => {
                    error!("{} ✗ 处理失败 (阶段: {:?}): {}", ctx, ctx.stage(), e);
                    summary.failures.push(ReviewFailure {
                        seq: ctx.seq,
                        identifier: paper.identifier.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary.reviewed_total = store.count();
        summary
    }
}
