//! 应用生命周期 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源创建和一次完整运行。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：检查凭据、创建各客户端、加载已评审记录、创建输出目录
//! 2. **候选池构建**：搜索 → 相关性过滤 → 去重 → 排除已评审
//! 3. **评审运行**：委托 `ReviewOrchestrator` 抽样并逐篇处理
//! 4. **全局统计**：输出本次运行结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单篇论文的细节
//! - **资源所有者**：唯一持有已评审记录（`ReviewedStore`）的模块

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::clients::{ArxivClient, GeminiClient, PdfTextExtractor};
use crate::config::Config;
use crate::orchestrator::review_processor::{ReviewOrchestrator, RunSummary};
use crate::services::{CandidatePipeline, ReviewGenerator, ReviewWriter, ReviewedStore};
use crate::utils::logging::{log_pool_built, log_startup, print_final_stats};
use crate::workflow::ReviewFlow;

/// 应用主结构
pub struct App {
    config: Config,
    pipeline: CandidatePipeline<ArxivClient>,
    orchestrator: ReviewOrchestrator<PdfTextExtractor, GeminiClient>,
    store: ReviewedStore,
}

impl App {
    /// 初始化应用
    ///
    /// 缺少 API 凭据时在任何网络请求之前失败
    pub async fn initialize(config: Config) -> Result<Self> {
        let gemini = GeminiClient::new(&config)?;
        let arxiv = ArxivClient::new(&config).context("创建 arXiv 客户端失败")?;
        let extractor =
            PdfTextExtractor::new(&config.extraction).context("创建 PDF 下载客户端失败")?;

        let store = ReviewedStore::load(&config.reviewed_file)?;
        info!(
            "📚 已加载 {} 条已评审记录: {}",
            store.count(),
            store.path().display()
        );

        let run_dir = ReviewWriter::create_run_dir(&config.output_root)?;
        log_startup(&run_dir, config.num_reviews);

        let writer = ReviewWriter::new(run_dir, config.max_title_len);
        let generator = ReviewGenerator::new(gemini, config.prompt.clone());
        let flow = ReviewFlow::new(extractor, generator, writer);
        let orchestrator = ReviewOrchestrator::new(flow, config.pacing_interval());
        let pipeline = CandidatePipeline::new(arxiv, config.search_queries.clone());
        info!(
            "🔎 {} 个搜索查询，每个最多 {} 条结果",
            config.search_queries.len(),
            config.results_per_query()
        );

        Ok(Self {
            config,
            pipeline,
            orchestrator,
            store,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(mut self) -> Result<RunSummary> {
        let pool = self
            .pipeline
            .build_pool(self.config.max_results, self.store.reviewed())
            .await?;
        log_pool_built(pool.unique, pool.papers.len());

        if pool.papers.is_empty() {
            warn!("⚠️ 没有找到未评审的论文，程序结束");
        }

        let mut rng = match self.config.sample_seed {
            Some(seed) => {
                info!("🎲 使用固定随机种子: {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        let summary = self
            .orchestrator
            .run(&pool.papers, self.config.num_reviews, &mut self.store, &mut rng)
            .await;

        print_final_stats(
            summary.succeeded,
            summary.attempted,
            &summary.output_dir,
            summary.reviewed_total,
        );
        if summary.failed() > 0 {
            warn!("❌ 失败: {}", summary.failed());
            for failure in &summary.failures {
                warn!("  [论文 {}] {}: {}", failure.seq, failure.identifier, failure.error);
            }
        }

        Ok(summary)
    }
}
