use std::path::Path;
use std::time::{Duration, Instant};

use paper_review_bot::clients::{ArxivClient, GenerationBackend, PaperSearch, SortOrder, TextExtractor};
use paper_review_bot::config::{Config, PromptLimits};
use paper_review_bot::error::GenerationError;
use paper_review_bot::services::candidate_pipeline::{assemble_pool, filter_unreviewed_from_file};
use paper_review_bot::services::review_writer::artifact_file_name;
use paper_review_bot::services::{ReviewGenerator, ReviewWriter, ReviewedStore};
use paper_review_bot::utils::logging;
use paper_review_bot::{PaperRecord, ReviewFlow, ReviewOrchestrator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

const TITLE_A: &str = "Jailbreak Attacks on Large Language Models";
const TITLE_B: &str = "Red Teaming LLM Agents for Harmful Behavior";
const TITLE_C: &str = "Alignment Failures in GPT Chat Models";

/// 固定返回正文的提取器
struct FakeExtractor;

impl TextExtractor for FakeExtractor {
    async fn extract(&self, _location: &str) -> String {
        "Extracted body text.".to_string()
    }
}

/// 提示词包含指定标题时失败，其余返回固定评审
struct FakeBackend {
    fail_for: &'static str,
}

impl GenerationBackend for FakeBackend {
    fn model_name(&self) -> &str {
        "fake-model"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if prompt.contains(&format!("Paper Title: {}", self.fail_for)) {
            return Err(GenerationError::MalformedResponse {
                model: "fake-model".to_string(),
            });
        }
        Ok("# Generated review".to_string())
    }
}

fn papers() -> Vec<PaperRecord> {
    [TITLE_A, TITLE_B, TITLE_C]
        .iter()
        .map(|title| {
            PaperRecord::from_title(title)
                .unwrap()
                .with_summary(format!("Summary of {}", title))
                .with_document_location("http://example.invalid/paper.pdf")
        })
        .collect()
}

/// 匹配所有提示词，让每篇论文都生成失败
const FAIL_ALL: &str = "";

fn orchestrator(
    run_dir: &Path,
    fail_for: &'static str,
) -> ReviewOrchestrator<FakeExtractor, FakeBackend> {
    paced_orchestrator(run_dir, fail_for, Duration::ZERO)
}

fn paced_orchestrator(
    run_dir: &Path,
    fail_for: &'static str,
    pacing_interval: Duration,
) -> ReviewOrchestrator<FakeExtractor, FakeBackend> {
    let generator = ReviewGenerator::new(FakeBackend { fail_for }, PromptLimits::default());
    let writer = ReviewWriter::new(run_dir, 100);
    let flow = ReviewFlow::new(FakeExtractor, generator, writer);
    ReviewOrchestrator::new(flow, pacing_interval)
}

/// 三篇论文、目标十篇、其中一篇生成失败：全部成功，一篇使用兜底评审
#[tokio::test]
async fn test_run_reviews_whole_short_pool() {
    logging::init(false);
    let tmp = TempDir::new().unwrap();
    let run_dir = tmp.path().join("run");
    std::fs::create_dir_all(&run_dir).unwrap();
    let store_path = tmp.path().join("reviewed_papers.txt");

    let mut store = ReviewedStore::load(&store_path).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let summary = orchestrator(&run_dir, TITLE_B)
        .run(&papers(), 10, &mut store, &mut rng)
        .await;

    assert_eq!(summary.requested, 10);
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed(), 0);
    assert_eq!(summary.fallbacks, 1);
    assert_eq!(summary.reviewed_total, 3);
    assert_eq!(summary.output_dir, run_dir);

    let artifacts = std::fs::read_dir(&run_dir).unwrap().count();
    assert_eq!(artifacts, 3);
    for path in &summary.artifacts {
        let content = std::fs::read_to_string(path).unwrap();
        assert!(
            content == "# Generated review" || content.contains(r#"A Review of "Red Teaming"#),
            "意外的评审内容: {}",
            content
        );
    }

    // 重新加载后三篇都已记录
    let reloaded = ReviewedStore::load(&store_path).unwrap();
    for title in [TITLE_A, TITLE_B, TITLE_C] {
        assert!(reloaded.is_reviewed(title));
    }
}

/// 一篇论文写文件失败：其余两篇照常完成，失败的论文不会被记录
#[tokio::test]
async fn test_persist_failure_is_isolated() {
    logging::init(false);
    let tmp = TempDir::new().unwrap();
    let run_dir = tmp.path().join("run");
    let store_path = tmp.path().join("reviewed_papers.txt");

    // B 无论排在第几位，目标文件路径都被同名目录占用
    for seq in 1..=3 {
        std::fs::create_dir_all(run_dir.join(artifact_file_name(seq, TITLE_B, 100))).unwrap();
    }

    let mut store = ReviewedStore::load(&store_path).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let summary = orchestrator(&run_dir, "no such paper")
        .run(&papers(), 3, &mut store, &mut rng)
        .await;

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.failures[0].identifier, TITLE_B);
    assert_eq!(summary.fallbacks, 0);

    assert!(!store.is_reviewed(TITLE_B));
    let reloaded = ReviewedStore::load(&store_path).unwrap();
    assert_eq!(reloaded.count(), 2);
    assert!(reloaded.is_reviewed(TITLE_A));
    assert!(reloaded.is_reviewed(TITLE_C));
    assert!(!reloaded.is_reviewed(TITLE_B));
}

/// 第二次运行不会再选中已评审的论文
#[tokio::test]
async fn test_second_run_skips_reviewed_papers() {
    logging::init(false);
    let tmp = TempDir::new().unwrap();
    let run_dir = tmp.path().join("run");
    std::fs::create_dir_all(&run_dir).unwrap();
    let store_path = tmp.path().join("reviewed_papers.txt");

    let mut store = ReviewedStore::load(&store_path).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let first = orchestrator(&run_dir, "no such paper")
        .run(&papers(), 2, &mut store, &mut rng)
        .await;
    assert_eq!(first.succeeded, 2);

    let pool = assemble_pool(papers(), store.reviewed());
    assert_eq!(pool.papers.len(), 1);
    assert!(!store.is_reviewed(&pool.papers[0].identifier));

    // 直接从记录文件过滤，结果一致
    let from_file = filter_unreviewed_from_file(papers(), &store_path).unwrap();
    assert_eq!(from_file, pool.papers);

    let second_dir = tmp.path().join("run2");
    std::fs::create_dir_all(&second_dir).unwrap();
    let second = orchestrator(&second_dir, "no such paper")
        .run(&pool.papers, 2, &mut store, &mut rng)
        .await;
    assert_eq!(second.attempted, 1);
    assert_eq!(second.reviewed_total, 3);
}

/// 每次生成都成功时，相邻两篇之间至少间隔一个节流周期
#[tokio::test]
async fn test_pacing_between_successful_generations() {
    logging::init(false);
    let tmp = TempDir::new().unwrap();
    let store_path = tmp.path().join("reviewed_papers.txt");
    let interval = Duration::from_millis(150);

    let mut store = ReviewedStore::load(&store_path).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let start = Instant::now();
    let summary = paced_orchestrator(tmp.path(), "no such paper", interval)
        .run(&papers(), 3, &mut store, &mut rng)
        .await;

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.fallbacks, 0);
    assert!(start.elapsed() >= interval * 2, "耗时 {:?}", start.elapsed());
}

/// 全部使用兜底评审时不等待
#[tokio::test]
async fn test_no_pacing_after_fallback_only_papers() {
    logging::init(false);
    let tmp = TempDir::new().unwrap();
    let store_path = tmp.path().join("reviewed_papers.txt");
    let interval = Duration::from_millis(500);

    let mut store = ReviewedStore::load(&store_path).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let start = Instant::now();
    let summary = paced_orchestrator(tmp.path(), FAIL_ALL, interval)
        .run(&papers(), 3, &mut store, &mut rng)
        .await;

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.fallbacks, 3);
    assert!(start.elapsed() < interval, "耗时 {:?}", start.elapsed());
}

/// 缺少 API 凭据时应用初始化失败
#[tokio::test]
async fn test_missing_credential_fails_fast() {
    let config = Config {
        gemini_api_key: None,
        ..Config::default()
    };
    let err = paper_review_bot::App::initialize(config).await.err().unwrap();
    assert!(err.to_string().contains("GEMINI_API_KEY"));
}

#[tokio::test]
#[ignore] // 默认忽略，需要网络：cargo test -- --ignored
async fn test_arxiv_search_live() {
    logging::init(true);
    let config = Config::default();
    let client = ArxivClient::new(&config).expect("创建 arXiv 客户端失败");

    let records = client
        .search("LLM safety", 5, SortOrder::MostRecent)
        .await
        .expect("arXiv 搜索失败");

    assert!(!records.is_empty(), "应该能搜索到论文");
    assert!(records.iter().all(|r| !r.identifier.is_empty()));
}
