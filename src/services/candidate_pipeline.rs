//! 候选论文流水线 - 业务能力层
//!
//! 搜索 → 相关性过滤 → 按标识符去重 → 去掉已评审
//!
//! 顺序固定：相关性过滤最先执行以尽早缩小集合，已评审过滤在去重之后

use std::collections::HashSet;
use std::path::Path;

use phf::{phf_set, Set};
use tracing::{debug, info, warn};

use crate::clients::{PaperSearch, SortOrder};
use crate::error::{AppResult, SearchError};
use crate::models::PaperRecord;
use crate::services::ReviewedStore;

/// 安全类关键词（小写子串）
pub static SAFETY_TERMS: Set<&'static str> = phf_set! {
    "safety", "alignment", "harmful", "jailbreak", "adversarial",
    "attack", "robust", "secure", "toxic", "bias", "ethics",
    "responsible", "risk", "mitigation", "defense", "guardrail"
};

/// 语言模型类关键词（小写子串）
pub static LLM_TERMS: Set<&'static str> = phf_set! {
    "language model", "llm", "gpt", "chatbot", "transformer",
    "bert", "claude", "gemini", "llama", "foundation model"
};

/// 候选池及各阶段数量
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    pub papers: Vec<PaperRecord>,
    /// 搜索返回总数
    pub searched: usize,
    /// 通过相关性过滤的数量
    pub relevant: usize,
    /// 去重后数量
    pub unique: usize,
}

/// 候选论文流水线
pub struct CandidatePipeline<S> {
    searcher: S,
    queries: Vec<String>,
}

impl<S: PaperSearch> CandidatePipeline<S> {
    pub fn new(searcher: S, queries: Vec<String>) -> Self {
        Self { searcher, queries }
    }

    /// 对每个查询搜索 `max_results / 查询数` 条，按提交时间倒序，合并结果
    ///
    /// 单个查询失败只记录日志；全部失败时返回 `AllQueriesFailed`
    pub async fn search_candidates(&self, max_results: usize) -> AppResult<Vec<PaperRecord>> {
        if self.queries.is_empty() {
            warn!("⚠️ 没有配置搜索查询");
            return Ok(Vec::new());
        }

        let per_query = max_results / self.queries.len();
        let mut records = Vec::new();
        let mut failed = 0;

        for query in &self.queries {
            match self
                .searcher
                .search(query, per_query, SortOrder::MostRecent)
                .await
            {
                Ok(found) => {
                    debug!("查询 '{}' 返回 {} 条", query, found.len());
                    records.extend(found);
                }
                Err(e) => {
                    warn!("⚠️ 查询 '{}' 失败，跳过: {}", query, e);
                    failed += 1;
                }
            }
        }

        if failed == self.queries.len() {
            return Err(SearchError::AllQueriesFailed {
                query_count: failed,
            }
            .into());
        }

        Ok(records)
    }

    /// 构建候选池
    pub async fn build_pool(
        &self,
        max_results: usize,
        reviewed: &HashSet<String>,
    ) -> AppResult<CandidatePool> {
        info!("🔍 正在搜索 LLM 安全相关论文...");
        let searched = self.search_candidates(max_results).await?;
        Ok(assemble_pool(searched, reviewed))
    }
}

/// 从搜索结果组装候选池：相关性 → 去重 → 已评审过滤
pub fn assemble_pool(searched: Vec<PaperRecord>, reviewed: &HashSet<String>) -> CandidatePool {
    let searched_count = searched.len();
    let relevant: Vec<PaperRecord> = searched.into_iter().filter(is_relevant).collect();
    let relevant_count = relevant.len();
    let unique = dedupe_by_identifier(relevant);
    let unique_count = unique.len();
    let papers = filter_unreviewed(unique, reviewed);

    CandidatePool {
        papers,
        searched: searched_count,
        relevant: relevant_count,
        unique: unique_count,
    }
}

/// 标题 + 摘要（小写）中同时包含安全类和语言模型类关键词
pub fn is_relevant(record: &PaperRecord) -> bool {
    let text = format!("{} {}", record.title, record.summary).to_lowercase();
    let has_safety = SAFETY_TERMS.iter().any(|term| text.contains(term));
    let has_llm = LLM_TERMS.iter().any(|term| text.contains(term));
    has_safety && has_llm
}

/// 稳定去重，保留每个标识符第一次出现的记录
pub fn dedupe_by_identifier(records: Vec<PaperRecord>) -> Vec<PaperRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.identifier.clone()))
        .collect()
}

/// 去掉已评审的记录
pub fn filter_unreviewed(records: Vec<PaperRecord>, reviewed: &HashSet<String>) -> Vec<PaperRecord> {
    records
        .into_iter()
        .filter(|r| !reviewed.contains(&r.identifier))
        .collect()
}

/// 直接从记录文件读取已评审集合再过滤，不需要 store 实例
pub fn filter_unreviewed_from_file(
    records: Vec<PaperRecord>,
    reviewed_file: &Path,
) -> AppResult<Vec<PaperRecord>> {
    let reviewed = ReviewedStore::read_set(reviewed_file)?;
    Ok(filter_unreviewed(records, &reviewed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn paper(title: &str, summary: &str) -> PaperRecord {
        PaperRecord::from_title(title).unwrap().with_summary(summary)
    }

    /// 标识符和标题分开设置，用于去重测试
    fn paper_with_id(id: &str, title: &str) -> PaperRecord {
        let mut record = paper(title, "");
        record.identifier = id.to_string();
        record
    }

    fn titles(records: &[PaperRecord]) -> Vec<&str> {
        records.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_relevance_requires_both_categories() {
        assert!(is_relevant(&paper(
            "Jailbreaking Large Language Models via Adversarial Suffixes",
            ""
        )));
        // 只有安全类
        assert!(!is_relevant(&paper(
            "Robust Image Segmentation for Autonomous Driving",
            ""
        )));
        // 只有语言模型类
        assert!(!is_relevant(&paper(
            "Scaling Laws for LLM Pretraining",
            "We train larger models."
        )));
        assert!(!is_relevant(&paper("Protein Folding", "Nothing related.")));
    }

    #[test]
    fn test_relevance_checks_summary_case_insensitive() {
        assert!(is_relevant(&paper(
            "A New Benchmark",
            "We measure TOXIC outputs of GPT-4 chat assistants."
        )));
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let records = vec![
            paper_with_id("1", "A"),
            paper_with_id("2", "B"),
            paper_with_id("1", "C"),
        ];
        assert_eq!(titles(&dedupe_by_identifier(records)), vec!["A", "B"]);
    }

    #[test]
    fn test_filter_unreviewed() {
        let records = vec![paper_with_id("1", "A"), paper_with_id("2", "B")];
        let reviewed: HashSet<String> = ["1".to_string()].into_iter().collect();
        assert_eq!(titles(&filter_unreviewed(records, &reviewed)), vec!["B"]);
    }

    #[test]
    fn test_filter_unreviewed_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reviewed_papers.txt");

        let records = vec![paper("Paper A", ""), paper("Paper B", "")];
        // 文件不存在时不过滤
        let kept = filter_unreviewed_from_file(records.clone(), &path).unwrap();
        assert_eq!(kept.len(), 2);

        std::fs::write(&path, "# header\nPaper A\n").unwrap();
        let kept = filter_unreviewed_from_file(records, &path).unwrap();
        assert_eq!(titles(&kept), vec!["Paper B"]);
    }

    #[test]
    fn test_assemble_pool_order_of_stages() {
        let relevant_a = paper("LLM Jailbreak Study", "");
        let duplicate_a = paper("LLM Jailbreak Study", "").with_summary("x");
        let reviewed_b = paper("Red Teaming GPT Models", "safety");
        let irrelevant = paper("Graph Coloring", "");

        let searched = vec![
            relevant_a.clone(),
            duplicate_a,
            reviewed_b,
            irrelevant,
        ];
        let reviewed: HashSet<String> = ["Red Teaming GPT Models".to_string()]
            .into_iter()
            .collect();

        let pool = assemble_pool(searched, &reviewed);
        assert_eq!(pool.searched, 4);
        assert_eq!(pool.relevant, 3);
        assert_eq!(pool.unique, 2);
        assert_eq!(pool.papers, vec![relevant_a]);
    }

    /// 按查询返回预设结果的假搜索
    struct FakeSearch {
        calls: RefCell<Vec<(String, usize, SortOrder)>>,
        fail_queries: Vec<&'static str>,
    }

    impl PaperSearch for FakeSearch {
        async fn search(
            &self,
            query: &str,
            max_results: usize,
            sort: SortOrder,
        ) -> Result<Vec<PaperRecord>, SearchError> {
            self.calls
                .borrow_mut()
                .push((query.to_string(), max_results, sort));
            if self.fail_queries.contains(&query) {
                return Err(SearchError::AllQueriesFailed { query_count: 0 });
            }
            Ok(vec![paper(&format!("LLM safety: {}", query), "")])
        }
    }

    fn pipeline(fail_queries: Vec<&'static str>) -> CandidatePipeline<FakeSearch> {
        CandidatePipeline::new(
            FakeSearch {
                calls: RefCell::new(Vec::new()),
                fail_queries,
            },
            vec!["q1".to_string(), "q2".to_string(), "q3".to_string()],
        )
    }

    #[tokio::test]
    async fn test_search_splits_budget_across_queries() {
        let pipeline = pipeline(vec![]);
        let records = pipeline.search_candidates(100).await.unwrap();

        assert_eq!(records.len(), 3);
        let calls = pipeline.searcher.calls.borrow();
        assert_eq!(calls.len(), 3);
        assert!(calls
            .iter()
            .all(|(_, n, sort)| *n == 33 && *sort == SortOrder::MostRecent));
    }

    #[tokio::test]
    async fn test_partial_search_failure_is_tolerated() {
        let pipeline = pipeline(vec!["q2"]);
        let records = pipeline.search_candidates(30).await.unwrap();
        assert_eq!(titles(&records), vec!["LLM safety: q1", "LLM safety: q3"]);
    }

    #[tokio::test]
    async fn test_all_queries_failing_is_fatal() {
        let pipeline = pipeline(vec!["q1", "q2", "q3"]);
        let err = pipeline.search_candidates(30).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Search(SearchError::AllQueriesFailed { query_count: 3 })
        ));
    }
}
