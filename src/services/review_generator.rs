//! 评审生成服务 - 业务能力层
//!
//! 只负责"为一篇论文写出评审文本"能力：拼提示词、调用生成接口、失败时兜底
//!
//! 生成失败不会向上抛错，总能返回一篇评审

use tracing::{debug, warn};

use crate::clients::GenerationBackend;
use crate::config::PromptLimits;
use crate::models::PaperRecord;
use crate::utils::logging::take_chars;

/// 固定的评审提示词模板
pub const REVIEW_PROMPT_TEMPLATE: &str = r#"## ROLE & PERSONA
You are a world-class Paper Reviewer for "GlitchIQ," an elite research collective composed of the world's foremost experts in AI Safety. Your reputation is built on providing insightful, rigorous, and impeccably structured reviews formatted for direct publication on your group's influential blog.

## TONE
- **Main Body:** Academic, professional, and largely positive. You appreciate novel contributions and solid research, explaining complex topics with clarity and authority.
- **Limitations Section:** Shift to a detached, sharply critical, and analytical tone. Your purpose here is not to be negative, but to be rigorously objective, identifying weaknesses with surgical precision.

## TASK
You are tasked with writing a comprehensive blog post review of a research paper. Your review must be written in English, fully formatted with Markdown, and ready for immediate publication. You will analyze the provided paper text, using the user-supplied summary as a guide to the paper's core focus.

## INPUTS
1.  **Paper Title:** `[Insert Paper Title Here]`
2.  **Short Summary:** `[Paste the short summary of the paper here]`
3.  **PDF Content:** The extracted text of the first pages of the paper.

---

## OUTPUT: BLOG POST REVIEW (MARKDOWN FORMATTED)

### **Instruction:** The entire output below MUST be formatted using Markdown. Use headings, subheadings, and bold text for emphasis. **Crucially, all sections must be written in continuous prose, using well-structured paragraphs. Do NOT use bullet points or numbered lists.** The goal is a formal, narrative-style blog post.

---

# [Create a Compelling, SEO-friendly Blog Title Here]

**_A GlitchIQ Critical Review_**

## Introduction: Setting the Stage
Hello, this is a paper reviewer from GlitchIQ, one of the world's leading groups in AI safety. The paper we will be reviewing today is **[Insert Paper Title Here]**.

In this review, we'll delve into its core proposal. The paper addresses the critical problem of [briefly state the problem based on the provided summary and PDF]. The authors aim to [state the paper's main objective].

## The Core Methodology
At the heart of this paper is a novel approach: [Explain the central methodology in a detailed paragraph]. This framework is designed to [explain the mechanism's purpose, elaborating on its key components and how they interact as part of a cohesive strategy].

## Key Strengths & Contributions
This research stands out for several reasons. We found its novelty and innovation particularly impressive, as the paper introduces a significant departure from prior work by [explain what is new and why it's a strength in a paragraph]. Furthermore, the empirical rigor is a notable strength. The experimental setup is robust, and the results presented offer compelling evidence for [mention the core claims, discussing the quality of the evidence]. Lastly, the authors do an excellent job of articulating a complex topic, making the research accessible and well-argued.

## Implications and Future Directions
The potential impact of this work is substantial. We believe it could pave the way for future research in [mention related areas]. Building on this foundation, future studies could explore [suggest and elaborate on a future research direction in a paragraph].

## Limitations
While this paper is a valuable contribution, a critical analysis requires acknowledging its limitations. A primary area for concern is the set of underlying assumptions the approach hinges on. For instance, the assumption that [mention a key assumption] may not hold true in all real-world scenarios. Additionally, we identified potential scalability concerns and certain unaddressed edge cases that [explain these limitations in a detailed, critical paragraph, connecting them to potential real-world failures].

## Final Verdict
In conclusion, **[Insert Paper Title Here]** is a significant and thought-provoking piece of research that pushes the boundaries of AI safety. Its innovative methodology and strong contributions offer a valuable new perspective. However, the identified limitations regarding its core assumptions and scalability require further investigation before widespread adoption. GlitchIQ will be watching the evolution of this research with great interest."#;

/// 评审来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSource {
    /// 生成接口返回
    Generated,
    /// 兜底模板
    Fallback,
}

/// 一篇评审
#[derive(Debug, Clone)]
pub struct GeneratedReview {
    pub text: String,
    pub source: ReviewSource,
}

/// 评审生成服务
pub struct ReviewGenerator<G> {
    backend: G,
    limits: PromptLimits,
}

impl<G: GenerationBackend> ReviewGenerator<G> {
    pub fn new(backend: G, limits: PromptLimits) -> Self {
        Self { backend, limits }
    }

    /// 生成评审，接口失败或返回异常时使用兜底模板
    pub async fn generate_review(&self, paper: &PaperRecord, document_text: &str) -> GeneratedReview {
        let prompt = build_prompt(paper, document_text, &self.limits);
        debug!(
            "提示词构建完成: {} 字符, 模型: {}",
            prompt.chars().count(),
            self.backend.model_name()
        );

        match self.backend.generate(&prompt).await {
            Ok(text) => GeneratedReview {
                text,
                source: ReviewSource::Generated,
            },
            Err(e) => {
                warn!("⚠️ 评审生成失败，使用兜底评审: {}", e);
                GeneratedReview {
                    text: fallback_review(paper, self.limits.fallback_summary_chars),
                    source: ReviewSource::Fallback,
                }
            }
        }
    }
}

/// 模板 + 标题 + 截断摘要 + 截断正文
pub fn build_prompt(paper: &PaperRecord, document_text: &str, limits: &PromptLimits) -> String {
    format!(
        "{template}\n\nPaper Title: {title}\n\nShort Summary: {summary}\n\nPDF Content (First 10 pages):\n{document}\n\nPlease write a comprehensive review following the format specified above.\n",
        template = REVIEW_PROMPT_TEMPLATE,
        title = paper.title,
        summary = take_chars(&paper.summary, limits.summary_chars),
        document = take_chars(document_text, limits.document_chars),
    )
}

/// 兜底评审：只使用标题和摘要，结果完全确定
pub fn fallback_review(paper: &PaperRecord, summary_chars: usize) -> String {
    let title = &paper.title;
    let summary = take_chars(&paper.summary, summary_chars);
    format!(
        r#"# Exploring New Frontiers in AI Safety: A Review of "{title}"

**_A GlitchIQ Critical Review_**

## Introduction: Setting the Stage
Hello, this is a paper reviewer from GlitchIQ, one of the world's leading groups in AI safety. The paper we will be reviewing today is **{title}**.

In this review, we'll delve into its core proposal. Based on the abstract, this work addresses important challenges in AI safety and alignment.

## Summary
{summary}

## Key Contributions
This paper makes several important contributions to the field of AI safety. The authors present novel approaches to addressing critical challenges in making AI systems more aligned and robust.

## Implications
The work has significant implications for the future development of safe AI systems and opens up new avenues for research in this critical area.

## Limitations
While this paper presents valuable contributions, further investigation is needed to fully understand the scalability and real-world applicability of the proposed approaches.

## Final Verdict
**{title}** represents an important contribution to the AI safety literature. The research advances our understanding of critical safety challenges and provides valuable insights for the community. GlitchIQ will continue to monitor developments in this area with great interest.

---
*Note: This is an automated preliminary review. A more detailed analysis would benefit from full API access.*
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;

    struct FixedBackend(Result<String, ()>);

    impl GenerationBackend for FixedBackend {
        fn model_name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.0.clone().map_err(|_| GenerationError::MalformedResponse {
                model: "fixed".to_string(),
            })
        }
    }

    fn paper() -> PaperRecord {
        PaperRecord::from_title("Jailbreaking LLMs")
            .unwrap()
            .with_summary("s".repeat(2000))
    }

    #[test]
    fn test_prompt_truncates_inputs() {
        let limits = PromptLimits::default();
        let prompt = build_prompt(&paper(), &"d".repeat(9000), &limits);

        assert!(prompt.starts_with("## ROLE & PERSONA"));
        assert!(prompt.contains("Paper Title: Jailbreaking LLMs"));
        assert!(prompt.contains(&format!("Short Summary: {}\n", "s".repeat(1000))));
        assert!(!prompt.contains(&"s".repeat(1001)));
        assert!(prompt.contains(&"d".repeat(8000)));
        assert!(!prompt.contains(&"d".repeat(8001)));
    }

    #[test]
    fn test_fallback_uses_only_title_and_summary() {
        let review = fallback_review(&paper(), 1500);
        assert!(review.contains(r#"A Review of "Jailbreaking LLMs""#));
        assert!(review.contains(&"s".repeat(1500)));
        assert!(!review.contains(&"s".repeat(1501)));
        // 确定性
        assert_eq!(review, fallback_review(&paper(), 1500));
    }

    #[tokio::test]
    async fn test_generated_review_passes_through() {
        let generator = ReviewGenerator::new(
            FixedBackend(Ok("# Generated".to_string())),
            PromptLimits::default(),
        );
        let review = generator.generate_review(&paper(), "").await;
        assert_eq!(review.source, ReviewSource::Generated);
        assert_eq!(review.text, "# Generated");
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back() {
        let generator = ReviewGenerator::new(FixedBackend(Err(())), PromptLimits::default());
        let review = generator.generate_review(&paper(), "text").await;
        assert_eq!(review.source, ReviewSource::Fallback);
        assert_eq!(review.text, fallback_review(&paper(), 1500));
    }
}
