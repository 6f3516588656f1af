use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use scout_core::{ArticleBatch, InferenceModel, Prompt, Result, UnifiedSummary};
use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::chunker::{chunk_text, DEFAULT_CHUNK_TOKENS};

const CHUNK_SYSTEM_PROMPT: &str = "Create a structured summary following these rules:
- Create 3-4 main sections with clear headings
- Each section should have exactly 5 lines of text
- Maintain a clear narrative flow
- Use proper paragraph formatting
- Each paragraph should be detailed and informative
- End each section with a clear conclusion";

const REDUCE_SYSTEM_PROMPT: &str = "Create a well-structured article with exactly:
- 3-4 main sections
- Each section must have a clear heading
- Each section must have exactly 5 lines of text
- Maintain professional tone and clear transitions
- Ensure each paragraph is substantive and complete
- Format should be: Heading, followed by 5 lines of text, then next heading";

const SUMMARY_MAX_TOKENS: u32 = 1000;
const SUMMARY_TEMPERATURE: f32 = 0.7;

/// One article as sent by clients in `allBatches`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryArticle {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A batch as sent by clients; everything except the articles is ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryBatch {
    #[serde(default)]
    pub articles: Vec<SummaryArticle>,
}

impl From<&ArticleBatch> for SummaryBatch {
    fn from(batch: &ArticleBatch) -> Self {
        Self {
            articles: batch
                .articles
                .iter()
                .map(|a| SummaryArticle {
                    title: a.title.clone(),
                    content: a.content.clone(),
                })
                .collect(),
        }
    }
}

/// Map-reduce summarization over approximate-token chunks
pub struct Summarizer {
    model: Arc<dyn InferenceModel>,
    max_tokens_per_chunk: usize,
}

impl fmt::Debug for Summarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Summarizer")
            .field("model", &self.model.name())
            .field("max_tokens_per_chunk", &self.max_tokens_per_chunk)
            .finish()
    }
}

impl Summarizer {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self::with_chunk_tokens(model, DEFAULT_CHUNK_TOKENS)
    }

    pub fn with_chunk_tokens(model: Arc<dyn InferenceModel>, max_tokens_per_chunk: usize) -> Self {
        Self {
            model,
            max_tokens_per_chunk,
        }
    }

    async fn summarize_chunk(&self, chunk: &str) -> Result<String> {
        let prompt = Prompt::new(
            CHUNK_SYSTEM_PROMPT,
            format!(
                "Analyze this content and create a structured summary with exactly 5 lines per paragraph:\n\n{}",
                chunk
            ),
        )
        .with_max_tokens(SUMMARY_MAX_TOKENS)
        .with_temperature(SUMMARY_TEMPERATURE);

        Ok(self.model.complete(&prompt).await?.unwrap_or_default())
    }

    /// Summarize every chunk concurrently, then merge the summaries with one
    /// more request when there is more than one.
    pub async fn summarize(&self, chunks: &[String]) -> Result<String> {
        info!("🤖 Summarizing {} chunks with {}", chunks.len(), self.model.name());

        let summaries = join_all(chunks.iter().map(|chunk| self.summarize_chunk(chunk)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        let joined = summaries.join("\n\n");
        if summaries.len() <= 1 {
            return Ok(joined);
        }

        info!("🔄 Combining {} chunk summaries", summaries.len());
        let prompt = Prompt::new(
            REDUCE_SYSTEM_PROMPT,
            format!(
                "Combine these summaries into a coherent article with 5-line paragraphs:\n\n{}",
                joined
            ),
        )
        .with_max_tokens(SUMMARY_MAX_TOKENS)
        .with_temperature(SUMMARY_TEMPERATURE);

        Ok(self.model.complete(&prompt).await?.unwrap_or(joined))
    }

    /// Summarize all articles of all batches into one summary record
    pub async fn summarize_batches(&self, batches: &[SummaryBatch]) -> Result<UnifiedSummary> {
        let article_count = batches.iter().map(|b| b.articles.len()).sum();
        let text = batches
            .iter()
            .flat_map(|b| b.articles.iter())
            .map(|a| format!("{}\n{}", a.title, a.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        let chunks = chunk_text(&text, self.max_tokens_per_chunk);
        let content = self.summarize(&chunks).await?;
        info!("✨ Summary generated from {} articles", article_count);

        Ok(UnifiedSummary {
            content,
            created_at: Utc::now(),
            original_batch_count: batches.len(),
            article_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scout_core::Error;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers chunk prompts with "S(<chunk>)" and records every user turn
    struct ScriptedModel {
        reduction: Option<String>,
        fail_on: Option<String>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(reduction: Option<&str>) -> Self {
            Self {
                reduction: reduction.map(str::to_string),
                fail_on: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InferenceModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &Prompt) -> Result<Option<String>> {
            self.seen.lock().unwrap().push(prompt.user.clone());
            let (_, body) = prompt.user.split_once("\n\n").unwrap();
            if prompt.system == REDUCE_SYSTEM_PROMPT {
                return Ok(self.reduction.clone());
            }
            if self.fail_on.as_deref() == Some(body) {
                return Err(Error::Inference("model unavailable".to_string()));
            }
            // later chunks finish first
            let delay = 30u64.saturating_sub(body.len() as u64);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(Some(format!("S({})", body)))
        }

        async fn generate_image(&self, _prompt: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    fn chunks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_single_chunk_skips_reduction() {
        let model = Arc::new(ScriptedModel::new(Some("merged")));
        let summarizer = Summarizer::new(model.clone());

        let summary = summarizer.summarize(&chunks(&["only"])).await.unwrap();
        assert_eq!(summary, "S(only)");
        assert_eq!(model.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reduction_receives_summaries_in_order() {
        let model = Arc::new(ScriptedModel::new(Some("merged")));
        let summarizer = Summarizer::new(model.clone());

        let summary = summarizer
            .summarize(&chunks(&["a", "bb", "ccc"]))
            .await
            .unwrap();
        assert_eq!(summary, "merged");

        let seen = model.seen.lock().unwrap();
        let reduction = seen.last().unwrap();
        assert!(reduction.ends_with("\n\nS(a)\n\nS(bb)\n\nS(ccc)"));
    }

    #[tokio::test]
    async fn test_empty_reduction_falls_back_to_joined_summaries() {
        let model = Arc::new(ScriptedModel::new(None));
        let summarizer = Summarizer::new(model);

        let summary = summarizer.summarize(&chunks(&["a", "bb"])).await.unwrap();
        assert_eq!(summary, "S(a)\n\nS(bb)");
    }

    #[tokio::test]
    async fn test_chunk_failure_propagates() {
        let mut model = ScriptedModel::new(Some("merged"));
        model.fail_on = Some("bb".to_string());
        let summarizer = Summarizer::new(Arc::new(model));

        let result = summarizer.summarize(&chunks(&["a", "bb"])).await;
        assert!(matches!(result, Err(Error::Inference(_))));
    }

    #[tokio::test]
    async fn test_summarize_batches_counts_articles() {
        let model = Arc::new(ScriptedModel::new(Some("merged")));
        let summarizer = Summarizer::with_chunk_tokens(model.clone(), 4);

        let batches = vec![
            SummaryBatch {
                articles: vec![
                    SummaryArticle {
                        title: "Bitcoin".to_string(),
                        content: "Price is $50k".to_string(),
                    },
                    SummaryArticle {
                        title: "Post by satoshi".to_string(),
                        content: "hodl".to_string(),
                    },
                ],
            },
            SummaryBatch { articles: vec![] },
        ];

        let summary = summarizer.summarize_batches(&batches).await.unwrap();
        assert_eq!(summary.original_batch_count, 2);
        assert_eq!(summary.article_count, 2);
        assert_eq!(summary.content, "merged");
        assert!(model.seen.lock().unwrap().len() > 2);
    }

    #[test]
    fn test_null_article_fields_read_as_empty() {
        let batch: SummaryBatch =
            serde_json::from_str(r#"{"articles":[{"title":"Bitcoin","content":null},{"title":null}]}"#).unwrap();
        assert_eq!(batch.articles.len(), 2);
        assert_eq!(batch.articles[0].title, "Bitcoin");
        assert_eq!(batch.articles[0].content, "");
        assert_eq!(batch.articles[1].title, "");
    }

    #[tokio::test]
    async fn test_batches_without_text_give_empty_summary() {
        let model = Arc::new(ScriptedModel::new(Some("merged")));
        let summarizer = Summarizer::new(model.clone());

        let summary = summarizer
            .summarize_batches(&[SummaryBatch::default()])
            .await
            .unwrap();
        assert_eq!(summary.content, "");
        assert!(model.seen.lock().unwrap().is_empty());
    }
}
