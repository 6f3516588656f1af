use std::fmt;

use scout_core::{InferenceModel, Prompt, Result};

const EXCERPT_WORDS: usize = 20;

/// Offline model: answers with the first words of the user turn.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<Option<String>> {
        // the instruction line comes before the first blank line
        let body = prompt
            .user
            .split_once("\n\n")
            .map(|(_, body)| body)
            .unwrap_or(&prompt.user);
        let words: Vec<&str> = body.split_whitespace().take(EXCERPT_WORDS).collect();
        if words.is_empty() {
            return Ok(None);
        }
        Ok(Some(words.join(" ")))
    }

    async fn generate_image(&self, prompt: &str) -> Result<Option<String>> {
        let text: String = prompt
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join("+");
        Ok(Some(format!("https://placehold.co/1024x1024?text={}", text)))
    }
}
