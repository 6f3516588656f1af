use async_trait::async_trait;
use crate::Result;

/// A single chat completion request: one system instruction, one user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 1000,
            temperature: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
pub trait InferenceModel: Send + Sync {
    /// Name of the backend, used in logs
    fn name(&self) -> &str;

    /// Run a chat completion. `None` when the model answered with no content.
    async fn complete(&self, prompt: &Prompt) -> Result<Option<String>>;

    /// Generate one image and return where it can be downloaded from
    async fn generate_image(&self, prompt: &str) -> Result<Option<String>>;
}
