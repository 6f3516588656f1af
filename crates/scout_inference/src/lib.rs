pub mod chunker;
pub mod composer;
pub mod models;
pub mod summarizer;
pub mod uploader;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct Config {
    /// `openai` or `dummy`
    pub backend: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub image_size: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: "openai".to_string(),
            api_key: None,
            base_url: OPENAI_API_URL.to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
        }
    }
}

pub mod prelude {
    pub use super::chunker::{chunk_text, chunk_tokens, count_tokens};
    pub use super::composer::ArticleComposer;
    pub use super::models::create_model;
    pub use super::summarizer::{SummaryBatch, Summarizer};
    pub use super::uploader::{create_uploader, CloudinaryConfig};
    pub use super::Config;
    pub use scout_core::{Error, InferenceModel, Result};
}

pub use composer::ArticleComposer;
pub use models::create_model;
pub use summarizer::{SummaryArticle, SummaryBatch, Summarizer};
pub use uploader::{create_uploader, CloudinaryConfig};
