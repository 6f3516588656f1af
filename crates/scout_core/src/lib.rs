pub mod error;
pub mod models;
pub mod storage;
pub mod types;
pub mod upload;

pub use error::{Error, Result};
pub use models::{InferenceModel, Prompt};
pub use storage::ArticleStorage;
pub use types::{
    batch_id, slugify, ArticleBatch, SearchResult, SourceKind, Stored, Thumbnail, TitledArticle,
    Titles, UnifiedSummary, UserInput,
};
pub use upload::{ImageUploader, UploadedImage};
