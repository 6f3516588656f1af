use std::sync::Arc;

use async_trait::async_trait;
use scout_core::{ArticleStorage, Error, Result};

pub mod backends;

pub use backends::*;

#[async_trait]
pub trait StorageBackend: ArticleStorage + Sized {
    /// Message shown when the backend cannot be reached
    fn get_error_message() -> &'static str;

    /// Open the backend. `url` overrides the backend's default location.
    async fn connect(url: Option<&str>) -> Result<Self>;
}

/// Open the storage backend registered under `kind`.
pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Arc<dyn ArticleStorage>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStorage::connect(url).await?)),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let storage = SQLiteStorage::connect(url).await.map_err(|e| {
                Error::Storage(format!("{} ({})", SQLiteStorage::get_error_message(), e))
            })?;
            Ok(Arc::new(storage))
        }
        other => Err(Error::Storage(format!(
            "Unknown storage backend '{}'. Available: {}",
            other,
            available_backends().join(", ")
        ))),
    }
}

pub fn available_backends() -> Vec<&'static str> {
    let backends: &[&'static str] = &[
        "memory",
        #[cfg(feature = "sqlite")]
        "sqlite",
    ];
    backends.to_vec()
}

pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend};
}
