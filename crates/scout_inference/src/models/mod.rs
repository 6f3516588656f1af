use std::sync::Arc;

use scout_core::{Error, Result};
pub use scout_core::InferenceModel;

use crate::Config;

pub mod dummy;
pub mod openai;

pub use dummy::DummyModel;
pub use openai::OpenAiModel;

/// Build the model backend named in `config.backend`.
pub fn create_model(config: &Config) -> Result<Arc<dyn InferenceModel>> {
    match config.backend.as_str() {
        "openai" => Ok(Arc::new(OpenAiModel::new(config)?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Inference(format!(
            "Unknown model backend '{}'. Available models: openai, dummy",
            other
        ))),
    }
}
