use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Timed out after {0:?}: {1}")]
    Timeout(std::time::Duration, String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Failed to generate titles")]
    TitleGeneration,

    #[error("Failed to generate image")]
    ImageGeneration,

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("A search for \"{0}\" is already running")]
    SearchInProgress(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_messages() {
        let err = Error::Timeout(Duration::from_secs(10), "https://x.com".to_string());
        assert_eq!(err.to_string(), "Timed out after 10s: https://x.com");

        let err = Error::SearchInProgress("bitcoin".to_string());
        assert_eq!(err.to_string(), "A search for \"bitcoin\" is already running");

        assert_eq!(Error::TitleGeneration.to_string(), "Failed to generate titles");
    }
}
