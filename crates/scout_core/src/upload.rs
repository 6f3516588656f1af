use async_trait::async_trait;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Copy the image at `image_url` into the image host under `folder`
    async fn upload_remote(&self, image_url: &str, folder: &str) -> Result<UploadedImage>;
}
