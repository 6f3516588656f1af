use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use scout_core::{Error, ImageUploader, InferenceModel, Prompt, Result, Thumbnail, TitledArticle, Titles};
use tracing::{info, warn};

const TITLES_SYSTEM_PROMPT: &str = "Generate 3 different engaging titles for the article. \
Each title should be unique and capture different aspects of the content. \
Format them as \"1. [First Title] 2. [Second Title] 3. [Third Title]\"";

const IMAGE_PROMPT_SYSTEM_PROMPT: &str = "Generate a short, descriptive prompt for an image model \
to create a thumbnail image based on the article content. The prompt should be concise and visual.";

pub const THUMBNAIL_FOLDER: &str = "article-thumbnails";

const PROMPT_FALLBACK_CHARS: usize = 200;

lazy_static! {
    // "1." / "12." at the start or after whitespace; years like "2024." do not match
    static ref TITLE_MARKER: Regex = Regex::new(r"(?:^|\s)\d{1,2}\.\s*").unwrap();
}

/// Rejects decimals like "3.5", where the dot runs straight into a digit
fn is_title_marker(text: &str, marker: &regex::Match<'_>) -> bool {
    !(marker.as_str().ends_with('.') && text[marker.end()..].starts_with(|c: char| c.is_ascii_digit()))
}

/// Split a numbered model answer like `1. A 2. B 3. C` into titles.
/// Answers without numbering are read one title per line.
pub fn parse_titles(text: &str) -> Vec<String> {
    let markers: Vec<_> = TITLE_MARKER
        .find_iter(text)
        .filter(|m| is_title_marker(text, m))
        .collect();

    let raw: Vec<&str> = if markers.is_empty() {
        text.lines().collect()
    } else {
        markers
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
                &text[m.end()..end]
            })
            .collect()
    };

    raw.into_iter()
        .map(clean_title)
        .filter(|title| !title.is_empty())
        .collect()
}

fn clean_title(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['"', '[', '*', '“'])
        .trim_end_matches(['"', ']', '*', '”'])
        .trim()
        .to_string()
}

/// Turns raw article text into a titled article with an uploaded thumbnail
pub struct ArticleComposer {
    model: Arc<dyn InferenceModel>,
    uploader: Arc<dyn ImageUploader>,
    folder: String,
}

impl fmt::Debug for ArticleComposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleComposer")
            .field("model", &self.model.name())
            .field("folder", &self.folder)
            .finish()
    }
}

impl ArticleComposer {
    pub fn new(model: Arc<dyn InferenceModel>, uploader: Arc<dyn ImageUploader>) -> Self {
        Self {
            model,
            uploader,
            folder: THUMBNAIL_FOLDER.to_string(),
        }
    }

    pub async fn generate_titles(&self, content: &str) -> Result<Titles> {
        let prompt = Prompt::new(
            TITLES_SYSTEM_PROMPT,
            format!("Generate three different titles for the following content:\n\n{}", content),
        )
        .with_max_tokens(100)
        .with_temperature(0.8);

        let answer = self
            .model
            .complete(&prompt)
            .await?
            .ok_or(Error::TitleGeneration)?;
        Ok(Titles::from_list(parse_titles(&answer)))
    }

    async fn generate_image_prompt(&self, content: &str, titles: &Titles) -> Result<String> {
        let prompt = Prompt::new(
            IMAGE_PROMPT_SYSTEM_PROMPT,
            format!("Generate an image prompt for this article content:\n\n{}", content),
        )
        .with_max_tokens(100);

        if let Some(text) = self.model.complete(&prompt).await? {
            return Ok(text);
        }

        warn!("⚠️ Empty image prompt, falling back to the article title");
        Ok(titles
            .get(1)
            .map(str::to_string)
            .unwrap_or_else(|| content.chars().take(PROMPT_FALLBACK_CHARS).collect()))
    }

    /// Titles, image prompt, image, upload. Any failed step fails the whole article.
    pub async fn compose(&self, content: &str) -> Result<TitledArticle> {
        info!("📝 Generating titles");
        let titles = self.generate_titles(content).await?;

        info!("🎨 Generating thumbnail prompt");
        let prompt = self.generate_image_prompt(content, &titles).await?;

        let image_url = self
            .model
            .generate_image(&prompt)
            .await?
            .ok_or(Error::ImageGeneration)?;

        info!("☁️ Uploading thumbnail to {}", self.folder);
        let uploaded = self.uploader.upload_remote(&image_url, &self.folder).await?;

        Ok(TitledArticle {
            content: content.to_string(),
            title_count: titles.len(),
            titles,
            created_at: Utc::now(),
            thumbnail: Thumbnail {
                url: uploaded.url,
                public_id: uploaded.public_id,
                prompt,
            },
        })
    }
}
