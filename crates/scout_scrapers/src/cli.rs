use clap::Args;
use scout_core::{Result, SearchResult, SourceKind};

use crate::config::ScraperConfig;
use crate::manager::SearchManager;

/// Browser options shared by every command that scrapes
#[derive(Args, Debug, Clone)]
pub struct ScraperArgs {
    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Web result pages visited per search
    #[arg(long, default_value_t = 5)]
    pub pages: usize,

    /// Article pages fetched at once
    #[arg(long, default_value_t = 4)]
    pub fetch_concurrency: usize,
}

impl ScraperArgs {
    pub fn config(&self) -> ScraperConfig {
        ScraperConfig {
            headless: !self.headed,
            result_pages: self.pages,
            fetch_concurrency: self.fetch_concurrency,
            ..Default::default()
        }
    }
}

const PREVIEW_CHARS: usize = 80;

/// One line per result: source emoji, title, link and a content preview
pub fn render_results(results: &[SearchResult]) -> Vec<String> {
    results
        .iter()
        .map(|result| {
            let emoji = match result.source {
                SourceKind::Web => "🌐",
                SourceKind::Social => "🐦",
            };
            let preview: String = result
                .content
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .chars()
                .take(PREVIEW_CHARS)
                .collect();
            format!("{} {} - {}\n    {}", emoji, result.title, result.link, preview)
        })
        .collect()
}

pub async fn handle_search(manager: &SearchManager, query: &str) -> Result<()> {
    let results = manager.search(query).await?;
    if results.is_empty() {
        println!("No articles found");
        return Ok(());
    }

    println!("Found {} articles", results.len());
    for line in render_results(&results) {
        println!("{}", line);
    }
    Ok(())
}
