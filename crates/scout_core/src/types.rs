use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where a search result was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Web,
    Social,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Web => "web",
            SourceKind::Social => "social",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub content: String,
    pub source: SourceKind,
}

/// All results of one query, stored once per query and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleBatch {
    pub id: String,
    pub articles: Vec<SearchResult>,
    pub search_query: String,
    pub created_at: DateTime<Utc>,
    pub article_count: usize,
}

impl ArticleBatch {
    pub fn new(search_query: &str, articles: Vec<SearchResult>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: batch_id(search_query, created_at.date_naive()),
            article_count: articles.len(),
            articles,
            search_query: search_query.to_string(),
            created_at,
        }
    }
}

/// Lowercases `query` and turns every run of characters outside `[a-z0-9]`
/// into a single `-`, trimming dashes at both ends.
pub fn slugify(query: &str) -> String {
    let mut slug = String::with_capacity(query.len());
    for c in query.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// `<slug>-<YYYY-MM-DD>`, the identifier of the batch for `query` on `date`.
pub fn batch_id(query: &str, date: NaiveDate) -> String {
    format!("{}-{}", slugify(query), date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedSummary {
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub original_batch_count: usize,
    pub article_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    pub url: String,
    pub public_id: String,
    pub prompt: String,
}

/// Generated titles keyed `title1`, `title2`, ...
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Titles(BTreeMap<String, String>);

impl Titles {
    pub fn from_list<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            titles
                .into_iter()
                .enumerate()
                .map(|(i, title)| (format!("title{}", i + 1), title.into()))
                .collect(),
        )
    }

    pub fn get(&self, n: usize) -> Option<&str> {
        self.0.get(&format!("title{}", n)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitledArticle {
    pub content: String,
    #[serde(flatten)]
    pub titles: Titles,
    pub title_count: usize,
    pub created_at: DateTime<Utc>,
    pub thumbnail: Thumbnail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A record together with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: String,
    #[serde(flatten)]
    pub record: T,
}

impl<T> Stored<T> {
    pub fn new(id: impl Into<String>, record: T) -> Self {
        Self { id: id.into(), record }
    }
}
