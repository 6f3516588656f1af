//! DOM extraction over serialized page HTML.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub const NO_TITLE: &str = "No title";

/// A rendered post on the social search page
pub const POST_SELECTOR: &str = r#"article[data-testid="tweet"]"#;

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

lazy_static! {
    static ref ARTICLE: Selector = Selector::parse("article").unwrap();
    static ref BODY: Selector = Selector::parse("body").unwrap();
    static ref HEADING: Selector = Selector::parse("h3").unwrap();
    static ref POST: Selector = Selector::parse(POST_SELECTOR).unwrap();
    static ref POST_TEXT: Selector = Selector::parse(r#"[data-testid="tweetText"]"#).unwrap();
    static ref POST_AUTHOR: Selector = Selector::parse(r#"[data-testid="User-Name"]"#).unwrap();
    static ref POST_LINK: Selector = Selector::parse(r#"a[href*="/status/"]"#).unwrap();
}

/// A result heading and the absolute URL of the link around it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLink {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialPost {
    pub author: String,
    pub text: String,
    pub link: String,
}

fn push_collapsed(out: &mut String, text: &str) {
    let mut last_was_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_TAGS.contains(&name) {
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                out.push('\n');
            }
            collect_text(child_element, out);
            if block {
                out.push('\n');
            }
        } else if let Some(text) = child.value().as_text() {
            push_collapsed(out, text);
        }
    }
}

/// Rendered text of `element`: scripts and styles dropped, one line per
/// block element, whitespace collapsed.
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn single_line(element: ElementRef<'_>) -> String {
    visible_text(element).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first `<article>`, or of the body when the page has none
pub fn main_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(&ARTICLE)
        .next()
        .or_else(|| document.select(&BODY).next())
        .map(visible_text)
        .unwrap_or_default()
}

/// Every `h3` inside a link, in document order. Headings outside a link are skipped.
pub fn result_links(html: &str, page_url: &Url) -> Vec<ResultLink> {
    let document = Html::parse_document(html);
    document
        .select(&HEADING)
        .filter_map(|heading| {
            let href = heading
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| el.value().name() == "a")
                .and_then(|anchor| anchor.value().attr("href"))?;
            let link = page_url.join(href).ok()?;

            let title = single_line(heading);
            Some(ResultLink {
                title: if title.is_empty() { NO_TITLE.to_string() } else { title },
                link: link.to_string(),
            })
        })
        .collect()
}

/// Every rendered post on a social search page
pub fn social_posts(html: &str, page_url: &Url) -> Vec<SocialPost> {
    let document = Html::parse_document(html);
    document
        .select(&POST)
        .map(|post| {
            let text_of = |selector: &Selector| {
                post.select(selector)
                    .next()
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .unwrap_or_default()
            };

            let link = post
                .select(&POST_LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| page_url.join(href).ok())
                .map(|url| url.to_string().replace("twitter.com", "x.com"))
                .unwrap_or_default();

            SocialPost {
                author: text_of(&POST_AUTHOR),
                text: text_of(&POST_TEXT),
                link,
            }
        })
        .collect()
}
