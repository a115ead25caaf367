//! Article Fetcher Adapter
//!
//! Fetches an article page over HTTP and reduces it to plain text. No
//! retries within a cycle; any failure drops the item.

use async_trait::async_trait;
use scraper::{ElementRef, Html};

use crate::application::ports::{ArticleError, ArticleFetcherPort};

/// HTTP implementation of [`ArticleFetcherPort`].
#[derive(Debug, Clone)]
pub struct HttpArticleFetcher {
    client: reqwest::Client,
}

impl HttpArticleFetcher {
    /// Create a fetcher over a configured client.
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArticleFetcherPort for HttpArticleFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ArticleError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArticleError::Request {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ArticleError::Status {
                status: response.status().as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| ArticleError::Request {
            message: e.to_string(),
        })?;

        let text = strip_html(&html);
        if text.is_empty() {
            return Err(ArticleError::Empty);
        }
        Ok(text)
    }
}

/// Elements whose text is never page content.
const SKIPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Elements that separate words from their neighbours.
const BLOCK_TAGS: [&str; 14] = [
    "p", "div", "br", "li", "ul", "ol", "tr", "td", "th", "h1", "h2", "h3", "h4", "section",
];

/// Reduce HTML to whitespace-normalized text.
///
/// Inline elements are joined in place and block elements become a space,
/// so `(<a>NASDAQ</a>: ACME)` stays one token run. Entities are decoded
/// once by the parser; `<script>`/`<style>` contents are skipped.
#[must_use]
pub fn strip_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::with_capacity(html.len() / 2);
    collect_text(document.root_element(), &mut text);

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child) = ElementRef::wrap(child) {
            let name = child.value().name();
            if SKIPPED_TAGS.contains(&name) {
                continue;
            }
            let block = BLOCK_TAGS.contains(&name);
            if block {
                out.push(' ');
            }
            collect_text(child, out);
            if block {
                out.push(' ');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}
