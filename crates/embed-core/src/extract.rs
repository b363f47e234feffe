//! Selector based text extraction.
//!
//! Documents are parsed with `scraper` (html5ever), so malformed markup is
//! repaired the way a browser would rather than rejected. Only the direct
//! text-node children of matched elements are collected; nested elements,
//! comments and processing instructions are skipped.

use scraper::{Html, Selector};
use tracing::debug;

/// Pulls text out of an HTML document.
pub trait Extract: Send + Sync {
    /// Trimmed direct text nodes of every element matching `selector`.
    ///
    /// Never fails: an unparsable selector yields an empty sequence. Empty
    /// strings left after trimming are kept.
    fn extract(&self, html: &str, selector: &str) -> Vec<String>;
}

/// [`Extract`] implementation backed by `scraper`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// Create an extractor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Extract for HtmlExtractor {
    fn extract(&self, html: &str, selector: &str) -> Vec<String> {
        let selector = match Selector::parse(selector) {
            Ok(selector) => selector,
            Err(err) => {
                debug!("Selector '{}' could not be parsed: {}", selector, err);
                return Vec::new();
            },
        };

        let document = Html::parse_document(html);
        document
            .select(&selector)
            .flat_map(|element| element.children())
            .filter_map(|node| node.value().as_text().map(|text| text.trim().to_string()))
            .collect()
    }
}

/// Join extracted pieces into a single value.
///
/// Empty pieces are dropped, the rest joined with `separator`, and the result
/// trimmed.
///
/// ```rust
/// use embed_core::extract::format_content;
///
/// let pieces = vec!["Hello".to_string(), String::new(), "World".to_string()];
/// assert_eq!(format_content(&pieces, " "), "Hello World");
/// assert_eq!(format_content(&[], " "), "");
/// ```
#[must_use]
pub fn format_content(pieces: &[String], separator: &str) -> String {
    pieces
        .iter()
        .map(String::as_str)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string()
}
