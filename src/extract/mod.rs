pub mod fallback;
pub mod payload;

use tracing::debug;

use crate::records::FounderRecord;

/// What a single company page yields.
#[derive(Debug, Default, PartialEq)]
pub struct PageData {
    /// Long-form description when the page carries one.
    pub description: Option<String>,
    pub founders: Vec<FounderRecord>,
}

/// Two-strategy extraction over raw page HTML. The embedded payload is the
/// source of truth; the markup heuristic only runs when the payload yields
/// no founders, and never contributes the description.
pub fn extract(html: &str, slug: &str) -> PageData {
    let parsed = payload::parse(html, slug);
    if !parsed.founders.is_empty() {
        return parsed;
    }

    let founders = fallback::linkedin_founders(html);
    if !founders.is_empty() {
        debug!(
            "recovered {} founder(s) for {} from page markup",
            founders.len(),
            slug
        );
    }

    PageData {
        description: parsed.description,
        founders,
    }
}
