use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::extract::PageData;
use crate::records::FounderRecord;

// Company pages ship their state as an entity-escaped JSON blob in a
// `data-page` attribute. The first pattern targets a payload that actually
// carries founder data; the second takes whatever payload is there.
static FOUNDERS_PAYLOAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-page="([^"]*&quot;founders&quot;[^"]*)""#).unwrap());
static ANY_PAYLOAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-page="([^"]*)""#).unwrap());

/// Pull description and founders out of the embedded page payload.
/// Returns an empty `PageData` when there is no payload or it does not parse.
pub fn parse(html: &str, slug: &str) -> PageData {
    let raw = match FOUNDERS_PAYLOAD_RE
        .captures(html)
        .or_else(|| ANY_PAYLOAD_RE.captures(html))
    {
        Some(caps) => caps[1].to_string(),
        None => return PageData::default(),
    };

    let page: Value = match serde_json::from_str(&unescape_entities(&raw)) {
        Ok(v) => v,
        Err(e) => {
            debug!("embedded payload for {} is not valid JSON: {}", slug, e);
            return PageData::default();
        }
    };

    let Some(company) = page.get("props").and_then(|p| p.get("company")) else {
        debug!("embedded payload for {} has no company props", slug);
        return PageData::default();
    };

    let description = string_field(company, "long_description")
        .or_else(|| string_field(company, "description"));

    let founders = company
        .get("founders")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| FounderRecord::deserialize(entry).ok())
                .collect()
        })
        .unwrap_or_default();

    PageData {
        description,
        founders,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Reverse the attribute escaping. Order matters: `&amp;quot;` must end up
/// as `&quot;`, not a double-unescaped quote.
fn unescape_entities(raw: &str) -> String {
    raw.replace("&quot;", "\"").replace("&amp;", "&")
}
