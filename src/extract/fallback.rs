use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::records::{FounderRecord, NOT_AVAILABLE};

const PROFILE_HOST: &str = "linkedin.com";
const MAX_ANCESTOR_HOPS: usize = 3;

/// Recover founders from page markup when the embedded payload gave nothing:
/// find LinkedIn links and guess a name from the text around each one. Best
/// effort only; names can be wrong or missing and titles are never recovered.
pub fn linkedin_founders(html: &str) -> Vec<FounderRecord> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").unwrap();

    let mut seen: HashSet<String> = HashSet::new();
    let mut founders = Vec::new();

    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !is_profile_link(href) {
            continue;
        }
        if !seen.insert(href.to_string()) {
            continue;
        }
        let Some(name) = guess_name(anchor) else {
            continue;
        };
        founders.push(FounderRecord {
            name,
            title: NOT_AVAILABLE.to_string(),
            linkedin_url: href.to_string(),
        });
    }

    founders
}

fn is_profile_link(href: &str) -> bool {
    Url::parse(href)
        .ok()
        .and_then(|url| {
            url.host_str()
                .map(|host| host == PROFILE_HOST || host.ends_with(".linkedin.com"))
        })
        .unwrap_or(false)
}

/// Walk up a few containing elements and take the first run of capitalized
/// words (at most two) as the name. Containers with fewer than two words of
/// text are skipped; they are usually bare icons or labels.
fn guess_name(anchor: ElementRef<'_>) -> Option<String> {
    for element in anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(MAX_ANCESTOR_HOPS)
    {
        let text = element.text().collect::<Vec<_>>().join(" ");
        if let Some(name) = capitalized_run(&text) {
            return Some(name);
        }
    }
    None
}

fn capitalized_run(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < 2 {
        return None;
    }

    let mut run: Vec<&str> = Vec::new();
    for word in words {
        if word.chars().next().is_some_and(char::is_uppercase) {
            run.push(word);
            if run.len() == 2 {
                break;
            }
        } else if !run.is_empty() {
            break;
        }
    }

    if run.is_empty() {
        None
    } else {
        Some(run.join(" "))
    }
}
