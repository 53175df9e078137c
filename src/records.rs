use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Sentinel written wherever a field could not be resolved.
pub const NOT_AVAILABLE: &str = "N/A";

/// One company from the search index. Fields the pipeline reads or writes are
/// typed; everything else a hit carries rides along in `extra` so the raw
/// JSON backup loses nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_liner: Option<String>,
    /// Full description pulled from the company page during summarization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    /// Model-generated summary, or the one-liner when no page text exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub founders: Vec<FounderRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FounderRecord {
    pub name: String,
    pub title: String,
    pub linkedin_url: String,
}

impl FounderRecord {
    pub fn has_profile_url(&self) -> bool {
        self.linkedin_url != NOT_AVAILABLE
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Founder entries spell the name as `full_name`, `name`, or both, whether
/// they ride on a search hit or sit in an embedded page payload. Resolving
/// here keeps every source on the same rules.
impl<'de> Deserialize<'de> for FounderRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawFounder {
            full_name: Option<String>,
            name: Option<String>,
            title: Option<String>,
            linkedin_url: Option<String>,
        }

        let raw = RawFounder::deserialize(deserializer)?;
        Ok(FounderRecord {
            name: coalesce([raw.full_name.as_deref(), raw.name.as_deref()]),
            title: coalesce([raw.title.as_deref()]),
            linkedin_url: coalesce([raw.linkedin_url.as_deref()]),
        })
    }
}

impl CompanyRecord {
    pub fn from_hit(hit: Value) -> serde_json::Result<Self> {
        serde_json::from_value(hit)
    }

    pub fn display_name(&self) -> String {
        coalesce([self.name.as_deref()])
    }

    /// `batch_name` took over from `batch` in newer index records; accept both.
    pub fn batch_label(&self) -> String {
        coalesce([self.batch_name.as_deref(), self.batch.as_deref()])
    }

    pub fn short_description(&self) -> String {
        coalesce([self.summary.as_deref(), self.one_liner.as_deref()])
    }
}

/// First candidate that is non-empty after trimming, or the `N/A` sentinel.
pub fn coalesce<'a, I>(candidates: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coalesce_takes_first_non_empty() {
        assert_eq!(coalesce([Some("  "), Some("W21"), Some("S20")]), "W21");
        assert_eq!(coalesce([None, Some(" Winter 2021 ")]), "Winter 2021");
        assert_eq!(coalesce([None, Some("")]), "N/A");
    }

    #[test]
    fn hit_round_trips_unknown_fields() {
        let hit = json!({
            "name": "Airbnb",
            "slug": "airbnb",
            "batch": "W09",
            "one_liner": "Book accommodations around the world.",
            "team_size": 6132,
            "top_company": true,
            "regions": ["United States of America"],
        });
        let record = CompanyRecord::from_hit(hit).unwrap();
        assert_eq!(record.name.as_deref(), Some("Airbnb"));
        assert_eq!(record.slug.as_deref(), Some("airbnb"));
        assert_eq!(record.extra["team_size"], json!(6132));

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["top_company"], json!(true));
        assert_eq!(out["regions"][0], json!("United States of America"));
        // Empty founder lists stay out of the backup, matching the raw hit.
        assert!(out.get("founders").is_none());
    }

    #[test]
    fn hit_founders_resolve_full_name() {
        let record = CompanyRecord::from_hit(json!({
            "name": "Airbnb",
            "slug": "airbnb",
            "founders": [
                {
                    "full_name": "Brian Chesky",
                    "linkedin_url": "https://www.linkedin.com/in/brianchesky",
                },
                { "full_name": "   ", "name": "Joe Gebbia" },
            ],
        }))
        .unwrap();

        assert_eq!(record.founders[0].name, "Brian Chesky");
        assert_eq!(record.founders[0].title, "N/A");
        assert!(record.founders[0].has_profile_url());
        assert_eq!(record.founders[1].name, "Joe Gebbia");
        assert!(!record.founders[1].has_profile_url());
    }

    #[test]
    fn batch_label_prefers_batch_name() {
        let record = CompanyRecord {
            batch: Some("W12".into()),
            batch_name: Some("Winter 2012".into()),
            ..CompanyRecord::default()
        };
        assert_eq!(record.batch_label(), "Winter 2012");

        let record = CompanyRecord {
            batch: Some("W12".into()),
            ..CompanyRecord::default()
        };
        assert_eq!(record.batch_label(), "W12");
        assert_eq!(CompanyRecord::default().batch_label(), "N/A");
    }

    #[test]
    fn short_description_prefers_generated_summary() {
        let record = CompanyRecord {
            one_liner: Some("One liner.".into()),
            summary: Some("A longer generated summary.".into()),
            ..CompanyRecord::default()
        };
        assert_eq!(record.short_description(), "A longer generated summary.");

        let record = CompanyRecord {
            one_liner: Some("One liner.".into()),
            ..CompanyRecord::default()
        };
        assert_eq!(record.short_description(), "One liner.");
    }

    #[test]
    fn founder_missing_fields_become_sentinels() {
        let founder: FounderRecord = serde_json::from_value(json!({
            "name": "Jane Doe",
        }))
        .unwrap();
        assert_eq!(founder.name, "Jane Doe");
        assert_eq!(founder.title, "N/A");
        assert!(!founder.has_profile_url());
    }
}
