use config::{Config, Environment};
use serde::Deserialize;
use tracing::warn;

// Public search credentials embedded in the YC directory frontend. The key is
// index- and tag-restricted on the Algolia side.
const ALGOLIA_APP_ID: &str = "45BWZJ1SGC";
const ALGOLIA_API_KEY: &str = "MjBjYjRiMzY0NzdhZWY0NjExY2NhZjYxMGIxYjc2MTAwNWFkNTkwNTc4NjgxYjU0YzFhYTY2ZGQ5OGY5NDMxZnJlc3RyaWN0SW5kaWNlcz0lNUIlMjJZQ0NvbXBhbnlfcHJvZHVjdGlvbiUyMiUyQyUyMllDQ29tcGFueV9CeV9MYXVuY2hfRGF0ZV9wcm9kdWN0aW9uJTIyJTVEJnRhZ0ZpbHRlcnM9JTVCJTIyeWNkY19wdWJsaWMlMjIlNUQmYW5hbHl0aWNzVGFncz0lNUIlMjJ5Y2RjJTIyJTVE";
const ALGOLIA_INDEX: &str = "YCCompany_production";
const YC_BASE_URL: &str = "https://www.ycombinator.com";

const HF_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";
const SUMMARY_MODEL: &str = "facebook/bart-large-cnn";

/// Runtime settings. Every field can be overridden through the environment
/// with a `YC_` prefix (`YC_TARGET_COUNT=1000`, `YC_CONCURRENCY=8`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub algolia_app_id: String,
    pub algolia_api_key: String,
    pub algolia_index: String,
    /// Full search endpoint override. When unset the endpoint is derived
    /// from the app id and index; tests point this at a local server.
    pub search_endpoint: Option<String>,
    pub site_base: String,

    /// How many companies to collect before stopping pagination.
    pub target_count: usize,
    pub hits_per_page: usize,
    /// Concurrent company-page fetches during founder enrichment.
    pub concurrency: usize,

    pub page_delay_ms: u64,
    pub enrich_delay_ms: u64,
    pub summary_delay_ms: u64,
    pub search_timeout_secs: u64,
    pub page_timeout_secs: u64,

    pub summary_endpoint: String,
    pub summary_model: String,
    pub summary_api_token: Option<String>,
    /// Whitespace-token budget per chunk sent to the summary model.
    pub max_chunk_tokens: usize,
    pub max_new_tokens: usize,
    pub min_summary_length: usize,
    /// Descriptions shorter than this are kept as-is.
    pub min_input_chars: usize,

    pub csv_path: String,
    pub raw_json_path: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            algolia_app_id: ALGOLIA_APP_ID.into(),
            algolia_api_key: ALGOLIA_API_KEY.into(),
            algolia_index: ALGOLIA_INDEX.into(),
            search_endpoint: None,
            site_base: YC_BASE_URL.into(),
            target_count: 500,
            hits_per_page: 100,
            concurrency: 5,
            page_delay_ms: 300,
            enrich_delay_ms: 200,
            summary_delay_ms: 200,
            search_timeout_secs: 15,
            page_timeout_secs: 10,
            summary_endpoint: HF_INFERENCE_BASE.into(),
            summary_model: SUMMARY_MODEL.into(),
            summary_api_token: None,
            max_chunk_tokens: 900,
            max_new_tokens: 120,
            min_summary_length: 40,
            min_input_chars: 50,
            csv_path: "yc_startups.csv".into(),
            raw_json_path: "yc_startups_raw.json".into(),
        }
    }
}

impl ScraperConfig {
    pub fn search_url(&self) -> String {
        match &self.search_endpoint {
            Some(url) => url.clone(),
            None => format!(
                "https://{}-dsn.algolia.net/1/indexes/{}/query",
                self.algolia_app_id, self.algolia_index
            ),
        }
    }
}

/// Load settings from `YC_*` environment variables on top of the defaults.
/// A malformed environment never aborts the run; it logs and falls back.
pub fn load() -> ScraperConfig {
    let loaded = Config::builder()
        .add_source(Environment::with_prefix("YC").try_parsing(true))
        .build()
        .and_then(|settings| settings.try_deserialize());
    match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("could not read environment overrides ({}), using defaults", e);
            ScraperConfig::default()
        }
    }
}
