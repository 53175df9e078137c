use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ScraperConfig;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// One page of search results. Hits stay untyped here; the directory layer
/// decides what to keep.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub hits: Vec<Value>,
    #[serde(default, rename = "nbHits")]
    pub nb_hits: usize,
}

/// HTTP front for both remote surfaces: the Algolia search index (POST) and
/// the public company pages (GET). Cheap to clone; clones share the
/// connection pool.
#[derive(Clone)]
pub struct YcClient {
    http: Client,
    search_url: String,
    site_base: String,
    app_id: String,
    api_key: String,
    search_timeout: Duration,
    page_timeout: Duration,
}

impl YcClient {
    pub fn new(cfg: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            search_url: cfg.search_url(),
            site_base: cfg.site_base.clone(),
            app_id: cfg.algolia_app_id.clone(),
            api_key: cfg.algolia_api_key.clone(),
            search_timeout: Duration::from_secs(cfg.search_timeout_secs),
            page_timeout: Duration::from_secs(cfg.page_timeout_secs),
        })
    }

    /// POST one query to the search index and decode the page envelope.
    pub async fn search_page(&self, page: usize, hits_per_page: usize) -> Result<SearchPage> {
        let body = json!({
            "query": "",
            "hitsPerPage": hits_per_page,
            "page": page,
            "tagFilters": ["ycdc_public"],
        });

        let response = self
            .http
            .post(&self.search_url)
            .header("X-Algolia-Application-Id", &self.app_id)
            .header("X-Algolia-API-Key", &self.api_key)
            .json(&body)
            .timeout(self.search_timeout)
            .send()
            .await
            .with_context(|| format!("search request for page {page} failed"))?
            .error_for_status()
            .with_context(|| format!("search index rejected page {page}"))?;

        response
            .json::<SearchPage>()
            .await
            .with_context(|| format!("malformed search response for page {page}"))
    }

    pub fn company_page_url(&self, slug: &str) -> String {
        format!("{}/companies/{}", self.site_base, slug)
    }

    /// GET a company page and return the raw HTML.
    pub async fn company_page_html(&self, slug: &str) -> Result<String> {
        let url = self.company_page_url(slug);
        let response = self
            .http
            .get(&url)
            .timeout(self.page_timeout)
            .send()
            .await
            .with_context(|| format!("request for {url} failed"))?
            .error_for_status()
            .with_context(|| format!("{url} returned an error status"))?;

        response
            .text()
            .await
            .with_context(|| format!("could not read body of {url}"))
    }
}
