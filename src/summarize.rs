use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::client::YcClient;
use crate::config::ScraperConfig;
use crate::extract;
use crate::records::{CompanyRecord, NOT_AVAILABLE};

// Hosted inference can be slow on a cold model, so leave generous room.
const MODEL_TIMEOUT: Duration = Duration::from_secs(60);

/// A seq2seq summarization backend. One call turns one input text into one
/// summary; chunking and hierarchy live in [`TextSummarizer`].
pub trait SummaryModel {
    async fn summarize(&self, text: &str, max_new_tokens: usize, min_length: usize)
        -> Result<String>;
}

/// Hosted inference endpoint speaking the `summarization` task protocol:
/// POST `{ "inputs": ... }`, receive `[{ "summary_text": ... }]`.
pub struct HfSummaryModel {
    http: Client,
    url: String,
    api_token: Option<String>,
}

impl HfSummaryModel {
    pub fn new(cfg: &ScraperConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(MODEL_TIMEOUT)
            .build()
            .context("failed to build summary model client")?;
        Ok(Self {
            http,
            url: format!(
                "{}/{}",
                cfg.summary_endpoint.trim_end_matches('/'),
                cfg.summary_model
            ),
            api_token: cfg.summary_api_token.clone(),
        })
    }
}

impl SummaryModel for HfSummaryModel {
    async fn summarize(
        &self,
        text: &str,
        max_new_tokens: usize,
        min_length: usize,
    ) -> Result<String> {
        let body = json!({
            "inputs": text,
            "parameters": {
                "max_new_tokens": max_new_tokens,
                "min_length": min_length,
                "do_sample": false,
            },
            "options": { "wait_for_model": true },
        });

        let mut request = self.http.post(&self.url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response: Value = request
            .send()
            .await
            .context("summary request failed")?
            .error_for_status()
            .context("summary model rejected the request")?
            .json()
            .await
            .context("malformed summary response")?;

        response
            .get(0)
            .and_then(|entry| entry.get("summary_text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("summary response carried no summary_text"))
    }
}

/// Chunking wrapper around a [`SummaryModel`]. Long texts are split on
/// whitespace into fixed word-count chunks, each chunk summarized, and the
/// joined partial summaries condensed once more.
pub struct TextSummarizer<M> {
    model: M,
    max_chunk_tokens: usize,
    max_new_tokens: usize,
    min_length: usize,
    min_input_chars: usize,
}

impl<M: SummaryModel> TextSummarizer<M> {
    pub fn new(model: M, cfg: &ScraperConfig) -> Self {
        Self {
            model,
            max_chunk_tokens: cfg.max_chunk_tokens.max(1),
            max_new_tokens: cfg.max_new_tokens,
            min_length: cfg.min_summary_length,
            min_input_chars: cfg.min_input_chars,
        }
    }

    pub async fn summarize(&self, text: &str) -> Result<String> {
        // Too short to bother the model; hand it back untouched.
        if text.trim().chars().count() < self.min_input_chars {
            return Ok(text.to_string());
        }

        let mut summaries = Vec::new();
        for chunk in chunk_words(text, self.max_chunk_tokens) {
            summaries.push(
                self.model
                    .summarize(&chunk, self.max_new_tokens, self.min_length)
                    .await?,
            );
        }

        if summaries.len() > 1 {
            let combined = summaries.join(" ");
            return self
                .model
                .summarize(&combined, self.max_new_tokens, self.min_length)
                .await;
        }

        Ok(summaries.pop().unwrap_or_else(|| text.to_string()))
    }
}

fn chunk_words(text: &str, max_tokens: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(max_tokens)
        .map(|chunk| chunk.join(" "))
        .collect()
}

/// Sequential pass over all records: pull the long description off each
/// company page, summarize it, and fall back to the one-liner when either
/// step comes up empty. Returns how many descriptions were summarized;
/// short ones pass through the summarizer unchanged and still count.
pub async fn summarize_companies<M: SummaryModel>(
    client: &YcClient,
    cfg: &ScraperConfig,
    summarizer: &TextSummarizer<M>,
    records: &mut [CompanyRecord],
) -> usize {
    let delay = Duration::from_millis(cfg.summary_delay_ms);

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut summarized = 0usize;
    for company in records.iter_mut() {
        let Some(slug) = company.slug.clone() else {
            pb.inc(1);
            continue;
        };

        let description = match client.company_page_html(&slug).await {
            Ok(html) => extract::extract(&html, &slug).description,
            Err(e) => {
                debug!("no page for {}: {:#}", slug, e);
                None
            }
        };

        match description {
            Some(text) => {
                company.long_description = Some(text.clone());
                match summarizer.summarize(&text).await {
                    Ok(summary) => {
                        company.summary = Some(summary);
                        summarized += 1;
                    }
                    Err(e) => {
                        warn!("summarization failed for {}: {:#}", slug, e);
                        company.summary = Some(one_liner_or_sentinel(company));
                    }
                }
            }
            None => {
                company.summary = Some(one_liner_or_sentinel(company));
            }
        }

        tokio::time::sleep(delay).await;
        pb.inc(1);
    }

    pb.finish_and_clear();
    summarized
}

fn one_liner_or_sentinel(company: &CompanyRecord) -> String {
    company
        .one_liner
        .clone()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Default)]
    struct StubModel {
        calls: AtomicUsize,
        inputs: Mutex<Vec<String>>,
    }

    impl StubModel {
        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SummaryModel for &StubModel {
        async fn summarize(
            &self,
            text: &str,
            _max_new_tokens: usize,
            _min_length: usize,
        ) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.inputs.lock().unwrap().push(text.to_string());
            Ok(format!("summary-{call}"))
        }
    }

    fn summarizer_with_chunk_budget<'a>(
        model: &'a StubModel,
        max_chunk_tokens: usize,
    ) -> TextSummarizer<&'a StubModel> {
        let cfg = ScraperConfig {
            max_chunk_tokens,
            ..ScraperConfig::default()
        };
        TextSummarizer::new(model, &cfg)
    }

    #[test]
    fn chunk_words_splits_on_budget() {
        let text = "one two three four five six seven";
        assert_eq!(chunk_words(text, 3), vec!["one two three", "four five six", "seven"]);
        assert_eq!(chunk_words(text, 100), vec![text.to_string()]);
        assert!(chunk_words("   ", 3).is_empty());
    }

    #[tokio::test]
    async fn short_text_is_returned_untouched() {
        let model = StubModel::default();
        let summarizer = summarizer_with_chunk_budget(&model, 900);

        let short = "Tiny description.";
        assert_eq!(summarizer.summarize(short).await.unwrap(), short);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn single_chunk_is_one_model_call() {
        let model = StubModel::default();
        let summarizer = summarizer_with_chunk_budget(&model, 900);

        let text = "word ".repeat(40);
        assert_eq!(summarizer.summarize(&text).await.unwrap(), "summary-1");
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn long_text_gets_hierarchical_pass() {
        let model = StubModel::default();
        let summarizer = summarizer_with_chunk_budget(&model, 10);

        // 35 words on a 10-word budget: four chunks plus the final pass.
        let text = "word ".repeat(35);
        assert_eq!(summarizer.summarize(&text).await.unwrap(), "summary-5");
        assert_eq!(model.call_count(), 5);

        let inputs = model.inputs.lock().unwrap();
        assert_eq!(inputs[4], "summary-1 summary-2 summary-3 summary-4");
    }

    #[tokio::test]
    async fn hf_model_speaks_the_task_protocol() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/t5-small"))
            .and(header("authorization", "Bearer secret-token"))
            .and(body_partial_json(serde_json::json!({
                "parameters": { "max_new_tokens": 120, "min_length": 40, "do_sample": false }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "summary_text": "A condensed description." }
            ])))
            .mount(&server)
            .await;

        let cfg = ScraperConfig {
            summary_endpoint: server.uri(),
            summary_model: "t5-small".into(),
            summary_api_token: Some("secret-token".into()),
            ..ScraperConfig::default()
        };
        let model = HfSummaryModel::new(&cfg).unwrap();
        let out = model.summarize("long enough text", 120, 40).await.unwrap();
        assert_eq!(out, "A condensed description.");
    }

    #[tokio::test]
    async fn hf_model_rejects_shapeless_responses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "error": "loading" })),
            )
            .mount(&server)
            .await;

        let cfg = ScraperConfig {
            summary_endpoint: server.uri(),
            summary_model: "t5-small".into(),
            ..ScraperConfig::default()
        };
        let model = HfSummaryModel::new(&cfg).unwrap();
        assert!(model.summarize("text", 120, 40).await.is_err());
    }

    #[tokio::test]
    async fn short_description_counts_without_model_call() {
        let server = MockServer::start().await;
        let page = r#"<html><body><div data-page="{&quot;props&quot;:{&quot;company&quot;:{&quot;long_description&quot;:&quot;Just a tiny workshop.&quot;}}}"></div></body></html>"#;
        Mock::given(method("GET"))
            .and(path("/companies/tiny"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let mut records = vec![CompanyRecord {
            slug: Some("tiny".into()),
            ..CompanyRecord::default()
        }];

        let cfg = ScraperConfig {
            site_base: server.uri(),
            summary_delay_ms: 0,
            ..ScraperConfig::default()
        };
        let client = YcClient::new(&cfg).unwrap();
        let model = StubModel::default();
        let summarizer = TextSummarizer::new(&model, &cfg);

        let summarized = summarize_companies(&client, &cfg, &summarizer, &mut records).await;

        assert_eq!(summarized, 1);
        assert_eq!(model.call_count(), 0);
        assert_eq!(records[0].summary.as_deref(), Some("Just a tiny workshop."));
        assert_eq!(
            records[0].long_description.as_deref(),
            Some("Just a tiny workshop.")
        );
    }

    #[tokio::test]
    async fn pass_fills_summary_and_long_description() {
        let server = MockServer::start().await;
        let long_words = "startup ".repeat(80);
        let page = format!(
            r#"<html><body><div data-page="{{&quot;props&quot;:{{&quot;company&quot;:{{&quot;long_description&quot;:&quot;{}&quot;}}}}}}"></div></body></html>"#,
            long_words.trim()
        );
        Mock::given(method("GET"))
            .and(path("/companies/described"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/companies/bare"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>nothing here</p></body></html>"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/companies/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut records = vec![
            CompanyRecord {
                slug: Some("described".into()),
                one_liner: Some("Builds startups.".into()),
                ..CompanyRecord::default()
            },
            CompanyRecord {
                slug: Some("bare".into()),
                one_liner: Some("Bare one-liner.".into()),
                ..CompanyRecord::default()
            },
            CompanyRecord {
                slug: Some("gone".into()),
                ..CompanyRecord::default()
            },
            CompanyRecord::default(),
        ];

        let cfg = ScraperConfig {
            site_base: server.uri(),
            summary_delay_ms: 0,
            ..ScraperConfig::default()
        };
        let client = YcClient::new(&cfg).unwrap();
        let model = StubModel::default();
        let summarizer = TextSummarizer::new(&model, &cfg);

        let summarized = summarize_companies(&client, &cfg, &summarizer, &mut records).await;

        assert_eq!(summarized, 1);
        assert_eq!(records[0].summary.as_deref(), Some("summary-1"));
        assert!(records[0]
            .long_description
            .as_deref()
            .is_some_and(|d| d.starts_with("startup startup")));
        assert_eq!(records[1].summary.as_deref(), Some("Bare one-liner."));
        assert!(records[1].long_description.is_none());
        assert_eq!(records[2].summary.as_deref(), Some("N/A"));
        assert!(records[3].summary.is_none());
    }
}
