use std::time::Duration;

use tracing::{info, warn};

use crate::client::YcClient;
use crate::config::ScraperConfig;
use crate::records::CompanyRecord;

/// Page through the search index until `target_count` companies are collected
/// or the index runs out. Failures stop pagination but never abort the run;
/// whatever was accumulated so far is returned.
pub async fn fetch_companies(client: &YcClient, cfg: &ScraperConfig) -> Vec<CompanyRecord> {
    let per_page = cfg.hits_per_page.max(1);
    let delay = Duration::from_millis(cfg.page_delay_ms);

    let mut companies: Vec<CompanyRecord> = Vec::new();
    let mut page = 0usize;

    while companies.len() < cfg.target_count {
        let result = match client.search_page(page, per_page).await {
            Ok(result) => result,
            Err(e) => {
                warn!("stopping pagination: {:#}", e);
                break;
            }
        };

        if page == 0 && result.nb_hits > 0 {
            println!("Search index reports {} companies", result.nb_hits);
        }

        if result.hits.is_empty() {
            info!("no more companies after page {}", page);
            break;
        }

        let received = result.hits.len();
        for hit in result.hits {
            match CompanyRecord::from_hit(hit) {
                Ok(company) => companies.push(company),
                Err(e) => warn!("skipping malformed hit on page {}: {}", page, e),
            }
        }
        println!(
            "Fetched page {}: {} companies (total {})",
            page + 1,
            received,
            companies.len()
        );

        // A short page means the index is exhausted.
        if received < per_page || companies.len() >= cfg.target_count {
            break;
        }

        page += 1;
        tokio::time::sleep(delay).await;
    }

    companies.truncate(cfg.target_count);
    companies
}
