use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::client::YcClient;
use crate::config::ScraperConfig;
use crate::extract;
use crate::records::{CompanyRecord, FounderRecord};

/// Fetch each company's page concurrently and graft extracted founders onto
/// the records. A task that fails or finds nothing leaves the record as it
/// was. Returns how many founders came back with a profile URL.
pub async fn enrich_founders(
    client: &YcClient,
    cfg: &ScraperConfig,
    records: &mut [CompanyRecord],
) -> Result<usize> {
    let concurrency = cfg.concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let delay = Duration::from_millis(cfg.enrich_delay_ms);

    // Channel: workers send per-company results, main loop applies them
    let (tx, mut rx) =
        tokio::sync::mpsc::channel::<(usize, Vec<FounderRecord>)>(concurrency * 2);

    let mut submitted = 0usize;
    for (idx, company) in records.iter().enumerate() {
        let Some(slug) = company.slug.clone() else {
            continue;
        };
        submitted += 1;

        let client = client.clone();
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            let founders = match client.company_page_html(&slug).await {
                Ok(html) => extract::extract(&html, &slug).founders,
                Err(e) => {
                    warn!("enrichment failed for {}: {:#}", slug, e);
                    Vec::new()
                }
            };
            // Pace requests while still holding the permit
            tokio::time::sleep(delay).await;
            let _ = tx.send((idx, founders)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let pb = ProgressBar::new(submitted as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut with_profiles = 0usize;
    let mut updated = 0usize;
    while let Some((idx, founders)) = rx.recv().await {
        if !founders.is_empty() {
            with_profiles += founders.iter().filter(|f| f.has_profile_url()).count();
            records[idx].founders = founders;
            updated += 1;
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "enriched {} of {} companies ({} founder profiles)",
        updated, submitted, with_profiles
    );

    Ok(with_profiles)
}
