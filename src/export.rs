use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::records::{CompanyRecord, FounderRecord, NOT_AVAILABLE};

const CSV_HEADERS: [&str; 5] = [
    "Company Name",
    "Batch",
    "Short Description",
    "Founder Name",
    "Founder LinkedIn URL",
];

/// One CSV line: a (company, founder) pair, or a company alone with founder
/// columns set to the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    #[serde(rename = "Company Name")]
    pub company_name: String,
    #[serde(rename = "Batch")]
    pub batch: String,
    #[serde(rename = "Short Description")]
    pub short_description: String,
    #[serde(rename = "Founder Name")]
    pub founder_name: String,
    #[serde(rename = "Founder LinkedIn URL")]
    pub founder_linkedin_url: String,
}

/// Expand each company into one row per named founder. Companies with no
/// usable founder still get a row so they are never silently dropped.
pub fn flatten(records: &[CompanyRecord]) -> Vec<OutputRow> {
    let mut rows = Vec::new();

    for company in records {
        let company_name = company.display_name();
        let batch = company.batch_label();
        let short_description = company.short_description();

        let named: Vec<&FounderRecord> = company
            .founders
            .iter()
            .filter(|f| f.has_name())
            .collect();

        if named.is_empty() {
            rows.push(OutputRow {
                company_name,
                batch,
                short_description,
                founder_name: NOT_AVAILABLE.to_string(),
                founder_linkedin_url: NOT_AVAILABLE.to_string(),
            });
            continue;
        }

        for founder in named {
            rows.push(OutputRow {
                company_name: company_name.clone(),
                batch: batch.clone(),
                short_description: short_description.clone(),
                founder_name: founder.name.trim().to_string(),
                founder_linkedin_url: founder.linkedin_url.clone(),
            });
        }
    }

    rows
}

pub fn write_csv(rows: &[OutputRow], path: &str) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("could not create {path}"))?;

    // serialize() only emits headers alongside a first record.
    if rows.is_empty() {
        writer.write_record(CSV_HEADERS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("could not write {path}"))
}

/// Pretty-printed dump of everything the run collected, extras included.
pub fn write_raw_json(records: &[CompanyRecord], path: &str) -> Result<()> {
    let file = File::create(path).with_context(|| format!("could not create {path}"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .with_context(|| format!("could not serialize records to {path}"))?;
    writer
        .flush()
        .with_context(|| format!("could not write {path}"))
}

/// Dataset counts reported after the CSV is written.
pub struct ExportStats {
    pub rows: usize,
    pub companies: usize,
    pub founders: usize,
    pub linkedin_urls: usize,
    pub batches: usize,
}

impl ExportStats {
    pub fn from_rows(rows: &[OutputRow]) -> Self {
        let companies: HashSet<&str> = rows.iter().map(|r| r.company_name.as_str()).collect();
        let batches: HashSet<&str> = rows.iter().map(|r| r.batch.as_str()).collect();
        Self {
            rows: rows.len(),
            companies: companies.len(),
            founders: rows
                .iter()
                .filter(|r| r.founder_name != NOT_AVAILABLE)
                .count(),
            linkedin_urls: rows
                .iter()
                .filter(|r| r.founder_linkedin_url != NOT_AVAILABLE)
                .count(),
            batches: batches.len(),
        }
    }

    pub fn print(&self) {
        println!("Total rows:          {}", self.rows);
        println!("Unique companies:    {}", self.companies);
        println!("Founders listed:     {}", self.founders);
        println!("LinkedIn URLs found: {}", self.linkedin_urls);
        println!("Batches covered:     {}", self.batches);
    }
}
