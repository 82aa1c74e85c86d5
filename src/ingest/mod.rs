// src/ingest/mod.rs
pub mod output;
pub mod providers;
pub mod types;

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;

use crate::config::ScanSettings;
use crate::dedup::SeenUrls;
use crate::ingest::output::{CsvSink, OutputRow};
use crate::ingest::types::{Listing, ListingProvider};
use crate::policy::{Decision, JobFilter};

/// One-time metrics registration (so series show up in the exposition).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scan_listings_total", "Listings returned by the provider.");
        describe_counter!("scan_accepted_total", "Listings written to the output.");
        describe_counter!(
            "scan_rejected_total",
            "Listings rejected by the filter, by reason."
        );
        describe_counter!(
            "scan_duplicates_total",
            "Accepted listings dropped as already seen."
        );
        describe_counter!(
            "scan_provider_errors_total",
            "Provider search failures (treated as zero listings)."
        );
        describe_gauge!("scan_last_run_ts", "Unix ts when the scan last finished.");
    });
}

/// What happened to one employer's listings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployerOutcome {
    pub employer: String,
    pub found: usize,
    pub written: usize,
    pub duplicates: usize,
    pub rejected: BTreeMap<&'static str, usize>,
    pub error: Option<String>,
}

impl EmployerOutcome {
    fn new(employer: &str) -> Self {
        Self {
            employer: employer.to_string(),
            ..Default::default()
        }
    }

    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub employers: Vec<EmployerOutcome>,
}

impl ScanReport {
    pub fn employers_searched(&self) -> usize {
        self.employers.len()
    }

    pub fn total_written(&self) -> usize {
        self.employers.iter().map(|e| e.written).sum()
    }

    pub fn total_found(&self) -> usize {
        self.employers.iter().map(|e| e.found).sum()
    }

    pub fn total_duplicates(&self) -> usize {
        self.employers.iter().map(|e| e.duplicates).sum()
    }

    pub fn provider_errors(&self) -> usize {
        self.employers.iter().filter(|e| e.error.is_some()).count()
    }
}

/// Run the filter and the dedup gate over one employer's listings,
/// writing every accepted novel listing to `sink`.
pub fn process_listings(
    employer: &str,
    listings: &[Listing],
    filter: &JobFilter,
    seen: &mut SeenUrls,
    sink: &mut CsvSink,
) -> Result<EmployerOutcome> {
    let mut out = EmployerOutcome::new(employer);
    out.found = listings.len();
    counter!("scan_listings_total").increment(listings.len() as u64);

    for listing in listings {
        let eval = filter.evaluate(listing);
        match eval.decision {
            Decision::Rejected(reason) => {
                *out.rejected.entry(reason.as_str()).or_default() += 1;
                counter!("scan_rejected_total", "reason" => reason.as_str()).increment(1);
            }
            Decision::Accepted(path) => {
                if seen.contains(&listing.job_url) || listing.job_url.trim().is_empty() {
                    out.duplicates += 1;
                    counter!("scan_duplicates_total").increment(1);
                    continue;
                }
                // row is flushed before the url is recorded
                sink.write(&OutputRow::from_listing(listing, eval.is_remote))?;
                seen.admit(&listing.job_url)?;
                out.written += 1;
                counter!("scan_accepted_total").increment(1);
                tracing::info!(
                    target: "scan",
                    employer,
                    title = listing.title.as_deref().unwrap_or_default(),
                    url = %listing.job_url,
                    path = ?path,
                    rate = eval.normalized_rate,
                    "listing accepted"
                );
            }
        }
    }
    Ok(out)
}

/// Query the provider once per employer, in batches, with fixed pauses,
/// and append accepted novel listings to `sink`.
///
/// Provider errors are logged and counted as zero listings; only sink or
/// store write failures abort the scan.
pub async fn run_scan(
    provider: &dyn ListingProvider,
    employers: &[String],
    filter: &JobFilter,
    settings: &ScanSettings,
    seen: &mut SeenUrls,
    sink: &mut CsvSink,
) -> Result<ScanReport> {
    ensure_metrics_described();
    let started_at = Utc::now();
    let batch_size = settings.batch_size.max(1);
    let total = employers.len();
    let mut outcomes = Vec::with_capacity(total);

    for (batch_idx, batch) in employers.chunks(batch_size).enumerate() {
        let first = batch_idx * batch_size;
        tracing::info!(
            target: "scan",
            from = first + 1,
            to = first + batch.len(),
            total,
            "processing employer batch"
        );

        for employer in batch {
            let outcome = match provider.search(employer, &settings.constraints).await {
                Ok(listings) => {
                    process_listings(employer, &listings, filter, seen, sink)?
                }
                Err(e) => {
                    tracing::warn!(
                        target: "scan",
                        error = ?e,
                        provider = provider.name(),
                        employer = employer.as_str(),
                        "provider error"
                    );
                    counter!("scan_provider_errors_total").increment(1);
                    let mut o = EmployerOutcome::new(employer);
                    o.error = Some(format!("{e:#}"));
                    o
                }
            };

            tracing::info!(
                target: "scan",
                employer = employer.as_str(),
                found = outcome.found,
                written = outcome.written,
                duplicates = outcome.duplicates,
                rejected = outcome.rejected_total(),
                "employer searched"
            );
            outcomes.push(outcome);

            if !settings.employer_pause().is_zero() {
                tokio::time::sleep(settings.employer_pause()).await;
            }
        }

        let more = first + batch.len() < total;
        if more && !settings.batch_pause().is_zero() {
            tracing::debug!(target: "scan", "pausing between batches");
            tokio::time::sleep(settings.batch_pause()).await;
        }
    }

    let finished_at = Utc::now();
    gauge!("scan_last_run_ts").set(finished_at.timestamp().max(0) as f64);

    let report = ScanReport {
        started_at,
        finished_at,
        employers: outcomes,
    };
    tracing::info!(
        target: "scan",
        employers = report.employers_searched(),
        found = report.total_found(),
        written = report.total_written(),
        duplicates = report.total_duplicates(),
        provider_errors = report.provider_errors(),
        "scan complete"
    );
    Ok(report)
}
