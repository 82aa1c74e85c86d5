// tests/scan_pipeline.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use intern_scout::ingest::output::CsvSink;
use intern_scout::ingest::providers::FixtureProvider;
use intern_scout::ingest::run_scan;
use intern_scout::{
    FilterPolicy, JobFilter, Listing, ListingProvider, PayInterval, ScanSettings,
    SearchConstraints, SeenUrls,
};
use std::path::Path;

fn listing(company: &str, n: u32, title: &str, remote: bool, rate: f64) -> Listing {
    Listing {
        title: Some(title.into()),
        company: Some(company.into()),
        location: Some("New York, NY".into()),
        is_remote: Some(remote),
        min_amount: Some(rate),
        interval: Some(PayInterval::Hourly),
        job_url: format!("https://jobs.example/{company}/{n}"),
        date_posted: Some("2026-10-01".into()),
        site: Some("indeed".into()),
        ..Default::default()
    }
}

fn fixture() -> FixtureProvider {
    FixtureProvider::from_listings(vec![
        listing("Acme", 1, "Software Intern", true, 35.0),
        listing("Acme", 2, "Software Intern", false, 35.0),
        listing("Acme", 3, "Senior Engineer", true, 90.0),
        listing("Globex", 1, "Data Science Internship", true, 40.0),
        listing("Globex", 2, "Data Science Internship", true, 12.0),
        listing("Google", 1, "Intern, SWE", true, 10.0),
    ])
}

fn employers() -> Vec<String> {
    vec!["Acme".into(), "Globex".into(), "Google".into(), "Umbrella".into()]
}

fn count_rows(path: &Path) -> usize {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.records().count()
}

async fn run_once(out: &Path, seen: &Path) -> intern_scout::ingest::ScanReport {
    let filter = JobFilter::new(FilterPolicy::default()).unwrap();
    let mut sink = CsvSink::open(out).unwrap();
    let mut seen = SeenUrls::open(seen).unwrap();
    run_scan(
        &fixture(),
        &employers(),
        &filter,
        &ScanSettings::unpaced(),
        &mut seen,
        &mut sink,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn accepted_listings_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");
    let report = run_once(&out, &dir.path().join("seen.txt")).await;

    assert_eq!(report.employers_searched(), 4);
    assert_eq!(report.total_found(), 6);
    assert_eq!(report.total_written(), 3);
    assert_eq!(count_rows(&out), 3);

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("https://jobs.example/Acme/1"));
    assert!(text.contains("https://jobs.example/Globex/1"));
    assert!(text.contains("https://jobs.example/Google/1"));
    assert!(!text.contains("https://jobs.example/Globex/2"));
}

#[tokio::test]
async fn rerun_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");
    let seen = dir.path().join("state").join("seen.txt");

    let first = run_once(&out, &seen).await;
    let rows_after_first = count_rows(&out);
    let second = run_once(&out, &seen).await;

    assert_eq!(first.total_written(), rows_after_first);
    assert_eq!(second.total_written(), 0);
    assert_eq!(second.total_duplicates(), rows_after_first);
    assert_eq!(count_rows(&out), rows_after_first);
}

struct FlakyProvider {
    inner: FixtureProvider,
}

#[async_trait]
impl ListingProvider for FlakyProvider {
    async fn search(&self, employer: &str, c: &SearchConstraints) -> Result<Vec<Listing>> {
        if employer == "Globex" {
            return Err(anyhow!("rate limited"));
        }
        self.inner.search(employer, c).await
    }
    fn name(&self) -> &'static str {
        "flaky"
    }
}

#[tokio::test]
async fn provider_error_skips_only_that_employer() {
    let dir = tempfile::tempdir().unwrap();
    let filter = JobFilter::new(FilterPolicy::default()).unwrap();
    let mut sink = CsvSink::open(dir.path().join("out.csv")).unwrap();
    let mut seen = SeenUrls::in_memory();
    let provider = FlakyProvider { inner: fixture() };

    let report = run_scan(
        &provider,
        &employers(),
        &filter,
        &ScanSettings::unpaced(),
        &mut seen,
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(report.provider_errors(), 1);
    let globex = &report.employers[1];
    assert_eq!(globex.employer, "Globex");
    assert_eq!(globex.found, 0);
    assert!(globex.error.as_deref().unwrap().contains("rate limited"));
    assert_eq!(report.total_written(), 2);
}

#[tokio::test]
async fn corrupt_seen_store_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let seen = dir.path().join("seen.txt");
    std::fs::write(&seen, [0xc3, 0x28, 0xa0, 0xa1]).unwrap();
    let report = run_once(&dir.path().join("out.csv"), &seen).await;
    assert_eq!(report.total_written(), 3);
}

struct RecordingProvider {
    calls: std::sync::Mutex<Vec<tokio::time::Instant>>,
}

#[async_trait]
impl ListingProvider for RecordingProvider {
    async fn search(&self, _employer: &str, _c: &SearchConstraints) -> Result<Vec<Listing>> {
        self.calls.lock().unwrap().push(tokio::time::Instant::now());
        Ok(Vec::new())
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

#[tokio::test(start_paused = true)]
async fn employers_are_paced_in_batches() {
    let dir = tempfile::tempdir().unwrap();
    let filter = JobFilter::new(FilterPolicy::default()).unwrap();
    let mut sink = CsvSink::open(dir.path().join("out.csv")).unwrap();
    let mut seen = SeenUrls::in_memory();
    let provider = RecordingProvider {
        calls: std::sync::Mutex::new(Vec::new()),
    };
    let settings = ScanSettings {
        batch_size: 3,
        pause_between_employers_ms: 2_000,
        pause_between_batches_ms: 5_000,
        ..ScanSettings::unpaced()
    };

    let start = tokio::time::Instant::now();
    let report = run_scan(
        &provider,
        &employers(),
        &filter,
        &settings,
        &mut seen,
        &mut sink,
    )
    .await
    .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.employers_searched(), 4);
    let offsets: Vec<u64> = provider
        .calls
        .lock()
        .unwrap()
        .iter()
        .map(|t| t.duration_since(start).as_secs())
        .collect();
    // employer pause after every call; batch pause only between batches
    assert_eq!(offsets, vec![0, 2, 4, 11]);
    assert_eq!(elapsed.as_secs(), 13);
}
