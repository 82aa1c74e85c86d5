// tests/metrics_ingest.rs
use intern_scout::ingest::output::CsvSink;
use intern_scout::ingest::providers::FixtureProvider;
use intern_scout::ingest::run_scan;
use intern_scout::{FilterPolicy, JobFilter, Listing, PayInterval, ScanSettings, SeenUrls};
use metrics_exporter_prometheus::PrometheusBuilder;

fn listing(n: u32, remote: bool) -> Listing {
    Listing {
        title: Some("Software Intern".into()),
        company: Some("Acme".into()),
        is_remote: Some(remote),
        min_amount: Some(35.0),
        interval: Some(PayInterval::Hourly),
        job_url: format!("https://jobs.example/Acme/{n}"),
        ..Default::default()
    }
}

#[tokio::test]
async fn metrics_exposed_after_scan() {
    // Install a local recorder for the test
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("recorder");

    let dir = tempfile::tempdir().unwrap();
    let filter = JobFilter::new(FilterPolicy::default()).unwrap();
    let mut sink = CsvSink::open(dir.path().join("out.csv")).unwrap();
    let mut seen = SeenUrls::in_memory();
    let provider = FixtureProvider::from_listings(vec![listing(1, true), listing(2, false)]);

    let report = run_scan(
        &provider,
        &["Acme".to_string()],
        &filter,
        &ScanSettings::unpaced(),
        &mut seen,
        &mut sink,
    )
    .await
    .unwrap();
    assert_eq!(report.total_written(), 1);

    // Scrape metrics text and check series presence by substring
    let out = handle.render();
    assert!(out.contains("scan_listings_total"));
    assert!(out.contains("scan_accepted_total"));
    assert!(out.contains(r#"scan_rejected_total{reason="not_remote"}"#));
    assert!(out.contains("scan_last_run_ts"));
}
