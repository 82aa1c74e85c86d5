// src/ingest/providers/fixture.rs
//! Offline provider backed by a JSON array or JSON-lines file of listings.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

use crate::ingest::types::{Listing, ListingProvider, SearchConstraints};

pub struct FixtureProvider {
    listings: Vec<Listing>,
}

impl FixtureProvider {
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture listings from {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Accepts a JSON array or one JSON object per line.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        if s.trim_start().starts_with('[') {
            let listings: Vec<Listing> =
                serde_json::from_str(s).context("parsing fixture JSON array")?;
            return Ok(Self::from_listings(listings));
        }
        let mut listings = Vec::new();
        for (i, line) in s.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let l: Listing = serde_json::from_str(line)
                .with_context(|| format!("parsing fixture line {}", i + 1))?;
            listings.push(l);
        }
        Ok(Self::from_listings(listings))
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[async_trait]
impl ListingProvider for FixtureProvider {
    async fn search(
        &self,
        employer: &str,
        constraints: &SearchConstraints,
    ) -> Result<Vec<Listing>> {
        let needle = employer.trim().to_lowercase();
        let out = self
            .listings
            .iter()
            .filter(|l| {
                l.company
                    .as_deref()
                    .is_some_and(|c| !needle.is_empty() && c.to_lowercase().contains(&needle))
            })
            .take(constraints.results_wanted as usize)
            .cloned()
            .collect();
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn jsonl_fixture_filters_by_company() {
        let jsonl = r#"
{"title": "Intern", "company": "Acme Corp", "job_url": "https://a/1", "interval": "HOURLY"}
{"title": "Intern", "company": "Globex", "job_url": "https://g/1", "interval": "per diem"}
"#;
        let p = FixtureProvider::from_str(jsonl).unwrap();
        assert_eq!(p.len(), 2);
        let hits = p.search("acme", &SearchConstraints::default()).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].interval, Some(crate::salary::PayInterval::Hourly));

        let globex = p.search("Globex", &SearchConstraints::default()).await.unwrap();
        assert_eq!(globex[0].interval, None);
    }

    #[tokio::test]
    async fn results_wanted_caps_output() {
        let listings = (0..5)
            .map(|i| Listing {
                company: Some("Acme".into()),
                job_url: format!("https://a/{i}"),
                ..Default::default()
            })
            .collect();
        let p = FixtureProvider::from_listings(listings);
        let c = SearchConstraints {
            results_wanted: 2,
            ..Default::default()
        };
        assert_eq!(p.search("Acme", &c).await.unwrap().len(), 2);
    }
}
