// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::salary::{lenient_interval, PayInterval};

/// One job posting as returned by a provider. Never mutated after it is received.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "is_remote_flag")]
    pub is_remote: Option<bool>,
    #[serde(default)]
    pub min_amount: Option<f64>,
    #[serde(default)]
    pub max_amount: Option<f64>,
    #[serde(default, alias = "pay_interval", deserialize_with = "lenient_interval")]
    pub interval: Option<PayInterval>,
    /// Posting URL; the deduplication key.
    #[serde(default, alias = "posting_url")]
    pub job_url: String,
    #[serde(default)]
    pub date_posted: Option<String>,
    /// Board the listing came from, e.g. "indeed".
    #[serde(default)]
    pub site: Option<String>,
}

/// Query constraints passed to the provider with every employer search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConstraints {
    pub sites: Vec<String>,
    pub location: String,
    pub results_wanted: u32,
    pub job_type: String,
    pub hours_old: u32,
    pub country: String,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self {
            sites: vec!["indeed".into(), "linkedin".into()],
            location: "United States".into(),
            results_wanted: 50,
            job_type: "internship".into(),
            hours_old: 720,
            country: "USA".into(),
        }
    }
}

/// Search term sent for one employer: the quoted name plus "intern".
pub fn search_term(employer: &str) -> String {
    format!("\"{}\" intern", employer.trim())
}

#[async_trait::async_trait]
pub trait ListingProvider: Send + Sync {
    async fn search(&self, employer: &str, constraints: &SearchConstraints)
        -> Result<Vec<Listing>>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternate_field_names_are_accepted() {
        let l: Listing = serde_json::from_str(
            r#"{"title": "Data Intern", "is_remote_flag": true, "min_amount": 30,
                "pay_interval": "Hourly", "posting_url": "https://jobs.example/1"}"#,
        )
        .unwrap();
        assert_eq!(l.is_remote, Some(true));
        assert_eq!(l.interval, Some(PayInterval::Hourly));
        assert_eq!(l.job_url, "https://jobs.example/1");

        let l: Listing =
            serde_json::from_str(r#"{"interval": "yearly", "is_remote": false}"#).unwrap();
        assert_eq!(l.interval, Some(PayInterval::Yearly));
        assert_eq!(l.is_remote, Some(false));
    }
}
