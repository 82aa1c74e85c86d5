// src/ingest/providers/http.rs
//! Provider that queries a JSON job-search endpoint over HTTP.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{search_term, Listing, ListingProvider, SearchConstraints};

// Tolerated response shapes: bare array, or wrapped in `jobs` / `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Bare(Vec<Listing>),
    Jobs { jobs: Vec<Listing> },
    Data { data: Vec<Listing> },
}

impl SearchResponse {
    fn into_listings(self) -> Vec<Listing> {
        match self {
            SearchResponse::Bare(v) => v,
            SearchResponse::Jobs { jobs } => jobs,
            SearchResponse::Data { data } => data,
        }
    }
}

pub struct HttpProvider {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("building http client")?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// Query pairs sent with every search.
    pub fn query_params(employer: &str, c: &SearchConstraints) -> Vec<(&'static str, String)> {
        vec![
            ("search_term", search_term(employer)),
            ("site_name", c.sites.join(",")),
            ("location", c.location.clone()),
            ("results_wanted", c.results_wanted.to_string()),
            ("job_type", c.job_type.clone()),
            ("hours_old", c.hours_old.to_string()),
            ("country_indeed", c.country.clone()),
        ]
    }
}

#[async_trait]
impl ListingProvider for HttpProvider {
    async fn search(
        &self,
        employer: &str,
        constraints: &SearchConstraints,
    ) -> Result<Vec<Listing>> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&Self::query_params(employer, constraints))
            .send()
            .await
            .context("provider http get()")?
            .error_for_status()
            .context("provider http status")?;
        let body: SearchResponse = resp.json().await.context("provider http .json()")?;
        Ok(body.into_listings())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
