// src/policy.rs
//! Acceptance policy: configuration types plus the compiled `JobFilter`
//! that combines the internship, remote/hybrid and pay checks.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::classify;
use crate::ingest::types::Listing;
use crate::salary::{normalized_rate, usable_amount, PayInterval, HOURS_PER_YEAR};

pub const DEFAULT_MIN_HOURLY_RATE: f64 = 25.0;
pub const DEFAULT_MIN_MONTHLY_RATE: f64 = 4_300.0;
pub const DEFAULT_MIN_YEARLY_RATE: f64 = 52_000.0;

fn default_min_hourly_rate() -> f64 {
    DEFAULT_MIN_HOURLY_RATE
}
fn default_min_monthly_rate() -> f64 {
    DEFAULT_MIN_MONTHLY_RATE
}
fn default_min_yearly_rate() -> f64 {
    DEFAULT_MIN_YEARLY_RATE
}
fn default_true() -> bool {
    true
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_allowlist() -> Vec<String> {
    strings(&[
        "google",
        "microsoft",
        "amazon",
        "apple",
        "meta",
        "ibm",
        "intel",
    ])
}

fn default_remote_keywords() -> Vec<String> {
    strings(&[
        "remote",
        "virtual",
        "work from home",
        "work-from-home",
        "wfh",
        "telecommut",
        "flexible location",
        "remote optional",
        "remote eligible",
        "remote first",
        "remote-first",
        "anywhere",
    ])
}

fn default_hybrid_keywords() -> Vec<String> {
    strings(&["hybrid", "hybrid optional", "remote/hybrid"])
}

fn default_intern_keywords() -> Vec<String> {
    strings(&["intern", "internship", "interns"])
}

/// Filtering thresholds and keyword sets (from TOML/JSON or defaults).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterPolicy {
    #[serde(default = "default_min_hourly_rate")]
    pub min_hourly_rate: f64,
    #[serde(default = "default_min_monthly_rate")]
    pub min_monthly_rate: f64,
    #[serde(default = "default_min_yearly_rate")]
    pub min_yearly_rate: f64,
    /// Employer-name substrings accepted regardless of pay data.
    #[serde(default = "default_allowlist")]
    pub allowlisted_employers: Vec<String>,
    #[serde(default = "default_remote_keywords")]
    pub remote_keywords: Vec<String>,
    #[serde(default = "default_hybrid_keywords")]
    pub hybrid_keywords: Vec<String>,
    #[serde(default = "default_intern_keywords")]
    pub intern_keywords: Vec<String>,
    /// When false, hybrid keywords alone do not qualify a listing.
    #[serde(default = "default_true")]
    pub count_hybrid_as_remote: bool,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            min_hourly_rate: DEFAULT_MIN_HOURLY_RATE,
            min_monthly_rate: DEFAULT_MIN_MONTHLY_RATE,
            min_yearly_rate: DEFAULT_MIN_YEARLY_RATE,
            allowlisted_employers: default_allowlist(),
            remote_keywords: default_remote_keywords(),
            hybrid_keywords: default_hybrid_keywords(),
            intern_keywords: default_intern_keywords(),
            count_hybrid_as_remote: true,
        }
    }
}

impl FilterPolicy {
    /// Trim + lowercase + dedup every keyword list, drop blanks, and repair
    /// thresholds that are negative or not finite.
    pub fn sanitized(mut self) -> Self {
        for list in [
            &mut self.allowlisted_employers,
            &mut self.remote_keywords,
            &mut self.hybrid_keywords,
            &mut self.intern_keywords,
        ] {
            *list = clean_keywords(std::mem::take(list));
        }
        if !self.min_hourly_rate.is_finite() || self.min_hourly_rate < 0.0 {
            self.min_hourly_rate = DEFAULT_MIN_HOURLY_RATE;
        }
        if !self.min_monthly_rate.is_finite() || self.min_monthly_rate < 0.0 {
            self.min_monthly_rate = DEFAULT_MIN_MONTHLY_RATE;
        }
        if !self.min_yearly_rate.is_finite() || self.min_yearly_rate < 0.0 {
            self.min_yearly_rate = DEFAULT_MIN_YEARLY_RATE;
        }
        self
    }

    /// Hourly-equivalent threshold the normalized rate is compared against.
    /// Monthly and yearly listings use their own floors, converted with the
    /// same hours as `normalized_rate`.
    pub fn threshold(&self, interval: PayInterval) -> f64 {
        match interval {
            PayInterval::Yearly => self.min_yearly_rate / HOURS_PER_YEAR,
            PayInterval::Monthly => self.min_monthly_rate / PayInterval::Monthly.hours(),
            _ => self.min_hourly_rate,
        }
    }
}

pub(crate) fn clean_keywords(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Which salary branch let an accepted listing through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptPath {
    NormalizedRate,
    MaxAmount,
    Allowlist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotInternship,
    NotRemote,
    PayBelowThreshold,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::NotInternship => "not_internship",
            RejectReason::NotRemote => "not_remote",
            RejectReason::PayBelowThreshold => "pay_below_threshold",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accepted(AcceptPath),
    Rejected(RejectReason),
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted(_))
    }
}

/// Full classification of one listing; `decision` is derived from the other fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub is_internship: bool,
    pub is_remote: bool,
    pub normalized_rate: f64,
    pub decision: Decision,
}

/// Compiled form of a `FilterPolicy`.
#[derive(Debug, Clone)]
pub struct JobFilter {
    policy: FilterPolicy,
    intern_re: Option<Regex>,
    remote_terms: Vec<String>,
}

impl JobFilter {
    pub fn new(policy: FilterPolicy) -> anyhow::Result<Self> {
        let policy = policy.sanitized();
        let intern_re = classify::whole_word_regex(&policy.intern_keywords)?;
        let mut remote_terms = policy.remote_keywords.clone();
        if policy.count_hybrid_as_remote {
            for k in &policy.hybrid_keywords {
                if !remote_terms.contains(k) {
                    remote_terms.push(k.clone());
                }
            }
        }
        Ok(Self {
            policy,
            intern_re,
            remote_terms,
        })
    }

    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    pub fn is_internship(&self, title: Option<&str>) -> bool {
        match (&self.intern_re, title) {
            (Some(re), Some(t)) => re.is_match(t),
            _ => false,
        }
    }

    pub fn is_remote_or_hybrid(&self, listing: &Listing) -> bool {
        listing.is_remote == Some(true)
            || [&listing.title, &listing.location, &listing.description]
                .into_iter()
                .any(|field| classify::contains_any(field.as_deref(), &self.remote_terms))
    }

    pub fn is_allowlisted(&self, company: Option<&str>) -> bool {
        classify::contains_any(company, &self.policy.allowlisted_employers)
    }

    /// Salary disjunction: normalized rate, raw max amount, then allowlist.
    fn pay_path(&self, listing: &Listing, rate: f64) -> Option<AcceptPath> {
        if let Some(iv) = listing.interval {
            if rate > 0.0 && rate >= self.policy.threshold(iv) {
                return Some(AcceptPath::NormalizedRate);
            }
        }
        if usable_amount(listing.max_amount).is_some_and(|m| m >= self.policy.min_yearly_rate) {
            return Some(AcceptPath::MaxAmount);
        }
        if self.is_allowlisted(listing.company.as_deref()) {
            return Some(AcceptPath::Allowlist);
        }
        None
    }

    pub fn evaluate(&self, listing: &Listing) -> Evaluation {
        let is_internship = self.is_internship(listing.title.as_deref());
        let is_remote = self.is_remote_or_hybrid(listing);
        let rate = normalized_rate(listing.min_amount, listing.max_amount, listing.interval);

        let decision = if !is_internship {
            Decision::Rejected(RejectReason::NotInternship)
        } else if !is_remote {
            Decision::Rejected(RejectReason::NotRemote)
        } else {
            match self.pay_path(listing, rate) {
                Some(path) => Decision::Accepted(path),
                None => Decision::Rejected(RejectReason::PayBelowThreshold),
            }
        };

        debug!(
            target: "filter",
            url = %listing.job_url,
            is_internship,
            is_remote,
            rate,
            decision = ?decision,
            "listing classified"
        );

        Evaluation {
            is_internship,
            is_remote,
            normalized_rate: rate,
            decision,
        }
    }

    pub fn accepts(&self, listing: &Listing) -> bool {
        self.evaluate(listing).decision.is_accepted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str) -> Listing {
        Listing {
            title: Some(title.into()),
            job_url: "https://jobs.example/1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn sanitized_cleans_lists_and_thresholds() {
        let p = FilterPolicy {
            min_hourly_rate: f64::NAN,
            min_monthly_rate: f64::INFINITY,
            min_yearly_rate: -1.0,
            remote_keywords: vec![" Remote ".into(), "remote".into(), "".into()],
            ..Default::default()
        }
        .sanitized();
        assert_eq!(p.remote_keywords, vec!["remote".to_string()]);
        assert_eq!(p.min_hourly_rate, DEFAULT_MIN_HOURLY_RATE);
        assert_eq!(p.min_monthly_rate, DEFAULT_MIN_MONTHLY_RATE);
        assert_eq!(p.min_yearly_rate, DEFAULT_MIN_YEARLY_RATE);
    }

    #[test]
    fn interval_thresholds_are_normalized() {
        let p = FilterPolicy::default();
        assert_eq!(p.threshold(PayInterval::Yearly), 25.0);
        assert_eq!(p.threshold(PayInterval::Weekly), 25.0);
        let monthly = p.threshold(PayInterval::Monthly);
        assert!((monthly - 4_300.0 / 173.2).abs() < 1e-9);
        assert!(normalized_rate(Some(4_300.0), None, Some(PayInterval::Monthly)) >= monthly);
        assert!(normalized_rate(Some(4_299.0), None, Some(PayInterval::Monthly)) < monthly);
    }

    #[test]
    fn hybrid_only_respects_flag() {
        let mut l = listing("Data Intern");
        l.location = Some("Austin, TX (Hybrid)".into());

        let on = JobFilter::new(FilterPolicy::default()).unwrap();
        assert!(on.is_remote_or_hybrid(&l));

        let off = JobFilter::new(FilterPolicy {
            count_hybrid_as_remote: false,
            ..Default::default()
        })
        .unwrap();
        assert!(!off.is_remote_or_hybrid(&l));
    }

    #[test]
    fn rejection_reasons_follow_check_order() {
        let f = JobFilter::new(FilterPolicy::default()).unwrap();

        let l = listing("Senior Engineer");
        assert_eq!(
            f.evaluate(&l).decision,
            Decision::Rejected(RejectReason::NotInternship)
        );

        let l = listing("Software Intern");
        assert_eq!(
            f.evaluate(&l).decision,
            Decision::Rejected(RejectReason::NotRemote)
        );

        let mut l = listing("Software Intern");
        l.is_remote = Some(true);
        assert_eq!(
            f.evaluate(&l).decision,
            Decision::Rejected(RejectReason::PayBelowThreshold)
        );
    }

    #[test]
    fn max_amount_path_uses_raw_value() {
        let f = JobFilter::new(FilterPolicy::default()).unwrap();
        let mut l = listing("Finance Intern");
        l.is_remote = Some(true);
        l.max_amount = Some(60_000.0);
        assert_eq!(
            f.evaluate(&l).decision,
            Decision::Accepted(AcceptPath::MaxAmount)
        );
    }
}
