// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod classify;
pub mod companies;
pub mod config;
pub mod dedup;
pub mod ingest;
pub mod markdown;
pub mod metrics;
pub mod policy;
pub mod salary;

// ---- Re-exports for stable public API ----
pub use crate::config::{ScanSettings, ScoutConfig};
pub use crate::dedup::SeenUrls;
pub use crate::ingest::types::{Listing, ListingProvider, SearchConstraints};
pub use crate::policy::{AcceptPath, Decision, FilterPolicy, JobFilter, RejectReason};
pub use crate::salary::{normalized_rate, PayInterval};
