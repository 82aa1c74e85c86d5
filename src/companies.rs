// src/companies.rs
//! Company dataset: employer-name loading for the scan, and the
//! industry / size / country filter that produces that employer list.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

pub const TECH_INDUSTRIES: &[&str] = &[
    "information technology and services",
    "computer software",
    "computer hardware",
    "computer networking",
    "semiconductors",
    "internet",
    "telecommunications",
    "wireless",
    "consumer electronics",
];

pub const FINANCIAL_INDUSTRIES: &[&str] = &[
    "financial services",
    "banking",
    "investment banking",
    "insurance",
    "venture capital",
    "accounting",
    "capital markets",
];

pub const COL_NAME: &str = "name";
pub const COL_INDUSTRY: &str = "industry";
pub const COL_EMPLOYEES: &str = "current employee estimate";
pub const COL_COUNTRY: &str = "country";
pub const COL_LOCALITY: &str = "locality";
pub const COL_CATEGORY: &str = "industry_category";

static US_COUNTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(united states|usa|us)$|united states").expect("us country regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndustryCategory {
    Tech,
    Financial,
}

impl IndustryCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            IndustryCategory::Tech => "tech",
            IndustryCategory::Financial => "financial",
        }
    }
}

impl fmt::Display for IndustryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-insensitive industry match against the two lists.
pub fn categorize(industry: &str) -> Option<IndustryCategory> {
    let i = industry.trim().to_lowercase();
    if TECH_INDUSTRIES.contains(&i.as_str()) {
        Some(IndustryCategory::Tech)
    } else if FINANCIAL_INDUSTRIES.contains(&i.as_str()) {
        Some(IndustryCategory::Financial)
    } else {
        None
    }
}

pub fn is_us_country(country: &str) -> bool {
    US_COUNTRY_RE.is_match(country.trim())
}

/// Non-numeric employee estimates count as unknown.
pub fn parse_employees(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyFilter {
    /// Strict lower bound: a company must have more employees than this.
    pub min_employees_exclusive: f64,
}

impl Default for CompanyFilter {
    fn default() -> Self {
        Self {
            min_employees_exclusive: 249.0,
        }
    }
}

impl CompanyFilter {
    /// Category of a qualifying row, `None` when the row is filtered out.
    pub fn qualify(&self, industry: &str, employees: &str, country: &str) -> Option<IndustryCategory> {
        let category = categorize(industry)?;
        let n = parse_employees(employees)?;
        if n > self.min_employees_exclusive && is_us_country(country) {
            Some(category)
        } else {
            None
        }
    }
}

/// One row that passed the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct KeptCompany {
    pub name: String,
    pub category: IndustryCategory,
    pub employees: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanySummary {
    pub total_rows: usize,
    pub kept: usize,
    pub by_category: HashMap<IndustryCategory, usize>,
    /// (locality, companies) sorted by count desc, then name.
    pub locations: Vec<(String, usize)>,
    /// Kept rows in input order.
    pub companies: Vec<KeptCompany>,
}

impl CompanySummary {
    pub fn top_locations(&self, n: usize) -> &[(String, usize)] {
        &self.locations[..n.min(self.locations.len())]
    }

    pub fn count(&self, category: IndustryCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }

    /// Largest `n` kept companies of `category` by employee estimate.
    /// Ties keep input order.
    pub fn top_companies(&self, category: IndustryCategory, n: usize) -> Vec<&KeptCompany> {
        let mut out: Vec<&KeptCompany> = self
            .companies
            .iter()
            .filter(|c| c.category == category)
            .collect();
        out.sort_by(|a, b| b.employees.total_cmp(&a.employees));
        out.truncate(n);
        out
    }
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn required_column(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    column(headers, name).ok_or_else(|| anyhow!("{} has no `{name}` column", path.display()))
}

/// Employer names from the `name` column: trimmed, `"` removed, blanks
/// dropped, duplicates removed keeping first occurrence.
pub fn load_employers(path: &Path) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening employers csv {}", path.display()))?;
    let headers = rdr.headers().context("reading employers header")?.clone();
    let idx = required_column(&headers, COL_NAME, path)?;

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec.context("reading employers row")?;
        let name = rec.get(idx).unwrap_or_default().trim().replace('"', "");
        let name = name.trim().to_string();
        if name.is_empty() || !seen.insert(name.clone()) {
            continue;
        }
        out.push(name);
    }
    info!(count = out.len(), path = %path.display(), "employers loaded");
    Ok(out)
}

/// Filter `input` into `output`, keeping every input column and appending
/// `industry_category`. Returns summary statistics of the kept rows.
pub fn filter_companies(input: &Path, output: &Path, filter: &CompanyFilter) -> Result<CompanySummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(input)
        .with_context(|| format!("opening companies csv {}", input.display()))?;
    let headers = rdr.headers().context("reading companies header")?.clone();
    let i_industry = required_column(&headers, COL_INDUSTRY, input)?;
    let i_employees = required_column(&headers, COL_EMPLOYEES, input)?;
    let i_country = required_column(&headers, COL_COUNTRY, input)?;
    let i_locality = column(&headers, COL_LOCALITY);
    let i_name = column(&headers, COL_NAME);

    let mut wtr = csv::Writer::from_path(output)
        .with_context(|| format!("creating {}", output.display()))?;
    let mut out_headers = headers.clone();
    out_headers.push_field(COL_CATEGORY);
    wtr.write_record(&out_headers)?;

    let mut summary = CompanySummary::default();
    let mut loc_counts: HashMap<String, usize> = HashMap::new();

    for rec in rdr.records() {
        let rec = match rec {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "skipping unreadable company row");
                continue;
            }
        };
        summary.total_rows += 1;
        let field = |i: usize| rec.get(i).unwrap_or_default();
        let Some(category) = filter.qualify(field(i_industry), field(i_employees), field(i_country))
        else {
            continue;
        };

        let mut row = rec.clone();
        // the category must land in its own column
        if row.len() > headers.len() {
            warn!(
                fields = row.len(),
                expected = headers.len(),
                line = rec.position().map(|p| p.line()).unwrap_or_default(),
                "dropping extra fields from company row"
            );
            row.truncate(headers.len());
        }
        while row.len() < headers.len() {
            row.push_field("");
        }
        row.push_field(category.as_str());
        wtr.write_record(&row)?;

        summary.kept += 1;
        *summary.by_category.entry(category).or_default() += 1;
        summary.companies.push(KeptCompany {
            name: i_name.map(field).unwrap_or_default().trim().to_string(),
            category,
            employees: parse_employees(field(i_employees)).unwrap_or_default(),
        });
        if let Some(loc) = i_locality.map(field).map(str::trim).filter(|l| !l.is_empty()) {
            *loc_counts.entry(loc.to_string()).or_default() += 1;
        }
    }
    wtr.flush()?;

    let mut locations: Vec<(String, usize)> = loc_counts.into_iter().collect();
    locations.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    summary.locations = locations;

    info!(
        total = summary.total_rows,
        kept = summary.kept,
        tech = summary.count(IndustryCategory::Tech),
        financial = summary.count(IndustryCategory::Financial),
        unique_locations = summary.locations.len(),
        "companies filtered"
    );
    Ok(summary)
}
