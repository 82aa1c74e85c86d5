// src/markdown.rs
//! Markdown job-table → CSV conversion with cell cleaning
//! (company links, `</br>` locations, application hrefs).

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{info, warn};

pub const COL_COMPANY: &str = "Company";
pub const COL_COMPANY_URL: &str = "Company URL";
pub const COL_LOCATION: &str = "Location";
pub const COL_LINK: &str = "Application/Link";
pub const COL_DATE: &str = "Date Posted";

static COMPANY_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*\[(.*?)\]\((.*?)\)\*\*").expect("company link regex"));
static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("href regex")
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Lines whose left-trimmed text starts with `|`.
pub fn extract_table_lines(md: &str) -> Vec<&str> {
    md.lines().filter(|l| l.trim_start().starts_with('|')).collect()
}

fn split_cells(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// First line is the header, second the divider, the rest are data rows.
/// Rows whose cell count differs from the header are skipped.
pub fn parse_table(lines: &[&str]) -> Result<Table> {
    if lines.len() < 2 {
        bail!("no markdown table found");
    }
    let headers = split_cells(lines[0]);
    let mut rows = Vec::new();
    for line in &lines[2..] {
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_cells(line);
        if cells.len() != headers.len() {
            warn!(cells = cells.len(), expected = headers.len(), row = %line.trim(), "skipping row (unexpected column count)");
            continue;
        }
        rows.push(cells);
    }
    Ok(Table { headers, rows })
}

/// `**[Name](URL)**` → (Name, Some(URL)); anything else → (trimmed text, None).
pub fn clean_company(text: &str) -> (String, Option<String>) {
    match COMPANY_LINK_RE.captures(text) {
        Some(c) => (c[1].to_string(), Some(c[2].to_string())),
        None => (text.trim().to_string(), None),
    }
}

pub fn clean_location(text: &str) -> String {
    text.replace("</br>", ", ").trim().to_string()
}

/// Application cell → comma-joined URLs, or `None` when no link is usable
/// (e.g. a closed-posting marker).
pub fn clean_application_link(text: &str) -> Option<String> {
    let text = text.trim();
    if text.contains("<a") {
        let links: Vec<String> = HREF_RE
            .captures_iter(text)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
            .map(|m| html_escape::decode_html_entities(m.as_str()).trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
        return (!links.is_empty()).then(|| links.join(", "));
    }
    if text.starts_with("http") {
        return Some(text.to_string());
    }
    if text.contains(',') {
        let urls: Vec<&str> = text
            .split(',')
            .map(str::trim)
            .filter(|u| u.starts_with("http"))
            .collect();
        return (!urls.is_empty()).then(|| urls.join(", "));
    }
    None
}

/// Apply the per-column cleaners and insert `Company URL` right after `Company`.
pub fn clean_table(mut table: Table) -> Table {
    let company = table.column(COL_COMPANY);
    let location = table.column(COL_LOCATION);
    let link = table.column(COL_LINK);
    let date = table.column(COL_DATE);

    for row in &mut table.rows {
        if let Some(i) = location {
            row[i] = clean_location(&row[i]);
        }
        if let Some(i) = link {
            row[i] = clean_application_link(&row[i]).unwrap_or_default();
        }
        if let Some(i) = date {
            row[i] = row[i].trim().to_string();
        }
        if let Some(i) = company {
            let (name, url) = clean_company(&row[i]);
            row[i] = name;
            row.insert(i + 1, url.unwrap_or_default());
        }
    }
    if let Some(i) = company {
        table.headers.insert(i + 1, COL_COMPANY_URL.to_string());
    }
    table
}

/// Keep rows whose `Location` contains `filter` (case-insensitive).
/// A table without a `Location` column is returned unchanged.
pub fn filter_by_location(mut table: Table, filter: &str) -> Table {
    let Some(i) = table.column(COL_LOCATION) else {
        return table;
    };
    let needle = filter.to_lowercase();
    let before = table.rows.len();
    table.rows.retain(|r| r[i].to_lowercase().contains(&needle));
    info!(
        filter,
        removed = before - table.rows.len(),
        remaining = table.rows.len(),
        "filtered by location"
    );
    table
}

/// Markdown text → cleaned (and optionally location-filtered) table.
pub fn convert(md: &str, location_filter: Option<&str>) -> Result<Table> {
    let lines = extract_table_lines(md);
    info!(lines = lines.len(), "table lines found");
    let table = clean_table(parse_table(&lines)?);
    info!(headers = ?table.headers, postings = table.rows.len(), "markdown table parsed");
    Ok(match location_filter.filter(|f| !f.trim().is_empty()) {
        Some(f) => filter_by_location(table, f),
        None => table,
    })
}

pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read `input`, convert, write `output`; returns the number of rows written.
pub fn convert_file(input: &Path, output: &Path, location_filter: Option<&str>) -> Result<usize> {
    let md = std::fs::read_to_string(input)
        .with_context(|| format!("reading markdown file {}", input.display()))?;
    let table = convert(&md, location_filter)?;
    write_csv(&table, output)?;
    info!(rows = table.rows.len(), output = %output.display(), "cleaned data saved");
    Ok(table.rows.len())
}
