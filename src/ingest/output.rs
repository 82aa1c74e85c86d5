// src/ingest/output.rs
//! Append-only CSV sink for accepted, novel listings.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::ingest::types::Listing;

/// One output row; field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow<'a> {
    pub title: &'a str,
    pub company: &'a str,
    pub location: &'a str,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
    pub interval: &'a str,
    pub apply_url: &'a str,
    pub posted_date: &'a str,
    pub is_remote: bool,
    pub source: &'a str,
}

impl<'a> OutputRow<'a> {
    /// `is_remote` is the classifier's verdict, not the provider's flag.
    pub fn from_listing(l: &'a Listing, is_remote: bool) -> Self {
        Self {
            title: l.title.as_deref().unwrap_or_default(),
            company: l.company.as_deref().unwrap_or_default(),
            location: l.location.as_deref().unwrap_or_default(),
            min_salary: l.min_amount,
            max_salary: l.max_amount,
            interval: l.interval.map(|i| i.as_str()).unwrap_or_default(),
            apply_url: l.job_url.trim(),
            posted_date: l.date_posted.as_deref().unwrap_or_default(),
            is_remote,
            source: l.site.as_deref().unwrap_or_default(),
        }
    }
}

pub struct CsvSink {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows_written: usize,
}

impl CsvSink {
    /// Open `path` for appending; the header is written only for a new or empty file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let needs_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening output {}", path.display()))?;
        let writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        Ok(Self {
            writer,
            path,
            rows_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Write one row and flush it to disk immediately.
    pub fn write(&mut self, row: &OutputRow<'_>) -> Result<()> {
        self.writer
            .serialize(row)
            .with_context(|| format!("writing row to {}", self.path.display()))?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }
}
