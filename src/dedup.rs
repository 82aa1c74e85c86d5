// src/dedup.rs
//! Persisted set of posting URLs that have already been written.
//! One URL per line; the file only ever grows.

use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_SEEN_PATH: &str = "state/seen_urls.txt";

#[derive(Debug, Default)]
pub struct SeenUrls {
    urls: HashSet<String>,
    sink: Option<File>,
    path: Option<PathBuf>,
}

impl SeenUrls {
    /// Purely in-memory gate (nothing persisted).
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`. An unreadable or malformed file is treated
    /// as an empty set; only failure to open it for appending is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let urls = match fs::read_to_string(&path) {
            Ok(content) => parse_lines(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                warn!(
                    target: "dedup",
                    error = %e,
                    path = %path.display(),
                    "seen-url store unreadable; starting empty"
                );
                move_aside(&path);
                HashSet::new()
            }
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let sink = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening seen-url store {}", path.display()))?;

        debug!(target: "dedup", known = urls.len(), path = %path.display(), "seen-url store loaded");
        Ok(Self {
            urls,
            sink: Some(sink),
            path: Some(path),
        })
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url.trim())
    }

    /// Returns true when `url` is novel, recording it; false for duplicates
    /// and for empty URLs (which cannot be keyed).
    pub fn admit(&mut self, url: &str) -> Result<bool> {
        let url = url.trim();
        if url.is_empty() {
            debug!(target: "dedup", "listing without posting url dropped");
            return Ok(false);
        }
        if self.urls.contains(url) {
            debug!(target: "dedup", %url, "duplicate posting dropped");
            return Ok(false);
        }
        if let Some(sink) = self.sink.as_mut() {
            writeln!(sink, "{url}").context("appending to seen-url store")?;
            sink.flush()?;
        }
        self.urls.insert(url.to_string());
        Ok(true)
    }
}

/// Rename an unreadable store to `<name>.corrupt-<utc timestamp>` so earlier
/// copies are kept. Directories are left in place.
fn move_aside(path: &Path) {
    if fs::metadata(path).is_ok_and(|m| m.is_dir()) {
        warn!(target: "dedup", path = %path.display(), "seen-url store path is a directory");
        return;
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "seen_urls".to_string());
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%.6fZ");
    let mut aside = path.with_file_name(format!("{name}.corrupt-{stamp}"));
    let mut n = 1;
    while aside.exists() {
        aside = path.with_file_name(format!("{name}.corrupt-{stamp}-{n}"));
        n += 1;
    }
    match fs::rename(path, &aside) {
        Ok(()) => warn!(target: "dedup", moved_to = %aside.display(), "unreadable store moved aside"),
        Err(e) => warn!(target: "dedup", error = %e, "could not move unreadable store aside"),
    }
}

fn parse_lines(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
