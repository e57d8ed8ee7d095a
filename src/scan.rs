//! Scanner - Parallel directory walk that identifies every file
//!
//! The walk itself is single-threaded (walkdir); reading heads and matching
//! runs on a rayon pool. A file that cannot be read is recorded on its entry
//! and counted, it never aborts the scan.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::error::{ReadError, Result};
use crate::kind::{Category, FileKind};
use crate::readonly::{read_head, DEFAULT_HEAD_BYTES};
use crate::sniff::{MatchOptions, Matcher};

/// Scanner configuration options
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Options handed to the matcher
    pub match_options: MatchOptions,
    /// Bytes read from the start of each file
    pub head_bytes: usize,
    /// Skip hidden files and directories
    pub skip_hidden: bool,
    /// Maximum traversal depth
    pub max_depth: Option<usize>,
    /// Follow symbolic links
    pub follow_links: bool,
    /// Number of parallel workers (0 = CPU count)
    pub workers: usize,
    /// Compare detected content against the file name extension
    pub report_mismatches: bool,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            match_options: MatchOptions::default(),
            head_bytes: DEFAULT_HEAD_BYTES,
            skip_hidden: true,
            max_depth: None,
            follow_links: false,
            workers: 0,
            report_mismatches: true,
            show_progress: false,
        }
    }
}

/// One scanned file
#[derive(Debug, Clone, Serialize)]
pub struct ScanEntry {
    pub path: PathBuf,
    /// Size on disk, 0 when metadata was unavailable
    pub size: u64,
    /// Detected format, `None` when unrecognised or unreadable
    pub kind: Option<FileKind>,
    /// MIME type guessed from the file name alone
    pub name_mime: Option<String>,
    /// The name extension disagrees with the detected content
    pub mismatch: bool,
    pub error: Option<String>,
}

impl ScanEntry {
    pub fn category(&self) -> Option<Category> {
        self.kind.as_ref().map(FileKind::category)
    }
}

/// Statistics from a scan operation
#[derive(Debug, Default, Clone, Serialize)]
pub struct ScanStats {
    pub files: usize,
    pub identified: usize,
    pub unidentified: usize,
    pub mismatches: usize,
    pub errors: usize,
    pub bytes_read: u64,
    pub duration_ms: u64,
    pub by_category: BTreeMap<Category, usize>,
}

/// Result of scanning one root
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub scanned_at: DateTime<Utc>,
    /// Sorted by path
    pub entries: Vec<ScanEntry>,
    pub stats: ScanStats,
}

impl ScanReport {
    /// Entries whose content contradicts their name
    pub fn mismatches(&self) -> impl Iterator<Item = &ScanEntry> {
        self.entries.iter().filter(|e| e.mismatch)
    }
}

/// Parallel file identification scanner
pub struct Scanner {
    options: ScanOptions,
    matcher: Matcher,
}

impl Scanner {
    /// Create a new scanner with options
    pub fn new(options: ScanOptions) -> Self {
        let matcher = Matcher::new(options.match_options);
        Self { options, matcher }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Walk `root` and identify every regular file under it
    pub fn scan(&self, root: &Path) -> Result<ScanReport> {
        std::fs::metadata(root).map_err(|source| ReadError::Open {
            path: root.to_path_buf(),
            source,
        })?;

        let start = Instant::now();
        let scanned_at = Utc::now();
        tracing::info!(root = %root.display(), "Scan started");

        let paths = self.collect_files(root);
        let progress = self.progress_bar(paths.len() as u64);
        let bytes_read = AtomicU64::new(0);

        let identify = || -> Vec<ScanEntry> {
            paths
                .par_iter()
                .progress_with(progress.clone())
                .map(|path| self.identify(path, &bytes_read))
                .collect()
        };

        let mut entries = match self.thread_pool() {
            Some(pool) => pool.install(identify),
            None => identify(),
        };
        progress.finish_and_clear();
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let mut stats = summarize(&entries);
        stats.bytes_read = bytes_read.load(Ordering::Relaxed);
        stats.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            root = %root.display(),
            files = stats.files,
            identified = stats.identified,
            errors = stats.errors,
            duration_ms = stats.duration_ms,
            "Scan complete"
        );

        Ok(ScanReport {
            root: root.to_path_buf(),
            scanned_at,
            entries,
            stats,
        })
    }

    /// Identify one file. I/O failures end up on the entry.
    pub fn identify_file(&self, path: &Path) -> ScanEntry {
        self.identify(path, &AtomicU64::new(0))
    }

    fn identify(&self, path: &Path, bytes_read: &AtomicU64) -> ScanEntry {
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let name_mime = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string());

        let mut entry = ScanEntry {
            path: path.to_path_buf(),
            size,
            kind: None,
            name_mime,
            mismatch: false,
            error: None,
        };

        match read_head(path, self.options.head_bytes) {
            Ok(head) => {
                bytes_read.fetch_add(head.len() as u64, Ordering::Relaxed);
                entry.kind = self.matcher.detect(&head);
                entry.mismatch = self.options.report_mismatches
                    && entry
                        .kind
                        .is_some_and(|kind| !extension_agrees(path, &kind));
            }
            Err(e) => {
                tracing::warn!("Error reading {}: {}", path.display(), e);
                entry.error = Some(e.to_string());
            }
        }
        entry
    }

    fn collect_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(root).follow_links(self.options.follow_links);
        if let Some(depth) = self.options.max_depth {
            walker = walker.max_depth(depth);
        }

        let skip_hidden = self.options.skip_hidden;
        walker
            .into_iter()
            .filter_entry(move |e| e.depth() == 0 || !(skip_hidden && is_hidden(e)))
            .filter_map(|e| match e {
                Ok(e) => Some(e),
                Err(err) => {
                    tracing::warn!("Skipping unwalkable entry: {}", err);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(DirEntry::into_path)
            .collect()
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        let workers = match self.options.workers {
            0 => num_cpus::get(),
            n => n,
        };
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| tracing::debug!("Falling back to global rayon pool: {}", e))
            .ok()
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_message("identifying");
        pb
    }
}

/// Whether the name extension of `path` is a plausible name for `kind`.
///
/// Files without an extension never disagree.
pub fn extension_agrees(path: &Path, kind: &FileKind) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return true;
    };
    let ext = ext.to_ascii_lowercase();

    if ext == kind.extension.to_ascii_lowercase() {
        return true;
    }
    if mime_guess::get_mime_extensions_str(kind.mime)
        .is_some_and(|exts| exts.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
    {
        return true;
    }
    mime_guess::from_ext(&ext)
        .iter()
        .any(|m| m.essence_str().eq_ignore_ascii_case(kind.mime))
}

fn summarize(entries: &[ScanEntry]) -> ScanStats {
    let mut stats = ScanStats {
        files: entries.len(),
        ..Default::default()
    };
    for entry in entries {
        if entry.error.is_some() {
            stats.errors += 1;
        }
        match entry.category() {
            Some(category) => {
                stats.identified += 1;
                *stats.by_category.entry(category).or_default() += 1;
            }
            None if entry.error.is_none() => stats.unidentified += 1,
            None => {}
        }
        if entry.mismatch {
            stats.mismatches += 1;
        }
    }
    stats
}

/// Check if entry is hidden (starts with .)
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
