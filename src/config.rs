//! Configuration Module - User preferences from ~/.magic-drill/config.toml
//!
//! Supports:
//! - Log level and colour output
//! - Matcher tunables (head size, ID3 nesting, strict tar)
//! - Directory scan defaults

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::readonly::DEFAULT_HEAD_BYTES;
use crate::scan::ScanOptions;
use crate::sniff::{MatchOptions, DEFAULT_MAX_ID3_DEPTH};

/// Magic Drill Configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Matcher settings
    pub detect: DetectConfig,
    /// Scan settings
    pub scan: ScanConfig,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
    /// Colourise human-readable output
    pub color: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            color: true,
        }
    }
}

/// Matcher settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Bytes read from the start of each file
    pub head_bytes: usize,
    /// ID3 tags skipped before settling on mp3
    pub max_id3_depth: usize,
    /// Require `ustar` magic before accepting a tar checksum
    pub strict_tar: bool,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            head_bytes: DEFAULT_HEAD_BYTES,
            max_id3_depth: DEFAULT_MAX_ID3_DEPTH,
            strict_tar: false,
        }
    }
}

/// Scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Number of parallel workers (0 = auto)
    pub workers: usize,
    /// Skip hidden files by default
    pub skip_hidden: bool,
    /// Max depth (0 = unlimited)
    pub max_depth: usize,
    /// Follow symbolic links while walking
    pub follow_links: bool,
    /// Flag files whose name extension disagrees with their content
    pub report_mismatches: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 0, // auto-detect
            skip_hidden: true,
            max_depth: 0,
            follow_links: false,
            report_mismatches: true,
        }
    }
}

impl Config {
    /// Load config from default path or return defaults
    pub fn load() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable config: {:#}", e);
            Self::default()
        })
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "tunclon", "magic-drill")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".magic-drill")
                    .join("config.toml")
            })
    }

    /// Create default config file if it doesn't exist, returning its path
    pub fn ensure_exists() -> Result<PathBuf> {
        let path = Self::default_path();
        if !path.exists() {
            Config::default().save_to(&path)?;
            tracing::info!("Created default config at {}", path.display());
        }
        Ok(path)
    }

    /// Matcher options from the `[detect]` table
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            max_id3_depth: self.detect.max_id3_depth,
            strict_tar: self.detect.strict_tar,
        }
    }

    /// Scanner options from the `[detect]` and `[scan]` tables
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            match_options: self.match_options(),
            head_bytes: self.detect.head_bytes,
            skip_hidden: self.scan.skip_hidden,
            max_depth: (self.scan.max_depth > 0).then_some(self.scan.max_depth),
            follow_links: self.scan.follow_links,
            workers: self.scan.workers,
            report_mismatches: self.scan.report_mismatches,
            show_progress: false,
        }
    }
}

/// Generate a sample config file with comments
pub fn generate_sample_config() -> String {
    format!(
        r#"# Magic Drill Configuration
# Location: ~/.config/magic-drill/config.toml (or %APPDATA%\tunclon\magic-drill\config\config.toml on Windows)

[general]
# Log level: trace, debug, info, warn, error
log_level = "info"

# Colourise terminal output
color = true

[detect]
# Bytes read from the start of each file
head_bytes = {DEFAULT_HEAD_BYTES}

# Nested ID3 tags to skip before assuming mp3
max_id3_depth = {DEFAULT_MAX_ID3_DEPTH}

# Only accept a tar header checksum when the "ustar" magic is present
strict_tar = false

[scan]
# Number of parallel workers (0 = auto-detect CPU count)
workers = 0

# Skip hidden files and directories
skip_hidden = true

# Maximum scan depth (0 = unlimited)
max_depth = 0

# Follow symbolic links
follow_links = false

# Flag files whose extension disagrees with their content
report_mismatches = true
"#
    )
}
