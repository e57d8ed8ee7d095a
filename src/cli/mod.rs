//! CLI module - Command line interface definitions and handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use crate::config::{self, Config};
use crate::kind::{Category, FileKind};
use crate::readonly::read_head;
use crate::scan::{ScanEntry, ScanReport, Scanner};
use crate::sniff::{all_detectors, Detector, Matcher, Outcome};

/// Magic Drill - identify files by their content
///
/// Reads the first few kilobytes of each file and matches them against an
/// ordered table of magic-byte signatures. Files are only ever opened for
/// reading.
#[derive(Parser, Debug)]
#[command(name = "magic-drill")]
#[command(author = "Ryan Cashmoney <tunclon@proton.me>")]
#[command(version)]
#[command(about = "🔎 Identify files by their magic bytes", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Output format for machine parsing
    #[arg(long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Bytes read from the start of each file
    #[arg(long, global = true)]
    pub head_bytes: Option<usize>,

    /// Only accept tar headers that carry the ustar magic
    #[arg(long, global = true)]
    pub strict_tar: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Identify one or more files
    Detect(DetectArgs),

    /// Identify every file under a directory
    Scan(ScanArgs),

    /// List the signature table in match order
    Signatures,

    /// Show or create the config file
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct DetectArgs {
    /// Files to identify
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Parser)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(required = true)]
    pub dir: PathBuf,

    /// Only list files whose extension disagrees with their content
    #[arg(long, short)]
    pub mismatches: bool,

    /// Include hidden files and directories
    #[arg(long)]
    pub hidden: bool,

    /// Maximum depth to traverse
    #[arg(long, short)]
    pub depth: Option<usize>,

    /// Number of parallel workers (default: CPU count)
    #[arg(long, short)]
    pub workers: Option<usize>,

    /// Follow symbolic links
    #[arg(long, short = 'L')]
    pub follow_links: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct ConfigArgs {
    /// Write the default config file if none exists
    #[arg(long)]
    pub init: bool,

    /// Print the config file location
    #[arg(long)]
    pub path: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable (default)
    #[default]
    Human,
    /// JSON output
    Json,
}

impl Cli {
    /// Config from `--config` or the default location, with flag overrides applied
    pub fn resolve_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load(),
        };
        Ok(self.resolve_config_with(config))
    }

    /// Apply flag overrides on top of `config`
    pub fn resolve_config_with(&self, mut config: Config) -> Config {
        if let Some(head_bytes) = self.head_bytes {
            config.detect.head_bytes = head_bytes;
        }
        if self.strict_tar {
            config.detect.strict_tar = true;
        }
        if self.verbose {
            config.general.log_level = "debug".to_string();
        }
        config
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output.unwrap_or_default()
    }
}

/// Run the parsed command. Returns `false` when some file could not be read.
pub fn run(cli: &Cli, config: &Config) -> Result<bool> {
    if !config.general.color {
        colored::control::set_override(false);
    }

    let format = cli.output_format();
    match &cli.command {
        Commands::Detect(args) => run_detect(args, config, format),
        Commands::Scan(args) => run_scan(args, config, format),
        Commands::Signatures => run_signatures(format).map(|()| true),
        Commands::Config(args) => run_config(args, cli.config.as_deref()).map(|()| true),
    }
}

// ============================================================================
// detect
// ============================================================================

/// One line of `detect` output
#[derive(Debug, Serialize)]
pub struct DetectRecord {
    pub path: PathBuf,
    pub kind: Option<FileKind>,
    pub category: Option<Category>,
    pub error: Option<String>,
}

pub fn detect_files(paths: &[PathBuf], config: &Config) -> Vec<DetectRecord> {
    let matcher = Matcher::new(config.match_options());
    paths
        .iter()
        .map(|path| match read_head(path, config.detect.head_bytes) {
            Ok(head) => {
                let kind = matcher.detect(&head);
                DetectRecord {
                    path: path.clone(),
                    kind,
                    category: kind.map(|k| k.category()),
                    error: None,
                }
            }
            Err(e) => DetectRecord {
                path: path.clone(),
                kind: None,
                category: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

fn run_detect(args: &DetectArgs, config: &Config, format: OutputFormat) -> Result<bool> {
    let records = detect_files(&args.files, config);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Human => {
            let width = records
                .iter()
                .map(|r| r.path.display().to_string().chars().count())
                .max()
                .unwrap_or(0);
            for record in &records {
                let path = format!("{:<width$}", record.path.display().to_string());
                match (&record.kind, &record.error) {
                    (_, Some(err)) => eprintln!("{}  {} {}", path, "✗".red(), err.red()),
                    (Some(kind), None) => println!("{}  {}", path, format_kind(kind)),
                    (None, None) => println!("{}  {}", path, "unknown".dimmed()),
                }
            }
        }
    }

    Ok(records.iter().all(|r| r.error.is_none()))
}

fn format_kind(kind: &FileKind) -> String {
    let color = kind.category().color();
    let ext = if kind.extension.is_empty() {
        "-"
    } else {
        kind.extension
    };
    format!("{:<6} {}", ext.color(color).bold(), kind.mime)
}

// ============================================================================
// scan
// ============================================================================

fn run_scan(args: &ScanArgs, config: &Config, format: OutputFormat) -> Result<bool> {
    let mut options = config.scan_options();
    if args.hidden {
        options.skip_hidden = false;
    }
    if let Some(depth) = args.depth {
        options.max_depth = Some(depth);
    }
    if let Some(workers) = args.workers {
        options.workers = workers;
    }
    if args.follow_links {
        options.follow_links = true;
    }
    if args.mismatches {
        options.report_mismatches = true;
    }
    options.show_progress = format == OutputFormat::Human && !args.no_progress;

    let report = Scanner::new(options)
        .scan(&args.dir)
        .with_context(|| format!("Failed to scan {}", args.dir.display()))?;

    match format {
        OutputFormat::Json if args.mismatches => {
            let entries: Vec<&ScanEntry> = report.mismatches().collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Human => print_scan_report(&report, args.mismatches),
    }

    Ok(report.stats.errors == 0)
}

fn print_scan_report(report: &ScanReport, only_mismatches: bool) {
    println!(
        "\n{} {}\n",
        "Scanned".bright_cyan().bold(),
        report.root.display()
    );

    for entry in &report.entries {
        if only_mismatches && !entry.mismatch {
            continue;
        }
        let rel = entry.path.strip_prefix(&report.root).unwrap_or(&entry.path);
        print_scan_entry(rel, entry);
    }

    let stats = &report.stats;
    println!("\n{}", "Summary:".bold());
    println!("  Files:        {}", stats.files);
    println!("  Identified:   {}", stats.identified.to_string().green());
    println!("  Unidentified: {}", stats.unidentified);
    if stats.mismatches > 0 {
        println!("  Mismatches:   {}", stats.mismatches.to_string().yellow());
    }
    if stats.errors > 0 {
        println!("  Errors:       {}", stats.errors.to_string().red());
    }
    println!(
        "  Read:         {} in {} ms",
        humansize::format_size(stats.bytes_read, humansize::BINARY),
        stats.duration_ms
    );

    if !stats.by_category.is_empty() {
        println!("\n{}", "By category:".bold());
        for (category, count) in &stats.by_category {
            println!(
                "  {:<12} {}",
                category.to_string().color(category.color()),
                count
            );
        }
    }
    println!();
}

fn print_scan_entry(rel: &Path, entry: &ScanEntry) {
    let size = humansize::format_size(entry.size, humansize::BINARY);
    if let Some(err) = &entry.error {
        println!("  {} {} {}", "✗".red(), rel.display(), err.red());
        return;
    }
    match &entry.kind {
        Some(kind) if entry.mismatch => println!(
            "  {} {:<10} {}  {} {}",
            "!".yellow().bold(),
            size,
            format_kind(kind),
            rel.display(),
            format!(
                "(name says {})",
                entry.name_mime.as_deref().unwrap_or("unknown")
            )
            .yellow()
        ),
        Some(kind) => println!("    {:<10} {}  {}", size, format_kind(kind), rel.display()),
        None => println!(
            "    {:<10} {:<6} {}  {}",
            size,
            "?".dimmed(),
            "unknown".dimmed(),
            rel.display()
        ),
    }
}

// ============================================================================
// signatures
// ============================================================================

/// Serializable view of one detector
#[derive(Debug, Serialize)]
pub struct SignatureRecord {
    pub index: usize,
    pub name: &'static str,
    pub offset: usize,
    pub pattern: String,
    pub mask: Option<String>,
    /// `None` when a sub-parser decides
    pub kind: Option<FileKind>,
}

impl SignatureRecord {
    fn new(index: usize, detector: &Detector) -> Self {
        Self {
            index,
            name: detector.name,
            offset: detector.offset,
            pattern: hex_bytes(detector.pattern),
            mask: detector.mask.map(hex_bytes),
            kind: match detector.outcome {
                Outcome::Fixed(kind) => Some(kind),
                Outcome::Parse(_) => None,
            },
        }
    }
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_signatures(format: OutputFormat) -> Result<()> {
    let records: Vec<SignatureRecord> = all_detectors()
        .iter()
        .enumerate()
        .map(|(i, d)| SignatureRecord::new(i, d))
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Human => {
            for r in &records {
                let pattern = if r.pattern.is_empty() {
                    "(checksum)".to_string()
                } else if r.offset > 0 {
                    format!("{} @{}", r.pattern, r.offset)
                } else {
                    r.pattern.clone()
                };
                let outcome = match &r.kind {
                    Some(kind) => format_kind(kind),
                    None => "parse".italic().to_string(),
                };
                println!(
                    "{:>4}  {:<24} {}  {}",
                    r.index.to_string().dimmed(),
                    r.name.bold(),
                    outcome,
                    pattern.dimmed()
                );
            }
        }
    }
    Ok(())
}

// ============================================================================
// config
// ============================================================================

fn run_config(args: &ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path);

    if args.path {
        println!("{}", path.display());
        return Ok(());
    }

    if args.init {
        if explicit.is_none() {
            let path = Config::ensure_exists()?;
            println!("{} Config at {}", "✓".green(), path.display());
        } else if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            Config::default().save_to(&path)?;
            println!("{} Wrote {}", "✓".green(), path.display());
        }
        return Ok(());
    }

    print!("{}", config::generate_sample_config());
    Ok(())
}
