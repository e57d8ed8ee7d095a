//! Magic Drill Library
//!
//! Identify a file's format from its first few kilobytes: extension plus
//! MIME type, decided by an ordered table of magic-byte signatures.
//!
//! # Features
//!
//! - **First match wins**: one ordered detector table, specific before generic
//! - **Container aware**: walks ZIP, ISO-BMFF, EBML, ASF and PNG structures
//!   to tell apart formats that share a signature (docx vs. zip, webm vs. mkv)
//! - **Never panics on short input**: reads past the end see zero bytes
//! - **Read-Only Safe**: files are only ever opened for reading
//! - **Parallel scans**: rayon-powered directory identification
//!
//! # Example
//!
//! ```
//! use magic_drill::{detect, Matcher, MatchOptions};
//!
//! let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
//! assert_eq!(detect(&png).map(|k| k.pair()), Some(("png", "image/png")));
//!
//! let strict = Matcher::new(MatchOptions { strict_tar: true, ..Default::default() });
//! assert_eq!(strict.detect(b"plain text"), None);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod kind;
pub mod readonly;
pub mod scan;
pub mod sniff;

// Re-export commonly used types
pub use config::Config;
pub use error::ReadError;
pub use kind::{Category, FileKind};
pub use readonly::{open_readonly, read_head, DEFAULT_HEAD_BYTES};
pub use scan::{ScanEntry, ScanOptions, ScanReport, ScanStats, Scanner};
pub use sniff::{all_detectors, detect, MatchOptions, Matcher};
