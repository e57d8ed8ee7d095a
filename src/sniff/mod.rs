//! Signature matcher - identify a buffer by its magic bytes.
//!
//! Given the first few kilobytes of a file, walks an ordered table of
//! detectors and reports the extension and MIME type of the first one that
//! matches.
//!
//! # Design
//!
//! - **Ordered table**: [`signatures::all_detectors`] is the single source of
//!   precedence. Longer, more specific signatures sit above short or
//!   ambiguous ones; the tar checksum and MPEG frame sync run last.
//! - **Zero-filled reads**: every byte read past the end of the buffer is
//!   `0x00`, so truncated input degrades to "no match" instead of panicking.
//! - **Container walkers**: ZIP, ISO-BMFF, EBML, ASF and PNG need more than a
//!   prefix compare; their detectors hand a [`Pass`] to a sub-parser that
//!   moves the cursor through the structure.
//! - **ID3 recursion**: an ID3v2 tag is skipped and the whole table is run
//!   again on what follows, bounded by [`MatchOptions::max_id3_depth`].
//!
//! A [`Matcher`] holds no mutable state; one instance can be shared freely
//! across threads.

mod asf;
pub mod bytes;
mod ebml;
mod id3;
mod isobmff;
mod png;
pub mod signatures;
mod tar;
mod zip;

use serde::{Deserialize, Serialize};

use crate::kind::FileKind;
pub use bytes::Cursor;
pub use signatures::{all_detectors, Detector, Outcome};

/// Default cap on nested ID3 tag skipping
pub const DEFAULT_MAX_ID3_DEPTH: usize = 4;

/// Tunables for a [`Matcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOptions {
    /// How many ID3 tags may be skipped before falling back to `mp3`
    pub max_id3_depth: usize,
    /// Require the `ustar` magic at offset 257 before trusting a tar checksum
    pub strict_tar: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_id3_depth: DEFAULT_MAX_ID3_DEPTH,
            strict_tar: false,
        }
    }
}

/// What a sub-parser decided after looking past the signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The buffer is this kind
    Match(FileKind),
    /// Not this detector after all; try the next one
    Continue,
    /// The structure is recognisably broken or unknown; stop with no match
    Reject,
}

/// State of one detection pass: the cursor plus what recursion needs.
pub struct Pass<'a> {
    pub cursor: Cursor<'a>,
    options: &'a MatchOptions,
    depth: usize,
}

impl<'a> Pass<'a> {
    fn new(buf: &'a [u8], options: &'a MatchOptions, depth: usize) -> Self {
        Self {
            cursor: Cursor::new(buf),
            options,
            depth,
        }
    }

    pub fn options(&self) -> &MatchOptions {
        self.options
    }

    /// ID3 nesting level of this pass (0 at the top)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run the full detector table on `inner` one level deeper
    pub fn descend(&self, inner: &[u8]) -> Option<FileKind> {
        run(inner, self.options, self.depth + 1)
    }
}

/// The signature matcher
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    options: MatchOptions,
}

impl Matcher {
    pub fn new(options: MatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Identify `buf`. `None` is the normal answer for unrecognised data.
    pub fn detect(&self, buf: &[u8]) -> Option<FileKind> {
        run(buf, &self.options, 0)
    }
}

/// Identify `buf` with default options
pub fn detect(buf: &[u8]) -> Option<FileKind> {
    run(buf, &MatchOptions::default(), 0)
}

fn run(buf: &[u8], options: &MatchOptions, depth: usize) -> Option<FileKind> {
    for detector in all_detectors() {
        let mut pass = Pass::new(buf, options, depth);
        if !detector.matches(&pass.cursor) {
            continue;
        }

        match detector.outcome {
            Outcome::Fixed(kind) => {
                tracing::trace!(detector = detector.name, depth, "Signature matched");
                return Some(kind);
            }
            Outcome::Parse(parse) => match parse(&mut pass) {
                Verdict::Match(kind) => {
                    tracing::trace!(
                        detector = detector.name,
                        depth,
                        extension = kind.extension,
                        "Container parsed"
                    );
                    return Some(kind);
                }
                Verdict::Continue => continue,
                Verdict::Reject => {
                    tracing::trace!(detector = detector.name, depth, "Container rejected");
                    return None;
                }
            },
        }
    }
    None
}
