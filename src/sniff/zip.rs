//! ZIP local-file-header walker.
//!
//! Office Open XML, OpenDocument, EPUB, XPI and 3MF are all plain ZIP
//! archives; they are told apart by the names (and for ODF/EPUB, the stored
//! `mimetype` member) of the entries near the start of the archive.

use super::bytes::Cursor;
use super::{Pass, Verdict};
use crate::kind::FileKind;

pub(crate) const LOCAL_HEADER: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const LOCAL_HEADER_LEN: usize = 30;

pub(crate) const ZIP: FileKind = FileKind::new("zip", "application/zip");

const XPI: FileKind = FileKind::new("xpi", "application/x-xpinstall");
const DOCX: FileKind = FileKind::new(
    "docx",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
);
const PPTX: FileKind = FileKind::new(
    "pptx",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
);
const XLSX: FileKind = FileKind::new(
    "xlsx",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
);
const THREE_MF: FileKind = FileKind::new("3mf", "model/3mf");

/// Containers that announce themselves through a stored `mimetype` entry
const MIMETYPE_KINDS: &[FileKind] = &[
    FileKind::new("epub", "application/epub+zip"),
    FileKind::new("odt", "application/vnd.oasis.opendocument.text"),
    FileKind::new("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    FileKind::new("odp", "application/vnd.oasis.opendocument.presentation"),
];

/// The fields of a local file header this walker cares about
#[derive(Debug)]
struct LocalHeader<'a> {
    compressed_size: u32,
    uncompressed_size: u32,
    name: &'a [u8],
}

impl<'a> LocalHeader<'a> {
    /// Read the header at the cursor and leave the cursor at the entry data
    fn read(cur: &mut Cursor<'a>) -> Self {
        let compressed_size = cur.u32_le(18);
        let uncompressed_size = cur.u32_le(22);
        let name_len = usize::from(cur.u16_le(26));
        let extra_len = usize::from(cur.u16_le(28));

        cur.advance(LOCAL_HEADER_LEN);
        let name = cur.slice(0, name_len);
        cur.advance(name_len);
        cur.advance(extra_len);

        Self {
            compressed_size,
            uncompressed_size,
            name,
        }
    }
}

pub(crate) fn detect(pass: &mut Pass<'_>) -> Verdict {
    let cur = &mut pass.cursor;

    // Not even one complete header: a truncated archive, not a generic ZIP
    if cur.remaining() < LOCAL_HEADER_LEN {
        tracing::trace!(len = cur.len(), "ZIP header truncated");
        return Verdict::Reject;
    }

    while cur.remaining() >= LOCAL_HEADER_LEN {
        let entry = LocalHeader::read(cur);

        if let Some(kind) = kind_from_name(entry.name) {
            return Verdict::Match(kind);
        }

        if entry.name == b"mimetype" && entry.compressed_size == entry.uncompressed_size {
            let stored = cur.slice(0, entry.compressed_size as usize);
            if let Some(kind) = kind_from_mimetype(stored) {
                return Verdict::Match(kind);
            }
        }

        if entry.compressed_size == 0 {
            // Streamed entry (sizes live in a trailing data descriptor) or a
            // corrupt header: resynchronise on the next local header magic
            match memchr::memmem::find(cur.rest(), &LOCAL_HEADER) {
                Some(skip) => {
                    tracing::trace!(at = cur.pos() + skip, "ZIP resync on local header");
                    cur.advance(skip);
                }
                None => break,
            }
        } else {
            cur.advance(entry.compressed_size as usize);
        }
    }

    Verdict::Match(ZIP)
}

/// Entry names that identify the container on their own
fn kind_from_name(name: &[u8]) -> Option<FileKind> {
    // Signed add-ons from addons.mozilla.org
    if name == b"META-INF/mozilla.rsa" {
        return Some(XPI);
    }

    if name.ends_with(b".rels") || name.ends_with(b".xml") {
        let top = name.split(|&b| b == b'/').next().unwrap_or_default();
        match top {
            b"word" => return Some(DOCX),
            b"ppt" => return Some(PPTX),
            b"xl" => return Some(XLSX),
            _ => {}
        }
    }

    if name.starts_with(b"xl/") {
        return Some(XLSX);
    }

    if is_3mf_model(name) {
        return Some(THREE_MF);
    }

    None
}

/// `3D/<something>.model`
fn is_3mf_model(name: &[u8]) -> bool {
    const PREFIX: &[u8] = b"3D/";
    const SUFFIX: &[u8] = b".model";

    name.len() > PREFIX.len() + SUFFIX.len()
        && name.starts_with(PREFIX)
        && name.ends_with(SUFFIX)
        && !name[PREFIX.len()..name.len() - SUFFIX.len()].contains(&b'\n')
}

fn kind_from_mimetype(stored: &[u8]) -> Option<FileKind> {
    let mime = std::str::from_utf8(stored).ok()?;
    MIMETYPE_KINDS.iter().copied().find(|k| k.mime == mime)
}
