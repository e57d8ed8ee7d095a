//! EBML header walker (Matroska and WebM).
//!
//! Both formats share the EBML root element; the `DocType` child says which
//! one this is. Unknown doc types are reported as no match rather than guessed.

use super::bytes::{read_vint, Cursor};
use super::{Pass, Verdict};
use crate::kind::FileKind;

pub(crate) const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
const DOC_TYPE_ID: u64 = 0x4282;

/// An element header: variable-length ID and payload size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Element {
    id: u64,
    size: u64,
}

/// Read an element header at the cursor and step over it
fn read_element(cur: &mut Cursor<'_>) -> Option<Element> {
    let (id, id_width) = read_vint(cur.buf(), cur.pos(), false)?;
    cur.advance(id_width);
    let (size, size_width) = read_vint(cur.buf(), cur.pos(), true)?;
    cur.advance(size_width);
    Some(Element { id, size })
}

/// Walk the root's children, at most `children` of them, looking for `DocType`
fn find_doc_type<'a>(cur: &mut Cursor<'a>, mut children: u64) -> Option<&'a str> {
    while children > 0 {
        let element = read_element(cur)?;
        let size = usize::try_from(element.size).unwrap_or(usize::MAX);

        if element.id == DOC_TYPE_ID {
            let raw = cur.slice(0, size);
            let end = memchr::memchr(0, raw).unwrap_or(raw.len());
            return std::str::from_utf8(&raw[..end]).ok();
        }

        cur.advance(size);
        children -= 1;
    }
    None
}

pub(crate) fn detect(pass: &mut Pass<'_>) -> Verdict {
    let cur = &mut pass.cursor;

    let doc_type = read_element(cur).and_then(|root| find_doc_type(cur, root.size));

    match doc_type {
        Some("webm") => Verdict::Match(FileKind::new("webm", "video/webm")),
        Some("matroska") => Verdict::Match(FileKind::new("mkv", "video/x-matroska")),
        other => {
            tracing::trace!(doc_type = ?other, "Unrecognised EBML doc type");
            Verdict::Reject
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sniff::detect;

    /// EBML header with version elements before the DocType
    fn ebml_with_doc_type(doc_type: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&[0x42, 0x86, 0x81, 0x01]); // EBMLVersion = 1
        body.extend_from_slice(&[0x42, 0xF7, 0x81, 0x01]); // EBMLReadVersion = 1
        body.extend_from_slice(&[0x42, 0x82, 0x80 | doc_type.len() as u8]);
        body.extend_from_slice(doc_type);
        body.extend_from_slice(&[0x42, 0x87, 0x81, 0x04]); // DocTypeVersion = 4

        let mut out = EBML_MAGIC.to_vec();
        out.push(0x80 | body.len() as u8);
        out.extend(body);
        out
    }

    #[test]
    fn test_webm() {
        let buf = ebml_with_doc_type(b"webm");
        assert_eq!(
            detect(&buf).map(FileKind::pair),
            Some(("webm", "video/webm"))
        );
    }

    #[test]
    fn test_matroska() {
        let buf = ebml_with_doc_type(b"matroska");
        assert_eq!(
            detect(&buf).map(FileKind::pair),
            Some(("mkv", "video/x-matroska"))
        );
    }

    #[test]
    fn test_doc_type_padding_is_stripped() {
        let buf = ebml_with_doc_type(b"webm\0\0");
        assert_eq!(detect(&buf).map(|k| k.extension), Some("webm"));
    }

    #[test]
    fn test_unknown_doc_type_is_no_match() {
        let buf = ebml_with_doc_type(b"mka3d");
        assert_eq!(detect(&buf), None);
    }

    #[test]
    fn test_truncated_header_is_no_match() {
        assert_eq!(detect(&EBML_MAGIC), None);
        let buf = ebml_with_doc_type(b"webm");
        assert_eq!(detect(&buf[..10]), None);
    }

    #[test]
    fn test_child_budget_is_respected() {
        // Root claims two children; DocType is the third
        let mut buf = ebml_with_doc_type(b"webm");
        buf[4] = 0x82;
        assert_eq!(detect(&buf), None);
    }

    #[test]
    fn test_read_element() {
        let data = [0x42, 0x82, 0x84, b'w', b'e', b'b', b'm'];
        let mut cur = Cursor::new(&data);
        assert_eq!(
            read_element(&mut cur),
            Some(Element {
                id: DOC_TYPE_ID,
                size: 4
            })
        );
        assert_eq!(cur.pos(), 3);
    }

    #[test]
    fn test_unknown_size_root_terminates() {
        // 0x01FF.. is the reserved "unknown size"; the walk must still end
        let mut buf = EBML_MAGIC.to_vec();
        buf.extend_from_slice(&[0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        buf.extend_from_slice(&[0x42, 0x86, 0x81, 0x01]);
        assert_eq!(detect(&buf), None);
    }
}
