//! PNG chunk walker, telling animated PNG apart from still images.
//!
//! An APNG carries an `acTL` chunk somewhere before its first `IDAT`.

use super::{Pass, Verdict};
use crate::kind::FileKind;

pub(crate) const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Chunk length (i32 BE) plus chunk type
const CHUNK_HEADER_LEN: usize = 8;
const CRC_LEN: usize = 4;

const PNG: FileKind = FileKind::new("png", "image/png");
const APNG: FileKind = FileKind::new("apng", "image/apng");

pub(crate) fn detect(pass: &mut Pass<'_>) -> Verdict {
    let cur = &mut pass.cursor;
    cur.advance(PNG_MAGIC.len());

    loop {
        let length = cur.i32_be(0);
        let chunk_type = cur.slice(4, 4);
        cur.advance(CHUNK_HEADER_LEN);

        let Ok(length) = usize::try_from(length) else {
            tracing::trace!(length, "Negative PNG chunk length");
            return Verdict::Reject;
        };

        match chunk_type {
            b"IDAT" => return Verdict::Match(PNG),
            b"acTL" => return Verdict::Match(APNG),
            _ => cur.advance(length.saturating_add(CRC_LEN)),
        }

        if cur.remaining() <= CHUNK_HEADER_LEN {
            break;
        }
    }

    Verdict::Match(PNG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sniff::detect;

    fn chunk(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut out = (data.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(tag);
        out.extend_from_slice(data);
        out.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]); // CRC, not checked
        out
    }

    fn png_with(chunks: &[Vec<u8>]) -> Vec<u8> {
        let mut out = PNG_MAGIC.to_vec();
        out.extend(chunk(b"IHDR", &[0u8; 13]));
        for c in chunks {
            out.extend_from_slice(c);
        }
        out
    }

    #[test]
    fn test_still_png() {
        let buf = png_with(&[chunk(b"IDAT", &[0x78, 0x9C, 0x00])]);
        assert_eq!(detect(&buf).map(FileKind::pair), Some(("png", "image/png")));
    }

    #[test]
    fn test_animated_png() {
        let buf = png_with(&[
            chunk(b"acTL", &[0, 0, 0, 2, 0, 0, 0, 0]),
            chunk(b"IDAT", &[0x78, 0x9C, 0x00]),
        ]);
        assert_eq!(
            detect(&buf).map(FileKind::pair),
            Some(("apng", "image/apng"))
        );
    }

    #[test]
    fn test_actl_after_idat_is_still() {
        let buf = png_with(&[
            chunk(b"IDAT", &[0x78, 0x9C, 0x00]),
            chunk(b"acTL", &[0, 0, 0, 2, 0, 0, 0, 0]),
        ]);
        assert_eq!(detect(&buf), Some(PNG));
    }

    #[test]
    fn test_ancillary_chunks_are_skipped() {
        let buf = png_with(&[
            chunk(b"gAMA", &[0, 0, 0xB1, 0x8F]),
            chunk(b"tEXt", b"Comment\0hello"),
            chunk(b"acTL", &[0, 0, 0, 1, 0, 0, 0, 0]),
        ]);
        assert_eq!(detect(&buf), Some(APNG));
    }

    #[test]
    fn test_negative_chunk_length_is_no_match() {
        let mut buf = PNG_MAGIC.to_vec();
        buf.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xF0]);
        buf.extend_from_slice(b"IHDR");
        buf.extend_from_slice(&[0u8; 17]);
        assert_eq!(detect(&buf), None);
    }

    #[test]
    fn test_truncated_walk_defaults_to_png() {
        assert_eq!(detect(&PNG_MAGIC), Some(PNG));
        let buf = png_with(&[]);
        assert_eq!(detect(&buf), Some(PNG));
    }
}
