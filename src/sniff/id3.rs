//! ID3v2 tag skipping.
//!
//! An ID3v2 tag is prepended metadata, not a format of its own. The tag is
//! stepped over and the full table runs again on the bytes after it.

use super::bytes::synchsafe_u32;
use super::{Pass, Verdict};
use crate::kind::FileKind;

/// "ID3", version, revision, flags
const SIZE_OFFSET: usize = 6;
const TAG_HEADER_LEN: usize = 10;

const MP3: FileKind = FileKind::new("mp3", "audio/mpeg");

pub(crate) fn detect(pass: &mut Pass<'_>) -> Verdict {
    let cur = &pass.cursor;
    let size = synchsafe_u32([
        cur.byte(SIZE_OFFSET),
        cur.byte(SIZE_OFFSET + 1),
        cur.byte(SIZE_OFFSET + 2),
        cur.byte(SIZE_OFFSET + 3),
    ]);
    let end = TAG_HEADER_LEN + size as usize;

    // Tag runs past the sniffed prefix: only the tag is visible, assume MP3
    if end > cur.len() {
        return Verdict::Match(MP3);
    }

    if pass.depth() >= pass.options().max_id3_depth {
        tracing::trace!(depth = pass.depth(), "ID3 nesting limit reached");
        return Verdict::Match(MP3);
    }

    match pass.descend(&cur.buf()[end..]) {
        Some(kind) => Verdict::Match(kind),
        None => Verdict::Reject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sniff::{detect, MatchOptions, Matcher};

    fn tag(body_len: u32) -> Vec<u8> {
        let mut out = b"ID3\x04\x00\x00".to_vec();
        out.extend_from_slice(&[
            ((body_len >> 21) & 0x7F) as u8,
            ((body_len >> 14) & 0x7F) as u8,
            ((body_len >> 7) & 0x7F) as u8,
            (body_len & 0x7F) as u8,
        ]);
        out.resize(TAG_HEADER_LEN + body_len as usize, 0);
        out
    }

    #[test]
    fn test_tag_then_mpeg_frame() {
        let mut buf = tag(300);
        buf.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
        assert_eq!(detect(&buf), Some(MP3));
    }

    #[test]
    fn test_tag_then_flac() {
        let mut buf = tag(20);
        buf.extend_from_slice(b"fLaC\x00\x00\x00\x22");
        assert_eq!(
            detect(&buf).map(FileKind::pair),
            Some(("flac", "audio/x-flac"))
        );
    }

    #[test]
    fn test_tag_longer_than_buffer_is_mp3() {
        let buf = tag(4096);
        assert_eq!(detect(&buf[..64]), Some(MP3));
    }

    #[test]
    fn test_unknown_payload_is_no_match() {
        let mut buf = tag(16);
        buf.extend_from_slice(b"not audio at all");
        assert_eq!(detect(&buf), None);
    }

    #[test]
    fn test_nested_tags_stop_at_depth_limit() {
        let mut buf = Vec::new();
        for _ in 0..6 {
            buf.extend(tag(0));
        }
        buf.extend_from_slice(b"fLaC\x00\x00\x00\x22");

        let shallow = Matcher::new(MatchOptions {
            max_id3_depth: 2,
            ..Default::default()
        });
        assert_eq!(shallow.detect(&buf), Some(MP3));

        let deep = Matcher::new(MatchOptions {
            max_id3_depth: 8,
            ..Default::default()
        });
        assert_eq!(deep.detect(&buf).map(|k| k.extension), Some("flac"));
    }
}
