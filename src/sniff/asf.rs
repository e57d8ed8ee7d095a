//! ASF header walker (Windows Media audio/video).
//!
//! Top-level header objects are a 16-byte GUID plus a 64-bit little-endian
//! size. The first Stream Properties object says whether the stream is
//! audio or video.

use super::{Pass, Verdict};
use crate::kind::FileKind;

/// First bytes of the ASF Header Object GUID
pub(crate) const ASF_MAGIC: [u8; 10] = [0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9];

/// GUID + object count + two reserved bytes
const HEADER_OBJECT_LEN: usize = 30;
/// GUID + object size
const OBJECT_HEADER_LEN: usize = 24;

/// B7DC0791-A9B7-11CF-8EE6-00C00C205365
const STREAM_PROPERTIES: [u8; 16] = [
    0x91, 0x07, 0xDC, 0xB7, 0xB7, 0xA9, 0xCF, 0x11, 0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
];
/// F8699E40-5B4D-11CF-A8FD-00805F5C442B
const AUDIO_MEDIA: [u8; 16] = [
    0x40, 0x9E, 0x69, 0xF8, 0x4D, 0x5B, 0xCF, 0x11, 0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B,
];
/// BC19EFC0-5B4D-11CF-A8FD-00805F5C442B
const VIDEO_MEDIA: [u8; 16] = [
    0xC0, 0xEF, 0x19, 0xBC, 0x4D, 0x5B, 0xCF, 0x11, 0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B,
];

const ASF_AUDIO: FileKind = FileKind::new("asf", "audio/x-ms-asf");
const ASF_VIDEO: FileKind = FileKind::new("asf", "video/x-ms-asf");
const ASF_GENERIC: FileKind = FileKind::new("asf", "application/vnd.ms-asf");

pub(crate) fn detect(pass: &mut Pass<'_>) -> Verdict {
    let cur = &mut pass.cursor;
    cur.advance(HEADER_OBJECT_LEN);

    while cur.remaining() > OBJECT_HEADER_LEN {
        let is_stream_properties = cur.check(&STREAM_PROPERTIES, 0);
        let object_size = cur.u64_le(16);
        cur.advance(OBJECT_HEADER_LEN);

        if is_stream_properties {
            if cur.check(&AUDIO_MEDIA, 0) {
                return Verdict::Match(ASF_AUDIO);
            }
            if cur.check(&VIDEO_MEDIA, 0) {
                return Verdict::Match(ASF_VIDEO);
            }
            break;
        }

        // A size smaller than its own header cannot be walked past
        let Some(payload) = object_size.checked_sub(OBJECT_HEADER_LEN as u64) else {
            break;
        };
        cur.advance(usize::try_from(payload).unwrap_or(usize::MAX));
    }

    // Legacy behaviour: a valid header GUID is enough to call it ASF
    Verdict::Match(ASF_GENERIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sniff::detect;

    fn header_object() -> Vec<u8> {
        let mut out = ASF_MAGIC.to_vec();
        out.extend_from_slice(&[0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C]); // rest of the GUID
        out.extend_from_slice(&0u64.to_le_bytes()); // header size (unused here)
        out.extend_from_slice(&2u32.to_le_bytes()); // object count
        out.extend_from_slice(&[0x01, 0x02]);
        out
    }

    fn object(guid: &[u8; 16], payload: &[u8]) -> Vec<u8> {
        let mut out = guid.to_vec();
        out.extend_from_slice(&((payload.len() + OBJECT_HEADER_LEN) as u64).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn stream_properties(media: &[u8; 16]) -> Vec<u8> {
        let mut payload = media.to_vec();
        payload.extend_from_slice(&[0u8; 40]);
        object(&STREAM_PROPERTIES, &payload)
    }

    #[test]
    fn test_audio_stream() {
        let mut buf = header_object();
        buf.extend(object(&[0x11; 16], &[0u8; 80])); // file properties stand-in
        buf.extend(stream_properties(&AUDIO_MEDIA));
        assert_eq!(
            detect(&buf).map(FileKind::pair),
            Some(("asf", "audio/x-ms-asf"))
        );
    }

    #[test]
    fn test_video_stream() {
        let mut buf = header_object();
        buf.extend(stream_properties(&VIDEO_MEDIA));
        assert_eq!(
            detect(&buf).map(FileKind::pair),
            Some(("asf", "video/x-ms-asf"))
        );
    }

    #[test]
    fn test_unknown_stream_type_is_generic() {
        let mut buf = header_object();
        buf.extend(stream_properties(&[0x22; 16]));
        assert_eq!(detect(&buf), Some(ASF_GENERIC));
    }

    #[test]
    fn test_truncated_header_is_generic() {
        assert_eq!(detect(&ASF_MAGIC), Some(ASF_GENERIC));
    }

    #[test]
    fn test_undersized_object_stops_walk() {
        let mut buf = header_object();
        let mut bogus = [0x33u8; 16].to_vec();
        bogus.extend_from_slice(&4u64.to_le_bytes());
        buf.extend(bogus);
        buf.extend(stream_properties(&VIDEO_MEDIA));
        assert_eq!(detect(&buf), Some(ASF_GENERIC));
    }
}
