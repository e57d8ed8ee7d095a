//! Property tests for the signature matcher

use magic_drill::{detect, MatchOptions, Matcher};
use proptest::prelude::*;

/// Heads of real-world shaped files that exercise the container walkers
fn known_vectors() -> Vec<Vec<u8>> {
    let mut zip = vec![0x50, 0x4B, 0x03, 0x04, 0x14, 0x00, 0x00, 0x00, 0x00, 0x00];
    zip.extend_from_slice(&[0x00; 8]);
    zip.extend_from_slice(&20u32.to_le_bytes());
    zip.extend_from_slice(&20u32.to_le_bytes());
    zip.extend_from_slice(&8u16.to_le_bytes());
    zip.extend_from_slice(&0u16.to_le_bytes());
    zip.extend_from_slice(b"mimetype");
    zip.extend_from_slice(b"application/epub+zip");

    let mut ftyp = vec![0x00, 0x00, 0x00, 0x18];
    ftyp.extend_from_slice(b"ftypheic\x00\x00\x00\x00mif1heic");

    let mut id3 = b"ID3\x04\x00\x00\x00\x00\x00\x04".to_vec();
    id3.extend_from_slice(&[0, 0, 0, 0, 0xFF, 0xFB, 0x90, 0x00]);

    let mut png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend_from_slice(&[0, 0, 0, 8]);
    png.extend_from_slice(b"acTL\x00\x00\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00");

    vec![
        zip,
        ftyp,
        id3,
        png,
        vec![0x1A, 0x45, 0xDF, 0xA3, 0x88, 0x42, 0x82, 0x84, b'w', b'e', b'b', b'm'],
        b"OggS\x00\x02\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00OpusHead".to_vec(),
    ]
}

proptest! {
    #[test]
    fn detect_is_deterministic(buf in proptest::collection::vec(any::<u8>(), 0..2048)) {
        prop_assert_eq!(detect(&buf), detect(&buf));
    }

    #[test]
    fn arbitrary_input_never_panics(
        buf in proptest::collection::vec(any::<u8>(), 0..4100),
        depth in 0usize..8,
        strict in any::<bool>(),
    ) {
        let matcher = Matcher::new(MatchOptions { max_id3_depth: depth, strict_tar: strict });
        let _ = matcher.detect(&buf);
    }

    #[test]
    fn signature_prefix_with_noise_never_panics(
        which in 0usize..6,
        tail in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut buf = known_vectors()[which].clone();
        buf.truncate(8);
        buf.extend(tail);
        let _ = detect(&buf);
    }

    #[test]
    fn truncation_is_safe(which in 0usize..6, cut in 0usize..64) {
        let v = &known_vectors()[which];
        let end = cut.min(v.len());
        let _ = detect(&v[..end]);
    }

    #[test]
    fn id3_chains_are_bounded(layers in 0usize..64) {
        let mut buf = Vec::new();
        for _ in 0..layers {
            buf.extend_from_slice(b"ID3\x04\x00\x00\x00\x00\x00\x00");
        }
        buf.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        prop_assert_eq!(detect(&buf).map(|k| k.extension), Some("mp3"));
    }
}

#[test]
fn known_vectors_are_recognised() {
    let expected = ["epub", "heic", "mp3", "apng", "webm", "opus"];
    for (v, ext) in known_vectors().iter().zip(expected) {
        assert_eq!(detect(v).map(|k| k.extension), Some(ext));
    }
}
