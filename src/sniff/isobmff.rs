//! ISO base media file format (MP4, QuickTime, HEIF, AVIF, 3GP, CR3).
//!
//! Almost every ISO-BMFF file opens with an `ftyp` box; its major brand
//! names the concrete format.

use super::{Pass, Verdict};
use crate::kind::FileKind;

pub(crate) fn detect(pass: &mut Pass<'_>) -> Verdict {
    let cur = &pass.cursor;

    // Brands are ISO 8859-1 printable; this mask is a cheap approximation
    if cur.byte(8) & 0x60 == 0 {
        return Verdict::Continue;
    }

    let brand = major_brand(cur.slice(8, 4));
    Verdict::Match(kind_for_brand(&brand))
}

/// Brand text with NULs treated as padding spaces and trimmed
fn major_brand(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .replace('\0', " ")
        .trim()
        .to_string()
}

/// Map a major brand to a kind; unknown brands are generic MP4
pub fn kind_for_brand(brand: &str) -> FileKind {
    match brand {
        "avif" => FileKind::new("avif", "image/avif"),
        "mif1" => FileKind::new("heic", "image/heif"),
        "msf1" => FileKind::new("heic", "image/heif-sequence"),
        "heic" | "heix" => FileKind::new("heic", "image/heic"),
        "hevc" | "hevx" => FileKind::new("heic", "image/heic-sequence"),
        "qt" => FileKind::new("mov", "video/quicktime"),
        "M4V" | "M4VH" | "M4VP" => FileKind::new("m4v", "video/x-m4v"),
        "M4P" => FileKind::new("m4p", "video/mp4"),
        "M4B" => FileKind::new("m4b", "audio/mp4"),
        "M4A" => FileKind::new("m4a", "audio/x-m4a"),
        "F4V" => FileKind::new("f4v", "video/mp4"),
        "F4P" => FileKind::new("f4p", "video/mp4"),
        "F4A" => FileKind::new("f4a", "audio/mp4"),
        "F4B" => FileKind::new("f4b", "audio/mp4"),
        "crx" => FileKind::new("cr3", "image/x-canon-cr3"),
        b if b.starts_with("3g2") => FileKind::new("3g2", "video/3gpp2"),
        b if b.starts_with("3g") => FileKind::new("3gp", "video/3gpp"),
        _ => FileKind::new("mp4", "video/mp4"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sniff::detect;

    fn ftyp(brand: &[u8; 4]) -> Vec<u8> {
        let mut out = vec![0x00, 0x00, 0x00, 0x18];
        out.extend_from_slice(b"ftyp");
        out.extend_from_slice(brand);
        out.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
        out.extend_from_slice(b"isommp41");
        out
    }

    fn pair(buf: &[u8]) -> Option<(&'static str, &'static str)> {
        detect(buf).map(FileKind::pair)
    }

    #[test]
    fn test_brand_table() {
        assert_eq!(pair(&ftyp(b"avif")), Some(("avif", "image/avif")));
        assert_eq!(pair(&ftyp(b"heic")), Some(("heic", "image/heic")));
        assert_eq!(pair(&ftyp(b"msf1")), Some(("heic", "image/heif-sequence")));
        assert_eq!(pair(&ftyp(b"M4A ")), Some(("m4a", "audio/x-m4a")));
        assert_eq!(pair(&ftyp(b"M4B ")), Some(("m4b", "audio/mp4")));
        assert_eq!(pair(&ftyp(b"crx ")), Some(("cr3", "image/x-canon-cr3")));
    }

    #[test]
    fn test_padded_brands_are_trimmed() {
        assert_eq!(pair(&ftyp(b"qt  ")), Some(("mov", "video/quicktime")));
        assert_eq!(pair(&ftyp(b"qt\0\0")), Some(("mov", "video/quicktime")));
    }

    #[test]
    fn test_3gpp_prefixes() {
        assert_eq!(pair(&ftyp(b"3g2a")), Some(("3g2", "video/3gpp2")));
        assert_eq!(pair(&ftyp(b"3gp5")), Some(("3gp", "video/3gpp")));
    }

    #[test]
    fn test_unknown_brand_defaults_to_mp4() {
        assert_eq!(pair(&ftyp(b"isom")), Some(("mp4", "video/mp4")));
        assert_eq!(pair(&ftyp(b"dash")), Some(("mp4", "video/mp4")));
    }

    #[test]
    fn test_non_printable_brand_is_skipped() {
        // Brand starts with a byte that fails the printable mask
        let buf = ftyp(b"\x01abc");
        assert_eq!(pair(&buf), None);
    }

    #[test]
    fn test_kind_for_brand_direct() {
        assert_eq!(kind_for_brand("M4VH").extension, "m4v");
        assert_eq!(kind_for_brand("F4V").pair(), ("f4v", "video/mp4"));
        assert_eq!(kind_for_brand("").extension, "mp4");
    }
}
