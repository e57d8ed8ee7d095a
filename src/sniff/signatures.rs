//! Detector table for the signature matcher.
//!
//! Each detector defines magic bytes, the offset they sit at, an optional
//! per-byte mask, and either a fixed result or a sub-parser that looks
//! further into the buffer. The table is evaluated top to bottom and the
//! first match wins, so the order below is part of the contract.

use super::{asf, ebml, id3, isobmff, png, tar, zip};
use super::{Cursor, Pass, Verdict};
use crate::kind::FileKind;

/// Sub-parser invoked once a detector's pattern matched
pub type Parser = fn(&mut Pass<'_>) -> Verdict;

/// What happens when a detector's pattern matches
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    /// The pattern alone decides
    Fixed(FileKind),
    /// A sub-parser decides
    Parse(Parser),
}

/// One ordered rule of the matcher
#[derive(Debug, Clone, Copy)]
pub struct Detector {
    pub name: &'static str,
    /// Magic bytes; empty means "always attempt the outcome"
    pub pattern: &'static [u8],
    /// Offset from the cursor where the pattern appears (usually 0)
    pub offset: usize,
    /// Per-byte mask applied to both buffer and pattern
    pub mask: Option<&'static [u8]>,
    pub outcome: Outcome,
}

impl Detector {
    const fn fixed(
        name: &'static str,
        pattern: &'static [u8],
        extension: &'static str,
        mime: &'static str,
    ) -> Self {
        Self {
            name,
            pattern,
            offset: 0,
            mask: None,
            outcome: Outcome::Fixed(FileKind::new(extension, mime)),
        }
    }

    const fn kind(name: &'static str, pattern: &'static [u8], kind: FileKind) -> Self {
        Self {
            name,
            pattern,
            offset: 0,
            mask: None,
            outcome: Outcome::Fixed(kind),
        }
    }

    const fn parse(name: &'static str, pattern: &'static [u8], parser: Parser) -> Self {
        Self {
            name,
            pattern,
            offset: 0,
            mask: None,
            outcome: Outcome::Parse(parser),
        }
    }

    const fn at(self, offset: usize) -> Self {
        Self { offset, ..self }
    }

    const fn masked(self, mask: &'static [u8]) -> Self {
        Self {
            mask: Some(mask),
            ..self
        }
    }

    /// Does the pattern match at the cursor?
    pub fn matches(&self, cursor: &Cursor<'_>) -> bool {
        match self.mask {
            Some(mask) => cursor.check_masked(self.pattern, self.offset, mask),
            None => cursor.check(self.pattern, self.offset),
        }
    }
}

// Kinds shared by several detectors
const EPS: FileKind = FileKind::new("eps", "application/eps");
const COMPRESS: FileKind = FileKind::new("Z", "application/x-compress");
const MUSEPACK: FileKind = FileKind::new("mpc", "audio/x-musepack");
const SWF: FileKind = FileKind::new("swf", "application/x-shockwave-flash");
const PCAP: FileKind = FileKind::new("pcap", "application/vnd.tcpdump.pcap");
const CAB: FileKind = FileKind::new("cab", "application/vnd.ms-cab-compressed");
const MOV: FileKind = FileKind::new("mov", "video/quicktime");
const HTML: FileKind = FileKind::new("html", "text/html");
const MPEG: FileKind = FileKind::new("mpg", "video/mpeg");
const MP3: FileKind = FileKind::new("mp3", "audio/mpeg");
const AAC: FileKind = FileKind::new("aac", "audio/aac");

static DETECTORS: &[Detector] = &[
    // -- 2-byte signatures --
    Detector::fixed("BMP", &[0x42, 0x4D], "bmp", "image/bmp"),
    Detector::fixed("AC-3", &[0x0B, 0x77], "ac3", "audio/vnd.dolby.dd-raw"),
    Detector::fixed("DMG", &[0x78, 0x01], "dmg", "application/x-apple-diskimage"),
    Detector::fixed("PE/EXE", &[0x4D, 0x5A], "exe", "application/x-msdownload"),
    Detector::parse("PostScript", &[0x25, 0x21], postscript),
    Detector::kind("compress (LZH)", &[0x1F, 0xA0], COMPRESS),
    Detector::kind("compress (LZW)", &[0x1F, 0x9D], COMPRESS),
    // -- 3-byte signatures --
    Detector::fixed("JPEG", &[0xFF, 0xD8, 0xFF], "jpg", "image/jpeg"),
    Detector::fixed("JPEG XR", &[0x49, 0x49, 0xBC], "jxr", "image/vnd.ms-photo"),
    Detector::fixed("GZIP", &[0x1F, 0x8B, 0x08], "gz", "application/gzip"),
    Detector::fixed("BZIP2", &[0x42, 0x5A, 0x68], "bz2", "application/x-bzip2"),
    Detector::parse("ID3v2", b"ID3", id3::detect),
    Detector::kind("Musepack SV7", b"MP+", MUSEPACK),
    Detector::kind("SWF (zlib)", b"CWS", SWF),
    Detector::kind("SWF", b"FWS", SWF),
    // -- 4-byte signatures --
    Detector::fixed("GIF", b"GIF", "gif", "image/gif"),
    Detector::fixed("FLIF", b"FLIF", "flif", "image/flif"),
    Detector::fixed("Photoshop PSD", b"8BPS", "psd", "image/vnd.adobe.photoshop"),
    Detector::fixed("WebP", b"WEBP", "webp", "image/webp").at(8),
    Detector::kind("Musepack SV8", b"MPCK", MUSEPACK),
    Detector::fixed("AIFF", b"FORM", "aif", "audio/aiff"),
    Detector::fixed("Apple icon", b"icns", "icns", "image/icns"),
    // Must run before the generic ZIP rule: it looks inside the archive
    Detector::parse("ZIP local file", &zip::LOCAL_HEADER, zip::detect),
    Detector::parse("Ogg", b"OggS", ogg),
    Detector::parse("ZIP", &[0x50, 0x4B], zip_other),
    Detector::parse("ISO-BMFF", b"ftyp", isobmff::detect).at(4),
    Detector::fixed("MIDI", b"MThd", "mid", "audio/midi"),
    Detector::parse("WOFF", b"wOFF", woff),
    Detector::parse("WOFF2", b"wOF2", woff2),
    Detector::kind("PCAP (LE)", &[0xD4, 0xC3, 0xB2, 0xA1], PCAP),
    Detector::kind("PCAP (BE)", &[0xA1, 0xB2, 0xC3, 0xD4], PCAP),
    Detector::fixed("DSD Stream", b"DSD ", "dsf", "audio/x-dsf"),
    Detector::fixed("LZIP", b"LZIP", "lz", "application/x-lzip"),
    Detector::fixed("FLAC", b"fLaC", "flac", "audio/x-flac"),
    Detector::fixed("BPG", &[0x42, 0x50, 0x47, 0xFB], "bpg", "image/bpg"),
    Detector::fixed("WavPack", b"wvpk", "wv", "audio/wavpack"),
    Detector::parse("PDF", b"%PDF", pdf),
    Detector::fixed("WASM", &[0x00, 0x61, 0x73, 0x6D], "wasm", "application/wasm"),
    Detector::parse("TIFF (LE)", &[0x49, 0x49, 0x2A, 0x00], tiff_le),
    Detector::fixed("TIFF (BE)", &[0x4D, 0x4D, 0x00, 0x2A], "tif", "image/tiff"),
    Detector::fixed("Monkey's Audio", b"MAC ", "ape", "audio/ape"),
    Detector::parse("EBML", &ebml::EBML_MAGIC, ebml::detect),
    Detector::parse("RIFF", b"RIFF", riff),
    Detector::fixed("SQLite", b"SQLi", "sqlite", "application/x-sqlite3"),
    Detector::fixed(
        "NES ROM",
        &[0x4E, 0x45, 0x53, 0x1A],
        "nes",
        "application/x-nintendo-nes-rom",
    ),
    Detector::fixed(
        "Chrome extension",
        b"Cr24",
        "crx",
        "application/x-google-chrome-extension",
    ),
    Detector::kind("Cabinet", b"MSCF", CAB),
    Detector::kind("InstallShield cabinet", b"ISc(", CAB),
    Detector::fixed("RPM", &[0xED, 0xAB, 0xEE, 0xDB], "rpm", "application/x-rpm"),
    Detector::kind("EPS (binary)", &[0xC5, 0xD0, 0xD3, 0xC6], EPS),
    Detector::fixed("Zstandard", &[0x28, 0xB5, 0x2F, 0xFD], "zst", "application/zstd"),
    // -- 5-byte signatures --
    Detector::fixed("OpenType", &[0x4F, 0x54, 0x54, 0x4F, 0x00], "otf", "font/otf"),
    Detector::fixed("AMR", b"#!AMR", "amr", "audio/amr"),
    Detector::fixed("RTF", b"{\\rtf", "rtf", "application/rtf"),
    Detector::fixed("FLV", &[0x46, 0x4C, 0x56, 0x01], "flv", "video/x-flv"),
    Detector::fixed("Impulse Tracker", b"IMPM", "it", "audio/x-it"),
    Detector::fixed("ELF", &[0x7F, 0x45, 0x4C, 0x46], "", "application/x-elf"),
    Detector::parse("LZH", b"-l", lzh).at(2),
    Detector::parse("MPEG-PS", &[0x00, 0x00, 0x01, 0xBA], mpeg_ps),
    Detector::fixed("CHM", b"ITSF", "chm", "application/vnd.ms-htmlhelp"),
    // -- 6-byte signatures --
    Detector::fixed("XZ", &[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00], "xz", "application/x-xz"),
    Detector::fixed("XML", b"<?xml ", "xml", "application/xml"),
    Detector::fixed("iCalendar", b"BEGIN:", "ics", "text/calendar"),
    Detector::fixed(
        "7z",
        &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C],
        "7z",
        "application/x-7z-compressed",
    ),
    Detector::parse("RAR", &[0x52, 0x61, 0x72, 0x21, 0x1A, 0x07], rar),
    Detector::fixed("STL (ASCII)", b"solid ", "stl", "model/stl"),
    // -- 7-byte signatures --
    Detector::fixed("Blender", b"BLENDER", "blend", "application/x-blender"),
    Detector::parse("ar", b"!<arch>", ar),
    // -- 8-byte signatures --
    Detector::parse("PNG", &png::PNG_MAGIC, png::detect),
    Detector::fixed(
        "Apache Arrow",
        &[0x41, 0x52, 0x52, 0x4F, 0x57, 0x31, 0x00, 0x00],
        "arrow",
        "application/x-apache-arrow",
    ),
    Detector::fixed(
        "glTF binary",
        &[0x67, 0x6C, 0x54, 0x46, 0x02, 0x00, 0x00, 0x00],
        "glb",
        "model/gltf-binary",
    ),
    Detector::fixed("GIMP XCF", b"gimp xcf ", "xcf", "image/x-xcf"),
    Detector::kind("QuickTime free", b"free", MOV).at(4),
    Detector::kind("QuickTime mdat", b"mdat", MOV).at(4),
    Detector::kind("QuickTime moov", b"moov", MOV).at(4),
    Detector::kind("QuickTime wide", b"wide", MOV).at(4),
    // -- 9-byte signatures --
    Detector::fixed(
        "Olympus ORF",
        &[0x49, 0x49, 0x52, 0x4F, 0x08, 0x00, 0x00, 0x00, 0x18],
        "orf",
        "image/x-olympus-orf",
    ),
    // -- 12-byte signatures --
    Detector::fixed(
        "Panasonic RW2",
        &[
            0x49, 0x49, 0x55, 0x00, 0x18, 0x00, 0x00, 0x00, 0x88, 0xE7, 0x74, 0xD8,
        ],
        "rw2",
        "image/x-panasonic-rw2",
    ),
    Detector::parse("ASF", &asf::ASF_MAGIC, asf::detect),
    Detector::fixed(
        "KTX",
        &[
            0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
        ],
        "ktx",
        "image/ktx",
    ),
    // 0x7E 0x10 and 0x7E 0x18 both qualify; byte 3 is free
    Detector::fixed(
        "MIE",
        &[0x7E, 0x10, 0x04, 0x00, 0x30, 0x4D, 0x49, 0x45],
        "mie",
        "application/x-mie",
    )
    .masked(&[0xFF, 0xF7, 0xFF, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]),
    Detector::fixed(
        "ESRI Shapefile",
        &[
            0x27, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ],
        "shp",
        "application/x-esri-shape",
    )
    .at(2),
    Detector::parse(
        "JPEG 2000",
        &[
            0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
        ],
        jpeg2000,
    ),
    Detector::kind("HTML", b"<!DOCTYPE html>", HTML),
    Detector::kind("HTML (lowercase)", b"<!doctype html>", HTML),
    // -- Unsafe signatures: short or ambiguous, tried last --
    Detector::kind("MPEG pack", &[0x00, 0x00, 0x01, 0xBA], MPEG),
    Detector::kind("MPEG sequence", &[0x00, 0x00, 0x01, 0xB3], MPEG),
    Detector::fixed("TrueType", &[0x00, 0x01, 0x00, 0x00, 0x00], "ttf", "font/ttf"),
    Detector::fixed("Windows icon", &[0x00, 0x00, 0x01, 0x00], "ico", "image/x-icon"),
    Detector::fixed("Windows cursor", &[0x00, 0x00, 0x02, 0x00], "cur", "image/x-icon"),
    Detector::fixed(
        "Compound File Binary",
        &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1],
        "cfb",
        "application/x-cfb",
    ),
    Detector::fixed("Fujifilm RAF", b"FUJIFILMCCD-RAW", "raf", "image/x-fujifilm-raf"),
    Detector::fixed("FastTracker 2", b"Extended Module:", "xm", "audio/x-xm"),
    Detector::fixed("Creative Voice", b"Creative Voice File", "voc", "audio/x-voc"),
    Detector::parse("ASAR", &[0x04, 0x00, 0x00, 0x00], asar),
    Detector::fixed(
        "MXF",
        &[
            0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x02,
        ],
        "mxf",
        "application/mxf",
    ),
    Detector::fixed("Scream Tracker 3", b"SCRM", "s3m", "audio/x-s3m").at(44),
    Detector::parse("MPEG-TS", &[0x47], transport_stream).at(4),
    Detector::fixed("Mobipocket", b"BOOKMOBI", "mobi", "application/x-mobipocket-ebook").at(60),
    Detector::fixed("DICOM", b"DICM", "dcm", "application/dicom").at(128),
    Detector::fixed(
        "Windows shortcut",
        &[
            0x4C, 0x00, 0x00, 0x00, 0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
        ],
        "lnk",
        "application/x.ms.shortcut",
    ),
    Detector::fixed(
        "macOS alias",
        &[
            0x62, 0x6F, 0x6F, 0x6B, 0x00, 0x00, 0x00, 0x00, 0x6D, 0x61, 0x72, 0x6B, 0x00, 0x00,
            0x00, 0x00,
        ],
        "alias",
        "application/x.apple.alias",
    ),
    Detector::parse("Embedded OpenType", b"LP", eot).at(34),
    Detector::fixed(
        "InDesign",
        &[
            0x06, 0x06, 0xED, 0xF5, 0xD8, 0x1D, 0x46, 0xE5, 0xBD, 0x31, 0xEF, 0xE7, 0xFE, 0x74,
            0xB7, 0x1D,
        ],
        "indd",
        "application/x-indesign",
    ),
    // Checksum-only; must stay below every real signature
    Detector::parse("tar", &[], tar::detect),
    Detector::fixed(
        "SketchUp",
        &[
            0xFF, 0xFE, 0xFF, 0x0E, 0x53, 0x00, 0x6B, 0x00, 0x65, 0x00, 0x74, 0x00, 0x63, 0x00,
            0x68, 0x00, 0x55, 0x00, 0x70, 0x00, 0x20, 0x00, 0x4D, 0x00, 0x6F, 0x00, 0x64, 0x00,
            0x65, 0x00, 0x6C, 0x00,
        ],
        "skp",
        "application/vnd.sketchup.skp",
    ),
    Detector::fixed(
        "PGP message",
        b"-----BEGIN PGP MESSAGE-----",
        "pgp",
        "application/pgp-encrypted",
    ),
    Detector::parse("MPEG audio", &[0xFF, 0xE0], mpeg_audio).masked(&[0xFF, 0xE0]),
];

/// The ordered detector table
pub fn all_detectors() -> &'static [Detector] {
    DETECTORS
}

// ============================================================================
// Small sub-parsers
// ============================================================================

/// `%!`: Encapsulated PostScript when the DSC header says so
fn postscript(pass: &mut Pass<'_>) -> Verdict {
    let cur = &pass.cursor;
    if cur.check(b"PS-Adobe-", 2) && cur.check(b" EPSF-", 14) {
        Verdict::Match(EPS)
    } else {
        Verdict::Match(FileKind::new("ps", "application/postscript"))
    }
}

/// Ogg: the first packet's codec identifier sits at byte 28
fn ogg(pass: &mut Pass<'_>) -> Verdict {
    const CODECS: &[(&[u8], FileKind)] = &[
        (b"OpusHead", FileKind::new("opus", "audio/opus")),
        (b"\x80theora", FileKind::new("ogv", "video/ogg")),
        (b"\x01video\x00", FileKind::new("ogm", "video/ogg")),
        (b"\x7FFLAC", FileKind::new("oga", "audio/ogg")),
        (b"Speex  ", FileKind::new("spx", "audio/ogg")),
        (b"\x01vorbis", FileKind::new("ogg", "audio/ogg")),
    ];

    let cur = &pass.cursor;
    let kind = CODECS
        .iter()
        .find(|(id, _)| cur.check(id, 28))
        .map(|&(_, kind)| kind)
        .unwrap_or(FileKind::new("ogx", "application/ogg"));
    Verdict::Match(kind)
}

/// `PK` followed by an empty-archive or spanned-archive marker
fn zip_other(pass: &mut Pass<'_>) -> Verdict {
    let cur = &pass.cursor;
    if matches!(cur.byte(2), 0x03 | 0x05 | 0x07) && matches!(cur.byte(3), 0x04 | 0x06 | 0x08) {
        Verdict::Match(zip::ZIP)
    } else {
        Verdict::Continue
    }
}

fn has_sfnt_flavor(cur: &Cursor<'_>) -> bool {
    cur.check(&[0x00, 0x01, 0x00, 0x00], 4) || cur.check(b"OTTO", 4)
}

fn woff(pass: &mut Pass<'_>) -> Verdict {
    if has_sfnt_flavor(&pass.cursor) {
        Verdict::Match(FileKind::new("woff", "font/woff"))
    } else {
        Verdict::Continue
    }
}

fn woff2(pass: &mut Pass<'_>) -> Verdict {
    if has_sfnt_flavor(&pass.cursor) {
        Verdict::Match(FileKind::new("woff2", "font/woff2"))
    } else {
        Verdict::Continue
    }
}

/// Illustrator files are PDFs carrying private data after the first objects
fn pdf(pass: &mut Pass<'_>) -> Verdict {
    const AI_SEARCH_START: usize = 1350;

    let tail = pass.cursor.slice(AI_SEARCH_START, usize::MAX);
    if memchr::memmem::find(tail, b"AIPrivateData").is_some() {
        Verdict::Match(FileKind::new("ai", "application/postscript"))
    } else {
        Verdict::Match(FileKind::new("pdf", "application/pdf"))
    }
}

/// Little-endian TIFF and the camera raw formats built on it
fn tiff_le(pass: &mut Pass<'_>) -> Verdict {
    const ARW_TAG: [u8; 15] = [
        0x00, 0xFE, 0x00, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x01,
    ];
    const FIRST_IFD_AT_8: [u8; 4] = [0x08, 0x00, 0x00, 0x00];

    let cur = &pass.cursor;
    let kind = if cur.check(b"CR", 8) {
        FileKind::new("cr2", "image/x-canon-cr2")
    } else if cur.check(&[0x1C, 0x00, 0xFE, 0x00], 8) || cur.check(&[0x1F, 0x00, 0x0B, 0x00], 8)
    {
        FileKind::new("nef", "image/x-nikon-nef")
    } else if cur.check(&FIRST_IFD_AT_8, 4)
        && (cur.check(&[0x2D, 0x00, 0xFE, 0x00], 8) || cur.check(&[0x27, 0x00, 0xFE, 0x00], 8))
    {
        FileKind::new("dng", "image/x-adobe-dng")
    } else if (cur.check(&[0x10, 0xFB, 0x86, 0x01], 4) || cur.check(&FIRST_IFD_AT_8, 4))
        && cur.check(&ARW_TAG, 9)
    {
        FileKind::new("arw", "image/x-sony-arw")
    } else {
        FileKind::new("tif", "image/tiff")
    };
    Verdict::Match(kind)
}

/// RIFF form type at byte 8 (WebP is caught earlier)
fn riff(pass: &mut Pass<'_>) -> Verdict {
    let cur = &pass.cursor;
    if cur.check(b"AVI", 8) {
        Verdict::Match(FileKind::new("avi", "video/vnd.avi"))
    } else if cur.check(b"WAVE", 8) {
        Verdict::Match(FileKind::new("wav", "audio/vnd.wave"))
    } else if cur.check(b"QLCM", 8) {
        Verdict::Match(FileKind::new("qcp", "audio/qcelp"))
    } else {
        Verdict::Continue
    }
}

/// LHA: `-lXX-` method id at offset 2
fn lzh(pass: &mut Pass<'_>) -> Verdict {
    const METHODS: [&[u8; 2]; 12] = [
        b"h0", b"h1", b"h2", b"h3", b"h4", b"h5", b"h6", b"h7", b"zs", b"z4", b"z5", b"hd",
    ];

    let cur = &pass.cursor;
    let method = [cur.byte(4), cur.byte(5)];
    if cur.byte(6) == b'-' && METHODS.iter().any(|m| **m == method) {
        Verdict::Match(FileKind::new("lzh", "application/x-lzh-compressed"))
    } else {
        Verdict::Continue
    }
}

/// MPEG program stream: the pack header marker bits give the version
fn mpeg_ps(pass: &mut Pass<'_>) -> Verdict {
    let cur = &pass.cursor;
    if cur.check_masked(&[0x21], 4, &[0xF1]) {
        Verdict::Match(FileKind::new("mpg", "video/MP1S"))
    } else if cur.check_masked(&[0x44], 4, &[0xC4]) {
        Verdict::Match(FileKind::new("mpg", "video/MP2P"))
    } else {
        Verdict::Continue
    }
}

/// RAR 1.5 (`00`) and RAR 5 (`01`)
fn rar(pass: &mut Pass<'_>) -> Verdict {
    if matches!(pass.cursor.byte(6), 0x00 | 0x01) {
        Verdict::Match(FileKind::new("rar", "application/x-rar-compressed"))
    } else {
        Verdict::Continue
    }
}

/// Unix `ar`; Debian packages start with a `debian-binary` member
fn ar(pass: &mut Pass<'_>) -> Verdict {
    if pass.cursor.check(b"debian-binary", 8) {
        Verdict::Match(FileKind::new("deb", "application/x-deb"))
    } else {
        Verdict::Match(FileKind::new("ar", "application/x-unix-archive"))
    }
}

/// JPEG 2000 family: brand of the `ftyp` box after the signature box
fn jpeg2000(pass: &mut Pass<'_>) -> Verdict {
    let kind = match pass.cursor.slice(20, 4) {
        b"jp2 " => FileKind::new("jp2", "image/jp2"),
        b"jpx " => FileKind::new("jpx", "image/jpx"),
        b"jpm " => FileKind::new("jpm", "image/jpm"),
        b"mjp2" => FileKind::new("mj2", "image/mj2"),
        _ => return Verdict::Reject,
    };
    Verdict::Match(kind)
}

/// Electron ASAR: a Chromium Pickle whose payload is a JSON index with `files`
fn asar(pass: &mut Pass<'_>) -> Verdict {
    const HEADER_LEN: usize = 16;

    let cur = &pass.cursor;
    if cur.remaining() < HEADER_LEN {
        return Verdict::Continue;
    }
    let json_len = cur.u32_le(12) as usize;
    let Some(end) = json_len.checked_add(HEADER_LEN) else {
        return Verdict::Continue;
    };
    if cur.remaining() < end {
        return Verdict::Continue;
    }

    match serde_json::from_slice::<serde_json::Value>(cur.slice(HEADER_LEN, json_len)) {
        Ok(index) if index.get("files").is_some_and(is_truthy) => {
            Verdict::Match(FileKind::new("asar", "application/x-asar"))
        }
        _ => Verdict::Continue,
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// MPEG-TS: sync byte repeats every 188 (or 192 with timecodes) bytes
fn transport_stream(pass: &mut Pass<'_>) -> Verdict {
    let cur = &pass.cursor;
    if cur.check(&[0x47], 192) || cur.check(&[0x47], 196) {
        Verdict::Match(FileKind::new("mts", "video/mp2t"))
    } else {
        Verdict::Continue
    }
}

/// Embedded OpenType: `LP` magic plus a known version word
fn eot(pass: &mut Pass<'_>) -> Verdict {
    let cur = &pass.cursor;
    if cur.check(&[0x00, 0x00, 0x01], 8)
        || cur.check(&[0x01, 0x00, 0x02], 8)
        || cur.check(&[0x02, 0x00, 0x02], 8)
    {
        Verdict::Match(FileKind::new("eot", "application/vnd.ms-fontobject"))
    } else {
        Verdict::Continue
    }
}

/// MPEG audio frame sync (11 set bits): ADTS AAC or layer I/II/III
fn mpeg_audio(pass: &mut Pass<'_>) -> Verdict {
    let cur = &pass.cursor;
    if cur.remaining() < 2 {
        return Verdict::Continue;
    }

    // Layer bits 00 mean ADTS, for both the MPEG-2 and MPEG-4 variants
    if cur.check_masked(&[0x10], 1, &[0x16]) {
        return Verdict::Match(AAC);
    }

    if cur.check_masked(&[0x02], 1, &[0x06]) {
        Verdict::Match(MP3)
    } else if cur.check_masked(&[0x04], 1, &[0x06]) {
        Verdict::Match(FileKind::new("mp2", "audio/mpeg"))
    } else if cur.check_masked(&[0x06], 1, &[0x06]) {
        Verdict::Match(FileKind::new("mp1", "audio/mpeg"))
    } else {
        Verdict::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(name: &str) -> usize {
        all_detectors()
            .iter()
            .position(|d| d.name == name)
            .unwrap_or_else(|| panic!("no detector named {name}"))
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = all_detectors().iter().map(|d| d.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn test_masks_cover_their_patterns() {
        for d in all_detectors() {
            if let Some(mask) = d.mask {
                assert_eq!(mask.len(), d.pattern.len(), "mask length of {}", d.name);
            }
        }
    }

    #[test]
    fn test_only_tar_is_unconditional() {
        let empty: Vec<_> = all_detectors()
            .iter()
            .filter(|d| d.pattern.is_empty())
            .map(|d| d.name)
            .collect();
        assert_eq!(empty, vec!["tar"]);
    }

    #[test]
    fn test_ordering_constraints() {
        assert!(index_of("PostScript") < index_of("ZIP local file"));
        assert!(index_of("ZIP local file") < index_of("ZIP"));
        assert!(index_of("WebP") < index_of("RIFF"));
        assert!(index_of("MPEG-PS") < index_of("MPEG pack"));
        assert!(index_of("ID3v2") < index_of("MPEG audio"));

        let tar = index_of("tar");
        for (i, d) in all_detectors().iter().enumerate() {
            if !["SketchUp", "PGP message", "MPEG audio"].contains(&d.name) {
                assert!(i <= tar, "{} sits below the tar checksum", d.name);
            }
        }
        assert_eq!(all_detectors().last().map(|d| d.name), Some("MPEG audio"));
    }

    #[test]
    fn test_is_truthy() {
        use serde_json::json;
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!(1)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
    }
}
