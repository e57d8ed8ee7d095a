//! POSIX tar header checksum.
//!
//! Tar has no magic at offset 0, so the only cheap test is the header
//! checksum: the sum of all 512 header bytes with the checksum field itself
//! counted as eight spaces.

use super::bytes::{byte_at, parse_octal};
use super::{Pass, Verdict};
use crate::kind::FileKind;

const HEADER_LEN: usize = 512;
const CHECKSUM_FIELD: std::ops::Range<usize> = 148..156;
/// Octal digits of the checksum; the last two bytes are NUL/space
const CHECKSUM_DIGITS: std::ops::Range<usize> = 148..154;
/// Eight ASCII spaces
const BLANK_CHECKSUM: i64 = 8 * 0x20;

const USTAR_MAGIC: &[u8] = b"ustar";
const USTAR_OFFSET: usize = 257;

const TAR: FileKind = FileKind::new("tar", "application/x-tar");

pub(crate) fn detect(pass: &mut Pass<'_>) -> Verdict {
    let cur = &pass.cursor;

    if pass.options().strict_tar && !cur.check(USTAR_MAGIC, USTAR_OFFSET) {
        return Verdict::Continue;
    }

    if checksum_matches(cur.buf()) {
        Verdict::Match(TAR)
    } else {
        Verdict::Continue
    }
}

/// Compare the stored octal checksum against the header's byte sum.
/// Bytes past the end of `buf` count as zero.
pub fn checksum_matches(buf: &[u8]) -> bool {
    let digits: Vec<u8> = CHECKSUM_DIGITS.map(|i| byte_at(buf, i)).collect();
    let Some(stored) = parse_octal(&digits) else {
        return false;
    };

    let computed = BLANK_CHECKSUM
        + (0..HEADER_LEN)
            .filter(|i| !CHECKSUM_FIELD.contains(i))
            .map(|i| i64::from(byte_at(buf, i)))
            .sum::<i64>();

    stored == computed
}
