//! Byte-level helpers for signature matching.
//!
//! Every read here is total: an index past the end of the buffer reads as
//! `0x00`. Truncated input therefore never panics, it simply stops matching.

/// Byte at `index`, or 0 when out of range
#[inline]
pub fn byte_at(buf: &[u8], index: usize) -> u8 {
    buf.get(index).copied().unwrap_or(0)
}

/// `N` bytes starting at `start`, zero-filled past the end
#[inline]
pub fn array_at<const N: usize>(buf: &[u8], start: usize) -> [u8; N] {
    let mut out = [0u8; N];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = start.checked_add(i).map_or(0, |at| byte_at(buf, at));
    }
    out
}

/// Compare `pattern` against `buf[at..]`, optionally under a per-byte mask.
///
/// With a mask, byte `i` matches when `mask[i] & buf[at + i] == mask[i] & pattern[i]`.
/// A mask shorter than the pattern leaves the remaining bytes unmasked.
pub fn masked_eq(buf: &[u8], at: usize, pattern: &[u8], mask: Option<&[u8]>) -> bool {
    pattern.iter().enumerate().all(|(i, &want)| {
        let got = at.checked_add(i).map_or(0, |idx| byte_at(buf, idx));
        let m = mask.and_then(|m| m.get(i)).copied().unwrap_or(0xFF);
        got & m == want & m
    })
}

#[inline]
pub fn u16_le(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(array_at(buf, at))
}

#[inline]
pub fn u32_le(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(array_at(buf, at))
}

#[inline]
pub fn u32_be(buf: &[u8], at: usize) -> u32 {
    u32::from_be_bytes(array_at(buf, at))
}

#[inline]
pub fn i32_be(buf: &[u8], at: usize) -> i32 {
    i32::from_be_bytes(array_at(buf, at))
}

#[inline]
pub fn u64_le(buf: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(array_at(buf, at))
}

/// Decode an ID3v2 synchsafe integer: four bytes carrying 7 bits each, MSB first.
pub fn synchsafe_u32(bytes: [u8; 4]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

/// Total width in bytes of an EBML variable-length integer, from its leading byte.
///
/// The position of the first set bit gives the width (1..=8). A zero leading
/// byte is not a valid field.
#[inline]
pub fn vint_width(lead: u8) -> Option<usize> {
    if lead == 0 {
        None
    } else {
        Some(lead.leading_zeros() as usize + 1)
    }
}

/// Read an EBML variable-length integer at `at`.
///
/// Element IDs keep their length marker bit (`strip_marker = false`), element
/// sizes have it cleared. Returns the value and the field width.
pub fn read_vint(buf: &[u8], at: usize, strip_marker: bool) -> Option<(u64, usize)> {
    let lead = byte_at(buf, at);
    let width = vint_width(lead)?;

    let first = if strip_marker {
        lead ^ (0x80 >> (width - 1))
    } else {
        lead
    };

    let mut value = u64::from(first);
    for i in 1..width {
        value = (value << 8) | u64::from(byte_at(buf, at.checked_add(i)?));
    }
    Some((value, width))
}

/// Parse a tar-style octal number field.
///
/// Text after the first NUL is ignored, surrounding whitespace trimmed, an
/// optional sign accepted, then the leading run of octal digits is read.
/// Returns `None` when no digit is present.
pub fn parse_octal(field: &[u8]) -> Option<i64> {
    let end = memchr::memchr(0, field).unwrap_or(field.len());
    let text = String::from_utf8_lossy(&field[..end]);
    let text = text.trim();

    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes() {
        if !(b'0'..=b'7').contains(&b) {
            break;
        }
        seen = true;
        value = value.checked_mul(8)?.checked_add(i64::from(b - b'0'))?;
    }

    seen.then_some(if negative { -value } else { value })
}

/// Read position into a buffer, private to one detection pass.
///
/// All reads are relative to the current position and zero-filled past the end.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// The whole underlying buffer
    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Current absolute offset
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Move forward, saturating instead of wrapping
    pub fn advance(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n);
    }

    /// Bytes left between the cursor and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn at(&self, offset: usize) -> usize {
        self.pos.saturating_add(offset)
    }

    /// Pattern test at `pos + offset`
    pub fn check(&self, pattern: &[u8], offset: usize) -> bool {
        masked_eq(self.buf, self.at(offset), pattern, None)
    }

    /// Masked pattern test at `pos + offset`
    pub fn check_masked(&self, pattern: &[u8], offset: usize, mask: &[u8]) -> bool {
        masked_eq(self.buf, self.at(offset), pattern, Some(mask))
    }

    pub fn byte(&self, offset: usize) -> u8 {
        byte_at(self.buf, self.at(offset))
    }

    pub fn u16_le(&self, offset: usize) -> u16 {
        u16_le(self.buf, self.at(offset))
    }

    pub fn u32_le(&self, offset: usize) -> u32 {
        u32_le(self.buf, self.at(offset))
    }

    pub fn u32_be(&self, offset: usize) -> u32 {
        u32_be(self.buf, self.at(offset))
    }

    pub fn i32_be(&self, offset: usize) -> i32 {
        i32_be(self.buf, self.at(offset))
    }

    pub fn u64_le(&self, offset: usize) -> u64 {
        u64_le(self.buf, self.at(offset))
    }

    /// In-range part of `[pos + offset, pos + offset + len)`; shorter (or empty) near the end
    pub fn slice(&self, offset: usize, len: usize) -> &'a [u8] {
        let start = self.at(offset).min(self.buf.len());
        let end = start.saturating_add(len).min(self.buf.len());
        &self.buf[start..end]
    }

    /// Everything from the cursor to the end of the buffer
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos.min(self.buf.len())..]
    }
}
