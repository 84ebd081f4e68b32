//! UTF-8 codec over byte views.
//!
//! Decoding is purely structural: the leading byte selects the sequence
//! length and every continuation byte must look like `10xxxxxx`. Overlong
//! forms and surrogates are not rejected.

use crate::byte_view::ByteView;
use thiserror::Error;

/// Largest Unicode code point.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid UTF-8 sequence at byte offset {offset}")]
pub struct DecodeError {
    pub offset: usize,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    #[error("code point 0x{0:X} is outside the Unicode range")]
    OutOfRange(u32),
}

/// An encoded code point: 1 to 4 meaningful bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Utf8Char {
    bytes: [u8; 4],
    count: u8,
}

impl Utf8Char {
    #[inline]
    pub fn len(&self) -> usize {
        usize::from(self.count)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    #[inline]
    pub fn view(&self) -> ByteView<'_> {
        ByteView::new(self.as_bytes())
    }
}

impl AsRef<[u8]> for Utf8Char {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Decode the code point at the start of `view`.
///
/// Returns the code point and the number of bytes it occupies, or `None` if
/// the view is empty, truncated, or starts with a malformed sequence.
pub fn decode(view: ByteView<'_>) -> Option<(u32, usize)> {
    let (&lead, rest) = view.as_bytes().split_first()?;
    let (len, payload) = match lead {
        b if b & 0x80 == 0x00 => return Some((u32::from(b), 1)),
        b if b & 0xE0 == 0xC0 => (2, b & 0x1F),
        b if b & 0xF0 == 0xE0 => (3, b & 0x0F),
        b if b & 0xF8 == 0xF0 => (4, b & 0x07),
        _ => return None,
    };
    let tail = rest.get(..len - 1)?;
    let code = tail.iter().try_fold(u32::from(payload), |code, &b| {
        (b & 0xC0 == 0x80).then(|| (code << 6) | u32::from(b & 0x3F))
    })?;
    Some((code, len))
}

/// Encode `code`, or report that it lies above [`MAX_CODE_POINT`].
pub fn try_encode(code: u32) -> Result<Utf8Char, EncodeError> {
    let mut bytes = [0u8; 4];
    let count = match code {
        0..=0x7F => {
            bytes[0] = code as u8;
            1
        }
        0x80..=0x7FF => {
            bytes[0] = 0xC0 | (code >> 6) as u8;
            bytes[1] = 0x80 | (code & 0x3F) as u8;
            2
        }
        0x800..=0xFFFF => {
            bytes[0] = 0xE0 | (code >> 12) as u8;
            bytes[1] = 0x80 | ((code >> 6) & 0x3F) as u8;
            bytes[2] = 0x80 | (code & 0x3F) as u8;
            3
        }
        0x10000..=MAX_CODE_POINT => {
            bytes[0] = 0xF0 | (code >> 18) as u8;
            bytes[1] = 0x80 | ((code >> 12) & 0x3F) as u8;
            bytes[2] = 0x80 | ((code >> 6) & 0x3F) as u8;
            bytes[3] = 0x80 | (code & 0x3F) as u8;
            4
        }
        _ => return Err(EncodeError::OutOfRange(code)),
    };
    Ok(Utf8Char { bytes, count })
}

/// Encode `code`.
///
/// # Panics
/// If `code` is above [`MAX_CODE_POINT`]; such a value has no encoding.
pub fn encode(code: u32) -> Utf8Char {
    match try_encode(code) {
        Ok(ch) => ch,
        Err(e) => panic!("{}", e),
    }
}

/// Iterate over the code points of `view` together with the bytes that
/// encode each one.
pub fn code_points(view: ByteView<'_>) -> CodePoints<'_> {
    CodePoints {
        rest: view,
        offset: 0,
    }
}

/// Iterator returned by [`code_points`]. Stops after the first error.
#[derive(Clone, Debug)]
pub struct CodePoints<'a> {
    rest: ByteView<'a>,
    offset: usize,
}

impl<'a> CodePoints<'a> {
    /// Byte offset of the next sequence relative to the input view.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for CodePoints<'a> {
    type Item = Result<(u32, ByteView<'a>), DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match decode(self.rest) {
            Some((code, len)) => {
                let seq = self.rest.chop_left(len);
                self.offset += len;
                Some(Ok((code, seq)))
            }
            None => {
                self.rest = ByteView::default();
                Some(Err(DecodeError {
                    offset: self.offset,
                }))
            }
        }
    }
}

impl core::iter::FusedIterator for CodePoints<'_> {}
