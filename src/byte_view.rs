//! ByteView: a borrowed, length-bounded window over bytes.
//!
//! Views never allocate and never own. Slicing operations clamp instead of
//! failing; parsing operations accept the whole view or nothing.

use core::fmt;

/// Whitespace as understood by C's `isspace` in the "C" locale.
#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Immutable, non-owning view of a byte buffer.
///
/// Equality, ordering and hashing are by content: two views over different
/// buffers holding the same bytes compare equal and hash identically.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteView<'a> {
    data: &'a [u8],
}

impl<'a> ByteView<'a> {
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// The view as `&str`, if it holds valid UTF-8.
    pub fn to_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.data).ok()
    }

    /// Drop up to `n` bytes from the front.
    pub fn chop(&mut self, n: usize) {
        let n = n.min(self.data.len());
        self.data = &self.data[n..];
    }

    /// Remove and return up to `n` bytes from the front.
    pub fn chop_left(&mut self, n: usize) -> ByteView<'a> {
        let (head, rest) = self.data.split_at(n.min(self.data.len()));
        self.data = rest;
        ByteView::new(head)
    }

    /// Remove and return up to `n` bytes from the back.
    pub fn chop_right(&mut self, n: usize) -> ByteView<'a> {
        let at = self.data.len() - n.min(self.data.len());
        let (rest, tail) = self.data.split_at(at);
        self.data = rest;
        ByteView::new(tail)
    }

    /// Remove and return everything before the first `delim`, consuming the
    /// delimiter. Without a delimiter the whole view is returned.
    pub fn chop_by_delim(&mut self, delim: u8) -> ByteView<'a> {
        match self.data.iter().position(|&b| b == delim) {
            Some(i) => {
                let head = ByteView::new(&self.data[..i]);
                self.data = &self.data[i + 1..];
                head
            }
            None => self.chop_left(self.data.len()),
        }
    }

    /// Skip leading whitespace, then remove and return the next run of
    /// non-whitespace bytes.
    pub fn chop_word(&mut self) -> ByteView<'a> {
        *self = self.trim_begin();
        let n = self
            .data
            .iter()
            .position(|&b| is_space(b))
            .unwrap_or(self.data.len());
        self.chop_left(n)
    }

    pub fn trim_begin(&self) -> ByteView<'a> {
        let n = self
            .data
            .iter()
            .position(|&b| !is_space(b))
            .unwrap_or(self.data.len());
        ByteView::new(&self.data[n..])
    }

    pub fn trim_end(&self) -> ByteView<'a> {
        let n = self
            .data
            .iter()
            .rposition(|&b| !is_space(b))
            .map_or(0, |i| i + 1);
        ByteView::new(&self.data[..n])
    }

    pub fn trim(&self) -> ByteView<'a> {
        self.trim_end().trim_begin()
    }

    /// `length` bytes starting at `start`, or an empty view if that range
    /// does not fit.
    pub fn subview(&self, start: usize, length: usize) -> ByteView<'a> {
        match start.checked_add(length) {
            Some(end) if end <= self.data.len() => ByteView::new(&self.data[start..end]),
            _ => ByteView::default(),
        }
    }

    pub fn has_prefix(&self, prefix: ByteView<'_>) -> bool {
        self.data.starts_with(prefix.data)
    }

    pub fn has_suffix(&self, suffix: ByteView<'_>) -> bool {
        self.data.ends_with(suffix.data)
    }

    /// Parse the whole view as a decimal integer with an optional leading `-`.
    pub fn as_integer<T: Integer>(&self) -> Option<T> {
        let (negative, digits) = match self.data {
            [b'-', rest @ ..] => (true, rest),
            rest => (false, rest),
        };
        if digits.is_empty() {
            return None;
        }
        digits.iter().try_fold(T::ZERO, |acc, &b| {
            if !b.is_ascii_digit() {
                return None;
            }
            acc.push_digit(10, b - b'0', negative)
        })
    }

    /// Parse the whole view as hexadecimal digits (no prefix, either case).
    pub fn from_hex<T: Integer>(&self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        self.data.iter().try_fold(T::ZERO, |acc, &b| {
            let digit = match b {
                b'0'..=b'9' => b - b'0',
                b'a'..=b'f' => b - b'a' + 10,
                b'A'..=b'F' => b - b'A' + 10,
                _ => return None,
            };
            acc.push_digit(16, digit, false)
        })
    }
}

/// Primitive integers that [`ByteView::as_integer`] and
/// [`ByteView::from_hex`] can produce.
pub trait Integer: Copy {
    const ZERO: Self;

    /// `self * radix +/- digit`, or `None` on overflow.
    fn push_digit(self, radix: u8, digit: u8, negative: bool) -> Option<Self>;
}

macro_rules! impl_integer {
    ($($t:ty),*) => {$(
        impl Integer for $t {
            const ZERO: Self = 0;

            #[inline]
            fn push_digit(self, radix: u8, digit: u8, negative: bool) -> Option<Self> {
                let shifted = self.checked_mul(<$t>::try_from(radix).ok()?)?;
                let digit = <$t>::try_from(digit).ok()?;
                if negative {
                    shifted.checked_sub(digit)
                } else {
                    shifted.checked_add(digit)
                }
            }
        }
    )*};
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<'a> From<&'a [u8]> for ByteView<'a> {
    fn from(data: &'a [u8]) -> Self {
        ByteView::new(data)
    }
}

impl<'a> From<&'a str> for ByteView<'a> {
    fn from(s: &'a str) -> Self {
        ByteView::new(s.as_bytes())
    }
}

impl AsRef<[u8]> for ByteView<'_> {
    fn as_ref(&self) -> &[u8] {
        self.data
    }
}

impl fmt::Display for ByteView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&String::from_utf8_lossy(self.data), f)
    }
}

impl fmt::Debug for ByteView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.data.escape_ascii())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(s: &str) -> ByteView<'_> {
        ByteView::from(s)
    }

    #[test]
    fn chop_by_delim_consumes_delimiter() {
        let mut v = sv("key=value=x");
        assert_eq!(v.chop_by_delim(b'='), sv("key"));
        assert_eq!(v, sv("value=x"));
        assert_eq!(v.chop_by_delim(b'='), sv("value"));
        assert_eq!(v.chop_by_delim(b'='), sv("x"));
        assert!(v.is_empty());
        assert!(v.chop_by_delim(b'=').is_empty());
    }

    #[test]
    fn chop_word_skips_c_whitespace() {
        let mut v = sv(" \t\x0bfoo\x0cbar\r\n");
        assert_eq!(v.chop_word(), sv("foo"));
        assert_eq!(v.chop_word(), sv("bar"));
        assert!(v.chop_word().is_empty());
        assert!(v.is_empty());
    }

    #[test]
    fn trim_variants() {
        let v = sv("  \n hi there \t");
        assert_eq!(v.trim_begin(), sv("hi there \t"));
        assert_eq!(v.trim_end(), sv("  \n hi there"));
        assert_eq!(v.trim(), sv("hi there"));
        assert!(sv(" \t ").trim().is_empty());
    }

    #[test]
    fn chop_clamps() {
        let mut v = sv("abc");
        v.chop(1);
        assert_eq!(v, sv("bc"));
        v.chop(10);
        assert!(v.is_empty());
    }

    #[test]
    fn subview_out_of_range_is_empty() {
        let v = sv("123456789");
        assert_eq!(v.subview(2, 3), sv("345"));
        assert_eq!(v.subview(0, 9), v);
        assert!(v.subview(9, 0).is_empty());
        assert!(v.subview(5, 5).is_empty());
        assert!(v.subview(usize::MAX, 2).is_empty());
    }

    #[test]
    fn ordering_is_lexicographic_prefix_first() {
        assert!(sv("abc") < sv("abd"));
        assert!(sv("ab") < sv("abc"));
        assert!(sv("") < sv("a"));
        assert!(sv("b") > sv("abc"));
    }

    #[test]
    fn integer_parsing_rejects_partial_input() {
        assert_eq!(sv("2021").as_integer::<i32>(), Some(2021));
        assert_eq!(sv("-42").as_integer::<i64>(), Some(-42));
        assert_eq!(sv("-128").as_integer::<i8>(), Some(-128));
        assert_eq!(sv("128").as_integer::<i8>(), None);
        assert_eq!(sv("12a").as_integer::<u32>(), None);
        assert_eq!(sv(" 12").as_integer::<u32>(), None);
        assert_eq!(sv("-").as_integer::<i32>(), None);
        assert_eq!(sv("").as_integer::<i32>(), None);
        assert_eq!(sv("-1").as_integer::<u32>(), None);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(sv("ff").from_hex::<u8>(), Some(0xff));
        assert_eq!(sv("DeadBeef").from_hex::<u32>(), Some(0xdead_beef));
        assert_eq!(sv("100").from_hex::<u8>(), None);
        assert_eq!(sv("0x10").from_hex::<u32>(), None);
        assert_eq!(sv("").from_hex::<u32>(), None);
    }

    #[test]
    fn display_and_debug() {
        let v = ByteView::new(b"hi\n\xff");
        assert_eq!(format!("{:?}", v), "\"hi\\n\\xff\"");
        assert_eq!(format!("{}", sv("hello")), "hello");
    }
}
