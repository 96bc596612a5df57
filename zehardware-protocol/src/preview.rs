//! Middle-of-the-word truncation for log output
//!
//! Payloads are kilobytes of base64; logs only need enough of them to tell
//! values apart. A [`Preview`] keeps the head and the tail of a string and
//! replaces the middle with [`ELLIPSIS`].

use core::fmt;

/// Marker written in place of the elided middle
pub const ELLIPSIS: &str = "...";

/// Display adapter returned by [`preview`]
#[derive(Debug, Clone, Copy)]
pub struct Preview<'a> {
    text: &'a str,
    max_len: usize,
}

/// Shorten `text` to at most `max_len` characters for display
///
/// Text of `max_len` characters or fewer is rendered unchanged. Longer text
/// renders as `head...tail`, exactly `max_len` characters long, with the
/// head one character longer than the tail when they cannot be equal.
/// `max_len` is expected to exceed the ellipsis length.
pub fn preview(text: &str, max_len: usize) -> Preview<'_> {
    Preview { text, max_len }
}

impl Preview<'_> {
    /// Head and tail character counts, or `None` if the text fits
    fn split(&self) -> Option<(usize, usize, usize)> {
        let len = self.text.chars().count();
        if len <= self.max_len {
            return None;
        }
        let kept = self.max_len.saturating_sub(ELLIPSIS.len());
        let tail = kept / 2;
        let head = kept - tail;
        Some((len, head, tail))
    }
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((len, head, tail)) = self.split() else {
            return f.write_str(self.text);
        };

        let head_end = self
            .text
            .char_indices()
            .nth(head)
            .map_or(self.text.len(), |(i, _)| i);
        let tail_start = self
            .text
            .char_indices()
            .nth(len - tail)
            .map_or(self.text.len(), |(i, _)| i);

        f.write_str(&self.text[..head_end])?;
        f.write_str(ELLIPSIS)?;
        f.write_str(&self.text[tail_start..])
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Preview<'_> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", defmt::Display2Format(self));
    }
}
