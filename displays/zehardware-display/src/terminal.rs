//! Diagnostic terminal surface
//!
//! A scrollback of the most recent log lines, sized for a 6x10 font on a
//! 128x64 panel. New text is appended at the bottom and long lines wrap.

use heapless::{Deque, String};

/// Number of character rows on the terminal
pub const TERMINAL_ROWS: usize = 6;

/// Number of character columns on the terminal
pub const TERMINAL_COLS: usize = 21;

/// Scrollback text buffer
#[derive(Clone)]
pub struct Terminal {
    lines: Deque<String<TERMINAL_COLS>, TERMINAL_ROWS>,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal {
    /// Create an empty terminal
    pub fn new() -> Self {
        Self {
            lines: Deque::new(),
        }
    }

    /// Clear the scrollback
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Append text, wrapping at the column limit and at newlines
    pub fn push_line(&mut self, text: &str) {
        for segment in text.split('\n') {
            let mut row = String::new();
            for ch in segment.chars() {
                if row.push(ch).is_err() {
                    self.push_row(core::mem::take(&mut row));
                    // A fresh row always has room for one char
                    let _ = row.push(ch);
                }
            }
            self.push_row(row);
        }
    }

    fn push_row(&mut self, row: String<TERMINAL_COLS>) {
        if self.lines.is_full() {
            self.lines.pop_front();
        }
        let _ = self.lines.push_back(row);
    }

    /// Visible lines, oldest first
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// Number of visible lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the terminal is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl core::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.lines()).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Terminal {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Terminal[");
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}", line);
        }
        defmt::write!(f, "]");
    }
}
