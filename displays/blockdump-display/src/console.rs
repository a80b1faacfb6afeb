//! Scrolling text console
//!
//! Keeps the last [`CONSOLE_LINES`] lines written, oldest first. Lines
//! longer than the console width are truncated on a character boundary.

use heapless::{Deque, String};

use blockdump_hal::console::MAX_LINE_LEN;
use blockdump_hal::TextConsole;

/// Number of lines kept on screen
pub const CONSOLE_LINES: usize = 22;

/// Fixed-height line log
#[derive(Clone, Default)]
pub struct LogConsole {
    lines: Deque<String<MAX_LINE_LEN>, CONSOLE_LINES>,
}

impl LogConsole {
    /// Create an empty console
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible lines, oldest first
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.lines.iter().map(|l| l.as_str())
    }
}

impl TextConsole for LogConsole {
    fn write_line(&mut self, text: &str) {
        if self.lines.is_full() {
            self.lines.pop_front();
        }
        let mut line = String::new();
        for c in text.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        // Cannot fail: a slot was freed above
        let _ = self.lines.push_back(line);
    }
}
