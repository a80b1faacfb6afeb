//! Text console abstraction
//!
//! The console is a scrolling log of single lines. It is the only way the
//! device can tell the operator what went wrong, so implementations must
//! not fail: a line that cannot be drawn is dropped.

/// Maximum line length the core ever formats
pub const MAX_LINE_LEN: usize = 128;

/// Line-oriented text output
pub trait TextConsole {
    /// Append a line to the log, scrolling older lines up
    fn write_line(&mut self, text: &str);
}

impl<T: TextConsole + ?Sized> TextConsole for &mut T {
    fn write_line(&mut self, text: &str) {
        (**self).write_line(text)
    }
}
