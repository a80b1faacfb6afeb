//! Console that mirrors device status lines into the host log

use blockdump_display::LogConsole;
use blockdump_hal::TextConsole;

/// `TextConsole` that keeps the on-screen log and emits each line as a
/// tracing event
#[derive(Default)]
pub struct TracingConsole {
    log: LogConsole,
}

impl TracingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines still visible on the emulated screen, oldest first
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.log.lines()
    }
}

impl TextConsole for TracingConsole {
    fn write_line(&mut self, text: &str) {
        tracing::info!(target: "blockdump::console", "{}", text);
        self.log.write_line(text);
    }
}
