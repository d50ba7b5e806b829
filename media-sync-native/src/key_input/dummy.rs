use super::{InputSink, KeyEvent};

/// Stand-in for targets without media key injection. Accepts nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInputSink;

impl InputSink for NullInputSink {
    fn send_inputs(&self, events: &[KeyEvent]) -> u32 {
        tracing::warn!(
            "media key injection is not supported on this OS, dropped {} events",
            events.len()
        );
        0
    }
}
