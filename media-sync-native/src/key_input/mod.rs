//! Synthetic media key presses.
//!
//! Keys injected here land in the OS input queue and reach whichever
//! application currently owns media-key focus, not just the host app.

use crate::media_events::MediaKey;

#[cfg(target_os = "windows")]
mod windows_input;

#[cfg(not(target_os = "windows"))]
mod dummy;

#[cfg(target_os = "windows")]
pub use windows_input::{LegacyKeybdEventSink, SendInputSink};

#[cfg(not(target_os = "windows"))]
pub use dummy::NullInputSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: MediaKey,
    pub direction: KeyDirection,
}

/// Something that can push keyboard events into the OS.
pub trait InputSink: Send + Sync {
    /// Submits `events` in order and returns how many the OS accepted.
    fn send_inputs(&self, events: &[KeyEvent]) -> u32;
}

impl<S: InputSink + ?Sized> InputSink for Box<S> {
    fn send_inputs(&self, events: &[KeyEvent]) -> u32 {
        (**self).send_inputs(events)
    }
}

pub struct KeyEventEmitter<S> {
    sink: S,
}

impl<S: InputSink> KeyEventEmitter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Presses and releases `key`. True only when the OS took both events;
    /// a partial or total rejection is reported as is, without a retry.
    pub fn emit(&self, key: MediaKey) -> bool {
        let events = [
            KeyEvent {
                key,
                direction: KeyDirection::Down,
            },
            KeyEvent {
                key,
                direction: KeyDirection::Up,
            },
        ];

        let accepted = self.sink.send_inputs(&events);
        if accepted as usize == events.len() {
            tracing::debug!("injected {key} (vk 0x{:02X})", key.virtual_key());
            true
        } else {
            tracing::warn!(
                "OS accepted {accepted} of {} input events for {key}",
                events.len()
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedSink {
        accepted: u32,
        seen: Mutex<Vec<KeyEvent>>,
    }

    impl InputSink for ScriptedSink {
        fn send_inputs(&self, events: &[KeyEvent]) -> u32 {
            self.seen.lock().unwrap().extend_from_slice(events);
            self.accepted
        }
    }

    fn emitter(accepted: u32) -> KeyEventEmitter<ScriptedSink> {
        KeyEventEmitter::new(ScriptedSink {
            accepted,
            seen: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_emit_sends_down_then_up() {
        let emitter = emitter(2);
        assert!(emitter.emit(MediaKey::NextTrack));

        let seen = emitter.sink.seen.lock().unwrap();
        assert_eq!(
            *seen,
            [
                KeyEvent {
                    key: MediaKey::NextTrack,
                    direction: KeyDirection::Down
                },
                KeyEvent {
                    key: MediaKey::NextTrack,
                    direction: KeyDirection::Up
                },
            ]
        );
    }

    #[test]
    fn test_partial_rejection_fails() {
        assert!(!emitter(1).emit(MediaKey::Stop));
        assert!(!emitter(0).emit(MediaKey::Stop));
    }
}
