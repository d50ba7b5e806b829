use crate::key_input::{InputSink, KeyEventEmitter};
use crate::media_events::{Command, MediaKey};

/// Key injected for each command. `play` and `pause` share the toggle key,
/// so the resulting playback state depends on the player, not on the
/// command name.
pub const COMMAND_KEYS: [(Command, MediaKey); 5] = [
    (Command::Play, MediaKey::PlayPause),
    (Command::Pause, MediaKey::PlayPause),
    (Command::Next, MediaKey::NextTrack),
    (Command::Previous, MediaKey::PrevTrack),
    (Command::Stop, MediaKey::Stop),
];

pub fn key_for(command: &str) -> Option<(Command, MediaKey)> {
    COMMAND_KEYS
        .iter()
        .copied()
        .find(|(c, _)| c.as_ref() == command)
}

pub struct CommandDispatcher<S> {
    emitter: KeyEventEmitter<S>,
}

impl<S: InputSink> CommandDispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self {
            emitter: KeyEventEmitter::new(sink),
        }
    }

    /// Sends the media key for `command`. Unknown names return false without
    /// injecting anything.
    pub fn dispatch(&self, command: &str) -> bool {
        match key_for(command) {
            Some((command, key)) => {
                let sent = self.emitter.emit(key);
                if sent {
                    tracing::info!("media {command} command sent");
                }
                sent
            }
            None => {
                tracing::debug!("no media key for command {command:?}");
                false
            }
        }
    }
}
