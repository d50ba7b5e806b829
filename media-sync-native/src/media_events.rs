use strum::{AsRefStr, Display, EnumIter, EnumString};

pub const FALLBACK_TEXT: &str = "Unknown";
pub const NO_MEDIA_PLAYING: &str = "No media playing";

/// A transport command the host can ask for on the control channel.
#[derive(EnumString, Display, AsRefStr, EnumIter, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Command {
    Play,
    Pause,
    Next,
    Previous,
    Stop,
}

/// Multimedia virtual keys understood by the OS input queue.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKey {
    PlayPause,
    NextTrack,
    PrevTrack,
    Stop,
}

impl MediaKey {
    /// The `VK_MEDIA_*` code for this key.
    pub const fn virtual_key(self) -> u16 {
        match self {
            MediaKey::NextTrack => 0xB0,
            MediaKey::PrevTrack => 0xB1,
            MediaKey::Stop => 0xB2,
            MediaKey::PlayPause => 0xB3,
        }
    }
}

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Closed,
    Opened,
    Changing,
    Stopped,
    Playing,
    Paused,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackProperties {
    pub title: String,
    pub artist: String,
    pub album: String,
}

/// Now-playing snapshot handed back on the info channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub is_playing: bool,
    pub error: Option<String>,
}

impl Default for MediaInfo {
    fn default() -> Self {
        Self {
            title: FALLBACK_TEXT.to_string(),
            artist: FALLBACK_TEXT.to_string(),
            album: FALLBACK_TEXT.to_string(),
            is_playing: false,
            error: None,
        }
    }
}
