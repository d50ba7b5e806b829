use super::SessionBackend;
use crate::error::CollectError;
use crate::media_events::{PlaybackStatus, TrackProperties};

/// Stand-in for targets without a media-session API: there is never a
/// current session.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSessionBackend;

impl SessionBackend for NoSessionBackend {
    type Session = ();

    async fn current_session(&self) -> Result<Option<()>, CollectError> {
        Ok(None)
    }

    async fn media_properties(&self, _session: &()) -> Result<TrackProperties, CollectError> {
        Ok(TrackProperties::default())
    }

    async fn playback_status(&self, _session: &()) -> Result<Option<PlaybackStatus>, CollectError> {
        Ok(None)
    }
}
