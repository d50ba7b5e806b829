use windows::Media::Control::{
    GlobalSystemMediaTransportControlsSession, GlobalSystemMediaTransportControlsSessionManager,
    GlobalSystemMediaTransportControlsSessionPlaybackStatus,
};

use super::SessionBackend;
use crate::error::CollectError;
use crate::media_events::{PlaybackStatus, TrackProperties};

/// Reads the current session through the global system media transport
/// controls. The manager is requested again on every query.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtcSessionBackend;

impl From<GlobalSystemMediaTransportControlsSessionPlaybackStatus> for PlaybackStatus {
    fn from(status: GlobalSystemMediaTransportControlsSessionPlaybackStatus) -> Self {
        match status {
            GlobalSystemMediaTransportControlsSessionPlaybackStatus::Closed => {
                PlaybackStatus::Closed
            }
            GlobalSystemMediaTransportControlsSessionPlaybackStatus::Opened => {
                PlaybackStatus::Opened
            }
            GlobalSystemMediaTransportControlsSessionPlaybackStatus::Changing => {
                PlaybackStatus::Changing
            }
            GlobalSystemMediaTransportControlsSessionPlaybackStatus::Stopped => {
                PlaybackStatus::Stopped
            }
            GlobalSystemMediaTransportControlsSessionPlaybackStatus::Playing => {
                PlaybackStatus::Playing
            }
            GlobalSystemMediaTransportControlsSessionPlaybackStatus::Paused => {
                PlaybackStatus::Paused
            }
            _ => PlaybackStatus::Other,
        }
    }
}

/// WinRT hands back a null object as an error with a success HRESULT.
fn null_as_none<T>(result: windows::core::Result<T>) -> Result<Option<T>, CollectError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.code().is_ok() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl SessionBackend for SmtcSessionBackend {
    type Session = GlobalSystemMediaTransportControlsSession;

    async fn current_session(&self) -> Result<Option<Self::Session>, CollectError> {
        let manager = GlobalSystemMediaTransportControlsSessionManager::RequestAsync()?.await?;
        null_as_none(manager.GetCurrentSession())
    }

    async fn media_properties(
        &self,
        session: &Self::Session,
    ) -> Result<TrackProperties, CollectError> {
        let properties = session.TryGetMediaPropertiesAsync()?.await?;

        Ok(TrackProperties {
            title: properties.Title()?.to_string(),
            artist: properties.Artist()?.to_string(),
            album: properties.AlbumTitle()?.to_string(),
        })
    }

    async fn playback_status(
        &self,
        session: &Self::Session,
    ) -> Result<Option<PlaybackStatus>, CollectError> {
        let Some(playback_info) = null_as_none(session.GetPlaybackInfo())? else {
            return Ok(None);
        };

        Ok(Some(playback_info.PlaybackStatus()?.into()))
    }
}
