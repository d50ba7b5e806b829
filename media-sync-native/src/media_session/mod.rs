use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;

use crate::error::{CollectError, FailureRank};
use crate::media_events::{
    FALLBACK_TEXT, MediaInfo, NO_MEDIA_PLAYING, PlaybackStatus, TrackProperties,
};

#[cfg(target_os = "windows")]
mod windows_smtc;

#[cfg(not(target_os = "windows"))]
mod dummy;

#[cfg(target_os = "windows")]
pub use windows_smtc::SmtcSessionBackend as PlatformSessionBackend;

#[cfg(not(target_os = "windows"))]
pub use dummy::NoSessionBackend as PlatformSessionBackend;

/// Access to the OS media-session subsystem.
///
/// Every call goes back to the OS; nothing is cached between queries.
pub trait SessionBackend: Send + Sync + 'static {
    type Session: 'static;

    /// Acquires the session manager and asks it for the current session.
    fn current_session(
        &self,
    ) -> impl Future<Output = Result<Option<Self::Session>, CollectError>>;

    fn media_properties(
        &self,
        session: &Self::Session,
    ) -> impl Future<Output = Result<TrackProperties, CollectError>>;

    /// `Ok(None)` when the session has no playback info to report.
    fn playback_status(
        &self,
        session: &Self::Session,
    ) -> impl Future<Output = Result<Option<PlaybackStatus>, CollectError>>;
}

/// Accumulates a [`MediaInfo`] while a query runs.
#[derive(Debug, Default)]
struct MediaInfoDraft {
    info: MediaInfo,
    recorded: Option<FailureRank>,
}

impl MediaInfoDraft {
    fn apply_properties(&mut self, properties: TrackProperties) {
        let TrackProperties {
            title,
            artist,
            album,
        } = properties;

        for (field, value) in [
            (&mut self.info.title, title),
            (&mut self.info.artist, artist),
            (&mut self.info.album, album),
        ] {
            if !value.is_empty() {
                *field = value;
            }
        }
    }

    /// Merges a failure into the draft.
    ///
    /// A diagnostic is only replaced by a more specific one. Runtime and
    /// unknown failures are also dropped once the title holds real data.
    fn record(&mut self, failure: &CollectError) -> bool {
        let rank = failure.rank();

        if self.recorded.is_some_and(|existing| existing >= rank) {
            return false;
        }

        if rank < FailureRank::Platform && self.info.title != FALLBACK_TEXT {
            return false;
        }

        self.info.error = Some(failure.to_string());
        self.recorded = Some(rank);
        true
    }

    fn finish(self) -> MediaInfo {
        self.info
    }
}

impl MediaInfo {
    /// Fallback info carrying only a diagnostic, for queries that never got
    /// to run or died before producing anything.
    pub fn from_failure(failure: &CollectError) -> Self {
        let mut draft = MediaInfoDraft::default();
        draft.record(failure);
        draft.finish()
    }
}

pub struct SessionInfoCollector<B> {
    backend: B,
    timeout: Option<Duration>,
}

impl<B: SessionBackend> SessionInfoCollector<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            timeout: None,
        }
    }

    /// Gives up on the OS after `timeout`. Fields read before that point are
    /// kept.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads the current session. Always yields a complete [`MediaInfo`];
    /// failures end up in its `error` field.
    ///
    /// A panic or timeout part way through is treated like any other failure,
    /// so whatever was read before it still reaches the caller.
    pub async fn collect(&self) -> MediaInfo {
        let mut draft = MediaInfoDraft::default();

        if let Err(failure) = self.read_guarded(&mut draft).await {
            self.handle_failure(&mut draft, failure);
        }

        draft.finish()
    }

    async fn read_guarded(&self, draft: &mut MediaInfoDraft) -> Result<(), CollectError> {
        let read = AssertUnwindSafe(self.read_current_session(draft)).catch_unwind();

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, read).await.map_err(|_| {
                CollectError::Runtime(format!("query timed out after {} ms", limit.as_millis()))
            })?,
            None => read.await,
        };

        outcome.unwrap_or_else(|_| {
            tracing::error!("media query panicked");
            Err(CollectError::Unknown)
        })
    }

    async fn read_current_session(&self, draft: &mut MediaInfoDraft) -> Result<(), CollectError> {
        let Some(session) = self.backend.current_session().await? else {
            tracing::debug!("no current media session");
            draft.info.title = NO_MEDIA_PLAYING.to_string();
            return Ok(());
        };

        let properties = self.backend.media_properties(&session).await?;
        draft.apply_properties(properties);

        let status = self.backend.playback_status(&session).await?;
        draft.info.is_playing = status == Some(PlaybackStatus::Playing);

        tracing::debug!(
            "now playing: {} - {} ({:?})",
            draft.info.artist,
            draft.info.title,
            status
        );

        Ok(())
    }

    fn handle_failure(&self, draft: &mut MediaInfoDraft, failure: CollectError) {
        match failure {
            CollectError::Platform { .. } => {
                tracing::error!("{failure}");
                draft.record(&failure);
                tracing::warn!(
                    "returning media info gathered before the failure (title: {})",
                    draft.info.title
                );
            }
            CollectError::Runtime(_) | CollectError::Unknown => {
                if !draft.record(&failure) {
                    tracing::debug!("keeping earlier media info over: {failure}");
                }
                tracing::warn!("{failure}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASS_NOT_REGISTERED: u32 = 0x8004_0154;

    fn platform_error() -> CollectError {
        CollectError::Platform {
            message: "Class not registered".to_string(),
            code: CLASS_NOT_REGISTERED,
        }
    }

    fn track() -> TrackProperties {
        TrackProperties {
            title: "Windowlicker".to_string(),
            artist: "Aphex Twin".to_string(),
            album: "Windowlicker EP".to_string(),
        }
    }

    struct ScriptedBackend {
        session: Result<Option<()>, CollectError>,
        properties: Result<TrackProperties, CollectError>,
        status: Result<Option<PlaybackStatus>, CollectError>,
    }

    impl Default for ScriptedBackend {
        fn default() -> Self {
            Self {
                session: Ok(Some(())),
                properties: Ok(track()),
                status: Ok(Some(PlaybackStatus::Playing)),
            }
        }
    }

    impl SessionBackend for ScriptedBackend {
        type Session = ();

        async fn current_session(&self) -> Result<Option<()>, CollectError> {
            self.session.clone()
        }

        async fn media_properties(&self, _: &()) -> Result<TrackProperties, CollectError> {
            self.properties.clone()
        }

        async fn playback_status(&self, _: &()) -> Result<Option<PlaybackStatus>, CollectError> {
            self.status.clone()
        }
    }

    async fn collect(backend: ScriptedBackend) -> MediaInfo {
        SessionInfoCollector::new(backend).collect().await
    }

    async fn collect_with_timeout(backend: ScriptedBackend, limit: Duration) -> MediaInfo {
        SessionInfoCollector::new(backend)
            .with_timeout(Some(limit))
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_playing_session() {
        let info = collect(ScriptedBackend::default()).await;
        assert_eq!(
            info,
            MediaInfo {
                title: "Windowlicker".to_string(),
                artist: "Aphex Twin".to_string(),
                album: "Windowlicker EP".to_string(),
                is_playing: true,
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn test_no_session_is_not_an_error() {
        let info = collect(ScriptedBackend {
            session: Ok(None),
            ..Default::default()
        })
        .await;

        assert_eq!(info.title, "No media playing");
        assert_eq!(info.artist, "Unknown");
        assert_eq!(info.album, "Unknown");
        assert!(!info.is_playing);
        assert_eq!(info.error, None);
    }

    #[tokio::test]
    async fn test_paused_or_missing_playback_info_is_not_playing() {
        for status in [Some(PlaybackStatus::Paused), Some(PlaybackStatus::Changing), None] {
            let info = collect(ScriptedBackend {
                status: Ok(status),
                ..Default::default()
            })
            .await;
            assert!(!info.is_playing, "{status:?}");
            assert_eq!(info.error, None);
        }
    }

    #[tokio::test]
    async fn test_empty_properties_keep_fallbacks() {
        let info = collect(ScriptedBackend {
            properties: Ok(TrackProperties {
                title: "Intro".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        })
        .await;

        assert_eq!(info.title, "Intro");
        assert_eq!(info.artist, "Unknown");
        assert_eq!(info.album, "Unknown");
    }

    #[tokio::test]
    async fn test_platform_error_before_title_records_code() {
        let info = collect(ScriptedBackend {
            session: Err(platform_error()),
            ..Default::default()
        })
        .await;

        assert_eq!(info.title, "Unknown");
        assert_eq!(info.artist, "Unknown");
        assert_eq!(info.album, "Unknown");
        assert!(!info.is_playing);
        assert!(info.error.unwrap().contains("0x80040154"));
    }

    #[tokio::test]
    async fn test_platform_error_after_title_keeps_partial_info() {
        let info = collect(ScriptedBackend {
            status: Err(platform_error()),
            ..Default::default()
        })
        .await;

        assert_eq!(info.title, "Windowlicker");
        assert!(!info.is_playing);
        assert!(info.error.unwrap().starts_with("Windows Runtime error"));
    }

    #[tokio::test]
    async fn test_runtime_error_after_title_is_dropped() {
        let info = collect(ScriptedBackend {
            status: Err(CollectError::Runtime("playback info went away".to_string())),
            ..Default::default()
        })
        .await;

        assert_eq!(info.title, "Windowlicker");
        assert_eq!(info.error, None);
    }

    #[tokio::test]
    async fn test_runtime_error_before_title_is_recorded() {
        let info = collect(ScriptedBackend {
            properties: Err(CollectError::Runtime("bad metadata".to_string())),
            ..Default::default()
        })
        .await;

        assert_eq!(info.title, "Unknown");
        assert_eq!(info.error.as_deref(), Some("Runtime error: bad metadata"));
    }

    /// Reads `track()`, then misbehaves while asking for the playback status.
    struct StatusMisbehaves {
        panics: bool,
    }

    impl SessionBackend for StatusMisbehaves {
        type Session = ();

        async fn current_session(&self) -> Result<Option<()>, CollectError> {
            Ok(Some(()))
        }

        async fn media_properties(&self, _: &()) -> Result<TrackProperties, CollectError> {
            Ok(track())
        }

        async fn playback_status(&self, _: &()) -> Result<Option<PlaybackStatus>, CollectError> {
            if self.panics {
                panic!("playback info proxy went away");
            }
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_panic_after_title_keeps_partial_info() {
        let info = SessionInfoCollector::new(StatusMisbehaves { panics: true })
            .collect()
            .await;

        assert_eq!(info.title, "Windowlicker");
        assert_eq!(info.artist, "Aphex Twin");
        assert_eq!(info.album, "Windowlicker EP");
        assert!(!info.is_playing);
        assert_eq!(info.error, None);
    }

    #[tokio::test]
    async fn test_panic_before_title_is_unknown_error() {
        struct PanicsAtOnce;

        impl SessionBackend for PanicsAtOnce {
            type Session = ();

            async fn current_session(&self) -> Result<Option<()>, CollectError> {
                panic!("session manager went away")
            }

            async fn media_properties(&self, _: &()) -> Result<TrackProperties, CollectError> {
                unreachable!()
            }

            async fn playback_status(
                &self,
                _: &(),
            ) -> Result<Option<PlaybackStatus>, CollectError> {
                unreachable!()
            }
        }

        let info = SessionInfoCollector::new(PanicsAtOnce).collect().await;
        assert_eq!(info, MediaInfo::from_failure(&CollectError::Unknown));
    }

    #[tokio::test]
    async fn test_timeout_after_title_keeps_partial_info() {
        let info = SessionInfoCollector::new(StatusMisbehaves { panics: false })
            .with_timeout(Some(Duration::from_millis(20)))
            .collect()
            .await;

        assert_eq!(info.title, "Windowlicker");
        assert_eq!(info.artist, "Aphex Twin");
        assert!(!info.is_playing);
        assert_eq!(info.error, None);
    }

    #[tokio::test]
    async fn test_timeout_leaves_prompt_queries_alone() {
        let info = collect_with_timeout(ScriptedBackend::default(), Duration::from_secs(5)).await;
        assert_eq!(info.title, "Windowlicker");
        assert!(info.is_playing);
        assert_eq!(info.error, None);
    }

    #[tokio::test]
    async fn test_timeout_before_title_is_runtime_error() {
        struct Hangs;

        impl SessionBackend for Hangs {
            type Session = ();

            async fn current_session(&self) -> Result<Option<()>, CollectError> {
                std::future::pending().await
            }

            async fn media_properties(&self, _: &()) -> Result<TrackProperties, CollectError> {
                unreachable!()
            }

            async fn playback_status(
                &self,
                _: &(),
            ) -> Result<Option<PlaybackStatus>, CollectError> {
                unreachable!()
            }
        }

        let info = SessionInfoCollector::new(Hangs)
            .with_timeout(Some(Duration::from_millis(20)))
            .collect()
            .await;
        assert_eq!(info.title, "Unknown");
        assert_eq!(
            info.error.as_deref(),
            Some("Runtime error: query timed out after 20 ms")
        );
    }

    #[test]
    fn test_generic_failure_never_overwrites_platform_diagnostic() {
        let mut draft = MediaInfoDraft::default();
        assert!(draft.record(&platform_error()));
        assert!(!draft.record(&CollectError::Runtime("later".to_string())));
        assert!(!draft.record(&CollectError::Unknown));

        let info = draft.finish();
        assert!(info.error.unwrap().contains("0x80040154"));
    }

    #[test]
    fn test_more_specific_failure_replaces_vaguer_one() {
        let mut draft = MediaInfoDraft::default();
        assert!(draft.record(&CollectError::Unknown));
        assert!(!draft.record(&CollectError::Unknown));
        assert!(draft.record(&CollectError::Runtime("worker failed".to_string())));
        assert_eq!(
            draft.finish().error.as_deref(),
            Some("Runtime error: worker failed")
        );
    }

    #[test]
    fn test_from_failure_keeps_primary_fields() {
        let info = MediaInfo::from_failure(&CollectError::Unknown);
        assert_eq!(info.title, "Unknown");
        assert_eq!(info.artist, "Unknown");
        assert_eq!(info.album, "Unknown");
        assert!(!info.is_playing);
        assert_eq!(
            info.error.as_deref(),
            Some("Unknown error occurred while reading media session")
        );
    }
}
