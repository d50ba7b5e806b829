use std::collections::BTreeMap;

use crate::channel::{EncodableValue, MethodCall, MethodCallHandler, MethodResult};
use crate::dispatcher::CommandDispatcher;
use crate::key_input::InputSink;
use crate::media_events::{Command, MediaInfo};
use crate::media_session::{SessionBackend, SessionInfoCollector};
use crate::worker::{QueryTask, WorkerConfig, spawn_query};

pub const GET_CURRENT_MEDIA: &str = "getCurrentMedia";
pub const COMMAND_ERROR_CODE: &str = "ERROR";

impl From<MediaInfo> for EncodableValue {
    fn from(info: MediaInfo) -> Self {
        let MediaInfo {
            title,
            artist,
            album,
            is_playing,
            error,
        } = info;

        let mut map = BTreeMap::from([
            ("title".to_string(), title.into()),
            ("artist".to_string(), artist.into()),
            ("album".to_string(), album.into()),
            ("isPlaying".to_string(), is_playing.into()),
        ]);
        if let Some(error) = error {
            map.insert("error".to_string(), error.into());
        }

        EncodableValue::Map(map)
    }
}

/// Handles `play`, `pause`, `next`, `previous` and `stop`.
///
/// Runs on the caller's thread: key injection returns immediately.
pub struct ControlChannel<S> {
    dispatcher: CommandDispatcher<S>,
}

impl<S: InputSink> ControlChannel<S> {
    pub fn new(sink: S) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(sink),
        }
    }
}

impl<S: InputSink> MethodCallHandler for ControlChannel<S> {
    fn on_method_call(&self, call: MethodCall, result: MethodResult) {
        let Ok(command) = call.method.parse::<Command>() else {
            result.not_implemented();
            return;
        };

        if self.dispatcher.dispatch(command.as_ref()) {
            result.success(format!("Media {command} command sent successfully"));
        } else {
            result.error(
                COMMAND_ERROR_CODE,
                format!("Failed to send media {command} command"),
            );
        }
    }
}

/// Handles `getCurrentMedia`.
///
/// Each call gets its own worker thread; the reply is sent from there once
/// the query finishes. The reply is always a success, failures travel in the
/// `error` key of the payload.
pub struct InfoChannel<B> {
    backend: B,
    worker: WorkerConfig,
}

impl<B: SessionBackend + Clone> InfoChannel<B> {
    pub fn new(backend: B, worker: WorkerConfig) -> Self {
        Self { backend, worker }
    }

    /// Starts a query and returns its task; the reply goes to `result`.
    pub fn query(&self, result: MethodResult) -> QueryTask {
        let backend = self.backend.clone();
        let timeout = self.worker.timeout;

        spawn_query(
            "media-info-query",
            move || async move {
                SessionInfoCollector::new(backend)
                    .with_timeout(timeout)
                    .collect()
                    .await
            },
            move |outcome| {
                let info = outcome.unwrap_or_else(|failure| MediaInfo::from_failure(&failure));
                result.success(info);
            },
        )
    }
}

impl<B: SessionBackend + Clone> MethodCallHandler for InfoChannel<B> {
    fn on_method_call(&self, call: MethodCall, result: MethodResult) {
        if call.method != GET_CURRENT_MEDIA {
            result.not_implemented();
            return;
        }

        // detached, the worker replies on its own
        let _ = self.query(result);
    }
}
