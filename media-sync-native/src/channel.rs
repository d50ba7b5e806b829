//! Named method channels between the host and the native side.
//!
//! The host's message transport decodes a call into a [`MethodCall`], picks
//! the handler registered for the channel name and hands it a one-shot
//! [`MethodResult`]. Handlers may answer inline or from another thread.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

/// The flat value codec shared with the host: maps of strings and bools.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum EncodableValue {
    Null,
    Bool(bool),
    String(String),
    Map(BTreeMap<String, EncodableValue>),
}

impl From<bool> for EncodableValue {
    fn from(value: bool) -> Self {
        EncodableValue::Bool(value)
    }
}

impl From<String> for EncodableValue {
    fn from(value: String) -> Self {
        EncodableValue::String(value)
    }
}

impl From<&str> for EncodableValue {
    fn from(value: &str) -> Self {
        EncodableValue::String(value.to_string())
    }
}

impl EncodableValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EncodableValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EncodableValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&EncodableValue> {
        match self {
            EncodableValue::Map(map) => map.get(key),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: EncodableValue,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: EncodableValue::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodResponse {
    Success(EncodableValue),
    Error { code: String, message: String },
    NotImplemented,
}

type Reply = Box<dyn FnOnce(MethodResponse) + Send>;

/// Answers exactly one [`MethodCall`].
pub struct MethodResult {
    reply: Option<Reply>,
}

impl MethodResult {
    pub fn new(reply: impl FnOnce(MethodResponse) + Send + 'static) -> Self {
        Self {
            reply: Some(Box::new(reply)),
        }
    }

    pub fn success(self, value: impl Into<EncodableValue>) {
        self.respond(MethodResponse::Success(value.into()));
    }

    pub fn error(self, code: &str, message: impl Into<String>) {
        self.respond(MethodResponse::Error {
            code: code.to_string(),
            message: message.into(),
        });
    }

    pub fn not_implemented(self) {
        self.respond(MethodResponse::NotImplemented);
    }

    fn respond(mut self, response: MethodResponse) {
        if let Some(reply) = self.reply.take() {
            reply(response);
        }
    }
}

impl Drop for MethodResult {
    fn drop(&mut self) {
        if self.reply.is_some() {
            tracing::warn!("method result dropped without a reply");
        }
    }
}

pub trait MethodCallHandler: Send + Sync {
    fn on_method_call(&self, call: MethodCall, result: MethodResult);
}

#[derive(Default)]
pub struct ChannelRegistry {
    handlers: HashMap<String, Arc<dyn MethodCallHandler>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler` for `channel`, replacing any previous one.
    pub fn register(&mut self, channel: impl Into<String>, handler: impl MethodCallHandler + 'static) {
        let channel = channel.into();
        tracing::debug!("registered handler for {channel}");
        self.handlers.insert(channel, Arc::new(handler));
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Routes `call` to the handler for `channel`. Calls on channels nobody
    /// registered are answered with not-implemented.
    pub fn invoke(&self, channel: &str, call: MethodCall, result: MethodResult) {
        match self.handlers.get(channel) {
            Some(handler) => {
                tracing::debug!("{channel} <- {}", call.method);
                handler.on_method_call(call, result);
            }
            None => {
                tracing::warn!("no handler registered for channel {channel}");
                result.not_implemented();
            }
        }
    }
}
