pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod key_input;
pub mod logging;
pub mod media_channels;
pub mod media_events;
pub mod media_session;
pub mod worker;

mod jni_callback;

use std::sync::OnceLock;

use jni::JNIEnv;
use jni::objects::{JClass, JObject, JString};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean};

use channel::{ChannelRegistry, MethodCall, MethodResponse, MethodResult};
use config::{BridgeConfig, KeyInjection};
use key_input::InputSink;
use media_channels::{ControlChannel, InfoChannel};
use media_session::{PlatformSessionBackend, SessionBackend};

static CHANNEL_REGISTRY: OnceLock<ChannelRegistry> = OnceLock::new();

/// Registers the control and info channels named in `config` on `registry`.
pub fn register_media_channels<S, B>(
    registry: &mut ChannelRegistry,
    config: &BridgeConfig,
    sink: S,
    backend: B,
) where
    S: InputSink + 'static,
    B: SessionBackend + Clone,
{
    registry.register(config.control_channel.clone(), ControlChannel::new(sink));
    registry.register(
        config.info_channel.clone(),
        InfoChannel::new(backend, config.worker),
    );
}

pub fn platform_input_sink(injection: KeyInjection) -> Box<dyn InputSink> {
    #[cfg(target_os = "windows")]
    {
        match injection {
            KeyInjection::SendInput => Box::new(key_input::SendInputSink),
            KeyInjection::Legacy => Box::new(key_input::LegacyKeybdEventSink),
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        tracing::debug!("{injection} key injection unavailable on this OS");
        Box::new(key_input::NullInputSink)
    }
}

/// The registry wired to the real OS facilities.
pub fn platform_registry(config: &BridgeConfig) -> ChannelRegistry {
    let mut registry = ChannelRegistry::new();
    register_media_channels(
        &mut registry,
        config,
        platform_input_sink(config.key_injection),
        PlatformSessionBackend::default(),
    );
    registry
}

// The JNI names below encode the package `com.example.media_sync_client`;
// an underscore in a package segment is written as `_1`.

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_media_1sync_1client_MediaSyncNative_init(
    mut env: JNIEnv,
    _class: JClass,
    config_json: JString,
) -> jboolean {
    let config_json: String = match env.get_string(&config_json) {
        Ok(s) => s.into(),
        Err(e) => {
            eprintln!("Couldn't get java string: {e}");
            jni_callback::clear_pending_exception(&mut env);
            return JNI_FALSE;
        }
    };

    if init_bridge(&config_json) {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

/// Parses the host's config, then sets up logging and the channels.
///
/// Logging is only installed from a config that parsed, so a bad first
/// call does not pin the default filter for the life of the process.
fn init_bridge(config_json: &str) -> bool {
    let config = match BridgeConfig::from_json(config_json) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("media-sync-native: {e}");
            return false;
        }
    };

    logging::init(&config.log_filter);

    if CHANNEL_REGISTRY.get().is_some() {
        tracing::warn!("media channels already initialized, ignoring new config");
        return true;
    }

    let registry = CHANNEL_REGISTRY.get_or_init(|| platform_registry(&config));
    for channel in registry.channels() {
        tracing::info!("listening on {channel}");
    }

    true
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_example_media_1sync_1client_MediaSyncNative_invokeMethod(
    mut env: JNIEnv,
    _class: JClass,
    channel: JString,
    method: JString,
    callback: JObject,
) {
    let result = match jni_callback::method_result(&env, &callback) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Couldn't hold on to the reply callback: {e}");
            jni_callback::clear_pending_exception(&mut env);
            jni_callback::call_java_fn(&mut env, &callback, &MethodResponse::NotImplemented);
            return;
        }
    };

    let channel = java_string(&mut env, &channel);
    let method = java_string(&mut env, &method);

    invoke_decoded(channel, method, result);
}

fn java_string(env: &mut JNIEnv, value: &JString) -> Option<String> {
    match env.get_string(value) {
        Ok(s) => Some(s.into()),
        Err(e) => {
            tracing::error!("Couldn't get java string: {e}");
            jni_callback::clear_pending_exception(env);
            None
        }
    }
}

/// Every call gets a reply, including ones whose names could not be read.
fn invoke_decoded(channel: Option<String>, method: Option<String>, result: MethodResult) {
    match channel.zip(method) {
        Some((channel, method)) => invoke(&channel, MethodCall::new(method), result),
        None => result.error(
            media_channels::COMMAND_ERROR_CODE,
            "Could not read channel or method name",
        ),
    }
}

fn invoke(channel: &str, call: MethodCall, result: MethodResult) {
    match CHANNEL_REGISTRY.get() {
        Some(registry) => registry.invoke(channel, call, result),
        None => {
            tracing::warn!("{channel} called before init");
            result.not_implemented();
        }
    }
}
