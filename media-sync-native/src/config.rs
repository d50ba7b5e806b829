use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use strum::{Display, EnumString};

use crate::error::ConfigError;
use crate::worker::WorkerConfig;

pub const DEFAULT_CONTROL_CHANNEL: &str = "media/control";
pub const DEFAULT_INFO_CHANNEL: &str = "media/info";

/// Which OS facility turns a [`MediaKey`](crate::media_events::MediaKey) into input.
#[derive(EnumString, Display, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[strum(serialize_all = "snake_case")]
pub enum KeyInjection {
    #[default]
    SendInput,
    /// `keybd_event`; cannot report rejected events.
    Legacy,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
struct RawConfig {
    control_channel: String,
    info_channel: String,
    log_filter: String,
    query_timeout_ms: Option<u64>,
    key_injection: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            control_channel: DEFAULT_CONTROL_CHANNEL.to_string(),
            info_channel: DEFAULT_INFO_CHANNEL.to_string(),
            log_filter: "info".to_string(),
            query_timeout_ms: None,
            key_injection: KeyInjection::default().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub control_channel: String,
    pub info_channel: String,
    pub log_filter: String,
    pub worker: WorkerConfig,
    pub key_injection: KeyInjection,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            control_channel: DEFAULT_CONTROL_CHANNEL.to_string(),
            info_channel: DEFAULT_INFO_CHANNEL.to_string(),
            log_filter: "info".to_string(),
            worker: WorkerConfig::default(),
            key_injection: KeyInjection::default(),
        }
    }
}

impl BridgeConfig {
    /// Parses the JSON object the host passes at init. Missing keys keep
    /// their defaults and a blank string yields the default config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: RawConfig = serde_json::from_str(json)?;

        let key_injection =
            KeyInjection::from_str(&raw.key_injection).map_err(|_| ConfigError::InvalidField {
                field: "key_injection",
                value: raw.key_injection.clone(),
            })?;

        for (field, value) in [
            ("control_channel", &raw.control_channel),
            ("info_channel", &raw.info_channel),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidField {
                    field,
                    value: value.clone(),
                });
            }
        }

        if raw.control_channel == raw.info_channel {
            return Err(ConfigError::InvalidField {
                field: "info_channel",
                value: raw.info_channel,
            });
        }

        Ok(Self {
            control_channel: raw.control_channel,
            info_channel: raw.info_channel,
            log_filter: raw.log_filter,
            worker: WorkerConfig {
                timeout: raw.query_timeout_ms.map(Duration::from_millis),
            },
            key_injection,
        })
    }
}
