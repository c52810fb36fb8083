//! Typed PVR settings on top of `pvrconfig::Config`.
//!
//! The getters persist their default value when the key is missing, so a
//! fresh configuration file lists every option the manager understands.
//!
//! ```no_run
//! use pvrconfig::get_config;
//! use pvrmanager::{ManagerOptions, PvrConfigExt};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! if !config.get_pvr_enabled()? {
//!     println!("PVR is disabled");
//! }
//! let options = ManagerOptions::from_config(&config)?;
//! println!("Wake timeout: {:?}", options.wake_timeout);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, anyhow};
use pvrconfig::Config;
use serde::{Deserialize, Serialize};
use serde_yaml::{Number, Value};

pub const DEFAULT_WAKE_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_PROVIDER_RETRY_MS: u64 = 500;
pub const DEFAULT_CHANNEL_ENTRY_TIMEOUT_MS: u64 = 0;

/// What to do with the last watched channel when the manager first loads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartLastChannel {
    #[default]
    Off,
    Minimized,
    On,
}

impl StartLastChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartLastChannel::Off => "off",
            StartLastChannel::Minimized => "minimized",
            StartLastChannel::On => "on",
        }
    }
}

impl fmt::Display for StartLastChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StartLastChannel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "false" => Ok(StartLastChannel::Off),
            "minimized" => Ok(StartLastChannel::Minimized),
            "on" | "true" => Ok(StartLastChannel::On),
            other => Err(anyhow!("Unknown start-last-channel policy '{}'", other)),
        }
    }
}

pub trait PvrConfigExt {
    /// Whether the PVR manager starts at all (default: true).
    fn get_pvr_enabled(&self) -> Result<bool>;
    fn set_pvr_enabled(&self, enabled: bool) -> Result<()>;

    /// Longest sleep of the worker between two passes (default: 1000 ms).
    fn get_pvr_wake_timeout_ms(&self) -> Result<u64>;
    fn set_pvr_wake_timeout_ms(&self, ms: u64) -> Result<()>;

    /// Pause between two provider activation attempts (default: 500 ms).
    fn get_pvr_provider_retry_ms(&self) -> Result<u64>;
    fn set_pvr_provider_retry_ms(&self, ms: u64) -> Result<()>;

    /// How long a channel must stay on screen before it enters the
    /// previous-channel history (default: 0 ms).
    fn get_pvr_channel_entry_timeout_ms(&self) -> Result<u64>;
    fn set_pvr_channel_entry_timeout_ms(&self, ms: u64) -> Result<()>;

    fn get_pvr_start_last(&self) -> Result<StartLastChannel>;
    fn set_pvr_start_last(&self, policy: StartLastChannel) -> Result<()>;
}

const ENABLED: [&str; 2] = ["pvrmanager", "enabled"];
const WAKE_TIMEOUT: [&str; 2] = ["pvrmanager", "wake_timeout_ms"];
const PROVIDER_RETRY: [&str; 2] = ["pvrmanager", "provider_retry_ms"];
const CHANNEL_ENTRY_TIMEOUT: [&str; 2] = ["pvrplayback", "channel_entry_timeout_ms"];
const START_LAST: [&str; 2] = ["pvrplayback", "start_last"];

fn get_u64_or_default(config: &Config, path: &[&str], default: u64) -> Result<u64> {
    if let Ok(Value::Number(n)) = config.get_value(path) {
        if let Some(value) = n.as_u64() {
            return Ok(value);
        }
    }
    config.set_value(path, Value::Number(Number::from(default)))?;
    Ok(default)
}

impl PvrConfigExt for Config {
    fn get_pvr_enabled(&self) -> Result<bool> {
        match self.get_value(&ENABLED) {
            Ok(Value::Bool(b)) => Ok(b),
            _ => {
                self.set_pvr_enabled(true)?;
                Ok(true)
            }
        }
    }

    fn set_pvr_enabled(&self, enabled: bool) -> Result<()> {
        self.set_value(&ENABLED, Value::Bool(enabled))
    }

    fn get_pvr_wake_timeout_ms(&self) -> Result<u64> {
        get_u64_or_default(self, &WAKE_TIMEOUT, DEFAULT_WAKE_TIMEOUT_MS)
    }

    fn set_pvr_wake_timeout_ms(&self, ms: u64) -> Result<()> {
        self.set_value(&WAKE_TIMEOUT, Value::Number(Number::from(ms)))
    }

    fn get_pvr_provider_retry_ms(&self) -> Result<u64> {
        get_u64_or_default(self, &PROVIDER_RETRY, DEFAULT_PROVIDER_RETRY_MS)
    }

    fn set_pvr_provider_retry_ms(&self, ms: u64) -> Result<()> {
        self.set_value(&PROVIDER_RETRY, Value::Number(Number::from(ms)))
    }

    fn get_pvr_channel_entry_timeout_ms(&self) -> Result<u64> {
        get_u64_or_default(
            self,
            &CHANNEL_ENTRY_TIMEOUT,
            DEFAULT_CHANNEL_ENTRY_TIMEOUT_MS,
        )
    }

    fn set_pvr_channel_entry_timeout_ms(&self, ms: u64) -> Result<()> {
        self.set_value(&CHANNEL_ENTRY_TIMEOUT, Value::Number(Number::from(ms)))
    }

    fn get_pvr_start_last(&self) -> Result<StartLastChannel> {
        match self.get_value(&START_LAST) {
            Ok(Value::String(s)) => s.parse(),
            // A bare `off` / `on` in YAML 1.1 reads as a boolean
            Ok(Value::Bool(b)) => Ok(if b {
                StartLastChannel::On
            } else {
                StartLastChannel::Off
            }),
            _ => {
                self.set_pvr_start_last(StartLastChannel::default())?;
                Ok(StartLastChannel::default())
            }
        }
    }

    fn set_pvr_start_last(&self, policy: StartLastChannel) -> Result<()> {
        self.set_value(&START_LAST, Value::String(policy.as_str().to_string()))
    }
}

/// Runtime options of the PVR manager.
#[derive(Clone, Debug, PartialEq)]
pub struct ManagerOptions {
    pub enabled: bool,
    pub channel_entry_timeout: Duration,
    pub start_last: StartLastChannel,
    pub wake_timeout: Duration,
    pub provider_retry: Duration,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            channel_entry_timeout: Duration::from_millis(DEFAULT_CHANNEL_ENTRY_TIMEOUT_MS),
            start_last: StartLastChannel::Off,
            wake_timeout: Duration::from_millis(DEFAULT_WAKE_TIMEOUT_MS),
            provider_retry: Duration::from_millis(DEFAULT_PROVIDER_RETRY_MS),
        }
    }
}

impl ManagerOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            enabled: config.get_pvr_enabled()?,
            channel_entry_timeout: Duration::from_millis(
                config.get_pvr_channel_entry_timeout_ms()?,
            ),
            start_last: config.get_pvr_start_last()?,
            wake_timeout: Duration::from_millis(config.get_pvr_wake_timeout_ms()?),
            provider_retry: Duration::from_millis(config.get_pvr_provider_retry_ms()?),
        })
    }
}
