mod overrides;
pub use overrides::apply_env_overrides;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Complete client configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PitchsyncConfig {
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub watchdog: WatchdogConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Event channel configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// WebSocket endpoint of the state server
    #[serde(default = "default_url")]
    pub url: String,
    /// Buffer size between the transport task and the session loop
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Framing used on the WebSocket
    #[serde(default)]
    pub protocol: WireProtocol,
}

/// Text framing spoken by the state server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireProtocol {
    /// socket.io v4 packets over engine.io
    #[default]
    SocketIo,
    /// `{"event": name, "data": payload}` envelopes
    Json,
}

fn default_url() -> String {
    "ws://localhost:5000/socket.io/?EIO=4&transport=websocket".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            queue_capacity: default_queue_capacity(),
            protocol: WireProtocol::default(),
        }
    }
}

/// Liveness watchdog configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WatchdogConfig {
    /// Silence window after which the vision feed is considered stale (ms)
    #[serde(default = "default_vision_timeout_ms")]
    pub vision_timeout_ms: u64,
    /// Optional watchdog on `referee_update`; disabled when absent
    #[serde(default)]
    pub referee_timeout_ms: Option<u64>,
}

fn default_vision_timeout_ms() -> u64 {
    3000
}

impl WatchdogConfig {
    pub fn vision_timeout(&self) -> Duration {
        Duration::from_millis(self.vision_timeout_ms)
    }

    pub fn referee_timeout(&self) -> Option<Duration> {
        self.referee_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            vision_timeout_ms: default_vision_timeout_ms(),
            referee_timeout_ms: None,
        }
    }
}

/// Log sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LogsConfig {
    /// Per-sink cap; unbounded when absent
    #[serde(default)]
    pub max_lines: Option<usize>,
    /// strftime format of the `[..]` prefix
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_timestamp_format() -> String {
    crate::logs::DEFAULT_TIMESTAMP_FORMAT.to_string()
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            max_lines: None,
            timestamp_format: default_timestamp_format(),
        }
    }
}

/// Derived state store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Capacity of the change notification broadcast channel
    #[serde(default = "default_change_buffer")]
    pub change_buffer: usize,
}

fn default_change_buffer() -> usize {
    1000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            change_buffer: default_change_buffer(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<PitchsyncConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: PitchsyncConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}
