//! Process configuration
//!
//! Loaded from a TOML file. Every section and field has a default, so an
//! empty or partial file is valid:
//!
//! ```toml
//! [transport]
//! port = 46398
//!
//! [pixels]
//! opc_address = "127.0.0.1:7890"
//! strip_length = 60
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::instrument::pixel_animator::DEFAULT_STRIP_LENGTH;
use crate::logging::LogConfig;

/// Slowest accepted pixel refresh rate (frames per second)
const MIN_REFRESH_RATE: f64 = 0.001;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LumencueConfig {
    /// Inbound cue transport
    pub transport: TransportConfig,
    /// Dispatch loop
    pub engine: EngineConfig,
    /// Wall-light controller
    pub wall_light: WallLightConfig,
    /// LED strip
    pub pixels: PixelConfig,
    /// Pass-through sink
    pub puredata: PassthroughConfig,
    /// Logging
    pub logging: LogConfig,
}

/// Websocket endpoint cues arrive on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Route of the websocket endpoint
    pub path: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 46398,
            path: "/umtlocal".to_string(),
        }
    }
}

impl TransportConfig {
    /// Socket address to bind
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        parse_addr(&format!("{}:{}", self.host, self.port), "transport")
    }
}

/// Dispatch loop tuning
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Microseconds to sleep on idle iterations, 0 busy-polls
    pub idle_backoff_us: u64,
}

impl EngineConfig {
    /// Idle back-off as a duration
    pub fn idle_backoff(&self) -> Duration {
        Duration::from_micros(self.idle_backoff_us)
    }
}

/// Wall-light controller destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallLightConfig {
    /// `ip:port` of the controller
    pub target: String,
}

impl Default for WallLightConfig {
    fn default() -> Self {
        Self {
            target: "192.168.10.223:9000".to_string(),
        }
    }
}

impl WallLightConfig {
    /// Parsed controller address
    pub fn target_addr(&self) -> Result<SocketAddr> {
        parse_addr(&self.target, "wall_light.target")
    }
}

/// LED strip and its Open Pixel Control server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelConfig {
    /// `ip:port` of the OPC server
    pub opc_address: String,
    /// OPC channel
    pub channel: u8,
    /// Number of pixels on the strip
    pub strip_length: usize,
    /// Maximum frames per second sent to the server, 0 sends every frame
    pub refresh_rate: f64,
}

impl Default for PixelConfig {
    fn default() -> Self {
        Self {
            opc_address: "127.0.0.1:7890".to_string(),
            channel: 0,
            strip_length: DEFAULT_STRIP_LENGTH,
            refresh_rate: 60.0,
        }
    }
}

impl PixelConfig {
    /// Parsed OPC server address
    pub fn opc_addr(&self) -> Result<SocketAddr> {
        parse_addr(&self.opc_address, "pixels.opc_address")
    }

    /// Minimum interval between frames sent to the server
    pub fn min_interval(&self) -> Duration {
        if self.refresh_rate > 0.0 && self.refresh_rate.is_finite() {
            Duration::try_from_secs_f64(1.0 / self.refresh_rate).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        }
    }
}

/// Pass-through sink destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassthroughConfig {
    /// `ip:port` the greeting goes to
    pub target: String,
}

impl Default for PassthroughConfig {
    fn default() -> Self {
        Self {
            target: "127.0.0.1:13003".to_string(),
        }
    }
}

impl PassthroughConfig {
    /// Parsed destination address
    pub fn target_addr(&self) -> Result<SocketAddr> {
        parse_addr(&self.target, "puredata.target")
    }
}

fn parse_addr(raw: &str, field: &str) -> Result<SocketAddr> {
    raw.parse()
        .map_err(|e| EngineError::Config(format!("invalid {} address {:?}: {}", field, raw, e)))
}

impl LumencueConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::info!("Loading config from {:?}", path);
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Write to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Check every address parses and the strip is usable
    pub fn validate(&self) -> Result<()> {
        self.transport.bind_addr()?;
        self.wall_light.target_addr()?;
        self.pixels.opc_addr()?;
        self.puredata.target_addr()?;

        let rate = self.pixels.refresh_rate;
        if !rate.is_finite() || rate < 0.0 || (rate > 0.0 && rate < MIN_REFRESH_RATE) {
            return Err(EngineError::Config(format!(
                "pixels.refresh_rate {} must be 0 or at least {}",
                rate, MIN_REFRESH_RATE
            )));
        }

        if self.pixels.strip_length == 0 {
            return Err(EngineError::Config("pixels.strip_length must be at least 1".into()));
        }
        // OPC length field is 16 bits of bytes
        if self.pixels.strip_length > usize::from(u16::MAX) / 3 {
            return Err(EngineError::Config(format!(
                "pixels.strip_length {} exceeds an OPC frame",
                self.pixels.strip_length
            )));
        }
        Ok(())
    }
}
