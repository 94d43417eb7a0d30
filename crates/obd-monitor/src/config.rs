//! Monitor Configuration

use obd_link::SerialConfig;
use obd_scanner::{Budget, SessionConfig, Transport};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

/// Environment-driven monitor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Transport spec: `sim`, `serial:<path>` or `tcp:<host>:<port>`
    pub transport: String,
    /// Number of polling cycles to run
    pub cycles: u32,
    /// Delay between cycles (ms)
    pub interval_ms: u64,
    /// Cap on discovered commands (absent = unlimited)
    pub budget: Option<usize>,
    /// Emit raw fragments instead of formatted values
    pub raw: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            transport: "sim".to_string(),
            cycles: 10,
            interval_ms: 1000,
            budget: None,
            raw: false,
        }
    }
}

impl MonitorConfig {
    /// Read settings from `OBD_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            transport: env::var("OBD_TRANSPORT").unwrap_or(defaults.transport),
            cycles: parse_var("OBD_CYCLES", defaults.cycles),
            interval_ms: parse_var("OBD_INTERVAL_MS", defaults.interval_ms),
            budget: env::var("OBD_BUDGET").ok().and_then(|v| v.parse().ok()),
            raw: env::var("OBD_RAW")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.raw),
        }
    }

    /// Session configuration for the selected transport
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            transport: parse_transport(&self.transport),
            ..SessionConfig::default()
        }
    }

    /// Discovery budget
    pub fn budget(&self) -> Budget {
        match self.budget {
            Some(max) => Budget::Capped(max),
            None => Budget::Unlimited,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_transport(spec: &str) -> Transport {
    if let Some(rest) = spec.strip_prefix("tcp:") {
        if let Some((host, port)) = rest.rsplit_once(':') {
            if let Ok(port) = port.parse() {
                return Transport::Tcp {
                    host: host.to_string(),
                    port,
                };
            }
        }
        warn!("Malformed tcp transport {:?}, falling back to sim", spec);
    } else if let Some(path) = spec.strip_prefix("serial:") {
        return Transport::Serial(SerialConfig::new(path));
    } else if spec != "sim" {
        warn!("Unknown transport {:?}, falling back to sim", spec);
    }
    Transport::Sim
}
