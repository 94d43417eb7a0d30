//! Transport Acquisition
//!
//! Opens TCP or serial byte channels to an adapter. The rest of the stack
//! only ever sees the resulting [`Channel`].

use crate::channel::Channel;
use crate::error::LinkError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, StopBits};
use tracing::info;

/// Default baud rate for ELM327-style adapters
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Serial line parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Serial port device path (e.g., "/dev/ttyUSB0" or "COM3")
    pub path: String,
    /// Baud rate (default: 9600)
    pub baud_rate: u32,
    /// Data bits (default: 8)
    pub data_bits: u8,
    /// Stop bits (default: 1)
    pub stop_bits: u8,
    /// Use RTS/CTS hardware flow control (default: true)
    pub hardware_flow_control: bool,
}

impl SerialConfig {
    /// Line parameters for a port path, everything else at defaults
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: 8,
            stop_bits: 1,
            hardware_flow_control: true,
        }
    }
}

/// Open a TCP channel to `host:port`, bounded by `connect_timeout`
pub async fn open_tcp(
    host: &str,
    port: u16,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Channel, LinkError> {
    let addr = format!("{host}:{port}");
    info!("Connecting to adapter at {}", addr);

    let stream = match timeout(connect_timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(err)) => return Err(LinkError::Connect(addr, err.to_string())),
        Err(_) => {
            return Err(LinkError::ConnectTimeout(
                addr,
                connect_timeout.as_millis() as u64,
            ))
        }
    };

    Ok(Channel::new(stream, read_timeout))
}

/// Open a serial channel with the given line parameters
pub async fn open_serial(
    config: &SerialConfig,
    read_timeout: Duration,
) -> Result<Channel, LinkError> {
    info!(
        "Opening serial port {} at {} baud",
        config.path, config.baud_rate
    );

    let flow_control = if config.hardware_flow_control {
        FlowControl::Hardware
    } else {
        FlowControl::None
    };

    let stream = tokio_serial::new(&config.path, config.baud_rate)
        .data_bits(data_bits_from(config.data_bits))
        .stop_bits(stop_bits_from(config.stop_bits))
        .parity(Parity::None)
        .flow_control(flow_control)
        .open_native_async()?;

    Ok(Channel::new(stream, read_timeout))
}

fn data_bits_from(bits: u8) -> DataBits {
    match bits {
        5 => DataBits::Five,
        6 => DataBits::Six,
        7 => DataBits::Seven,
        _ => DataBits::Eight,
    }
}

fn stop_bits_from(bits: u8) -> StopBits {
    match bits {
        2 => StopBits::Two,
        _ => StopBits::One,
    }
}
