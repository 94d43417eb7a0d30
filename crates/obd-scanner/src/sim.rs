//! Simulated Adapter
//!
//! Scripted ELM-style device over an in-memory duplex pipe, for tests and
//! offline monitor runs. The device reads CR-terminated requests and
//! answers from a response table, ending every reply with the `>` prompt;
//! unscripted requests are answered with `?` like a real adapter.

use obd_link::Channel;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tracing::debug;

/// How the simulated device reacts to one request
#[derive(Debug, Clone)]
pub enum SimBehavior {
    /// Reply with this payload, then the prompt
    Reply(String),
    /// Reply `NO DATA`
    NoData,
    /// Reply with a `7F <mode> 11` service rejection
    Reject,
    /// Swallow the request and never answer (forces a read timeout)
    Silent,
    /// Drop the connection
    Disconnect,
}

/// Shared record of every request the device saw, in arrival order
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    requests: Arc<Mutex<Vec<String>>>,
}

impl RequestLog {
    /// Snapshot of the requests seen so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn record(&self, request: &str) {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.to_string());
        }
    }
}

/// Scripted request/response adapter
#[derive(Debug, Clone, Default)]
pub struct SimDevice {
    responses: HashMap<String, SimBehavior>,
    log: Option<RequestLog>,
}

impl SimDevice {
    /// Empty script; every request is answered with `?`
    pub fn new() -> Self {
        Self::default()
    }

    /// Script one request
    pub fn on(mut self, request: &str, behavior: SimBehavior) -> Self {
        self.responses.insert(request.to_string(), behavior);
        self
    }

    /// Convenience: script a positive reply
    pub fn reply(self, request: &str, payload: &str) -> Self {
        self.on(request, SimBehavior::Reply(payload.to_string()))
    }

    /// Record every request the device sees into `log`
    pub fn with_log(mut self, log: RequestLog) -> Self {
        self.log = Some(log);
        self
    }

    /// A plausible vehicle: setup commands acknowledged, part of the
    /// catalog answered, the rest rejected or empty
    pub fn standard() -> Self {
        Self::new()
            // Adapter setup
            .reply("ATE0", "OK")
            .reply("ATL0", "OK")
            .reply("ATSTFF", "OK")
            .reply("ATSP0", "OK")
            // Engine
            .reply("010C", "41 0C 1A F8")
            .reply("010D", "41 0D 41")
            .reply("0104", "41 04 7F")
            .on("011F", SimBehavior::Reject)
            .reply("0110", "41 10 05 1E")
            .reply("0111", "41 11 33")
            // Fuel
            .reply("012F", "41 2F 6B")
            .reply("0106", "41 06 85")
            .on("0107", SimBehavior::NoData)
            .on("0144", SimBehavior::Reject)
            // Pressure
            .reply("010B", "41 0B 23")
            .on("010A", SimBehavior::NoData)
            .reply("0133", "41 33 63")
            .on("0123", SimBehavior::Reject)
            // Temperature
            .reply("0105", "41 05 7B")
            .reply("010F", "41 0F 46")
            .on("0146", SimBehavior::Reject)
            .on("015C", SimBehavior::NoData)
    }

    /// Spawn the device task and hand back the host side as a channel
    pub fn spawn(self, read_timeout: Duration) -> Channel {
        let (host, device) = tokio::io::duplex(256);
        tokio::spawn(run_device(device, self.responses, self.log));
        Channel::new(host, read_timeout)
    }
}

async fn run_device(
    mut stream: DuplexStream,
    responses: HashMap<String, SimBehavior>,
    log: Option<RequestLog>,
) {
    let mut request = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        match stream.read(&mut byte).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        if byte[0] != b'\r' {
            request.push(byte[0]);
            continue;
        }

        let command = String::from_utf8_lossy(&request).trim().to_string();
        request.clear();
        if let Some(log) = &log {
            log.record(&command);
        }

        let behavior = responses
            .get(&command)
            .cloned()
            .unwrap_or_else(|| SimBehavior::Reply("?".to_string()));
        debug!("Sim device: {} -> {:?}", command, behavior);

        let reply = match behavior {
            SimBehavior::Reply(payload) => format!("{payload}\r\r>"),
            SimBehavior::NoData => "NO DATA\r\r>".to_string(),
            SimBehavior::Reject => {
                let mode = command.get(0..2).unwrap_or("01");
                format!("7F {mode} 11\r\r>")
            }
            SimBehavior::Silent => continue,
            SimBehavior::Disconnect => break,
        };

        if stream.write_all(reply.as_bytes()).await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_device_answers_scripted_request() {
        let mut channel = SimDevice::new()
            .reply("0105", "41 05 7B")
            .spawn(Duration::from_millis(200));

        channel.write_all(b"0105\r").await.unwrap();

        let mut raw = Vec::new();
        loop {
            match channel.read_byte().await.unwrap() {
                Some(b'>') => break,
                Some(byte) => raw.push(byte),
                None => panic!("device hung up"),
            }
        }
        assert_eq!(String::from_utf8_lossy(&raw), "41 05 7B\r\r");
    }

    #[tokio::test]
    async fn test_log_records_requests_in_order() {
        let log = RequestLog::default();
        let mut channel = SimDevice::standard()
            .with_log(log.clone())
            .spawn(Duration::from_millis(200));

        for request in [b"ATE0\r".as_slice(), b"010C\r".as_slice()] {
            channel.write_all(request).await.unwrap();
            while let Some(byte) = channel.read_byte().await.unwrap() {
                if byte == b'>' {
                    break;
                }
            }
        }

        assert_eq!(log.requests(), ["ATE0", "010C"]);
    }
}
