//! Command Probe
//!
//! One request/response cycle: encode, send, read to the prompt, classify.

use crate::outcome::ProbeOutcome;
use obd_catalog::{response, ControlCommand, ProbeDescriptor};
use obd_link::{Channel, LinkError};
use tracing::debug;

/// Prompt byte the adapter emits when ready for the next command
pub const PROMPT: u8 = b'>';

/// Issue one probe for `descriptor` and classify the reply.
///
/// Consumes exactly one request/response cycle on the channel and never
/// retries. Transport failures (I/O error, EOF before the prompt, read
/// timeout) propagate; expected-negative replies come back as outcomes.
pub async fn run_probe(
    channel: &mut Channel,
    descriptor: &ProbeDescriptor,
) -> Result<ProbeOutcome, LinkError> {
    let cleaned = raw_exchange(channel, descriptor.request().as_bytes()).await?;
    let outcome = ProbeOutcome::classify(&cleaned);
    debug!("Probe {}: {:?}", descriptor.id(), outcome);
    Ok(outcome)
}

/// Issue one adapter control command and classify the reply
pub async fn run_control(
    channel: &mut Channel,
    command: &ControlCommand,
) -> Result<ProbeOutcome, LinkError> {
    let cleaned = raw_exchange(channel, command.request().as_bytes()).await?;
    Ok(ProbeOutcome::classify(&cleaned))
}

/// Send a request and collect the cleaned raw reply
pub(crate) async fn raw_exchange(
    channel: &mut Channel,
    request: &[u8],
) -> Result<String, LinkError> {
    channel.write_all(request).await?;
    let raw = read_until_prompt(channel).await?;
    Ok(response::clean(&raw))
}

/// Read bytes until the `>` prompt; EOF before the prompt is a link failure
async fn read_until_prompt(channel: &mut Channel) -> Result<String, LinkError> {
    let mut buf = Vec::new();
    loop {
        match channel.read_byte().await? {
            Some(PROMPT) => break,
            Some(byte) => buf.push(byte),
            None => return Err(LinkError::UnexpectedEof),
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimBehavior, SimDevice};
    use obd_catalog::{catalog, Category};
    use std::time::Duration;

    fn engine_rpm() -> &'static ProbeDescriptor {
        &catalog(Category::Engine)[0]
    }

    #[tokio::test]
    async fn test_probe_supported_command() {
        let mut channel = SimDevice::new()
            .reply("010C", "41 0C 1A F8")
            .spawn(Duration::from_millis(200));

        let outcome = run_probe(&mut channel, engine_rpm()).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Supported("410C1AF8".to_string()));
    }

    #[tokio::test]
    async fn test_probe_rejected_command() {
        let mut channel = SimDevice::new()
            .on("010C", SimBehavior::Reject)
            .spawn(Duration::from_millis(200));

        let outcome = run_probe(&mut channel, engine_rpm()).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Unsupported);
    }

    #[tokio::test]
    async fn test_probe_unknown_command_is_misunderstood() {
        let mut channel = SimDevice::new().spawn(Duration::from_millis(200));

        let outcome = run_probe(&mut channel, engine_rpm()).await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Misunderstood);
    }

    #[tokio::test]
    async fn test_silent_device_times_out() {
        let mut channel = SimDevice::new()
            .on("010C", SimBehavior::Silent)
            .spawn(Duration::from_millis(20));

        assert!(matches!(
            run_probe(&mut channel, engine_rpm()).await,
            Err(LinkError::ReadTimeout(_))
        ));
    }

    #[tokio::test]
    async fn test_disconnect_is_a_link_failure() {
        let mut channel = SimDevice::new()
            .on("010C", SimBehavior::Disconnect)
            .spawn(Duration::from_millis(200));

        assert!(matches!(
            run_probe(&mut channel, engine_rpm()).await,
            Err(LinkError::UnexpectedEof)
        ));
    }

    #[tokio::test]
    async fn test_control_command_acknowledged() {
        let mut channel = SimDevice::new()
            .reply("ATE0", "OK")
            .spawn(Duration::from_millis(200));

        let outcome = run_control(&mut channel, &ControlCommand::EchoOff)
            .await
            .unwrap();
        assert_eq!(outcome, ProbeOutcome::Supported("OK".to_string()));
    }
}
