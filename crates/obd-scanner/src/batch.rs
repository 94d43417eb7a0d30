//! Batched Execution
//!
//! Replays the supported set as one cycle per poll and projects the
//! collected fragments as raw or formatted strings.

use crate::discovery::SupportedSet;
use crate::error::ScanError;
use crate::probe::raw_exchange;
use obd_link::Channel;
use tracing::{debug, warn};

/// Placeholder substituted for a fragment that fails to decode
pub const DEGRADED_MARKER: &str = "N/A";

/// Field delimiter in the joined projections
const DELIMITER: &str = ",";

/// Ordered raw fragments from one execution cycle, one per supported
/// command, in supported-set order. Rebuilt fully on every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    fragments: Vec<String>,
}

impl BatchResult {
    /// Number of fragments
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the cycle produced anything
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragment at a supported-set position
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fragments.get(index).map(String::as_str)
    }

    /// Fragments in supported-set order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(String::as_str)
    }

    /// Comma-joined raw projection
    pub fn raw_joined(&self) -> String {
        self.fragments.join(DELIMITER)
    }

    /// Decode each fragment through its descriptor.
    ///
    /// A single undecodable fragment degrades to [`DEGRADED_MARKER`]
    /// without failing the rest; a length mismatch between batch and set
    /// is a usage error.
    pub fn formatted(&self, supported: &SupportedSet) -> Result<FormattedResult, ScanError> {
        if self.fragments.len() != supported.len() {
            return Err(ScanError::ShapeMismatch {
                expected: supported.len(),
                actual: self.fragments.len(),
            });
        }

        let entries = self
            .fragments
            .iter()
            .zip(supported.iter())
            .map(|(fragment, descriptor)| match descriptor.decode(fragment) {
                Ok(value) => value.to_string(),
                Err(err) => {
                    warn!("{} fragment degraded: {}", descriptor.id(), err);
                    DEGRADED_MARKER.to_string()
                }
            })
            .collect();

        Ok(FormattedResult { entries })
    }
}

/// Formatted projection of a batch cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedResult {
    entries: Vec<String>,
}

impl FormattedResult {
    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the projection is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a supported-set position
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Comma-joined formatted projection
    pub fn joined(&self) -> String {
        self.entries.join(DELIMITER)
    }
}

/// Send every supported command and collect the paired responses in set
/// order.
///
/// An empty set yields an empty result without touching the channel. A
/// transport error fails the whole cycle with no partial result, so raw
/// and formatted projections can never desynchronize across cycles.
pub async fn run_batch(
    channel: &mut Channel,
    supported: &SupportedSet,
) -> Result<BatchResult, ScanError> {
    if supported.is_empty() {
        return Ok(BatchResult::default());
    }

    let mut fragments = Vec::with_capacity(supported.len());
    for descriptor in supported.iter() {
        let fragment = raw_exchange(channel, descriptor.request().as_bytes()).await?;
        fragments.push(fragment);
    }

    debug!("Cycle collected {} fragments", fragments.len());
    Ok(BatchResult { fragments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{discover, Budget};
    use crate::sim::{RequestLog, SimBehavior, SimDevice};
    use obd_catalog::Category;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_millis(200);

    async fn discovered_engine() -> (obd_link::Channel, SupportedSet) {
        let mut channel = SimDevice::standard().spawn(TIMEOUT);
        let supported = discover(&mut channel, &[Category::Engine], Budget::Unlimited)
            .await
            .unwrap();
        (channel, supported)
    }

    #[tokio::test]
    async fn test_batch_matches_set_length_and_order() {
        let (mut channel, supported) = discovered_engine().await;

        let batch = run_batch(&mut channel, &supported).await.unwrap();

        assert_eq!(batch.len(), supported.len());
        // Positional pairing: fragment i answers command i
        assert_eq!(batch.get(0), Some("410C1AF8"));
        assert_eq!(batch.get(1), Some("410D41"));
    }

    #[tokio::test]
    async fn test_empty_set_skips_the_channel() {
        let log = RequestLog::default();
        let mut channel = SimDevice::new().with_log(log.clone()).spawn(TIMEOUT);

        let batch = run_batch(&mut channel, &SupportedSet::default())
            .await
            .unwrap();

        assert!(batch.is_empty());
        assert!(log.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cycle_shape_is_idempotent() {
        let (mut channel, supported) = discovered_engine().await;

        let first = run_batch(&mut channel, &supported).await.unwrap();
        let second = run_batch(&mut channel, &supported).await.unwrap();

        assert_eq!(first.len(), second.len());
        // The simulated device is stateless, so values align exactly
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_transport_error_fails_the_whole_cycle() {
        let (_, supported) = discovered_engine().await;

        // Same supported set, but the device now drops on the second command
        let mut channel = SimDevice::new()
            .reply("010C", "41 0C 1A F8")
            .on("010D", SimBehavior::Disconnect)
            .spawn(TIMEOUT);

        assert!(matches!(
            run_batch(&mut channel, &supported).await,
            Err(ScanError::Link(_))
        ));
    }

    #[tokio::test]
    async fn test_formatted_projection_decodes_in_order() {
        let (mut channel, supported) = discovered_engine().await;

        let batch = run_batch(&mut channel, &supported).await.unwrap();
        let formatted = batch.formatted(&supported).unwrap();

        assert_eq!(formatted.len(), supported.len());
        assert_eq!(formatted.get(0), Some("1726 RPM"));
        assert_eq!(formatted.get(1), Some("65 km/h"));
    }

    #[tokio::test]
    async fn test_single_corrupt_fragment_degrades_alone() {
        let (mut channel, supported) = discovered_engine().await;
        let batch = run_batch(&mut channel, &supported).await.unwrap();
        let clean = batch.formatted(&supported).unwrap();

        for corrupt_at in 0..supported.len() {
            let mut fragments = batch.fragments.clone();
            fragments[corrupt_at] = "garbage".to_string();
            let corrupted = BatchResult { fragments };

            let formatted = corrupted.formatted(&supported).unwrap();
            for position in 0..supported.len() {
                if position == corrupt_at {
                    assert_eq!(formatted.get(position), Some(DEGRADED_MARKER));
                } else {
                    assert_eq!(formatted.get(position), clean.get(position));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_a_usage_error() {
        let (mut channel, supported) = discovered_engine().await;
        let batch = run_batch(&mut channel, &supported).await.unwrap();

        assert!(matches!(
            batch.formatted(&SupportedSet::default()),
            Err(ScanError::ShapeMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_raw_and_formatted_are_projections_of_one_cycle() {
        let (mut channel, supported) = discovered_engine().await;

        let batch = run_batch(&mut channel, &supported).await.unwrap();
        let raw = batch.raw_joined();
        let formatted = batch.formatted(&supported).unwrap().joined();

        assert_eq!(raw.split(',').count(), supported.len());
        assert_eq!(formatted.split(',').count(), supported.len());
        assert!(raw.starts_with("410C1AF8,"));
        assert!(formatted.starts_with("1726 RPM,"));
    }
}
