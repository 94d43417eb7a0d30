//! Capability Discovery
//!
//! Walks the per-category catalogs against a live channel, keeping the
//! commands the device answers, bounded by a global budget.

use crate::error::ScanError;
use crate::outcome::ProbeOutcome;
use crate::probe::run_probe;
use obd_catalog::{catalog, Category, ProbeDescriptor};
use obd_link::Channel;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Global cap on commands accepted across all categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Budget {
    /// No cap; every supported command is kept
    #[default]
    Unlimited,
    /// Keep at most this many commands
    Capped(usize),
}

impl Budget {
    /// Whether another command may still be accepted
    fn allows(&self, accepted: usize) -> bool {
        match self {
            Budget::Unlimited => true,
            Budget::Capped(max) => accepted < *max,
        }
    }
}

/// Ordered, duplicate-free set of commands the device supports.
///
/// Insertion order is discovery order: category order, then catalog order
/// within each category. Built once per discovery pass and read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct SupportedSet {
    entries: Vec<&'static ProbeDescriptor>,
}

impl SupportedSet {
    fn push(&mut self, descriptor: &'static ProbeDescriptor) {
        if self.entries.iter().any(|d| d.id() == descriptor.id()) {
            return;
        }
        self.entries.push(descriptor);
    }

    /// Number of supported commands
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether discovery kept anything
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptor at a discovery-order position
    pub fn get(&self, index: usize) -> Option<&'static ProbeDescriptor> {
        self.entries.get(index).copied()
    }

    /// Descriptors in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &'static ProbeDescriptor> + '_ {
        self.entries.iter().copied()
    }

    /// Identities in discovery order
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|d| d.id()).collect()
    }

    /// Observable summary of the discovery pass
    pub fn summary(&self) -> DiscoverySummary {
        DiscoverySummary {
            commands: self.ids(),
            count: self.len(),
        }
    }
}

/// Observable result of a discovery pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySummary {
    /// Supported command identities, in discovery order
    pub commands: Vec<String>,
    /// Number of supported commands
    pub count: usize,
}

/// Probe every catalog command in `categories` order and collect the
/// supported ones, stopping the whole walk the moment `budget` is
/// exhausted.
///
/// Expected-negative outcomes skip the command and continue. A transport
/// error aborts the pass and discards partial progress; no partial set is
/// ever returned.
pub async fn discover(
    channel: &mut Channel,
    categories: &[Category],
    budget: Budget,
) -> Result<SupportedSet, ScanError> {
    let mut supported = SupportedSet::default();

    'walk: for category in categories {
        for descriptor in catalog(*category) {
            if !budget.allows(supported.len()) {
                debug!("Budget exhausted after {} commands", supported.len());
                break 'walk;
            }
            match run_probe(channel, descriptor).await? {
                ProbeOutcome::Supported(_) => {
                    info!("{} supported", descriptor.id());
                    supported.push(descriptor);
                }
                outcome => {
                    debug!("{} skipped: {:?}", descriptor.id(), outcome);
                }
            }
        }
    }

    info!("Discovery kept {} commands", supported.len());
    Ok(supported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{RequestLog, SimBehavior, SimDevice};
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn test_standard_device_membership_and_order() {
        let mut channel = SimDevice::standard().spawn(TIMEOUT);

        let supported = discover(&mut channel, &Category::ALL, Budget::Unlimited)
            .await
            .unwrap();

        assert_eq!(
            supported.ids(),
            [
                "engine/engine_rpm",
                "engine/vehicle_speed",
                "engine/engine_load",
                "engine/mass_air_flow",
                "engine/throttle_position",
                "fuel/fuel_level",
                "fuel/short_fuel_trim",
                "pressure/intake_manifold_pressure",
                "pressure/barometric_pressure",
                "temperature/coolant_temp",
                "temperature/intake_air_temp",
            ]
        );
        assert_eq!(supported.summary().count, 11);
    }

    #[tokio::test]
    async fn test_budget_caps_the_set() {
        for cap in [0usize, 1, 3, 7, 100] {
            let mut channel = SimDevice::standard().spawn(TIMEOUT);
            let supported = discover(&mut channel, &Category::ALL, Budget::Capped(cap))
                .await
                .unwrap();
            assert!(supported.len() <= cap, "cap {cap} exceeded");
        }
    }

    #[tokio::test]
    async fn test_zero_budget_issues_no_probes() {
        let log = RequestLog::default();
        let mut channel = SimDevice::new().with_log(log.clone()).spawn(TIMEOUT);

        let supported = discover(&mut channel, &Category::ALL, Budget::Capped(0))
            .await
            .unwrap();

        assert!(supported.is_empty());
        assert!(log.requests().is_empty());
    }

    #[tokio::test]
    async fn test_budget_one_stops_before_later_categories() {
        let log = RequestLog::default();
        let mut channel = SimDevice::standard().with_log(log.clone()).spawn(TIMEOUT);

        let supported = discover(&mut channel, &Category::ALL, Budget::Capped(1))
            .await
            .unwrap();

        assert_eq!(supported.ids(), ["engine/engine_rpm"]);
        // The first engine probe satisfied the budget; no fuel, pressure,
        // or temperature request may have been issued
        let requests = log.requests();
        assert_eq!(requests, ["010C"]);
    }

    #[tokio::test]
    async fn test_negative_outcomes_are_skipped_not_fatal() {
        let mut channel = SimDevice::new()
            .reply("010C", "41 0C 1A F8")
            .on("010D", SimBehavior::Reject)
            .on("0104", SimBehavior::NoData)
            .reply("0110", "41 10 05 1E")
            .spawn(TIMEOUT);

        // 011F and 0111 are unscripted and answer with `?`
        let supported = discover(&mut channel, &[Category::Engine], Budget::Unlimited)
            .await
            .unwrap();

        assert_eq!(supported.ids(), ["engine/engine_rpm", "engine/mass_air_flow"]);
    }

    #[tokio::test]
    async fn test_transport_error_discards_partial_progress() {
        let mut channel = SimDevice::new()
            .reply("010C", "41 0C 1A F8")
            .on("010D", SimBehavior::Disconnect)
            .spawn(TIMEOUT);

        let result = discover(&mut channel, &[Category::Engine], Budget::Unlimited).await;

        // The supported first probe is discarded along with the pass
        assert!(matches!(result, Err(ScanError::Link(_))));
    }
}
