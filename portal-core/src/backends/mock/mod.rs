use crate::Result;
use crate::traits::{NetworkScanner, ScannedNetwork};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

/// A mock scanner for development and tests.
/// It returns a fixed list without touching any radio hardware.
#[derive(Debug, Clone)]
pub struct MockScanner {
    networks: Vec<ScannedNetwork>,
    delay: Duration,
}

impl MockScanner {
    pub fn new(networks: Vec<ScannedNetwork>) -> Self {
        Self {
            networks,
            delay: Duration::ZERO,
        }
    }

    /// Simulate the time a real scan takes.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The list `MockScanner::default()` reports.
    pub fn default_networks() -> Vec<ScannedNetwork> {
        let network = |ssid: &str, rssi, encrypted| ScannedNetwork {
            ssid: ssid.to_string(),
            rssi,
            encrypted,
        };
        vec![
            network("MyHomeWiFi", -38, true),
            network("CafeGuest", -61, false),
            network("Neighbor's Network", -72, true),
            network("xfinitywifi", -56, true),
            network("HiddenNetwork", -84, true),
        ]
    }
}

impl Default for MockScanner {
    fn default() -> Self {
        Self::new(Self::default_networks())
    }
}

#[async_trait]
impl NetworkScanner for MockScanner {
    async fn scan(&self) -> Result<Vec<ScannedNetwork>> {
        tracing::debug!("🤖 [MockScanner] Scanning for networks...");
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        tracing::debug!("🤖 [MockScanner] Found {} networks.", self.networks.len());
        Ok(self.networks.clone())
    }
}
