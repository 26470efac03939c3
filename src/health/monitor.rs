//! Periodic node health sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::node::ZWaveNetwork;

use super::probe::NodeProbe;

/// Health sweep tuning.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Time between sweeps
    pub sweep_interval: Duration,

    /// Failed probes tolerated before a node is flipped offline
    pub max_strikes: u32,
}

impl HealthConfig {
    /// Default time between sweeps
    pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

    /// Default strike allowance
    pub const DEFAULT_MAX_STRIKES: u32 = 3;
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Self::DEFAULT_SWEEP_INTERVAL,
            max_strikes: Self::DEFAULT_MAX_STRIKES,
        }
    }
}

/// Sweeps the registry on a timer and decides which nodes are still
/// alive.
///
/// A node is only examined when it has an offline timeout configured
/// and has been silent longer than that timeout. Silent nodes are
/// probed: an answer counts as regular traffic, no answer is a strike,
/// and a node over the strike allowance is flipped offline. The flip
/// itself dispatches at most once, so re-running a sweep without new
/// traffic never announces the same outage twice.
pub struct HealthMonitor {
    network: Arc<ZWaveNetwork>,
    probe: Arc<dyn NodeProbe>,
    config: HealthConfig,
}

impl HealthMonitor {
    /// Create a monitor over a registry and a probe.
    pub fn new(network: Arc<ZWaveNetwork>, probe: Arc<dyn NodeProbe>, config: HealthConfig) -> Self {
        Self {
            network,
            probe,
            config,
        }
    }

    /// Run one sweep over every registered node.
    ///
    /// The gateway, nodes with no offline timeout configured, and
    /// nodes heard from recently are skipped.
    pub async fn sweep_once(&self) {
        let now = Utc::now();

        for node in self.network.nodes() {
            if node.is_gateway() {
                continue;
            }

            let timeout_secs = node.offline_timeout_secs();
            if timeout_secs == 0 {
                continue;
            }

            let silent_secs = (now - node.last_call()).num_seconds();
            if silent_secs <= i64::from(timeout_secs) {
                continue;
            }

            debug!(
                "node {} silent for {}s (timeout {}s), probing",
                node.node_id(),
                silent_secs,
                timeout_secs
            );

            if self.probe.probe(node.node_id()).await {
                self.network.node_heard_from(node.node_id());
            } else {
                let strikes = node.record_strike();
                if strikes > self.config.max_strikes {
                    warn!(
                        "node {} failed {} probes, marking offline",
                        node.node_id(),
                        strikes
                    );
                    node.set_online(false, &self.network.dispatcher());
                }
            }
        }
    }

    /// Spawn the recurring sweep task.
    ///
    /// The first sweep runs as soon as the task is scheduled and one
    /// sweep follows per interval. Stopping (or dropping) the returned
    /// handle takes effect at the next sweep boundary, never mid-sweep.
    pub fn start(self) -> HealthMonitorHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut sweep_timer = interval(self.config.sweep_interval);

            loop {
                tokio::select! {
                    _ = sweep_timer.tick() => self.sweep_once().await,
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        HealthMonitorHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running [`HealthMonitor`] task.
pub struct HealthMonitorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl HealthMonitorHandle {
    /// Stop the monitor at the next sweep boundary and wait for the
    /// task to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
