//! Node health monitoring
//!
//! Decides when a silent node should be considered offline. The policy
//! is timer driven, not message driven: a recurring sweep inspects
//! every registered node, probes the ones that have been silent longer
//! than their configured timeout, and counts strikes against nodes
//! that fail to answer.
//!
//! # Policy
//!
//! Per sweep, for each node:
//! 1. The gateway is never probed
//! 2. `offline_timeout_secs == 0` means the policy is not configured
//!    for the node; it is never auto-timed-out
//! 3. A node heard from within its timeout is left alone
//! 4. A silent node is probed; an answer is treated like any other
//!    traffic, no answer adds a strike
//! 5. Past the strike allowance the node is flipped offline, which
//!    announces `NodeOffline` exactly once per actual flip
//!
//! Any real traffic resets the strike count, so one slow sweep never
//! condemns a healthy device.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use zwave_rs::health::{HealthConfig, HealthMonitor, NodeProbe};
//!
//! let monitor = HealthMonitor::new(network, Arc::new(RadioProbe), HealthConfig::default());
//! let handle = monitor.start();
//!
//! // On shutdown: takes effect at the next sweep boundary
//! handle.stop().await;
//! ```

mod monitor;
mod probe;

pub use monitor::{HealthConfig, HealthMonitor, HealthMonitorHandle};
pub use probe::NodeProbe;
