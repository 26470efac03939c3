//! Liveness probe boundary.

use async_trait::async_trait;

/// One bounded liveness check against a node.
///
/// Implementations send something the node must answer, typically a
/// no-op or a basic get over the radio, and report whether an answer
/// arrived in time. The sweep treats `false` as a strike, so a probe
/// must only return `false` once it is done waiting.
#[async_trait]
pub trait NodeProbe: Send + Sync {
    /// Probe one node, returning whether it answered.
    async fn probe(&self, node_id: u8) -> bool;
}
