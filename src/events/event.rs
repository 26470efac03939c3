//! Event types raised by the node registry and health monitor.

/// Node lifecycle event.
///
/// Events carry identifiers rather than node handles; listeners that need
/// more detail look the node up in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    /// A node answered after being offline, or came up for the first time.
    NodeOnline {
        /// Z-Wave node id
        node_id: u8,
    },

    /// A node exhausted its liveness strikes and was marked offline.
    NodeOffline {
        /// Z-Wave node id
        node_id: u8,
    },

    /// A fully discovered node was added to the registry.
    NodeAdded {
        /// Z-Wave node id
        node_id: u8,
    },

    /// A node was removed from the registry after un-pairing.
    NodeRemoved {
        /// Z-Wave node id
        node_id: u8,
    },

    /// The network home id was assigned or replaced.
    HomeIdChanged {
        /// 32-bit Z-Wave network identifier
        home_id: u32,
    },
}
