//! Offline Watchdog Example
//!
//! This example runs the health monitor against a simulated mesh. Two
//! devices are registered with a short offline timeout: the wall plug at
//! node 2 answers every probe, the sensor at node 3 has "lost power" and
//! answers nothing. Watch the sensor collect strikes and get flipped
//! offline, then come back twenty seconds in when its power "returns".
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --example offline_watchdog
//! ```
//!
//! Press Ctrl+C to stop the watchdog and print the final node states.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use zwave_rs::cmdclass::class_id;
use zwave_rs::health::{HealthConfig, HealthMonitor, NodeProbe};
use zwave_rs::node::{MemoryNodeStore, ZWaveNode, GATEWAY_NODE_ID};
use zwave_rs::{EventDispatcher, NodeEvent, ZWaveNetwork};

const HOME_ID: u32 = 0xC0FF_EE01;

/// Probe backed by a mutable set of node ids that currently answer.
struct SimulatedMesh {
    answering: Mutex<HashSet<u8>>,
}

impl SimulatedMesh {
    fn new(answering: impl IntoIterator<Item = u8>) -> Arc<Self> {
        Arc::new(Self {
            answering: Mutex::new(answering.into_iter().collect()),
        })
    }

    fn power_on(&self, node_id: u8) {
        self.answering
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node_id);
    }
}

#[async_trait]
impl NodeProbe for SimulatedMesh {
    async fn probe(&self, node_id: u8) -> bool {
        let answered = self
            .answering
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&node_id);
        println!(
            "  probe node {} -> {}",
            node_id,
            if answered { "answered" } else { "silence" }
        );
        answered
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    println!("Z-Wave Offline Watchdog Example");
    println!("===============================\n");

    // Wire up the registry with a listener that narrates every event
    let dispatcher = Arc::new(EventDispatcher::new());
    dispatcher.register_fn(|event| {
        match event {
            NodeEvent::NodeOnline { node_id } => println!("  event: node {} is ONLINE", node_id),
            NodeEvent::NodeOffline { node_id } => println!("  event: node {} is OFFLINE", node_id),
            NodeEvent::NodeAdded { node_id } => println!("  event: node {} added", node_id),
            NodeEvent::NodeRemoved { node_id } => println!("  event: node {} removed", node_id),
            NodeEvent::HomeIdChanged { home_id } => {
                println!("  event: home id is now {:08X}", home_id)
            }
        }
        Ok(())
    });

    let store = Arc::new(MemoryNodeStore::new());
    let network = Arc::new(ZWaveNetwork::new(store, Arc::clone(&dispatcher)));
    network.initialize(HOME_ID)?;

    // Register the controller and two devices
    network.register_node(GATEWAY_NODE_ID, HOME_ID);

    let plug = ZWaveNode::builder(2)
        .home_id(HOME_ID)
        .basic_device_type(0x04)
        .generic_device_type(0x10)
        .specific_device_type(0x01)
        .manufacturer_id(0x0086)
        .product_type_id(0x0003)
        .product_id(0x0060)
        .add_command_class(u16::from(class_id::SWITCH_BINARY))
        .build()?;
    network.add_node(plug);

    let sensor = ZWaveNode::builder(3)
        .home_id(HOME_ID)
        .basic_device_type(0x04)
        .generic_device_type(0x21)
        .specific_device_type(0x01)
        .manufacturer_id(0x010F)
        .product_type_id(0x0C02)
        .product_id(0x1002)
        .add_command_class(u16::from(class_id::SENSOR_BINARY))
        .build()?;
    network.add_node(sensor);

    // Five quiet seconds is all either device gets
    network.set_offline_timeout(2, 5);
    network.set_offline_timeout(3, 5);

    println!(
        "Registered {} device(s) behind controller node {}\n",
        network.device_count(),
        network.controller_node_id()
    );

    // Node 2 answers probes, node 3 does not
    let mesh = SimulatedMesh::new([2]);

    let config = HealthConfig {
        sweep_interval: Duration::from_secs(2),
        max_strikes: 2,
    };
    println!(
        "Starting watchdog: sweep every {:?}, {} strike(s) tolerated\n",
        config.sweep_interval, config.max_strikes
    );

    let monitor = HealthMonitor::new(Arc::clone(&network), mesh.clone(), config);
    let handle = monitor.start();

    // Twenty seconds in, the sensor's power "returns"
    let recovering = Arc::clone(&mesh);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(20)).await;
        println!("\n  (sensor at node 3 regains power)\n");
        recovering.power_on(3);
    });

    // Run until Ctrl+C
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })?;
    shutdown_rx.recv().await;

    println!("\nStopping watchdog...");
    handle.stop().await;
    println!("✓ Watchdog stopped\n");

    println!("Final node states:");
    for node in network.nodes() {
        println!(
            "  node {}: online={} strikes={}",
            node.node_id(),
            node.is_online(),
            node.strikes()
        );
    }

    Ok(())
}
