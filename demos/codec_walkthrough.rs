//! Codec Walkthrough Example
//!
//! This example walks through the hub-side wire protocol one layer at a
//! time: framing a command into an envelope, reading the raw bytes back,
//! demultiplexing into a typed message, and resolving the command payload
//! against the command class registry. It also shows what the decoder does
//! with traffic it cannot place.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example codec_walkthrough
//! ```
//!
//! Set `RUST_LOG=debug` to see the codec's own log output interleaved
//! with the walkthrough.

use bytes::Bytes;

use zwave_rs::cmdclass::class_id;
use zwave_rs::protocol::{Message, ZWaveMessage, ZWaveProtocol};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    println!("Z-Wave Codec Walkthrough");
    println!("========================\n");

    let protocol = ZWaveProtocol::standard();
    println!(
        "Registry loaded with {} command classes\n",
        protocol.registry().class_count()
    );

    // Step 1: encode a single command
    //
    // Switch on the wall plug at node 5: SWITCH_BINARY set, value 0xFF.
    let message = ZWaveMessage::Command {
        node_id: 5,
        command_class_id: class_id::SWITCH_BINARY,
        command_id: 0x01,
        payload: vec![0xFF],
    };

    let wire = protocol.serialize(&message)?;
    println!("Step 1: encode SWITCH_BINARY set for node 5");
    println!("  Wire bytes: {}", hex_dump(&wire));
    println!("  Layout:     [type 0x01][len u32][node][class][cmd][inner len u32][value]\n");

    // Step 2: peel the envelope off by hand
    let mut cursor = Bytes::copy_from_slice(&wire);
    let envelope = Message::decode(&mut cursor)?;
    println!("Step 2: decode the envelope");
    println!("  Message type: 0x{:02X}", envelope.message_type);
    println!("  Payload:      {} bytes", envelope.payload.len());
    println!("  Leftover:     {} bytes\n", cursor.len());

    // Step 3: demultiplex into a typed message
    let decoded = protocol.demux(&envelope)?;
    println!("Step 3: demultiplex");
    match &decoded {
        ZWaveMessage::Command {
            node_id,
            command_class_id,
            command_id,
            payload,
        } => {
            println!("  ✓ Command for node {}", node_id);
            println!(
                "    class 0x{:02X}, command 0x{:02X}, {} payload byte(s)",
                command_class_id,
                command_id,
                payload.len()
            );

            // Step 4: resolve the payload against the registry
            let class = protocol
                .registry()
                .lookup(*command_class_id)
                .ok_or("command class missing from registry")?;
            let descriptor = class
                .get(*command_id)
                .ok_or("command missing from its class")?;
            let parsed = descriptor.parse_payload(payload)?;

            println!("\nStep 4: resolve against the registry");
            println!("  Class:   {}", class.name());
            println!("  Command: {}", descriptor.name());
            for (field, value) in parsed.values() {
                println!("  Field:   {} = 0x{:02X}", field, value);
            }
        }
        other => println!("  ✗ Unexpected message: {:?}", other),
    }

    // Step 5: batch several commands behind one delay
    //
    // A scene controller pressing "movie night": dim the dimmer at node 7
    // to 0x20 and switch off the plug at node 5, three seconds from now.
    let batch = ZWaveMessage::DelayedCommands {
        delay_seconds: 3,
        commands: vec![
            ZWaveMessage::Command {
                node_id: 7,
                command_class_id: class_id::SWITCH_MULTILEVEL,
                command_id: 0x01,
                payload: vec![0x20],
            },
            ZWaveMessage::Command {
                node_id: 5,
                command_class_id: class_id::SWITCH_BINARY,
                command_id: 0x01,
                payload: vec![0x00],
            },
        ],
    };

    let batch_wire = protocol.serialize(&batch)?;
    println!("\nStep 5: encode a delayed batch");
    println!("  Wire bytes: {}", hex_dump(&batch_wire));

    let mut batch_cursor = batch_wire.freeze();
    match protocol.deserialize(&mut batch_cursor)? {
        ZWaveMessage::DelayedCommands {
            delay_seconds,
            commands,
        } => {
            println!(
                "  ✓ Decoded {} command(s) delayed by {} second(s)",
                commands.len(),
                delay_seconds
            );
        }
        other => println!("  ✗ Unexpected message: {:?}", other),
    }

    // Step 6: traffic the registry does not know
    //
    // Class 0xEE is not registered, so the decoder refuses the frame
    // instead of guessing at its payload.
    let rogue = Message::new(
        ZWaveMessage::COMMAND,
        vec![0x05, 0xEE, 0x01, 0x00, 0x00, 0x00, 0x00],
    );
    println!("\nStep 6: decode a command with an unregistered class");
    match protocol.demux(&rogue) {
        Ok(message) => println!("  ✗ Unexpectedly decoded: {:?}", message),
        Err(err) => println!("  ✓ Rejected: {}", err),
    }

    println!("\nWalkthrough completed");
    Ok(())
}

/// Render bytes as space separated hex pairs
fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}
