use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use zwave_rs::cmdclass::class_id;
use zwave_rs::protocol::{ZWaveMessage, ZWaveProtocol};

fn sample_command() -> ZWaveMessage {
    ZWaveMessage::Command {
        node_id: 5,
        command_class_id: class_id::SWITCH_BINARY,
        command_id: 0x01,
        payload: vec![0xFF],
    }
}

fn sample_batch() -> ZWaveMessage {
    let commands = (0..8)
        .map(|index| ZWaveMessage::Command {
            node_id: index + 2,
            command_class_id: class_id::SWITCH_MULTILEVEL,
            command_id: 0x01,
            payload: vec![index * 8],
        })
        .collect();
    ZWaveMessage::DelayedCommands {
        delay_seconds: 30,
        commands,
    }
}

fn encoded(protocol: &ZWaveProtocol, message: &ZWaveMessage) -> Bytes {
    protocol
        .serialize(message)
        .expect("sample message must encode")
        .freeze()
}

fn bench_encode_command(c: &mut Criterion) {
    let protocol = ZWaveProtocol::standard();
    let message = sample_command();
    c.bench_function("protocol/encode_command", |b| {
        b.iter(|| {
            let wire = protocol
                .serialize(black_box(&message))
                .expect("encode should succeed");
            black_box(wire);
        });
    });
}

fn bench_decode_command(c: &mut Criterion) {
    let protocol = ZWaveProtocol::standard();
    let wire = encoded(&protocol, &sample_command());
    c.bench_function("protocol/decode_command", |b| {
        b.iter(|| {
            let mut cursor = black_box(wire.clone());
            let decoded = protocol
                .deserialize(&mut cursor)
                .expect("decode should succeed");
            black_box(decoded);
        });
    });
}

fn bench_encode_delayed_batch(c: &mut Criterion) {
    let protocol = ZWaveProtocol::standard();
    let message = sample_batch();
    c.bench_function("protocol/encode_delayed_batch", |b| {
        b.iter(|| {
            let wire = protocol
                .serialize(black_box(&message))
                .expect("encode should succeed");
            black_box(wire);
        });
    });
}

fn bench_decode_delayed_batch(c: &mut Criterion) {
    let protocol = ZWaveProtocol::standard();
    let wire = encoded(&protocol, &sample_batch());
    c.bench_function("protocol/decode_delayed_batch", |b| {
        b.iter(|| {
            let mut cursor = black_box(wire.clone());
            let decoded = protocol
                .deserialize(&mut cursor)
                .expect("decode should succeed");
            black_box(decoded);
        });
    });
}

fn bench_parse_report_payload(c: &mut Criterion) {
    let registry = ZWaveProtocol::standard().registry_handle();
    let payload = [0x01, 0x0F, 0x0C, 0x02, 0x10, 0x02];
    c.bench_function("cmdclass/parse_manufacturer_report", |b| {
        b.iter(|| {
            let descriptor = registry
                .lookup(class_id::MANUFACTURER_SPECIFIC)
                .and_then(|class| class.get(0x05))
                .expect("descriptor must exist");
            let parsed = descriptor
                .parse_payload(black_box(&payload))
                .expect("parse should succeed");
            black_box(parsed);
        });
    });
}

criterion_group!(
    benches,
    bench_encode_command,
    bench_decode_command,
    bench_encode_delayed_batch,
    bench_decode_delayed_batch,
    bench_parse_report_payload
);
criterion_main!(benches);
