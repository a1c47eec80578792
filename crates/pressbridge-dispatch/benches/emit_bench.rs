// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the emit hot path: enqueueing from the native side
// and draining on the host side.

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use pressbridge_core::BridgeConfig;
use pressbridge_core::types::{ControlId, InteractionEvent, PressKind, TouchPoint};
use pressbridge_dispatch::{BridgeEmitter, HostRuntime};

fn touch() -> TouchPoint {
    TouchPoint {
        identifier: 0,
        location_x: 24.0,
        location_y: 12.0,
        page_x: 180.0,
        page_y: 140.0,
        timestamp_ms: 10_290_805,
    }
}

fn bench_emit_unbounded(c: &mut Criterion) {
    let (mut runtime, handle) = HostRuntime::new(&BridgeConfig::default());
    let id = ControlId::new();
    handle
        .mount(id, |event: &InteractionEvent| {
            black_box(event.sequence());
        })
        .expect("mount");
    let emitter = handle.emitter();
    let mut seq = 0_u64;

    c.bench_function("emit_unbounded", |b| {
        b.iter(|| {
            seq += 1;
            emitter.emit(InteractionEvent::new(id, seq, PressKind::Press).with_touch(touch()));
            // Keep the queue from growing without bound across iterations.
            if seq % 1024 == 0 {
                runtime.pump();
            }
        })
    });
}

fn bench_pump_batch(c: &mut Criterion) {
    c.bench_function("pump_1000_events", |b| {
        b.iter_batched(
            || {
                let (runtime, handle) = HostRuntime::new(&BridgeConfig::default());
                let id = ControlId::new();
                handle
                    .mount(id, |event: &InteractionEvent| {
                        black_box(event.kind());
                    })
                    .expect("mount");
                let emitter = handle.emitter();
                for seq in 1..=1000 {
                    emitter.emit(InteractionEvent::new(id, seq, PressKind::Press));
                }
                (runtime, handle)
            },
            |(mut runtime, _handle)| black_box(runtime.pump()),
            BatchSize::SmallInput,
        )
    });
}

fn bench_wire_encode(c: &mut Criterion) {
    let event = InteractionEvent::new(ControlId::new(), 42, PressKind::LongPress).with_touch(touch());
    c.bench_function("wire_encode", |b| {
        b.iter(|| black_box(event.to_wire().expect("encode")))
    });
}

criterion_group!(benches, bench_emit_unbounded, bench_pump_batch, bench_wire_encode);
criterion_main!(benches);
