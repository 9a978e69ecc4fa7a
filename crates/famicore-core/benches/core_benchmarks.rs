//! Hot-loop benchmarks: master ticks and whole frames against a flat
//! cartridge.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use famicore_core::testing::{FlatCartridge, NullApu, NullInput};
use famicore_core::{Console, ConsoleVariant};
use std::time::Duration;

fn make_console() -> Console {
    // Enable rendering, then spin: keeps the PPU pipeline hot.
    let cart = FlatCartridge::with_program(&[
        0xA9, 0x1E, // LDA #$1E
        0x8D, 0x01, 0x20, // STA $2001
        0x4C, 0x05, 0x80, // JMP $8005
    ]);
    let mut console = Console::new(
        ConsoleVariant::NtscFrontLoader,
        Box::new(cart),
        Box::new(NullApu::default()),
        Box::new(NullInput),
    );
    console.power_on();
    console
}

fn bench_master_tick(c: &mut Criterion) {
    let mut console = make_console();
    let mut group = c.benchmark_group("core");
    group.throughput(Throughput::Elements(1));
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("master_tick", |b| {
        b.iter(|| {
            black_box(console.master_tick());
        });
    });
    group.finish();
}

fn bench_step_frame(c: &mut Criterion) {
    let mut console = make_console();
    let mut group = c.benchmark_group("frames");
    group.throughput(Throughput::Elements(1));
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("step_frame", |b| {
        b.iter(|| {
            console.step_frame();
            black_box(console.bus().ppu.frame_buffer().len());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_master_tick, bench_step_frame);
criterion_main!(benches);
