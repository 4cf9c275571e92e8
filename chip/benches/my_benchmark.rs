use chip::{chip8::ChipSet, resources::Rom};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};

/// A small program that keeps adding, drawing and jumping back forever
const PROGRAM: [u8; 14] = [
    0x60, 0x01, // V0 = 1
    0x71, 0x01, // V1 += 1
    0x82, 0x14, // V2 += V1
    0xC3, 0x3F, // V3 = rand & 0x3F
    0xA0, 0x00, // I = 0
    0xD3, 0x05, // draw glyph 0 at (V3, V0)
    0x12, 0x02, // jump to 0x202
];

static BASE_ROM: once_cell::sync::Lazy<Rom> = once_cell::sync::Lazy::new(|| {
    Rom::new("bench", PROGRAM.to_vec()).expect("The bench program fits into memory.")
});

/// will setup the default configured chip
fn get_default_chip() -> ChipSet {
    ChipSet::new(BASE_ROM.clone()).with_rng(StdRng::seed_from_u64(42))
}

pub fn execute_bench(c: &mut Criterion) {
    let mut chip = get_default_chip();
    c.bench_function("execute_bench", |b| {
        b.iter(|| {
            for _ in 0..1_000 {
                let _ = chip.next();
            }
        });
    });
}

pub fn print_bench(c: &mut Criterion) {
    let chip = get_default_chip();
    c.bench_function("print_bench", |b| {
        b.iter(|| {
            let _ = format!("{}", chip);
        });
    });
}

criterion_group!(benches, execute_bench, print_bench);
criterion_main!(benches);
