use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rigsync::prelude::*;

const VEHICLE_COUNTS: &[usize] = &[0, 1, 8];

pub fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("bench_tick");

    for n in VEHICLE_COUNTS {
        let mut app = App::new(SimulationConfig::default());
        app.spawn_showcase().unwrap();
        let asset = rigsync::asset::placeholder_vehicle();
        for i in 0..*n {
            app.build_vehicle(&asset, Vec3::new(i as f32 * -3.0, 2.0, -4.0))
                .unwrap();
        }

        group.throughput(criterion::Throughput::Elements(app.registry().len() as u64));
        group.bench_function(n.to_string().as_str(), |b| {
            b.iter(|| black_box(app.tick(1.0 / 60.0)))
        });
    }

    group.finish();
}

pub fn bench_build_vehicle(c: &mut Criterion) {
    let asset = rigsync::asset::placeholder_vehicle();
    c.bench_function("bench_build_vehicle", |b| {
        b.iter(|| {
            let mut app = App::new(SimulationConfig::default());
            black_box(app.build_vehicle(&asset, Vec3::new(0.0, 2.0, 0.0)).unwrap());
        })
    });
}

criterion_group!(benches, bench_tick, bench_build_vehicle);
criterion_main!(benches);
