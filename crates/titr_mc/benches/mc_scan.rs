use std::hint::black_box;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;

use titr_energy::EnergyModel;
use titr_mc::MCEngine;
use titr_rng::Mt19937;

fn build_model(nsites: usize) -> EnergyModel {
    let ninstances = nsites * 2;
    let mut model = EnergyModel::new(nsites, ninstances);
    model.set_temperature(298.15);
    for site in 0..nsites {
        let first = site * 2;
        let last = first + 1;
        model.set_site(site, first, last).unwrap();
        model.set_protons(first, 0).unwrap();
        model.set_protons(last, 1).unwrap();
        model.set_gintr(first, 0.0).unwrap();
        model.set_gintr(last, -2.0).unwrap();
    }
    for i in 0..ninstances {
        for j in 0..ninstances {
            if i != j {
                model.set_interaction(i, j, 0.1).unwrap();
            }
        }
    }
    model.symmetrize_interactions();
    model
}

fn run_equilibration_and_production(nsites: usize, nequil: u64, nprod: u64) {
    let mut model = build_model(nsites);
    let mut engine = MCEngine::new(Mt19937::new(1), 1.0, nequil, nprod);
    engine.link_to_energy_model(&model);
    engine.find_pairs(&mut model).unwrap();
    engine.equilibration(&model, black_box(7.0)).unwrap();
    engine.production(&model, black_box(7.0)).unwrap();
}

fn scan_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("MC equilibration and production scans");
    group.measurement_time(std::time::Duration::from_secs(10));
    group.bench_function("nsites_0010", |b| b.iter(|| run_equilibration_and_production(10, 200, 2_000)));
    group.bench_function("nsites_0050", |b| b.iter(|| run_equilibration_and_production(50, 200, 2_000)));
    group.bench_function("nsites_0200", |b| b.iter(|| run_equilibration_and_production(200, 200, 2_000)));
    group.finish();
}

criterion_group!(benches, scan_benchmark);
criterion_main!(benches);
