use criterion::black_box;
use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stproc::kernel::Matern52Kernel;
use stproc::process::{
    ConstantMean, NigParams, StudentTProcessNig, StudentTProcessParams,
};

fn training_data(n: usize, rng: &mut StdRng) -> (DMatrix<f64>, DVector<f64>) {
    let x = DMatrix::from_fn(n, 1, |_, _| rng.gen::<f64>());
    let y = DVector::from_fn(n, |i, _| (8.0 * x[(i, 0)]).sin());
    (x, y)
}

fn bench_prediction(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xABCD);
    let mut group = c.benchmark_group("StudentTProcessNig, prediction");
    for n in [8, 32, 128] {
        let (x, y) = training_data(n, &mut rng);
        let kernel = Matern52Kernel::new(0.2).unwrap();
        let prior = NigParams::isotropic(1, 0.0, 1.0, 1.0, 1.0).unwrap();
        let mut stp = StudentTProcessNig::new(
            kernel,
            ConstantMean,
            prior,
            &x,
            &y,
            StudentTProcessParams::default(),
        )
        .unwrap();
        stp.update_posterior().unwrap();
        stp.precompute_prediction().unwrap();

        let q = DVector::from_column_slice(&[0.37]);
        group.bench_with_input(format!("{} obs", n), &n, |b, _| {
            b.iter(|| black_box(stp.prediction(&q).unwrap()))
        });
    }
    group.finish();
}

fn bench_update_posterior(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x1234);
    let mut group = c.benchmark_group("StudentTProcessNig, update + nll");
    for n in [8, 32, 128] {
        let (x, y) = training_data(n, &mut rng);
        let kernel = Matern52Kernel::new(0.2).unwrap();
        let prior = NigParams::isotropic(1, 0.0, 1.0, 1.0, 1.0).unwrap();
        let mut stp = StudentTProcessNig::new(
            kernel,
            ConstantMean,
            prior,
            &x,
            &y,
            StudentTProcessParams::default(),
        )
        .unwrap();

        group.bench_with_input(format!("{} obs", n), &n, |b, _| {
            b.iter(|| {
                stp.update_posterior().unwrap();
                black_box(stp.neg_log_likelihood().unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_prediction, bench_update_posterior);
criterion_main!(benches);
