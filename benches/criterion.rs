use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use perona_malik::{
    anisotropic_diffusion, contrast_factor::estimate_kappa, nonlinear_diffusion, Conductance,
    DiffusionParameters, Kappa,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn load_image() -> Array2<f32> {
    let mut rng = Pcg64::seed_from_u64(0);
    Array2::from_shape_fn((480, 640), |(_, x)| {
        let base = if x < 320 { 0.25 } else { 0.75 };
        base + rng.gen_range(-0.05f32..0.05)
    })
}

fn diffuse(c: &mut Criterion) {
    let image = load_image();
    let params = DiffusionParameters::new(10, Kappa::estimated(), 0.2);
    for conductance in Conductance::ALL {
        c.bench_function(&format!("diffuse_10_{conductance}"), |b| {
            b.iter(|| anisotropic_diffusion(&image, conductance, &params).unwrap())
        });
    }
}

criterion_group!(
    name = diffusion;
    config = Criterion::default().sample_size(10);
    targets = diffuse
);

fn bench_step(c: &mut Criterion) {
    let image = load_image();
    c.bench_function("calculate_step", |b| {
        b.iter_batched_ref(
            || image.clone(),
            |image| nonlinear_diffusion::calculate_step(image, Conductance::Exponential, 0.1, 0.2),
            criterion::BatchSize::LargeInput,
        )
    });
}

fn bench_estimate_kappa(c: &mut Criterion) {
    let image = load_image();
    c.bench_function("estimate_kappa", |b| {
        b.iter(|| estimate_kappa(image.view(), 90.0))
    });
}

criterion_group!(
    name = diffusion_parts;
    config = Criterion::default().sample_size(10);
    targets = bench_step, bench_estimate_kappa
);

criterion_main!(diffusion, diffusion_parts);
