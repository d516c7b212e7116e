/// Shared helpers for synthetic MET samples.
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

#[allow(unused)]
/// `n` draws from N(0, sigma²).
pub fn gaussian_sample(n: usize, sigma: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, sigma).unwrap();
    (0..n).map(|_| normal.sample(&mut rng)).collect()
}

#[allow(unused)]
/// Truth MET with pt uniform in [5, 395), isotropic phi; ML and PUPPI are
/// scaled truth plus Gaussian noise on each axis.
///
/// Returns `(truth, ml, puppi)`, each `[n, 2]`.
pub fn synthetic_met(
    n: usize,
    ml_scale: f64,
    ml_sigma: f64,
    puppi_scale: f64,
    puppi_sigma: f64,
    seed: u64,
) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let ml_noise = Normal::new(0.0, ml_sigma).unwrap();
    let puppi_noise = Normal::new(0.0, puppi_sigma).unwrap();

    let mut truth = Array2::<f64>::zeros((n, 2));
    let mut ml = Array2::<f64>::zeros((n, 2));
    let mut puppi = Array2::<f64>::zeros((n, 2));
    for i in 0..n {
        let pt: f64 = rng.random_range(5.0..395.0);
        let phi: f64 = rng.random_range(-std::f64::consts::PI..std::f64::consts::PI);
        let (s, c) = phi.sin_cos();
        for (axis, v) in [(0, pt * c), (1, pt * s)] {
            truth[[i, axis]] = v;
            ml[[i, axis]] = v * ml_scale + ml_noise.sample(&mut rng);
            puppi[[i, axis]] = v * puppi_scale + puppi_noise.sample(&mut rng);
        }
    }
    (truth, ml, puppi)
}

#[allow(unused)]
/// Equality that treats NaN == NaN.
pub fn same_or_both_nan(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}
