/// Number of standard deviations the Gaussian kernel extends on each side.
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// Normalized Gaussian kernel with radius `round(GAUSSIAN_TRUNCATE * sigma)`.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as usize;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let d = i as f64 - radius as f64;
            (-d * d / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Smooth a 1-D signal with a Gaussian kernel of standard deviation `sigma`
/// (in samples).
///
/// The signal is extended past both ends by reflection about the edge
/// (`d c b a | a b c d | d c b a`), repeated as often as the kernel needs,
/// so the output has the input's length and a constant signal stays
/// constant. A non-positive or non-finite `sigma` returns the input
/// unchanged.
///
/// # Example
/// ```
/// use tremor::utils::gaussian_filter1d;
///
/// let smoothed = gaussian_filter1d(&[0.0, 0.0, 1.0, 0.0, 0.0], 1.0);
/// assert_eq!(smoothed.len(), 5);
/// assert!(smoothed[2] < 1.0 && smoothed[1] > 0.0);
/// ```
pub fn gaussian_filter1d(x: &[f64], sigma: f64) -> Vec<f64> {
    if x.is_empty() || !(sigma > 0.0 && sigma.is_finite()) {
        return x.to_vec();
    }

    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let n = x.len() as isize;

    (0..n)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(j, &w)| w * x[reflect_index(i + j as isize - radius, n)])
                .sum()
        })
        .collect()
}

/// Map an out-of-range index back into `0..n` by half-sample reflection.
fn reflect_index(i: isize, n: isize) -> usize {
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - 1 - m }) as usize
}
