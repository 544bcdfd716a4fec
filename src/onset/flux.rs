use crate::fft::FftPlan;
use crate::frame;
use crate::utils::gaussian_filter1d;

/// Standard deviation, in frames, of the smoothing applied to the flux curve.
pub const FLUX_SMOOTHING_SIGMA: f64 = 2.0;

/// Spectral flux novelty curve of one trace.
///
/// `values[i]` is the novelty of frame `i` and `frame_times[i]` the start of
/// that frame in seconds, relative to the first sample of the trace.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralFluxCurve {
    pub values: Vec<f64>,
    pub frame_times: Vec<f64>,
}

impl SpectralFluxCurve {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the curve has no frames.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Largest novelty value, or `None` for an empty curve.
    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }
}

/// Compute the spectral flux of a signal.
///
/// The signal is cut into frames of `window_size` samples every `hop_size`
/// samples (see [`frame::frame_count`]). Each raw frame goes through a
/// full-length DFT with no window function; the flux of frame `i > 0` is
/// the sum over all bins of the squared difference between its magnitude
/// spectrum and that of frame `i - 1`. Frame 0 has flux 0.
///
/// With `smooth` set, the curve is passed through a Gaussian of
/// [`FLUX_SMOOTHING_SIGMA`] frames.
///
/// # Arguments
/// * `samples` - Input signal
/// * `sample_rate_hz` - Sample rate in Hz, used for the frame times
/// * `window_size` - Frame length in samples
/// * `hop_size` - Frame advance in samples
/// * `smooth` - Apply Gaussian smoothing to the curve
///
/// # Errors
/// * [`crate::Error::EmptySignal`] for an empty signal
/// * [`crate::Error::InvalidSize`] for a zero window or hop
/// * [`crate::Error::InvalidParameter`] for a non-positive or non-finite sample rate
///
/// # Example
/// ```
/// use tremor::onset::compute_flux;
///
/// let mut y = vec![0.0; 1000];
/// y[500] = 1.0;
/// let curve = compute_flux(&y, 100.0, 20, 5, true).unwrap();
/// assert_eq!(curve.len(), 196);
/// assert_eq!(curve.values[0], 0.0);
/// assert_eq!(curve.frame_times[2], 0.1);
/// ```
pub fn compute_flux(
    samples: &[f64],
    sample_rate_hz: f64,
    window_size: usize,
    hop_size: usize,
    smooth: bool,
) -> crate::Result<SpectralFluxCurve> {
    if samples.is_empty() {
        return Err(crate::Error::EmptySignal);
    }
    if !(sample_rate_hz > 0.0 && sample_rate_hz.is_finite()) {
        return Err(crate::Error::InvalidParameter {
            name: "sample_rate_hz",
            value: sample_rate_hz.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }

    let frames = frame::frames(samples, window_size, hop_size)?;
    let plan = FftPlan::new(window_size.min(samples.len()));

    let mut values = vec![0.0f64; frames.len()];
    let mut prev_mag: Option<Vec<f64>> = None;
    for (i, frame) in frames.iter().enumerate() {
        let mag = plan.magnitude(frame);
        if let Some(prev) = &prev_mag {
            values[i] = mag
                .iter()
                .zip(prev)
                .map(|(m, p)| (m - p) * (m - p))
                .sum();
        }
        prev_mag = Some(mag);
    }

    let frame_times = (0..frames.len())
        .map(|i| (i * hop_size) as f64 / sample_rate_hz)
        .collect();

    if smooth {
        values = gaussian_filter1d(&values, FLUX_SMOOTHING_SIGMA);
    }

    Ok(SpectralFluxCurve {
        values,
        frame_times,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_flux_impulse_unsmoothed() {
        // Impulse at 50 lies in frames 9 and 10 (starts 45 and 50, window 10).
        // Entering and leaving changes every bin magnitude by 1.
        let mut y = vec![0.0; 120];
        y[50] = 1.0;
        let curve = compute_flux(&y, 10.0, 10, 5, false).unwrap();
        assert_eq!(curve.len(), 22);
        for (i, &v) in curve.values.iter().enumerate() {
            match i {
                9 | 11 => assert_abs_diff_eq!(v, 10.0, epsilon = 1e-9),
                10 => assert_abs_diff_eq!(v, 0.0, epsilon = 1e-9),
                _ => assert_eq!(v, 0.0, "frame {i}"),
            }
        }
    }

    #[test]
    fn test_flux_frame_times() {
        let y = vec![0.5; 100];
        let curve = compute_flux(&y, 50.0, 10, 4, true).unwrap();
        assert_eq!(curve.len(), 22);
        assert_eq!(curve.frame_times.len(), 22);
        for (i, &t) in curve.frame_times.iter().enumerate() {
            assert_abs_diff_eq!(t, (i * 4) as f64 / 50.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_flux_constant_signal_is_zero() {
        let curve = compute_flux(&[1.0; 64], 8.0, 8, 2, true).unwrap();
        assert!(curve.values.iter().all(|&v| v.abs() < 1e-12));
        assert_eq!(curve.max(), Some(0.0));
    }

    #[test]
    fn test_flux_short_signal_single_frame() {
        let curve = compute_flux(&[1.0, -1.0, 0.5], 10.0, 8, 2, true).unwrap();
        assert_eq!(curve.values, vec![0.0]);
        assert_eq!(curve.frame_times, vec![0.0]);
    }

    #[test]
    fn test_flux_rejects_bad_input() {
        assert!(matches!(
            compute_flux(&[], 10.0, 8, 2, true),
            Err(crate::Error::EmptySignal)
        ));
        assert!(compute_flux(&[0.0; 10], 10.0, 0, 2, true).is_err());
        assert!(compute_flux(&[0.0; 10], 10.0, 4, 0, true).is_err());
        assert!(compute_flux(&[0.0; 10], 0.0, 4, 2, true).is_err());
        assert!(compute_flux(&[0.0; 10], f64::INFINITY, 4, 2, true).is_err());
    }

    #[test]
    fn test_smoothing_spreads_but_keeps_position() {
        let mut y = vec![0.0; 400];
        y[200] = 1.0;
        let raw = compute_flux(&y, 100.0, 20, 5, false).unwrap();
        let smooth = compute_flux(&y, 100.0, 20, 5, true).unwrap();
        let argmax = |v: &[f64]| {
            v.iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .unwrap()
        };
        assert!(smooth.max().unwrap() < raw.max().unwrap());
        let shift = argmax(&smooth.values) as isize - argmax(&raw.values) as isize;
        assert!(shift.abs() <= 4, "shift {shift}");
    }
}
