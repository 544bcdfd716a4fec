use crate::onset::flux::SpectralFluxCurve;
use crate::utils::find_peaks;

/// Flux level below which a recording is considered to have gone quiet
/// again, for [`signal_end`].
pub const DEFAULT_END_THRESHOLD: f64 = 1e-16;

/// Configuration for onset peak picking.
///
/// # Example
/// ```
/// use tremor::onset::PeakPickConfig;
///
/// let config = PeakPickConfig::new()
///     .with_height_ratio(0.5)
///     .with_min_separation_s(0.2);
/// assert_eq!(config.min_distance(100.0), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakPickConfig {
    /// Minimum peak height as a fraction of the curve maximum
    pub height_ratio: f64,
    /// Minimum separation between accepted peaks, in seconds of sample time
    pub min_separation_s: f64,
}

impl PeakPickConfig {
    /// Create a peak picking configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the height ratio.
    pub fn with_height_ratio(mut self, height_ratio: f64) -> Self {
        self.height_ratio = height_ratio;
        self
    }

    /// Set the minimum separation in seconds.
    pub fn with_min_separation_s(mut self, min_separation_s: f64) -> Self {
        self.min_separation_s = min_separation_s;
        self
    }

    /// Minimum distance between peaks in frames.
    ///
    /// The separation is converted with the trace sample rate, not the frame
    /// rate, and is never less than one frame.
    pub fn min_distance(&self, sample_rate_hz: f64) -> usize {
        let distance = (self.min_separation_s * sample_rate_hz).floor();
        if distance.is_finite() && distance >= 1.0 {
            distance as usize
        } else {
            1
        }
    }

    /// Pick the onset from a flux curve with this configuration.
    pub fn pick(&self, curve: &SpectralFluxCurve, sample_rate_hz: f64) -> Option<f64> {
        pick_onset_with(&curve.values, &curve.frame_times, sample_rate_hz, self)
    }
}

impl Default for PeakPickConfig {
    fn default() -> Self {
        Self {
            height_ratio: 0.3,
            min_separation_s: 0.1,
        }
    }
}

/// Pick the onset time from a spectral flux curve.
///
/// Peaks must reach 30% of the curve maximum and be at least
/// `floor(0.1 * sample_rate_hz)` frames apart. Of the accepted peaks the
/// earliest one is the onset, whatever its height: the first spectral change
/// is taken as the arrival.
///
/// # Arguments
/// * `flux_values` - Novelty curve
/// * `frame_times` - Start time of each frame, in seconds
/// * `sample_rate_hz` - Sample rate of the trace the curve came from
///
/// # Returns
/// The onset time in seconds, or `None` when no peak qualifies
///
/// # Example
/// ```
/// use tremor::onset::pick_onset;
///
/// let flux = vec![0.0, 0.2, 0.0, 0.0, 1.0, 0.0, 0.0, 0.9, 0.0];
/// let times: Vec<f64> = (0..flux.len()).map(|i| i as f64 * 0.5).collect();
/// // 0.2 is below 30% of the maximum; 4 and 7 are both accepted
/// assert_eq!(pick_onset(&flux, &times, 20.0), Some(2.0));
/// ```
pub fn pick_onset(flux_values: &[f64], frame_times: &[f64], sample_rate_hz: f64) -> Option<f64> {
    pick_onset_with(
        flux_values,
        frame_times,
        sample_rate_hz,
        &PeakPickConfig::default(),
    )
}

/// Pick the onset time with an explicit peak picking configuration.
pub fn pick_onset_with(
    flux_values: &[f64],
    frame_times: &[f64],
    sample_rate_hz: f64,
    config: &PeakPickConfig,
) -> Option<f64> {
    onset_frame(flux_values, sample_rate_hz, config).and_then(|i| frame_times.get(i).copied())
}

/// Frame index of the onset: the earliest peak accepted under `config`.
pub fn onset_frame(
    flux_values: &[f64],
    sample_rate_hz: f64,
    config: &PeakPickConfig,
) -> Option<usize> {
    let max = flux_values.iter().copied().reduce(f64::max)?;
    let height = config.height_ratio * max;
    let distance = config.min_distance(sample_rate_hz);

    find_peaks(flux_values, height, distance).first().copied()
}

/// Find where the signal dies out after an onset.
///
/// Scans forward from `start_index` for the first frame whose flux drops
/// below `end_threshold` and returns its time.
///
/// # Arguments
/// * `flux_values` - Novelty curve
/// * `frame_times` - Start time of each frame, in seconds
/// * `start_index` - First frame to inspect, usually the onset frame
/// * `end_threshold` - Flux level treated as silence
///
/// # Returns
/// Time of the first quiet frame, or `None` if the curve never gets quiet
///
/// # Example
/// ```
/// use tremor::onset::{DEFAULT_END_THRESHOLD, signal_end};
///
/// let flux = vec![0.0, 3.0, 2.0, 1.0, 0.0];
/// let times = vec![0.0, 0.1, 0.2, 0.3, 0.4];
/// assert_eq!(signal_end(&flux, &times, 1, DEFAULT_END_THRESHOLD), Some(0.4));
/// assert_eq!(signal_end(&flux, &times, 1, 1.5), Some(0.3));
/// ```
pub fn signal_end(
    flux_values: &[f64],
    frame_times: &[f64],
    start_index: usize,
    end_threshold: f64,
) -> Option<f64> {
    flux_values
        .iter()
        .zip(frame_times)
        .skip(start_index)
        .find(|&(&v, _)| v < end_threshold)
        .map(|(_, &t)| t)
}
