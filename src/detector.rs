//! Batch onset detection over seismic traces.
//!
//! Each trace is low-passed at its landscape's cutoff, turned into a spectral
//! flux curve and reduced to the first qualifying flux peak. Traces that
//! cannot be processed are logged and skipped; only configuration errors
//! abort a run.

use crate::filters::{self, DEFAULT_ORDER};
use crate::onset::{self, PeakPickConfig, SpectralFluxCurve};
use crate::trace::{Landscape, Trace};
use chrono::{NaiveDateTime, TimeDelta};
use log::{debug, info, warn};
use serde::{Serialize, Serializer};

/// `strftime` pattern of absolute timestamps in detection output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Format an absolute timestamp as `YYYY-MM-DDTHH:MM:SS.ffffff`.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use tremor::detector::format_timestamp;
///
/// let t = NaiveDate::from_ymd_opt(1970, 1, 19)
///     .unwrap()
///     .and_hms_micro_opt(20, 25, 0, 3_000)
///     .unwrap();
/// assert_eq!(format_timestamp(&t), "1970-01-19T20:25:00.003000");
/// ```
pub fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

fn serialize_timestamp<S: Serializer>(
    t: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match t {
        Some(t) => serializer.serialize_some(&format_timestamp(t)),
        None => serializer.serialize_none(),
    }
}

/// Absolute instant `offset_s` seconds after `start`, rounded to the nearest
/// microsecond with ties to even.
pub fn offset_instant(start: NaiveDateTime, offset_s: f64) -> crate::Result<NaiveDateTime> {
    let micros = (offset_s * 1e6).round_ties_even();
    let delta = if micros.is_finite() && micros.abs() < i64::MAX as f64 {
        Some(TimeDelta::microseconds(micros as i64))
    } else {
        None
    };
    delta
        .and_then(|d| start.checked_add_signed(d))
        .ok_or_else(|| crate::Error::InvalidParameter {
            name: "offset_s",
            value: offset_s.to_string(),
            reason: format!("cannot be added to {}", format_timestamp(&start)),
        })
}

/// Configuration for onset detection.
///
/// Defaults reproduce the fixed pipeline: 4th-order Butterworth, 0.2 s
/// frames every 0.05 s, smoothed flux, peaks at 30% of the maximum and
/// 0.1 s apart.
///
/// # Example
/// ```
/// use tremor::{DetectorConfig, Landscape};
///
/// let config = DetectorConfig::new(Landscape::Mars).with_smoothing(false);
/// assert_eq!(config.window_size(100.0), 20);
/// assert_eq!(config.hop_size(100.0), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// Landscape profile selecting the low-pass cutoff
    pub landscape: Landscape,
    /// Butterworth filter order
    pub filter_order: usize,
    /// Flux frame length in seconds
    pub window_seconds: f64,
    /// Flux frame advance in seconds
    pub hop_seconds: f64,
    /// Gaussian smoothing of the flux curve
    pub smooth: bool,
    /// Onset peak picking
    pub peaks: PeakPickConfig,
}

impl DetectorConfig {
    /// Create a configuration with defaults for the given landscape.
    pub fn new(landscape: Landscape) -> Self {
        Self {
            landscape,
            filter_order: DEFAULT_ORDER,
            window_seconds: 0.2,
            hop_seconds: 0.05,
            smooth: true,
            peaks: PeakPickConfig::default(),
        }
    }

    /// Set the Butterworth order.
    pub fn with_filter_order(mut self, filter_order: usize) -> Self {
        self.filter_order = filter_order;
        self
    }

    /// Set the flux frame length in seconds.
    pub fn with_window_seconds(mut self, window_seconds: f64) -> Self {
        self.window_seconds = window_seconds;
        self
    }

    /// Set the flux frame advance in seconds.
    pub fn with_hop_seconds(mut self, hop_seconds: f64) -> Self {
        self.hop_seconds = hop_seconds;
        self
    }

    /// Enable or disable smoothing of the flux curve.
    pub fn with_smoothing(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    /// Set the peak picking configuration.
    pub fn with_peaks(mut self, peaks: PeakPickConfig) -> Self {
        self.peaks = peaks;
        self
    }

    /// Flux frame length in samples, at least 1.
    pub fn window_size(&self, sample_rate_hz: f64) -> usize {
        seconds_to_samples(self.window_seconds, sample_rate_hz)
    }

    /// Flux frame advance in samples, at least 1.
    pub fn hop_size(&self, sample_rate_hz: f64) -> usize {
        seconds_to_samples(self.hop_seconds, sample_rate_hz)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new(Landscape::Lunar)
    }
}

fn seconds_to_samples(seconds: f64, sample_rate_hz: f64) -> usize {
    let n = (seconds * sample_rate_hz).floor();
    if n.is_finite() && n >= 1.0 {
        n as usize
    } else {
        1
    }
}

/// Intermediate products of the pipeline for one trace.
///
/// Useful for plotting: the filtered signal shares the trace's time axis and
/// the flux curve carries its own frame times.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub sample_rate_hz: f64,
    pub window_size: usize,
    pub hop_size: usize,
    /// Low-passed samples
    pub filtered: Vec<f64>,
    pub flux: SpectralFluxCurve,
    /// Frame index of the onset
    pub onset_frame: Option<usize>,
    /// Onset time in seconds relative to the first sample
    pub onset: Option<f64>,
}

impl Analysis {
    /// Time the flux curve falls quiet after the onset, if it does.
    pub fn signal_end(&self, end_threshold: f64) -> Option<f64> {
        let start = self.onset_frame?;
        onset::signal_end(
            &self.flux.values,
            &self.flux.frame_times,
            start,
            end_threshold,
        )
    }
}

/// Detection outcome for one trace.
///
/// Serializes with the column names of the detection result table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    #[serde(rename = "evid")]
    pub id: String,
    pub filename: String,
    #[serde(rename = "onset_time_ground_truth")]
    pub ground_truth_onset: Option<f64>,
    #[serde(rename = "audio_duration")]
    pub duration: f64,
    #[serde(rename = "detection_time_rel")]
    pub predicted_onset_rel: Option<f64>,
    #[serde(rename = "detection_time_abs", serialize_with = "serialize_timestamp")]
    pub predicted_onset_abs: Option<NaiveDateTime>,
}

impl DetectionResult {
    /// Absolute onset formatted as `YYYY-MM-DDTHH:MM:SS.ffffff`.
    pub fn predicted_onset_abs_string(&self) -> Option<String> {
        self.predicted_onset_abs.as_ref().map(format_timestamp)
    }

    /// Whether both a prediction and a ground truth are present.
    pub fn is_labeled_prediction(&self) -> bool {
        self.predicted_onset_rel.is_some() && self.ground_truth_onset.is_some()
    }

    /// Catalog view of this detection.
    pub fn catalog_entry(&self) -> CatalogEntry {
        CatalogEntry {
            filename: self.filename.clone(),
            time_abs: self.predicted_onset_abs,
            time_rel: self.predicted_onset_rel,
        }
    }
}

/// One row of the detection catalog: where in which file a signal starts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub filename: String,
    #[serde(
        rename = "time_abs(%Y-%m-%dT%H:%M:%S.%f)",
        serialize_with = "serialize_timestamp"
    )]
    pub time_abs: Option<NaiveDateTime>,
    #[serde(rename = "time_rel(sec)")]
    pub time_rel: Option<f64>,
}

/// Onset detector for a fixed configuration.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use tremor::{Detector, DetectorConfig, Landscape, Trace};
///
/// let start = NaiveDate::from_ymd_opt(2022, 1, 2)
///     .unwrap()
///     .and_hms_opt(0, 0, 0)
///     .unwrap();
/// let times: Vec<f64> = (0..1000).map(|i| i as f64 / 100.0).collect();
/// let mut samples = vec![0.0; 1000];
/// samples[500] = 1.0;
/// let trace = Trace::new("ev1", "ev1.csv", times, samples, start);
///
/// let detector = Detector::new(DetectorConfig::new(Landscape::Mars));
/// let results = detector.run(&[trace]);
/// assert_eq!(results.len(), 1);
/// assert!(results[0].predicted_onset_rel.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    /// Create a detector.
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// The detector's configuration.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run the pipeline on one trace and keep every intermediate product.
    ///
    /// # Errors
    /// Any per-trace failure: [`crate::Error::LengthMismatch`],
    /// [`crate::Error::InsufficientData`], [`crate::Error::InvalidCutoff`],
    /// [`crate::Error::SignalTooShort`], or a flux parameter error.
    pub fn analyze(&self, trace: &Trace) -> crate::Result<Analysis> {
        trace.validate()?;
        let sample_rate_hz =
            trace
                .sample_rate_hz()
                .ok_or_else(|| crate::Error::InsufficientData {
                    id: trace.id.clone(),
                    len: trace.len(),
                })?;

        let cutoff_hz = self.config.landscape.cutoff_hz();
        let filtered = filters::lowpass_filter(
            &trace.samples,
            cutoff_hz,
            sample_rate_hz,
            self.config.filter_order,
        )?;

        let window_size = self.config.window_size(sample_rate_hz);
        let hop_size = self.config.hop_size(sample_rate_hz);
        let flux = onset::compute_flux(
            &filtered,
            sample_rate_hz,
            window_size,
            hop_size,
            self.config.smooth,
        )?;
        debug!(
            "trace {}: fs={sample_rate_hz} Hz, cutoff={cutoff_hz} Hz, window={window_size}, hop={hop_size}, frames={}",
            trace.id,
            flux.len()
        );

        let onset_frame = onset::onset_frame(&flux.values, sample_rate_hz, &self.config.peaks);
        let onset = onset_frame.and_then(|i| flux.frame_times.get(i).copied());

        Ok(Analysis {
            sample_rate_hz,
            window_size,
            hop_size,
            filtered,
            flux,
            onset_frame,
            onset,
        })
    }

    /// Detect the onset of one trace.
    pub fn detect(&self, trace: &Trace) -> crate::Result<DetectionResult> {
        let analysis = self.analyze(trace)?;
        let predicted_onset_abs = analysis
            .onset
            .map(|onset| offset_instant(trace.start_instant, onset))
            .transpose()?;

        match analysis.onset {
            Some(onset) => info!(
                "Signal detected starting at {onset} seconds for event {}.",
                trace.id
            ),
            None => info!("No significant onset detected for event {}.", trace.id),
        }

        Ok(DetectionResult {
            id: trace.id.clone(),
            filename: trace.filename.clone(),
            ground_truth_onset: trace.ground_truth_onset,
            duration: trace.duration(),
            predicted_onset_rel: analysis.onset,
            predicted_onset_abs,
        })
    }

    /// Detect onsets for every trace, in input order.
    ///
    /// Traces that fail are logged and left out of the output, so the result
    /// can be shorter than the input.
    pub fn run(&self, traces: &[Trace]) -> Vec<DetectionResult> {
        let detect_one = |trace: &Trace| match self.detect(trace) {
            Ok(result) => Some(result),
            Err(err) => {
                warn!("Skipping trace {}: {err}", trace.id);
                None
            }
        };

        let outcomes: Vec<Option<DetectionResult>> = {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                traces.par_iter().map(detect_one).collect()
            }
            #[cfg(not(feature = "parallel"))]
            {
                traces.iter().map(detect_one).collect()
            }
        };

        let results: Vec<DetectionResult> = outcomes.into_iter().flatten().collect();
        info!(
            "Processed {} of {} traces ({} landscape)",
            results.len(),
            traces.len(),
            self.config.landscape
        );
        results
    }
}

/// Detect onsets for a batch of traces under a landscape tag.
///
/// The tag is resolved before any trace is touched.
///
/// # Errors
/// [`crate::Error::UnknownLandscape`] if the tag is not `lunar` or `mars`.
///
/// # Example
/// ```
/// let err = tremor::run(&[], "venus").unwrap_err();
/// assert!(matches!(err, tremor::Error::UnknownLandscape(_)));
/// ```
pub fn run(traces: &[Trace], landscape: &str) -> crate::Result<Vec<DetectionResult>> {
    let landscape: Landscape = landscape.parse()?;
    Ok(Detector::new(DetectorConfig::new(landscape)).run(traces))
}
