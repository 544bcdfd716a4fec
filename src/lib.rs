//! Seismic onset detection with spectral flux novelty curves.
//!
//! Tremor finds where a seismic event starts within a recorded velocity
//! trace. Each trace is band-limited with a zero-phase Butterworth low-pass,
//! cut into frames whose magnitude spectra are compared frame to frame, and
//! the first strong peak of the resulting spectral flux curve is reported as
//! the onset, both relative to the recording and as an absolute timestamp.
//! Detections can be scored against labeled arrival times.
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use tremor::{Trace, evaluate, run};
//!
//! let start = NaiveDate::from_ymd_opt(1970, 1, 19)
//!     .unwrap()
//!     .and_hms_opt(0, 0, 0)
//!     .unwrap();
//!
//! // 10 s at 100 Hz with an impulse at 5 s
//! let times: Vec<f64> = (0..1000).map(|i| i as f64 / 100.0).collect();
//! let mut samples = vec![0.0; 1000];
//! samples[500] = 1.0;
//! let trace = Trace::new("evid00001", "evid00001.csv", times, samples, start)
//!     .with_ground_truth(5.0);
//!
//! let results = run(&[trace], "mars").unwrap();
//! let onset = results[0].predicted_onset_rel.unwrap();
//! assert!((4.9..=5.1).contains(&onset));
//!
//! let report = evaluate(&results).unwrap();
//! assert!(report.median_time_deviation <= 0.1);
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`trace`] | Trace records and landscape profiles |
//! | [`detector`] | Detection pipeline, configuration and result records |
//! | [`metrics`] | Median accuracy metrics against ground truth |
//! | [`onset`] | Spectral flux and onset peak picking |
//! | [`filters`] | Butterworth design and zero-phase SOS filtering |
//! | [`fft`] | Cached FFT plans and magnitude spectra |
//! | [`frame`] | Signal framing utilities |
//! | [`utils`] | Peak finding, Gaussian smoothing, medians |
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`. Batch detection only fails on an unknown
//! landscape; traces that cannot be processed are logged and skipped.
//!
//! # Logging
//!
//! Diagnostics go through the [`log`] facade. No logger is installed by the
//! library.
//!
//! # Safety
//!
//! This crate uses `#![forbid(unsafe_code)]`.
//!
//! # Feature Flags
//!
//! | Flag | Description |
//! |------|-------------|
//! | `parallel` | Process traces of a batch in parallel with rayon |

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod detector;
pub mod fft;
pub mod filters;
pub mod frame;
pub mod metrics;
pub mod onset;
pub mod trace;
pub mod utils;

pub use detector::{CatalogEntry, DetectionResult, Detector, DetectorConfig, run};
pub use metrics::{MetricsReport, compute_metrics, evaluate};
pub use trace::{Landscape, Trace};
