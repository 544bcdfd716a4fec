//! Seismic trace records and landscape profiles.

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

/// Planetary body a recording comes from; selects the low-pass cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landscape {
    Lunar,
    Mars,
}

impl Landscape {
    /// All known landscapes.
    pub const ALL: [Landscape; 2] = [Landscape::Lunar, Landscape::Mars];

    /// Low-pass cutoff frequency in Hz for this body's noise profile.
    pub fn cutoff_hz(self) -> f64 {
        match self {
            Landscape::Lunar => 1.0,
            Landscape::Mars => 2.19,
        }
    }

    /// Lowercase tag used on the command line and in catalogs.
    pub fn as_str(self) -> &'static str {
        match self {
            Landscape::Lunar => "lunar",
            Landscape::Mars => "mars",
        }
    }
}

impl fmt::Display for Landscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Landscape {
    type Err = crate::Error;

    /// Parse a landscape tag. Only the exact lowercase tags are accepted.
    ///
    /// # Example
    /// ```
    /// use tremor::Landscape;
    ///
    /// assert_eq!("mars".parse::<Landscape>().unwrap(), Landscape::Mars);
    /// assert!("Mars".parse::<Landscape>().is_err());
    /// assert!("venus".parse::<Landscape>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Landscape::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| crate::Error::UnknownLandscape(s.to_string()))
    }
}

/// One seismic recording.
///
/// `times` are seconds relative to `start_instant` and must be index-aligned
/// with `samples` (velocity, m/s).
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Event identifier
    pub id: String,
    /// Source the trace was read from
    pub filename: String,
    pub times: Vec<f64>,
    pub samples: Vec<f64>,
    /// Absolute time of `times[0]`
    pub start_instant: NaiveDateTime,
    /// Labeled arrival time, in seconds relative to `start_instant`
    pub ground_truth_onset: Option<f64>,
}

impl Trace {
    /// Build an unlabeled trace.
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        times: Vec<f64>,
        samples: Vec<f64>,
        start_instant: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            times,
            samples,
            start_instant,
            ground_truth_onset: None,
        }
    }

    /// Attach a ground-truth onset.
    pub fn with_ground_truth(mut self, onset: f64) -> Self {
        self.ground_truth_onset = Some(onset);
        self
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the trace carries no samples or no time stamps.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() || self.times.is_empty()
    }

    /// Recording length in seconds, `times[last] - times[0]`.
    pub fn duration(&self) -> f64 {
        match (self.times.first(), self.times.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Sample rate estimated from the first two time stamps, assuming
    /// uniform sampling. `None` with fewer than two time stamps.
    pub fn sample_rate_hz(&self) -> Option<f64> {
        match self.times.as_slice() {
            [t0, t1, ..] => Some(1.0 / (t1 - t0)),
            _ => None,
        }
    }

    /// Check that the trace can go through the detection pipeline.
    ///
    /// # Errors
    /// * [`crate::Error::LengthMismatch`] if `times` and `samples` differ in length
    /// * [`crate::Error::InsufficientData`] if there are fewer than two samples
    pub fn validate(&self) -> crate::Result<()> {
        if self.times.len() != self.samples.len() {
            return Err(crate::Error::LengthMismatch {
                id: self.id.clone(),
                times: self.times.len(),
                samples: self.samples.len(),
            });
        }
        if self.samples.len() < 2 {
            return Err(crate::Error::InsufficientData {
                id: self.id.clone(),
                len: self.samples.len(),
            });
        }
        Ok(())
    }
}
