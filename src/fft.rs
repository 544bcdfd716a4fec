use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward FFT plan for one frame length.
///
/// Building the plan is the expensive part; reuse it for every frame of the
/// same length.
///
/// # Example
/// ```
/// use tremor::fft::FftPlan;
///
/// let plan = FftPlan::new(8);
/// let mag = plan.magnitude(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
/// assert_eq!(mag.len(), 8);
/// assert!(mag.iter().all(|&m| (m - 1.0).abs() < 1e-12));
/// ```
pub struct FftPlan {
    forward: Arc<dyn Fft<f64>>,
    len: usize,
}

impl FftPlan {
    /// Create a forward plan for frames of `len` samples.
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        Self { forward, len }
    }

    /// Frame length this plan was built for.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the plan is for zero-length frames.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Perform forward FFT in-place (unnormalized).
    pub fn forward(&self, buffer: &mut [Complex64]) {
        self.forward.process(buffer);
    }

    /// Magnitude of every bin of the full complex spectrum of a real frame.
    ///
    /// All `len` bins are returned, not just the non-redundant half, and no
    /// window function is applied. A frame shorter than the plan is
    /// zero-extended; a longer one is cut to the plan length.
    pub fn magnitude(&self, frame: &[f64]) -> Vec<f64> {
        let mut buffer = vec![Complex64::new(0.0, 0.0); self.len];
        for (slot, &sample) in buffer.iter_mut().zip(frame) {
            slot.re = sample;
        }
        self.forward(&mut buffer);
        buffer.iter().map(|c| c.norm()).collect()
    }
}

#[cfg(feature = "parallel")]
const _: () = {
    fn _assert_send_sync<T: Send + Sync>() {}
    fn _check() {
        _assert_send_sync::<FftPlan>();
    }
};

/// Magnitude spectrum of a real frame with a one-off plan.
pub fn magnitude_spectrum(frame: &[f64]) -> Vec<f64> {
    if frame.is_empty() {
        return Vec::new();
    }
    FftPlan::new(frame.len()).magnitude(frame)
}
