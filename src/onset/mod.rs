pub mod detect;
pub mod flux;

pub use detect::{
    DEFAULT_END_THRESHOLD, PeakPickConfig, onset_frame, pick_onset, pick_onset_with, signal_end,
};
pub use flux::{FLUX_SMOOTHING_SIGMA, SpectralFluxCurve, compute_flux};
