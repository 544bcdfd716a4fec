//! Low-pass filtering of seismic traces.
//!
//! Filters are designed as digital Butterworth low-pass cascades of
//! second-order sections (SOS) and applied forward and backward so the
//! group delay cancels and features stay where they were recorded.

use num_complex::Complex64;
use std::f64::consts::PI;

/// Default Butterworth order used by the onset pipeline.
pub const DEFAULT_ORDER: usize = 4;

/// One second-order section: `[b0, b1, b2, a0, a1, a2]`.
pub type Sos = [f64; 6];

/// Design a digital Butterworth low-pass filter as second-order sections.
///
/// `wn` is the cutoff normalized to the Nyquist frequency and must lie in
/// the open interval (0, 1). The analog prototype is mapped with the
/// bilinear transform after pre-warping the cutoff. Every section is scaled
/// to unity gain at DC, so the cascade passes constants unchanged.
///
/// # Arguments
/// * `order` - Filter order (number of poles)
/// * `wn` - Normalized cutoff frequency
///
/// # Returns
/// `ceil(order / 2)` sections
///
/// # Example
/// ```
/// use tremor::filters::butter_lowpass_sos;
///
/// let sos = butter_lowpass_sos(4, 0.02).unwrap();
/// assert_eq!(sos.len(), 2);
/// ```
pub fn butter_lowpass_sos(order: usize, wn: f64) -> crate::Result<Vec<Sos>> {
    if order == 0 {
        return Err(crate::Error::InvalidSize {
            name: "order",
            value: 0,
            reason: "must be > 0",
        });
    }
    if !(wn > 0.0 && wn < 1.0) {
        return Err(crate::Error::InvalidParameter {
            name: "wn",
            value: wn.to_string(),
            reason: "must lie in (0, 1)".to_string(),
        });
    }

    // Pre-warped analog cutoff for a bilinear transform with fs = 2.
    let warped = 4.0 * (PI * wn / 2.0).tan();
    let bilinear = |p: Complex64| (4.0 + p) / (4.0 - p);

    let mut sos = Vec::with_capacity(order.div_ceil(2));
    for k in 0..order / 2 {
        let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
        let z = bilinear(Complex64::from_polar(warped, theta));
        let a1 = -2.0 * z.re;
        let a2 = z.norm_sqr();
        let gain = (1.0 + a1 + a2) / 4.0;
        sos.push([gain, 2.0 * gain, gain, 1.0, a1, a2]);
    }
    if order % 2 == 1 {
        let z = bilinear(Complex64::new(-warped, 0.0)).re;
        let gain = (1.0 - z) / 2.0;
        sos.push([gain, gain, 0.0, 1.0, -z, 0.0]);
    }

    Ok(sos)
}

/// Apply SOS filter (forward only, zero initial state).
pub fn sosfilt(sos: &[Sos], x: &[f64]) -> Vec<f64> {
    let zi = vec![[0.0; 2]; sos.len()];
    sosfilt_with_state(sos, x, &zi)
}

/// Steady-state section states for a unit step input.
///
/// Scale by the first input sample to start a filter as if the signal had
/// been constant forever before it, which avoids a start-up transient.
pub fn sosfilt_zi(sos: &[Sos]) -> Vec<[f64; 2]> {
    let mut scale = 1.0;
    sos.iter()
        .map(|section| {
            let [b0, b1, b2, a1, a2] = normalized(section);
            let dc_gain = (b0 + b1 + b2) / (1.0 + a1 + a2);
            let z2 = b2 - a2 * dc_gain;
            let z1 = b1 - a1 * dc_gain + z2;
            let state = [z1 * scale, z2 * scale];
            scale *= dc_gain;
            state
        })
        .collect()
}

/// Apply SOS filter forward from the given per-section state.
pub fn sosfilt_with_state(sos: &[Sos], x: &[f64], zi: &[[f64; 2]]) -> Vec<f64> {
    let mut y = x.to_vec();
    for (section, state) in sos.iter().zip(zi) {
        apply_sos_section(&mut y, section, *state);
    }
    y
}

/// Number of samples each edge is extended by before forward-backward
/// filtering with a filter of the given order.
pub fn edge_padding(order: usize) -> usize {
    3 * (order + 1)
}

/// Apply SOS filter forward and backward (zero-phase filtering).
///
/// The signal is extended at both ends by odd reflection and each pass
/// starts from the steady state matching its first sample. Signals that
/// are not longer than the padding are rejected.
///
/// # Errors
/// [`crate::Error::SignalTooShort`] when `x.len() <= edge_padding(order)`.
pub fn sosfiltfilt(sos: &[Sos], x: &[f64]) -> crate::Result<Vec<f64>> {
    let pad = edge_padding(sos_order(sos));
    let n = x.len();
    if n <= pad {
        return Err(crate::Error::SignalTooShort { len: n, min: pad });
    }

    let first = x[0];
    let last = x[n - 1];
    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - x[i]));
    extended.extend_from_slice(x);
    extended.extend((1..=pad).map(|i| 2.0 * last - x[n - 1 - i]));

    let zi = sosfilt_zi(sos);
    let scaled = |start: f64| -> Vec<[f64; 2]> {
        zi.iter().map(|z| [z[0] * start, z[1] * start]).collect()
    };

    // Forward pass
    let forward = sosfilt_with_state(sos, &extended, &scaled(extended[0]));

    // Backward pass over the reversed output
    let reversed: Vec<f64> = forward.into_iter().rev().collect();
    let backward = sosfilt_with_state(sos, &reversed, &scaled(reversed[0]));

    Ok(backward.into_iter().rev().skip(pad).take(n).collect())
}

/// Zero-phase Butterworth low-pass filter of a sampled trace.
///
/// The cutoff is normalized to Nyquist (`cutoff_hz / (0.5 * sample_rate_hz)`)
/// and clamped to at most 1.0.
///
/// # Arguments
/// * `samples` - Input signal
/// * `cutoff_hz` - Cutoff frequency in Hz
/// * `sample_rate_hz` - Sample rate in Hz
/// * `order` - Butterworth order
///
/// # Errors
/// * [`crate::Error::InvalidCutoff`] if the normalized cutoff is not in (0, 1),
///   which covers non-positive cutoffs, degenerate sample rates and cutoffs at
///   or above Nyquist
/// * [`crate::Error::SignalTooShort`] if the signal cannot be edge-padded
///
/// # Example
/// ```
/// use tremor::filters::lowpass_filter;
///
/// let y: Vec<f64> = (0..200).map(|i| (i as f64 * 0.05).sin()).collect();
/// let filtered = lowpass_filter(&y, 1.0, 100.0, 4).unwrap();
/// assert_eq!(filtered.len(), y.len());
///
/// assert!(lowpass_filter(&y, 0.0, 100.0, 4).is_err());
/// ```
pub fn lowpass_filter(
    samples: &[f64],
    cutoff_hz: f64,
    sample_rate_hz: f64,
    order: usize,
) -> crate::Result<Vec<f64>> {
    if samples.is_empty() {
        return Err(crate::Error::EmptySignal);
    }

    let nyquist = 0.5 * sample_rate_hz;
    let wn = (cutoff_hz / nyquist).min(1.0);
    if !(wn > 0.0 && wn < 1.0) {
        return Err(crate::Error::InvalidCutoff {
            cutoff_hz,
            sample_rate_hz,
        });
    }

    let sos = butter_lowpass_sos(order, wn)?;
    sosfiltfilt(&sos, samples)
}

fn normalized(section: &Sos) -> [f64; 5] {
    let a0 = section[3];
    [
        section[0] / a0,
        section[1] / a0,
        section[2] / a0,
        section[4] / a0,
        section[5] / a0,
    ]
}

/// Effective order of a cascade; first-order sections count once.
fn sos_order(sos: &[Sos]) -> usize {
    sos.iter()
        .map(|s| if s[2] == 0.0 && s[5] == 0.0 { 1 } else { 2 })
        .sum()
}

/// Apply a single SOS section in place (transposed direct form II).
fn apply_sos_section(y: &mut [f64], section: &Sos, state: [f64; 2]) {
    let [b0, b1, b2, a1, a2] = normalized(section);
    let [mut z1, mut z2] = state;

    for v in y.iter_mut() {
        let xi = *v;
        let out = b0 * xi + z1;
        z1 = b1 * xi - a1 * out + z2;
        z2 = b2 * xi - a2 * out;
        *v = out;
    }
}
