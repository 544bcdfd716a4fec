//! Accuracy metrics of predicted onsets against labeled ground truth.

use crate::detector::DetectionResult;
use crate::utils::median;
use log::info;
use serde::Serialize;

/// Median accuracy figures over a set of detections.
///
/// "Send" percentages measure how much of a trace lies after its onset:
/// `100 - onset / duration * 100`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsReport {
    pub median_send_signal_percentage_predicted: f64,
    pub median_send_signal_percentage_truth: f64,
    /// `median_send_signal_percentage_truth - median_send_signal_percentage_predicted`
    pub median_percentage_difference: f64,
    /// Median of `|truth - predicted|`, in seconds
    pub median_time_deviation: f64,
    /// Share of the trace, in percent, cut away before the predicted onset
    pub median_signal_reduction: f64,
}

/// Compute accuracy metrics over detection results.
///
/// Every row must carry a prediction, a ground truth and a positive duration.
///
/// # Errors
/// * [`crate::Error::EmptyResults`] if `results` is empty
/// * [`crate::Error::MissingField`] for the first row lacking an onset
/// * [`crate::Error::InvalidParameter`] for a non-positive or non-finite duration
///
/// # Example
/// ```
/// use tremor::{DetectionResult, compute_metrics};
///
/// let row = |id: &str, duration, truth, predicted| DetectionResult {
///     id: id.into(),
///     filename: format!("{id}.csv"),
///     ground_truth_onset: Some(truth),
///     duration,
///     predicted_onset_rel: Some(predicted),
///     predicted_onset_abs: None,
/// };
/// let report = compute_metrics(&[row("a", 10.0, 5.0, 4.5), row("b", 20.0, 10.0, 11.0)]).unwrap();
/// assert_eq!(report.median_time_deviation, 0.75);
/// assert_eq!(report.median_signal_reduction, 50.0);
/// ```
pub fn compute_metrics(results: &[DetectionResult]) -> crate::Result<MetricsReport> {
    if results.is_empty() {
        return Err(crate::Error::EmptyResults);
    }

    let n = results.len();
    let mut send_predicted = Vec::with_capacity(n);
    let mut send_truth = Vec::with_capacity(n);
    let mut deviations = Vec::with_capacity(n);

    for result in results {
        let truth = result
            .ground_truth_onset
            .ok_or_else(|| missing(result, "ground_truth_onset"))?;
        let predicted = result
            .predicted_onset_rel
            .ok_or_else(|| missing(result, "predicted_onset_rel"))?;
        if !(result.duration > 0.0 && result.duration.is_finite()) {
            return Err(crate::Error::InvalidParameter {
                name: "duration",
                value: result.duration.to_string(),
                reason: format!("must be positive and finite (result `{}`)", result.id),
            });
        }

        send_predicted.push(send_percentage(predicted, result.duration));
        send_truth.push(send_percentage(truth, result.duration));
        deviations.push((truth - predicted).abs());
    }

    let median_predicted = median(&send_predicted).ok_or(crate::Error::EmptyResults)?;
    let median_truth = median(&send_truth).ok_or(crate::Error::EmptyResults)?;
    let median_deviation = median(&deviations).ok_or(crate::Error::EmptyResults)?;

    Ok(MetricsReport {
        median_send_signal_percentage_predicted: median_predicted,
        median_send_signal_percentage_truth: median_truth,
        median_percentage_difference: median_truth - median_predicted,
        median_time_deviation: median_deviation,
        median_signal_reduction: 100.0 - median_predicted,
    })
}

/// Compute metrics over the labeled predictions in `results` and log them.
///
/// Rows without a prediction or without a ground truth are left out, so a
/// batch with some undetected or unlabeled traces can still be scored.
///
/// # Errors
/// As [`compute_metrics`]; [`crate::Error::EmptyResults`] when no row is
/// usable.
pub fn evaluate(results: &[DetectionResult]) -> crate::Result<MetricsReport> {
    let usable: Vec<DetectionResult> = results
        .iter()
        .filter(|r| r.is_labeled_prediction())
        .cloned()
        .collect();
    let dropped = results.len() - usable.len();
    if dropped > 0 {
        info!("Leaving {dropped} results without prediction or ground truth out of the metrics");
    }

    let report = compute_metrics(&usable)?;
    info!(
        "Median Send Signal Percentage (Predicted): {:.2}%",
        report.median_send_signal_percentage_predicted
    );
    info!(
        "Median Send Signal Percentage (Truth): {:.2}%",
        report.median_send_signal_percentage_truth
    );
    info!(
        "Median Percentage Difference: {:.2}%",
        report.median_percentage_difference
    );
    info!(
        "Median Time Deviation: {:.2} seconds",
        report.median_time_deviation
    );
    info!(
        "Median Signal Reduction: {:.2}%",
        report.median_signal_reduction
    );
    Ok(report)
}

fn send_percentage(onset: f64, duration: f64) -> f64 {
    100.0 - onset / duration * 100.0
}

fn missing(result: &DetectionResult, field: &'static str) -> crate::Error {
    crate::Error::MissingField {
        id: result.id.clone(),
        field,
    }
}
