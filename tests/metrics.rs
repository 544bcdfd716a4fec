use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use tremor::{DetectionResult, Error, Trace, compute_metrics, evaluate, run};

fn row(id: &str, duration: f64, truth: f64, predicted: f64) -> DetectionResult {
    DetectionResult {
        id: id.to_string(),
        filename: format!("{id}.csv"),
        ground_truth_onset: Some(truth),
        duration,
        predicted_onset_rel: Some(predicted),
        predicted_onset_abs: None,
    }
}

#[test]
fn even_count_medians_average_middle_values() {
    let results = [
        row("a", 10.0, 5.0, 4.5),
        row("b", 20.0, 10.0, 11.0),
    ];
    let report = compute_metrics(&results).unwrap();
    assert_abs_diff_eq!(report.median_time_deviation, 0.75, epsilon = 1e-12);
    assert_abs_diff_eq!(report.median_send_signal_percentage_predicted, 50.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.median_send_signal_percentage_truth, 50.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.median_percentage_difference, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.median_signal_reduction, 50.0, epsilon = 1e-12);
}

#[test]
fn reduction_complements_predicted_send() {
    let results = [
        row("a", 10.0, 1.0, 2.0),
        row("b", 10.0, 1.0, 3.0),
        row("c", 10.0, 1.0, 7.0),
    ];
    let report = compute_metrics(&results).unwrap();
    assert_abs_diff_eq!(report.median_send_signal_percentage_predicted, 70.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.median_signal_reduction, 30.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.median_percentage_difference, 20.0, epsilon = 1e-12);
    assert_abs_diff_eq!(report.median_time_deviation, 2.0, epsilon = 1e-12);
}

#[test]
fn metrics_require_complete_rows() {
    let mut missing = row("m", 10.0, 1.0, 2.0);
    missing.predicted_onset_rel = None;
    assert!(matches!(
        compute_metrics(&[row("a", 10.0, 1.0, 2.0), missing.clone()]),
        Err(Error::MissingField { .. })
    ));
    assert!(matches!(compute_metrics(&[]), Err(Error::EmptyResults)));

    let report = evaluate(&[row("a", 10.0, 1.0, 2.0), missing]).unwrap();
    assert_abs_diff_eq!(report.median_time_deviation, 1.0, epsilon = 1e-12);
}

#[test]
fn detections_feed_metrics() {
    let start = NaiveDate::from_ymd_opt(2022, 3, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap();
    let traces: Vec<Trace> = [300usize, 500, 700]
        .iter()
        .map(|&at| {
            let times: Vec<f64> = (0..1000).map(|i| i as f64 / 100.0).collect();
            let mut samples = vec![0.0; 1000];
            samples[at] = 1.0;
            Trace::new(format!("ev{at}"), format!("ev{at}.csv"), times, samples, start)
                .with_ground_truth(at as f64 / 100.0)
        })
        .collect();

    let results = run(&traces, "mars").unwrap();
    let report = evaluate(&results).unwrap();
    assert_abs_diff_eq!(report.median_time_deviation, 0.05, epsilon = 1e-9);
    assert!(report.median_percentage_difference.abs() < 1.0);
}
