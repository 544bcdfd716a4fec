use approx::assert_abs_diff_eq;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tremor::detector::format_timestamp;
use tremor::{Detector, DetectorConfig, Error, Landscape, Trace, run};

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1970, 1, 19)
        .and_then(|d| d.and_hms_micro_opt(20, 25, 0, 0))
        .unwrap()
}

fn impulse_trace(id: &str, n: usize, sample_rate_hz: f64, impulses: &[(usize, f64)]) -> Trace {
    let times: Vec<f64> = (0..n).map(|i| i as f64 / sample_rate_hz).collect();
    let mut samples = vec![0.0; n];
    for &(at, amp) in impulses {
        samples[at] = amp;
    }
    Trace::new(id, format!("{id}.csv"), times, samples, start())
}

#[test]
fn lunar_impulse_onset_on_leading_edge() {
    let trace = impulse_trace("lunar", 1000, 100.0, &[(500, 1.0)]);
    let results = run(&[trace], "lunar").unwrap();
    assert_eq!(results.len(), 1);
    let onset = results[0].predicted_onset_rel.unwrap();
    // frame 93 of a 5-sample hop at 100 Hz
    assert_abs_diff_eq!(onset, 93.0 * 5.0 / 100.0, epsilon = 1e-9);
}

#[test]
fn mars_impulse_onset_near_five_seconds() {
    let trace = impulse_trace("mars", 1000, 100.0, &[(500, 1.0)]).with_ground_truth(5.0);
    let results = run(&[trace], "mars").unwrap();
    let result = &results[0];

    let onset = result.predicted_onset_rel.unwrap();
    assert!((4.9..=5.1).contains(&onset), "onset {onset}");
    assert_abs_diff_eq!(onset, 5.05, epsilon = 1e-9);

    let expected_abs = start() + TimeDelta::milliseconds(5050);
    assert_eq!(result.predicted_onset_abs, Some(expected_abs));
    assert_eq!(
        result.predicted_onset_abs_string().as_deref(),
        Some("1970-01-19T20:25:05.050000")
    );
    assert_eq!(result.ground_truth_onset, Some(5.0));
    assert_abs_diff_eq!(result.duration, 9.99, epsilon = 1e-9);
    assert_eq!(result.filename, "mars.csv");
}

#[test]
fn earliest_peak_wins_over_later_equal_peak() {
    let trace = impulse_trace("two", 1000, 100.0, &[(300, 1.0), (700, 1.0)]);
    let results = run(&[trace], "mars").unwrap();
    assert_abs_diff_eq!(results[0].predicted_onset_rel.unwrap(), 3.05, epsilon = 1e-9);
}

#[test]
fn weak_first_event_below_height_is_ignored() {
    // Flux scales with amplitude squared: 0.25 of the maximum is below 0.3
    let trace = impulse_trace("weak", 1000, 100.0, &[(300, 0.5), (700, 1.0)]);
    let results = run(&[trace], "mars").unwrap();
    assert_abs_diff_eq!(results[0].predicted_onset_rel.unwrap(), 7.05, epsilon = 1e-9);
}

#[test]
fn silent_trace_has_no_onset() {
    let trace = impulse_trace("quiet", 1000, 100.0, &[]);
    let results = run(&[trace], "lunar").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].predicted_onset_rel, None);
    assert_eq!(results[0].predicted_onset_abs, None);
}

#[test]
fn unknown_landscape_fails_before_processing() {
    let trace = impulse_trace("ev", 1000, 100.0, &[(500, 1.0)]);
    match run(&[trace], "venus") {
        Err(Error::UnknownLandscape(tag)) => assert_eq!(tag, "venus"),
        other => panic!("expected UnknownLandscape, got {other:?}"),
    }
}

#[test]
fn unprocessable_traces_are_skipped_in_order() {
    let single = Trace::new("single", "single.csv", vec![0.0], vec![1.0], start());
    let empty = Trace::new("empty", "empty.csv", vec![], vec![], start());
    let ragged = Trace::new("ragged", "ragged.csv", vec![0.0, 0.01, 0.02], vec![0.0; 2], start());
    let short = impulse_trace("short", 15, 100.0, &[(7, 1.0)]);
    // 4 Hz sampling puts the mars cutoff above Nyquist
    let coarse = impulse_trace("coarse", 200, 4.0, &[(100, 1.0)]);

    let traces = vec![
        impulse_trace("a", 1000, 100.0, &[(300, 1.0)]),
        single,
        empty,
        impulse_trace("b", 1000, 100.0, &[(500, 1.0)]),
        ragged,
        short,
        coarse,
        impulse_trace("c", 1000, 100.0, &[(700, 1.0)]),
    ];
    let results = run(&traces, "mars").unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert_abs_diff_eq!(results[0].predicted_onset_rel.unwrap(), 3.05, epsilon = 1e-9);
    assert_abs_diff_eq!(results[1].predicted_onset_rel.unwrap(), 5.05, epsilon = 1e-9);
}

#[test]
fn trace_shorter_than_a_window_emits_row_without_onset() {
    let trace = impulse_trace("tiny", 16, 100.0, &[(8, 1.0)]);
    let results = run(&[trace], "mars").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].predicted_onset_rel, None);
}

#[test]
fn per_trace_errors_surface_from_detect() {
    let detector = Detector::new(DetectorConfig::new(Landscape::Lunar));
    let single = Trace::new("single", "single.csv", vec![0.0], vec![1.0], start());
    assert!(matches!(
        detector.detect(&single),
        Err(Error::InsufficientData { len: 1, .. })
    ));
    let short = impulse_trace("short", 15, 100.0, &[(7, 1.0)]);
    assert!(matches!(
        detector.detect(&short),
        Err(Error::SignalTooShort { len: 15, min: 15 })
    ));
    let coarse = impulse_trace("coarse", 200, 2.0, &[(100, 1.0)]);
    assert!(matches!(
        detector.detect(&coarse),
        Err(Error::InvalidCutoff { .. })
    ));
}

#[test]
fn detection_is_idempotent() {
    let traces = vec![
        impulse_trace("a", 1000, 100.0, &[(300, 1.0)]),
        impulse_trace("b", 1000, 100.0, &[(500, 1.0)]),
    ];
    let first = run(&traces, "lunar").unwrap();
    let second = run(&traces, "lunar").unwrap();
    assert_eq!(first, second);
}

#[test]
fn analysis_exposes_intermediate_curves() {
    let trace = impulse_trace("ev", 1000, 100.0, &[(500, 1.0)]);
    let detector = Detector::new(DetectorConfig::new(Landscape::Mars));
    let analysis = detector.analyze(&trace).unwrap();
    assert_eq!(analysis.sample_rate_hz, 100.0);
    assert_eq!(analysis.window_size, 20);
    assert_eq!(analysis.hop_size, 5);
    assert_eq!(analysis.filtered.len(), 1000);
    assert_eq!(analysis.flux.len(), 196);
    assert_eq!(analysis.onset_frame, Some(101));
    assert_eq!(analysis.onset, Some(analysis.flux.frame_times[101]));

    let detected = detector.detect(&trace).unwrap();
    assert_eq!(detected.predicted_onset_rel, analysis.onset);
}

#[test]
fn unsmoothed_config_changes_curve_not_length() {
    let trace = impulse_trace("ev", 1000, 100.0, &[(500, 1.0)]);
    let smooth = Detector::new(DetectorConfig::new(Landscape::Mars))
        .analyze(&trace)
        .unwrap();
    let raw = Detector::new(DetectorConfig::new(Landscape::Mars).with_smoothing(false))
        .analyze(&trace)
        .unwrap();
    assert_eq!(raw.flux.len(), smooth.flux.len());
    assert_ne!(raw.flux.values, smooth.flux.values);
}

#[test]
fn results_serialize_with_column_names() {
    let trace = impulse_trace("evid00042", 1000, 100.0, &[(500, 1.0)]).with_ground_truth(5.0);
    let results = run(&[trace], "mars").unwrap();

    let json = serde_json::to_value(&results[0]).unwrap();
    assert_eq!(json["evid"], "evid00042");
    assert_eq!(json["filename"], "evid00042.csv");
    assert_eq!(json["onset_time_ground_truth"], 5.0);
    assert_eq!(json["detection_time_abs"], "1970-01-19T20:25:05.050000");
    assert!(json["detection_time_rel"].is_f64());
    assert!(json["audio_duration"].is_f64());

    let entry = serde_json::to_value(results[0].catalog_entry()).unwrap();
    assert_eq!(
        entry["time_abs(%Y-%m-%dT%H:%M:%S.%f)"],
        "1970-01-19T20:25:05.050000"
    );
    assert_eq!(entry["time_rel(sec)"], json["detection_time_rel"]);
}

#[test]
fn missing_onset_serializes_as_null() {
    let trace = impulse_trace("quiet", 1000, 100.0, &[]);
    let results = run(&[trace], "mars").unwrap();
    let json = serde_json::to_value(&results[0]).unwrap();
    assert!(json["detection_time_rel"].is_null());
    assert!(json["detection_time_abs"].is_null());
    assert!(json["onset_time_ground_truth"].is_null());
}

#[test]
fn timestamp_format_keeps_microseconds() {
    let t = start() + TimeDelta::microseconds(1);
    assert_eq!(format_timestamp(&t), "1970-01-19T20:25:00.000001");
}
