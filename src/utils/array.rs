use std::cmp::Ordering;

/// Find local maxima in a signal.
///
/// A sample is a peak when it is strictly greater than its left neighbour
/// and the run of equal values starting at it is followed by a strictly
/// smaller value. A flat run (plateau) reports its middle index, rounded
/// down. The first and last samples are never peaks.
///
/// # Example
/// ```
/// use tremor::utils::localmax;
///
/// let x = vec![0.0, 1.0, 0.0, 2.0, 2.0, 2.0, 2.0, 0.0, 3.0];
/// assert_eq!(localmax(&x), vec![1, 4]);
/// ```
pub fn localmax(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }

    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Pick peaks at or above `height` that are at least `distance` samples apart.
///
/// Candidates come from [`localmax`]. Distance suppression is greedy: peaks
/// are visited from tallest to smallest (equal heights in index order), and
/// each kept peak removes every remaining candidate closer than `distance`.
///
/// # Arguments
/// * `x` - Input signal
/// * `height` - Minimum peak value
/// * `distance` - Minimum index separation between kept peaks
///
/// # Returns
/// Indices of the kept peaks in increasing order
///
/// # Example
/// ```
/// use tremor::utils::find_peaks;
///
/// let x = vec![0.0, 5.0, 0.0, 4.0, 0.0, 0.0, 0.0, 3.0, 0.0];
/// assert_eq!(find_peaks(&x, 1.0, 1), vec![1, 3, 7]);
/// assert_eq!(find_peaks(&x, 1.0, 3), vec![1, 7]);
/// assert_eq!(find_peaks(&x, 3.5, 1), vec![1, 3]);
/// ```
pub fn find_peaks(x: &[f64], height: f64, distance: usize) -> Vec<usize> {
    let peaks: Vec<usize> = localmax(x)
        .into_iter()
        .filter(|&p| x[p] >= height)
        .collect();
    if distance <= 1 || peaks.len() < 2 {
        return peaks;
    }

    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| {
        x[peaks[b]]
            .partial_cmp(&x[peaks[a]])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut keep = vec![true; peaks.len()];
    for &j in &order {
        if !keep[j] {
            continue;
        }
        for k in (0..j).rev() {
            if peaks[j] - peaks[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..peaks.len() {
            if peaks[k] - peaks[j] >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(p))
        .collect()
}

/// Median of a set of values; the mean of the two middle values for an
/// even count. `None` when empty.
///
/// # Example
/// ```
/// use tremor::utils::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
/// assert_eq!(median(&[]), None);
/// ```
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
