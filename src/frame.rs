/// Number of analysis frames for a signal of `len` samples.
///
/// Frames start at `0, hop_length, 2 * hop_length, ...` and the count is
/// `max(1, (len - frame_length) / hop_length)` with floor division, so a
/// signal no longer than one frame still yields a single frame. Frames
/// that would run past the end are not emitted and nothing is padded.
///
/// # Example
/// ```
/// use tremor::frame::frame_count;
///
/// assert_eq!(frame_count(1000, 20, 5).unwrap(), 196);
/// assert_eq!(frame_count(10, 20, 5).unwrap(), 1);
/// ```
pub fn frame_count(len: usize, frame_length: usize, hop_length: usize) -> crate::Result<usize> {
    check_sizes(frame_length, hop_length)?;
    Ok((len.saturating_sub(frame_length) / hop_length).max(1))
}

/// Starting sample index of each analysis frame.
///
/// # Example
/// ```
/// use tremor::frame::frame_indices;
///
/// let indices = frame_indices(100, 20, 10).unwrap();
/// assert_eq!(indices, vec![0, 10, 20, 30, 40, 50, 60, 70]);
/// ```
pub fn frame_indices(
    len: usize,
    frame_length: usize,
    hop_length: usize,
) -> crate::Result<Vec<usize>> {
    let n_frames = frame_count(len, frame_length, hop_length)?;
    Ok((0..n_frames).map(|i| i * hop_length).collect())
}

/// Borrow the frames of `y`, truncating the last one at the signal end.
pub fn frames(y: &[f64], frame_length: usize, hop_length: usize) -> crate::Result<Vec<&[f64]>> {
    let indices = frame_indices(y.len(), frame_length, hop_length)?;
    Ok(indices
        .into_iter()
        .map(|start| {
            let start = start.min(y.len());
            let end = (start + frame_length).min(y.len());
            &y[start..end]
        })
        .collect())
}

fn check_sizes(frame_length: usize, hop_length: usize) -> crate::Result<()> {
    if frame_length == 0 {
        return Err(crate::Error::InvalidSize {
            name: "frame_length",
            value: 0,
            reason: "must be > 0",
        });
    }
    if hop_length == 0 {
        return Err(crate::Error::InvalidSize {
            name: "hop_length",
            value: 0,
            reason: "must be > 0",
        });
    }
    Ok(())
}
