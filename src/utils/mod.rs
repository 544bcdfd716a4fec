mod array;
mod filtering;

// Array operations: localmax, find_peaks, median
pub use array::{find_peaks, localmax, median};

// Smoothing
pub use filtering::{GAUSSIAN_TRUNCATE, gaussian_filter1d, gaussian_kernel};
