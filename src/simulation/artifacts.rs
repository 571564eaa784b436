//! Renderable summaries of the simulated ensemble.
//!
//! The engine does not draw; it hands the orchestrator compact data the
//! UI can plot: a small sample of full price paths and a binned
//! histogram of terminal returns.

use serde::{Deserialize, Serialize};

/// Number of full paths retained for plotting.
pub const SAMPLE_PATH_COUNT: usize = 10;

/// Number of histogram bins for the terminal-return distribution.
pub const HISTOGRAM_BINS: usize = 50;

/// A sample of simulated price paths, each including the spot at t=0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEnsemble {
    /// Steps per path, excluding the starting point.
    pub steps: usize,
    /// Sampled paths, `steps + 1` points each.
    pub paths: Vec<Vec<f64>>,
}

/// Binned distribution summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin edges, `counts.len() + 1` entries, ascending.
    pub bin_edges: Vec<f64>,
    /// Observations per bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width buckets spanning their range.
    ///
    /// A degenerate range (all values equal, e.g. zero volatility) falls
    /// into a single unit-width bin centered on the value.
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        if values.is_empty() || bins == 0 {
            return Self {
                bin_edges: Vec::new(),
                counts: Vec::new(),
            };
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        if !(max > min) {
            return Self {
                bin_edges: vec![min - 0.5, min + 0.5],
                counts: vec![values.len()],
            };
        }

        let width = (max - min) / bins as f64;
        let bin_edges: Vec<f64> = (0..=bins).map(|i| min + i as f64 * width).collect();
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Self { bin_edges, counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_sum_to_input() {
        let values: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.37).sin()).collect();
        let hist = Histogram::from_values(&values, HISTOGRAM_BINS);

        assert_eq!(hist.counts.len(), HISTOGRAM_BINS);
        assert_eq!(hist.bin_edges.len(), HISTOGRAM_BINS + 1);
        assert_eq!(hist.counts.iter().sum::<usize>(), 1000);
    }

    #[test]
    fn test_histogram_edges_cover_range() {
        let values = [-0.2, -0.1, 0.0, 0.3, 0.5];
        let hist = Histogram::from_values(&values, 5);

        assert!((hist.bin_edges[0] - (-0.2)).abs() < 1e-12);
        assert!((hist.bin_edges[5] - 0.5).abs() < 1e-12);
        // Max value lands in the last bin, not out of range.
        assert!(hist.counts[4] >= 1);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let values = [0.08; 200];
        let hist = Histogram::from_values(&values, 50);

        assert_eq!(hist.counts, vec![200]);
        assert_eq!(hist.bin_edges.len(), 2);
    }

    #[test]
    fn test_histogram_empty() {
        let hist = Histogram::from_values(&[], 50);
        assert!(hist.counts.is_empty());
        assert!(hist.bin_edges.is_empty());
    }
}
