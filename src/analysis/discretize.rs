//! Mapping of the continuous collective variable onto histogram bins.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// `n` evenly spaced points from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i + 1 == n { stop } else { start + i as f64 * step })
                .collect()
        }
    }
}

/// Bin index of `x` for sorted `edges`.
///
/// 0 below the first edge, `edges.len()` at or above the last one, and
/// `i + 1` for `edges[i] <= x < edges[i + 1]`. Intervals are half-open, so a
/// value on an edge belongs to the bin above it.
#[inline]
pub fn bin_index(x: f64, edges: &[f64]) -> usize {
    edges.partition_point(|&e| e <= x)
}

/// Fixed bin edges plus the bin centers derived from them once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BinningConfig", into = "BinningConfig")]
pub struct Discretizer {
    edges: Vec<f64>,
    centers: Vec<f64>,
}

/// Serialized form: the edges and the two open-ended tail centers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningConfig {
    pub edges: Vec<f64>,
    pub lower_center: Option<f64>,
    pub upper_center: Option<f64>,
}

impl Discretizer {
    /// Tail centers are placed half of the adjacent bin width outside the outer edges.
    pub fn new(edges: Vec<f64>) -> Result<Self> {
        check_edges(&edges)?;
        let n = edges.len();
        let lower = edges[0] - 0.5 * (edges[1] - edges[0]);
        let upper = edges[n - 1] + 0.5 * (edges[n - 1] - edges[n - 2]);
        Self::with_tail_centers(edges, lower, upper)
    }

    pub fn with_tail_centers(edges: Vec<f64>, lower_center: f64, upper_center: f64) -> Result<Self> {
        check_edges(&edges)?;
        let n = edges.len();
        if !(lower_center.is_finite() && lower_center < edges[0]) {
            return Err(SimError::invalid(format!(
                "lower tail center {lower_center} must lie below the first edge {}",
                edges[0]
            )));
        }
        if !(upper_center.is_finite() && upper_center >= edges[n - 1]) {
            return Err(SimError::invalid(format!(
                "upper tail center {upper_center} must not lie below the last edge {}",
                edges[n - 1]
            )));
        }

        let mut centers = Vec::with_capacity(n + 1);
        centers.push(lower_center);
        centers.extend(edges.windows(2).map(|w| 0.5 * (w[0] + w[1])));
        centers.push(upper_center);
        Ok(Self { edges, centers })
    }

    #[inline]
    pub fn bin(&self, x: f64) -> usize {
        bin_index(x, &self.edges)
    }

    pub fn n_bins(&self) -> usize {
        self.edges.len() + 1
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// One center per bin, tails included.
    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    pub fn histogram<I: IntoIterator<Item = f64>>(&self, values: I) -> Vec<usize> {
        let mut counts = vec![0; self.n_bins()];
        for x in values {
            counts[self.bin(x)] += 1;
        }
        counts
    }
}

fn check_edges(edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(SimError::invalid("at least two bin edges are required"));
    }
    if edges.iter().any(|e| !e.is_finite()) {
        return Err(SimError::invalid("bin edges must be finite"));
    }
    if let Some(i) = edges.windows(2).position(|w| w[0] >= w[1]) {
        return Err(SimError::invalid(format!(
            "bin edges must be strictly increasing: edges[{}] = {} >= edges[{}] = {}",
            i,
            edges[i],
            i + 1,
            edges[i + 1]
        )));
    }
    Ok(())
}

impl TryFrom<BinningConfig> for Discretizer {
    type Error = SimError;

    fn try_from(raw: BinningConfig) -> Result<Self> {
        match (raw.lower_center, raw.upper_center) {
            (Some(lower), Some(upper)) => Self::with_tail_centers(raw.edges, lower, upper),
            (None, None) => Self::new(raw.edges),
            _ => Err(SimError::invalid(
                "give both tail centers or neither of them",
            )),
        }
    }
}

impl From<Discretizer> for BinningConfig {
    fn from(d: Discretizer) -> Self {
        let upper = d.centers.last().copied();
        BinningConfig {
            lower_center: d.centers.first().copied(),
            upper_center: upper,
            edges: d.edges,
        }
    }
}

impl Default for Discretizer {
    /// Twenty edges on [-0.4, 4.2] with tail centers -0.7 and 4.5.
    fn default() -> Self {
        let edges = linspace(-0.4, 4.2, 20);
        let mut centers = Vec::with_capacity(edges.len() + 1);
        centers.push(-0.7);
        centers.extend(edges.windows(2).map(|w| 0.5 * (w[0] + w[1])));
        centers.push(4.5);
        Self { edges, centers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bin_boundaries() {
        let d = Discretizer::new(vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(d.bin(-1.0), 0);
        assert_eq!(d.bin(0.0), 1);
        assert_eq!(d.bin(0.5), 1);
        assert_eq!(d.bin(1.0), 2);
        assert_eq!(d.bin(2.0), 3);
        assert_eq!(d.bin(3.0), 3);
        assert_eq!(d.n_bins(), 4);
    }

    #[test]
    fn test_bin_is_monotonic_and_bounded() {
        let d = Discretizer::default();
        let mut last = 0;
        for x in linspace(-3.0, 7.0, 10_001) {
            let b = d.bin(x);
            assert!(b >= last);
            assert!(b <= d.edges().len());
            last = b;
        }
        assert_eq!(last, d.edges().len());
    }

    #[test]
    fn test_centers() {
        let d = Discretizer::new(vec![0.0, 1.0, 3.0]).unwrap();
        assert_eq!(d.centers(), &[-0.5, 0.5, 2.0, 4.0]);

        let d = Discretizer::default();
        assert_eq!(d.centers().len(), 21);
        assert_eq!(d.centers()[0], -0.7);
        assert_eq!(d.centers()[20], 4.5);
        let width = 4.6 / 19.0;
        assert_relative_eq!(d.centers()[1], -0.4 + 0.5 * width, epsilon = 1e-12);
        for (i, c) in d.centers().iter().enumerate() {
            assert_eq!(d.bin(*c), i);
        }
    }

    #[test]
    fn test_rejects_bad_edges() {
        assert!(Discretizer::new(vec![0.0]).is_err());
        assert!(Discretizer::new(vec![0.0, 2.0, 1.0]).is_err());
        assert!(Discretizer::new(vec![0.0, 0.0]).is_err());
        assert!(Discretizer::with_tail_centers(vec![0.0, 1.0], 0.5, 2.0).is_err());
    }

    #[test]
    fn test_histogram() {
        let d = Discretizer::new(vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(d.histogram([-5.0, 0.2, 0.7, 1.0, 9.0]), vec![1, 2, 1, 1]);
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(2.0, 3.0, 0).is_empty());
    }

    #[test]
    fn test_yaml_form() {
        let d: Discretizer =
            serde_yaml::from_str("edges: [0.0, 1.0]\nlower_center: -2.0\nupper_center: 3.0\n").unwrap();
        assert_eq!(d.centers(), &[-2.0, 0.5, 3.0]);
        assert!(serde_yaml::from_str::<Discretizer>("edges: [1.0, 0.0]\n").is_err());
    }
}
