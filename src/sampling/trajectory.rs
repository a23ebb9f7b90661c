//! Append-only trajectory storage.

use serde::Serialize;

use super::traits::TrajectoryPoint;

/// Ordered samples of one replica or one umbrella window.
///
/// Samples can only be appended by the replica that owns the trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory<S> {
    samples: Vec<S>,
}

impl<S> Default for Trajectory<S> {
    fn default() -> Self {
        Self { samples: Vec::new() }
    }
}

impl<S> Trajectory<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { samples: Vec::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, sample: S) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&S> {
        self.samples.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[S] {
        &self.samples
    }

    pub fn into_vec(self) -> Vec<S> {
        self.samples
    }
}

impl<S: TrajectoryPoint> Trajectory<S> {
    pub fn positions(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.position()).collect()
    }

    pub fn mean_position(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().map(|s| s.position()).sum::<f64>() / self.samples.len() as f64)
    }

    /// Number of samples recorded in each of `n_states` states.
    ///
    /// Samples whose index is outside the range are ignored.
    pub fn state_occupancy(&self, n_states: usize) -> Vec<usize> {
        let mut counts = vec![0; n_states];
        for s in &self.samples {
            if let Some(c) = counts.get_mut(s.state_index()) {
                *c += 1;
            }
        }
        counts
    }
}

impl<'a, S> IntoIterator for &'a Trajectory<S> {
    type Item = &'a S;
    type IntoIter = std::slice::Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
