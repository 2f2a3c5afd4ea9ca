use serde::{Deserialize, Serialize};

/// 2x2 table of observed outcomes (rows) against predicted outcomes (columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PredictionTable {
    counts: [[u64; 2]; 2],
}

impl PredictionTable {
    /// A probability strictly above `threshold` predicts a positive outcome.
    pub fn new(outcome: &[f64], probabilities: &[f64], threshold: f64) -> Self {
        let mut counts = [[0; 2]; 2];
        for (y, p) in outcome.iter().zip(probabilities) {
            let actual = usize::from(*y > 0.5);
            let predicted = usize::from(*p > threshold);
            counts[actual][predicted] += 1;
        }
        Self { counts }
    }

    pub fn get(&self, actual: bool, predicted: bool) -> u64 {
        self.counts[usize::from(actual)][usize::from(predicted)]
    }

    pub fn correct(&self) -> u64 {
        self.counts[0][0] + self.counts[1][1]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        self.correct() as f64 / self.total() as f64
    }

    /// Correct classifications of a model that always predicts the most common outcome.
    pub fn majority_baseline(&self) -> u64 {
        let positives = self.counts[1][0] + self.counts[1][1];
        positives.max(self.total() - positives)
    }
}
