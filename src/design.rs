use faer::{Mat, MatRef};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

pub const INTERCEPT: &str = "(Intercept)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub outcome: f64,
    pub regressors: Vec<f64>,
}

impl Observation {
    pub fn new(outcome: f64, regressors: impl Into<Vec<f64>>) -> Self {
        Self {
            outcome,
            regressors: regressors.into(),
        }
    }
}

/// An ordered set of observations sharing the same regressors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSet {
    names: Vec<String>,
    observations: Vec<Observation>,
}

impl ObservationSet {
    /// An empty set with the given regressor names. With no names, the regressors are labelled
    /// `x[0]`, `x[1]`, ... when the design matrix is built.
    pub fn new<S: ToString>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(|x| x.to_string()).collect(),
            observations: Vec::new(),
        }
    }

    pub fn with_observations<S: ToString>(
        names: impl IntoIterator<Item = S>,
        observations: impl IntoIterator<Item = Observation>,
    ) -> Self {
        let mut set = Self::new(names);
        set.observations.extend(observations);
        set
    }

    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Outcome vector and regressor matrix with a leading intercept column.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    y: Vec<f64>,
    x: Mat<f64>,
    colnames: Vec<String>,
}

impl DesignMatrix {
    #[tracing::instrument(skip(set), fields(n = set.len()))]
    pub fn build(set: &ObservationSet) -> Result<Self> {
        let first = set.observations().first().ok_or(Error::Empty)?;
        let k = if set.names().is_empty() {
            first.regressors.len()
        } else {
            set.names().len()
        };
        let colnames = std::iter::once(INTERCEPT.to_string())
            .chain((0..k).map(|j| {
                set.names()
                    .get(j)
                    .cloned()
                    .unwrap_or_else(|| format!("x[{}]", j))
            }))
            .collect::<Vec<_>>();

        for (row, obs) in set.observations().iter().enumerate() {
            if obs.regressors.len() != k {
                debug!("Observation {} has the wrong number of regressors", row);
                return Err(Error::Dimension {
                    expected: k,
                    found: obs.regressors.len(),
                });
            }
        }

        let mut y = Vec::with_capacity(set.len());
        for (row, obs) in set.observations().iter().enumerate() {
            if !obs.outcome.is_finite() {
                return Err(Error::MissingValue {
                    row,
                    column: "outcome".to_string(),
                });
            }
            if obs.outcome != 0.0 && obs.outcome != 1.0 {
                return Err(Error::NonBinaryOutcome {
                    row,
                    value: obs.outcome,
                });
            }
            if let Some(j) = obs.regressors.iter().position(|x| !x.is_finite()) {
                return Err(Error::MissingValue {
                    row,
                    column: colnames[j + 1].clone(),
                });
            }
            y.push(obs.outcome);
        }

        let observations = set.observations();
        let x = Mat::from_fn(set.len(), k + 1, |i, j| {
            if j == 0 {
                1.0
            } else {
                observations[i].regressors[j - 1]
            }
        });
        debug!(nrows = x.nrows(), ncols = x.ncols(), "Built design matrix");
        Ok(Self { y, x, colnames })
    }

    /// Build from an outcome column and named regressor columns of the same length.
    pub fn from_columns(outcome: &[f64], columns: &[(&str, &[f64])]) -> Result<Self> {
        for (_, column) in columns {
            if column.len() != outcome.len() {
                return Err(Error::Dimension {
                    expected: outcome.len(),
                    found: column.len(),
                });
            }
        }
        let set = ObservationSet::with_observations(
            columns.iter().map(|(name, _)| *name),
            outcome.iter().enumerate().map(|(i, y)| {
                Observation::new(*y, columns.iter().map(|(_, c)| c[i]).collect::<Vec<_>>())
            }),
        );
        Self::build(&set)
    }

    pub fn outcome(&self) -> &[f64] {
        &self.y
    }

    pub fn x(&self) -> MatRef<'_, f64> {
        self.x.as_ref()
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    /// Number of columns including the intercept.
    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    pub fn n_regressors(&self) -> usize {
        self.x.ncols() - 1
    }

    pub fn colnames(&self) -> &[String] {
        &self.colnames
    }

    pub fn regressor_names(&self) -> &[String] {
        &self.colnames[1..]
    }

    pub fn row(&self, i: usize) -> Vec<f64> {
        (0..self.ncols()).map(|j| self.x[(i, j)]).collect()
    }

    /// Column means, the first entry being the intercept's `1.0`.
    pub fn column_means(&self) -> Vec<f64> {
        let n = self.nrows() as f64;
        (0..self.ncols())
            .map(|j| (0..self.nrows()).map(|i| self.x[(i, j)]).sum::<f64>() / n)
            .collect()
    }

    /// Prepend the intercept to a regressor vector.
    pub fn augment(&self, regressors: &[f64]) -> Result<Vec<f64>> {
        if regressors.len() != self.n_regressors() {
            return Err(Error::Dimension {
                expected: self.n_regressors(),
                found: regressors.len(),
            });
        }
        Ok(std::iter::once(1.0)
            .chain(regressors.iter().copied())
            .collect())
    }

    /// Share of observations with a positive outcome.
    pub fn outcome_mean(&self) -> f64 {
        self.y.iter().sum::<f64>() / self.y.len() as f64
    }
}
