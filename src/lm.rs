use std::f64::consts::PI;

use faer::{Mat, MatRef};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::{debug, warn};

use crate::{
    coef::Coef,
    linalg::{cross_product, dot, mat_vec, spd_inverse, t_mat_vec},
    DesignMatrix, Error, PredictionTable, Result,
};

/// Linear probability model, least squares on a 0/1 outcome. Fitted values are not clipped to
/// `[0, 1]`.
#[derive(Debug, Clone, Serialize)]
pub struct Lm {
    // the first element is the intercept
    coefs: Vec<Coef>,
    predicted: Vec<f64>,
    #[serde(skip)]
    covariance: Mat<f64>,
    r2: f64,
    adj_r2: f64,
    log_likelihood: f64,
    n: u64,
    m: u64,
}

impl Lm {
    #[tracing::instrument(skip(design), fields(n = design.nrows(), m = design.n_regressors()))]
    pub fn fit(design: &DesignMatrix) -> Result<Self> {
        let x = design.x();
        let ys = design.outcome();
        let n = ys.len();
        let p = x.ncols();
        let xtx_inv = spd_inverse(cross_product(x).as_ref()).ok_or(Error::SingularMatrix)?;
        let xty = t_mat_vec(x, ys);
        let betas = (0..p)
            .map(|i| (0..p).map(|j| xtx_inv[(i, j)] * xty[j]).sum::<f64>())
            .collect::<Vec<_>>();

        let predicted = mat_vec(x, &betas);
        let rss = ys
            .iter()
            .zip(&predicted)
            .map(|(y, p)| (y - p).powi(2))
            .sum::<f64>();
        let mean = design.outcome_mean();
        let tss = ys.iter().map(|y| (y - mean).powi(2)).sum::<f64>();
        // a constant outcome is fitted exactly, which leaves no variance to test against
        let exact = rss == 0.0 || tss == 0.0;
        if tss == 0.0 {
            warn!("Outcome is constant, R² and p-values are undefined");
        }
        let r2 = if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN };
        let adj_r2 = calculate_adj_r2(r2, n, p - 1);
        let log_likelihood = -0.5 * n as f64 * ((2.0 * PI * rss / n as f64).ln() + 1.0);

        let df = n.saturating_sub(p);
        let sigma2 = if df > 0 { rss / df as f64 } else { f64::NAN };
        let covariance = Mat::from_fn(p, p, |i, j| sigma2 * xtx_inv[(i, j)]);
        let t_distr = StudentsT::new(0.0, 1.0, df as f64).ok();
        let critical = t_distr
            .as_ref()
            .map(|t| t.inverse_cdf(0.975))
            .unwrap_or(f64::NAN);
        let coefs = betas
            .iter()
            .enumerate()
            .map(|(i, coef)| {
                let std_err = covariance[(i, i)].sqrt();
                let t = coef / std_err;
                let p = match t_distr.as_ref() {
                    Some(d) if !exact && t.is_finite() => 2.0 * (1.0 - d.cdf(t.abs())),
                    _ => f64::NAN,
                };
                Coef::new(&design.colnames()[i], *coef, std_err, p, critical)
            })
            .collect::<Vec<_>>();

        let lm = Lm {
            coefs,
            predicted,
            covariance,
            r2,
            adj_r2,
            log_likelihood,
            n: n as u64,
            m: (p - 1) as u64,
        };
        let outside = lm.out_of_bounds();
        if outside > 0 {
            warn!("{} fitted probabilities fall outside [0, 1]", outside);
        }
        debug!(r2, adj_r2, "Fitted linear probability model");
        Ok(lm)
    }

    pub fn intercept(&self) -> &Coef {
        &self.coefs[0]
    }

    pub fn slopes(&self) -> &[Coef] {
        &self.coefs[1..]
    }

    pub fn coefs(&self) -> &[Coef] {
        &self.coefs
    }

    pub fn coefficients(&self) -> Vec<f64> {
        self.coefs.iter().map(|c| c.coef()).collect()
    }

    /// Fitted values, unclipped.
    pub fn predicted(&self) -> &[f64] {
        &self.predicted
    }

    pub fn covariance(&self) -> MatRef<'_, f64> {
        self.covariance.as_ref()
    }

    pub fn r2(&self) -> f64 {
        self.r2
    }

    pub fn adj_r2(&self) -> f64 {
        self.adj_r2
    }

    /// Gaussian log likelihood at the least squares estimate.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood + 2.0 * self.coefs.len() as f64
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn m(&self) -> u64 {
        self.m
    }

    /// Number of fitted values below 0 or above 1.
    pub fn out_of_bounds(&self) -> usize {
        self.predicted
            .iter()
            .filter(|p| !(0.0..=1.0).contains(*p))
            .count()
    }

    /// The marginal effect of each regressor in a linear model is its slope.
    pub fn marginal_effects(&self) -> &[Coef] {
        self.slopes()
    }

    /// Prediction for a regressor vector without the intercept, unclipped.
    pub fn predict(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.slopes().len() {
            return Err(Error::Dimension {
                expected: self.slopes().len(),
                found: x.len(),
            });
        }
        let slopes = self.slopes().iter().map(|c| c.coef()).collect::<Vec<_>>();
        Ok(self.intercept().coef() + dot(&slopes, x))
    }

    pub fn pred_table(&self, design: &DesignMatrix, threshold: f64) -> PredictionTable {
        PredictionTable::new(design.outcome(), &self.predicted, threshold)
    }
}

pub fn calculate_adj_r2(r2: f64, nrows: usize, ncols: usize) -> f64 {
    1.0 - (1.0 - r2) * (nrows as f64 - 1.0) / (nrows as f64 - ncols as f64 - 1.0)
}
