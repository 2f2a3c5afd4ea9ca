use faer::{Mat, MatRef};
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::{debug, trace, warn};

use crate::{
    coef::Coef,
    link::normal_p_value,
    linalg::{dot, mat_vec, spd_inverse, t_mat_vec, weighted_cross_product},
    DesignMatrix, Error, Link, Method, MleConfig, PredictionTable, Result, CDF_EPSILON,
};

/// Maximum number of times a step is halved before giving up on finding an ascent direction.
pub const MAX_STEP_HALVINGS: usize = 30;

pub(crate) const Z_975: f64 = 1.959963984540054;

/// A probit or logit model fitted by maximum likelihood.
#[derive(Debug, Clone, Serialize)]
pub struct Fit {
    link: Link,
    method: Method,
    // the first element is the intercept
    coefs: Vec<Coef>,
    #[serde(skip)]
    covariance: Mat<f64>,
    log_likelihood: f64,
    null_log_likelihood: f64,
    iterations: usize,
    converged: bool,
    history: Vec<f64>,
    separated: bool,
    predicted: Vec<f64>,
    pseudo_r2: f64,
    r2_tjur: f64,
    n: u64,
}

impl Fit {
    /// Maximize the Bernoulli log likelihood under `link`, starting from zero coefficients.
    ///
    /// Each iteration takes a Newton (or Fisher scoring) step, halving it until the log
    /// likelihood does not decrease. Iteration stops once the log likelihood changes by less
    /// than `config.tolerance`. Hitting `config.max_iterations` first is not an error, the best
    /// estimate so far is returned with [`Fit::converged`] set to `false`.
    #[tracing::instrument(skip(design, config), fields(n = design.nrows(), m = design.n_regressors()))]
    pub fn mle(design: &DesignMatrix, link: Link, config: &MleConfig) -> Result<Self> {
        let x = design.x();
        let ys = design.outcome();
        let mut beta = vec![0.0; x.ncols()];
        let mut eta = vec![0.0; ys.len()];
        let mut l = log_likelihood(link, ys, &eta);
        let mut history = vec![l];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < config.max_iterations {
            iterations += 1;
            let (gradient, information) = derivatives(link, config.method, x, ys, &eta);
            let inverse = spd_inverse(information.as_ref()).ok_or(Error::SingularHessian {
                iteration: iterations,
            })?;
            let step = (0..beta.len())
                .map(|i| dot(&row(inverse.as_ref(), i), &gradient))
                .collect::<Vec<_>>();
            let decrement = dot(&gradient, &step);

            let mut scale = 1.0;
            let mut accepted = None;
            for _ in 0..=MAX_STEP_HALVINGS {
                let candidate = beta
                    .iter()
                    .zip(&step)
                    .map(|(b, s)| b + scale * s)
                    .collect::<Vec<_>>();
                let candidate_eta = mat_vec(x, &candidate);
                let candidate_l = log_likelihood(link, ys, &candidate_eta);
                if candidate_l >= l {
                    accepted = Some((candidate, candidate_eta, candidate_l));
                    break;
                }
                scale *= 0.5;
            }
            let Some((candidate, candidate_eta, candidate_l)) = accepted else {
                let gradient_norm = dot(&gradient, &gradient).sqrt();
                debug!(
                    decrement,
                    gradient_norm, "No ascent step found at iteration {}", iterations
                );
                history.push(l);
                converged = at_optimum(decrement, config.tolerance);
                break;
            };

            let delta = candidate_l - l;
            beta = candidate;
            eta = candidate_eta;
            l = candidate_l;
            history.push(l);
            trace!(delta, scale, beta = ?beta, "Iteration {}", iterations);
            if delta.abs() < config.tolerance {
                converged = true;
                break;
            }
        }
        if converged {
            debug!("Converged after {} iterations", iterations);
        } else {
            warn!("Did not converge after {} iterations", iterations);
        }
        let separated = separates(ys, &eta);
        if separated {
            warn!(
                "The fitted index separates the outcomes, the maximum likelihood estimate does \
                 not exist and the coefficients and standard errors are not meaningful"
            );
        }

        // standard errors always come from the observed hessian
        let (_, information) = derivatives(link, Method::NewtonRaphson, x, ys, &eta);
        let covariance = spd_inverse(information.as_ref()).ok_or(Error::SingularHessian {
            iteration: iterations,
        })?;

        let coefs = beta
            .iter()
            .enumerate()
            .map(|(i, coef)| {
                let std_err = covariance[(i, i)].sqrt();
                let p = normal_p_value(coef / std_err);
                Coef::new(&design.colnames()[i], *coef, std_err, p, Z_975)
            })
            .collect::<Vec<_>>();
        let predicted = eta.iter().map(|e| link.cdf(*e)).collect::<Vec<_>>();
        let null_log_likelihood = null_log_likelihood(ys);

        Ok(Self {
            link,
            method: config.method,
            coefs,
            covariance,
            log_likelihood: l,
            null_log_likelihood,
            iterations,
            converged,
            history,
            separated,
            pseudo_r2: compute_pseudo_r2(ys, l, null_log_likelihood),
            r2_tjur: compute_r2_tjur(ys, &predicted),
            predicted,
            n: ys.len() as u64,
        })
    }

    pub fn probit(design: &DesignMatrix) -> Result<Self> {
        Self::mle(design, Link::Normal, &MleConfig::default())
    }

    pub fn logit(design: &DesignMatrix) -> Result<Self> {
        Self::mle(design, Link::Logistic, &MleConfig::default())
    }

    /// Turn a fit that did not converge into [`Error::ConvergenceFailure`].
    pub fn ensure_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(Error::ConvergenceFailure {
                iterations: self.iterations,
            })
        }
    }

    pub fn link(&self) -> Link {
        self.link
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn coefs(&self) -> &[Coef] {
        &self.coefs
    }

    pub fn intercept(&self) -> &Coef {
        &self.coefs[0]
    }

    pub fn slopes(&self) -> &[Coef] {
        &self.coefs[1..]
    }

    pub fn coefficients(&self) -> Vec<f64> {
        self.coefs.iter().map(|c| c.coef()).collect()
    }

    pub fn std_errors(&self) -> Vec<f64> {
        self.coefs.iter().map(|c| c.std_err()).collect()
    }

    /// Inverse of the negative hessian at the estimate.
    pub fn covariance(&self) -> MatRef<'_, f64> {
        self.covariance.as_ref()
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Log likelihood of the intercept-only model.
    pub fn null_log_likelihood(&self) -> f64 {
        self.null_log_likelihood
    }

    /// Likelihood ratio statistic against the intercept-only model.
    pub fn llr(&self) -> f64 {
        2.0 * (self.log_likelihood - self.null_log_likelihood)
    }

    pub fn llr_p_value(&self) -> f64 {
        let df = self.slopes().len() as f64;
        match ChiSquared::new(df) {
            Ok(chi2) => 1.0 - chi2.cdf(self.llr()),
            Err(_) => f64::NAN,
        }
    }

    /// McFadden's pseudo R^2, `NaN` when every outcome is the same.
    pub fn pseudo_r2(&self) -> f64 {
        self.pseudo_r2
    }

    /// Tjur's coefficient of discrimination, `NaN` when every outcome is the same.
    pub fn r2_tjur(&self) -> f64 {
        self.r2_tjur
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood + 2.0 * self.coefs.len() as f64
    }

    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood + (self.n as f64).ln() * self.coefs.len() as f64
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Whether the fitted index separates the positive from the negative outcomes. A constant
    /// outcome counts as separated.
    pub fn separated(&self) -> bool {
        self.separated
    }

    /// Log likelihood at the start and after each accepted step.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Fitted probabilities of the estimation sample.
    pub fn predicted(&self) -> &[f64] {
        &self.predicted
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    /// Predicted probability for a regressor vector without the intercept.
    pub fn predict(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.slopes().len() {
            return Err(Error::Dimension {
                expected: self.slopes().len(),
                found: x.len(),
            });
        }
        let v = self.intercept().coef()
            + self
                .slopes()
                .iter()
                .zip(x)
                .map(|(c, x)| c.coef() * x)
                .sum::<f64>();
        Ok(self.link.cdf(v))
    }

    /// Predicted probabilities for every row of a design matrix.
    pub fn predict_design(&self, design: &DesignMatrix) -> Result<Vec<f64>> {
        if design.ncols() != self.coefs.len() {
            return Err(Error::Dimension {
                expected: self.slopes().len(),
                found: design.n_regressors(),
            });
        }
        Ok(mat_vec(design.x(), &self.coefficients())
            .into_iter()
            .map(|e| self.link.cdf(e))
            .collect())
    }

    pub fn pred_table(&self, design: &DesignMatrix, threshold: f64) -> Result<PredictionTable> {
        let predicted = self.predict_design(design)?;
        Ok(PredictionTable::new(design.outcome(), &predicted, threshold))
    }
}

fn row(m: MatRef<'_, f64>, i: usize) -> Vec<f64> {
    (0..m.ncols()).map(|j| m[(i, j)]).collect()
}

fn log_likelihood(link: Link, ys: &[f64], eta: &[f64]) -> f64 {
    ys.iter()
        .zip(eta)
        .map(|(y, eta)| link.log_likelihood(*y, *eta))
        .sum()
}

/// Gradient of the log likelihood and the information matrix (negative hessian, exact or
/// expected).
fn derivatives(
    link: Link,
    method: Method,
    x: MatRef<'_, f64>,
    ys: &[f64],
    eta: &[f64],
) -> (Vec<f64>, Mat<f64>) {
    let scores = ys
        .iter()
        .zip(eta)
        .map(|(y, eta)| link.score(*y, *eta))
        .collect::<Vec<_>>();
    let w = ys
        .iter()
        .zip(eta)
        .map(|(y, eta)| match method {
            Method::NewtonRaphson => -link.score_derivative(*y, *eta),
            Method::FisherScoring => link.fisher_weight(*eta),
        })
        .collect::<Vec<_>>();
    (t_mat_vec(x, &scores), weighted_cross_product(x, &w))
}

/// Whether a step that failed to raise the log likelihood leaves the fit at an optimum. Half
/// the Newton decrement `g' H^-1 g` is the predicted gain of a full step.
fn at_optimum(decrement: f64, tolerance: f64) -> bool {
    0.5 * decrement.abs() < tolerance
}

/// True when every positive outcome has a larger index than every negative one.
fn separates(ys: &[f64], eta: &[f64]) -> bool {
    let (mut min_pos, mut max_neg) = (f64::INFINITY, f64::NEG_INFINITY);
    for (y, e) in ys.iter().zip(eta) {
        if *y > 0.5 {
            min_pos = min_pos.min(*e);
        } else {
            max_neg = max_neg.max(*e);
        }
    }
    min_pos > max_neg
}

fn null_log_likelihood(ys: &[f64]) -> f64 {
    let n = ys.len() as f64;
    let p = (ys.iter().sum::<f64>() / n).clamp(CDF_EPSILON, 1.0 - CDF_EPSILON);
    let positives = ys.iter().filter(|y| **y > 0.5).count() as f64;
    positives * p.ln() + (n - positives) * (1.0 - p).ln()
}

fn is_constant(ys: &[f64]) -> bool {
    ys.windows(2).all(|w| (w[0] > 0.5) == (w[1] > 0.5))
}

/// McFadden's `1 - LL / LL_0`. Undefined for a constant outcome, where the null log likelihood
/// is zero up to the probability clamp.
pub fn compute_pseudo_r2(ys: &[f64], log_likelihood: f64, null_log_likelihood: f64) -> f64 {
    if is_constant(ys) {
        return f64::NAN;
    }
    1.0 - log_likelihood / null_log_likelihood
}

/// Difference between the mean fitted probability of the positive and negative outcomes,
/// `NaN` unless both occur.
pub fn compute_r2_tjur(ys: &[f64], predicted: &[f64]) -> f64 {
    let (mut pos, mut n_pos, mut neg, mut n_neg) = (0.0, 0usize, 0.0, 0usize);
    for (y, p) in ys.iter().zip(predicted) {
        if *y > 0.5 {
            pos += p;
            n_pos += 1;
        } else {
            neg += p;
            n_neg += 1;
        }
    }
    if n_pos == 0 || n_neg == 0 {
        return f64::NAN;
    }
    pos / n_pos as f64 - neg / n_neg as f64
}
