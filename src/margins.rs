use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    coef::Coef,
    link::normal_p_value,
    mle::{Fit, Z_975},
    DesignMatrix, Error, Link, Result,
};

/// Where the derivative of the predicted probability is evaluated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    /// At the column means of the regressors.
    #[default]
    Mean,
    /// Averaged over every observation.
    Average,
    /// At an explicit regressor vector, intercept excluded.
    At(Vec<f64>),
}

impl fmt::Display for MarginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginMode::Mean => write!(f, "mean"),
            MarginMode::Average => write!(f, "average"),
            MarginMode::At(_) => write!(f, "at"),
        }
    }
}

impl FromStr for MarginMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mean" => Ok(MarginMode::Mean),
            "average" | "overall" => Ok(MarginMode::Average),
            _ => Err(Error::InvalidMarginMode(s.to_string())),
        }
    }
}

/// Partial effects of each regressor on the predicted probability, with delta method standard
/// errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginalEffects {
    link: Link,
    mode: MarginMode,
    effects: Vec<Coef>,
}

impl MarginalEffects {
    pub fn link(&self) -> Link {
        self.link
    }

    pub fn mode(&self) -> &MarginMode {
        &self.mode
    }

    pub fn effects(&self) -> &[Coef] {
        &self.effects
    }

    pub fn values(&self) -> Vec<f64> {
        self.effects.iter().map(|c| c.coef()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&Coef> {
        self.effects.iter().find(|c| c.label() == label)
    }
}

impl Fit {
    /// Marginal effects of the regressors of `design`, which must have the columns the model was
    /// fitted on.
    #[tracing::instrument(skip(self, design), fields(link = %self.link()))]
    pub fn marginal_effects(
        &self,
        design: &DesignMatrix,
        mode: MarginMode,
    ) -> Result<MarginalEffects> {
        let k = self.slopes().len();
        if design.n_regressors() != k {
            return Err(Error::Dimension {
                expected: k,
                found: design.n_regressors(),
            });
        }
        let rows = match &mode {
            MarginMode::Mean => vec![design.column_means()],
            MarginMode::Average => (0..design.nrows()).map(|i| design.row(i)).collect(),
            MarginMode::At(point) => {
                if point.len() != k {
                    return Err(Error::Dimension {
                        expected: k,
                        found: point.len(),
                    });
                }
                vec![std::iter::once(1.0).chain(point.iter().copied()).collect()]
            },
        };

        let beta = self.coefficients();
        let (values, jacobian) = effects(self.link(), &beta, &rows);
        let covariance = self.covariance();
        let effects = values
            .iter()
            .zip(&jacobian)
            .enumerate()
            .map(|(j, (value, grad))| {
                let mut var = 0.0;
                for (a, ga) in grad.iter().enumerate() {
                    for (b, gb) in grad.iter().enumerate() {
                        var += ga * covariance[(a, b)] * gb;
                    }
                }
                let std_err = var.sqrt();
                let p = normal_p_value(value / std_err);
                Coef::new(self.slopes()[j].label(), *value, std_err, p, Z_975)
            })
            .collect::<Vec<_>>();
        debug!(mode = %mode, "Computed {} marginal effects", effects.len());
        Ok(MarginalEffects {
            link: self.link(),
            mode,
            effects,
        })
    }
}

/// Effects of the slopes of `beta` averaged over `rows` (full design rows, intercept first) and
/// their jacobian with respect to every element of `beta`.
fn effects(link: Link, beta: &[f64], rows: &[Vec<f64>]) -> (Vec<f64>, Vec<Vec<f64>>) {
    let p = beta.len();
    let n = rows.len() as f64;
    let mut mean_pdf = 0.0;
    let mut mean_dpdf_x = vec![0.0; p];
    for row in rows {
        let eta = row.iter().zip(beta).map(|(x, b)| x * b).sum::<f64>();
        mean_pdf += link.pdf(eta) / n;
        let d = link.pdf_derivative(eta);
        for (acc, x) in mean_dpdf_x.iter_mut().zip(row) {
            *acc += d * x / n;
        }
    }
    let values = beta[1..].iter().map(|b| mean_pdf * b).collect();
    let jacobian = (1..p)
        .map(|j| {
            (0..p)
                .map(|k| {
                    let diag = if j == k { mean_pdf } else { 0.0 };
                    diag + beta[j] * mean_dpdf_x[k]
                })
                .collect()
        })
        .collect();
    (values, jacobian)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    macro_rules! assert_float_eq {
        ($a:expr, $b:expr, $tol:expr) => {
            assert!(($a - $b).abs() < $tol, "{:.22} != {:.22}", $a, $b);
        };
    }

    macro_rules! float_eq {
        ($a:expr, $b:expr) => {
            assert_float_eq!($a, $b, 1e-10);
        };
    }

    fn design() -> DesignMatrix {
        DesignMatrix::from_columns(
            &[1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            &[
                (
                    "a",
                    &[0.3, -1.2, 0.5, 2.0, 1.1, -0.4, 0.9, -2.1, -0.2, 0.1, 1.4, -0.8][..],
                ),
                (
                    "b",
                    &[1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0][..],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_sign_matches_coefficients() {
        let d = design();
        for link in [Link::Normal, Link::Logistic] {
            let fit = Fit::mle(&d, link, &Default::default()).unwrap();
            for mode in [
                MarginMode::Mean,
                MarginMode::Average,
                MarginMode::At(vec![1.5, 0.0]),
            ] {
                let me = fit.marginal_effects(&d, mode).unwrap();
                assert_eq!(me.effects().len(), 2);
                for (e, c) in me.effects().iter().zip(fit.slopes()) {
                    assert_eq!(e.coef().signum(), c.coef().signum());
                    assert_eq!(e.label(), c.label());
                    assert!(e.std_err() > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_modes_differ() {
        let d = design();
        let fit = Fit::logit(&d).unwrap();
        let mean = fit.marginal_effects(&d, MarginMode::Mean).unwrap();
        let average = fit.marginal_effects(&d, MarginMode::Average).unwrap();
        assert_ne!(mean.values(), average.values());
        assert_eq!(mean.mode(), &MarginMode::Mean);
        assert_eq!(average.mode(), &MarginMode::Average);
    }

    #[test]
    fn test_at_means_is_mean() {
        let d = design();
        let fit = Fit::probit(&d).unwrap();
        let means = d.column_means()[1..].to_vec();
        let at = fit.marginal_effects(&d, MarginMode::At(means)).unwrap();
        let mean = fit.marginal_effects(&d, MarginMode::Mean).unwrap();
        for (a, b) in at.effects().iter().zip(mean.effects()) {
            float_eq!(a.coef(), b.coef());
            float_eq!(a.std_err(), b.std_err());
        }
    }

    #[test]
    fn test_effect_is_derivative() {
        let d = design();
        let h = 1e-6;
        for link in [Link::Normal, Link::Logistic] {
            let fit = Fit::mle(&d, link, &Default::default()).unwrap();
            let point = vec![0.4, 0.5];
            let me = fit
                .marginal_effects(&d, MarginMode::At(point.clone()))
                .unwrap();
            for j in 0..2 {
                let mut up = point.clone();
                let mut down = point.clone();
                up[j] += h;
                down[j] -= h;
                let numeric =
                    (fit.predict(&up).unwrap() - fit.predict(&down).unwrap()) / (2.0 * h);
                assert_float_eq!(me.effects()[j].coef(), numeric, 1e-7);
            }
        }
    }

    #[test]
    fn test_average_is_mean_of_derivatives() {
        let d = design();
        let fit = Fit::probit(&d).unwrap();
        let average = fit.marginal_effects(&d, MarginMode::Average).unwrap();
        for j in 0..2 {
            let expected = (0..d.nrows())
                .map(|i| {
                    let point = d.row(i)[1..].to_vec();
                    fit.marginal_effects(&d, MarginMode::At(point)).unwrap().values()[j]
                })
                .sum::<f64>()
                / d.nrows() as f64;
            float_eq!(average.values()[j], expected);
        }
    }

    #[test]
    fn test_jacobian() {
        let beta = [0.2, -0.7, 1.1];
        let rows = vec![vec![1.0, 0.5, 1.0], vec![1.0, -1.5, 0.0], vec![1.0, 2.0, 1.0]];
        let h = 1e-6;
        for link in [Link::Normal, Link::Logistic] {
            let (_, jacobian) = effects(link, &beta, &rows);
            for k in 0..3 {
                let mut up = beta;
                let mut down = beta;
                up[k] += h;
                down[k] -= h;
                let (vu, _) = effects(link, &up, &rows);
                let (vd, _) = effects(link, &down, &rows);
                for j in 0..2 {
                    assert_float_eq!(jacobian[j][k], (vu[j] - vd[j]) / (2.0 * h), 1e-7);
                }
            }
        }
    }

    #[test]
    fn test_dimension() {
        let d = design();
        let fit = Fit::logit(&d).unwrap();
        assert!(matches!(
            fit.marginal_effects(&d, MarginMode::At(vec![1.0])),
            Err(Error::Dimension {
                expected: 2,
                found: 1
            })
        ));
        let other =
            DesignMatrix::from_columns(&[1.0, 0.0, 1.0], &[("a", &[1.0, 2.0, 0.5][..])]).unwrap();
        assert!(matches!(
            fit.marginal_effects(&other, MarginMode::Mean),
            Err(Error::Dimension { .. })
        ));
    }

    #[test]
    fn test_get() {
        let d = design();
        let me = Fit::logit(&d)
            .unwrap()
            .marginal_effects(&d, MarginMode::Mean)
            .unwrap();
        assert_eq!(me.get("b").map(|c| c.coef()), Some(me.values()[1]));
        assert!(me.get("c").is_none());
        assert_eq!(me.link(), Link::Logistic);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("mean".parse::<MarginMode>().unwrap(), MarginMode::Mean);
        assert_eq!("Average".parse::<MarginMode>().unwrap(), MarginMode::Average);
        assert_eq!("overall".parse::<MarginMode>().unwrap(), MarginMode::Average);
        assert!(matches!(
            "median".parse::<MarginMode>(),
            Err(Error::InvalidMarginMode(_))
        ));
        assert_eq!(MarginMode::At(vec![1.0]).to_string(), "at");
    }
}
