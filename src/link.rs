use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    norm::{pnorm, M_1_SQRT_2PI},
    Error,
};

/// Probabilities are clamped to `[CDF_EPSILON, 1 - CDF_EPSILON]` before taking logarithms.
pub const CDF_EPSILON: f64 = 1e-12;

/// A symmetric link function, `F(-z) = 1 - F(z)`.
pub trait LinkFunction {
    fn cdf(z: f64) -> f64;
    fn pdf(z: f64) -> f64;
    fn pdf_derivative(z: f64) -> f64;
    /// `pdf(z) / cdf(z)`, the derivative of `ln cdf(z)`.
    fn mills_ratio(z: f64) -> f64;
    /// Derivative of [`LinkFunction::mills_ratio`], always negative for log-concave links.
    fn mills_ratio_derivative(z: f64) -> f64;
}

/// Normal link.
pub struct Probit;
impl LinkFunction for Probit {
    #[inline(always)]
    fn cdf(z: f64) -> f64 {
        pnorm(z, true)
    }

    #[inline(always)]
    fn pdf(z: f64) -> f64 {
        M_1_SQRT_2PI * (-0.5 * z * z).exp()
    }

    #[inline(always)]
    fn pdf_derivative(z: f64) -> f64 {
        -z * Self::pdf(z)
    }

    fn mills_ratio(z: f64) -> f64 {
        let cdf = Self::cdf(z);
        if cdf < f64::MIN_POSITIVE {
            // asymptotic expansion in the far left tail
            -z - 1.0 / z + 2.0 / z.powi(3)
        } else {
            Self::pdf(z) / cdf
        }
    }

    fn mills_ratio_derivative(z: f64) -> f64 {
        let r = Self::mills_ratio(z);
        -r * (z + r)
    }
}

/// Logistic link.
pub struct Logit;
impl LinkFunction for Logit {
    #[inline(always)]
    fn cdf(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let e = z.exp();
            e / (1.0 + e)
        }
    }

    #[inline(always)]
    fn pdf(z: f64) -> f64 {
        let e = (-z.abs()).exp();
        e / (1.0 + e).powi(2)
    }

    #[inline(always)]
    fn pdf_derivative(z: f64) -> f64 {
        // 1 - 2F(z) = -tanh(z / 2)
        -Self::pdf(z) * (0.5 * z).tanh()
    }

    #[inline(always)]
    fn mills_ratio(z: f64) -> f64 {
        Self::cdf(-z)
    }

    #[inline(always)]
    fn mills_ratio_derivative(z: f64) -> f64 {
        -Self::pdf(z)
    }
}

/// Link function choice, `normal` (probit) or `logistic` (logit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Link {
    Normal,
    Logistic,
}

impl Link {
    pub fn cdf(self, z: f64) -> f64 {
        match self {
            Link::Normal => Probit::cdf(z),
            Link::Logistic => Logit::cdf(z),
        }
    }

    pub fn pdf(self, z: f64) -> f64 {
        match self {
            Link::Normal => Probit::pdf(z),
            Link::Logistic => Logit::pdf(z),
        }
    }

    pub fn pdf_derivative(self, z: f64) -> f64 {
        match self {
            Link::Normal => Probit::pdf_derivative(z),
            Link::Logistic => Logit::pdf_derivative(z),
        }
    }

    pub fn clamped_cdf(self, z: f64) -> f64 {
        self.cdf(z).clamp(CDF_EPSILON, 1.0 - CDF_EPSILON)
    }

    fn mills_ratio(self, z: f64) -> f64 {
        match self {
            Link::Normal => Probit::mills_ratio(z),
            Link::Logistic => Logit::mills_ratio(z),
        }
    }

    fn mills_ratio_derivative(self, z: f64) -> f64 {
        match self {
            Link::Normal => Probit::mills_ratio_derivative(z),
            Link::Logistic => Logit::mills_ratio_derivative(z),
        }
    }

    /// Contribution of one observation to the log likelihood.
    #[inline]
    pub(crate) fn log_likelihood(self, y: f64, eta: f64) -> f64 {
        self.clamped_cdf(sign(y) * eta).ln()
    }

    /// First derivative of [`Link::log_likelihood`] with respect to the linear index, the
    /// generalized residual `(y - F) f / (F (1 - F))`.
    #[inline]
    pub(crate) fn score(self, y: f64, eta: f64) -> f64 {
        let q = sign(y);
        q * self.mills_ratio(q * eta)
    }

    /// Second derivative of [`Link::log_likelihood`] with respect to the linear index.
    #[inline]
    pub(crate) fn score_derivative(self, y: f64, eta: f64) -> f64 {
        self.mills_ratio_derivative(sign(y) * eta)
    }

    /// Expected information weight `f^2 / (F (1 - F))`.
    #[inline]
    pub(crate) fn fisher_weight(self, eta: f64) -> f64 {
        self.mills_ratio(eta) * self.mills_ratio(-eta)
    }

    pub fn model_name(self) -> &'static str {
        match self {
            Link::Normal => "Probit",
            Link::Logistic => "Logit",
        }
    }
}

#[inline(always)]
fn sign(y: f64) -> f64 {
    if y > 0.5 {
        1.0
    } else {
        -1.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Link::Normal => write!(f, "normal"),
            Link::Logistic => write!(f, "logistic"),
        }
    }
}

impl FromStr for Link {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" | "probit" => Ok(Link::Normal),
            "logistic" | "logit" => Ok(Link::Logistic),
            _ => Err(Error::InvalidLink(s.to_string())),
        }
    }
}

/// Two-sided p-value of a standard normal test statistic.
pub(crate) fn normal_p_value(z: f64) -> f64 {
    2.0 * pnorm(z.abs(), false)
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
            assert_float_eq!($a, $b, 1e-12);
        };
    }

    const ZS: [f64; 11] = [-30.0, -8.0, -3.5, -1.0, -0.25, 0.0, 0.25, 1.0, 3.5, 8.0, 30.0];

    #[test]
    fn test_probit_cdf() {
        assert_eq!(Probit::cdf(0.0), 0.5);
        float_eq!(Probit::cdf(-1.0), 0.1586552539314570464679);
        float_eq!(Probit::cdf(1.0), 0.8413447460685429257765);
        float_eq!(Probit::cdf(5.0), 0.9999997133484280764648);
        assert_float_eq!(Probit::cdf(-5.0) / 2.866515718791939118538e-07, 1.0, 1e-10);
    }

    #[test]
    fn test_probit_pdf() {
        float_eq!(Probit::pdf(0.0), 0.3989422804014327028632);
        float_eq!(Probit::pdf(1.0), 0.2419707245191433653275);
        float_eq!(Probit::pdf(-1.0), 0.2419707245191433653275);
        float_eq!(Probit::pdf(5.0), 1.486719514734297677895e-6);
    }

    #[test]
    fn test_logit_cdf() {
        assert_eq!(Logit::cdf(0.0), 0.5);
        float_eq!(Logit::cdf(1.0), 0.7310585786300048792512);
        float_eq!(Logit::cdf(-1.0), 0.2689414213699951207488);
        float_eq!(Logit::pdf(0.0), 0.25);
        float_eq!(Logit::pdf(1.0), 0.1966119332414818525374);
    }

    #[test]
    fn test_logit_symmetry() {
        for z in ZS {
            float_eq!(Logit::cdf(z) + Logit::cdf(-z), 1.0);
            float_eq!(Probit::cdf(z) + Probit::cdf(-z), 1.0);
        }
    }

    #[test]
    fn test_pdf_derivative() {
        let h = 1e-6;
        for z in [-3.0, -1.0, -0.3, 0.0, 0.7, 2.0] {
            let numeric = (Probit::pdf(z + h) - Probit::pdf(z - h)) / (2.0 * h);
            assert_float_eq!(Probit::pdf_derivative(z), numeric, 1e-8);
            let numeric = (Logit::pdf(z + h) - Logit::pdf(z - h)) / (2.0 * h);
            assert_float_eq!(Logit::pdf_derivative(z), numeric, 1e-8);
        }
    }

    #[test]
    fn test_mills_ratio() {
        for z in [-5.0, -1.0, 0.0, 0.5, 4.0] {
            assert_float_eq!(Probit::mills_ratio(z), Probit::pdf(z) / Probit::cdf(z), 1e-10);
            assert_float_eq!(Logit::mills_ratio(z), Logit::pdf(z) / Logit::cdf(z), 1e-10);
        }
        let h = 1e-6;
        for z in [-4.0, -1.0, 0.0, 2.0] {
            let numeric = (Probit::mills_ratio(z + h) - Probit::mills_ratio(z - h)) / (2.0 * h);
            assert_float_eq!(Probit::mills_ratio_derivative(z), numeric, 1e-7);
            let numeric = (Logit::mills_ratio(z + h) - Logit::mills_ratio(z - h)) / (2.0 * h);
            assert_float_eq!(Logit::mills_ratio_derivative(z), numeric, 1e-7);
        }
        // finite in the far tail
        assert!(Probit::mills_ratio(-60.0).is_finite());
        assert!(Probit::mills_ratio_derivative(-60.0) < 0.0);
    }

    #[test]
    fn test_tails() {
        for link in [Link::Normal, Link::Logistic] {
            assert_eq!(link.clamped_cdf(-100.0), CDF_EPSILON);
            assert_eq!(link.clamped_cdf(100.0), 1.0 - CDF_EPSILON);
            assert!(link.log_likelihood(1.0, -100.0).is_finite());
            assert!(link.log_likelihood(0.0, 100.0).is_finite());
            assert!(link.score(1.0, -100.0).is_finite());
            assert!(link.fisher_weight(40.0).is_finite());
        }
    }

    #[test]
    fn test_score() {
        let h = 1e-6;
        for link in [Link::Normal, Link::Logistic] {
            for y in [0.0, 1.0] {
                for eta in [-2.0, -0.5, 0.0, 1.5] {
                    let numeric = (link.log_likelihood(y, eta + h)
                        - link.log_likelihood(y, eta - h))
                        / (2.0 * h);
                    assert_float_eq!(link.score(y, eta), numeric, 1e-7);
                    let numeric =
                        (link.score(y, eta + h) - link.score(y, eta - h)) / (2.0 * h);
                    assert_float_eq!(link.score_derivative(y, eta), numeric, 1e-7);
                }
            }
            // generalized residual (y - F) f / (F (1 - F))
            let eta = 0.3;
            let f = link.cdf(eta);
            let expected = (1.0 - f) * link.pdf(eta) / (f * (1.0 - f));
            assert_float_eq!(link.score(1.0, eta), expected, 1e-12);
            let expected = link.pdf(eta).powi(2) / (f * (1.0 - f));
            assert_float_eq!(link.fisher_weight(eta), expected, 1e-12);
        }
    }

    #[test]
    fn test_link_parse() {
        assert_eq!("probit".parse::<Link>().unwrap(), Link::Normal);
        assert_eq!("Normal".parse::<Link>().unwrap(), Link::Normal);
        assert_eq!("logit".parse::<Link>().unwrap(), Link::Logistic);
        assert!(matches!("cauchit".parse::<Link>(), Err(Error::InvalidLink(_))));
        assert_eq!(Link::Logistic.to_string(), "logistic");
        assert_eq!(serde_json::to_string(&Link::Normal).unwrap(), "\"normal\"");
    }

    #[test]
    fn test_normal_p_value() {
        assert_float_eq!(normal_p_value(1.959963984540054), 0.05, 1e-12);
        assert_float_eq!(normal_p_value(-1.959963984540054), 0.05, 1e-12);
        assert_eq!(normal_p_value(0.0), 1.0);
        // far beyond where 1 - Φ(z) would cancel to zero
        assert_float_eq!(normal_p_value(9.0) / 2.257176811907681e-19, 1.0, 1e-12);
    }
}
