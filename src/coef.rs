use serde::{Deserialize, Serialize};

/// One row of a coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coef {
    label: String,
    coef: f64,
    std_err: f64,
    // z for maximum likelihood fits and marginal effects, t for least squares
    statistic: f64,
    p: f64,
    conf_int: (f64, f64),
}

impl Coef {
    /// `critical` is the two-sided 95% critical value of the reference distribution.
    pub fn new(label: impl ToString, coef: f64, std_err: f64, p: f64, critical: f64) -> Self {
        Coef {
            label: label.to_string(),
            coef,
            std_err,
            statistic: coef / std_err,
            p,
            conf_int: (coef - critical * std_err, coef + critical * std_err),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn coef(&self) -> f64 {
        self.coef
    }

    pub fn std_err(&self) -> f64 {
        self.std_err
    }

    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn conf_int(&self) -> (f64, f64) {
        self.conf_int
    }
}
