use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// How the curvature of the log likelihood is approximated at each step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// Exact (observed) hessian.
    #[default]
    #[serde(rename = "newton")]
    NewtonRaphson,
    /// Expected information X'WX with W = f^2 / (F (1 - F)).
    #[serde(rename = "fisher")]
    FisherScoring,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::NewtonRaphson => write!(f, "newton"),
            Method::FisherScoring => write!(f, "fisher"),
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "newton" | "newton-raphson" | "nr" => Ok(Method::NewtonRaphson),
            "fisher" | "fisher-scoring" | "irls" => Ok(Method::FisherScoring),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MleConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub method: Method,
}

impl Default for MleConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            method: Method::default(),
        }
    }
}

impl MleConfig {
    /// Defaults, overridden by `CHOICEUTILS_MAX_ITERATIONS`, `CHOICEUTILS_TOLERANCE` and
    /// `CHOICEUTILS_METHOD` when they are set and parse.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_iterations: std::env::var("CHOICEUTILS_MAX_ITERATIONS")
                .ok()
                .and_then(|x| x.parse::<usize>().ok())
                .unwrap_or(default.max_iterations),
            tolerance: std::env::var("CHOICEUTILS_TOLERANCE")
                .ok()
                .and_then(|x| x.parse::<f64>().ok())
                .filter(|x| *x > 0.0)
                .unwrap_or(default.tolerance),
            method: std::env::var("CHOICEUTILS_METHOD")
                .ok()
                .and_then(|x| x.parse::<Method>().ok())
                .unwrap_or(default.method),
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}
