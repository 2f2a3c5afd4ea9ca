//! Binary outcome regression: the linear probability model, probit and logit fitted by maximum
//! likelihood, and their marginal effects.

mod classify;
mod coef;
mod compare;
mod config;
pub mod data;
mod design;
mod error;
mod linalg;
mod link;
mod lm;
mod margins;
mod mle;
mod norm;
mod summary;

pub use crate::{
    classify::*,
    coef::*,
    compare::*,
    config::*,
    design::*,
    error::*,
    link::*,
    lm::*,
    margins::*,
    mle::*,
};

/// Build the design matrix of `set` and compare the three models on it.
pub fn compare(set: &ObservationSet, config: &MleConfig) -> Result<Comparison> {
    let design = DesignMatrix::build(set)?;
    Comparison::fit(&design, config)
}
