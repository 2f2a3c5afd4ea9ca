use serde::Serialize;
use tracing::info;

use crate::{
    DesignMatrix, Fit, Link, Lm, MarginMode, MarginalEffects, MleConfig, PredictionTable, Result,
};

/// Classification threshold used for the comparison's prediction tables.
pub const THRESHOLD: f64 = 0.5;

/// The linear probability, probit and logit models fitted on the same design.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    names: Vec<String>,
    lpm: Lm,
    probit: Fit,
    logit: Fit,
    probit_margins: MarginalEffects,
    logit_margins: MarginalEffects,
    lpm_table: PredictionTable,
    probit_table: PredictionTable,
    logit_table: PredictionTable,
}

impl Comparison {
    /// Fit the three models concurrently. Marginal effects are taken at the mean.
    #[tracing::instrument(skip(design, config), fields(n = design.nrows(), m = design.n_regressors()))]
    pub fn fit(design: &DesignMatrix, config: &MleConfig) -> Result<Self> {
        let (lpm, (probit, logit)) = rayon::join(
            || Lm::fit(design),
            || {
                rayon::join(
                    || Fit::mle(design, Link::Normal, config),
                    || Fit::mle(design, Link::Logistic, config),
                )
            },
        );
        let (lpm, probit, logit) = (lpm?, probit?, logit?);
        let probit_margins = probit.marginal_effects(design, MarginMode::Mean)?;
        let logit_margins = logit.marginal_effects(design, MarginMode::Mean)?;
        let lpm_table = lpm.pred_table(design, THRESHOLD);
        let probit_table = probit.pred_table(design, THRESHOLD)?;
        let logit_table = logit.pred_table(design, THRESHOLD)?;
        info!(
            lpm = lpm_table.accuracy(),
            probit = probit_table.accuracy(),
            logit = logit_table.accuracy(),
            "Fitted model comparison"
        );
        Ok(Self {
            names: design.colnames().to_vec(),
            lpm,
            probit,
            logit,
            probit_margins,
            logit_margins,
            lpm_table,
            probit_table,
            logit_table,
        })
    }

    /// Design column labels, the intercept first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn lpm(&self) -> &Lm {
        &self.lpm
    }

    pub fn probit(&self) -> &Fit {
        &self.probit
    }

    pub fn logit(&self) -> &Fit {
        &self.logit
    }

    pub fn probit_margins(&self) -> &MarginalEffects {
        &self.probit_margins
    }

    pub fn logit_margins(&self) -> &MarginalEffects {
        &self.logit_margins
    }

    pub fn lpm_table(&self) -> &PredictionTable {
        &self.lpm_table
    }

    pub fn probit_table(&self) -> &PredictionTable {
        &self.probit_table
    }

    pub fn logit_table(&self) -> &PredictionTable {
        &self.logit_table
    }

    /// Whether both maximum likelihood fits converged.
    pub fn converged(&self) -> bool {
        self.probit.converged() && self.logit.converged()
    }
}
