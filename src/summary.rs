//! Text tables and JSON export of fitted results.

use std::fmt;

use serde::Serialize;

use crate::{coef::Coef, Comparison, Fit, Lm, MarginalEffects, PredictionTable, Result};

const RULE: &str =
    "==============================================================================";
const THIN_RULE: &str =
    "------------------------------------------------------------------------------";

fn write_coefs(f: &mut fmt::Formatter<'_>, coefs: &[Coef], statistic: &str) -> fmt::Result {
    writeln!(
        f,
        "{:<20} {:>10} {:>10} {:>8} {:>8} {:>9} {:>9}",
        "",
        "coef",
        "std err",
        statistic,
        format!("P>|{}|", statistic),
        "[0.025",
        "0.975]"
    )?;
    writeln!(f, "{}", THIN_RULE)?;
    for c in coefs {
        let (lo, hi) = c.conf_int();
        writeln!(
            f,
            "{:<20} {:>10.4} {:>10.4} {:>8.3} {:>8.3} {:>9.3} {:>9.3}",
            c.label(),
            c.coef(),
            c.std_err(),
            c.statistic(),
            c.p(),
            lo,
            hi
        )?;
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:^78}", format!("{} Regression Results", self.link().model_name()))?;
        writeln!(f, "{}", RULE)?;
        writeln!(
            f,
            "{:<20}{:>19}   {:<20}{:>16}",
            "No. Observations:",
            self.n(),
            "Df Model:",
            self.slopes().len()
        )?;
        writeln!(
            f,
            "{:<20}{:>19}   {:<20}{:>16.4}",
            "Method:",
            self.method().to_string(),
            "Pseudo R-squ.:",
            self.pseudo_r2()
        )?;
        writeln!(
            f,
            "{:<20}{:>19}   {:<20}{:>16.4}",
            "Converged:",
            self.converged(),
            "Log-Likelihood:",
            self.log_likelihood()
        )?;
        writeln!(
            f,
            "{:<20}{:>19}   {:<20}{:>16.4}",
            "Iterations:",
            self.iterations(),
            "LL-Null:",
            self.null_log_likelihood()
        )?;
        writeln!(
            f,
            "{:<20}{:>19.4}   {:<20}{:>16.4e}",
            "AIC:",
            self.aic(),
            "LLR p-value:",
            self.llr_p_value()
        )?;
        writeln!(f, "{}", RULE)?;
        write_coefs(f, self.coefs(), "z")?;
        write!(f, "{}", RULE)?;
        if self.separated() {
            write!(
                f,
                "\nThe outcomes are separated, the estimates diverge and are not identified."
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Lm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:^78}", "Linear Probability Model Results")?;
        writeln!(f, "{}", RULE)?;
        writeln!(
            f,
            "{:<20}{:>19}   {:<20}{:>16.4}",
            "No. Observations:",
            self.n(),
            "R-squared:",
            self.r2()
        )?;
        writeln!(
            f,
            "{:<20}{:>19}   {:<20}{:>16.4}",
            "Df Model:",
            self.m(),
            "Adj. R-squared:",
            self.adj_r2()
        )?;
        writeln!(
            f,
            "{:<20}{:>19}   {:<20}{:>16.4}",
            "Out of [0, 1]:",
            self.out_of_bounds(),
            "Log-Likelihood:",
            self.log_likelihood()
        )?;
        writeln!(f, "{}", RULE)?;
        write_coefs(f, self.coefs(), "t")?;
        write!(f, "{}", RULE)
    }
}

impl fmt::Display for MarginalEffects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:^78}",
            format!("{} Marginal Effects", self.link().model_name())
        )?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "{:<20}{:>19}", "At:", self.mode().to_string())?;
        writeln!(f, "{}", RULE)?;
        write_coefs(f, self.effects(), "z")?;
        write!(f, "{}", RULE)
    }
}

impl fmt::Display for PredictionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<12} {:>10} {:>10}", "", "pred 0", "pred 1")?;
        writeln!(
            f,
            "{:<12} {:>10} {:>10}",
            "actual 0",
            self.get(false, false),
            self.get(false, true)
        )?;
        write!(
            f,
            "{:<12} {:>10} {:>10}",
            "actual 1",
            self.get(true, false),
            self.get(true, true)
        )
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:^78}", "Model Comparison")?;
        writeln!(f, "{}", RULE)?;
        writeln!(f, "{:<20} {:>18} {:>18} {:>18}", "", "LPM", "Probit", "Logit")?;
        writeln!(f, "{}", THIN_RULE)?;
        for (i, name) in self.names().iter().enumerate() {
            writeln!(
                f,
                "{:<20} {:>18.4} {:>18.4} {:>18.4}",
                name,
                self.lpm().coefs()[i].coef(),
                self.probit().coefs()[i].coef(),
                self.logit().coefs()[i].coef()
            )?;
        }
        writeln!(f, "{}", THIN_RULE)?;
        writeln!(f, "Marginal effects at the mean")?;
        for (i, name) in self.names().iter().skip(1).enumerate() {
            writeln!(
                f,
                "{:<20} {:>18.4} {:>18.4} {:>18.4}",
                name,
                self.lpm().marginal_effects()[i].coef(),
                self.probit_margins().effects()[i].coef(),
                self.logit_margins().effects()[i].coef()
            )?;
        }
        writeln!(f, "{}", THIN_RULE)?;
        writeln!(
            f,
            "{:<20} {:>18.4} {:>18.4} {:>18.4}",
            "Log-Likelihood",
            self.lpm().log_likelihood(),
            self.probit().log_likelihood(),
            self.logit().log_likelihood()
        )?;
        writeln!(
            f,
            "{:<20} {:>18.4} {:>18.4} {:>18.4}",
            "Accuracy",
            self.lpm_table().accuracy(),
            self.probit_table().accuracy(),
            self.logit_table().accuracy()
        )?;
        write!(f, "{}", RULE)
    }
}

impl Fit {
    pub fn to_json(&self) -> Result<String> {
        to_json(self)
    }
}

impl Lm {
    pub fn to_json(&self) -> Result<String> {
        to_json(self)
    }
}

impl MarginalEffects {
    pub fn to_json(&self) -> Result<String> {
        to_json(self)
    }
}

impl Comparison {
    pub fn to_json(&self) -> Result<String> {
        to_json(self)
    }
}
