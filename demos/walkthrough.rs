//! Fits the linear probability, probit and logit models to the Spector and Mazzeo grade data and
//! prints their summaries, marginal effects and a side by side comparison.
//!
//! Run with `cargo run --example walkthrough`. Log output goes to stderr and the estimator
//! honours `CHOICEUTILS_MAX_ITERATIONS`, `CHOICEUTILS_TOLERANCE` and
//! `CHOICEUTILS_METHOD`.

use choiceutils::{data, Comparison, DesignMatrix, Fit, Link, Lm, MarginMode, MleConfig};

fn main() -> choiceutils::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let config = MleConfig::from_env();
    let design = DesignMatrix::build(&data::spector())?;

    let lpm = Lm::fit(&design)?;
    println!("{}\n", lpm);

    for link in [Link::Normal, Link::Logistic] {
        let fit = Fit::mle(&design, link, &config)?;
        println!("{}\n", fit);
        for mode in [MarginMode::Mean, MarginMode::Average] {
            println!("{}\n", fit.marginal_effects(&design, mode)?);
        }
        println!("{}\n", fit.pred_table(&design, 0.5)?);
    }

    let comparison = Comparison::fit(&design, &config)?;
    println!("{}", comparison);
    Ok(())
}
