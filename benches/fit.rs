use std::fmt::Debug;

use choiceutils::{DesignMatrix, Fit, Link, Lm, MarginMode, Method, MleConfig};
use diol::prelude::*;
use rand::SeedableRng;
use rand_distr::Distribution;

#[derive(Clone)]
struct Arg {
    nrow: usize,
    ncol: usize,
    design: DesignMatrix,
}

impl Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arg")
            .field("nrow", &self.nrow)
            .field("ncol", &self.ncol)
            .finish()
    }
}

fn main() -> std::io::Result<()> {
    let mut bench = Bench::new(BenchConfig::from_args()?);
    let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    let args = [2, 3, 4].iter().flat_map(|len| {
        let nrow = 10_usize.pow(*len);
        [2, 5, 10]
            .iter()
            .map(|ncol| {
                let ncol = *ncol;
                let normal = statrs::distribution::Normal::new(0.0, 1.0).unwrap();
                let xs = (0..nrow * ncol)
                    .map(|_| -> f64 { normal.sample(&mut rng) })
                    .collect::<Vec<_>>();
                // latent index with unit slopes keeps the classes overlapping
                let ys = (0..nrow)
                    .map(|i| {
                        let index = (0..ncol).map(|j| xs[j * nrow + i]).sum::<f64>()
                            / (ncol as f64).sqrt();
                        let noise: f64 = normal.sample(&mut rng);
                        if index + noise > 0.0 {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect::<Vec<_>>();
                let names = (0..ncol).map(|j| format!("x{}", j)).collect::<Vec<_>>();
                let columns = (0..ncol)
                    .map(|j| (names[j].as_str(), &xs[j * nrow..(j + 1) * nrow]))
                    .collect::<Vec<_>>();
                let design = DesignMatrix::from_columns(&ys, &columns).unwrap();
                Arg { nrow, ncol, design }
            })
            .collect::<Vec<_>>()
    });
    bench.register_many(
        list![lpm, probit_newton, logit_newton, logit_fisher, logit_margins],
        args,
    );
    bench.run()?;
    Ok(())
}

fn lpm(bencher: Bencher, Arg { design, .. }: Arg) {
    bencher.bench(|| {
        let _ = Lm::fit(&design);
    });
}

fn probit_newton(bencher: Bencher, Arg { design, .. }: Arg) {
    bencher.bench(|| {
        let _ = Fit::mle(&design, Link::Normal, &MleConfig::default());
    });
}

fn logit_newton(bencher: Bencher, Arg { design, .. }: Arg) {
    bencher.bench(|| {
        let _ = Fit::mle(&design, Link::Logistic, &MleConfig::default());
    });
}

fn logit_fisher(bencher: Bencher, Arg { design, .. }: Arg) {
    let config = MleConfig::default().with_method(Method::FisherScoring);
    bencher.bench(|| {
        let _ = Fit::mle(&design, Link::Logistic, &config);
    });
}

fn logit_margins(bencher: Bencher, Arg { design, .. }: Arg) {
    let fit = Fit::logit(&design).unwrap();
    bencher.bench(|| {
        let _ = fit.marginal_effects(&design, MarginMode::Average);
    });
}
