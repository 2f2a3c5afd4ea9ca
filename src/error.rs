#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("expected {expected} regressors, found {found}")]
    Dimension { expected: usize, found: usize },
    #[error("missing value for {column} in observation {row}")]
    MissingValue { row: usize, column: String },
    #[error("outcome of observation {row} is {value}, expected 0 or 1")]
    NonBinaryOutcome { row: usize, value: f64 },
    #[error("no observations")]
    Empty,
    #[error("X'X is singular")]
    SingularMatrix,
    #[error("hessian is singular at iteration {iteration}")]
    SingularHessian { iteration: usize },
    #[error("did not converge after {iterations} iterations")]
    ConvergenceFailure { iterations: usize },
    #[error("invalid link function: {0}")]
    InvalidLink(String),
    #[error("invalid estimation method: {0}")]
    InvalidMethod(String),
    #[error("invalid marginal effects mode: {0}")]
    InvalidMarginMode(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
