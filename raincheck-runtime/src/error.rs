use raincheck::RunError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error("{0} threshold(s) exceeded")]
    ThresholdsExceeded(usize),
}
