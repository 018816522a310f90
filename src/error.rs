use thiserror::Error;

pub type Result<T> = std::result::Result<T, LarsError>;

#[derive(Error, Debug, Clone)]
pub enum LarsError {
    #[error(transparent)]
    BaseCrate(#[from] linfa::Error),
    #[error("epsilon must be non-negative")]
    InvalidEpsilon,
    #[error("maximum number of steps must be positive")]
    InvalidMaxSteps,
    #[error("gram matrix of the active features is not positive definite")]
    IllConditioned,
}
