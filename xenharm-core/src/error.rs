use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    /// Input is well-formed but leaves nothing to compute with
    /// (zero normalization peak, missing fundamental partial).
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
    /// A logarithm or power would be taken outside its domain.
    #[error("domain error: {0}")]
    Domain(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
