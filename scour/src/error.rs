use thiserror::Error;

/// Configuration errors reported at policy-construction time.
///
/// Sanitization itself never fails; a malformed input degrades to escaped
/// or stripped output instead of surfacing an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("contradictory policy: all tags are allowed but strip_tags is set")]
    ContradictoryTagPolicy,

    #[error("invalid protocol scheme: {0:?}")]
    InvalidProtocol(String),
}

pub type Result<T> = std::result::Result<T, PolicyError>;
