use thiserror::Error;

/// Errors produced while flattening or tabularizing hierarchical input
#[derive(Debug, Error)]
pub enum Error {
    /// A value handed to the flattener is not an object, array or scalar
    #[error("invalid node kind at '{path}': {reason}")]
    InvalidNodeKind { path: String, reason: String },

    /// The top-level payload could not be decoded into records
    #[error("invalid input format: {0}")]
    InvalidInputFormat(String),

    /// Nesting went deeper than `FlattenConfig::max_depth`
    #[error("nesting depth exceeds limit of {max_depth} at '{path}'")]
    DepthLimitExceeded { path: String, max_depth: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
