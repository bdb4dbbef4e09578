//! Conversion errors.

/// Error raised while converting a document.
///
/// All variants indicate malformed source input or configuration, not
/// transient conditions. They abort the in-flight conversion; no partial
/// [`ConversionResult`](crate::ConversionResult) is produced.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required parameter was absent for a matched tag occurrence.
    #[error("'{tag}' tag is missing required argument '{argument}'")]
    MissingArgument { tag: String, argument: String },

    /// A parameter was present but its value failed validation, or a
    /// dependent parameter was supplied without its governing parameter.
    #[error("'{tag}' tag has invalid argument '{argument}': {reason}")]
    InvalidArgument {
        tag: String,
        argument: String,
        reason: String,
    },

    /// A container open with no matching close, or a close with no
    /// matching open.
    #[error("unmatched '{tag}' tag at line {line}")]
    UnmatchedTag { tag: String, line: usize },

    /// A configuration referenced a tag kind with no registered schema.
    #[error("unknown processor '{name}'")]
    UnknownProcessor { name: String },

    /// The tag schema file could not be parsed.
    #[error("invalid tag schema: {0}")]
    Schema(#[from] serde_json::Error),

    /// Template compilation or rendering failed.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}
