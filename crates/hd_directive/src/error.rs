use thiserror::Error;

use crate::DirectiveKind;

// -----------------------------------------------------------------------------
// DirectiveError

/// Reasons an annotation string cannot be turned into a [`Directive`].
///
/// [`Directive`]: crate::Directive
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DirectiveError {
    #[error("empty directive annotation")]
    Empty,

    #[error("unknown directive kind `{0}`")]
    UnknownKind(String),

    #[error("directive `{0}` has an empty name after `:`")]
    EmptyName(DirectiveKind),

    #[error("directive `{0}` requires a name")]
    MissingName(DirectiveKind),

    #[error("directive `{annotation}` carries more than one time format")]
    ConflictingTimeFormats { annotation: String },
}
