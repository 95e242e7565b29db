use hd_directive::DirectiveError;
use hd_document::Classified;
use serde_json::Value;
use thiserror::Error;

/// Error type returned by user hooks and raw codecs.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

// -----------------------------------------------------------------------------
// CodecError

/// Everything that can go wrong while encoding or decoding a graph.
///
/// All variants abort the current traversal; nothing is retried or skipped.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("malformed directive on `{type_path}.{field}`: {source}")]
    MalformedDirective {
        type_path: &'static str,
        field: &'static str,
        #[source]
        source: DirectiveError,
    },

    #[error("invalid schema for `{type_path}`: {reason}")]
    InvalidSchema {
        type_path: &'static str,
        reason: String,
    },

    #[error("`{type_path}` declares `{name}` as both a relation and a polymorphic relation")]
    ConflictingRelation { type_path: &'static str, name: String },

    #[error("`{value}` is not a valid `{target}` identifier")]
    BadIdentifier { value: String, target: &'static str },

    #[error("no coercion rule for `{target}` behind an optional value (found {found})")]
    UnsupportedPointerTarget {
        target: &'static str,
        found: &'static str,
    },

    #[error("number `{number}` does not fit `{target}`")]
    UnknownNumberKind { number: String, target: &'static str },

    #[error("document is not a representation of `{type_path}`: {detail}")]
    NotARepresentation {
        type_path: &'static str,
        detail: String,
    },

    #[error("`{type_path}` has no resource type; add a name to its primary directive or a `type` field")]
    MissingPrimaryType { type_path: &'static str },

    #[error("choice `{type_path}` has more than one populated candidate: {populated:?}")]
    AmbiguousChoice {
        type_path: &'static str,
        populated: Vec<&'static str>,
    },

    #[error("expected a `{expected}` resource, found `{found}`")]
    ResourceTypeMismatch { expected: String, found: String },

    #[error("document has no primary data")]
    MissingData,

    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid `{target}` value: {reason}")]
    InvalidValue { target: &'static str, reason: String },

    #[error("hook of `{type_path}` failed: {source}")]
    Hook {
        type_path: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// A [`Mismatch`](Self::Mismatch) for the given JSON value.
    #[inline]
    pub fn mismatch(expected: &'static str, found: &Value) -> Self {
        Self::Mismatch {
            expected,
            found: value_kind(found),
        }
    }

    /// Converts a raw kind mismatch into a [`NotARepresentation`] naming the
    /// type being built. Other errors pass through.
    ///
    /// [`NotARepresentation`]: Self::NotARepresentation
    pub fn at_boundary(self, type_path: &'static str) -> Self {
        match self {
            Self::Mismatch { .. } => Self::NotARepresentation {
                type_path,
                detail: self.to_string(),
            },
            other => other,
        }
    }

    /// Whether the error was caused by the input document rather than by the
    /// declared types.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::BadIdentifier { .. }
                | Self::UnsupportedPointerTarget { .. }
                | Self::UnknownNumberKind { .. }
                | Self::NotARepresentation { .. }
                | Self::ResourceTypeMismatch { .. }
                | Self::MissingData
                | Self::Mismatch { .. }
                | Self::InvalidValue { .. }
                | Self::Json(_)
        )
    }
}

/// Name of the JSON kind of `value`, for error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Classified for CodecError {
    fn code(&self) -> &str {
        match self {
            Self::MalformedDirective { .. } => "malformed_directive",
            Self::InvalidSchema { .. } => "invalid_schema",
            Self::ConflictingRelation { .. } => "conflicting_relation",
            Self::BadIdentifier { .. } => "bad_identifier",
            Self::UnsupportedPointerTarget { .. } => "unsupported_pointer_target",
            Self::UnknownNumberKind { .. } => "unknown_number_kind",
            Self::NotARepresentation { .. } | Self::Mismatch { .. } => "not_a_representation",
            Self::MissingPrimaryType { .. } => "missing_primary_type",
            Self::AmbiguousChoice { .. } => "ambiguous_choice",
            Self::ResourceTypeMismatch { .. } => "resource_type_mismatch",
            Self::MissingData => "missing_data",
            Self::InvalidValue { .. } => "invalid_value",
            Self::Hook { .. } => "hook_failed",
            Self::Json(_) => "malformed_document",
            Self::Io(_) => "io",
        }
    }

    fn http_status(&self) -> u16 {
        match self {
            Self::ResourceTypeMismatch { .. } => 409,
            _ if self.is_client_error() => 400,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use hd_document::{Classified, ErrorObject};
    use serde_json::json;

    use super::CodecError;

    #[test]
    fn mismatch_becomes_not_a_representation() {
        let err = CodecError::mismatch("string", &json!(12)).at_boundary("blog::Article");
        let CodecError::NotARepresentation { type_path, detail } = &err else {
            panic!("unexpected {err:?}");
        };
        assert_eq!(*type_path, "blog::Article");
        assert_eq!(detail, "expected string, found number");

        let other = CodecError::MissingData.at_boundary("blog::Article");
        assert!(matches!(other, CodecError::MissingData));
    }

    #[test]
    fn classified_statuses() {
        let bad_id = CodecError::BadIdentifier {
            value: "abc".into(),
            target: "u64",
        };
        assert_eq!(bad_id.http_status(), 400);
        assert_eq!(bad_id.code(), "bad_identifier");

        let conflict = CodecError::ResourceTypeMismatch {
            expected: "articles".into(),
            found: "people".into(),
        };
        assert_eq!(conflict.http_status(), 409);

        let schema = CodecError::MissingPrimaryType { type_path: "x::Y" };
        let objects = ErrorObject::from_classified(&schema);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].status.as_deref(), Some("500"));
        assert_eq!(objects[0].code.as_deref(), Some("missing_primary_type"));
    }
}
