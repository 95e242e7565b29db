use core::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::Meta;

/// The [`Classified::code`] of validation failures.
pub const VALIDATION_CODE: &str = "validation";

// -----------------------------------------------------------------------------
// Classified

/// One field-level problem reported by a validation error.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorDetail {
    pub field: String,
    pub code: String,
    pub message: String,
    pub value: Option<Value>,
}

/// The narrow contract an application error must provide to be rendered as
/// [`ErrorObject`]s.
///
/// Errors whose [`is_validation`](Self::is_validation) is `true` expand into
/// one object per [`ErrorDetail`]; all other errors collapse into a single
/// object carrying the error's [`Display`] text.
pub trait Classified: Display {
    /// Stable machine readable code.
    fn code(&self) -> &str;

    /// HTTP status the error maps to.
    fn http_status(&self) -> u16;

    /// Field-level details; usually empty for non-validation errors.
    fn details(&self) -> Vec<ErrorDetail> {
        Vec::new()
    }

    fn is_validation(&self) -> bool {
        self.code() == VALIDATION_CODE
    }
}

// -----------------------------------------------------------------------------
// ErrorObject

/// Where in the request an error originated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSource {
    /// JSON pointer into the request document, e.g. `/data/attributes/title`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    /// Name of the offending query parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// A member of the top-level `errors` array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl ErrorObject {
    /// Renders an application error.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::fmt;
    /// use hd_document::{Classified, ErrorDetail, ErrorObject};
    ///
    /// struct Invalid;
    ///
    /// impl fmt::Display for Invalid {
    ///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    ///         f.write_str("invalid article")
    ///     }
    /// }
    ///
    /// impl Classified for Invalid {
    ///     fn code(&self) -> &str { "validation" }
    ///     fn http_status(&self) -> u16 { 422 }
    ///     fn details(&self) -> Vec<ErrorDetail> {
    ///         ["title", "body"].map(|field| ErrorDetail {
    ///             field: field.into(),
    ///             code: "blank".into(),
    ///             message: format!("{field} must not be blank"),
    ///             value: None,
    ///         }).into()
    ///     }
    /// }
    ///
    /// let objects = ErrorObject::from_classified(&Invalid);
    /// assert_eq!(objects.len(), 2);
    /// assert_eq!(
    ///     objects[1].source.as_ref().unwrap().pointer.as_deref(),
    ///     Some("/data/attributes/body"),
    /// );
    /// ```
    pub fn from_classified(error: &dyn Classified) -> Vec<Self> {
        let status = error.http_status();
        let details = if error.is_validation() {
            error.details()
        } else {
            Vec::new()
        };

        if details.is_empty() {
            return vec![Self::generic(status, error.code(), error.to_string())];
        }

        details
            .into_iter()
            .map(|detail| {
                let meta = detail.value.map(|value| {
                    let mut meta = Meta::new();
                    meta.insert("value".into(), value);
                    meta
                });
                Self {
                    id: Some(Uuid::new_v4().to_string()),
                    status: Some(status.to_string()),
                    code: Some(detail.code),
                    title: Some(reason_phrase(status).into()),
                    detail: Some(detail.message),
                    source: Some(ErrorSource {
                        pointer: Some(format!("/data/attributes/{}", detail.field)),
                        parameter: None,
                    }),
                    meta,
                }
            })
            .collect()
    }

    fn generic(status: u16, code: &str, detail: String) -> Self {
        Self {
            id: Some(Uuid::new_v4().to_string()),
            status: Some(status.to_string()),
            code: Some(code.to_owned()),
            title: Some(reason_phrase(status).into()),
            detail: Some(detail),
            source: None,
            meta: None,
        }
    }
}

/// Standard reason phrase of the HTTP statuses errors commonly map to.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        409 => "Conflict",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        400..=499 => "Client Error",
        _ => "Server Error",
    }
}

// -----------------------------------------------------------------------------
// ErrorsPayload

/// A top-level document carrying `errors`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorsPayload {
    pub errors: Vec<ErrorObject>,
}

impl ErrorsPayload {
    /// Renders every error with [`ErrorObject::from_classified`].
    pub fn from_classified<'a>(errors: impl IntoIterator<Item = &'a dyn Classified>) -> Self {
        Self {
            errors: errors
                .into_iter()
                .flat_map(ErrorObject::from_classified)
                .collect(),
        }
    }
}
