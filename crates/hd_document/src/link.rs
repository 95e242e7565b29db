use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form `meta` object.
pub type Meta = Map<String, Value>;

/// A `links` object, keyed by link name (`self`, `related`, ...).
pub type Links = BTreeMap<String, Link>;

// -----------------------------------------------------------------------------
// Link

/// A single link: either a bare URL or an object with `href` and `meta`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Link {
    Href(String),
    Object(LinkObject),
}

/// The object form of a [`Link`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkObject {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Link {
    /// Returns the target URL.
    #[inline]
    pub fn href(&self) -> &str {
        match self {
            Self::Href(href) => href,
            Self::Object(obj) => &obj.href,
        }
    }
}

impl From<String> for Link {
    #[inline]
    fn from(href: String) -> Self {
        Self::Href(href)
    }
}

impl From<&str> for Link {
    #[inline]
    fn from(href: &str) -> Self {
        Self::Href(href.to_owned())
    }
}
