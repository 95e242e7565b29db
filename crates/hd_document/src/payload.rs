use serde::{Deserialize, Serialize};

use crate::{Included, IncludedIndex, Links, Meta, Node};

// -----------------------------------------------------------------------------
// PrimaryData

/// The top-level `data` member: one (possibly null) resource or many.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Many(Vec<Node>),
    One(Option<Node>),
}

impl Default for PrimaryData {
    #[inline]
    fn default() -> Self {
        Self::One(None)
    }
}

impl PrimaryData {
    /// Iterates over the primary nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        let (one, many) = match self {
            Self::One(node) => (node.as_ref(), [].as_slice()),
            Self::Many(nodes) => (None, nodes.as_slice()),
        };
        one.into_iter().chain(many)
    }
}

// -----------------------------------------------------------------------------
// Payload

/// A top-level document carrying `data`.
///
/// # Examples
///
/// ```
/// use hd_document::{Included, Node, Payload};
///
/// let payload = Payload::one(Node::reference("articles", "1"), Included::new());
/// assert_eq!(
///     serde_json::to_string(&payload).unwrap(),
///     r#"{"data":{"id":"1","type":"articles"}}"#,
/// );
///
/// let empty = Payload::null();
/// assert_eq!(serde_json::to_string(&empty).unwrap(), r#"{"data":null}"#);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub data: PrimaryData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Payload {
    /// A single-resource document.
    ///
    /// The primary node itself is never repeated in `included`.
    pub fn one(node: Node, mut included: Included) -> Self {
        if let Some(key) = node.key() {
            included.remove(key);
        }
        Self {
            data: PrimaryData::One(Some(node)),
            included: included.into_vec(),
            ..Self::default()
        }
    }

    /// A collection document.
    ///
    /// Primary nodes are never repeated in `included`.
    pub fn many(nodes: Vec<Node>, mut included: Included) -> Self {
        for key in nodes.iter().filter_map(Node::key) {
            included.remove(key);
        }
        Self {
            data: PrimaryData::Many(nodes),
            included: included.into_vec(),
            ..Self::default()
        }
    }

    /// `{"data": null}`.
    #[inline]
    pub fn null() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_links(mut self, links: Links) -> Self {
        self.links = Some(links);
        self
    }

    #[inline]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Whether `data` is an array.
    #[inline]
    pub fn is_many(&self) -> bool {
        matches!(self.data, PrimaryData::Many(_))
    }

    /// Builds a `(type, id)` lookup over `included`.
    #[inline]
    pub fn included_index(&self) -> IncludedIndex<'_> {
        IncludedIndex::new(&self.included)
    }
}
