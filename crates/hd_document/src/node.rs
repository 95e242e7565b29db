use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{Links, Meta, ResourceKey};

// -----------------------------------------------------------------------------
// Node

/// One resource as it appears on the wire.
///
/// `id` is absent only for resources that do not exist yet (client side
/// creates) or for embedded sub-resources. `ty` is always set on a fully
/// formed node.
///
/// # Examples
///
/// ```
/// use hd_document::Node;
///
/// let node: Node = serde_json::from_str(
///     r#"{"id":"1","type":"articles","attributes":{"title":"Hello"}}"#,
/// ).unwrap();
///
/// assert_eq!(node.id.as_deref(), Some("1"));
/// assert_eq!(node.ty, "articles");
/// assert_eq!(node.attributes["title"], "Hello");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(rename = "client-id", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RelationshipNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Node {
    /// Creates a node with a type and no id.
    #[inline]
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            ..Self::default()
        }
    }

    /// Creates a `{id, type}` resource reference.
    #[inline]
    pub fn reference(ty: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ty: ty.into(),
            ..Self::default()
        }
    }

    /// Sets an attribute.
    #[inline]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Sets a relationship.
    #[inline]
    pub fn with_relationship(mut self, name: impl Into<String>, rel: RelationshipNode) -> Self {
        self.relationships.insert(name.into(), rel);
        self
    }

    /// The `(type, id)` key, if the node has an id.
    #[inline]
    pub fn key(&self) -> Option<ResourceKey<'_>> {
        self.id.as_deref().map(|id| ResourceKey::new(&self.ty, id))
    }

    /// The form of this node used inside `relationships`.
    ///
    /// A node with an id collapses to `{id, type}`. A node without an id
    /// cannot be looked up in `included`, so it is kept whole.
    pub fn shallow(&self) -> Self {
        match &self.id {
            Some(id) => Self::reference(self.ty.clone(), id.clone()),
            None => self.clone(),
        }
    }

    /// Consuming version of [`shallow`](Self::shallow).
    pub fn into_shallow(self) -> Self {
        match self.id {
            Some(id) => Self::reference(self.ty, id),
            None => self,
        }
    }

    /// Whether the node carries nothing but `id` and `type`.
    pub fn is_reference(&self) -> bool {
        self.id.is_some()
            && self.client_id.is_none()
            && self.attributes.is_empty()
            && self.relationships.is_empty()
            && self.links.is_none()
            && self.meta.is_none()
    }
}

// -----------------------------------------------------------------------------
// RelationshipNode

/// A member of `relationships`.
///
/// `data == None` means the `data` key was absent (the relationship is only
/// described by links or meta). An explicit `"data": null` decodes to
/// `Some(RelationData::One(None))`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipNode {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub data: Option<RelationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

fn deserialize_present<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<RelationData>, D::Error> {
    RelationData::deserialize(deserializer).map(Some)
}

impl RelationshipNode {
    /// `{"data": null}`.
    #[inline]
    pub fn null() -> Self {
        Self::new(RelationData::One(None))
    }

    /// `{"data": {...}}`.
    #[inline]
    pub fn one(node: Node) -> Self {
        Self::new(RelationData::One(Some(node)))
    }

    /// `{"data": [...]}`.
    #[inline]
    pub fn many(nodes: Vec<Node>) -> Self {
        Self::new(RelationData::Many(nodes))
    }

    /// A relationship with the given linkage and no links or meta.
    #[inline]
    pub fn new(data: RelationData) -> Self {
        Self {
            data: Some(data),
            links: None,
            meta: None,
        }
    }

    /// Whether the relationship was sent as `"data": null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self.data, Some(RelationData::One(None)))
    }
}

// -----------------------------------------------------------------------------
// RelationData

/// Resource linkage: a single (possibly null) node or an array of nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationData {
    Many(Vec<Node>),
    One(Option<Node>),
}

impl RelationData {
    /// Iterates over the linked nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        let (one, many) = match self {
            Self::One(node) => (node.as_ref(), [].as_slice()),
            Self::Many(nodes) => (None, nodes.as_slice()),
        };
        one.into_iter().chain(many)
    }
}

#[cfg(test)]
mod tests {
    use super::{Node, RelationData, RelationshipNode};

    #[test]
    fn null_and_absent_data_are_distinct() {
        let null: RelationshipNode = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(null.is_null());

        let absent: RelationshipNode =
            serde_json::from_str(r#"{"links":{"related":"/a/1/author"}}"#).unwrap();
        assert_eq!(absent.data, None);

        assert_eq!(serde_json::to_string(&null).unwrap(), r#"{"data":null}"#);
        assert_eq!(serde_json::to_string(&absent).unwrap(), r#"{"links":{"related":"/a/1/author"}}"#);
    }

    #[test]
    fn linkage_shapes() {
        let many: RelationshipNode =
            serde_json::from_str(r#"{"data":[{"id":"1","type":"a"},{"id":"2","type":"a"}]}"#)
                .unwrap();
        let Some(RelationData::Many(nodes)) = &many.data else {
            panic!("expected to-many linkage");
        };
        assert_eq!(nodes.len(), 2);

        let empty: RelationshipNode = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert_eq!(empty.data, Some(RelationData::Many(Vec::new())));

        let one = RelationshipNode::one(Node::reference("people", "9"));
        assert_eq!(
            serde_json::to_string(&one).unwrap(),
            r#"{"data":{"id":"9","type":"people"}}"#
        );
    }

    #[test]
    fn shallow_keeps_id_less_nodes_whole() {
        let full = Node::reference("people", "9").with_attribute("name", "Ada");
        assert!(full.shallow().is_reference());

        let fresh = Node::new("people").with_attribute("name", "Ada");
        assert_eq!(fresh.shallow(), fresh);
        assert!(!fresh.is_reference());
    }
}
