use core::fmt;

use hashbrown::{Equivalent, HashMap, HashSet};

use crate::Node;

// -----------------------------------------------------------------------------
// ResourceKey

/// The `(type, id)` identity of a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceKey<'a> {
    pub ty: &'a str,
    pub id: &'a str,
}

impl<'a> ResourceKey<'a> {
    #[inline]
    pub const fn new(ty: &'a str, id: &'a str) -> Self {
        Self { ty, id }
    }
}

impl fmt::Display for ResourceKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ty, self.id)
    }
}

// Hashes exactly like `ResourceKey`, so borrowed keys can probe owned ones.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct OwnedKey {
    ty: String,
    id: String,
}

impl From<ResourceKey<'_>> for OwnedKey {
    #[inline]
    fn from(key: ResourceKey<'_>) -> Self {
        Self {
            ty: key.ty.to_owned(),
            id: key.id.to_owned(),
        }
    }
}

impl Equivalent<OwnedKey> for ResourceKey<'_> {
    #[inline]
    fn equivalent(&self, key: &OwnedKey) -> bool {
        self.ty == key.ty && self.id == key.id
    }
}

// -----------------------------------------------------------------------------
// Included

/// The `included` accumulator of a compound document.
///
/// Holds at most one node per `(type, id)`. The first node inserted for a key
/// wins; later duplicates are dropped, which makes sideloading idempotent.
/// Nodes without an id have no key and are never accepted.
///
/// # Examples
///
/// ```
/// use hd_document::{Included, Node, ResourceKey};
///
/// let mut included = Included::new();
/// assert!(included.insert(Node::reference("people", "9").with_attribute("name", "Ada")));
/// assert!(!included.insert(Node::reference("people", "9")));
///
/// assert_eq!(included.len(), 1);
/// assert!(included.contains(ResourceKey::new("people", "9")));
/// assert_eq!(included.iter().next().unwrap().attributes["name"], "Ada");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Included {
    nodes: Vec<Node>,
    keys: HashSet<OwnedKey>,
}

impl Included {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node unless its key is already present.
    ///
    /// Returns `true` if the node was added.
    pub fn insert(&mut self, node: Node) -> bool {
        let key = match node.key() {
            Some(key) if self.keys.contains(&key) => {
                log::debug!("dropping duplicate included resource `{key}`");
                return false;
            }
            Some(key) => OwnedKey::from(key),
            None => {
                log::debug!("refusing to include `{}` resource without id", node.ty);
                return false;
            }
        };

        self.keys.insert(key);
        self.nodes.push(node);
        true
    }

    /// Whether a node with the given key has been included.
    #[inline]
    pub fn contains(&self, key: ResourceKey<'_>) -> bool {
        self.keys.contains(&key)
    }

    /// Removes the node with the given key.
    pub fn remove(&mut self, key: ResourceKey<'_>) -> Option<Node> {
        if !self.keys.remove(&key) {
            return None;
        }
        let pos = self.nodes.iter().position(|node| node.key() == Some(key))?;
        Some(self.nodes.remove(pos))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over the nodes in insertion order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns the nodes in insertion order.
    #[inline]
    pub fn into_vec(self) -> Vec<Node> {
        self.nodes
    }
}

impl Extend<Node> for Included {
    fn extend<T: IntoIterator<Item = Node>>(&mut self, iter: T) {
        for node in iter {
            self.insert(node);
        }
    }
}

impl FromIterator<Node> for Included {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        let mut included = Self::new();
        included.extend(iter);
        included
    }
}

// -----------------------------------------------------------------------------
// IncludedIndex

// Lets keys of any lifetime probe the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct IndexKey<'a>(ResourceKey<'a>);

impl<'a> Equivalent<IndexKey<'a>> for ResourceKey<'_> {
    #[inline]
    fn equivalent(&self, key: &IndexKey<'a>) -> bool {
        self.ty == key.0.ty && self.id == key.0.id
    }
}

/// Borrowed `(type, id)` lookup table over the `included` of a decoded document.
#[derive(Clone, Debug, Default)]
pub struct IncludedIndex<'a> {
    nodes: HashMap<IndexKey<'a>, &'a Node>,
}

impl<'a> IncludedIndex<'a> {
    /// Indexes the given nodes; for duplicate keys the first node wins.
    pub fn new(nodes: &'a [Node]) -> Self {
        let mut map = HashMap::with_capacity(nodes.len());
        for node in nodes {
            if let Some(key) = node.key() {
                map.entry(IndexKey(key)).or_insert(node);
            }
        }
        Self { nodes: map }
    }

    /// Looks up a node by type and id.
    #[inline]
    pub fn get(&self, key: ResourceKey<'_>) -> Option<&'a Node> {
        self.nodes.get(&key).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Included, IncludedIndex, ResourceKey};
    use crate::Node;

    #[test]
    fn first_writer_wins() {
        let mut included = Included::new();
        included.insert(Node::reference("a", "1").with_attribute("v", 1));
        included.insert(Node::reference("a", "1").with_attribute("v", 2));
        included.insert(Node::reference("b", "1"));
        included.insert(Node::new("a"));

        let nodes = included.into_vec();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].attributes["v"], 1);
        assert_eq!(nodes[1].ty, "b");
    }

    #[test]
    fn remove_by_key() {
        let mut included: Included = [Node::reference("a", "1"), Node::reference("a", "2")]
            .into_iter()
            .collect();
        assert!(included.remove(ResourceKey::new("a", "1")).is_some());
        assert!(included.remove(ResourceKey::new("a", "1")).is_none());
        assert!(!included.contains(ResourceKey::new("a", "1")));
        assert_eq!(included.len(), 1);
    }

    #[test]
    fn index_lookup() {
        let nodes = vec![
            Node::reference("people", "1").with_attribute("name", "Ada"),
            Node::reference("people", "1").with_attribute("name", "Bob"),
            Node::new("people"),
        ];
        let index = IncludedIndex::new(&nodes);
        assert_eq!(index.len(), 1);

        let id = String::from("1");
        let found = index.get(ResourceKey::new("people", &id)).unwrap();
        assert_eq!(found.attributes["name"], "Ada");
        assert!(index.get(ResourceKey::new("people", "2")).is_none());
    }
}
