//! Selective sideloading.

use core::convert::Infallible;
use core::str::FromStr;
use std::collections::BTreeMap;

/// A parsed `include` parameter.
///
/// `"author,comments.author"` becomes a tree with `author` and `comments`
/// children, the latter with an `author` child of its own. A relationship is
/// sideloaded when its name is a child of the tree at its position; the child
/// is the tree its target is visited with.
///
/// # Examples
///
/// ```
/// use hd_codec::include::IncludeTree;
///
/// let tree = IncludeTree::parse("author, comments.author");
/// assert!(tree.contains("author"));
/// assert!(!tree.contains("tags"));
///
/// let comments = tree.child("comments").unwrap();
/// assert!(comments.contains("author"));
/// assert!(tree.child("author").unwrap().is_empty());
///
/// let all = IncludeTree::all();
/// assert!(all.child("anything").unwrap().contains("deeper"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncludeTree {
    all: bool,
    children: BTreeMap<String, IncludeTree>,
}

static NONE: IncludeTree = IncludeTree::none();

impl IncludeTree {
    /// Includes nothing.
    #[inline]
    pub const fn none() -> Self {
        Self {
            all: false,
            children: BTreeMap::new(),
        }
    }

    /// Includes every relationship at every depth.
    #[inline]
    pub const fn all() -> Self {
        Self {
            all: true,
            children: BTreeMap::new(),
        }
    }

    /// A shared empty tree.
    #[inline]
    pub fn empty() -> &'static Self {
        &NONE
    }

    /// Parses a comma separated list of dot separated relationship paths.
    ///
    /// Blank entries and empty segments are skipped.
    pub fn parse(param: &str) -> Self {
        Self::from_paths(param.split(','))
    }

    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::none();
        for path in paths {
            tree.insert_path(path.as_ref());
        }
        tree
    }

    /// Adds one dot separated path.
    pub fn insert_path(&mut self, path: &str) {
        let mut node = self;
        for segment in path.split('.').map(str::trim).filter(|s| !s.is_empty()) {
            node = node.children.entry(segment.to_owned()).or_default();
        }
    }

    /// The subtree for relationship `name`, or `None` if it is not included.
    #[inline]
    pub fn child(&self, name: &str) -> Option<&IncludeTree> {
        if self.all {
            Some(self)
        } else {
            self.children.get(name)
        }
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    #[inline]
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Whether nothing is included below this point.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.all && self.children.is_empty()
    }
}

impl FromStr for IncludeTree {
    type Err = Infallible;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
