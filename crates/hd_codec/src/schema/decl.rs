use core::any::TypeId;
use core::fmt;

use hd_document::{Links, Meta};

use crate::BoxError;
use crate::schema::Resource;

/// Result of a user hook.
pub type HookResult = Result<(), BoxError>;

/// Runs before a value is encoded. May mutate it.
pub type EncodeHook = fn(&mut dyn Resource) -> HookResult;
/// Runs after a value and everything below it has been decoded.
pub type DecodeHook = fn(&mut dyn Resource) -> HookResult;
/// Contributes resource-level `links`.
pub type LinksHook = fn(&dyn Resource) -> Option<Links>;
/// Contributes resource-level `meta`.
pub type MetaHook = fn(&dyn Resource) -> Option<Meta>;
/// Contributes `links` for the named relationship.
pub type RelationshipLinksHook = fn(&dyn Resource, &str) -> Option<Links>;
/// Contributes `meta` for the named relationship.
pub type RelationshipMetaHook = fn(&dyn Resource, &str) -> Option<Meta>;

// -----------------------------------------------------------------------------
// FieldDecl

/// One annotated field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    /// Rust identifier of the field.
    pub ident: &'static str,
    /// Raw directive text, or `None` for an embedded struct.
    pub annotation: Option<&'static str>,
}

impl FieldDecl {
    #[inline]
    pub const fn new(ident: &'static str, annotation: &'static str) -> Self {
        Self {
            ident,
            annotation: Some(annotation),
        }
    }

    #[inline]
    pub const fn embedded(ident: &'static str) -> Self {
        Self {
            ident,
            annotation: None,
        }
    }
}

// -----------------------------------------------------------------------------
// Hooks

/// Optional lifecycle callbacks of a type.
#[derive(Clone, Copy, Default)]
pub struct Hooks {
    pub before_encode: Option<EncodeHook>,
    pub after_decode: Option<DecodeHook>,
    pub links: Option<LinksHook>,
    pub meta: Option<MetaHook>,
    pub relationship_links: Option<RelationshipLinksHook>,
    pub relationship_meta: Option<RelationshipMetaHook>,
}

impl Hooks {
    /// No callbacks at all.
    pub const NONE: Self = Self {
        before_encode: None,
        after_decode: None,
        links: None,
        meta: None,
        relationship_links: None,
        relationship_meta: None,
    };
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_encode", &self.before_encode.is_some())
            .field("after_decode", &self.after_decode.is_some())
            .field("links", &self.links.is_some())
            .field("meta", &self.meta.is_some())
            .field("relationship_links", &self.relationship_links.is_some())
            .field("relationship_meta", &self.relationship_meta.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ModelDecl

/// Static description of an encodable struct.
///
/// Field order is declaration order, and the index of a [`FieldDecl`] in
/// [`fields`](Self::fields) is the index passed to
/// [`Resource::field`](crate::schema::Resource::field).
#[derive(Debug)]
pub struct ModelDecl {
    pub type_path: &'static str,
    pub type_id: fn() -> TypeId,
    pub fields: &'static [FieldDecl],
    pub hooks: Hooks,
}

impl ModelDecl {
    #[inline]
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Short type name, the last segment of [`type_path`](Self::type_path).
    pub fn type_name(&self) -> &'static str {
        match self.type_path.rfind("::") {
            Some(pos) => &self.type_path[pos + 2..],
            None => self.type_path,
        }
    }
}
