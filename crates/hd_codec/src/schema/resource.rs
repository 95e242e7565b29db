use core::any::Any;

use crate::coerce::{AttrSlot, Identifier};
use crate::relation::{PolySlot, RelationSlot};
use crate::schema::ModelDecl;

// -----------------------------------------------------------------------------
// Field handles

/// Shared handle to one declared field.
///
/// Relationships have no shared handle; nothing reads them without the
/// ability to run `before_encode` hooks on the targets.
pub enum FieldRef<'a> {
    /// `primary`, `type` or `client_id`.
    Key(&'a dyn Identifier),
    /// `attr`, `links` or `meta`.
    Value(&'a dyn AttrSlot),
    Relationship,
    Embedded(&'a dyn Resource),
}

/// Exclusive handle to one declared field.
pub enum FieldMut<'a> {
    /// `primary`, `type` or `client_id`.
    Key(&'a mut dyn Identifier),
    /// `attr`, `links` or `meta`.
    Value(&'a mut dyn AttrSlot),
    Relation(&'a mut dyn RelationSlot),
    Poly(&'a mut dyn PolySlot),
    Embedded(&'a mut dyn Resource),
}

impl FieldMut<'_> {
    /// Name of the handle variant, for error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Key(_) => "key",
            Self::Value(_) => "value",
            Self::Relation(_) => "relation",
            Self::Poly(_) => "polymorphic relation",
            Self::Embedded(_) => "embedded struct",
        }
    }
}

// -----------------------------------------------------------------------------
// Resource

/// Object-safe access to the declared fields of a struct.
///
/// Implemented by `#[derive(Resource)]`. The index passed to
/// [`field`](Self::field) and [`field_mut`](Self::field_mut) is the position
/// of the field in [`ModelDecl::fields`].
pub trait Resource: Any {
    fn declaration(&self) -> &'static ModelDecl;

    fn field(&self, index: usize) -> Option<FieldRef<'_>>;

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A [`Resource`] with a statically known declaration that can be created
/// empty.
pub trait Model: Resource + Default {
    const DECLARATION: &'static ModelDecl;
}

/// Boxed values are transparent: the box reports the declaration of its
/// content and downcasts to it.
impl<T: Resource + ?Sized> Resource for Box<T> {
    #[inline]
    fn declaration(&self) -> &'static ModelDecl {
        (**self).declaration()
    }

    #[inline]
    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        (**self).field(index)
    }

    #[inline]
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        (**self).field_mut(index)
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        (**self).as_any_mut()
    }
}

impl<T: Model> Model for Box<T> {
    const DECLARATION: &'static ModelDecl = T::DECLARATION;
}

// -----------------------------------------------------------------------------
// Choice

/// A closed set of candidate types behind one polymorphic relation.
///
/// Each candidate is an optional slot; at most one is populated at a time.
/// Implemented by `#[derive(Choice)]`.
pub trait Choice: Any {
    fn type_path(&self) -> &'static str;

    /// Declarations of the candidate types, in declaration order.
    fn candidates(&self) -> &'static [&'static ModelDecl];

    /// The populated value of candidate `index`, if any.
    fn candidate_mut(&mut self, index: usize) -> Option<&mut dyn Resource>;

    /// Clears every candidate, then populates candidate `index` with an empty
    /// value and returns it.
    fn select(&mut self, index: usize) -> Option<&mut dyn Resource>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A [`Choice`] with statically known candidates that can be created empty.
pub trait ChoiceModel: Choice + Default {
    const CANDIDATES: &'static [&'static ModelDecl];
}

/// One candidate slot of a [`Choice`]: `Option<T>` or `Option<Box<T>>`.
pub trait Candidate {
    const DECLARATION: &'static ModelDecl;

    fn get_mut(&mut self) -> Option<&mut dyn Resource>;

    fn select(&mut self) -> &mut dyn Resource;

    fn clear(&mut self);
}

impl<T: Model> Candidate for Option<T> {
    const DECLARATION: &'static ModelDecl = T::DECLARATION;

    #[inline]
    fn get_mut(&mut self) -> Option<&mut dyn Resource> {
        self.as_mut().map(|value| value as &mut dyn Resource)
    }

    #[inline]
    fn select(&mut self) -> &mut dyn Resource {
        self.insert(T::default())
    }

    #[inline]
    fn clear(&mut self) {
        *self = None;
    }
}
