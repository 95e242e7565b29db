//! Relationship slots.
//!
//! The Rust shape of a relation field decides its cardinality:
//!
//! | field type                               | cardinality |
//! |------------------------------------------|-------------|
//! | `Option<T>`, `Option<Box<T>>`            | to-one      |
//! | [`Nullable<T>`]                          | to-one      |
//! | `Vec<T>`, `Vec<Box<T>>`                  | to-many     |
//!
//! `T` is a [`Model`] for `relation` fields (`Box<T>` is a model whenever `T`
//! is) and a [`ChoiceModel`] for `poly_relation` fields.
//!
//! `Option<T>` cannot tell "not loaded" from "explicitly empty", so `None`
//! encodes as `data: null`. [`Nullable::Absent`] omits the relationship
//! member entirely.

use serde_json::Value;

use crate::CodecError;
use crate::coerce::{AttrContext, Attribute};
use crate::schema::{Choice, ChoiceModel, Model, ModelDecl, Resource};

// -----------------------------------------------------------------------------
// Nullable

/// A value that distinguishes "absent" from "null".
///
/// As an attribute, [`Absent`](Self::Absent) is not written and
/// [`Null`](Self::Null) is written as `null`. As a relation,
/// [`Absent`](Self::Absent) omits the relationship member and
/// [`Null`](Self::Null) writes `data: null`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Nullable<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Nullable<T> {
    #[inline]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub const fn as_ref(&self) -> Nullable<&T> {
        match self {
            Self::Absent => Nullable::Absent,
            Self::Null => Nullable::Null,
            Self::Value(value) => Nullable::Value(value),
        }
    }

    #[inline]
    pub fn as_mut(&mut self) -> Nullable<&mut T> {
        match self {
            Self::Absent => Nullable::Absent,
            Self::Null => Nullable::Null,
            Self::Value(value) => Nullable::Value(value),
        }
    }

    /// The value, if any.
    #[inline]
    pub fn value(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn insert(&mut self, value: T) -> &mut T {
        *self = Self::Value(value);
        match self {
            Self::Value(value) => value,
            Self::Absent | Self::Null => unreachable!(),
        }
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Null,
        }
    }
}

impl<T: Attribute> Attribute for Nullable<T> {
    fn encode(&self, cx: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        match self {
            Self::Absent => Ok(None),
            Self::Null => Ok(Some(Value::Null)),
            Self::Value(value) => value.encode(cx),
        }
    }

    fn decode(value: Value, cx: &AttrContext<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Null => Ok(Self::Null),
            value => T::decode(value, cx).map(Self::Value),
        }
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        !matches!(self, Self::Value(_))
    }
}

// -----------------------------------------------------------------------------
// Linkage

/// To-one or to-many.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cardinality {
    One,
    Many,
}

impl Cardinality {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::One => "to-one",
            Self::Many => "to-many",
        }
    }
}

/// The current content of a relation field.
pub enum Linkage<'a, T: ?Sized> {
    /// Not loaded; the relationship member is omitted.
    Absent,
    /// Explicitly empty to-one.
    Null,
    One(&'a mut T),
    Many(Vec<&'a mut T>),
}

// -----------------------------------------------------------------------------
// RelationSlot

/// A `relation` field.
pub trait RelationSlot {
    fn cardinality(&self) -> Cardinality;

    /// Declaration of the target type.
    fn target(&self) -> &'static ModelDecl;

    fn linkage(&mut self) -> Linkage<'_, dyn Resource>;

    /// Empties the slot: `None`, [`Nullable::Null`] or an empty `Vec`.
    fn set_null(&mut self);

    /// Adds a default target value and returns it. To-one slots are
    /// overwritten; to-many slots grow by one.
    fn insert_default(&mut self) -> &mut dyn Resource;
}

impl<T: Model> RelationSlot for Option<T> {
    #[inline]
    fn cardinality(&self) -> Cardinality {
        Cardinality::One
    }

    #[inline]
    fn target(&self) -> &'static ModelDecl {
        T::DECLARATION
    }

    fn linkage(&mut self) -> Linkage<'_, dyn Resource> {
        match self {
            Some(value) => Linkage::One(value),
            None => Linkage::Null,
        }
    }

    #[inline]
    fn set_null(&mut self) {
        *self = None;
    }

    #[inline]
    fn insert_default(&mut self) -> &mut dyn Resource {
        self.insert(T::default())
    }
}

impl<T: Model> RelationSlot for Nullable<T> {
    #[inline]
    fn cardinality(&self) -> Cardinality {
        Cardinality::One
    }

    #[inline]
    fn target(&self) -> &'static ModelDecl {
        T::DECLARATION
    }

    fn linkage(&mut self) -> Linkage<'_, dyn Resource> {
        match self {
            Self::Absent => Linkage::Absent,
            Self::Null => Linkage::Null,
            Self::Value(value) => Linkage::One(value),
        }
    }

    #[inline]
    fn set_null(&mut self) {
        *self = Self::Null;
    }

    #[inline]
    fn insert_default(&mut self) -> &mut dyn Resource {
        self.insert(T::default())
    }
}

impl<T: Model> RelationSlot for Vec<T> {
    #[inline]
    fn cardinality(&self) -> Cardinality {
        Cardinality::Many
    }

    #[inline]
    fn target(&self) -> &'static ModelDecl {
        T::DECLARATION
    }

    fn linkage(&mut self) -> Linkage<'_, dyn Resource> {
        Linkage::Many(self.iter_mut().map(|value| value as &mut dyn Resource).collect())
    }

    #[inline]
    fn set_null(&mut self) {
        self.clear();
    }

    fn insert_default(&mut self) -> &mut dyn Resource {
        self.push(T::default());
        let last = self.len() - 1;
        &mut self[last]
    }
}

// -----------------------------------------------------------------------------
// PolySlot

/// A `poly_relation` field.
pub trait PolySlot {
    fn cardinality(&self) -> Cardinality;

    /// Declarations of the candidate types.
    fn candidates(&self) -> &'static [&'static ModelDecl];

    fn linkage(&mut self) -> Linkage<'_, dyn Choice>;

    /// Empties the slot: `None`, [`Nullable::Null`] or an empty `Vec`.
    fn set_null(&mut self);

    /// Adds an empty choice and returns it. To-one slots are overwritten;
    /// to-many slots grow by one.
    fn insert_default(&mut self) -> &mut dyn Choice;
}

impl<C: ChoiceModel> PolySlot for Option<C> {
    #[inline]
    fn cardinality(&self) -> Cardinality {
        Cardinality::One
    }

    #[inline]
    fn candidates(&self) -> &'static [&'static ModelDecl] {
        C::CANDIDATES
    }

    fn linkage(&mut self) -> Linkage<'_, dyn Choice> {
        match self {
            Some(choice) => Linkage::One(choice),
            None => Linkage::Null,
        }
    }

    #[inline]
    fn set_null(&mut self) {
        *self = None;
    }

    #[inline]
    fn insert_default(&mut self) -> &mut dyn Choice {
        self.insert(C::default())
    }
}

impl<C: ChoiceModel> PolySlot for Nullable<C> {
    #[inline]
    fn cardinality(&self) -> Cardinality {
        Cardinality::One
    }

    #[inline]
    fn candidates(&self) -> &'static [&'static ModelDecl] {
        C::CANDIDATES
    }

    fn linkage(&mut self) -> Linkage<'_, dyn Choice> {
        match self {
            Self::Absent => Linkage::Absent,
            Self::Null => Linkage::Null,
            Self::Value(choice) => Linkage::One(choice),
        }
    }

    #[inline]
    fn set_null(&mut self) {
        *self = Self::Null;
    }

    #[inline]
    fn insert_default(&mut self) -> &mut dyn Choice {
        self.insert(C::default())
    }
}

impl<C: ChoiceModel> PolySlot for Vec<C> {
    #[inline]
    fn cardinality(&self) -> Cardinality {
        Cardinality::Many
    }

    #[inline]
    fn candidates(&self) -> &'static [&'static ModelDecl] {
        C::CANDIDATES
    }

    fn linkage(&mut self) -> Linkage<'_, dyn Choice> {
        Linkage::Many(self.iter_mut().map(|choice| choice as &mut dyn Choice).collect())
    }

    #[inline]
    fn set_null(&mut self) {
        self.clear();
    }

    fn insert_default(&mut self) -> &mut dyn Choice {
        self.push(C::default());
        let last = self.len() - 1;
        &mut self[last]
    }
}
