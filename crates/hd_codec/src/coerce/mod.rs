//! The type coercion engine.
//!
//! Converts between field values and JSON values under the rules of a
//! [`Directive`]. Every encodable field type implements [`Attribute`]; the
//! walkers reach it through the object-safe [`AttrSlot`].
//!
//! ## Menu
//!
//! - [`Attribute`], [`AttrSlot`], [`AttrContext`]: the coercion contract.
//! - [`Identifier`]: `primary`, `type` and `client_id` fields.
//! - Built-in rules: booleans, strings, integers with range checks, floats,
//!   [`chrono`] times under the five time formats, [`Duration`] in Go syntax,
//!   `Option`, `Vec`, string-keyed maps, raw JSON values.
//! - [`Json`]: any serde type, through its serde representation.
//! - [`Raw`], [`RawCodec`]: user defined byte-level codecs.
//! - [`encode_nested`], [`decode_nested`]: structs as attribute values.
//!
//! [`Directive`]: hd_directive::Directive
//! [`Duration`]: core::time::Duration

use serde_json::Value;

use hd_directive::Directive;

use crate::{CodecError, SchemaRegistry};

// -----------------------------------------------------------------------------
// Modules

mod collection;
mod duration;
mod id;
mod nested;
mod number;
mod scalar;
mod time;
mod wrap;

// -----------------------------------------------------------------------------
// Exports

pub use duration::{format_duration, parse_duration};
pub use id::Identifier;
pub use nested::{decode_nested, encode_nested};
pub use wrap::{Json, Raw, RawCodec};

// -----------------------------------------------------------------------------
// AttrContext

/// What a coercion may consult besides the value itself.
#[derive(Clone, Copy, Debug)]
pub struct AttrContext<'a> {
    pub directive: &'a Directive,
    pub registry: &'a SchemaRegistry,
}

impl<'a> AttrContext<'a> {
    #[inline]
    pub const fn new(directive: &'a Directive, registry: &'a SchemaRegistry) -> Self {
        Self {
            directive,
            registry,
        }
    }

    /// Document-side name of the field being coerced.
    #[inline]
    pub fn name(&self) -> &'a str {
        self.directive.name().unwrap_or_default()
    }
}

// -----------------------------------------------------------------------------
// Attribute

/// A type that can live in an `attr`, `links` or `meta` field.
pub trait Attribute: Sized {
    /// Encodes the value. `Ok(None)` omits the member entirely.
    fn encode(&self, cx: &AttrContext<'_>) -> Result<Option<Value>, CodecError>;

    /// Decodes a value. Kind mismatches are reported as
    /// [`CodecError::Mismatch`].
    fn decode(value: Value, cx: &AttrContext<'_>) -> Result<Self, CodecError>;

    /// Tested by the `omit_if_empty` modifier.
    fn is_empty_value(&self) -> bool {
        false
    }

    /// Tested by the `omit_if_zero` modifier.
    fn is_zero_value(&self) -> bool {
        self.is_empty_value()
    }
}

/// Object-safe, in-place form of [`Attribute`].
pub trait AttrSlot {
    fn encode_attr(&self, cx: &AttrContext<'_>) -> Result<Option<Value>, CodecError>;

    fn decode_into(&mut self, value: Value, cx: &AttrContext<'_>) -> Result<(), CodecError>;

    fn attr_is_empty(&self) -> bool;

    fn attr_is_zero(&self) -> bool;
}

impl<T: Attribute> AttrSlot for T {
    #[inline]
    fn encode_attr(&self, cx: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        self.encode(cx)
    }

    #[inline]
    fn decode_into(&mut self, value: Value, cx: &AttrContext<'_>) -> Result<(), CodecError> {
        *self = T::decode(value, cx)?;
        Ok(())
    }

    #[inline]
    fn attr_is_empty(&self) -> bool {
        self.is_empty_value()
    }

    #[inline]
    fn attr_is_zero(&self) -> bool {
        self.is_zero_value()
    }
}

/// Whether an attribute should be skipped under the directive's omit rules.
pub(crate) fn is_omitted(slot: &dyn AttrSlot, directive: &Directive) -> bool {
    (directive.omit_if_empty() && slot.attr_is_empty())
        || (directive.omit_if_zero() && slot.attr_is_zero())
}

#[cfg(test)]
pub(crate) mod testing {
    use hd_directive::Directive;
    use serde_json::Value;

    use super::{AttrContext, Attribute};
    use crate::{CodecError, SchemaRegistry};

    pub(crate) fn encode<T: Attribute>(value: &T, annotation: &str) -> Option<Value> {
        let directive = Directive::parse(annotation).unwrap();
        let registry = SchemaRegistry::new();
        value.encode(&AttrContext::new(&directive, &registry)).unwrap()
    }

    pub(crate) fn decode<T: Attribute>(value: Value, annotation: &str) -> Result<T, CodecError> {
        let directive = Directive::parse(annotation).unwrap();
        let registry = SchemaRegistry::new();
        T::decode(value, &AttrContext::new(&directive, &registry))
    }
}
