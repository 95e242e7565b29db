use core::any::type_name;
use core::ops::{Deref, DerefMut};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::coerce::{AttrContext, Attribute};
use crate::{BoxError, CodecError};

// -----------------------------------------------------------------------------
// Json

/// Encodes a value through its serde representation.
///
/// For attribute types that carry no directives of their own.
///
/// # Examples
///
/// ```
/// use hd_codec::coerce::Json;
/// use hd_codec::derive::Resource;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
/// struct Dimensions {
///     width: u32,
///     height: u32,
/// }
///
/// #[derive(Resource, Default)]
/// struct Photo {
///     #[resource("primary,photos")]
///     id: String,
///     #[resource("attr,size")]
///     size: Json<Dimensions>,
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: Serialize + DeserializeOwned> Attribute for Json<T> {
    #[inline]
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        Ok(Some(serde_json::to_value(&self.0)?))
    }

    fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
        serde_json::from_value(value)
            .map(Json)
            .map_err(|err| CodecError::InvalidValue {
                target: type_name::<T>(),
                reason: err.to_string(),
            })
    }
}

// -----------------------------------------------------------------------------
// Raw

/// A type that encodes itself to and from raw JSON bytes.
pub trait RawCodec: Sized {
    /// Returns the JSON text of the value.
    fn encode_raw(&self) -> Result<Vec<u8>, BoxError>;

    /// Builds the value from the raw JSON text of the attribute.
    fn decode_raw(raw: &[u8]) -> Result<Self, BoxError>;
}

/// Hands attribute coercion over to a [`RawCodec`].
///
/// # Examples
///
/// ```
/// use hd_codec::BoxError;
/// use hd_codec::coerce::RawCodec;
///
/// // Stored as "r,g,b" on the Rust side, as a JSON array on the wire.
/// struct Rgb(String);
///
/// impl RawCodec for Rgb {
///     fn encode_raw(&self) -> Result<Vec<u8>, BoxError> {
///         Ok(format!("[{}]", self.0).into_bytes())
///     }
///
///     fn decode_raw(raw: &[u8]) -> Result<Self, BoxError> {
///         let text = std::str::from_utf8(raw)?;
///         let inner = text.strip_prefix('[').and_then(|t| t.strip_suffix(']'));
///         Ok(Rgb(inner.ok_or("not an array")?.to_owned()))
///     }
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Raw<T>(pub T);

impl<T> Raw<T> {
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Raw<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Raw<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: RawCodec> Attribute for Raw<T> {
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        let invalid = |reason: String| CodecError::InvalidValue {
            target: type_name::<T>(),
            reason,
        };
        let bytes = self.0.encode_raw().map_err(|err| invalid(err.to_string()))?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| invalid(format!("codec produced invalid json: {err}")))
    }

    fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
        let bytes = serde_json::to_vec(&value)?;
        T::decode_raw(&bytes)
            .map(Raw)
            .map_err(|err| CodecError::InvalidValue {
                target: type_name::<T>(),
                reason: err.to_string(),
            })
    }
}
