use core::any::type_name;
use core::hash::BuildHasher;
use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use crate::CodecError;
use crate::coerce::{AttrContext, Attribute};

// -----------------------------------------------------------------------------
// Option

/// `None` encodes as `null`; `null` decodes as `None`.
///
/// A non-null value whose kind the inner type cannot accept is reported as
/// [`UnsupportedPointerTarget`](CodecError::UnsupportedPointerTarget).
impl<T: Attribute> Attribute for Option<T> {
    fn encode(&self, cx: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        match self {
            Some(inner) => inner.encode(cx),
            None => Ok(Some(Value::Null)),
        }
    }

    fn decode(value: Value, cx: &AttrContext<'_>) -> Result<Self, CodecError> {
        if value.is_null() {
            return Ok(None);
        }
        T::decode(value, cx).map(Some).map_err(|err| match err {
            CodecError::Mismatch { found, .. } => CodecError::UnsupportedPointerTarget {
                target: type_name::<T>(),
                found,
            },
            other => other,
        })
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

impl<T: Attribute> Attribute for Box<T> {
    #[inline]
    fn encode(&self, cx: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        (**self).encode(cx)
    }

    #[inline]
    fn decode(value: Value, cx: &AttrContext<'_>) -> Result<Self, CodecError> {
        T::decode(value, cx).map(Box::new)
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }

    #[inline]
    fn is_zero_value(&self) -> bool {
        (**self).is_zero_value()
    }
}

// -----------------------------------------------------------------------------
// Sequences

/// Elements the element type omits encode as `null` to keep positions.
impl<T: Attribute> Attribute for Vec<T> {
    fn encode(&self, cx: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        let mut items = Vec::with_capacity(self.len());
        for item in self {
            items.push(item.encode(cx)?.unwrap_or(Value::Null));
        }
        Ok(Some(Value::Array(items)))
    }

    fn decode(value: Value, cx: &AttrContext<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Array(items) => items.into_iter().map(|item| T::decode(item, cx)).collect(),
            other => Err(CodecError::mismatch("array", &other)),
        }
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Maps

fn encode_entries<'a, T: Attribute + 'a>(
    entries: impl Iterator<Item = (&'a String, &'a T)>,
    cx: &AttrContext<'_>,
) -> Result<Option<Value>, CodecError> {
    let mut map = Map::new();
    for (key, value) in entries {
        map.insert(key.clone(), value.encode(cx)?.unwrap_or(Value::Null));
    }
    Ok(Some(Value::Object(map)))
}

fn decode_entries<T: Attribute, C: FromIterator<(String, T)>>(
    value: Value,
    cx: &AttrContext<'_>,
) -> Result<C, CodecError> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| T::decode(value, cx).map(|value| (key, value)))
            .collect(),
        other => Err(CodecError::mismatch("object", &other)),
    }
}

impl<T: Attribute> Attribute for BTreeMap<String, T> {
    #[inline]
    fn encode(&self, cx: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        encode_entries(self.iter(), cx)
    }

    #[inline]
    fn decode(value: Value, cx: &AttrContext<'_>) -> Result<Self, CodecError> {
        decode_entries(value, cx)
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Attribute, S: BuildHasher + Default> Attribute for HashMap<String, T, S> {
    #[inline]
    fn encode(&self, cx: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        encode_entries(self.iter(), cx)
    }

    #[inline]
    fn decode(value: Value, cx: &AttrContext<'_>) -> Result<Self, CodecError> {
        decode_entries(value, cx)
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use crate::CodecError;
    use crate::coerce::testing::{decode, encode};

    #[test]
    fn options() {
        assert_eq!(encode(&None::<u8>, "attr,n"), Some(json!(null)));
        assert_eq!(encode(&Some(3u8), "attr,n"), Some(json!(3)));
        assert!(matches!(decode::<Option<u8>>(json!(null), "attr,n"), Ok(None)));
        assert!(matches!(decode::<Option<u8>>(json!(4), "attr,n"), Ok(Some(4))));
        assert!(matches!(
            decode::<Option<u8>>(json!("4"), "attr,n"),
            Err(CodecError::UnsupportedPointerTarget { target: "u8", found: "string" })
        ));
        // Range errors keep their own kind.
        assert!(matches!(
            decode::<Option<u8>>(json!(400), "attr,n"),
            Err(CodecError::UnknownNumberKind { .. })
        ));
    }

    #[test]
    fn sequences_and_maps() {
        let tags = vec!["a".to_owned(), "b".to_owned()];
        assert_eq!(encode(&tags, "attr,tags"), Some(json!(["a", "b"])));
        assert_eq!(decode::<Vec<String>>(json!(["x"]), "attr,tags").unwrap(), ["x"]);
        assert!(matches!(
            decode::<Vec<u8>>(json!([1, "2"]), "attr,tags"),
            Err(CodecError::Mismatch { .. })
        ));

        let scores: BTreeMap<String, u32> = decode(json!({"a": 1, "b": 2}), "attr,scores").unwrap();
        assert_eq!(scores["b"], 2);
        assert_eq!(encode(&scores, "attr,scores"), Some(json!({"a": 1, "b": 2})));
    }
}
