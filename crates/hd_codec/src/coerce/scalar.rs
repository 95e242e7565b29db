use hd_document::Link;
use serde_json::{Map, Value};

use crate::CodecError;
use crate::coerce::{AttrContext, Attribute};

impl Attribute for bool {
    #[inline]
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        Ok(Some(Value::Bool(*self)))
    }

    fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Bool(flag) => Ok(flag),
            other => Err(CodecError::mismatch("boolean", &other)),
        }
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        !*self
    }
}

impl Attribute for String {
    #[inline]
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        Ok(Some(Value::String(self.clone())))
    }

    fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
        match value {
            Value::String(text) => Ok(text),
            other => Err(CodecError::mismatch("string", &other)),
        }
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Attribute for char {
    #[inline]
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        Ok(Some(Value::String(self.to_string())))
    }

    fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
        let Value::String(text) = value else {
            return Err(CodecError::mismatch("string", &value));
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(CodecError::InvalidValue {
                target: "char",
                reason: format!("`{text}` is not a single character"),
            }),
        }
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        *self == '\0'
    }
}

/// Passed through untouched.
impl Attribute for Value {
    #[inline]
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        Ok(Some(self.clone()))
    }

    #[inline]
    fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
        Ok(value)
    }

    fn is_empty_value(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(flag) => !flag,
            Value::String(text) => text.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Number(number) => number.as_f64() == Some(0.0),
        }
    }
}

/// A JSON object; the shape of `meta` members.
impl Attribute for Map<String, Value> {
    #[inline]
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        Ok(Some(Value::Object(self.clone())))
    }

    fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(CodecError::mismatch("object", &other)),
        }
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

/// A bare href or a link object.
impl Attribute for Link {
    #[inline]
    fn encode(&self, _: &AttrContext<'_>) -> Result<Option<Value>, CodecError> {
        Ok(Some(serde_json::to_value(self)?))
    }

    fn decode(value: Value, _: &AttrContext<'_>) -> Result<Self, CodecError> {
        match value {
            Value::String(_) | Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(CodecError::mismatch("link", &other)),
        }
    }

    #[inline]
    fn is_empty_value(&self) -> bool {
        self.href().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use hd_document::Link;
    use serde_json::{Value, json};

    use crate::CodecError;
    use crate::coerce::testing::{decode, encode};

    #[test]
    fn strings_and_booleans() {
        assert_eq!(encode(&String::from("hi"), "attr,t"), Some(json!("hi")));
        assert!(matches!(decode::<bool>(json!(true), "attr,b"), Ok(true)));
        assert!(matches!(
            decode::<String>(json!(false), "attr,t"),
            Err(CodecError::Mismatch { expected: "string", found: "boolean" })
        ));
        assert!(matches!(decode::<char>(json!("x"), "attr,c"), Ok('x')));
        assert!(matches!(
            decode::<char>(json!("xy"), "attr,c"),
            Err(CodecError::InvalidValue { target: "char", .. })
        ));
    }

    #[test]
    fn raw_values_pass_through() {
        let value = json!({"a": [1, 2, {"b": null}]});
        assert_eq!(encode(&value, "meta"), Some(value.clone()));
        assert_eq!(decode::<Value>(value.clone(), "meta").unwrap(), value);
    }

    #[test]
    fn links() {
        let bare = decode::<Link>(json!("/a/1"), "links,self").unwrap();
        assert_eq!(bare.href(), "/a/1");
        let object = decode::<Link>(json!({"href": "/a/2", "meta": {"n": 1}}), "links,self").unwrap();
        assert_eq!(object.href(), "/a/2");
        assert!(matches!(
            decode::<Link>(json!(3), "links,self"),
            Err(CodecError::Mismatch { expected: "link", .. })
        ));
    }
}
