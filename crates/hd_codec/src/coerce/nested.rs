use hd_directive::DirectiveKind;
use serde_json::{Map, Value};

use crate::coerce::{AttrContext, is_omitted};
use crate::schema::{FieldMut, FieldRef, Model, Resource};
use crate::{CodecError, SchemaRegistry};

/// Encodes a struct as an attribute value: an object of its `attr` fields.
///
/// Embedded structs contribute their attributes; keys, relationships, links
/// and meta have no place inside an attribute and are skipped.
///
/// `before_encode` does not run here: attributes are encoded through a shared
/// borrow, so a nested value is written as it is. Its `after_decode` hook does
/// run, see [`decode_nested`].
pub fn encode_nested(model: &dyn Resource, registry: &SchemaRegistry) -> Result<Value, CodecError> {
    let mut attributes = Map::new();
    write_attributes(model, registry, &mut attributes)?;
    Ok(Value::Object(attributes))
}

fn write_attributes(
    model: &dyn Resource,
    registry: &SchemaRegistry,
    out: &mut Map<String, Value>,
) -> Result<(), CodecError> {
    let schema = registry.schema(model)?;

    for field in schema.fields() {
        match (field.directive(), model.field(field.index())) {
            (Some(directive), Some(FieldRef::Value(slot)))
                if directive.kind() == DirectiveKind::Attr =>
            {
                if is_omitted(slot, directive) {
                    continue;
                }
                let cx = AttrContext::new(directive, registry);
                if let Some(value) = slot.encode_attr(&cx)? {
                    out.insert(cx.name().to_owned(), value);
                }
            }
            (None, Some(FieldRef::Embedded(inner))) => {
                write_attributes(inner, registry, out)?;
            }
            _ => {}
        }
    }

    Ok(())
}

/// Decodes a struct from an attribute value, then runs its `after_decode`
/// hook.
///
/// Members without a matching field are ignored; fields without a member keep
/// their default.
pub fn decode_nested<T: Model>(value: Value, registry: &SchemaRegistry) -> Result<T, CodecError> {
    let Value::Object(map) = value else {
        return Err(CodecError::mismatch("object", &value));
    };
    let mut model = T::default();
    read_attributes(&mut model, &map, registry)?;
    Ok(model)
}

fn read_attributes(
    model: &mut dyn Resource,
    map: &Map<String, Value>,
    registry: &SchemaRegistry,
) -> Result<(), CodecError> {
    let schema = registry.schema(model)?;
    let type_path = schema.type_path();

    for field in schema.fields() {
        match (field.directive(), model.field_mut(field.index())) {
            (Some(directive), Some(FieldMut::Value(slot)))
                if directive.kind() == DirectiveKind::Attr =>
            {
                let cx = AttrContext::new(directive, registry);
                if let Some(value) = map.get(cx.name()) {
                    slot.decode_into(value.clone(), &cx)
                        .map_err(|err| err.at_boundary(type_path))?;
                }
            }
            (None, Some(FieldMut::Embedded(inner))) => {
                read_attributes(inner, map, registry)?;
            }
            _ => {}
        }
    }

    if let Some(hook) = schema.hooks().after_decode {
        hook(model).map_err(|source| CodecError::Hook { type_path, source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use hd_directive::Directive;
    use serde_json::json;

    use crate::coerce::{AttrContext, Attribute};
    use crate::derive::Resource;
    use crate::schema::HookResult;
    use crate::{CodecError, SchemaRegistry};

    #[derive(Resource, Default, Debug, PartialEq)]
    struct Geo {
        #[resource("attr,lat")]
        lat: f64,
        #[resource("attr,lng")]
        lng: f64,
    }

    #[derive(Resource, Default, Debug, PartialEq)]
    struct Address {
        #[resource("attr,street,omitempty")]
        street: String,
        #[resource("attr,zip")]
        zip: u32,
        #[resource(embedded)]
        geo: Geo,
        #[resource("attr,history")]
        history: Vec<Geo>,
    }

    fn with_cx<R>(f: impl FnOnce(&AttrContext<'_>) -> R) -> R {
        let directive = Directive::parse("attr,address").unwrap();
        let registry = SchemaRegistry::new();
        f(&AttrContext::new(&directive, &registry))
    }

    #[test]
    fn nested_structs_are_objects() {
        let address = Address {
            street: String::new(),
            zip: 1010,
            geo: Geo { lat: 1.5, lng: 2.0 },
            history: vec![Geo { lat: 0.5, lng: 0.25 }],
        };
        let value = with_cx(|cx| address.encode(cx)).unwrap();
        assert_eq!(
            value,
            Some(json!({
                "zip": 1010,
                "lat": 1.5,
                "lng": 2.0,
                "history": [{"lat": 0.5, "lng": 0.25}],
            }))
        );

        let decoded = with_cx(|cx| Address::decode(value.unwrap(), cx)).unwrap();
        assert_eq!(decoded, address);
    }

    #[test]
    fn mismatches_name_the_nested_type() {
        let err = with_cx(|cx| Address::decode(json!({"zip": "1010"}), cx)).unwrap_err();
        assert!(matches!(err, CodecError::NotARepresentation { type_path, .. } if type_path.ends_with("Address")));

        let err = with_cx(|cx| Address::decode(json!([1]), cx)).unwrap_err();
        assert!(matches!(err, CodecError::Mismatch { expected: "object", .. }));
    }

    #[derive(Resource, Default, Debug, PartialEq)]
    #[resource(before_encode = Self::shout, after_decode = Self::trim)]
    struct Label {
        #[resource("attr,text")]
        text: String,
    }

    impl Label {
        fn shout(&mut self) -> HookResult {
            self.text = self.text.to_uppercase();
            Ok(())
        }

        fn trim(&mut self) -> HookResult {
            self.text = self.text.trim().to_owned();
            Ok(())
        }
    }

    #[test]
    fn only_decode_hooks_run_for_nested_values() {
        let label = Label {
            text: " draft ".into(),
        };
        assert_eq!(with_cx(|cx| label.encode(cx)).unwrap(), Some(json!({"text": " draft "})));

        let decoded = with_cx(|cx| Label::decode(json!({"text": " draft "}), cx)).unwrap();
        assert_eq!(decoded.text, "draft");
    }
}
