//! Byte-stream boundary.
//!
//! Thin wrappers that read or write whole documents with `serde_json`. A
//! failed encode writes nothing: the document is fully built before the first
//! byte goes out.

use std::io::{Read, Write};

use hd_document::{Classified, ErrorsPayload, Payload};

use crate::schema::{Model, Resource};
use crate::{CodecError, Marshaler, Unmarshaler};

/// Encodes one value and writes the document.
pub fn marshal_payload<W: Write>(
    mut writer: W,
    marshaler: &Marshaler<'_>,
    model: &mut dyn Resource,
) -> Result<(), CodecError> {
    let payload = marshaler.marshal_one(model)?;
    write_document(&mut writer, &payload)
}

/// Encodes a slice of values and writes the document.
pub fn marshal_many_payload<W: Write, T: Resource>(
    mut writer: W,
    marshaler: &Marshaler<'_>,
    models: &mut [T],
) -> Result<(), CodecError> {
    let payload = marshaler.marshal_many(models)?;
    write_document(&mut writer, &payload)
}

/// Writes an `errors` document.
pub fn marshal_errors<'a, W: Write>(
    mut writer: W,
    errors: impl IntoIterator<Item = &'a dyn Classified>,
) -> Result<(), CodecError> {
    let payload = ErrorsPayload::from_classified(errors);
    write_document(&mut writer, &payload)
}

fn write_document<W: Write, D: serde::Serialize>(writer: &mut W, document: &D) -> Result<(), CodecError> {
    serde_json::to_writer(&mut *writer, document)?;
    writer.flush()?;
    Ok(())
}

/// Reads a document without decoding its resources.
pub fn read_payload<R: Read>(reader: R) -> Result<Payload, CodecError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Reads a single-resource document and decodes it.
pub fn unmarshal_payload<R: Read, T: Model>(
    reader: R,
    unmarshaler: &Unmarshaler<'_>,
) -> Result<T, CodecError> {
    unmarshaler.unmarshal_one(&read_payload(reader)?)
}

/// Reads a collection document and decodes it.
pub fn unmarshal_many_payload<R: Read, T: Model>(
    reader: R,
    unmarshaler: &Unmarshaler<'_>,
) -> Result<Vec<T>, CodecError> {
    unmarshaler.unmarshal_many(&read_payload(reader)?)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{marshal_errors, marshal_payload, read_payload, unmarshal_payload};
    use crate::derive::Resource;
    use crate::{CodecError, Marshaler, SchemaRegistry, Unmarshaler};
    use hd_document::Classified;

    #[derive(Resource, Default, Debug, PartialEq)]
    struct Tag {
        #[resource("primary,tags")]
        id: u32,
        #[resource("attr,label")]
        label: String,
    }

    #[derive(Resource, Default)]
    struct Untyped {
        #[resource("primary")]
        id: u32,
    }

    #[test]
    fn round_trip_through_bytes() {
        let registry = SchemaRegistry::new();
        let mut tag = Tag { id: 3, label: "rust".into() };

        let mut out = Vec::new();
        marshal_payload(&mut out, &Marshaler::new(&registry), &mut tag).unwrap();
        let text: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            text,
            json!({"data": {"id": "3", "type": "tags", "attributes": {"label": "rust"}}})
        );

        let decoded: Tag = unmarshal_payload(out.as_slice(), &Unmarshaler::new(&registry)).unwrap();
        assert_eq!(decoded, tag);
    }

    #[test]
    fn failed_encode_writes_nothing() {
        let registry = SchemaRegistry::new();
        let mut out = Vec::new();
        let err = marshal_payload(&mut out, &Marshaler::new(&registry), &mut Untyped::default());
        assert!(matches!(err, Err(CodecError::MissingPrimaryType { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn malformed_documents() {
        assert!(matches!(read_payload(&b"{\"data\": 12}"[..]), Err(CodecError::Json(_))));
        assert!(matches!(read_payload(&b"not json"[..]), Err(CodecError::Json(_))));
    }

    #[test]
    fn errors_document() {
        let error = CodecError::MissingData;
        let mut out = Vec::new();
        marshal_errors(&mut out, [&error as &dyn Classified]).unwrap();
        let text: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(text["errors"][0]["status"], "400");
        assert_eq!(text["errors"][0]["code"], "missing_data");
        assert_eq!(text["errors"][0]["detail"], "document has no primary data");
    }
}
