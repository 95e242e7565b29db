use hd_directive::DirectiveKind;
use hd_document::{IncludedIndex, Node, Payload, PrimaryData, RelationData, RelationshipNode, ResourceKey};
use serde_json::Value;

use crate::coerce::AttrContext;
use crate::relation::{Cardinality, PolySlot, RelationSlot};
use crate::schema::{FieldMut, Model, ModelDecl, Resource};
use crate::{CodecError, SchemaRegistry};

// -----------------------------------------------------------------------------
// Unmarshaler

/// Rebuilds typed graphs from documents.
///
/// - Relationship references are resolved against `included` by
///   `(type, id)`; unresolved references populate only the key fields of the
///   target.
/// - A reference back to a resource that is already being built is not
///   followed again, so cyclic documents terminate.
/// - `after_decode` hooks run bottom-up: a value's hook runs after every value
///   below it is complete.
/// - Polymorphic relations pick the first candidate whose resource type
///   matches the node; nodes no candidate accepts are skipped.
#[derive(Clone, Copy, Debug)]
pub struct Unmarshaler<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> Unmarshaler<'r> {
    #[inline]
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    #[inline]
    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// Decodes a single-resource document.
    ///
    /// `{"data": null}` is [`CodecError::MissingData`]; use
    /// [`unmarshal_optional`](Self::unmarshal_optional) to accept it.
    pub fn unmarshal_one<T: Model>(&self, payload: &Payload) -> Result<T, CodecError> {
        self.unmarshal_optional(payload)?.ok_or(CodecError::MissingData)
    }

    /// Decodes a single-resource document whose data may be `null`.
    pub fn unmarshal_optional<T: Model>(&self, payload: &Payload) -> Result<Option<T>, CodecError> {
        match &payload.data {
            PrimaryData::One(Some(node)) => {
                let mut model = T::default();
                self.build(&mut model, node, &payload.included_index())?;
                Ok(Some(model))
            }
            PrimaryData::One(None) => Ok(None),
            PrimaryData::Many(_) => Err(CodecError::NotARepresentation {
                type_path: T::DECLARATION.type_path,
                detail: "expected a single resource, found a collection".into(),
            }),
        }
    }

    /// Decodes a collection document. `{"data": null}` yields no values.
    pub fn unmarshal_many<T: Model>(&self, payload: &Payload) -> Result<Vec<T>, CodecError> {
        let nodes = match &payload.data {
            PrimaryData::Many(nodes) => nodes,
            PrimaryData::One(None) => return Ok(Vec::new()),
            PrimaryData::One(Some(_)) => {
                return Err(CodecError::NotARepresentation {
                    type_path: T::DECLARATION.type_path,
                    detail: "expected a collection, found a single resource".into(),
                });
            }
        };

        let index = payload.included_index();
        nodes
            .iter()
            .map(|node| {
                let mut model = T::default();
                self.build(&mut model, node, &index)?;
                Ok(model)
            })
            .collect()
    }

    /// Populates `target` from `node`, resolving relationships through
    /// `index`.
    pub fn build<'p>(
        &self,
        target: &mut dyn Resource,
        node: &'p Node,
        index: &IncludedIndex<'p>,
    ) -> Result<(), CodecError> {
        let mut path = Vec::new();
        self.build_traced(target, node, index, &mut path)
    }

    // `path` holds the keys of the resources currently being built.
    fn build_traced<'p>(
        &self,
        target: &mut dyn Resource,
        node: &'p Node,
        index: &IncludedIndex<'p>,
        path: &mut Vec<ResourceKey<'p>>,
    ) -> Result<(), CodecError> {
        let key = node.key();
        if let Some(key) = key {
            path.push(key);
        }
        let result = self.populate(target, node, index, path, true);
        if key.is_some() {
            path.pop();
        }
        result
    }

    fn populate<'p>(
        &self,
        target: &mut dyn Resource,
        node: &'p Node,
        index: &IncludedIndex<'p>,
        path: &mut Vec<ResourceKey<'p>>,
        check_type: bool,
    ) -> Result<(), CodecError> {
        let schema = self.registry.schema(target)?;
        let type_path = schema.type_path();

        if check_type
            && let Some(expected) = schema.resource_type()
            && !node.ty.is_empty()
            && node.ty != expected
        {
            return Err(CodecError::ResourceTypeMismatch {
                expected: expected.to_owned(),
                found: node.ty.clone(),
            });
        }

        for field in schema.fields() {
            let slot = target
                .field_mut(field.index())
                .ok_or_else(|| CodecError::NotARepresentation {
                    type_path,
                    detail: format!("field `{}` is declared but not accessible", field.ident()),
                })?;
            let shape = slot.shape();

            match (field.directive(), slot) {
                (None, FieldMut::Embedded(inner)) => {
                    self.populate(inner, node, index, path, false)?;
                }
                (Some(directive), FieldMut::Key(key)) => {
                    let id = match directive.kind() {
                        DirectiveKind::Primary => node.id.as_deref(),
                        DirectiveKind::Type => Some(node.ty.as_str()).filter(|ty| !ty.is_empty()),
                        _ => node.client_id.as_deref(),
                    };
                    if let Some(id) = id {
                        key.set_id(id)?;
                    }
                }
                (Some(directive), FieldMut::Value(slot)) => {
                    let Some(value) = read_value(node, directive.kind(), directive.name())? else {
                        continue;
                    };
                    let cx = AttrContext::new(directive, self.registry);
                    slot.decode_into(value, &cx)
                        .map_err(|err| err.at_boundary(type_path))?;
                }
                (Some(directive), FieldMut::Relation(relation)) => {
                    let name = directive.name().unwrap_or_default();
                    if let Some(rel) = node.relationships.get(name) {
                        self.build_relation(relation, rel, index, path)?;
                    }
                }
                (Some(directive), FieldMut::Poly(poly)) => {
                    let name = directive.name().unwrap_or_default();
                    if let Some(rel) = node.relationships.get(name) {
                        self.build_poly(poly, rel, index, path)?;
                    }
                }
                _ => {
                    return Err(CodecError::NotARepresentation {
                        type_path,
                        detail: format!(
                            "field `{}` is a {shape} but its directive does not match",
                            field.ident()
                        ),
                    });
                }
            }
        }

        if let Some(hook) = schema.hooks().after_decode {
            hook(target).map_err(|source| CodecError::Hook { type_path, source })?;
        }
        Ok(())
    }

    fn build_relation<'p>(
        &self,
        relation: &mut dyn RelationSlot,
        rel: &'p RelationshipNode,
        index: &IncludedIndex<'p>,
        path: &mut Vec<ResourceKey<'p>>,
    ) -> Result<(), CodecError> {
        // Links or meta only: the field keeps its value.
        let Some(data) = &rel.data else {
            return Ok(());
        };

        match (relation.cardinality(), data) {
            (_, RelationData::One(None)) => relation.set_null(),
            (Cardinality::One, RelationData::One(Some(reference))) => {
                let target = relation.insert_default();
                self.build_related(target, reference, index, path)?;
            }
            (Cardinality::Many, RelationData::Many(references)) => {
                relation.set_null();
                for reference in references {
                    let target = relation.insert_default();
                    self.build_related(target, reference, index, path)?;
                }
            }
            (cardinality, _) => {
                return Err(linkage_mismatch(relation.target(), cardinality));
            }
        }
        Ok(())
    }

    fn build_poly<'p>(
        &self,
        poly: &mut dyn PolySlot,
        rel: &'p RelationshipNode,
        index: &IncludedIndex<'p>,
        path: &mut Vec<ResourceKey<'p>>,
    ) -> Result<(), CodecError> {
        let Some(data) = &rel.data else {
            return Ok(());
        };
        let candidates = poly.candidates();

        match (poly.cardinality(), data) {
            (_, RelationData::One(None)) => poly.set_null(),
            (Cardinality::One, RelationData::One(Some(reference))) => {
                if let Some(choice) = self.match_candidate(candidates, &reference.ty)? {
                    let target = poly.insert_default().select(choice);
                    if let Some(target) = target {
                        self.build_related(target, reference, index, path)?;
                    }
                }
            }
            (Cardinality::Many, RelationData::Many(references)) => {
                poly.set_null();
                for reference in references {
                    let Some(choice) = self.match_candidate(candidates, &reference.ty)? else {
                        continue;
                    };
                    if let Some(target) = poly.insert_default().select(choice) {
                        self.build_related(target, reference, index, path)?;
                    }
                }
            }
            (cardinality, _) => {
                let decl = candidates.first().copied();
                return Err(CodecError::NotARepresentation {
                    type_path: decl.map_or("polymorphic relation", |decl| decl.type_path),
                    detail: format!("expected {} linkage", cardinality.as_str()),
                });
            }
        }
        Ok(())
    }

    // Index of the first candidate whose resource type is `ty`.
    fn match_candidate(
        &self,
        candidates: &[&'static ModelDecl],
        ty: &str,
    ) -> Result<Option<usize>, CodecError> {
        for (position, &decl) in candidates.iter().enumerate() {
            if self.registry.schema_of(decl)?.resource_type() == Some(ty) {
                return Ok(Some(position));
            }
        }
        log::debug!("no candidate accepts resource type `{ty}`; skipping");
        Ok(None)
    }

    fn build_related<'p>(
        &self,
        target: &mut dyn Resource,
        reference: &'p Node,
        index: &IncludedIndex<'p>,
        path: &mut Vec<ResourceKey<'p>>,
    ) -> Result<(), CodecError> {
        let resolved = match reference.key() {
            Some(key) if path.contains(&key) => {
                log::debug!("`{key}` is already being built; using its reference");
                reference
            }
            Some(key) => index.get(key).unwrap_or(reference),
            None => reference,
        };
        self.build_traced(target, resolved, index, path)
    }
}

// The member a `attr`, `links` or `meta` field reads from.
fn read_value(
    node: &Node,
    kind: DirectiveKind,
    name: Option<&str>,
) -> Result<Option<Value>, CodecError> {
    let value = match (kind, name) {
        (DirectiveKind::Attr, Some(name)) => node.attributes.get(name).cloned(),
        (DirectiveKind::Links, Some(name)) => node
            .links
            .as_ref()
            .and_then(|links| links.get(name))
            .map(serde_json::to_value)
            .transpose()?,
        (DirectiveKind::Links, None) => node.links.as_ref().map(serde_json::to_value).transpose()?,
        (DirectiveKind::Meta, Some(name)) => node.meta.as_ref().and_then(|meta| meta.get(name)).cloned(),
        (DirectiveKind::Meta, None) => node.meta.clone().map(Value::Object),
        _ => None,
    };
    Ok(value)
}

fn linkage_mismatch(target: &'static ModelDecl, cardinality: Cardinality) -> CodecError {
    CodecError::NotARepresentation {
        type_path: target.type_path,
        detail: format!("expected {} linkage", cardinality.as_str()),
    }
}
