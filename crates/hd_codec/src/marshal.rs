use hd_directive::{Directive, DirectiveKind};
use hd_document::{Included, Link, Links, Meta, Node, Payload, RelationData, RelationshipNode};
use serde_json::Value;

use crate::coerce::{AttrContext, AttrSlot, is_omitted};
use crate::include::IncludeTree;
use crate::relation::{Linkage, PolySlot, RelationSlot};
use crate::schema::{Choice, FieldMut, FieldSchema, Resource, Schema};
use crate::{CodecError, SchemaRegistry};

// -----------------------------------------------------------------------------
// Marshaler

/// Walks a typed graph and produces document nodes.
///
/// Every call owns its `included` accumulator, so a failed call leaves no
/// partial output behind.
///
/// - `before_encode` hooks run top-down, before the fields of a value are read.
/// - Relationships named by the [`IncludeTree`] are visited in full and their
///   nodes sideloaded into `included` (first occurrence wins); the
///   relationship itself holds a `{type, id}` reference.
/// - Other relationships hold a reference and never touch `included`.
/// - In [`embedded`](Self::embedded) mode, relationships hold the full related
///   node and `included` stays empty.
#[derive(Clone, Debug)]
pub struct Marshaler<'r> {
    registry: &'r SchemaRegistry,
    include: IncludeTree,
    sideload: bool,
}

impl<'r> Marshaler<'r> {
    /// A marshaler that includes nothing.
    #[inline]
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            include: IncludeTree::none(),
            sideload: true,
        }
    }

    /// Sets the relationships to sideload.
    #[inline]
    pub fn with_include(mut self, include: IncludeTree) -> Self {
        self.include = include;
        self
    }

    /// Inlines related nodes into relationships instead of sideloading them.
    #[inline]
    pub fn embedded(mut self) -> Self {
        self.sideload = false;
        self
    }

    #[inline]
    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// `{"data": {...}}` for one value.
    pub fn marshal_one(&self, model: &mut dyn Resource) -> Result<Payload, CodecError> {
        let mut included = Included::new();
        let node = self.visit(model, &mut included, &self.include)?;
        Ok(Payload::one(node, included))
    }

    /// `{"data": [...]}` for a slice of values.
    pub fn marshal_many<T: Resource>(&self, models: &mut [T]) -> Result<Payload, CodecError> {
        self.marshal_iter(models.iter_mut().map(|model| model as &mut dyn Resource))
    }

    /// `{"data": [...]}` for heterogeneous values.
    pub fn marshal_iter<'m, I>(&self, models: I) -> Result<Payload, CodecError>
    where
        I: IntoIterator<Item = &'m mut dyn Resource>,
    {
        let mut included = Included::new();
        let nodes = models
            .into_iter()
            .map(|model| self.visit(model, &mut included, &self.include))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Payload::many(nodes, included))
    }

    /// `{"data": null}`.
    #[inline]
    pub fn marshal_null(&self) -> Payload {
        Payload::null()
    }

    /// Encodes one resource with the given include tree, adding sideloaded
    /// nodes to `included`.
    ///
    /// The returned node is the full node of `model`; it is not added to
    /// `included`.
    pub fn visit(
        &self,
        model: &mut dyn Resource,
        included: &mut Included,
        include: &IncludeTree,
    ) -> Result<Node, CodecError> {
        let type_path = model.declaration().type_path;
        let node = self.visit_fields(model, included, include)?;
        if node.ty.is_empty() {
            return Err(CodecError::MissingPrimaryType { type_path });
        }
        Ok(node)
    }

    fn visit_fields(
        &self,
        model: &mut dyn Resource,
        included: &mut Included,
        include: &IncludeTree,
    ) -> Result<Node, CodecError> {
        let schema = self.registry.schema(model)?;
        let type_path = schema.type_path();
        let hooks = schema.hooks();

        if let Some(hook) = hooks.before_encode {
            hook(model).map_err(|source| CodecError::Hook { type_path, source })?;
        }

        let mut node = Node::new(schema.resource_type().unwrap_or_default());

        for field in schema.fields() {
            let slot = model
                .field_mut(field.index())
                .ok_or_else(|| missing_field(&schema, field))?;
            let shape = slot.shape();

            match (field.directive(), slot) {
                (None, FieldMut::Embedded(inner)) => {
                    let embedded = self.visit_fields(inner, included, include)?;
                    merge_embedded(&mut node, embedded, type_path);
                }
                (Some(directive), FieldMut::Key(key)) => match directive.kind() {
                    DirectiveKind::Primary => node.id = key.to_id(),
                    DirectiveKind::Type => {
                        if let Some(ty) = key.to_id() {
                            node.ty = ty;
                        }
                    }
                    _ => node.client_id = key.to_id(),
                },
                (Some(directive), FieldMut::Value(value)) => {
                    self.write_value(&mut node, directive, &*value)?;
                }
                (Some(directive), FieldMut::Relation(relation)) => {
                    let child = include.child(directive.name().unwrap_or_default());
                    if let Some(rel) = self.visit_relation(relation, included, child)? {
                        node.relationships.insert(relationship_name(directive), rel);
                    }
                }
                (Some(directive), FieldMut::Poly(poly)) => {
                    let child = include.child(directive.name().unwrap_or_default());
                    if let Some(rel) = self.visit_poly(poly, included, child)? {
                        node.relationships.insert(relationship_name(directive), rel);
                    }
                }
                _ => return Err(shape_mismatch(&schema, field, shape)),
            }
        }

        let model = &*model;
        if let Some(links) = hooks.links.and_then(|f| f(model)) {
            node.links.get_or_insert_default().extend(links);
        }
        if let Some(meta) = hooks.meta.and_then(|f| f(model)) {
            node.meta.get_or_insert_default().extend(meta);
        }
        for (name, rel) in &mut node.relationships {
            if let Some(links) = hooks.relationship_links.and_then(|f| f(model, name)) {
                rel.links.get_or_insert_default().extend(links);
            }
            if let Some(meta) = hooks.relationship_meta.and_then(|f| f(model, name)) {
                rel.meta.get_or_insert_default().extend(meta);
            }
        }

        Ok(node)
    }

    fn write_value(
        &self,
        node: &mut Node,
        directive: &Directive,
        value: &dyn AttrSlot,
    ) -> Result<(), CodecError> {
        if is_omitted(value, directive) {
            return Ok(());
        }
        let cx = AttrContext::new(directive, self.registry);
        let Some(encoded) = value.encode_attr(&cx)? else {
            return Ok(());
        };

        match (directive.kind(), directive.name()) {
            (DirectiveKind::Attr, _) => {
                node.attributes.insert(cx.name().to_owned(), encoded);
            }
            (DirectiveKind::Links, Some(name)) => {
                if !encoded.is_null() {
                    let link: Link = serde_json::from_value(encoded)?;
                    node.links.get_or_insert_default().insert(name.to_owned(), link);
                }
            }
            (DirectiveKind::Links, None) => {
                if !encoded.is_null() {
                    let links: Links = serde_json::from_value(encoded)?;
                    node.links.get_or_insert_default().extend(links);
                }
            }
            (DirectiveKind::Meta, Some(name)) => {
                node.meta.get_or_insert_default().insert(name.to_owned(), encoded);
            }
            (_, _) => match encoded {
                Value::Object(meta) => node.meta.get_or_insert_default().extend(meta),
                Value::Null => {}
                other => return Err(CodecError::mismatch("meta object", &other)),
            },
        }
        Ok(())
    }

    fn visit_relation(
        &self,
        relation: &mut dyn RelationSlot,
        included: &mut Included,
        include: Option<&IncludeTree>,
    ) -> Result<Option<RelationshipNode>, CodecError> {
        let data = match relation.linkage() {
            Linkage::Absent => return Ok(None),
            Linkage::Null => RelationData::One(None),
            Linkage::One(target) => {
                RelationData::One(Some(self.visit_related(target, included, include)?))
            }
            Linkage::Many(targets) => RelationData::Many(
                targets
                    .into_iter()
                    .map(|target| self.visit_related(target, included, include))
                    .collect::<Result<_, _>>()?,
            ),
        };
        Ok(Some(RelationshipNode::new(data)))
    }

    fn visit_poly(
        &self,
        poly: &mut dyn PolySlot,
        included: &mut Included,
        include: Option<&IncludeTree>,
    ) -> Result<Option<RelationshipNode>, CodecError> {
        let data = match poly.linkage() {
            Linkage::Absent => return Ok(None),
            Linkage::Null => RelationData::One(None),
            Linkage::One(choice) => RelationData::One(self.visit_choice(choice, included, include)?),
            Linkage::Many(choices) => {
                let mut nodes = Vec::with_capacity(choices.len());
                for choice in choices {
                    nodes.extend(self.visit_choice(choice, included, include)?);
                }
                RelationData::Many(nodes)
            }
        };
        Ok(Some(RelationshipNode::new(data)))
    }

    // Encodes the single populated candidate; `None` when there is none.
    fn visit_choice(
        &self,
        choice: &mut dyn Choice,
        included: &mut Included,
        include: Option<&IncludeTree>,
    ) -> Result<Option<Node>, CodecError> {
        let candidates = choice.candidates();
        let populated: Vec<usize> = (0..candidates.len())
            .filter(|&index| choice.candidate_mut(index).is_some())
            .collect();

        match populated[..] {
            [] => Ok(None),
            [index] => match choice.candidate_mut(index) {
                Some(target) => self.visit_related(target, included, include).map(Some),
                None => Ok(None),
            },
            _ => Err(CodecError::AmbiguousChoice {
                type_path: choice.type_path(),
                populated: populated.iter().map(|&i| candidates[i].type_path).collect(),
            }),
        }
    }

    fn visit_related(
        &self,
        target: &mut dyn Resource,
        included: &mut Included,
        include: Option<&IncludeTree>,
    ) -> Result<Node, CodecError> {
        let node = self.visit(target, included, include.unwrap_or(IncludeTree::empty()))?;

        if !self.sideload {
            return Ok(node);
        }
        if include.is_none() {
            return Ok(node.into_shallow());
        }

        let reference = node.shallow();
        included.insert(node);
        Ok(reference)
    }
}

fn relationship_name(directive: &Directive) -> String {
    directive.name().unwrap_or_default().to_owned()
}

// Fills unset keys and adds members the outer node does not have yet.
fn merge_embedded(node: &mut Node, embedded: Node, type_path: &str) {
    if node.id.is_none() {
        node.id = embedded.id;
    }
    if node.ty.is_empty() {
        node.ty = embedded.ty;
    }
    if node.client_id.is_none() {
        node.client_id = embedded.client_id;
    }

    for (name, value) in embedded.attributes {
        if node.attributes.contains_key(&name) {
            log::warn!("`{type_path}`: embedded attribute `{name}` is shadowed");
            continue;
        }
        node.attributes.insert(name, value);
    }
    for (name, rel) in embedded.relationships {
        if node.relationships.contains_key(&name) {
            log::warn!("`{type_path}`: embedded relationship `{name}` is shadowed");
            continue;
        }
        node.relationships.insert(name, rel);
    }
    if let Some(links) = embedded.links {
        let target = node.links.get_or_insert_default();
        for (name, link) in links {
            target.entry(name).or_insert(link);
        }
    }
    if let Some(meta) = embedded.meta {
        merge_meta(node.meta.get_or_insert_default(), meta);
    }
}

fn merge_meta(target: &mut Meta, source: Meta) {
    for (name, value) in source {
        target.entry(name).or_insert(value);
    }
}

fn missing_field(schema: &Schema, field: &FieldSchema) -> CodecError {
    CodecError::NotARepresentation {
        type_path: schema.type_path(),
        detail: format!("field `{}` is declared but not accessible", field.ident()),
    }
}

fn shape_mismatch(schema: &Schema, field: &FieldSchema, shape: &str) -> CodecError {
    CodecError::NotARepresentation {
        type_path: schema.type_path(),
        detail: format!(
            "field `{}` is a {} but its directive is `{}`",
            field.ident(),
            shape,
            field.directive().map_or_else(|| "embedded".to_owned(), ToString::to_string),
        ),
    }
}
