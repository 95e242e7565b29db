use hashbrown::HashSet;
use hd_directive::{Directive, DirectiveKind};

use crate::CodecError;
use crate::schema::{Hooks, ModelDecl};

// -----------------------------------------------------------------------------
// FieldSchema

/// A declared field with its parsed directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSchema {
    index: usize,
    ident: &'static str,
    directive: Option<Directive>,
}

impl FieldSchema {
    /// Position of the field in [`ModelDecl::fields`].
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// `None` for embedded structs.
    #[inline]
    pub fn directive(&self) -> Option<&Directive> {
        self.directive.as_ref()
    }

    #[inline]
    pub fn kind(&self) -> Option<DirectiveKind> {
        self.directive.as_ref().map(Directive::kind)
    }

    /// The document-side name, if the directive has one.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.directive.as_ref().and_then(Directive::name)
    }

    #[inline]
    pub fn is_embedded(&self) -> bool {
        self.directive.is_none()
    }
}

// -----------------------------------------------------------------------------
// Schema

/// The validated form of a [`ModelDecl`].
///
/// Guarantees:
///
/// - at most one `primary`, one `type` and one `client_id` field;
/// - attribute names are unique within the type;
/// - relationship names are unique within the type, and a name is never both
///   a `relation` and a `poly_relation`.
///
/// Embedded structs are validated on their own; their names are merged at
/// encode time with the outer type winning collisions.
#[derive(Debug)]
pub struct Schema {
    decl: &'static ModelDecl,
    resource_type: Option<String>,
    fields: Box<[FieldSchema]>,
}

impl Schema {
    /// Parses and validates a declaration.
    pub fn from_decl(decl: &'static ModelDecl) -> Result<Self, CodecError> {
        let type_path = decl.type_path;
        let mut fields = Vec::with_capacity(decl.fields.len());

        for (index, field) in decl.fields.iter().enumerate() {
            let directive = match field.annotation {
                Some(text) => Some(Directive::parse(text).map_err(|source| {
                    CodecError::MalformedDirective {
                        type_path,
                        field: field.ident,
                        source,
                    }
                })?),
                None => None,
            };
            if let Some(directive) = &directive
                && !directive.ignored().is_empty()
            {
                log::debug!(
                    "`{type_path}.{}`: ignoring unknown directive tokens {:?}",
                    field.ident,
                    directive.ignored(),
                );
            }
            fields.push(FieldSchema {
                index,
                ident: field.ident,
                directive,
            });
        }

        let resource_type = validate(type_path, &fields)?;

        Ok(Self {
            decl,
            resource_type,
            fields: fields.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn declaration(&self) -> &'static ModelDecl {
        self.decl
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.decl.type_path
    }

    /// The resource type named by the `primary` directive.
    #[inline]
    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    #[inline]
    pub fn hooks(&self) -> &'static Hooks {
        &self.decl.hooks
    }

    #[inline]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Finds a field by directive kind and document-side name.
    pub fn field(&self, kind: DirectiveKind, name: &str) -> Option<&FieldSchema> {
        self.fields
            .iter()
            .find(|field| field.kind() == Some(kind) && field.name() == Some(name))
    }

    /// Whether the type has a field of the given kind.
    pub fn has(&self, kind: DirectiveKind) -> bool {
        self.fields.iter().any(|field| field.kind() == Some(kind))
    }
}

fn validate(type_path: &'static str, fields: &[FieldSchema]) -> Result<Option<String>, CodecError> {
    let invalid = |reason: String| CodecError::InvalidSchema { type_path, reason };

    let mut resource_type = None;
    let mut singletons: [Option<&'static str>; 3] = [None; 3];
    let mut attributes = HashSet::new();
    let mut relations = HashSet::new();
    let mut polys = HashSet::new();

    for field in fields {
        let Some(directive) = field.directive() else {
            continue;
        };
        let slot = match directive.kind() {
            DirectiveKind::Primary => Some(0),
            DirectiveKind::Type => Some(1),
            DirectiveKind::ClientId => Some(2),
            _ => None,
        };
        if let Some(slot) = slot
            && let Some(previous) = singletons[slot].replace(field.ident())
        {
            return Err(invalid(format!(
                "`{previous}` and `{}` are both `{}` fields",
                field.ident(),
                directive.kind(),
            )));
        }

        match (directive.kind(), directive.name()) {
            (DirectiveKind::Primary, name) => {
                resource_type = name.filter(|name| !name.is_empty()).map(str::to_owned);
            }
            (DirectiveKind::Attr, Some(name)) => {
                if !attributes.insert(name) {
                    return Err(invalid(format!("attribute `{name}` is declared twice")));
                }
            }
            (DirectiveKind::Relation, Some(name)) => {
                if polys.contains(name) {
                    return Err(CodecError::ConflictingRelation {
                        type_path,
                        name: name.to_owned(),
                    });
                }
                if !relations.insert(name) {
                    return Err(invalid(format!("relation `{name}` is declared twice")));
                }
            }
            (DirectiveKind::PolyRelation, Some(name)) => {
                if relations.contains(name) {
                    return Err(CodecError::ConflictingRelation {
                        type_path,
                        name: name.to_owned(),
                    });
                }
                if !polys.insert(name) {
                    return Err(invalid(format!("relation `{name}` is declared twice")));
                }
            }
            _ => {}
        }
    }

    Ok(resource_type)
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use hd_directive::DirectiveKind;

    use super::Schema;
    use crate::CodecError;
    use crate::schema::{FieldDecl, Hooks, ModelDecl};

    macro_rules! decl {
        ($($field:expr),* $(,)?) => {
            &ModelDecl {
                type_path: "tests::Decl",
                type_id: TypeId::of::<()>,
                fields: &[$($field),*],
                hooks: Hooks::NONE,
            }
        };
    }

    #[test]
    fn parses_fields_in_order() {
        static DECL: &ModelDecl = decl![
            FieldDecl::new("id", "primary,articles"),
            FieldDecl::new("title", "attr,title,omitempty"),
            FieldDecl::embedded("stamps"),
            FieldDecl::new("author", "relation,author"),
        ];

        let schema = Schema::from_decl(DECL).unwrap();
        assert_eq!(schema.resource_type(), Some("articles"));
        assert_eq!(schema.fields().len(), 4);
        assert!(schema.fields()[2].is_embedded());
        assert_eq!(schema.fields()[3].index(), 3);

        let title = schema.field(DirectiveKind::Attr, "title").unwrap();
        assert!(title.directive().unwrap().omit_if_empty());
        assert!(schema.has(DirectiveKind::Relation));
        assert!(!schema.has(DirectiveKind::ClientId));
    }

    #[test]
    fn malformed_annotation() {
        static DECL: &ModelDecl = decl![FieldDecl::new("id", "identifier")];
        let err = Schema::from_decl(DECL).unwrap_err();
        assert!(matches!(err, CodecError::MalformedDirective { field: "id", .. }));
    }

    #[test]
    fn duplicates_are_rejected() {
        static PRIMARY: &ModelDecl = decl![
            FieldDecl::new("a", "primary,x"),
            FieldDecl::new("b", "primary,x"),
        ];
        static ATTR: &ModelDecl = decl![
            FieldDecl::new("a", "attr,name"),
            FieldDecl::new("b", "attr,name"),
        ];
        assert!(matches!(
            Schema::from_decl(PRIMARY),
            Err(CodecError::InvalidSchema { .. })
        ));
        assert!(matches!(
            Schema::from_decl(ATTR),
            Err(CodecError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn relation_and_poly_share_a_name() {
        static DECL: &ModelDecl = decl![
            FieldDecl::new("a", "relation,topic"),
            FieldDecl::new("b", "poly_relation,topic"),
        ];
        let err = Schema::from_decl(DECL).unwrap_err();
        assert!(matches!(err, CodecError::ConflictingRelation { ref name, .. } if name == "topic"));
    }
}
