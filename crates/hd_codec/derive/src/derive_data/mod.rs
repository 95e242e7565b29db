//! Parsed form of the derive input.

// -----------------------------------------------------------------------------
// Modules

mod attributes;

// -----------------------------------------------------------------------------
// Internal API

use hd_directive::DirectiveKind;
use syn::{Data, DeriveInput, Fields, Ident, Type};

pub(crate) use attributes::{FieldAttribute, TypeAttributes};

/// Which handle a field is exposed through.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldShape {
    Key,
    Value,
    Relation,
    Poly,
    Embedded,
}

impl FieldShape {
    fn of(attr: &FieldAttribute) -> Self {
        match attr {
            FieldAttribute::Embedded => Self::Embedded,
            FieldAttribute::Directive { kind, .. } => match kind {
                DirectiveKind::Primary | DirectiveKind::Type | DirectiveKind::ClientId => Self::Key,
                DirectiveKind::Attr | DirectiveKind::Links | DirectiveKind::Meta => Self::Value,
                DirectiveKind::Relation => Self::Relation,
                DirectiveKind::PolyRelation => Self::Poly,
            },
        }
    }
}

/// One field carrying a `resource` attribute.
pub(crate) struct ResourceField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub attr: FieldAttribute,
    pub shape: FieldShape,
}

/// A struct deriving `Resource`.
pub(crate) struct ResourceStruct<'a> {
    pub ident: &'a Ident,
    pub attrs: TypeAttributes,
    /// Annotated fields in declaration order; the position is the field index.
    pub fields: Vec<ResourceField<'a>>,
}

impl<'a> ResourceStruct<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let named = named_fields(input, "Resource")?;
        let attrs = TypeAttributes::parse_attrs(&input.attrs)?;

        let mut fields = Vec::new();
        let mut errors: Option<syn::Error> = None;
        for field in named {
            match FieldAttribute::parse_attrs(&field.attrs) {
                Ok(Some(attr)) => fields.push(ResourceField {
                    // Named fields always have an ident.
                    ident: field.ident.as_ref().unwrap_or(&input.ident),
                    ty: &field.ty,
                    shape: FieldShape::of(&attr),
                    attr,
                }),
                Ok(None) => {}
                Err(err) => match &mut errors {
                    Some(errors) => errors.combine(err),
                    None => errors = Some(err),
                },
            }
        }
        if let Some(errors) = errors {
            return Err(errors);
        }

        Ok(Self {
            ident: &input.ident,
            attrs,
            fields,
        })
    }
}

/// One candidate of a struct deriving `Choice`.
pub(crate) struct ChoiceField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
}

/// A struct deriving `Choice`.
pub(crate) struct ChoiceStruct<'a> {
    pub ident: &'a Ident,
    pub candidates: Vec<ChoiceField<'a>>,
}

impl<'a> ChoiceStruct<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let named = named_fields(input, "Choice")?;
        let candidates: Vec<_> = named
            .iter()
            .filter_map(|field| {
                Some(ChoiceField {
                    ident: field.ident.as_ref()?,
                    ty: &field.ty,
                })
            })
            .collect();

        if candidates.is_empty() {
            return Err(syn::Error::new(
                input.ident.span(),
                "`Choice` needs at least one `Option<T>` candidate field",
            ));
        }

        Ok(Self {
            ident: &input.ident,
            candidates,
        })
    }
}

fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> syn::Result<&'a syn::punctuated::Punctuated<syn::Field, syn::Token![,]>> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            format!("`{derive}` cannot be derived for generic types"),
        ));
    }
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new(
                input.ident.span(),
                format!("`{derive}` can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new(
            input.ident.span(),
            format!("`{derive}` can only be derived for structs"),
        )),
    }
}
