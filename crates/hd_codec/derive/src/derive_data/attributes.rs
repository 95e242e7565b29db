use hd_directive::{Directive, DirectiveKind};
use proc_macro2::Span;
use syn::parse::ParseStream;
use syn::spanned::Spanned;
use syn::{Attribute, Ident, LitStr, Path};

use crate::RESOURCE_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// Type attributes

/// `#[resource(before_encode = path, ...)]` on the struct itself.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub before_encode: Option<Path>,
    pub after_decode: Option<Path>,
    pub links: Option<Path>,
    pub meta: Option<Path>,
    pub relationship_links: Option<Path>,
    pub relationship_meta: Option<Path>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(RESOURCE_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let slot = if meta.path.is_ident("before_encode") {
                    &mut this.before_encode
                } else if meta.path.is_ident("after_decode") {
                    &mut this.after_decode
                } else if meta.path.is_ident("links") {
                    &mut this.links
                } else if meta.path.is_ident("meta") {
                    &mut this.meta
                } else if meta.path.is_ident("relationship_links") {
                    &mut this.relationship_links
                } else if meta.path.is_ident("relationship_meta") {
                    &mut this.relationship_meta
                } else {
                    return Err(meta.error(
                        "expected one of `before_encode`, `after_decode`, `links`, `meta`, \
                         `relationship_links`, `relationship_meta`",
                    ));
                };
                if slot.is_some() {
                    return Err(meta.error("hook declared twice"));
                }
                *slot = Some(meta.value()?.parse()?);
                Ok(())
            })?;
        }
        Ok(this)
    }

    pub fn is_empty(&self) -> bool {
        self.before_encode.is_none()
            && self.after_decode.is_none()
            && self.links.is_none()
            && self.meta.is_none()
            && self.relationship_links.is_none()
            && self.relationship_meta.is_none()
    }
}

// -----------------------------------------------------------------------------
// Field attributes

/// `#[resource("...")]` or `#[resource(embedded)]` on a field.
pub(crate) enum FieldAttribute {
    Directive { annotation: LitStr, kind: DirectiveKind },
    Embedded,
}

impl FieldAttribute {
    /// `Ok(None)` for fields without the attribute.
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Option<Self>> {
        let mut found: Option<(Self, Span)> = None;
        for attr in attrs {
            if !attr.path().is_ident(RESOURCE_ATTRIBUTE_NAME) {
                continue;
            }
            if let Some((_, first)) = &found {
                let mut err = syn::Error::new_spanned(attr, "a field takes a single `resource` attribute");
                err.combine(syn::Error::new(*first, "first declared here"));
                return Err(err);
            }
            let parsed = attr.parse_args_with(Self::parse_inner)?;
            found = Some((parsed, attr.span()));
        }
        Ok(found.map(|(attr, _)| attr))
    }

    fn parse_inner(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            let annotation: LitStr = input.parse()?;
            // Reject malformed annotations at compile time, pointing at the literal.
            let directive = Directive::parse(&annotation.value())
                .map_err(|err| syn::Error::new(annotation.span(), err))?;
            return Ok(Self::Directive {
                kind: directive.kind(),
                annotation,
            });
        }

        let ident: Ident = input.parse()?;
        if ident == "embedded" {
            Ok(Self::Embedded)
        } else {
            Err(syn::Error::new(
                ident.span(),
                "expected a directive string such as `\"attr,name\"` or `embedded`",
            ))
        }
    }
}
