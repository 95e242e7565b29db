use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{Ident, Path};

use crate::derive_data::{FieldAttribute, FieldShape, ResourceStruct, TypeAttributes};
use crate::path::{coerce_, document_, option_, result_, schema_};

/// `Model`, `Resource` and `Attribute` for a struct.
pub(crate) fn impl_resource(info: &ResourceStruct, hd_codec: &Path) -> TokenStream {
    let schema_ = schema_(hd_codec);
    let coerce_ = coerce_(hd_codec);
    let document_ = document_(hd_codec);
    let option_ = option_();
    let result_ = result_();

    let ident = info.ident;
    let name = ident.to_string();

    let field_decls = info.fields.iter().map(|field| {
        let field_name = field.ident.to_string();
        match &field.attr {
            FieldAttribute::Directive { annotation, .. } => {
                quote! { #schema_::FieldDecl::new(#field_name, #annotation) }
            }
            FieldAttribute::Embedded => quote! { #schema_::FieldDecl::embedded(#field_name) },
        }
    });

    let hooks = impl_hooks(ident, &info.attrs, hd_codec);

    let ref_arms = info.fields.iter().enumerate().map(|(index, field)| {
        let member = field.ident;
        let span = field.ty.span();
        let handle = match field.shape {
            FieldShape::Key => quote_spanned! { span=> #schema_::FieldRef::Key(&self.#member) },
            FieldShape::Value => quote_spanned! { span=> #schema_::FieldRef::Value(&self.#member) },
            FieldShape::Relation | FieldShape::Poly => quote! { #schema_::FieldRef::Relationship },
            FieldShape::Embedded => {
                quote_spanned! { span=> #schema_::FieldRef::Embedded(&self.#member) }
            }
        };
        quote! { #index => #option_::Some(#handle), }
    });

    let mut_arms = info.fields.iter().enumerate().map(|(index, field)| {
        let member = field.ident;
        let span = field.ty.span();
        let handle = match field.shape {
            FieldShape::Key => quote_spanned! { span=> #schema_::FieldMut::Key(&mut self.#member) },
            FieldShape::Value => {
                quote_spanned! { span=> #schema_::FieldMut::Value(&mut self.#member) }
            }
            FieldShape::Relation => {
                quote_spanned! { span=> #schema_::FieldMut::Relation(&mut self.#member) }
            }
            FieldShape::Poly => quote_spanned! { span=> #schema_::FieldMut::Poly(&mut self.#member) },
            FieldShape::Embedded => {
                quote_spanned! { span=> #schema_::FieldMut::Embedded(&mut self.#member) }
            }
        };
        quote! { #index => #option_::Some(#handle), }
    });

    quote! {
        impl #schema_::Model for #ident {
            const DECLARATION: &'static #schema_::ModelDecl = &#schema_::ModelDecl {
                type_path: ::core::concat!(::core::module_path!(), "::", #name),
                type_id: ::core::any::TypeId::of::<#ident>,
                fields: &[#(#field_decls),*],
                hooks: #hooks,
            };
        }

        impl #schema_::Resource for #ident {
            #[inline]
            fn declaration(&self) -> &'static #schema_::ModelDecl {
                <Self as #schema_::Model>::DECLARATION
            }

            #[allow(clippy::match_single_binding)]
            fn field(&self, index: usize) -> #option_<#schema_::FieldRef<'_>> {
                match index {
                    #(#ref_arms)*
                    _ => #option_::None,
                }
            }

            #[allow(clippy::match_single_binding)]
            fn field_mut(&mut self, index: usize) -> #option_<#schema_::FieldMut<'_>> {
                match index {
                    #(#mut_arms)*
                    _ => #option_::None,
                }
            }

            #[inline]
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            #[inline]
            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }

        impl #coerce_::Attribute for #ident {
            fn encode(
                &self,
                cx: &#coerce_::AttrContext<'_>,
            ) -> #result_<#option_<#document_::Value>, #hd_codec::CodecError> {
                #coerce_::encode_nested(self, cx.registry).map(#option_::Some)
            }

            fn decode(
                value: #document_::Value,
                cx: &#coerce_::AttrContext<'_>,
            ) -> #result_<Self, #hd_codec::CodecError> {
                #coerce_::decode_nested::<Self>(value, cx.registry)
            }
        }
    }
}

// `Hooks` value: one wrapper per declared hook, downcasting to the concrete
// type before calling the user function.
fn impl_hooks(ident: &Ident, attrs: &TypeAttributes, hd_codec: &Path) -> TokenStream {
    let schema_ = schema_(hd_codec);
    let document_ = document_(hd_codec);
    let option_ = option_();
    let result_ = result_();

    if attrs.is_empty() {
        return quote! { #schema_::Hooks::NONE };
    }

    let mut items = Vec::new();
    let mut slots = Vec::new();

    let mut wrap = |slot: &str, alias: &str, body: TokenStream, sig: TokenStream| {
        let slot = Ident::new(slot, Span::call_site());
        let alias = Ident::new(alias, Span::call_site());
        let wrapper = format_ident!("__hd_{}", slot);
        items.push(quote! {
            fn #wrapper #sig {
                #body
            }
        });
        slots.push(quote! {
            #slot: #option_::Some(#wrapper as #schema_::#alias),
        });
    };

    if let Some(user) = &attrs.before_encode {
        let user = resolve_self(user, ident);
        wrap(
            "before_encode",
            "EncodeHook",
            quote! {
                match model.as_any_mut().downcast_mut::<#ident>() {
                    #option_::Some(model) => #user(model),
                    #option_::None => #result_::Ok(()),
                }
            },
            quote! { (model: &mut dyn #schema_::Resource) -> #schema_::HookResult },
        );
    }
    if let Some(user) = &attrs.after_decode {
        let user = resolve_self(user, ident);
        wrap(
            "after_decode",
            "DecodeHook",
            quote! {
                match model.as_any_mut().downcast_mut::<#ident>() {
                    #option_::Some(model) => #user(model),
                    #option_::None => #result_::Ok(()),
                }
            },
            quote! { (model: &mut dyn #schema_::Resource) -> #schema_::HookResult },
        );
    }
    if let Some(user) = &attrs.links {
        let user = resolve_self(user, ident);
        wrap(
            "links",
            "LinksHook",
            quote! { model.as_any().downcast_ref::<#ident>().and_then(#user) },
            quote! { (model: &dyn #schema_::Resource) -> #option_<#document_::Links> },
        );
    }
    if let Some(user) = &attrs.meta {
        let user = resolve_self(user, ident);
        wrap(
            "meta",
            "MetaHook",
            quote! { model.as_any().downcast_ref::<#ident>().and_then(#user) },
            quote! { (model: &dyn #schema_::Resource) -> #option_<#document_::Meta> },
        );
    }
    if let Some(user) = &attrs.relationship_links {
        let user = resolve_self(user, ident);
        wrap(
            "relationship_links",
            "RelationshipLinksHook",
            quote! {
                model.as_any().downcast_ref::<#ident>().and_then(|model| #user(model, name))
            },
            quote! {
                (model: &dyn #schema_::Resource, name: &str) -> #option_<#document_::Links>
            },
        );
    }
    if let Some(user) = &attrs.relationship_meta {
        let user = resolve_self(user, ident);
        wrap(
            "relationship_meta",
            "RelationshipMetaHook",
            quote! {
                model.as_any().downcast_ref::<#ident>().and_then(|model| #user(model, name))
            },
            quote! {
                (model: &dyn #schema_::Resource, name: &str) -> #option_<#document_::Meta>
            },
        );
    }

    quote! {
        {
            #(#items)*

            #schema_::Hooks {
                #(#slots)*
                ..#schema_::Hooks::NONE
            }
        }
    }
}

// Hook bodies live in nested functions, where `Self` does not resolve.
fn resolve_self(user: &Path, ident: &Ident) -> Path {
    let mut path = user.clone();
    if let Some(first) = path.segments.first_mut()
        && first.ident == "Self"
    {
        first.ident = ident.clone();
    }
    path
}
