use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::Path;
use syn::spanned::Spanned;

use crate::derive_data::ChoiceStruct;
use crate::path::{option_, schema_};

/// `Choice` and `ChoiceModel` for a struct of `Option<T>` candidates.
pub(crate) fn impl_choice(info: &ChoiceStruct, hd_codec: &Path) -> TokenStream {
    let schema_ = schema_(hd_codec);
    let option_ = option_();

    let ident = info.ident;
    let name = ident.to_string();

    let declarations = info.candidates.iter().map(|field| {
        let ty = field.ty;
        quote_spanned! { ty.span()=> <#ty as #schema_::Candidate>::DECLARATION }
    });

    let get_arms = info.candidates.iter().enumerate().map(|(index, field)| {
        let member = field.ident;
        quote! { #index => #schema_::Candidate::get_mut(&mut self.#member), }
    });

    let clears = info.candidates.iter().map(|field| {
        let member = field.ident;
        quote! { #schema_::Candidate::clear(&mut self.#member); }
    });

    let select_arms = info.candidates.iter().enumerate().map(|(index, field)| {
        let member = field.ident;
        quote! { #index => #option_::Some(#schema_::Candidate::select(&mut self.#member)), }
    });

    quote! {
        impl #schema_::ChoiceModel for #ident {
            const CANDIDATES: &'static [&'static #schema_::ModelDecl] = &[#(#declarations),*];
        }

        impl #schema_::Choice for #ident {
            #[inline]
            fn type_path(&self) -> &'static str {
                ::core::concat!(::core::module_path!(), "::", #name)
            }

            #[inline]
            fn candidates(&self) -> &'static [&'static #schema_::ModelDecl] {
                <Self as #schema_::ChoiceModel>::CANDIDATES
            }

            fn candidate_mut(&mut self, index: usize) -> #option_<&mut dyn #schema_::Resource> {
                match index {
                    #(#get_arms)*
                    _ => #option_::None,
                }
            }

            fn select(&mut self, index: usize) -> #option_<&mut dyn #schema_::Resource> {
                if index >= <Self as #schema_::ChoiceModel>::CANDIDATES.len() {
                    return #option_::None;
                }
                #(#clears)*
                match index {
                    #(#select_arms)*
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
    }
}
