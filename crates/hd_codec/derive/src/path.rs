//! Paths used by generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the access path to the `hd_codec` crate.
///
/// 1. For crates that depend on `hd_codec`, `::hd_codec` is returned.
/// 2. For crates that depend on `hyperdoc`, `::hyperdoc::codec` is returned.
/// 3. Otherwise `::hd_codec` is returned, which also resolves inside
///    `hd_codec` itself.
///
/// This reads the caller's manifest, so it is called once per expansion and
/// the result is passed around.
pub(crate) fn hd_codec() -> syn::Path {
    hd_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("hd_codec"))
}

#[inline(always)]
pub(crate) fn schema_(hd_codec: &syn::Path) -> TokenStream {
    quote! { #hd_codec::schema }
}

#[inline(always)]
pub(crate) fn coerce_(hd_codec: &syn::Path) -> TokenStream {
    quote! { #hd_codec::coerce }
}

#[inline(always)]
pub(crate) fn document_(hd_codec: &syn::Path) -> TokenStream {
    quote! { #hd_codec::document }
}

#[inline(always)]
pub(crate) fn option_() -> TokenStream {
    quote! { ::core::option::Option }
}

#[inline(always)]
pub(crate) fn result_() -> TokenStream {
    quote! { ::core::result::Result }
}
