//! Derive macros for `hd_codec`:
//!
//! - [`Resource`]
//! - [`Choice`]
#![cfg_attr(docsrs, feature(doc_cfg))]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static RESOURCE_ATTRIBUTE_NAME: &str = "resource";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Resource Derivation
///
/// `#[derive(Resource)]` implements `Model`, `Resource` and `Attribute` for a
/// struct with named fields. The struct must also implement `Default`.
///
/// ## Field Directives
///
/// A field takes part in encoding when it carries a directive. The string is
/// checked at compile time:
///
/// ```rust, ignore
/// #[derive(Resource, Default)]
/// struct Article {
///     #[resource("primary,articles")]
///     id: u64,
///     #[resource("attr,title,omitempty")]
///     title: String,
///     #[resource("attr,published,rfc3339")]
///     published: chrono::DateTime<chrono::Utc>,
///     #[resource("relation,author")]
///     author: Option<Author>,
///     #[resource("relation,comments")]
///     comments: Vec<Comment>,
///     #[resource("poly_relation,subject")]
///     subject: Option<Subject>,
///     #[resource("links")]
///     links: Option<Links>,
///     cache_key: String,
/// }
/// ```
///
/// Fields without a directive (`cache_key` above) are invisible to the codec.
///
/// ## Embedded Structs
///
/// `#[resource(embedded)]` flattens another `Resource` into this one. Its
/// fields behave as if they were declared at this level.
///
/// ```rust, ignore
/// #[derive(Resource, Default)]
/// struct Audit {
///     #[resource("attr,created_by")]
///     created_by: String,
/// }
///
/// #[derive(Resource, Default)]
/// struct Post {
///     #[resource("primary,posts")]
///     id: u64,
///     #[resource(embedded)]
///     audit: Audit,
/// }
/// ```
///
/// ## Nested Structs
///
/// Every derived type is also an `Attribute`: used in an `attr` field it is
/// encoded as an object of its own `attr` fields.
///
/// ## Hooks
///
/// Lifecycle callbacks are declared on the type:
///
/// ```rust, ignore
/// #[derive(Resource, Default)]
/// #[resource(before_encode = Self::stamp, after_decode = validate)]
/// #[resource(links = Self::links, meta = Self::meta)]
/// #[resource(relationship_links = rel_links, relationship_meta = rel_meta)]
/// struct Article { /* ... */ }
///
/// // fn stamp(&mut Article) -> HookResult
/// // fn validate(&mut Article) -> HookResult
/// // fn links(&Article) -> Option<Links>
/// // fn meta(&Article) -> Option<Meta>
/// // fn rel_links(&Article, &str) -> Option<Links>
/// // fn rel_meta(&Article, &str) -> Option<Meta>
/// ```
///
/// Generic structs are not supported.
#[proc_macro_derive(Resource, attributes(resource))]
pub fn derive_resource(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let info = match derive_data::ResourceStruct::from_input(&ast) {
        Ok(info) => info,
        Err(err) => return err.into_compile_error().into(),
    };

    impls::impl_resource(&info, &path::hd_codec()).into()
}

/// # Choice Derivation
///
/// `#[derive(Choice)]` implements `Choice` and `ChoiceModel` for a struct
/// whose fields are all `Option<T>` with `T: Model`. It is the target of a
/// `poly_relation` field; decoding populates the first candidate whose
/// resource type matches the document node.
///
/// ```rust, ignore
/// #[derive(Choice, Default)]
/// struct Subject {
///     post: Option<Post>,
///     photo: Option<Box<Photo>>,
/// }
/// ```
///
/// The struct must also implement `Default`. Generic structs are not
/// supported.
#[proc_macro_derive(Choice)]
pub fn derive_choice(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let info = match derive_data::ChoiceStruct::from_input(&ast) {
        Ok(info) => info,
        Err(err) => return err.into_compile_error().into(),
    };

    impls::impl_choice(&info, &path::hd_codec()).into()
}
