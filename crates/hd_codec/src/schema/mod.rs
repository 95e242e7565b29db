//! Per-type declarations and their parsed form.
//!
//! Every encodable struct carries a static [`ModelDecl`], normally produced by
//! `#[derive(Resource)]`: its type path, one [`FieldDecl`] per annotated field
//! and optional [`Hooks`]. The first time a type is seen, the
//! [`SchemaRegistry`] parses every annotation into a
//! [`Directive`](hd_directive::Directive), validates the combination, and
//! caches the result as an `Arc<`[`Schema`]`>`.
//!
//! Field values are reached through the object-safe [`Resource`] trait, which
//! hands out one typed handle ([`FieldRef`] / [`FieldMut`]) per declared field.
//!
//! ## Menu
//!
//! - [`ModelDecl`], [`FieldDecl`], [`Hooks`]: static declarations.
//! - [`Resource`], [`Model`]: accessors implemented by the derive.
//! - [`Choice`], [`ChoiceModel`], [`Candidate`]: polymorphic relation targets.
//! - [`Schema`], [`FieldSchema`]: validated, parsed declarations.
//! - [`SchemaRegistry`], [`SchemaRegistryArc`]: the lazy cache.

// -----------------------------------------------------------------------------
// Modules

mod decl;
mod parsed;
mod registry;
mod resource;

// -----------------------------------------------------------------------------
// Exports

pub use decl::{
    DecodeHook, EncodeHook, FieldDecl, HookResult, Hooks, LinksHook, MetaHook, ModelDecl,
    RelationshipLinksHook, RelationshipMetaHook,
};
pub use parsed::{FieldSchema, Schema};
pub use registry::{SchemaRegistry, SchemaRegistryArc};
pub use resource::{Candidate, Choice, ChoiceModel, FieldMut, FieldRef, Model, Resource};
