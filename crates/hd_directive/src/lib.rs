//! Per-field codec directives.
//!
//! A directive is the parsed form of an annotation string such as
//! `"attr:published_at,omit_if_empty,rfc3339"`. It tells the codec what a
//! field is (primary key, attribute, relationship, ...), under which name it
//! appears in a document, and how its value is coerced.
//!
//! ## Grammar
//!
//! ```text
//! <kind>[:<name>][,<name>][,<modifier>...]
//! ```
//!
//! - The first token is the [`DirectiveKind`], optionally suffixed with `:name`.
//! - Without a `:name` suffix, the second token is taken as the name unless it
//!   is a known modifier. The short aliases `date`, `time` and `unix` are
//!   names in that slot and modifiers anywhere after it.
//! - All remaining tokens are matched against the fixed [`Modifiers`]
//!   vocabulary. Unknown tokens are kept in [`Directive::ignored`] and
//!   otherwise skipped, so annotations can grow without breaking older readers.
//!
//! # Examples
//!
//! ```
//! use hd_directive::{Directive, DirectiveKind, Modifiers, TimeFormat};
//!
//! let directive = Directive::parse("attr:created,omitempty,timestamp").unwrap();
//! assert_eq!(directive.kind(), DirectiveKind::Attr);
//! assert_eq!(directive.name(), Some("created"));
//! assert!(directive.modifiers().contains(Modifiers::OMIT_IF_EMPTY));
//! assert_eq!(directive.time_format(), TimeFormat::Timestamp);
//!
//! let primary = Directive::parse("primary,articles").unwrap();
//! assert_eq!(primary.name(), Some("articles"));
//! ```
//!
//! This crate has no knowledge of the codec itself; it is shared by the
//! runtime schema registry and the derive macro, which validates annotations
//! at compile time.

// -----------------------------------------------------------------------------
// Modules

mod directive;
mod error;
mod modifiers;

// -----------------------------------------------------------------------------
// Exports

pub use directive::{Directive, DirectiveKind};
pub use error::DirectiveError;
pub use modifiers::{Modifiers, TimeFormat};
