//! Graph ⇄ document codec.
//!
//! ## Menu
//!
//! - [`schema`]: static per-type declarations, their parsed [`Schema`] form and
//!   the [`SchemaRegistry`] cache.
//! - [`coerce`]: the type coercion engine ([`Attribute`], [`Identifier`], time,
//!   duration, nested structs, raw codecs).
//! - [`relation`]: relationship slots ([`RelationSlot`], [`PolySlot`]) and
//!   [`Nullable`].
//! - [`Marshaler`]: walks a typed graph and produces a [`Payload`].
//! - [`Unmarshaler`]: walks a [`Payload`] and rebuilds a typed graph.
//! - [`io`]: the byte-stream boundary.
//!
//! # Examples
//!
//! ```
//! use hd_codec::{Marshaler, Nullable, SchemaRegistry, Unmarshaler};
//! use hd_codec::derive::Resource;
//! use hd_codec::include::IncludeTree;
//!
//! #[derive(Resource, Default, Debug, PartialEq)]
//! struct Author {
//!     #[resource("primary,authors")]
//!     id: u64,
//!     #[resource("attr,name")]
//!     name: String,
//! }
//!
//! #[derive(Resource, Default, Debug, PartialEq)]
//! struct Article {
//!     #[resource("primary,articles")]
//!     id: u64,
//!     #[resource("attr,title")]
//!     title: String,
//!     #[resource("relation,author")]
//!     author: Nullable<Author>,
//! }
//!
//! let registry = SchemaRegistry::new();
//! let mut article = Article {
//!     id: 1,
//!     title: "Hello".into(),
//!     author: Nullable::Value(Author { id: 10, name: "Ada".into() }),
//! };
//!
//! let payload = Marshaler::new(&registry)
//!     .with_include(IncludeTree::parse("author"))
//!     .marshal_one(&mut article)
//!     .unwrap();
//! assert_eq!(payload.included.len(), 1);
//!
//! let decoded: Article = Unmarshaler::new(&registry).unmarshal_one(&payload).unwrap();
//! assert_eq!(decoded, article);
//! ```
//!
//! [`Schema`]: schema::Schema
//! [`Attribute`]: coerce::Attribute
//! [`Identifier`]: coerce::Identifier
//! [`RelationSlot`]: relation::RelationSlot
//! [`PolySlot`]: relation::PolySlot
//! [`Payload`]: hd_document::Payload

// Generated code refers to `::hd_codec`; let that path resolve inside the crate too.
extern crate self as hd_codec;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod marshal;
mod unmarshal;

pub mod coerce;
pub mod include;
pub mod io;
pub mod relation;
pub mod schema;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::{BoxError, CodecError};
pub use marshal::Marshaler;
pub use relation::Nullable;
pub use schema::{SchemaRegistry, SchemaRegistryArc};
pub use unmarshal::Unmarshaler;

pub use hd_directive as directive;
pub use hd_document as document;

#[cfg(feature = "derive")]
pub use hd_codec_derive as derive;
