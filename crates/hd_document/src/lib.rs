//! Wire-format data structures of a hypermedia document.
//!
//! ## Menu
//!
//! - [`Node`]: one resource (`id`, `type`, `attributes`, `relationships`, ...).
//! - [`RelationshipNode`] / [`RelationData`]: to-one and to-many linkage.
//! - [`Payload`] / [`PrimaryData`]: a top-level `data` document.
//! - [`Included`]: the deduplicating `included` accumulator.
//! - [`IncludedIndex`]: `(type, id)` lookups into a decoded `included`.
//! - [`ErrorObject`] / [`ErrorsPayload`]: a top-level `errors` document.
//! - [`Classified`]: the contract errors must satisfy to become [`ErrorObject`]s.
//!
//! Everything here is plain data. Building nodes from typed values and back is
//! the job of the codec.

// -----------------------------------------------------------------------------
// Modules

mod error;
mod included;
mod link;
mod node;
mod payload;

// -----------------------------------------------------------------------------
// Exports

pub use error::{Classified, ErrorDetail, ErrorObject, ErrorSource, ErrorsPayload};
pub use error::{VALIDATION_CODE, reason_phrase};
pub use included::{Included, IncludedIndex, ResourceKey};
pub use link::{Link, LinkObject, Links, Meta};
pub use node::{Node, RelationData, RelationshipNode};
pub use payload::{Payload, PrimaryData};

pub use serde_json::{Map, Value};
