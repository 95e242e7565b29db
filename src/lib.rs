#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use hd_codec as codec;
pub use hd_directive as directive;
pub use hd_document as document;

pub use hd_codec::{Marshaler, SchemaRegistry, Unmarshaler};
