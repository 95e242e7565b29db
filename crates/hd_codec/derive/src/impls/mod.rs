//! Code generation.

// -----------------------------------------------------------------------------
// Modules

mod choice;
mod resource;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use choice::impl_choice;
pub(crate) use resource::impl_resource;
