// -----------------------------------------------------------------------------
// Modules

mod object;
mod reflect;

// -----------------------------------------------------------------------------
// Exports

pub use object::{Object, cast_same, reflect_mut, reflect_ref};
pub use reflect::Reflect;
