// -----------------------------------------------------------------------------
// Modules

mod array;
mod default;
mod hash;
mod list;

// -----------------------------------------------------------------------------
// Exports

pub use array::TypeTraitArray;
pub use default::TypeTraitDefault;
pub use hash::TypeTraitHash;
pub use list::TypeTraitList;
