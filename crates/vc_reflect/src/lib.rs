#![doc = include_str!("../README.md")]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// Derive output names `::vc_reflect`, which must also resolve inside this
// crate's own tests and doc tests.
extern crate self as vc_reflect;

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod reflection;

pub mod info;
pub mod ops;
pub mod registry;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use error::CallError;
pub use reflection::{Object, Reflect, cast_same, reflect_mut, reflect_ref};
pub use vc_reflect_derive as derive;
