#![doc = include_str!("../README.md")]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod bind;
mod binder;
mod cache;
mod capability;
mod convenience;
mod error;
mod expr;
mod key;
mod strategy;
mod validate;

pub mod coercion;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use bind::{
    ArrayFactory, Constructor, Factory, FieldGetter, FieldSetter, IndexGetter, IndexSetter, ListFactory,
    MapFactory, MethodInvoker, ObjectConstructor, ObjectGetter, ObjectIndexGetter, ObjectIndexSetter,
    ObjectInvoker, ObjectSetter, SetAdder, SetClearer, SetFactory, StaticGetter, StaticInvoker,
    StaticSetter,
};
pub use binder::Binder;
pub use cache::BindingCache;
pub use capability::{Capabilities, CapabilityScope};
pub use error::BindError;
pub use key::{CapabilityKey, Category, CollectionKind, Subject};
pub use strategy::{Ladder, Operation, Strategy};
