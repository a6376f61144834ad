//! Type registry for querying type information without an instance.
//!
//! ## Menu
//!
//! - [`TypeTrait`]: A capability supported by a type.
//! - [`FromType`]: Creates a `TypeTrait` for a type.
//! - [`TypeMeta`]: A [`Type`], its member descriptors and a [`TypeTrait`] table.
//! - [`GetTypeMeta`]: Creates the `TypeMeta` of a type.
//! - [`TypeRegistry`]: Stores `TypeMeta`s, [`Upcast`]s, closed generics and
//!   dictionary factories.
//! - TypeTraits:
//!     - [`TypeTraitDefault`]: [`Default`] values.
//!     - [`TypeTraitList`]: `Vec<T>` creation, present on every type.
//!     - [`TypeTraitArray`]: `Box<[T]>` creation for [`Default`] types.
//!     - [`TypeTraitHash`]: `Eq + Hash` support and `HashSet<T>` creation.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`]. Static registration is implemented
//! with the [`inventory`] crate, which supports all major platforms.
//!
//! [`Type`]: crate::info::Type

// -----------------------------------------------------------------------------
// Modules

mod from_type;
mod impls;
mod traits;
mod type_meta;
mod type_registry;
mod type_trait;
mod upcast;

// -----------------------------------------------------------------------------
// Exports

pub use from_type::FromType;
pub use traits::{TypeTraitArray, TypeTraitDefault, TypeTraitHash, TypeTraitList};
pub use type_meta::{GenericInfo, GetTypeMeta, TypeMeta};
pub use type_registry::{TypeRegistry, TypeRegistryArc};
pub use type_trait::TypeTrait;
pub use upcast::Upcast;
