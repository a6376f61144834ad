//! Static descriptions of reflected types and their members.
//!
//! - [`Type`]: identity and [`TypeKind`] of a type.
//! - [`Typed`]: static access to the [`Type`] of `Self`.
//! - [`FieldInfo`], [`PropertyInfo`], [`MethodInfo`], [`ConstructorInfo`]:
//!   member descriptors. Each carries a dynamic implementation and, when
//!   registered with concrete types, a typed accessor from [`typed_access`].

// -----------------------------------------------------------------------------
// Modules

mod args;
mod constructor_info;
mod field_info;
mod member;
mod method_info;
mod property_info;
mod ty;
mod typed;

pub mod typed_access;

// -----------------------------------------------------------------------------
// Exports

pub use args::{ArgList, IntoFunction, IntoMethod};
pub use constructor_info::ConstructorInfo;
pub use field_info::FieldInfo;
pub use member::{DynGetter, DynInvoke, DynSetter, Member, MemberId, MemberKind, ParamInfo, ParamMode};
pub use method_info::MethodInfo;
pub use property_info::{IndexerBuilder, PropertyBuilder, PropertyInfo, StaticPropertyBuilder};
pub use ty::{Type, TypeKind};
pub use typed::Typed;

pub(crate) use member::{param_types, receiver_mut, receiver_ref};
