//! See the [`Reflect`] derive macro.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static REFLECT_ATTRIBUTE_NAME: &str = "reflect";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Reflection Derivation
///
/// `#[derive(Reflect)]` implements the following traits:
///
/// - `Typed`
/// - `GetTypeMeta`
///
/// `Reflect` itself is implemented for every `Clone + Debug + Send + Sync + 'static`
/// type, so the deriving type must provide `Clone` and `Debug`.
///
/// The generated `TypeMeta` contains one `FieldInfo` per field, each with a
/// typed accessor. Tuple struct fields are named `"0"`, `"1"` and so on.
/// Enums and unit structs are registered without members.
///
/// ## Type attributes
///
/// ```rust, ignore
/// #[derive(Reflect, Clone, Debug, Default, PartialEq, Eq, Hash)]
/// #[reflect(reference, default, hash, auto_register)]
/// struct Foo { /* ... */ }
/// ```
///
/// - `reference`: the type's kind is `TypeKind::Reference` instead of `TypeKind::Value`.
/// - `default`: the type implements `Default`. Adds a parameterless constructor,
///   `TypeTraitDefault` and `TypeTraitArray`.
/// - `hash`: the type implements `Eq + Hash`. Adds `TypeTraitHash`.
/// - `auto_register`: submits the type for `TypeRegistry::auto_register`.
///   No effect on generic types or when the `auto_register` feature is disabled.
///
/// ## Field attributes
///
/// - `skip`: the field is not described.
///
/// ```rust, ignore
/// #[derive(Reflect, Clone, Debug)]
/// struct Foo {
///     visible: i32,
///     #[reflect(skip)]
///     cache: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match derive_data::ReflectDerive::from_input(&ast) {
        Ok(derive) => impls::impl_reflect_derive(&derive).into(),
        Err(err) => err.into_compile_error().into(),
    }
}
