//! Paths into `vc_reflect` used by the generated code.
//!
//! The only special one is the path of `vc_reflect` itself, see [`vc_reflect`].

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the correct access path to the `vc_reflect` crate.
///
/// 1. For crates that depend on `vc_reflect`, `::vc_reflect` is returned.
/// 2. For crates that depend on `vc_accel`, `::vc_accel::reflect` is returned.
/// 3. Otherwise `::vc_reflect` is returned, which may be incorrect.
///
/// This reads the caller's manifest, so call it once per derive.
pub(crate) fn vc_reflect() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_reflect"))
}

// -----------------------------------------------------------------------------
// Items

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::__macro_exports::auto_register
    }
}

#[inline(always)]
pub(crate) fn reflect_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::Reflect
    }
}

#[inline(always)]
pub(crate) fn typed_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::info::Typed
    }
}

#[inline(always)]
pub(crate) fn type_kind_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::info::TypeKind
    }
}

#[inline(always)]
pub(crate) fn field_info_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::info::FieldInfo
    }
}

#[inline(always)]
pub(crate) fn constructor_info_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::info::ConstructorInfo
    }
}

#[inline(always)]
pub(crate) fn get_type_meta_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::registry::GetTypeMeta
    }
}

#[inline(always)]
pub(crate) fn type_meta_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::registry::TypeMeta
    }
}

#[inline(always)]
pub(crate) fn type_registry_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::registry::TypeRegistry
    }
}

#[inline(always)]
pub(crate) fn from_type_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::registry::FromType
    }
}

#[inline(always)]
pub(crate) fn type_trait_default_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::registry::TypeTraitDefault
    }
}

#[inline(always)]
pub(crate) fn type_trait_array_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::registry::TypeTraitArray
    }
}

#[inline(always)]
pub(crate) fn type_trait_hash_(vc_reflect_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_reflect_path::registry::TypeTraitHash
    }
}
