//! Code generation for `#[derive(Reflect)]`.

use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::ext::IdentExt;
use syn::{GenericParam, LitStr};

use crate::derive_data::ReflectDerive;

pub(crate) fn impl_reflect_derive(derive: &ReflectDerive) -> TokenStream {
    let typed = impl_trait_typed(derive);
    let get_type_meta = impl_trait_get_type_meta(derive);
    let auto_register = impl_auto_register(derive);

    quote! {
        #typed
        #get_type_meta
        #auto_register
    }
}

/// User predicates followed by `extra`.
fn where_clause(derive: &ReflectDerive, extra: Vec<TokenStream>) -> TokenStream {
    let existing = derive
        .generics
        .where_clause
        .iter()
        .flat_map(|clause| clause.predicates.iter());

    quote! {
        where #(#existing,)* #(#extra,)*
    }
}

// -----------------------------------------------------------------------------
// Typed

fn impl_trait_typed(derive: &ReflectDerive) -> TokenStream {
    let vc_reflect_path = &derive.vc_reflect_path;
    let typed_ = crate::path::typed_(vc_reflect_path);
    let reflect_ = crate::path::reflect_(vc_reflect_path);

    let kind = match derive.attrs.reference {
        Some(span) => {
            let type_kind_ = crate::path::type_kind_(vc_reflect_path);
            quote_spanned! { span =>
                const KIND: #type_kind_ = #type_kind_::Reference;
            }
        }
        None => TokenStream::new(),
    };

    let ident = derive.ident;
    let (impl_generics, ty_generics, _) = derive.generics.split_for_impl();
    let where_clause = where_clause(
        derive,
        vec![quote!(Self: #reflect_ + ::core::clone::Clone)],
    );

    quote! {
        impl #impl_generics #typed_ for #ident #ty_generics #where_clause {
            #kind
        }
    }
}

// -----------------------------------------------------------------------------
// GetTypeMeta

fn impl_trait_get_type_meta(derive: &ReflectDerive) -> TokenStream {
    let vc_reflect_path = &derive.vc_reflect_path;
    let typed_ = crate::path::typed_(vc_reflect_path);
    let get_type_meta_ = crate::path::get_type_meta_(vc_reflect_path);
    let type_meta_ = crate::path::type_meta_(vc_reflect_path);
    let type_registry_ = crate::path::type_registry_(vc_reflect_path);
    let field_info_ = crate::path::field_info_(vc_reflect_path);
    let from_type_ = crate::path::from_type_(vc_reflect_path);

    let mut predicates = vec![quote!(Self: #typed_ + ::core::fmt::Debug)];

    let type_params: Vec<_> = derive
        .generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(param) => Some(&param.ident),
            _ => None,
        })
        .collect();

    if derive.is_generic() {
        predicates.extend(type_params.iter().map(|param| quote!(#param: #typed_)));
        predicates.extend(derive.fields.iter().map(|field| {
            let ty = field.ty;
            quote!(#ty: #get_type_meta_)
        }));
    }

    let with_generic = if type_params.is_empty() {
        TokenStream::new()
    } else {
        let definition = LitStr::new(&derive.ident.unraw().to_string(), derive.ident.span());
        quote! {
            __meta = #type_meta_::with_generic(__meta, #definition, &[#(<#type_params as #typed_>::ty()),*]);
        }
    };

    let push_fields = derive.fields.iter().map(|field| {
        let ty = field.ty;
        let member = &field.member;
        let name = &field.name;
        quote! {
            #type_meta_::push_field(
                &mut __meta,
                #field_info_::new::<Self, #ty>(#name, |this| &this.#member, |this| &mut this.#member),
            );
        }
    });

    let insert_default = match derive.attrs.default {
        Some(span) => {
            let constructor_info_ = crate::path::constructor_info_(vc_reflect_path);
            let type_trait_default_ = crate::path::type_trait_default_(vc_reflect_path);
            let type_trait_array_ = crate::path::type_trait_array_(vc_reflect_path);
            predicates.push(quote_spanned!(span => Self: ::core::default::Default));
            quote_spanned! { span =>
                #type_meta_::push_constructor(&mut __meta, #constructor_info_::default::<Self>());
                #type_meta_::insert_trait::<#type_trait_default_>(&mut __meta, #from_type_::<Self>::from_type());
                #type_meta_::insert_trait::<#type_trait_array_>(&mut __meta, #from_type_::<Self>::from_type());
            }
        }
        None => TokenStream::new(),
    };

    let insert_hash = match derive.attrs.hash {
        Some(span) => {
            let type_trait_hash_ = crate::path::type_trait_hash_(vc_reflect_path);
            predicates.push(quote_spanned!(span => Self: ::core::cmp::Eq + ::core::hash::Hash));
            quote_spanned! { span =>
                #type_meta_::insert_trait::<#type_trait_hash_>(&mut __meta, #from_type_::<Self>::from_type());
            }
        }
        None => TokenStream::new(),
    };

    let register_deps = derive.fields.iter().map(|field| {
        let ty = field.ty;
        quote! {
            #type_registry_::register::<#ty>(__registry);
        }
    });

    let ident = derive.ident;
    let (impl_generics, ty_generics, _) = derive.generics.split_for_impl();
    let where_clause = where_clause(derive, predicates);

    quote! {
        impl #impl_generics #get_type_meta_ for #ident #ty_generics #where_clause {
            fn get_type_meta() -> #type_meta_ {
                #[allow(unused_mut)]
                let mut __meta = #type_meta_::of::<Self>();
                #with_generic
                #(#push_fields)*
                #insert_default
                #insert_hash
                __meta
            }

            fn register_dependencies(__registry: &mut #type_registry_) {
                #(#register_deps)*
            }
        }
    }
}

// -----------------------------------------------------------------------------
// auto_register

#[cfg(feature = "auto_register")]
fn impl_auto_register(derive: &ReflectDerive) -> TokenStream {
    let Some(span) = derive.attrs.auto_register else {
        return TokenStream::new();
    };
    // Concrete instantiations of a generic type are unknown here.
    if derive.is_generic() {
        return TokenStream::new();
    }

    let auto_register_ = crate::path::auto_register_(&derive.vc_reflect_path);
    let ident = derive.ident;

    quote_spanned! { span =>
        #auto_register_::inventory::submit! {
            #auto_register_::AutoRegistration::new(#auto_register_::register_type::<#ident>)
        }
    }
}

#[cfg(not(feature = "auto_register"))]
fn impl_auto_register(_: &ReflectDerive) -> TokenStream {
    TokenStream::new()
}
