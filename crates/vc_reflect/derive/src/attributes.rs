//! Parsing of `#[reflect(...)]` attributes.

use proc_macro2::Span;
use syn::{Attribute, spanned::Spanned};

use crate::REFLECT_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// TypeAttributes

/// Flags given on the type, e.g. `#[reflect(default, hash)]`.
///
/// Each flag keeps the span it was declared at, so errors in the generated
/// code point back to the attribute.
#[derive(Default, Debug)]
pub(crate) struct TypeAttributes {
    pub reference: Option<Span>,
    pub default: Option<Span>,
    pub hash: Option<Span>,
    pub auto_register: Option<Span>,
}

impl TypeAttributes {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident(REFLECT_ATTRIBUTE_NAME)) {
            attr.parse_nested_meta(|meta| {
                let span = meta.path.span();
                let slot = if meta.path.is_ident("reference") {
                    &mut result.reference
                } else if meta.path.is_ident("default") {
                    &mut result.default
                } else if meta.path.is_ident("hash") {
                    &mut result.hash
                } else if meta.path.is_ident("auto_register") {
                    &mut result.auto_register
                } else {
                    return Err(meta.error(
                        "unknown type attribute, expected one of `reference`, `default`, `hash`, `auto_register`",
                    ));
                };
                if slot.is_some() {
                    return Err(meta.error("duplicate attribute"));
                }
                *slot = Some(span);
                Ok(())
            })?;
        }

        Ok(result)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Flags given on a field, e.g. `#[reflect(skip)]`.
#[derive(Default, Debug)]
pub(crate) struct FieldAttributes {
    pub skip: bool,
}

impl FieldAttributes {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident(REFLECT_ATTRIBUTE_NAME)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    result.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown field attribute, expected `skip`"))
                }
            })?;
        }

        Ok(result)
    }
}
