//! The parsed form of a `#[derive(Reflect)]` input.

use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Generics, Ident, Index, Member, Type};

use crate::attributes::{FieldAttributes, TypeAttributes};

// -----------------------------------------------------------------------------
// ReflectField

/// A described field.
pub(crate) struct ReflectField<'a> {
    /// How the field is accessed, `self.name` or `self.0`.
    pub member: Member,
    /// The registered name, `"name"` or `"0"`.
    pub name: String,
    pub ty: &'a Type,
}

// -----------------------------------------------------------------------------
// ReflectDerive

pub(crate) struct ReflectDerive<'a> {
    pub ident: &'a Ident,
    pub generics: &'a Generics,
    pub attrs: TypeAttributes,
    pub fields: Vec<ReflectField<'a>>,
    pub vc_reflect_path: syn::Path,
}

impl<'a> ReflectDerive<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let attrs = TypeAttributes::parse(&input.attrs)?;

        let fields = match &input.data {
            Data::Struct(data) => Self::collect_fields(&data.fields)?,
            // Enums are described without members.
            Data::Enum(_) => Vec::new(),
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span,
                    "`Reflect` cannot be derived for unions",
                ));
            }
        };

        Ok(Self {
            ident: &input.ident,
            generics: &input.generics,
            attrs,
            fields,
            vc_reflect_path: crate::path::vc_reflect(),
        })
    }

    fn collect_fields(fields: &'a Fields) -> syn::Result<Vec<ReflectField<'a>>> {
        let mut result = Vec::with_capacity(fields.len());

        for (index, field) in fields.iter().enumerate() {
            if FieldAttributes::parse(&field.attrs)?.skip {
                continue;
            }

            let (member, name) = match &field.ident {
                Some(ident) => (Member::Named(ident.clone()), ident.unraw().to_string()),
                None => (Member::Unnamed(Index::from(index)), index.to_string()),
            };

            result.push(ReflectField {
                member,
                name,
                ty: &field.ty,
            });
        }

        Ok(result)
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.generics.params.is_empty()
    }
}
