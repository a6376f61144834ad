//! Request validation, run before the binding cache is touched.

use alloc::string::String;
use core::fmt::Write;

use vc_reflect::info::{MemberId, ParamInfo, Type};
use vc_reflect::registry::TypeRegistry;

use crate::BindError;
use crate::bind::ValueMember;
use crate::coercion;

pub(crate) fn expect_static(member: &MemberId, is_static: bool, expected: bool) -> Result<(), BindError> {
    if is_static == expected {
        return Ok(());
    }
    Err(BindError::StaticMismatch {
        member: member.clone(),
        expected: if expected { "static" } else { "an instance member" },
    })
}

/// The requested receiver must be the declaring type or [`Object`](vc_reflect::Object).
pub(crate) fn instance_type(member: &MemberId, declaring: &Type, requested: &Type) -> Result<(), BindError> {
    if declaring == requested || requested.is_object() {
        return Ok(());
    }
    Err(BindError::InstanceType {
        member: member.clone(),
        declaring: declaring.path(),
        requested: requested.path(),
    })
}

pub(crate) fn readable(member: &ValueMember) -> Result<(), BindError> {
    match member.getter() {
        Some(_) => Ok(()),
        None => Err(BindError::MissingGetter {
            member: member.id().clone(),
        }),
    }
}

pub(crate) fn writable(member: &ValueMember) -> Result<(), BindError> {
    match member.setter() {
        Some(_) => Ok(()),
        None => Err(BindError::MissingSetter {
            member: member.id().clone(),
        }),
    }
}

/// Plain accessors cannot serve indexers.
pub(crate) fn plain(member: &ValueMember) -> Result<(), BindError> {
    let expected = member.index_params().len();
    if expected == 0 {
        return Ok(());
    }
    Err(BindError::ArgumentCount {
        member: member.id().clone(),
        expected,
        actual: 0,
    })
}

/// `arity` is the number of index arguments of a typed request.
pub(crate) fn indexer(member: &ValueMember, arity: Option<usize>) -> Result<(), BindError> {
    let expected = member.index_params().len();
    if expected == 0 {
        return Err(BindError::NotAnIndexer {
            member: member.id().clone(),
        });
    }
    match arity {
        Some(actual) if actual != expected => Err(BindError::ArgumentCount {
            member: member.id().clone(),
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

/// Checks requested argument types against declared parameters.
///
/// Typed requests cannot bind by-reference parameters, their results
/// have nowhere to go.
pub(crate) fn arguments(
    registry: &TypeRegistry,
    member: &MemberId,
    params: &[ParamInfo],
    requested: &[Type],
    typed: bool,
) -> Result<(), BindError> {
    if params.len() != requested.len() {
        return Err(BindError::ArgumentCount {
            member: member.clone(),
            expected: params.len(),
            actual: requested.len(),
        });
    }
    for (index, (param, ty)) in params.iter().zip(requested).enumerate() {
        if typed && param.is_by_ref() {
            return Err(BindError::ByRefParameter {
                member: member.clone(),
                index,
            });
        }
        if coercion::classify(registry, ty, &param.ty()).is_none() {
            return Err(BindError::ParameterType {
                member: member.clone(),
                index,
                declared: param.ty().path(),
                requested: ty.path(),
            });
        }
    }
    Ok(())
}

/// `(A, B)` for error messages.
pub(crate) fn type_list(types: &[Type]) -> String {
    let mut out = String::new();
    for (index, ty) in types.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}", ty.name());
    }
    out
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use alloc::vec;

    use vc_reflect::Object;
    use vc_reflect::info::{MemberId, MemberKind, ParamInfo, ParamMode, Typed};
    use vc_reflect::registry::TypeRegistry;

    use super::*;
    use crate::BindError;

    fn id() -> MemberId {
        MemberId::new(u8::ty(), MemberKind::Method, "m", &[i32::ty()])
    }

    #[test]
    fn argument_checks() {
        let registry = TypeRegistry::new();
        let params = [ParamInfo::new("a", i32::ty())];

        assert!(arguments(&registry, &id(), &params, &[i32::ty()], true).is_ok());
        assert!(arguments(&registry, &id(), &params, &[Object::ty()], true).is_ok());
        assert!(matches!(
            arguments(&registry, &id(), &params, &[], true),
            Err(BindError::ArgumentCount { expected: 1, actual: 0, .. })
        ));
        assert!(matches!(
            arguments(&registry, &id(), &params, &[i64::ty()], true),
            Err(BindError::ParameterType { index: 0, .. })
        ));

        let by_ref = [ParamInfo::new("a", i32::ty()).with_mode(ParamMode::Ref)];
        assert!(matches!(
            arguments(&registry, &id(), &by_ref, &[i32::ty()], true),
            Err(BindError::ByRefParameter { index: 0, .. })
        ));
        assert!(arguments(&registry, &id(), &by_ref, &[Object::ty()], false).is_ok());
    }

    #[test]
    fn instance_and_static() {
        assert!(instance_type(&id(), &u8::ty(), &Object::ty()).is_ok());
        assert!(matches!(
            instance_type(&id(), &u8::ty(), &Arc::<str>::ty()),
            Err(BindError::InstanceType { .. })
        ));
        assert!(matches!(
            expect_static(&id(), false, true),
            Err(BindError::StaticMismatch { expected: "static", .. })
        ));
        assert_eq!(type_list(&vec![i32::ty(), Object::ty()]), "i32, Object");
    }
}
