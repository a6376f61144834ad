//! Type-coercion policy shared by every strategy.
//!
//! Only four conversions exist: identity, boxing into [`Object`], a checked
//! unbox out of [`Object`], and registered [`Upcast`]s. There is no numeric
//! widening, so a binding behaves the same whichever strategy serves it.

use alloc::sync::Arc;

use vc_reflect::info::{Type, TypeKind};
use vc_reflect::registry::{TypeRegistry, TypeRegistryArc, Upcast};
use vc_reflect::{CallError, Object};

// -----------------------------------------------------------------------------
// Conversion

/// A conversion decided ahead of the call.
#[derive(Clone, Debug)]
pub enum Conversion {
    Identity,
    /// Into [`Object`]. Objects never nest, so this is free.
    Box,
    /// Out of [`Object`], checked against the target type. Values of
    /// another type pass through one of the upcasts into `target`.
    Unbox { target: Type, upcasts: Arc<[Upcast]> },
    Upcast(Upcast),
}

impl Conversion {
    /// Returns `true` if applying the conversion does nothing.
    #[inline]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Identity | Self::Box)
    }

    pub fn apply(&self, object: Object) -> Result<Object, CallError> {
        match self {
            Self::Identity | Self::Box => Ok(object),
            Self::Unbox { target, upcasts } => {
                if target.accepts(&object) {
                    return Ok(object);
                }
                match upcast_from(upcasts, &object) {
                    Some(upcast) => upcast.apply(object),
                    None => Err(CallError::invalid_cast(object.type_name(), target.path())),
                }
            }
            Self::Upcast(upcast) => upcast.apply(object),
        }
    }
}

#[inline]
fn upcast_from<'a>(upcasts: &'a [Upcast], object: &Object) -> Option<&'a Upcast> {
    upcasts.iter().find(|upcast| upcast.source().id() == object.ty_id())
}

// -----------------------------------------------------------------------------
// Classification

/// Returns the conversion from `source` to `target`, if one exists.
///
/// # Examples
///
/// ```
/// use vc_bind::coercion::{Conversion, classify};
/// use vc_reflect::{Object, info::Typed, registry::TypeRegistry};
///
/// let registry = TypeRegistry::new();
///
/// assert!(matches!(classify(&registry, &i32::ty(), &i32::ty()), Some(Conversion::Identity)));
/// assert!(matches!(classify(&registry, &i32::ty(), &Object::ty()), Some(Conversion::Box)));
/// assert!(matches!(classify(&registry, &Object::ty(), &i32::ty()), Some(Conversion::Unbox { .. })));
/// assert!(classify(&registry, &i32::ty(), &i64::ty()).is_none());
/// ```
pub fn classify(registry: &TypeRegistry, source: &Type, target: &Type) -> Option<Conversion> {
    if source == target {
        Some(Conversion::Identity)
    } else if target.is_object() {
        Some(Conversion::Box)
    } else if source.is_object() {
        Some(Conversion::Unbox {
            target: *target,
            upcasts: registry.upcasts_into(target.id()).cloned().collect(),
        })
    } else {
        registry
            .upcast_of(source.id(), target.id())
            .cloned()
            .map(Conversion::Upcast)
    }
}

/// Whether a `source` value may be stored into a `target` slot without a
/// checked narrowing.
///
/// Reference and [`Object`] targets accept any value type, which boxes, and
/// any assignable source. Value targets accept the same type or an unbox
/// from [`Object`].
///
/// This only rules out checked narrowings. Whether a conversion exists at
/// all is decided by [`classify`], so `i32` into `Arc<str>` passes here and
/// still has no conversion.
pub fn is_assignment_inlinable(registry: &TypeRegistry, source: &Type, target: &Type) -> bool {
    if source == target {
        return true;
    }
    match target.kind() {
        TypeKind::Object => true,
        TypeKind::Reference => source.is_value() || registry.is_assignable(target, source),
        TypeKind::Value => source.is_object(),
    }
}

/// Whether an `actual` return value can be handed out as `requested`
/// without a checked narrowing.
///
/// Value results may be requested as any reference or [`Object`] type.
/// Reference results may only unbox into a value when they are [`Object`]s.
/// Reference to reference requires assignability. As with
/// [`is_assignment_inlinable`], [`classify`] decides whether a conversion
/// exists.
pub fn is_return_inlinable(registry: &TypeRegistry, actual: &Type, requested: &Type) -> bool {
    if actual == requested {
        true
    } else if actual.is_value() {
        !requested.is_value()
    } else if requested.is_value() {
        actual.is_object()
    } else {
        registry.is_assignable(requested, actual)
    }
}

// -----------------------------------------------------------------------------
// Dynamic cast

/// Converts `object` to `target` at call time.
///
/// Accepts the exact type and [`Object`] targets without touching the
/// registry. Otherwise a registered upcast is looked up, failing with
/// [`CallError::InvalidCast`] if there is none.
pub fn dynamic_cast(registry: &TypeRegistryArc, object: Object, target: &Type) -> Result<Object, CallError> {
    if target.accepts(&object) {
        return Ok(object);
    }
    let upcast = registry
        .read()
        .upcast_of(object.ty_id(), target.id())
        .cloned();
    match upcast {
        Some(upcast) => upcast.apply(object),
        None => Err(CallError::invalid_cast(object.type_name(), target.path())),
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;

    use vc_reflect::info::Typed;
    use vc_reflect::registry::{TypeRegistry, TypeRegistryArc};
    use vc_reflect::{CallError, Object};

    use super::*;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register_upcast::<Arc<String>, Arc<str>>(|s| Arc::from(s.as_str()));
        registry
    }

    #[test]
    fn assignment() {
        let registry = registry();
        assert!(is_assignment_inlinable(&registry, &i32::ty(), &Object::ty()));
        assert!(is_assignment_inlinable(&registry, &Object::ty(), &i32::ty()));
        assert!(is_assignment_inlinable(
            &registry,
            &Arc::<String>::ty(),
            &Arc::<str>::ty()
        ));
        assert!(!is_assignment_inlinable(&registry, &Object::ty(), &Arc::<str>::ty()));
        assert!(!is_assignment_inlinable(&registry, &i32::ty(), &i64::ty()));

        // Inlinable, but there is nothing to convert with.
        assert!(is_assignment_inlinable(&registry, &i32::ty(), &Arc::<str>::ty()));
        assert!(classify(&registry, &i32::ty(), &Arc::<str>::ty()).is_none());
    }

    #[test]
    fn returns() {
        let registry = registry();
        assert!(is_return_inlinable(&registry, &i32::ty(), &Object::ty()));
        assert!(is_return_inlinable(&registry, &Object::ty(), &u8::ty()));
        assert!(!is_return_inlinable(&registry, &Arc::<str>::ty(), &u8::ty()));
        assert!(!is_return_inlinable(&registry, &Object::ty(), &Arc::<str>::ty()));
        assert!(is_return_inlinable(&registry, &Arc::<String>::ty(), &Arc::<str>::ty()));
        assert!(is_return_inlinable(&registry, &u8::ty(), &Arc::<str>::ty()));
        assert!(!is_return_inlinable(&registry, &u8::ty(), &i32::ty()));
    }

    #[test]
    fn unbox_is_checked() {
        let registry = registry();
        let conversion = classify(&registry, &Object::ty(), &i32::ty()).unwrap();
        assert_eq!(conversion.apply(Object::new(3_i32)).unwrap().take_as::<i32>(), Ok(3));
        assert_eq!(
            conversion.apply(Object::new(3_u8)).unwrap_err(),
            CallError::invalid_cast("u8", "i32")
        );

        let conversion = classify(&registry, &Object::ty(), &Arc::<str>::ty()).unwrap();
        let up = conversion.apply(Object::new(Arc::new(String::from("y")))).unwrap();
        assert_eq!(up.downcast_ref::<Arc<str>>().map(|s| &**s), Some("y"));
        assert!(conversion.apply(Object::new(String::from("x"))).is_err());
    }

    #[test]
    fn dynamic() {
        let shared = TypeRegistryArc::new(registry());

        let boxed = dynamic_cast(&shared, Object::new(7_i32), &Object::ty()).unwrap();
        assert!(boxed.is::<i32>());

        let up = dynamic_cast(&shared, Object::new(Arc::new(String::from("a"))), &Arc::<str>::ty()).unwrap();
        assert_eq!(&**up.downcast_ref::<Arc<str>>().unwrap(), "a");

        assert!(matches!(
            dynamic_cast(&shared, Object::new(7_i32), &i64::ty()),
            Err(CallError::InvalidCast { .. })
        ));
    }
}
