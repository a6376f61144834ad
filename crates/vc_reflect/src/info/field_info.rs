use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use crate::Object;
use crate::info::typed_access::{InstanceAccess, StaticAccess};
use crate::info::{DynGetter, DynSetter, MemberId, MemberKind, Type, Typed, receiver_mut, receiver_ref};

// -----------------------------------------------------------------------------
// FieldInfo

/// A stored field, either per instance or static.
///
/// Fields are always readable and writable. Fields registered with concrete
/// Rust types also carry a typed accessor, see [`FieldInfo::typed_access`].
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, info::FieldInfo};
///
/// #[derive(Clone, Debug)]
/// struct Player { score: i32 }
/// # impl vc_reflect::info::Typed for Player {}
///
/// let field = FieldInfo::new::<Player, i32>("score", |p| &p.score, |p| &mut p.score);
///
/// let mut player = Player { score: 3 };
/// let value = (field.getter())(Some(&player), &[]).unwrap();
/// assert_eq!(value.take_as::<i32>(), Ok(3));
///
/// (field.setter())(Some(&mut player), &[], Object::new(7_i32)).unwrap();
/// assert_eq!(player.score, 7);
/// ```
pub struct FieldInfo {
    id: MemberId,
    declaring: Type,
    ty: Type,
    is_static: bool,
    getter: DynGetter,
    setter: DynSetter,
    typed: Option<Arc<dyn Any + Send + Sync>>,
}

impl FieldInfo {
    /// Creates an instance field of `I` with value type `F`.
    pub fn new<I: Typed, F: Typed>(
        name: &'static str,
        get: fn(&I) -> &F,
        get_mut: fn(&mut I) -> &mut F,
    ) -> Self {
        let getter: DynGetter = Arc::new(move |this, _| {
            let this = receiver_ref::<I>(this, name)?;
            Ok(Object::new(get(this).clone()))
        });
        let setter: DynSetter = Arc::new(move |this, _, value| {
            let this = receiver_mut::<I>(this, name)?;
            *get_mut(this) = value.take_as::<F>()?;
            Ok(())
        });
        let typed = InstanceAccess::<I, F> {
            get: Some(Arc::new(move |this| get(this).clone())),
            set: Some(Arc::new(move |this, value| *get_mut(this) = value)),
        };
        Self {
            typed: Some(Arc::new(typed)),
            ..Self::new_dyn(name, I::ty(), F::ty(), false, getter, setter)
        }
    }

    /// Creates a static field of `D` stored in `cell`.
    pub fn new_static<D: Typed, F: Typed>(name: &'static str, cell: &'static RwLock<F>) -> Self {
        let read = move || cell.read().unwrap_or_else(PoisonError::into_inner).clone();
        let write = move |value: F| *cell.write().unwrap_or_else(PoisonError::into_inner) = value;

        let getter: DynGetter = Arc::new(move |_, _| Ok(Object::new(read())));
        let setter: DynSetter = Arc::new(move |_, _, value| {
            write(value.take_as::<F>()?);
            Ok(())
        });
        let typed = StaticAccess::<F> {
            get: Some(Arc::new(read)),
            set: Some(Arc::new(write)),
        };
        Self {
            typed: Some(Arc::new(typed)),
            ..Self::new_dyn(name, D::ty(), F::ty(), true, getter, setter)
        }
    }

    /// Creates a field from its dynamic implementation only.
    ///
    /// Such fields have no typed accessor.
    pub fn new_dyn(
        name: &'static str,
        declaring: Type,
        ty: Type,
        is_static: bool,
        getter: DynGetter,
        setter: DynSetter,
    ) -> Self {
        Self {
            id: MemberId::new(declaring, MemberKind::Field, name, &[]),
            declaring,
            ty,
            is_static,
            getter,
            setter,
            typed: None,
        }
    }

    #[inline]
    pub fn id(&self) -> &MemberId {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// The type that declares this field.
    #[inline]
    pub fn declaring(&self) -> Type {
        self.declaring
    }

    /// The type of the stored value.
    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn getter(&self) -> &DynGetter {
        &self.getter
    }

    #[inline]
    pub fn setter(&self) -> &DynSetter {
        &self.setter
    }

    /// Returns the typed accessor if it is exactly `A`.
    ///
    /// `A` is [`InstanceAccess<I, F>`] for instance fields and
    /// [`StaticAccess<F>`] for static ones.
    #[inline]
    pub fn typed_access<A: Any>(&self) -> Option<&A> {
        self.typed.as_deref()?.downcast_ref()
    }

    #[inline]
    pub fn has_typed_access(&self) -> bool {
        self.typed.is_some()
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("id", &self.id)
            .field("ty", &self.ty)
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CallError;

    #[derive(Clone, Debug)]
    struct Counter {
        hits: u8,
    }

    impl Typed for Counter {}

    static TOTAL: RwLock<u64> = RwLock::new(10);

    #[test]
    fn static_field_round_trip() {
        let field = FieldInfo::new_static::<Counter, u64>("total", &TOTAL);
        assert!(field.is_static());

        let access = field.typed_access::<StaticAccess<u64>>().unwrap();
        (access.setter().unwrap())(11);
        let value = (field.getter())(None, &[]).unwrap();
        assert_eq!(value.take_as::<u64>(), Ok(11));

        let err = (field.setter())(None, &[], Object::new(1_i32)).unwrap_err();
        assert!(matches!(err, CallError::InvalidCast { .. }));
    }

    #[test]
    fn instance_field_requires_receiver() {
        let field = FieldInfo::new::<Counter, u8>("hits", |c| &c.hits, |c| &mut c.hits);
        let err = (field.getter())(None, &[]).unwrap_err();
        assert_eq!(err, CallError::MissingReceiver { member: "hits" });

        let value = (field.getter())(Some(&Counter { hits: 2 }), &[]).unwrap();
        assert_eq!(value.take_as::<u8>(), Ok(2));

        let err = (field.getter())(Some(&1_u32), &[]).unwrap_err();
        assert!(matches!(err, CallError::InvalidCast { .. }));
    }
}
