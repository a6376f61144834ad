use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;
use core::marker::PhantomData;

use crate::info::typed_access::{IndexerAccess, InstanceAccess, StaticAccess};
use crate::info::{
    DynGetter, DynSetter, MemberId, MemberKind, ParamInfo, Type, Typed, param_types, receiver_mut,
    receiver_ref,
};
use crate::{CallError, Object};

// -----------------------------------------------------------------------------
// PropertyInfo

/// A property backed by accessor functions, possibly indexed.
///
/// Either accessor may be missing. An indexer is a property with index
/// parameters, named [`PropertyInfo::INDEXER`].
///
/// # Examples
///
/// ```
/// use vc_reflect::info::{PropertyInfo, Typed};
///
/// #[derive(Clone, Debug)]
/// struct Celsius(f64);
/// impl Typed for Celsius {}
///
/// let fahrenheit = PropertyInfo::builder::<Celsius, f64>("fahrenheit")
///     .getter(|c| c.0 * 1.8 + 32.0)
///     .setter(|c, f| c.0 = (f - 32.0) / 1.8)
///     .build();
///
/// assert!(fahrenheit.can_read() && fahrenheit.can_write());
/// assert!(!fahrenheit.is_indexer());
/// ```
pub struct PropertyInfo {
    id: MemberId,
    declaring: Type,
    ty: Type,
    is_static: bool,
    index: Box<[ParamInfo]>,
    getter: Option<DynGetter>,
    setter: Option<DynSetter>,
    typed: Option<Arc<dyn Any + Send + Sync>>,
}

impl PropertyInfo {
    /// The name shared by all indexers.
    pub const INDEXER: &'static str = "[]";

    /// Starts an instance property of `I` with value type `F`.
    #[inline]
    pub fn builder<I: Typed, F: Typed>(name: &'static str) -> PropertyBuilder<I, F> {
        PropertyBuilder {
            name,
            get: None,
            set: None,
        }
    }

    /// Starts a static property declared on `D` with value type `F`.
    #[inline]
    pub fn static_builder<D: Typed, F: Typed>(name: &'static str) -> StaticPropertyBuilder<D, F> {
        StaticPropertyBuilder {
            name,
            get: None,
            set: None,
            _marker: PhantomData,
        }
    }

    /// Starts an indexer of `I` with index type `X` and value type `F`.
    #[inline]
    pub fn indexer_builder<I: Typed, X: Typed, F: Typed>(
        index_name: &'static str,
    ) -> IndexerBuilder<I, X, F> {
        IndexerBuilder {
            index_name,
            get: None,
            set: None,
        }
    }

    /// Creates a property from its dynamic implementation only.
    ///
    /// A non-empty `index` makes this an indexer. Such properties have no
    /// typed accessor.
    pub fn new_dyn(
        name: &'static str,
        declaring: Type,
        ty: Type,
        is_static: bool,
        index: Vec<ParamInfo>,
        getter: Option<DynGetter>,
        setter: Option<DynSetter>,
    ) -> Self {
        Self {
            id: MemberId::new(declaring, MemberKind::Property, name, &param_types(&index)),
            declaring,
            ty,
            is_static,
            index: index.into_boxed_slice(),
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

    #[inline]
    pub fn declaring(&self) -> Type {
        self.declaring
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Index parameters, empty unless this is an indexer.
    #[inline]
    pub fn index_params(&self) -> &[ParamInfo] {
        &self.index
    }

    #[inline]
    pub fn is_indexer(&self) -> bool {
        !self.index.is_empty()
    }

    #[inline]
    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    #[inline]
    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    #[inline]
    pub fn getter(&self) -> Option<&DynGetter> {
        self.getter.as_ref()
    }

    #[inline]
    pub fn setter(&self) -> Option<&DynSetter> {
        self.setter.as_ref()
    }

    /// Returns the typed accessor if it is exactly `A`.
    ///
    /// `A` is [`InstanceAccess<I, F>`], [`StaticAccess<F>`] or
    /// [`IndexerAccess<I, X, F>`] depending on how the property was built.
    #[inline]
    pub fn typed_access<A: Any>(&self) -> Option<&A> {
        self.typed.as_deref()?.downcast_ref()
    }

    #[inline]
    pub fn has_typed_access(&self) -> bool {
        self.typed.is_some()
    }

    fn with_typed(mut self, typed: Arc<dyn Any + Send + Sync>) -> Self {
        self.typed = Some(typed);
        self
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("id", &self.id)
            .field("ty", &self.ty)
            .field("is_static", &self.is_static)
            .field("index", &self.index)
            .field("can_read", &self.can_read())
            .field("can_write", &self.can_write())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Builders

/// Builder of an instance property, see [`PropertyInfo::builder`].
pub struct PropertyBuilder<I, F> {
    name: &'static str,
    get: Option<Arc<dyn Fn(&I) -> F + Send + Sync>>,
    set: Option<Arc<dyn Fn(&mut I, F) + Send + Sync>>,
}

impl<I: Typed, F: Typed> PropertyBuilder<I, F> {
    pub fn getter(mut self, get: impl Fn(&I) -> F + Send + Sync + 'static) -> Self {
        self.get = Some(Arc::new(get));
        self
    }

    pub fn setter(mut self, set: impl Fn(&mut I, F) + Send + Sync + 'static) -> Self {
        self.set = Some(Arc::new(set));
        self
    }

    pub fn build(self) -> PropertyInfo {
        let name = self.name;
        let getter = self.get.clone().map(|get| -> DynGetter {
            Arc::new(move |this, _| Ok(Object::new(get(receiver_ref::<I>(this, name)?))))
        });
        let setter = self.set.clone().map(|set| -> DynSetter {
            Arc::new(move |this, _, value| {
                let value = value.take_as::<F>()?;
                set(receiver_mut::<I>(this, name)?, value);
                Ok(())
            })
        });
        let typed = InstanceAccess::<I, F> {
            get: self.get,
            set: self.set,
        };
        PropertyInfo::new_dyn(name, I::ty(), F::ty(), false, Vec::new(), getter, setter)
            .with_typed(Arc::new(typed))
    }
}

/// Builder of a static property, see [`PropertyInfo::static_builder`].
pub struct StaticPropertyBuilder<D, F> {
    name: &'static str,
    get: Option<Arc<dyn Fn() -> F + Send + Sync>>,
    set: Option<Arc<dyn Fn(F) + Send + Sync>>,
    _marker: PhantomData<fn() -> D>,
}

impl<D: Typed, F: Typed> StaticPropertyBuilder<D, F> {
    pub fn getter(mut self, get: impl Fn() -> F + Send + Sync + 'static) -> Self {
        self.get = Some(Arc::new(get));
        self
    }

    pub fn setter(mut self, set: impl Fn(F) + Send + Sync + 'static) -> Self {
        self.set = Some(Arc::new(set));
        self
    }

    pub fn build(self) -> PropertyInfo {
        let getter = self.get.clone().map(|get| -> DynGetter {
            Arc::new(move |_, _| Ok(Object::new(get())))
        });
        let setter = self.set.clone().map(|set| -> DynSetter {
            Arc::new(move |_, _, value| {
                set(value.take_as::<F>()?);
                Ok(())
            })
        });
        let typed = StaticAccess::<F> {
            get: self.get,
            set: self.set,
        };
        PropertyInfo::new_dyn(self.name, D::ty(), F::ty(), true, Vec::new(), getter, setter)
            .with_typed(Arc::new(typed))
    }
}

/// Builder of a single-index indexer, see [`PropertyInfo::indexer_builder`].
pub struct IndexerBuilder<I, X, F> {
    index_name: &'static str,
    get: Option<Arc<dyn Fn(&I, X) -> F + Send + Sync>>,
    set: Option<Arc<dyn Fn(&mut I, X, F) + Send + Sync>>,
}

impl<I: Typed, X: Typed, F: Typed> IndexerBuilder<I, X, F> {
    pub fn getter(mut self, get: impl Fn(&I, X) -> F + Send + Sync + 'static) -> Self {
        self.get = Some(Arc::new(get));
        self
    }

    pub fn setter(mut self, set: impl Fn(&mut I, X, F) + Send + Sync + 'static) -> Self {
        self.set = Some(Arc::new(set));
        self
    }

    pub fn build(self) -> PropertyInfo {
        const NAME: &str = PropertyInfo::INDEXER;
        let getter = self.get.clone().map(|get| -> DynGetter {
            Arc::new(move |this, index| {
                let x = single_index::<X>(index)?;
                Ok(Object::new(get(receiver_ref::<I>(this, NAME)?, x)))
            })
        });
        let setter = self.set.clone().map(|set| -> DynSetter {
            Arc::new(move |this, index, value| {
                let x = single_index::<X>(index)?;
                let value = value.take_as::<F>()?;
                set(receiver_mut::<I>(this, NAME)?, x, value);
                Ok(())
            })
        });
        let typed = IndexerAccess::<I, X, F> {
            get: self.get,
            set: self.set,
        };
        let index = alloc::vec![ParamInfo::new(self.index_name, X::ty())];
        PropertyInfo::new_dyn(NAME, I::ty(), F::ty(), false, index, getter, setter)
            .with_typed(Arc::new(typed))
    }
}

fn single_index<X: Typed>(index: &[Object]) -> Result<X, CallError> {
    match index {
        [x] => x.clone_as::<X>(),
        _ => Err(CallError::ArgumentCount {
            expected: 1,
            actual: index.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[derive(Clone, Debug, Default)]
    struct Grid {
        cells: Vec<String>,
    }

    impl Typed for Grid {}

    fn grid_indexer() -> PropertyInfo {
        PropertyInfo::indexer_builder::<Grid, usize, String>("i")
            .getter(|g, i| g.cells[i].clone())
            .setter(|g, i, v| g.cells[i] = v)
            .build()
    }

    #[test]
    fn indexer_dynamic_access() {
        let indexer = grid_indexer();
        assert!(indexer.is_indexer());
        assert_eq!(indexer.name(), PropertyInfo::INDEXER);

        let mut grid = Grid {
            cells: alloc::vec![String::new(); 4],
        };
        let set = indexer.setter().unwrap();
        set(Some(&mut grid), &[Object::new(3_usize)], Object::new(String::from("x"))).unwrap();

        let get = indexer.getter().unwrap();
        let value = get(Some(&grid), &[Object::new(3_usize)]).unwrap();
        assert_eq!(value.take_as::<String>().unwrap(), "x");

        let err = get(Some(&grid), &[Object::new(String::from("3"))]).unwrap_err();
        assert!(matches!(err, CallError::InvalidCast { .. }));
    }

    #[test]
    fn read_only_property() {
        let len = PropertyInfo::builder::<Grid, usize>("len")
            .getter(|g| g.cells.len())
            .build();
        assert!(len.can_read());
        assert!(!len.can_write());
        assert!(len.typed_access::<InstanceAccess<Grid, usize>>().is_some());
        assert!(len.typed_access::<InstanceAccess<Grid, u32>>().is_none());
    }
}
