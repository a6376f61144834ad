use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::info::method_info::{default_params, rename_params};
use crate::info::typed_access::FunctionAccess;
use crate::info::{ArgList, DynInvoke, IntoFunction, MemberId, MemberKind, ParamInfo, Type, Typed, param_types};
use crate::Object;

// -----------------------------------------------------------------------------
// ConstructorInfo

/// A constructor of the declaring type.
///
/// # Examples
///
/// ```
/// use vc_reflect::info::{ConstructorInfo, Typed};
///
/// #[derive(Clone, Debug, Default)]
/// struct Point { x: i32, y: i32 }
/// impl Typed for Point {}
///
/// let default = ConstructorInfo::default::<Point>();
/// assert!(default.is_parameterless());
///
/// let new = ConstructorInfo::new::<Point, (i32, i32), _>(|x: i32, y: i32| Point { x, y });
/// assert_eq!(new.params().len(), 2);
/// ```
pub struct ConstructorInfo {
    id: MemberId,
    declaring: Type,
    params: Box<[ParamInfo]>,
    invoke: DynInvoke,
    typed: Option<Arc<dyn Any + Send + Sync>>,
}

impl ConstructorInfo {
    /// The member name shared by all constructors.
    pub const NAME: &'static str = "new";

    /// Creates a constructor of `T` from a function.
    pub fn new<T, Args, C>(ctor: C) -> Self
    where
        T: Typed,
        Args: ArgList,
        C: IntoFunction<Args, T>,
    {
        let call: Arc<dyn Fn(Args) -> T + Send + Sync> = Arc::new(move |args: Args| ctor.call(args));
        let dyn_call = call.clone();
        let invoke: DynInvoke = Arc::new(move |_, args| {
            let args = Args::from_objects(args)?;
            Ok(Object::new(dyn_call(args)))
        });
        Self {
            typed: Some(Arc::new(FunctionAccess { call })),
            ..Self::new_dyn(T::ty(), default_params(Args::types()), invoke)
        }
    }

    /// The parameterless constructor given by [`Default`].
    #[inline]
    pub fn default<T: Typed + Default>() -> Self {
        Self::new::<T, (), _>(T::default)
    }

    /// Creates a constructor from its dynamic implementation only.
    pub fn new_dyn(declaring: Type, params: Vec<ParamInfo>, invoke: DynInvoke) -> Self {
        Self {
            id: MemberId::new(declaring, MemberKind::Constructor, Self::NAME, &param_types(&params)),
            declaring,
            params: params.into_boxed_slice(),
            invoke,
            typed: None,
        }
    }

    /// Renames parameters in order. Extra names are ignored.
    pub fn with_param_names(mut self, names: &[&'static str]) -> Self {
        rename_params(&mut self.params, names);
        self
    }

    #[inline]
    pub fn id(&self) -> &MemberId {
        &self.id
    }

    /// The constructed type.
    #[inline]
    pub fn declaring(&self) -> Type {
        self.declaring
    }

    #[inline]
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    #[inline]
    pub fn is_parameterless(&self) -> bool {
        self.params.is_empty()
    }

    #[inline]
    pub fn invoker(&self) -> &DynInvoke {
        &self.invoke
    }

    /// Returns the typed accessor if it is exactly [`FunctionAccess<Args, T>`].
    #[inline]
    pub fn typed_access<A: Any>(&self) -> Option<&A> {
        self.typed.as_deref()?.downcast_ref()
    }

    #[inline]
    pub fn has_typed_access(&self) -> bool {
        self.typed.is_some()
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("declaring", &self.declaring)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
