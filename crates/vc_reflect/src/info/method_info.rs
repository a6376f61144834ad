use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::info::typed_access::{FunctionAccess, MethodAccess};
use crate::info::{
    ArgList, DynInvoke, IntoFunction, IntoMethod, MemberId, MemberKind, ParamInfo, Type, Typed,
    param_types, receiver_mut,
};
use crate::Object;

// -----------------------------------------------------------------------------
// MethodInfo

/// An instance or static method.
///
/// Methods returning nothing have return type `()`.
///
/// # Examples
///
/// ```
/// use vc_reflect::{Object, info::{MethodInfo, Typed}};
///
/// #[derive(Clone, Debug)]
/// struct Calc { total: i32 }
/// impl Typed for Calc {}
///
/// let add = MethodInfo::new::<Calc, (i32,), i32, _>("add", |c: &mut Calc, x: i32| {
///     c.total += x;
///     c.total
/// });
///
/// let mut calc = Calc { total: 1 };
/// let mut args = [Object::new(2_i32)];
/// let out = (add.invoker())(Some(&mut calc), &mut args).unwrap();
/// assert_eq!(out.take_as::<i32>(), Ok(3));
/// ```
pub struct MethodInfo {
    id: MemberId,
    declaring: Type,
    params: Box<[ParamInfo]>,
    ret: Type,
    is_static: bool,
    invoke: DynInvoke,
    typed: Option<Arc<dyn Any + Send + Sync>>,
}

impl MethodInfo {
    /// Creates an instance method of `I`.
    pub fn new<I, Args, R, M>(name: &'static str, method: M) -> Self
    where
        I: Typed,
        Args: ArgList,
        R: Typed,
        M: IntoMethod<I, Args, R>,
    {
        let call: Arc<dyn Fn(&mut I, Args) -> R + Send + Sync> =
            Arc::new(move |this: &mut I, args: Args| method.call(this, args));
        let dyn_call = call.clone();
        let invoke: DynInvoke = Arc::new(move |this, args| {
            let args = Args::from_objects(args)?;
            let this = receiver_mut::<I>(this, name)?;
            Ok(Object::new(dyn_call(this, args)))
        });
        let params = default_params(Args::types());
        Self {
            typed: Some(Arc::new(MethodAccess { call })),
            ..Self::new_dyn(name, I::ty(), params, R::ty(), false, invoke)
        }
    }

    /// Creates a static method declared on `D`.
    pub fn new_static<D, Args, R, M>(name: &'static str, function: M) -> Self
    where
        D: Typed,
        Args: ArgList,
        R: Typed,
        M: IntoFunction<Args, R>,
    {
        let call: Arc<dyn Fn(Args) -> R + Send + Sync> =
            Arc::new(move |args: Args| function.call(args));
        let dyn_call = call.clone();
        let invoke: DynInvoke = Arc::new(move |_, args| {
            let args = Args::from_objects(args)?;
            Ok(Object::new(dyn_call(args)))
        });
        let params = default_params(Args::types());
        Self {
            typed: Some(Arc::new(FunctionAccess { call })),
            ..Self::new_dyn(name, D::ty(), params, R::ty(), true, invoke)
        }
    }

    /// Creates a method from its dynamic implementation only.
    ///
    /// This is the only way to declare by-reference parameters.
    pub fn new_dyn(
        name: &'static str,
        declaring: Type,
        params: Vec<ParamInfo>,
        ret: Type,
        is_static: bool,
        invoke: DynInvoke,
    ) -> Self {
        Self {
            id: MemberId::new(declaring, MemberKind::Method, name, &param_types(&params)),
            declaring,
            params: params.into_boxed_slice(),
            ret,
            is_static,
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

    #[inline]
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    #[inline]
    pub fn declaring(&self) -> Type {
        self.declaring
    }

    #[inline]
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    #[inline]
    pub fn return_type(&self) -> Type {
        self.ret
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn invoker(&self) -> &DynInvoke {
        &self.invoke
    }

    /// Returns the typed accessor if it is exactly `A`.
    ///
    /// `A` is [`MethodAccess<I, Args, R>`] for instance methods and
    /// [`FunctionAccess<Args, R>`] for static ones.
    #[inline]
    pub fn typed_access<A: Any>(&self) -> Option<&A> {
        self.typed.as_deref()?.downcast_ref()
    }

    #[inline]
    pub fn has_typed_access(&self) -> bool {
        self.typed.is_some()
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("id", &self.id)
            .field("params", &self.params)
            .field("ret", &self.ret)
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Helpers

const ARG_NAMES: [&str; 4] = ["arg0", "arg1", "arg2", "arg3"];

pub(crate) fn default_params(types: Vec<Type>) -> Vec<ParamInfo> {
    types
        .into_iter()
        .enumerate()
        .map(|(i, ty)| ParamInfo::new(ARG_NAMES.get(i).copied().unwrap_or("arg"), ty))
        .collect()
}

pub(crate) fn rename_params(params: &mut [ParamInfo], names: &[&'static str]) {
    for (param, name) in params.iter_mut().zip(names) {
        *param = ParamInfo::new(name, param.ty()).with_mode(param.mode());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CallError;
    use alloc::string::String;

    #[derive(Clone, Debug)]
    struct Greeter;

    impl Typed for Greeter {}

    #[test]
    fn static_method_with_typed_access() {
        let greet = MethodInfo::new_static::<Greeter, (String, u8), String, _>(
            "greet",
            |name: String, times: u8| name.repeat(times as usize),
        )
        .with_param_names(&["name", "times"]);

        assert!(greet.is_static());
        assert_eq!(greet.params()[1].name(), "times");
        assert_eq!(greet.return_type(), String::ty());

        let access = greet
            .typed_access::<FunctionAccess<(String, u8), String>>()
            .unwrap();
        assert_eq!((access.call())((String::from("ab"), 2)), "abab");

        let mut args = [Object::new(String::from("x"))];
        let err = (greet.invoker())(None, &mut args).unwrap_err();
        assert_eq!(err, CallError::ArgumentCount { expected: 2, actual: 1 });
    }

    #[test]
    fn same_member_same_id() {
        let a = MethodInfo::new::<Greeter, (), (), _>("wave", |_: &mut Greeter| {});
        let b = MethodInfo::new::<Greeter, (), (), _>("wave", |_: &mut Greeter| {});
        let c = MethodInfo::new::<Greeter, (u8,), (), _>("wave", |_: &mut Greeter, _: u8| {});
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }
}
