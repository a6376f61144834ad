//! Method and constructor bindings.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use vc_reflect::info::typed_access::{FunctionAccess, MethodAccess};
use vc_reflect::info::{ArgList, DynInvoke, ParamInfo, Type, Typed};
use vc_reflect::{CallError, Object, Reflect, reflect_mut};

use super::{
    BuildContext, Factory, Invocable, MethodInvoker, ObjectConstructor, ObjectInvoker, Shape,
    StaticInvoker, finish, unwrap_mut,
};
use crate::coercion::{self, Conversion};
use crate::expr::{Expr, Frame};
use crate::{Binder, Category, Ladder, Operation, Strategy, Subject};

// -----------------------------------------------------------------------------
// Requests

pub(crate) struct InvokeRequest {
    /// `None` for static methods and constructors.
    instance: Option<Type>,
    args: Vec<Type>,
    /// `None` discards the result.
    ret: Option<Type>,
}

impl InvokeRequest {
    pub fn new(instance: Option<Type>, args: Vec<Type>, ret: Option<Type>) -> Self {
        Self { instance, args, ret }
    }

    /// The request of an untyped invoker of `member`.
    pub fn untyped(member: &Invocable) -> Self {
        let instance = if member.is_static() {
            None
        } else {
            Some(Object::ty())
        };
        let args = alloc::vec![Object::ty(); member.params().len()];
        Self::new(instance, args, Some(Object::ty()))
    }

    /// `R = ()` discards the result.
    pub fn returning<R: Typed>() -> Option<Type> {
        let ty = R::ty();
        if ty.is::<()>() { None } else { Some(ty) }
    }
}

#[inline]
fn invoke_core(
    f: impl Fn(Option<&mut dyn Reflect>, &mut [Object]) -> Result<Object, CallError> + Send + Sync + 'static,
) -> DynInvoke {
    Arc::new(f)
}

#[inline]
fn check_count(expected: usize, actual: usize) -> Result<(), CallError> {
    if expected == actual {
        Ok(())
    } else {
        Err(CallError::ArgumentCount { expected, actual })
    }
}

fn by_ref_positions(params: &[ParamInfo]) -> Vec<usize> {
    params
        .iter()
        .enumerate()
        .filter(|(_, param)| param.is_by_ref())
        .map(|(index, _)| index)
        .collect()
}

/// Copies the by-reference arguments back to the caller after a call.
///
/// Other slots keep the values the caller passed in.
fn write_back(values: &mut [Object], args: &mut [Object], by_ref: &[usize]) {
    for &index in by_ref {
        if let (Some(slot), Some(arg)) = (values.get_mut(index), args.get_mut(index)) {
            *slot = mem::replace(arg, Object::unit());
        }
    }
}

// -----------------------------------------------------------------------------
// Strategies

fn emit_invoke(cx: &BuildContext<'_>, member: &Invocable, request: &InvokeRequest) -> Option<DynInvoke> {
    if !member.has_typed_access() {
        return None;
    }
    if let Some(instance) = &request.instance
        && !coercion::is_assignment_inlinable(cx.registry, instance, &member.declaring())
    {
        return None;
    }
    let args = request
        .args
        .iter()
        .zip(member.params())
        .map(|(requested, param)| {
            let declared = param.ty();
            if coercion::is_assignment_inlinable(cx.registry, requested, &declared) {
                coercion::classify(cx.registry, requested, &declared)
            } else {
                None
            }
        })
        .collect::<Option<Vec<Conversion>>>()?;
    let ret = match &request.ret {
        Some(requested) => {
            let actual = member.return_type();
            if !coercion::is_return_inlinable(cx.registry, &actual, requested) {
                return None;
            }
            Some(coercion::classify(cx.registry, &actual, requested)?)
        }
        None => None,
    };
    let invoke = member.invoker().clone();
    let by_ref = by_ref_positions(member.params());

    Some(invoke_core(move |this, values| {
        check_count(args.len(), values.len())?;
        let mut converted = values
            .iter()
            .zip(&args)
            .map(|(value, conversion)| conversion.apply(value.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let out = invoke(this, &mut converted)?;
        write_back(values, &mut converted, &by_ref);
        match &ret {
            Some(conversion) => conversion.apply(out),
            None => Ok(Object::unit()),
        }
    }))
}

fn expression_invoke(cx: &BuildContext<'_>, member: &Invocable, request: &InvokeRequest) -> Option<DynInvoke> {
    let args = request
        .args
        .iter()
        .zip(member.params())
        .enumerate()
        .map(|(index, (requested, param))| Expr::arg(index, *requested).convert(param.ty()))
        .collect();
    let call = Expr::call(
        member.invoker().clone(),
        member.return_type(),
        args,
        by_ref_positions(member.params()),
    );
    let discard = request.ret.is_none();
    let compiled = match request.ret {
        Some(ret) => call.convert(ret),
        None => call,
    }
    .compile(cx.registry)?;
    let count = request.args.len();

    Some(invoke_core(move |this, values| {
        check_count(count, values.len())?;
        let out = compiled(&mut Frame::exclusive(this, values))?;
        if discard { Ok(Object::unit()) } else { Ok(out) }
    }))
}

fn reflection_invoke(cx: &BuildContext<'_>, member: &Invocable, request: &InvokeRequest) -> DynInvoke {
    let invoke = member.invoker().clone();
    let params: Vec<Type> = member.params().iter().map(ParamInfo::ty).collect();
    let by_ref = by_ref_positions(member.params());
    let ret = request.ret;
    let shared = cx.shared.clone();

    invoke_core(move |this, values| {
        check_count(params.len(), values.len())?;
        let mut converted = values
            .iter()
            .zip(&params)
            .map(|(value, ty)| coercion::dynamic_cast(&shared, value.clone(), ty))
            .collect::<Result<Vec<_>, _>>()?;
        let out = invoke(this, &mut converted)?;
        write_back(values, &mut converted, &by_ref);
        match &ret {
            Some(ret) => coercion::dynamic_cast(&shared, out, ret),
            None => Ok(Object::unit()),
        }
    })
}

pub(crate) struct CallShape<B> {
    member: Invocable,
    request: InvokeRequest,
    ladder: &'static [Strategy],
    fast: fn(&Invocable) -> Option<B>,
    wrap: fn(DynInvoke) -> B,
}

impl<B: Clone + Send + Sync + 'static> Shape for CallShape<B> {
    type Binding = B;

    fn category(&self) -> Category {
        self.member.category()
    }

    fn subject(&self) -> Subject {
        Subject::member(self.member.id())
    }

    fn ladder(&self) -> &'static [Strategy] {
        self.ladder
    }

    fn emit(&self, cx: &BuildContext<'_>) -> Option<B> {
        if let Some(binding) = (self.fast)(&self.member) {
            return Some(binding);
        }
        emit_invoke(cx, &self.member, &self.request).map(self.wrap)
    }

    fn expression(&self, cx: &BuildContext<'_>) -> Option<B> {
        expression_invoke(cx, &self.member, &self.request).map(self.wrap)
    }

    fn reflection(&self, cx: &BuildContext<'_>) -> B {
        (self.wrap)(reflection_invoke(cx, &self.member, &self.request))
    }
}

// -----------------------------------------------------------------------------
// Wrappers

pub(crate) fn no_fast_path<B>(_: &Invocable) -> Option<B> {
    None
}

pub(crate) fn method_fast<I: Typed, Args: ArgList, R: Typed>(member: &Invocable) -> Option<MethodInvoker<I, Args, R>> {
    let call = member.typed_access::<MethodAccess<I, Args, R>>()?.call().clone();
    let binding: MethodInvoker<I, Args, R> = Arc::new(move |this: &mut I, args: Args| Ok(call(this, args)));
    Some(binding)
}

pub(crate) fn method<I: Typed, Args: ArgList, R: Typed>(core: DynInvoke) -> MethodInvoker<I, Args, R> {
    Arc::new(move |this: &mut I, args: Args| {
        let mut values = args.into_objects();
        finish::<R>(core(Some(reflect_mut(this)), &mut values)?)
    })
}

/// Also serves typed constructors.
pub(crate) fn function_fast<Args: ArgList, R: Typed>(member: &Invocable) -> Option<StaticInvoker<Args, R>> {
    let call = member.typed_access::<FunctionAccess<Args, R>>()?.call().clone();
    let binding: StaticInvoker<Args, R> = Arc::new(move |args: Args| Ok(call(args)));
    Some(binding)
}

pub(crate) fn function<Args: ArgList, R: Typed>(core: DynInvoke) -> StaticInvoker<Args, R> {
    Arc::new(move |args: Args| {
        let mut values = args.into_objects();
        finish::<R>(core(None, &mut values)?)
    })
}

pub(crate) fn object_invoker(core: DynInvoke) -> ObjectInvoker {
    Arc::new(move |this: Option<&mut dyn Reflect>, args: &mut [Object]| core(this.map(unwrap_mut), args))
}

pub(crate) fn object_constructor(core: DynInvoke) -> ObjectConstructor {
    Arc::new(move |args: &mut [Object]| core(None, args))
}

pub(crate) fn factory_fast<T: Typed>(member: &Invocable) -> Option<Factory<T>> {
    let call = member.typed_access::<FunctionAccess<(), T>>()?.call().clone();
    let binding: Factory<T> = Arc::new(move || Ok(call(())));
    Some(binding)
}

pub(crate) fn factory<T: Typed>(core: DynInvoke) -> Factory<T> {
    Arc::new(move || core(None, &mut [])?.take_as::<T>())
}

// -----------------------------------------------------------------------------
// Binder

impl Binder {
    pub(crate) fn call<B: Clone + Send + Sync + 'static>(
        &self,
        member: Invocable,
        request: InvokeRequest,
        typed: bool,
        fast: fn(&Invocable) -> Option<B>,
        wrap: fn(DynInvoke) -> B,
    ) -> B {
        let op = match member {
            Invocable::Method(_) => Operation::Invoke,
            Invocable::Constructor(_) => Operation::Construct,
        };
        self.resolve(&CallShape {
            member,
            request,
            ladder: Ladder::for_op(op, typed),
            fast,
            wrap,
        })
    }
}
