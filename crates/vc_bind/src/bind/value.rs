//! Field and property bindings, plain and indexed.

use alloc::sync::Arc;
use alloc::vec::Vec;

use vc_reflect::info::typed_access::{IndexerAccess, InstanceAccess, StaticAccess};
use vc_reflect::info::{DynGetter, DynSetter, ParamInfo, Type, Typed};
use vc_reflect::registry::TypeRegistryArc;
use vc_reflect::{CallError, Object, Reflect, reflect_mut, reflect_ref};

use super::{
    BuildContext, FieldGetter, FieldSetter, IndexGetter, IndexSetter, ObjectGetter,
    ObjectIndexGetter, ObjectIndexSetter, ObjectSetter, Shape, StaticGetter, StaticSetter,
    ValueMember, unwrap_mut, unwrap_ref,
};
use crate::coercion::{self, Conversion};
use crate::expr::{Expr, Frame};
use crate::{BindError, Binder, Category, Ladder, Operation, Strategy, Subject, validate};

// -----------------------------------------------------------------------------
// Requests

/// The types a value binding was requested with, [`Object`] where untyped.
pub(crate) struct ValueRequest {
    /// `None` for statics.
    instance: Option<Type>,
    index: Vec<Type>,
    value: Type,
}

impl ValueRequest {
    fn new(instance: Option<Type>, index: Vec<Type>, value: Type) -> Self {
        Self {
            instance,
            index,
            value,
        }
    }
}

#[inline]
fn read_core(
    f: impl Fn(Option<&dyn Reflect>, &[Object]) -> Result<Object, CallError> + Send + Sync + 'static,
) -> DynGetter {
    Arc::new(f)
}

#[inline]
fn write_core(
    f: impl Fn(Option<&mut dyn Reflect>, &[Object], Object) -> Result<(), CallError> + Send + Sync + 'static,
) -> DynSetter {
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

fn convert_index(conversions: &[Conversion], args: &[Object]) -> Result<Vec<Object>, CallError> {
    check_count(conversions.len(), args.len())?;
    args.iter()
        .zip(conversions)
        .map(|(arg, conversion)| conversion.apply(arg.clone()))
        .collect()
}

fn cast_index(shared: &TypeRegistryArc, params: &[Type], args: &[Object]) -> Result<Vec<Object>, CallError> {
    check_count(params.len(), args.len())?;
    args.iter()
        .zip(params)
        .map(|(arg, ty)| coercion::dynamic_cast(shared, arg.clone(), ty))
        .collect()
}

fn param_types(params: &[ParamInfo]) -> Vec<Type> {
    params.iter().map(ParamInfo::ty).collect()
}

// -----------------------------------------------------------------------------
// Planning

/// Conversions used by [`Strategy::Emit`], `None` if the member has no typed
/// accessor or some conversion needs a checked narrowing.
fn emit_plan(cx: &BuildContext<'_>, member: &ValueMember, request: &ValueRequest) -> Option<Vec<Conversion>> {
    if !member.has_typed_access() {
        return None;
    }
    if let Some(instance) = &request.instance
        && !coercion::is_assignment_inlinable(cx.registry, instance, &member.declaring())
    {
        return None;
    }
    request
        .index
        .iter()
        .zip(member.index_params())
        .map(|(requested, param)| {
            let declared = param.ty();
            if coercion::is_assignment_inlinable(cx.registry, requested, &declared) {
                coercion::classify(cx.registry, requested, &declared)
            } else {
                None
            }
        })
        .collect()
}

fn index_exprs(member: &ValueMember, request: &ValueRequest) -> Vec<Expr> {
    request
        .index
        .iter()
        .zip(member.index_params())
        .enumerate()
        .map(|(position, (requested, param))| Expr::arg(position, *requested).convert(param.ty()))
        .collect()
}

// -----------------------------------------------------------------------------
// Reads

fn emit_read(cx: &BuildContext<'_>, member: &ValueMember, request: &ValueRequest) -> Option<DynGetter> {
    let index = emit_plan(cx, member, request)?;
    let actual = member.ty();
    if !coercion::is_return_inlinable(cx.registry, &actual, &request.value) {
        return None;
    }
    let result = coercion::classify(cx.registry, &actual, &request.value)?;
    let getter = member.getter()?.clone();

    Some(read_core(move |this, args| {
        let args = convert_index(&index, args)?;
        result.apply(getter(this, &args)?)
    }))
}

fn expression_read(cx: &BuildContext<'_>, member: &ValueMember, request: &ValueRequest) -> Option<DynGetter> {
    let getter = member.getter()?.clone();
    let count = request.index.len();
    let compiled = Expr::read(getter, member.ty(), index_exprs(member, request))
        .convert(request.value)
        .compile(cx.registry)?;

    Some(read_core(move |this, args| {
        check_count(count, args.len())?;
        compiled(&mut Frame::shared(this, args))
    }))
}

fn reflection_read(cx: &BuildContext<'_>, member: &ValueMember, request: &ValueRequest) -> DynGetter {
    let getter = member.getter().cloned();
    let name = member.name();
    let params = param_types(member.index_params());
    let value = request.value;
    let shared = cx.shared.clone();

    read_core(move |this, args| {
        let getter = getter.as_ref().ok_or(CallError::Inaccessible {
            member: name,
            access: "read",
        })?;
        let args = cast_index(&shared, &params, args)?;
        coercion::dynamic_cast(&shared, getter(this, &args)?, &value)
    })
}

pub(crate) struct ReadShape<B> {
    member: ValueMember,
    request: ValueRequest,
    ladder: &'static [Strategy],
    fast: fn(&ValueMember) -> Option<B>,
    wrap: fn(DynGetter) -> B,
}

impl<B: Clone + Send + Sync + 'static> Shape for ReadShape<B> {
    type Binding = B;

    fn category(&self) -> Category {
        self.member.category(false)
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
        emit_read(cx, &self.member, &self.request).map(self.wrap)
    }

    fn expression(&self, cx: &BuildContext<'_>) -> Option<B> {
        expression_read(cx, &self.member, &self.request).map(self.wrap)
    }

    fn reflection(&self, cx: &BuildContext<'_>) -> B {
        (self.wrap)(reflection_read(cx, &self.member, &self.request))
    }
}

// -----------------------------------------------------------------------------
// Writes

fn emit_write(cx: &BuildContext<'_>, member: &ValueMember, request: &ValueRequest) -> Option<DynSetter> {
    let index = emit_plan(cx, member, request)?;
    let declared = member.ty();
    if !coercion::is_assignment_inlinable(cx.registry, &request.value, &declared) {
        return None;
    }
    let value = coercion::classify(cx.registry, &request.value, &declared)?;
    let setter = member.setter()?.clone();

    Some(write_core(move |this, args, input| {
        let args = convert_index(&index, args)?;
        setter(this, &args, value.apply(input)?)
    }))
}

fn expression_write(cx: &BuildContext<'_>, member: &ValueMember, request: &ValueRequest) -> Option<DynSetter> {
    let setter = member.setter()?.clone();
    let count = request.index.len();
    let value = Expr::value(request.value).convert(member.ty());
    let compiled = Expr::write(setter, index_exprs(member, request), value).compile(cx.registry)?;

    Some(write_core(move |this, args, input| {
        check_count(count, args.len())?;
        compiled(&mut Frame::write(this, args, input)).map(drop)
    }))
}

fn reflection_write(cx: &BuildContext<'_>, member: &ValueMember) -> DynSetter {
    let setter = member.setter().cloned();
    let name = member.name();
    let params = param_types(member.index_params());
    let declared = member.ty();
    let shared = cx.shared.clone();

    write_core(move |this, args, input| {
        let setter = setter.as_ref().ok_or(CallError::Inaccessible {
            member: name,
            access: "written",
        })?;
        let args = cast_index(&shared, &params, args)?;
        setter(this, &args, coercion::dynamic_cast(&shared, input, &declared)?)
    })
}

pub(crate) struct WriteShape<B> {
    member: ValueMember,
    request: ValueRequest,
    ladder: &'static [Strategy],
    fast: fn(&ValueMember) -> Option<B>,
    wrap: fn(DynSetter) -> B,
}

impl<B: Clone + Send + Sync + 'static> Shape for WriteShape<B> {
    type Binding = B;

    fn category(&self) -> Category {
        self.member.category(true)
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
        emit_write(cx, &self.member, &self.request).map(self.wrap)
    }

    fn expression(&self, cx: &BuildContext<'_>) -> Option<B> {
        expression_write(cx, &self.member, &self.request).map(self.wrap)
    }

    fn reflection(&self, cx: &BuildContext<'_>) -> B {
        (self.wrap)(reflection_write(cx, &self.member))
    }
}

// -----------------------------------------------------------------------------
// Wrappers

fn no_fast_path<B>(_: &ValueMember) -> Option<B> {
    None
}

fn instance_getter_fast<I: Typed, V: Typed>(member: &ValueMember) -> Option<FieldGetter<I, V>> {
    let get = member.typed_access::<InstanceAccess<I, V>>()?.getter()?.clone();
    let binding: FieldGetter<I, V> = Arc::new(move |this: &I| Ok(get(this)));
    Some(binding)
}

fn instance_getter<I: Typed, V: Typed>(core: DynGetter) -> FieldGetter<I, V> {
    Arc::new(move |this: &I| core(Some(reflect_ref(this)), &[])?.take_as::<V>())
}

fn instance_setter_fast<I: Typed, V: Typed>(member: &ValueMember) -> Option<FieldSetter<I, V>> {
    let set = member.typed_access::<InstanceAccess<I, V>>()?.setter()?.clone();
    let binding: FieldSetter<I, V> = Arc::new(move |this: &mut I, value: V| {
        set(this, value);
        Ok(())
    });
    Some(binding)
}

fn instance_setter<I: Typed, V: Typed>(core: DynSetter) -> FieldSetter<I, V> {
    Arc::new(move |this: &mut I, value: V| core(Some(reflect_mut(this)), &[], Object::new(value)))
}

fn object_getter(core: DynGetter) -> ObjectGetter {
    Arc::new(move |this: &dyn Reflect| core(Some(unwrap_ref(this)), &[]))
}

fn object_setter(core: DynSetter) -> ObjectSetter {
    Arc::new(move |this: &mut dyn Reflect, value: Object| core(Some(unwrap_mut(this)), &[], value))
}

fn static_getter_fast<V: Typed>(member: &ValueMember) -> Option<StaticGetter<V>> {
    let get = member.typed_access::<StaticAccess<V>>()?.getter()?.clone();
    let binding: StaticGetter<V> = Arc::new(move || Ok(get()));
    Some(binding)
}

fn static_getter<V: Typed>(core: DynGetter) -> StaticGetter<V> {
    Arc::new(move || core(None, &[])?.take_as::<V>())
}

fn static_setter_fast<V: Typed>(member: &ValueMember) -> Option<StaticSetter<V>> {
    let set = member.typed_access::<StaticAccess<V>>()?.setter()?.clone();
    let binding: StaticSetter<V> = Arc::new(move |value: V| {
        set(value);
        Ok(())
    });
    Some(binding)
}

fn static_setter<V: Typed>(core: DynSetter) -> StaticSetter<V> {
    Arc::new(move |value: V| core(None, &[], Object::new(value)))
}

fn index_getter_fast<I: Typed, X: Typed, V: Typed>(member: &ValueMember) -> Option<IndexGetter<I, X, V>> {
    let get = member.typed_access::<IndexerAccess<I, X, V>>()?.getter()?.clone();
    let binding: IndexGetter<I, X, V> = Arc::new(move |this: &I, index: X| Ok(get(this, index)));
    Some(binding)
}

fn index_getter<I: Typed, X: Typed, V: Typed>(core: DynGetter) -> IndexGetter<I, X, V> {
    Arc::new(move |this: &I, index: X| core(Some(reflect_ref(this)), &[Object::new(index)])?.take_as::<V>())
}

fn index_setter_fast<I: Typed, X: Typed, V: Typed>(member: &ValueMember) -> Option<IndexSetter<I, X, V>> {
    let set = member.typed_access::<IndexerAccess<I, X, V>>()?.setter()?.clone();
    let binding: IndexSetter<I, X, V> = Arc::new(move |this: &mut I, index: X, value: V| {
        set(this, index, value);
        Ok(())
    });
    Some(binding)
}

fn index_setter<I: Typed, X: Typed, V: Typed>(core: DynSetter) -> IndexSetter<I, X, V> {
    Arc::new(move |this: &mut I, index: X, value: V| {
        core(Some(reflect_mut(this)), &[Object::new(index)], Object::new(value))
    })
}

fn object_index_getter(core: DynGetter) -> ObjectIndexGetter {
    Arc::new(move |this: &dyn Reflect, index: &[Object]| core(Some(unwrap_ref(this)), index))
}

fn object_index_setter(core: DynSetter) -> ObjectIndexSetter {
    Arc::new(move |this: &mut dyn Reflect, index: &[Object], value: Object| {
        core(Some(unwrap_mut(this)), index, value)
    })
}

// -----------------------------------------------------------------------------
// Binder

impl Binder {
    fn read<B: Clone + Send + Sync + 'static>(
        &self,
        member: ValueMember,
        request: ValueRequest,
        op: Operation,
        typed: bool,
        fast: fn(&ValueMember) -> Option<B>,
        wrap: fn(DynGetter) -> B,
    ) -> B {
        self.resolve(&ReadShape {
            member,
            request,
            ladder: Ladder::for_op(op, typed),
            fast,
            wrap,
        })
    }

    fn write<B: Clone + Send + Sync + 'static>(
        &self,
        member: ValueMember,
        request: ValueRequest,
        op: Operation,
        typed: bool,
        fast: fn(&ValueMember) -> Option<B>,
        wrap: fn(DynSetter) -> B,
    ) -> B {
        self.resolve(&WriteShape {
            member,
            request,
            ladder: Ladder::for_op(op, typed),
            fast,
            wrap,
        })
    }

    pub(crate) fn bind_instance_getter<I: Typed, V: Typed>(
        &self,
        member: ValueMember,
    ) -> Result<FieldGetter<I, V>, BindError> {
        validate::plain(&member)?;
        validate::expect_static(member.id(), member.is_static(), false)?;
        validate::instance_type(member.id(), &member.declaring(), &I::ty())?;
        validate::readable(&member)?;

        let request = ValueRequest::new(Some(I::ty()), Vec::new(), V::ty());
        Ok(self.read(
            member,
            request,
            Operation::Get,
            true,
            instance_getter_fast::<I, V>,
            instance_getter::<I, V>,
        ))
    }

    pub(crate) fn bind_instance_setter<I: Typed, V: Typed>(
        &self,
        member: ValueMember,
    ) -> Result<FieldSetter<I, V>, BindError> {
        validate::plain(&member)?;
        validate::expect_static(member.id(), member.is_static(), false)?;
        validate::instance_type(member.id(), &member.declaring(), &I::ty())?;
        validate::writable(&member)?;

        let request = ValueRequest::new(Some(I::ty()), Vec::new(), V::ty());
        Ok(self.write(
            member,
            request,
            Operation::Set,
            true,
            instance_setter_fast::<I, V>,
            instance_setter::<I, V>,
        ))
    }

    pub(crate) fn bind_object_getter(&self, member: ValueMember) -> Result<ObjectGetter, BindError> {
        validate::plain(&member)?;
        validate::expect_static(member.id(), member.is_static(), false)?;
        validate::readable(&member)?;

        let request = ValueRequest::new(Some(Object::ty()), Vec::new(), Object::ty());
        Ok(self.read(member, request, Operation::Get, false, no_fast_path, object_getter))
    }

    pub(crate) fn bind_object_setter(&self, member: ValueMember) -> Result<ObjectSetter, BindError> {
        validate::plain(&member)?;
        validate::expect_static(member.id(), member.is_static(), false)?;
        validate::writable(&member)?;

        let request = ValueRequest::new(Some(Object::ty()), Vec::new(), Object::ty());
        Ok(self.write(member, request, Operation::Set, false, no_fast_path, object_setter))
    }

    pub(crate) fn bind_static_getter<V: Typed>(&self, member: ValueMember) -> Result<StaticGetter<V>, BindError> {
        validate::plain(&member)?;
        validate::expect_static(member.id(), member.is_static(), true)?;
        validate::readable(&member)?;

        let typed = !V::ty().is_object();
        let request = ValueRequest::new(None, Vec::new(), V::ty());
        Ok(self.read(
            member,
            request,
            Operation::StaticGet,
            typed,
            static_getter_fast::<V>,
            static_getter::<V>,
        ))
    }

    pub(crate) fn bind_static_setter<V: Typed>(&self, member: ValueMember) -> Result<StaticSetter<V>, BindError> {
        validate::plain(&member)?;
        validate::expect_static(member.id(), member.is_static(), true)?;
        validate::writable(&member)?;

        let typed = !V::ty().is_object();
        let request = ValueRequest::new(None, Vec::new(), V::ty());
        Ok(self.write(
            member,
            request,
            Operation::StaticSet,
            typed,
            static_setter_fast::<V>,
            static_setter::<V>,
        ))
    }

    pub(crate) fn bind_index_getter<I: Typed, X: Typed, V: Typed>(
        &self,
        member: ValueMember,
    ) -> Result<IndexGetter<I, X, V>, BindError> {
        validate::indexer(&member, Some(1))?;
        validate::expect_static(member.id(), member.is_static(), false)?;
        validate::instance_type(member.id(), &member.declaring(), &I::ty())?;
        validate::readable(&member)?;

        let request = ValueRequest::new(Some(I::ty()), alloc::vec![X::ty()], V::ty());
        Ok(self.read(
            member,
            request,
            Operation::IndexGet,
            true,
            index_getter_fast::<I, X, V>,
            index_getter::<I, X, V>,
        ))
    }

    pub(crate) fn bind_index_setter<I: Typed, X: Typed, V: Typed>(
        &self,
        member: ValueMember,
    ) -> Result<IndexSetter<I, X, V>, BindError> {
        validate::indexer(&member, Some(1))?;
        validate::expect_static(member.id(), member.is_static(), false)?;
        validate::instance_type(member.id(), &member.declaring(), &I::ty())?;
        validate::writable(&member)?;

        let request = ValueRequest::new(Some(I::ty()), alloc::vec![X::ty()], V::ty());
        Ok(self.write(
            member,
            request,
            Operation::IndexSet,
            true,
            index_setter_fast::<I, X, V>,
            index_setter::<I, X, V>,
        ))
    }

    pub(crate) fn bind_object_index_getter(&self, member: ValueMember) -> Result<ObjectIndexGetter, BindError> {
        validate::indexer(&member, None)?;
        validate::expect_static(member.id(), member.is_static(), false)?;
        validate::readable(&member)?;

        let index = alloc::vec![Object::ty(); member.index_params().len()];
        let request = ValueRequest::new(Some(Object::ty()), index, Object::ty());
        Ok(self.read(
            member,
            request,
            Operation::IndexGet,
            false,
            no_fast_path,
            object_index_getter,
        ))
    }

    pub(crate) fn bind_object_index_setter(&self, member: ValueMember) -> Result<ObjectIndexSetter, BindError> {
        validate::indexer(&member, None)?;
        validate::expect_static(member.id(), member.is_static(), false)?;
        validate::writable(&member)?;

        let index = alloc::vec![Object::ty(); member.index_params().len()];
        let request = ValueRequest::new(Some(Object::ty()), index, Object::ty());
        Ok(self.write(
            member,
            request,
            Operation::IndexSet,
            false,
            no_fast_path,
            object_index_setter,
        ))
    }
}
