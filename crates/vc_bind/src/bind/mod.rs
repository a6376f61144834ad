//! Binding shapes and the strategies that build them.
//!
//! A shape is one requested binding signature. Shapes whose binding types
//! differ are cached under different keys, so the same member bound as
//! `FieldGetter<Player, i32>` and as `FieldGetter<Player, Object>` yields
//! two bindings.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, TypeId};

use vc_reflect::info::{
    ConstructorInfo, DynGetter, DynInvoke, DynSetter, FieldInfo, MemberId, MemberKind, MethodInfo,
    ParamInfo, PropertyInfo, Type,
};
use vc_reflect::ops::{Array, List, Map, Set};
use vc_reflect::registry::{TypeRegistry, TypeRegistryArc};
use vc_reflect::{CallError, Object, Reflect};

use crate::{Category, Strategy, Subject};

mod collection;
mod constructor;
mod field;
mod invoke;
mod method;
mod property;
mod value;

// -----------------------------------------------------------------------------
// Binding types

/// Reads an instance member of `I` as `V`.
pub type FieldGetter<I, V> = Arc<dyn Fn(&I) -> Result<V, CallError> + Send + Sync>;
/// Writes an instance member of `I` from a `V`.
pub type FieldSetter<I, V> = Arc<dyn Fn(&mut I, V) -> Result<(), CallError> + Send + Sync>;
/// Reads a static member as `V`.
pub type StaticGetter<V> = Arc<dyn Fn() -> Result<V, CallError> + Send + Sync>;
/// Writes a static member from a `V`.
pub type StaticSetter<V> = Arc<dyn Fn(V) -> Result<(), CallError> + Send + Sync>;

/// Reads an instance member of any receiver.
///
/// An [`Object`] receiver stands for the value it holds.
pub type ObjectGetter = Arc<dyn Fn(&dyn Reflect) -> Result<Object, CallError> + Send + Sync>;
/// Writes an instance member of any receiver. See [`ObjectGetter`].
pub type ObjectSetter = Arc<dyn Fn(&mut dyn Reflect, Object) -> Result<(), CallError> + Send + Sync>;

pub type IndexGetter<I, X, V> = Arc<dyn Fn(&I, X) -> Result<V, CallError> + Send + Sync>;
pub type IndexSetter<I, X, V> = Arc<dyn Fn(&mut I, X, V) -> Result<(), CallError> + Send + Sync>;
pub type ObjectIndexGetter = Arc<dyn Fn(&dyn Reflect, &[Object]) -> Result<Object, CallError> + Send + Sync>;
pub type ObjectIndexSetter =
    Arc<dyn Fn(&mut dyn Reflect, &[Object], Object) -> Result<(), CallError> + Send + Sync>;

/// Calls an instance method of `I`.
///
/// `R = ()` discards the result of any method.
pub type MethodInvoker<I, Args, R> = Arc<dyn Fn(&mut I, Args) -> Result<R, CallError> + Send + Sync>;
/// Calls a static method, or constructs a `R`.
pub type StaticInvoker<Args, R> = Arc<dyn Fn(Args) -> Result<R, CallError> + Send + Sync>;
/// Calls any method with boxed arguments.
///
/// The receiver is ignored by static methods. By-reference results are
/// written back into the argument slice.
pub type ObjectInvoker =
    Arc<dyn Fn(Option<&mut dyn Reflect>, &mut [Object]) -> Result<Object, CallError> + Send + Sync>;

pub type Constructor<Args, T> = StaticInvoker<Args, T>;
pub type ObjectConstructor = Arc<dyn Fn(&mut [Object]) -> Result<Object, CallError> + Send + Sync>;
/// Creates a value with the parameterless constructor.
pub type Factory<T> = Arc<dyn Fn() -> Result<T, CallError> + Send + Sync>;

pub type ArrayFactory = Arc<dyn Fn(usize) -> Box<dyn Array> + Send + Sync>;
pub type ListFactory = Arc<dyn Fn(usize) -> Box<dyn List> + Send + Sync>;
pub type SetFactory = Arc<dyn Fn(usize) -> Box<dyn Set> + Send + Sync>;
pub type MapFactory = Arc<dyn Fn(usize) -> Box<dyn Map> + Send + Sync>;
/// Inserts into a set, returning `true` if the value was not present.
pub type SetAdder = Arc<dyn Fn(&mut dyn Reflect, Object) -> Result<bool, CallError> + Send + Sync>;
pub type SetClearer = Arc<dyn Fn(&mut dyn Reflect) -> Result<(), CallError> + Send + Sync>;

// -----------------------------------------------------------------------------
// Shape

/// Shared state handed to strategy builders.
pub(crate) struct BuildContext<'a> {
    /// Locked for the duration of the build.
    pub registry: &'a TypeRegistry,
    /// For bindings that consult the registry at call time.
    pub shared: &'a TypeRegistryArc,
}

/// A binding signature and how to build it with each strategy.
pub(crate) trait Shape: 'static {
    type Binding: Clone + Send + Sync + 'static;

    fn category(&self) -> Category;

    fn subject(&self) -> Subject;

    fn ladder(&self) -> &'static [Strategy];

    fn emit(&self, cx: &BuildContext<'_>) -> Option<Self::Binding>;

    fn expression(&self, cx: &BuildContext<'_>) -> Option<Self::Binding>;

    /// The fallback, which cannot fail to build.
    fn reflection(&self, cx: &BuildContext<'_>) -> Self::Binding;

    #[inline]
    fn shape_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Builds with `strategy`, `None` if it does not apply or is compiled out.
    fn build(&self, strategy: Strategy, cx: &BuildContext<'_>) -> Option<Self::Binding> {
        match strategy {
            Strategy::Emit if cfg!(feature = "emit") => self.emit(cx),
            Strategy::Expression if cfg!(feature = "expression") => self.expression(cx),
            Strategy::Emit | Strategy::Expression => None,
            Strategy::Reflection => Some(self.reflection(cx)),
        }
    }
}

// -----------------------------------------------------------------------------
// ValueMember

/// A field or a property.
#[derive(Clone)]
pub(crate) enum ValueMember {
    Field(Arc<FieldInfo>),
    Property(Arc<PropertyInfo>),
}

impl ValueMember {
    pub fn id(&self) -> &MemberId {
        match self {
            Self::Field(field) => field.id(),
            Self::Property(property) => property.id(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Field(field) => field.name(),
            Self::Property(property) => property.name(),
        }
    }

    pub fn declaring(&self) -> Type {
        match self {
            Self::Field(field) => field.declaring(),
            Self::Property(property) => property.declaring(),
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Self::Field(field) => field.ty(),
            Self::Property(property) => property.ty(),
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            Self::Field(field) => field.is_static(),
            Self::Property(property) => property.is_static(),
        }
    }

    pub fn index_params(&self) -> &[ParamInfo] {
        match self {
            Self::Field(_) => &[],
            Self::Property(property) => property.index_params(),
        }
    }

    pub fn getter(&self) -> Option<&DynGetter> {
        match self {
            Self::Field(field) => Some(field.getter()),
            Self::Property(property) => property.getter(),
        }
    }

    pub fn setter(&self) -> Option<&DynSetter> {
        match self {
            Self::Field(field) => Some(field.setter()),
            Self::Property(property) => property.setter(),
        }
    }

    pub fn typed_access<A: Any>(&self) -> Option<&A> {
        match self {
            Self::Field(field) => field.typed_access(),
            Self::Property(property) => property.typed_access(),
        }
    }

    pub fn has_typed_access(&self) -> bool {
        match self {
            Self::Field(field) => field.has_typed_access(),
            Self::Property(property) => property.has_typed_access(),
        }
    }

    pub fn category(&self, write: bool) -> Category {
        let kind = match self {
            Self::Field(_) => MemberKind::Field,
            Self::Property(_) => MemberKind::Property,
        };
        Category::of_value(kind, !self.index_params().is_empty(), write)
    }
}

// -----------------------------------------------------------------------------
// Invocable

/// A method or a constructor.
#[derive(Clone)]
pub(crate) enum Invocable {
    Method(Arc<MethodInfo>),
    Constructor(Arc<ConstructorInfo>),
}

impl Invocable {
    pub fn id(&self) -> &MemberId {
        match self {
            Self::Method(method) => method.id(),
            Self::Constructor(ctor) => ctor.id(),
        }
    }

    pub fn declaring(&self) -> Type {
        match self {
            Self::Method(method) => method.declaring(),
            Self::Constructor(ctor) => ctor.declaring(),
        }
    }

    pub fn params(&self) -> &[ParamInfo] {
        match self {
            Self::Method(method) => method.params(),
            Self::Constructor(ctor) => ctor.params(),
        }
    }

    /// Constructors return their declaring type.
    pub fn return_type(&self) -> Type {
        match self {
            Self::Method(method) => method.return_type(),
            Self::Constructor(ctor) => ctor.declaring(),
        }
    }

    /// Constructors are static.
    pub fn is_static(&self) -> bool {
        match self {
            Self::Method(method) => method.is_static(),
            Self::Constructor(_) => true,
        }
    }

    pub fn invoker(&self) -> &DynInvoke {
        match self {
            Self::Method(method) => method.invoker(),
            Self::Constructor(ctor) => ctor.invoker(),
        }
    }

    pub fn typed_access<A: Any>(&self) -> Option<&A> {
        match self {
            Self::Method(method) => method.typed_access(),
            Self::Constructor(ctor) => ctor.typed_access(),
        }
    }

    pub fn has_typed_access(&self) -> bool {
        match self {
            Self::Method(method) => method.has_typed_access(),
            Self::Constructor(ctor) => ctor.has_typed_access(),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Method(_) => Category::MethodInvoker,
            Self::Constructor(_) => Category::Constructor,
        }
    }
}

// -----------------------------------------------------------------------------
// Receivers

/// The value an untyped receiver stands for, unwrapping [`Object`]s.
#[inline]
pub(crate) fn unwrap_ref(this: &dyn Reflect) -> &dyn Reflect {
    match this.downcast_ref::<Object>() {
        Some(object) => object.as_inner(),
        None => this,
    }
}

/// Mutable version of [`unwrap_ref`].
#[inline]
pub(crate) fn unwrap_mut(this: &mut dyn Reflect) -> &mut dyn Reflect {
    if this.is::<Object>() {
        match this.downcast_mut::<Object>() {
            Some(object) => object.as_inner_mut(),
            None => unreachable!(),
        }
    } else {
        this
    }
}

/// Unboxes a call result as `R`, discarding it for `R = ()`.
#[inline]
pub(crate) fn finish<R: Reflect>(out: Object) -> Result<R, CallError> {
    if TypeId::of::<R>() == TypeId::of::<()>() {
        Object::unit().take_as::<R>()
    } else {
        out.take_as::<R>()
    }
}
