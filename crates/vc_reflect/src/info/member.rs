use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use crate::info::{ConstructorInfo, FieldInfo, MethodInfo, PropertyInfo, Type};
use crate::{CallError, Object, Reflect};

// -----------------------------------------------------------------------------
// Dynamic implementations

/// Reads a field or property.
///
/// The receiver is `None` for static members. The slice holds indexer
/// arguments and is empty for plain members.
pub type DynGetter =
    Arc<dyn Fn(Option<&dyn Reflect>, &[Object]) -> Result<Object, CallError> + Send + Sync>;

/// Writes a field or property. See [`DynGetter`].
pub type DynSetter = Arc<
    dyn Fn(Option<&mut dyn Reflect>, &[Object], Object) -> Result<(), CallError> + Send + Sync,
>;

/// Calls a method or constructor.
///
/// By-reference parameters are written back into the argument slice.
pub type DynInvoke =
    Arc<dyn Fn(Option<&mut dyn Reflect>, &mut [Object]) -> Result<Object, CallError> + Send + Sync>;

// -----------------------------------------------------------------------------
// MemberKind

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
    Method,
    Constructor,
}

impl MemberKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Property => "property",
            Self::Method => "method",
            Self::Constructor => "constructor",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// MemberId

/// Structural identity of a member.
///
/// Two descriptors built for the same member compare equal, so bindings
/// cached for one are found through the other.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MemberId {
    owner: TypeId,
    owner_name: &'static str,
    kind: MemberKind,
    name: &'static str,
    params: Arc<[TypeId]>,
}

impl MemberId {
    pub fn new(owner: Type, kind: MemberKind, name: &'static str, params: &[Type]) -> Self {
        Self {
            owner: owner.id(),
            owner_name: owner.path(),
            kind,
            name,
            params: params.iter().map(Type::id).collect::<Vec<_>>().into(),
        }
    }

    #[inline]
    pub fn owner(&self) -> TypeId {
        self.owner
    }

    #[inline]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn params(&self) -> &[TypeId] {
        &self.params
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({self})", self.kind)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = self.owner_name.rsplit("::").next().unwrap_or(self.owner_name);
        write!(f, "{owner}::{}", self.name)
    }
}

// -----------------------------------------------------------------------------
// Parameters

/// How an argument is passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamMode {
    In,
    /// Read and written back.
    Ref,
    /// Only written back.
    Out,
}

#[derive(Clone, Copy, Debug)]
pub struct ParamInfo {
    name: &'static str,
    ty: Type,
    mode: ParamMode,
}

impl ParamInfo {
    #[inline]
    pub const fn new(name: &'static str, ty: Type) -> Self {
        Self {
            name,
            ty,
            mode: ParamMode::In,
        }
    }

    #[inline]
    pub const fn with_mode(mut self, mode: ParamMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    #[inline]
    pub const fn mode(&self) -> ParamMode {
        self.mode
    }

    #[inline]
    pub const fn is_by_ref(&self) -> bool {
        !matches!(self.mode, ParamMode::In)
    }
}

// -----------------------------------------------------------------------------
// Member

/// Any member descriptor.
#[derive(Clone, Debug)]
pub enum Member {
    Field(Arc<FieldInfo>),
    Property(Arc<PropertyInfo>),
    Method(Arc<MethodInfo>),
    Constructor(Arc<ConstructorInfo>),
}

impl Member {
    pub fn id(&self) -> &MemberId {
        match self {
            Self::Field(info) => info.id(),
            Self::Property(info) => info.id(),
            Self::Method(info) => info.id(),
            Self::Constructor(info) => info.id(),
        }
    }

    pub fn declaring(&self) -> Type {
        match self {
            Self::Field(info) => info.declaring(),
            Self::Property(info) => info.declaring(),
            Self::Method(info) => info.declaring(),
            Self::Constructor(info) => info.declaring(),
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            Self::Field(info) => info.is_static(),
            Self::Property(info) => info.is_static(),
            Self::Method(info) => info.is_static(),
            Self::Constructor(_) => true,
        }
    }
}

pub(crate) fn param_types(params: &[ParamInfo]) -> Vec<Type> {
    params.iter().map(ParamInfo::ty).collect()
}

// -----------------------------------------------------------------------------
// Receivers

pub(crate) fn receiver_ref<'a, I: Reflect>(
    this: Option<&'a dyn Reflect>,
    member: &'static str,
) -> Result<&'a I, CallError> {
    let this = this.ok_or(CallError::MissingReceiver { member })?;
    let from = this.reflect_type_name();
    this.downcast_ref::<I>()
        .ok_or_else(|| CallError::invalid_cast(from, core::any::type_name::<I>()))
}

pub(crate) fn receiver_mut<'a, I: Reflect>(
    this: Option<&'a mut dyn Reflect>,
    member: &'static str,
) -> Result<&'a mut I, CallError> {
    let this = this.ok_or(CallError::MissingReceiver { member })?;
    let from = this.reflect_type_name();
    this.downcast_mut::<I>()
        .ok_or_else(|| CallError::invalid_cast(from, core::any::type_name::<I>()))
}
