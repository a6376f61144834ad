use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;
use core::ops::{Deref, DerefMut};

use vc_utils::TypeIdMap;

use crate::info::{ConstructorInfo, FieldInfo, Member, MethodInfo, ParamInfo, PropertyInfo, Type, Typed};
use crate::registry::{FromType, TypeRegistry, TypeTrait, TypeTraitList};

// -----------------------------------------------------------------------------
// GenericInfo

/// The open definition a closed generic type was built from.
///
/// `Pair<i32, String>` has definition `"Pair"` and arguments `[i32, String]`.
#[derive(Clone, Debug)]
pub struct GenericInfo {
    definition: &'static str,
    args: Box<[Type]>,
}

impl GenericInfo {
    #[inline]
    pub fn definition(&self) -> &'static str {
        self.definition
    }

    #[inline]
    pub fn args(&self) -> &[Type] {
        &self.args
    }
}

// -----------------------------------------------------------------------------
// TypeMeta

/// Runtime storage for type metadata, registered into the [`TypeRegistry`].
///
/// This includes the [`Type`], its member descriptors and a [`TypeTrait`] table.
///
/// A `TypeMeta` can be built by hand with [`TypeMeta::of`], but is more often
/// generated by [`#[derive(Reflect)]`](crate::derive::Reflect) through
/// [`GetTypeMeta`].
///
/// # Example
///
/// ```
/// use vc_reflect::info::{FieldInfo, Typed};
/// use vc_reflect::registry::TypeMeta;
///
/// #[derive(Clone, Debug)]
/// struct Player { score: i32 }
/// impl Typed for Player {}
///
/// let meta = TypeMeta::of::<Player>()
///     .with_field(FieldInfo::new::<Player, i32>("score", |p| &p.score, |p| &mut p.score));
///
/// assert_eq!(meta.field("score").unwrap().ty(), i32::ty());
/// assert!(meta.field("health").is_none());
/// ```
pub struct TypeMeta {
    ty: Type,
    generic: Option<GenericInfo>,
    fields: Vec<Arc<FieldInfo>>,
    properties: Vec<Arc<PropertyInfo>>,
    methods: Vec<Arc<MethodInfo>>,
    constructors: Vec<Arc<ConstructorInfo>>,
    trait_table: TypeIdMap<Box<dyn TypeTrait>>,
}

impl TypeMeta {
    /// Creates a [`TypeMeta`] without members.
    ///
    /// [`TypeTraitList`] is always inserted.
    pub fn of<T: Typed + fmt::Debug>() -> Self {
        let mut meta = Self {
            ty: T::ty(),
            generic: None,
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            trait_table: TypeIdMap::new(),
        };
        meta.insert_trait::<TypeTraitList>(FromType::<T>::from_type());
        meta
    }

    #[inline(always)]
    pub fn ty(&self) -> Type {
        self.ty
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.ty.id()
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.ty.path()
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.ty.name()
    }

    /// Marks this type as the closed form of a generic definition.
    pub fn with_generic(mut self, definition: &'static str, args: &[Type]) -> Self {
        self.generic = Some(GenericInfo {
            definition,
            args: args.into(),
        });
        self
    }

    #[inline]
    pub fn generic(&self) -> Option<&GenericInfo> {
        self.generic.as_ref()
    }

    // ---------------------------------------------------------------
    // Members

    #[inline]
    pub fn push_field(&mut self, field: FieldInfo) {
        self.fields.push(Arc::new(field));
    }

    #[inline]
    pub fn push_property(&mut self, property: PropertyInfo) {
        self.properties.push(Arc::new(property));
    }

    #[inline]
    pub fn push_method(&mut self, method: MethodInfo) {
        self.methods.push(Arc::new(method));
    }

    #[inline]
    pub fn push_constructor(&mut self, constructor: ConstructorInfo) {
        self.constructors.push(Arc::new(constructor));
    }

    #[inline]
    pub fn with_field(mut self, field: FieldInfo) -> Self {
        self.push_field(field);
        self
    }

    #[inline]
    pub fn with_property(mut self, property: PropertyInfo) -> Self {
        self.push_property(property);
        self
    }

    #[inline]
    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.push_method(method);
        self
    }

    #[inline]
    pub fn with_constructor(mut self, constructor: ConstructorInfo) -> Self {
        self.push_constructor(constructor);
        self
    }

    #[inline]
    pub fn fields(&self) -> &[Arc<FieldInfo>] {
        &self.fields
    }

    /// Returns the field named `name`, static or not.
    pub fn field(&self, name: &str) -> Option<&Arc<FieldInfo>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    #[inline]
    pub fn properties(&self) -> &[Arc<PropertyInfo>] {
        &self.properties
    }

    /// Returns the non-indexed property named `name`.
    pub fn property(&self, name: &str) -> Option<&Arc<PropertyInfo>> {
        self.properties
            .iter()
            .find(|p| !p.is_indexer() && p.name() == name)
    }

    pub fn indexers(&self) -> impl Iterator<Item = &Arc<PropertyInfo>> {
        self.properties.iter().filter(|p| p.is_indexer())
    }

    /// Returns the indexer whose index parameters are exactly `index`.
    pub fn indexer(&self, index: &[Type]) -> Option<&Arc<PropertyInfo>> {
        self.indexers().find(|p| same_types(p.index_params(), index))
    }

    #[inline]
    pub fn methods(&self) -> &[Arc<MethodInfo>] {
        &self.methods
    }

    /// Returns every overload named `name`.
    pub fn methods_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Arc<MethodInfo>> + use<'a, 'n> {
        self.methods.iter().filter(move |m| m.name() == name)
    }

    /// Returns the overload of `name` whose parameters are exactly `params`.
    pub fn method(&self, name: &str, params: &[Type]) -> Option<&Arc<MethodInfo>> {
        self.methods_named(name)
            .find(|m| same_types(m.params(), params))
    }

    #[inline]
    pub fn constructors(&self) -> &[Arc<ConstructorInfo>] {
        &self.constructors
    }

    /// Returns the constructor whose parameters are exactly `params`.
    pub fn constructor(&self, params: &[Type]) -> Option<&Arc<ConstructorInfo>> {
        self.constructors
            .iter()
            .find(|c| same_types(c.params(), params))
    }

    #[inline]
    pub fn parameterless_constructor(&self) -> Option<&Arc<ConstructorInfo>> {
        self.constructor(&[])
    }

    /// Iterates over every member descriptor.
    pub fn members(&self) -> impl Iterator<Item = Member> + '_ {
        let fields = self.fields.iter().cloned().map(Member::Field);
        let properties = self.properties.iter().cloned().map(Member::Property);
        let methods = self.methods.iter().cloned().map(Member::Method);
        let constructors = self.constructors.iter().cloned().map(Member::Constructor);
        fields.chain(properties).chain(methods).chain(constructors)
    }

    // ---------------------------------------------------------------
    // Type traits

    /// Insert a new [`TypeTrait`].
    #[inline(always)]
    pub fn insert_trait<T: TypeTrait>(&mut self, data: T) {
        self.insert_trait_by_id(TypeId::of::<T>(), Box::new(data));
    }

    #[inline(never)]
    fn insert_trait_by_id(&mut self, id: TypeId, val: Box<dyn TypeTrait>) {
        self.trait_table.insert(id, val);
    }

    #[inline]
    pub fn with_trait<T: TypeTrait>(mut self, data: T) -> Self {
        self.insert_trait(data);
        self
    }

    /// Removes a [`TypeTrait`] from the meta.
    pub fn remove_trait_by_id(&mut self, type_id: TypeId) -> Option<Box<dyn TypeTrait>> {
        self.trait_table.remove(&type_id)
    }

    /// Get a [`TypeTrait`] reference, or return `None` if it's doesn't exist.
    #[inline]
    pub fn get_trait<T: TypeTrait>(&self) -> Option<&T> {
        self.get_trait_by_id(TypeId::of::<T>())
            .and_then(<dyn TypeTrait>::downcast_ref)
    }

    pub fn get_trait_by_id(&self, type_id: TypeId) -> Option<&dyn TypeTrait> {
        self.trait_table.get(&type_id).map(Deref::deref)
    }

    #[inline]
    pub fn get_trait_mut<T: TypeTrait>(&mut self) -> Option<&mut T> {
        self.trait_table
            .get_mut(&TypeId::of::<T>())
            .map(DerefMut::deref_mut)
            .and_then(<dyn TypeTrait>::downcast_mut)
    }

    /// Return true if specific [`TypeTrait`] is exist.
    #[inline]
    pub fn has_trait<T: TypeTrait>(&self) -> bool {
        self.trait_table.contains(&TypeId::of::<T>())
    }

    /// Return the number of [`TypeTrait`].
    #[inline]
    pub fn trait_len(&self) -> usize {
        self.trait_table.len()
    }
}

impl fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMeta")
            .field("ty", &self.ty)
            .field("generic", &self.generic)
            .field("fields", &self.fields)
            .field("properties", &self.properties)
            .field("methods", &self.methods)
            .field("constructors", &self.constructors)
            .finish_non_exhaustive()
    }
}

fn same_types(params: &[ParamInfo], types: &[Type]) -> bool {
    params.len() == types.len() && params.iter().zip(types).all(|(p, t)| p.ty() == *t)
}

// -----------------------------------------------------------------------------
// GetTypeMeta

/// A trait which allows a type to generate its [`TypeMeta`]
/// for registration into the [`TypeRegistry`].
///
/// This trait is automatically implemented by
/// [`#[derive(Reflect)]`](crate::derive::Reflect).
///
/// # Manually
///
/// ```
/// use vc_reflect::info::{ConstructorInfo, Typed};
/// use vc_reflect::registry::{GetTypeMeta, TypeMeta};
///
/// #[derive(Clone, Debug, Default)]
/// struct Marker;
///
/// impl Typed for Marker {}
///
/// impl GetTypeMeta for Marker {
///     fn get_type_meta() -> TypeMeta {
///         TypeMeta::of::<Self>().with_constructor(ConstructorInfo::default::<Self>())
///     }
/// }
///
/// assert!(Marker::get_type_meta().parameterless_constructor().is_some());
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `GetTypeMeta` so cannot provide type registration information",
    note = "consider annotating `{Self}` with `#[derive(Reflect)]`"
)]
pub trait GetTypeMeta: Typed {
    /// Returns the **default** [`TypeMeta`] for this type.
    fn get_type_meta() -> TypeMeta;

    /// Registers other types needed by this type.
    /// **Allow** not to register oneself.
    fn register_dependencies(_registry: &mut TypeRegistry) {}
}
