use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use vc_reflect::Object;
use vc_reflect::info::{ArgList, ConstructorInfo, Type, Typed};

use super::invoke::{self, InvokeRequest};
use super::{Constructor, Factory, Invocable, ObjectConstructor};
use crate::{BindError, Binder, validate};

impl Binder {
    /// Creates values of `ty` with its parameterless constructor.
    pub fn parameterless_constructor(&self, ty: &Type) -> Result<Factory<Object>, BindError> {
        let ctor = self.find_constructor(ty, &[])?;
        Ok(self.factory::<Object>(ctor))
    }

    /// # Examples
    ///
    /// ```
    /// use vc_bind::Binder;
    ///
    /// let binder = Binder::default();
    /// let new = binder.typed_parameterless_constructor::<String>().unwrap();
    /// assert_eq!(new(), Ok(String::new()));
    /// ```
    pub fn typed_parameterless_constructor<T: Typed>(&self) -> Result<Factory<T>, BindError> {
        let ctor = self.find_constructor(&T::ty(), &[])?;
        Ok(self.factory::<T>(ctor))
    }

    /// Calls `ctor` with boxed arguments.
    pub fn constructor(&self, ctor: &Arc<ConstructorInfo>) -> Result<ObjectConstructor, BindError> {
        let member = Invocable::Constructor(ctor.clone());
        let request = InvokeRequest::untyped(&member);
        Ok(self.call(member, request, false, invoke::no_fast_path, invoke::object_constructor))
    }

    /// Calls `ctor` with the arguments `Args`, returning a `T`.
    ///
    /// `T` is the declaring type of `ctor` or [`Object`].
    pub fn typed_constructor<Args: ArgList, T: Typed>(
        &self,
        ctor: &Arc<ConstructorInfo>,
    ) -> Result<Constructor<Args, T>, BindError> {
        validate::instance_type(ctor.id(), &ctor.declaring(), &T::ty())?;
        let args = Args::types();
        validate::arguments(&self.registry().read(), ctor.id(), ctor.params(), &args, true)?;

        let request = InvokeRequest::new(None, args, Some(T::ty()));
        Ok(self.call(
            Invocable::Constructor(ctor.clone()),
            request,
            true,
            invoke::function_fast::<Args, T>,
            invoke::function::<Args, T>,
        ))
    }

    /// Closes the generic `definition` over `args` and binds the
    /// constructor taking `params`.
    ///
    /// The closed type must have been registered, as with
    /// `registry.register::<Vec<i32>>()` for `("Vec", [i32])`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_bind::Binder;
    /// use vc_reflect::{Object, info::Typed, registry::TypeRegistry};
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry.register::<Vec<i32>>();
    /// let binder = Binder::new(registry);
    ///
    /// let new = binder.generic_constructor("Vec", &[i32::ty()], &[]).unwrap();
    /// let list = new(&mut []).unwrap();
    /// assert_eq!(list.downcast_ref::<Vec<i32>>(), Some(&Vec::new()));
    /// ```
    pub fn generic_constructor(
        &self,
        definition: &str,
        args: &[Type],
        params: &[Type],
    ) -> Result<ObjectConstructor, BindError> {
        let ty = self.close_generic(definition, args)?;
        let ctor = self.find_constructor(&ty, params)?;
        self.constructor(&ctor)
    }

    fn close_generic(&self, definition: &str, args: &[Type]) -> Result<Type, BindError> {
        let registry = self.registry().read();
        if !registry.has_generic_definition(definition) {
            return Err(BindError::UnknownGenericDefinition {
                definition: String::from(definition),
            });
        }
        let ids: Vec<_> = args.iter().map(Type::id).collect();
        match registry.get_generic(definition, &ids) {
            Some(meta) => Ok(meta.ty()),
            None => Err(BindError::UnknownType {
                ty: format!("{definition}<{}>", validate::type_list(args)),
            }),
        }
    }

    fn factory<T: Typed>(&self, ctor: Arc<ConstructorInfo>) -> Factory<T> {
        self.call(
            Invocable::Constructor(ctor),
            InvokeRequest::new(None, Vec::new(), Some(T::ty())),
            !T::ty().is_object(),
            invoke::factory_fast::<T>,
            invoke::factory::<T>,
        )
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    use vc_reflect::derive::Reflect;
    use vc_reflect::info::{ConstructorInfo, Typed};
    use vc_reflect::registry::{TypeMeta, TypeRegistry};
    use vc_reflect::{CallError, Object};

    use crate::{BindError, Binder, Capabilities};

    #[derive(Reflect, Clone, Debug, Default, PartialEq)]
    #[reflect(default)]
    struct Point {
        x: i32,
        y: i32,
    }

    fn binder() -> Binder {
        let mut registry = TypeRegistry::new();
        registry.register::<Point>();
        if let Some(meta) = registry.get_mut(core::any::TypeId::of::<Point>()) {
            meta.push_constructor(ConstructorInfo::new::<Point, (i32, i32), _>(|x: i32, y: i32| Point { x, y }));
        }
        Binder::new(registry)
    }

    fn configurations() -> [Capabilities; 3] {
        [Capabilities::ALL, Capabilities::ALL.with_emit(false), Capabilities::NONE]
    }

    #[test]
    fn parameterless() {
        let binder = binder();
        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            let typed = binder.typed_parameterless_constructor::<Point>().unwrap();
            assert_eq!(typed(), Ok(Point::default()));

            let boxed = binder.parameterless_constructor(&Point::ty()).unwrap();
            assert_eq!(boxed().unwrap().take_as::<Point>(), Ok(Point::default()));
        }
        assert!(matches!(
            binder.typed_parameterless_constructor::<Arc<str>>(),
            Err(BindError::UnknownType { .. })
        ));
    }

    #[test]
    fn with_arguments() {
        let binder = binder();
        let ctor = binder.find_constructor(&Point::ty(), &[i32::ty(), i32::ty()]).unwrap();

        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            let typed = binder.typed_constructor::<(i32, i32), Point>(&ctor).unwrap();
            assert_eq!(typed((1, 2)), Ok(Point { x: 1, y: 2 }));

            let boxed = binder.typed_constructor::<(Object, i32), Object>(&ctor).unwrap();
            let point = boxed((Object::new(3_i32), 4)).unwrap();
            assert_eq!(point.take_as::<Point>(), Ok(Point { x: 3, y: 4 }));

            let untyped = binder.constructor(&ctor).unwrap();
            let mut args = [Object::new(5_i32), Object::new(6_i32)];
            assert_eq!(untyped(&mut args).unwrap().take_as::<Point>(), Ok(Point { x: 5, y: 6 }));
            let mut wrong = [Object::new(5_i32), Object::new("6")];
            assert!(matches!(untyped(&mut wrong), Err(CallError::InvalidCast { .. })));
        }
        assert!(binder.is_constructor_cached(&ctor));

        assert!(matches!(
            binder.typed_constructor::<(i32, i32), String>(&ctor),
            Err(BindError::InstanceType { .. })
        ));
        assert!(matches!(
            binder.typed_constructor::<(i32, i64), Point>(&ctor),
            Err(BindError::ParameterType { index: 1, .. })
        ));
        assert!(matches!(
            binder.find_constructor(&Point::ty(), &[i32::ty()]),
            Err(BindError::NoConstructor { .. })
        ));
    }

    #[test]
    fn generic_definitions() {
        let mut registry = TypeRegistry::new();
        registry.register::<Vec<String>>();
        registry.insert_type_meta(TypeMeta::of::<Point>());
        let binder = Binder::new(registry);

        let new = binder.generic_constructor("Vec", &[String::ty()], &[]).unwrap();
        let list = new(&mut []).unwrap();
        assert_eq!(list.downcast_ref::<Vec<String>>().map(Vec::len), Some(0));

        assert!(matches!(
            binder.generic_constructor("HashMap", &[String::ty()], &[]),
            Err(BindError::UnknownGenericDefinition { .. })
        ));
        assert!(matches!(
            binder.generic_constructor("Vec", &[i32::ty()], &[]),
            Err(BindError::UnknownType { .. })
        ));
        assert!(matches!(
            binder.parameterless_constructor(&Point::ty()),
            Err(BindError::NoConstructor { .. })
        ));
    }
}
