use alloc::sync::Arc;

use vc_reflect::info::{ArgList, MethodInfo, Typed};

use super::invoke::{self, InvokeRequest};
use super::{Invocable, MethodInvoker, ObjectInvoker, StaticInvoker};
use crate::{BindError, Binder, validate};

impl Binder {
    /// Calls `method` with boxed arguments.
    ///
    /// Static methods ignore the receiver, instance methods fail with
    /// [`CallError::MissingReceiver`] without one. Arguments are checked
    /// against the declared parameter types at call time. By-reference
    /// parameters are written back into the argument slice.
    ///
    /// [`CallError::MissingReceiver`]: vc_reflect::CallError::MissingReceiver
    pub fn method_invoker(&self, method: &Arc<MethodInfo>) -> Result<ObjectInvoker, BindError> {
        let member = Invocable::Method(method.clone());
        let request = InvokeRequest::untyped(&member);
        Ok(self.call(member, request, false, invoke::no_fast_path, invoke::object_invoker))
    }

    /// Calls an instance method of `I` with the arguments `Args`.
    ///
    /// `Args` is a tuple of up to four elements. Each element must be the
    /// declared parameter type, [`Object`](vc_reflect::Object), or have a
    /// registered upcast to it. `R = ()` discards the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use vc_bind::Binder;
    /// use vc_reflect::info::{MethodInfo, Typed};
    ///
    /// #[derive(Clone, Debug)]
    /// struct Calc { total: i32 }
    /// impl Typed for Calc {}
    ///
    /// let add = Arc::new(MethodInfo::new::<Calc, (i32,), i32, _>("add", |c: &mut Calc, x: i32| {
    ///     c.total += x;
    ///     c.total
    /// }));
    ///
    /// let binder = Binder::default();
    /// let call = binder.typed_method_invoker::<Calc, (i32,), i32>(&add).unwrap();
    /// let ignore = binder.typed_method_invoker::<Calc, (i32,), ()>(&add).unwrap();
    ///
    /// let mut calc = Calc { total: 1 };
    /// assert_eq!(call(&mut calc, (2,)), Ok(3));
    /// assert_eq!(ignore(&mut calc, (4,)), Ok(()));
    /// assert_eq!(calc.total, 7);
    /// ```
    pub fn typed_method_invoker<I: Typed, Args: ArgList, R: Typed>(
        &self,
        method: &Arc<MethodInfo>,
    ) -> Result<MethodInvoker<I, Args, R>, BindError> {
        validate::expect_static(method.id(), method.is_static(), false)?;
        validate::instance_type(method.id(), &method.declaring(), &I::ty())?;
        let args = Args::types();
        validate::arguments(&self.registry().read(), method.id(), method.params(), &args, true)?;

        let request = InvokeRequest::new(Some(I::ty()), args, InvokeRequest::returning::<R>());
        Ok(self.call(
            Invocable::Method(method.clone()),
            request,
            true,
            invoke::method_fast::<I, Args, R>,
            invoke::method::<I, Args, R>,
        ))
    }

    /// Calls a static method with the arguments `Args`.
    ///
    /// See [`typed_method_invoker`](Self::typed_method_invoker).
    pub fn typed_static_method_invoker<Args: ArgList, R: Typed>(
        &self,
        method: &Arc<MethodInfo>,
    ) -> Result<StaticInvoker<Args, R>, BindError> {
        validate::expect_static(method.id(), method.is_static(), true)?;
        let args = Args::types();
        validate::arguments(&self.registry().read(), method.id(), method.params(), &args, true)?;

        let request = InvokeRequest::new(None, args, InvokeRequest::returning::<R>());
        Ok(self.call(
            Invocable::Method(method.clone()),
            request,
            true,
            invoke::function_fast::<Args, R>,
            invoke::function::<Args, R>,
        ))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;

    use vc_reflect::info::{DynInvoke, MethodInfo, ParamInfo, ParamMode, Typed};
    use vc_reflect::registry::TypeRegistry;
    use vc_reflect::{CallError, Object, Reflect};

    use crate::{BindError, Binder, Capabilities, Strategy};

    #[derive(Clone, Debug)]
    struct Greeter {
        greeting: String,
    }

    impl Typed for Greeter {}

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Dog;

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Animal(&'static str);

    impl Typed for Dog {
        const KIND: vc_reflect::info::TypeKind = vc_reflect::info::TypeKind::Reference;
    }
    impl Typed for Animal {
        const KIND: vc_reflect::info::TypeKind = vc_reflect::info::TypeKind::Reference;
    }

    fn greet() -> Arc<MethodInfo> {
        Arc::new(MethodInfo::new::<Greeter, (String,), String, _>(
            "greet",
            |g: &mut Greeter, name: String| alloc::format!("{}, {name}", g.greeting),
        ))
    }

    fn configurations() -> [Capabilities; 3] {
        [Capabilities::ALL, Capabilities::ALL.with_emit(false), Capabilities::NONE]
    }

    #[test]
    fn typed_and_untyped_calls_agree() {
        let binder = Binder::default();
        let greet = greet();

        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            let typed = binder.typed_method_invoker::<Greeter, (String,), String>(&greet).unwrap();
            let untyped = binder.method_invoker(&greet).unwrap();

            let mut greeter = Greeter {
                greeting: String::from("hi"),
            };
            assert_eq!(typed(&mut greeter, (String::from("bo"),)).as_deref(), Ok("hi, bo"));

            let mut boxed = Object::new(greeter);
            let this: &mut dyn Reflect = &mut boxed;
            let mut args = [Object::new(String::from("al"))];
            let out = untyped(Some(&mut *this), &mut args).unwrap();
            assert_eq!(out.take_as::<String>().as_deref(), Ok("hi, al"));

            let mut wrong = [Object::new(1_u8)];
            assert!(matches!(
                untyped(Some(&mut *this), &mut wrong),
                Err(CallError::InvalidCast { .. })
            ));
            assert!(matches!(
                untyped(None, &mut args),
                Err(CallError::MissingReceiver { .. })
            ));
            assert!(matches!(
                untyped(Some(&mut *this), &mut []),
                Err(CallError::ArgumentCount { expected: 1, actual: 0 })
            ));
        }
    }

    #[test]
    fn static_methods_and_upcasts() {
        let mut registry = TypeRegistry::new();
        registry.register_upcast::<Dog, Animal>(|_| Animal("dog"));
        let binder = Binder::new(registry);

        let describe = Arc::new(MethodInfo::new_static::<Animal, (Animal,), &'static str, _>(
            "describe",
            |animal: Animal| animal.0,
        ));

        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            let call = binder.typed_static_method_invoker::<(Dog,), &'static str>(&describe).unwrap();
            assert_eq!(call((Dog,)), Ok("dog"));

            let boxed = binder.typed_static_method_invoker::<(Object,), Object>(&describe).unwrap();
            let out = boxed((Object::new(Animal("cat")),)).unwrap();
            assert_eq!(out.take_as::<&'static str>(), Ok("cat"));
        }

        assert!(matches!(
            binder.typed_static_method_invoker::<(Greeter,), &'static str>(&describe),
            Err(BindError::ParameterType { index: 0, .. })
        ));
    }

    #[test]
    fn arguments_keep_their_values() {
        let mut registry = TypeRegistry::new();
        registry.register_upcast::<&'static str, String>(String::from);
        let binder = Binder::new(registry);

        let concat = Arc::new(MethodInfo::new_static::<Greeter, (String, String), usize, _>(
            "concat",
            |a: String, b: String| a.len() + b.len(),
        ));

        let configurations = [
            Capabilities::ALL,
            Capabilities::ALL.with_expression(false),
            Capabilities::NONE,
        ];
        for caps in configurations {
            let _scope = binder.override_capabilities(caps);
            binder.clear_all();
            let call = binder.method_invoker(&concat).unwrap();

            let mut args = [Object::new("ab"), Object::new(String::from("c"))];
            assert_eq!(call(None, &mut args).unwrap().take_as::<usize>(), Ok(3));
            assert!(args[0].is::<&'static str>());

            // A failing argument leaves the earlier ones alone.
            let mut wrong = [Object::new("ab"), Object::new(1_u8)];
            assert!(matches!(call(None, &mut wrong), Err(CallError::InvalidCast { .. })));
            assert!(wrong[0].is::<&'static str>());
        }
    }

    #[test]
    fn by_reference_parameters() {
        // `fn swap(ref a: i32, ref b: i32)`
        let invoke: DynInvoke = Arc::new(|_: Option<&mut dyn Reflect>, args: &mut [Object]| {
            args.swap(0, 1);
            Ok(Object::unit())
        });
        let swap = Arc::new(MethodInfo::new_dyn(
            "swap",
            Greeter::ty(),
            vec![
                ParamInfo::new("a", i32::ty()).with_mode(ParamMode::Ref),
                ParamInfo::new("b", i32::ty()).with_mode(ParamMode::Ref),
            ],
            <()>::ty(),
            true,
            invoke,
        ));

        let binder = Binder::default();
        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            let call = binder.method_invoker(&swap).unwrap();
            let mut args = [Object::new(1_i32), Object::new(2_i32)];
            call(None, &mut args).unwrap();
            assert_eq!(args[0].downcast_ref::<i32>(), Some(&2));
            assert_eq!(args[1].downcast_ref::<i32>(), Some(&1));
        }

        assert!(matches!(
            binder.typed_static_method_invoker::<(i32, i32), ()>(&swap),
            Err(BindError::ByRefParameter { index: 0, .. })
        ));
    }

    #[test]
    fn contract_violations() {
        let binder = Binder::default();
        let greet = greet();

        assert!(matches!(
            binder.typed_static_method_invoker::<(String,), String>(&greet),
            Err(BindError::StaticMismatch { .. })
        ));
        assert!(matches!(
            binder.typed_method_invoker::<Greeter, (), String>(&greet),
            Err(BindError::ArgumentCount { expected: 1, actual: 0, .. })
        ));
        assert!(matches!(
            binder.typed_method_invoker::<String, (String,), String>(&greet),
            Err(BindError::InstanceType { .. })
        ));
        assert!(binder.cache().is_empty());
        for strategy in Strategy::ALL {
            assert_eq!(binder.build_attempts(strategy), 0);
        }
    }

    #[test]
    fn cached_invokers_are_shared() {
        let binder = Binder::default();
        let greet = greet();

        let first = binder.typed_method_invoker::<Greeter, (String,), String>(&greet).unwrap();
        let second = binder.typed_method_invoker::<Greeter, (String,), String>(&greet).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(binder.is_method_invoker_cached(&greet));

        // Another signature is another binding.
        let discard = binder.typed_method_invoker::<Greeter, (String,), ()>(&greet).unwrap();
        let mut greeter = Greeter {
            greeting: String::from("yo"),
        };
        assert_eq!(discard(&mut greeter, (String::new(),)), Ok(()));
        assert_eq!(binder.cache().len(), 2);
    }
}
