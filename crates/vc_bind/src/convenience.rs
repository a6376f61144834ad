//! One-shot calls that pick the member from the run-time argument types.
//!
//! A candidate matches when it takes as many parameters as there are
//! arguments and every argument is the parameter type, or converts to it.
//! Candidates with more exact matches win. Ties go to the first declared.

use alloc::string::{String, ToString};
use alloc::sync::Arc;

use vc_reflect::info::{ConstructorInfo, MethodInfo, ParamInfo, Type, Typed};
use vc_reflect::registry::TypeRegistry;
use vc_reflect::{Object, Reflect};

use crate::bind::unwrap_ref;
use crate::{BindError, Binder};

/// Returns the number of exact matches, `None` if an argument does not fit.
fn score(registry: &TypeRegistry, params: &[ParamInfo], args: &[Object]) -> Option<usize> {
    if params.len() != args.len() {
        return None;
    }
    let mut exact = 0;
    for (param, arg) in params.iter().zip(args) {
        let declared = param.ty();
        if declared.id() == arg.ty_id() {
            exact += 1;
        } else if !declared.is_object() && registry.upcast_of(arg.ty_id(), declared.id()).is_none() {
            return None;
        }
    }
    Some(exact)
}

fn best_match<'a, T: 'a>(
    registry: &TypeRegistry,
    candidates: impl IntoIterator<Item = (&'a Arc<T>, &'a [ParamInfo])>,
    args: &[Object],
) -> Option<Arc<T>> {
    let mut best: Option<(usize, &Arc<T>)> = None;
    for (candidate, params) in candidates {
        let Some(score) = score(registry, params, args) else {
            continue;
        };
        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, candidate));
        }
    }
    best.map(|(_, candidate)| candidate.clone())
}

impl Binder {
    fn best_constructor(&self, ty: &Type, args: &[Object]) -> Result<Arc<ConstructorInfo>, BindError> {
        let registry = self.registry().read();
        let Some(meta) = registry.get(ty.id()) else {
            return Err(BindError::UnknownType {
                ty: ty.path().to_string(),
            });
        };
        let candidates = meta.constructors().iter().map(|ctor| (ctor, ctor.params()));
        best_match(&registry, candidates, args).ok_or_else(|| BindError::NoConstructor {
            ty: ty.path(),
            params: arg_list(args),
        })
    }

    fn best_method(
        &self,
        ty: &Type,
        name: &str,
        is_static: bool,
        args: &[Object],
    ) -> Result<Arc<MethodInfo>, BindError> {
        let registry = self.registry().read();
        let Some(meta) = registry.get(ty.id()) else {
            return Err(BindError::UnknownType {
                ty: ty.path().to_string(),
            });
        };
        let candidates = meta
            .methods_named(name)
            .filter(|method| method.is_static() == is_static)
            .map(|method| (method, method.params()));
        best_match(&registry, candidates, args).ok_or_else(|| BindError::NoMatchingMember {
            ty: ty.path(),
            name: String::from(name),
        })
    }

    /// Creates a `T` with the constructor best matching `args`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_bind::Binder;
    /// use vc_reflect::Object;
    ///
    /// let binder = Binder::default();
    /// let zero: i64 = binder.create_instance(&mut []).unwrap();
    /// assert_eq!(zero, 0);
    /// assert!(binder.create_instance::<i64>(&mut [Object::new(1_i64)]).is_err());
    /// ```
    pub fn create_instance<T: Typed>(&self, args: &mut [Object]) -> Result<T, BindError> {
        Ok(self.create_instance_dyn(&T::ty(), args)?.take_as::<T>()?)
    }

    pub fn create_instance_dyn(&self, ty: &Type, args: &mut [Object]) -> Result<Object, BindError> {
        let ctor = self.best_constructor(ty, args)?;
        Ok(self.constructor(&ctor)?(args)?)
    }

    /// Calls the instance method `name` of `target` best matching `args`.
    ///
    /// `target` may be an [`Object`], which stands for the value it holds.
    pub fn invoke_method(&self, target: &mut dyn Reflect, name: &str, args: &mut [Object]) -> Result<Object, BindError> {
        let ty = self.type_of(unwrap_ref(target))?;
        let method = self.best_method(&ty, name, false, args)?;
        Ok(self.method_invoker(&method)?(Some(target), args)?)
    }

    /// Calls the static method `name` of `ty` best matching `args`.
    pub fn invoke_static_method(&self, ty: &Type, name: &str, args: &mut [Object]) -> Result<Object, BindError> {
        let method = self.best_method(ty, name, true, args)?;
        Ok(self.method_invoker(&method)?(None, args)?)
    }

    fn type_of(&self, value: &dyn Reflect) -> Result<Type, BindError> {
        match self.registry().read().get(value.ty_id()) {
            Some(meta) => Ok(meta.ty()),
            None => Err(BindError::UnknownType {
                ty: value.reflect_type_name().to_string(),
            }),
        }
    }
}

fn arg_list(args: &[Object]) -> String {
    let mut list = String::new();
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            list.push_str(", ");
        }
        list.push_str(arg.type_name());
    }
    list
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;

    use vc_reflect::info::{ConstructorInfo, MethodInfo, Typed};
    use vc_reflect::registry::{TypeMeta, TypeRegistry};
    use vc_reflect::{CallError, Object, Reflect};

    use crate::{BindError, Binder};

    #[derive(Clone, Debug, PartialEq)]
    struct Label {
        text: String,
    }

    impl Typed for Label {}

    fn binder() -> Binder {
        let mut registry = TypeRegistry::new();
        registry.register_upcast::<&'static str, String>(|s: &'static str| String::from(s));
        registry.insert_type_meta(
            TypeMeta::of::<Label>()
                .with_constructor(ConstructorInfo::new::<Label, (Object,), _>(|value: Object| Label {
                    text: alloc::format!("{value:?}"),
                }))
                .with_constructor(ConstructorInfo::new::<Label, (String,), _>(|text: String| Label { text }))
                .with_method(MethodInfo::new::<Label, (String,), usize, _>("append", |label: &mut Label, tail: String| {
                    label.text.push_str(&tail);
                    label.text.len()
                }))
                .with_method(MethodInfo::new::<Label, (), usize, _>("len", |label: &mut Label| label.text.len()))
                .with_method(MethodInfo::new_static::<Label, (String, String), Label, _>(
                    "join",
                    |a: String, b: String| Label { text: a + &b },
                )),
        );
        Binder::new(registry)
    }

    #[test]
    fn exact_matches_win() {
        let binder = binder();

        let label: Label = binder.create_instance(&mut [Object::new(String::from("hi"))]).unwrap();
        assert_eq!(label.text, "hi");

        // Only the `Object` overload takes an `i32`.
        let label: Label = binder.create_instance(&mut [Object::new(7_i32)]).unwrap();
        assert!(label.text.contains('7'));

        // Both fit a `&str`, neither exactly: the first declared wins.
        let label = binder
            .create_instance_dyn(&Label::ty(), &mut [Object::new("hi")])
            .unwrap()
            .take_as::<Label>()
            .unwrap();
        assert!(label.text.contains("hi"));
        assert_ne!(label.text, "hi");
    }

    #[test]
    fn instance_and_static_methods() {
        let binder = binder();
        let mut label = Label {
            text: String::from("ab"),
        };

        let out = binder
            .invoke_method(&mut label, "append", &mut [Object::new("cd")])
            .unwrap();
        assert_eq!(out.take_as::<usize>(), Ok(4));
        assert_eq!(label.text, "abcd");

        let mut boxed = Object::new(label);
        let out = binder.invoke_method(&mut boxed, "len", &mut []).unwrap();
        assert_eq!(out.take_as::<usize>(), Ok(4));

        let mut args = [Object::new(String::from("x")), Object::new("y")];
        let joined = binder.invoke_static_method(&Label::ty(), "join", &mut args).unwrap();
        assert_eq!(joined.take_as::<Label>().map(|l| l.text), Ok(String::from("xy")));
    }

    #[test]
    fn nothing_matches() {
        let binder = binder();
        let mut label = Label { text: String::new() };

        assert!(matches!(
            binder.invoke_method(&mut label, "append", &mut [Object::new(1_u8)]),
            Err(BindError::NoMatchingMember { .. })
        ));
        assert!(matches!(
            binder.invoke_method(&mut label, "join", &mut []),
            Err(BindError::NoMatchingMember { .. })
        ));
        assert!(matches!(
            binder.create_instance::<Label>(&mut []),
            Err(BindError::NoConstructor { .. })
        ));
        assert!(matches!(
            binder.invoke_static_method(&Arc::<str>::ty(), "new", &mut []),
            Err(BindError::UnknownType { .. })
        ));
        assert!(matches!(
            binder.create_instance::<String>(&mut [Object::new(1_u8)]),
            Err(BindError::NoConstructor { .. })
        ));
    }

    #[test]
    fn call_errors_pass_through() {
        let binder = binder();
        let mut label = Label { text: String::new() };
        let mut args = [Object::new(String::new())];

        // Matched by name and arity, but the receiver is not a `Label`.
        let len = binder
            .registry()
            .read()
            .get(Label::ty().id())
            .and_then(|meta| meta.method("len", &[]).cloned())
            .unwrap();
        let invoke = binder.method_invoker(&len).unwrap();
        let mut byte = 1_u8;
        let other: &mut dyn Reflect = &mut byte;
        assert!(matches!(invoke(Some(other), &mut []), Err(CallError::InvalidCast { .. })));

        assert_eq!(
            binder.invoke_method(&mut label, "append", &mut args).map(|out| out.take_as::<usize>()),
            Ok(Ok(0))
        );
        let zero: i32 = binder.create_instance(&mut []).unwrap();
        assert_eq!(zero, 0);
    }
}
