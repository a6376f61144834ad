use alloc::sync::Arc;

use vc_reflect::Object;
use vc_reflect::info::{FieldInfo, Member, Typed};

use super::{FieldGetter, FieldSetter, ObjectGetter, ObjectSetter, StaticGetter, StaticSetter, ValueMember};
use crate::{BindError, Binder};

impl Binder {
    /// Reads `field` on any receiver.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_bind::Binder;
    /// use vc_reflect::{Object, derive::Reflect, info::Typed, registry::TypeRegistry};
    ///
    /// #[derive(Reflect, Clone, Debug)]
    /// struct Player { score: i32 }
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry.register::<Player>();
    /// let binder = Binder::new(registry);
    ///
    /// let score = binder.find_field(&Player::ty(), "score").unwrap();
    /// let get = binder.field_getter(&score).unwrap();
    ///
    /// let boxed = Object::new(Player { score: 42 });
    /// assert_eq!(get(&boxed).unwrap().take_as::<i32>(), Ok(42));
    /// ```
    pub fn field_getter(&self, field: &Arc<FieldInfo>) -> Result<ObjectGetter, BindError> {
        self.bind_object_getter(ValueMember::Field(field.clone()))
    }

    pub fn field_setter(&self, field: &Arc<FieldInfo>) -> Result<ObjectSetter, BindError> {
        self.bind_object_setter(ValueMember::Field(field.clone()))
    }

    /// Reads `field` of an `I` as a `V`.
    ///
    /// `I` must be the declaring type. A `V` other than the field type is
    /// converted, failing with [`CallError::InvalidCast`] at call time when
    /// no conversion exists.
    ///
    /// [`CallError::InvalidCast`]: vc_reflect::CallError::InvalidCast
    pub fn typed_field_getter<I: Typed, V: Typed>(&self, field: &Arc<FieldInfo>) -> Result<FieldGetter<I, V>, BindError> {
        self.bind_instance_getter(ValueMember::Field(field.clone()))
    }

    pub fn typed_field_setter<I: Typed, V: Typed>(&self, field: &Arc<FieldInfo>) -> Result<FieldSetter<I, V>, BindError> {
        self.bind_instance_setter(ValueMember::Field(field.clone()))
    }

    pub fn static_field_getter(&self, field: &Arc<FieldInfo>) -> Result<StaticGetter<Object>, BindError> {
        self.bind_static_getter(ValueMember::Field(field.clone()))
    }

    pub fn static_field_setter(&self, field: &Arc<FieldInfo>) -> Result<StaticSetter<Object>, BindError> {
        self.bind_static_setter(ValueMember::Field(field.clone()))
    }

    pub fn typed_static_field_getter<V: Typed>(&self, field: &Arc<FieldInfo>) -> Result<StaticGetter<V>, BindError> {
        self.bind_static_getter(ValueMember::Field(field.clone()))
    }

    pub fn typed_static_field_setter<V: Typed>(&self, field: &Arc<FieldInfo>) -> Result<StaticSetter<V>, BindError> {
        self.bind_static_setter(ValueMember::Field(field.clone()))
    }

    /// Reads a field or a plain property on any receiver.
    pub fn member_getter(&self, member: &Member) -> Result<ObjectGetter, BindError> {
        self.bind_object_getter(value_member(member)?)
    }

    /// Writes a field or a plain property on any receiver.
    pub fn member_setter(&self, member: &Member) -> Result<ObjectSetter, BindError> {
        self.bind_object_setter(value_member(member)?)
    }
}

fn value_member(member: &Member) -> Result<ValueMember, BindError> {
    match member {
        Member::Field(field) => Ok(ValueMember::Field(field.clone())),
        Member::Property(property) => Ok(ValueMember::Property(property.clone())),
        Member::Method(_) | Member::Constructor(_) => Err(BindError::WrongMemberKind {
            member: member.id().clone(),
            expected: "field or property",
            found: member.id().kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use std::sync::RwLock;

    use vc_reflect::derive::Reflect;
    use vc_reflect::info::{FieldInfo, Member, MethodInfo, Typed};
    use vc_reflect::registry::TypeRegistry;
    use vc_reflect::{CallError, Object};

    use crate::{BindError, Binder, Capabilities, Category, Strategy};

    #[derive(Reflect, Clone, Debug)]
    struct Player {
        name: String,
        score: i32,
    }

    static COUNTER: RwLock<i32> = RwLock::new(0);

    fn binder() -> Binder {
        let mut registry = TypeRegistry::new();
        registry.register::<Player>();
        if let Some(meta) = registry.get_mut(core::any::TypeId::of::<Player>()) {
            meta.push_field(FieldInfo::new_static::<Player, i32>("counter", &COUNTER));
        }
        Binder::new(registry)
    }

    fn player() -> Player {
        Player {
            name: String::from("ana"),
            score: 42,
        }
    }

    #[test]
    fn typed_instance_field() {
        let binder = binder();
        let score = binder.find_field(&Player::ty(), "score").unwrap();

        let get = binder.typed_field_getter::<Player, i32>(&score).unwrap();
        let set = binder.typed_field_setter::<Player, i32>(&score).unwrap();

        let mut player = player();
        assert_eq!(get(&player), Ok(42));
        set(&mut player, 7).unwrap();
        assert_eq!(player.score, 7);
        assert_eq!(get(&player), Ok(7));

        assert!(binder.is_field_getter_cached(&score));
        assert!(binder.is_field_setter_cached(&score));
    }

    #[test]
    fn typed_field_without_acceleration() {
        let binder = binder();
        let score = binder.find_field(&Player::ty(), "score").unwrap();
        let _scope = binder.override_capabilities(Capabilities::NONE);

        let get = binder.typed_field_getter::<Player, i32>(&score).unwrap();
        let set = binder.typed_field_setter::<Player, i32>(&score).unwrap();

        let mut player = player();
        set(&mut player, 9).unwrap();
        assert_eq!(get(&player), Ok(9));
        assert_eq!(binder.build_attempts(Strategy::Emit), 0);
        assert_eq!(binder.build_attempts(Strategy::Expression), 0);
    }

    #[test]
    fn boxed_values_and_receivers() {
        let binder = binder();
        let score = binder.find_field(&Player::ty(), "score").unwrap();

        let as_object = binder.typed_field_getter::<Player, Object>(&score).unwrap();
        assert_eq!(as_object(&player()).unwrap().take_as::<i32>(), Ok(42));

        let set = binder.field_setter(&score).unwrap();
        let mut boxed = Object::new(player());
        set(&mut boxed, Object::new(5_i32)).unwrap();
        assert_eq!(boxed.downcast_ref::<Player>().map(|p| p.score), Some(5));

        assert!(matches!(
            set(&mut boxed, Object::new(5_i64)),
            Err(CallError::InvalidCast { .. })
        ));
        let mut other = 1_u8;
        assert!(matches!(
            set(&mut other, Object::new(5_i32)),
            Err(CallError::InvalidCast { .. })
        ));
    }

    #[test]
    fn mismatched_value_type_is_a_call_error() {
        let binder = binder();
        let name = binder.find_field(&Player::ty(), "name").unwrap();

        let get = binder.typed_field_getter::<Player, i32>(&name).unwrap();
        assert!(matches!(get(&player()), Err(CallError::InvalidCast { .. })));
    }

    #[test]
    fn static_field_under_each_configuration() {
        let binder = binder();
        let counter = binder.find_field(&Player::ty(), "counter").unwrap();

        let configs = [
            Capabilities::ALL,
            Capabilities::ALL.with_emit(false),
            Capabilities::NONE,
        ];
        for (step, caps) in configs.into_iter().enumerate() {
            let _scope = binder.override_capabilities(caps);
            let set = binder.typed_static_field_setter::<i32>(&counter).unwrap();
            let get = binder.typed_static_field_getter::<i32>(&counter).unwrap();

            set(100 + step as i32).unwrap();
            assert_eq!(get(), Ok(100 + step as i32));

            let get = binder.static_field_getter(&counter).unwrap();
            assert_eq!(get().unwrap().take_as::<i32>(), Ok(100 + step as i32));
        }
    }

    #[test]
    fn contract_violations_leave_no_trace() {
        let binder = binder();
        let score = binder.find_field(&Player::ty(), "score").unwrap();
        let counter = binder.find_field(&Player::ty(), "counter").unwrap();

        assert!(matches!(
            binder.typed_static_field_getter::<i32>(&score),
            Err(BindError::StaticMismatch { expected: "static", .. })
        ));
        assert!(matches!(
            binder.field_getter(&counter),
            Err(BindError::StaticMismatch { .. })
        ));
        assert!(matches!(
            binder.typed_field_getter::<String, i32>(&score),
            Err(BindError::InstanceType { .. })
        ));

        let method = MethodInfo::new::<Player, (), i32, _>("total", |p: &mut Player| p.score);
        let member = Member::Method(Arc::new(method));
        assert!(matches!(
            binder.member_getter(&member),
            Err(BindError::WrongMemberKind { .. })
        ));

        assert!(binder.cache().is_empty());
        assert!(!binder.is_field_getter_cached(&score));
        for strategy in Strategy::ALL {
            assert_eq!(binder.build_attempts(strategy), 0);
        }
    }

    #[test]
    fn member_accessors() {
        let binder = binder();
        let score = binder.find_field(&Player::ty(), "score").unwrap();
        let member = Member::Field(score.clone());

        let set = binder.member_setter(&member).unwrap();
        let get = binder.member_getter(&member).unwrap();
        let mut player = player();
        set(&mut player, Object::new(3_i32)).unwrap();
        assert_eq!(get(&player).unwrap().take_as::<i32>(), Ok(3));

        // The same shape as `field_getter`.
        let direct = binder.field_getter(&score).unwrap();
        assert!(Arc::ptr_eq(&get, &direct));

        binder.clear(Category::FieldGetter);
        assert!(!binder.is_field_getter_cached(&score));
        assert!(binder.is_field_setter_cached(&score));
    }
}
