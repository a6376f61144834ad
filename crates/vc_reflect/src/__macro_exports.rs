//! Items used by the code generated from `#[derive(Reflect)]`.
//!
//! Not public API.

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::registry::{GetTypeMeta, TypeRegistry};

    /// One statically submitted registration.
    pub struct AutoRegistration(fn(&mut TypeRegistry));

    impl AutoRegistration {
        #[inline]
        pub const fn new(register: fn(&mut TypeRegistry)) -> Self {
            Self(register)
        }
    }

    inventory::collect!(AutoRegistration);

    /// Registers `T`. Submitted as a function pointer by the derive.
    pub fn register_type<T: GetTypeMeta>(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }

    /// Present in the registry after [`register_types`] iff static
    /// registration works on this platform.
    #[derive(Clone, Debug)]
    pub struct AvailFlag;

    impl crate::info::Typed for AvailFlag {}

    impl GetTypeMeta for AvailFlag {
        fn get_type_meta() -> crate::registry::TypeMeta {
            crate::registry::TypeMeta::of::<Self>()
        }
    }

    inventory::submit! {
        AutoRegistration::new(register_type::<AvailFlag>)
    }

    pub fn register_types(registry: &mut TypeRegistry) {
        for registration in inventory::iter::<AutoRegistration> {
            (registration.0)(registry);
        }
    }
}
