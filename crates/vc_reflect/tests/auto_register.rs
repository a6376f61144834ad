#![cfg(feature = "auto_register")]

use core::any::TypeId;

use vc_reflect::Object;
use vc_reflect::derive::Reflect;
use vc_reflect::info::Typed;
use vc_reflect::ops::Set;
use vc_reflect::registry::{TypeRegistry, TypeTraitDefault, TypeTraitHash, TypeTraitList};

#[derive(Reflect, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[reflect(default, hash, auto_register)]
struct Tag {
    name: String,
}

#[derive(Reflect, Clone, Debug)]
struct Unlisted {
    id: u32,
}

#[test]
fn derived_types_register_themselves() {
    let mut registry = TypeRegistry::new();
    if !registry.auto_register() {
        // No static registration on this platform.
        return;
    }

    let meta = registry.get(TypeId::of::<Tag>()).unwrap();
    assert_eq!(meta.ty(), Tag::ty());
    assert_eq!(meta.field("name").map(|field| field.ty()), Some(String::ty()));
    assert!(meta.has_trait::<TypeTraitList>());
    assert!(registry.get_with_type_name("Tag").is_some());

    let default = registry.get_type_trait::<TypeTraitDefault>(TypeId::of::<Tag>()).unwrap();
    assert_eq!(default.default().take_as::<Tag>(), Ok(Tag::default()));

    let hash = registry.get_type_trait::<TypeTraitHash>(TypeId::of::<Tag>()).unwrap();
    let mut set = hash.new_set(0);
    let tag = || Object::new(Tag { name: String::from("a") });
    assert_eq!(set.insert(tag()), Ok(true));
    assert_eq!(set.insert(tag()), Ok(false));

    // Only annotated types are submitted.
    assert!(!registry.contains(TypeId::of::<Unlisted>()));
}

#[test]
fn repeated_registration_adds_nothing() {
    let mut registry = TypeRegistry::new();
    if !registry.auto_register() {
        return;
    }
    let count = registry.iter().count();
    assert!(registry.auto_register());
    assert_eq!(registry.iter().count(), count);
}
