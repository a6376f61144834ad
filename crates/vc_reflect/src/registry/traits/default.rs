use crate::Object;
use crate::info::Typed;
use crate::registry::{FromType, TypeTrait};

/// [`Default`] support for a registered type.
///
/// # Examples
///
/// ```
/// use vc_reflect::registry::{TypeRegistry, TypeTraitDefault};
///
/// let registry = TypeRegistry::new();
///
/// let generator = registry
///     .get_with_type_name("String").unwrap()
///     .get_trait::<TypeTraitDefault>().unwrap();
///
/// assert_eq!(generator.default().take::<String>().unwrap(), "");
/// ```
#[derive(Clone)]
pub struct TypeTraitDefault {
    func: fn() -> Object,
}

impl TypeTraitDefault {
    #[inline(always)]
    pub fn default(&self) -> Object {
        (self.func)()
    }
}

impl<T: Default + Typed> FromType<T> for TypeTraitDefault {
    fn from_type() -> Self {
        Self {
            func: || Object::new(T::default()),
        }
    }
}

impl TypeTrait for TypeTraitDefault {}
