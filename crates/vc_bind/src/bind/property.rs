use alloc::sync::Arc;

use vc_reflect::Object;
use vc_reflect::info::{PropertyInfo, Typed};

use super::{
    FieldGetter, FieldSetter, IndexGetter, IndexSetter, ObjectGetter, ObjectIndexGetter, ObjectIndexSetter,
    ObjectSetter, StaticGetter, StaticSetter, ValueMember,
};
use crate::{BindError, Binder};

impl Binder {
    /// Reads `property` on any receiver.
    ///
    /// Fails with [`BindError::MissingGetter`] for write-only properties and
    /// with [`BindError::ArgumentCount`] for indexers.
    pub fn property_getter(&self, property: &Arc<PropertyInfo>) -> Result<ObjectGetter, BindError> {
        self.bind_object_getter(ValueMember::Property(property.clone()))
    }

    pub fn property_setter(&self, property: &Arc<PropertyInfo>) -> Result<ObjectSetter, BindError> {
        self.bind_object_setter(ValueMember::Property(property.clone()))
    }

    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use vc_bind::Binder;
    /// use vc_reflect::info::{PropertyInfo, Typed};
    ///
    /// #[derive(Clone, Debug)]
    /// struct Celsius(f64);
    /// impl Typed for Celsius {}
    ///
    /// let fahrenheit = Arc::new(
    ///     PropertyInfo::builder::<Celsius, f64>("fahrenheit")
    ///         .getter(|c| c.0 * 1.8 + 32.0)
    ///         .build(),
    /// );
    ///
    /// let binder = Binder::default();
    /// let get = binder.typed_property_getter::<Celsius, f64>(&fahrenheit).unwrap();
    /// assert_eq!(get(&Celsius(100.0)), Ok(212.0));
    /// assert!(binder.typed_property_setter::<Celsius, f64>(&fahrenheit).is_err());
    /// ```
    pub fn typed_property_getter<I: Typed, V: Typed>(
        &self,
        property: &Arc<PropertyInfo>,
    ) -> Result<FieldGetter<I, V>, BindError> {
        self.bind_instance_getter(ValueMember::Property(property.clone()))
    }

    pub fn typed_property_setter<I: Typed, V: Typed>(
        &self,
        property: &Arc<PropertyInfo>,
    ) -> Result<FieldSetter<I, V>, BindError> {
        self.bind_instance_setter(ValueMember::Property(property.clone()))
    }

    pub fn static_property_getter(&self, property: &Arc<PropertyInfo>) -> Result<StaticGetter<Object>, BindError> {
        self.bind_static_getter(ValueMember::Property(property.clone()))
    }

    pub fn static_property_setter(&self, property: &Arc<PropertyInfo>) -> Result<StaticSetter<Object>, BindError> {
        self.bind_static_setter(ValueMember::Property(property.clone()))
    }

    pub fn typed_static_property_getter<V: Typed>(
        &self,
        property: &Arc<PropertyInfo>,
    ) -> Result<StaticGetter<V>, BindError> {
        self.bind_static_getter(ValueMember::Property(property.clone()))
    }

    pub fn typed_static_property_setter<V: Typed>(
        &self,
        property: &Arc<PropertyInfo>,
    ) -> Result<StaticSetter<V>, BindError> {
        self.bind_static_setter(ValueMember::Property(property.clone()))
    }

    /// Reads an indexer with boxed index arguments.
    ///
    /// Index arguments are checked against the declared index types at
    /// call time, a mismatch is a [`CallError::InvalidCast`].
    ///
    /// [`CallError::InvalidCast`]: vc_reflect::CallError::InvalidCast
    pub fn indexer_getter(&self, indexer: &Arc<PropertyInfo>) -> Result<ObjectIndexGetter, BindError> {
        self.bind_object_index_getter(ValueMember::Property(indexer.clone()))
    }

    pub fn indexer_setter(&self, indexer: &Arc<PropertyInfo>) -> Result<ObjectIndexSetter, BindError> {
        self.bind_object_index_setter(ValueMember::Property(indexer.clone()))
    }

    /// Reads a single-index indexer of `I` with an `X` index as a `V`.
    pub fn typed_indexer_getter<I: Typed, X: Typed, V: Typed>(
        &self,
        indexer: &Arc<PropertyInfo>,
    ) -> Result<IndexGetter<I, X, V>, BindError> {
        self.bind_index_getter(ValueMember::Property(indexer.clone()))
    }

    pub fn typed_indexer_setter<I: Typed, X: Typed, V: Typed>(
        &self,
        indexer: &Arc<PropertyInfo>,
    ) -> Result<IndexSetter<I, X, V>, BindError> {
        self.bind_index_setter(ValueMember::Property(indexer.clone()))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicI64, Ordering};

    use vc_reflect::info::{DynGetter, DynSetter, ParamInfo, PropertyInfo, Typed};
    use vc_reflect::registry::{TypeMeta, TypeRegistry};
    use vc_reflect::{CallError, Object, Reflect};

    use crate::{BindError, Binder, Capabilities, Category, Subject};

    #[derive(Clone, Debug, Default)]
    struct Grid {
        cells: Vec<String>,
        width: i32,
    }

    impl Typed for Grid {}

    static GRAVITY: AtomicI64 = AtomicI64::new(0);

    fn cells_info() -> PropertyInfo {
        PropertyInfo::indexer_builder::<Grid, i32, String>("index")
            .getter(|grid, index| grid.cells[index as usize].clone())
            .setter(|grid, index, value| grid.cells[index as usize] = value)
            .build()
    }

    fn cells() -> Arc<PropertyInfo> {
        Arc::new(cells_info())
    }

    fn width() -> Arc<PropertyInfo> {
        Arc::new(
            PropertyInfo::builder::<Grid, i32>("width")
                .getter(|grid| grid.width)
                .setter(|grid, width| grid.width = width)
                .build(),
        )
    }

    fn gravity() -> Arc<PropertyInfo> {
        Arc::new(
            PropertyInfo::static_builder::<Grid, i64>("gravity")
                .getter(|| GRAVITY.load(Ordering::Relaxed))
                .setter(|value| GRAVITY.store(value, Ordering::Relaxed))
                .build(),
        )
    }

    /// A two-index indexer with no typed accessor.
    fn cell_2d() -> Arc<PropertyInfo> {
        let getter: DynGetter = Arc::new(|this: Option<&dyn Reflect>, index: &[Object]| {
            let grid = this
                .and_then(|this| this.downcast_ref::<Grid>())
                .ok_or(CallError::MissingReceiver { member: "[]" })?;
            let row = index[0].clone_as::<i32>()?;
            let column = index[1].clone_as::<i32>()?;
            Ok(Object::new(grid.cells[(row * grid.width + column) as usize].clone()))
        });
        let setter: DynSetter = Arc::new(|this: Option<&mut dyn Reflect>, index: &[Object], value: Object| {
            let grid = this
                .and_then(|this| this.downcast_mut::<Grid>())
                .ok_or(CallError::MissingReceiver { member: "[]" })?;
            let row = index[0].clone_as::<i32>()?;
            let column = index[1].clone_as::<i32>()?;
            let at = (row * grid.width + column) as usize;
            grid.cells[at] = value.take_as::<String>()?;
            Ok(())
        });
        Arc::new(PropertyInfo::new_dyn(
            PropertyInfo::INDEXER,
            Grid::ty(),
            String::ty(),
            false,
            vec![ParamInfo::new("row", i32::ty()), ParamInfo::new("column", i32::ty())],
            Some(getter),
            Some(setter),
        ))
    }

    fn grid() -> Grid {
        Grid {
            cells: vec![String::new(); 8],
            width: 4,
        }
    }

    fn configurations() -> [Capabilities; 4] {
        [
            Capabilities::ALL,
            Capabilities::ALL.with_emit(false),
            Capabilities::ALL.with_expression(false),
            Capabilities::NONE,
        ]
    }

    #[test]
    fn typed_indexer() {
        let binder = Binder::default();
        let cells = cells();

        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            let get = binder.typed_indexer_getter::<Grid, i32, String>(&cells).unwrap();
            let set = binder.typed_indexer_setter::<Grid, i32, String>(&cells).unwrap();

            let mut grid = grid();
            set(&mut grid, 3, String::from("x")).unwrap();
            assert_eq!(get(&grid, 3).as_deref(), Ok("x"));
        }
        assert!(binder.is_property_getter_cached(&cells));
        assert!(binder.is_cached(Category::IndexerSetter, &Subject::member(cells.id())));
    }

    #[test]
    fn wrong_index_type_is_an_invalid_cast() {
        let binder = Binder::default();
        let cells = cells();
        let mut grid = grid();

        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            let get = binder.indexer_getter(&cells).unwrap();
            let set = binder.indexer_setter(&cells).unwrap();

            set(&mut grid, &[Object::new(3_i32)], Object::new(String::from("x"))).unwrap();
            assert_eq!(get(&grid, &[Object::new(3_i32)]).unwrap().take_as::<String>().as_deref(), Ok("x"));
            assert!(matches!(
                get(&grid, &[Object::new("3")]),
                Err(CallError::InvalidCast { .. })
            ));
            assert!(matches!(
                get(&grid, &[]),
                Err(CallError::ArgumentCount { expected: 1, actual: 0 })
            ));

            let wide = binder.typed_indexer_getter::<Grid, i64, String>(&cells).unwrap();
            assert!(matches!(wide(&grid, 3), Err(CallError::InvalidCast { .. })));
        }
    }

    #[test]
    fn dynamic_two_index_indexer() {
        let binder = Binder::default();
        let cell = cell_2d();

        for caps in configurations() {
            let _scope = binder.override_capabilities(caps);
            let get = binder.indexer_getter(&cell).unwrap();
            let set = binder.indexer_setter(&cell).unwrap();

            let mut grid = grid();
            let index = [Object::new(1_i32), Object::new(2_i32)];
            set(&mut grid, &index, Object::new(String::from("o"))).unwrap();
            assert_eq!(grid.cells[6], "o");
            assert_eq!(get(&grid, &index).unwrap().take_as::<String>().as_deref(), Ok("o"));
        }

        assert!(matches!(
            binder.typed_indexer_getter::<Grid, i32, String>(&cell),
            Err(BindError::ArgumentCount { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn plain_and_static_properties() {
        let binder = Binder::default();
        let width = width();
        let gravity = gravity();

        for (step, caps) in configurations().into_iter().enumerate() {
            let _scope = binder.override_capabilities(caps);

            let get = binder.property_getter(&width).unwrap();
            let set = binder.typed_property_setter::<Grid, i32>(&width).unwrap();
            let mut grid = grid();
            set(&mut grid, 9).unwrap();
            assert_eq!(get(&grid).unwrap().take_as::<i32>(), Ok(9));

            let set = binder.static_property_setter(&gravity).unwrap();
            let get = binder.typed_static_property_getter::<i64>(&gravity).unwrap();
            set(Object::new(-10 - step as i64)).unwrap();
            assert_eq!(get(), Ok(-10 - step as i64));
            assert!(matches!(set(Object::new(1_i32)), Err(CallError::InvalidCast { .. })));
        }
    }

    #[test]
    fn registered_properties_and_contracts() {
        let mut registry = TypeRegistry::new();
        registry.insert_type_meta(
            TypeMeta::of::<Grid>()
                .with_property(cells_info())
                .with_property(PropertyInfo::builder::<Grid, i32>("area").getter(|g| g.width * 2).build()),
        );
        let binder = Binder::new(registry);

        let cells = binder.find_indexer(&Grid::ty(), &[i32::ty()]).unwrap();
        let area = binder.find_property(&Grid::ty(), "area").unwrap();

        assert!(matches!(
            binder.property_getter(&cells),
            Err(BindError::ArgumentCount { expected: 1, actual: 0, .. })
        ));
        assert!(matches!(
            binder.indexer_getter(&area),
            Err(BindError::NotAnIndexer { .. })
        ));
        assert!(matches!(
            binder.property_setter(&area),
            Err(BindError::MissingSetter { .. })
        ));
        assert!(matches!(
            binder.static_property_getter(&area),
            Err(BindError::StaticMismatch { .. })
        ));
        assert!(binder.cache().is_empty());

        let get = binder.typed_property_getter::<Grid, Object>(&area).unwrap();
        assert_eq!(get(&grid()).unwrap().take_as::<i32>(), Ok(8));
    }
}
