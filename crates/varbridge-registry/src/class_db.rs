//! In-memory class database.
//!
//! [`ClassDb`] plays the host's side of the registration ABI: extension classes
//! register their methods, properties and signals through [`ClassRegistrar`],
//! and the host later dispatches property reads and writes to them by name.
//! Lookups walk the class hierarchy, so members registered on a base class are
//! reachable from instances of its subclasses.

use std::fmt;

use rustc_hash::FxHashMap;
use varbridge_core::{
    CallError, Class, ClassInfo, Object, ObjectRef, RefCounted, RegistrationError, TypeHash,
    Variant,
};

use crate::{ClassRegistrar, MethodFn, MethodInfo, PropertyInfo, SignalInfo};

struct RegisteredMethod {
    info: MethodInfo,
    function: MethodFn,
}

struct RegisteredProperty {
    info: PropertyInfo,
    getter: String,
    setter: String,
}

struct ClassEntry {
    info: &'static ClassInfo,
    methods: FxHashMap<String, RegisteredMethod>,
    properties: FxHashMap<String, RegisteredProperty>,
    signals: Vec<SignalInfo>,
}

impl ClassEntry {
    fn new(info: &'static ClassInfo) -> Self {
        Self {
            info,
            methods: FxHashMap::default(),
            properties: FxHashMap::default(),
            signals: Vec::new(),
        }
    }
}

/// Registry of classes known to the host.
pub struct ClassDb {
    classes: FxHashMap<TypeHash, ClassEntry>,
    by_name: FxHashMap<String, TypeHash>,
}

impl ClassDb {
    /// Create a database with the builtin `Object` and `RefCounted` classes.
    pub fn new() -> Self {
        let mut db = Self {
            classes: FxHashMap::default(),
            by_name: FxHashMap::default(),
        };
        db.insert_class(Object::class_info());
        db.insert_class(RefCounted::class_info());
        db
    }

    fn insert_class(&mut self, info: &'static ClassInfo) {
        self.by_name.insert(info.name().to_string(), info.id());
        self.classes.insert(info.id(), ClassEntry::new(info));
    }

    fn entry_mut(&mut self, class: &ClassInfo) -> Result<&mut ClassEntry, RegistrationError> {
        self.classes
            .get_mut(&class.id())
            .ok_or_else(|| RegistrationError::UnknownClass(class.name().to_string()))
    }

    fn entry_by_name(&self, class: &str) -> Option<&ClassEntry> {
        self.by_name.get(class).and_then(|id| self.classes.get(id))
    }

    /// Registered entries for `class` and its ancestors, nearest first.
    fn lineage<'a>(&'a self, class: &ClassInfo) -> impl Iterator<Item = &'a ClassEntry> {
        class
            .ancestors()
            .filter_map(move |ancestor| self.classes.get(&ancestor.id()))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Look up a registered class by name.
    pub fn class(&self, name: &str) -> Option<&'static ClassInfo> {
        self.entry_by_name(name).map(|entry| entry.info)
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Method descriptor, searching base classes too.
    pub fn method(&self, class: &str, method: &str) -> Option<&MethodInfo> {
        let entry = self.entry_by_name(class)?;
        self.lineage(entry.info)
            .find_map(|entry| entry.methods.get(method))
            .map(|registered| &registered.info)
    }

    /// Property descriptor, searching base classes too.
    pub fn property(&self, class: &str, property: &str) -> Option<&PropertyInfo> {
        let entry = self.entry_by_name(class)?;
        self.lineage(entry.info)
            .find_map(|entry| entry.properties.get(property))
            .map(|registered| &registered.info)
    }

    /// Names of the properties registered directly on `class`, sorted.
    pub fn property_names(&self, class: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entry_by_name(class)
            .map(|entry| entry.properties.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Signals registered directly on `class`, in registration order.
    pub fn signals(&self, class: &str) -> &[SignalInfo] {
        self.entry_by_name(class)
            .map(|entry| entry.signals.as_slice())
            .unwrap_or(&[])
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn find_method(&self, class: &ClassInfo, method: &str) -> Result<&RegisteredMethod, CallError> {
        if !self.classes.contains_key(&class.id()) {
            return Err(CallError::UnknownClass(class.name().to_string()));
        }
        self.lineage(class)
            .find_map(|entry| entry.methods.get(method))
            .ok_or_else(|| CallError::UnknownMethod {
                class: class.name().to_string(),
                method: method.to_string(),
            })
    }

    fn find_property(
        &self,
        class: &ClassInfo,
        property: &str,
    ) -> Result<&RegisteredProperty, CallError> {
        if !self.classes.contains_key(&class.id()) {
            return Err(CallError::UnknownClass(class.name().to_string()));
        }
        self.lineage(class)
            .find_map(|entry| entry.properties.get(property))
            .ok_or_else(|| CallError::UnknownProperty {
                class: class.name().to_string(),
                property: property.to_string(),
            })
    }

    /// Call a registered method on `object`.
    pub fn call(
        &self,
        object: &ObjectRef,
        method: &str,
        args: &[Variant],
    ) -> Result<Option<Variant>, CallError> {
        let registered = self.find_method(object.class(), method)?;
        log::trace!("call {:?}.{}({} args)", object, method, args.len());
        object
            .with_payload_mut(|payload| (registered.function)(payload, args))
            .unwrap_or(Err(CallError::InvalidInstance {
                expected: object.class().name(),
            }))
    }

    /// Read a property through its registered getter. A getter returning no
    /// value reads as `Nil`.
    pub fn get_property(&self, object: &ObjectRef, property: &str) -> Result<Variant, CallError> {
        let getter = &self.find_property(object.class(), property)?.getter;
        Ok(self.call(object, getter, &[])?.unwrap_or_default())
    }

    /// Write a property through its registered setter.
    ///
    /// Returns the setter's sentinel: `None` when the value was accepted.
    pub fn set_property(
        &self,
        object: &ObjectRef,
        property: &str,
        value: Variant,
    ) -> Result<Option<Variant>, CallError> {
        let setter = &self.find_property(object.class(), property)?.setter;
        self.call(object, setter, &[value])
    }
}

impl Default for ClassDb {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClassDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.by_name.keys().collect();
        names.sort_unstable();
        f.debug_struct("ClassDb").field("classes", &names).finish()
    }
}

impl ClassRegistrar for ClassDb {
    fn register_class(&mut self, class: &'static ClassInfo) -> Result<(), RegistrationError> {
        if self.classes.contains_key(&class.id()) || self.by_name.contains_key(class.name()) {
            return Err(RegistrationError::DuplicateClass(class.name().to_string()));
        }
        if let Some(base) = class.base()
            && !self.classes.contains_key(&base.id())
        {
            return Err(RegistrationError::UnregisteredBase {
                class: class.name().to_string(),
                base: base.name().to_string(),
            });
        }
        log::debug!(
            "registering class {} (base {})",
            class.name(),
            class.base().map_or("-", ClassInfo::name)
        );
        self.insert_class(class);
        Ok(())
    }

    fn register_method(
        &mut self,
        class: &'static ClassInfo,
        method: MethodInfo,
        function: MethodFn,
    ) -> Result<(), RegistrationError> {
        let entry = self.entry_mut(class)?;
        if entry.methods.contains_key(&method.name) {
            return Err(RegistrationError::DuplicateRegistration {
                class: class.name().to_string(),
                name: method.name,
                kind: "method",
            });
        }
        log::debug!("registering method {}.{}", class.name(), method.name);
        entry.methods.insert(
            method.name.clone(),
            RegisteredMethod {
                info: method,
                function,
            },
        );
        Ok(())
    }

    fn register_property(
        &mut self,
        class: &'static ClassInfo,
        property: PropertyInfo,
        getter: &str,
        setter: &str,
    ) -> Result<(), RegistrationError> {
        let entry = self.entry_mut(class)?;
        if entry.properties.contains_key(&property.name) {
            return Err(RegistrationError::DuplicateRegistration {
                class: class.name().to_string(),
                name: property.name,
                kind: "property",
            });
        }
        for accessor in [getter, setter] {
            if !entry.methods.contains_key(accessor) {
                return Err(RegistrationError::UnknownAccessor {
                    class: class.name().to_string(),
                    property: property.name,
                    accessor: accessor.to_string(),
                });
            }
        }
        log::debug!(
            "registering property {}.{} ({})",
            class.name(),
            property.name,
            property.class_name
        );
        entry.properties.insert(
            property.name.clone(),
            RegisteredProperty {
                info: property,
                getter: getter.to_string(),
                setter: setter.to_string(),
            },
        );
        Ok(())
    }

    fn register_signal(
        &mut self,
        class: &'static ClassInfo,
        name: &str,
        arguments: Vec<PropertyInfo>,
    ) -> Result<(), RegistrationError> {
        let entry = self.entry_mut(class)?;
        if entry.signals.iter().any(|signal| signal.name == name) {
            return Err(RegistrationError::DuplicateRegistration {
                class: class.name().to_string(),
                name: name.to_string(),
                kind: "signal",
            });
        }
        log::debug!("registering signal {}.{}", class.name(), name);
        entry.signals.push(SignalInfo {
            name: name.to_string(),
            arguments,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any as StdAny;
    use std::sync::LazyLock;

    use varbridge_core::{Any, ObjectHeap, RefCounting, VariantKind};

    use super::*;

    struct Counter {
        value: i64,
    }

    impl Any for Counter {
        fn type_hash() -> TypeHash {
            Self::class_info().id()
        }

        fn type_name() -> &'static str {
            "Counter"
        }
    }

    impl Class for Counter {
        fn class_info() -> &'static ClassInfo {
            static INFO: LazyLock<ClassInfo> =
                LazyLock::new(|| ClassInfo::derived::<Counter, RefCounted>("Counter"));
            &INFO
        }
    }

    struct Orphan;

    impl Any for Orphan {
        fn type_hash() -> TypeHash {
            Self::class_info().id()
        }

        fn type_name() -> &'static str {
            "Orphan"
        }
    }

    impl Class for Orphan {
        fn class_info() -> &'static ClassInfo {
            static INFO: LazyLock<ClassInfo> =
                LazyLock::new(|| ClassInfo::derived::<Orphan, Counter>("Orphan"));
            &INFO
        }
    }

    fn counter_db() -> ClassDb {
        let class = Counter::class_info();
        let mut db = ClassDb::new();
        db.register_class(class).unwrap();
        db.register_method(
            class,
            MethodInfo::new("get_value").returning(PropertyInfo::new(VariantKind::Int, "value")),
            Box::new(|this: &mut dyn StdAny, _: &[Variant]| {
                let this = this
                    .downcast_mut::<Counter>()
                    .ok_or(CallError::InvalidInstance { expected: "Counter" })?;
                Ok(Some(Variant::Int(this.value)))
            }),
        )
        .unwrap();
        db.register_method(
            class,
            MethodInfo::new("set_value").with_argument(PropertyInfo::new(VariantKind::Int, "value")),
            Box::new(|this: &mut dyn StdAny, args: &[Variant]| {
                let this = this
                    .downcast_mut::<Counter>()
                    .ok_or(CallError::InvalidInstance { expected: "Counter" })?;
                match args.first() {
                    Some(Variant::Int(v)) => {
                        this.value = *v;
                        Ok(None)
                    }
                    _ => Ok(Some(Variant::Int(this.value))),
                }
            }),
        )
        .unwrap();
        db.register_property(
            class,
            PropertyInfo::new(VariantKind::Int, "value"),
            "get_value",
            "set_value",
        )
        .unwrap();
        db
    }

    #[test]
    fn builtins_are_preregistered() {
        let db = ClassDb::new();
        assert!(db.contains_class("Object"));
        assert!(db.contains_class("RefCounted"));
        assert_eq!(db.class_count(), 2);
    }

    #[test]
    fn base_must_be_registered_first() {
        let mut db = ClassDb::new();
        let err = db.register_class(Orphan::class_info()).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::UnregisteredBase {
                class: "Orphan".into(),
                base: "Counter".into()
            }
        );
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut db = counter_db();
        assert_eq!(
            db.register_class(Counter::class_info()),
            Err(RegistrationError::DuplicateClass("Counter".into()))
        );
        let err = db
            .register_method(
                Counter::class_info(),
                MethodInfo::new("get_value"),
                Box::new(|_, _| Ok(None)),
            )
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateRegistration { kind: "method", .. }));
    }

    #[test]
    fn property_needs_registered_accessors() {
        let mut db = counter_db();
        let err = db
            .register_property(
                Counter::class_info(),
                PropertyInfo::new(VariantKind::Int, "other"),
                "get_other",
                "set_value",
            )
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::UnknownAccessor {
                class: "Counter".into(),
                property: "other".into(),
                accessor: "get_other".into()
            }
        );
    }

    #[test]
    fn members_on_unknown_class_are_rejected() {
        let mut db = ClassDb::new();
        let err = db
            .register_signal(Counter::class_info(), "changed", Vec::new())
            .unwrap_err();
        assert_eq!(err, RegistrationError::UnknownClass("Counter".into()));
    }

    #[test]
    fn properties_dispatch_through_accessors() {
        let db = counter_db();
        let mut heap = ObjectHeap::new();
        let counter = heap.allocate(Counter { value: 3 });

        assert_eq!(db.get_property(counter.object(), "value"), Ok(Variant::Int(3)));
        assert_eq!(
            db.set_property(counter.object(), "value", Variant::Int(10)),
            Ok(None)
        );
        assert_eq!(counter.try_bind().map(|c| c.value), Some(10));
        assert_eq!(
            db.set_property(counter.object(), "value", Variant::from("ten")),
            Ok(Some(Variant::Int(10)))
        );
    }

    #[test]
    fn lookups_fall_back_to_base_classes() {
        let mut db = counter_db();
        db.register_method(
            RefCounted::class_info(),
            MethodInfo::new("get_kind"),
            Box::new(|_, _| Ok(Some(Variant::from("refcounted")))),
        )
        .unwrap();

        let mut heap = ObjectHeap::new();
        let counter = heap.allocate(Counter { value: 0 });
        assert_eq!(
            db.call(counter.object(), "get_kind", &[]),
            Ok(Some(Variant::from("refcounted")))
        );
        assert!(db.method("Counter", "get_kind").is_some());
        assert!(db.method("RefCounted", "get_value").is_none());
        assert_eq!(db.property("Counter", "value").map(|p| p.property_type), Some(VariantKind::Int));
    }

    #[test]
    fn dispatch_errors() {
        let db = counter_db();
        let mut heap = ObjectHeap::new();
        let counter = heap.allocate(Counter { value: 0 });
        assert_eq!(
            db.call(counter.object(), "missing", &[]),
            Err(CallError::UnknownMethod {
                class: "Counter".into(),
                method: "missing".into()
            })
        );
        assert!(matches!(
            db.get_property(counter.object(), "missing"),
            Err(CallError::UnknownProperty { .. })
        ));

        let orphan = heap.allocate(Orphan);
        assert_eq!(
            db.call(orphan.object(), "get_value", &[]),
            Err(CallError::UnknownClass("Orphan".into()))
        );

        counter.object().unreference();
        assert_eq!(
            db.call(counter.object(), "get_value", &[]),
            Err(CallError::InvalidInstance { expected: "Counter" })
        );
    }

    #[test]
    fn signals_keep_registration_order() {
        let mut db = counter_db();
        let class = Counter::class_info();
        db.register_signal(class, "changed", vec![PropertyInfo::new(VariantKind::Int, "value")])
            .unwrap();
        db.register_signal(class, "reset", Vec::new()).unwrap();
        assert!(db.register_signal(class, "reset", Vec::new()).is_err());

        let names: Vec<_> = db.signals("Counter").iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["changed", "reset"]);
        assert!(db.signals("Nope").is_empty());
        assert_eq!(db.property_names("Counter"), ["value"]);
    }
}
