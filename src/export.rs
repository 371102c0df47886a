//! Engine-facing accessors for exported array properties.
//!
//! The engine reads and writes array properties through a getter/setter pair
//! with a fixed calling convention:
//!
//! - getter: no arguments, returns the property value as a [`Variant`]
//! - setter: one argument, returns `None` when the value was accepted and the
//!   property's resulting value otherwise
//!
//! The engine has no channel for structured errors, so rejections become that
//! sentinel. The reason is logged at debug level.

use std::any::Any as StdAny;

use varbridge_core::{BridgeError, CallError, Class, Element, RegistrationError, Variant, VariantKind};
use varbridge_registry::{ClassRegistrar, MethodInfo, PropertyHint, PropertyInfo, PropertyUsage};

use crate::TypedArray;

/// A class that registers its exported properties with the host.
///
/// Implemented by `#[derive(Class)]`.
///
/// # Inherited properties
///
/// The accessors registered for a class only accept instances whose payload
/// is exactly that class. The host still resolves a base class's array
/// property by name on a subclass instance, but dispatching it fails with
/// [`CallError::InvalidInstance`] naming the base class. Re-export the field
/// on the subclass if the engine needs to reach it there.
pub trait ExportedClass: Class {
    /// Register the class itself, then every exported property.
    fn register_exports(registrar: &mut dyn ClassRegistrar) -> Result<(), RegistrationError>;
}

/// Getter body: the live backing array, wrapped.
pub fn get_accessor<T: Element>(array: &TypedArray<T>) -> Variant {
    Variant::Array(array.read_untyped())
}

/// Setter body.
///
/// Returns `None` when `args[0]` was adopted. Otherwise returns the array the
/// property holds after the rejection, which depends on the bridge's
/// [`RejectionPolicy`](crate::RejectionPolicy). A missing or non-array
/// argument is rejected like any other invalid write.
pub fn set_accessor<T: Element>(array: &mut TypedArray<T>, args: &[Variant]) -> Option<Variant> {
    let result = match args.first() {
        Some(Variant::Array(candidate)) => array.write_untyped(candidate.clone()),
        Some(other) => Err(array.reject(BridgeError::NotAnArray {
            actual: other.type_name(),
        })),
        None => Err(array.reject(BridgeError::MissingArgument)),
    };
    match result {
        Ok(()) => None,
        Err(_) => Some(Variant::Array(array.read_untyped())),
    }
}

/// Property descriptor of an exported `TypedArray<T>` named `name`.
///
/// The host recognises typed array properties only in this exact shape.
pub fn array_property_info<T: Element>(name: &str) -> PropertyInfo {
    let element = T::element_name();
    PropertyInfo::new(VariantKind::Array, name)
        .with_class_name(format!("Array[{element}]"))
        .with_hint(PropertyHint::None, format!("Array of {element}"))
        .with_usage(PropertyUsage::DEFAULT)
}

/// Register `get_<name>`, `set_<name>` and the `name` property on class `C`.
///
/// `get` and `get_mut` project the bridged field out of the instance. The
/// registered accessors downcast the receiver to exactly `C`, so a subclass
/// instance reaching them through base-class lookup gets
/// [`CallError::InvalidInstance`] instead of a value.
pub fn register_array_property<C: Class, T: Element>(
    registrar: &mut dyn ClassRegistrar,
    name: &str,
    get: fn(&C) -> &TypedArray<T>,
    get_mut: fn(&mut C) -> &mut TypedArray<T>,
) -> Result<(), RegistrationError> {
    let class = C::class_info();
    let info = array_property_info::<T>(name);
    let getter = format!("get_{name}");
    let setter = format!("set_{name}");

    registrar.register_method(
        class,
        MethodInfo::new(&getter).returning(info.clone()),
        Box::new(move |this: &mut dyn StdAny, _: &[Variant]| {
            let this = this
                .downcast_ref::<C>()
                .ok_or(CallError::InvalidInstance {
                    expected: C::class_info().name(),
                })?;
            Ok(Some(get_accessor(get(this))))
        }),
    )?;
    registrar.register_method(
        class,
        MethodInfo::new(&setter).with_argument(info.clone()),
        Box::new(move |this: &mut dyn StdAny, args: &[Variant]| {
            let this = this
                .downcast_mut::<C>()
                .ok_or(CallError::InvalidInstance {
                    expected: C::class_info().name(),
                })?;
            Ok(set_accessor(get_mut(this), args))
        }),
    )?;
    registrar.register_property(class, info, &getter, &setter)
}

#[cfg(test)]
mod tests {
    use varbridge_core::{TypeTag, VariantArray};
    use varbridge_registry::ClassDb;

    use super::*;
    use crate::{BridgeConfig, RejectionPolicy};

    #[derive(crate::Class, Default)]
    #[class(name = "Greeter")]
    struct Greeter {
        #[export]
        greetings: TypedArray<String>,
        #[export(name = "counts")]
        _counts: TypedArray<i32>,
        _plain: u32,
    }

    #[test]
    fn property_info_shape() {
        let info = array_property_info::<String>("greetings");
        assert_eq!(info.property_type, VariantKind::Array);
        assert_eq!(info.name, "greetings");
        assert_eq!(info.class_name, "Array[String]");
        assert_eq!(info.hint, PropertyHint::None);
        assert_eq!(info.hint_string, "Array of String");
        assert_eq!(info.usage, PropertyUsage::DEFAULT);
    }

    #[test]
    fn setter_rejects_non_arrays() {
        let mut array = TypedArray::new(vec![1i64]);
        let prior = array.read_untyped();
        assert_eq!(set_accessor(&mut array, &[]), Some(Variant::Array(prior.clone())));
        assert_eq!(
            set_accessor(&mut array, &[Variant::Int(3)]),
            Some(Variant::Array(prior))
        );
        assert_eq!(&*array.read_native(), &[1]);
    }

    #[test]
    fn setter_reset_policy_surfaces_empty_array() {
        let config = BridgeConfig::new().with_rejection(RejectionPolicy::ResetToEmpty);
        let mut array = TypedArray::with_config(vec![1i64], config);
        let returned = set_accessor(&mut array, &[Variant::from("nope")]);
        let Some(Variant::Array(returned)) = returned else {
            panic!("expected an array sentinel");
        };
        assert!(returned.is_empty());
        assert!(returned.is_same_typed(&VariantArray::empty(TypeTag::of::<i64>())));
        assert!(array.is_empty());
    }

    #[test]
    fn derived_class_registers_accessors() {
        let mut db = ClassDb::new();
        Greeter::register_exports(&mut db).unwrap();

        assert!(db.method("Greeter", "get_greetings").is_some());
        assert!(db.method("Greeter", "set_counts").is_some());
        assert_eq!(db.property_names("Greeter"), ["counts", "greetings"]);
        assert_eq!(
            db.property("Greeter", "counts").map(|p| p.class_name.as_str()),
            Some("Array[int]")
        );

        let greeter = Greeter::default();
        assert!(greeter.greetings.is_empty());
    }
}
