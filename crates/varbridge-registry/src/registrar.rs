//! The host's registration service, as seen by generated glue.

use std::any::Any as StdAny;

use varbridge_core::{CallError, ClassInfo, RegistrationError, Variant};

use crate::{MethodInfo, PropertyInfo};

/// Native entry point of a registered method.
///
/// Receives the instance payload and the call arguments; returns the call's
/// result, `None` for no value.
pub type MethodFn = Box<dyn Fn(&mut dyn StdAny, &[Variant]) -> Result<Option<Variant>, CallError>>;

/// Registration operations the host exposes to extension classes.
pub trait ClassRegistrar {
    /// Make `class` known to the host. Its base must already be registered.
    fn register_class(&mut self, class: &'static ClassInfo) -> Result<(), RegistrationError>;

    /// Register a method on `class`.
    fn register_method(
        &mut self,
        class: &'static ClassInfo,
        method: MethodInfo,
        function: MethodFn,
    ) -> Result<(), RegistrationError>;

    /// Register a property on `class` backed by two already registered methods.
    fn register_property(
        &mut self,
        class: &'static ClassInfo,
        property: PropertyInfo,
        getter: &str,
        setter: &str,
    ) -> Result<(), RegistrationError>;

    /// Register a signal on `class`.
    fn register_signal(
        &mut self,
        class: &'static ClassInfo,
        name: &str,
        arguments: Vec<PropertyInfo>,
    ) -> Result<(), RegistrationError>;
}
