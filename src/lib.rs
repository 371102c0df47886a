//! Typed native arrays bridged to an engine's variant arrays.
//!
//! The engine stores arrays as shared containers of [`Variant`]s, optionally
//! tagged with an element type. Native code wants a `Vec<T>`. A
//! [`TypedArray<T>`] keeps one of each and keeps them consistent, checking
//! every array that arrives from the engine before adopting it.
//!
//! # Crates
//!
//! - `varbridge-core` - identity, variants, objects, the element codec and the
//!   untyped array
//! - `varbridge-registry` - property metadata and the host registration service
//! - `varbridge-macros` - `#[derive(Class)]`
//!
//! Everything is re-exported here.
//!
//! # Example
//!
//! ```
//! use varbridge::{Class, ClassDb, ExportedClass, ObjectHeap, TypedArray, Variant};
//!
//! #[derive(Class, Default)]
//! #[class(base = varbridge::RefCounted)]
//! struct Inventory {
//!     #[export]
//!     item_ids: TypedArray<i64>,
//! }
//!
//! let mut db = ClassDb::new();
//! Inventory::register_exports(&mut db).unwrap();
//!
//! let mut heap = ObjectHeap::new();
//! let inventory = heap.allocate(Inventory::default());
//!
//! let ids = db.get_property(inventory.object(), "item_ids").unwrap();
//! ids.as_array().unwrap().append(Variant::Int(7));
//!
//! let bound = inventory.try_bind().unwrap();
//! assert_eq!(&*bound.item_ids.read_native(), &[7]);
//! ```

extern crate self as varbridge;

mod config;
mod export;
mod typed_array;

pub use config::{BridgeConfig, RejectionPolicy};
pub use export::{
    ExportedClass, array_property_info, get_accessor, register_array_property, set_accessor,
};
pub use typed_array::{NativeMut, TypedArray};

pub use varbridge_core::{
    Any, BridgeError, CallError, Class, ClassInfo, ConversionError, Element, FromVariant, Gd,
    InstanceId, Object, ObjectHeap, ObjectRef, RefCounted, RefCounting, RegistrationError,
    ToVariant, TypeHash, TypeTag, Variant, VariantArray, VariantKind,
};
pub use varbridge_registry::{
    ClassDb, ClassRegistrar, MethodFlags, MethodFn, MethodInfo, PropertyHint, PropertyInfo,
    PropertyUsage, SignalInfo,
};

pub use varbridge_macros::Class;
