//! Core types for bridging native arrays to the engine's variant arrays.
//!
//! This crate holds everything the bridge needs below the typed array itself:
//!
//! - [`TypeHash`], [`Any`], [`ClassInfo`] and [`Class`] - type and class identity
//! - [`Variant`] and [`VariantKind`] - values crossing the engine boundary
//! - [`ObjectRef`], [`Gd`] and [`ObjectHeap`] - engine objects and their reference counts
//! - [`ToVariant`], [`FromVariant`] and [`Element`] - the element codec
//! - [`VariantArray`] and [`TypeTag`] - the engine's untyped dynamic array
//! - error types for conversion, bridging, registration and dispatch

mod any;
mod array;
mod class;
mod convert;
mod error;
mod object;
mod tag;
mod type_hash;
mod variant;

pub use any::Any;
pub use array::VariantArray;
pub use class::{Class, ClassInfo, Object, RefCounted};
pub use convert::{Element, FromVariant, ToVariant};
pub use error::{BridgeError, CallError, ConversionError, RegistrationError};
pub use object::{Gd, InstanceId, ObjectHeap, ObjectRef, RefCounting};
pub use tag::TypeTag;
pub use type_hash::{TypeHash, hash_constants};
pub use variant::{Variant, VariantKind};
