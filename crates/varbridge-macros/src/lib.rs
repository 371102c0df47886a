//! Proc macros for varbridge.
//!
//! # Macros
//!
//! - `#[derive(Class)]` - declare an engine class and export its typed arrays
//!
//! # Example
//!
//! ```ignore
//! use varbridge::{Class, TypedArray};
//!
//! #[derive(Class, Default)]
//! #[class(name = "Inventory", base = varbridge::RefCounted)]
//! pub struct Inventory {
//!     #[export]
//!     pub item_ids: TypedArray<i64>,
//!
//!     #[export(name = "labels")]
//!     pub item_labels: TypedArray<String>,
//! }
//! ```

use proc_macro::TokenStream;

mod attrs;
mod derive_class;

/// Derive `Any`, `Class` and `ExportedClass` for a struct.
///
/// # Attributes
///
/// - `#[class(name = "...")]` - Engine-visible class name (default: struct name)
/// - `#[class(base = Type)]` - Base class (default: `varbridge::Object`)
///
/// # Field Attributes
///
/// - `#[export]` - Register a `TypedArray<T>` field as an array property with
///   `get_<field>` / `set_<field>` accessors
/// - `#[export(name = "...")]` - Override the property name
#[proc_macro_derive(Class, attributes(class, export))]
pub fn derive_class(input: TokenStream) -> TokenStream {
    derive_class::derive_class_impl(input)
}
