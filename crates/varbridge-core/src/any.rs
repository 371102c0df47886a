//! Any trait for bridgeable types.
//!
//! Every native type that can cross the bridge implements [`Any`], which gives
//! it an engine-visible name and a [`TypeHash`]. Builtin element types use the
//! engine's own names, so every integer width presents itself as `int` and both
//! float widths as `float`: the engine has exactly one of each.
//!
//! Classes get their `Any` implementation from `#[derive(Class)]`, which keys the
//! hash on the Rust type rather than the name.
//!
//! # Example
//!
//! ```
//! use varbridge_core::{Any, TypeHash};
//!
//! struct Meters;
//!
//! impl Any for Meters {
//!     fn type_hash() -> TypeHash {
//!         TypeHash::from_name("Meters")
//!     }
//!
//!     fn type_name() -> &'static str {
//!         "Meters"
//!     }
//! }
//!
//! assert_eq!(Meters::type_name(), "Meters");
//! ```

use crate::TypeHash;

/// Trait for types that can be named on the engine side of the bridge.
pub trait Any: 'static {
    /// Get the type hash for this type.
    fn type_hash() -> TypeHash;

    /// Get the engine-visible type name.
    fn type_name() -> &'static str;
}

macro_rules! impl_any_builtin {
    ($name:literal => $($ty:ty),+) => {
        $(
            impl Any for $ty {
                fn type_hash() -> TypeHash {
                    TypeHash::from_name($name)
                }

                fn type_name() -> &'static str {
                    $name
                }
            }
        )+
    };
}

impl_any_builtin!("bool" => bool);
impl_any_builtin!("int" => i8, i16, i32, i64, u8, u16, u32);
impl_any_builtin!("float" => f32, f64);
impl_any_builtin!("String" => String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names() {
        assert_eq!(bool::type_name(), "bool");
        assert_eq!(i64::type_name(), "int");
        assert_eq!(u8::type_name(), "int");
        assert_eq!(f32::type_name(), "float");
        assert_eq!(String::type_name(), "String");
    }

    #[test]
    fn integer_widths_share_engine_identity() {
        assert_eq!(i32::type_hash(), i64::type_hash());
        assert_eq!(i64::type_hash(), TypeHash::from_name("int"));
        assert_ne!(i64::type_hash(), f64::type_hash());
    }
}
