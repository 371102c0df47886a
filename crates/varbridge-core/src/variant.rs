//! Tagged values crossing the engine boundary.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{ObjectRef, VariantArray};

/// Kind tag of a [`Variant`].
///
/// Discriminants are the ones the engine ABI uses, so a raw `i32` read from a
/// property descriptor or array type tag decodes with `VariantKind::try_from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum VariantKind {
    Nil = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    String = 4,
    Object = 24,
    Array = 28,
}

impl VariantKind {
    /// Engine-visible name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            VariantKind::Nil => "Nil",
            VariantKind::Bool => "bool",
            VariantKind::Int => "int",
            VariantKind::Float => "float",
            VariantKind::String => "String",
            VariantKind::Object => "Object",
            VariantKind::Array => "Array",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value that can cross the engine boundary.
///
/// Scalars have value semantics. `Object` and `Array` are shared handles:
/// cloning the variant shares the referenced object or container.
#[derive(Clone, Default, PartialEq)]
pub enum Variant {
    /// Absence of a value (also the null object).
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Object(ObjectRef),
    Array(VariantArray),
}

impl Variant {
    /// The kind tag of this value.
    pub fn kind(&self) -> VariantKind {
        match self {
            Variant::Nil => VariantKind::Nil,
            Variant::Bool(_) => VariantKind::Bool,
            Variant::Int(_) => VariantKind::Int,
            Variant::Float(_) => VariantKind::Float,
            Variant::String(_) => VariantKind::String,
            Variant::Object(_) => VariantKind::Object,
            Variant::Array(_) => VariantKind::Array,
        }
    }

    /// Human-readable name of the held value's type.
    ///
    /// Objects report their class name rather than `Object`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Variant::Object(object) => object.class().name(),
            other => other.kind().name(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Variant::Nil)
    }

    /// The held array, if this variant is array-shaped.
    pub fn as_array(&self) -> Option<&VariantArray> {
        match self {
            Variant::Array(array) => Some(array),
            _ => None,
        }
    }

    /// The held object, if any.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Variant::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Nil => write!(f, "Nil"),
            Variant::Bool(v) => write!(f, "Bool({})", v),
            Variant::Int(v) => write!(f, "Int({})", v),
            Variant::Float(v) => write!(f, "Float({})", v),
            Variant::String(s) => write!(f, "String({:?})", s),
            Variant::Object(o) => write!(f, "Object({:?})", o),
            Variant::Array(a) => write!(f, "Array({:?})", a),
        }
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Variant::Int(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::Float(value)
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.to_owned())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::String(value)
    }
}

impl From<ObjectRef> for Variant {
    fn from(value: ObjectRef) -> Self {
        Variant::Object(value)
    }
}

impl From<VariantArray> for Variant {
    fn from(value: VariantArray) -> Self {
        Variant::Array(value)
    }
}
