//! Element codec: conversion between native values and [`Variant`]s.
//!
//! - [`ToVariant`] wraps a native value. It never fails.
//! - [`FromVariant`] unwraps a variant, explaining mismatches with a
//!   [`ConversionError`]. [`FromVariant::try_from_variant`] is the lenient form
//!   used for bulk filtering.
//! - [`Element`] marks the types a typed array can hold and derives their
//!   [`TypeTag`].
//!
//! Unwrapping is strict about kinds: an `int` never unwraps as a float and a
//! float never unwraps as an `int`. Integers narrow with a range check.
//!
//! ## Supported Element Types
//!
//! - Integers: `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32`
//! - Floats: `f32`, `f64`
//! - `bool`, `String`
//! - Objects: `Gd<C>` (non-null) and `Option<Gd<C>>` (nullable)
//!
//! The codec does not touch reference counts; whoever stores an object decides
//! when to take and drop references.

use crate::{Any, Class, ConversionError, Gd, TypeHash, TypeTag, Variant, VariantKind};

/// Wrap a native value into a [`Variant`].
pub trait ToVariant {
    fn to_variant(&self) -> Variant;
}

/// Unwrap a [`Variant`] into a native value.
pub trait FromVariant: Sized {
    /// Unwrap `variant`, or explain why it does not convert.
    fn from_variant(variant: &Variant) -> Result<Self, ConversionError>;

    /// Unwrap `variant`, or `None` if it does not convert.
    fn try_from_variant(variant: &Variant) -> Option<Self> {
        Self::from_variant(variant).ok()
    }
}

/// A native type that can be the element type of a typed array.
pub trait Element: Any + ToVariant + FromVariant + Clone + 'static {
    /// Kind of the variants this type wraps into.
    const KIND: VariantKind;

    /// Tag of a typed array holding this type.
    fn type_tag() -> TypeTag {
        TypeTag::builtin(Self::KIND)
    }

    /// Engine-visible element name, as used in property metadata.
    fn element_name() -> &'static str {
        Self::type_name()
    }
}

fn mismatch(expected: &'static str, actual: &Variant) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        actual: actual.type_name(),
    }
}

// ============================================================================
// Integer implementations
// ============================================================================

macro_rules! impl_int_element {
    ($($ty:ty),*) => {
        $(
            impl ToVariant for $ty {
                fn to_variant(&self) -> Variant {
                    Variant::Int(i64::from(*self))
                }
            }

            impl FromVariant for $ty {
                fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
                    match variant {
                        Variant::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: stringify!($ty),
                            }
                        }),
                        other => Err(mismatch("int", other)),
                    }
                }
            }

            impl Element for $ty {
                const KIND: VariantKind = VariantKind::Int;
            }
        )*
    };
}

impl_int_element!(i8, i16, i32, i64, u8, u16, u32);

// ============================================================================
// Float implementations
// ============================================================================

impl ToVariant for f64 {
    fn to_variant(&self) -> Variant {
        Variant::Float(*self)
    }
}

impl FromVariant for f64 {
    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        match variant {
            Variant::Float(v) => Ok(*v),
            other => Err(mismatch("float", other)),
        }
    }
}

impl Element for f64 {
    const KIND: VariantKind = VariantKind::Float;
}

impl ToVariant for f32 {
    fn to_variant(&self) -> Variant {
        Variant::Float(f64::from(*self))
    }
}

impl FromVariant for f32 {
    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        match variant {
            // Infinities and NaN carry over; only finite values can overflow.
            Variant::Float(v) if v.is_finite() && v.abs() > f64::from(f32::MAX) => {
                Err(ConversionError::FloatOverflow {
                    value: *v,
                    target_type: "f32",
                })
            }
            Variant::Float(v) => Ok(*v as f32),
            other => Err(mismatch("float", other)),
        }
    }
}

impl Element for f32 {
    const KIND: VariantKind = VariantKind::Float;
}

// ============================================================================
// Bool and String
// ============================================================================

impl ToVariant for bool {
    fn to_variant(&self) -> Variant {
        Variant::Bool(*self)
    }
}

impl FromVariant for bool {
    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        match variant {
            Variant::Bool(v) => Ok(*v),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl Element for bool {
    const KIND: VariantKind = VariantKind::Bool;
}

impl ToVariant for String {
    fn to_variant(&self) -> Variant {
        Variant::String(self.clone())
    }
}

impl FromVariant for String {
    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        match variant {
            Variant::String(v) => Ok(v.clone()),
            other => Err(mismatch("String", other)),
        }
    }
}

impl Element for String {
    const KIND: VariantKind = VariantKind::String;
}

// ============================================================================
// Object implementations
// ============================================================================

impl<C: Class> Any for Gd<C> {
    fn type_hash() -> TypeHash {
        C::type_hash()
    }

    fn type_name() -> &'static str {
        C::class_info().name()
    }
}

impl<C: Class> ToVariant for Gd<C> {
    fn to_variant(&self) -> Variant {
        Variant::Object(self.object().clone())
    }
}

impl<C: Class> FromVariant for Gd<C> {
    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        match variant {
            Variant::Object(object) => Gd::from_object(object.clone()),
            other => Err(mismatch(C::class_info().name(), other)),
        }
    }
}

impl<C: Class> Element for Gd<C> {
    const KIND: VariantKind = VariantKind::Object;

    fn type_tag() -> TypeTag {
        TypeTag::object(C::class_info())
    }
}

impl<C: Class> Any for Option<Gd<C>> {
    fn type_hash() -> TypeHash {
        C::type_hash()
    }

    fn type_name() -> &'static str {
        C::class_info().name()
    }
}

impl<C: Class> ToVariant for Option<Gd<C>> {
    fn to_variant(&self) -> Variant {
        match self {
            Some(gd) => gd.to_variant(),
            None => Variant::Nil,
        }
    }
}

impl<C: Class> FromVariant for Option<Gd<C>> {
    fn from_variant(variant: &Variant) -> Result<Self, ConversionError> {
        match variant {
            Variant::Nil => Ok(None),
            other => Gd::from_variant(other).map(Some),
        }
    }
}

impl<C: Class> Element for Option<Gd<C>> {
    const KIND: VariantKind = VariantKind::Object;

    fn type_tag() -> TypeTag {
        TypeTag::object(C::class_info())
    }
}
