//! Error types for the bridge.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ConversionError    - one Variant failed to convert into a native value
//! BridgeError        - an array crossing the boundary was rejected
//! RegistrationError  - class metadata could not be registered with the host
//! CallError          - the host could not dispatch a registered accessor
//! ```
//!
//! None of these are fatal. Engine-facing entry points turn them into the
//! sentinel values the engine calling convention expects; native callers get
//! them as ordinary `Result`s.

use thiserror::Error;

use crate::TypeTag;

// ============================================================================
// Conversion Errors
// ============================================================================

/// A [`Variant`](crate::Variant) could not be unwrapped into a native value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The variant holds a different kind of value.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// An integer does not fit the target width.
    #[error("integer {value} out of range for {target_type}")]
    IntegerOverflow {
        value: i64,
        target_type: &'static str,
    },

    /// A finite float does not fit the target width.
    #[error("float {value} out of range for {target_type}")]
    FloatOverflow {
        value: f64,
        target_type: &'static str,
    },

    /// The object is not an instance of the expected class.
    #[error("class mismatch: expected {expected}, got {actual}")]
    ClassMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The object has already been freed.
    #[error("object of class {class} was freed")]
    FreedObject { class: &'static str },
}

// ============================================================================
// Bridge Errors
// ============================================================================

/// An array operation or boundary crossing was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    /// The candidate array carries no type tag.
    #[error("untyped array rejected, expected Array[{expected}]")]
    UntypedInput { expected: TypeTag },

    /// The candidate array is typed for a different element kind or class.
    #[error("Array[{actual}] rejected, expected Array[{expected}]")]
    TypeTagMismatch { expected: TypeTag, actual: TypeTag },

    /// The tag matched but an element does not convert.
    #[error("element {index} does not convert to {expected}: {source}")]
    ElementConversionFailure {
        index: usize,
        expected: &'static str,
        #[source]
        source: ConversionError,
    },

    /// Indexed access outside `[0, len)`.
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A checked insert offered a value the array's tag does not accept.
    #[error("{actual} value rejected by Array[{expected}]")]
    ElementRejected {
        expected: TypeTag,
        actual: &'static str,
    },

    /// The accessor argument is not array-shaped.
    #[error("expected an Array argument, got {actual}")]
    NotAnArray { actual: &'static str },

    /// The accessor was called without its argument.
    #[error("missing argument")]
    MissingArgument,
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Class metadata could not be registered with the host.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// The class has already been registered.
    #[error("duplicate class: {0}")]
    DuplicateClass(String),

    /// A member was registered on a class the host does not know.
    #[error("class not registered: {0}")]
    UnknownClass(String),

    /// The base class must be registered before its subclasses.
    #[error("base class '{base}' of '{class}' is not registered")]
    UnregisteredBase { class: String, base: String },

    /// A member with this name already exists on the class.
    #[error("duplicate registration: '{name}' already registered as {kind} on {class}")]
    DuplicateRegistration {
        class: String,
        name: String,
        kind: &'static str,
    },

    /// A property names an accessor method that was never registered.
    #[error("property '{property}' on {class} refers to unknown accessor '{accessor}'")]
    UnknownAccessor {
        class: String,
        property: String,
        accessor: String,
    },
}

// ============================================================================
// Call Errors
// ============================================================================

/// The host could not dispatch a call into registered glue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// No class with this identity is registered.
    #[error("class not registered: {0}")]
    UnknownClass(String),

    /// The class (and its bases) has no such method.
    #[error("method '{method}' not found on {class}")]
    UnknownMethod { class: String, method: String },

    /// The class (and its bases) has no such property.
    #[error("property '{property}' not found on {class}")]
    UnknownProperty { class: String, property: String },

    /// The instance handed to the glue is not of the class it was registered for.
    #[error("instance is not a {expected}")]
    InvalidInstance { expected: &'static str },
}
