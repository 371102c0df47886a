//! Property, method and signal descriptors handed to the host.
//!
//! The shapes here are fixed by the host's registration ABI. Field values are
//! chosen by the caller; this module does not interpret them.

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use varbridge_core::VariantKind;

/// Editor hint attached to a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(i32)]
pub enum PropertyHint {
    #[default]
    None = 0,
    Range = 1,
    Enum = 2,
    ResourceType = 17,
    ArrayType = 31,
}

bitflags! {
    /// How the host stores and presents a property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyUsage: u32 {
        /// Saved with the owning object.
        const STORAGE = 1 << 1;
        /// Shown in the editor inspector.
        const EDITOR = 1 << 2;
        /// Hidden from scripts.
        const INTERNAL = 1 << 3;
        const READ_ONLY = 1 << 4;
        const DEFAULT = Self::STORAGE.bits() | Self::EDITOR.bits();
    }
}

impl Default for PropertyUsage {
    fn default() -> Self {
        Self::DEFAULT
    }
}

bitflags! {
    /// Calling-convention flags of a registered method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MethodFlags: u32 {
        const NORMAL = 1;
        const EDITOR = 1 << 1;
        const CONST = 1 << 2;
        const VIRTUAL = 1 << 3;
        const VARARG = 1 << 4;
        const STATIC = 1 << 5;
        const DEFAULT = Self::NORMAL.bits();
    }
}

impl Default for MethodFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Descriptor of a property, a method argument or a method return value.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub property_type: VariantKind,
    pub name: String,
    pub class_name: String,
    pub hint: PropertyHint,
    pub hint_string: String,
    pub usage: PropertyUsage,
}

impl PropertyInfo {
    /// A plain property of `property_type` with no hint and default usage.
    pub fn new(property_type: VariantKind, name: impl Into<String>) -> Self {
        Self {
            property_type,
            name: name.into(),
            class_name: String::new(),
            hint: PropertyHint::None,
            hint_string: String::new(),
            usage: PropertyUsage::DEFAULT,
        }
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_hint(mut self, hint: PropertyHint, hint_string: impl Into<String>) -> Self {
        self.hint = hint;
        self.hint_string = hint_string.into();
        self
    }

    pub fn with_usage(mut self, usage: PropertyUsage) -> Self {
        self.usage = usage;
        self
    }
}

/// Descriptor of a method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub name: String,
    pub flags: MethodFlags,
    pub return_value: Option<PropertyInfo>,
    pub arguments: Vec<PropertyInfo>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: MethodFlags::DEFAULT,
            return_value: None,
            arguments: Vec::new(),
        }
    }

    pub fn returning(mut self, value: PropertyInfo) -> Self {
        self.return_value = Some(value);
        self
    }

    pub fn with_argument(mut self, argument: PropertyInfo) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Descriptor of a signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalInfo {
    pub name: String,
    pub arguments: Vec<PropertyInfo>,
}
