//! Element type tags carried by typed arrays.

use std::fmt;

use crate::{ClassInfo, Element, Variant, VariantKind};

/// Element type a typed array is constrained to.
///
/// For object elements the tag also names the class. Two tags are equal when
/// their kinds match and, for object kind only, their classes are the same
/// class by identity.
#[derive(Clone, Copy)]
pub struct TypeTag {
    kind: VariantKind,
    class: Option<&'static ClassInfo>,
}

impl TypeTag {
    /// Tag for a builtin (non-object) element kind.
    pub const fn builtin(kind: VariantKind) -> Self {
        Self { kind, class: None }
    }

    /// Tag for object elements of `class` or any subclass.
    pub const fn object(class: &'static ClassInfo) -> Self {
        Self {
            kind: VariantKind::Object,
            class: Some(class),
        }
    }

    /// Tag of the native element type `T`.
    pub fn of<T: Element>() -> Self {
        T::type_tag()
    }

    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    pub fn class(&self) -> Option<&'static ClassInfo> {
        self.class
    }

    /// Class name for object tags, empty otherwise.
    pub fn class_name(&self) -> &'static str {
        match (self.kind, self.class) {
            (VariantKind::Object, Some(class)) => class.name(),
            _ => "",
        }
    }

    /// Whether a typed array with this tag may hold `value`.
    ///
    /// Object tags admit `Nil` (the null object) and any live or freed
    /// instance whose class inherits the tagged class.
    pub fn accepts(&self, value: &Variant) -> bool {
        match (self.kind, value) {
            (VariantKind::Object, Variant::Nil) => true,
            (VariantKind::Object, Variant::Object(object)) => match self.class {
                Some(class) => object.class().inherits(class),
                None => true,
            },
            (kind, value) => value.kind() == kind,
        }
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        if self.kind != VariantKind::Object {
            return true;
        }
        self.class.map(ClassInfo::id) == other.class.map(ClassInfo::id)
    }
}

impl Eq for TypeTag {}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.class) {
            (VariantKind::Object, Some(class)) => f.write_str(class.name()),
            (kind, _) => f.write_str(kind.name()),
        }
    }
}
