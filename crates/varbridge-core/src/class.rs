//! Class identity for engine objects.
//!
//! Each class has one static [`ClassInfo`] record. Records link to their base
//! class, so "is this object an instance of `C`?" is a walk up a chain of
//! static records compared by [`TypeHash`], never by name.
//!
//! Two builtin classes anchor every hierarchy:
//!
//! - [`Object`] - the root. Lifetime is managed manually (freed explicitly).
//! - [`RefCounted`] - derives from `Object`; instances are freed when their
//!   engine reference count drops to zero. Subclasses inherit this.

use std::fmt;
use std::sync::LazyLock;

use crate::{Any, TypeHash};

/// Static identity record of one class.
pub struct ClassInfo {
    name: &'static str,
    id: TypeHash,
    base: Option<&'static ClassInfo>,
    refcounted: bool,
}

impl ClassInfo {
    /// Create a record for the native type `C`.
    pub fn new<C: 'static>(
        name: &'static str,
        base: Option<&'static ClassInfo>,
        refcounted: bool,
    ) -> Self {
        Self {
            name,
            id: TypeHash::of::<C>(),
            base,
            refcounted,
        }
    }

    /// Create a record for `C` deriving from `B`. Reference counting is inherited.
    pub fn derived<C: 'static, B: Class>(name: &'static str) -> Self {
        let base = B::class_info();
        Self::new::<C>(name, Some(base), base.refcounted)
    }

    /// Engine-visible class name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stable identity of the class.
    pub fn id(&self) -> TypeHash {
        self.id
    }

    /// Direct base class, `None` for the root.
    pub fn base(&self) -> Option<&'static ClassInfo> {
        self.base
    }

    /// Whether instances are freed by reference counting.
    pub fn is_refcounted(&self) -> bool {
        self.refcounted
    }

    /// This class followed by each of its ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &ClassInfo> {
        std::iter::successors(Some(self), |class| class.base.map(|base| base as &ClassInfo))
    }

    /// Whether this class is `other` or derives from it.
    pub fn inherits(&self, other: &ClassInfo) -> bool {
        self.ancestors().any(|class| class.id == other.id)
    }
}

impl PartialEq for ClassInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClassInfo {}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("base", &self.base.map(ClassInfo::name))
            .field("refcounted", &self.refcounted)
            .finish()
    }
}

impl fmt::Display for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A native type that names an engine class.
///
/// Usually implemented with `#[derive(Class)]`.
pub trait Class: Any {
    /// The static identity record of this class.
    fn class_info() -> &'static ClassInfo;
}

/// Root of every class hierarchy.
#[derive(Debug, Default)]
pub struct Object;

impl Any for Object {
    fn type_hash() -> TypeHash {
        Self::class_info().id()
    }

    fn type_name() -> &'static str {
        "Object"
    }
}

impl Class for Object {
    fn class_info() -> &'static ClassInfo {
        static INFO: LazyLock<ClassInfo> =
            LazyLock::new(|| ClassInfo::new::<Object>("Object", None, false));
        &INFO
    }
}

/// Base of every reference-counted class.
#[derive(Debug, Default)]
pub struct RefCounted;

impl Any for RefCounted {
    fn type_hash() -> TypeHash {
        Self::class_info().id()
    }

    fn type_name() -> &'static str {
        "RefCounted"
    }
}

impl Class for RefCounted {
    fn class_info() -> &'static ClassInfo {
        static INFO: LazyLock<ClassInfo> = LazyLock::new(|| {
            ClassInfo::new::<RefCounted>("RefCounted", Some(Object::class_info()), true)
        });
        &INFO
    }
}
