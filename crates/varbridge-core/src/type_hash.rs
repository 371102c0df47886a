//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit value identifying a type on either side of the
//! bridge. There are two ways to obtain one:
//!
//! - [`TypeHash::from_name`] hashes an engine-visible name. The same name always
//!   produces the same hash, which makes it suitable for builtin element types
//!   whose identity *is* their engine name (`int`, `float`, `String`).
//! - [`TypeHash::of`] hashes a Rust [`TypeId`](std::any::TypeId) with XXH64.
//!   It depends on the type, not its engine name, so two native types that
//!   present the same name get different hashes (barring a 64-bit collision).
//!   Class identity uses this form so that a user class called `Node` cannot
//!   be mistaken for the engine's `Node`.
//!
//! # Examples
//!
//! ```
//! use varbridge_core::TypeHash;
//!
//! let int_hash = TypeHash::from_name("int");
//! assert_eq!(int_hash, TypeHash::from_name("int"));
//!
//! struct Node;
//! assert_eq!(TypeHash::of::<Node>(), TypeHash::of::<Node>());
//! assert_ne!(TypeHash::of::<Node>(), TypeHash::from_name("Node"));
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use xxhash_rust::xxh64::{Xxh64, xxh64};

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Domain marker for name-derived type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for hashes derived from a Rust `TypeId`.
    pub const NATIVE: u64 = 0x6c8e9cf570932bd5;
}

/// A deterministic 64-bit type identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from an engine-visible type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a type hash from a Rust type's `TypeId`.
    ///
    /// Stable for the lifetime of the process, which is all class identity
    /// needs. Seeded differently from [`from_name`](Self::from_name), so it
    /// does not line up with the hash of the type's engine name.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::of_type_id(TypeId::of::<T>())
    }

    /// Create a type hash from an existing `TypeId`.
    #[inline]
    pub fn of_type_id(type_id: TypeId) -> Self {
        let mut hasher = Xxh64::new(hash_constants::NATIVE);
        type_id.hash(&mut hasher);
        TypeHash(hasher.finish())
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl Default for TypeHash {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
