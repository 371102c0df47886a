//! Typed view over an engine array.
//!
//! A [`TypedArray<T>`] owns one [`VariantArray`] tagged for `T` and presents it
//! as a native `[T]`. The two views stay consistent by re-derivation:
//!
//! - Native writes ([`write_native`](TypedArray::write_native), the
//!   [`native_mut`](TypedArray::native_mut) guard) rebuild the backing array
//!   from scratch, wrapping every element into a fresh typed array.
//! - Native reads ([`read_native`](TypedArray::read_native)) re-derive the
//!   native view from the backing array whenever the backing array changed
//!   since the last sync. Elements that no longer unwrap as `T` are skipped.
//!   Each read hands out a shared snapshot, so a snapshot held across an
//!   engine-side change keeps its old contents while the next read sees the
//!   new ones.
//! - [`read_untyped`](TypedArray::read_untyped) hands out the live backing
//!   array. Whatever the engine does to that handle later is picked up by the
//!   next native read.
//! - [`write_untyped`](TypedArray::write_untyped) is the boundary check for
//!   arrays coming from the engine. A candidate must be typed, carry exactly
//!   this bridge's tag, and every element must unwrap as `T`. A rejected
//!   candidate is never partially adopted; see [`RejectionPolicy`] for what
//!   happens to the current contents. Writing back the bridge's own backing
//!   array never triggers the policy.
//!
//! Object elements are retained (engine reference taken) for as long as they
//! sit in the backing array the bridge last synced with, and released when the
//! bridge moves on or is dropped.
//!
//! # Example
//!
//! ```
//! use varbridge::{TypeTag, TypedArray, Variant, VariantArray};
//!
//! let mut scores = TypedArray::new(vec![1i64, 2, 3]);
//!
//! let wrong = VariantArray::empty(TypeTag::of::<String>());
//! wrong.append(Variant::from("a"));
//! assert!(scores.write_untyped(wrong).is_err());
//! assert_eq!(&*scores.read_native(), &[1, 2, 3]);
//!
//! let engine_side = scores.read_untyped();
//! engine_side.append(Variant::Int(4));
//! assert_eq!(&*scores.read_native(), &[1, 2, 3, 4]);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use varbridge_core::{BridgeError, Element, ObjectRef, RefCounting, TypeTag, VariantArray};

use crate::{BridgeConfig, RejectionPolicy};

struct NativeView<T> {
    values: Rc<Vec<T>>,
    /// Revision of the backing array `values` was derived from. `None` forces
    /// the next read to re-derive.
    revision: Option<u64>,
}

/// A native `Vec<T>` bridged to a typed engine array.
pub struct TypedArray<T: Element> {
    tag: TypeTag,
    native: RefCell<NativeView<T>>,
    backing: VariantArray,
    retained: RefCell<Vec<ObjectRef>>,
    config: BridgeConfig,
}

/// Wrap `values` into a fresh array typed with `tag`.
fn wrap_all<T: Element>(tag: TypeTag, values: &[T]) -> VariantArray {
    let array = VariantArray::empty(tag);
    for value in values {
        array.append(value.to_variant());
    }
    array
}

impl<T: Element> TypedArray<T> {
    /// Bridge `values` with the default configuration.
    pub fn new(values: Vec<T>) -> Self {
        Self::with_config(values, BridgeConfig::default())
    }

    /// Bridge `values`. The native view keeps `values` as given.
    pub fn with_config(values: Vec<T>, config: BridgeConfig) -> Self {
        let tag = T::type_tag();
        let backing = wrap_all(tag, &values);
        let array = Self {
            tag,
            native: RefCell::new(NativeView {
                values: Rc::new(values),
                revision: Some(backing.revision()),
            }),
            backing,
            retained: RefCell::new(Vec::new()),
            config,
        };
        array.retain_backing();
        array
    }

    /// Tag of the element type; fixed for the bridge's lifetime.
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn config(&self) -> BridgeConfig {
        self.config
    }

    pub fn set_config(&mut self, config: BridgeConfig) {
        self.config = config;
    }

    // =========================================================================
    // NATIVE VIEW
    // =========================================================================

    /// Snapshot of the native view, re-derived first if the backing array changed.
    pub fn read_native(&self) -> Rc<Vec<T>> {
        self.sync();
        Rc::clone(&self.native.borrow().values)
    }

    /// Replace the contents. The backing array is rebuilt as a new array.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn write_native(&mut self, values: Vec<T>) {
        self.backing = wrap_all(self.tag, &values);
        *self.native.get_mut() = NativeView {
            values: Rc::new(values),
            revision: Some(self.backing.revision()),
        };
        self.retain_backing();
        log::trace!("Array[{}] rebuilt from {} native values", self.tag, self.backing.count());
    }

    /// Mutate the native view in place. The backing array is rebuilt when the
    /// guard is dropped.
    pub fn native_mut(&mut self) -> NativeMut<'_, T> {
        self.sync();
        let view = self.native.get_mut();
        // Stale until the guard writes back.
        view.revision = None;
        let values = Rc::unwrap_or_clone(mem::take(&mut view.values));
        NativeMut {
            array: self,
            values,
        }
    }

    /// Append one element.
    pub fn push(&mut self, value: T) {
        self.native_mut().push(value);
    }

    pub fn to_vec(&self) -> Vec<T> {
        Rc::unwrap_or_clone(self.read_native())
    }

    /// Length of the native view.
    pub fn len(&self) -> usize {
        self.read_native().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // UNTYPED VIEW
    // =========================================================================

    /// The live backing array. Clones share the container with this bridge.
    pub fn read_untyped(&self) -> VariantArray {
        self.backing.clone()
    }

    /// An independent copy of the backing array.
    pub fn read_untyped_copy(&self) -> VariantArray {
        self.backing.duplicate()
    }

    /// Check `candidate` the way [`write_untyped`](Self::write_untyped) does,
    /// without adopting it.
    ///
    /// Checks run in order and stop at the first failure: the candidate must be
    /// typed, its tag must equal this bridge's tag, and every element must
    /// unwrap as `T`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn validate(&self, candidate: &VariantArray) -> Result<(), BridgeError> {
        let Some(actual) = candidate.tag() else {
            return Err(BridgeError::UntypedInput { expected: self.tag });
        };
        if actual != self.tag {
            return Err(BridgeError::TypeTagMismatch {
                expected: self.tag,
                actual,
            });
        }

        let mut index = 0;
        let mut failure = None;
        candidate.all_satisfy(|value| match T::from_variant(value) {
            Ok(_) => {
                index += 1;
                true
            }
            Err(source) => {
                failure = Some(source);
                false
            }
        });
        match failure {
            Some(source) => Err(BridgeError::ElementConversionFailure {
                index,
                expected: T::element_name(),
                source,
            }),
            None => Ok(()),
        }
    }

    /// Adopt `candidate` as the backing array if it passes [`validate`](Self::validate).
    ///
    /// On success the bridge shares `candidate` with the caller. On failure
    /// the configured [`RejectionPolicy`] is applied and the reason returned,
    /// unless `candidate` is the current backing array: then both views are
    /// kept whatever the policy.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn write_untyped(&mut self, candidate: VariantArray) -> Result<(), BridgeError> {
        if let Err(err) = self.validate(&candidate) {
            if candidate.ptr_eq(&self.backing) {
                log::debug!(
                    "Array[{}] rejected its own backing array, keeping contents: {}",
                    self.tag,
                    err
                );
                self.sync();
                return Err(err);
            }
            return Err(self.reject(err));
        }

        log::debug!("Array[{}] adopted {} elements", self.tag, candidate.count());
        self.backing = candidate;
        let view = self.native.get_mut();
        view.values = Rc::new(self.backing.compact_map(T::try_from_variant));
        view.revision = Some(self.backing.revision());
        self.retain_backing();
        Ok(())
    }

    /// Apply the rejection policy for a write that failed with `err`.
    pub(crate) fn reject(&mut self, err: BridgeError) -> BridgeError {
        match self.config.rejection {
            RejectionPolicy::KeepPrevious => {
                log::debug!("Array[{}] rejected write, keeping contents: {}", self.tag, err);
            }
            RejectionPolicy::ResetToEmpty => {
                log::debug!("Array[{}] rejected write, resetting: {}", self.tag, err);
                self.write_native(Vec::new());
            }
        }
        err
    }

    // =========================================================================
    // SYNC
    // =========================================================================

    /// Re-derive the native view if the backing array moved on.
    #[cfg_attr(feature = "profiling", profiling::function)]
    fn sync(&self) {
        let revision = self.backing.revision();
        let mut view = self.native.borrow_mut();
        if view.revision == Some(revision) {
            return;
        }
        view.values = Rc::new(self.backing.compact_map(T::try_from_variant));
        view.revision = Some(revision);
        log::trace!(
            "Array[{}] re-derived {} of {} elements",
            self.tag,
            view.values.len(),
            self.backing.count()
        );
        drop(view);
        self.retain_backing();
    }

    /// Take references on the objects now in the backing array, then drop the
    /// ones taken at the previous sync.
    fn retain_backing(&self) {
        let mut fresh = self.backing.compact_map(|value| value.as_object().cloned());
        fresh.retain(|object| object.reference());
        let held = fresh.len();
        let previous = self.retained.replace(fresh);
        if held > 0 || !previous.is_empty() {
            log::trace!(
                "Array[{}] holds {} object references (was {})",
                self.tag,
                held,
                previous.len()
            );
        }
        for object in previous {
            object.unreference();
        }
    }
}

impl<T: Element> Drop for TypedArray<T> {
    fn drop(&mut self) {
        for object in self.retained.take() {
            object.unreference();
        }
    }
}

impl<T: Element> Default for TypedArray<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Element> From<Vec<T>> for TypedArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}

impl<T: Element> FromIterator<T> for TypedArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: Element> fmt::Debug for TypedArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedArray")
            .field("tag", &self.tag)
            .field("backing", &self.backing)
            .field("config", &self.config)
            .finish()
    }
}

/// Mutable access to a [`TypedArray`]'s native view.
///
/// Dropping the guard writes the values back with
/// [`write_native`](TypedArray::write_native).
pub struct NativeMut<'a, T: Element> {
    array: &'a mut TypedArray<T>,
    values: Vec<T>,
}

impl<T: Element> Deref for NativeMut<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.values
    }
}

impl<T: Element> DerefMut for NativeMut<'_, T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.values
    }
}

impl<T: Element> Drop for NativeMut<'_, T> {
    fn drop(&mut self) {
        let values = mem::take(&mut self.values);
        self.array.write_native(values);
    }
}

#[cfg(test)]
mod tests {
    use varbridge_core::{Variant, VariantKind};

    use super::*;

    fn int_array(values: &[i64]) -> VariantArray {
        VariantArray::from_variants(
            Some(TypeTag::builtin(VariantKind::Int)),
            values.iter().copied().map(Variant::Int).collect(),
        )
    }

    #[test]
    fn construction_keeps_native_values() {
        let array = TypedArray::new(vec![1u8, 2, 3]);
        assert_eq!(&*array.read_native(), &[1, 2, 3]);
        assert_eq!(array.tag(), TypeTag::builtin(VariantKind::Int));
        assert_eq!(array.read_untyped(), int_array(&[1, 2, 3]));
    }

    #[test]
    fn tag_comes_from_element_impl() {
        // Every integer width maps to the same engine kind.
        let int = TypeTag::builtin(VariantKind::Int);
        assert_eq!(TypedArray::<u8>::default().tag(), int);
        assert_eq!(TypedArray::<i64>::default().tag(), int);
        assert_eq!(TypedArray::<u8>::default().tag(), <u8 as Element>::type_tag());
        assert_eq!(<u8 as Element>::element_name(), "int");

        let objects = TypedArray::<varbridge_core::Gd<varbridge_core::RefCounted>>::default();
        assert_eq!(objects.tag().class_name(), "RefCounted");
        assert_eq!(objects.read_untyped().tag(), Some(objects.tag()));
    }

    #[test]
    fn validate_reports_first_bad_index() {
        let array = TypedArray::<i64>::default();
        let candidate = int_array(&[1, 2]);
        candidate.append(Variant::Nil);
        candidate.append(Variant::from("x"));
        match array.validate(&candidate) {
            Err(BridgeError::ElementConversionFailure { index, expected, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(expected, "int");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn native_guard_rebuilds_backing() {
        let mut array = TypedArray::new(vec![String::from("a")]);
        let before = array.read_untyped();
        array.native_mut().push(String::from("b"));

        let after = array.read_untyped();
        assert!(!after.ptr_eq(&before));
        assert_eq!(after.to_vec(), vec![Variant::from("a"), Variant::from("b")]);
        assert_eq!(before.count(), 1);
    }

    #[test]
    fn held_snapshot_does_not_hide_later_changes() {
        let array = TypedArray::new(vec![1i32]);
        let first = array.read_native();
        let backing = array.read_untyped();
        backing.append(Variant::Int(2));

        let second = array.read_native();
        assert_eq!(&*first, &[1]);
        assert_eq!(&*second, &[1, 2]);
        assert_eq!(second.len(), backing.count());
    }

    #[test]
    fn leaked_guard_leaves_views_consistent() {
        let mut array = TypedArray::new(vec![1i64, 2]);
        mem::forget(array.native_mut());
        assert_eq!(&*array.read_native(), &[1, 2]);
        assert_eq!(array.len(), array.read_untyped().count());
    }

    #[test]
    fn own_backing_rewrite_skips_reset_policy() {
        let config = BridgeConfig::new().with_rejection(RejectionPolicy::ResetToEmpty);
        let mut array = TypedArray::with_config(vec![1i64, 2], config);
        let backing = array.read_untyped();
        backing.append(Variant::from("junk"));

        assert!(array.write_untyped(array.read_untyped()).is_err());
        assert_eq!(&*array.read_native(), &[1, 2]);
        assert!(array.read_untyped().ptr_eq(&backing));
    }

    #[test]
    fn reset_policy_replaces_backing() {
        let config = BridgeConfig::new().with_rejection(RejectionPolicy::ResetToEmpty);
        let mut array = TypedArray::with_config(vec![1i64], config);
        let before = array.read_untyped();
        assert!(array.write_untyped(VariantArray::untyped()).is_err());
        assert!(array.is_empty());
        assert!(array.read_untyped().is_typed());
        assert!(!array.read_untyped().ptr_eq(&before));
    }
}
