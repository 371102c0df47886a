//! The engine's untyped dynamic array.
//!
//! [`VariantArray`] is a shared handle: cloning it aliases the same container,
//! exactly like handing the engine a reference-counted array. An array may
//! carry a [`TypeTag`], in which case it is "typed". The container does not
//! enforce its tag on plain [`append`](VariantArray::append) or
//! [`set`](VariantArray::set), matching engines that only check at the
//! boundary; [`try_append`](VariantArray::try_append) is the checked form.
//!
//! Every mutation bumps a revision counter. Views derived from the array use
//! it to tell whether they are stale.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{BridgeError, TypeTag, Variant};

struct ArrayInner {
    tag: Option<TypeTag>,
    items: Vec<Variant>,
    revision: u64,
}

impl ArrayInner {
    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Shared, optionally typed, ordered sequence of [`Variant`]s.
#[derive(Clone)]
pub struct VariantArray(Rc<RefCell<ArrayInner>>);

impl VariantArray {
    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    fn with_parts(tag: Option<TypeTag>, items: Vec<Variant>) -> Self {
        Self(Rc::new(RefCell::new(ArrayInner {
            tag,
            items,
            revision: 0,
        })))
    }

    /// A new, zero-length array typed with `tag`.
    pub fn empty(tag: TypeTag) -> Self {
        Self::with_parts(Some(tag), Vec::new())
    }

    /// A new, zero-length array with no type tag.
    pub fn untyped() -> Self {
        Self::with_parts(None, Vec::new())
    }

    /// An array holding `items`, typed with `tag` when given.
    ///
    /// Items are stored as given; the tag is not checked against them.
    pub fn from_variants(tag: Option<TypeTag>, items: Vec<Variant>) -> Self {
        Self::with_parts(tag, items)
    }

    /// A copy with the same tag and elements but a new identity.
    pub fn duplicate(&self) -> Self {
        let inner = self.0.borrow();
        Self::with_parts(inner.tag, inner.items.clone())
    }

    // =========================================================================
    // TYPE TAG
    // =========================================================================

    pub fn tag(&self) -> Option<TypeTag> {
        self.0.borrow().tag
    }

    pub fn is_typed(&self) -> bool {
        self.0.borrow().tag.is_some()
    }

    /// Whether both arrays carry equal tags (or both carry none).
    pub fn is_same_typed(&self, other: &VariantArray) -> bool {
        self.tag() == other.tag()
    }

    // =========================================================================
    // SIZE
    // =========================================================================

    pub fn count(&self) -> usize {
        self.0.borrow().items.len()
    }

    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    // =========================================================================
    // ELEMENT ACCESS
    // =========================================================================

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Result<Variant, BridgeError> {
        let inner = self.0.borrow();
        inner
            .items
            .get(index)
            .cloned()
            .ok_or(BridgeError::IndexOutOfRange {
                index,
                len: inner.items.len(),
            })
    }

    /// Element at `index`, or `Nil` when out of range.
    pub fn at(&self, index: usize) -> Variant {
        self.get(index).unwrap_or_default()
    }

    /// Replace the element at `index`.
    pub fn set(&self, index: usize, value: Variant) -> Result<(), BridgeError> {
        let mut inner = self.0.borrow_mut();
        let len = inner.items.len();
        let slot = inner
            .items
            .get_mut(index)
            .ok_or(BridgeError::IndexOutOfRange { index, len })?;
        *slot = value;
        inner.touch();
        Ok(())
    }

    /// First index whose element satisfies `predicate`.
    pub fn position(&self, predicate: impl FnMut(&Variant) -> bool) -> Option<usize> {
        self.0.borrow().items.iter().position(predicate)
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Append without checking the tag.
    pub fn append(&self, value: Variant) {
        let mut inner = self.0.borrow_mut();
        inner.items.push(value);
        inner.touch();
    }

    /// Append after checking `value` against the tag, if any.
    pub fn try_append(&self, value: Variant) -> Result<(), BridgeError> {
        if let Some(tag) = self.tag()
            && !tag.accepts(&value)
        {
            return Err(BridgeError::ElementRejected {
                expected: tag,
                actual: value.type_name(),
            });
        }
        self.append(value);
        Ok(())
    }

    /// Insert at `index`, shifting later elements. `index == count` appends.
    pub fn insert(&self, index: usize, value: Variant) -> Result<(), BridgeError> {
        let mut inner = self.0.borrow_mut();
        let len = inner.items.len();
        if index > len {
            return Err(BridgeError::IndexOutOfRange { index, len });
        }
        inner.items.insert(index, value);
        inner.touch();
        Ok(())
    }

    /// Remove and return the element at `index`.
    pub fn remove_at(&self, index: usize) -> Result<Variant, BridgeError> {
        let mut inner = self.0.borrow_mut();
        let len = inner.items.len();
        if index >= len {
            return Err(BridgeError::IndexOutOfRange { index, len });
        }
        let value = inner.items.remove(index);
        inner.touch();
        Ok(value)
    }

    pub fn clear(&self) {
        let mut inner = self.0.borrow_mut();
        inner.items.clear();
        inner.touch();
    }

    // =========================================================================
    // BULK
    // =========================================================================

    /// Whether every element satisfies `predicate`. Stops at the first failure;
    /// `true` for an empty array.
    pub fn all_satisfy(&self, predicate: impl FnMut(&Variant) -> bool) -> bool {
        self.0.borrow().items.iter().all(predicate)
    }

    /// Convert every element with `f`, dropping those that yield `None`.
    /// Order is preserved.
    pub fn compact_map<T>(&self, f: impl FnMut(&Variant) -> Option<T>) -> Vec<T> {
        self.0.borrow().items.iter().filter_map(f).collect()
    }

    /// Snapshot of the elements.
    pub fn to_vec(&self) -> Vec<Variant> {
        self.0.borrow().items.clone()
    }

    /// Iterate over a snapshot of the elements.
    ///
    /// Mutating the array while iterating does not affect the iteration.
    pub fn iter(&self) -> std::vec::IntoIter<Variant> {
        self.to_vec().into_iter()
    }

    // =========================================================================
    // IDENTITY
    // =========================================================================

    /// Whether both handles refer to the same container.
    pub fn ptr_eq(&self, other: &VariantArray) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of handles sharing this container.
    pub fn reference_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Mutation counter. Changes whenever the contents change.
    pub fn revision(&self) -> u64 {
        self.0.borrow().revision
    }
}

impl Default for VariantArray {
    fn default() -> Self {
        Self::untyped()
    }
}

impl PartialEq for VariantArray {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.borrow().items == other.0.borrow().items
    }
}

impl FromIterator<Variant> for VariantArray {
    fn from_iter<I: IntoIterator<Item = Variant>>(iter: I) -> Self {
        Self::with_parts(None, iter.into_iter().collect())
    }
}

impl fmt::Debug for VariantArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        let mut s = f.debug_struct("VariantArray");
        s.field("count", &inner.items.len());
        match inner.tag {
            Some(tag) => s.field("typed", &format_args!("{}", tag)),
            None => s.field("typed", &false),
        };
        s.field("elements", &inner.items).finish()
    }
}
