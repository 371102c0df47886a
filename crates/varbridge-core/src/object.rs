//! Engine objects and their reference counts.
//!
//! An [`ObjectRef`] is the shared identity of one engine object. Clones alias
//! the same object; they do not touch its engine reference count. The count is
//! only moved through the [`RefCounting`] capability, which is a no-op for
//! classes that do not derive from [`RefCounted`](crate::RefCounted).
//!
//! [`ObjectHeap`] is the engine's instance table. It hands out generational
//! [`InstanceId`]s so that an id captured before a slot was reclaimed never
//! resolves to the slot's next occupant.

use std::any::Any as StdAny;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::{Class, ClassInfo, ConversionError, Object};

/// Reference-counting capability of engine objects.
pub trait RefCounting {
    /// Take one engine reference. Returns `false` (and does nothing) for
    /// objects that are not reference counted or already freed.
    fn reference(&self) -> bool;

    /// Drop one engine reference. Returns `true` if this freed the object.
    fn unreference(&self) -> bool;

    /// Current engine reference count, `None` when not applicable.
    fn reference_count(&self) -> Option<u32>;
}

/// Generational id of an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId {
    pub index: u32,
    pub generation: u32,
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.generation)
    }
}

struct ObjectCell {
    id: InstanceId,
    class: &'static ClassInfo,
    refs: Cell<u32>,
    alive: Cell<bool>,
    value: RefCell<Option<Box<dyn StdAny>>>,
}

/// Shared handle to one engine object. Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Rc<ObjectCell>);

impl ObjectRef {
    fn new(id: InstanceId, class: &'static ClassInfo, value: Box<dyn StdAny>) -> Self {
        let refs = if class.is_refcounted() { 1 } else { 0 };
        Self(Rc::new(ObjectCell {
            id,
            class,
            refs: Cell::new(refs),
            alive: Cell::new(true),
            value: RefCell::new(Some(value)),
        }))
    }

    pub fn instance_id(&self) -> InstanceId {
        self.0.id
    }

    /// Most-derived class of the object.
    pub fn class(&self) -> &'static ClassInfo {
        self.0.class
    }

    pub fn is_alive(&self) -> bool {
        self.0.alive.get()
    }

    /// Whether the object is an instance of `class` or one of its subclasses.
    pub fn is_instance_of(&self, class: &ClassInfo) -> bool {
        self.0.class.inherits(class)
    }

    /// Run `f` on the native payload.
    ///
    /// `None` if the object was freed or its payload is already borrowed.
    pub fn with_payload_mut<R>(&self, f: impl FnOnce(&mut dyn StdAny) -> R) -> Option<R> {
        let mut value = self.0.value.try_borrow_mut().ok()?;
        value.as_deref_mut().map(f)
    }

    pub(crate) fn free(&self) {
        if self.0.alive.replace(false) {
            log::trace!("freeing {:?}", self);
            self.0.refs.set(0);
            // A live borrow keeps the payload until it ends; the object is dead either way.
            if let Ok(mut value) = self.0.value.try_borrow_mut() {
                value.take();
            }
        }
    }
}

impl RefCounting for ObjectRef {
    fn reference(&self) -> bool {
        if !self.0.class.is_refcounted() || !self.is_alive() {
            return false;
        }
        self.0.refs.set(self.0.refs.get().saturating_add(1));
        true
    }

    fn unreference(&self) -> bool {
        if !self.0.class.is_refcounted() || !self.is_alive() {
            return false;
        }
        let refs = self.0.refs.get().saturating_sub(1);
        self.0.refs.set(refs);
        if refs == 0 {
            self.free();
            return true;
        }
        false
    }

    fn reference_count(&self) -> Option<u32> {
        (self.0.class.is_refcounted() && self.is_alive()).then(|| self.0.refs.get())
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.0.class.name(), self.0.id)?;
        if !self.is_alive() {
            f.write_str(" (freed)")?;
        }
        Ok(())
    }
}

/// Typed handle to an engine object of class `C` or a subclass.
pub struct Gd<C: Class> {
    object: ObjectRef,
    _class: PhantomData<fn() -> C>,
}

impl<C: Class> Gd<C> {
    /// Wrap `object` if it is a live instance of `C`.
    pub fn from_object(object: ObjectRef) -> Result<Self, ConversionError> {
        if !object.is_alive() {
            return Err(ConversionError::FreedObject {
                class: object.class().name(),
            });
        }
        if !object.is_instance_of(C::class_info()) {
            return Err(ConversionError::ClassMismatch {
                expected: C::class_info().name(),
                actual: object.class().name(),
            });
        }
        Ok(Self {
            object,
            _class: PhantomData,
        })
    }

    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    pub fn into_object(self) -> ObjectRef {
        self.object
    }

    pub fn instance_id(&self) -> InstanceId {
        self.object.instance_id()
    }

    pub fn is_alive(&self) -> bool {
        self.object.is_alive()
    }

    /// View the handle as the root class.
    pub fn upcast(self) -> Gd<Object> {
        Gd {
            object: self.object,
            _class: PhantomData,
        }
    }

    /// Reinterpret the handle as class `D`, failing unless the object inherits `D`.
    pub fn try_cast<D: Class>(self) -> Result<Gd<D>, Self> {
        if self.object.is_instance_of(D::class_info()) {
            Ok(Gd {
                object: self.object,
                _class: PhantomData,
            })
        } else {
            Err(self)
        }
    }

    /// Borrow the native payload.
    ///
    /// `None` if the object was freed, is already mutably borrowed, or its
    /// concrete type is a subclass of `C` rather than `C` itself.
    pub fn try_bind(&self) -> Option<Ref<'_, C>> {
        let value = self.object.0.value.try_borrow().ok()?;
        Ref::filter_map(value, |value| value.as_deref()?.downcast_ref::<C>()).ok()
    }

    /// Mutably borrow the native payload. Same failure cases as [`try_bind`](Self::try_bind).
    pub fn try_bind_mut(&self) -> Option<RefMut<'_, C>> {
        let value = self.object.0.value.try_borrow_mut().ok()?;
        RefMut::filter_map(value, |value| value.as_deref_mut()?.downcast_mut::<C>()).ok()
    }
}

impl<C: Class> Clone for Gd<C> {
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            _class: PhantomData,
        }
    }
}

impl<C: Class> PartialEq for Gd<C> {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object
    }
}

impl<C: Class> Eq for Gd<C> {}

impl<C: Class> fmt::Debug for Gd<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gd<{}>({:?})", C::class_info().name(), self.object)
    }
}

/// Engine instance table with generational ids.
pub struct ObjectHeap {
    slots: Vec<HeapSlot>,
    free_list: Vec<u32>,
}

struct HeapSlot {
    generation: u32,
    object: Option<ObjectRef>,
}

impl ObjectHeap {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Create an instance of `C`. Reference-counted classes start with one reference.
    pub fn allocate<C: Class>(&mut self, value: C) -> Gd<C> {
        let class = C::class_info();
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                self.slots.push(HeapSlot {
                    generation: 0,
                    object: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = InstanceId {
            index,
            generation: slot.generation,
        };
        let object = ObjectRef::new(id, class, Box::new(value));
        slot.object = Some(object.clone());
        log::trace!("allocated {:?}", object);
        Gd {
            object,
            _class: PhantomData,
        }
    }

    /// Resolve a live instance. Stale or freed ids return `None`.
    pub fn get(&self, id: InstanceId) -> Option<ObjectRef> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_ref().filter(|object| object.is_alive()).cloned()
    }

    /// Free an instance immediately, regardless of its reference count.
    ///
    /// Returns `false` if `id` does not resolve to a live instance.
    pub fn free(&mut self, id: InstanceId) -> bool {
        let Some(object) = self.get(id) else {
            return false;
        };
        object.free();
        self.reclaim(id.index);
        true
    }

    /// Reclaim the slots of objects that died by reference count.
    ///
    /// Returns the number of slots reclaimed.
    pub fn sweep(&mut self) -> usize {
        let dead: Vec<u32> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.object.as_ref().is_some_and(|object| !object.is_alive()))
            .map(|(index, _)| index as u32)
            .collect();
        for &index in &dead {
            self.reclaim(index);
        }
        dead.len()
    }

    /// Number of instances still alive.
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.object.as_ref().is_some_and(ObjectRef::is_alive))
            .count()
    }

    fn reclaim(&mut self, index: u32) {
        if let Some(slot) = self.slots.get_mut(index as usize)
            && slot.object.take().is_some()
        {
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(index);
        }
    }
}

impl Default for ObjectHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHeap")
            .field("slot_count", &self.slots.len())
            .field("free_count", &self.free_list.len())
            .field("live_count", &self.live_count())
            .finish()
    }
}
