//! Own host records on behalf of foreign callers.
//!
//! A [`Handle`] is a pointer-sized token. The low 32 bits select a slot in the registry arena (offset by one, so
//! that `0` is never a valid handle) and the high 32 bits carry the slot's generation. Releasing a slot bumps its
//! generation, so a handle that outlives its record is detected as stale instead of aliasing whatever record
//! reuses the slot.
//!
//! Generated code only uses the free functions of this module, which operate on one process-wide registry.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::errors::HandleError;

/// Opaque token standing in for a host-owned record.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Handle(u64);

impl Handle {
    /// The handle that never resolves.
    pub const NULL: Handle = Handle(0);

    fn new(index: u32, generation: u32) -> Self {
        Handle((u64::from(generation) << 32) | u64::from(index + 1))
    }

    /// Rebuild a handle from the raw value a foreign caller held.
    pub const fn from_raw(raw: u64) -> Self {
        Handle(raw)
    }

    pub const fn into_raw(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Slot index, or `None` for the null handle.
    fn index(self) -> Option<usize> {
        let low = (self.0 & u64::from(u32::MAX)) as usize;
        low.checked_sub(1)
    }

    fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:#018x}", self.0)
    }
}

struct Entry {
    type_name: &'static str,
    value: Box<dyn Any + Send>,
}

#[derive(Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Arena of records addressed by generation-checked handles.
#[derive(Default)]
pub struct HandleRegistry {
    slots: Vec<Slot>,
    /// Indices of empty slots, reused LIFO.
    free: Vec<u32>,
    live: usize,
}

impl HandleRegistry {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Move `value` into the registry and return the handle that now owns it.
    ///
    /// ## Panics
    ///
    /// - If more than `u32::MAX - 1` slots would be needed.
    pub fn insert<T: Any + Send>(&mut self, value: T) -> Handle {
        let entry = Entry {
            type_name: type_name::<T>(),
            value: Box::new(value),
        };
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = u32::try_from(self.slots.len())
                    .ok()
                    .filter(|i| *i < u32::MAX)
                    .unwrap_or_else(|| crate::raise("handle registry exhausted"));
                self.slots.push(Slot::default());
                index
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.entry = Some(entry);
        self.live += 1;
        Handle::new(index, slot.generation)
    }

    /// Whether `handle` currently resolves to a record (of any type).
    pub fn contains(&self, handle: Handle) -> bool {
        self.entry(handle).is_ok()
    }

    /// Borrow the record behind `handle` as a `T`.
    pub fn get<T: Any>(&self, handle: Handle) -> Result<&T, HandleError> {
        let entry = self.entry(handle)?;
        let found = entry.type_name;
        entry.value.downcast_ref::<T>().ok_or(HandleError::TypeMismatch {
            handle,
            expected: type_name::<T>(),
            found,
        })
    }

    /// Mutably borrow the record behind `handle` as a `T`.
    pub fn get_mut<T: Any>(&mut self, handle: Handle) -> Result<&mut T, HandleError> {
        let entry = self.entry_mut(handle)?;
        let found = entry.type_name;
        entry.value.downcast_mut::<T>().ok_or(HandleError::TypeMismatch {
            handle,
            expected: type_name::<T>(),
            found,
        })
    }

    /// Drop the record behind `handle`, whatever its type.
    pub fn remove(&mut self, handle: Handle) -> Result<(), HandleError> {
        self.entry(handle)?;
        self.vacate(handle);
        Ok(())
    }

    /// Move the record behind `handle` out of the registry.
    ///
    /// On a type mismatch the record stays where it is.
    pub fn take<T: Any>(&mut self, handle: Handle) -> Result<T, HandleError> {
        self.get::<T>(handle)?;
        let entry = self.vacate(handle).ok_or(HandleError::Stale(handle))?;
        entry
            .value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| HandleError::TypeMismatch {
                handle,
                expected: type_name::<T>(),
                found: entry.type_name,
            })
    }

    /// Empty the slot of an already validated handle and retire its generation.
    ///
    /// The slot goes back on the free list unless its generation is `u32::MAX`.
    fn vacate(&mut self, handle: Handle) -> Option<Entry> {
        let index = handle.index()?;
        let slot = self.slots.get_mut(index)?;
        let entry = slot.entry.take()?;
        self.live -= 1;
        // a slot whose generations are used up stays empty for good
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            // index came from a u32 when the handle was minted
            self.free.push(index as u32);
        }
        Some(entry)
    }

    fn entry(&self, handle: Handle) -> Result<&Entry, HandleError> {
        let index = handle.index().ok_or(HandleError::Null)?;
        let slot = self.slots.get(index).ok_or(HandleError::Unknown(handle))?;
        if slot.generation != handle.generation() {
            return Err(HandleError::Stale(handle));
        }
        slot.entry.as_ref().ok_or(HandleError::Stale(handle))
    }

    fn entry_mut(&mut self, handle: Handle) -> Result<&mut Entry, HandleError> {
        let index = handle.index().ok_or(HandleError::Null)?;
        let slot = self.slots.get_mut(index).ok_or(HandleError::Unknown(handle))?;
        if slot.generation != handle.generation() {
            return Err(HandleError::Stale(handle));
        }
        slot.entry.as_mut().ok_or(HandleError::Stale(handle))
    }
}

// ============================================================================
// Process-wide registry used by generated wrappers
// ============================================================================

static REGISTRY: Mutex<HandleRegistry> = Mutex::new(HandleRegistry::new());

fn registry() -> MutexGuard<'static, HandleRegistry> {
    // A panic while the lock was held cannot leave a slot half-written.
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Register a record and return its handle.
pub fn insert<T: Any + Send>(value: T) -> Handle {
    let handle = registry().insert(value);
    tracing::trace!(%handle, ty = type_name::<T>(), "registered record");
    handle
}

/// Run `f` against the record behind `handle`.
///
/// The registry stays locked while `f` runs, so `f` must not call back into this module.
pub fn with<T: Any, R>(handle: Handle, f: impl FnOnce(&T) -> R) -> Result<R, HandleError> {
    let registry = registry();
    registry.get::<T>(handle).map(f)
}

/// Run `f` against the record behind `handle`, mutably. Same locking rule as [`with`].
pub fn with_mut<T: Any, R>(handle: Handle, f: impl FnOnce(&mut T) -> R) -> Result<R, HandleError> {
    let mut registry = registry();
    registry.get_mut::<T>(handle).map(f)
}

/// Clone the record behind `handle`; the handle stays valid.
pub fn cloned<T: Any + Clone>(handle: Handle) -> Result<T, HandleError> {
    with(handle, T::clone)
}

/// Move the record behind `handle` out of the registry.
pub fn take<T: Any>(handle: Handle) -> Result<T, HandleError> {
    registry().take::<T>(handle)
}

/// Drop the record behind `handle`.
pub fn release(handle: Handle) -> Result<(), HandleError> {
    registry().remove(handle)?;
    tracing::trace!(%handle, "released record");
    Ok(())
}

/// Whether `handle` currently resolves.
pub fn is_live(handle: Handle) -> bool {
    registry().contains(handle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Point {
        x: f64,
        y: f64,
    }

    #[test]
    fn test_null_handle_never_resolves() {
        let registry = HandleRegistry::new();
        assert!(Handle::NULL.is_null());
        assert_eq!(registry.get::<Point>(Handle::NULL).unwrap_err(), HandleError::Null);
    }

    #[test]
    fn test_insert_then_get() {
        let mut registry = HandleRegistry::new();
        let h = registry.insert(Point { x: 1.0, y: 2.0 });
        assert!(!h.is_null());
        assert_eq!(registry.get::<Point>(h).unwrap(), &Point { x: 1.0, y: 2.0 });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_mut_updates_record() {
        let mut registry = HandleRegistry::new();
        let h = registry.insert(Point::default());
        registry.get_mut::<Point>(h).unwrap().x = 4.5;
        assert_eq!(registry.get::<Point>(h).unwrap().x, 4.5);
    }

    #[test]
    fn test_unknown_handle() {
        let registry = HandleRegistry::new();
        let forged = Handle::from_raw(7);
        assert_eq!(registry.get::<Point>(forged).unwrap_err(), HandleError::Unknown(forged));
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let mut registry = HandleRegistry::new();
        let h = registry.insert(42_i64);
        match registry.get::<Point>(h) {
            Err(HandleError::TypeMismatch { expected, found, .. }) => {
                assert!(expected.ends_with("Point"));
                assert_eq!(found, "i64");
            }
            other => panic!("expected type mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_removed_handle_is_stale() {
        let mut registry = HandleRegistry::new();
        let h = registry.insert(Point::default());
        registry.remove(h).unwrap();
        assert_eq!(registry.get::<Point>(h).unwrap_err(), HandleError::Stale(h));
        assert_eq!(registry.remove(h).unwrap_err(), HandleError::Stale(h));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reused_slot_does_not_revive_old_handle() {
        let mut registry = HandleRegistry::new();
        let old = registry.insert(Point { x: 1.0, y: 1.0 });
        registry.remove(old).unwrap();
        let new = registry.insert(Point { x: 2.0, y: 2.0 });
        assert_ne!(old, new);
        assert_eq!(old.index(), new.index());
        assert_eq!(registry.get::<Point>(old).unwrap_err(), HandleError::Stale(old));
        assert_eq!(registry.get::<Point>(new).unwrap().x, 2.0);
    }

    #[test]
    fn test_exhausted_slot_is_never_reused() {
        let mut registry = HandleRegistry::new();
        let first = registry.insert(Point::default());
        registry.remove(first).unwrap();
        registry.slots[0].generation = u32::MAX - 1;

        let penultimate = registry.insert(Point::default());
        registry.remove(penultimate).unwrap();
        let last = registry.insert(Point::default());
        assert_eq!(last.index(), Some(0));
        assert_eq!(last.generation(), u32::MAX);
        registry.remove(last).unwrap();

        let fresh = registry.insert(Point::default());
        assert_eq!(fresh.index(), Some(1));
        for old in [first, penultimate, last] {
            assert_eq!(registry.get::<Point>(old).unwrap_err(), HandleError::Stale(old));
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_take_moves_record_out() {
        let mut registry = HandleRegistry::new();
        let h = registry.insert(String::from("moved"));
        assert_eq!(registry.take::<String>(h).unwrap(), "moved");
        assert!(!registry.contains(h));
    }

    #[test]
    fn test_take_with_wrong_type_keeps_record() {
        let mut registry = HandleRegistry::new();
        let h = registry.insert(String::from("kept"));
        assert!(registry.take::<Point>(h).is_err());
        assert_eq!(registry.get::<String>(h).unwrap(), "kept");
    }

    #[test]
    fn test_global_round_trip() {
        let h = insert(Point { x: 3.0, y: 4.0 });
        assert_eq!(with(h, |p: &Point| p.x + p.y).unwrap(), 7.0);
        with_mut(h, |p: &mut Point| p.y = 0.0).unwrap();
        assert_eq!(cloned::<Point>(h).unwrap(), Point { x: 3.0, y: 0.0 });
        release(h).unwrap();
        assert!(!is_live(h));
        assert!(take::<Point>(h).is_err());
    }
}
