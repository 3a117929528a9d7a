//! Generational Arena
//!
//! Typed generational arena backing the page's node storage.
//! An [`Id<T>`] can only index an `Arena<T>`, and a stale id (one whose slot
//! was freed and reused) is detected by its generation and yields `None`.

#![forbid(unsafe_code)]

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

// ─────────────────────────────────────────────────────────────────────────────
// Id
// ─────────────────────────────────────────────────────────────────────────────

/// Handle into an `Arena<T>`.
pub struct Id<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot position inside the arena.
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

// Manual impls: deriving would put bounds on `T`.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({}v{})", self.index, self.generation)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Arena
// ─────────────────────────────────────────────────────────────────────────────

struct Slot<T> {
    generation: u32,
    value: Option<T>,
    next_free: Option<u32>,
}

pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Store `value` and return its handle, reusing a freed slot if possible.
    pub fn insert(&mut self, value: T) -> Id<T> {
        self.len += 1;
        match self.free_head {
            Some(i) => {
                let slot = &mut self.slots[i as usize];
                self.free_head = slot.next_free.take();
                slot.value = Some(value);
                Id::new(i, slot.generation)
            }
            None => {
                let i = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                    next_free: None,
                });
                Id::new(i, 0)
            }
        }
    }

    pub fn get(&self, id: Id<T>) -> Option<&T> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, id: Id<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Free the slot behind `id`. Every outstanding copy of `id` goes stale.
    pub fn remove(&mut self, id: Id<T>) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = self.free_head;
        self.free_head = Some(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn contains(&self, id: Id<T>) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Id<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value
                .as_ref()
                .map(|v| (Id::new(i as u32, slot.generation), v))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get() {
        let mut arena = Arena::new();
        let id = arena.insert("header");
        assert_eq!(arena.get(id), Some(&"header"));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn stale_id_after_reuse() {
        let mut arena = Arena::new();
        let old = arena.insert(10);
        assert_eq!(arena.remove(old), Some(10));
        let new = arena.insert(20);
        assert_eq!(old.index(), new.index());
        assert_ne!(old.generation(), new.generation());
        assert_eq!(arena.get(old), None);
        assert_eq!(arena.get(new), Some(&20));
    }

    #[test]
    fn free_list_is_lifo() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        let _c = arena.insert(3);
        arena.remove(b);
        arena.remove(a);
        assert_eq!(arena.insert(4).index(), a.index());
        assert_eq!(arena.insert(5).index(), b.index());
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn double_remove_is_none() {
        let mut arena = Arena::new();
        let id = arena.insert(42);
        assert_eq!(arena.remove(id), Some(42));
        assert_eq!(arena.remove(id), None);
        assert!(!arena.contains(id));
        assert!(arena.is_empty());
    }

    #[test]
    fn iter_skips_freed_slots() {
        let mut arena = Arena::new();
        arena.insert(10);
        let b = arena.insert(20);
        arena.insert(30);
        arena.remove(b);
        let values: Vec<i32> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![10, 30]);
    }

    #[test]
    fn get_mut_modifies_in_place() {
        let mut arena = Arena::new();
        let id = arena.insert(vec!["loading".to_string()]);
        arena.get_mut(id).unwrap().push("loaded".to_string());
        assert_eq!(arena.get(id).unwrap().len(), 2);
    }

    #[test]
    fn generation_wraps() {
        let mut arena: Arena<i32> = Arena::new();
        arena.slots.push(Slot {
            generation: u32::MAX,
            value: Some(1),
            next_free: None,
        });
        arena.len = 1;
        arena.remove(Id::new(0, u32::MAX));
        let id = arena.insert(99);
        assert_eq!(id.generation(), 0);
        assert_eq!(arena.get(id), Some(&99));
    }
}
