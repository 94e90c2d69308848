//! Translation from source positions to filtered positions.
//!
//! One slot per source element: `Some(k)` if the element is currently
//! shown at position `k` of the filtered view, `None` otherwise.
//! The `Some` entries, read left to right, are always exactly `0, 1, .., count - 1`.
//!
//! New filtered positions are found by scanning backwards for the nearest
//! passing element, and every edit shifts the slots behind it, so each
//! operation is `O(n)` in the worst case.

use crate::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexTable {
    slots: Vec<Option<usize>>,
    count: usize,
}

impl IndexTable {
    pub fn new() -> Self {
        IndexTable::default()
    }

    /// Builds the table in one pass from per-element predicate results.
    pub fn from_flags(flags: impl IntoIterator<Item = bool>) -> Self {
        let mut count = 0;
        let slots = flags
            .into_iter()
            .map(|passes| {
                passes.then(|| {
                    count += 1;
                    count - 1
                })
            })
            .collect();

        IndexTable { slots, count }
    }

    /// Number of source slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of passing slots, i.e. the length of the filtered view.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn get(&self, src_idx: usize) -> Option<usize> {
        self.slots.get(src_idx).copied().flatten()
    }

    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }

    /// Filtered position of the closest passing slot left of `src_idx`.
    pub fn nearest_preceding(&self, src_idx: usize) -> Option<usize> {
        self.slots[..src_idx].iter().rev().find_map(|slot| *slot)
    }

    pub fn insert_slot(&mut self, src_idx: usize) {
        self.slots.insert(src_idx, None);
    }

    /// Drops the slot, returning the filtered position it held.
    pub fn remove_slot(&mut self, src_idx: usize) -> Option<usize> {
        let idx = self.disappear(src_idx);
        self.slots.remove(src_idx);
        idx
    }

    /// Marks a non-passing slot as passing and returns its new filtered position.
    pub fn appear(&mut self, src_idx: usize) -> usize {
        debug_assert!(self.slots[src_idx].is_none());

        let idx = self.nearest_preceding(src_idx).map_or(0, |p| p + 1);
        self.slots[src_idx] = Some(idx);
        for k in self.slots[src_idx + 1..].iter_mut().flatten() {
            *k += 1;
        }
        self.count += 1;
        idx
    }

    /// Marks the slot as not passing, returning the filtered position it held.
    pub fn disappear(&mut self, src_idx: usize) -> Option<usize> {
        let idx = self.slots[src_idx].take()?;
        for k in self.slots[src_idx + 1..].iter_mut().flatten() {
            *k -= 1;
        }
        self.count -= 1;
        Some(idx)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.count = 0;
    }

    /// Verifies that the passing slots enumerate `0..count` in order.
    pub fn check(&self) -> Result<()> {
        let mut expected = 0;
        for (src_idx, slot) in self.slots.iter().enumerate() {
            if let Some(idx) = slot {
                if *idx != expected {
                    return Err(Error::invariant(format!(
                        "source slot {src_idx} maps to {idx}, expected {expected}"
                    )));
                }
                expected += 1;
            }
        }

        if expected != self.count {
            return Err(Error::invariant(format!(
                "{expected} passing slots but count is {}",
                self.count
            )));
        }
        Ok(())
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
