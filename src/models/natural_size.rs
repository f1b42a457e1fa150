use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::media_item::ItemKey;

/// Intrinsic pixel dimensions of a loaded media asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NaturalSize {
    pub w: u32,
    pub h: u32,
}

impl NaturalSize {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Measured natural sizes keyed by item identity.
///
/// Entries only appear once a load reports a non-empty size, so a missing
/// entry always means "not known yet". The map grows as media loads and is
/// only pruned when the item list changes.
#[derive(Debug, Default, Clone)]
pub struct NaturalSizeRegistry {
    sizes: HashMap<ItemKey, NaturalSize>,
    generation: u64,
}

impl NaturalSizeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ItemKey) -> Option<NaturalSize> {
        self.sizes.get(key).copied()
    }

    /// Records a measured size. Returns true when the stored value changed.
    ///
    /// Empty sizes are rejected so a failed or partial load can never
    /// overwrite a good measurement.
    pub fn record(&mut self, key: &ItemKey, size: NaturalSize) -> bool {
        if size.is_empty() {
            trace!(%key, ?size, "Ignoring empty natural size");
            return false;
        }
        if self.sizes.get(key) == Some(&size) {
            return false;
        }
        self.sizes.insert(key.clone(), size);
        self.generation += 1;
        true
    }

    /// Drops entries whose key is not in `keys`. Returns the number removed.
    pub fn retain_keys(&mut self, keys: &HashSet<ItemKey>) -> usize {
        let before = self.sizes.len();
        self.sizes.retain(|key, _| keys.contains(key));
        let removed = before - self.sizes.len();
        if removed > 0 {
            self.generation += 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.sizes.is_empty() {
            self.sizes.clear();
            self.generation += 1;
        }
    }

    /// Bumped on every mutation; part of the layout fingerprint.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
