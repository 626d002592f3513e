// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Counted asset handles.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

/// Bundle name under which remote assets are registered.
pub const REMOTE_BUNDLE: &str = "<remote>";

/// A handle to a loaded asset in an [`AssetRegistry`].
///
/// Generational like [`NodeId`](crate::scene::NodeId): a handle to a disposed
/// asset never aliases a later asset that reuses the slot.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl AssetId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({}@gen{})", self.idx, self.generation)
    }
}

/// The broad category of an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// A view template that can be instantiated.
    Prefab,
    /// Image data.
    Texture,
    /// Sound data.
    Audio,
    /// Structured data (tables, JSON).
    Data,
    /// Anything else.
    Other,
}

/// A loaded asset with its reference count.
pub struct Asset {
    bundle: String,
    path: String,
    kind: AssetKind,
    ref_count: u32,
    payload: Box<dyn Any>,
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("bundle", &self.bundle)
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("ref_count", &self.ref_count)
            .finish_non_exhaustive()
    }
}

impl Asset {
    /// The bundle the asset was loaded from.
    #[must_use]
    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    /// The asset's path within its bundle (or its URL for remote assets).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The asset's kind.
    #[must_use]
    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// The current reference count.
    #[must_use]
    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    /// Downcasts the payload.
    #[must_use]
    pub fn payload<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }
}

/// The outcome of dropping a reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Released {
    /// Other references remain; carries the new count.
    Retained(u32),
    /// The count reached zero and the asset was disposed.
    Disposed,
}

/// Owns every loaded asset and its reference count.
///
/// The registry is the only place that disposes assets: an asset is dropped
/// exactly when [`dec_ref`](Self::dec_ref) takes its count to zero. Freshly
/// inserted assets start at zero and stay cached until something retains and
/// then releases them.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    slots: Vec<Option<Asset>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
    by_path: BTreeMap<(String, String), AssetId>,
}

impl AssetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly loaded asset with a reference count of zero.
    pub fn insert(
        &mut self,
        bundle: &str,
        path: &str,
        kind: AssetKind,
        payload: Box<dyn Any>,
    ) -> AssetId {
        let asset = Asset {
            bundle: bundle.to_string(),
            path: path.to_string(),
            kind,
            ref_count: 0,
            payload,
        };
        let id = if let Some(idx) = self.free_list.pop() {
            self.generation[idx as usize] += 1;
            self.slots[idx as usize] = Some(asset);
            AssetId {
                idx,
                generation: self.generation[idx as usize],
            }
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Some(asset));
            self.generation.push(0);
            AssetId { idx, generation: 0 }
        };
        self.by_path
            .insert((bundle.to_string(), path.to_string()), id);
        id
    }

    /// Looks up a live asset by bundle and path.
    #[must_use]
    pub fn find(&self, bundle: &str, path: &str) -> Option<AssetId> {
        let id = *self
            .by_path
            .get(&(bundle.to_string(), path.to_string()))?;
        self.is_alive(id).then_some(id)
    }

    /// Returns the asset for a live handle.
    #[must_use]
    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots[id.idx as usize].as_ref()
    }

    /// Returns whether the handle refers to a live asset.
    #[must_use]
    pub fn is_alive(&self, id: AssetId) -> bool {
        (id.idx as usize) < self.slots.len()
            && self.generation[id.idx as usize] == id.generation
            && self.slots[id.idx as usize].is_some()
    }

    /// Returns the reference count of a live asset.
    #[must_use]
    pub fn ref_count(&self, id: AssetId) -> Option<u32> {
        self.get(id).map(Asset::ref_count)
    }

    /// Returns the number of live assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Returns whether no assets are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Increments the count of a live asset and returns the new count.
    pub fn add_ref(&mut self, id: AssetId) -> Option<u32> {
        if !self.is_alive(id) {
            log::warn!("add_ref on disposed asset {id:?}");
            return None;
        }
        let asset = self.slots[id.idx as usize].as_mut()?;
        asset.ref_count += 1;
        Some(asset.ref_count)
    }

    /// Decrements the count of a live asset, disposing it at zero.
    pub fn dec_ref(&mut self, id: AssetId) -> Option<Released> {
        if !self.is_alive(id) {
            log::warn!("dec_ref on disposed asset {id:?}");
            return None;
        }
        let asset = self.slots[id.idx as usize].as_mut()?;
        asset.ref_count = asset.ref_count.saturating_sub(1);
        if asset.ref_count > 0 {
            return Some(Released::Retained(asset.ref_count));
        }
        if let Some(asset) = self.slots[id.idx as usize].take() {
            self.by_path.remove(&(asset.bundle, asset.path));
        }
        self.free_list.push(id.idx);
        Some(Released::Disposed)
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::*;

    #[test]
    fn insert_and_find() {
        let mut reg = AssetRegistry::new();
        let id = reg.insert("resources", "ui/icon", AssetKind::Texture, Box::new(7_u32));
        assert_eq!(reg.find("resources", "ui/icon"), Some(id));
        assert_eq!(reg.find("other", "ui/icon"), None);
        assert_eq!(reg.get(id).unwrap().payload::<u32>(), Some(&7));
        assert_eq!(reg.ref_count(id), Some(0));
    }

    #[test]
    fn last_release_disposes() {
        let mut reg = AssetRegistry::new();
        let id = reg.insert("resources", "a", AssetKind::Data, Box::new(()));
        assert_eq!(reg.add_ref(id), Some(1));
        assert_eq!(reg.add_ref(id), Some(2));
        assert_eq!(reg.dec_ref(id), Some(Released::Retained(1)));
        assert_eq!(reg.dec_ref(id), Some(Released::Disposed));
        assert!(!reg.is_alive(id));
        assert_eq!(reg.find("resources", "a"), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn disposed_handles_do_not_alias_reused_slots() {
        let mut reg = AssetRegistry::new();
        let a = reg.insert("resources", "a", AssetKind::Data, Box::new(()));
        reg.add_ref(a);
        reg.dec_ref(a);
        let b = reg.insert("resources", "b", AssetKind::Data, Box::new(()));
        assert_eq!(a.index(), b.index());
        assert!(!reg.is_alive(a));
        assert_eq!(reg.add_ref(a), None);
        assert_eq!(reg.ref_count(b), Some(0));
    }
}
