// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{Rect, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, NodeId};
use super::input::TapHandler;
use super::traverse::{Children, Painted};
use crate::dirty;

/// Struct-of-arrays storage for all display containers.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// The store always owns a root node sized to the viewport. Only nodes
/// attached (transitively) to the root can become visible or receive taps.
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) name: Vec<String>,
    pub(crate) order: Vec<i32>,
    pub(crate) active: Vec<bool>,
    pub(crate) frame: Vec<Rect>,
    pub(crate) stretch: Vec<bool>,
    pub(crate) scale: Vec<f64>,
    pub(crate) tap: Vec<Option<TapHandler>>,

    // -- Computed properties (written by evaluate) --
    pub(crate) effective_visible: Vec<bool>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,

    pub(crate) root: NodeId,
    pub(crate) viewport: Size,
}

impl NodeStore {
    /// Creates a store whose root node covers a viewport of the given size.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        let mut store = Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            name: Vec::new(),
            order: Vec::new(),
            active: Vec::new(),
            frame: Vec::new(),
            stretch: Vec::new(),
            scale: Vec::new(),
            tap: Vec::new(),
            effective_visible: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            root: NodeId {
                idx: INVALID,
                generation: 0,
            },
            viewport,
        };
        store.root = store.create_full_viewport("canvas");
        store
    }

    /// Returns the root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the current viewport size.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Returns the viewport as a rectangle anchored at the origin.
    #[must_use]
    pub fn viewport_rect(&self) -> Rect {
        Rect::from_origin_size((0.0, 0.0), self.viewport)
    }

    /// Resizes the viewport.
    ///
    /// Every stretch-anchored node (see
    /// [`create_full_viewport`](Self::create_full_viewport)) follows the new
    /// size.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        let rect = self.viewport_rect();
        for idx in 0..self.len {
            if self.stretch[idx as usize] && !self.free_list.contains(&idx) {
                self.frame[idx as usize] = rect;
                self.dirty.mark(idx, dirty::FRAME);
            }
        }
    }

    // -- Allocation API --

    /// Creates a new detached node and returns its handle.
    ///
    /// The node starts active, with order 0, unit scale, an empty frame, and
    /// no tap handler.
    pub fn create_node(&mut self, name: &str) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot.
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.name[i] = name.to_string();
            self.order[i] = 0;
            self.active[i] = true;
            self.frame[i] = Rect::ZERO;
            self.stretch[i] = false;
            self.scale[i] = 1.0;
            self.tap[i] = None;
            self.effective_visible[i] = false;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.name.push(name.to_string());
            self.order.push(0);
            self.active.push(true);
            self.frame.push(Rect::ZERO);
            self.stretch.push(false);
            self.scale.push(1.0);
            self.tap.push(None);
            self.effective_visible.push(false);
            self.generation.push(0);
            idx
        };

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark(idx, dirty::VISIBILITY);

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Creates a detached node that covers the whole viewport and follows it
    /// across resizes.
    pub fn create_full_viewport(&mut self, name: &str) -> NodeId {
        let id = self.create_node(name);
        self.frame[id.idx as usize] = self.viewport_rect();
        self.stretch[id.idx as usize] = true;
        id
    }

    /// Destroys a node together with all of its descendants.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or refers to the root.
    pub fn destroy_subtree(&mut self, id: NodeId) {
        self.validate(id);
        assert!(id != self.root, "cannot destroy the root node");

        if self.parent[id.idx as usize] != INVALID {
            let p = self.parent[id.idx as usize];
            self.unlink_from_parent(id.idx);
            self.dirty
                .remove_dependency(id.idx, p, dirty::VISIBILITY);
            self.dirty.mark(p, dirty::TOPOLOGY);
        }

        let mut doomed = Vec::new();
        self.collect_subtree(id.idx, &mut doomed);
        // Children first so parent links are never left dangling.
        for &idx in doomed.iter().rev() {
            self.free_slot(idx);
        }
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    // -- Topology API --

    /// Attaches `child` under `parent`.
    ///
    /// Children are kept sorted by [`order`](Self::order); among equal
    /// orders, later attachments sit in front.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );

        self.link_sorted(p, c);

        let _ = self.dirty.add_dependency(c, p, dirty::VISIBILITY);
        self.dirty.mark_with(c, dirty::VISIBILITY, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Detaches `child` from its current parent, keeping it alive.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        assert!(self.parent[c as usize] != INVALID, "node has no parent");

        let p = self.parent[c as usize];
        self.unlink_from_parent(c);

        self.dirty.remove_dependency(c, p, dirty::VISIBILITY);
        self.dirty.mark_with(c, dirty::VISIBILITY, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(p, dirty::TOPOLOGY);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p == INVALID {
            None
        } else {
            Some(NodeId {
                idx: p,
                generation: self.generation[p as usize],
            })
        }
    }

    /// Returns the direct children of a node, back to front.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::of(self, id.idx)
    }

    /// Returns the shown part of the subtree under `id` in paint order.
    #[must_use]
    pub fn painted(&self, id: NodeId) -> Painted<'_> {
        self.validate(id);
        Painted::walk(self, id.idx)
    }

    /// Returns the number of live nodes, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Property getters --

    /// Returns the diagnostic name of a node.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.validate(id);
        &self.name[id.idx as usize]
    }

    /// Returns the sibling order of a node.
    #[must_use]
    pub fn order(&self, id: NodeId) -> i32 {
        self.validate(id);
        self.order[id.idx as usize]
    }

    /// Returns the node's own active flag.
    #[must_use]
    pub fn is_active(&self, id: NodeId) -> bool {
        self.validate(id);
        self.active[id.idx as usize]
    }

    /// Returns whether the node is attached to the root and it and all of its
    /// ancestors are active.
    ///
    /// Unlike [`effective_visible_at`](Self::effective_visible_at) this walks
    /// the live tree and needs no prior [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.validate(id);
        let mut idx = id.idx;
        loop {
            if !self.active[idx as usize] {
                return false;
            }
            if idx == self.root.idx {
                return true;
            }
            idx = self.parent[idx as usize];
            if idx == INVALID {
                return false;
            }
        }
    }

    /// Returns the frame of a node.
    #[must_use]
    pub fn frame(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.frame[id.idx as usize]
    }

    /// Returns the scale of a node.
    #[must_use]
    pub fn scale(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.scale[id.idx as usize]
    }

    /// Returns the tap handler of a node.
    #[must_use]
    pub fn tap(&self, id: NodeId) -> Option<TapHandler> {
        self.validate(id);
        self.tap[id.idx as usize]
    }

    /// Finds a direct child by name.
    #[must_use]
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|&c| self.name[c.idx as usize] == name)
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the sibling order of a node, re-sorting it within its parent.
    pub fn set_order(&mut self, id: NodeId, order: i32) {
        self.validate(id);
        let idx = id.idx;
        if self.order[idx as usize] == order {
            return;
        }
        self.order[idx as usize] = order;
        let p = self.parent[idx as usize];
        if p != INVALID {
            self.unlink_from_parent(idx);
            self.link_sorted(p, idx);
            self.traversal_dirty = true;
        }
        self.dirty.mark(idx, dirty::ORDER);
    }

    /// Sets the active flag of a node.
    ///
    /// Marks the VISIBILITY channel with eager propagation to descendants.
    pub fn set_active(&mut self, id: NodeId, active: bool) {
        self.validate(id);
        if self.active[id.idx as usize] == active {
            return;
        }
        self.active[id.idx as usize] = active;
        self.dirty
            .mark_with(id.idx, dirty::VISIBILITY, &EagerPolicy);
    }

    /// Sets the frame of a node and clears its stretch anchoring.
    pub fn set_frame(&mut self, id: NodeId, frame: Rect) {
        self.validate(id);
        self.frame[id.idx as usize] = frame;
        self.stretch[id.idx as usize] = false;
        self.dirty.mark(id.idx, dirty::FRAME);
    }

    /// Sets the uniform scale of a node.
    pub fn set_scale(&mut self, id: NodeId, scale: f64) {
        self.validate(id);
        self.scale[id.idx as usize] = scale;
        self.dirty.mark(id.idx, dirty::FRAME);
    }

    /// Sets or clears the tap handler of a node.
    pub fn set_tap(&mut self, id: NodeId, tap: Option<TapHandler>) {
        self.validate(id);
        self.tap[id.idx as usize] = tap;
    }

    // -- Raw-index accessors for presenters --
    //
    // These accept raw slot indices (as found in `SceneChanges`) rather than
    // `NodeId` handles, skipping generation validation.

    /// Returns whether the node at raw slot `idx` is effectively visible.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn effective_visible_at(&self, idx: u32) -> bool {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.effective_visible[idx as usize]
    }

    /// Returns the frame at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn frame_at(&self, idx: u32) -> Rect {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.frame[idx as usize]
    }

    /// Returns the name at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn name_at(&self, idx: u32) -> &str {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        &self.name[idx as usize]
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Inserts `c` into `p`'s child list after the last sibling whose order
    /// is not greater than `c`'s.
    fn link_sorted(&mut self, p: u32, c: u32) {
        let order = self.order[c as usize];
        self.parent[c as usize] = p;

        let mut prev = INVALID;
        let mut next = self.first_child[p as usize];
        while next != INVALID && self.order[next as usize] <= order {
            prev = next;
            next = self.next_sibling[next as usize];
        }

        self.prev_sibling[c as usize] = prev;
        self.next_sibling[c as usize] = next;
        if prev == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[prev as usize] = c;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = c;
        }
    }

    /// Removes `idx` from its parent's child list without touching dirty state.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Pre-order collection of `idx` and its descendants.
    fn collect_subtree(&self, idx: u32, out: &mut Vec<u32>) {
        out.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.collect_subtree(child, out);
            child = self.next_sibling[child as usize];
        }
    }

    fn free_slot(&mut self, idx: u32) {
        let i = idx as usize;
        self.parent[i] = INVALID;
        self.first_child[i] = INVALID;
        self.next_sibling[i] = INVALID;
        self.prev_sibling[i] = INVALID;
        self.tap[i] = None;
        self.stretch[i] = false;

        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
    }
}
