// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene evaluation and change tracking.
//!
//! Evaluation follows a drain-recompute pattern for each dirty channel:
//!
//! 1. **VISIBILITY**: Drain dirty indices in parent-before-child order and
//!    recompute `effective_visible` as `parent_effective_visible && active`.
//!    The root is visible whenever it is active; detached nodes never are.
//! 2. **ORDER** / **FRAME**: Drain dirty indices (no recomputation;
//!    presenters read the current values from the store).
//! 3. **TOPOLOGY**: Drain and discard (the traversal order was already
//!    rebuilt at the start of evaluation if needed).
//!
//! [`SceneChanges`] uses raw slot indices (`u32`) rather than [`NodeId`]
//! handles so that presenters can index directly into the store's SoA
//! arrays via the `*_at()` accessors.
//!
//! [`NodeId`]: super::NodeId

use alloc::vec::Vec;

use super::id::INVALID;
use super::store::NodeStore;
use crate::dirty;

/// The set of changes produced by a single [`NodeStore::evaluate`] call.
#[derive(Clone, Debug, Default)]
pub struct SceneChanges {
    /// Nodes that transitioned from hidden to effectively visible.
    pub shown: Vec<u32>,
    /// Nodes that transitioned from visible to effectively hidden.
    pub hidden: Vec<u32>,
    /// Nodes whose sibling order changed.
    pub reordered: Vec<u32>,
    /// Nodes whose frame or scale changed.
    pub resized: Vec<u32>,
    /// Nodes added since the last evaluate.
    pub added: Vec<u32>,
    /// Nodes removed since the last evaluate.
    pub removed: Vec<u32>,
    /// Whether the tree topology changed (traversal order was rebuilt).
    pub topology_changed: bool,
}

impl SceneChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.shown.clear();
        self.hidden.clear();
        self.reordered.clear();
        self.resized.clear();
        self.added.clear();
        self.removed.clear();
        self.topology_changed = false;
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
            && self.hidden.is_empty()
            && self.reordered.is_empty()
            && self.resized.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && !self.topology_changed
    }
}

impl NodeStore {
    /// Evaluates the scene, recomputing effective visibility and returning
    /// the set of changes.
    pub fn evaluate(&mut self) -> SceneChanges {
        let mut changes = SceneChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn evaluate_into(&mut self, changes: &mut SceneChanges) {
        changes.clear();

        if self.traversal_dirty {
            self.rebuild_traversal_order();
            changes.topology_changed = true;
            self.traversal_dirty = false;
        }

        let dirty_visibility: Vec<u32> = self
            .dirty
            .drain(dirty::VISIBILITY)
            .affected()
            .deterministic()
            .run()
            .collect();
        for idx in dirty_visibility {
            if self.free_list.contains(&idx) {
                continue;
            }
            let parent_idx = self.parent[idx as usize];
            let parent_visible = if parent_idx != INVALID {
                self.effective_visible[parent_idx as usize]
            } else {
                idx == self.root.idx
            };
            let new_visible = parent_visible && self.active[idx as usize];
            if new_visible != self.effective_visible[idx as usize] {
                if new_visible {
                    changes.shown.push(idx);
                } else {
                    changes.hidden.push(idx);
                }
                self.effective_visible[idx as usize] = new_visible;
            }
        }

        changes.reordered = self
            .dirty
            .drain(dirty::ORDER)
            .deterministic()
            .run()
            .collect();

        changes.resized = self
            .dirty
            .drain(dirty::FRAME)
            .deterministic()
            .run()
            .collect();

        let _: Vec<u32> = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_added, &mut changes.added);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
    }

    /// Returns the current paint order (depth-first pre-order from the root,
    /// back to front).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    fn rebuild_traversal_order(&mut self) {
        self.traversal_order.clear();
        self.dfs_collect(self.root.idx);
    }

    fn dfs_collect(&mut self, idx: u32) {
        self.traversal_order.push(idx);
        let mut child = self.first_child[idx as usize];
        while child != INVALID {
            self.dfs_collect(child);
            child = self.next_sibling[child as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;

    fn store() -> NodeStore {
        NodeStore::new(Size::new(100.0, 100.0))
    }

    #[test]
    fn attaching_shows_subtree() {
        let mut s = store();
        let _ = s.evaluate();
        let root = s.root();
        let layer = s.create_node("layer");
        let view = s.create_node("view");
        s.add_child(layer, view);
        s.add_child(root, layer);

        let changes = s.evaluate();
        assert!(changes.shown.contains(&layer.idx));
        assert!(changes.shown.contains(&view.idx));
        assert!(s.effective_visible_at(view.idx));
        assert_eq!(changes.added.len(), 2);
    }

    #[test]
    fn deactivating_hides_descendants() {
        let mut s = store();
        let root = s.root();
        let layer = s.create_node("layer");
        let view = s.create_node("view");
        s.add_child(root, layer);
        s.add_child(layer, view);
        let _ = s.evaluate();

        s.set_active(layer, false);
        let changes = s.evaluate();
        assert!(changes.hidden.contains(&layer.idx));
        assert!(
            changes.hidden.contains(&view.idx),
            "hidden state propagates to descendants"
        );
    }

    #[test]
    fn no_change_evaluate_returns_empty() {
        let mut s = store();
        let _ = s.evaluate();
        let changes = s.evaluate();
        assert!(changes.is_empty());
    }

    #[test]
    fn traversal_order_is_paint_order() {
        let mut s = store();
        let root = s.root();
        let back = s.create_node("back");
        let front = s.create_node("front");
        let inner = s.create_node("inner");
        s.set_order(back, 1);
        s.set_order(front, 2);
        s.add_child(root, front);
        s.add_child(root, back);
        s.add_child(back, inner);

        let _ = s.evaluate();
        assert_eq!(
            s.traversal_order(),
            &[root.idx, back.idx, inner.idx, front.idx]
        );
    }

    #[test]
    fn removed_nodes_are_reported() {
        let mut s = store();
        let root = s.root();
        let view = s.create_node("view");
        s.add_child(root, view);
        let _ = s.evaluate();

        s.destroy_subtree(view);
        let changes = s.evaluate();
        assert_eq!(changes.removed, &[view.idx]);
        assert!(changes.topology_changed);
    }

    #[test]
    fn reorder_and_resize_are_local() {
        let mut s = store();
        let root = s.root();
        let view = s.create_node("view");
        s.add_child(root, view);
        let _ = s.evaluate();

        s.set_order(view, 5);
        s.set_scale(view, 0.5);
        let changes = s.evaluate();
        assert_eq!(changes.reordered, &[view.idx]);
        assert_eq!(changes.resized, &[view.idx]);
    }
}
