// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walking the node tree.
//!
//! Sibling lists are kept sorted by draw order, so walking [`Children`]
//! forward goes back to front and walking it with `rev()` yields the topmost
//! child first. [`Painted`] visits a subtree in paint order and prunes
//! inactive branches.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

fn handle(store: &NodeStore, idx: u32) -> NodeId {
    NodeId {
        idx,
        generation: store.generation[idx as usize],
    }
}

/// The direct children of a node in draw order.
///
/// Created by [`NodeStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a NodeStore,
    front: u32,
    back: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn of(store: &'a NodeStore, parent: u32) -> Self {
        let front = store.first_child[parent as usize];
        let mut back = front;
        while back != INVALID && store.next_sibling[back as usize] != INVALID {
            back = store.next_sibling[back as usize];
        }
        Self { store, front, back }
    }

    fn take(&mut self, idx: u32, towards_back: bool) -> NodeId {
        if self.front == self.back {
            self.front = INVALID;
            self.back = INVALID;
        } else if towards_back {
            self.front = self.store.next_sibling[idx as usize];
        } else {
            self.back = self.store.prev_sibling[idx as usize];
        }
        handle(self.store, idx)
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = self.front;
        (idx != INVALID).then(|| self.take(idx, true))
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        let idx = self.back;
        (idx != INVALID).then(|| self.take(idx, false))
    }
}

/// Pre-order walk of a subtree in paint order.
///
/// Nodes that are not [active](NodeStore::is_active) are skipped together
/// with their descendants, so every yielded node is effectively shown.
/// Later nodes paint over earlier ones.
///
/// Created by [`NodeStore::painted`].
#[derive(Debug)]
pub struct Painted<'a> {
    store: &'a NodeStore,
    pending: Vec<u32>,
}

impl<'a> Painted<'a> {
    pub(crate) fn walk(store: &'a NodeStore, top: u32) -> Self {
        let mut pending = Vec::new();
        if store.active[top as usize] {
            pending.push(top);
        }
        Self { store, pending }
    }
}

impl Iterator for Painted<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = self.pending.pop()?;
        let store = self.store;
        self.pending.extend(
            Children::of(store, idx)
                .rev()
                .map(|c| c.idx)
                .filter(|&c| store.active[c as usize]),
        );
        Some(handle(store, idx))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use kurbo::Size;

    use super::*;

    fn names(store: &NodeStore, ids: impl Iterator<Item = NodeId>) -> Vec<&str> {
        ids.map(|id| store.name(id)).collect()
    }

    #[test]
    fn children_walk_both_ways() {
        let mut s = NodeStore::new(Size::new(10.0, 10.0));
        let root = s.root();
        for (name, order) in [("mid", 2), ("top", 3), ("bottom", 1)] {
            let n = s.create_node(name);
            s.set_order(n, order);
            s.add_child(root, n);
        }
        assert_eq!(names(&s, s.children(root)), ["bottom", "mid", "top"]);
        assert_eq!(names(&s, s.children(root).rev()), ["top", "mid", "bottom"]);

        let mut both = s.children(root);
        assert_eq!(both.next().map(|n| s.name(n)), Some("bottom"));
        assert_eq!(both.next_back().map(|n| s.name(n)), Some("top"));
        assert_eq!(both.next().map(|n| s.name(n)), Some("mid"));
        assert!(both.next_back().is_none(), "ends meet once");
    }

    #[test]
    fn painted_prunes_inactive_branches() {
        let mut s = NodeStore::new(Size::new(10.0, 10.0));
        let root = s.root();
        let layer = s.create_node("layer");
        let hidden = s.create_node("hidden");
        let under_hidden = s.create_node("under_hidden");
        let shown = s.create_node("shown");
        s.set_order(hidden, 1);
        s.set_order(shown, 2);
        s.add_child(root, layer);
        s.add_child(layer, shown);
        s.add_child(layer, hidden);
        s.add_child(hidden, under_hidden);
        s.set_active(hidden, false);

        let root_name = s.name(root).to_string();
        assert_eq!(
            names(&s, s.painted(root)),
            vec![root_name.as_str(), "layer", "shown"]
        );

        s.set_active(layer, false);
        assert_eq!(names(&s, s.painted(root)), vec![root_name.as_str()]);
    }
}
