// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tap routing.
//!
//! Nodes can carry a [`TapHandler`]. A tap is delivered to the topmost
//! effectively visible node whose frame contains the point and that has a
//! handler; propagation stops there. Nodes without handlers are transparent
//! to input.

use kurbo::Point;

use super::id::NodeId;
use super::store::NodeStore;
use crate::view::ViewId;

/// What a node does when it receives a tap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TapHandler {
    /// Swallow the tap. Used by touch-blocking overlays.
    Block,
    /// Swallow the tap and request that the given view be closed. Used by
    /// quick-close backgrounds.
    Close(ViewId),
}

/// The result of routing a tap through the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TapOutcome {
    /// No handler was hit; the tap falls through to the host.
    Unhandled,
    /// A blocking node consumed the tap.
    Blocked(NodeId),
    /// A quick-close background consumed the tap and its view was asked to
    /// close.
    CloseRequested(ViewId),
}

impl NodeStore {
    /// Returns the topmost visible node with a tap handler containing `point`.
    ///
    /// Walks the scene in paint order, so the last match found wins.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<(NodeId, TapHandler)> {
        self.painted(self.root)
            .filter_map(|id| {
                let i = id.idx as usize;
                self.tap[i]
                    .filter(|_| self.frame[i].contains(point))
                    .map(|handler| (id, handler))
            })
            .last()
    }
}
