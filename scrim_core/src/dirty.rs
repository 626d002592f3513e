// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants for the scene.
//!
//! The [`NodeStore`](crate::scene::NodeStore) uses multi-channel dirty
//! tracking (via [`understory_dirty`]) to report incremental changes to a
//! [`Presenter`](crate::backend::Presenter).
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`VISIBILITY`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) with dependency edges
//!   from child to parent. Toggling a view container's active flag marks the
//!   whole subtree, since effective visibility is inherited.
//!
//! - **Local-only**: [`ORDER`] and [`FRAME`] are marked with the default
//!   policy. Sibling order and frames are per-node properties.
//!
//! - **Structural**: [`TOPOLOGY`] is marked on attach, detach, create, and
//!   destroy. It triggers a traversal-order rebuild during evaluation.

use understory_dirty::Channel;

/// Active flag changed; effective visibility must be recomputed for the subtree.
pub const VISIBILITY: Channel = Channel::new(0);

/// Sibling order (z) changed.
pub const ORDER: Channel = Channel::new(1);

/// Frame or scale changed.
pub const FRAME: Channel = Channel::new(2);

/// Tree topology changed; triggers traversal order rebuild.
pub const TOPOLOGY: Channel = Channel::new(3);
