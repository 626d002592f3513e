// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display containers.
//!
//! A *node* is a container in the display tree that views, layers, and
//! overlays are attached to. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is destroyed. Resource owners hold their container's handle and
//!   use [`NodeStore::is_alive`] to notice when it goes away.
//! - Topology: parent and sibling links. Siblings are kept sorted by
//!   [`order`](NodeStore::order), which is how layer ranks and view z-orders
//!   are realised.
//! - **Local properties**: name, active flag, frame, scale, and an optional
//!   [`TapHandler`].
//! - **Computed properties** produced by [`evaluate`](NodeStore::evaluate):
//!   effective visibility.
//!
//! # Dirty tracking
//!
//! Mutations mark the channels in [`dirty`](crate::dirty); evaluation drains
//! them into [`SceneChanges`] for a [`Presenter`](crate::backend::Presenter).

mod evaluate;
mod id;
mod input;
mod store;
mod traverse;

pub use evaluate::SceneChanges;
pub use id::{INVALID, NodeId};
pub use input::{TapHandler, TapOutcome};
pub use store::NodeStore;
pub use traverse::{Children, Painted};
