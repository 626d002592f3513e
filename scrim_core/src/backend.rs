// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation contract for platform integrations.
//!
//! `scrim_core` never draws anything. The [`NodeStore`] is an abstract
//! display tree; a platform integration mirrors it into a native tree (a
//! retained-mode scene graph, DOM elements, a widget toolkit) by
//! implementing [`Presenter`].
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_frame(dt: Duration) {
//!     // Pump loads, advance transitions, sweep resources.
//!     runtime.update(dt);
//!
//!     // Evaluate and present the incremental scene changes.
//!     runtime.present(&mut presenter);
//! }
//! ```

use crate::scene::{NodeStore, SceneChanges};

/// Applies evaluated scene changes to a platform-native presentation tree.
pub trait Presenter {
    /// Applies the given [`SceneChanges`] to the backing presentation tree,
    /// reading current property values from `store` as needed.
    fn apply(&mut self, store: &NodeStore, changes: &SceneChanges);
}
