// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Views and the view stack.
//!
//! A *view* is a screen, dialog, or overlay identified by a [`ViewId`]. The
//! [`ViewConfigTable`] maps each id to the prefab asset it is built from and
//! the [`LayerId`](crate::layer::LayerId) it lives in. The [`ViewStack`]
//! opens and closes views on request:
//!
//! ```text
//!  open(id) ──► config ──► z-order ──► blocker ──► cache hit? ──┐
//!                                           │ miss              │
//!                                           ▼                   ▼
//!                               ResourceManager::load ──► ViewInstance
//!                                                               │
//!                          attach, visibility, hooks, transition ◄┘
//! ```
//!
//! At most one open and one close are in flight at a time. Requests that
//! arrive meanwhile are queued and drained in order, pending closes before
//! pending opens.

use core::fmt;

mod config;
mod instance;
mod stack;
mod transition;

pub use config::{CloseArgs, OpenArgs, ViewConfig, ViewConfigTable};
pub use instance::{CloseValue, Prefab, ShowType, View, ViewCx, ViewInstance, ViewSettings};
pub use stack::{CloseHook, Disposition, OpenError, OpenHook, Services, StackEntry, ViewStack};
pub use transition::{ScaleTransition, Transition, TransitionKind, TransitionStatus};

/// Identifies a view class.
///
/// Zero is reserved as the invalid id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ViewId(pub u32);

impl ViewId {
    /// The invalid id.
    pub const INVALID: Self = Self(0);

    /// Returns `false` for [`ViewId::INVALID`].
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewId({})", self.0)
    }
}
