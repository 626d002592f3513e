// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View configuration and per-request arguments.

use alloc::collections::BTreeMap;
use alloc::string::String;

use super::ViewId;
use crate::layer::LayerId;

/// Static description of a view class.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewConfig {
    /// Path of the view's prefab asset within its bundle.
    pub asset_path: String,
    /// Layer the view is shown in.
    pub layer: LayerId,
    /// Fixed z-order within the layer. Without one, the view is placed at
    /// the next even z above the layer's current top.
    #[cfg_attr(feature = "serde", serde(default))]
    pub z_order: Option<i32>,
    /// Whether a full-viewport input blocker is placed under the view while
    /// it is stacked.
    #[cfg_attr(feature = "serde", serde(default))]
    pub prevent_touch: bool,
    /// Bundle holding the prefab. Without one, the stack's default bundle
    /// is used.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bundle: Option<String>,
}

impl ViewConfig {
    /// Creates a config with no fixed z-order, no input blocker, and the
    /// default bundle.
    #[must_use]
    pub fn new(asset_path: impl Into<String>, layer: LayerId) -> Self {
        Self {
            asset_path: asset_path.into(),
            layer,
            z_order: None,
            prevent_touch: false,
            bundle: None,
        }
    }

    /// Sets a fixed z-order.
    #[must_use]
    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = Some(z_order);
        self
    }

    /// Places an input blocker under the view.
    #[must_use]
    pub fn with_prevent_touch(mut self) -> Self {
        self.prevent_touch = true;
        self
    }

    /// Loads the prefab from `bundle`.
    #[must_use]
    pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }
}

/// Configuration for every known view.
pub type ViewConfigTable = BTreeMap<ViewId, ViewConfig>;

/// Arguments of an open request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenArgs {
    /// Skip the open transition.
    pub quiet: bool,
    /// Overrides both the configured and the automatic z-order.
    pub z_order: Option<i32>,
}

impl OpenArgs {
    /// Open without a transition.
    pub const QUIET: Self = Self {
        quiet: true,
        z_order: None,
    };

    /// Opens at an explicit z-order.
    #[must_use]
    pub const fn at(z_order: i32) -> Self {
        Self {
            quiet: false,
            z_order: Some(z_order),
        }
    }
}

/// Arguments of a close request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CloseArgs {
    /// Skip the close transition.
    pub quiet: bool,
}

impl CloseArgs {
    /// Close without a transition.
    pub const QUIET: Self = Self { quiet: true };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let c = ViewConfig::new("ui/shop", LayerId::POPUP);
        assert_eq!(c.z_order, None);
        assert!(!c.prevent_touch);
        assert_eq!(c.bundle, None);

        let c = c.with_z_order(3).with_prevent_touch().with_bundle("shop");
        assert_eq!(c.z_order, Some(3));
        assert!(c.prevent_touch);
        assert_eq!(c.bundle.as_deref(), Some("shop"));
    }

    #[test]
    fn open_arg_presets() {
        assert!(OpenArgs::QUIET.quiet);
        assert_eq!(OpenArgs::at(7).z_order, Some(7));
        assert!(!OpenArgs::default().quiet);
        assert!(CloseArgs::QUIET.quiet);
    }
}
