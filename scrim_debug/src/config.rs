// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON view configuration.
//!
//! A manifest names the default bundle and maps view ids to their
//! [`ViewConfig`]. Map keys are the decimal view ids:
//!
//! ```json
//! {
//!   "default_bundle": "resources",
//!   "views": {
//!     "1": { "asset_path": "ui/main_menu", "layer": 3 },
//!     "2": { "asset_path": "ui/shop", "layer": 4, "prevent_touch": true }
//!   }
//! }
//! ```

use std::io::Read;

use serde::{Deserialize, Serialize};

use scrim_core::view::{ViewConfig, ViewConfigTable, ViewId};

/// A parsed view manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewManifest {
    /// Bundle used by views that do not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bundle: Option<String>,
    /// Configuration for every known view.
    #[serde(default)]
    pub views: ViewConfigTable,
}

impl ViewManifest {
    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.check();
        Ok(manifest)
    }

    /// Parses a manifest from a reader.
    pub fn from_reader(reader: impl Read) -> serde_json::Result<Self> {
        let manifest: Self = serde_json::from_reader(reader)?;
        manifest.check();
        Ok(manifest)
    }

    /// Serializes the manifest as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Looks up one view.
    #[must_use]
    pub fn get(&self, id: ViewId) -> Option<&ViewConfig> {
        self.views.get(&id)
    }

    /// Returns the table with the default bundle written into every view
    /// that names none.
    #[must_use]
    pub fn into_table(self) -> ViewConfigTable {
        let Some(bundle) = self.default_bundle else {
            return self.views;
        };
        let mut views = self.views;
        for config in views.values_mut() {
            if config.bundle.is_none() {
                config.bundle = Some(bundle.clone());
            }
        }
        views
    }

    fn check(&self) {
        if self.views.contains_key(&ViewId::INVALID) {
            log::warn!("view manifest configures the invalid view id 0; it can never be opened");
        }
    }
}

/// Parses just the view table, without a manifest wrapper.
pub fn parse_table(json: &str) -> serde_json::Result<ViewConfigTable> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use scrim_core::layer::LayerId;

    use super::*;

    const MANIFEST: &str = r#"{
        "default_bundle": "ui",
        "views": {
            "1": { "asset_path": "ui/main_menu", "layer": 3 },
            "2": { "asset_path": "ui/shop", "layer": 4, "prevent_touch": true, "z_order": 5 },
            "7": { "asset_path": "ui/toast", "layer": 5, "bundle": "notices" }
        }
    }"#;

    #[test]
    fn manifest_parses_with_defaults() {
        let m = ViewManifest::from_json(MANIFEST).unwrap();
        assert_eq!(m.default_bundle.as_deref(), Some("ui"));
        assert_eq!(m.views.len(), 3);

        let menu = m.get(ViewId(1)).unwrap();
        assert_eq!(menu.layer, LayerId::HUB);
        assert_eq!(menu.z_order, None, "missing fields take defaults");
        assert!(!menu.prevent_touch, "missing fields take defaults");

        let shop = m.get(ViewId(2)).unwrap();
        assert!(shop.prevent_touch);
        assert_eq!(shop.z_order, Some(5));

        let toast = m.get(ViewId(7)).unwrap();
        assert_eq!(toast.bundle.as_deref(), Some("notices"));
    }

    #[test]
    fn manifest_survives_a_write_and_read() {
        let m = ViewManifest::from_json(MANIFEST).unwrap();
        let json = m.to_json().unwrap();
        assert_eq!(ViewManifest::from_reader(json.as_bytes()).unwrap(), m);
    }

    #[test]
    fn default_bundle_fills_unnamed_views() {
        let t = ViewManifest::from_json(MANIFEST).unwrap().into_table();
        assert_eq!(t[&ViewId(1)].bundle.as_deref(), Some("ui"));
        assert_eq!(
            t[&ViewId(7)].bundle.as_deref(),
            Some("notices"),
            "an explicit bundle is kept"
        );
    }

    #[test]
    fn bare_table_parses() {
        let t = parse_table(r#"{ "3": { "asset_path": "ui/bag", "layer": 4 } }"#).unwrap();
        assert_eq!(t[&ViewId(3)], ViewConfig::new("ui/bag", LayerId::POPUP));
    }

    #[test]
    fn missing_required_field_is_an_error() {
        assert!(
            parse_table(r#"{ "3": { "layer": 4 } }"#).is_err(),
            "asset_path is required"
        );
    }
}
