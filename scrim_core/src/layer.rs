// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Semantic depth layers.
//!
//! Every view lives in one of a small, fixed set of layers. A layer is a
//! full-viewport container attached under the scene root; its sibling order
//! is its numeric id, so a higher id is always in front of a lower one
//! regardless of the order in which layers were first used.

use alloc::collections::BTreeMap;
use alloc::format;
use core::fmt;

use crate::scene::{NodeId, NodeStore};

/// A semantic depth layer. Ascending ids are drawn in front.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LayerId(pub u8);

impl LayerId {
    /// The game world.
    pub const GAME: Self = Self(1);
    /// Heads-up display over the game.
    pub const HUD: Self = Self(2);
    /// Persistent hub UI (menus that outlive individual screens).
    pub const HUB: Self = Self(3);
    /// Popups and dialogs.
    pub const POPUP: Self = Self(4);
    /// Transient notices and toasts.
    pub const NOTICE: Self = Self(5);
    /// Always on top (loading screens, system prompts).
    pub const TOPMOST: Self = Self(6);

    /// All predefined layers, back to front.
    pub const ALL: [Self; 6] = [
        Self::GAME,
        Self::HUD,
        Self::HUB,
        Self::POPUP,
        Self::NOTICE,
        Self::TOPMOST,
    ];
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::GAME => "GAME",
            Self::HUD => "HUD",
            Self::HUB => "HUB",
            Self::POPUP => "POPUP",
            Self::NOTICE => "NOTICE",
            Self::TOPMOST => "TOPMOST",
            Self(n) => return write!(f, "LayerId({n})"),
        };
        f.write_str(name)
    }
}

/// Lazily created layer containers.
#[derive(Debug, Default)]
pub struct LayerRegistry {
    layers: BTreeMap<LayerId, NodeId>,
}

impl LayerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the container for `layer`, creating it on first access.
    ///
    /// The container is named `layer_<id>`, covers the viewport, follows
    /// viewport resizes, and is ordered under the root by its id.
    pub fn get_layer(&mut self, layer: LayerId, scene: &mut NodeStore) -> NodeId {
        if let Some(&node) = self.layers.get(&layer)
            && scene.is_alive(node)
        {
            return node;
        }
        let node = scene.create_full_viewport(&format!("layer_{}", layer.0));
        scene.set_order(node, i32::from(layer.0));
        let root = scene.root();
        scene.add_child(root, node);
        self.layers.insert(layer, node);
        node
    }

    /// Returns the container for `layer` if it has been created.
    #[must_use]
    pub fn layer(&self, layer: LayerId) -> Option<NodeId> {
        self.layers.get(&layer).copied()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::Size;

    use super::*;

    #[test]
    fn layer_is_created_once() {
        let mut scene = NodeStore::new(Size::new(320.0, 240.0));
        let mut layers = LayerRegistry::new();
        assert_eq!(layers.layer(LayerId::POPUP), None);

        let a = layers.get_layer(LayerId::POPUP, &mut scene);
        let b = layers.get_layer(LayerId::POPUP, &mut scene);
        assert_eq!(a, b);
        assert_eq!(layers.layer(LayerId::POPUP), Some(a));
        assert_eq!(scene.name(a), "layer_4");
        assert_eq!(scene.frame(a), scene.viewport_rect());
    }

    #[test]
    fn layers_are_ranked_by_id_not_creation_order() {
        let mut scene = NodeStore::new(Size::new(320.0, 240.0));
        let mut layers = LayerRegistry::new();
        let top = layers.get_layer(LayerId::TOPMOST, &mut scene);
        let game = layers.get_layer(LayerId::GAME, &mut scene);
        let popup = layers.get_layer(LayerId::POPUP, &mut scene);

        let kids: Vec<_> = scene.children(scene.root()).collect();
        assert_eq!(kids, [game, popup, top]);
    }

    #[test]
    fn layers_stretch_with_viewport() {
        let mut scene = NodeStore::new(Size::new(320.0, 240.0));
        let mut layers = LayerRegistry::new();
        let hud = layers.get_layer(LayerId::HUD, &mut scene);
        scene.set_viewport(Size::new(800.0, 600.0));
        assert_eq!(scene.frame(hud).size(), Size::new(800.0, 600.0));
    }

    #[test]
    fn debug_names_known_layers() {
        assert_eq!(alloc::format!("{:?}", LayerId::NOTICE), "NOTICE");
        assert_eq!(alloc::format!("{:?}", LayerId(9)), "LayerId(9)");
    }
}
