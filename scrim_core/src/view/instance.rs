// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View behaviour and live view instances.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use core::any::Any;
use core::fmt;

use super::ViewId;
use super::config::OpenArgs;
use super::stack::Services;
use super::transition::Transition;
use crate::res::{AssetId, LoadArgs, OwnerId, ResourceLoader, ResourceManager};
use crate::scene::{NodeId, NodeStore, TapHandler};
use crate::time::Duration;

/// How a view affects the visibility of the views below it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShowType {
    /// Hides every non-independent view below it.
    #[default]
    Single,
    /// Shown on top of the views below without hiding them.
    Addition,
    /// Never shown or hidden by other views.
    Independent,
}

/// Per-view behaviour carried by the prefab.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewSettings {
    /// Tapping outside the view's content closes it.
    pub quick_close: bool,
    /// Closing detaches and keeps the instance for the next open.
    pub cache: bool,
    /// Visibility behaviour.
    pub show_type: ShowType,
    /// How long the view's resources survive after it is destroyed.
    pub delay_release: Duration,
}

impl ViewSettings {
    /// A [`ShowType::Single`] view that is neither cached nor quick-closed.
    pub const DEFAULT: Self = Self {
        quick_close: false,
        cache: false,
        show_type: ShowType::Single,
        delay_release: Duration::ZERO,
    };

    /// Sets the show type.
    #[must_use]
    pub const fn with_show_type(mut self, show_type: ShowType) -> Self {
        self.show_type = show_type;
        self
    }

    /// Keeps the instance on close.
    #[must_use]
    pub const fn with_cache(mut self) -> Self {
        self.cache = true;
        self
    }

    /// Closes the view when its background is tapped.
    #[must_use]
    pub const fn with_quick_close(mut self) -> Self {
        self.quick_close = true;
        self
    }

    /// Sets the resource release delay.
    #[must_use]
    pub const fn with_delay_release(mut self, delay: Duration) -> Self {
        self.delay_release = delay;
        self
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Value handed from a closing view to the view it uncovers.
pub type CloseValue = Box<dyn Any>;

/// Services available to a view callback.
pub struct ViewCx<'a> {
    view_id: ViewId,
    node: NodeId,
    owner: OwnerId,
    /// The display tree.
    pub scene: &'a mut NodeStore,
    /// The resource manager.
    pub res: &'a mut ResourceManager,
    loader: &'a mut dyn ResourceLoader,
}

impl fmt::Debug for ViewCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewCx")
            .field("view_id", &self.view_id)
            .field("node", &self.node)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl ViewCx<'_> {
    /// The view being called back.
    #[must_use]
    pub fn view_id(&self) -> ViewId {
        self.view_id
    }

    /// The view's container node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The resource owner of the view.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Loads assets retained by this view until it is destroyed.
    pub fn load(&mut self, args: LoadArgs) {
        self.res.load(&mut *self.loader, args.keeper(self.owner));
    }

    /// Releases assets this view retains, immediately.
    pub fn release(&mut self, assets: &[AssetId]) -> usize {
        self.res.release_specific(self.owner, assets)
    }

    /// Creates a child node of the view's container.
    pub fn add_node(&mut self, name: &str) -> NodeId {
        let child = self.scene.create_node(name);
        self.scene.add_child(self.node, child);
        child
    }
}

/// Behaviour of a view.
///
/// Every callback has a no-op default.
pub trait View {
    /// Called exactly once, right after instantiation.
    fn init(&mut self, cx: &mut ViewCx<'_>) {
        _ = cx;
    }

    /// Called each time the view is attached, before its open transition.
    fn on_open(&mut self, cx: &mut ViewCx<'_>, args: &OpenArgs) {
        _ = (cx, args);
    }

    /// Called when the open transition finishes.
    fn on_open_finished(&mut self, cx: &mut ViewCx<'_>) {
        _ = cx;
    }

    /// Called when the close transition finishes. The returned value is
    /// passed to the view brought back to the top, if any.
    fn on_close(&mut self, cx: &mut ViewCx<'_>) -> Option<CloseValue> {
        _ = cx;
        None
    }

    /// Called when the view becomes the top of its layer again because
    /// `from` closed.
    fn on_top(&mut self, cx: &mut ViewCx<'_>, from: ViewId, value: Option<CloseValue>) {
        _ = (cx, from, value);
    }
}

type ViewFactory = Rc<dyn Fn() -> Box<dyn View>>;
type TransitionFactory = Rc<dyn Fn() -> Box<dyn Transition>>;

/// The payload of a view's prefab asset.
#[derive(Clone)]
pub struct Prefab {
    settings: ViewSettings,
    build: ViewFactory,
    transition: Option<TransitionFactory>,
}

impl fmt::Debug for Prefab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefab")
            .field("settings", &self.settings)
            .field("transition", &self.transition.is_some())
            .finish_non_exhaustive()
    }
}

impl Prefab {
    /// Creates a prefab that builds views with `build`.
    #[must_use]
    pub fn new(settings: ViewSettings, build: impl Fn() -> Box<dyn View> + 'static) -> Self {
        Self {
            settings,
            build: Rc::new(build),
            transition: None,
        }
    }

    /// Gives every instance a transition built by `make`.
    #[must_use]
    pub fn with_transition(mut self, make: impl Fn() -> Box<dyn Transition> + 'static) -> Self {
        self.transition = Some(Rc::new(make));
        self
    }

    /// The settings instances are created with.
    #[must_use]
    pub fn settings(&self) -> ViewSettings {
        self.settings
    }
}

/// A live view.
pub struct ViewInstance {
    view_id: ViewId,
    node: NodeId,
    owner: OwnerId,
    settings: ViewSettings,
    pub(crate) view: Box<dyn View>,
    pub(crate) transition: Option<Box<dyn Transition>>,
    background: Option<NodeId>,
}

impl fmt::Debug for ViewInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewInstance")
            .field("view_id", &self.view_id)
            .field("node", &self.node)
            .field("owner", &self.owner)
            .field("settings", &self.settings)
            .field("transition", &self.transition.is_some())
            .field("background", &self.background)
            .finish_non_exhaustive()
    }
}

impl ViewInstance {
    /// Builds an instance from a loaded prefab and runs its `init`.
    ///
    /// The instance gets a detached container and its own resource owner,
    /// which retains the prefab asset.
    pub(crate) fn instantiate(
        view_id: ViewId,
        prefab: &Prefab,
        prefab_asset: AssetId,
        sv: &mut Services<'_>,
    ) -> Self {
        let node = sv
            .scene
            .create_full_viewport(&format!("view_{}", view_id.0));
        let owner = sv
            .res
            .register_owner(prefab.settings.delay_release, Some(node));
        sv.res.acquire(owner, prefab_asset);
        let mut instance = Self {
            view_id,
            node,
            owner,
            settings: prefab.settings,
            view: (prefab.build)(),
            transition: prefab.transition.as_ref().map(|make| make()),
            background: None,
        };
        let mut cx = instance.cx(sv);
        instance.view.init(&mut cx);
        instance
    }

    /// The view class.
    #[must_use]
    pub fn view_id(&self) -> ViewId {
        self.view_id
    }

    /// The container node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The resource owner.
    #[must_use]
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// The settings the instance was built with.
    #[must_use]
    pub fn settings(&self) -> ViewSettings {
        self.settings
    }

    /// The quick-close background, once created.
    #[must_use]
    pub fn background(&self) -> Option<NodeId> {
        self.background
    }

    pub(crate) fn cx<'s>(&self, sv: &'s mut Services<'_>) -> ViewCx<'s> {
        ViewCx {
            view_id: self.view_id,
            node: self.node,
            owner: self.owner,
            scene: &mut *sv.scene,
            res: &mut *sv.res,
            loader: &mut *sv.loader,
        }
    }

    /// Binds the quick-close background, creating it behind the view's
    /// content on first use. A child already named `background` is reused.
    pub(crate) fn bind_background(&mut self, scene: &mut NodeStore) {
        let bg = match self.background {
            Some(bg) if scene.is_alive(bg) => bg,
            _ => match scene.find_child(self.node, "background") {
                Some(bg) => bg,
                None => {
                    let bg = scene.create_full_viewport("background");
                    scene.set_order(bg, i32::MIN);
                    scene.add_child(self.node, bg);
                    bg
                }
            },
        };
        scene.set_tap(bg, Some(TapHandler::Close(self.view_id)));
        self.background = Some(bg);
    }

    /// Destroys the container and lets the view's resources go once the
    /// release delay has passed.
    pub(crate) fn destroy(self, sv: &mut Services<'_>) {
        if sv.scene.is_alive(self.node) {
            sv.scene.destroy_subtree(self.node);
        }
        sv.res.invalidate(self.owner);
        sv.res.release_all(self.owner, false);
    }
}
