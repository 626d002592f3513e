// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The top-level runtime.
//!
//! [`Runtime`] owns every service: the display tree, the layer registry, the
//! resource manager, the view stack, and the loader. The host drives it with
//! [`update`](Runtime::update) once per frame and mirrors the display tree
//! with [`present`](Runtime::present).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Size};

use crate::backend::Presenter;
use crate::layer::{LayerId, LayerRegistry};
use crate::res::{ResourceLoader, ResourceManager, SWEEP_INTERVAL};
use crate::scene::{NodeStore, TapHandler, TapOutcome};
use crate::time::{Duration, HostTime};
use crate::trace::{DisplayEvent, Orientation, TraceSink, Tracer, UiEvent};
use crate::view::{
    CloseArgs, Disposition, OpenArgs, Services, StackEntry, ViewConfig, ViewConfigTable, ViewId,
    ViewStack,
};

/// Runtime construction options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Interval between resource sweeps.
    pub sweep_interval: Duration,
    /// Bundle for views whose config names none.
    pub default_bundle: &'static str,
}

impl RuntimeConfig {
    /// Sweeps every five seconds and loads views from `resources`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sweep_interval: SWEEP_INTERVAL,
            default_bundle: "resources",
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the services and exposes the view controller surface.
pub struct Runtime<L> {
    scene: NodeStore,
    layers: LayerRegistry,
    res: ResourceManager,
    stack: ViewStack,
    loader: L,
    sink: Option<Box<dyn TraceSink>>,
    events: Vec<UiEvent>,
}

impl<L: fmt::Debug> fmt::Debug for Runtime<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("scene", &self.scene)
            .field("layers", &self.layers)
            .field("res", &self.res)
            .field("stack", &self.stack)
            .field("loader", &self.loader)
            .field("sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl<L: ResourceLoader> Runtime<L> {
    /// Creates a runtime for a viewport of the given size.
    #[must_use]
    pub fn new(loader: L, viewport: Size, config: RuntimeConfig) -> Self {
        Self {
            scene: NodeStore::new(viewport),
            layers: LayerRegistry::new(),
            res: ResourceManager::new(config.sweep_interval),
            stack: ViewStack::new().with_default_bundle(config.default_bundle),
            loader,
            sink: None,
            events: Vec::new(),
        }
    }

    /// Routes trace events to `sink`.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.sink = Some(sink);
    }

    /// Removes and returns the trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.sink.take()
    }

    // -- Accessors --

    /// The display tree.
    #[must_use]
    pub fn scene(&self) -> &NodeStore {
        &self.scene
    }

    /// The layer registry.
    #[must_use]
    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    /// The resource manager.
    #[must_use]
    pub fn resources(&self) -> &ResourceManager {
        &self.res
    }

    /// Mutable access to the resource manager.
    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.res
    }

    /// The view stack.
    #[must_use]
    pub fn stack(&self) -> &ViewStack {
        &self.stack
    }

    /// The loader.
    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Mutable access to the loader.
    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    // -- Configuration --

    /// Replaces the view configuration table.
    pub fn init_config(&mut self, table: ViewConfigTable) {
        self.stack.init_config(table);
    }

    /// Merges into the view configuration table; entries in `table` win.
    pub fn merge_config(&mut self, table: ViewConfigTable) {
        self.stack.merge_config(table);
    }

    /// Sets the configuration of one view.
    pub fn set_config(&mut self, view_id: ViewId, config: ViewConfig) {
        self.stack.set_config(view_id, config);
    }

    /// See [`ViewStack::set_before_open`].
    pub fn set_before_open(&mut self, hook: impl FnMut(ViewId, Option<ViewId>) + 'static) {
        self.stack.set_before_open(hook);
    }

    /// See [`ViewStack::set_after_open`].
    pub fn set_after_open(&mut self, hook: impl FnMut(ViewId, Option<ViewId>) + 'static) {
        self.stack.set_after_open(hook);
    }

    /// See [`ViewStack::set_after_close`].
    pub fn set_after_close(&mut self, hook: impl FnMut(ViewId) + 'static) {
        self.stack.set_after_close(hook);
    }

    // -- Controller --

    /// Opens a view with default arguments.
    pub fn open(&mut self, view_id: ViewId) -> Disposition {
        self.open_with(view_id, OpenArgs::default())
    }

    /// Opens a view.
    pub fn open_with(&mut self, view_id: ViewId, args: OpenArgs) -> Disposition {
        let (stack, mut sv) = self.split();
        let d = stack.open(view_id, args, None, &mut sv);
        self.flush_trace();
        d
    }

    /// Opens a view, reporting prefab load progress as `(completed, total)`.
    pub fn open_with_progress(
        &mut self,
        view_id: ViewId,
        args: OpenArgs,
        progress: impl FnMut(usize, usize) + 'static,
    ) -> Disposition {
        let (stack, mut sv) = self.split();
        let d = stack.open(view_id, args, Some(Box::new(progress)), &mut sv);
        self.flush_trace();
        d
    }

    /// Closes a view with default arguments.
    pub fn close(&mut self, view_id: ViewId) -> Disposition {
        self.close_with(view_id, CloseArgs::default())
    }

    /// Closes a view.
    pub fn close_with(&mut self, view_id: ViewId, args: CloseArgs) -> Disposition {
        let (stack, mut sv) = self.split();
        let d = stack.close(view_id, args, &mut sv);
        self.flush_trace();
        d
    }

    /// Destroys every stacked view not in `ignore`.
    pub fn close_all(&mut self, ignore: &[ViewId]) {
        let (stack, mut sv) = self.split();
        stack.close_all(ignore, &mut sv);
        self.flush_trace();
    }

    /// Destroys every cached view instance.
    pub fn clear_cache(&mut self) {
        let (stack, mut sv) = self.split();
        stack.clear_cache(&mut sv);
        self.flush_trace();
    }

    // -- Queries --

    /// See [`ViewStack::is_top_view`].
    #[must_use]
    pub fn is_top_view(&self, view_id: ViewId, same_layer: bool) -> bool {
        self.stack.is_top_view(view_id, same_layer)
    }

    /// See [`ViewStack::view_info`].
    #[must_use]
    pub fn view_info(&self, view_id: ViewId) -> Option<&StackEntry> {
        self.stack.view_info(view_id)
    }

    /// See [`ViewStack::previous_visible_view`].
    #[must_use]
    pub fn previous_visible_view(&self, view_id: ViewId) -> Option<ViewId> {
        self.stack.previous_visible_view(view_id, &self.scene)
    }

    /// See [`ViewStack::top_view`].
    #[must_use]
    pub fn top_view(&self, layer: Option<LayerId>) -> Option<ViewId> {
        self.stack.top_view(layer)
    }

    /// See [`ViewStack::stack_len`].
    #[must_use]
    pub fn stack_len(&self, layer: Option<LayerId>) -> usize {
        self.stack.stack_len(layer)
    }

    // -- Frame --

    /// Advances the runtime by `dt`.
    ///
    /// Order: loader, load completions, transitions, resource sweep, trace
    /// flush.
    pub fn update(&mut self, dt: Duration) {
        self.loader.update(dt, self.res.assets_mut());
        self.res.flush_kept();
        let (stack, mut sv) = self.split();
        stack.pump(&mut sv);
        stack.advance(dt, &mut sv);
        self.res.update(dt, &self.scene);
        self.flush_trace();
    }

    /// Routes a tap through the display tree.
    ///
    /// A quick-close background closes its view.
    pub fn tap(&mut self, point: Point) -> TapOutcome {
        match self.scene.hit_test(point) {
            None => TapOutcome::Unhandled,
            Some((node, TapHandler::Block)) => TapOutcome::Blocked(node),
            Some((_, TapHandler::Close(view_id))) => {
                self.close(view_id);
                TapOutcome::CloseRequested(view_id)
            }
        }
    }

    /// Resizes the viewport. Full-viewport containers follow.
    pub fn resize(&mut self, size: Size) {
        let before = Orientation::of(self.scene.viewport());
        if self.scene.viewport() == size {
            return;
        }
        self.scene.set_viewport(size);
        let orientation = Orientation::of(size);
        log::debug!("viewport resized to {}x{}", size.width, size.height);
        if cfg!(feature = "trace") {
            self.events.push(UiEvent::Display(DisplayEvent {
                at: self.res.now(),
                width: size.width,
                height: size.height,
                orientation,
                orientation_changed: orientation != before,
            }));
        }
        self.flush_trace();
    }

    /// Evaluates the display tree and hands the changes to `presenter`.
    pub fn present(&mut self, presenter: &mut dyn Presenter) {
        let changes = self.scene.evaluate();
        presenter.apply(&self.scene, &changes);
    }

    fn split(&mut self) -> (&mut ViewStack, Services<'_>) {
        (
            &mut self.stack,
            Services {
                scene: &mut self.scene,
                layers: &mut self.layers,
                res: &mut self.res,
                loader: &mut self.loader,
            },
        )
    }

    fn flush_trace(&mut self) {
        let mut events = core::mem::take(&mut self.events);
        events.extend(self.stack.drain_events());
        events.extend(self.res.drain_events());
        if events.is_empty() {
            return;
        }
        events.sort_by_key(event_time);
        let mut tracer = match self.sink.as_deref_mut() {
            Some(sink) => Tracer::new(sink),
            None => Tracer::none(),
        };
        tracer.emit_all(&events);
    }
}

fn event_time(e: &UiEvent) -> HostTime {
    match e {
        UiEvent::Request(e) => e.at,
        UiEvent::Lifecycle(e) => e.at,
        UiEvent::Visibility(e) => e.at,
        UiEvent::OwnerInvalidated(e) => e.at,
        UiEvent::OwnerReleased(e) => e.at,
        UiEvent::AssetDisposed(e) => e.at,
        UiEvent::Display(e) => e.at,
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::RefCell;

    use super::*;
    use crate::res::{AssetKind, MemoryLoader};
    use crate::scene::SceneChanges;
    use crate::view::{Prefab, ViewSettings};

    fn runtime() -> Runtime<MemoryLoader> {
        let mut loader = MemoryLoader::new();
        let popup = Prefab::new(ViewSettings::DEFAULT.with_quick_close(), || {
            Box::new(Blank)
        });
        loader.insert_value("resources", "ui/popup", AssetKind::Prefab, popup);
        let mut rt = Runtime::new(loader, Size::new(800.0, 600.0), RuntimeConfig::new());
        rt.set_config(
            ViewId(1),
            ViewConfig::new("ui/popup", LayerId::POPUP).with_prevent_touch(),
        );
        rt
    }

    struct Blank;
    impl crate::view::View for Blank {}

    #[test]
    fn tap_on_quick_close_background_closes_the_view() {
        let mut rt = runtime();
        assert_eq!(rt.open(ViewId(1)), Disposition::Started);
        assert_eq!(rt.stack_len(None), 1);

        let outcome = rt.tap(Point::new(400.0, 300.0));
        assert_eq!(outcome, TapOutcome::CloseRequested(ViewId(1)));
        assert_eq!(rt.stack_len(None), 0);
        assert_eq!(rt.tap(Point::new(400.0, 300.0)), TapOutcome::Unhandled);
    }

    #[test]
    fn resize_stretches_layers() {
        let mut rt = runtime();
        rt.open(ViewId(1));
        rt.resize(Size::new(600.0, 800.0));
        let layer = rt.layers().layer(LayerId::POPUP).unwrap();
        assert_eq!(rt.scene().frame(layer).size(), Size::new(600.0, 800.0));
    }

    #[test]
    fn present_reports_new_nodes() {
        struct Capture(usize);
        impl Presenter for Capture {
            fn apply(&mut self, _store: &NodeStore, changes: &SceneChanges) {
                self.0 += changes.added.len();
            }
        }

        let mut rt = runtime();
        let mut capture = Capture(0);
        rt.present(&mut capture);
        let baseline = capture.0;
        rt.open(ViewId(1));
        rt.present(&mut capture);
        assert!(capture.0 > baseline, "layer, blocker, view, and background added");
    }

    #[test]
    fn update_sweeps_released_views() {
        let mut rt = runtime();
        rt.open(ViewId(1));
        rt.close(ViewId(1));
        assert!(rt.resources().assets().is_empty());
        rt.update(Duration::from_secs(5));
        assert_eq!(rt.resources().tracked_owners(), 0);
    }

    #[test]
    fn hooks_are_forwarded() {
        let mut rt = runtime();
        let closed = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&closed);
        rt.set_after_close(move |v| c.borrow_mut().push(v));
        rt.open(ViewId(1));
        rt.close(ViewId(1));
        assert_eq!(*closed.borrow(), [ViewId(1)]);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn sink_receives_display_and_request_events() {
        use crate::trace::RequestEvent;

        #[derive(Default)]
        struct Counts {
            requests: usize,
            displays: usize,
        }
        struct Shared(Rc<RefCell<Counts>>);
        impl TraceSink for Shared {
            fn on_request(&mut self, _e: &RequestEvent) {
                self.0.borrow_mut().requests += 1;
            }
            fn on_display_change(&mut self, e: &DisplayEvent) {
                assert!(e.orientation_changed, "landscape to portrait");
                self.0.borrow_mut().displays += 1;
            }
        }

        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut rt = runtime();
        rt.set_trace_sink(Box::new(Shared(Rc::clone(&counts))));
        rt.open(ViewId(1));
        rt.close(ViewId(1));
        rt.resize(Size::new(600.0, 800.0));
        assert_eq!(counts.borrow().requests, 2);
        assert_eq!(counts.borrow().displays, 1);
    }
}
