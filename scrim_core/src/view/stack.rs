// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The view stack controller.

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, VecDeque};
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use super::ViewId;
use super::config::{CloseArgs, OpenArgs, ViewConfig, ViewConfigTable};
use super::instance::{Prefab, ShowType, ViewInstance};
use super::transition::{TransitionKind, TransitionStatus};
use crate::layer::{LayerId, LayerRegistry};
use crate::res::{
    AssetId, AssetKind, LoadArgs, LoadError, ProgressFn, ResourceLoader, ResourceManager,
};
use crate::scene::{NodeId, NodeStore, TapHandler};
use crate::time::Duration;
use crate::trace::{
    LifecycleEvent, LifecycleStage, RequestEvent, RequestOp, UiEvent, VisibilityEvent,
};

/// Services the stack works against, borrowed from their owner for the
/// duration of one operation.
pub struct Services<'a> {
    /// The display tree.
    pub scene: &'a mut NodeStore,
    /// Layer containers.
    pub layers: &'a mut LayerRegistry,
    /// Resource retention.
    pub res: &'a mut ResourceManager,
    /// The asset loader.
    pub loader: &'a mut dyn ResourceLoader,
}

impl fmt::Debug for Services<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

/// How a request was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// The operation started (and may already have finished).
    Started,
    /// Another operation is in flight; the request was queued.
    Queued,
    /// The request was dropped.
    Rejected,
}

/// Why an open could not complete.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OpenError {
    /// The view has no configuration.
    #[error("no configuration for {0:?}")]
    NoConfig(ViewId),
    /// The prefab failed to load.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The loaded asset does not carry a [`Prefab`].
    #[error("asset loaded for {0:?} is not a view prefab")]
    NotAPrefab(ViewId),
}

/// Called with `(view, opened_over)` before a view's `on_open` and after its
/// open transition.
pub type OpenHook = Box<dyn FnMut(ViewId, Option<ViewId>)>;

/// Called with the closed view after its close callbacks.
pub type CloseHook = Box<dyn FnMut(ViewId)>;

/// A view on the stack.
#[derive(Debug)]
pub struct StackEntry {
    view_id: ViewId,
    layer: LayerId,
    z_order: i32,
    instance: Option<ViewInstance>,
    blocker: Option<NodeId>,
    ticket: Option<u64>,
}

impl StackEntry {
    /// The view.
    #[must_use]
    pub fn view_id(&self) -> ViewId {
        self.view_id
    }

    /// Its layer.
    #[must_use]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Its z-order within the layer.
    #[must_use]
    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    /// The live instance, or `None` while its prefab is loading.
    #[must_use]
    pub fn instance(&self) -> Option<&ViewInstance> {
        self.instance.as_ref()
    }

    /// The input blocker placed under the view, if configured.
    #[must_use]
    pub fn blocker(&self) -> Option<NodeId> {
        self.blocker
    }

    /// Whether the entry still waits for its prefab.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.instance.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Loading,
    Animating,
}

#[derive(Debug)]
struct Opening {
    view_id: ViewId,
    ticket: Option<u64>,
    from: Option<ViewId>,
    args: OpenArgs,
    phase: Phase,
}

#[derive(Debug)]
struct Closing {
    instance: ViewInstance,
    prev: Option<ViewId>,
}

struct QueuedOpen {
    view_id: ViewId,
    args: OpenArgs,
    progress: Option<ProgressFn>,
}

#[derive(Clone, Copy)]
struct QueuedClose {
    view_id: ViewId,
    args: CloseArgs,
}

struct LoadDone {
    ticket: u64,
    view_id: ViewId,
    result: Result<Vec<AssetId>, LoadError>,
}

type Inbox = Rc<RefCell<VecDeque<LoadDone>>>;

/// Opens and closes views, keeping them sorted by layer and z-order.
///
/// All mutation goes through [`Services`] borrowed from the owner of the
/// scene, the layer registry, the resource manager, and the loader.
pub struct ViewStack {
    config: ViewConfigTable,
    default_bundle: Option<String>,
    stack: Vec<StackEntry>,
    cache: BTreeMap<ViewId, ViewInstance>,
    open_queue: VecDeque<QueuedOpen>,
    close_queue: VecDeque<QueuedClose>,
    opening: Option<Opening>,
    closing: Option<Closing>,
    inbox: Inbox,
    next_ticket: u64,
    before_open: Option<OpenHook>,
    after_open: Option<OpenHook>,
    after_close: Option<CloseHook>,
    events: Vec<UiEvent>,
}

impl fmt::Debug for ViewStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewStack")
            .field("config", &self.config.len())
            .field("stack", &self.stack)
            .field("cache", &self.cache.keys().collect::<Vec<_>>())
            .field("open_queue", &self.open_queue.len())
            .field("close_queue", &self.close_queue.len())
            .field("opening", &self.opening)
            .field("closing", &self.closing)
            .finish_non_exhaustive()
    }
}

impl Default for ViewStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewStack {
    /// Creates an empty stack with no configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ViewConfigTable::new(),
            default_bundle: None,
            stack: Vec::new(),
            cache: BTreeMap::new(),
            open_queue: VecDeque::new(),
            close_queue: VecDeque::new(),
            opening: None,
            closing: None,
            inbox: Rc::default(),
            next_ticket: 1,
            before_open: None,
            after_open: None,
            after_close: None,
            events: Vec::new(),
        }
    }

    /// Loads prefabs whose config names no bundle from `bundle` rather than
    /// the loader's default.
    #[must_use]
    pub fn with_default_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.default_bundle = Some(bundle.into());
        self
    }

    // -- Configuration --

    /// Replaces the whole configuration table.
    pub fn init_config(&mut self, table: ViewConfigTable) {
        self.config = table;
    }

    /// Merges `table` into the configuration; entries in `table` win.
    pub fn merge_config(&mut self, table: ViewConfigTable) {
        self.config.extend(table);
    }

    /// Sets the configuration of one view.
    pub fn set_config(&mut self, view_id: ViewId, config: ViewConfig) {
        self.config.insert(view_id, config);
    }

    /// Returns the configuration of a view.
    #[must_use]
    pub fn config(&self, view_id: ViewId) -> Option<&ViewConfig> {
        self.config.get(&view_id)
    }

    // -- Hooks --

    /// Sets the hook run before each view's `on_open`.
    pub fn set_before_open(&mut self, hook: impl FnMut(ViewId, Option<ViewId>) + 'static) {
        self.before_open = Some(Box::new(hook));
    }

    /// Sets the hook run after each view's open transition.
    pub fn set_after_open(&mut self, hook: impl FnMut(ViewId, Option<ViewId>) + 'static) {
        self.after_open = Some(Box::new(hook));
    }

    /// Sets the hook run after each view's close callbacks.
    pub fn set_after_close(&mut self, hook: impl FnMut(ViewId) + 'static) {
        self.after_close = Some(Box::new(hook));
    }

    // -- Open --

    /// Opens a view.
    ///
    /// If the view is already stacked it is closed quietly and opened again,
    /// so a view never appears twice. `progress` receives load progress when
    /// the prefab is not cached.
    pub fn open(
        &mut self,
        view_id: ViewId,
        args: OpenArgs,
        progress: Option<ProgressFn>,
        sv: &mut Services<'_>,
    ) -> Disposition {
        let config = match self.resolve_config(view_id) {
            Ok(config) => config.clone(),
            Err(e) => {
                log::warn!("open rejected: {e}");
                return self.request(view_id, RequestOp::Open, Disposition::Rejected, sv);
            }
        };

        if self.is_busy() {
            self.open_queue.push_back(QueuedOpen {
                view_id,
                args,
                progress,
            });
            return self.request(view_id, RequestOp::Open, Disposition::Queued, sv);
        }

        if self.index_of(view_id).is_some() {
            log::debug!("{view_id:?} is already open, reopening");
            self.begin_close(view_id, CloseArgs::QUIET, false, sv);
            if self.is_busy() {
                // The close transition ignored `immediate`; reopen right after it.
                self.open_queue.push_front(QueuedOpen {
                    view_id,
                    args,
                    progress,
                });
                return self.request(view_id, RequestOp::Open, Disposition::Queued, sv);
            }
        }

        let layer = config.layer;
        let z_order = args
            .z_order
            .or(config.z_order)
            .unwrap_or_else(|| self.next_z_order(layer));
        let blocker = config
            .prevent_touch
            .then(|| create_blocker(layer, z_order, sv));
        self.stack.push(StackEntry {
            view_id,
            layer,
            z_order,
            instance: None,
            blocker,
            ticket: None,
        });
        self.stack.sort_by_key(|e| (e.layer, e.z_order));
        self.request(view_id, RequestOp::Open, Disposition::Started, sv);

        self.opening = Some(Opening {
            view_id,
            ticket: None,
            from: None,
            args,
            phase: Phase::Loading,
        });

        if let Some(instance) = self.cache.remove(&view_id) {
            self.lifecycle(view_id, LifecycleStage::CacheHit, sv);
            self.activate(instance, sv);
            return Disposition::Started;
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        if let Some(opening) = &mut self.opening {
            opening.ticket = Some(ticket);
        }
        if let Some(i) = self.index_of(view_id) {
            self.stack[i].ticket = Some(ticket);
        }
        self.lifecycle(view_id, LifecycleStage::LoadStarted, sv);

        let inbox = Rc::clone(&self.inbox);
        let mut load = LoadArgs::path(config.asset_path)
            .kind(AssetKind::Prefab)
            .on_progress_boxed(progress)
            .on_complete(move |result| {
                inbox.borrow_mut().push_back(LoadDone {
                    ticket,
                    view_id,
                    result,
                });
            });
        if let Some(bundle) = config.bundle.or_else(|| self.default_bundle.clone()) {
            load = load.bundle(bundle);
        }
        sv.res.load(&mut *sv.loader, load);
        self.pump(sv);
        Disposition::Started
    }

    /// Processes prefab loads that completed since the last call.
    pub fn pump(&mut self, sv: &mut Services<'_>) {
        loop {
            let next = self.inbox.borrow_mut().pop_front();
            let Some(done) = next else {
                break;
            };
            self.finish_load(done, sv);
        }
    }

    fn finish_load(&mut self, done: LoadDone, sv: &mut Services<'_>) {
        let current = self
            .opening
            .as_ref()
            .is_some_and(|o| o.ticket == Some(done.ticket));
        let view_id = done.view_id;
        match (current, prefab_from(view_id, done.result, sv.res)) {
            (true, Ok((asset, prefab))) => {
                let instance = ViewInstance::instantiate(view_id, &prefab, asset, sv);
                self.lifecycle(view_id, LifecycleStage::Instantiated, sv);
                self.activate(instance, sv);
            }
            (true, Err(e)) => {
                log::warn!("failed to open {view_id:?}: {e}");
                self.abort_open(view_id, LifecycleStage::LoadFailed, sv);
            }
            (false, Ok((asset, prefab))) => {
                log::debug!("{view_id:?} was closed while loading, discarding");
                let instance = ViewInstance::instantiate(view_id, &prefab, asset, sv);
                instance.destroy(sv);
                self.lifecycle(view_id, LifecycleStage::Discarded, sv);
            }
            (false, Err(e)) => {
                log::debug!("ignoring failed load of closed {view_id:?}: {e}");
            }
        }
    }

    fn activate(&mut self, mut instance: ViewInstance, sv: &mut Services<'_>) {
        let view_id = instance.view_id();
        let Some(i) = self.index_of(view_id) else {
            instance.destroy(sv);
            return;
        };
        let node = instance.node();
        let container = sv.layers.get_layer(self.stack[i].layer, sv.scene);
        sv.scene.set_order(node, self.stack[i].z_order);
        sv.scene.set_active(node, true);
        sv.scene.add_child(container, node);
        if instance.settings().quick_close {
            instance.bind_background(sv.scene);
        }
        self.stack[i].instance = Some(instance);
        self.stack[i].ticket = None;
        self.refresh_visibility(sv);

        let from = self.previous_visible_view(view_id, sv.scene);
        let Some(opening) = &mut self.opening else {
            return;
        };
        opening.from = from;
        opening.phase = Phase::Animating;
        let args = opening.args;
        if let Some(hook) = &mut self.before_open {
            hook(view_id, from);
        }

        let Some(instance) = self.stack[i].instance.as_mut() else {
            return;
        };
        let mut cx = instance.cx(sv);
        instance.view.on_open(&mut cx, &args);
        let status = match instance.transition.as_mut() {
            Some(t) => t.start(TransitionKind::Open, node, sv.scene, args.quiet),
            None => TransitionStatus::Done,
        };
        self.lifecycle(view_id, LifecycleStage::Opened, sv);
        if status == TransitionStatus::Done {
            self.finish_open(sv);
        }
    }

    fn finish_open(&mut self, sv: &mut Services<'_>) {
        let Some(opening) = self.opening.take() else {
            return;
        };
        let view_id = opening.view_id;
        if let Some(instance) = self.instance_mut(view_id) {
            let mut cx = instance.cx(sv);
            instance.view.on_open_finished(&mut cx);
        }
        self.lifecycle(view_id, LifecycleStage::OpenFinished, sv);
        if let Some(hook) = &mut self.after_open {
            hook(view_id, opening.from);
        }
        self.drain(sv);
    }

    /// Tears down a loading entry and resumes the queues.
    fn abort_open(&mut self, view_id: ViewId, stage: LifecycleStage, sv: &mut Services<'_>) {
        self.opening = None;
        if let Some(i) = self.index_of(view_id) {
            let entry = self.stack.remove(i);
            destroy_node(sv.scene, entry.blocker);
        }
        self.lifecycle(view_id, stage, sv);
        self.drain(sv);
    }

    // -- Close --

    /// Closes a view.
    ///
    /// Closing a view whose prefab is still loading cancels the open; the
    /// prefab is discarded when it arrives.
    pub fn close(&mut self, view_id: ViewId, args: CloseArgs, sv: &mut Services<'_>) -> Disposition {
        if !view_id.is_valid() {
            log::debug!("close of the invalid view id ignored");
            return self.request(view_id, RequestOp::Close, Disposition::Rejected, sv);
        }

        let loading = self
            .opening
            .as_ref()
            .is_some_and(|o| o.view_id == view_id && o.phase == Phase::Loading);
        if loading {
            self.request(view_id, RequestOp::Close, Disposition::Started, sv);
            self.abort_open(view_id, LifecycleStage::CloseStarted, sv);
            return Disposition::Started;
        }

        if self.stack.is_empty() || self.is_busy() {
            self.close_queue.push_back(QueuedClose { view_id, args });
            return self.request(view_id, RequestOp::Close, Disposition::Queued, sv);
        }

        if self.index_of(view_id).is_none() {
            log::debug!("close of {view_id:?} ignored, it is not open");
            return self.request(view_id, RequestOp::Close, Disposition::Rejected, sv);
        }

        self.request(view_id, RequestOp::Close, Disposition::Started, sv);
        self.begin_close(view_id, args, true, sv);
        Disposition::Started
    }

    fn begin_close(&mut self, view_id: ViewId, args: CloseArgs, drain: bool, sv: &mut Services<'_>) {
        let Some(i) = self.index_of(view_id) else {
            return;
        };
        let prev = self.previous_visible_view(view_id, sv.scene);
        let mut entry = self.stack.remove(i);
        destroy_node(sv.scene, entry.blocker.take());
        let Some(mut instance) = entry.instance.take() else {
            return;
        };
        self.refresh_visibility(sv);
        self.lifecycle(view_id, LifecycleStage::CloseStarted, sv);

        let node = instance.node();
        let status = match instance.transition.as_mut() {
            Some(t) => t.start(TransitionKind::Close, node, sv.scene, args.quiet),
            None => TransitionStatus::Done,
        };
        self.closing = Some(Closing { instance, prev });
        if status == TransitionStatus::Done {
            self.finish_close(drain, sv);
        }
    }

    fn finish_close(&mut self, drain: bool, sv: &mut Services<'_>) {
        let Some(Closing { mut instance, prev }) = self.closing.take() else {
            return;
        };
        let view_id = instance.view_id();
        let value = {
            let mut cx = instance.cx(sv);
            instance.view.on_close(&mut cx)
        };
        if let Some(prev) = prev.filter(|&p| self.is_top_view(p, true))
            && let Some(top) = self.instance_mut(prev)
        {
            let mut cx = top.cx(sv);
            top.view.on_top(&mut cx, view_id, value);
        }
        self.lifecycle(view_id, LifecycleStage::Closed, sv);
        if let Some(hook) = &mut self.after_close {
            hook(view_id);
        }

        if instance.settings().cache {
            if sv.scene.parent(instance.node()).is_some() {
                sv.scene.remove_from_parent(instance.node());
            }
            if let Some(stale) = self.cache.insert(view_id, instance) {
                stale.destroy(sv);
            }
            self.lifecycle(view_id, LifecycleStage::Cached, sv);
        } else {
            instance.destroy(sv);
            self.lifecycle(view_id, LifecycleStage::Destroyed, sv);
        }

        if drain {
            self.drain(sv);
        }
    }

    /// Starts queued operations until one stays in flight.
    fn drain(&mut self, sv: &mut Services<'_>) {
        while !self.is_busy() {
            if let Some(q) = self.close_queue.pop_front() {
                if self.stack.is_empty() {
                    log::debug!("queued close of {:?} dropped, the stack is empty", q.view_id);
                    continue;
                }
                self.close(q.view_id, q.args, sv);
            } else if let Some(q) = self.open_queue.pop_front() {
                self.open(q.view_id, q.args, q.progress, sv);
            } else {
                break;
            }
        }
    }

    /// Immediately destroys every stacked view not in `ignore`.
    ///
    /// No transitions are played and the cache is kept. Both queues are
    /// cleared and an in-flight close is finished by destroying its view.
    /// An in-flight open survives only for an ignored view: a load keeps
    /// going and activates the view on arrival, and an open transition is
    /// snapped to its end and completed.
    pub fn close_all(&mut self, ignore: &[ViewId], sv: &mut Services<'_>) {
        let (kept, doomed): (Vec<_>, Vec<_>) = core::mem::take(&mut self.stack)
            .into_iter()
            .partition(|e| ignore.contains(&e.view_id));
        self.stack = kept;
        let opening = self
            .opening
            .take()
            .filter(|o| ignore.contains(&o.view_id));

        for mut entry in doomed {
            destroy_node(sv.scene, entry.blocker.take());
            if let Some(mut instance) = entry.instance.take() {
                let mut cx = instance.cx(sv);
                instance.view.on_close(&mut cx);
                instance.destroy(sv);
                self.lifecycle(entry.view_id, LifecycleStage::Destroyed, sv);
            }
        }
        if let Some(Closing { mut instance, .. }) = self.closing.take() {
            let view_id = instance.view_id();
            let mut cx = instance.cx(sv);
            instance.view.on_close(&mut cx);
            instance.destroy(sv);
            self.lifecycle(view_id, LifecycleStage::Destroyed, sv);
        }

        self.open_queue.clear();
        self.close_queue.clear();
        self.refresh_visibility(sv);

        let Some(opening) = opening else {
            return;
        };
        let phase = opening.phase;
        let view_id = opening.view_id;
        self.opening = Some(opening);
        if phase == Phase::Animating {
            if let Some(instance) = self.instance_mut(view_id) {
                let node = instance.node();
                if let Some(t) = instance.transition.as_mut() {
                    t.start(TransitionKind::Open, node, sv.scene, true);
                }
            }
            self.finish_open(sv);
        }
    }

    /// Destroys every cached instance.
    pub fn clear_cache(&mut self, sv: &mut Services<'_>) {
        for (view_id, instance) in core::mem::take(&mut self.cache) {
            instance.destroy(sv);
            self.lifecycle(view_id, LifecycleStage::Destroyed, sv);
        }
    }

    // -- Transitions --

    /// Advances the running open or close transition.
    pub fn advance(&mut self, dt: Duration, sv: &mut Services<'_>) {
        if let Some(opening) = &self.opening
            && opening.phase == Phase::Animating
        {
            let view_id = opening.view_id;
            let done = self.instance_mut(view_id).is_none_or(|instance| {
                let node = instance.node();
                instance
                    .transition
                    .as_mut()
                    .is_none_or(|t| t.advance(dt, node, sv.scene) == TransitionStatus::Done)
            });
            if done {
                self.finish_open(sv);
            }
        }

        if let Some(closing) = &mut self.closing {
            let node = closing.instance.node();
            let done = closing
                .instance
                .transition
                .as_mut()
                .is_none_or(|t| t.advance(dt, node, sv.scene) == TransitionStatus::Done);
            if done {
                self.finish_close(true, sv);
            }
        }
    }

    // -- Visibility --

    /// Recomputes which stacked views are shown.
    ///
    /// Scanning from the top, the first [`ShowType::Single`] view is shown
    /// and ends the scan; [`ShowType::Addition`] views above it are shown
    /// and every view below it is hidden. [`ShowType::Independent`] views
    /// are never touched. Entries still loading are skipped.
    fn refresh_visibility(&mut self, sv: &mut Services<'_>) {
        let mut stopped = false;
        let mut changed = Vec::new();
        for entry in self.stack.iter().rev() {
            let Some(instance) = &entry.instance else {
                continue;
            };
            let show = match instance.settings().show_type {
                ShowType::Independent => continue,
                _ if stopped => false,
                ShowType::Single => {
                    stopped = true;
                    true
                }
                ShowType::Addition => true,
            };
            if sv.scene.is_active(instance.node()) != show {
                sv.scene.set_active(instance.node(), show);
                changed.push((entry.view_id, show));
            }
        }
        for (view, visible) in changed {
            self.record(UiEvent::Visibility(VisibilityEvent {
                at: sv.res.now(),
                view,
                visible,
            }));
        }
    }

    // -- Queries --

    /// Whether `view_id` is the top of the whole stack, or with
    /// `same_layer` the top of its own layer.
    #[must_use]
    pub fn is_top_view(&self, view_id: ViewId, same_layer: bool) -> bool {
        if same_layer {
            self.view_info(view_id)
                .is_some_and(|e| self.top_view(Some(e.layer)) == Some(view_id))
        } else {
            self.top_view(None) == Some(view_id)
        }
    }

    /// The stack entry of a view.
    #[must_use]
    pub fn view_info(&self, view_id: ViewId) -> Option<&StackEntry> {
        self.stack.iter().find(|e| e.view_id == view_id)
    }

    /// The first view below `view_id` that is shown or could be shown,
    /// skipping hidden independent views and entries still loading.
    #[must_use]
    pub fn previous_visible_view(&self, view_id: ViewId, scene: &NodeStore) -> Option<ViewId> {
        let i = self.index_of(view_id)?;
        self.stack[..i]
            .iter()
            .rev()
            .find(|e| match &e.instance {
                None => false,
                Some(instance) => {
                    instance.settings().show_type != ShowType::Independent
                        || scene.is_active(instance.node())
                }
            })
            .map(|e| e.view_id)
    }

    /// The top view of the stack, or of one layer.
    #[must_use]
    pub fn top_view(&self, layer: Option<LayerId>) -> Option<ViewId> {
        self.stack
            .iter()
            .rev()
            .find(|e| layer.is_none_or(|l| e.layer == l))
            .map(|e| e.view_id)
    }

    /// The number of stacked views, overall or in one layer.
    #[must_use]
    pub fn stack_len(&self, layer: Option<LayerId>) -> usize {
        self.stack
            .iter()
            .filter(|e| layer.is_none_or(|l| e.layer == l))
            .count()
    }

    /// The stacked entries, back to front.
    pub fn entries(&self) -> impl Iterator<Item = &StackEntry> {
        self.stack.iter()
    }

    /// Whether a closed instance of `view_id` is cached.
    #[must_use]
    pub fn is_cached(&self, view_id: ViewId) -> bool {
        self.cache.contains_key(&view_id)
    }

    /// The cached instance of a view.
    #[must_use]
    pub fn cached(&self, view_id: ViewId) -> Option<&ViewInstance> {
        self.cache.get(&view_id)
    }

    /// Whether an open is in flight.
    #[must_use]
    pub fn is_opening(&self) -> bool {
        self.opening.is_some()
    }

    /// Whether a close is in flight.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.closing.is_some()
    }

    /// Number of queued `(opens, closes)`.
    #[must_use]
    pub fn queued(&self) -> (usize, usize) {
        (self.open_queue.len(), self.close_queue.len())
    }

    /// Takes the trace events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        core::mem::take(&mut self.events)
    }

    // -- Internals --

    fn resolve_config(&self, view_id: ViewId) -> Result<&ViewConfig, OpenError> {
        self.config
            .get(&view_id)
            .ok_or(OpenError::NoConfig(view_id))
    }

    fn is_busy(&self) -> bool {
        self.opening.is_some() || self.closing.is_some()
    }

    fn index_of(&self, view_id: ViewId) -> Option<usize> {
        self.stack.iter().position(|e| e.view_id == view_id)
    }

    fn instance_mut(&mut self, view_id: ViewId) -> Option<&mut ViewInstance> {
        self.stack
            .iter_mut()
            .find(|e| e.view_id == view_id)
            .and_then(|e| e.instance.as_mut())
    }

    /// Next even z above the layer's top; odd values are left for manual
    /// placement.
    fn next_z_order(&self, layer: LayerId) -> i32 {
        let top = self
            .stack
            .iter()
            .rev()
            .find(|e| e.layer == layer)
            .map(|e| e.z_order);
        match top {
            None => 2,
            Some(z) if z % 2 == 0 => z + 2,
            Some(z) => z + 1,
        }
    }

    fn request(
        &mut self,
        view: ViewId,
        op: RequestOp,
        disposition: Disposition,
        sv: &Services<'_>,
    ) -> Disposition {
        self.record(UiEvent::Request(RequestEvent {
            at: sv.res.now(),
            view,
            op,
            disposition,
        }));
        disposition
    }

    fn lifecycle(&mut self, view: ViewId, stage: LifecycleStage, sv: &Services<'_>) {
        self.record(UiEvent::Lifecycle(LifecycleEvent {
            at: sv.res.now(),
            view,
            stage,
        }));
    }

    fn record(&mut self, e: UiEvent) {
        if cfg!(feature = "trace") {
            self.events.push(e);
        }
    }
}

fn prefab_from(
    view_id: ViewId,
    result: Result<Vec<AssetId>, LoadError>,
    res: &ResourceManager,
) -> Result<(AssetId, Prefab), OpenError> {
    let ids = result?;
    let asset = *ids.first().ok_or(OpenError::NotAPrefab(view_id))?;
    let prefab = res
        .assets()
        .get(asset)
        .and_then(|a| a.payload::<Prefab>())
        .ok_or(OpenError::NotAPrefab(view_id))?;
    Ok((asset, prefab.clone()))
}

fn create_blocker(layer: LayerId, z_order: i32, sv: &mut Services<'_>) -> NodeId {
    let container = sv.layers.get_layer(layer, sv.scene);
    let node = sv
        .scene
        .create_full_viewport(&format!("prevent_touch_{}_{z_order}", layer.0));
    sv.scene.set_order(node, z_order);
    sv.scene.set_tap(node, Some(TapHandler::Block));
    sv.scene.add_child(container, node);
    node
}

fn destroy_node(scene: &mut NodeStore, node: Option<NodeId>) {
    if let Some(node) = node
        && scene.is_alive(node)
    {
        scene.destroy_subtree(node);
    }
}
