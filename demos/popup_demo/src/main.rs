// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless walkthrough of the view stack.
//!
//! Opens a menu, a shop popup with a scale transition and a quick-close
//! background, a reward dialog over the shop, and an independent toast.
//! Every trace event is pretty-printed to stdout; pass `--chrome <path>`
//! to also write a Chrome trace of the run.

use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use kurbo::{Point, Size};
use scrim_core::backend::Presenter;
use scrim_core::res::{AssetKind, LoadArgs, MemoryLoader};
use scrim_core::runtime::{Runtime, RuntimeConfig};
use scrim_core::scene::{NodeStore, SceneChanges};
use scrim_core::time::Duration;
use scrim_core::trace::{
    AssetEvent, DisplayEvent, LifecycleEvent, OwnerEvent, ReleaseEvent, RequestEvent, TraceSink,
    VisibilityEvent,
};
use scrim_core::view::{
    CloseValue, Prefab, ScaleTransition, ShowType, View, ViewCx, ViewId, ViewSettings,
};
use scrim_debug::config::ViewManifest;
use scrim_debug::pretty::PrettyPrintSink;
use scrim_debug::recorder::RecorderSink;

const MENU: ViewId = ViewId(1);
const SHOP: ViewId = ViewId(2);
const REWARD: ViewId = ViewId(3);
const TOAST: ViewId = ViewId(4);

const FRAME: Duration = Duration::from_millis(16);

const MANIFEST: &str = r#"{
    "default_bundle": "ui",
    "views": {
        "1": { "asset_path": "prefabs/menu", "layer": 3 },
        "2": { "asset_path": "prefabs/shop", "layer": 4, "prevent_touch": true },
        "3": { "asset_path": "prefabs/reward", "layer": 4, "prevent_touch": true },
        "4": { "asset_path": "prefabs/toast", "layer": 5 }
    }
}"#;

struct Menu;

impl View for Menu {
    fn init(&mut self, cx: &mut ViewCx<'_>) {
        cx.add_node("play_button");
    }
}

#[derive(Default)]
struct Shop {
    coins: u32,
}

impl View for Shop {
    fn init(&mut self, cx: &mut ViewCx<'_>) {
        cx.add_node("item_grid");
        cx.load(
            LoadArgs::paths(["textures/shop_bg", "textures/coin"])
                .bundle("ui")
                .kind(AssetKind::Texture),
        );
    }

    fn on_top(&mut self, _cx: &mut ViewCx<'_>, from: ViewId, value: Option<CloseValue>) {
        if let Some(coins) = value.and_then(|v| v.downcast::<u32>().ok()) {
            self.coins += *coins;
            println!("    shop: {coins} coins from {from:?}, balance {}", self.coins);
        }
    }
}

struct Reward;

impl View for Reward {
    fn on_close(&mut self, _cx: &mut ViewCx<'_>) -> Option<CloseValue> {
        Some(Box::new(25_u32))
    }
}

struct Toast;

impl View for Toast {}

/// Counts what a native tree would have to apply.
#[derive(Debug, Default)]
struct CountingPresenter {
    frames: u32,
}

impl Presenter for CountingPresenter {
    fn apply(&mut self, store: &NodeStore, changes: &SceneChanges) {
        self.frames += 1;
        if changes.added.is_empty()
            && changes.removed.is_empty()
            && changes.shown.is_empty()
            && changes.hidden.is_empty()
        {
            return;
        }
        println!(
            "    present #{}: +{} -{} shown {} hidden {} ({} nodes)",
            self.frames,
            changes.added.len(),
            changes.removed.len(),
            changes.shown.len(),
            changes.hidden.len(),
            store.node_count(),
        );
    }
}

/// Prints every event and keeps a binary recording for export.
struct DemoSink {
    pretty: PrettyPrintSink,
    recording: Rc<RefCell<RecorderSink>>,
}

impl TraceSink for DemoSink {
    fn on_request(&mut self, e: &RequestEvent) {
        self.pretty.on_request(e);
        self.recording.borrow_mut().on_request(e);
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.pretty.on_lifecycle(e);
        self.recording.borrow_mut().on_lifecycle(e);
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        self.pretty.on_visibility(e);
        self.recording.borrow_mut().on_visibility(e);
    }

    fn on_owner_invalidated(&mut self, e: &OwnerEvent) {
        self.pretty.on_owner_invalidated(e);
        self.recording.borrow_mut().on_owner_invalidated(e);
    }

    fn on_owner_released(&mut self, e: &ReleaseEvent) {
        self.pretty.on_owner_released(e);
        self.recording.borrow_mut().on_owner_released(e);
    }

    fn on_asset_disposed(&mut self, e: &AssetEvent) {
        self.pretty.on_asset_disposed(e);
        self.recording.borrow_mut().on_asset_disposed(e);
    }

    fn on_display_change(&mut self, e: &DisplayEvent) {
        self.pretty.on_display_change(e);
        self.recording.borrow_mut().on_display_change(e);
    }
}

fn catalog() -> MemoryLoader {
    let mut loader = MemoryLoader::new()
        .with_default_bundle("ui")
        .with_latency(Duration::from_millis(48));

    loader.insert_value(
        "ui",
        "prefabs/menu",
        AssetKind::Prefab,
        Prefab::new(ViewSettings::DEFAULT, || Box::new(Menu)),
    );
    loader.insert_value(
        "ui",
        "prefabs/shop",
        AssetKind::Prefab,
        Prefab::new(
            ViewSettings::DEFAULT
                .with_show_type(ShowType::Addition)
                .with_quick_close()
                .with_cache()
                .with_delay_release(Duration::from_secs(2)),
            || Box::<Shop>::default(),
        )
        .with_transition(|| Box::new(ScaleTransition::new(Duration::from_millis(120)))),
    );
    loader.insert_value(
        "ui",
        "prefabs/reward",
        AssetKind::Prefab,
        Prefab::new(
            ViewSettings::DEFAULT.with_show_type(ShowType::Addition),
            || Box::new(Reward),
        ),
    );
    loader.insert_value(
        "ui",
        "prefabs/toast",
        AssetKind::Prefab,
        Prefab::new(
            ViewSettings::DEFAULT.with_show_type(ShowType::Independent),
            || Box::new(Toast),
        ),
    );
    for texture in ["textures/shop_bg", "textures/coin"] {
        loader.insert_value("ui", texture, AssetKind::Texture, ());
    }
    loader
}

fn run_frames(rt: &mut Runtime<MemoryLoader>, presenter: &mut CountingPresenter, frames: u32) {
    for _ in 0..frames {
        rt.update(FRAME);
        rt.present(presenter);
    }
}

fn step(title: &str) {
    println!("-- {title}");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let chrome_path = std::env::args().skip_while(|a| a != "--chrome").nth(1);

    let manifest = ViewManifest::from_json(MANIFEST)?;
    let mut rt = Runtime::new(catalog(), Size::new(1280.0, 720.0), RuntimeConfig::new());
    rt.init_config(manifest.into_table());
    let recording = Rc::new(RefCell::new(RecorderSink::new()));
    rt.set_trace_sink(Box::new(DemoSink {
        pretty: PrettyPrintSink::stdout(),
        recording: Rc::clone(&recording),
    }));
    rt.set_after_open(|id, over| println!("    after open {id:?} over {over:?}"));
    rt.set_after_close(|id| println!("    after close {id:?}"));

    let mut presenter = CountingPresenter::default();

    step("open menu, then shop while the menu is still loading");
    println!("    menu: {:?}", rt.open(MENU));
    println!("    shop: {:?}", rt.open(SHOP));
    run_frames(&mut rt, &mut presenter, 20);

    step("independent toast over everything");
    rt.open(TOAST);
    run_frames(&mut rt, &mut presenter, 5);

    step("reward dialog hands coins back to the shop");
    rt.open(REWARD);
    run_frames(&mut rt, &mut presenter, 5);
    rt.close(REWARD);
    run_frames(&mut rt, &mut presenter, 2);

    step("tap outside the shop content");
    let outcome = rt.tap(Point::new(10.0, 10.0));
    println!("    tap: {outcome:?}");
    run_frames(&mut rt, &mut presenter, 10);

    step("reopen shop from the view cache");
    rt.open(SHOP);
    run_frames(&mut rt, &mut presenter, 10);

    step("rotate to portrait");
    rt.resize(Size::new(720.0, 1280.0));
    run_frames(&mut rt, &mut presenter, 1);

    step("close everything but the menu and wait out release delays");
    rt.close_all(&[MENU]);
    rt.clear_cache();
    run_frames(&mut rt, &mut presenter, 500);
    println!(
        "    stack {:?}, {} assets alive",
        rt.top_view(None),
        rt.resources().assets().len()
    );

    if let Some(path) = chrome_path {
        let mut out = BufWriter::new(File::create(&path)?);
        scrim_debug::chrome::export(recording.borrow().as_bytes(), &mut out)?;
        println!("    wrote {path}");
    }
    Ok(())
}
