// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layered view stack orchestration for retained-mode UI.
//!
//! `scrim_core` manages which views are open, in which layer, in what order,
//! and which of them are visible. It owns the lifetime of the resources each
//! view loads and coordinates open and close transitions. It is `no_std`
//! compatible (with `alloc`) and single-threaded: asynchronous work is
//! completed by polling [`Runtime::update`](runtime::Runtime::update).
//!
//! # Architecture
//!
//! ```text
//!   open / close / tap
//!       │
//!       ▼
//!   ViewStack ──► ResourceManager::load() ──► ResourceLoader
//!       │                                          │
//!       │◄──────────── LoadDone (inbox) ◄──────────┘
//!       ▼
//!   ViewInstance ──► NodeStore (layer containers) ──► Presenter::apply()
//!       │
//!       ▼
//!   Transition::advance() (per update)
//! ```
//!
//! **[`scene`]**: Struct-of-arrays node tree with generational handles,
//! frames, draw order, activity, and hit testing.
//!
//! **[`dirty`]**: Multi-channel dirty tracking via `understory_dirty`.
//!
//! **[`layer`]**: The fixed set of full-viewport layer containers.
//!
//! **[`res`]**: Reference-counted asset cache with owners, delayed release,
//! and the [`ResourceLoader`](res::ResourceLoader) seam.
//!
//! **[`view`]**: Views, their configuration, transitions, and the
//! [`ViewStack`](view::ViewStack) controller.
//!
//! **[`runtime`]**: Owns all of the above and drives them from one
//! `update` call per frame.
//!
//! **[`backend`]**: The [`Presenter`](backend::Presenter) trait that
//! platform backends implement to mirror scene changes.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Records lifecycle, visibility, resource,
//!   and display events and forwards them to the installed sink.
//! - `serde` (disabled by default): `Serialize`/`Deserialize` for view
//!   configuration types.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod dirty;
pub mod layer;
pub mod res;
pub mod runtime;
pub mod scene;
pub mod time;
pub mod trace;
pub mod view;
