// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asset loading and reference-counted resource lifetimes.
//!
//! The pieces layer bottom-up:
//!
//! - [`AssetRegistry`] owns loaded assets and their reference counts, and is
//!   the only place an asset is disposed.
//! - [`ResourceLoader`] fills the registry from some backing store. Requests
//!   are described by [`LoadArgs`]; results arrive through callbacks.
//!   [`MemoryLoader`] is a catalog-backed implementation.
//! - [`ResourceManager`] maps owners to the assets they retain and decides
//!   when an owner's assets may be released.

mod args;
mod asset;
mod loader;
mod manager;
mod memory;

pub use args::{CompleteFn, LoadArgs, LoadSource, ProgressFn, RemoteOptions};
pub use asset::{Asset, AssetId, AssetKind, AssetRegistry, REMOTE_BUNDLE, Released};
pub use loader::{LoadError, ResourceLoader};
pub use manager::{OwnerId, ResourceCacheInfo, ResourceManager, SWEEP_INTERVAL};
pub use memory::MemoryLoader;
