// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The asset loader contract.

use alloc::string::String;

use super::args::LoadArgs;
use super::asset::{AssetKind, AssetRegistry};
use crate::time::Duration;

/// Why a load failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The bundle has no asset at the path.
    #[error("asset `{path}` not found in bundle `{bundle}`")]
    NotFound {
        /// Bundle searched.
        bundle: String,
        /// Path requested.
        path: String,
    },
    /// The bundle itself could not be opened.
    #[error("bundle `{0}` is not available")]
    BundleUnavailable(String),
    /// A remote fetch failed.
    #[error("remote fetch of `{url}` failed: {reason}")]
    Remote {
        /// URL requested.
        url: String,
        /// Transport-level reason.
        reason: String,
    },
    /// The asset exists but is of a different kind than requested.
    #[error("asset `{path}` is a {found:?}, expected {expected:?}")]
    WrongKind {
        /// Path requested.
        path: String,
        /// Kind requested.
        expected: AssetKind,
        /// Kind found.
        found: AssetKind,
    },
}

/// Loads assets into an [`AssetRegistry`].
///
/// Requests come in three shapes, selected by the [`LoadSource`] of the
/// [`LoadArgs`]: single or multiple paths within a bundle
/// ([`LoadArgs::path`], [`LoadArgs::paths`]), a whole directory
/// ([`LoadArgs::dir`]), or a remote URL ([`LoadArgs::remote`]).
///
/// Results and errors are reported only through the request's completion
/// callback, never by return value or panic. Completion may happen inside
/// [`load`](Self::load) or during a later [`update`](Self::update); callers
/// must handle both.
///
/// Loaders insert new assets with a reference count of zero and should
/// reuse a live asset already registered under the same bundle and path.
///
/// [`LoadSource`]: super::LoadSource
pub trait ResourceLoader {
    /// Starts a load.
    fn load(&mut self, args: LoadArgs, assets: &mut AssetRegistry);

    /// Advances in-flight loads, completing those that are ready.
    fn update(&mut self, dt: Duration, assets: &mut AssetRegistry) {
        _ = (dt, assets);
    }
}
