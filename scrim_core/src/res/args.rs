// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load requests.
//!
//! A [`LoadArgs`] names what to load ([`LoadSource`]) and carries the
//! optional pieces of a request as named builder fields: bundle, expected
//! kind, progress and completion callbacks, and the owner that should retain
//! the result.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use super::asset::{AssetId, AssetKind};
use super::loader::LoadError;
use super::manager::OwnerId;

/// Progress callback: `(completed, total)`.
pub type ProgressFn = Box<dyn FnMut(usize, usize)>;

/// Completion callback. Receives every loaded handle, in request order, or
/// the first error.
pub type CompleteFn = Box<dyn FnOnce(Result<Vec<AssetId>, LoadError>)>;

/// Options for remote loads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteOptions {
    /// File extension hint when the URL has none (e.g. `".png"`).
    pub ext: Option<String>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

/// What a request loads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadSource {
    /// A single asset path within a bundle.
    Path(String),
    /// Several asset paths within a bundle.
    Paths(Vec<String>),
    /// Every asset under a directory within a bundle.
    Dir(String),
    /// An asset fetched from a URL.
    Remote {
        /// The URL.
        url: String,
        /// Fetch options.
        options: RemoteOptions,
    },
}

/// A load request.
pub struct LoadArgs {
    pub(crate) bundle: Option<String>,
    pub(crate) source: LoadSource,
    pub(crate) kind: Option<AssetKind>,
    pub(crate) keeper: Option<OwnerId>,
    pub(crate) on_progress: Option<ProgressFn>,
    pub(crate) on_complete: Option<CompleteFn>,
}

impl fmt::Debug for LoadArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadArgs")
            .field("bundle", &self.bundle)
            .field("source", &self.source)
            .field("kind", &self.kind)
            .field("keeper", &self.keeper)
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl LoadArgs {
    fn with_source(source: LoadSource) -> Self {
        Self {
            bundle: None,
            source,
            kind: None,
            keeper: None,
            on_progress: None,
            on_complete: None,
        }
    }

    /// Requests a single asset.
    #[must_use]
    pub fn path(path: impl Into<String>) -> Self {
        Self::with_source(LoadSource::Path(path.into()))
    }

    /// Requests several assets; completion reports them in the given order.
    #[must_use]
    pub fn paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_source(LoadSource::Paths(
            paths.into_iter().map(Into::into).collect(),
        ))
    }

    /// Requests every asset under a directory.
    #[must_use]
    pub fn dir(dir: impl Into<String>) -> Self {
        Self::with_source(LoadSource::Dir(dir.into()))
    }

    /// Requests an asset by URL.
    #[must_use]
    pub fn remote(url: impl Into<String>) -> Self {
        Self::with_source(LoadSource::Remote {
            url: url.into(),
            options: RemoteOptions::default(),
        })
    }

    /// Sets the bundle. Without one, the loader's default bundle is used.
    #[must_use]
    pub fn bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    /// Restricts the request to assets of the given kind.
    #[must_use]
    pub fn kind(mut self, kind: AssetKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets remote fetch options. Ignored for bundle sources.
    #[must_use]
    pub fn options(mut self, options: RemoteOptions) -> Self {
        if let LoadSource::Remote { options: o, .. } = &mut self.source {
            *o = options;
        }
        self
    }

    /// Retains every loaded asset for `owner` once the load succeeds.
    ///
    /// Only honoured when the request goes through
    /// [`ResourceManager::load`](super::ResourceManager::load).
    #[must_use]
    pub fn keeper(mut self, owner: OwnerId) -> Self {
        self.keeper = Some(owner);
        self
    }

    /// Sets the progress callback.
    #[must_use]
    pub fn on_progress(mut self, f: impl FnMut(usize, usize) + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Sets an already boxed progress callback, if any.
    #[must_use]
    pub fn on_progress_boxed(mut self, f: Option<ProgressFn>) -> Self {
        self.on_progress = f;
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn on_complete(
        mut self,
        f: impl FnOnce(Result<Vec<AssetId>, LoadError>) + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// The requested bundle, if one was set.
    #[must_use]
    pub fn bundle_name(&self) -> Option<&str> {
        self.bundle.as_deref()
    }

    /// What is being loaded.
    #[must_use]
    pub fn source(&self) -> &LoadSource {
        &self.source
    }

    /// The expected kind, if one was set.
    #[must_use]
    pub fn expected_kind(&self) -> Option<AssetKind> {
        self.kind
    }

    /// The owner that will retain the result, if any.
    #[must_use]
    pub fn keeper_owner(&self) -> Option<OwnerId> {
        self.keeper
    }

    /// Reports progress to the request's progress callback, if any.
    pub fn report_progress(&mut self, completed: usize, total: usize) {
        if let Some(f) = &mut self.on_progress {
            f(completed, total);
        }
    }

    /// Delivers the result to the completion callback, if any.
    pub fn complete(mut self, result: Result<Vec<AssetId>, LoadError>) {
        if let Some(f) = self.on_complete.take() {
            f(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;

    #[test]
    fn builder_sets_named_fields() {
        let args = LoadArgs::path("ui/shop")
            .bundle("shop")
            .kind(AssetKind::Prefab);
        assert_eq!(args.bundle_name(), Some("shop"));
        assert_eq!(args.source(), &LoadSource::Path("ui/shop".to_string()));
        assert_eq!(args.expected_kind(), Some(AssetKind::Prefab));
        assert_eq!(args.keeper_owner(), None);
    }

    #[test]
    fn options_only_apply_to_remote_sources() {
        let opts = RemoteOptions {
            ext: Some(".png".to_string()),
            headers: vec![],
        };
        let remote = LoadArgs::remote("https://cdn.example.com/a").options(opts.clone());
        assert_eq!(
            remote.source(),
            &LoadSource::Remote {
                url: "https://cdn.example.com/a".to_string(),
                options: opts.clone(),
            }
        );
        let local = LoadArgs::dir("ui").options(opts);
        assert_eq!(local.source(), &LoadSource::Dir("ui".to_string()));
    }

    #[test]
    fn callbacks_fire() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let progress = Rc::clone(&seen);
        let done = Rc::new(RefCell::new(None));
        let done_in = Rc::clone(&done);
        let mut args = LoadArgs::paths(["a", "b"])
            .on_progress(move |c, t| progress.borrow_mut().push((c, t)))
            .on_complete(move |r| *done_in.borrow_mut() = Some(r.map(|ids| ids.len())));
        args.report_progress(1, 2);
        args.report_progress(2, 2);
        args.complete(Ok(Vec::new()));
        assert_eq!(*seen.borrow(), [(1, 2), (2, 2)]);
        assert_eq!(*done.borrow(), Some(Ok(0)));
    }
}
