// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory catalog loader.
//!
//! [`MemoryLoader`] serves assets from factories registered up front. It is
//! the loader used by tests and demos, and a reference for platform loaders:
//! it can complete synchronously or after a simulated latency, reports
//! progress per item, and reuses assets that are still alive in the
//! registry.

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet, VecDeque};
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use super::args::{LoadArgs, LoadSource};
use super::asset::{AssetId, AssetKind, AssetRegistry, REMOTE_BUNDLE};
use super::loader::{LoadError, ResourceLoader};
use crate::time::Duration;

type Factory = Rc<dyn Fn() -> Box<dyn Any>>;

#[derive(Clone)]
struct CatalogEntry {
    kind: AssetKind,
    make: Factory,
}

struct Pending {
    remaining: Duration,
    args: LoadArgs,
}

/// Serves assets from an in-memory catalog.
pub struct MemoryLoader {
    bundles: BTreeMap<String, BTreeMap<String, CatalogEntry>>,
    remote: BTreeMap<String, CatalogEntry>,
    unavailable: BTreeSet<String>,
    default_bundle: String,
    latency: Duration,
    pending: VecDeque<Pending>,
    fetches: usize,
}

impl fmt::Debug for MemoryLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryLoader")
            .field("bundles", &self.bundles.keys().collect::<Vec<_>>())
            .field("default_bundle", &self.default_bundle)
            .field("latency", &self.latency)
            .field("pending", &self.pending.len())
            .field("fetches", &self.fetches)
            .finish_non_exhaustive()
    }
}

impl Default for MemoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLoader {
    /// Creates an empty loader that completes synchronously and defaults to
    /// the `resources` bundle.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bundles: BTreeMap::new(),
            remote: BTreeMap::new(),
            unavailable: BTreeSet::new(),
            default_bundle: "resources".to_string(),
            latency: Duration::ZERO,
            pending: VecDeque::new(),
            fetches: 0,
        }
    }

    /// Delays every completion by `latency` of [`update`](ResourceLoader::update) time.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Sets the bundle used by requests that name none.
    #[must_use]
    pub fn with_default_bundle(mut self, bundle: impl Into<String>) -> Self {
        self.default_bundle = bundle.into();
        self
    }

    /// Registers an asset factory at `path` in `bundle`.
    pub fn insert(
        &mut self,
        bundle: &str,
        path: &str,
        kind: AssetKind,
        make: impl Fn() -> Box<dyn Any> + 'static,
    ) {
        self.bundles.entry(bundle.to_string()).or_default().insert(
            path.to_string(),
            CatalogEntry {
                kind,
                make: Rc::new(make),
            },
        );
    }

    /// Registers a value that is cloned into every fresh load.
    pub fn insert_value<T: Clone + 'static>(
        &mut self,
        bundle: &str,
        path: &str,
        kind: AssetKind,
        value: T,
    ) {
        self.insert(bundle, path, kind, move || Box::new(value.clone()));
    }

    /// Registers an asset served for `url`.
    pub fn insert_remote(
        &mut self,
        url: &str,
        kind: AssetKind,
        make: impl Fn() -> Box<dyn Any> + 'static,
    ) {
        self.remote.insert(
            url.to_string(),
            CatalogEntry {
                kind,
                make: Rc::new(make),
            },
        );
    }

    /// Removes a registered asset; later loads of it fail with
    /// [`LoadError::NotFound`].
    pub fn remove(&mut self, bundle: &str, path: &str) {
        if let Some(entries) = self.bundles.get_mut(bundle) {
            entries.remove(path);
        }
    }

    /// Marks a bundle as unavailable (or available again).
    pub fn set_bundle_available(&mut self, bundle: &str, available: bool) {
        if available {
            self.unavailable.remove(bundle);
        } else {
            self.unavailable.insert(bundle.to_string());
        }
    }

    /// Number of assets actually constructed (cache hits excluded).
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Number of requests waiting for their latency to elapse.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn resolve(&mut self, mut args: LoadArgs, assets: &mut AssetRegistry) {
        let result = self.fetch_all(&mut args, assets);
        args.complete(result);
    }

    fn fetch_all(
        &mut self,
        args: &mut LoadArgs,
        assets: &mut AssetRegistry,
    ) -> Result<Vec<AssetId>, LoadError> {
        let bundle = args
            .bundle_name()
            .unwrap_or(&self.default_bundle)
            .to_string();

        let targets: Vec<(String, String, Option<CatalogEntry>)> = match args.source() {
            LoadSource::Remote { url, .. } => {
                let entry = self.remote.get(url).cloned();
                if entry.is_none() {
                    return Err(LoadError::Remote {
                        url: url.clone(),
                        reason: "no such resource".to_string(),
                    });
                }
                alloc::vec![(REMOTE_BUNDLE.to_string(), url.clone(), entry)]
            }
            source => {
                if self.unavailable.contains(&bundle) {
                    return Err(LoadError::BundleUnavailable(bundle));
                }
                let catalog = self.bundles.get(&bundle);
                let lookup = |path: &String| catalog.and_then(|c| c.get(path)).cloned();
                match source {
                    LoadSource::Path(path) => {
                        alloc::vec![(bundle.clone(), path.clone(), lookup(path))]
                    }
                    LoadSource::Paths(paths) => paths
                        .iter()
                        .map(|p| (bundle.clone(), p.clone(), lookup(p)))
                        .collect(),
                    LoadSource::Dir(dir) => {
                        let prefix = if dir.is_empty() || dir.ends_with('/') {
                            dir.clone()
                        } else {
                            alloc::format!("{dir}/")
                        };
                        catalog
                            .into_iter()
                            .flat_map(|c| c.iter())
                            .filter(|(p, _)| p.starts_with(&prefix))
                            .map(|(p, e)| (bundle.clone(), p.clone(), Some(e.clone())))
                            .collect()
                    }
                    LoadSource::Remote { .. } => Vec::new(),
                }
            }
        };

        let total = targets.len();
        let mut ids = Vec::with_capacity(total);
        for (i, (bundle, path, entry)) in targets.into_iter().enumerate() {
            let Some(entry) = entry else {
                return Err(LoadError::NotFound { bundle, path });
            };
            if let Some(expected) = args.expected_kind()
                && expected != entry.kind
            {
                return Err(LoadError::WrongKind {
                    path,
                    expected,
                    found: entry.kind,
                });
            }
            let id = match assets.find(&bundle, &path) {
                Some(id) => id,
                None => {
                    self.fetches += 1;
                    assets.insert(&bundle, &path, entry.kind, (entry.make)())
                }
            };
            ids.push(id);
            args.report_progress(i + 1, total);
        }
        Ok(ids)
    }
}

impl ResourceLoader for MemoryLoader {
    fn load(&mut self, args: LoadArgs, assets: &mut AssetRegistry) {
        if self.latency.is_zero() {
            self.resolve(args, assets);
        } else {
            self.pending.push_back(Pending {
                remaining: self.latency,
                args,
            });
        }
    }

    fn update(&mut self, dt: Duration, assets: &mut AssetRegistry) {
        for p in &mut self.pending {
            p.remaining = p.remaining.saturating_sub(dt);
        }
        while self
            .pending
            .front()
            .is_some_and(|p| p.remaining.is_zero())
        {
            if let Some(p) = self.pending.pop_front() {
                self.resolve(p.args, assets);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::RefCell;

    use super::*;

    type Slot = Rc<RefCell<Option<Result<Vec<AssetId>, LoadError>>>>;

    fn capture(args: LoadArgs) -> (LoadArgs, Slot) {
        let slot: Slot = Rc::new(RefCell::new(None));
        let s = Rc::clone(&slot);
        (args.on_complete(move |r| *s.borrow_mut() = Some(r)), slot)
    }

    fn catalog() -> MemoryLoader {
        let mut loader = MemoryLoader::new();
        loader.insert_value("resources", "ui/a", AssetKind::Texture, 1_u32);
        loader.insert_value("resources", "ui/b", AssetKind::Texture, 2_u32);
        loader.insert_value("resources", "audio/c", AssetKind::Audio, 3_u32);
        loader.insert_value("shop", "ui/a", AssetKind::Texture, 4_u32);
        loader
    }

    #[test]
    fn single_path_uses_default_bundle() {
        let mut loader = catalog();
        let mut assets = AssetRegistry::new();
        let (args, slot) = capture(LoadArgs::path("ui/a"));
        loader.load(args, &mut assets);

        let ids = slot.borrow_mut().take().unwrap().unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(assets.get(ids[0]).unwrap().payload::<u32>(), Some(&1));
        assert_eq!(assets.get(ids[0]).unwrap().bundle(), "resources");
    }

    #[test]
    fn named_bundle_is_respected() {
        let mut loader = catalog();
        let mut assets = AssetRegistry::new();
        let (args, slot) = capture(LoadArgs::path("ui/a").bundle("shop"));
        loader.load(args, &mut assets);
        let ids = slot.borrow_mut().take().unwrap().unwrap();
        assert_eq!(assets.get(ids[0]).unwrap().payload::<u32>(), Some(&4));
    }

    #[test]
    fn directory_load_reports_progress() {
        let mut loader = catalog();
        let mut assets = AssetRegistry::new();
        let progress = Rc::new(RefCell::new(Vec::new()));
        let p = Rc::clone(&progress);
        let (args, slot) = capture(
            LoadArgs::dir("ui").on_progress(move |c, t| p.borrow_mut().push((c, t))),
        );
        loader.load(args, &mut assets);
        let ids = slot.borrow_mut().take().unwrap().unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(*progress.borrow(), [(1, 2), (2, 2)]);
    }

    #[test]
    fn missing_asset_fails_through_callback() {
        let mut loader = catalog();
        let mut assets = AssetRegistry::new();
        let (args, slot) = capture(LoadArgs::paths(["ui/a", "ui/missing"]));
        loader.load(args, &mut assets);
        assert_eq!(
            slot.borrow_mut().take().unwrap(),
            Err(LoadError::NotFound {
                bundle: "resources".to_string(),
                path: "ui/missing".to_string(),
            })
        );
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let mut loader = catalog();
        let mut assets = AssetRegistry::new();
        let (args, slot) = capture(LoadArgs::path("audio/c").kind(AssetKind::Prefab));
        loader.load(args, &mut assets);
        assert!(matches!(
            slot.borrow_mut().take().unwrap(),
            Err(LoadError::WrongKind { .. })
        ));
    }

    #[test]
    fn unavailable_bundle_fails() {
        let mut loader = catalog();
        loader.set_bundle_available("shop", false);
        let mut assets = AssetRegistry::new();
        let (args, slot) = capture(LoadArgs::path("ui/a").bundle("shop"));
        loader.load(args, &mut assets);
        assert_eq!(
            slot.borrow_mut().take().unwrap(),
            Err(LoadError::BundleUnavailable("shop".to_string()))
        );
    }

    #[test]
    fn remote_loads_use_the_remote_catalog() {
        let mut loader = catalog();
        loader.insert_remote("https://cdn.example.com/banner", AssetKind::Texture, || {
            Box::new(9_u32)
        });
        let mut assets = AssetRegistry::new();
        let (args, slot) = capture(LoadArgs::remote("https://cdn.example.com/banner"));
        loader.load(args, &mut assets);
        let ids = slot.borrow_mut().take().unwrap().unwrap();
        assert_eq!(assets.get(ids[0]).unwrap().bundle(), REMOTE_BUNDLE);

        let (args, slot) = capture(LoadArgs::remote("https://cdn.example.com/nope"));
        loader.load(args, &mut assets);
        assert!(matches!(
            slot.borrow_mut().take().unwrap(),
            Err(LoadError::Remote { .. })
        ));
    }

    #[test]
    fn live_assets_are_reused() {
        let mut loader = catalog();
        let mut assets = AssetRegistry::new();
        let (first, a) = capture(LoadArgs::path("ui/a"));
        let (second, b) = capture(LoadArgs::path("ui/a"));
        loader.load(first, &mut assets);
        loader.load(second, &mut assets);
        assert_eq!(
            a.borrow_mut().take().unwrap(),
            b.borrow_mut().take().unwrap()
        );
        assert_eq!(loader.fetch_count(), 1);
    }

    #[test]
    fn latency_defers_completion() {
        let mut loader = catalog().with_latency(Duration::from_millis(100));
        let mut assets = AssetRegistry::new();
        let (args, slot) = capture(LoadArgs::path("ui/a"));
        loader.load(args, &mut assets);
        assert!(slot.borrow().is_none());
        assert_eq!(loader.pending_count(), 1);

        loader.update(Duration::from_millis(60), &mut assets);
        assert!(slot.borrow().is_none());
        loader.update(Duration::from_millis(40), &mut assets);
        assert!(slot.borrow().is_some());
        assert_eq!(loader.pending_count(), 0);
    }
}
