// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-owner resource retention with delayed release.
//!
//! Every holder of assets (typically a view instance) is an *owner*. The
//! manager tracks, per owner, the set of assets it retains. Retaining an
//! asset bumps its count in the [`AssetRegistry`] exactly once per
//! (owner, asset) pair; releasing drops it again.
//!
//! Owners are released in two steps. [`invalidate`](ResourceManager::invalidate)
//! stamps the owner as dead without releasing anything. A later non-forced
//! [`release_all`](ResourceManager::release_all) releases the retained set
//! once the owner's delay has elapsed since that stamp. The periodic sweep
//! in [`update`](ResourceManager::update) retries those releases and also
//! stamps owners whose container disappeared without an explicit
//! invalidation.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use super::args::LoadArgs;
use super::asset::{AssetId, AssetRegistry, Released};
use super::loader::{LoadError, ResourceLoader};
use crate::scene::{NodeId, NodeStore};
use crate::time::{Duration, HostTime};
use crate::trace::{AssetEvent, OwnerEvent, ReleaseEvent, UiEvent};

/// Default interval between sweeps.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Identifies a resource owner.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(pub(crate) u64);

impl OwnerId {
    /// Returns the raw id (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.0)
    }
}

/// Per-owner retention state.
#[derive(Clone, Debug, Default)]
pub struct ResourceCacheInfo {
    retained: BTreeSet<AssetId>,
    delay: Duration,
    invalidated_at: Option<HostTime>,
}

impl ResourceCacheInfo {
    /// The retained assets.
    #[must_use]
    pub fn retained(&self) -> &BTreeSet<AssetId> {
        &self.retained
    }

    /// How long after invalidation the retained set may be released.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// When the owner was invalidated, if it has been.
    #[must_use]
    pub fn invalidated_at(&self) -> Option<HostTime> {
        self.invalidated_at
    }
}

#[derive(Clone, Copy, Debug)]
struct OwnerProfile {
    delay: Duration,
    container: Option<NodeId>,
}

type KeptInbox = Rc<RefCell<Vec<(OwnerId, Vec<AssetId>)>>>;

/// Tracks which owner retains which assets, and when they may be released.
#[derive(Debug)]
pub struct ResourceManager {
    assets: AssetRegistry,
    profiles: BTreeMap<OwnerId, OwnerProfile>,
    cache: BTreeMap<OwnerId, ResourceCacheInfo>,
    next_owner: u64,
    now: HostTime,
    since_sweep: Duration,
    sweep_interval: Duration,
    kept: KeptInbox,
    events: Vec<UiEvent>,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(SWEEP_INTERVAL)
    }
}

impl ResourceManager {
    /// Creates a manager that sweeps every `sweep_interval`.
    #[must_use]
    pub fn new(sweep_interval: Duration) -> Self {
        Self {
            assets: AssetRegistry::new(),
            profiles: BTreeMap::new(),
            cache: BTreeMap::new(),
            next_owner: 1,
            now: HostTime::ZERO,
            since_sweep: Duration::ZERO,
            sweep_interval,
            kept: Rc::default(),
            events: Vec::new(),
        }
    }

    /// The runtime clock.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.now
    }

    /// The asset registry.
    #[must_use]
    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    /// Mutable access to the asset registry, for loaders.
    pub fn assets_mut(&mut self) -> &mut AssetRegistry {
        &mut self.assets
    }

    // -- Owners --

    /// Registers a new owner.
    ///
    /// `delay` is how long its assets survive after invalidation. When a
    /// `container` is given, the sweep invalidates the owner once that node
    /// is destroyed.
    pub fn register_owner(&mut self, delay: Duration, container: Option<NodeId>) -> OwnerId {
        let id = OwnerId(self.next_owner);
        self.next_owner += 1;
        self.profiles
            .insert(id, OwnerProfile { delay, container });
        id
    }

    /// Returns the retention state of an owner that currently retains assets.
    #[must_use]
    pub fn cache_info(&self, owner: OwnerId) -> Option<&ResourceCacheInfo> {
        self.cache.get(&owner)
    }

    /// Returns whether `owner` retains `asset`.
    #[must_use]
    pub fn retains(&self, owner: OwnerId, asset: AssetId) -> bool {
        self.cache
            .get(&owner)
            .is_some_and(|info| info.retained.contains(&asset))
    }

    /// Whether `owner` was invalidated and no longer retains anything.
    ///
    /// Profiles are dropped exactly when that happens, so a registered id
    /// without one is dead.
    #[must_use]
    pub fn is_retired(&self, owner: OwnerId) -> bool {
        owner.0 < self.next_owner && !self.profiles.contains_key(&owner)
    }

    /// Number of owners that currently retain assets.
    #[must_use]
    pub fn tracked_owners(&self) -> usize {
        self.cache.len()
    }

    // -- Retention API --

    /// Retains `asset` for `owner`.
    ///
    /// Idempotent per pair: the asset's count is incremented only the first
    /// time the owner retains it. An owner that was already invalidated and
    /// released retains nothing; the asset is disposed at once unless
    /// someone else holds it.
    pub fn acquire(&mut self, owner: OwnerId, asset: AssetId) {
        if !self.assets.is_alive(asset) {
            log::warn!("{owner:?} tried to retain disposed asset {asset:?}");
            return;
        }
        if self.is_retired(owner) {
            log::debug!("{owner:?} is gone, dropping late asset {asset:?}");
            self.assets.add_ref(asset);
            self.release_one(asset);
            return;
        }
        let delay = self
            .profiles
            .get(&owner)
            .map_or(Duration::ZERO, |p| p.delay);
        let info = self.cache.entry(owner).or_insert_with(|| ResourceCacheInfo {
            retained: BTreeSet::new(),
            delay,
            invalidated_at: None,
        });
        if info.retained.insert(asset) {
            self.assets.add_ref(asset);
        }
    }

    /// Stamps `owner` as invalidated at the current time.
    ///
    /// Releases nothing. A second call keeps the first stamp. No-op for an
    /// owner that retains nothing.
    pub fn invalidate(&mut self, owner: OwnerId) {
        let Some(info) = self.cache.get_mut(&owner) else {
            self.profiles.remove(&owner);
            return;
        };
        if info.invalidated_at.is_none() {
            info.invalidated_at = Some(self.now);
            let e = UiEvent::OwnerInvalidated(OwnerEvent {
                at: self.now,
                owner: owner.0,
            });
            self.record(e);
        }
    }

    /// Releases everything `owner` retains.
    ///
    /// With `force`, releases unconditionally. Otherwise releases only if the
    /// owner was invalidated and its delay has elapsed since. Returns the
    /// number of assets released.
    pub fn release_all(&mut self, owner: OwnerId, force: bool) -> usize {
        let Some(info) = self.cache.get(&owner) else {
            return 0;
        };
        if !force {
            let Some(at) = info.invalidated_at else {
                return 0;
            };
            if self.now.saturating_duration_since(at) < info.delay {
                return 0;
            }
        }
        let Some(info) = self.cache.remove(&owner) else {
            return 0;
        };
        if info.invalidated_at.is_some() {
            self.profiles.remove(&owner);
        }
        let released = info.retained.len();
        for asset in info.retained {
            self.release_one(asset);
        }
        let e = UiEvent::OwnerReleased(ReleaseEvent {
            at: self.now,
            owner: owner.0,
            released: u32::try_from(released).unwrap_or(u32::MAX),
            forced: force,
        });
        self.record(e);
        released
    }

    /// Releases only the given assets from `owner`, immediately.
    ///
    /// Assets the owner does not retain are ignored. Returns the number
    /// released.
    pub fn release_specific(&mut self, owner: OwnerId, assets: &[AssetId]) -> usize {
        let Some(info) = self.cache.get_mut(&owner) else {
            return 0;
        };
        let doomed: Vec<AssetId> = assets
            .iter()
            .copied()
            .filter(|a| info.retained.remove(a))
            .collect();
        if info.retained.is_empty() {
            self.cache.remove(&owner);
        }
        for &asset in &doomed {
            self.release_one(asset);
        }
        doomed.len()
    }

    /// Runs [`release_all`](Self::release_all) on every tracked owner not
    /// in `ignore`. Returns the total number released.
    pub fn release_everything(&mut self, ignore: &[OwnerId], force: bool) -> usize {
        let owners: Vec<OwnerId> = self
            .cache
            .keys()
            .copied()
            .filter(|o| !ignore.contains(o))
            .collect();
        owners
            .into_iter()
            .map(|o| self.release_all(o, force))
            .sum()
    }

    // -- Time --

    /// Advances the clock and sweeps once per interval.
    ///
    /// The sweep stamps owners whose container is no longer alive in
    /// `scene`, then attempts a non-forced release of every tracked owner.
    pub fn update(&mut self, dt: Duration, scene: &NodeStore) {
        self.now = self.now.saturating_add(dt);
        self.since_sweep += dt;
        if self.since_sweep >= self.sweep_interval {
            self.since_sweep = Duration::ZERO;
            self.sweep(scene);
        }
    }

    fn sweep(&mut self, scene: &NodeStore) {
        let owners: Vec<OwnerId> = self.cache.keys().copied().collect();
        for owner in owners {
            let orphaned = self
                .profiles
                .get(&owner)
                .and_then(|p| p.container)
                .is_some_and(|node| !scene.is_alive(node));
            if orphaned {
                self.invalidate(owner);
            }
            self.release_all(owner, false);
        }
    }

    // -- Loading --

    /// Starts a load, retaining the result for the request's
    /// [`keeper`](LoadArgs::keeper) when it succeeds.
    pub fn load(&mut self, loader: &mut dyn ResourceLoader, mut args: LoadArgs) {
        if let Some(owner) = args.keeper {
            let kept = Rc::clone(&self.kept);
            let user = args.on_complete.take();
            args.on_complete = Some(alloc::boxed::Box::new(
                move |result: Result<Vec<AssetId>, LoadError>| {
                    if let Ok(ids) = &result {
                        kept.borrow_mut().push((owner, ids.clone()));
                    }
                    if let Some(f) = user {
                        f(result);
                    }
                },
            ));
        }
        loader.load(args, &mut self.assets);
        self.flush_kept();
    }

    /// Applies retention for keeper loads that completed since the last call.
    pub fn flush_kept(&mut self) {
        let kept = core::mem::take(&mut *self.kept.borrow_mut());
        for (owner, ids) in kept {
            for id in ids {
                self.acquire(owner, id);
            }
        }
    }

    /// Takes the trace events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        core::mem::take(&mut self.events)
    }

    fn release_one(&mut self, asset: AssetId) {
        if let Some(Released::Disposed) = self.assets.dec_ref(asset) {
            let e = UiEvent::AssetDisposed(AssetEvent {
                at: self.now,
                asset: asset.index(),
            });
            self.record(e);
        }
    }

    fn record(&mut self, e: UiEvent) {
        if cfg!(feature = "trace") {
            self.events.push(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use kurbo::Size;

    use super::*;
    use crate::res::{AssetKind, MemoryLoader};

    fn asset(res: &mut ResourceManager, path: &str) -> AssetId {
        res.assets_mut()
            .insert("resources", path, AssetKind::Texture, Box::new(()))
    }

    #[test]
    fn acquire_is_idempotent_per_pair() {
        let mut res = ResourceManager::default();
        let owner = res.register_owner(Duration::ZERO, None);
        let a = asset(&mut res, "a");
        res.acquire(owner, a);
        res.acquire(owner, a);
        assert_eq!(res.assets().ref_count(a), Some(1));
        assert!(res.retains(owner, a));

        let other = res.register_owner(Duration::ZERO, None);
        res.acquire(other, a);
        assert_eq!(res.assets().ref_count(a), Some(2));
    }

    #[test]
    fn forced_release_drops_everything() {
        let mut res = ResourceManager::default();
        let owner = res.register_owner(Duration::from_secs(60), None);
        let a = asset(&mut res, "a");
        let b = asset(&mut res, "b");
        res.acquire(owner, a);
        res.acquire(owner, b);

        assert_eq!(res.release_all(owner, true), 2);
        assert!(!res.assets().is_alive(a));
        assert!(!res.assets().is_alive(b));
        assert!(res.cache_info(owner).is_none());
    }

    #[test]
    fn non_forced_release_waits_for_invalidation_and_delay() {
        let mut res = ResourceManager::default();
        let scene = NodeStore::new(Size::new(1.0, 1.0));
        let owner = res.register_owner(Duration::from_secs(2), None);
        let a = asset(&mut res, "a");
        res.acquire(owner, a);

        assert_eq!(res.release_all(owner, false), 0, "not invalidated yet");

        res.invalidate(owner);
        assert_eq!(res.release_all(owner, false), 0, "delay not elapsed");

        res.update(Duration::from_millis(1_500), &scene);
        assert_eq!(res.release_all(owner, false), 0);

        res.update(Duration::from_millis(500), &scene);
        assert_eq!(res.release_all(owner, false), 1);
        assert!(!res.assets().is_alive(a));
    }

    #[test]
    fn invalidation_keeps_first_stamp() {
        let mut res = ResourceManager::default();
        let scene = NodeStore::new(Size::new(1.0, 1.0));
        let owner = res.register_owner(Duration::from_secs(1), None);
        let a = asset(&mut res, "a");
        res.acquire(owner, a);

        res.invalidate(owner);
        let first = res.cache_info(owner).unwrap().invalidated_at();
        res.update(Duration::from_millis(300), &scene);
        res.invalidate(owner);
        assert_eq!(res.cache_info(owner).unwrap().invalidated_at(), first);
    }

    #[test]
    fn shared_assets_survive_one_owner() {
        let mut res = ResourceManager::default();
        let first = res.register_owner(Duration::ZERO, None);
        let second = res.register_owner(Duration::ZERO, None);
        let a = asset(&mut res, "a");
        res.acquire(first, a);
        res.acquire(second, a);

        res.invalidate(first);
        assert_eq!(res.release_all(first, false), 1);
        assert_eq!(res.assets().ref_count(a), Some(1));
    }

    #[test]
    fn release_specific_only_touches_subset() {
        let mut res = ResourceManager::default();
        let owner = res.register_owner(Duration::ZERO, None);
        let a = asset(&mut res, "a");
        let b = asset(&mut res, "b");
        let stray = asset(&mut res, "stray");
        res.acquire(owner, a);
        res.acquire(owner, b);

        assert_eq!(res.release_specific(owner, &[a, stray]), 1);
        assert!(!res.retains(owner, a));
        assert!(res.retains(owner, b));
        assert!(res.assets().is_alive(stray), "unretained asset untouched");

        assert_eq!(res.release_specific(owner, &[b]), 1);
        assert!(res.cache_info(owner).is_none(), "empty set drops the entry");
    }

    #[test]
    fn untracked_owner_is_a_no_op() {
        let mut res = ResourceManager::default();
        let owner = res.register_owner(Duration::ZERO, None);
        res.invalidate(owner);
        assert_eq!(res.release_all(owner, true), 0);
        assert_eq!(res.release_specific(owner, &[]), 0);
        assert_eq!(res.tracked_owners(), 0);
    }

    #[test]
    fn release_everything_honours_ignore_list() {
        let mut res = ResourceManager::default();
        let keep = res.register_owner(Duration::ZERO, None);
        let doomed = res.register_owner(Duration::ZERO, None);
        let a = asset(&mut res, "a");
        let b = asset(&mut res, "b");
        res.acquire(keep, a);
        res.acquire(doomed, b);

        assert_eq!(res.release_everything(&[keep], true), 1);
        assert!(res.retains(keep, a));
        assert!(!res.assets().is_alive(b));
    }

    #[test]
    fn sweep_invalidates_owners_with_dead_containers() {
        let mut res = ResourceManager::default();
        let mut scene = NodeStore::new(Size::new(1.0, 1.0));
        let node = scene.create_node("view");
        let owner = res.register_owner(Duration::ZERO, Some(node));
        let a = asset(&mut res, "a");
        res.acquire(owner, a);

        res.update(SWEEP_INTERVAL, &scene);
        assert!(res.assets().is_alive(a), "container still alive");

        scene.destroy_subtree(node);
        res.update(Duration::from_secs(4), &scene);
        assert!(res.assets().is_alive(a), "no sweep before the interval");
        res.update(Duration::from_secs(1), &scene);
        assert!(!res.assets().is_alive(a));
        assert_eq!(res.tracked_owners(), 0);
    }

    #[test]
    fn keeper_loads_are_retained() {
        let mut res = ResourceManager::default();
        let mut loader = MemoryLoader::new();
        loader.insert_value("resources", "ui/a", AssetKind::Texture, 1_u8);
        loader.insert_value("resources", "ui/b", AssetKind::Texture, 2_u8);
        let owner = res.register_owner(Duration::ZERO, None);

        let seen = Rc::new(RefCell::new(0));
        let s = Rc::clone(&seen);
        res.load(
            &mut loader,
            LoadArgs::paths(["ui/a", "ui/b"])
                .keeper(owner)
                .on_complete(move |r| *s.borrow_mut() = r.map_or(0, |ids| ids.len())),
        );
        assert_eq!(*seen.borrow(), 2, "user callback still runs");
        assert_eq!(res.cache_info(owner).unwrap().retained().len(), 2);
    }

    #[test]
    fn deferred_keeper_loads_are_retained_on_flush() {
        let mut res = ResourceManager::default();
        let mut loader = MemoryLoader::new().with_latency(Duration::from_millis(10));
        loader.insert_value("resources", "ui/a", AssetKind::Texture, 1_u8);
        let owner = res.register_owner(Duration::ZERO, None);

        res.load(&mut loader, LoadArgs::path("ui/a").keeper(owner));
        assert_eq!(res.tracked_owners(), 0);

        loader.update(Duration::from_millis(10), res.assets_mut());
        res.flush_kept();
        let ids: Vec<_> = res
            .cache_info(owner)
            .unwrap()
            .retained()
            .iter()
            .copied()
            .collect();
        assert_eq!(ids.len(), 1);
        assert_eq!(res.assets().ref_count(ids[0]), Some(1));
    }

    #[test]
    fn late_keeper_load_of_a_released_owner_is_not_leaked() {
        let mut res = ResourceManager::default();
        let scene = NodeStore::new(Size::new(1.0, 1.0));
        let mut loader = MemoryLoader::new().with_latency(Duration::from_millis(10));
        loader.insert_value("resources", "ui/a", AssetKind::Texture, 1_u8);
        loader.insert_value("resources", "ui/b", AssetKind::Texture, 2_u8);

        let owner = res.register_owner(Duration::ZERO, None);
        let held = asset(&mut res, "held");
        res.acquire(owner, held);
        res.load(&mut loader, LoadArgs::path("ui/a").keeper(owner));
        res.invalidate(owner);
        assert_eq!(res.release_all(owner, false), 1);
        assert!(res.is_retired(owner));

        let idle = res.register_owner(Duration::from_secs(2), None);
        res.load(&mut loader, LoadArgs::path("ui/b").keeper(idle));
        res.invalidate(idle);
        assert!(res.is_retired(idle), "invalidated while retaining nothing");

        loader.update(Duration::from_millis(10), res.assets_mut());
        res.flush_kept();
        assert_eq!(res.tracked_owners(), 0);
        assert!(res.assets().is_empty(), "late assets disposed on arrival");

        res.update(SWEEP_INTERVAL, &scene);
        assert!(res.assets().is_empty());
    }

    #[test]
    fn late_asset_shared_with_a_live_owner_survives() {
        let mut res = ResourceManager::default();
        let gone = res.register_owner(Duration::ZERO, None);
        let live = res.register_owner(Duration::ZERO, None);
        let a = asset(&mut res, "a");
        res.acquire(live, a);
        res.invalidate(gone);

        res.acquire(gone, a);
        assert_eq!(res.assets().ref_count(a), Some(1));
        assert!(!res.retains(gone, a));
        assert!(!res.is_retired(live));
    }

    #[cfg(feature = "trace")]
    #[test]
    fn release_records_events() {
        let mut res = ResourceManager::default();
        let owner = res.register_owner(Duration::ZERO, None);
        let a = asset(&mut res, "a");
        res.acquire(owner, a);
        res.invalidate(owner);
        res.release_all(owner, false);

        let events = res.drain_events();
        assert!(matches!(events[0], UiEvent::OwnerInvalidated(_)));
        assert!(matches!(events[1], UiEvent::AssetDisposed(_)));
        assert!(matches!(
            events[2],
            UiEvent::OwnerReleased(ReleaseEvent { released: 1, .. })
        ));
        assert!(res.drain_events().is_empty());
    }
}
