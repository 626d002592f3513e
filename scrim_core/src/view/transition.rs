// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Open and close transitions.
//!
//! A view either has a [`Transition`] or it does not; the choice is made
//! when its [`Prefab`](super::Prefab) is instantiated. Transitions are
//! driven by polling: the stack calls [`start`](Transition::start) once and
//! then [`advance`](Transition::advance) every update until it reports
//! [`TransitionStatus::Done`].

use crate::scene::{NodeId, NodeStore};
use crate::time::Duration;

/// Which transition to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// The view is appearing.
    Open,
    /// The view is going away.
    Close,
}

/// Whether a transition is still playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionStatus {
    /// Keep calling [`Transition::advance`].
    Running,
    /// Finished; the node is in its final state.
    Done,
}

/// Animates a view container.
pub trait Transition {
    /// Begins a transition on `node`.
    ///
    /// With `immediate`, the node must be put in its final state and
    /// [`TransitionStatus::Done`] returned.
    fn start(
        &mut self,
        kind: TransitionKind,
        node: NodeId,
        scene: &mut NodeStore,
        immediate: bool,
    ) -> TransitionStatus;

    /// Advances the running transition by `dt`.
    fn advance(&mut self, dt: Duration, node: NodeId, scene: &mut NodeStore) -> TransitionStatus;
}

/// Scales the container linearly from 0 to 1 on open and from 1 to 0 on
/// close.
#[derive(Clone, Debug)]
pub struct ScaleTransition {
    duration: Duration,
    elapsed: Duration,
    kind: TransitionKind,
    running: bool,
}

impl ScaleTransition {
    /// Creates a transition lasting `duration` in each direction.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            kind: TransitionKind::Open,
            running: false,
        }
    }

    fn scale_at(&self, t: f64) -> f64 {
        match self.kind {
            TransitionKind::Open => t,
            TransitionKind::Close => 1.0 - t,
        }
    }
}

impl Transition for ScaleTransition {
    fn start(
        &mut self,
        kind: TransitionKind,
        node: NodeId,
        scene: &mut NodeStore,
        immediate: bool,
    ) -> TransitionStatus {
        self.kind = kind;
        self.elapsed = Duration::ZERO;
        if immediate || self.duration.is_zero() {
            self.running = false;
            scene.set_scale(node, self.scale_at(1.0));
            return TransitionStatus::Done;
        }
        self.running = true;
        scene.set_scale(node, self.scale_at(0.0));
        TransitionStatus::Running
    }

    fn advance(&mut self, dt: Duration, node: NodeId, scene: &mut NodeStore) -> TransitionStatus {
        if !self.running {
            return TransitionStatus::Done;
        }
        self.elapsed += dt;
        let t = (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        scene.set_scale(node, self.scale_at(t));
        if t >= 1.0 {
            self.running = false;
            TransitionStatus::Done
        } else {
            TransitionStatus::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;

    fn scene_with_node() -> (NodeStore, NodeId) {
        let mut scene = NodeStore::new(Size::new(100.0, 100.0));
        let node = scene.create_full_viewport("view");
        (scene, node)
    }

    #[test]
    fn open_scales_up_over_duration() {
        let (mut scene, node) = scene_with_node();
        let mut t = ScaleTransition::new(Duration::from_millis(200));

        let s = t.start(TransitionKind::Open, node, &mut scene, false);
        assert_eq!(s, TransitionStatus::Running);
        assert_eq!(scene.scale(node), 0.0);

        let s = t.advance(Duration::from_millis(100), node, &mut scene);
        assert_eq!(s, TransitionStatus::Running);
        assert!((scene.scale(node) - 0.5).abs() < 1e-9);

        let s = t.advance(Duration::from_millis(150), node, &mut scene);
        assert_eq!(s, TransitionStatus::Done);
        assert_eq!(scene.scale(node), 1.0, "overshoot is clamped");
    }

    #[test]
    fn close_scales_down() {
        let (mut scene, node) = scene_with_node();
        let mut t = ScaleTransition::new(Duration::from_millis(100));
        t.start(TransitionKind::Close, node, &mut scene, false);
        assert_eq!(scene.scale(node), 1.0);
        assert_eq!(
            t.advance(Duration::from_millis(100), node, &mut scene),
            TransitionStatus::Done
        );
        assert_eq!(scene.scale(node), 0.0);
    }

    #[test]
    fn immediate_jumps_to_final_state() {
        let (mut scene, node) = scene_with_node();
        let mut t = ScaleTransition::new(Duration::from_secs(1));
        assert_eq!(
            t.start(TransitionKind::Close, node, &mut scene, true),
            TransitionStatus::Done
        );
        assert_eq!(scene.scale(node), 0.0);
        assert_eq!(
            t.start(TransitionKind::Open, node, &mut scene, true),
            TransitionStatus::Done
        );
        assert_eq!(scene.scale(node), 1.0);
    }

    #[test]
    fn zero_duration_is_immediate() {
        let (mut scene, node) = scene_with_node();
        let mut t = ScaleTransition::new(Duration::ZERO);
        assert_eq!(
            t.start(TransitionKind::Open, node, &mut scene, false),
            TransitionStatus::Done
        );
        assert_eq!(
            t.advance(Duration::from_millis(16), node, &mut scene),
            TransitionStatus::Done
        );
    }
}
