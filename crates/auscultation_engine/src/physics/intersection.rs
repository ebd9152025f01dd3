//! Controller/trigger intersection tracking
//!
//! Keeps the set of overlapping (controller, trigger) pairs from the previous
//! update and reports only the edges: pairs that started or stopped
//! overlapping. Exits are reported before enters so a controller sliding from
//! one trigger to another releases the first before touching the second.

use std::collections::{BTreeMap, BTreeSet};

use super::collision::BoundingSphere;
use super::TRIGGER_DIAMETER;
use crate::events::SessionEvent;
use crate::foundation::math::Vec3;
use crate::interaction::ControllerId;
use crate::triggers::TriggerId;

/// Derives intersection edges from controller positions
#[derive(Debug, Clone)]
pub struct IntersectionTracker {
    triggers: BTreeMap<TriggerId, BoundingSphere>,
    controllers: BTreeMap<ControllerId, BoundingSphere>,
    controller_radius: f32,
    trigger_radius: f32,
    overlapping: BTreeSet<(ControllerId, TriggerId)>,
}

impl Default for IntersectionTracker {
    fn default() -> Self {
        Self::new(TRIGGER_DIAMETER / 2.0, TRIGGER_DIAMETER / 2.0)
    }
}

impl IntersectionTracker {
    /// Create a tracker with the given volume radii
    pub fn new(trigger_radius: f32, controller_radius: f32) -> Self {
        Self {
            triggers: BTreeMap::new(),
            controllers: BTreeMap::new(),
            controller_radius,
            trigger_radius,
            overlapping: BTreeSet::new(),
        }
    }

    /// Place a trigger volume at its world position
    pub fn add_trigger(&mut self, trigger: TriggerId, world_position: Vec3) {
        self.triggers
            .insert(trigger, BoundingSphere::new(world_position, self.trigger_radius));
    }

    /// Tracked controllers
    pub fn controllers(&self) -> impl Iterator<Item = ControllerId> + '_ {
        self.controllers.keys().copied()
    }

    /// Whether a pair overlapped at the last update
    pub fn is_overlapping(&self, controller: ControllerId, trigger: TriggerId) -> bool {
        self.overlapping.contains(&(controller, trigger))
    }

    /// Move a controller, returning the exit and enter edges it caused
    ///
    /// An unknown controller is added.
    pub fn update_controller(&mut self, controller: ControllerId, position: Vec3) -> Vec<SessionEvent> {
        let volume = BoundingSphere::new(position, self.controller_radius);
        self.controllers.insert(controller, volume);

        let now: BTreeSet<TriggerId> = self
            .triggers
            .iter()
            .filter(|(_, trigger)| trigger.intersects(&volume))
            .map(|(id, _)| *id)
            .collect();
        let before: BTreeSet<TriggerId> = self
            .overlapping
            .iter()
            .filter(|(held_by, _)| *held_by == controller)
            .map(|(_, trigger)| *trigger)
            .collect();

        let mut events = Vec::new();
        for trigger in before.difference(&now) {
            self.overlapping.remove(&(controller, *trigger));
            events.push(SessionEvent::IntersectExit { controller, trigger: *trigger });
        }
        for trigger in now.difference(&before) {
            self.overlapping.insert((controller, *trigger));
            events.push(SessionEvent::IntersectEnter { controller, trigger: *trigger });
        }
        events
    }

    /// Stop tracking a controller
    ///
    /// Returns a removal event when the controller was tracked; the session
    /// exits every trigger it held.
    pub fn remove_controller(&mut self, controller: ControllerId) -> Option<SessionEvent> {
        self.controllers.remove(&controller)?;
        self.overlapping.retain(|(held_by, _)| *held_by != controller);
        Some(SessionEvent::ControllerRemoved(controller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAND: ControllerId = ControllerId(0);

    fn tracker() -> IntersectionTracker {
        let mut tracker = IntersectionTracker::default();
        tracker.add_trigger(TriggerId(0), Vec3::new(0.0, 1.0, 0.0));
        tracker.add_trigger(TriggerId(1), Vec3::new(0.3, 1.0, 0.0));
        tracker
    }

    fn describe(events: &[SessionEvent]) -> Vec<(bool, usize)> {
        events
            .iter()
            .map(|event| match event {
                SessionEvent::IntersectEnter { trigger, .. } => (true, trigger.0),
                SessionEvent::IntersectExit { trigger, .. } => (false, trigger.0),
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_edges_only() {
        let mut tracker = tracker();
        assert!(tracker.update_controller(HAND, Vec3::zeros()).is_empty());

        let events = tracker.update_controller(HAND, Vec3::new(0.02, 1.0, 0.0));
        assert_eq!(describe(&events), vec![(true, 0)]);

        // Still inside: no new edge
        assert!(tracker.update_controller(HAND, Vec3::new(0.0, 1.01, 0.0)).is_empty());
        assert!(tracker.is_overlapping(HAND, TriggerId(0)));
    }

    #[test]
    fn test_exit_reported_before_enter() {
        let mut tracker = tracker();
        tracker.update_controller(HAND, Vec3::new(0.0, 1.0, 0.0));

        let events = tracker.update_controller(HAND, Vec3::new(0.3, 1.0, 0.0));
        assert_eq!(describe(&events), vec![(false, 0), (true, 1)]);
    }

    #[test]
    fn test_remove_controller() {
        let mut tracker = tracker();
        tracker.update_controller(HAND, Vec3::new(0.0, 1.0, 0.0));

        assert!(matches!(
            tracker.remove_controller(HAND),
            Some(SessionEvent::ControllerRemoved(HAND))
        ));
        assert!(!tracker.is_overlapping(HAND, TriggerId(0)));
        assert!(tracker.remove_controller(HAND).is_none());
        assert_eq!(tracker.controllers().count(), 0);
    }
}
