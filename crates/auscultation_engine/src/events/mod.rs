//! Session event feed
//!
//! Everything that mutates a session arrives as a discrete [`SessionEvent`]:
//! intersection edges from the tracking substrate, panel button presses, and
//! completions of asynchronous collection loads. Events are queued and handled
//! one at a time, so no state transition ever suspends halfway.
//!
//! [`EventQueue`] supports immediate delivery and deferred delivery at a given
//! time, which the simulator uses for scripted controller movement.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::interaction::ControllerId;
use crate::sound::{CollectionError, FetchedCollection};
use crate::switcher::SwitchTicket;
use crate::triggers::TriggerId;

/// Buttons on the in-VR control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelButton {
    /// Show or hide the trigger volumes
    ToggleTriggers,
    /// Advance to the next sound collection (wraps around)
    CycleCollection,
}

/// A discrete input to the session
#[derive(Debug)]
pub enum SessionEvent {
    /// A controller volume started overlapping a trigger volume
    IntersectEnter {
        /// Controller that moved
        controller: ControllerId,
        /// Trigger it touched
        trigger: TriggerId,
    },
    /// A controller volume stopped overlapping a trigger volume
    IntersectExit {
        /// Controller that moved
        controller: ControllerId,
        /// Trigger it left
        trigger: TriggerId,
    },
    /// A controller disconnected
    ControllerRemoved(ControllerId),
    /// A panel button was pressed
    ButtonPressed(PanelButton),
    /// Switch to a collection by name
    SwitchRequested(String),
    /// Resources for an in-flight switch finished fetching
    LoadCompleted {
        /// Ticket of the switch
        ticket: SwitchTicket,
        /// Fetched payloads or the fetch failure
        result: Result<FetchedCollection, CollectionError>,
    },
}

/// FIFO of session events with optional deferred delivery
#[derive(Debug, Default)]
pub struct EventQueue {
    immediate: VecDeque<SessionEvent>,
    deferred: Vec<(f64, SessionEvent)>,
    current_time: f64,
}

impl EventQueue {
    /// Create an empty queue at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Update current time (seconds since start)
    pub fn update_time(&mut self, time: f64) {
        self.current_time = time;
    }

    /// Current time
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Queue an event for delivery on the next poll
    pub fn send(&mut self, event: SessionEvent) {
        self.immediate.push_back(event);
    }

    /// Queue an event for delivery once `delivery_time` is reached
    pub fn post(&mut self, delivery_time: f64, event: SessionEvent) {
        self.deferred.push((delivery_time, event));
    }

    /// Next deliverable event
    ///
    /// Immediate events come first; due deferred events follow in the order
    /// they were posted.
    pub fn pop(&mut self) -> Option<SessionEvent> {
        if let Some(event) = self.immediate.pop_front() {
            return Some(event);
        }
        let due = self.deferred.iter().position(|(time, _)| *time <= self.current_time)?;
        Some(self.deferred.remove(due).1)
    }

    /// Take every deliverable event
    pub fn drain_due(&mut self) -> Vec<SessionEvent> {
        std::iter::from_fn(|| self.pop()).collect()
    }

    /// Earliest pending deferred delivery time
    pub fn next_deferred_time(&self) -> Option<f64> {
        self.deferred.iter().map(|(time, _)| *time).reduce(f64::min)
    }

    /// Number of queued events, deferred included
    pub fn len(&self) -> usize {
        self.immediate.len() + self.deferred.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.immediate.is_empty() && self.deferred.is_empty()
    }

    /// Clear all queued events
    pub fn clear(&mut self) {
        self.immediate.clear();
        self.deferred.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter(trigger: usize) -> SessionEvent {
        SessionEvent::IntersectEnter {
            controller: ControllerId(0),
            trigger: TriggerId(trigger),
        }
    }

    #[test]
    fn test_immediate_events_are_fifo() {
        let mut queue = EventQueue::new();
        queue.send(enter(0));
        queue.send(SessionEvent::ButtonPressed(PanelButton::ToggleTriggers));

        assert!(matches!(queue.pop(), Some(SessionEvent::IntersectEnter { .. })));
        assert!(matches!(queue.pop(), Some(SessionEvent::ButtonPressed(PanelButton::ToggleTriggers))));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_deferred_delivery() {
        let mut queue = EventQueue::new();
        queue.post(1.0, enter(1));
        queue.post(0.5, SessionEvent::ControllerRemoved(ControllerId(0)));
        assert_eq!(queue.next_deferred_time(), Some(0.5));

        assert!(queue.drain_due().is_empty());

        queue.update_time(0.75);
        let due = queue.drain_due();
        assert_eq!(due.len(), 1);
        assert!(matches!(due[0], SessionEvent::ControllerRemoved(_)));

        queue.update_time(1.0);
        assert_eq!(queue.drain_due().len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_immediate_before_deferred() {
        let mut queue = EventQueue::new();
        queue.post(0.0, enter(0));
        queue.send(enter(2));

        match queue.pop() {
            Some(SessionEvent::IntersectEnter { trigger, .. }) => assert_eq!(trigger, TriggerId(2)),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(queue.len(), 1);
        queue.clear();
        assert!(queue.is_empty());
    }
}
