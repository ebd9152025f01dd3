//! Controller/trigger interaction state machine
//!
//! Every (controller, trigger) pair is either [`PairState::Apart`] or
//! [`PairState::Intersecting`]. A trigger's bound sound plays exactly while at
//! least one controller intersects it: the first holder starts playback, the
//! last one to leave stops it, and holders in between issue no backend calls.
//! Triggers sharing an anchor key share an instance, which keeps playing
//! until the last of them is released.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::audio::backend::{AudioBackend, SoundHandle};
use crate::audio::AudioError;
use crate::triggers::{BindingChange, TriggerId, TriggerRegistry};

/// Label shown while nothing plays
pub const NO_SOUND_PLAYING: &str = "No sound playing";

/// Identifier of a tracked controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(pub u32);

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "controller{}", self.0)
    }
}

/// Intersection state of one (controller, trigger) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairState {
    /// Not touching
    #[default]
    Apart,
    /// Controller volume overlaps the trigger volume
    Intersecting,
}

/// Result of an enter event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    /// Trigger unknown or unbound; nothing changed
    Unbound,
    /// Pair was already intersecting
    AlreadyIntersecting,
    /// First holder; playback started
    Started,
    /// Another controller already holds the trigger
    Joined,
}

/// Result of an exit event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Pair was not intersecting; nothing changed
    NotIntersecting,
    /// Last holder left; playback stopped
    Stopped,
    /// Other controllers still hold the trigger
    StillHeld,
}

/// A trigger with at least one intersecting controller
#[derive(Debug, Clone)]
struct Hold {
    handle: SoundHandle,
    display_name: String,
    holders: BTreeSet<ControllerId>,
}

/// Tracks intersecting pairs and drives play/stop transitions
#[derive(Debug, Default)]
pub struct InteractionController {
    holds: BTreeMap<TriggerId, Hold>,
    /// Held triggers in the order their playback started
    started: Vec<TriggerId>,
}

impl InteractionController {
    /// Create a controller with every pair apart
    pub fn new() -> Self {
        Self::default()
    }

    /// State of one pair
    pub fn state(&self, controller: ControllerId, trigger: TriggerId) -> PairState {
        match self.holds.get(&trigger) {
            Some(hold) if hold.holders.contains(&controller) => PairState::Intersecting,
            _ => PairState::Apart,
        }
    }

    /// Whether any controller holds the trigger (its sound should be playing)
    pub fn is_held(&self, trigger: TriggerId) -> bool {
        self.holds.contains_key(&trigger)
    }

    /// Controllers currently intersecting a trigger
    pub fn holders(&self, trigger: TriggerId) -> impl Iterator<Item = ControllerId> + '_ {
        self.holds.get(&trigger).into_iter().flat_map(|hold| hold.holders.iter().copied())
    }

    /// Triggers with playback running, oldest first
    pub fn held_triggers(&self) -> &[TriggerId] {
        &self.started
    }

    /// Instance playing for a held trigger
    pub fn playing_handle(&self, trigger: TriggerId) -> Option<SoundHandle> {
        self.holds.get(&trigger).map(|hold| hold.handle)
    }

    /// Display name of the most recently started sound still playing
    pub fn currently_playing_label(&self) -> &str {
        self.started
            .last()
            .and_then(|trigger| self.holds.get(trigger))
            .map_or(NO_SOUND_PLAYING, |hold| hold.display_name.as_str())
    }

    /// Handle an enter-intersection event
    pub fn on_enter<B: AudioBackend + ?Sized>(
        &mut self,
        controller: ControllerId,
        trigger: TriggerId,
        registry: &TriggerRegistry,
        backend: &mut B,
    ) -> EnterOutcome {
        if let Some(hold) = self.holds.get_mut(&trigger) {
            if !hold.holders.insert(controller) {
                return EnterOutcome::AlreadyIntersecting;
            }
            log::debug!("{} joined {} ('{}')", controller, trigger, hold.display_name);
            return EnterOutcome::Joined;
        }

        let Some(binding) = registry.binding(trigger) else {
            log::debug!("{} touched unbound {}", controller, trigger);
            return EnterOutcome::Unbound;
        };

        if !backend.is_playing(binding.handle) {
            absorb(backend.play(binding.handle), "play", &binding.display_name);
        }
        log::info!("Playing {}", binding.display_name);

        self.holds.insert(
            trigger,
            Hold {
                handle: binding.handle,
                display_name: binding.display_name.clone(),
                holders: BTreeSet::from([controller]),
            },
        );
        self.started.push(trigger);
        EnterOutcome::Started
    }

    /// Handle an exit-intersection event
    pub fn on_exit<B: AudioBackend + ?Sized>(
        &mut self,
        controller: ControllerId,
        trigger: TriggerId,
        backend: &mut B,
    ) -> ExitOutcome {
        let Some(hold) = self.holds.get_mut(&trigger) else {
            return ExitOutcome::NotIntersecting;
        };
        if !hold.holders.remove(&controller) {
            return ExitOutcome::NotIntersecting;
        }
        if !hold.holders.is_empty() {
            log::debug!("{} left {}; still held", controller, trigger);
            return ExitOutcome::StillHeld;
        }

        self.release(trigger, backend);
        ExitOutcome::Stopped
    }

    /// Exit every trigger a disconnected controller was holding
    ///
    /// Returns the triggers whose playback stopped as a result.
    pub fn on_controller_removed<B: AudioBackend + ?Sized>(
        &mut self,
        controller: ControllerId,
        backend: &mut B,
    ) -> Vec<TriggerId> {
        let touched: Vec<TriggerId> = self
            .holds
            .iter()
            .filter(|(_, hold)| hold.holders.contains(&controller))
            .map(|(trigger, _)| *trigger)
            .collect();

        touched
            .into_iter()
            .filter(|trigger| self.on_exit(controller, *trigger, backend) == ExitOutcome::Stopped)
            .collect()
    }

    /// Apply a collection rebind to held triggers
    ///
    /// A held trigger switches to its new instance, keeping its holders. When
    /// the new collection has no sound for the trigger, every pair on it is
    /// forced apart and playback stops.
    pub fn rebind<B: AudioBackend + ?Sized>(&mut self, changes: &[BindingChange], backend: &mut B) {
        for change in changes {
            let Some(current) = self.playing_handle(change.trigger) else {
                continue;
            };
            let shared = self.is_shared(current, change.trigger);
            let Some(hold) = self.holds.get_mut(&change.trigger) else {
                continue;
            };

            match &change.new {
                Some(binding) if binding.handle == hold.handle => {}
                Some(binding) => {
                    if !shared {
                        absorb(backend.stop(hold.handle), "stop", &hold.display_name);
                    }
                    if !backend.is_playing(binding.handle) {
                        absorb(backend.play(binding.handle), "play", &binding.display_name);
                    }
                    log::info!(
                        "{} swapped '{}' for '{}'",
                        change.trigger,
                        hold.display_name,
                        binding.display_name
                    );
                    hold.handle = binding.handle;
                    hold.display_name.clone_from(&binding.display_name);
                }
                None => {
                    log::info!("{} lost its sound; forcing {} holder(s) apart", change.trigger, hold.holders.len());
                    self.release(change.trigger, backend);
                }
            }
        }
    }

    /// Stop everything and forget all pairs
    pub fn clear<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) {
        let held: Vec<TriggerId> = self.started.clone();
        for trigger in held {
            self.release(trigger, backend);
        }
    }

    fn release<B: AudioBackend + ?Sized>(&mut self, trigger: TriggerId, backend: &mut B) {
        if let Some(hold) = self.holds.remove(&trigger) {
            if self.is_shared(hold.handle, trigger) {
                log::debug!("{} released; '{}' still held elsewhere", trigger, hold.display_name);
            } else {
                absorb(backend.stop(hold.handle), "stop", &hold.display_name);
                log::info!("Stopping {}", hold.display_name);
            }
        }
        self.started.retain(|held| *held != trigger);
    }

    /// Whether a trigger other than `except` holds the same instance
    fn is_shared(&self, handle: SoundHandle, except: TriggerId) -> bool {
        self.holds
            .iter()
            .any(|(trigger, hold)| *trigger != except && hold.handle == handle)
    }
}

/// Swallow backend failures; event handlers never fail
fn absorb(result: Result<(), AudioError>, action: &str, name: &str) {
    match result {
        Ok(()) => {}
        Err(AudioError::InvalidHandle) => log::debug!("Ignoring {action} on disposed instance '{name}'"),
        Err(e) => log::warn!("Failed to {action} '{name}': {e}"),
    }
}
