//! Collection switcher
//!
//! Serializes hot swaps of the active collection. A switch runs in two
//! halves around the asynchronous fetch:
//!
//! - [`CollectionSwitcher::request`] validates the name and either hands back
//!   a [`PendingSwitch`] to fetch, queues the request behind the one in
//!   flight, or rejects it, depending on [`SwitchPolicy`]
//! - [`CollectionSwitcher::complete`] instantiates the fetched collection,
//!   rebinds triggers and live pairs, and only then disposes the previous
//!   collection
//!
//! At most one switch is in flight; its completion is matched by ticket so a
//! late or duplicated completion can never activate a collection.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::audio::backend::AudioBackend;
use crate::interaction::InteractionController;
use crate::sound::{CollectionError, FetchedCollection, LoadPlan, SoundBank};
use crate::triggers::TriggerRegistry;

/// What to do with a switch request while another one is loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchPolicy {
    /// Run it after the in-flight switch settles
    #[default]
    Queue,
    /// Fail it with `SwitchInProgress`
    Reject,
}

/// Identifies one in-flight switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwitchTicket(u64);

impl fmt::Display for SwitchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "switch#{}", self.0)
    }
}

/// A switch whose resources must now be fetched
#[derive(Debug, Clone)]
pub struct PendingSwitch {
    /// Ticket to hand back to `complete`
    pub ticket: SwitchTicket,
    /// Collection to fetch
    pub plan: LoadPlan,
}

/// Immediate answer to a switch request
#[derive(Debug, Clone)]
pub enum SwitchRequest {
    /// Nothing was loading; fetch this now
    Started(PendingSwitch),
    /// Waiting behind the in-flight switch
    Queued {
        /// Requested collection
        name: String,
        /// 1-based position in the queue
        position: usize,
    },
    /// The collection is already active and nothing is loading
    AlreadyActive,
}

/// How a completion was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The collection is now active
    Activated(String),
    /// The ticket did not match the in-flight switch; nothing changed
    Stale,
}

/// Where a directly driven switch stands when the call returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchSettled {
    /// The requested collection is active
    Active,
    /// Waiting behind a switch whose fetch is driven elsewhere; nothing loaded yet
    Queued {
        /// 1-based position in the queue
        position: usize,
    },
}

/// Result of completing a switch
#[derive(Debug)]
pub struct SwitchCompletion {
    /// Activation result; on error the previous collection stays active
    pub result: Result<SwitchOutcome, CollectionError>,
    /// Next queued switch, already in flight, to fetch
    pub next: Option<PendingSwitch>,
}

/// Serializes collection switches
#[derive(Debug, Default)]
pub struct CollectionSwitcher {
    policy: SwitchPolicy,
    in_flight: Option<(SwitchTicket, String)>,
    queue: VecDeque<String>,
    next_ticket: u64,
}

impl CollectionSwitcher {
    /// Create an idle switcher
    pub fn new(policy: SwitchPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Configured policy
    pub fn policy(&self) -> SwitchPolicy {
        self.policy
    }

    /// Name of the collection currently loading
    pub fn in_flight(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|(_, name)| name.as_str())
    }

    /// Requests waiting behind the in-flight switch
    pub fn queued(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    /// Whether a switch is loading or queued
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some() || !self.queue.is_empty()
    }

    /// The collection the session will end up on once everything settles
    pub fn target<'a>(&'a self, bank: &'a SoundBank) -> Option<&'a str> {
        self.queue
            .back()
            .map(String::as_str)
            .or_else(|| self.in_flight())
            .or_else(|| bank.active().map(|collection| collection.name()))
    }

    /// Ask to switch to `name`
    ///
    /// # Errors
    /// `UnknownCollection` for unregistered names; `SwitchInProgress` when a
    /// switch is loading and the policy is [`SwitchPolicy::Reject`].
    pub fn request(&mut self, name: &str, bank: &SoundBank) -> Result<SwitchRequest, CollectionError> {
        let plan = bank.plan_load(name)?;

        if let Some((_, in_flight)) = &self.in_flight {
            return match self.policy {
                SwitchPolicy::Reject => {
                    log::warn!("Rejecting switch to '{}' while '{}' loads", name, in_flight);
                    Err(CollectionError::SwitchInProgress {
                        in_flight: in_flight.clone(),
                    })
                }
                SwitchPolicy::Queue => {
                    if self.queue.back().map(String::as_str) != Some(name) {
                        self.queue.push_back(name.to_string());
                    }
                    log::info!("Queued switch to '{}' behind '{}'", name, in_flight);
                    Ok(SwitchRequest::Queued {
                        name: name.to_string(),
                        position: self.queue.len(),
                    })
                }
            };
        }

        if bank.active().is_some_and(|active| active.name() == name) {
            log::debug!("'{}' is already active", name);
            return Ok(SwitchRequest::AlreadyActive);
        }

        Ok(SwitchRequest::Started(self.start(plan)))
    }

    /// Apply the fetched resources of the in-flight switch
    ///
    /// On success the order is: instantiate, activate, rebind triggers,
    /// rebind live pairs, dispose the previous collection.
    pub fn complete<B: AudioBackend + ?Sized>(
        &mut self,
        ticket: SwitchTicket,
        fetched: Result<FetchedCollection, CollectionError>,
        bank: &mut SoundBank,
        registry: &mut TriggerRegistry,
        interaction: &mut InteractionController,
        backend: &mut B,
    ) -> SwitchCompletion {
        match &self.in_flight {
            Some((current, _)) if *current == ticket => {}
            _ => {
                log::warn!("Ignoring completion of {}: not in flight", ticket);
                return SwitchCompletion {
                    result: Ok(SwitchOutcome::Stale),
                    next: None,
                };
            }
        }
        self.in_flight = None;

        let result = fetched
            .and_then(|fetched| bank.instantiate(fetched, backend))
            .map(|collection| {
                let name = collection.name().to_string();
                let changes = registry.bind_active_collection(&collection);
                interaction.rebind(&changes, backend);
                if let Some(previous) = bank.activate(collection) {
                    previous.dispose(backend);
                }
                log::info!("Active sound collection is now '{}'", name);
                SwitchOutcome::Activated(name)
            });

        if let Err(e) = &result {
            log::error!("Sound collection switch failed: {}", e);
        }

        SwitchCompletion {
            result,
            next: self.start_next(bank),
        }
    }

    fn start(&mut self, plan: LoadPlan) -> PendingSwitch {
        self.next_ticket += 1;
        let ticket = SwitchTicket(self.next_ticket);
        log::info!("Loading sound collection '{}' ({})", plan.name(), ticket);
        self.in_flight = Some((ticket, plan.name().to_string()));
        PendingSwitch { ticket, plan }
    }

    fn start_next(&mut self, bank: &SoundBank) -> Option<PendingSwitch> {
        while let Some(name) = self.queue.pop_front() {
            if bank.active().is_some_and(|active| active.name() == name) {
                log::debug!("Dropping queued switch to active '{}'", name);
                continue;
            }
            match bank.plan_load(&name) {
                Ok(plan) => return Some(self.start(plan)),
                Err(e) => log::warn!("Dropping queued switch: {}", e),
            }
        }
        None
    }
}
