//! Trainer session
//!
//! A [`Session`] owns the audio backend, the sound bank, the trigger registry,
//! the interaction state and the collection switcher. It is the single
//! context the control panel and the intersection feed talk to; nothing in
//! the engine keeps global state.
//!
//! Intersection handlers never fail. Switch failures surface as `Err` from
//! [`Session::request_switch`] and in [`SwitchCompletion::result`].

use serde::{Deserialize, Serialize};

use crate::audio::backend::AudioBackend;
use crate::audio::fetch::SoundFetcher;
use crate::audio::spatial::{SpatialAudio, SpatialConfig};
use crate::events::{PanelButton, SessionEvent};
use crate::foundation::math::{Transform, Vec3};
use crate::interaction::{ControllerId, EnterOutcome, InteractionController};
use crate::scene::ModelHandle;
use crate::sound::{CollectionError, FetchedCollection, SoundBank, SoundCatalog, SoundKey};
use crate::switcher::{
    CollectionSwitcher, PendingSwitch, SwitchCompletion, SwitchOutcome, SwitchPolicy, SwitchRequest,
    SwitchSettled, SwitchTicket,
};
use crate::triggers::{TriggerId, TriggerPoint, TriggerRegistry};

/// Session behaviour knobs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// What to do with a switch requested while another loads
    pub switch_policy: SwitchPolicy,
    /// Listener-relative attenuation
    pub spatial: SpatialConfig,
    /// Whether trigger volumes start visible
    pub triggers_visible: bool,
}

/// One trainee session
#[derive(Debug)]
pub struct Session<B: AudioBackend> {
    backend: B,
    bank: SoundBank,
    registry: TriggerRegistry,
    interaction: InteractionController,
    switcher: CollectionSwitcher,
    spatial: SpatialAudio,
    model: Option<ModelHandle>,
}

impl<B: AudioBackend> Session<B> {
    /// Create a session with nothing loaded and no triggers
    pub fn new(catalog: SoundCatalog, backend: B, config: SessionConfig) -> Self {
        log::info!("Starting session with {} sound collections", catalog.len());
        Self {
            backend,
            bank: SoundBank::new(catalog),
            registry: TriggerRegistry::with_visibility(config.triggers_visible),
            interaction: InteractionController::new(),
            switcher: CollectionSwitcher::new(config.switch_policy),
            spatial: SpatialAudio::new(config.spatial),
            model: None,
        }
    }

    // ---- Model and triggers ----

    /// Place the model and create one trigger per anchor
    pub fn attach_model(&mut self, model: &ModelHandle) -> Vec<TriggerPoint> {
        if self.model.is_some() {
            log::warn!("Replacing model placement with '{}'; existing triggers are kept", model.name);
        }
        self.model = Some(model.clone());
        let triggers = model
            .anchors
            .iter()
            .map(|anchor| self.register_trigger(anchor.key, anchor.local_position))
            .collect();
        log::info!("Attached model '{}'", model.name);
        triggers
    }

    /// Register a trigger and bind it to the active collection, if any
    pub fn register_trigger(&mut self, anchor_key: SoundKey, local_position: Vec3) -> TriggerPoint {
        let trigger = self.registry.register_trigger(anchor_key, local_position);
        if let Some(active) = self.bank.active() {
            self.registry.bind_trigger(trigger.id, active);
        }
        trigger
    }

    /// Model placement; identity until a model is attached
    pub fn model_transform(&self) -> Transform {
        self.model.as_ref().map_or_else(Transform::identity, |model| model.transform)
    }

    /// Attached model
    pub fn model(&self) -> Option<&ModelHandle> {
        self.model.as_ref()
    }

    /// Scene position of a trigger
    pub fn trigger_world_position(&self, trigger: TriggerId) -> Option<Vec3> {
        let point = self.registry.get(trigger)?;
        Some(self.model_transform().transform_point(point.local_position))
    }

    /// Flip trigger visibility; no sound side effect
    pub fn toggle_trigger_visibility(&mut self) -> bool {
        let visible = self.registry.toggle_visibility();
        log::debug!("Triggers {}", if visible { "shown" } else { "hidden" });
        visible
    }

    /// Show or hide every trigger
    pub fn set_trigger_visibility(&mut self, visible: bool) {
        self.registry.set_visibility(visible);
    }

    /// Whether triggers are drawn
    pub fn triggers_visible(&self) -> bool {
        self.registry.is_visible()
    }

    // ---- Collections ----

    /// Registered collection names in registration order
    pub fn list_collection_names(&self) -> Vec<&str> {
        self.bank.catalog().names().collect()
    }

    /// Name of the active collection
    pub fn active_collection(&self) -> Option<&str> {
        self.bank.active().map(|collection| collection.name())
    }

    /// Collection the session is switching to, if a switch is loading or queued
    pub fn pending_collection(&self) -> Option<&str> {
        self.switcher.queued().last().or_else(|| self.switcher.in_flight())
    }

    /// Ask to switch the active collection
    ///
    /// A `Started` answer carries the resources to fetch; hand the fetch
    /// result back through [`Session::complete_switch`].
    ///
    /// # Errors
    /// `UnknownCollection`, or `SwitchInProgress` under the reject policy.
    pub fn request_switch(&mut self, name: &str) -> Result<SwitchRequest, CollectionError> {
        self.switcher.request(name, &self.bank)
    }

    /// Apply fetched resources for an in-flight switch
    pub fn complete_switch(
        &mut self,
        ticket: SwitchTicket,
        fetched: Result<FetchedCollection, CollectionError>,
    ) -> SwitchCompletion {
        let completion = self.switcher.complete(
            ticket,
            fetched,
            &mut self.bank,
            &mut self.registry,
            &mut self.interaction,
            &mut self.backend,
        );
        if matches!(completion.result, Ok(SwitchOutcome::Activated(_))) {
            self.apply_attenuation();
        }
        completion
    }

    /// Switch to `name`, driving the fetch inline
    ///
    /// When nothing is loading, the requested switch and any switch queued
    /// meanwhile are fetched and completed before returning
    /// [`SwitchSettled::Active`]. When another switch is already in flight
    /// (started through [`Session::handle_event`]), the request only joins the
    /// queue and [`SwitchSettled::Queued`] is returned at once; it starts when
    /// that switch completes.
    ///
    /// # Errors
    /// The failure of the requested switch; the previous collection stays
    /// active.
    pub async fn switch_to<F: SoundFetcher>(
        &mut self,
        name: &str,
        fetcher: &F,
    ) -> Result<SwitchSettled, CollectionError> {
        let first = match self.request_switch(name)? {
            SwitchRequest::Started(pending) => pending,
            SwitchRequest::Queued { position, .. } => return Ok(SwitchSettled::Queued { position }),
            SwitchRequest::AlreadyActive => return Ok(SwitchSettled::Active),
        };

        let fetched = first.plan.fetch(fetcher).await;
        let completion = self.complete_switch(first.ticket, fetched);
        let outcome = completion.result.map(|_| SwitchSettled::Active);

        let mut pending = completion.next;
        while let Some(PendingSwitch { ticket, plan }) = pending.take() {
            let fetched = plan.fetch(fetcher).await;
            pending = self.complete_switch(ticket, fetched).next;
        }
        outcome
    }

    /// Name of the collection after the current target, wrapping around
    pub fn next_collection_name(&self) -> Option<&str> {
        let catalog = self.bank.catalog();
        let position = self.switcher.target(&self.bank).and_then(|name| catalog.position(name));
        let next = position.map_or(0, |index| (index + 1) % catalog.len().max(1));
        catalog.names().nth(next)
    }

    // ---- Intersection feed ----

    /// A controller started touching a trigger
    pub fn on_controller_enter(&mut self, controller: ControllerId, trigger: TriggerId) {
        let outcome = self.interaction.on_enter(controller, trigger, &self.registry, &mut self.backend);
        if outcome == EnterOutcome::Started {
            self.attenuate(trigger);
        }
    }

    /// A controller stopped touching a trigger
    pub fn on_controller_exit(&mut self, controller: ControllerId, trigger: TriggerId) {
        self.interaction.on_exit(controller, trigger, &mut self.backend);
    }

    /// A controller disconnected; it exits every trigger it held
    pub fn on_controller_removed(&mut self, controller: ControllerId) {
        let stopped = self.interaction.on_controller_removed(controller, &mut self.backend);
        log::debug!("{} removed; {} trigger(s) stopped", controller, stopped.len());
    }

    /// Label of the most recently started sound still playing
    pub fn currently_playing_label(&self) -> &str {
        self.interaction.currently_playing_label()
    }

    // ---- Event loop entry ----

    /// Handle one event
    ///
    /// Returns a switch whose resources the caller must now fetch and feed
    /// back as [`SessionEvent::LoadCompleted`]. Failures are logged; event
    /// handling never fails.
    pub fn handle_event(&mut self, event: SessionEvent) -> Option<PendingSwitch> {
        match event {
            SessionEvent::IntersectEnter { controller, trigger } => {
                self.on_controller_enter(controller, trigger);
                None
            }
            SessionEvent::IntersectExit { controller, trigger } => {
                self.on_controller_exit(controller, trigger);
                None
            }
            SessionEvent::ControllerRemoved(controller) => {
                self.on_controller_removed(controller);
                None
            }
            SessionEvent::ButtonPressed(PanelButton::ToggleTriggers) => {
                self.toggle_trigger_visibility();
                None
            }
            SessionEvent::ButtonPressed(PanelButton::CycleCollection) => {
                let name = self.next_collection_name()?.to_string();
                self.start_switch(&name)
            }
            SessionEvent::SwitchRequested(name) => self.start_switch(&name),
            SessionEvent::LoadCompleted { ticket, result } => self.complete_switch(ticket, result).next,
        }
    }

    fn start_switch(&mut self, name: &str) -> Option<PendingSwitch> {
        match self.request_switch(name) {
            Ok(SwitchRequest::Started(pending)) => Some(pending),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Switch to '{}' refused: {}", name, e);
                None
            }
        }
    }

    // ---- Spatial audio ----

    /// Move the listener and re-apply attenuation to playing sounds
    pub fn set_listener_position(&mut self, position: Vec3) {
        self.spatial.set_listener_position(position);
        self.apply_attenuation();
    }

    /// Current listener position
    pub fn listener_position(&self) -> Vec3 {
        self.spatial.listener_position()
    }

    fn apply_attenuation(&mut self) {
        let held = self.interaction.held_triggers().to_vec();
        for trigger in held {
            self.attenuate(trigger);
        }
    }

    fn attenuate(&mut self, trigger: TriggerId) {
        let Some(handle) = self.interaction.playing_handle(trigger) else {
            return;
        };
        let Some(position) = self.trigger_world_position(trigger) else {
            return;
        };
        let gain = self.spatial.calculate_attenuation(position);
        if let Err(e) = self.backend.set_volume(handle, gain) {
            log::debug!("Ignoring volume update on {}: {}", trigger, e);
        }
    }

    // ---- Accessors ----

    /// Audio backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable audio backend
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Trigger registry
    pub fn registry(&self) -> &TriggerRegistry {
        &self.registry
    }

    /// Interaction state
    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    /// Sound bank
    pub fn bank(&self) -> &SoundBank {
        &self.bank
    }

    /// Stop everything, release the active collection and close the backend
    pub fn shutdown(&mut self) {
        self.interaction.clear(&mut self.backend);
        if let Some(active) = self.bank.take_active() {
            active.dispose(&mut self.backend);
        }
        self.backend.shutdown();
        log::info!("Session shut down");
    }
}
