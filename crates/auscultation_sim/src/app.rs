//! Simulator event loop
//!
//! Owns the session and feeds it from three sources: scripted controller
//! movement (turned into intersection edges by the tracker), panel presses,
//! and collection fetches. Fetches run as spawned tasks and report back over a
//! channel; their completions are queued like any other event, so the session
//! is only ever touched from this loop.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::Instant;

use auscultation_engine::audio::backend::{create_backend, AudioBackend};
use auscultation_engine::audio::fetch::FileFetcher;
use auscultation_engine::events::{EventQueue, SessionEvent};
use auscultation_engine::foundation::math::{vec3_from_array, Vec3};
use auscultation_engine::interaction::ControllerId;
use auscultation_engine::physics::IntersectionTracker;
use auscultation_engine::scene::{ManifestModelLoader, ModelHandle, ModelLoader, ModelManifest};
use auscultation_engine::sound::SoundKey;
use auscultation_engine::switcher::PendingSwitch;
use auscultation_engine::ui::ControlPanel;
use auscultation_engine::Session;

use crate::config::{SimulatorConfig, SoundSource};
use crate::error::SimError;
use crate::scenario::{Scenario, Step};
use crate::tone::{PayloadSource, ToneFetcher};

/// Where withdrawn controllers are parked
fn parked() -> Vec3 {
    Vec3::new(0.0, -10.0, 0.0)
}

/// State at the end of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps executed
    pub steps: usize,
    /// Active collection
    pub active_collection: Option<String>,
    /// Collection button label
    pub collection_label: String,
    /// Status line
    pub status: String,
    /// Whether triggers were visible
    pub triggers_visible: bool,
}

/// Headless trainer driven by a scenario
pub struct Simulator {
    config: SimulatorConfig,
    session: Session<Box<dyn AudioBackend>>,
    panel: ControlPanel,
    tracker: IntersectionTracker,
    queue: EventQueue,
    fetcher: Arc<PayloadSource>,
    loads_tx: mpsc::UnboundedSender<SessionEvent>,
    loads_rx: mpsc::UnboundedReceiver<SessionEvent>,
    outstanding: usize,
    clock: f64,
}

impl Simulator {
    /// Build the session from configuration
    ///
    /// # Errors
    /// Invalid catalog or an audio backend that cannot start.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimError> {
        let catalog = config.catalog()?;
        let backend = create_backend(&config.audio)?;
        let fetcher = match config.sound_source {
            SoundSource::Tone => PayloadSource::Tone(ToneFetcher::new(config.audio.sample_rate)),
            SoundSource::Files => PayloadSource::Files(FileFetcher::new(&config.assets_root)),
        };
        let session = Session::new(catalog, backend, config.session.clone());
        let (loads_tx, loads_rx) = mpsc::unbounded_channel();

        Ok(Self {
            panel: ControlPanel::for_session(&session),
            tracker: IntersectionTracker::new(config.trigger_radius, config.controller_radius),
            session,
            queue: EventQueue::new(),
            fetcher: Arc::new(fetcher),
            loads_tx,
            loads_rx,
            outstanding: 0,
            clock: 0.0,
            config,
        })
    }

    /// Load the configured model and create its triggers
    ///
    /// A failed load is logged; the run continues without triggers.
    pub async fn attach_model(&mut self) {
        let Some(model) = self.load_model().await else {
            return;
        };
        for trigger in self.session.attach_model(&model) {
            if let Some(position) = self.session.trigger_world_position(trigger.id) {
                log::debug!("{} ({}) at {:?}", trigger.id, trigger.anchor_key, position.as_slice());
                self.tracker.add_trigger(trigger.id, position);
            }
        }
    }

    async fn load_model(&self) -> Option<ModelHandle> {
        let result = match &self.config.model_manifest {
            Some(path) => {
                ManifestModelLoader::new(&self.config.assets_root)
                    .load_model(path)
                    .await
            }
            None => ModelManifest::samii().into_handle(),
        };
        match result {
            Ok(model) => Some(model),
            Err(e) => {
                log::error!("Model load failed, continuing without triggers: {}", e);
                None
            }
        }
    }

    /// Run a scenario to completion
    ///
    /// The default collection is loaded first; all loads settle before the
    /// summary is taken.
    pub async fn run(&mut self, scenario: &Scenario) -> RunSummary {
        log::info!("Running scenario '{}' ({} steps)", scenario.name, scenario.steps.len());
        self.queue
            .send(SessionEvent::SwitchRequested(self.config.default_collection.clone()));
        self.dispatch();
        self.settle().await;

        for (index, step) in scenario.steps.iter().enumerate() {
            log::debug!("Step {}: {:?}", index, step);
            self.apply(step).await;
            log::info!(
                "[{:>5.1}s] {} | {}",
                self.clock,
                self.panel.collection_button().text,
                self.panel.status()
            );
        }
        self.settle().await;

        RunSummary {
            steps: scenario.steps.len(),
            active_collection: self.session.active_collection().map(str::to_string),
            collection_label: self.panel.collection_button().text.clone(),
            status: self.panel.status().to_string(),
            triggers_visible: self.session.triggers_visible(),
        }
    }

    /// Stop playback and close the backend
    pub fn shutdown(&mut self) {
        self.session.shutdown();
    }

    async fn apply(&mut self, step: &Step) {
        if let Err(reason) = step.validate() {
            log::warn!("Skipping step: {}", reason);
            return;
        }
        match step {
            Step::Move { controller, position } => self.move_controller(*controller, vec3_from_array(*position)),
            Step::Touch { controller, anchor } => {
                if let Some(position) = self.anchor_position(*anchor) {
                    self.move_controller(*controller, position);
                }
            }
            Step::Withdraw { controller } => self.move_controller(*controller, parked()),
            Step::Remove { controller } => {
                if let Some(event) = self.tracker.remove_controller(ControllerId(*controller)) {
                    self.queue.send(event);
                }
                self.dispatch();
            }
            Step::Press(button) => {
                if let Some(pending) = self.panel.press(*button, &mut self.session) {
                    self.spawn_load(pending);
                }
            }
            Step::Switch(name) => {
                self.queue.send(SessionEvent::SwitchRequested(name.clone()));
                self.dispatch();
            }
            Step::Listener { position } => {
                self.session.set_listener_position(vec3_from_array(*position));
            }
            Step::Wait { seconds } => self.wait(*seconds).await,
            Step::Jitter { controller, anchor, moves, spread, seed } => {
                let Some(center) = self.anchor_position(*anchor) else {
                    return;
                };
                let mut rng = StdRng::seed_from_u64(*seed);
                for _ in 0..*moves {
                    let offset = Vec3::new(
                        rng.gen_range(-spread..=*spread),
                        rng.gen_range(-spread..=*spread),
                        rng.gen_range(-spread..=*spread),
                    );
                    self.move_controller(*controller, center + offset);
                }
            }
        }
    }

    fn anchor_position(&self, anchor: SoundKey) -> Option<Vec3> {
        let trigger = self
            .session
            .registry()
            .triggers()
            .iter()
            .find(|trigger| trigger.anchor_key == anchor);
        match trigger {
            Some(trigger) => self.session.trigger_world_position(trigger.id),
            None => {
                log::warn!("No trigger for anchor '{}'", anchor);
                None
            }
        }
    }

    fn move_controller(&mut self, controller: u32, position: Vec3) {
        for event in self.tracker.update_controller(ControllerId(controller), position) {
            self.queue.send(event);
        }
        self.dispatch();
    }

    /// Handle every deliverable event, spawning fetches for started switches
    fn dispatch(&mut self) {
        for event in self.queue.drain_due() {
            if let Some(pending) = self.session.handle_event(event) {
                self.spawn_load(pending);
            }
        }
        self.panel.refresh(&self.session);
    }

    fn spawn_load(&mut self, pending: PendingSwitch) {
        self.outstanding += 1;
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.loads_tx.clone();
        tokio::spawn(async move {
            let PendingSwitch { ticket, plan } = pending;
            let result = plan.fetch(fetcher.as_ref()).await;
            if tx.send(SessionEvent::LoadCompleted { ticket, result }).is_err() {
                log::warn!("Simulator stopped before {} finished loading", ticket);
            }
        });
    }

    fn on_load_completed(&mut self, event: SessionEvent) {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.queue.send(event);
        self.dispatch();
    }

    /// Advance simulated time, handling loads that complete meanwhile
    async fn wait(&mut self, seconds: f64) {
        let span = Duration::try_from_secs_f64(seconds * self.config.time_scale).unwrap_or_else(|e| {
            log::warn!("Not sleeping for a {}s wait: {}", seconds, e);
            Duration::ZERO
        });
        let deadline = Instant::now() + span;
        loop {
            let event = tokio::select! {
                () = tokio::time::sleep_until(deadline) => break,
                event = self.loads_rx.recv() => event,
            };
            match event {
                Some(event) => self.on_load_completed(event),
                None => break,
            }
        }
        if self.config.time_scale == 0.0 {
            self.settle().await;
        }

        self.clock += seconds;
        self.queue.update_time(self.clock);
        self.dispatch();
    }

    /// Wait until every spawned fetch has reported back
    async fn settle(&mut self) {
        while self.outstanding > 0 {
            match self.loads_rx.recv().await {
                Some(event) => self.on_load_completed(event),
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimulatorConfig {
        SimulatorConfig {
            audio: auscultation_engine::audio::backend::AudioBackendConfig {
                sample_rate: 8000,
                ..Default::default()
            },
            ..SimulatorConfig::default()
        }
    }

    async fn simulator() -> Simulator {
        let mut simulator = Simulator::new(config()).unwrap();
        simulator.attach_model().await;
        simulator
    }

    #[tokio::test]
    async fn test_walkthrough_ends_idle_on_first_collection() {
        let mut simulator = simulator().await;
        let summary = simulator.run(&Scenario::walkthrough()).await;

        // Two cycles from "normal" wrap back around
        assert_eq!(summary.active_collection.as_deref(), Some("normal"));
        assert_eq!(summary.collection_label, "Sound: normal");
        assert_eq!(summary.status, "Currently: No sound playing");
        assert!(!summary.triggers_visible);
        simulator.shutdown();
    }

    #[tokio::test]
    async fn test_cycle_under_held_trigger_swaps_sound() {
        let mut simulator = simulator().await;
        let scenario = Scenario {
            name: "swap".to_string(),
            steps: vec![
                Step::Touch { controller: 0, anchor: SoundKey::Heart },
                Step::Press(auscultation_engine::events::PanelButton::CycleCollection),
                Step::Wait { seconds: 0.1 },
            ],
        };
        let summary = simulator.run(&scenario).await;
        assert_eq!(summary.active_collection.as_deref(), Some("intermediate"));
        assert_eq!(summary.status, "Currently: Third Heart");
    }

    #[tokio::test]
    async fn test_removed_controller_releases_trigger() {
        let mut simulator = simulator().await;
        let scenario = Scenario {
            name: "remove".to_string(),
            steps: vec![
                Step::Touch { controller: 3, anchor: SoundKey::Crackles },
                Step::Remove { controller: 3 },
            ],
        };
        let summary = simulator.run(&scenario).await;
        assert_eq!(summary.status, "Currently: No sound playing");
    }

    #[tokio::test]
    async fn test_invalid_steps_are_skipped() {
        let config = SimulatorConfig {
            time_scale: 1.0,
            ..config()
        };
        let mut simulator = Simulator::new(config).unwrap();
        simulator.attach_model().await;

        let scenario = Scenario {
            name: "invalid".to_string(),
            steps: vec![
                Step::Jitter { controller: 0, anchor: SoundKey::Lung, moves: 5, spread: -0.1, seed: 3 },
                Step::Wait { seconds: -1.0 },
                Step::Touch { controller: 0, anchor: SoundKey::Heart },
            ],
        };
        let summary = simulator.run(&scenario).await;
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.status, "Currently: Normal Heart");
    }

    #[tokio::test]
    async fn test_missing_model_runs_without_triggers() {
        let config = SimulatorConfig {
            model_manifest: Some("models/missing.ron".to_string()),
            ..config()
        };
        let mut simulator = Simulator::new(config).unwrap();
        simulator.attach_model().await;

        let scenario = Scenario {
            name: "no model".to_string(),
            steps: vec![Step::Touch { controller: 0, anchor: SoundKey::Heart }],
        };
        let summary = simulator.run(&scenario).await;
        assert_eq!(summary.active_collection.as_deref(), Some("normal"));
        assert_eq!(summary.status, "Currently: No sound playing");
    }
}
