//! # Auscultation Engine
//!
//! Interaction and sound-state core for a VR auscultation trainer. A manikin
//! carries anatomical trigger points; touching one with a tracked controller
//! starts looping playback of the physiological sound bound to it.
//!
//! ## Features
//!
//! - **Tagged triggers**: every trigger carries an explicit [`sound::SoundKey`]
//! - **Idempotent playback**: overlapping controllers never double-play or
//!   prematurely stop a sound
//! - **Hot-swappable collections**: serialized, all-or-nothing collection
//!   switches that rebind live interactions
//! - **Pluggable substrate**: audio, resource fetching and model loading sit
//!   behind small traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use auscultation_engine::prelude::*;
//!
//! # async fn run() -> Result<(), CollectionError> {
//! let catalog = SoundCatalog::new(vec![CollectionDefinition::new("normal")
//!     .with_sound(SoundKey::Heart, "Normal Heart", "audio/Normal_heart.mp3")])?;
//! let fetcher = FileFetcher::new("assets");
//! let mut session = Session::new(catalog, HeadlessBackend::new(), SessionConfig::default());
//!
//! session.switch_to("normal", &fetcher).await?;
//! let heart = session.register_trigger(SoundKey::Heart, Vec3::new(0.13, 0.47, 0.09));
//!
//! session.on_controller_enter(ControllerId(0), heart.id);
//! assert_eq!(session.currently_playing_label(), "Normal Heart");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod audio;
pub mod sound;
pub mod triggers;
pub mod interaction;
pub mod switcher;
pub mod session;
pub mod events;
pub mod physics;
pub mod scene;
pub mod ui;

#[cfg(test)]
mod tests;

pub use session::{Session, SessionConfig};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Session, SessionConfig,
        foundation::math::{Vec3, Transform},
        audio::{
            AudioError,
            backend::{AudioBackend, AudioBackendConfig, HeadlessBackend, SoundHandle},
            fetch::{FileFetcher, MemoryFetcher, SoundFetcher},
            spatial::{DistanceModel, SpatialConfig},
        },
        sound::{CollectionDefinition, CollectionError, SoundCatalog, SoundKey},
        triggers::{TriggerId, TriggerPoint},
        interaction::{ControllerId, PairState, NO_SOUND_PLAYING},
        switcher::{
            PendingSwitch, SwitchCompletion, SwitchOutcome, SwitchPolicy, SwitchRequest, SwitchSettled,
        },
        events::{EventQueue, PanelButton, SessionEvent},
        physics::IntersectionTracker,
        scene::{ManifestModelLoader, ModelHandle, ModelLoader, ModelManifest},
        ui::ControlPanel,
    };
}
