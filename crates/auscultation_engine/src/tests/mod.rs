//! Session-level tests
//!
//! Shared fixture: the three SAMII anchors and three collections. "normal"
//! has no crackles, "intermediate" has every key, "cardiac" has heart only.

mod interaction_properties;

use crate::audio::backend::{AudioBackend, HeadlessBackend};
use crate::audio::fetch::MemoryFetcher;
use crate::foundation::math::Vec3;
use crate::session::{Session, SessionConfig};
use crate::sound::{CollectionDefinition, SoundCatalog, SoundKey};
use crate::triggers::TriggerId;

pub(crate) const LUNG: TriggerId = TriggerId(0);
pub(crate) const HEART: TriggerId = TriggerId(1);
pub(crate) const CRACKLES: TriggerId = TriggerId(2);

pub(crate) fn catalog() -> SoundCatalog {
    SoundCatalog::new(vec![
        CollectionDefinition::new("normal")
            .with_sound(SoundKey::Lung, "Normal Bronchial", "Bronchial.mp3")
            .with_sound(SoundKey::Heart, "Normal Heart", "Normal_heart.mp3"),
        CollectionDefinition::new("intermediate")
            .with_sound(SoundKey::Lung, "Normal Bronchial", "Bronchial.mp3")
            .with_sound(SoundKey::Heart, "Third Heart", "Third_heart.mp3")
            .with_sound(SoundKey::Crackles, "Late Inspiratory Crackles", "Crackles_Late_Inspiratory.mp3"),
        CollectionDefinition::new("cardiac").with_sound(SoundKey::Heart, "Fourth Heart", "Fourth_heart.mp3"),
    ])
    .unwrap()
}

pub(crate) fn fetcher() -> MemoryFetcher {
    [
        "Bronchial.mp3",
        "Normal_heart.mp3",
        "Third_heart.mp3",
        "Crackles_Late_Inspiratory.mp3",
        "Fourth_heart.mp3",
    ]
    .into_iter()
    .fold(MemoryFetcher::new(), |fetcher, resource| {
        fetcher.with_resource(resource, b"ID3\x03\x00".to_vec())
    })
}

/// Session with the three anchors registered and `initial` active
pub(crate) async fn session_with(config: SessionConfig, initial: &str) -> Session<HeadlessBackend> {
    let mut session = Session::new(catalog(), HeadlessBackend::new(), config);
    session.register_trigger(SoundKey::Lung, Vec3::new(0.0, 0.55, 0.1));
    session.register_trigger(SoundKey::Heart, Vec3::new(0.13, 0.47, 0.09));
    session.register_trigger(SoundKey::Crackles, Vec3::new(0.12, 0.55, -0.06));
    session.switch_to(initial, &fetcher()).await.unwrap();
    session
}

pub(crate) async fn session(initial: &str) -> Session<HeadlessBackend> {
    session_with(SessionConfig::default(), initial).await
}

/// Whether the instance bound to `trigger` is playing
pub(crate) fn bound_playing(session: &Session<HeadlessBackend>, trigger: TriggerId) -> bool {
    session
        .registry()
        .binding(trigger)
        .is_some_and(|binding| session.backend().is_playing(binding.handle))
}

/// Display names of the current bindings, in trigger order
pub(crate) fn bound_names(session: &Session<HeadlessBackend>) -> Vec<Option<String>> {
    session
        .registry()
        .triggers()
        .iter()
        .map(|trigger| session.registry().binding(trigger.id).map(|b| b.display_name.clone()))
        .collect()
}
