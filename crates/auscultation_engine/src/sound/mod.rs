//! Sound collections
//!
//! The catalog lists what can be loaded; the bank owns what is loaded.

pub mod bank;
pub mod catalog;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioError;

pub use bank::{CollectionId, FetchedCollection, LoadPlan, LoadedSound, SoundBank, SoundCollection};
pub use catalog::{CollectionDefinition, SoundCatalog, SoundDescriptor};

/// Semantic key tying a trigger to the sound it plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundKey {
    /// Breath sounds over the lung fields
    Lung,
    /// Heart sounds over the precordium
    Heart,
    /// Adventitious crackles
    Crackles,
}

impl SoundKey {
    /// Every key, in anchor order
    pub const ALL: [Self; 3] = [Self::Lung, Self::Heart, Self::Crackles];

    /// Lowercase name used in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lung => "lung",
            Self::Heart => "heart",
            Self::Crackles => "crackles",
        }
    }
}

impl fmt::Display for SoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while defining, loading or switching collections
#[derive(Debug, Error)]
pub enum CollectionError {
    /// No collection with this name is registered
    #[error("Unknown sound collection '{0}'")]
    UnknownCollection(String),

    /// A sound of the collection could not be fetched or decoded
    #[error("Failed to load sound '{sound}' of collection '{collection}': {source}")]
    ResourceLoad {
        /// Collection being loaded
        collection: String,
        /// Display name of the failing sound
        sound: String,
        /// Underlying audio error
        #[source]
        source: AudioError,
    },

    /// Another switch is still loading and the policy rejects new requests
    #[error("Switch to '{in_flight}' still in progress")]
    SwitchInProgress {
        /// Collection currently loading
        in_flight: String,
    },

    /// Two collections share a name
    #[error("Sound collection '{0}' is defined twice")]
    DuplicateCollection(String),

    /// A collection lists the same key twice
    #[error("Sound collection '{collection}' defines '{key}' twice")]
    DuplicateSound {
        /// Offending collection
        collection: String,
        /// Repeated key
        key: SoundKey,
    },
}
