//! Registered sound collections

use serde::{Deserialize, Serialize};

use super::{CollectionError, SoundKey};

/// A sound as described by configuration; immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundDescriptor {
    /// Semantic key matched against trigger anchors
    pub key: SoundKey,
    /// Name shown to the trainee while the sound plays
    pub display_name: String,
    /// Opaque reference handed to the fetcher
    pub resource: String,
}

/// A named, switchable set of sound assignments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDefinition {
    /// Collection name ("normal", "intermediate", ...)
    pub name: String,
    /// Sounds in the collection; a key may be omitted
    #[serde(default)]
    pub sounds: Vec<SoundDescriptor>,
}

impl CollectionDefinition {
    /// Create an empty definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sounds: Vec::new(),
        }
    }

    /// Add a sound (builder pattern)
    pub fn with_sound(
        mut self,
        key: SoundKey,
        display_name: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        self.sounds.push(SoundDescriptor {
            key,
            display_name: display_name.into(),
            resource: resource.into(),
        });
        self
    }

    /// Descriptor for a key, if the collection defines one
    pub fn get(&self, key: SoundKey) -> Option<&SoundDescriptor> {
        self.sounds.iter().find(|sound| sound.key == key)
    }
}

/// Ordered, validated set of collection definitions
#[derive(Debug, Clone, Default)]
pub struct SoundCatalog {
    collections: Vec<CollectionDefinition>,
}

impl SoundCatalog {
    /// Build a catalog, rejecting duplicate names and duplicate keys
    pub fn new(collections: Vec<CollectionDefinition>) -> Result<Self, CollectionError> {
        for (index, collection) in collections.iter().enumerate() {
            if collections[..index].iter().any(|earlier| earlier.name == collection.name) {
                return Err(CollectionError::DuplicateCollection(collection.name.clone()));
            }
            for (sound_index, sound) in collection.sounds.iter().enumerate() {
                if collection.sounds[..sound_index].iter().any(|earlier| earlier.key == sound.key) {
                    return Err(CollectionError::DuplicateSound {
                        collection: collection.name.clone(),
                        key: sound.key,
                    });
                }
            }
        }
        Ok(Self { collections })
    }

    /// Collection names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|collection| collection.name.as_str())
    }

    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<&CollectionDefinition> {
        self.collections.iter().find(|collection| collection.name == name)
    }

    /// Position of a collection in registration order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.collections.iter().position(|collection| collection.name == name)
    }

    /// Number of registered collections
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Whether no collection is registered
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal() -> CollectionDefinition {
        CollectionDefinition::new("normal")
            .with_sound(SoundKey::Lung, "Normal Bronchial", "audio/Bronchial.mp3")
            .with_sound(SoundKey::Heart, "Normal Heart", "audio/Normal_heart.mp3")
    }

    #[test]
    fn test_names_keep_registration_order() {
        let catalog = SoundCatalog::new(vec![normal(), CollectionDefinition::new("intermediate")]).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["normal", "intermediate"]);
        assert_eq!(catalog.position("intermediate"), Some(1));
        assert!(catalog.get("advanced").is_none());
    }

    #[test]
    fn test_missing_key_is_allowed() {
        let catalog = SoundCatalog::new(vec![normal()]).unwrap();
        let definition = catalog.get("normal").unwrap();
        assert!(definition.get(SoundKey::Crackles).is_none());
        assert_eq!(definition.get(SoundKey::Heart).unwrap().display_name, "Normal Heart");
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let result = SoundCatalog::new(vec![normal(), normal()]);
        assert!(matches!(result, Err(CollectionError::DuplicateCollection(name)) if name == "normal"));

        let doubled = normal().with_sound(SoundKey::Heart, "Third Heart", "audio/Third_heart.mp3");
        let result = SoundCatalog::new(vec![doubled]);
        assert!(matches!(result, Err(CollectionError::DuplicateSound { key: SoundKey::Heart, .. })));
    }
}
