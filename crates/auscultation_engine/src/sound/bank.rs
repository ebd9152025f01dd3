//! Sound bank
//!
//! Owns the lifetimes of loaded sound instances. Loading is split in three
//! steps so the asynchronous part can run outside the session borrow:
//!
//! 1. [`SoundBank::plan_load`] resolves a name against the catalog
//! 2. [`LoadPlan::fetch`] fetches every payload concurrently
//! 3. [`SoundBank::instantiate`] validates payloads and creates instances
//!
//! Step 3 is all-or-nothing: on any failure the instances created so far are
//! disposed and no collection is returned.

use std::collections::BTreeMap;

use futures_util::future::try_join_all;

use super::catalog::{CollectionDefinition, SoundCatalog, SoundDescriptor};
use super::{CollectionError, SoundKey};
use crate::audio::asset::SoundData;
use crate::audio::backend::{AudioBackend, SoundHandle};
use crate::audio::fetch::SoundFetcher;

/// Unique stamp of one loaded collection
///
/// Loading the same definition twice yields two different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(u64);

/// A collection resolved against the catalog, ready to fetch
#[derive(Debug, Clone)]
pub struct LoadPlan {
    definition: CollectionDefinition,
}

impl LoadPlan {
    /// Name of the collection to load
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Fetch every payload of the collection concurrently
    ///
    /// # Errors
    /// `ResourceLoad` naming the first sound that failed to fetch.
    pub async fn fetch<F: SoundFetcher>(self, fetcher: &F) -> Result<FetchedCollection, CollectionError> {
        let collection = &self.definition.name;
        let fetches = self.definition.sounds.iter().map(|sound| async move {
            fetcher.fetch(&sound.resource).await.map_err(|source| CollectionError::ResourceLoad {
                collection: collection.clone(),
                sound: sound.display_name.clone(),
                source,
            })
        });
        let payloads = try_join_all(fetches).await?;

        log::debug!("Fetched {} sounds for collection '{}'", payloads.len(), collection);
        Ok(FetchedCollection {
            definition: self.definition,
            payloads,
        })
    }
}

/// Raw payloads of a collection, aligned with its definition
#[derive(Debug, Clone)]
pub struct FetchedCollection {
    definition: CollectionDefinition,
    payloads: Vec<Vec<u8>>,
}

impl FetchedCollection {
    /// Name of the fetched collection
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

/// A loaded sound: its descriptor and the live backend instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSound {
    /// Immutable description
    pub descriptor: SoundDescriptor,
    /// Backend instance owned by the bank
    pub handle: SoundHandle,
}

/// A fully loaded collection
#[derive(Debug)]
pub struct SoundCollection {
    id: CollectionId,
    name: String,
    sounds: BTreeMap<SoundKey, LoadedSound>,
}

impl SoundCollection {
    /// Unique stamp of this load
    pub fn id(&self) -> CollectionId {
        self.id
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Loaded sound for a key, if the collection defines one
    pub fn get(&self, key: SoundKey) -> Option<&LoadedSound> {
        self.sounds.get(&key)
    }

    /// Loaded sounds ordered by key
    pub fn sounds(&self) -> impl Iterator<Item = &LoadedSound> {
        self.sounds.values()
    }

    /// Stop every playing instance, then release all of them
    ///
    /// Safe for instances that were never played; stale handles are ignored.
    pub fn dispose<B: AudioBackend + ?Sized>(self, backend: &mut B) {
        for sound in self.sounds.values() {
            if backend.is_playing(sound.handle) {
                if let Err(e) = backend.stop(sound.handle) {
                    log::debug!("Ignoring stop failure on '{}': {}", sound.descriptor.display_name, e);
                }
            }
        }
        for sound in self.sounds.into_values() {
            backend.dispose(sound.handle);
        }
        log::debug!("Disposed collection '{}'", self.name);
    }
}

/// Sound bank holding the catalog and the single active collection
#[derive(Debug)]
pub struct SoundBank {
    catalog: SoundCatalog,
    active: Option<SoundCollection>,
    next_id: u64,
}

impl SoundBank {
    /// Create a bank with nothing loaded
    pub fn new(catalog: SoundCatalog) -> Self {
        Self {
            catalog,
            active: None,
            next_id: 0,
        }
    }

    /// Registered collections
    pub fn catalog(&self) -> &SoundCatalog {
        &self.catalog
    }

    /// The active collection, if one was loaded
    pub fn active(&self) -> Option<&SoundCollection> {
        self.active.as_ref()
    }

    /// Resolve a collection name against the catalog
    ///
    /// # Errors
    /// `UnknownCollection` when the name is not registered.
    pub fn plan_load(&self, name: &str) -> Result<LoadPlan, CollectionError> {
        let definition = self
            .catalog
            .get(name)
            .ok_or_else(|| CollectionError::UnknownCollection(name.to_string()))?;
        Ok(LoadPlan {
            definition: definition.clone(),
        })
    }

    /// Validate fetched payloads and create one instance per sound
    ///
    /// The returned collection is not activated.
    ///
    /// # Errors
    /// `ResourceLoad` when any payload fails to decode or instantiate; every
    /// instance created before the failure has been disposed.
    pub fn instantiate<B: AudioBackend + ?Sized>(
        &mut self,
        fetched: FetchedCollection,
        backend: &mut B,
    ) -> Result<SoundCollection, CollectionError> {
        let FetchedCollection { definition, payloads } = fetched;
        let mut sounds = BTreeMap::new();

        for (descriptor, bytes) in definition.sounds.into_iter().zip(payloads) {
            let created = SoundData::from_bytes(&descriptor.resource, bytes)
                .and_then(|data| backend.create_instance(&descriptor.display_name, &data));

            match created {
                Ok(handle) => {
                    sounds.insert(descriptor.key, LoadedSound { descriptor, handle });
                }
                Err(source) => {
                    for sound in sounds.into_values() {
                        backend.dispose(sound.handle);
                    }
                    return Err(CollectionError::ResourceLoad {
                        collection: definition.name,
                        sound: descriptor.display_name,
                        source,
                    });
                }
            }
        }

        self.next_id += 1;
        log::info!("Loaded sound collection '{}' ({} sounds)", definition.name, sounds.len());
        Ok(SoundCollection {
            id: CollectionId(self.next_id),
            name: definition.name,
            sounds,
        })
    }

    /// Plan, fetch and instantiate a collection without activating it
    ///
    /// # Errors
    /// `UnknownCollection` or `ResourceLoad`; nothing is left allocated.
    pub async fn load_collection<F, B>(
        &mut self,
        name: &str,
        fetcher: &F,
        backend: &mut B,
    ) -> Result<SoundCollection, CollectionError>
    where
        F: SoundFetcher,
        B: AudioBackend + ?Sized,
    {
        let fetched = self.plan_load(name)?.fetch(fetcher).await?;
        self.instantiate(fetched, backend)
    }

    /// Make `collection` the active one, returning the previous collection
    ///
    /// The caller disposes the returned collection once nothing references it.
    pub fn activate(&mut self, collection: SoundCollection) -> Option<SoundCollection> {
        self.active.replace(collection)
    }

    /// Detach the active collection (session shutdown)
    pub fn take_active(&mut self) -> Option<SoundCollection> {
        self.active.take()
    }

    /// Stop and release a collection's instances
    pub fn dispose_collection<B: AudioBackend + ?Sized>(&self, collection: SoundCollection, backend: &mut B) {
        collection.dispose(backend);
    }
}
