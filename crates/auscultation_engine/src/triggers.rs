//! Trigger registry
//!
//! Anatomical trigger points and their playback bindings. Triggers are tagged
//! with a [`SoundKey`] when they are created; binding looks the key up in the
//! active collection, so a trigger's ordinal never decides what it plays.

use std::fmt;

use crate::audio::backend::SoundHandle;
use crate::foundation::math::Vec3;
use crate::sound::{CollectionId, SoundCollection, SoundKey};

/// Stable ordinal of a trigger, assigned at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(pub usize);

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger{}", self.0)
    }
}

/// A fixed anatomical landmark
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerPoint {
    /// Ordinal id
    pub id: TriggerId,
    /// Sound key this landmark plays
    pub anchor_key: SoundKey,
    /// Position relative to the model origin
    pub local_position: Vec3,
    /// Whether the trigger volume is drawn
    pub visible: bool,
}

/// Live association between a trigger and an instance of the active collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackBinding {
    /// Collection the instance belongs to
    pub collection: CollectionId,
    /// Key the binding was resolved through
    pub key: SoundKey,
    /// Bound instance
    pub handle: SoundHandle,
    /// Display name of the bound sound
    pub display_name: String,
}

/// Binding of one trigger before and after a rebind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingChange {
    /// Trigger that was rebound
    pub trigger: TriggerId,
    /// Binding before the rebind
    pub old: Option<PlaybackBinding>,
    /// Binding after the rebind
    pub new: Option<PlaybackBinding>,
}

/// Registry of every trigger created for the loaded model
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    triggers: Vec<TriggerPoint>,
    bindings: Vec<Option<PlaybackBinding>>,
    visible: bool,
}

impl TriggerRegistry {
    /// Create an empty registry; new triggers start hidden
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with an initial visibility flag
    pub fn with_visibility(visible: bool) -> Self {
        Self {
            visible,
            ..Self::default()
        }
    }

    /// Register a landmark; the returned point carries its stable id
    pub fn register_trigger(&mut self, anchor_key: SoundKey, local_position: Vec3) -> TriggerPoint {
        let trigger = TriggerPoint {
            id: TriggerId(self.triggers.len()),
            anchor_key,
            local_position,
            visible: self.visible,
        };
        self.triggers.push(trigger);
        self.bindings.push(None);
        log::debug!("Registered {} for {} at {:?}", trigger.id, anchor_key, local_position.as_slice());
        trigger
    }

    /// Rebind every trigger to `collection`
    ///
    /// A trigger whose key the collection omits becomes unbound. The returned
    /// changes cover every trigger, in id order.
    pub fn bind_active_collection(&mut self, collection: &SoundCollection) -> Vec<BindingChange> {
        let mut changes = Vec::with_capacity(self.triggers.len());
        for trigger in &self.triggers {
            let new = resolve(collection, trigger.anchor_key);
            if new.is_none() {
                log::debug!("{} has no '{}' sound in '{}'", trigger.id, trigger.anchor_key, collection.name());
            }
            let old = std::mem::replace(&mut self.bindings[trigger.id.0], new.clone());
            changes.push(BindingChange { trigger: trigger.id, old, new });
        }
        changes
    }

    /// Bind a single trigger (one registered after the collection loaded)
    pub fn bind_trigger(&mut self, id: TriggerId, collection: &SoundCollection) -> Option<&PlaybackBinding> {
        let key = self.triggers.get(id.0)?.anchor_key;
        let slot = self.bindings.get_mut(id.0)?;
        *slot = resolve(collection, key);
        slot.as_ref()
    }

    /// Current binding of a trigger
    pub fn binding(&self, id: TriggerId) -> Option<&PlaybackBinding> {
        self.bindings.get(id.0).and_then(Option::as_ref)
    }

    /// Look up a trigger
    pub fn get(&self, id: TriggerId) -> Option<&TriggerPoint> {
        self.triggers.get(id.0)
    }

    /// All triggers in id order
    pub fn triggers(&self) -> &[TriggerPoint] {
        &self.triggers
    }

    /// Number of registered triggers
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Whether no trigger was registered
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Show or hide every trigger; no sound side effect
    pub fn set_visibility(&mut self, visible: bool) {
        self.visible = visible;
        for trigger in &mut self.triggers {
            trigger.visible = visible;
        }
    }

    /// Flip trigger visibility, returning the new flag
    pub fn toggle_visibility(&mut self) -> bool {
        self.set_visibility(!self.visible);
        self.visible
    }

    /// Current visibility flag
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

fn resolve(collection: &SoundCollection, key: SoundKey) -> Option<PlaybackBinding> {
    collection.get(key).map(|sound| PlaybackBinding {
        collection: collection.id(),
        key,
        handle: sound.handle,
        display_name: sound.descriptor.display_name.clone(),
    })
}
