//! Control panel widgets

use crate::audio::backend::AudioBackend;
use crate::events::{PanelButton, SessionEvent};
use crate::session::Session;
use crate::switcher::PendingSwitch;

/// Button state for visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Normal resting state
    #[default]
    Normal,
    /// The action it triggered is still settling
    Busy,
}

/// A labelled panel button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelWidget {
    /// Which button this is
    pub button: PanelButton,
    /// Label text
    pub text: String,
    /// Current state
    pub state: ButtonState,
}

impl PanelWidget {
    fn new(button: PanelButton) -> Self {
        Self {
            button,
            text: String::new(),
            state: ButtonState::Normal,
        }
    }
}

/// The trainer's control panel
///
/// Holds the two buttons and the status line. Labels are derived from the
/// session on every [`ControlPanel::refresh`]; the panel itself holds no
/// session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPanel {
    visibility: PanelWidget,
    collection: PanelWidget,
    status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlPanel {
    /// Create a panel with empty labels
    pub fn new() -> Self {
        Self {
            visibility: PanelWidget::new(PanelButton::ToggleTriggers),
            collection: PanelWidget::new(PanelButton::CycleCollection),
            status: String::new(),
        }
    }

    /// Create a panel already showing `session`'s state
    pub fn for_session<B: AudioBackend>(session: &Session<B>) -> Self {
        let mut panel = Self::new();
        panel.refresh(session);
        panel
    }

    /// Re-derive every label from the session
    pub fn refresh<B: AudioBackend>(&mut self, session: &Session<B>) {
        self.visibility.text = if session.triggers_visible() {
            "Hide Triggers"
        } else {
            "Show Triggers"
        }
        .to_string();

        let pending = session.pending_collection();
        let shown = pending
            .or_else(|| session.active_collection())
            .or_else(|| session.list_collection_names().first().copied())
            .unwrap_or("none");
        self.collection.text = format!("Sound: {shown}");
        self.collection.state = if pending.is_some() {
            ButtonState::Busy
        } else {
            ButtonState::Normal
        };

        self.status = format!("Currently: {}", session.currently_playing_label());
    }

    /// Press a button
    ///
    /// Returns a switch whose resources the caller must fetch.
    pub fn press<B: AudioBackend>(&mut self, button: PanelButton, session: &mut Session<B>) -> Option<PendingSwitch> {
        log::debug!("Panel button {:?} pressed", button);
        let pending = session.handle_event(SessionEvent::ButtonPressed(button));
        self.refresh(session);
        pending
    }

    /// Trigger visibility button
    pub fn visibility_button(&self) -> &PanelWidget {
        &self.visibility
    }

    /// Collection cycling button
    pub fn collection_button(&self) -> &PanelWidget {
        &self.collection
    }

    /// Status line text
    pub fn status(&self) -> &str {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::HeadlessBackend;
    use crate::audio::fetch::MemoryFetcher;
    use crate::foundation::math::Vec3;
    use crate::interaction::ControllerId;
    use crate::session::SessionConfig;
    use crate::sound::{CollectionDefinition, SoundCatalog, SoundKey};

    fn session() -> Session<HeadlessBackend> {
        let catalog = SoundCatalog::new(vec![
            CollectionDefinition::new("normal").with_sound(SoundKey::Heart, "Normal Heart", "heart"),
            CollectionDefinition::new("intermediate").with_sound(SoundKey::Heart, "Third Heart", "heart3"),
        ])
        .unwrap();
        Session::new(catalog, HeadlessBackend::new(), SessionConfig::default())
    }

    fn fetcher() -> MemoryFetcher {
        MemoryFetcher::new()
            .with_resource("heart", b"OggS".to_vec())
            .with_resource("heart3", b"OggS".to_vec())
    }

    #[test]
    fn test_initial_labels() {
        let panel = ControlPanel::for_session(&session());
        assert_eq!(panel.visibility_button().text, "Show Triggers");
        assert_eq!(panel.collection_button().text, "Sound: normal");
        assert_eq!(panel.status(), "Currently: No sound playing");
    }

    #[test]
    fn test_visibility_button_flips_label() {
        let mut session = session();
        let mut panel = ControlPanel::for_session(&session);

        assert!(panel.press(PanelButton::ToggleTriggers, &mut session).is_none());
        assert_eq!(panel.visibility_button().text, "Hide Triggers");
        panel.press(PanelButton::ToggleTriggers, &mut session);
        assert_eq!(panel.visibility_button().text, "Show Triggers");
    }

    #[tokio::test]
    async fn test_cycle_shows_pending_then_active() {
        let mut session = session();
        let fetcher = fetcher();
        session.switch_to("normal", &fetcher).await.unwrap();
        let heart = session.register_trigger(SoundKey::Heart, Vec3::zeros());
        session.on_controller_enter(ControllerId(0), heart.id);

        let mut panel = ControlPanel::for_session(&session);
        assert_eq!(panel.status(), "Currently: Normal Heart");

        let pending = panel.press(PanelButton::CycleCollection, &mut session).unwrap();
        assert_eq!(panel.collection_button().text, "Sound: intermediate");
        assert_eq!(panel.collection_button().state, ButtonState::Busy);

        let result = pending.plan.fetch(&fetcher).await;
        session.handle_event(SessionEvent::LoadCompleted { ticket: pending.ticket, result });
        panel.refresh(&session);
        assert_eq!(panel.collection_button().state, ButtonState::Normal);
        assert_eq!(panel.status(), "Currently: Third Heart");

        // Wraps back to the first collection
        assert!(panel.press(PanelButton::CycleCollection, &mut session).is_some());
        assert_eq!(panel.collection_button().text, "Sound: normal");
    }
}
