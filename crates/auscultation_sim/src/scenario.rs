//! Scripted controller scenarios
//!
//! A scenario is a list of steps written in RON. Positions are scene
//! coordinates in meters; `Touch` and `Jitter` resolve an anchor key to the
//! world position of its trigger so scripts survive model placement changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use auscultation_engine::events::PanelButton;
use auscultation_engine::sound::SoundKey;

use crate::error::SimError;

/// One scripted action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Move a controller to a scene position
    Move {
        /// Controller number
        controller: u32,
        /// Scene position
        position: [f32; 3],
    },
    /// Move a controller onto the trigger of an anchor
    Touch {
        /// Controller number
        controller: u32,
        /// Anchor to touch
        anchor: SoundKey,
    },
    /// Move a controller away from every trigger
    Withdraw {
        /// Controller number
        controller: u32,
    },
    /// Disconnect a controller
    Remove {
        /// Controller number
        controller: u32,
    },
    /// Press a panel button
    Press(PanelButton),
    /// Switch directly to a named collection
    Switch(String),
    /// Move the listener (headset)
    Listener {
        /// Scene position
        position: [f32; 3],
    },
    /// Let simulated time pass; pending loads settle
    Wait {
        /// Scenario seconds
        seconds: f64,
    },
    /// Random small movements around an anchor
    Jitter {
        /// Controller number
        controller: u32,
        /// Anchor to hover around
        anchor: SoundKey,
        /// Number of moves
        moves: u32,
        /// Maximum offset per axis
        spread: f32,
        /// RNG seed
        seed: u64,
    },
}

impl Step {
    /// Check values that must be non-negative and finite
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Wait { seconds } if !(seconds.is_finite() && *seconds >= 0.0) => {
                Err(format!("wait of {seconds} seconds must be finite and non-negative"))
            }
            Self::Jitter { spread, .. } if !(spread.is_finite() && *spread >= 0.0) => {
                Err(format!("jitter spread {spread} must be finite and non-negative"))
            }
            _ => Ok(()),
        }
    }
}

/// A named list of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name for logs
    pub name: String,
    /// Steps in order
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Read a RON scenario file
    ///
    /// # Errors
    /// `ScenarioIo` or `ScenarioParse`.
    pub async fn load(path: &Path) -> Result<Self, SimError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|source| SimError::ScenarioIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|reason| SimError::ScenarioParse {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse RON scenario text and validate every step
    pub fn parse(contents: &str) -> Result<Self, String> {
        let scenario: Self = ron::from_str(contents).map_err(|e| e.to_string())?;
        for (index, step) in scenario.steps.iter().enumerate() {
            step.validate().map_err(|reason| format!("step {index}: {reason}"))?;
        }
        Ok(scenario)
    }

    /// Built-in tour of the trainer
    ///
    /// Two hands share the heart, the collection changes under a held
    /// trigger, crackles are touched, and a hand disconnects mid-touch.
    pub fn walkthrough() -> Self {
        use Step::{Jitter, Listener, Press, Remove, Touch, Wait, Withdraw};

        Self {
            name: "walkthrough".to_string(),
            steps: vec![
                Press(PanelButton::ToggleTriggers),
                Touch { controller: 0, anchor: SoundKey::Heart },
                Wait { seconds: 1.0 },
                Touch { controller: 1, anchor: SoundKey::Heart },
                Withdraw { controller: 0 },
                Wait { seconds: 1.0 },
                Press(PanelButton::CycleCollection),
                Wait { seconds: 0.5 },
                Touch { controller: 0, anchor: SoundKey::Crackles },
                Wait { seconds: 1.0 },
                Listener { position: [1.5, 1.6, 0.0] },
                Withdraw { controller: 0 },
                Jitter { controller: 0, anchor: SoundKey::Lung, moves: 20, spread: 0.08, seed: 7 },
                Remove { controller: 1 },
                Withdraw { controller: 0 },
                Press(PanelButton::CycleCollection),
                Wait { seconds: 0.5 },
                Press(PanelButton::ToggleTriggers),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_scenario_parses() {
        let scenario = Scenario::parse(include_str!("../resources/scenarios/two_hands.ron")).unwrap();
        assert_eq!(scenario.name, "two hands on the heart");
        assert!(scenario.steps.contains(&Step::Press(PanelButton::CycleCollection)));
    }

    #[test]
    fn test_walkthrough_survives_ron() {
        let walkthrough = Scenario::walkthrough();
        let text = ron::ser::to_string_pretty(&walkthrough, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(Scenario::parse(&text).unwrap(), walkthrough);
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(Scenario::parse("(name: \"broken\", steps: [Fly])").is_err());
    }

    #[test]
    fn test_negative_jitter_spread_is_rejected() {
        let text = "(name: \"shaky\", steps: [Jitter(controller: 0, anchor: lung, moves: 3, spread: -0.1, seed: 1)])";
        let reason = Scenario::parse(text).unwrap_err();
        assert!(reason.starts_with("step 0:"), "{reason}");
    }

    #[test]
    fn test_negative_wait_is_rejected() {
        let text = "(name: \"rewind\", steps: [Press(ToggleTriggers), Wait(seconds: -1.0)])";
        let reason = Scenario::parse(text).unwrap_err();
        assert!(reason.starts_with("step 1:"), "{reason}");
    }

    #[test]
    fn test_non_finite_step_values_are_invalid() {
        assert!(Step::Wait { seconds: f64::NAN }.validate().is_err());
        assert!(Step::Wait { seconds: f64::INFINITY }.validate().is_err());
        let jitter = Step::Jitter { controller: 0, anchor: SoundKey::Heart, moves: 1, spread: f32::NAN, seed: 0 };
        assert!(jitter.validate().is_err());
        assert!(Step::Wait { seconds: 0.0 }.validate().is_ok());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = Scenario::load(Path::new("does/not/exist.ron")).await;
        assert!(matches!(result, Err(SimError::ScenarioIo { .. })));
    }
}
