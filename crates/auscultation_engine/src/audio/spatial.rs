//! Spatial audio system
//!
//! Listener-relative attenuation for sounds attached to trigger points.
//! Distance models follow the Web Audio `PannerNode` formulas.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Distance attenuation curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceModel {
    /// Linear falloff between reference and max distance
    #[default]
    Linear,
    /// Inverse-distance falloff
    Inverse,
    /// Exponential falloff
    Exponential,
}

/// Configuration for spatial audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Attenuation curve
    pub distance_model: DistanceModel,
    /// Maximum distance; linear falloff bottoms out here
    pub max_distance: f32,
    /// Reference distance for attenuation (no falloff)
    pub reference_distance: f32,
    /// Rolloff factor applied to the curve
    pub rolloff_factor: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            distance_model: DistanceModel::Linear,
            max_distance: 100.0,
            reference_distance: 1.0,
            rolloff_factor: 1.0,
        }
    }
}

/// Spatial audio system for listener-relative gain
#[derive(Debug, Clone)]
pub struct SpatialAudio {
    config: SpatialConfig,
    listener_position: Vec3,
}

impl SpatialAudio {
    /// Create a new spatial audio system with the listener at the origin
    pub fn new(config: SpatialConfig) -> Self {
        Self {
            config,
            listener_position: Vec3::zeros(),
        }
    }

    /// Set the listener (headset) position
    pub fn set_listener_position(&mut self, position: Vec3) {
        self.listener_position = position;
    }

    /// Current listener position
    pub fn listener_position(&self) -> Vec3 {
        self.listener_position
    }

    /// Calculate the gain for a sound emitted at `sound_position`
    pub fn calculate_attenuation(&self, sound_position: Vec3) -> f32 {
        let distance = (sound_position - self.listener_position).norm();
        let SpatialConfig { distance_model, max_distance, reference_distance, rolloff_factor } = self.config;
        let reference = reference_distance.max(f32::EPSILON);

        let gain = match distance_model {
            DistanceModel::Linear => {
                if max_distance <= reference {
                    return 1.0;
                }
                let clamped = distance.clamp(reference, max_distance);
                1.0 - rolloff_factor.min(1.0) * (clamped - reference) / (max_distance - reference)
            }
            DistanceModel::Inverse => {
                reference / (reference + rolloff_factor * (distance.max(reference) - reference))
            }
            DistanceModel::Exponential => (distance.max(reference) / reference).powf(-rolloff_factor),
        };

        gain.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_attenuation_within_reference_distance() {
        let spatial = SpatialAudio::new(SpatialConfig::default());
        assert_eq!(spatial.calculate_attenuation(Vec3::new(0.5, 0.0, 0.0)), 1.0);
    }

    #[test]
    fn test_linear_midpoint() {
        let spatial = SpatialAudio::new(SpatialConfig::default());
        let gain = spatial.calculate_attenuation(Vec3::new(50.5, 0.0, 0.0));
        assert_relative_eq!(gain, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_attenuation_beyond_max_distance() {
        let spatial = SpatialAudio::new(SpatialConfig::default());
        assert_eq!(spatial.calculate_attenuation(Vec3::new(0.0, 0.0, 500.0)), 0.0);
    }

    #[test]
    fn test_listener_position_is_relative() {
        let mut spatial = SpatialAudio::new(SpatialConfig::default());
        spatial.set_listener_position(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(spatial.calculate_attenuation(Vec3::new(10.5, 0.0, 0.0)), 1.0);
    }

    #[test]
    fn test_inverse_and_exponential_models() {
        let inverse = SpatialAudio::new(SpatialConfig {
            distance_model: DistanceModel::Inverse,
            ..Default::default()
        });
        assert_relative_eq!(inverse.calculate_attenuation(Vec3::new(2.0, 0.0, 0.0)), 0.5, epsilon = 1e-5);

        let exponential = SpatialAudio::new(SpatialConfig {
            distance_model: DistanceModel::Exponential,
            rolloff_factor: 2.0,
            ..Default::default()
        });
        assert_relative_eq!(exponential.calculate_attenuation(Vec3::new(2.0, 0.0, 0.0)), 0.25, epsilon = 1e-5);
    }
}
