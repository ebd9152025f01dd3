//! Model and anchor loading
//!
//! The manikin is an opaque mesh owned by the rendering substrate. What the
//! session needs from it is its placement in the scene and the list of
//! anatomical anchors, each tagged with the sound key it plays. A
//! [`ModelLoader`] resolves a model path to that description once at startup.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::math::{vec3_from_array, Transform, Vec3};
use crate::sound::SoundKey;

/// Errors raised while loading a model description
#[derive(Debug, Error)]
pub enum ModelError {
    /// Manifest file could not be read
    #[error("Failed to read model manifest '{path}': {source}")]
    Io {
        /// Manifest path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not valid RON
    #[error("Failed to parse model manifest '{path}': {reason}")]
    Parse {
        /// Manifest path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Two anchors carry the same key
    #[error("Model '{model}' defines more than one '{key}' anchor")]
    DuplicateAnchor {
        /// Model name
        model: String,
        /// Repeated key
        key: SoundKey,
    },
}

/// Anchor as written in a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorSpec {
    /// Sound key the trigger at this anchor plays
    pub key: SoundKey,
    /// Position relative to the model origin
    pub position: [f32; 3],
}

/// On-disk description of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    /// Display name
    pub name: String,
    /// Mesh reference handed to the renderer
    pub mesh: String,
    /// Scene position
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler rotation in radians
    #[serde(default)]
    pub rotation: [f32; 3],
    /// Anatomical anchors
    #[serde(default)]
    pub anchors: Vec<AnchorSpec>,
}

impl ModelManifest {
    /// The SAMII manikin with its three auscultation anchors
    pub fn samii() -> Self {
        Self {
            name: "SAMII".to_string(),
            mesh: "models/SAMII.glb".to_string(),
            position: [0.0, 0.5, 0.0],
            rotation: [0.0, -2.9, 0.0],
            anchors: vec![
                AnchorSpec { key: SoundKey::Lung, position: [0.0, 0.55, 0.1] },
                AnchorSpec { key: SoundKey::Heart, position: [0.13, 0.47, 0.09] },
                AnchorSpec { key: SoundKey::Crackles, position: [0.12, 0.55, -0.06] },
            ],
        }
    }

    /// Resolve the manifest into a placed model
    ///
    /// # Errors
    /// `DuplicateAnchor` when two anchors share a key.
    pub fn into_handle(self) -> Result<ModelHandle, ModelError> {
        for (index, anchor) in self.anchors.iter().enumerate() {
            if self.anchors[..index].iter().any(|earlier| earlier.key == anchor.key) {
                return Err(ModelError::DuplicateAnchor {
                    model: self.name,
                    key: anchor.key,
                });
            }
        }

        Ok(ModelHandle {
            transform: Transform::from_position_euler(
                vec3_from_array(self.position),
                vec3_from_array(self.rotation),
            ),
            anchors: self
                .anchors
                .into_iter()
                .map(|anchor| ModelAnchor {
                    key: anchor.key,
                    local_position: vec3_from_array(anchor.position),
                })
                .collect(),
            name: self.name,
            mesh: self.mesh,
        })
    }
}

/// Anchor with its position resolved to a vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelAnchor {
    /// Sound key the trigger at this anchor plays
    pub key: SoundKey,
    /// Position relative to the model origin
    pub local_position: Vec3,
}

/// A loaded, placed model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelHandle {
    /// Display name
    pub name: String,
    /// Mesh reference handed to the renderer
    pub mesh: String,
    /// Placement in the scene
    pub transform: Transform,
    /// Anatomical anchors in manifest order
    pub anchors: Vec<ModelAnchor>,
}

/// Asynchronous source of model descriptions
pub trait ModelLoader {
    /// Load the model at `path`
    fn load_model(&self, path: &str) -> impl Future<Output = Result<ModelHandle, ModelError>> + Send;
}

/// Loads RON model manifests below a root directory
#[derive(Debug, Clone)]
pub struct ManifestModelLoader {
    root: PathBuf,
}

impl ManifestModelLoader {
    /// Create a loader resolving paths relative to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory manifests are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ModelLoader for ManifestModelLoader {
    fn load_model(&self, path: &str) -> impl Future<Output = Result<ModelHandle, ModelError>> + Send {
        let path = self.root.join(path);
        async move {
            log::debug!("Loading model manifest {}", path.display());
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| ModelError::Io { path: path.clone(), source })?;
            let manifest: ModelManifest = ron::from_str(&contents).map_err(|e| ModelError::Parse {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let model = manifest.into_handle()?;
            log::info!("Loaded model '{}' with {} anchors", model.name, model.anchors.len());
            Ok(model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_samii_placement() {
        let model = ModelManifest::samii().into_handle().unwrap();
        assert_eq!(model.anchors.len(), 3);
        assert_relative_eq!(model.transform.position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(model.anchors[1].key, SoundKey::Heart);
        assert_relative_eq!(model.anchors[1].local_position, Vec3::new(0.13, 0.47, 0.09));
    }

    #[test]
    fn test_duplicate_anchor_is_rejected() {
        let mut manifest = ModelManifest::samii();
        manifest.anchors.push(AnchorSpec { key: SoundKey::Lung, position: [0.0; 3] });
        assert!(matches!(
            manifest.into_handle(),
            Err(ModelError::DuplicateAnchor { key: SoundKey::Lung, .. })
        ));
    }

    #[tokio::test]
    async fn test_manifest_loader_reads_ron() {
        let dir = std::env::temp_dir().join(format!("auscultation-model-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let manifest = ron::ser::to_string_pretty(&ModelManifest::samii(), ron::ser::PrettyConfig::default()).unwrap();
        tokio::fs::write(dir.join("samii.ron"), manifest).await.unwrap();

        let loader = ManifestModelLoader::new(&dir);
        let model = loader.load_model("samii.ron").await.unwrap();
        assert_eq!(model.name, "SAMII");
        assert_eq!(model.mesh, "models/SAMII.glb");

        let missing = loader.load_model("missing.ron").await;
        assert!(matches!(missing, Err(ModelError::Io { .. })));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
