//! Resource fetching
//!
//! Fetching is the only asynchronous step of loading a collection. Fetchers
//! return raw encoded bytes; validation and instance creation happen back on
//! the session's event loop.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::audio::AudioError;

/// Asynchronous source of encoded audio bytes
pub trait SoundFetcher {
    /// Fetch the bytes behind a resource reference
    fn fetch(&self, resource: &str) -> impl Future<Output = Result<Vec<u8>, AudioError>> + Send;
}

/// Reads resources from files below a root directory
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    /// Create a fetcher resolving resources relative to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory resources are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SoundFetcher for FileFetcher {
    fn fetch(&self, resource: &str) -> impl Future<Output = Result<Vec<u8>, AudioError>> + Send {
        let path = self.root.join(resource);
        let resource = resource.to_string();
        async move {
            log::debug!("Fetching {}", path.display());
            tokio::fs::read(&path).await.map_err(|e| AudioError::FetchFailed {
                resource,
                reason: e.to_string(),
            })
        }
    }
}

/// Serves resources from memory
///
/// Resources can be marked as failing to exercise load-error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    resources: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
}

impl MemoryFetcher {
    /// Create an empty fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bytes for a resource
    pub fn insert(&mut self, resource: impl Into<String>, bytes: Vec<u8>) {
        self.resources.insert(resource.into(), bytes);
    }

    /// Builder form of [`MemoryFetcher::insert`]
    pub fn with_resource(mut self, resource: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(resource, bytes);
        self
    }

    /// Make every fetch of `resource` fail
    pub fn fail(&mut self, resource: impl Into<String>) {
        self.failing.insert(resource.into());
    }

    /// Let a previously failing resource succeed again
    pub fn heal(&mut self, resource: &str) {
        self.failing.remove(resource);
    }
}

impl SoundFetcher for MemoryFetcher {
    fn fetch(&self, resource: &str) -> impl Future<Output = Result<Vec<u8>, AudioError>> + Send {
        let result = if self.failing.contains(resource) {
            Err(AudioError::FetchFailed {
                resource: resource.to_string(),
                reason: "marked as failing".to_string(),
            })
        } else {
            self.resources.get(resource).cloned().ok_or_else(|| AudioError::FetchFailed {
                resource: resource.to_string(),
                reason: "not found".to_string(),
            })
        };
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_fetcher_serves_and_fails() {
        let mut fetcher = MemoryFetcher::new().with_resource("heart.wav", b"RIFF".to_vec());
        assert_eq!(fetcher.fetch("heart.wav").await.unwrap(), b"RIFF".to_vec());
        assert!(fetcher.fetch("lung.wav").await.is_err());

        fetcher.fail("heart.wav");
        assert!(matches!(fetcher.fetch("heart.wav").await, Err(AudioError::FetchFailed { .. })));
        fetcher.heal("heart.wav");
        assert!(fetcher.fetch("heart.wav").await.is_ok());
    }

    #[tokio::test]
    async fn test_file_fetcher_reads_relative_to_root() {
        let dir = std::env::temp_dir().join(format!("auscultation-fetch-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("audio")).unwrap();
        std::fs::write(dir.join("audio/tone.wav"), b"RIFF....WAVE").unwrap();

        let fetcher = FileFetcher::new(&dir);
        assert_eq!(fetcher.fetch("audio/tone.wav").await.unwrap(), b"RIFF....WAVE".to_vec());

        let missing = fetcher.fetch("audio/missing.wav").await.unwrap_err();
        assert!(missing.to_string().contains("audio/missing.wav"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
