//! Destinations for images extracted from outputs

use crate::error::{ConvertError, Result};
use std::fs;
use std::path::PathBuf;

/// Receives decoded image bytes as they are produced
pub trait ImageSink {
    fn write_image(&mut self, name: &str, bytes: &[u8]) -> Result<()>;
}

/// Writes images into a directory on disk
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    written: usize,
}

impl DirectorySink {
    /// The directory must already exist
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: 0,
        }
    }

    /// Number of images written so far
    pub fn written(&self) -> usize {
        self.written
    }
}

impl ImageSink for DirectorySink {
    fn write_image(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.dir.join(name);
        fs::write(&path, bytes).map_err(|source| ConvertError::ImageWrite {
            name: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote image");
        self.written += 1;
        Ok(())
    }
}

/// Keeps images in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub images: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.images
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }
}

impl ImageSink for MemorySink {
    fn write_image(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.images.push((name.to_string(), bytes.to_vec()));
        Ok(())
    }
}
