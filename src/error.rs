//! Error taxonomy for scene loading.
//!
//! Every variant aborts a load and leaves the target scene empty. A meshlet
//! build that fails is not represented here: the geometry simply carries no
//! meshlets and draws fall back to index ranges.

use std::{collections::TryReserveError, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    /// The scene file is missing or could not be read from disk.
    #[error("scene source {path:?} is unreadable: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    /// The scene file was read but its content is inconsistent or unparsable.
    #[error("scene source is malformed: {0}")]
    SourceMalformed(String),

    /// A geometry needs more vertices or indices than 32-bit indices can address.
    #[error("geometry {geometry} needs {count} elements, which exceeds 32-bit index range")]
    IndexOverflow { geometry: usize, count: usize },

    #[error("failed to allocate {bytes} bytes for {what}")]
    AllocationFailure { what: &'static str, bytes: usize },

    /// `load` was called on a scene that still holds data.
    #[error("scene is already loaded, unload it before loading again")]
    AlreadyLoaded,
}

impl SceneError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        SceneError::SourceMalformed(msg.into())
    }

    pub(crate) fn allocation(what: &'static str, bytes: usize) -> impl FnOnce(TryReserveError) -> Self {
        move |_| SceneError::AllocationFailure { what, bytes }
    }
}

/// Allocates a zeroed byte buffer without aborting the process when memory is short.
pub(crate) fn try_alloc_bytes(what: &'static str, bytes: usize) -> Result<Vec<u8>, SceneError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(bytes)
        .map_err(SceneError::allocation(what, bytes))?;
    buffer.resize(bytes, 0);
    Ok(buffer)
}
