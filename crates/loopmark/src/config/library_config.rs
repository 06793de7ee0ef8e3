use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Recording-library configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory handed to the persistence collaborator for recording
    /// storage (None = platform data directory).
    #[serde(default)]
    pub library_dir: Option<PathBuf>,
}
