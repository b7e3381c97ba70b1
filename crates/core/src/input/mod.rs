//! Loading of the external identifier list.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read identifier file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Identifier file {0} contains no identifiers")]
    Empty(String),
}

/// Parse identifiers, one per line.
///
/// Lines are trimmed; blank lines and lines starting with `#` are ignored.
/// Order and duplicates are preserved.
pub fn parse_ids(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Load identifiers from a file.
pub fn load_ids(path: &Path) -> Result<Vec<String>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let ids = parse_ids(&content);
    if ids.is_empty() {
        return Err(InputError::Empty(path.display().to_string()));
    }

    debug!(path = %path.display(), count = ids.len(), "Loaded identifiers");
    Ok(ids)
}
