//! Employee directory loading

use crate::model::employee::EmployeeDirectory;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse employee data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read the static `{ "employees": [...] }` file
pub fn load_directory(path: &Path) -> Result<EmployeeDirectory, DirectoryError> {
    let contents = fs::read_to_string(path).map_err(|source| DirectoryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}
