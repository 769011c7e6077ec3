// ABOUTME: Utility functions for the slidedeck compiler
// ABOUTME: Path validation and file writing helpers shared by the generator

use crate::errors::{DeckError, Result};
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Validate that a path names an existing regular file
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || !path.exists() {
        return Err(DeckError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(DeckError::FileReadError(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Path is not a file: {:?}", path),
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| DeckError::FileWriteError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Get the absolute path, falling back to joining with the working directory
pub fn get_absolute_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    })
}

/// Write bytes to a file, creating parent directories as needed
pub fn write_file(output_path: &Path, contents: &[u8]) -> Result<()> {
    info!("Writing output to file: {:?}", output_path);
    ensure_parent_directory_exists(output_path)?;
    fs::write(output_path, contents).map_err(|source| DeckError::FileWriteError {
        path: output_path.to_path_buf(),
        source,
    })
}
