//! Adapters for the external tools that turn a library into listing files.

pub mod watcom;

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;

pub use watcom::WatcomToolchain;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to spawn {tool}: {source}")]
    Spawn { tool: String, source: std::io::Error },
    #[error("{tool} exited with {status}")]
    Failed { tool: String, status: ExitStatus },
    #[error("Failed to read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// Extracts object files from a library and disassembles them into listings.
pub trait LibraryToolchain {
    /// Unpack every library member into `workdir`, returning the object files.
    fn extract(&self, library: &Path, workdir: &Path) -> Result<Vec<PathBuf>, ToolError>;

    /// Disassemble one object file, returning the path of its listing.
    fn disassemble(&self, object: &Path, workdir: &Path) -> Result<PathBuf, ToolError>;

    fn name(&self) -> &'static str;
}

/// Files in `dir` with the given extension, sorted by name.
pub fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ToolError> {
    let entries =
        std::fs::read_dir(dir).map_err(|source| ToolError::Io { path: dir.to_path_buf(), source })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ToolError::Io { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
