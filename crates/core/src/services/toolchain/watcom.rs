use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{files_with_extension, LibraryToolchain, ToolError};
use crate::config::GeneratorConfig;

/// Open Watcom `wlib` + `wdis`, driven as child processes.
#[derive(Debug, Clone)]
pub struct WatcomToolchain {
    pub wlib: PathBuf,
    pub wdis: PathBuf,
}

impl WatcomToolchain {
    pub fn new(wlib: impl Into<PathBuf>, wdis: impl Into<PathBuf>) -> Self {
        Self { wlib: wlib.into(), wdis: wdis.into() }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.wlib_path(), config.wdis_path())
    }
}

impl LibraryToolchain for WatcomToolchain {
    fn extract(&self, library: &Path, workdir: &Path) -> Result<Vec<PathBuf>, ToolError> {
        let mut dest = std::ffi::OsString::from("-d=");
        dest.push(workdir);
        run_quiet(Command::new(&self.wlib).arg("-x").arg(dest).arg(library), &self.wlib)?;
        files_with_extension(workdir, "o")
    }

    fn disassemble(&self, object: &Path, workdir: &Path) -> Result<PathBuf, ToolError> {
        run_quiet(Command::new(&self.wdis).current_dir(workdir).arg(object).arg("-l"), &self.wdis)?;
        let listing = object.with_extension("lst");
        if listing.is_file() {
            Ok(listing)
        } else {
            Err(ToolError::Io {
                path: listing,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "listing not produced"),
            })
        }
    }

    fn name(&self) -> &'static str {
        "watcom"
    }
}

/// Run a tool with its output discarded; any unsuccessful exit is an error.
fn run_quiet(command: &mut Command, tool: &Path) -> Result<(), ToolError> {
    let tool = tool.display().to_string();
    tracing::debug!(%tool, "running {:?}", command);
    let status = command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|source| ToolError::Spawn { tool: tool.clone(), source })?;
    if !status.success() {
        return Err(ToolError::Failed { tool, status });
    }
    Ok(())
}
