use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::fingerprint::Diagnostic;
use crate::listing::{apply_fixups, builtin_fixups, text, ListingError, ListingParser};
use crate::model::{Module, Segment};
use crate::services::toolchain::{files_with_extension, LibraryToolchain, ToolError};
use crate::store::SignatureStore;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Library not found at {0}")]
    MissingLibrary(PathBuf),
    #[error("Invalid listing {path}: {source}")]
    Listing { path: PathBuf, source: ListingError },
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("Failed to create working directory: {0}")]
    Workdir(std::io::Error),
}

/// Everything one generation run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub modules: Vec<Module>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationReport {
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.modules.iter().flat_map(|m| m.segments.iter())
    }

    pub fn fingerprint_count(&self) -> usize {
        self.segments().map(|s| s.fingerprints().count()).sum()
    }

    /// Serialize every module's segments in processing order.
    pub fn to_signature_text(&self) -> String {
        SignatureStore::write(self.segments())
    }
}

/// Parse listing text after applying the built-in fixups.
pub fn process_listing(
    parser: &ListingParser,
    path: &Path,
    report: &mut GenerationReport,
) -> Result<(), GenerateError> {
    let raw = text::read_latin1(path)
        .map_err(|source| ToolError::Io { path: path.to_path_buf(), source })?;
    let fixed = apply_fixups(&raw, builtin_fixups());
    let parsed = parser
        .parse(&fixed)
        .map_err(|source| GenerateError::Listing { path: path.to_path_buf(), source })?;
    report.modules.push(parsed.module);
    report.diagnostics.extend(parsed.diagnostics);
    Ok(())
}

/// Generate signatures from every `*.lst` file in `dir`, in file-name order.
pub fn generate_from_listings(
    dir: &Path,
    config: &GeneratorConfig,
) -> Result<GenerationReport, GenerateError> {
    let parser = config.parser();
    let mut report = GenerationReport::default();
    for listing in files_with_extension(dir, "lst")? {
        tracing::debug!(listing = %listing.display(), "processing listing");
        process_listing(&parser, &listing, &mut report)?;
    }
    Ok(report)
}

/// Extract, disassemble, and fingerprint an OMF library in a scratch directory.
pub fn generate_from_library(
    toolchain: &dyn LibraryToolchain,
    library: &Path,
    config: &GeneratorConfig,
) -> Result<GenerationReport, GenerateError> {
    if !library.is_file() {
        return Err(GenerateError::MissingLibrary(library.to_path_buf()));
    }
    let workdir = tempfile::tempdir().map_err(GenerateError::Workdir)?;
    tracing::debug!(
        toolchain = toolchain.name(),
        workdir = %workdir.path().display(),
        "extracting library"
    );

    let objects = toolchain.extract(library, workdir.path())?;
    for object in &objects {
        toolchain.disassemble(object, workdir.path())?;
    }
    generate_from_listings(workdir.path(), config)
}
