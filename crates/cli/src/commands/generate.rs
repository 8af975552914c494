use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use omfsig_core::config::GeneratorConfig;
use omfsig_core::services::{generate_from_library, generate_from_listings, WatcomToolchain};

use crate::emit;

/// Build signatures for `input` and write them to `output` (stdout if `None`).
///
/// `input` is either an OMF library, which is extracted and disassembled with
/// the Watcom tools, or a directory of listing files produced earlier.
pub fn generate_command(
    input: &str,
    output: Option<&str>,
    config_path: Option<&str>,
    wlib: Option<String>,
    wdis: Option<String>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => GeneratorConfig::load(Path::new(path))?,
        None => GeneratorConfig::default(),
    };
    if let Some(path) = wlib {
        config.wlib = Some(PathBuf::from(path));
    }
    if let Some(path) = wdis {
        config.wdis = Some(PathBuf::from(path));
    }

    let input_path = Path::new(input);
    let report = if input_path.is_dir() {
        generate_from_listings(input_path, &config)
            .with_context(|| format!("Failed to process listings in {}", input_path.display()))?
    } else if input_path.is_file() {
        let toolchain = WatcomToolchain::from_config(&config);
        generate_from_library(&toolchain, input_path, &config)
            .with_context(|| format!("Failed to process library {}", input_path.display()))?
    } else {
        return Err(anyhow!("Input does not exist: {}", input_path.display()));
    };

    tracing::info!(
        modules = report.modules.len(),
        fingerprints = report.fingerprint_count(),
        discarded = report.diagnostics.len(),
        "signature generation finished"
    );

    emit(output, &report.to_signature_text())
}
