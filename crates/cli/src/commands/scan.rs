use std::path::Path;

use anyhow::{Context, Result};
use omfsig_core::listing::text::read_latin1;
use omfsig_core::matcher::{Matcher, SymbolMatch};
use omfsig_core::store::SignatureStore;

use crate::emit;

/// Search `source` for every fingerprint in `signatures`.
pub fn find_symbols(source: &Path, signatures: &Path) -> Result<Vec<SymbolMatch>> {
    let target = read_latin1(source)
        .with_context(|| format!("Failed to read source file: {}", source.display()))?;
    let store = read_latin1(signatures)
        .with_context(|| format!("Failed to read signature file: {}", signatures.display()))?;
    let fingerprints = SignatureStore::read(&store)
        .with_context(|| format!("Failed to parse signature file: {}", signatures.display()))?;

    tracing::debug!(fingerprints = fingerprints.len(), "matching signatures");
    Ok(Matcher::new().find_all(&target, &fingerprints))
}

/// Match a signature file against a disassembly source and report `label address` lines.
pub fn match_command(source: &str, signatures: &str, output: Option<&str>, json: bool) -> Result<()> {
    let matches = find_symbols(Path::new(source), Path::new(signatures))?;

    let body = if json {
        let mut serialized = serde_json::to_string_pretty(&matches)
            .context("Failed to serialize matches to JSON")?;
        serialized.push('\n');
        serialized
    } else {
        matches.iter().map(|m| format!("{} {}\n", m.label, m.address)).collect()
    };

    emit(output, &body)
}
