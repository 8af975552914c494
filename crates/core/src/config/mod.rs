use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fingerprint::{FingerprintBuilder, DEFAULT_PATTERN_LIMIT};
use crate::listing::{
    ListingParser, OpcodeClassifier, DEFAULT_CODE_SEGMENT_CLASS, DEFAULT_LOCAL_LABEL_MARKER,
};

/// Environment variable overriding the librarian executable.
pub const WLIB_ENV: &str = "OMFSIG_WLIB";
/// Environment variable overriding the disassembler executable.
pub const WDIS_ENV: &str = "OMFSIG_WDIS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("Failed to parse config JSON at {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

/// Serializable settings for signature generation.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Maximum opcode tokens per fingerprint pattern.
    pub pattern_limit: usize,
    /// Segment class whose routines are fingerprinted.
    pub code_segment_class: String,
    /// Substring that marks a label as routine-local.
    pub local_label_marker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wlib: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wdis: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pattern_limit: DEFAULT_PATTERN_LIMIT,
            code_segment_class: DEFAULT_CODE_SEGMENT_CLASS.to_string(),
            local_label_marker: DEFAULT_LOCAL_LABEL_MARKER.to_string(),
            wlib: None,
            wdis: None,
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        serde_json::from_str(&body)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Build the listing parser these settings describe.
    pub fn parser(&self) -> ListingParser {
        ListingParser::new(
            OpcodeClassifier::new(self.local_label_marker.clone()),
            FingerprintBuilder::new(self.pattern_limit),
            self.code_segment_class.clone(),
        )
    }

    /// Librarian path: config value, then `OMFSIG_WLIB`, then `wlib` on PATH.
    pub fn wlib_path(&self) -> PathBuf {
        resolve_tool(self.wlib.as_deref(), WLIB_ENV, "wlib")
    }

    /// Disassembler path: config value, then `OMFSIG_WDIS`, then `wdis` on PATH.
    pub fn wdis_path(&self) -> PathBuf {
        resolve_tool(self.wdis.as_deref(), WDIS_ENV, "wdis")
    }
}

fn resolve_tool(configured: Option<&Path>, env_key: &str, fallback: &str) -> PathBuf {
    configured
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(env_key).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let cfg: GeneratorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, GeneratorConfig::default());
        assert_eq!(cfg.pattern_limit, 20);
        assert_eq!(cfg.code_segment_class, "_TEXT");
    }

    #[test]
    fn configured_tool_path_wins() {
        let cfg = GeneratorConfig { wdis: Some("/opt/watcom/wdis".into()), ..Default::default() };
        assert_eq!(cfg.wdis_path(), PathBuf::from("/opt/watcom/wdis"));
    }
}
