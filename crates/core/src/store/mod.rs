//! Flat text format for generated signatures.
//!
//! Each segment with at least one fingerprint is written as a header line
//! `<module>\t<class>\t<bitness>` followed by one `\t<label>\t<pattern>` line per
//! fingerprint. Reading only recovers the flat fingerprint list.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Segment;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Malformed fingerprint on line {line}: {text:?}")]
    MalformedLine { line: usize, text: String },
}

/// One fingerprint read back from a signature file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFingerprint {
    /// Module of the enclosing header line, if one preceded the fingerprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    pub label: String,
    /// Source for the `regex` crate.
    pub pattern: String,
}

pub struct SignatureStore;

impl SignatureStore {
    pub fn write<'a>(segments: impl IntoIterator<Item = &'a Segment>) -> String {
        let mut out = String::new();
        for segment in segments {
            if segment.fingerprints().next().is_none() {
                continue;
            }
            let _ = writeln!(out, "{}\t{}\t{}", segment.name, segment.segment_class, segment.bitness);
            for fingerprint in segment.fingerprints() {
                let _ = writeln!(
                    out,
                    "\t{}\t{}",
                    fingerprint.label,
                    fingerprint.pattern.to_regex_source()
                );
            }
        }
        out
    }

    pub fn read(text: &str) -> Result<Vec<StoredFingerprint>, StoreError> {
        let mut segment = None;
        let mut out = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let Some(body) = line.strip_prefix('\t') else {
                segment = line.split('\t').next().map(str::to_string);
                continue;
            };
            match body.split_once('\t') {
                Some((label, pattern)) if !label.is_empty() && !pattern.contains('\t') => {
                    out.push(StoredFingerprint {
                        segment: segment.clone(),
                        label: label.to_string(),
                        pattern: pattern.trim_end_matches('\r').to_string(),
                    });
                }
                _ => {
                    return Err(StoreError::MalformedLine { line: idx + 1, text: line.to_string() })
                }
            }
        }
        Ok(out)
    }
}
