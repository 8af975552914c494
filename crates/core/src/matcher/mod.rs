//! Searches a target disassembly for stored fingerprints and recovers the
//! address from the label each one matched.
//!
//! Only the first occurrence of a pattern is used. A pattern that occurs more
//! than once is reported like a unique hit.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::store::StoredFingerprint;

static ADDRESS_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^_([0-9a-fA-F]+)_func:").expect("address label regex"));

/// A fingerprint found in the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub label: String,
    /// Hex digits taken from the matched function label.
    pub address: String,
}

/// Extract the address from text starting with an `_<hex>_func:` label.
pub fn address_of(matched: &str) -> Option<&str> {
    ADDRESS_LABEL.captures(matched).and_then(|c| c.get(1)).map(|m| m.as_str())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher;

impl Matcher {
    pub fn new() -> Self {
        Self
    }

    /// Search `target` for a single fingerprint.
    pub fn find(&self, target: &str, fingerprint: &StoredFingerprint) -> Option<SymbolMatch> {
        let regex = match Regex::new(&fingerprint.pattern) {
            Ok(regex) => regex,
            Err(err) => {
                tracing::warn!(label = %fingerprint.label, "skipping invalid pattern: {err}");
                return None;
            }
        };
        let found = regex.find(target)?;
        let address = address_of(found.as_str())?;
        tracing::info!("Found {} at {}", fingerprint.label, address);
        Some(SymbolMatch { label: fingerprint.label.clone(), address: address.to_string() })
    }

    /// Search for every fingerprint in order. Labels are not deduplicated.
    pub fn find_all(&self, target: &str, fingerprints: &[StoredFingerprint]) -> Vec<SymbolMatch> {
        fingerprints.iter().filter_map(|fp| self.find(target, fp)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(label: &str, pattern: &str) -> StoredFingerprint {
        StoredFingerprint { segment: None, label: label.into(), pattern: pattern.into() }
    }

    #[test]
    fn address_comes_from_matched_label() {
        assert_eq!(address_of("_1a2B_func:\n  ret"), Some("1a2B"));
        assert_eq!(address_of("  _1a2B_func:"), None);
    }

    #[test]
    fn unanchored_match_is_skipped() {
        let target = "_10_func:\n  nop\n";
        assert!(Matcher::new().find(target, &stored("x", r"nop")).is_none());
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        assert!(Matcher::new().find("anything", &stored("x", "(")).is_none());
    }

    #[test]
    fn duplicate_labels_are_reported_independently() {
        let target = "_20_func:\n  ret\n";
        let pattern = r"_[0-9a-fA-F]+_func:\s+\s*ret";
        let hits = Matcher::new().find_all(target, &[stored("a", pattern), stored("a", pattern)]);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.address == "20"));
    }
}
