use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Opcode, OpcodeKind};

/// Marker the disassembler puts in compiler-generated local symbols.
pub const DEFAULT_LOCAL_LABEL_MARKER: &str = "L$";

static CODE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]+\s+((?:\s[0-9a-fA-F]{2})+)(?:\s+(\S+)\s*(.*)$|$)")
        .expect("code line regex")
});

static LABEL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]+\s+(\S+):$").expect("label line regex"));

static DIRECTIVE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+)\s+(.+)$").expect("directive line regex"));

/// Classifies single listing lines into opcodes.
#[derive(Debug, Clone)]
pub struct OpcodeClassifier {
    local_marker: String,
}

impl Default for OpcodeClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_LOCAL_LABEL_MARKER)
    }
}

impl OpcodeClassifier {
    pub fn new(local_marker: impl Into<String>) -> Self {
        Self { local_marker: local_marker.into() }
    }

    /// Return the label declared on `line`, if any, with its kind.
    pub fn label(&self, line: &str) -> Option<(OpcodeKind, String)> {
        let caps = LABEL_LINE.captures(line)?;
        let name = caps.get(1)?.as_str();
        let kind = if name.contains(self.local_marker.as_str()) {
            OpcodeKind::LocalLabel
        } else {
            OpcodeKind::GlobalLabel
        };
        Some((kind, name.to_string()))
    }

    /// Classify one stripped, non-blank line. Never fails: text matching no
    /// grammar comes back as an invalid `Raw` opcode.
    pub fn classify(&self, line: &str) -> Opcode {
        if let Some(caps) = CODE_LINE.captures(line) {
            let hex_digits = caps
                .get(1)
                .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).count())
                .unwrap_or(0);
            let byte_size = (hex_digits / 2) as u32;
            return match caps.get(2) {
                Some(mnemonic) => {
                    let operands = caps.get(3).map(|m| split_operands(m.as_str())).unwrap_or_default();
                    Opcode::code(mnemonic.as_str(), operands, byte_size)
                }
                None => Opcode::code_size_only(byte_size),
            };
        }

        if let Some((kind, name)) = self.label(line) {
            return Opcode::label(kind, name);
        }

        if let Some(caps) = DIRECTIVE_LINE.captures(line) {
            let keyword = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let operands = caps.get(2).map(|m| split_operands(m.as_str())).unwrap_or_default();
            return Opcode::directive(keyword, operands);
        }

        Opcode::unrecognized(line)
    }
}

fn split_operands(text: &str) -> Vec<String> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split(',').map(str::to_string).collect()
    }
}
