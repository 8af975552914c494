//! Core data model for listings, routines, and their fingerprints.
//!
//! A listing file describes one `Module`, which holds `Segment`s, which in turn
//! hold the accepted `Routine`s. Each routine carries its classified opcodes and
//! the fingerprints built from them.

use serde::{Deserialize, Serialize};

use crate::fingerprint::Pattern;

/// Classification of a single listing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpcodeKind {
    /// Address, byte groups, and a mnemonic.
    Code,
    /// Address and byte groups only (continuation of a long instruction).
    CodeSizeOnly,
    /// Label visible outside the routine; anchors a fingerprint.
    GlobalLabel,
    /// Jump target internal to the routine.
    LocalLabel,
    /// Directive or unrecognized text.
    Raw,
}

/// One classified listing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opcode {
    pub kind: OpcodeKind,
    /// Mnemonic for code lines, label text for labels, directive keyword for raw lines.
    pub mnemonic: String,
    pub operands: Vec<String>,
    pub byte_size: u32,
    pub valid: bool,
    /// Original text, kept only for lines that matched no grammar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Opcode {
    pub fn code(mnemonic: impl Into<String>, operands: Vec<String>, byte_size: u32) -> Self {
        Self {
            kind: OpcodeKind::Code,
            mnemonic: mnemonic.into(),
            operands,
            byte_size,
            valid: true,
            text: None,
        }
    }

    pub fn code_size_only(byte_size: u32) -> Self {
        Self {
            kind: OpcodeKind::CodeSizeOnly,
            mnemonic: String::new(),
            operands: Vec::new(),
            byte_size,
            valid: true,
            text: None,
        }
    }

    pub fn label(kind: OpcodeKind, name: impl Into<String>) -> Self {
        Self { kind, mnemonic: name.into(), operands: Vec::new(), byte_size: 0, valid: true, text: None }
    }

    pub fn directive(keyword: impl Into<String>, operands: Vec<String>) -> Self {
        Self {
            kind: OpcodeKind::Raw,
            mnemonic: keyword.into(),
            operands,
            byte_size: 0,
            valid: true,
            text: None,
        }
    }

    pub fn unrecognized(text: impl Into<String>) -> Self {
        Self {
            kind: OpcodeKind::Raw,
            mnemonic: String::new(),
            operands: Vec::new(),
            byte_size: 0,
            valid: false,
            text: Some(text.into()),
        }
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// True for the kinds whose bytes are accounted against the reported routine size.
    pub fn counts_bytes(&self) -> bool {
        matches!(self.kind, OpcodeKind::Code | OpcodeKind::CodeSizeOnly)
    }
}

/// A tolerant search pattern anchored at a global label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub label: String,
    pub pattern: Pattern,
}

/// One routine from a code segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    pub opcodes: Vec<Opcode>,
    pub byte_size: u32,
    pub fingerprints: Vec<Fingerprint>,
}

impl Routine {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), opcodes: Vec::new(), byte_size: 0, fingerprints: Vec::new() }
    }

    /// Sum of the byte sizes of every code opcode in the routine.
    pub fn computed_size(&self) -> u32 {
        self.opcodes.iter().filter(|op| op.counts_bytes()).map(|op| op.byte_size).sum()
    }
}

/// A segment of a module; only code segments carry routines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Name of the module the segment belongs to.
    pub name: String,
    pub segment_class: String,
    pub bitness: String,
    pub routines: Vec<Routine>,
}

impl Segment {
    pub fn new(
        name: impl Into<String>,
        segment_class: impl Into<String>,
        bitness: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            segment_class: segment_class.into(),
            bitness: bitness.into(),
            routines: Vec::new(),
        }
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.routines.iter().flat_map(|r| r.fingerprints.iter())
    }
}

/// All segments parsed from one listing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub segments: Vec<Segment>,
}
