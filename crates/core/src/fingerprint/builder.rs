use crate::fingerprint::{Pattern, PatternToken};
use crate::model::{Fingerprint, Opcode, OpcodeKind};

/// Maximum number of opcode tokens in one fingerprint pattern.
pub const DEFAULT_PATTERN_LIMIT: usize = 20;

/// Turns a routine's opcode sequence into fingerprints.
///
/// Every global label opens a new fingerprint; the pattern holds at most
/// `limit` opcode tokens. Opcodes seen before the first global label have no
/// anchor and are left out.
#[derive(Debug, Clone, Copy)]
pub struct FingerprintBuilder {
    limit: usize,
}

impl Default for FingerprintBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_LIMIT)
    }
}

/// Pattern under construction together with its label and counters.
struct OpenFingerprint {
    label: String,
    pattern: Pattern,
    opcodes: usize,
    truncated: bool,
}

impl OpenFingerprint {
    fn new(label: &str) -> Self {
        Self { label: label.to_string(), pattern: Pattern::anchored(), opcodes: 0, truncated: false }
    }

    /// Reserve room for one more opcode token, recording truncation if full.
    fn take_slot(&mut self, limit: usize) -> bool {
        if self.opcodes >= limit {
            self.truncated = true;
            return false;
        }
        self.opcodes += 1;
        true
    }

    fn close(mut self) -> Fingerprint {
        // A truncated pattern stops mid-routine, so no end boundary is required.
        if !self.truncated {
            self.pattern.push(PatternToken::Boundary);
        }
        Fingerprint { label: self.label, pattern: self.pattern }
    }
}

impl FingerprintBuilder {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn build(&self, opcodes: &[Opcode]) -> Vec<Fingerprint> {
        let mut done = Vec::new();
        let mut open: Option<OpenFingerprint> = None;

        for op in opcodes {
            if op.kind == OpcodeKind::GlobalLabel {
                if let Some(previous) = open.take() {
                    done.push(previous.close());
                }
                open = Some(OpenFingerprint::new(&op.mnemonic));
                continue;
            }

            let Some(current) = open.as_mut() else {
                continue;
            };

            match op.kind {
                OpcodeKind::Code => {
                    if current.take_slot(self.limit) {
                        current.pattern.push(PatternToken::Literal(op.mnemonic.clone()));
                        for _ in &op.operands {
                            current.pattern.push(PatternToken::AnyOperand);
                        }
                    }
                }
                OpcodeKind::LocalLabel => {
                    if current.take_slot(self.limit) {
                        current.pattern.push(PatternToken::AnyToken);
                    }
                }
                OpcodeKind::Raw => {
                    if current.take_slot(self.limit) {
                        current.pattern.push(PatternToken::AnyChar);
                    }
                }
                OpcodeKind::CodeSizeOnly | OpcodeKind::GlobalLabel => {}
            }
        }

        if let Some(last) = open {
            done.push(last.close());
        }
        done
    }
}
