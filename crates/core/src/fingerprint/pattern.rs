use serde::{Deserialize, Serialize};

/// Matches the auto-generated function label of the target disassembly.
pub const LABEL_ANCHOR_REGEX: &str = r"_[0-9a-fA-F]+_func:\s+";

/// Optional listing columns (address followed by byte groups) ahead of a mnemonic.
const LISTING_COLUMNS_REGEX: &str = r"(?:[0-9a-fA-F]+(?:[ \t]+[0-9a-fA-F]{2})*[ \t]+)?";

/// Listing lines holding only the trailing bytes of a long instruction.
const CONTINUATION_LINES_REGEX: &str = r"(?:\r?\n[ \t]*[0-9a-fA-F]+(?:[ \t]+[0-9a-fA-F]{2})+[ \t]*)*";

/// End of the previous line, for tokens that must start on a line of their own.
const LINE_BREAK_REGEX: &str = r"[ \t]*\r?\n";

/// One element of a fingerprint pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "token", content = "text", rename_all = "snake_case")]
pub enum PatternToken {
    /// Start of the target's function label; the only place an address is recovered from.
    LabelAnchor,
    /// Instruction mnemonic, matched verbatim.
    Literal(String),
    /// A single operand of any value.
    AnyOperand,
    /// A whole line of any content (internal jump targets).
    AnyToken,
    /// Whatever text an unrecognized line held.
    AnyChar,
    /// End of the routine body.
    Boundary,
}

impl PatternToken {
    /// Tokens that stand for one opcode and count against the pattern limit.
    pub fn is_opcode(&self) -> bool {
        matches!(self, PatternToken::Literal(_) | PatternToken::AnyToken | PatternToken::AnyChar)
    }
}

/// Ordered token sequence for one fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    tokens: Vec<PatternToken>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchored() -> Self {
        Self { tokens: vec![PatternToken::LabelAnchor] }
    }

    pub fn push(&mut self, token: PatternToken) {
        self.tokens.push(token);
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    pub fn is_anchored(&self) -> bool {
        matches!(self.tokens.first(), Some(PatternToken::LabelAnchor))
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.tokens.last(), Some(PatternToken::Boundary))
    }

    /// Number of tokens that each represent one opcode.
    pub fn opcode_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_opcode()).count()
    }

    /// Render the tokens as source for the `regex` crate.
    ///
    /// Consecutive operands are joined with a literal comma, so `mov ax,0`
    /// compiles to `mov[^,\n]+,[^,\n]+`. Every opcode token may be preceded by
    /// byte-only continuation lines, which carry no token of their own.
    pub fn to_regex_source(&self) -> String {
        let mut out = String::new();
        let mut previous: Option<&PatternToken> = None;
        for token in &self.tokens {
            if token.is_opcode() {
                out.push_str(CONTINUATION_LINES_REGEX);
            }
            // The anchor already consumed the line end after the label.
            let line_break =
                if matches!(previous, Some(PatternToken::LabelAnchor)) { "" } else { LINE_BREAK_REGEX };
            match token {
                PatternToken::LabelAnchor => out.push_str(LABEL_ANCHOR_REGEX),
                PatternToken::Literal(mnemonic) => {
                    out.push_str(r"\s*");
                    out.push_str(LISTING_COLUMNS_REGEX);
                    out.push_str(&regex::escape(mnemonic));
                }
                PatternToken::AnyOperand => {
                    if matches!(previous, Some(PatternToken::AnyOperand)) {
                        out.push(',');
                    }
                    out.push_str(r"[^,\n]+");
                }
                PatternToken::AnyToken => {
                    out.push_str(line_break);
                    out.push_str(r"\s*(?:[0-9a-fA-F]+[ \t]+)?\S+[ \t]*");
                }
                PatternToken::AnyChar => {
                    out.push_str(line_break);
                    out.push_str(r"[ \t]*\S[^\n]*");
                }
                PatternToken::Boundary => out.push_str(r"[ \t]*(?:\r?\n)+"),
            }
            previous = Some(token);
        }
        out
    }
}
