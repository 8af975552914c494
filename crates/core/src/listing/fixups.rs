//! Content-keyed corrections for listings the disassembler is known to get wrong.

use once_cell::sync::Lazy;
use regex::Regex;

/// Replaces the text from the line matching `start` up to (not including) the
/// next line matching `end`.
#[derive(Debug)]
pub struct ListingFixup {
    pub name: &'static str,
    start: Regex,
    end: Regex,
    replacement: &'static str,
}

impl ListingFixup {
    pub fn new(
        name: &'static str,
        start: &str,
        end: &str,
        replacement: &'static str,
    ) -> Result<Self, regex::Error> {
        Ok(Self { name, start: Regex::new(start)?, end: Regex::new(end)?, replacement })
    }

    /// Apply the fixup, returning `None` when the fragment is absent.
    pub fn apply(&self, text: &str) -> Option<String> {
        let start = self.start.find(text)?;
        let end = self.end.find_at(text, start.end())?;
        let mut fixed = String::with_capacity(text.len() + self.replacement.len());
        fixed.push_str(&text[..start.start()]);
        fixed.push_str(self.replacement);
        fixed.push_str(&text[end.start()..]);
        Some(fixed)
    }
}

const EMU87_TRAP_TABLE: &str = "0177  CD 34\t\t\t\tint\t\t0x34\n\
0179  C3\t\t\t\tret\n\
0177  CD 35\t\t\t\tint\t\t0x35\n\
0179  C3\t\t\t\tret\n\
0177  CD 36\t\t\t\tint\t\t0x36\n\
0179  C3\t\t\t\tret\n\
0177  CD 37\t\t\t\tint\t\t0x37\n\
0179  C3\t\t\t\tret\n\
0177  CD 38\t\t\t\tint\t\t0x38\n\
0179  C3\t\t\t\tret\n\
0177  CD 39\t\t\t\tint\t\t0x39\n\
0179  C3\t\t\t\tret\n\
0177  CD 3A\t\t\t\tint\t\t0x3a\n\
0179  C3\t\t\t\tret\n\
0177  CD 3B\t\t\t\tint\t\t0x3b\n\
0179  C3\t\t\t\tret\n\
0177  CD 3C\t\t\t\tint\t\t0x3c\n\
0179  C3\t\t\t\tret\n\
0177  CD 3D\t\t\t\tint\t\t0x3d\n\
0179  C3\t\t\t\tret\n";

static BUILTIN_FIXUPS: Lazy<Vec<ListingFixup>> = Lazy::new(|| {
    vec![ListingFixup::new(
        "emu87-trap-table",
        r"(?m)^[0-9a-fA-F]+[ \t]+CD 34 C3",
        r"(?m)^[0-9a-fA-F]+[ \t]+CD 3E",
        EMU87_TRAP_TABLE,
    )
    .expect("built-in fixup patterns")]
});

pub fn builtin_fixups() -> &'static [ListingFixup] {
    &BUILTIN_FIXUPS
}

/// Run every fixup in `fixups` over `text`, in order.
pub fn apply_fixups(text: &str, fixups: &[ListingFixup]) -> String {
    let mut current = text.to_string();
    for fixup in fixups {
        if let Some(fixed) = fixup.apply(&current) {
            tracing::debug!(fixup = fixup.name, "applied listing fixup");
            current = fixed;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trap_table_is_rewritten() {
        let text = "Module: intxa386\n0170  CD 34 C3 CD 35 C3\n0176  ?? bad\n0180  CD 3E\t\tint 0x3e\n";
        let fixed = apply_fixups(text, builtin_fixups());
        assert!(fixed.starts_with("Module: intxa386\n0177  CD 34"));
        assert_eq!(fixed.matches("ret\n").count(), 10);
        assert!(fixed.contains("int\t\t0x3d\n0179  C3\t\t\t\tret\n0180  CD 3E"));
        assert!(!fixed.contains("?? bad"));
    }

    #[test]
    fn other_listings_are_untouched() {
        let text = "Module: other\n0000  C3  ret\n";
        assert_eq!(apply_fixups(text, builtin_fixups()), text);
    }
}
