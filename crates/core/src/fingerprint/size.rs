use serde::{Deserialize, Serialize};

use crate::model::Routine;

/// Non-fatal finding reported while parsing a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Computed routine size disagrees with the listing summary; the routine was discarded.
    SizeMismatch { segment: String, routine: String, computed: u32, reported: u32 },
    /// The segment body ended before the routine's size summary was found.
    MissingRoutineSize { segment: String, routine: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::SizeMismatch { segment, routine, computed, reported } => {
                write!(f, "Incorrect function size in {segment}::{routine} ({computed}/{reported})")
            }
            Diagnostic::MissingRoutineSize { segment, routine } => {
                write!(f, "No routine size reported for {segment}::{routine}")
            }
        }
    }
}

/// Accept a routine only when its byte accounting agrees with the reported size.
pub fn accept(routine: &Routine, reported: u32) -> bool {
    routine.byte_size == reported
}

/// Validate `routine` for `segment`, returning the diagnostic to record on mismatch.
pub fn validate(segment: &str, routine: &Routine, reported: u32) -> Result<(), Diagnostic> {
    if accept(routine, reported) {
        Ok(())
    } else {
        Err(Diagnostic::SizeMismatch {
            segment: segment.to_string(),
            routine: routine.name.clone(),
            computed: routine.byte_size,
            reported,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Opcode;

    fn routine_of(sizes: &[u32]) -> Routine {
        let mut routine = Routine::new("_f");
        routine.opcodes = sizes.iter().map(|s| Opcode::code("nop", vec![], *s)).collect();
        routine.byte_size = routine.computed_size();
        routine
    }

    #[test]
    fn equal_sizes_are_accepted() {
        assert!(validate("mod", &routine_of(&[3, 1]), 4).is_ok());
    }

    #[test]
    fn mismatch_describes_both_sizes() {
        let diag = validate("mod", &routine_of(&[3, 1]), 6).unwrap_err();
        assert_eq!(diag.to_string(), "Incorrect function size in mod::_f (4/6)");
    }
}
