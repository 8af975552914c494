use once_cell::sync::Lazy;
use regex::Regex;

use crate::fingerprint::{size, Diagnostic, FingerprintBuilder};
use crate::listing::classify::OpcodeClassifier;
use crate::listing::ListingError;
use crate::model::{Module, Opcode, Routine, Segment};

/// Segment class of executable code.
pub const DEFAULT_CODE_SEGMENT_CLASS: &str = "_TEXT";

const SEGMENT_KEYWORD: &str = "Segment:";

static MODULE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Module: (\S+)").expect("module header regex"));

static SEGMENT_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Segment: (\S+) \S+ (\S+) \S+ \S+").expect("segment header regex")
});

static ROUTINE_SIZE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Routine Size: ([0-9]+) byte").expect("routine size regex"));

/// States of the per-segment line machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    SearchFunction,
    ProcessAssembly,
    SearchRoutineSize,
}

/// Side effect requested by one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// A label line opened a routine; the label itself is its first opcode.
    StartRoutine { name: String, first: Opcode },
    AppendOpcode(Opcode),
    /// The body ended; build fingerprints and compute the size.
    CloseRoutine,
    /// The listing's size summary for the closed routine.
    ReportedSize(u32),
}

/// Compute the next state and effect for one stripped line.
pub fn step(state: ParseState, line: &str, classifier: &OpcodeClassifier) -> (ParseState, Effect) {
    match state {
        ParseState::SearchFunction => match classifier.label(line) {
            Some((_, name)) => {
                let first = classifier.classify(line);
                (ParseState::ProcessAssembly, Effect::StartRoutine { name, first })
            }
            None => (ParseState::SearchFunction, Effect::None),
        },
        ParseState::ProcessAssembly => {
            if line.is_empty() {
                (ParseState::SearchRoutineSize, Effect::CloseRoutine)
            } else {
                (ParseState::ProcessAssembly, Effect::AppendOpcode(classifier.classify(line)))
            }
        }
        ParseState::SearchRoutineSize => match reported_size(line) {
            Some(reported) => (ParseState::SearchFunction, Effect::ReportedSize(reported)),
            None => (ParseState::SearchRoutineSize, Effect::None),
        },
    }
}

fn reported_size(line: &str) -> Option<u32> {
    ROUTINE_SIZE.captures(line)?.get(1)?.as_str().parse().ok()
}

/// Result of parsing one listing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedListing {
    pub module: Module,
    pub diagnostics: Vec<Diagnostic>,
}

/// Splits a listing into segments and drives routine discovery.
#[derive(Debug, Clone)]
pub struct ListingParser {
    classifier: OpcodeClassifier,
    builder: FingerprintBuilder,
    code_class: String,
}

impl Default for ListingParser {
    fn default() -> Self {
        Self::new(OpcodeClassifier::default(), FingerprintBuilder::default(), DEFAULT_CODE_SEGMENT_CLASS)
    }
}

impl ListingParser {
    pub fn new(
        classifier: OpcodeClassifier,
        builder: FingerprintBuilder,
        code_class: impl Into<String>,
    ) -> Self {
        Self { classifier, builder, code_class: code_class.into() }
    }

    pub fn parse(&self, text: &str) -> Result<ParsedListing, ListingError> {
        let headers: Vec<_> = SEGMENT_HEADER.find_iter(text).collect();
        let markers = text.lines().filter(|l| l.trim_start().starts_with(SEGMENT_KEYWORD)).count();
        if markers != headers.len() {
            return Err(ListingError::SegmentCount { markers, headers: headers.len() });
        }

        let preamble_end = headers.first().map(|m| m.start()).unwrap_or(text.len());
        let module_name = MODULE_HEADER
            .captures(&text[..preamble_end])
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(ListingError::MissingModuleHeader)?;

        let mut module = Module { name: module_name, segments: Vec::new() };
        let mut diagnostics = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            let body_end = headers.get(idx + 1).map(|m| m.start()).unwrap_or(text.len());
            let body = &text[header.end()..body_end];
            let segment = self.parse_segment(&module.name, header.as_str(), body, &mut diagnostics);
            module.segments.push(segment);
        }

        tracing::debug!(
            module = %module.name,
            segments = module.segments.len(),
            diagnostics = diagnostics.len(),
            "parsed listing"
        );
        Ok(ParsedListing { module, diagnostics })
    }

    fn parse_segment(
        &self,
        module_name: &str,
        header: &str,
        body: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Segment {
        let (segment_class, bitness) = SEGMENT_HEADER
            .captures(header)
            .map(|c| (c[1].to_string(), c[2].to_string()))
            .unwrap_or_default();
        let mut segment = Segment::new(module_name, segment_class, bitness);
        if segment.segment_class != self.code_class {
            return segment;
        }

        let mut state = ParseState::SearchFunction;
        let mut current: Option<Routine> = None;
        for raw in body.lines() {
            let line = raw.trim();
            let (next, effect) = step(state, line, &self.classifier);
            state = next;
            match effect {
                Effect::None => {}
                Effect::StartRoutine { name, first } => {
                    let mut routine = Routine::new(name);
                    routine.opcodes.push(first);
                    current = Some(routine);
                }
                Effect::AppendOpcode(op) => {
                    if let Some(routine) = current.as_mut() {
                        routine.opcodes.push(op);
                    }
                }
                Effect::CloseRoutine => {
                    if let Some(routine) = current.as_mut() {
                        self.close_routine(routine);
                    }
                }
                Effect::ReportedSize(reported) => {
                    if let Some(routine) = current.take() {
                        match size::validate(module_name, &routine, reported) {
                            Ok(()) => segment.routines.push(routine),
                            Err(diag) => {
                                tracing::warn!("{diag}");
                                diagnostics.push(diag);
                            }
                        }
                    }
                }
            }
        }

        if let Some(routine) = current {
            let diag = Diagnostic::MissingRoutineSize {
                segment: module_name.to_string(),
                routine: routine.name,
            };
            tracing::warn!("{diag}");
            diagnostics.push(diag);
        }
        segment
    }

    fn close_routine(&self, routine: &mut Routine) {
        routine.fingerprints = self.builder.build(&routine.opcodes);
        routine.byte_size = routine.computed_size();
        if routine.fingerprints.is_empty() {
            tracing::debug!(routine = %routine.name, "routine has no global label; no fingerprint");
        }
    }
}
