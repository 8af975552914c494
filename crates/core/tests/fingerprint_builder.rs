use omfsig_core::fingerprint::{FingerprintBuilder, PatternToken, DEFAULT_PATTERN_LIMIT};
use omfsig_core::model::{Opcode, OpcodeKind};

fn global(name: &str) -> Opcode {
    Opcode::label(OpcodeKind::GlobalLabel, name)
}

fn nops(count: usize) -> Vec<Opcode> {
    (0..count).map(|_| Opcode::code("nop", vec![], 1)).collect()
}

#[test]
fn long_routine_is_capped_and_left_open() {
    let mut ops = vec![global("long_")];
    ops.extend(nops(35));
    let fps = FingerprintBuilder::default().build(&ops);

    assert_eq!(fps.len(), 1);
    assert_eq!(fps[0].pattern.opcode_count(), DEFAULT_PATTERN_LIMIT);
    assert!(!fps[0].pattern.is_terminated(), "truncated pattern must not demand a boundary");
}

#[test]
fn routine_at_the_limit_keeps_its_boundary() {
    let mut ops = vec![global("exact_")];
    ops.extend(nops(DEFAULT_PATTERN_LIMIT));
    let fps = FingerprintBuilder::default().build(&ops);
    assert_eq!(fps[0].pattern.opcode_count(), DEFAULT_PATTERN_LIMIT);
    assert!(fps[0].pattern.is_terminated());
}

#[test]
fn each_global_label_opens_a_fingerprint() {
    let mut ops = vec![global("first_")];
    ops.extend(nops(25));
    ops.push(global("second_"));
    ops.extend(nops(2));
    let fps = FingerprintBuilder::default().build(&ops);

    assert_eq!(fps.len(), 2);
    assert_eq!(fps[0].label, "first_");
    assert!(!fps[0].pattern.is_terminated());
    assert_eq!(fps[1].label, "second_");
    assert_eq!(fps[1].pattern.opcode_count(), 2, "counter restarts at each label");
    assert!(fps[1].pattern.is_terminated());
    assert!(fps.iter().all(|fp| fp.pattern.is_anchored()));
}

#[test]
fn local_labels_and_raw_lines_are_wildcards() {
    let ops = vec![
        global("f_"),
        Opcode::code("jmp", vec!["L$1".into()], 2),
        Opcode::label(OpcodeKind::LocalLabel, "L$1"),
        Opcode::unrecognized("???"),
        Opcode::code_size_only(2),
        Opcode::code("ret", vec![], 1),
    ];
    let fps = FingerprintBuilder::default().build(&ops);
    assert_eq!(
        fps[0].pattern.tokens(),
        &[
            PatternToken::LabelAnchor,
            PatternToken::Literal("jmp".into()),
            PatternToken::AnyOperand,
            PatternToken::AnyToken,
            PatternToken::AnyChar,
            PatternToken::Literal("ret".into()),
            PatternToken::Boundary,
        ]
    );
}

#[test]
fn opcodes_before_any_global_label_are_not_fingerprinted() {
    let ops = vec![Opcode::label(OpcodeKind::LocalLabel, "L$9"), Opcode::code("ret", vec![], 1)];
    assert!(FingerprintBuilder::default().build(&ops).is_empty());

    let mut ops = ops;
    ops.push(global("late_"));
    ops.push(Opcode::code("retf", vec![], 1));
    let fps = FingerprintBuilder::default().build(&ops);
    assert_eq!(fps.len(), 1);
    assert_eq!(fps[0].pattern.opcode_count(), 1);
}

#[test]
fn custom_limit_is_honoured() {
    let mut ops = vec![global("short_")];
    ops.extend(nops(10));
    let fps = FingerprintBuilder::new(4).build(&ops);
    assert_eq!(fps[0].pattern.opcode_count(), 4);
}
