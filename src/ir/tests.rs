use super::*;

#[test]
fn test_segment_keywords_are_inverse() {
    for seg in Segment::ALL {
        assert_eq!(Segment::from_keyword(seg.keyword()), Some(seg));
    }
    assert_eq!(Segment::from_keyword("heap"), None);
    assert_eq!(Segment::from_keyword("Local"), None);
}

#[test]
fn test_arith_keywords_are_inverse() {
    for op in ArithOp::ALL {
        assert_eq!(ArithOp::from_keyword(op.keyword()), Some(op));
        assert_eq!(CommandKind::from_keyword(op.keyword()), Some(CommandKind::Arithmetic));
    }
}

#[test]
fn test_arity() {
    assert_eq!(ArithOp::Neg.arity(), 1);
    assert_eq!(ArithOp::Not.arity(), 1);
    assert_eq!(ArithOp::Or.arity(), 2);
}

#[test]
fn test_fixed_sizes() {
    assert_eq!(Segment::Temp.fixed_size(), Some(8));
    assert_eq!(Segment::Pointer.fixed_size(), Some(2));
    assert_eq!(Segment::Local.fixed_size(), None);
}

#[test]
fn test_operand_counts() {
    assert_eq!(CommandKind::from_keyword("if-goto"), Some(CommandKind::IfGoto));
    assert_eq!(CommandKind::IfGoto.operand_count(), 1);
    assert_eq!(CommandKind::Function.operand_count(), 2);
    assert_eq!(CommandKind::Return.operand_count(), 0);
    assert_eq!(CommandKind::from_keyword("jump"), None);
}

#[test]
fn test_stack_effects() {
    assert_eq!(Command::Arithmetic(ArithOp::Add).stack_effect(), Some(-1));
    assert_eq!(Command::Arithmetic(ArithOp::Not).stack_effect(), Some(0));
    assert_eq!(Command::Arithmetic(ArithOp::Eq).stack_effect(), Some(-1));
    assert_eq!(Command::Push(Segment::Constant, 3).stack_effect(), Some(1));
    assert_eq!(Command::Pop(Segment::Local, 0).stack_effect(), Some(-1));
    assert_eq!(
        Command::Call {
            name: "Math.max".into(),
            args: 2
        }
        .stack_effect(),
        Some(-1)
    );
    assert_eq!(
        Command::Call {
            name: "Sys.halt".into(),
            args: 0
        }
        .stack_effect(),
        Some(1)
    );
    assert_eq!(Command::Return.stack_effect(), None);
}

#[test]
fn test_display_round_trips_text() {
    let cmds = [
        ("push constant 7", Command::Push(Segment::Constant, 7)),
        ("pop that 3", Command::Pop(Segment::That, 3)),
        ("if-goto END", Command::IfGoto("END".into())),
        (
            "function Main.fib 2",
            Command::Function {
                name: "Main.fib".into(),
                locals: 2,
            },
        ),
        ("return", Command::Return),
        ("lt", Command::Arithmetic(ArithOp::Lt)),
    ];
    for (text, cmd) in cmds {
        assert_eq!(cmd.to_string(), text);
    }
}
