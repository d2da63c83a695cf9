use super::*;
use crate::ir::{ArithOp, Command, Segment};

fn parse_ok(source: &str) -> Vec<Command> {
    parse_unit(source, "Test")
        .unwrap_or_else(|e| panic!("parse failed: {}", e))
        .into_iter()
        .map(|c| c.node)
        .collect()
}

fn parse_err(source: &str) -> TranslateError {
    match parse_unit(source, "Test") {
        Ok(cmds) => panic!("expected an error, parsed {:?}", cmds),
        Err(e) => e,
    }
}

#[test]
fn test_parse_full_vocabulary() {
    let source = "\
// every command kind once
push constant 7
pop local 0
add
label LOOP
goto LOOP
if-goto END
function Main.fib 2
call Math.multiply 2
return
";
    assert_eq!(
        parse_ok(source),
        vec![
            Command::Push(Segment::Constant, 7),
            Command::Pop(Segment::Local, 0),
            Command::Arithmetic(ArithOp::Add),
            Command::Label("LOOP".into()),
            Command::Goto("LOOP".into()),
            Command::IfGoto("END".into()),
            Command::Function {
                name: "Main.fib".into(),
                locals: 2
            },
            Command::Call {
                name: "Math.multiply".into(),
                args: 2
            },
            Command::Return,
        ]
    );
}

#[test]
fn test_spans_point_at_source_lines() {
    let source = "push constant 1\n\n   push constant 2   // two\n";
    let cmds = parse_unit(source, "Test").unwrap();
    assert_eq!(cmds[0].span.line, 1);
    assert_eq!(cmds[1].span.line, 3);
    assert_eq!(&source[cmds[1].span.range()], "push constant 2");
}

#[test]
fn test_source_is_lazy() {
    // The bad second line is never reached when only the first is pulled.
    let mut src = CommandSource::new("neg\nfrobnicate\n", "Test");
    let first = src.next().unwrap().unwrap();
    assert_eq!(first.node, Command::Arithmetic(ArithOp::Neg));
    assert!(src.next().unwrap().is_err());
    assert!(src.next().is_none());
}

#[test]
fn test_unknown_keyword_is_malformed() {
    let err = parse_err("push constant 1\njump LOOP\n");
    match err {
        TranslateError::MalformedCommand { unit, span, message } => {
            assert_eq!(unit, "Test");
            assert_eq!(span.line, 2);
            assert!(message.contains("jump"), "{}", message);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_operand_count_mismatch_is_malformed() {
    for bad in ["push constant", "add 1", "label", "goto A B", "return 0", "call f"] {
        assert!(
            matches!(parse_err(bad), TranslateError::MalformedCommand { .. }),
            "{} should be malformed",
            bad
        );
    }
}

#[test]
fn test_unknown_segment_is_invalid_segment() {
    match parse_err("push heap 3") {
        TranslateError::InvalidSegment { segment, .. } => assert_eq!(segment, "heap"),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_bad_numbers() {
    assert!(matches!(
        parse_err("push constant -1"),
        TranslateError::MalformedCommand { .. }
    ));
    assert!(matches!(
        parse_err("function f x"),
        TranslateError::MalformedCommand { .. }
    ));
    let err = parse_err("push constant 70000");
    assert!(err.to_string().contains("16 bits"), "{}", err);
}

#[test]
fn test_symbols() {
    assert!(is_symbol("Main.main"));
    assert!(is_symbol("WHILE_EXP0"));
    assert!(is_symbol("_tmp:1"));
    assert!(!is_symbol("1abc"));
    assert!(!is_symbol("a$b"));
    assert!(!is_symbol("$ret.1"));
    assert!(!is_symbol(""));
    assert!(matches!(
        parse_err("label 9lives"),
        TranslateError::MalformedCommand { .. }
    ));
}

#[test]
fn test_empty_source() {
    assert!(parse_ok("").is_empty());
    assert!(parse_ok("// nothing here\n\n").is_empty());
}
