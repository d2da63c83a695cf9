use super::*;
use crate::api::{translate, translate_units, SourceUnit, TranslateOptions};
use crate::config::Bootstrap;
use crate::syntax::parse_unit;

const SP0: u16 = 256;
const LCL0: u16 = 300;
const ARG0: u16 = 400;
const THIS0: u16 = 3000;
const THAT0: u16 = 3010;

/// Runner with the segment pointers a test harness would set up.
fn harness() -> HackRunner {
    HackRunner::default().with_frame(SP0, LCL0, ARG0, THIS0, THAT0)
}

fn run_unit(source: &str) -> Execution {
    let asm = translate(source, "Test").unwrap();
    let exec = harness().run(&asm, 100_000).unwrap();
    assert!(exec.result.halted, "did not halt:\n{}", source);
    exec
}

/// VM text pushing any 16-bit two's-complement value.
fn push_value(v: i16) -> String {
    if v >= 0 {
        format!("push constant {}\n", v)
    } else if v == i16::MIN {
        "push constant 32767\nneg\npush constant 1\nsub\n".to_string()
    } else {
        format!("push constant {}\nneg\n", -v)
    }
}

#[test]
fn test_push_then_pop_local() {
    for k in [0u16, 1, 7, 1234, 32767] {
        for i in [0u16, 3, 9] {
            let exec = run_unit(&format!("push constant {}\npop local {}\n", k, i));
            assert_eq!(exec.peek(LCL0 + i), k);
            assert_eq!(exec.sp(), SP0);
        }
    }
}

#[test]
fn test_add_wraps_modulo_2_16() {
    let values = [0i16, 1, -1, 7, 12345, -12345, i16::MAX, i16::MIN, 20000, -20000];
    for a in values {
        for b in values {
            let source = format!("{}{}add\n", push_value(a), push_value(b));
            let exec = run_unit(&source);
            assert_eq!(exec.sp(), SP0 + 1, "{} + {}", a, b);
            assert_eq!(exec.peek(SP0), (a as u16).wrapping_add(b as u16), "{} + {}", a, b);
        }
    }
}

#[test]
fn test_arithmetic_and_logic() {
    let cases: [(&str, u16); 7] = [
        ("push constant 9\npush constant 4\nsub\n", 5),
        ("push constant 4\npush constant 9\nsub\n", (-5i16) as u16),
        ("push constant 5\nneg\n", (-5i16) as u16),
        ("push constant 12\npush constant 10\nand\n", 8),
        ("push constant 12\npush constant 10\nor\n", 14),
        ("push constant 0\nnot\n", 0xffff),
        ("push constant 21\nnot\n", !21u16),
    ];
    for (source, expected) in cases {
        let exec = run_unit(source);
        assert_eq!(exec.stack_top(1), vec![expected], "{}", source);
        assert_eq!(exec.sp(), SP0 + 1);
    }
}

#[test]
fn test_eq_of_different_values_is_false() {
    let exec = run_unit("push constant 7\npush constant 8\neq\n");
    assert_eq!(exec.sp(), SP0 + 1);
    assert_eq!(exec.peek(SP0), 0);
}

#[test]
fn test_comparisons() {
    let cases: [(&str, u16); 6] = [
        ("push constant 8\npush constant 8\neq\n", 0xffff),
        ("push constant 9\npush constant 8\ngt\n", 0xffff),
        ("push constant 8\npush constant 9\ngt\n", 0),
        ("push constant 8\npush constant 9\nlt\n", 0xffff),
        ("push constant 9\nneg\npush constant 2\nlt\n", 0xffff),
        ("push constant 9\npush constant 8\nlt\n", 0),
    ];
    for (source, expected) in cases {
        let exec = run_unit(source);
        assert_eq!(exec.stack_top(1), vec![expected], "{}", source);
    }
}

/// `a - b` wraps for opposite-sign operands far apart, and the result
/// follows the sign of the wrapped difference.
#[test]
fn test_comparisons_follow_wrapped_difference() {
    let cases = [
        (20000i16, -20000i16, "gt", 0u16),
        (20000, -20000, "lt", 0xffff),
        (-20000, 20000, "gt", 0xffff),
        (-20000, 20000, "lt", 0),
        (i16::MAX, -1, "gt", 0),
        (20000, -20000, "eq", 0),
    ];
    for (a, b, op, expected) in cases {
        let source = format!("{}{}{}\n", push_value(a), push_value(b), op);
        let exec = run_unit(&source);
        assert_eq!(exec.stack_top(1), vec![expected], "{} {} {}", a, op, b);
        assert_eq!(exec.sp(), SP0 + 1);
    }
}

#[test]
fn test_segments_round_trip_through_memory() {
    let source = "\
push constant 10
pop local 0
push constant 21
pop argument 1
push constant 36
pop this 6
push constant 42
pop that 5
push constant 510
pop temp 6
push local 0
push that 5
add
push argument 1
sub
push this 6
push this 6
add
sub
push temp 6
add
";
    let exec = run_unit(source);
    assert_eq!(exec.peek(LCL0), 10);
    assert_eq!(exec.peek(ARG0 + 1), 21);
    assert_eq!(exec.peek(THIS0 + 6), 36);
    assert_eq!(exec.peek(THAT0 + 5), 42);
    assert_eq!(exec.peek(11), 510);
    assert_eq!(exec.sp(), SP0 + 1);
    assert_eq!(exec.stack_top(1), vec![469]);
}

#[test]
fn test_pointer_segment_moves_this_and_that() {
    let source = "\
push constant 3030
pop pointer 0
push constant 3040
pop pointer 1
push constant 32
pop this 2
push constant 46
pop that 6
push pointer 0
push pointer 1
add
";
    let exec = run_unit(source);
    assert_eq!(exec.peek(3), 3030);
    assert_eq!(exec.peek(4), 3040);
    assert_eq!(exec.peek(3032), 32);
    assert_eq!(exec.peek(3046), 46);
    assert_eq!(exec.stack_top(1), vec![6070]);
}

#[test]
fn test_same_label_in_two_functions_resolves_apart() {
    let source = "\
function Main.f 0
label LOOP
goto LOOP
function Main.g 0
label LOOP
goto LOOP
";
    let asm = translate(source, "Main").unwrap();
    let program = assemble(&asm, &MachineConfig::hack()).unwrap();
    let f = program.address_of("Main.f$LOOP").unwrap();
    let g = program.address_of("Main.g$LOOP").unwrap();
    assert_ne!(f, g);
}

#[test]
fn test_if_goto_loop_sums() {
    // sum 1..=5 into local 0, counting down argument 0
    let source = "\
push constant 5
pop argument 0
push constant 0
pop local 0
label LOOP
push argument 0
push local 0
add
pop local 0
push argument 0
push constant 1
sub
pop argument 0
push argument 0
if-goto LOOP
push local 0
";
    let exec = run_unit(source);
    assert_eq!(exec.stack_top(1), vec![15]);
    assert_eq!(exec.sp(), SP0 + 1);
}

#[test]
fn test_call_and_return_restore_caller_frame() {
    let source = "\
push constant 3
push constant 4
call Main.sum 2
label END
goto END
function Main.sum 1
push argument 0
push argument 1
add
pop local 0
push constant 99
pop this 0
push local 0
return
";
    let exec = run_unit(source);
    assert_eq!(exec.sp(), SP0 + 1);
    assert_eq!(exec.peek(SP0), 7);
    assert_eq!(exec.pointers(), [LCL0, ARG0, THIS0, THAT0]);
}

#[test]
fn test_return_with_zero_arguments() {
    // argument 0 and the return-address cell coincide here
    let source = "\
call Main.seven 0
label END
goto END
function Main.seven 0
push constant 7
return
";
    let exec = run_unit(source);
    assert_eq!(exec.sp(), SP0 + 1);
    assert_eq!(exec.peek(SP0), 7);
    assert_eq!(exec.pointers(), [LCL0, ARG0, THIS0, THAT0]);
}

#[test]
fn test_function_locals_start_at_zero() {
    let source = "\
push constant 1
pop local 2
call Main.f 0
label END
goto END
function Main.f 3
push local 0
push local 1
add
push local 2
add
return
";
    let mut runner = harness();
    // garbage where the callee's locals will land
    for addr in SP0..SP0 + 20 {
        runner = runner.with_ram(addr, 0x5555);
    }
    let asm = translate(source, "Main").unwrap();
    let exec = runner.run(&asm, 10_000).unwrap();
    assert!(exec.result.halted);
    assert_eq!(exec.stack_top(1), vec![0]);
}

#[test]
fn test_statics_are_scoped_by_unit() {
    let units = vec![
        SourceUnit::new("Foo", "push constant 10\npop static 0\n"),
        SourceUnit::new("Bar", "push static 0\n"),
    ];
    let options = TranslateOptions {
        bootstrap: Bootstrap::Never,
        ..TranslateOptions::default()
    };
    let asm = translate_units(&units, &options).unwrap();
    let program = assemble(&asm, &MachineConfig::hack()).unwrap();
    let exec = harness().run_program(&program, 10_000).unwrap();

    assert_eq!(exec.sp(), SP0 + 1);
    assert_ne!(exec.peek(SP0), 10);
    let foo = program.address_of("Foo.0").unwrap();
    let bar = program.address_of("Bar.0").unwrap();
    assert_ne!(foo, bar);
    assert_eq!(exec.peek(foo), 10);
}

const FIB: &str = "\
function Main.fib 0
push argument 0
push constant 2
lt
if-goto BASE
push argument 0
push constant 1
sub
call Main.fib 1
push argument 0
push constant 2
sub
call Main.fib 1
add
return
label BASE
push argument 0
return
";

fn fib_program(n: u16) -> Vec<SourceUnit> {
    vec![
        SourceUnit::new("Main", FIB),
        SourceUnit::new(
            "Sys",
            format!(
                "function Sys.init 0\npush constant {}\ncall Main.fib 1\nlabel END\ngoto END\n",
                n
            ),
        ),
    ]
}

#[test]
fn test_recursive_fibonacci() {
    for (n, expected) in [(0u16, 0u16), (1, 1), (5, 5), (10, 55), (15, 610)] {
        let asm = translate_units(&fib_program(n), &TranslateOptions::default()).unwrap();
        let runner = HackRunner::default()
            .with_ram(1, 1111)
            .with_ram(2, 2222)
            .with_ram(3, 3333)
            .with_ram(4, 4444);
        let exec = runner.run(&asm, 5_000_000).unwrap();
        assert!(exec.result.halted, "fib({}) did not halt", n);
        // bootstrap SP 261, one result pushed by Sys.init
        assert_eq!(exec.sp(), 262);
        assert_eq!(exec.peek(261), expected, "fib({})", n);
        assert_eq!(exec.pointers(), [1111, 2222, 3333, 4444]);
    }
}

#[test]
fn test_entry_function_must_not_return() {
    // The bootstrap jumps to Sys.init without building a frame, so a
    // `return` there reads the return address from below RAM.
    let units = vec![SourceUnit::new(
        "Sys",
        "function Sys.init 0\npush constant 1\nreturn\n",
    )];
    let asm = translate_units(&units, &TranslateOptions::default()).unwrap();
    let outcome = HackRunner::default().run(&asm, 10_000);
    assert!(outcome.is_err());
}

#[test]
fn test_stack_effects_match_simulation() {
    let source = "\
push constant 4
push constant 5
push constant 6
add
neg
push constant 1
eq
pop temp 0
push constant 9
push constant 3
push constant 2
gt
not
if-goto SKIP
label SKIP
push constant 7
";
    let expected: i32 = parse_unit(source, "Test")
        .unwrap()
        .iter()
        .map(|c| c.node.stack_effect().unwrap())
        .sum();
    let exec = run_unit(source);
    assert_eq!(exec.sp() as i32 - SP0 as i32, expected);
}

#[test]
fn test_runner_reports_asm_errors() {
    let err = HackRunner::default().run("D=Q\n", 10).unwrap_err();
    assert!(err.contains("bad comp"));
}
