//! The six scenario tests of `spec.md` §8, run end to end through
//! [`asl_compiler::pipeline::compile`].

use asl_compiler::config::CompilerConfig;
use asl_compiler::pipeline;
use pretty_assertions::assert_eq;

fn compile(src: &str) -> pipeline::CompileOutcome {
    pipeline::compile(src, &CompilerConfig::default()).expect("source should parse")
}

#[test]
fn hello_main_compiles_to_one_empty_subroutine() {
    let outcome = compile("func main()\nendfunc");
    assert!(outcome.analysis.diagnostics.is_empty());
    let tac = outcome.tac.expect("well-formed program must emit TAC");
    assert_eq!(tac.subroutines.len(), 1);
    let main = &tac.subroutines[0];
    assert_eq!(main.name, "main");
    assert!(main.params.is_empty());
    assert!(main.locals.is_empty());
    assert_eq!(main.code.0.len(), 1);
    assert!(matches!(main.code.0[0], asl_compiler::code::Instr::Return));
}

#[test]
fn integer_promotion_widens_before_adding() {
    let src = "func main()\nvar x: float;\nvar y: int;\nx := y + 1;\nendfunc";
    let outcome = compile(src);
    assert!(outcome.analysis.diagnostics.is_empty());
    let tac = outcome.tac.unwrap();
    let text = tac.subroutines[0].code.to_string();
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines.iter().any(|l| l.starts_with("FLOAT") && l.contains('y')));
    assert!(lines.iter().any(|l| l.starts_with("ILOAD") && l.contains("\"1\"")));
    assert!(lines.iter().filter(|l| l.starts_with("FLOAT")).count() >= 2);
    assert!(lines.iter().any(|l| l.starts_with("FADD")));
    assert!(lines.iter().any(|l| l.starts_with("LOAD ") && l.contains('x')));
}

#[test]
fn array_copy_emits_a_counted_loop() {
    let src = "func main()\nvar a,b: array[4] of int;\na := b;\nendfunc";
    let outcome = compile(src);
    assert!(outcome.analysis.diagnostics.is_empty());
    let tac = outcome.tac.unwrap();
    let text = tac.subroutines[0].code.to_string();

    assert!(text.contains("ILOAD") && text.contains("\"4\""));
    assert!(text.contains("\"0\""));
    assert!(text.contains("\"1\""));
    assert!(text.contains("LT "));
    assert!(text.contains("FJUMP"));
    assert!(text.contains("LOADX"));
    assert!(text.contains("XLOAD"));
    assert!(text.contains("ADD "));
    assert!(text.contains("UJUMP"));
}

#[test]
fn cross_type_modulo_is_a_single_diagnostic_with_no_tac() {
    let src = "func main()\nvar a:int;\nvar b:float;\na := a % b;\nendfunc";
    let outcome = compile(src);
    assert_eq!(outcome.analysis.diagnostics.len(), 1);
    assert!(matches!(
        outcome.analysis.diagnostics.errors()[0],
        asl_compiler::SemError::CrossTypeModulo { .. }
    ));
    assert!(outcome.tac.is_none());
}

#[test]
fn undeclared_identifier_in_condition_does_not_cascade() {
    let src = "func main()\nif foo then\nendif\nendfunc";
    let outcome = compile(src);
    assert_eq!(outcome.analysis.diagnostics.len(), 1);
    assert!(matches!(
        outcome.analysis.diagnostics.errors()[0],
        asl_compiler::SemError::UndeclaredIdentifier { .. }
    ));
    assert!(outcome.tac.is_none());
}

#[test]
fn array_copy_tac_matches_snapshot() {
    let src = "func main()\nvar a,b: array[4] of int;\na := b;\nendfunc";
    let outcome = compile(src);
    assert!(outcome.analysis.diagnostics.is_empty());
    let tac = outcome.tac.unwrap();
    insta::assert_snapshot!(tac.subroutines[0].code.to_string(), @r###"
    ILOAD %4,"4"
    ILOAD %1,"0"
    ILOAD %2,"1"
    while0:
    LT %3,%1,%4
    FJUMP %3,endwhile0
    LOADX %0,b,%1
    XLOAD a,%1,%0
    ADD %1,%1,%2
    UJUMP while0
    endwhile0:
    RETURN
    "###);
}

#[test]
fn write_string_emits_a_single_writes_instruction() {
    let src = "func main()\nwrite \"hi\\n\";\nendfunc";
    let outcome = compile(src);
    assert!(outcome.analysis.diagnostics.is_empty());
    let tac = outcome.tac.unwrap();
    assert_eq!(tac.subroutines[0].code.0.len(), 2);
    assert!(matches!(tac.subroutines[0].code.0[0], asl_compiler::code::Instr::Writes(_)));
    assert!(matches!(tac.subroutines[0].code.0[1], asl_compiler::code::Instr::Return));
}
