//! Wires the three passes into the straight pipeline `spec.md` §2
//! describes: parse → symbols → typecheck → codegen. Pass 3 only runs
//! when passes 1–2 recorded no diagnostic (`spec.md` §7); a parse failure
//! short-circuits everything after it.

use asl_parser::{ParseError, Program};

use crate::code;
use crate::config::CompilerConfig;
use crate::decoration::TreeDecoration;
use crate::error::Diagnostics;
use crate::symtable::SymTable;
use crate::types::TypesMgr;
use crate::visitors::{CodeGenVisitor, SymbolsVisitor, TypeCheckVisitor};

/// Everything pass 1 (and optionally pass 2) produced: the parsed program
/// plus the shared state the later passes read and write.
#[derive(Debug)]
pub struct Analysis {
    pub program: Program,
    pub types: TypesMgr,
    pub symtab: SymTable,
    pub decoration: TreeDecoration,
    pub diagnostics: Diagnostics,
}

/// Runs pass 1 only: scope and symbol construction, enforcing `config`'s
/// array-size ceiling.
pub fn run_symbols(source: &str, config: &CompilerConfig) -> Result<Analysis, ParseError> {
    let program = asl_parser::parse(source)?;
    let mut types = TypesMgr::new();
    let mut symtab = SymTable::new();
    let mut decoration = TreeDecoration::new();
    let mut diagnostics = Diagnostics::new();
    SymbolsVisitor::new(&mut types, &mut diagnostics)
        .with_max_array_size(config.max_array_size)
        .run(&program, &mut symtab, &mut decoration);
    Ok(Analysis {
        program,
        types,
        symtab,
        decoration,
        diagnostics,
    })
}

/// Runs passes 1–2: scope/symbol construction, then type checking and
/// decoration. Diagnostics from both passes accumulate in one sink.
pub fn run_typecheck(source: &str, config: &CompilerConfig) -> Result<Analysis, ParseError> {
    let mut analysis = run_symbols(source, config)?;
    TypeCheckVisitor::new(&mut analysis.types, &mut analysis.diagnostics).run(
        &analysis.program,
        &mut analysis.symtab,
        &mut analysis.decoration,
    );
    Ok(analysis)
}

/// The result of a full compile: the analysis state plus the emitted TAC,
/// which is `None` exactly when `analysis.diagnostics` is non-empty.
#[derive(Debug)]
pub struct CompileOutcome {
    pub analysis: Analysis,
    pub tac: Option<code::Program>,
}

/// Runs the full pipeline. `config.max_array_size` is enforced by pass 1
/// (see [`crate::visitors::symbols::SymbolsVisitor::with_max_array_size`]);
/// `config.warnings_as_errors` has no observable effect yet, since no pass
/// currently emits a warning.
pub fn compile(source: &str, config: &CompilerConfig) -> Result<CompileOutcome, ParseError> {
    let mut analysis = run_typecheck(source, config)?;
    let tac = if analysis.diagnostics.is_empty() {
        let mut codegen = CodeGenVisitor::new(&analysis.types, &analysis.decoration);
        Some(codegen.run(&analysis.program, &mut analysis.symtab))
    } else {
        None
    };
    Ok(CompileOutcome { analysis, tac })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_program_compiles_to_tac() {
        let outcome = compile("func main()\nendfunc", &CompilerConfig::default()).unwrap();
        assert!(outcome.analysis.diagnostics.is_empty());
        assert!(outcome.tac.is_some());
    }

    #[test]
    fn semantic_error_suppresses_codegen() {
        let outcome = compile("func main()\nwrite y;\nendfunc", &CompilerConfig::default()).unwrap();
        assert!(!outcome.analysis.diagnostics.is_empty());
        assert!(outcome.tac.is_none());
    }

    #[test]
    fn parse_failure_short_circuits_before_any_pass() {
        let result = compile("func main(\nendfunc", &CompilerConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn oversized_array_is_rejected_by_configured_limit() {
        let config = CompilerConfig {
            max_array_size: 4,
            ..CompilerConfig::default()
        };
        let outcome = compile("func main()\nvar a: array[5] of int;\nendfunc", &config).unwrap();
        assert!(outcome
            .analysis
            .diagnostics
            .errors()
            .iter()
            .any(|e| matches!(e, crate::error::SemError::ArrayTooLarge { .. })));
        assert!(outcome.tac.is_none());
    }
}
