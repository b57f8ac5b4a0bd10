//! Asl Compiler CLI
//!
//! Compiles Asl source to textual three-address code, with flags to stop
//! after an earlier pass and dump its intermediate state instead.
//!
//! Usage:
//!   aslc input.asl > program.t
//!   aslc --tokens input.asl
//!   cat input.asl | aslc --decorated

use std::fs;
use std::io::{self, Read};
use std::process;

use asl_compiler::config::CompilerConfig;
use asl_compiler::pipeline;
use thiserror::Error;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// IO/usage errors that belong to the binary itself, not to compilation.
#[derive(Error, Debug)]
enum CliError {
    #[error("error reading file '{path}': {source}")]
    ReadFile { path: String, source: io::Error },
    #[error("error reading stdin: {0}")]
    ReadStdin(io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Tokens,
    Tree,
    Symbols,
    Decorated,
    Tac,
}

#[derive(Debug)]
struct Args {
    stage: Stage,
    input_file: Option<String>,
    show_help: bool,
    show_version: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut parsed = Args {
            stage: Stage::Tac,
            input_file: None,
            show_help: false,
            show_version: false,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => parsed.show_help = true,
                "-v" | "--version" => parsed.show_version = true,
                "--tokens" => parsed.stage = Stage::Tokens,
                "--tree" => parsed.stage = Stage::Tree,
                "--symbols" => parsed.stage = Stage::Symbols,
                "--decorated" => parsed.stage = Stage::Decorated,
                "--tac" => parsed.stage = Stage::Tac,
                "--log-level" => {
                    // Accepted and ignored: this crate reports progress with
                    // plain eprintln!, there is no leveled logger to tune.
                    i += 1;
                }
                arg if !arg.starts_with('-') => {
                    if parsed.input_file.is_none() {
                        parsed.input_file = Some(arg.to_string());
                    }
                }
                _ => {
                    eprintln!("Unknown option: {}", args[i]);
                }
            }
            i += 1;
        }

        parsed
    }
}

fn print_help() {
    println!(
        r#"Asl Compiler v{VERSION}

USAGE:
    aslc [FLAG] [FILE]

FLAGS:
    -h, --help       Show this help message
    -v, --version    Show version information
    --tokens         Dump the token stream and stop
    --tree           Dump the parsed syntax tree and stop
    --symbols        Run scope/symbol resolution only and dump the symbol table
    --decorated      Run through type checking and dump the decorated tree
    --tac            Run the full pipeline and print three-address code (default)

FILE defaults to stdin when omitted.
Exit code is 0 iff the requested stage produced no diagnostics, 1 otherwise.
"#
    );
}

fn print_version() {
    println!("Asl Compiler v{VERSION}");
}

fn read_source(path: Option<&str>) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::ReadFile {
            path: path.to_string(),
            source,
        }),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(CliError::ReadStdin)?;
            Ok(buf)
        }
    }
}

fn main() {
    let args = Args::parse();

    if args.show_help {
        print_help();
        return;
    }
    if args.show_version {
        print_version();
        return;
    }

    let source = read_source(args.input_file.as_deref()).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    match args.stage {
        Stage::Tokens => run_tokens(&source),
        Stage::Tree => run_tree(&source),
        Stage::Symbols => run_symbols(&source),
        Stage::Decorated => run_decorated(&source),
        Stage::Tac => run_tac(&source),
    }
}

fn run_tokens(source: &str) {
    for result in asl_parser::tokenize(source) {
        match result {
            Ok(spanned) => println!("{:?}", spanned.token),
            Err(e) => {
                eprintln!("{}", e.to_diagnostic());
                process::exit(1);
            }
        }
    }
}

fn run_tree(source: &str) {
    match asl_parser::parse(source) {
        Ok(program) => match serde_json::to_string_pretty(&program) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing syntax tree: {e}");
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("{}", e.to_diagnostic());
            process::exit(1);
        }
    }
}

fn run_symbols(source: &str) {
    let config = CompilerConfig::default();
    let analysis = match pipeline::run_symbols(source, &config) {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("{}", e.to_diagnostic());
            process::exit(1);
        }
    };
    for function in &analysis.program.functions {
        let scope = analysis.decoration.scope(function.id);
        println!("{}: scope {:?}", function.name, scope);
    }
    report_and_exit(&analysis.diagnostics, "error(s) during symbol resolution");
}

fn run_decorated(source: &str) {
    let config = CompilerConfig::default();
    let analysis = match pipeline::run_typecheck(source, &config) {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("{}", e.to_diagnostic());
            process::exit(1);
        }
    };
    let dump = serde_json::json!({
        "ast": &analysis.program,
        "decorations": analysis.decoration.as_json(),
    });
    match serde_json::to_string_pretty(&dump) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing decorated tree: {e}");
            process::exit(1);
        }
    }
    report_and_exit(&analysis.diagnostics, "error(s), stopping before code generation");
}

fn run_tac(source: &str) {
    let config = CompilerConfig::default();
    let outcome = match pipeline::compile(source, &config) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", e.to_diagnostic());
            process::exit(1);
        }
    };
    if let Some(program) = &outcome.tac {
        print!("{program}");
    }
    report_and_exit(&outcome.analysis.diagnostics, "error(s), stopping before code generation");
}

fn report_and_exit(diagnostics: &asl_compiler::Diagnostics, summary: &str) {
    if diagnostics.is_empty() {
        return;
    }
    eprintln!("{} {summary}", diagnostics.len());
    for line in diagnostics.to_lines() {
        eprintln!("{line}");
    }
    process::exit(1);
}
