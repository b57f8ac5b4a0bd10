//! asl_compiler
//!
//! Semantic pipeline for Asl: scope/symbol resolution, type checking and
//! decoration, and three-address-code generation, plus the diagnostics
//! and TAC value types shared by all three passes. See [`pipeline`] for
//! the single entry point that ties them together.

// Prevent accidental debug output in library code.
// CLI binaries (bin/) may use eprintln!() for user-facing error messages.
#![deny(clippy::print_stderr)]

pub mod code;
pub mod config;
pub mod decoration;
pub mod error;
pub mod pipeline;
pub mod symtable;
pub mod types;
pub mod visitors;

pub use config::CompilerConfig;
pub use error::{Diagnostics, SemError};
pub use pipeline::{compile, run_symbols, run_typecheck, Analysis, CompileOutcome};
