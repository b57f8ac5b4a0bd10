//! Diagnostics (`spec.md` §7 "Error Handling Design").
//!
//! [`SemError`] has one variant per row of the error taxonomy; [`Diagnostics`]
//! is the global sink every pass appends to and continues past, rendering
//! `L<line>:<col>: <message>` lines at the end of the run.

use asl_parser::span::Span;
use thiserror::Error;

/// A semantic error, one variant per taxonomy row in `spec.md` §7.
#[derive(Error, Debug, Clone)]
pub enum SemError {
    // ---- Declaration ----
    #[error("undeclared identifier '{name}'")]
    UndeclaredIdentifier { name: String, span: Span },

    #[error("duplicate function '{name}'")]
    DuplicateFunction { name: String, span: Span },

    #[error("duplicate parameter '{name}'")]
    DuplicateParameter { name: String, span: Span },

    #[error("duplicate variable '{name}'")]
    DuplicateVariable { name: String, span: Span },

    #[error("array element type must be primitive")]
    InvalidArrayElement { span: Span },

    #[error("array size {size} exceeds the configured maximum of {max}")]
    ArrayTooLarge { size: u32, max: u32, span: Span },

    #[error("program must declare exactly one function 'main' with no parameters and no return type")]
    MissingMain { span: Span },

    // ---- Type ----
    #[error("cannot assign a value of this type to the left-hand side")]
    IncompatibleAssignment { span: Span },

    #[error("return value is not compatible with the function's return type")]
    IncompatibleReturn { span: Span },

    #[error("argument {index} is not compatible with its parameter type")]
    IncompatibleArgument { index: usize, span: Span },

    #[error("condition must be boolean")]
    NonBooleanCondition { span: Span },

    #[error("operand of arithmetic operator must be numeric")]
    NonNumericArithmetic { span: Span },

    #[error("operands of relational operator are not comparable")]
    NonComparable { span: Span },

    #[error("operand of a boolean operator must be boolean")]
    NonBooleanOperand { span: Span },

    #[error("'read'/'write' operand must be a primitive type")]
    NonPrimitiveReadWrite { span: Span },

    #[error("indexed value is not an array")]
    NonArrayIndexed { span: Span },

    #[error("array index must be an integer")]
    NonIntegerIndex { span: Span },

    #[error("'%' requires both operands to have the same numeric type")]
    CrossTypeModulo { span: Span },

    #[error("'{name}' is not callable")]
    NonCallable { name: String, span: Span },

    #[error("call to '{name}' expects {expected} argument(s), found {found}")]
    WrongArity {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("a void-returning call cannot be used as a value")]
    VoidValueUsed { span: Span },

    // ---- Use ----
    #[error("left-hand side is not a referenceable location")]
    NonLvalue { span: Span },
}

impl SemError {
    pub fn span(&self) -> Span {
        match self {
            SemError::UndeclaredIdentifier { span, .. }
            | SemError::DuplicateFunction { span, .. }
            | SemError::DuplicateParameter { span, .. }
            | SemError::DuplicateVariable { span, .. }
            | SemError::InvalidArrayElement { span }
            | SemError::ArrayTooLarge { span, .. }
            | SemError::MissingMain { span }
            | SemError::IncompatibleAssignment { span }
            | SemError::IncompatibleReturn { span }
            | SemError::IncompatibleArgument { span, .. }
            | SemError::NonBooleanCondition { span }
            | SemError::NonNumericArithmetic { span }
            | SemError::NonComparable { span }
            | SemError::NonBooleanOperand { span }
            | SemError::NonPrimitiveReadWrite { span }
            | SemError::NonArrayIndexed { span }
            | SemError::NonIntegerIndex { span }
            | SemError::CrossTypeModulo { span }
            | SemError::NonCallable { span, .. }
            | SemError::WrongArity { span, .. }
            | SemError::VoidValueUsed { span }
            | SemError::NonLvalue { span } => *span,
        }
    }

    /// Render as the shared `L<line>:<col>: <message>` diagnostic line.
    pub fn to_diagnostic(&self) -> String {
        let span = self.span();
        format!("L{}:{}: {}", span.start_line, span.start_column, self)
    }
}

/// Global error sink: every pass appends to it and continues regardless, so
/// the user sees as many problems as possible per run (`spec.md` §2).
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<SemError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: SemError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[SemError] {
        &self.errors
    }

    /// One `L<line>:<col>: <message>` line per error, in emission order.
    pub fn to_lines(&self) -> Vec<String> {
        self.errors.iter().map(SemError::to_diagnostic).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_line_column_message() {
        let span = Span::new(0, 3, 4, 4, 7, 10);
        let err = SemError::UndeclaredIdentifier {
            name: "foo".into(),
            span,
        };
        assert_eq!(err.to_diagnostic(), "L4:7: undeclared identifier 'foo'");
    }

    #[test]
    fn diagnostics_accumulate_and_continue() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        diags.push(SemError::MissingMain {
            span: Span::empty(),
        });
        diags.push(SemError::NonLvalue {
            span: Span::empty(),
        });
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.to_lines().len(), 2);
    }
}
