//! TAC instruction, instruction-list, subroutine, and program value types
//! (`spec.md` §3 "TAC model", §6 "TAC output syntax").

use std::fmt;

use serde::Serialize;

/// One operand of a TAC instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Operand {
    /// A fresh register temporary, printed `%<n>`.
    Temp(u32),
    /// A local variable, parameter, or function name.
    Var(String),
    Int(i64),
    Float(f64),
    Char(char),
    /// A string literal, stored exactly as it appeared in source (quotes
    /// and escapes included), per `spec.md` §6.
    Str(String),
    Label(String),
    /// The empty string literal used by `PUSH ""`/`POP ""`.
    Empty,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp(n) => write!(f, "%{n}"),
            Operand::Var(name) => write!(f, "{name}"),
            // Immediate numeric operands are quoted in the textual TAC form,
            // distinguishing a literal value from a `%temp`/variable name.
            Operand::Int(v) => write!(f, "\"{v}\""),
            Operand::Float(v) => write!(f, "\"{v}\""),
            Operand::Char(c) => write!(f, "'{c}'"),
            Operand::Str(raw) => write!(f, "{raw}"),
            Operand::Label(name) => write!(f, "{name}"),
            Operand::Empty => write!(f, "\"\""),
        }
    }
}

/// A single TAC instruction: a fixed opcode with 0–3 operands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Instr {
    // ---- integer arithmetic ----
    Add(Operand, Operand, Operand),
    Sub(Operand, Operand, Operand),
    Mul(Operand, Operand, Operand),
    Div(Operand, Operand, Operand),
    Neg(Operand, Operand),
    // ---- float arithmetic ----
    Fadd(Operand, Operand, Operand),
    Fsub(Operand, Operand, Operand),
    Fmul(Operand, Operand, Operand),
    Fdiv(Operand, Operand, Operand),
    Fneg(Operand, Operand),
    // ---- conversion ----
    Float(Operand, Operand),
    // ---- loads ----
    Iload(Operand, Operand),
    Fload(Operand, Operand),
    Chload(Operand, Operand),
    Load(Operand, Operand),
    /// `dst, base, index`
    Loadx(Operand, Operand, Operand),
    /// `base, index, src`
    Xload(Operand, Operand, Operand),
    /// `dst, base`
    Aload(Operand, Operand),
    // ---- relational ----
    Eq(Operand, Operand, Operand),
    Lt(Operand, Operand, Operand),
    Le(Operand, Operand, Operand),
    Feq(Operand, Operand, Operand),
    Flt(Operand, Operand, Operand),
    Fle(Operand, Operand, Operand),
    // ---- logical ----
    And(Operand, Operand, Operand),
    Or(Operand, Operand, Operand),
    Not(Operand, Operand),
    // ---- control flow ----
    Label(String),
    Ujump(String),
    /// `cond, label`
    Fjump(Operand, String),
    // ---- I/O ----
    Readi(Operand),
    Readf(Operand),
    Readc(Operand),
    Writei(Operand),
    Writef(Operand),
    Writec(Operand),
    Writes(Operand),
    // ---- calling ----
    Push(Operand),
    Pop(Operand),
    Call(String),
    Return,
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn three(f: &mut fmt::Formatter<'_>, op: &str, a: &Operand, b: &Operand, c: &Operand) -> fmt::Result {
            write!(f, "{op} {a},{b},{c}")
        }
        fn two(f: &mut fmt::Formatter<'_>, op: &str, a: &Operand, b: &Operand) -> fmt::Result {
            write!(f, "{op} {a},{b}")
        }
        match self {
            Instr::Add(d, a, b) => three(f, "ADD", d, a, b),
            Instr::Sub(d, a, b) => three(f, "SUB", d, a, b),
            Instr::Mul(d, a, b) => three(f, "MUL", d, a, b),
            Instr::Div(d, a, b) => three(f, "DIV", d, a, b),
            Instr::Neg(d, a) => two(f, "NEG", d, a),
            Instr::Fadd(d, a, b) => three(f, "FADD", d, a, b),
            Instr::Fsub(d, a, b) => three(f, "FSUB", d, a, b),
            Instr::Fmul(d, a, b) => three(f, "FMUL", d, a, b),
            Instr::Fdiv(d, a, b) => three(f, "FDIV", d, a, b),
            Instr::Fneg(d, a) => two(f, "FNEG", d, a),
            Instr::Float(d, a) => two(f, "FLOAT", d, a),
            Instr::Iload(d, a) => two(f, "ILOAD", d, a),
            Instr::Fload(d, a) => two(f, "FLOAD", d, a),
            Instr::Chload(d, a) => two(f, "CHLOAD", d, a),
            Instr::Load(d, a) => two(f, "LOAD", d, a),
            Instr::Loadx(d, base, idx) => three(f, "LOADX", d, base, idx),
            Instr::Xload(base, idx, src) => three(f, "XLOAD", base, idx, src),
            Instr::Aload(d, base) => two(f, "ALOAD", d, base),
            Instr::Eq(d, a, b) => three(f, "EQ", d, a, b),
            Instr::Lt(d, a, b) => three(f, "LT", d, a, b),
            Instr::Le(d, a, b) => three(f, "LE", d, a, b),
            Instr::Feq(d, a, b) => three(f, "FEQ", d, a, b),
            Instr::Flt(d, a, b) => three(f, "FLT", d, a, b),
            Instr::Fle(d, a, b) => three(f, "FLE", d, a, b),
            Instr::And(d, a, b) => three(f, "AND", d, a, b),
            Instr::Or(d, a, b) => three(f, "OR", d, a, b),
            Instr::Not(d, a) => two(f, "NOT", d, a),
            Instr::Label(name) => write!(f, "{name}:"),
            Instr::Ujump(label) => write!(f, "UJUMP {label}"),
            Instr::Fjump(cond, label) => write!(f, "FJUMP {cond},{label}"),
            Instr::Readi(d) => write!(f, "READI {d}"),
            Instr::Readf(d) => write!(f, "READF {d}"),
            Instr::Readc(d) => write!(f, "READC {d}"),
            Instr::Writei(s) => write!(f, "WRITEI {s}"),
            Instr::Writef(s) => write!(f, "WRITEF {s}"),
            Instr::Writec(s) => write!(f, "WRITEC {s}"),
            Instr::Writes(s) => write!(f, "WRITES {s}"),
            Instr::Push(v) => write!(f, "PUSH {v}"),
            Instr::Pop(v) => write!(f, "POP {v}"),
            Instr::Call(name) => write!(f, "CALL {name}"),
            Instr::Return => write!(f, "RETURN"),
        }
    }
}

/// A function's instructions, in emission order. `||` in `spec.md` is
/// ordinary `Vec` concatenation (`extend`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstructionList(pub Vec<Instr>);

impl InstructionList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, instr: Instr) {
        self.0.push(instr);
    }

    pub fn extend(&mut self, other: InstructionList) {
        self.0.extend(other.0);
    }
}

impl fmt::Display for InstructionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.0 {
            writeln!(f, "{instr}")?;
        }
        Ok(())
    }
}

/// A local variable or parameter slot: name plus its `sizeOf` byte size.
#[derive(Debug, Clone, Serialize)]
pub struct Var {
    pub name: String,
    pub size: u32,
}

/// One compiled function.
#[derive(Debug, Clone, Serialize)]
pub struct Subroutine {
    pub name: String,
    pub params: Vec<Var>,
    pub locals: Vec<Var>,
    pub code: InstructionList,
}

impl fmt::Display for Subroutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.name)?;
        write!(f, "# params:")?;
        for p in &self.params {
            write!(f, " {}:{}", p.name, p.size)?;
        }
        writeln!(f)?;
        for local in &self.locals {
            writeln!(f, "var {} {}", local.name, local.size)?;
        }
        write!(f, "{}", self.code)
    }
}

/// The complete emitted program: one subroutine per function, source order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Program {
    pub subroutines: Vec<Subroutine>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sub) in self.subroutines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{sub}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_display_matches_tac_textual_conventions() {
        assert_eq!(Operand::Temp(3).to_string(), "%3");
        assert_eq!(Operand::Var("x".into()).to_string(), "x");
        assert_eq!(Operand::Str("\"hi\\n\"".into()).to_string(), "\"hi\\n\"");
        assert_eq!(Operand::Empty.to_string(), "\"\"");
    }

    #[test]
    fn instruction_display_uses_comma_separated_operands() {
        let instr = Instr::Add(Operand::Temp(0), Operand::Temp(1), Operand::Temp(2));
        assert_eq!(instr.to_string(), "ADD %0,%1,%2");
    }

    #[test]
    fn label_is_bare_identifier_with_colon() {
        assert_eq!(Instr::Label("endif1".into()).to_string(), "endif1:");
    }

    #[test]
    fn subroutine_display_lists_locals_then_instructions() {
        let sub = Subroutine {
            name: "main".into(),
            params: Vec::new(),
            locals: vec![Var { name: "x".into(), size: 1 }],
            code: {
                let mut code = InstructionList::new();
                code.push(Instr::Return);
                code
            },
        };
        let text = sub.to_string();
        assert!(text.contains("# main"));
        assert!(text.contains("var x 1"));
        assert!(text.contains("RETURN"));
    }
}
