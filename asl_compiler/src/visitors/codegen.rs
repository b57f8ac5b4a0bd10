//! Pass 3: three-address code generation (`spec.md` §4.5).
//!
//! Only runs once passes 1–2 produced no diagnostic, so every type this
//! pass reads off the decoration table is concrete — never `Error`. Temp
//! and label counters live on the visitor and are reset at the start of
//! each function so emitted names are deterministic per function.

use asl_parser::ast::{ArithOp, Expr, Function, Ident, LeftExpr, Program, RelOp, Statement, WriteArg};

use crate::code::{self, Instr, InstructionList, Operand, Subroutine, Var};
use crate::decoration::TreeDecoration;
use crate::symtable::SymTable;
use crate::types::{TypeId, TypesMgr};

pub struct CodeGenVisitor<'a> {
    types: &'a TypesMgr,
    decoration: &'a TreeDecoration,
    current_return: TypeId,
    temp_counter: u32,
    if_counter: u32,
    while_counter: u32,
}

impl<'a> CodeGenVisitor<'a> {
    pub fn new(types: &'a TypesMgr, decoration: &'a TreeDecoration) -> Self {
        let void = types.void();
        Self {
            types,
            decoration,
            current_return: void,
            temp_counter: 0,
            if_counter: 0,
            while_counter: 0,
        }
    }

    pub fn run(&mut self, program: &Program, symtab: &mut SymTable) -> code::Program {
        let subroutines = program
            .functions
            .iter()
            .map(|f| self.compile_function(f, symtab))
            .collect();
        code::Program { subroutines }
    }

    fn new_temp(&mut self) -> Operand {
        let n = self.temp_counter;
        self.temp_counter += 1;
        Operand::Temp(n)
    }

    fn new_if_suffix(&mut self) -> u32 {
        let n = self.if_counter;
        self.if_counter += 1;
        n
    }

    fn new_while_suffix(&mut self) -> u32 {
        let n = self.while_counter;
        self.while_counter += 1;
        n
    }

    fn ty(&self, node: asl_parser::ast::NodeId) -> TypeId {
        self.decoration.ty(node).expect("pass 2 types every node codegen visits")
    }

    fn compile_function(&mut self, function: &Function, symtab: &mut SymTable) -> Subroutine {
        let sid = self
            .decoration
            .scope(function.id)
            .expect("pass 1 records a scope on every function");
        symtab.push_this_scope(sid);
        self.temp_counter = 0;
        self.if_counter = 0;
        self.while_counter = 0;

        let mut params = Vec::new();
        self.current_return = match &function.return_type {
            Some(rt) => {
                let ty = self.ty(rt.id);
                params.push(Var {
                    name: "_result".to_string(),
                    size: self.types.size_of(ty),
                });
                ty
            }
            None => self.types.void(),
        };

        let locals = function
            .declarations
            .iter()
            .flat_map(|decl| {
                let size = self.types.size_of(self.ty(decl.ty.id));
                decl.names
                    .iter()
                    .map(move |(name, _)| Var { name: name.clone(), size })
            })
            .collect();

        for param in &function.params {
            let size = self.types.size_of(self.ty(param.ty.id));
            params.push(Var {
                name: param.name.clone(),
                size,
            });
        }

        let mut code = InstructionList::new();
        for stmt in &function.statements {
            code.extend(self.compile_statement(stmt, symtab));
        }
        code.push(Instr::Return);

        symtab.pop_scope();
        Subroutine {
            name: function.name.clone(),
            params,
            locals,
            code,
        }
    }

    fn compile_block(&mut self, stmts: &[Statement], symtab: &SymTable) -> InstructionList {
        let mut code = InstructionList::new();
        for stmt in stmts {
            code.extend(self.compile_statement(stmt, symtab));
        }
        code
    }

    fn compile_statement(&mut self, stmt: &Statement, symtab: &SymTable) -> InstructionList {
        match stmt {
            Statement::Assign { target, value, .. } => self.compile_assign(target, value, symtab),
            Statement::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                let (addr1, code1) = self.compile_expr(cond, symtab);
                let code2 = self.compile_block(then_branch, symtab);
                let suffix = self.new_if_suffix();
                let label_else = format!("else{suffix}");
                let label_endif = format!("endif{suffix}");

                let mut code = InstructionList::new();
                code.extend(code1);
                match else_branch {
                    Some(else_branch) => {
                        let code3 = self.compile_block(else_branch, symtab);
                        code.push(Instr::Fjump(addr1, label_else.clone()));
                        code.extend(code2);
                        code.push(Instr::Ujump(label_endif.clone()));
                        code.push(Instr::Label(label_else));
                        code.extend(code3);
                    }
                    None => {
                        code.push(Instr::Fjump(addr1, label_endif.clone()));
                        code.extend(code2);
                    }
                }
                code.push(Instr::Label(label_endif));
                code
            }
            Statement::While { cond, body, .. } => {
                let suffix = self.new_while_suffix();
                let label = format!("while{suffix}");
                let label_end = format!("end{label}");

                let (addr1, code1) = self.compile_expr(cond, symtab);
                let code2 = self.compile_block(body, symtab);

                let mut code = InstructionList::new();
                code.push(Instr::Label(label.clone()));
                code.extend(code1);
                code.push(Instr::Fjump(addr1, label_end.clone()));
                code.extend(code2);
                code.push(Instr::Ujump(label));
                code.push(Instr::Label(label_end));
                code
            }
            Statement::Call { ident, args, .. } => {
                let mut code = self.compile_call_args(ident, args, symtab);
                code.push(Instr::Pop(Operand::Empty));
                code
            }
            Statement::Read { target, .. } => self.compile_read(target, symtab),
            Statement::Write { arg, .. } => self.compile_write(arg, symtab),
            Statement::Return { value, .. } => self.compile_return(value.as_ref(), symtab),
        }
    }

    fn compile_assign(&mut self, target: &LeftExpr, value: &Expr, symtab: &SymTable) -> InstructionList {
        let (addr1, code1) = self.compile_ident(&target.ident, symtab);
        let (addr2, code2) = self.compile_expr(value, symtab);
        let tid1 = self.ty(target.id);
        let tid2 = self.ty(value.id());

        let mut code = InstructionList::new();

        if let Some(index) = &target.index {
            let (addr3, code3) = self.compile_expr(index, symtab);
            code.extend(code1);
            code.extend(code3);
            code.extend(code2);
            if self.types.is_float(tid1) && self.types.is_integer(tid2) {
                let temp = self.new_temp();
                code.push(Instr::Float(temp.clone(), addr2));
                code.push(Instr::Xload(addr1, addr3, temp));
            } else {
                code.push(Instr::Xload(addr1, addr3, addr2));
            }
            return code;
        }

        code.extend(code1);
        code.extend(code2);
        if self.types.is_float(tid1) && self.types.is_integer(tid2) {
            let temp = self.new_temp();
            code.push(Instr::Float(temp.clone(), addr2));
            code.push(Instr::Load(addr1, temp));
        } else if self.types.is_array(tid1) && self.types.is_array(tid2) {
            let temp = self.new_temp();
            let i = self.new_temp();
            let k = self.new_temp();
            let cond = self.new_temp();
            let size = self.new_temp();
            let suffix = self.new_while_suffix();
            let label = format!("while{suffix}");
            let label_end = format!("end{label}");
            let length = self.types.array_size(tid2).expect("checked is_array above");

            code.push(Instr::Iload(size.clone(), Operand::Int(length as i64)));
            code.push(Instr::Iload(i.clone(), Operand::Int(0)));
            code.push(Instr::Iload(k.clone(), Operand::Int(1)));
            code.push(Instr::Label(label.clone()));
            code.push(Instr::Lt(cond.clone(), i.clone(), size));
            code.push(Instr::Fjump(cond, label_end.clone()));
            code.push(Instr::Loadx(temp.clone(), addr2, i.clone()));
            code.push(Instr::Xload(addr1, i.clone(), temp));
            code.push(Instr::Add(i.clone(), i.clone(), k));
            code.push(Instr::Ujump(label));
            code.push(Instr::Label(label_end));
        } else {
            code.push(Instr::Load(addr1, addr2));
        }
        code
    }

    fn compile_read(&mut self, target: &LeftExpr, symtab: &SymTable) -> InstructionList {
        let (addr1, code1) = self.compile_ident(&target.ident, symtab);
        let tid1 = self.ty(target.id);

        let mut code = InstructionList::new();
        if let Some(index) = &target.index {
            let temp = self.new_temp();
            code.extend(code1);
            code.push(self.read_instr(tid1, temp.clone()));
            let (addr3, code3) = self.compile_expr(index, symtab);
            code.extend(code3);
            code.push(Instr::Xload(addr1, addr3, temp));
        } else {
            code.extend(code1);
            code.push(self.read_instr(tid1, addr1));
        }
        code
    }

    fn read_instr(&self, ty: TypeId, dst: Operand) -> Instr {
        if self.types.is_integer(ty) || self.types.is_boolean(ty) {
            Instr::Readi(dst)
        } else if self.types.is_float(ty) {
            Instr::Readf(dst)
        } else {
            Instr::Readc(dst)
        }
    }

    fn compile_write(&mut self, arg: &WriteArg, symtab: &SymTable) -> InstructionList {
        match arg {
            WriteArg::Expr(expr) => {
                let (addr1, code1) = self.compile_expr(expr, symtab);
                let tid1 = self.ty(expr.id());
                let mut code = code1;
                if self.types.is_character(tid1) {
                    code.push(Instr::Writec(addr1));
                } else if self.types.is_float(tid1) {
                    code.push(Instr::Writef(addr1));
                } else {
                    code.push(Instr::Writei(addr1));
                }
                code
            }
            WriteArg::Str(text, _) => {
                let mut code = InstructionList::new();
                code.push(Instr::Writes(Operand::Str(text.clone())));
                code
            }
        }
    }

    fn compile_return(&mut self, value: Option<&Expr>, symtab: &SymTable) -> InstructionList {
        let mut code = InstructionList::new();
        if let Some(expr) = value {
            let (addr1, code1) = self.compile_expr(expr, symtab);
            code.extend(code1);
            let t2 = self.current_return;
            let t = self.ty(expr.id());
            let result = Operand::Var("_result".to_string());
            if self.types.is_integer(t2) || self.types.is_boolean(t2) {
                code.push(Instr::Iload(result, addr1));
            } else if self.types.is_character(t2) {
                code.push(Instr::Chload(result, addr1));
            } else if self.types.is_integer(t) {
                let temp = self.new_temp();
                code.push(Instr::Float(temp.clone(), addr1));
                code.push(Instr::Fload(result, temp));
            } else {
                code.push(Instr::Fload(result, addr1));
            }
        }
        code.push(Instr::Return);
        code
    }

    /// Shared by the statement form `f(args);` and the expression form
    /// `f(args)`: pushes the reserved result slot and every argument,
    /// emits `CALL`, and pops each argument slot. The caller is
    /// responsible for the final `POP` (discarded for a statement,
    /// captured into a temp for an expression).
    fn compile_call_args(&mut self, ident: &Ident, args: &[Expr], symtab: &SymTable) -> InstructionList {
        let mut code = InstructionList::new();
        code.push(Instr::Push(Operand::Empty));

        if !args.is_empty() {
            let callee_ty = self.ty(ident.id);
            let params: Vec<TypeId> = self.types.func_params(callee_ty).unwrap().to_vec();
            for (arg, &param_ty) in args.iter().zip(params.iter()) {
                let (addr, arg_code) = self.compile_expr(arg, symtab);
                code.extend(arg_code);
                let arg_ty = self.ty(arg.id());
                if self.types.is_float(param_ty) && self.types.is_integer(arg_ty) {
                    let temp = self.new_temp();
                    code.push(Instr::Float(temp.clone(), addr));
                    code.push(Instr::Push(temp));
                } else if self.types.is_array(param_ty) {
                    let name = match arg {
                        Expr::Ident(ident) => ident.name.clone(),
                        _ => unreachable!("array-typed arguments are always bare identifiers"),
                    };
                    let temp = self.new_temp();
                    if symtab.is_parameter_class(&name) {
                        code.push(Instr::Load(temp.clone(), addr));
                    } else {
                        code.push(Instr::Aload(temp.clone(), addr));
                    }
                    code.push(Instr::Push(temp));
                } else {
                    code.push(Instr::Push(addr));
                }
            }
        }

        code.push(Instr::Call(ident.name.clone()));
        for _ in args {
            code.push(Instr::Pop(Operand::Empty));
        }
        code
    }

    /// Materialises a bare identifier: an array-typed parameter holds a
    /// base address already, so loading it into a fresh temp lets later
    /// indexed accesses use that temp uniformly with local arrays, whose
    /// bare name already *is* the base address (`spec.md` §4.5, final
    /// paragraph).
    fn compile_ident(&mut self, ident: &Ident, symtab: &SymTable) -> (Operand, InstructionList) {
        let ty = self.ty(ident.id);
        if symtab.is_parameter_class(&ident.name) && self.types.is_array(ty) {
            let temp = self.new_temp();
            let mut code = InstructionList::new();
            code.push(Instr::Load(temp.clone(), Operand::Var(ident.name.clone())));
            (temp, code)
        } else {
            (Operand::Var(ident.name.clone()), InstructionList::new())
        }
    }

    fn widen_to_float(&mut self, addr: Operand, already_float: bool, code: &mut InstructionList) -> Operand {
        if already_float {
            addr
        } else {
            let temp = self.new_temp();
            code.push(Instr::Float(temp.clone(), addr));
            temp
        }
    }

    fn compile_expr(&mut self, expr: &Expr, symtab: &SymTable) -> (Operand, InstructionList) {
        match expr {
            Expr::IntLit(_, v, _) => {
                let temp = self.new_temp();
                let mut code = InstructionList::new();
                code.push(Instr::Iload(temp.clone(), Operand::Int(*v)));
                (temp, code)
            }
            Expr::FloatLit(_, v, _) => {
                let temp = self.new_temp();
                let mut code = InstructionList::new();
                code.push(Instr::Fload(temp.clone(), Operand::Float(*v)));
                (temp, code)
            }
            Expr::CharLit(_, c, _) => {
                let temp = self.new_temp();
                let mut code = InstructionList::new();
                code.push(Instr::Load(temp.clone(), Operand::Char(*c)));
                (temp, code)
            }
            Expr::BoolLit(_, b, _) => {
                let temp = self.new_temp();
                let mut code = InstructionList::new();
                code.push(Instr::Iload(temp.clone(), Operand::Int(if *b { 1 } else { 0 })));
                (temp, code)
            }
            Expr::Ident(ident) => self.compile_ident(ident, symtab),
            Expr::ArrayAccess { base, index, .. } => {
                let (addr1, code1) = self.compile_ident(base, symtab);
                let (addr2, code2) = self.compile_expr(index, symtab);
                let temp = self.new_temp();
                let mut code = InstructionList::new();
                code.extend(code1);
                code.extend(code2);
                code.push(Instr::Loadx(temp.clone(), addr1, addr2));
                (temp, code)
            }
            Expr::Unary { op, operand, .. } => self.compile_unary(*op, operand, symtab),
            Expr::Arithmetic { op, lhs, rhs, id, .. } => self.compile_arithmetic(*op, lhs, rhs, *id, symtab),
            Expr::Relational { op, lhs, rhs, .. } => self.compile_relational(*op, lhs, rhs, symtab),
            Expr::Logical { op, lhs, rhs, .. } => {
                let (addr1, code1) = self.compile_expr(lhs, symtab);
                let (addr2, code2) = self.compile_expr(rhs, symtab);
                let temp = self.new_temp();
                let mut code = InstructionList::new();
                code.extend(code1);
                code.extend(code2);
                use asl_parser::ast::LogicOp;
                code.push(match op {
                    LogicOp::And => Instr::And(temp.clone(), addr1, addr2),
                    LogicOp::Or => Instr::Or(temp.clone(), addr1, addr2),
                });
                (temp, code)
            }
            Expr::Paren { inner, .. } => self.compile_expr(inner, symtab),
            Expr::Call { ident, args, .. } => {
                let mut code = self.compile_call_args(ident, args, symtab);
                let temp = self.new_temp();
                code.push(Instr::Pop(temp.clone()));
                (temp, code)
            }
        }
    }

    fn compile_unary(&mut self, op: asl_parser::ast::UnaryOp, operand: &Expr, symtab: &SymTable) -> (Operand, InstructionList) {
        use asl_parser::ast::UnaryOp;
        let (addr, mut code) = self.compile_expr(operand, symtab);
        let temp = self.new_temp();
        match op {
            UnaryOp::Not => code.push(Instr::Not(temp.clone(), addr)),
            UnaryOp::Neg => {
                let ty = self.ty(operand.id());
                if self.types.is_float(ty) {
                    code.push(Instr::Fneg(temp.clone(), addr));
                } else {
                    code.push(Instr::Neg(temp.clone(), addr));
                }
            }
            UnaryOp::Plus => {
                let ty = self.ty(operand.id());
                let zero = self.new_temp();
                if self.types.is_float(ty) {
                    code.push(Instr::Fload(zero.clone(), Operand::Float(0.0)));
                    code.push(Instr::Fadd(temp.clone(), zero, addr));
                } else {
                    code.push(Instr::Iload(zero.clone(), Operand::Int(0)));
                    code.push(Instr::Add(temp.clone(), zero, addr));
                }
            }
        }
        (temp, code)
    }

    fn compile_arithmetic(
        &mut self,
        op: ArithOp,
        lhs: &Expr,
        rhs: &Expr,
        result_id: asl_parser::ast::NodeId,
        symtab: &SymTable,
    ) -> (Operand, InstructionList) {
        let (addr1, code1) = self.compile_expr(lhs, symtab);
        let (addr2, code2) = self.compile_expr(rhs, symtab);
        let mut code = InstructionList::new();
        code.extend(code1);
        code.extend(code2);

        let t1 = self.ty(lhs.id());
        let t2 = self.ty(rhs.id());
        let t = self.ty(result_id);
        let temp = self.new_temp();

        if self.types.is_float(t) {
            let a = self.widen_to_float(addr1, self.types.is_float(t1), &mut code);
            let b = self.widen_to_float(addr2, self.types.is_float(t2), &mut code);
            match op {
                ArithOp::Add => code.push(Instr::Fadd(temp.clone(), a, b)),
                ArithOp::Sub => code.push(Instr::Fsub(temp.clone(), a, b)),
                ArithOp::Mul => code.push(Instr::Fmul(temp.clone(), a, b)),
                ArithOp::Div => code.push(Instr::Fdiv(temp.clone(), a, b)),
                ArithOp::Mod => {
                    let q = self.new_temp();
                    let m = self.new_temp();
                    code.push(Instr::Fdiv(q.clone(), a.clone(), b.clone()));
                    code.push(Instr::Fmul(m.clone(), q, b));
                    code.push(Instr::Fsub(temp.clone(), a, m));
                }
            }
        } else {
            match op {
                ArithOp::Add => code.push(Instr::Add(temp.clone(), addr1, addr2)),
                ArithOp::Sub => code.push(Instr::Sub(temp.clone(), addr1, addr2)),
                ArithOp::Mul => code.push(Instr::Mul(temp.clone(), addr1, addr2)),
                ArithOp::Div => code.push(Instr::Div(temp.clone(), addr1, addr2)),
                ArithOp::Mod => {
                    let q = self.new_temp();
                    let m = self.new_temp();
                    code.push(Instr::Div(q.clone(), addr1.clone(), addr2.clone()));
                    code.push(Instr::Mul(m.clone(), q, addr2));
                    code.push(Instr::Sub(temp.clone(), addr1, m));
                }
            }
        }
        (temp, code)
    }

    fn compile_relational(&mut self, op: RelOp, lhs: &Expr, rhs: &Expr, symtab: &SymTable) -> (Operand, InstructionList) {
        let (addr1, code1) = self.compile_expr(lhs, symtab);
        let (addr2, code2) = self.compile_expr(rhs, symtab);
        let mut code = InstructionList::new();
        code.extend(code1);
        code.extend(code2);

        let t1 = self.ty(lhs.id());
        let t2 = self.ty(rhs.id());
        let float = self.types.is_float(t1) || self.types.is_float(t2);
        let temp = self.new_temp();

        let widened = if float {
            let a = self.widen_to_float(addr1.clone(), self.types.is_float(t1), &mut code);
            let b = self.widen_to_float(addr2.clone(), self.types.is_float(t2), &mut code);
            Some((a, b))
        } else {
            None
        };

        match op {
            RelOp::Eq => match &widened {
                None => code.push(Instr::Eq(temp.clone(), addr1, addr2)),
                Some((a, b)) => code.push(Instr::Feq(temp.clone(), a.clone(), b.clone())),
            },
            RelOp::Neq => {
                match &widened {
                    None => code.push(Instr::Eq(temp.clone(), addr1, addr2)),
                    Some((a, b)) => code.push(Instr::Feq(temp.clone(), a.clone(), b.clone())),
                }
                code.push(Instr::Not(temp.clone(), temp.clone()));
            }
            RelOp::Lt => match &widened {
                None => code.push(Instr::Lt(temp.clone(), addr1, addr2)),
                Some((a, b)) => code.push(Instr::Flt(temp.clone(), a.clone(), b.clone())),
            },
            RelOp::Leq => match &widened {
                None => code.push(Instr::Le(temp.clone(), addr1, addr2)),
                Some((a, b)) => code.push(Instr::Fle(temp.clone(), a.clone(), b.clone())),
            },
            RelOp::Gt => match &widened {
                None => code.push(Instr::Lt(temp.clone(), addr2, addr1)),
                Some((a, b)) => code.push(Instr::Flt(temp.clone(), b.clone(), a.clone())),
            },
            RelOp::Geq => match &widened {
                None => code.push(Instr::Le(temp.clone(), addr2, addr1)),
                Some((a, b)) => code.push(Instr::Fle(temp.clone(), b.clone(), a.clone())),
            },
        }
        (temp, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Diagnostics;

    fn compile(src: &str) -> code::Program {
        let program = asl_parser::parse(src).expect("source should parse");
        let mut types = TypesMgr::new();
        let mut symtab = SymTable::new();
        let mut decoration = TreeDecoration::new();
        let mut diags = Diagnostics::new();
        crate::visitors::symbols::SymbolsVisitor::new(&mut types, &mut diags).run(&program, &mut symtab, &mut decoration);
        crate::visitors::typecheck::TypeCheckVisitor::new(&mut types, &mut diags).run(&program, &mut symtab, &mut decoration);
        assert!(diags.is_empty(), "fixture must type-check cleanly: {:?}", diags.to_lines());
        CodeGenVisitor::new(&types, &decoration).run(&program, &mut symtab)
    }

    #[test]
    fn hello_main_is_one_empty_subroutine_ending_in_return() {
        let program = compile("func main()\nendfunc");
        assert_eq!(program.subroutines.len(), 1);
        let main = &program.subroutines[0];
        assert_eq!(main.name, "main");
        assert!(main.params.is_empty());
        assert!(main.locals.is_empty());
        assert_eq!(main.code.0, vec![Instr::Return]);
    }

    #[test]
    fn integer_promotion_widens_before_adding() {
        let program = compile("func main()\nvar x: float;\nvar y: int;\nx := y + 1;\nendfunc");
        let text = program.subroutines[0].code.to_string();
        assert!(text.contains("FLOAT"));
        assert!(text.contains("ILOAD"));
        assert!(text.contains("FADD"));
        assert!(text.contains("LOAD "));
    }

    #[test]
    fn array_whole_copy_emits_a_counted_loop() {
        let program = compile("func main()\nvar a,b: array[4] of int;\na := b;\nendfunc");
        let text = program.subroutines[0].code.to_string();
        assert!(text.contains("ILOAD %"));
        assert!(text.contains("LT "));
        assert!(text.contains("LOADX"));
        assert!(text.contains("XLOAD"));
    }

    #[test]
    fn write_string_emits_a_single_writes() {
        let program = compile("func main()\nwrite \"hi\\n\";\nendfunc");
        let instrs = &program.subroutines[0].code.0;
        assert!(instrs
            .iter()
            .any(|i| matches!(i, Instr::Writes(Operand::Str(s)) if s == "\"hi\\n\"")));
    }

    #[test]
    fn not_equal_is_lowered_to_eq_then_not() {
        let program = compile("func main()\nvar x: int;\nvar y: bool;\ny := x != x;\nendfunc");
        let text = program.subroutines[0].code.to_string();
        assert!(text.contains("EQ "));
        assert!(text.contains("NOT "));
    }

    #[test]
    fn function_with_return_type_gets_a_synthetic_result_parameter() {
        let program = compile("func f(): int\nreturn 1;\nendfunc\nfunc main()\nendfunc");
        let f = program.subroutines.iter().find(|s| s.name == "f").unwrap();
        assert_eq!(f.params[0].name, "_result");
    }
}
