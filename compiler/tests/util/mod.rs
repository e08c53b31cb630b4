//! Shared AST construction helpers for the flow checker tests
//!
//! Lexing and parsing live outside this crate, so the tests build resolved
//! ASTs directly: every variable access carries its `VarId` and every call
//! site its candidate declarations, as name resolution would have left them.

#![allow(dead_code)]

use veld::ast::*;
use veld::check::TypeCheckResult;
use veld::common::{DeclId, NodeId, Path, Span, VarId};

/// Hands out node and variable ids, mimicking the upstream resolver
pub struct Builder {
    next: u32,
}

impl Builder {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    fn id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    pub fn var(&mut self) -> VarId {
        let id = VarId(self.next);
        self.next += 1;
        id
    }

    pub fn expr(&mut self, kind: ExprKind) -> Expr {
        Expr {
            id: self.id(),
            span: Span::dummy(),
            kind,
        }
    }

    // ---- expressions ----

    pub fn int(&mut self, value: i64) -> Expr {
        self.expr(ExprKind::Constant(Value::Int(value)))
    }

    pub fn boolean(&mut self, value: bool) -> Expr {
        self.expr(ExprKind::Constant(Value::Bool(value)))
    }

    pub fn null(&mut self) -> Expr {
        self.expr(ExprKind::Constant(Value::Null))
    }

    pub fn string(&mut self, value: &str) -> Expr {
        self.expr(ExprKind::Constant(Value::Utf8(value.to_string())))
    }

    pub fn access(&mut self, var: VarId, name: &str) -> Expr {
        self.expr(ExprKind::VariableAccess {
            var,
            name: name.to_string(),
        })
    }

    pub fn is_type(&mut self, operand: Expr, test: Type) -> Expr {
        self.expr(ExprKind::Is {
            operand: Box::new(operand),
            test,
        })
    }

    pub fn not(&mut self, operand: Expr) -> Expr {
        self.expr(ExprKind::LogicalNot(Box::new(operand)))
    }

    pub fn and(&mut self, operands: Vec<Expr>) -> Expr {
        self.expr(ExprKind::LogicalAnd(operands))
    }

    pub fn or(&mut self, operands: Vec<Expr>) -> Expr {
        self.expr(ExprKind::LogicalOr(operands))
    }

    pub fn add(&mut self, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::IntegerAddition(Box::new(lhs), Box::new(rhs)))
    }

    pub fn lt(&mut self, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::IntegerLessThan(Box::new(lhs), Box::new(rhs)))
    }

    pub fn gt(&mut self, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::IntegerGreaterThan(Box::new(lhs), Box::new(rhs)))
    }

    pub fn record_access(&mut self, operand: Expr, field: &str) -> Expr {
        self.expr(ExprKind::RecordAccess {
            operand: Box::new(operand),
            field: field.to_string(),
            borrow: false,
        })
    }

    pub fn array_access(&mut self, source: Expr, index: Expr) -> Expr {
        self.expr(ExprKind::ArrayAccess {
            source: Box::new(source),
            index: Box::new(index),
            borrow: false,
        })
    }

    pub fn array(&mut self, elements: Vec<Expr>) -> Expr {
        self.expr(ExprKind::ArrayInitialiser(elements))
    }

    pub fn invoke(&mut self, name: &str, candidates: Vec<DeclId>, arguments: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Invoke(InvokeExpr {
            name: Path::simple(name),
            candidates,
            arguments,
        }))
    }

    pub fn indirect_invoke(&mut self, source: Expr, arguments: Vec<Expr>) -> Expr {
        self.expr(ExprKind::IndirectInvoke {
            source: Box::new(source),
            arguments,
        })
    }

    pub fn quantifier(
        &mut self,
        kind: QuantifierKind,
        parameters: Vec<VariableDecl>,
        body: Expr,
    ) -> Expr {
        self.expr(ExprKind::Quantifier {
            kind,
            parameters,
            body: Box::new(body),
        })
    }

    // ---- declarations ----

    pub fn param(&mut self, var: VarId, name: &str, ty: Type) -> VariableDecl {
        VariableDecl {
            id: self.id(),
            var,
            name: name.to_string(),
            ty,
            initialiser: None,
            span: Span::dummy(),
        }
    }

    pub fn local(&mut self, var: VarId, name: &str, ty: Type, initialiser: Option<Expr>) -> Stmt {
        Stmt::VariableDecl(VariableDecl {
            id: self.id(),
            var,
            name: name.to_string(),
            ty,
            initialiser,
            span: Span::dummy(),
        })
    }

    pub fn function(
        &mut self,
        name: &str,
        parameters: Vec<VariableDecl>,
        returns: Vec<VariableDecl>,
        body: Vec<Stmt>,
    ) -> Decl {
        Decl::FunctionOrMethod(FunctionOrMethodDecl {
            id: self.id(),
            kind: CallableKind::Function,
            name: Path::simple(name),
            modifiers: Modifiers::default(),
            lifetimes: Vec::new(),
            parameters,
            returns,
            requires: Vec::new(),
            ensures: Vec::new(),
            body: Block::new(body),
            span: Span::dummy(),
        })
    }

    pub fn type_alias(&mut self, name: &str, underlying: Type) -> Decl {
        let var = self.var();
        Decl::Type(TypeDecl {
            id: self.id(),
            name: Path::simple(name),
            var: VariableDecl {
                id: self.id(),
                var,
                name: "$".to_string(),
                ty: underlying,
                initialiser: None,
                span: Span::dummy(),
            },
            invariant: Vec::new(),
            span: Span::dummy(),
        })
    }

    /// A refinement-bearing type declaration, e.g. `type nat is (int n)
    /// where n >= 0`
    pub fn refined_type(&mut self, name: &str, underlying: Type) -> Decl {
        let var = self.var();
        let binder = self.access(var, "n");
        let zero = self.int(0);
        let invariant = self.expr(ExprKind::IntegerGreaterEqual(
            Box::new(binder),
            Box::new(zero),
        ));
        Decl::Type(TypeDecl {
            id: self.id(),
            name: Path::simple(name),
            var: VariableDecl {
                id: self.id(),
                var,
                name: "n".to_string(),
                ty: underlying,
                initialiser: None,
                span: Span::dummy(),
            },
            invariant: vec![invariant],
            span: Span::dummy(),
        })
    }

    // ---- statements ----

    pub fn ret(&mut self, operands: Vec<Expr>) -> Stmt {
        Stmt::Return(ReturnStmt {
            id: self.id(),
            operands,
            span: Span::dummy(),
        })
    }

    pub fn if_else(&mut self, condition: Expr, yes: Vec<Stmt>, no: Option<Vec<Stmt>>) -> Stmt {
        Stmt::IfElse(IfElseStmt {
            id: self.id(),
            condition,
            true_branch: Block::new(yes),
            false_branch: no.map(Block::new),
            span: Span::dummy(),
        })
    }

    pub fn while_loop(&mut self, condition: Expr, body: Vec<Stmt>) -> Stmt {
        Stmt::While(WhileStmt {
            id: self.id(),
            condition,
            invariant: Vec::new(),
            body: Block::new(body),
            span: Span::dummy(),
        })
    }

    pub fn assign(&mut self, lhs: Vec<Expr>, rhs: Vec<Expr>) -> Stmt {
        Stmt::Assign(AssignStmt {
            id: self.id(),
            lhs,
            rhs,
            span: Span::dummy(),
        })
    }

    pub fn assign1(&mut self, lhs: Expr, rhs: Expr) -> Stmt {
        self.assign(vec![lhs], vec![rhs])
    }

    pub fn skip(&mut self) -> Stmt {
        Stmt::Skip(BareStmt {
            id: self.id(),
            span: Span::dummy(),
        })
    }

    pub fn assert_stmt(&mut self, condition: Expr) -> Stmt {
        Stmt::Assert(ConditionStmt {
            id: self.id(),
            condition,
            span: Span::dummy(),
        })
    }

    pub fn debug_stmt(&mut self, operand: Expr) -> Stmt {
        Stmt::Debug(DebugStmt {
            id: self.id(),
            operand,
            span: Span::dummy(),
        })
    }

    pub fn switch(&mut self, condition: Expr, cases: Vec<SwitchCase>) -> Stmt {
        Stmt::Switch(SwitchStmt {
            id: self.id(),
            condition,
            cases,
            span: Span::dummy(),
        })
    }
}

/// Common shorthand for `int|null`
pub fn int_or_null() -> Type {
    Type::union(vec![Type::Int, Type::Null])
}

/// Assemble a module whose roots are the given declarations, in order
pub fn module(declarations: Vec<Decl>) -> Module {
    let roots = (0..declarations.len() as u32).map(DeclId).collect();
    Module {
        declarations,
        roots,
    }
}

/// Check a module built from the given declarations
pub fn check(declarations: Vec<Decl>) -> TypeCheckResult {
    veld::check(&module(declarations))
}

/// The error codes reported, in order
pub fn codes(result: &TypeCheckResult) -> Vec<&'static str> {
    result.errors.iter().map(|e| e.code()).collect()
}

/// Assert a result is clean
pub fn assert_ok(result: &TypeCheckResult) {
    assert!(
        result.ok && result.internal.is_empty(),
        "expected clean check, got errors {:?} internal {:?}",
        codes(result),
        result.internal,
    );
}
