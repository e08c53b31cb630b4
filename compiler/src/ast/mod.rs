//! Abstract Syntax Tree for the Veld language
//!
//! This module defines the AST consumed by the flow type checker. Name
//! resolution has already happened: variable accesses carry a [`VarId`],
//! nominal types and call sites carry [`DeclId`] links into the module's
//! declaration table.

use crate::common::{DeclId, NodeId, Path, Span, VarId};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== MODULE ====================

/// A resolved compilation unit.
///
/// Declarations live in a flat arena indexed by [`DeclId`]; `roots` gives the
/// top-level checking order (unit declarations reference their members by id).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    pub declarations: Vec<Decl>,
    pub roots: Vec<DeclId>,
}

impl Module {
    pub fn declaration(&self, id: DeclId) -> &Decl {
        &self.declarations[id.index()]
    }

    /// The type declaration behind a nominal link, if the link points at one.
    pub fn type_decl(&self, id: DeclId) -> Option<&TypeDecl> {
        match self.declaration(id) {
            Decl::Type(decl) => Some(decl),
            _ => None,
        }
    }

    /// The signature of a callable declaration (function, method or property).
    pub fn callable_signature(&self, id: DeclId) -> Option<Signature> {
        match self.declaration(id) {
            Decl::FunctionOrMethod(decl) => Some(decl.signature()),
            Decl::Property(decl) => Some(decl.signature()),
            _ => None,
        }
    }

    /// The declared type of a static variable.
    pub fn static_type(&self, id: DeclId) -> Option<&Type> {
        match self.declaration(id) {
            Decl::StaticVariable(decl) => Some(&decl.ty),
            _ => None,
        }
    }
}

// ==================== DECLARATIONS ====================

/// Top-level declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decl {
    Unit(UnitDecl),
    Import(ImportDecl),
    StaticVariable(StaticVariableDecl),
    Type(TypeDecl),
    FunctionOrMethod(FunctionOrMethodDecl),
    Property(PropertyDecl),
}

/// A nested unit of declarations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDecl {
    pub id: NodeId,
    pub name: Path,
    pub members: Vec<DeclId>,
    pub span: Span,
}

/// An import; carries no checkable content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDecl {
    pub id: NodeId,
    pub name: Path,
    pub span: Span,
}

/// Static variable declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticVariableDecl {
    pub id: NodeId,
    pub name: Path,
    pub ty: Type,
    pub initialiser: Option<Expr>,
    pub span: Span,
}

/// Named type declaration, e.g. `type nat is (int n) where n >= 0`
///
/// The binder variable carries the underlying type; `invariant` holds the
/// `where` clauses over it. A non-empty invariant makes the nominal
/// refinement-bearing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub id: NodeId,
    pub name: Path,
    pub var: VariableDecl,
    pub invariant: Vec<Expr>,
    pub span: Span,
}

impl TypeDecl {
    pub fn underlying(&self) -> &Type {
        &self.var.ty
    }

    pub fn has_invariant(&self) -> bool {
        !self.invariant.is_empty()
    }
}

/// Declaration modifiers
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub native: bool,
    pub exported: bool,
}

/// Function or method declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionOrMethodDecl {
    pub id: NodeId,
    pub kind: CallableKind,
    pub name: Path,
    pub modifiers: Modifiers,
    /// Lifetime parameters declared by a method
    pub lifetimes: Vec<String>,
    pub parameters: Vec<VariableDecl>,
    pub returns: Vec<VariableDecl>,
    pub requires: Vec<Expr>,
    pub ensures: Vec<Expr>,
    pub body: Block,
    pub span: Span,
}

impl FunctionOrMethodDecl {
    pub fn signature(&self) -> Signature {
        Signature {
            kind: self.kind,
            lifetimes: self.lifetimes.clone(),
            parameters: self.parameters.iter().map(|p| p.ty.clone()).collect(),
            returns: self.returns.iter().map(|r| r.ty.clone()).collect(),
        }
    }
}

/// Property declaration (a pure named predicate)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub id: NodeId,
    pub name: Path,
    pub parameters: Vec<VariableDecl>,
    pub returns: Vec<VariableDecl>,
    pub invariant: Vec<Expr>,
    pub span: Span,
}

impl PropertyDecl {
    pub fn signature(&self) -> Signature {
        Signature {
            kind: CallableKind::Function,
            lifetimes: Vec::new(),
            parameters: self.parameters.iter().map(|p| p.ty.clone()).collect(),
            returns: self.returns.iter().map(|r| r.ty.clone()).collect(),
        }
    }
}

/// Variable declaration (parameter, return, local or quantifier binder)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDecl {
    pub id: NodeId,
    pub var: VarId,
    pub name: String,
    pub ty: Type,
    pub initialiser: Option<Expr>,
    pub span: Span,
}

// ==================== STATEMENTS ====================

/// A block of statements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

/// Statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    VariableDecl(VariableDecl),
    Assign(AssignStmt),
    Return(ReturnStmt),
    IfElse(IfElseStmt),
    NamedBlock(NamedBlockStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    Switch(SwitchStmt),
    Break(BareStmt),
    Continue(BareStmt),
    Assert(ConditionStmt),
    Assume(ConditionStmt),
    Fail(BareStmt),
    Debug(DebugStmt),
    Skip(BareStmt),
    /// An invocation in statement position
    Expr(Expr),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::VariableDecl(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::IfElse(s) => s.span,
            Stmt::NamedBlock(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::Break(s) | Stmt::Continue(s) | Stmt::Fail(s) | Stmt::Skip(s) => s.span,
            Stmt::Assert(s) | Stmt::Assume(s) => s.span,
            Stmt::Debug(s) => s.span,
            Stmt::Expr(e) => e.span,
        }
    }
}

/// Multiple assignment, e.g. `x, y = f()`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignStmt {
    pub id: NodeId,
    pub lhs: Vec<Expr>,
    pub rhs: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnStmt {
    pub id: NodeId,
    pub operands: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfElseStmt {
    pub id: NodeId,
    pub condition: Expr,
    pub true_branch: Block,
    pub false_branch: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedBlockStmt {
    pub id: NodeId,
    pub name: String,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhileStmt {
    pub id: NodeId,
    pub condition: Expr,
    pub invariant: Vec<Expr>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoWhileStmt {
    pub id: NodeId,
    pub body: Block,
    pub invariant: Vec<Expr>,
    pub condition: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchStmt {
    pub id: NodeId,
    pub condition: Expr,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

/// One switch arm; an empty condition list marks the default case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCase {
    pub conditions: Vec<Expr>,
    pub block: Block,
}

impl SwitchCase {
    pub fn is_default(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Break, continue, fail or skip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BareStmt {
    pub id: NodeId,
    pub span: Span,
}

/// Assert or assume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionStmt {
    pub id: NodeId,
    pub condition: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugStmt {
    pub id: NodeId,
    pub operand: Expr,
    pub span: Span,
}

// ==================== EXPRESSIONS ====================

/// Expression node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

/// Expression kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    Constant(Value),
    VariableAccess {
        var: VarId,
        name: String,
    },
    StaticVariableAccess {
        name: Path,
        link: Option<DeclId>,
    },
    Cast {
        ty: Type,
        operand: Box<Expr>,
    },
    Invoke(InvokeExpr),
    IndirectInvoke {
        source: Box<Expr>,
        arguments: Vec<Expr>,
    },

    // Logical connectives
    LogicalNot(Box<Expr>),
    LogicalAnd(Vec<Expr>),
    LogicalOr(Vec<Expr>),
    LogicalIff(Box<Expr>, Box<Expr>),
    LogicalImplication(Box<Expr>, Box<Expr>),
    Is {
        operand: Box<Expr>,
        test: Type,
    },
    Quantifier {
        kind: QuantifierKind,
        parameters: Vec<VariableDecl>,
        body: Box<Expr>,
    },

    // Comparators
    Equal(Box<Expr>, Box<Expr>),
    NotEqual(Box<Expr>, Box<Expr>),
    IntegerLessThan(Box<Expr>, Box<Expr>),
    IntegerLessEqual(Box<Expr>, Box<Expr>),
    IntegerGreaterThan(Box<Expr>, Box<Expr>),
    IntegerGreaterEqual(Box<Expr>, Box<Expr>),

    // Arithmetic
    IntegerNegation(Box<Expr>),
    IntegerAddition(Box<Expr>, Box<Expr>),
    IntegerSubtraction(Box<Expr>, Box<Expr>),
    IntegerMultiplication(Box<Expr>, Box<Expr>),
    IntegerDivision(Box<Expr>, Box<Expr>),
    IntegerRemainder(Box<Expr>, Box<Expr>),

    // Bitwise
    BitwiseNot(Box<Expr>),
    BitwiseAnd(Vec<Expr>),
    BitwiseOr(Vec<Expr>),
    BitwiseXor(Vec<Expr>),
    BitwiseShiftLeft(Box<Expr>, Box<Expr>),
    BitwiseShiftRight(Box<Expr>, Box<Expr>),

    // Records
    RecordInitialiser {
        fields: Vec<(String, Expr)>,
    },
    RecordAccess {
        operand: Box<Expr>,
        field: String,
        borrow: bool,
    },
    RecordUpdate {
        operand: Box<Expr>,
        field: String,
        value: Box<Expr>,
    },

    // Arrays
    ArrayLength(Box<Expr>),
    ArrayInitialiser(Vec<Expr>),
    ArrayGenerator {
        value: Box<Expr>,
        length: Box<Expr>,
    },
    ArrayAccess {
        source: Box<Expr>,
        index: Box<Expr>,
        borrow: bool,
    },
    ArrayRange {
        start: Box<Expr>,
        end: Box<Expr>,
    },
    ArrayUpdate {
        source: Box<Expr>,
        index: Box<Expr>,
        value: Box<Expr>,
    },

    // References
    Dereference(Box<Expr>),
    New {
        operand: Box<Expr>,
        lifetime: Option<String>,
    },

    // Lambdas
    LambdaAccess {
        name: Path,
        candidates: Vec<DeclId>,
        parameter_types: Vec<Type>,
    },
    Lambda(LambdaExpr),
}

/// Direct invocation against a resolved candidate set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeExpr {
    pub name: Path,
    pub candidates: Vec<DeclId>,
    pub arguments: Vec<Expr>,
}

/// Anonymous lambda declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LambdaExpr {
    pub parameters: Vec<VariableDecl>,
    pub lifetimes: Vec<String>,
    pub body: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantifierKind {
    Universal,
    Existential,
}

/// Constant value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(u8),
    Int(i64),
    Char(char),
    Utf8(String),
}

// ==================== TYPES ====================

/// Concrete (surface) type, as written in source.
///
/// Unlike the semantic algebra this contains no intersections, differences
/// or negations; those only arise inside the checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Void,
    Any,
    Null,
    Bool,
    Byte,
    Int,
    Nominal {
        name: Path,
        decl: DeclId,
    },
    Array(Box<Type>),
    Reference {
        element: Box<Type>,
        lifetime: Option<String>,
    },
    Record {
        open: bool,
        fields: Vec<(String, Type)>,
    },
    Callable(Signature),
    Union(Vec<Type>),
}

impl Type {
    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    pub fn union(members: Vec<Type>) -> Type {
        match members.len() {
            0 => Type::Void,
            1 => members.into_iter().next().unwrap(),
            _ => Type::Union(members),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallableKind {
    Function,
    Method,
}

/// Callable signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub kind: CallableKind,
    pub lifetimes: Vec<String>,
    pub parameters: Vec<Type>,
    pub returns: Vec<Type>,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Any => write!(f, "any"),
            Type::Null => write!(f, "null"),
            Type::Bool => write!(f, "bool"),
            Type::Byte => write!(f, "byte"),
            Type::Int => write!(f, "int"),
            Type::Nominal { name, .. } => write!(f, "{}", name),
            Type::Array(element) => write!(f, "{}[]", Parenthesised(element)),
            Type::Reference { element, lifetime } => match lifetime {
                Some(l) => write!(f, "&{}:{}", l, Parenthesised(element)),
                None => write!(f, "&{}", Parenthesised(element)),
            },
            Type::Record { open, fields } => {
                write!(f, "{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", ty, name)?;
                }
                if *open {
                    write!(f, ", ...")?;
                }
                write!(f, "}}")
            }
            Type::Callable(sig) => write!(f, "{}", sig),
            Type::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", Parenthesised(member))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.kind {
            CallableKind::Function => "function",
            CallableKind::Method => "method",
        };
        write!(f, "{}(", keyword)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ")->(")?;
        for (i, r) in self.returns.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", r)?;
        }
        write!(f, ")")
    }
}

/// Wraps compound types in parentheses where precedence demands it
struct Parenthesised<'a>(&'a Type);

impl fmt::Display for Parenthesised<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Type::Union(_) => write!(f, "({})", self.0),
            _ => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        assert_eq!(Type::Int.to_string(), "int");
        assert_eq!(Type::array(Type::Int).to_string(), "int[]");
        assert_eq!(
            Type::union(vec![Type::Int, Type::Null]).to_string(),
            "int|null"
        );
        assert_eq!(
            Type::array(Type::union(vec![Type::Int, Type::Null])).to_string(),
            "(int|null)[]"
        );
        let rec = Type::Record {
            open: false,
            fields: vec![("f".to_string(), Type::Int)],
        };
        assert_eq!(rec.to_string(), "{int f}");
    }

    #[test]
    fn test_union_collapse() {
        assert_eq!(Type::union(vec![]), Type::Void);
        assert_eq!(Type::union(vec![Type::Bool]), Type::Bool);
    }
}
