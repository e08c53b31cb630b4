//! Flow-sensitive type checker
//!
//! Propagates type information from declared parameter and return types
//! through statements and expressions, distinguishing a variable's
//! *declared* type from its *known* type at each program point. Type tests
//! in conditions refine the known type along each branch, branches join by
//! unioning environments, and every structural question is delegated to the
//! semantic subtype operator.
//!
//! Checking is fail-soft: user errors are accumulated and checking carries
//! on, with failed subexpressions yielding no type and silencing dependent
//! checks. Internal inconsistencies abort the current declaration only.

pub mod env;
pub mod scope;

use crate::ast::*;
use crate::common::{DeclId, NodeId, Span, VarId};
use crate::diagnostics::{InternalError, TypeError};
use crate::types::extract::{ConcreteTypeExtractor, ReadWriteExtractor};
use crate::types::infer::{CallBinding, CallableResolver};
use crate::types::semantic::{
    ArrayType, RecordType, ReferenceType, SemanticSignature, SemanticType,
};
use crate::types::subtype::SubtypeOperator;
use env::Environment;
use rustc_hash::{FxHashMap, FxHashSet};
use scope::Scope;

type Checked<T> = Result<T, InternalError>;

/// Inferred information recorded against AST nodes
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    /// Concrete type of each expression
    pub types: FxHashMap<NodeId, Type>,
    /// Declared (assignable) type of each l-value
    pub lvals: FxHashMap<NodeId, Type>,
    /// Resolved callable per invocation and lambda access
    pub bindings: FxHashMap<NodeId, CallBinding>,
    /// Inferred signature per lambda declaration
    pub lambdas: FxHashMap<NodeId, Signature>,
    /// Variables modified by each loop body
    pub modified: FxHashMap<NodeId, Vec<VarId>>,
}

/// The outcome of checking a module
#[derive(Debug, Default)]
pub struct TypeCheckResult {
    pub ok: bool,
    pub errors: Vec<TypeError>,
    pub internal: Vec<InternalError>,
    pub annotations: Annotations,
}

/// Type check a module
pub fn check(module: &Module) -> TypeCheckResult {
    let mut checker = FlowTypeCheck::new(module);
    checker.check_module();
    checker.into_result()
}

/// Flow type checker state
pub struct FlowTypeCheck<'m> {
    module: &'m Module,
    /// User-facing subtyping; refinement invariants are seen through
    relaxed: SubtypeOperator<'m>,
    /// Dead-branch detection; refinement invariants stay opaque
    strict: SubtypeOperator<'m>,
    concrete: ConcreteTypeExtractor<'m>,
    rw: ReadWriteExtractor<'m>,
    resolver: CallableResolver<'m>,
    /// Declared types of every variable seen so far
    vars: FxHashMap<VarId, Type>,
    errors: Vec<TypeError>,
    internal: Vec<InternalError>,
    annotations: Annotations,
    status: bool,
}

impl<'m> FlowTypeCheck<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self {
            module,
            relaxed: SubtypeOperator::relaxed(module),
            strict: SubtypeOperator::strict(module),
            concrete: ConcreteTypeExtractor::new(module),
            rw: ReadWriteExtractor::new(module),
            resolver: CallableResolver::new(module),
            vars: FxHashMap::default(),
            errors: Vec::new(),
            internal: Vec::new(),
            annotations: Annotations::default(),
            status: true,
        }
    }

    pub fn check_module(&mut self) {
        for &root in &self.module.roots {
            if let Err(failure) = self.check_declaration(root) {
                self.status = false;
                self.internal.push(failure);
            }
        }
    }

    pub fn into_result(self) -> TypeCheckResult {
        TypeCheckResult {
            ok: self.status,
            errors: self.errors,
            internal: self.internal,
            annotations: self.annotations,
        }
    }

    fn error(&mut self, error: TypeError) {
        self.status = false;
        self.errors.push(error);
    }

    // =====================================================================
    // Declarations
    // =====================================================================

    fn check_declaration(&mut self, id: DeclId) -> Checked<()> {
        match self.module.declaration(id) {
            Decl::Unit(decl) => {
                for &member in &decl.members {
                    self.check_declaration(member)?;
                }
                Ok(())
            }
            Decl::Import(_) => Ok(()),
            Decl::StaticVariable(decl) => self.check_static_variable(decl),
            Decl::Type(decl) => self.check_type_declaration(id, decl),
            Decl::FunctionOrMethod(decl) => self.check_function_or_method(decl),
            Decl::Property(decl) => self.check_property(decl),
        }
    }

    fn check_static_variable(&mut self, decl: &StaticVariableDecl) -> Checked<()> {
        let environment = Environment::new();
        self.check_type_non_empty(&decl.ty, &environment, decl.span);
        if let Some(initialiser) = &decl.initialiser {
            let ty = self.check_expression(initialiser, &environment)?;
            self.check_subtype_concrete(&decl.ty, ty.as_ref(), &environment, initialiser.span);
        }
        Ok(())
    }

    fn check_type_declaration(&mut self, id: DeclId, decl: &TypeDecl) -> Checked<()> {
        let environment = Environment::new();
        if !self.relaxed.is_contractive(id) {
            self.error(TypeError::EmptyType {
                ty: decl.name.to_string(),
                span: decl.span.into(),
            });
        }
        let environment = self.check_variable_declaration(&decl.var, environment)?;
        self.check_conditions(&decl.invariant, true, environment)?;
        Ok(())
    }

    fn check_function_or_method(&mut self, decl: &FunctionOrMethodDecl) -> Checked<()> {
        // The implicit `this` lifetime sits within every declared lifetime
        let mut environment = Environment::new().declare_within("this", &decl.lifetimes);
        for parameter in &decl.parameters {
            environment = self.check_variable_declaration(parameter, environment)?;
        }
        for ret in &decl.returns {
            environment = self.check_variable_declaration(ret, environment)?;
        }
        // Precondition and postcondition refinements stay local to the
        // clauses themselves
        self.check_conditions(&decl.requires, true, environment.clone())?;
        self.check_conditions(&decl.ensures, true, environment.clone())?;
        if !decl.modifiers.native {
            let scope = Scope::function_or_method(decl);
            let last = self.check_block(&decl.body, environment, &scope)?;
            self.check_return_value(decl, &last);
        }
        Ok(())
    }

    /// A non-native declaration with declared returns must not let control
    /// reach the end of its body.
    fn check_return_value(&mut self, decl: &FunctionOrMethodDecl, last: &Environment) {
        if !last.is_bottom() && !decl.returns.is_empty() {
            self.error(TypeError::MissingReturnStatement {
                name: decl.name.to_string(),
                span: decl.span.into(),
            });
        }
    }

    fn check_property(&mut self, decl: &PropertyDecl) -> Checked<()> {
        let mut environment = Environment::new();
        for parameter in &decl.parameters {
            environment = self.check_variable_declaration(parameter, environment)?;
        }
        for ret in &decl.returns {
            environment = self.check_variable_declaration(ret, environment)?;
        }
        self.check_conditions(&decl.invariant, true, environment)?;
        Ok(())
    }

    fn check_variable_declaration(
        &mut self,
        decl: &VariableDecl,
        environment: Environment,
    ) -> Checked<Environment> {
        self.vars.insert(decl.var, decl.ty.clone());
        self.check_type_non_empty(&decl.ty, &environment, decl.span);
        if let Some(initialiser) = &decl.initialiser {
            let ty = self.check_expression(initialiser, &environment)?;
            self.check_subtype_concrete(&decl.ty, ty.as_ref(), &environment, initialiser.span);
        }
        Ok(environment)
    }

    // =====================================================================
    // Blocks & statements
    // =====================================================================

    fn check_block(
        &mut self,
        block: &Block,
        mut environment: Environment,
        scope: &Scope<'_>,
    ) -> Checked<Environment> {
        for stmt in &block.stmts {
            environment = self.check_statement(stmt, environment, scope)?;
        }
        Ok(environment)
    }

    fn check_statement(
        &mut self,
        stmt: &Stmt,
        environment: Environment,
        scope: &Scope<'_>,
    ) -> Checked<Environment> {
        if environment.is_bottom() {
            self.error(TypeError::UnreachableCode {
                span: stmt.span().into(),
            });
            return Ok(environment);
        }
        match stmt {
            Stmt::VariableDecl(decl) => self.check_variable_declaration(decl, environment),
            Stmt::Assign(stmt) => self.check_assign(stmt, environment),
            Stmt::Return(stmt) => self.check_return(stmt, environment, scope),
            Stmt::IfElse(stmt) => self.check_if_else(stmt, environment, scope),
            Stmt::NamedBlock(stmt) => self.check_named_block(stmt, environment, scope),
            Stmt::While(stmt) => self.check_while(stmt, environment, scope),
            Stmt::DoWhile(stmt) => self.check_do_while(stmt, environment, scope),
            Stmt::Switch(stmt) => self.check_switch(stmt, environment, scope),
            // Break and continue exit with BOTTOM; their environments are
            // not yet threaded to the loop join.
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Fail(_) => Ok(Environment::bottom()),
            Stmt::Assert(stmt) | Stmt::Assume(stmt) => {
                self.check_condition(&stmt.condition, true, environment)
            }
            Stmt::Debug(stmt) => {
                let ty = self.check_expression(&stmt.operand, &environment)?;
                let ascii = SemanticType::array(SemanticType::Int);
                self.check_subtype(&ascii, ty.as_ref(), &environment, stmt.operand.span);
                Ok(environment)
            }
            Stmt::Skip(_) => Ok(environment),
            Stmt::Expr(expr) => {
                match &expr.kind {
                    ExprKind::Invoke(invoke) => {
                        self.check_invoke(expr, invoke, &environment)?;
                    }
                    ExprKind::IndirectInvoke { source, arguments } => {
                        self.check_indirect_invoke(expr, source, arguments, &environment)?;
                    }
                    _ => {
                        return Err(InternalError::new(
                            "unknown statement expression",
                            expr.span,
                        ));
                    }
                }
                Ok(environment)
            }
        }
    }

    fn check_assign(
        &mut self,
        stmt: &AssignStmt,
        environment: Environment,
    ) -> Checked<Environment> {
        let mut expected = Vec::with_capacity(stmt.lhs.len());
        for lval in &stmt.lhs {
            expected.push(self.check_lval(lval, &environment)?);
        }
        let components =
            self.check_multi_expressions(&stmt.rhs, &environment, &expected, stmt.span)?;
        // An assignment re-types its target from the declaration, clobbering
        // any refinement established by an earlier type test.
        let mut environment = environment;
        for (lval, component) in stmt.lhs.iter().zip(components) {
            if let ExprKind::VariableAccess { var, .. } = &lval.kind {
                let Some(declared) = self.vars.get(var) else {
                    continue;
                };
                let declared: SemanticType = declared.into();
                let known = match component {
                    Some(ty) => SemanticType::intersect(declared, ty),
                    None => declared,
                };
                environment = environment.refine(*var, known);
            }
        }
        Ok(environment)
    }

    fn check_return(
        &mut self,
        stmt: &ReturnStmt,
        environment: Environment,
        scope: &Scope<'_>,
    ) -> Checked<Environment> {
        let declaration = scope.enclosing_function();
        let expected: Vec<Option<Type>> = declaration
            .returns
            .iter()
            .map(|r| Some(r.ty.clone()))
            .collect();
        self.check_multi_expressions(&stmt.operands, &environment, &expected, stmt.span)?;
        Ok(Environment::bottom())
    }

    fn check_if_else(
        &mut self,
        stmt: &IfElseStmt,
        environment: Environment,
        scope: &Scope<'_>,
    ) -> Checked<Environment> {
        let true_environment =
            self.check_condition(&stmt.condition, true, environment.clone())?;
        let false_environment = self.check_condition(&stmt.condition, false, environment)?;
        let true_environment = self.check_block(&stmt.true_branch, true_environment, scope)?;
        let false_environment = match &stmt.false_branch {
            Some(block) => self.check_block(block, false_environment, scope)?,
            None => false_environment,
        };
        Ok(Environment::union(&true_environment, &false_environment))
    }

    fn check_named_block(
        &mut self,
        stmt: &NamedBlockStmt,
        environment: Environment,
        scope: &Scope<'_>,
    ) -> Checked<Environment> {
        let lifetimes = scope.declared_lifetimes();
        let environment = environment.declare_within(&stmt.name, &lifetimes);
        let inner = Scope::named_block(&stmt.name, scope);
        self.check_block(&stmt.body, environment, &inner)
    }

    fn check_while(
        &mut self,
        stmt: &WhileStmt,
        environment: Environment,
        scope: &Scope<'_>,
    ) -> Checked<Environment> {
        self.check_conditions(&stmt.invariant, true, environment.clone())?;
        // The body sees the condition assumed true; its refinements are
        // discarded rather than iterated to a fixed point. Control continues
        // with the condition assumed false.
        let true_environment =
            self.check_condition(&stmt.condition, true, environment.clone())?;
        let false_environment = self.check_condition(&stmt.condition, false, environment)?;
        self.check_block(&stmt.body, true_environment, scope)?;
        let modified = modified_variables(&stmt.body);
        self.annotations.modified.insert(stmt.id, modified);
        Ok(false_environment)
    }

    fn check_do_while(
        &mut self,
        stmt: &DoWhileStmt,
        environment: Environment,
        scope: &Scope<'_>,
    ) -> Checked<Environment> {
        let environment = self.check_block(&stmt.body, environment, scope)?;
        let modified = modified_variables(&stmt.body);
        self.annotations.modified.insert(stmt.id, modified);
        // A body that never completes leaves the loop exit unreachable
        if environment.is_bottom() {
            return Ok(environment);
        }
        self.check_conditions(&stmt.invariant, true, environment.clone())?;
        self.check_condition(&stmt.condition, false, environment)
    }

    fn check_switch(
        &mut self,
        stmt: &SwitchStmt,
        environment: Environment,
        scope: &Scope<'_>,
    ) -> Checked<Environment> {
        self.check_expression(&stmt.condition, &environment)?;
        let mut exit: Option<Environment> = None;
        let mut has_default = false;
        for case in &stmt.cases {
            for condition in &case.conditions {
                self.check_expression(condition, &environment)?;
            }
            let local = self.check_block(&case.block, environment.clone(), scope)?;
            exit = Some(match exit {
                Some(joined) => Environment::union(&joined, &local),
                None => local,
            });
            has_default |= case.is_default();
        }
        // Without a default, values can fall through the switch untouched
        match exit {
            Some(joined) if has_default => Ok(joined),
            Some(joined) => Ok(Environment::union(&joined, &environment)),
            None => Ok(environment),
        }
    }

    // =====================================================================
    // Conditions
    // =====================================================================

    fn check_conditions(
        &mut self,
        conditions: &[Expr],
        sign: bool,
        mut environment: Environment,
    ) -> Checked<Environment> {
        for condition in conditions {
            // Earlier clauses refine the later ones
            environment = self.check_condition(condition, sign, environment)?;
        }
        Ok(environment)
    }

    /// Check a condition under a sign indicating whether it is assumed to
    /// hold. Type tests refine the environment accordingly; logical
    /// negation flips the sign rather than rewriting the expression.
    fn check_condition(
        &mut self,
        condition: &Expr,
        sign: bool,
        environment: Environment,
    ) -> Checked<Environment> {
        match &condition.kind {
            ExprKind::LogicalNot(_)
            | ExprKind::LogicalAnd(_)
            | ExprKind::LogicalOr(_)
            | ExprKind::LogicalIff(..)
            | ExprKind::LogicalImplication(..)
            | ExprKind::Is { .. }
            | ExprKind::Quantifier { .. } => {
                self.annotations.types.insert(condition.id, Type::Bool);
            }
            _ => {}
        }
        match &condition.kind {
            ExprKind::LogicalNot(operand) => self.check_condition(operand, !sign, environment),
            ExprKind::LogicalAnd(operands) => {
                self.check_conjunction(operands, sign, environment)
            }
            ExprKind::LogicalOr(operands) => {
                self.check_disjunction(operands, sign, environment)
            }
            ExprKind::LogicalImplication(antecedent, consequent) => {
                self.check_implication(antecedent, consequent, sign, environment)
            }
            ExprKind::LogicalIff(lhs, rhs) => {
                // A conservative approximation: both operands share the sign
                let environment = self.check_condition(lhs, sign, environment)?;
                self.check_condition(rhs, sign, environment)
            }
            ExprKind::Is { operand, test } => {
                self.check_type_test(condition, operand, test, sign, environment)
            }
            ExprKind::Quantifier {
                parameters, body, ..
            } => self.check_quantifier(parameters, body, environment),
            _ => {
                let ty = self.check_expression(condition, &environment)?;
                self.check_subtype(&SemanticType::Bool, ty.as_ref(), &environment, condition.span);
                Ok(environment)
            }
        }
    }

    /// Under a positive sign the operand environments thread left to right.
    /// Under a negative sign the conjunction behaves as a disjunction of
    /// negations: each operand is refined negatively in the environment
    /// where all earlier operands held, and the results are joined.
    fn check_conjunction(
        &mut self,
        operands: &[Expr],
        sign: bool,
        mut environment: Environment,
    ) -> Checked<Environment> {
        if sign {
            for operand in operands {
                environment = self.check_condition(operand, true, environment)?;
            }
            Ok(environment)
        } else {
            let mut refinements = Vec::with_capacity(operands.len());
            for operand in operands {
                refinements.push(self.check_condition(operand, false, environment.clone())?);
                environment = self.check_condition(operand, true, environment)?;
            }
            Ok(union_all(refinements))
        }
    }

    /// The exact dual of [`Self::check_conjunction`]
    fn check_disjunction(
        &mut self,
        operands: &[Expr],
        sign: bool,
        mut environment: Environment,
    ) -> Checked<Environment> {
        if sign {
            let mut refinements = Vec::with_capacity(operands.len());
            for operand in operands {
                refinements.push(self.check_condition(operand, true, environment.clone())?);
                environment = self.check_condition(operand, false, environment)?;
            }
            Ok(union_all(refinements))
        } else {
            for operand in operands {
                environment = self.check_condition(operand, false, environment)?;
            }
            Ok(environment)
        }
    }

    fn check_implication(
        &mut self,
        antecedent: &Expr,
        consequent: &Expr,
        sign: bool,
        environment: Environment,
    ) -> Checked<Environment> {
        // A ==> B is !A || B
        if sign {
            let left = self.check_condition(antecedent, false, environment.clone())?;
            let environment = self.check_condition(antecedent, true, environment)?;
            let right = self.check_condition(consequent, true, environment)?;
            Ok(Environment::union(&left, &right))
        } else {
            let environment = self.check_condition(antecedent, true, environment)?;
            self.check_condition(consequent, false, environment)
        }
    }

    /// A runtime type test `e is T`. The strict oracle decides whether
    /// either branch is dead; refinement applies only when the tested
    /// expression is a simple variable access.
    fn check_type_test(
        &mut self,
        condition: &Expr,
        operand: &Expr,
        test: &Type,
        sign: bool,
        environment: Environment,
    ) -> Checked<Environment> {
        let operand_ty = self.check_expression(operand, &environment)?;
        let test_ty: SemanticType = test.into();
        if let Some(operand_ty) = &operand_ty {
            let intersection =
                SemanticType::intersect(operand_ty.clone(), test_ty.clone());
            let difference =
                SemanticType::difference(operand_ty.clone(), test_ty.clone());
            if self.strict.is_void(&intersection, &environment) {
                // The true branch is dead
                self.error(TypeError::IncomparableOperands {
                    lhs: operand_ty.to_string(),
                    rhs: test_ty.to_string(),
                    span: condition.span.into(),
                });
            } else if self.strict.is_void(&difference, &environment) {
                // The false branch is dead
                self.error(TypeError::BranchAlwaysTaken {
                    span: condition.span.into(),
                });
            }
        }
        if let ExprKind::VariableAccess { var, .. } = &operand.kind {
            let known = self.current_type(*var, &environment, operand.span)?;
            let refined = if sign {
                SemanticType::intersect(known, test_ty)
            } else {
                SemanticType::difference(known, test_ty)
            };
            return Ok(environment.refine(*var, refined));
        }
        Ok(environment)
    }

    fn check_quantifier(
        &mut self,
        parameters: &[VariableDecl],
        body: &Expr,
        environment: Environment,
    ) -> Checked<Environment> {
        for parameter in parameters {
            self.vars.insert(parameter.var, parameter.ty.clone());
            self.check_type_non_empty(&parameter.ty, &environment, parameter.span);
            if let Some(initialiser) = &parameter.initialiser {
                self.check_expression(initialiser, &environment)?;
            }
        }
        // Refinements inside the body do not escape the quantifier
        self.check_condition(body, true, environment.clone())?;
        Ok(environment)
    }

    // =====================================================================
    // LVals
    // =====================================================================

    /// The largest type which may be assigned to an l-value. This comes
    /// from the declaration, never the current refinement, so writes can
    /// widen a previously refined variable.
    fn check_lval(&mut self, lval: &Expr, environment: &Environment) -> Checked<Option<Type>> {
        let ty = match &lval.kind {
            ExprKind::VariableAccess { var, .. } => match self.vars.get(var) {
                Some(declared) => Some(declared.clone()),
                None => {
                    return Err(InternalError::new("unresolved variable in lval", lval.span))
                }
            },
            ExprKind::StaticVariableAccess { link, .. } => {
                link.and_then(|decl| self.module.static_type(decl)).cloned()
            }
            ExprKind::ArrayAccess { source, index, .. } => {
                self.check_array_lval(source, index, environment)?
            }
            ExprKind::RecordAccess { operand, field, .. } => {
                self.check_record_lval(operand, field, environment)?
            }
            ExprKind::Dereference(operand) => {
                let src = self.check_expression(operand, environment)?;
                let reference =
                    self.extract_reference(src.as_ref(), environment, operand.span, true);
                reference.map(|r| self.concrete.apply(&r.element, environment))
            }
            _ => return Err(InternalError::new("unknown lval encountered", lval.span)),
        };
        if let Some(ty) = &ty {
            self.annotations.lvals.insert(lval.id, ty.clone());
        }
        Ok(ty)
    }

    fn check_array_lval(
        &mut self,
        source: &Expr,
        index: &Expr,
        environment: &Environment,
    ) -> Checked<Option<Type>> {
        let src = self.check_expression(source, environment)?;
        let Some(array) = self.extract_array(src.as_ref(), environment, source.span, true)
        else {
            return Ok(None);
        };
        let subscript = self.check_expression(index, environment)?;
        self.check_subtype(&SemanticType::Int, subscript.as_ref(), environment, index.span);
        Ok(Some(self.concrete.apply(&array.element, environment)))
    }

    fn check_record_lval(
        &mut self,
        operand: &Expr,
        field: &str,
        environment: &Environment,
    ) -> Checked<Option<Type>> {
        let src = self.check_expression(operand, environment)?;
        let Some(record) = self.extract_record(src.as_ref(), environment, operand.span, true)
        else {
            return Ok(None);
        };
        let Some(field_ty) = self.extract_field(&record, field, operand.span) else {
            return Ok(None);
        };
        Ok(Some(self.concrete.apply(&field_ty, environment)))
    }

    // =====================================================================
    // Expressions
    // =====================================================================

    /// Check a sequence of expressions against a tuple of expected types,
    /// expanding multi-return invocations positionally. Returns the
    /// component types for use in assignment refinement.
    fn check_multi_expressions(
        &mut self,
        expressions: &[Expr],
        environment: &Environment,
        expected: &[Option<Type>],
        end_span: Span,
    ) -> Checked<Vec<Option<SemanticType>>> {
        let mut components: Vec<Option<SemanticType>> = Vec::new();
        let mut overflowed = false;
        for expression in expressions {
            let produced: Vec<Option<SemanticType>> = match &expression.kind {
                ExprKind::Invoke(invoke) => {
                    match self.check_invoke(expression, invoke, environment)? {
                        Some(returns) => returns
                            .iter()
                            .map(|ty| Some(SemanticType::from(ty)))
                            .collect(),
                        // A failure upstream; consume one slot conservatively
                        None => vec![None],
                    }
                }
                ExprKind::IndirectInvoke { source, arguments } => {
                    match self.check_indirect_invoke(expression, source, arguments, environment)? {
                        Some(returns) => returns
                            .iter()
                            .map(|ty| Some(SemanticType::from(ty)))
                            .collect(),
                        None => vec![None],
                    }
                }
                _ => vec![self.check_expression(expression, environment)?],
            };
            for ty in produced {
                match expected.get(components.len()) {
                    Some(slot) => {
                        if let Some(expected_ty) = slot {
                            self.check_subtype_concrete(
                                expected_ty,
                                ty.as_ref(),
                                environment,
                                expression.span,
                            );
                        }
                    }
                    None if !overflowed => {
                        overflowed = true;
                        self.error(TypeError::TooManyReturns {
                            span: expression.span.into(),
                        });
                    }
                    None => {}
                }
                components.push(ty);
            }
        }
        if components.len() < expected.len() {
            self.error(TypeError::InsufficientReturns {
                span: end_span.into(),
            });
        }
        Ok(components)
    }

    /// Check a single-valued expression, returning its semantic type or
    /// `None` after an upstream error. The concrete type is recorded
    /// against the node as a side effect.
    fn check_expression(
        &mut self,
        expression: &Expr,
        environment: &Environment,
    ) -> Checked<Option<SemanticType>> {
        let ty: Option<SemanticType> = match &expression.kind {
            ExprKind::Constant(value) => Some(constant_type(value)),
            ExprKind::VariableAccess { var, .. } => {
                Some(self.current_type(*var, environment, expression.span)?)
            }
            ExprKind::StaticVariableAccess { link, .. } => link
                .and_then(|decl| self.module.static_type(decl))
                .map(SemanticType::from),
            ExprKind::Cast { ty, operand } => {
                let operand_ty = self.check_expression(operand, environment)?;
                self.check_subtype_concrete(ty, operand_ty.as_ref(), environment, expression.span);
                Some(ty.into())
            }
            ExprKind::Invoke(invoke) => {
                match self.check_invoke(expression, invoke, environment)? {
                    None => return Ok(None),
                    Some(returns) => match returns.len() {
                        0 => {
                            self.error(TypeError::InsufficientReturns {
                                span: expression.span.into(),
                            });
                            return Ok(None);
                        }
                        1 => Some(SemanticType::from(&returns[0])),
                        _ => {
                            self.error(TypeError::TooManyReturns {
                                span: expression.span.into(),
                            });
                            Some(SemanticType::from(&returns[0]))
                        }
                    },
                }
            }
            ExprKind::IndirectInvoke { source, arguments } => {
                match self.check_indirect_invoke(expression, source, arguments, environment)? {
                    None => return Ok(None),
                    Some(returns) => match returns.len() {
                        0 => {
                            self.error(TypeError::InsufficientReturns {
                                span: expression.span.into(),
                            });
                            return Ok(None);
                        }
                        _ => Some(SemanticType::from(&returns[0])),
                    },
                }
            }
            // Conditions in expression position type as bool; any
            // refinements they compute stay local
            ExprKind::LogicalNot(_)
            | ExprKind::LogicalAnd(_)
            | ExprKind::LogicalOr(_)
            | ExprKind::LogicalIff(..)
            | ExprKind::LogicalImplication(..)
            | ExprKind::Is { .. }
            | ExprKind::Quantifier { .. } => {
                self.check_condition(expression, true, environment.clone())?;
                Some(SemanticType::Bool)
            }
            ExprKind::Equal(lhs, rhs) | ExprKind::NotEqual(lhs, rhs) => {
                self.check_equality(lhs, rhs, environment)?
            }
            ExprKind::IntegerLessThan(lhs, rhs)
            | ExprKind::IntegerLessEqual(lhs, rhs)
            | ExprKind::IntegerGreaterThan(lhs, rhs)
            | ExprKind::IntegerGreaterEqual(lhs, rhs) => {
                self.check_operand(&SemanticType::Int, lhs, environment)?;
                self.check_operand(&SemanticType::Int, rhs, environment)?;
                Some(SemanticType::Bool)
            }
            ExprKind::IntegerNegation(operand) => {
                self.check_operand(&SemanticType::Int, operand, environment)?;
                Some(SemanticType::Int)
            }
            ExprKind::IntegerAddition(lhs, rhs)
            | ExprKind::IntegerSubtraction(lhs, rhs)
            | ExprKind::IntegerMultiplication(lhs, rhs)
            | ExprKind::IntegerDivision(lhs, rhs)
            | ExprKind::IntegerRemainder(lhs, rhs) => {
                self.check_operand(&SemanticType::Int, lhs, environment)?;
                self.check_operand(&SemanticType::Int, rhs, environment)?;
                Some(SemanticType::Int)
            }
            ExprKind::BitwiseNot(operand) => {
                self.check_operand(&SemanticType::Byte, operand, environment)?;
                Some(SemanticType::Byte)
            }
            ExprKind::BitwiseAnd(operands)
            | ExprKind::BitwiseOr(operands)
            | ExprKind::BitwiseXor(operands) => {
                for operand in operands {
                    self.check_operand(&SemanticType::Byte, operand, environment)?;
                }
                Some(SemanticType::Byte)
            }
            ExprKind::BitwiseShiftLeft(lhs, rhs) | ExprKind::BitwiseShiftRight(lhs, rhs) => {
                self.check_operand(&SemanticType::Byte, lhs, environment)?;
                self.check_operand(&SemanticType::Int, rhs, environment)?;
                Some(SemanticType::Byte)
            }
            ExprKind::RecordInitialiser { fields } => {
                let mut typed = Vec::with_capacity(fields.len());
                let mut complete = true;
                for (name, initialiser) in fields {
                    match self.check_expression(initialiser, environment)? {
                        Some(ty) => typed.push((name.clone(), ty)),
                        None => complete = false,
                    }
                }
                complete.then(|| SemanticType::record(false, typed))
            }
            ExprKind::RecordAccess { operand, field, .. } => {
                let src = self.check_expression(operand, environment)?;
                let record =
                    self.extract_record(src.as_ref(), environment, operand.span, false);
                record.and_then(|r| self.extract_field(&r, field, expression.span))
            }
            ExprKind::RecordUpdate {
                operand,
                field,
                value,
            } => {
                let src = self.check_expression(operand, environment)?;
                let value_ty = self.check_expression(value, environment)?;
                let record =
                    self.extract_record(src.as_ref(), environment, operand.span, false);
                if let Some(field_ty) = record
                    .as_ref()
                    .and_then(|r| self.extract_field(r, field, expression.span))
                {
                    self.check_subtype(&field_ty, value_ty.as_ref(), environment, value.span);
                }
                src
            }
            ExprKind::ArrayLength(operand) => {
                let src = self.check_expression(operand, environment)?;
                self.extract_array(src.as_ref(), environment, operand.span, false);
                Some(SemanticType::Int)
            }
            ExprKind::ArrayInitialiser(operands) => {
                let mut elements = Vec::with_capacity(operands.len());
                let mut complete = true;
                for operand in operands {
                    match self.check_expression(operand, environment)? {
                        Some(ty) => elements.push(ty),
                        None => complete = false,
                    }
                }
                complete.then(|| SemanticType::array(SemanticType::union(elements)))
            }
            ExprKind::ArrayGenerator { value, length } => {
                let value_ty = self.check_expression(value, environment)?;
                self.check_operand(&SemanticType::Int, length, environment)?;
                value_ty.map(SemanticType::array)
            }
            ExprKind::ArrayAccess { source, index, .. } => {
                let src = self.check_expression(source, environment)?;
                let subscript = self.check_expression(index, environment)?;
                let array = self.extract_array(src.as_ref(), environment, source.span, false);
                self.check_subtype(&SemanticType::Int, subscript.as_ref(), environment, index.span);
                array.map(|a| (*a.element).clone())
            }
            ExprKind::ArrayRange { start, end } => {
                let start_ty = self.check_expression(start, environment)?;
                let end_ty = self.check_expression(end, environment)?;
                self.check_subtype(&SemanticType::Int, start_ty.as_ref(), environment, start.span);
                self.check_subtype(&SemanticType::Int, end_ty.as_ref(), environment, end.span);
                start_ty.map(SemanticType::array)
            }
            ExprKind::ArrayUpdate {
                source,
                index,
                value,
            } => {
                let src = self.check_expression(source, environment)?;
                let subscript = self.check_expression(index, environment)?;
                let value_ty = self.check_expression(value, environment)?;
                let array = self.extract_array(src.as_ref(), environment, source.span, false);
                self.check_subtype(&SemanticType::Int, subscript.as_ref(), environment, index.span);
                if let Some(array) = &array {
                    self.check_subtype(&array.element, value_ty.as_ref(), environment, value.span);
                }
                array.map(SemanticType::Array)
            }
            ExprKind::Dereference(operand) => {
                let src = self.check_expression(operand, environment)?;
                let reference =
                    self.extract_reference(src.as_ref(), environment, operand.span, false);
                reference.map(|r| (*r.element).clone())
            }
            ExprKind::New { operand, lifetime } => {
                let operand_ty = self.check_expression(operand, environment)?;
                operand_ty.map(|ty| SemanticType::reference(ty, lifetime.clone()))
            }
            ExprKind::LambdaAccess {
                name,
                candidates,
                parameter_types,
            } => {
                if !parameter_types.is_empty() {
                    let arguments: Vec<SemanticType> =
                        parameter_types.iter().map(SemanticType::from).collect();
                    match self.resolver.bind(candidates, &arguments, environment) {
                        Some(binding) => {
                            let signature = binding.signature.clone();
                            self.annotations.bindings.insert(expression.id, binding);
                            Some(SemanticType::Callable((&signature).into()))
                        }
                        None => {
                            self.error(TypeError::AmbiguousCallable {
                                name: name.to_string(),
                                span: expression.span.into(),
                            });
                            None
                        }
                    }
                } else if candidates.len() == 1 {
                    self.module
                        .callable_signature(candidates[0])
                        .map(|sig| SemanticType::Callable((&sig).into()))
                } else {
                    self.error(TypeError::AmbiguousCallable {
                        name: name.to_string(),
                        span: expression.span.into(),
                    });
                    None
                }
            }
            ExprKind::Lambda(lambda) => self.check_lambda(expression, lambda, environment)?,
        };
        // Record the concrete type; extraction to void means something went
        // wrong structurally even though each step looked locally fine.
        if let Some(ty) = &ty {
            let concrete = self.concrete.apply(ty, environment);
            if concrete == Type::Void {
                self.error(TypeError::EmptyType {
                    ty: ty.to_string(),
                    span: expression.span.into(),
                });
            } else {
                self.annotations.types.insert(expression.id, concrete);
            }
        }
        Ok(ty)
    }

    fn check_equality(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        environment: &Environment,
    ) -> Checked<Option<SemanticType>> {
        let lhs_ty = self.check_expression(lhs, environment)?;
        let rhs_ty = self.check_expression(rhs, environment)?;
        if let (Some(lhs_ty), Some(rhs_ty)) = (&lhs_ty, &rhs_ty) {
            // Operands of equality must at least overlap
            let glb = SemanticType::intersect(lhs_ty.clone(), rhs_ty.clone());
            if self.strict.is_void(&glb, environment) {
                self.error(TypeError::IncomparableOperands {
                    lhs: lhs_ty.to_string(),
                    rhs: rhs_ty.to_string(),
                    span: lhs.span.merge(rhs.span).into(),
                });
            }
        }
        Ok(Some(SemanticType::Bool))
    }

    fn check_invoke(
        &mut self,
        expression: &Expr,
        invoke: &InvokeExpr,
        environment: &Environment,
    ) -> Checked<Option<Vec<Type>>> {
        let mut arguments = Vec::with_capacity(invoke.arguments.len());
        let mut resolvable = true;
        for argument in &invoke.arguments {
            match self.check_expression(argument, environment)? {
                Some(ty) => arguments.push(ty),
                None => resolvable = false,
            }
        }
        if invoke.candidates.is_empty() || !resolvable {
            // The link never resolved, or an argument failed upstream
            return Ok(None);
        }
        match self.resolver.bind(&invoke.candidates, &arguments, environment) {
            Some(binding) => {
                let returns = binding.signature.returns.clone();
                self.annotations.bindings.insert(expression.id, binding);
                Ok(Some(returns))
            }
            None => {
                self.error(TypeError::AmbiguousCallable {
                    name: invoke.name.to_string(),
                    span: expression.span.into(),
                });
                Ok(None)
            }
        }
    }

    fn check_indirect_invoke(
        &mut self,
        expression: &Expr,
        source: &Expr,
        arguments: &[Expr],
        environment: &Environment,
    ) -> Checked<Option<Vec<Type>>> {
        let src = self.check_expression(source, environment)?;
        let Some(signature) = self.extract_callable(src.as_ref(), environment, source.span)
        else {
            return Ok(None);
        };
        if signature.parameters.len() != arguments.len() {
            self.error(TypeError::InsufficientArguments {
                span: expression.span.into(),
            });
        }
        for (i, argument) in arguments.iter().enumerate() {
            let argument_ty = self.check_expression(argument, environment)?;
            if let Some(parameter) = signature.parameters.get(i) {
                self.check_subtype(parameter, argument_ty.as_ref(), environment, argument.span);
            }
        }
        if signature.returns.len() > 1 {
            return Err(InternalError::new(
                "multiple returns in indirect invocation are not supported",
                expression.span,
            ));
        }
        let returns = signature
            .returns
            .iter()
            .map(|r| self.concrete.apply(r, environment))
            .collect();
        Ok(Some(returns))
    }

    fn check_lambda(
        &mut self,
        expression: &Expr,
        lambda: &LambdaExpr,
        environment: &Environment,
    ) -> Checked<Option<SemanticType>> {
        for parameter in &lambda.parameters {
            self.vars.insert(parameter.var, parameter.ty.clone());
            self.check_type_non_empty(&parameter.ty, environment, parameter.span);
        }
        // The body sees the enclosing environment, refinements included
        let Some(body_ty) = self.check_expression(&lambda.body, environment)? else {
            return Ok(None);
        };
        let result = self.concrete.apply(&body_ty, environment);
        let kind = if is_pure(&lambda.body, self.module) {
            CallableKind::Function
        } else {
            CallableKind::Method
        };
        let signature = Signature {
            kind,
            lifetimes: lambda.lifetimes.clone(),
            parameters: lambda.parameters.iter().map(|p| p.ty.clone()).collect(),
            returns: vec![result],
        };
        self.annotations
            .lambdas
            .insert(expression.id, signature.clone());
        Ok(Some(SemanticType::Callable((&signature).into())))
    }

    // =====================================================================
    // Helpers
    // =====================================================================

    /// The known type of a variable: its refinement if one is recorded,
    /// otherwise the declared type.
    fn current_type(
        &self,
        var: VarId,
        environment: &Environment,
        span: Span,
    ) -> Checked<SemanticType> {
        if let Some(refined) = environment.refinement(var) {
            return Ok(refined.clone());
        }
        match self.vars.get(&var) {
            Some(declared) => Ok(declared.into()),
            None => Err(InternalError::new("unresolved variable access", span)),
        }
    }

    fn check_operand(
        &mut self,
        expected: &SemanticType,
        operand: &Expr,
        environment: &Environment,
    ) -> Checked<()> {
        let ty = self.check_expression(operand, environment)?;
        self.check_subtype(expected, ty.as_ref(), environment, operand.span);
        Ok(())
    }

    /// Relaxed subtype check with null propagation: a missing side means an
    /// error was already reported upstream, so nothing further is said.
    fn check_subtype(
        &mut self,
        expected: &SemanticType,
        actual: Option<&SemanticType>,
        environment: &Environment,
        span: Span,
    ) {
        let Some(actual) = actual else { return };
        if !self.relaxed.is_subtype(actual, expected, environment) {
            self.error(TypeError::SubtypeError {
                expected: expected.to_string(),
                found: actual.to_string(),
                span: span.into(),
            });
        }
    }

    fn check_subtype_concrete(
        &mut self,
        expected: &Type,
        actual: Option<&SemanticType>,
        environment: &Environment,
        span: Span,
    ) {
        let expected: SemanticType = expected.into();
        self.check_subtype(&expected, actual, environment, span);
    }

    /// A declared type equivalent to void is nonsensical
    fn check_type_non_empty(&mut self, ty: &Type, environment: &Environment, span: Span) {
        let semantic: SemanticType = ty.into();
        if self.relaxed.is_void(&semantic, environment) {
            self.error(TypeError::EmptyType {
                ty: ty.to_string(),
                span: span.into(),
            });
        }
    }

    fn extract_array(
        &mut self,
        ty: Option<&SemanticType>,
        environment: &Environment,
        span: Span,
        writeable: bool,
    ) -> Option<ArrayType> {
        let ty = ty?;
        let shape = if writeable {
            self.rw.writeable_array(ty, environment)
        } else {
            self.rw.readable_array(ty, environment)
        };
        if shape.is_none() {
            self.error(TypeError::ExpectedArray {
                found: ty.to_string(),
                span: span.into(),
            });
        }
        shape
    }

    fn extract_record(
        &mut self,
        ty: Option<&SemanticType>,
        environment: &Environment,
        span: Span,
        writeable: bool,
    ) -> Option<RecordType> {
        let ty = ty?;
        let shape = if writeable {
            self.rw.writeable_record(ty, environment)
        } else {
            self.rw.readable_record(ty, environment)
        };
        if shape.is_none() {
            self.error(TypeError::ExpectedRecord {
                found: ty.to_string(),
                span: span.into(),
            });
        }
        shape
    }

    fn extract_reference(
        &mut self,
        ty: Option<&SemanticType>,
        environment: &Environment,
        span: Span,
        writeable: bool,
    ) -> Option<ReferenceType> {
        let ty = ty?;
        let shape = if writeable {
            self.rw.writeable_reference(ty, environment)
        } else {
            self.rw.readable_reference(ty, environment)
        };
        if shape.is_none() {
            self.error(TypeError::ExpectedReference {
                found: ty.to_string(),
                span: span.into(),
            });
        }
        shape
    }

    fn extract_callable(
        &mut self,
        ty: Option<&SemanticType>,
        environment: &Environment,
        span: Span,
    ) -> Option<SemanticSignature> {
        let ty = ty?;
        let shape = self.rw.readable_callable(ty, environment);
        if shape.is_none() {
            self.error(TypeError::ExpectedLambda {
                found: ty.to_string(),
                span: span.into(),
            });
        }
        shape
    }

    fn extract_field(
        &mut self,
        record: &RecordType,
        field: &str,
        span: Span,
    ) -> Option<SemanticType> {
        match record.field(field) {
            Some(ty) => Some(ty.clone()),
            None => {
                self.error(TypeError::InvalidField {
                    field: field.to_string(),
                    span: span.into(),
                });
                None
            }
        }
    }
}

fn union_all(mut environments: Vec<Environment>) -> Environment {
    let Some(mut joined) = environments.pop() else {
        return Environment::bottom();
    };
    for environment in environments {
        joined = Environment::union(&joined, &environment);
    }
    joined
}

fn constant_type(value: &Value) -> SemanticType {
    match value {
        Value::Null => SemanticType::Null,
        Value::Bool(_) => SemanticType::Bool,
        Value::Byte(_) => SemanticType::Byte,
        Value::Int(_) => SemanticType::Int,
        Value::Char(_) => SemanticType::Int,
        Value::Utf8(_) => SemanticType::array(SemanticType::Int),
    }
}

// ==================== SYNTACTIC WALKS ====================

/// Variables assigned anywhere in a loop body, excluding those declared
/// inside it. Dereference targets are heap writes and rebind nothing.
fn modified_variables(block: &Block) -> Vec<VarId> {
    let mut assigned = Vec::new();
    let mut declared = FxHashSet::default();
    collect_modified(block, &mut assigned, &mut declared);
    let mut seen = FxHashSet::default();
    assigned
        .into_iter()
        .filter(|var| !declared.contains(var) && seen.insert(*var))
        .collect()
}

fn collect_modified(block: &Block, assigned: &mut Vec<VarId>, declared: &mut FxHashSet<VarId>) {
    for stmt in &block.stmts {
        match stmt {
            Stmt::VariableDecl(decl) => {
                declared.insert(decl.var);
            }
            Stmt::Assign(stmt) => {
                for lval in &stmt.lhs {
                    if let Some(var) = root_variable(lval) {
                        assigned.push(var);
                    }
                }
            }
            Stmt::IfElse(stmt) => {
                collect_modified(&stmt.true_branch, assigned, declared);
                if let Some(block) = &stmt.false_branch {
                    collect_modified(block, assigned, declared);
                }
            }
            Stmt::NamedBlock(stmt) => collect_modified(&stmt.body, assigned, declared),
            Stmt::While(stmt) => collect_modified(&stmt.body, assigned, declared),
            Stmt::DoWhile(stmt) => collect_modified(&stmt.body, assigned, declared),
            Stmt::Switch(stmt) => {
                for case in &stmt.cases {
                    collect_modified(&case.block, assigned, declared);
                }
            }
            _ => {}
        }
    }
}

fn root_variable(lval: &Expr) -> Option<VarId> {
    match &lval.kind {
        ExprKind::VariableAccess { var, .. } => Some(*var),
        ExprKind::ArrayAccess { source, .. } => root_variable(source),
        ExprKind::RecordAccess { operand, .. } => root_variable(operand),
        _ => None,
    }
}

/// A lambda is pure when its body performs no allocation, dereference or
/// method invocation; purity decides between function and method signature.
fn is_pure(expression: &Expr, module: &Module) -> bool {
    let mut pure = true;
    visit_purity(expression, module, &mut pure);
    pure
}

fn visit_purity(expression: &Expr, module: &Module, pure: &mut bool) {
    if !*pure {
        return;
    }
    match &expression.kind {
        ExprKind::Dereference(_) | ExprKind::New { .. } | ExprKind::IndirectInvoke { .. } => {
            *pure = false;
        }
        ExprKind::Invoke(invoke) => {
            let calls_method = invoke.candidates.iter().any(|&decl| {
                module
                    .callable_signature(decl)
                    .map(|sig| sig.kind == CallableKind::Method)
                    .unwrap_or(false)
            });
            if calls_method {
                *pure = false;
                return;
            }
            for argument in &invoke.arguments {
                visit_purity(argument, module, pure);
            }
        }
        _ => {
            for child in child_expressions(expression) {
                visit_purity(child, module, pure);
            }
        }
    }
}

fn child_expressions(expression: &Expr) -> Vec<&Expr> {
    match &expression.kind {
        ExprKind::Constant(_)
        | ExprKind::VariableAccess { .. }
        | ExprKind::StaticVariableAccess { .. }
        | ExprKind::LambdaAccess { .. } => Vec::new(),
        ExprKind::Cast { operand, .. }
        | ExprKind::LogicalNot(operand)
        | ExprKind::IntegerNegation(operand)
        | ExprKind::BitwiseNot(operand)
        | ExprKind::ArrayLength(operand)
        | ExprKind::Dereference(operand)
        | ExprKind::New { operand, .. } => vec![operand.as_ref()],
        ExprKind::Invoke(invoke) => invoke.arguments.iter().collect(),
        ExprKind::IndirectInvoke { source, arguments } => {
            let mut children = vec![source.as_ref()];
            children.extend(arguments.iter());
            children
        }
        ExprKind::LogicalAnd(operands)
        | ExprKind::LogicalOr(operands)
        | ExprKind::BitwiseAnd(operands)
        | ExprKind::BitwiseOr(operands)
        | ExprKind::BitwiseXor(operands)
        | ExprKind::ArrayInitialiser(operands) => operands.iter().collect(),
        ExprKind::LogicalIff(lhs, rhs)
        | ExprKind::LogicalImplication(lhs, rhs)
        | ExprKind::Equal(lhs, rhs)
        | ExprKind::NotEqual(lhs, rhs)
        | ExprKind::IntegerLessThan(lhs, rhs)
        | ExprKind::IntegerLessEqual(lhs, rhs)
        | ExprKind::IntegerGreaterThan(lhs, rhs)
        | ExprKind::IntegerGreaterEqual(lhs, rhs)
        | ExprKind::IntegerAddition(lhs, rhs)
        | ExprKind::IntegerSubtraction(lhs, rhs)
        | ExprKind::IntegerMultiplication(lhs, rhs)
        | ExprKind::IntegerDivision(lhs, rhs)
        | ExprKind::IntegerRemainder(lhs, rhs)
        | ExprKind::BitwiseShiftLeft(lhs, rhs)
        | ExprKind::BitwiseShiftRight(lhs, rhs)
        | ExprKind::ArrayGenerator {
            value: lhs,
            length: rhs,
        }
        | ExprKind::ArrayRange {
            start: lhs,
            end: rhs,
        } => vec![lhs.as_ref(), rhs.as_ref()],
        ExprKind::Is { operand, .. } => vec![operand.as_ref()],
        ExprKind::Quantifier {
            parameters, body, ..
        } => {
            let mut children: Vec<&Expr> = parameters
                .iter()
                .filter_map(|p| p.initialiser.as_ref())
                .collect();
            children.push(body.as_ref());
            children
        }
        ExprKind::RecordInitialiser { fields } => {
            fields.iter().map(|(_, initialiser)| initialiser).collect()
        }
        ExprKind::RecordAccess { operand, .. } => vec![operand.as_ref()],
        ExprKind::RecordUpdate { operand, value, .. } => {
            vec![operand.as_ref(), value.as_ref()]
        }
        ExprKind::ArrayAccess { source, index, .. } => vec![source.as_ref(), index.as_ref()],
        ExprKind::ArrayUpdate {
            source,
            index,
            value,
        } => vec![source.as_ref(), index.as_ref(), value.as_ref()],
        ExprKind::Lambda(lambda) => vec![lambda.body.as_ref()],
    }
}
