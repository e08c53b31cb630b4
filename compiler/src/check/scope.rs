//! Enclosing scope stack
//!
//! A borrowed linked stack recording the declaration and named blocks a
//! statement sits inside. Return checking walks it to find the expected
//! return types; named blocks walk it to compute the declared lifetimes in
//! scope.

use crate::ast::{CallableKind, FunctionOrMethodDecl};

/// One frame of the enclosing scope chain
pub enum Scope<'a> {
    FunctionOrMethod {
        declaration: &'a FunctionOrMethodDecl,
    },
    NamedBlock {
        name: &'a str,
        parent: &'a Scope<'a>,
    },
}

impl<'a> Scope<'a> {
    pub fn function_or_method(declaration: &'a FunctionOrMethodDecl) -> Self {
        Scope::FunctionOrMethod { declaration }
    }

    pub fn named_block(name: &'a str, parent: &'a Scope<'a>) -> Self {
        Scope::NamedBlock { name, parent }
    }

    /// The innermost enclosing function or method declaration
    pub fn enclosing_function(&self) -> &'a FunctionOrMethodDecl {
        match self {
            Scope::FunctionOrMethod { declaration } => declaration,
            Scope::NamedBlock { parent, .. } => parent.enclosing_function(),
        }
    }

    /// All lifetime names visible at this point, innermost last.
    ///
    /// A method contributes its declared lifetime parameters and the
    /// implicit `this`; each named block adds its own name.
    pub fn declared_lifetimes(&self) -> Vec<String> {
        match self {
            Scope::FunctionOrMethod { declaration } => {
                let mut lifetimes = match declaration.kind {
                    CallableKind::Method => declaration.lifetimes.clone(),
                    CallableKind::Function => Vec::new(),
                };
                lifetimes.push("this".to_string());
                lifetimes
            }
            Scope::NamedBlock { name, parent } => {
                let mut lifetimes = parent.declared_lifetimes();
                lifetimes.push((*name).to_string());
                lifetimes
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Block, Modifiers};
    use crate::common::{NodeId, Path, Span};

    fn method() -> FunctionOrMethodDecl {
        FunctionOrMethodDecl {
            id: NodeId::dummy(),
            kind: CallableKind::Method,
            name: Path::simple("m"),
            modifiers: Modifiers::default(),
            lifetimes: vec!["a".to_string()],
            parameters: Vec::new(),
            returns: Vec::new(),
            requires: Vec::new(),
            ensures: Vec::new(),
            body: Block::default(),
            span: Span::dummy(),
        }
    }

    #[test]
    fn test_declared_lifetimes() {
        let decl = method();
        let root = Scope::function_or_method(&decl);
        assert_eq!(root.declared_lifetimes(), vec!["a", "this"]);
        let block = Scope::named_block("outer", &root);
        assert_eq!(block.declared_lifetimes(), vec!["a", "this", "outer"]);
        let inner = Scope::named_block("inner", &block);
        assert_eq!(
            inner.declared_lifetimes(),
            vec!["a", "this", "outer", "inner"]
        );
        assert_eq!(inner.enclosing_function().name, Path::simple("m"));
    }
}
