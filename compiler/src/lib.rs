//! Veld Programming Language Compiler Front-End
//!
//! A statically typed imperative language with refinement types, union
//! types, structural records, arrays, lifetime-annotated references and
//! first-class callables. The heart of the front-end is a flow-sensitive
//! type checker: a bidirectional analysis that threads a per-variable known
//! type through each declaration body, refining at type tests, joining at
//! merge points, and delegating every structural decision to a semantic
//! subtype operator built on emptiness testing.
//!
//! # Architecture
//!
//! ```text
//! Resolved AST → Flow Checker → annotations + diagnostics
//!                    │
//!                    ├── Subtype Operator ── Emptiness Oracle (strict/relaxed)
//!                    ├── Read/Write & Concrete Type Extractors
//!                    └── Callable Resolver
//! ```
//!
//! Lexing, parsing, name resolution and code generation are external
//! collaborators; the checker consumes an AST whose variable accesses and
//! call sites are already linked, and records inferred types against node
//! ids.

pub mod ast;
pub mod check;
pub mod common;
pub mod diagnostics;
pub mod types;

pub use check::{check, Annotations, FlowTypeCheck, TypeCheckResult};
pub use diagnostics::{InternalError, TypeError};
pub use types::{SemanticType, SubtypeOperator};

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
