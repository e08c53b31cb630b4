//! Diagnostic reporting with source locations
//!
//! Type errors are reported through [`TypeError`], a miette diagnostic that
//! carries the offending span as a label. Errors do not embed source text;
//! attach it at the rendering boundary with `Report::with_source_code`.

use crate::common::Span;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

/// A type checking diagnostic.
///
/// One variant per error code. The [`TypeError::code`] accessor returns the
/// stable upper-case code expected by downstream error-message catalogues.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum TypeError {
    #[error("expected `{expected}`, found `{found}`")]
    #[diagnostic(code(check::subtype_error))]
    SubtypeError {
        expected: String,
        found: String,
        #[label("expected `{expected}` here")]
        span: SourceSpan,
    },

    #[error("type `{ty}` has no possible values")]
    #[diagnostic(code(check::empty_type))]
    EmptyType {
        ty: String,
        #[label("empty type")]
        span: SourceSpan,
    },

    #[error("expected array type, found `{found}`")]
    #[diagnostic(code(check::expected_array))]
    ExpectedArray {
        found: String,
        #[label("not an array")]
        span: SourceSpan,
    },

    #[error("expected record type, found `{found}`")]
    #[diagnostic(code(check::expected_record))]
    ExpectedRecord {
        found: String,
        #[label("not a record")]
        span: SourceSpan,
    },

    #[error("expected reference type, found `{found}`")]
    #[diagnostic(code(check::expected_reference))]
    ExpectedReference {
        found: String,
        #[label("not a reference")]
        span: SourceSpan,
    },

    #[error("expected lambda type, found `{found}`")]
    #[diagnostic(code(check::expected_lambda))]
    ExpectedLambda {
        found: String,
        #[label("not callable")]
        span: SourceSpan,
    },

    #[error("invalid field `{field}`")]
    #[diagnostic(code(check::invalid_field))]
    InvalidField {
        field: String,
        #[label("field not found")]
        span: SourceSpan,
    },

    #[error("incomparable operands `{lhs}` and `{rhs}`")]
    #[diagnostic(code(check::incomparable_operands))]
    IncomparableOperands {
        lhs: String,
        rhs: String,
        #[label("these types never overlap")]
        span: SourceSpan,
    },

    #[error("branch always taken")]
    #[diagnostic(
        code(check::branch_always_taken),
        help("the false branch of this test can never execute")
    )]
    BranchAlwaysTaken {
        #[label("test always succeeds")]
        span: SourceSpan,
    },

    #[error("unable to resolve `{name}` to a unique callable")]
    #[diagnostic(code(check::ambiguous_callable))]
    AmbiguousCallable {
        name: String,
        #[label("zero or multiple candidates match")]
        span: SourceSpan,
    },

    #[error("insufficient return values")]
    #[diagnostic(code(check::insufficient_returns))]
    InsufficientReturns {
        #[label("more values expected")]
        span: SourceSpan,
    },

    #[error("too many return values")]
    #[diagnostic(code(check::too_many_returns))]
    TooManyReturns {
        #[label("excess value")]
        span: SourceSpan,
    },

    #[error("insufficient arguments for invocation")]
    #[diagnostic(code(check::insufficient_arguments))]
    InsufficientArguments {
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("missing return statement in `{name}`")]
    #[diagnostic(code(check::missing_return_statement))]
    MissingReturnStatement {
        name: String,
        #[label("control may reach the end of this declaration")]
        span: SourceSpan,
    },

    #[error("unreachable code")]
    #[diagnostic(code(check::unreachable_code))]
    UnreachableCode {
        #[label("this statement can never execute")]
        span: SourceSpan,
    },
}

impl TypeError {
    /// The stable error code, verbatim.
    pub fn code(&self) -> &'static str {
        match self {
            TypeError::SubtypeError { .. } => "SUBTYPE_ERROR",
            TypeError::EmptyType { .. } => "EMPTY_TYPE",
            TypeError::ExpectedArray { .. } => "EXPECTED_ARRAY",
            TypeError::ExpectedRecord { .. } => "EXPECTED_RECORD",
            TypeError::ExpectedReference { .. } => "EXPECTED_REFERENCE",
            TypeError::ExpectedLambda { .. } => "EXPECTED_LAMBDA",
            TypeError::InvalidField { .. } => "INVALID_FIELD",
            TypeError::IncomparableOperands { .. } => "INCOMPARABLE_OPERANDS",
            TypeError::BranchAlwaysTaken { .. } => "BRANCH_ALWAYS_TAKEN",
            TypeError::AmbiguousCallable { .. } => "AMBIGUOUS_CALLABLE",
            TypeError::InsufficientReturns { .. } => "INSUFFICIENT_RETURNS",
            TypeError::TooManyReturns { .. } => "TOO_MANY_RETURNS",
            TypeError::InsufficientArguments { .. } => "INSUFFICIENT_ARGUMENTS",
            TypeError::MissingReturnStatement { .. } => "MISSING_RETURN_STATEMENT",
            TypeError::UnreachableCode { .. } => "UNREACHABLE_CODE",
        }
    }
}

/// A compiler-internal inconsistency (an impossible AST shape).
///
/// These abort the current declaration but never the whole check; they
/// indicate a bug in an upstream stage rather than in the source program.
#[derive(Error, Debug, Clone)]
#[error("internal failure: {message}")]
pub struct InternalError {
    pub message: String,
    pub span: Span,
}

impl InternalError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbatim_codes() {
        let err = TypeError::SubtypeError {
            expected: "int".to_string(),
            found: "int|null".to_string(),
            span: Span::dummy().into(),
        };
        assert_eq!(err.code(), "SUBTYPE_ERROR");
        let err = TypeError::BranchAlwaysTaken {
            span: Span::dummy().into(),
        };
        assert_eq!(err.code(), "BRANCH_ALWAYS_TAKEN");
    }
}
