//! Semantic type system
//!
//! The algebra of semantic types and the operators over it:
//! - Term representation with unions, intersections and negations
//! - Emptiness oracle in strict and relaxed modes
//! - Subtype operator and contractiveness checking
//! - Readable/writeable shape extraction and concrete type extraction
//! - Callable binding for invocation resolution

pub mod emptiness;
pub mod extract;
pub mod infer;
pub mod semantic;
pub mod subtype;

pub use emptiness::{EmptinessOracle, LifetimeRelation, NoLifetimes, OracleMode};
pub use extract::{ConcreteTypeExtractor, ReadWriteExtractor};
pub use infer::{CallBinding, CallableResolver};
pub use semantic::{ArrayType, RecordType, ReferenceType, SemanticSignature, SemanticType};
pub use subtype::SubtypeOperator;
