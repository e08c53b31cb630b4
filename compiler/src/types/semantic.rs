//! Semantic type algebra
//!
//! The semantic representation extends the surface types with intersection,
//! difference and negation connectives. Terms are immutable values; the
//! constructors below keep them in a lightweight canonical form (flat,
//! idempotent unions and intersections, absorbed `void`/`any`, cancelled
//! double negation) so the emptiness oracle works over predictable shapes.

use crate::ast::{CallableKind, Signature, Type};
use crate::common::{DeclId, Path};
use std::fmt;

/// A term of the semantic type algebra
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Void,
    Any,
    Null,
    Bool,
    Byte,
    Int,
    Nominal { name: Path, decl: DeclId },
    Array(ArrayType),
    Reference(ReferenceType),
    Record(RecordType),
    Callable(SemanticSignature),
    Union(Vec<SemanticType>),
    Intersection(Vec<SemanticType>),
    Negation(Box<SemanticType>),
}

/// Array shape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    pub element: Box<SemanticType>,
}

impl ArrayType {
    pub fn new(element: SemanticType) -> Self {
        Self {
            element: Box::new(element),
        }
    }
}

/// Reference shape. A missing lifetime stands for the default lifetime `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceType {
    pub element: Box<SemanticType>,
    pub lifetime: Option<String>,
}

impl ReferenceType {
    pub fn new(element: SemanticType, lifetime: Option<String>) -> Self {
        Self {
            element: Box::new(element),
            lifetime,
        }
    }
}

/// Record shape. Field order is preserved for initialisers but carries no
/// meaning in subtyping, which looks fields up by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordType {
    pub open: bool,
    pub fields: Vec<(String, SemanticType)>,
}

impl RecordType {
    pub fn new(open: bool, fields: Vec<(String, SemanticType)>) -> Self {
        Self { open, fields }
    }

    pub fn field(&self, name: &str) -> Option<&SemanticType> {
        self.fields
            .iter()
            .find(|(f, _)| f == name)
            .map(|(_, ty)| ty)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(f, _)| f.as_str())
    }
}

/// Callable shape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticSignature {
    pub kind: CallableKind,
    pub lifetimes: Vec<String>,
    pub parameters: Vec<SemanticType>,
    pub returns: Vec<SemanticType>,
}

impl SemanticType {
    pub fn array(element: SemanticType) -> SemanticType {
        SemanticType::Array(ArrayType::new(element))
    }

    pub fn reference(element: SemanticType, lifetime: Option<String>) -> SemanticType {
        SemanticType::Reference(ReferenceType::new(element, lifetime))
    }

    pub fn record(open: bool, fields: Vec<(String, SemanticType)>) -> SemanticType {
        SemanticType::Record(RecordType::new(open, fields))
    }

    /// n-ary union; flattens, deduplicates and absorbs identities
    pub fn union(members: Vec<SemanticType>) -> SemanticType {
        let mut flat = Vec::new();
        for member in members {
            match member {
                SemanticType::Union(children) => flat.extend(children),
                SemanticType::Void => {}
                SemanticType::Any => return SemanticType::Any,
                other => flat.push(other),
            }
        }
        let mut unique: Vec<SemanticType> = Vec::new();
        for member in flat {
            if !unique.contains(&member) {
                unique.push(member);
            }
        }
        match unique.len() {
            0 => SemanticType::Void,
            1 => unique.into_iter().next().unwrap(),
            _ => SemanticType::Union(unique),
        }
    }

    /// n-ary intersection; flattens, deduplicates and absorbs identities
    pub fn intersection(members: Vec<SemanticType>) -> SemanticType {
        let mut flat = Vec::new();
        for member in members {
            match member {
                SemanticType::Intersection(children) => flat.extend(children),
                SemanticType::Any => {}
                SemanticType::Void => return SemanticType::Void,
                other => flat.push(other),
            }
        }
        let mut unique: Vec<SemanticType> = Vec::new();
        for member in flat {
            if !unique.contains(&member) {
                unique.push(member);
            }
        }
        match unique.len() {
            0 => SemanticType::Any,
            1 => unique.into_iter().next().unwrap(),
            _ => SemanticType::Intersection(unique),
        }
    }

    /// Logical negation; involutive, dualises `void`/`any`
    pub fn negation(ty: SemanticType) -> SemanticType {
        match ty {
            SemanticType::Negation(inner) => *inner,
            SemanticType::Void => SemanticType::Any,
            SemanticType::Any => SemanticType::Void,
            other => SemanticType::Negation(Box::new(other)),
        }
    }

    /// `a - b`, encoded as `a ∧ ¬b`
    pub fn difference(a: SemanticType, b: SemanticType) -> SemanticType {
        SemanticType::intersection(vec![a, SemanticType::negation(b)])
    }

    /// Binary intersection convenience
    pub fn intersect(a: SemanticType, b: SemanticType) -> SemanticType {
        SemanticType::intersection(vec![a, b])
    }
}

impl From<&Type> for SemanticType {
    fn from(ty: &Type) -> SemanticType {
        match ty {
            Type::Void => SemanticType::Void,
            Type::Any => SemanticType::Any,
            Type::Null => SemanticType::Null,
            Type::Bool => SemanticType::Bool,
            Type::Byte => SemanticType::Byte,
            Type::Int => SemanticType::Int,
            Type::Nominal { name, decl } => SemanticType::Nominal {
                name: name.clone(),
                decl: *decl,
            },
            Type::Array(element) => SemanticType::array(element.as_ref().into()),
            Type::Reference { element, lifetime } => {
                SemanticType::reference(element.as_ref().into(), lifetime.clone())
            }
            Type::Record { open, fields } => SemanticType::record(
                *open,
                fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.into()))
                    .collect(),
            ),
            Type::Callable(sig) => SemanticType::Callable(sig.into()),
            Type::Union(members) => {
                SemanticType::union(members.iter().map(SemanticType::from).collect())
            }
        }
    }
}

impl From<&Signature> for SemanticSignature {
    fn from(sig: &Signature) -> SemanticSignature {
        SemanticSignature {
            kind: sig.kind,
            lifetimes: sig.lifetimes.clone(),
            parameters: sig.parameters.iter().map(SemanticType::from).collect(),
            returns: sig.returns.iter().map(SemanticType::from).collect(),
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticType::Void => write!(f, "void"),
            SemanticType::Any => write!(f, "any"),
            SemanticType::Null => write!(f, "null"),
            SemanticType::Bool => write!(f, "bool"),
            SemanticType::Byte => write!(f, "byte"),
            SemanticType::Int => write!(f, "int"),
            SemanticType::Nominal { name, .. } => write!(f, "{}", name),
            SemanticType::Array(arr) => write!(f, "{}[]", Bracketed(&arr.element)),
            SemanticType::Reference(r) => match &r.lifetime {
                Some(l) => write!(f, "&{}:{}", l, Bracketed(&r.element)),
                None => write!(f, "&{}", Bracketed(&r.element)),
            },
            SemanticType::Record(rec) => {
                write!(f, "{{")?;
                for (i, (name, ty)) in rec.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", ty, name)?;
                }
                if rec.open {
                    write!(f, ", ...")?;
                }
                write!(f, "}}")
            }
            SemanticType::Callable(sig) => {
                let keyword = match sig.kind {
                    CallableKind::Function => "function",
                    CallableKind::Method => "method",
                };
                write!(f, "{}(", keyword)?;
                for (i, p) in sig.parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")->(")?;
                for (i, r) in sig.returns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", r)?;
                }
                write!(f, ")")
            }
            SemanticType::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", Bracketed(member))?;
                }
                Ok(())
            }
            SemanticType::Intersection(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "&")?;
                    }
                    write!(f, "{}", Bracketed(member))?;
                }
                Ok(())
            }
            SemanticType::Negation(inner) => write!(f, "!{}", Bracketed(inner)),
        }
    }
}

/// Parenthesises connective terms when nested inside another term
struct Bracketed<'a>(&'a SemanticType);

impl fmt::Display for Bracketed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            SemanticType::Union(_) | SemanticType::Intersection(_) => {
                write!(f, "({})", self.0)
            }
            _ => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_flattens() {
        let t = SemanticType::union(vec![
            SemanticType::Int,
            SemanticType::union(vec![SemanticType::Null, SemanticType::Int]),
        ]);
        assert_eq!(
            t,
            SemanticType::Union(vec![SemanticType::Int, SemanticType::Null])
        );
    }

    #[test]
    fn test_union_identities() {
        assert_eq!(
            SemanticType::union(vec![SemanticType::Void, SemanticType::Int]),
            SemanticType::Int
        );
        assert_eq!(
            SemanticType::union(vec![SemanticType::Any, SemanticType::Int]),
            SemanticType::Any
        );
        assert_eq!(SemanticType::union(vec![]), SemanticType::Void);
    }

    #[test]
    fn test_intersection_identities() {
        assert_eq!(
            SemanticType::intersection(vec![SemanticType::Any, SemanticType::Int]),
            SemanticType::Int
        );
        assert_eq!(
            SemanticType::intersection(vec![SemanticType::Void, SemanticType::Int]),
            SemanticType::Void
        );
        assert_eq!(SemanticType::intersection(vec![]), SemanticType::Any);
    }

    #[test]
    fn test_double_negation() {
        let t = SemanticType::negation(SemanticType::negation(SemanticType::Int));
        assert_eq!(t, SemanticType::Int);
        assert_eq!(
            SemanticType::negation(SemanticType::Any),
            SemanticType::Void
        );
    }

    #[test]
    fn test_display() {
        let t = SemanticType::union(vec![SemanticType::Int, SemanticType::Null]);
        assert_eq!(t.to_string(), "int|null");
        let d = SemanticType::difference(SemanticType::Int, SemanticType::Null);
        assert_eq!(d.to_string(), "int&!null");
        assert_eq!(
            SemanticType::array(SemanticType::Int).to_string(),
            "int[]"
        );
    }
}
