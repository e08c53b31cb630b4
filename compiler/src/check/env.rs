//! Typing environment
//!
//! Maps variable declarations to their current known type, which is always
//! a subtype of the declared type, and records the lifetime nesting
//! introduced by named blocks. Environments are value-like: refinement
//! copies, the original is left alone.
//!
//! A distinguished BOTTOM environment marks unreachable program points.
//! BOTTOM is the identity of [`Environment::union`], and statement checking
//! reports `UNREACHABLE_CODE` whenever it receives one.

use crate::common::VarId;
use crate::types::emptiness::LifetimeRelation;
use crate::types::semantic::SemanticType;
use rustc_hash::{FxHashMap, FxHashSet};

/// Per-variable refinement map plus the lifetime within-relation
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bottom: bool,
    refinements: FxHashMap<VarId, SemanticType>,
    within: FxHashMap<String, FxHashSet<String>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// The unreachable-point sentinel
    pub fn bottom() -> Self {
        Self {
            bottom: true,
            refinements: FxHashMap::default(),
            within: FxHashMap::default(),
        }
    }

    pub fn is_bottom(&self) -> bool {
        self.bottom
    }

    /// The refinement currently recorded for a variable, if any
    pub fn refinement(&self, var: VarId) -> Option<&SemanticType> {
        self.refinements.get(&var)
    }

    /// Record a new known type for a variable
    pub fn refine(&self, var: VarId, ty: SemanticType) -> Environment {
        let mut next = self.clone();
        next.refinements.insert(var, ty);
        next
    }

    /// Introduce a lifetime name enclosed by all the given lifetimes
    pub fn declare_within(&self, name: &str, enclosing: &[String]) -> Environment {
        let mut next = self.clone();
        next.within
            .insert(name.to_string(), enclosing.iter().cloned().collect());
        next
    }

    /// Join two environments at a merge point.
    ///
    /// Variables refined on both sides keep the union of their types; a
    /// refinement present on only one side is dropped, which falls back to
    /// the declared type. BOTTOM is the identity.
    pub fn union(a: &Environment, b: &Environment) -> Environment {
        if a.bottom {
            return b.clone();
        }
        if b.bottom {
            return a.clone();
        }
        let mut refinements = FxHashMap::default();
        for (var, a_ty) in &a.refinements {
            if let Some(b_ty) = b.refinements.get(var) {
                refinements.insert(
                    *var,
                    SemanticType::union(vec![a_ty.clone(), b_ty.clone()]),
                );
            }
        }
        let mut within = a.within.clone();
        for (name, enclosing) in &b.within {
            within
                .entry(name.clone())
                .or_default()
                .extend(enclosing.iter().cloned());
        }
        Environment {
            bottom: false,
            refinements,
            within,
        }
    }
}

impl LifetimeRelation for Environment {
    fn is_within(&self, inner: &str, outer: &str) -> bool {
        if inner == outer {
            return true;
        }
        self.within
            .get(inner)
            .map(|enclosing| enclosing.contains(outer))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_is_union_identity() {
        let env = Environment::new().refine(VarId(1), SemanticType::Int);
        let joined = Environment::union(&Environment::bottom(), &env);
        assert!(!joined.is_bottom());
        assert_eq!(joined.refinement(VarId(1)), Some(&SemanticType::Int));
        let joined = Environment::union(&env, &Environment::bottom());
        assert_eq!(joined.refinement(VarId(1)), Some(&SemanticType::Int));
        let joined = Environment::union(&Environment::bottom(), &Environment::bottom());
        assert!(joined.is_bottom());
    }

    #[test]
    fn test_union_of_refinements() {
        let base = Environment::new();
        let left = base.refine(VarId(1), SemanticType::Int);
        let right = base.refine(VarId(1), SemanticType::Null);
        let joined = Environment::union(&left, &right);
        assert_eq!(
            joined.refinement(VarId(1)),
            Some(&SemanticType::union(vec![
                SemanticType::Int,
                SemanticType::Null
            ]))
        );
    }

    #[test]
    fn test_one_sided_refinement_drops() {
        let base = Environment::new();
        let left = base.refine(VarId(1), SemanticType::Int);
        let joined = Environment::union(&left, &base);
        assert_eq!(joined.refinement(VarId(1)), None);
    }

    #[test]
    fn test_within_relation() {
        let env = Environment::new()
            .declare_within("outer", &["this".to_string()])
            .declare_within("inner", &["this".to_string(), "outer".to_string()]);
        assert!(env.is_within("inner", "outer"));
        assert!(env.is_within("inner", "this"));
        assert!(env.is_within("inner", "inner"));
        assert!(!env.is_within("outer", "inner"));
    }
}
