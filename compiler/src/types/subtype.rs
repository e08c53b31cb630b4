//! Subtype operator
//!
//! `S <: T` reduces to emptiness of `S ∧ ¬T`. The operator also hosts the
//! contractiveness check for named type declarations, which guards the
//! oracle's nominal unfolding against degenerate cycles.

use crate::ast::{Module, Type};
use crate::common::DeclId;
use crate::types::emptiness::{EmptinessOracle, LifetimeRelation};
use crate::types::semantic::SemanticType;
use rustc_hash::FxHashSet;

/// Semantic subtyping over a fixed emptiness oracle
pub struct SubtypeOperator<'m> {
    oracle: EmptinessOracle<'m>,
}

impl<'m> SubtypeOperator<'m> {
    pub fn new(oracle: EmptinessOracle<'m>) -> Self {
        Self { oracle }
    }

    pub fn strict(module: &'m Module) -> Self {
        Self::new(EmptinessOracle::strict(module))
    }

    pub fn relaxed(module: &'m Module) -> Self {
        Self::new(EmptinessOracle::relaxed(module))
    }

    pub fn module(&self) -> &'m Module {
        self.oracle.module()
    }

    pub(crate) fn oracle(&self) -> &EmptinessOracle<'m> {
        &self.oracle
    }

    /// Is `ty` uninhabited?
    pub fn is_void(&self, ty: &SemanticType, lifetimes: &dyn LifetimeRelation) -> bool {
        self.oracle.is_void(ty, lifetimes)
    }

    /// Does every value of `sub` belong to `sup`?
    pub fn is_subtype(
        &self,
        sub: &SemanticType,
        sup: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
    ) -> bool {
        let difference = SemanticType::difference(sub.clone(), sup.clone());
        self.oracle.is_void(&difference, lifetimes)
    }

    /// A type declaration is contractive iff every syntactic cycle back to
    /// it passes through a non-nominal constructor. `type cyc is cyc` is the
    /// degenerate counterexample.
    pub fn is_contractive(&self, decl: DeclId) -> bool {
        let Some(type_decl) = self.module().type_decl(decl) else {
            return true;
        };
        let mut visited = FxHashSet::default();
        visited.insert(decl);
        self.contractive_path(type_decl.underlying(), decl, &mut visited)
    }

    fn contractive_path(
        &self,
        ty: &Type,
        target: DeclId,
        visited: &mut FxHashSet<DeclId>,
    ) -> bool {
        match ty {
            Type::Nominal { decl, .. } => {
                if *decl == target {
                    return false;
                }
                if !visited.insert(*decl) {
                    // A cycle that avoids the target; that declaration is
                    // judged on its own.
                    return true;
                }
                match self.module().type_decl(*decl) {
                    Some(inner) => self.contractive_path(inner.underlying(), target, visited),
                    None => true,
                }
            }
            // Unions pass the obligation through to every member
            Type::Union(members) => members
                .iter()
                .all(|m| self.contractive_path(m, target, visited)),
            // Any constructor breaks the cycle
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Decl, TypeDecl, VariableDecl};
    use crate::common::{NodeId, Path, Span, VarId};
    use crate::types::emptiness::NoLifetimes;

    fn type_decl(name: &str, var: u32, ty: Type) -> Decl {
        Decl::Type(TypeDecl {
            id: NodeId::dummy(),
            name: Path::simple(name),
            var: VariableDecl {
                id: NodeId::dummy(),
                var: VarId(var),
                name: "$".to_string(),
                ty,
                initialiser: None,
                span: Span::dummy(),
            },
            invariant: Vec::new(),
            span: Span::dummy(),
        })
    }

    fn nominal(name: &str, decl: u32) -> Type {
        Type::Nominal {
            name: Path::simple(name),
            decl: DeclId(decl),
        }
    }

    #[test]
    fn test_reflexivity() {
        let module = Module::default();
        let op = SubtypeOperator::relaxed(&module);
        let types = [
            SemanticType::Int,
            SemanticType::union(vec![SemanticType::Int, SemanticType::Null]),
            SemanticType::array(SemanticType::Bool),
            SemanticType::record(false, vec![("f".to_string(), SemanticType::Int)]),
        ];
        for ty in &types {
            assert!(op.is_subtype(ty, ty, &NoLifetimes), "{} <: {}", ty, ty);
        }
    }

    #[test]
    fn test_union_subtyping() {
        let module = Module::default();
        let op = SubtypeOperator::relaxed(&module);
        let int_or_null = SemanticType::union(vec![SemanticType::Int, SemanticType::Null]);
        assert!(op.is_subtype(&SemanticType::Int, &int_or_null, &NoLifetimes));
        assert!(!op.is_subtype(&int_or_null, &SemanticType::Int, &NoLifetimes));
    }

    #[test]
    fn test_recursive_nominal_subtyping() {
        // type list is null | {list next}
        let list_ty = Type::Union(vec![
            Type::Null,
            Type::Record {
                open: false,
                fields: vec![("next".to_string(), nominal("list", 0))],
            },
        ]);
        let module = Module {
            declarations: vec![type_decl("list", 1, list_ty)],
            roots: vec![DeclId(0)],
        };
        let op = SubtypeOperator::relaxed(&module);
        let list = SemanticType::Nominal {
            name: Path::simple("list"),
            decl: DeclId(0),
        };
        assert!(op.is_subtype(&list, &list, &NoLifetimes));
        assert!(!op.is_void(&list, &NoLifetimes));
        // null <: list
        assert!(op.is_subtype(&SemanticType::Null, &list, &NoLifetimes));
    }

    #[test]
    fn test_infinite_nominal_is_void() {
        // type inf is {inf next} has no finite inhabitant
        let inf_ty = Type::Record {
            open: false,
            fields: vec![("next".to_string(), nominal("inf", 0))],
        };
        let module = Module {
            declarations: vec![type_decl("inf", 1, inf_ty)],
            roots: vec![DeclId(0)],
        };
        let op = SubtypeOperator::relaxed(&module);
        let inf = SemanticType::Nominal {
            name: Path::simple("inf"),
            decl: DeclId(0),
        };
        assert!(op.is_void(&inf, &NoLifetimes));
    }

    #[test]
    fn test_contractiveness() {
        // type cyc is cyc
        let module = Module {
            declarations: vec![type_decl("cyc", 1, nominal("cyc", 0))],
            roots: vec![DeclId(0)],
        };
        let op = SubtypeOperator::relaxed(&module);
        assert!(!op.is_contractive(DeclId(0)));

        // type a is b; type b is a
        let module = Module {
            declarations: vec![
                type_decl("a", 1, nominal("b", 1)),
                type_decl("b", 2, nominal("a", 0)),
            ],
            roots: vec![DeclId(0), DeclId(1)],
        };
        let op = SubtypeOperator::relaxed(&module);
        assert!(!op.is_contractive(DeclId(0)));
        assert!(!op.is_contractive(DeclId(1)));

        // type list is null | {list next} is contractive
        let list_ty = Type::Union(vec![
            Type::Null,
            Type::Record {
                open: false,
                fields: vec![("next".to_string(), nominal("list", 0))],
            },
        ]);
        let module = Module {
            declarations: vec![type_decl("list", 1, list_ty)],
            roots: vec![DeclId(0)],
        };
        let op = SubtypeOperator::relaxed(&module);
        assert!(op.is_contractive(DeclId(0)));

        // type a is a | int: the left member cycles without a constructor
        let module = Module {
            declarations: vec![type_decl("a", 1, Type::Union(vec![nominal("a", 0), Type::Int]))],
            roots: vec![DeclId(0)],
        };
        let op = SubtypeOperator::relaxed(&module);
        assert!(!op.is_contractive(DeclId(0)));
    }
}
