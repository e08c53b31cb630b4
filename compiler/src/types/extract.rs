//! Type extraction
//!
//! Two projections out of the semantic algebra live here:
//!
//! * [`ConcreteTypeExtractor`] reduces a semantic term to a concrete surface
//!   type with no residual intersections or negations, by normalising to a
//!   disjunction, dropping empty disjuncts and rebuilding as a union.
//! * [`ReadWriteExtractor`] projects a composite type onto a readable or
//!   writeable array/record/reference/callable shape. Reads need a common
//!   super-shape across union variants, so variants combine covariantly;
//!   writes need a common sub-shape that fits every variant, so they
//!   combine contravariantly.

use crate::ast::{CallableKind, Module, Signature, Type};
use crate::common::DeclId;
use crate::types::emptiness::{
    intersect_arrays, intersect_callables, intersect_records, intersect_references,
    lifetime_meet, to_dnf, Conjunct, LifetimeRelation,
};
use crate::types::semantic::{
    ArrayType, RecordType, ReferenceType, SemanticSignature, SemanticType,
};
use crate::types::subtype::SubtypeOperator;
use rustc_hash::FxHashSet;

// ==================== NORMALISATION ====================

/// Rewrite a term as a union of merged, non-empty conjuncts with negative
/// literals dropped. The result over-approximates the input, which is the
/// right direction for both extractors.
fn normalize(
    subtype: &SubtypeOperator<'_>,
    ty: &SemanticType,
    lifetimes: &dyn LifetimeRelation,
) -> SemanticType {
    normalize_with(subtype, ty, lifetimes, &mut FxHashSet::default())
}

fn normalize_with(
    subtype: &SubtypeOperator<'_>,
    ty: &SemanticType,
    lifetimes: &dyn LifetimeRelation,
    unfolded: &mut FxHashSet<DeclId>,
) -> SemanticType {
    let mut members = Vec::new();
    for conjunct in to_dnf(ty) {
        if subtype.oracle().conjunct_is_void(&conjunct, lifetimes) {
            continue;
        }
        members.push(merge_conjunct(subtype, &conjunct, lifetimes, unfolded));
    }
    SemanticType::union(members)
}

/// Collapse the positive literals of a non-empty conjunct into one term
fn merge_conjunct(
    subtype: &SubtypeOperator<'_>,
    conjunct: &Conjunct,
    lifetimes: &dyn LifetimeRelation,
    unfolded: &mut FxHashSet<DeclId>,
) -> SemanticType {
    let positives: Vec<SemanticType> = conjunct
        .pos
        .iter()
        .filter(|t| **t != SemanticType::Any)
        .cloned()
        .collect();
    match positives.len() {
        0 => return SemanticType::Any,
        1 => return positives.into_iter().next().unwrap(),
        _ => {}
    }
    // A literal below all the others already is the intersection; this
    // keeps nominals intact (e.g. `nat ∧ int` is just `nat`).
    if let Some(best) = most_specific(subtype, &positives, lifetimes) {
        let mut positives = positives;
        return positives.swap_remove(best);
    }
    // Otherwise unfold nominal literals (each declaration at most once per
    // normalisation, which bounds recursion on ill-formed cyclic modules)
    // and renormalise the remaining intersection.
    let mut any_nominal = false;
    let mut rest = Vec::with_capacity(positives.len());
    for p in positives {
        match p {
            SemanticType::Nominal { decl, .. } => {
                any_nominal = true;
                if !unfolded.insert(decl) {
                    continue;
                }
                if let Some(td) = subtype.module().type_decl(decl) {
                    rest.push(SemanticType::from(td.underlying()));
                }
            }
            other => rest.push(other),
        }
    }
    if any_nominal {
        let term = SemanticType::intersection(rest);
        return normalize_with(subtype, &term, lifetimes, unfolded);
    }
    merge_structural(rest, lifetimes)
}

fn most_specific(
    subtype: &SubtypeOperator<'_>,
    positives: &[SemanticType],
    lifetimes: &dyn LifetimeRelation,
) -> Option<usize> {
    positives.iter().position(|candidate| {
        positives
            .iter()
            .all(|other| subtype.is_subtype(candidate, other, lifetimes))
    })
}

/// Merge same-kind structural atoms via their greatest lower bound
fn merge_structural(
    positives: Vec<SemanticType>,
    lifetimes: &dyn LifetimeRelation,
) -> SemanticType {
    let mut iter = positives.into_iter();
    let Some(mut acc) = iter.next() else {
        return SemanticType::Any;
    };
    for next in iter {
        acc = match (acc, next) {
            (SemanticType::Array(a), SemanticType::Array(b)) => {
                SemanticType::Array(intersect_arrays(&a, &b))
            }
            (SemanticType::Record(a), SemanticType::Record(b)) => {
                match intersect_records(&a, &b) {
                    Some(merged) => SemanticType::Record(merged),
                    None => return SemanticType::Void,
                }
            }
            (SemanticType::Reference(a), SemanticType::Reference(b)) => {
                match intersect_references(&a, &b, lifetimes) {
                    Some(merged) => SemanticType::Reference(merged),
                    None => return SemanticType::Void,
                }
            }
            (SemanticType::Callable(a), SemanticType::Callable(b)) => {
                match intersect_callables(&a, &b) {
                    Some(merged) => SemanticType::Callable(merged),
                    None => return SemanticType::Void,
                }
            }
            // Identical primitives collapse; anything else was already
            // ruled out by the emptiness check on this conjunct.
            (a, b) if a == b => a,
            (a, _) => a,
        };
    }
    acc
}

// ==================== CONCRETE TYPE EXTRACTION ====================

/// Reduces a semantic term to the concrete surface representation.
///
/// `Type::Void` in the output signals that no value-bearing disjunct
/// survived, which callers report as an upstream type error.
pub struct ConcreteTypeExtractor<'m> {
    subtype: SubtypeOperator<'m>,
}

impl<'m> ConcreteTypeExtractor<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self {
            subtype: SubtypeOperator::strict(module),
        }
    }

    pub fn apply(&self, ty: &SemanticType, lifetimes: &dyn LifetimeRelation) -> Type {
        let normalized = normalize(&self.subtype, ty, lifetimes);
        self.concrete(&normalized, lifetimes)
    }

    fn concrete(&self, ty: &SemanticType, lifetimes: &dyn LifetimeRelation) -> Type {
        match ty {
            SemanticType::Void => Type::Void,
            SemanticType::Any => Type::Any,
            SemanticType::Null => Type::Null,
            SemanticType::Bool => Type::Bool,
            SemanticType::Byte => Type::Byte,
            SemanticType::Int => Type::Int,
            SemanticType::Nominal { name, decl } => Type::Nominal {
                name: name.clone(),
                decl: *decl,
            },
            SemanticType::Array(arr) => {
                Type::array(self.apply(&arr.element, lifetimes))
            }
            SemanticType::Reference(r) => Type::Reference {
                element: Box::new(self.apply(&r.element, lifetimes)),
                lifetime: r.lifetime.clone(),
            },
            SemanticType::Record(rec) => Type::Record {
                open: rec.open,
                fields: rec
                    .fields
                    .iter()
                    .map(|(name, field)| (name.clone(), self.apply(field, lifetimes)))
                    .collect(),
            },
            SemanticType::Callable(sig) => Type::Callable(Signature {
                kind: sig.kind,
                lifetimes: sig.lifetimes.clone(),
                parameters: sig
                    .parameters
                    .iter()
                    .map(|p| self.apply(p, lifetimes))
                    .collect(),
                returns: sig.returns.iter().map(|r| self.apply(r, lifetimes)).collect(),
            }),
            SemanticType::Union(members) => {
                let mut out: Vec<Type> = Vec::new();
                for member in members {
                    let concrete = self.concrete(member, lifetimes);
                    if concrete != Type::Void && !out.contains(&concrete) {
                        out.push(concrete);
                    }
                }
                Type::union(out)
            }
            // Normalisation never leaves connectives at this position
            SemanticType::Intersection(_) | SemanticType::Negation(_) => Type::Any,
        }
    }
}

// ==================== READ/WRITE EXTRACTION ====================

/// Projects a composite type onto one constructor shape, as a readable
/// (covariant) or writeable (contravariant) view.
pub struct ReadWriteExtractor<'m> {
    subtype: SubtypeOperator<'m>,
}

impl<'m> ReadWriteExtractor<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self {
            subtype: SubtypeOperator::strict(module),
        }
    }

    fn module(&self) -> &'m Module {
        self.subtype.module()
    }

    pub fn readable_array(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
    ) -> Option<ArrayType> {
        let n = normalize(&self.subtype, ty, lifetimes);
        self.array_shape(&n, lifetimes, true, &mut FxHashSet::default())
    }

    pub fn writeable_array(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
    ) -> Option<ArrayType> {
        let n = normalize(&self.subtype, ty, lifetimes);
        self.array_shape(&n, lifetimes, false, &mut FxHashSet::default())
    }

    pub fn readable_record(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
    ) -> Option<RecordType> {
        let n = normalize(&self.subtype, ty, lifetimes);
        self.record_shape(&n, lifetimes, true, &mut FxHashSet::default())
    }

    pub fn writeable_record(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
    ) -> Option<RecordType> {
        let n = normalize(&self.subtype, ty, lifetimes);
        self.record_shape(&n, lifetimes, false, &mut FxHashSet::default())
    }

    pub fn readable_reference(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
    ) -> Option<ReferenceType> {
        let n = normalize(&self.subtype, ty, lifetimes);
        self.reference_shape(&n, lifetimes, true, &mut FxHashSet::default())
    }

    pub fn writeable_reference(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
    ) -> Option<ReferenceType> {
        let n = normalize(&self.subtype, ty, lifetimes);
        self.reference_shape(&n, lifetimes, false, &mut FxHashSet::default())
    }

    pub fn readable_callable(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
    ) -> Option<SemanticSignature> {
        let n = normalize(&self.subtype, ty, lifetimes);
        self.callable_shape(&n, lifetimes, &mut FxHashSet::default())
    }

    fn unfold(&self, decl: DeclId, visited: &mut FxHashSet<DeclId>) -> Option<SemanticType> {
        if !visited.insert(decl) {
            return None;
        }
        self.module()
            .type_decl(decl)
            .map(|td| SemanticType::from(td.underlying()))
    }

    fn array_shape(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
        readable: bool,
        visited: &mut FxHashSet<DeclId>,
    ) -> Option<ArrayType> {
        match ty {
            SemanticType::Array(a) => Some(a.clone()),
            SemanticType::Nominal { decl, .. } => {
                let body = self.unfold(*decl, visited)?;
                self.array_shape(&body, lifetimes, readable, visited)
            }
            SemanticType::Union(members) => {
                let mut shapes = members
                    .iter()
                    .map(|m| self.array_shape(m, lifetimes, readable, visited));
                let mut acc = shapes.next()??;
                for shape in shapes {
                    let shape = shape?;
                    acc = if readable {
                        ArrayType::new(SemanticType::union(vec![
                            (*acc.element).clone(),
                            (*shape.element).clone(),
                        ]))
                    } else {
                        intersect_arrays(&acc, &shape)
                    };
                }
                Some(acc)
            }
            SemanticType::Intersection(members) => {
                let mut shapes = members
                    .iter()
                    .map(|m| self.array_shape(m, lifetimes, readable, visited));
                let mut acc = shapes.next()??;
                for shape in shapes {
                    acc = intersect_arrays(&acc, &shape?);
                }
                Some(acc)
            }
            _ => None,
        }
    }

    fn record_shape(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
        readable: bool,
        visited: &mut FxHashSet<DeclId>,
    ) -> Option<RecordType> {
        match ty {
            SemanticType::Record(r) => Some(r.clone()),
            SemanticType::Nominal { decl, .. } => {
                let body = self.unfold(*decl, visited)?;
                self.record_shape(&body, lifetimes, readable, visited)
            }
            SemanticType::Union(members) => {
                let mut shapes = members
                    .iter()
                    .map(|m| self.record_shape(m, lifetimes, readable, visited));
                let mut acc = shapes.next()??;
                for shape in shapes {
                    acc = combine_records(&acc, &shape?, readable);
                }
                Some(acc)
            }
            SemanticType::Intersection(members) => {
                let mut shapes = members
                    .iter()
                    .map(|m| self.record_shape(m, lifetimes, readable, visited));
                let mut acc = shapes.next()??;
                for shape in shapes {
                    acc = intersect_records(&acc, &shape?)?;
                }
                Some(acc)
            }
            _ => None,
        }
    }

    fn reference_shape(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
        readable: bool,
        visited: &mut FxHashSet<DeclId>,
    ) -> Option<ReferenceType> {
        match ty {
            SemanticType::Reference(r) => Some(r.clone()),
            SemanticType::Nominal { decl, .. } => {
                let body = self.unfold(*decl, visited)?;
                self.reference_shape(&body, lifetimes, readable, visited)
            }
            SemanticType::Union(members) => {
                let mut shapes = members
                    .iter()
                    .map(|m| self.reference_shape(m, lifetimes, readable, visited));
                let mut acc = shapes.next()??;
                for shape in shapes {
                    let shape = shape?;
                    acc = if readable {
                        let lifetime = if acc.lifetime == shape.lifetime {
                            acc.lifetime.clone()
                        } else {
                            None
                        };
                        ReferenceType {
                            element: Box::new(SemanticType::union(vec![
                                (*acc.element).clone(),
                                (*shape.element).clone(),
                            ])),
                            lifetime,
                        }
                    } else {
                        let lifetime = lifetime_meet(
                            acc.lifetime.as_deref(),
                            shape.lifetime.as_deref(),
                            lifetimes,
                        )?;
                        ReferenceType {
                            element: Box::new(SemanticType::intersect(
                                (*acc.element).clone(),
                                (*shape.element).clone(),
                            )),
                            lifetime,
                        }
                    };
                }
                Some(acc)
            }
            SemanticType::Intersection(members) => {
                let mut shapes = members
                    .iter()
                    .map(|m| self.reference_shape(m, lifetimes, readable, visited));
                let mut acc = shapes.next()??;
                for shape in shapes {
                    acc = intersect_references(&acc, &shape?, lifetimes)?;
                }
                Some(acc)
            }
            _ => None,
        }
    }

    fn callable_shape(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
        visited: &mut FxHashSet<DeclId>,
    ) -> Option<SemanticSignature> {
        match ty {
            SemanticType::Callable(sig) => Some(sig.clone()),
            SemanticType::Nominal { decl, .. } => {
                let body = self.unfold(*decl, visited)?;
                self.callable_shape(&body, lifetimes, visited)
            }
            SemanticType::Union(members) => {
                let mut shapes = members
                    .iter()
                    .map(|m| self.callable_shape(m, lifetimes, visited));
                let mut acc = shapes.next()??;
                for shape in shapes {
                    acc = combine_callables_readable(&acc, &shape?)?;
                }
                Some(acc)
            }
            SemanticType::Intersection(members) => {
                let mut shapes = members
                    .iter()
                    .map(|m| self.callable_shape(m, lifetimes, visited));
                let mut acc = shapes.next()??;
                for shape in shapes {
                    acc = intersect_callables(&acc, &shape?)?;
                }
                Some(acc)
            }
            _ => None,
        }
    }
}

/// Combine record shapes across union variants.
///
/// Readable: only fields common to every variant can be read, each at the
/// union of its types. Writeable: only fields common to every variant can
/// be written, each at the intersection of its types.
fn combine_records(a: &RecordType, b: &RecordType, readable: bool) -> RecordType {
    let mut fields = Vec::new();
    for (name, aty) in &a.fields {
        if let Some(bty) = b.field(name) {
            let ty = if readable {
                SemanticType::union(vec![aty.clone(), bty.clone()])
            } else {
                SemanticType::intersect(aty.clone(), bty.clone())
            };
            fields.push((name.clone(), ty));
        }
    }
    let open = if readable {
        a.open || b.open
    } else {
        a.open && b.open
    };
    RecordType::new(open, fields)
}

/// Combine callable shapes across union variants: a value of either type
/// must accept the call, so parameters meet and returns join.
fn combine_callables_readable(
    a: &SemanticSignature,
    b: &SemanticSignature,
) -> Option<SemanticSignature> {
    if a.parameters.len() != b.parameters.len() || a.returns.len() != b.returns.len() {
        return None;
    }
    let kind = match (a.kind, b.kind) {
        (CallableKind::Function, CallableKind::Function) => CallableKind::Function,
        _ => CallableKind::Method,
    };
    let mut lifetimes = a.lifetimes.clone();
    for l in &b.lifetimes {
        if !lifetimes.contains(l) {
            lifetimes.push(l.clone());
        }
    }
    Some(SemanticSignature {
        kind,
        lifetimes,
        parameters: a
            .parameters
            .iter()
            .zip(&b.parameters)
            .map(|(x, y)| SemanticType::intersect(x.clone(), y.clone()))
            .collect(),
        returns: a
            .returns
            .iter()
            .zip(&b.returns)
            .map(|(x, y)| SemanticType::union(vec![x.clone(), y.clone()]))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Module;
    use crate::types::emptiness::NoLifetimes;

    fn int_or_null() -> SemanticType {
        SemanticType::union(vec![SemanticType::Int, SemanticType::Null])
    }

    #[test]
    fn test_concrete_refinement_collapse() {
        let module = Module::default();
        let cte = ConcreteTypeExtractor::new(&module);
        // (int|null) ∧ int reduces to int
        let refined = SemanticType::intersect(int_or_null(), SemanticType::Int);
        assert_eq!(cte.apply(&refined, &NoLifetimes), Type::Int);
        // (int|null) ∧ ¬null reduces to int
        let refined = SemanticType::difference(int_or_null(), SemanticType::Null);
        assert_eq!(cte.apply(&refined, &NoLifetimes), Type::Int);
        // (int|null) ∧ ¬int ∧ ¬null has no disjuncts left
        let nothing = SemanticType::difference(
            SemanticType::difference(int_or_null(), SemanticType::Int),
            SemanticType::Null,
        );
        assert_eq!(cte.apply(&nothing, &NoLifetimes), Type::Void);
    }

    #[test]
    fn test_concrete_folds_duplicates() {
        let module = Module::default();
        let cte = ConcreteTypeExtractor::new(&module);
        let dup = SemanticType::Union(vec![SemanticType::Int, SemanticType::Int]);
        assert_eq!(cte.apply(&dup, &NoLifetimes), Type::Int);
    }

    #[test]
    fn test_readable_array_over_union() {
        let module = Module::default();
        let rwe = ReadWriteExtractor::new(&module);
        let ty = SemanticType::union(vec![
            SemanticType::array(SemanticType::Int),
            SemanticType::array(SemanticType::Null),
        ]);
        let shape = rwe.readable_array(&ty, &NoLifetimes).unwrap();
        assert_eq!(*shape.element, int_or_null());
        // a union with a non-array branch has no array shape
        let mixed = SemanticType::union(vec![
            SemanticType::array(SemanticType::Int),
            SemanticType::Null,
        ]);
        assert!(rwe.readable_array(&mixed, &NoLifetimes).is_none());
        assert!(rwe.readable_array(&SemanticType::Int, &NoLifetimes).is_none());
    }

    #[test]
    fn test_writeable_array_over_union() {
        let module = Module::default();
        let rwe = ReadWriteExtractor::new(&module);
        let ty = SemanticType::union(vec![
            SemanticType::array(int_or_null()),
            SemanticType::array(SemanticType::Int),
        ]);
        // writes must fit both branches
        let shape = rwe.writeable_array(&ty, &NoLifetimes).unwrap();
        let module2 = Module::default();
        let op = SubtypeOperator::strict(&module2);
        assert!(op.is_subtype(&shape.element, &SemanticType::Int, &NoLifetimes));
    }

    #[test]
    fn test_record_shapes_over_union() {
        let module = Module::default();
        let rwe = ReadWriteExtractor::new(&module);
        let a = SemanticType::record(
            false,
            vec![
                ("f".to_string(), SemanticType::Int),
                ("g".to_string(), SemanticType::Bool),
            ],
        );
        let b = SemanticType::record(false, vec![("f".to_string(), SemanticType::Null)]);
        let ty = SemanticType::union(vec![a, b]);
        let readable = rwe.readable_record(&ty, &NoLifetimes).unwrap();
        // only the common field survives, at the union of its types
        assert_eq!(readable.fields.len(), 1);
        assert_eq!(
            readable.field("f"),
            Some(&SemanticType::union(vec![
                SemanticType::Int,
                SemanticType::Null
            ]))
        );
    }

    #[test]
    fn test_refined_extraction() {
        // After `x is int[]` on `x : int[]|null` the environment holds an
        // intersection; extraction must see through it.
        let module = Module::default();
        let rwe = ReadWriteExtractor::new(&module);
        let declared = SemanticType::union(vec![
            SemanticType::array(SemanticType::Int),
            SemanticType::Null,
        ]);
        let refined =
            SemanticType::intersect(declared, SemanticType::array(SemanticType::Int));
        let shape = rwe.readable_array(&refined, &NoLifetimes).unwrap();
        assert_eq!(*shape.element, SemanticType::Int);
    }

    #[test]
    fn test_readable_callable() {
        let module = Module::default();
        let rwe = ReadWriteExtractor::new(&module);
        let sig = SemanticSignature {
            kind: CallableKind::Function,
            lifetimes: vec![],
            parameters: vec![SemanticType::Int],
            returns: vec![SemanticType::Int],
        };
        let ty = SemanticType::Callable(sig.clone());
        assert_eq!(rwe.readable_callable(&ty, &NoLifetimes), Some(sig));
        assert!(rwe.readable_callable(&SemanticType::Int, &NoLifetimes).is_none());
    }
}
