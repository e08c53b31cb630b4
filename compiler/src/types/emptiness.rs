//! Emptiness testing for semantic types
//!
//! The oracle decides whether a semantic type is uninhabited. Subtyping
//! reduces to it (`S <: T` iff `S ∧ ¬T` is empty), so everything structural
//! about the type system bottoms out here.
//!
//! A term is first normalised to a disjunction of conjunctions of atomic
//! literals; the term is empty iff every conjunction is. Conjunctions are
//! decided by unfolding nominal links (guarded against cycles by an open
//! set keyed on declaration and polarity) and then merging the positive
//! atoms of each constructor kind, checking the merged atom against the
//! remaining negative literals.
//!
//! Two modes exist. Both unfold positive nominals to their underlying type.
//! For a negated nominal whose declaration carries a nontrivial invariant,
//! the strict oracle treats the complement as potentially inhabited and
//! concludes nothing from the literal, while the relaxed oracle unfolds
//! straight through the invariant. The strict oracle therefore never
//! collapses a refinement-bearing difference such as `int ∧ ¬nat`, which is
//! what dead-branch detection relies on.

use crate::ast::{CallableKind, Module};
use crate::common::DeclId;
use crate::types::semantic::{
    ArrayType, RecordType, ReferenceType, SemanticSignature, SemanticType,
};
use rustc_hash::FxHashSet;

/// Lifetime nesting, as captured by the typing environment.
///
/// `is_within(inner, outer)` holds when the region named `inner` is enclosed
/// by the region named `outer`. Implementations are expected to be reflexive.
pub trait LifetimeRelation {
    fn is_within(&self, inner: &str, outer: &str) -> bool;
}

/// A relation with no named lifetimes beyond reflexivity; useful in tests
/// and for module-level queries outside any declaration body.
pub struct NoLifetimes;

impl LifetimeRelation for NoLifetimes {
    fn is_within(&self, inner: &str, outer: &str) -> bool {
        inner == outer
    }
}

/// Nesting over optional lifetime names, where `None` stands for the
/// default lifetime `*` which encloses every other region.
pub(crate) fn lifetime_within(
    inner: Option<&str>,
    outer: Option<&str>,
    lifetimes: &dyn LifetimeRelation,
) -> bool {
    match (inner, outer) {
        (_, None) => true,
        (None, Some(outer)) => outer == "*",
        (Some(inner), Some(outer)) => inner == outer || lifetimes.is_within(inner, outer),
    }
}

/// The more deeply nested of two lifetimes, or `None` when they are
/// unrelated under the given relation.
pub(crate) fn lifetime_meet(
    a: Option<&str>,
    b: Option<&str>,
    lifetimes: &dyn LifetimeRelation,
) -> Option<Option<String>> {
    if lifetime_within(a, b, lifetimes) {
        Some(a.map(str::to_string))
    } else if lifetime_within(b, a, lifetimes) {
        Some(b.map(str::to_string))
    } else {
        None
    }
}

// ==================== ATOM MERGING ====================
//
// Greatest-lower-bound construction for two positive atoms of the same
// constructor kind. Returning `None` means the intersection is uninhabited
// on structural grounds alone.

pub(crate) fn intersect_arrays(a: &ArrayType, b: &ArrayType) -> ArrayType {
    ArrayType::new(SemanticType::intersect(
        (*a.element).clone(),
        (*b.element).clone(),
    ))
}

pub(crate) fn intersect_records(a: &RecordType, b: &RecordType) -> Option<RecordType> {
    let mut fields: Vec<(String, SemanticType)> = Vec::new();
    for (name, aty) in &a.fields {
        match b.field(name) {
            Some(bty) => fields.push((
                name.clone(),
                SemanticType::intersect(aty.clone(), bty.clone()),
            )),
            None if b.open => fields.push((name.clone(), aty.clone())),
            None => return None,
        }
    }
    for (name, bty) in &b.fields {
        if a.field(name).is_none() {
            if !a.open {
                return None;
            }
            fields.push((name.clone(), bty.clone()));
        }
    }
    Some(RecordType::new(a.open && b.open, fields))
}

pub(crate) fn intersect_references(
    a: &ReferenceType,
    b: &ReferenceType,
    lifetimes: &dyn LifetimeRelation,
) -> Option<ReferenceType> {
    let lifetime = lifetime_meet(a.lifetime.as_deref(), b.lifetime.as_deref(), lifetimes)?;
    Some(ReferenceType {
        element: Box::new(SemanticType::intersect(
            (*a.element).clone(),
            (*b.element).clone(),
        )),
        lifetime,
    })
}

pub(crate) fn intersect_callables(
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
    // Parameters meet contravariantly, returns covariantly
    let parameters = a
        .parameters
        .iter()
        .zip(&b.parameters)
        .map(|(x, y)| SemanticType::union(vec![x.clone(), y.clone()]))
        .collect();
    let returns = a
        .returns
        .iter()
        .zip(&b.returns)
        .map(|(x, y)| SemanticType::intersect(x.clone(), y.clone()))
        .collect();
    Some(SemanticSignature {
        kind,
        lifetimes,
        parameters,
        returns,
    })
}

// ==================== NORMALISATION ====================

/// A conjunction of possibly negated atomic terms
#[derive(Debug, Clone, Default)]
pub(crate) struct Conjunct {
    pub pos: Vec<SemanticType>,
    pub neg: Vec<SemanticType>,
}

impl Conjunct {
    fn merge(mut self, other: &Conjunct) -> Conjunct {
        self.pos.extend(other.pos.iter().cloned());
        self.neg.extend(other.neg.iter().cloned());
        self
    }

    /// Rebuild as a term, optionally excluding one positive and one
    /// negative literal by index.
    fn to_term(&self, skip_pos: Option<usize>, skip_neg: Option<usize>) -> SemanticType {
        let mut members: Vec<SemanticType> = Vec::new();
        for (i, p) in self.pos.iter().enumerate() {
            if skip_pos != Some(i) {
                members.push(p.clone());
            }
        }
        for (i, n) in self.neg.iter().enumerate() {
            if skip_neg != Some(i) {
                members.push(SemanticType::Negation(Box::new(n.clone())));
            }
        }
        SemanticType::intersection(members)
    }
}

/// Normalise a term to disjunctive normal form over atomic literals.
///
/// Purely syntactic: nominal links are kept as atoms and unfolded later.
pub(crate) fn to_dnf(ty: &SemanticType) -> Vec<Conjunct> {
    dnf_term(ty, true)
}

fn dnf_term(ty: &SemanticType, sign: bool) -> Vec<Conjunct> {
    match ty {
        SemanticType::Union(members) if sign => {
            members.iter().flat_map(|m| dnf_term(m, true)).collect()
        }
        SemanticType::Union(members) => dnf_cross(members, false),
        SemanticType::Intersection(members) if sign => dnf_cross(members, true),
        SemanticType::Intersection(members) => {
            members.iter().flat_map(|m| dnf_term(m, false)).collect()
        }
        SemanticType::Negation(inner) => dnf_term(inner, !sign),
        atom if sign => vec![Conjunct {
            pos: vec![atom.clone()],
            neg: Vec::new(),
        }],
        atom => vec![Conjunct {
            pos: Vec::new(),
            neg: vec![atom.clone()],
        }],
    }
}

/// Distribute conjunction over the disjuncts of every member
fn dnf_cross(members: &[SemanticType], sign: bool) -> Vec<Conjunct> {
    let mut acc = vec![Conjunct::default()];
    for member in members {
        let disjuncts = dnf_term(member, sign);
        let mut next = Vec::with_capacity(acc.len() * disjuncts.len());
        for left in &acc {
            for right in &disjuncts {
                next.push(left.clone().merge(right));
            }
        }
        acc = next;
    }
    acc
}

// ==================== THE ORACLE ====================

/// Which of the two emptiness interpretations to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleMode {
    Strict,
    Relaxed,
}

/// Decides `⊥(T)` under a lifetime relation.
///
/// Conservative in both modes: `true` is only returned when no value can
/// inhabit the type under the mode's reading of nominal invariants.
pub struct EmptinessOracle<'m> {
    module: &'m Module,
    mode: OracleMode,
}

/// Nominal unfoldings currently on the recursion path, by polarity.
/// Re-entering an open pair answers "empty" (the least-fixed-point reading).
type OpenSet = FxHashSet<(DeclId, bool)>;

/// Constructor kinds that can never overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AtomKind {
    Null,
    Bool,
    Byte,
    Int,
    Array,
    Record,
    Reference,
    Callable,
}

fn atom_kind(ty: &SemanticType) -> Option<AtomKind> {
    match ty {
        SemanticType::Null => Some(AtomKind::Null),
        SemanticType::Bool => Some(AtomKind::Bool),
        SemanticType::Byte => Some(AtomKind::Byte),
        SemanticType::Int => Some(AtomKind::Int),
        SemanticType::Array(_) => Some(AtomKind::Array),
        SemanticType::Record(_) => Some(AtomKind::Record),
        SemanticType::Reference(_) => Some(AtomKind::Reference),
        SemanticType::Callable(_) => Some(AtomKind::Callable),
        _ => None,
    }
}

impl<'m> EmptinessOracle<'m> {
    pub fn strict(module: &'m Module) -> Self {
        Self {
            module,
            mode: OracleMode::Strict,
        }
    }

    pub fn relaxed(module: &'m Module) -> Self {
        Self {
            module,
            mode: OracleMode::Relaxed,
        }
    }

    pub fn mode(&self) -> OracleMode {
        self.mode
    }

    pub fn module(&self) -> &'m Module {
        self.module
    }

    /// Is `ty` uninhabited?
    pub fn is_void(&self, ty: &SemanticType, lifetimes: &dyn LifetimeRelation) -> bool {
        let mut open = OpenSet::default();
        self.term_void(ty, lifetimes, &mut open)
    }

    pub(crate) fn term_void(
        &self,
        ty: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
        open: &mut OpenSet,
    ) -> bool {
        to_dnf(ty)
            .iter()
            .all(|c| self.conjunct_void(c, lifetimes, open))
    }

    /// `a <: b`, threading the current open set
    fn subtype_within(
        &self,
        a: &SemanticType,
        b: &SemanticType,
        lifetimes: &dyn LifetimeRelation,
        open: &mut OpenSet,
    ) -> bool {
        let difference = SemanticType::difference(a.clone(), b.clone());
        self.term_void(&difference, lifetimes, open)
    }

    /// Conjunct-level entry point for the normalisation pass
    pub(crate) fn conjunct_is_void(
        &self,
        conjunct: &Conjunct,
        lifetimes: &dyn LifetimeRelation,
    ) -> bool {
        self.conjunct_void(conjunct, lifetimes, &mut OpenSet::default())
    }

    fn conjunct_void(
        &self,
        conjunct: &Conjunct,
        lifetimes: &dyn LifetimeRelation,
        open: &mut OpenSet,
    ) -> bool {
        // Trivial contradictions
        if conjunct.pos.iter().any(|t| *t == SemanticType::Void) {
            return true;
        }
        if conjunct.neg.iter().any(|t| *t == SemanticType::Any) {
            return true;
        }
        // A nominal occurring with both polarities is contradictory whatever
        // its invariant means.
        for p in &conjunct.pos {
            if let SemanticType::Nominal { decl, .. } = p {
                let contradictory = conjunct
                    .neg
                    .iter()
                    .any(|n| matches!(n, SemanticType::Nominal { decl: d, .. } if d == decl));
                if contradictory {
                    return true;
                }
            }
        }
        // Unfold nominal literals one at a time, re-normalising after each
        if let Some(i) = conjunct
            .pos
            .iter()
            .position(|t| matches!(t, SemanticType::Nominal { .. }))
        {
            let decl = match &conjunct.pos[i] {
                SemanticType::Nominal { decl, .. } => *decl,
                _ => unreachable!(),
            };
            let rest = conjunct.to_term(Some(i), None);
            return match self.module.type_decl(decl) {
                Some(type_decl) => {
                    if !open.insert((decl, true)) {
                        return true;
                    }
                    let body = SemanticType::from(type_decl.underlying());
                    let term = SemanticType::intersect(body, rest);
                    let result = self.term_void(&term, lifetimes, open);
                    open.remove(&(decl, true));
                    result
                }
                // Unknown nominal kinds are treated as `any`
                None => self.term_void(&rest, lifetimes, open),
            };
        }
        if let Some(i) = conjunct
            .neg
            .iter()
            .position(|t| matches!(t, SemanticType::Nominal { .. }))
        {
            let decl = match &conjunct.neg[i] {
                SemanticType::Nominal { decl, .. } => *decl,
                _ => unreachable!(),
            };
            let rest = conjunct.to_term(None, Some(i));
            return match self.module.type_decl(decl) {
                Some(type_decl) => {
                    if self.mode == OracleMode::Strict && type_decl.has_invariant() {
                        // The invariant may exclude values of the underlying
                        // type, so the complement is potentially inhabited
                        // and the literal supports no emptiness conclusion.
                        self.term_void(&rest, lifetimes, open)
                    } else {
                        if !open.insert((decl, false)) {
                            return true;
                        }
                        let body = SemanticType::from(type_decl.underlying());
                        let term =
                            SemanticType::intersect(SemanticType::negation(body), rest);
                        let result = self.term_void(&term, lifetimes, open);
                        open.remove(&(decl, false));
                        result
                    }
                }
                // ¬any is void
                None => true,
            };
        }
        self.structural_void(conjunct, lifetimes, open)
    }

    /// Decide a conjunct containing only structural and primitive literals
    fn structural_void(
        &self,
        conjunct: &Conjunct,
        lifetimes: &dyn LifetimeRelation,
        open: &mut OpenSet,
    ) -> bool {
        let pos: Vec<&SemanticType> = conjunct
            .pos
            .iter()
            .filter(|t| **t != SemanticType::Any)
            .collect();
        // Without a positive constraint the conjunct denotes `any` minus
        // something, which is conservatively inhabited.
        let Some(first) = pos.first() else {
            return false;
        };
        let kind = match atom_kind(first) {
            Some(kind) => kind,
            None => return false,
        };
        // Two positive atoms of different kinds cannot overlap
        if pos.iter().any(|t| atom_kind(t) != Some(kind)) {
            return true;
        }
        match kind {
            AtomKind::Null | AtomKind::Bool | AtomKind::Byte | AtomKind::Int => conjunct
                .neg
                .iter()
                .any(|n| atom_kind(n) == Some(kind)),
            AtomKind::Array => {
                let mut merged = match pos[0] {
                    SemanticType::Array(a) => a.clone(),
                    _ => unreachable!(),
                };
                for p in &pos[1..] {
                    if let SemanticType::Array(a) = p {
                        merged = intersect_arrays(&merged, a);
                    }
                }
                // The empty array inhabits every array type, so a positive
                // array atom alone is never void.
                conjunct.neg.iter().any(|n| match n {
                    SemanticType::Array(b) => {
                        self.subtype_within(&merged.element, &b.element, lifetimes, open)
                    }
                    _ => false,
                })
            }
            AtomKind::Record => {
                let mut merged = match pos[0] {
                    SemanticType::Record(r) => r.clone(),
                    _ => unreachable!(),
                };
                for p in &pos[1..] {
                    if let SemanticType::Record(r) = p {
                        match intersect_records(&merged, r) {
                            Some(m) => merged = m,
                            None => return true,
                        }
                    }
                }
                // A record needs a value for every field
                for (_, field) in &merged.fields {
                    if self.term_void(field, lifetimes, open) {
                        return true;
                    }
                }
                conjunct.neg.iter().any(|n| match n {
                    SemanticType::Record(s) => self.record_within(&merged, s, lifetimes, open),
                    _ => false,
                })
            }
            AtomKind::Reference => {
                let mut merged = match pos[0] {
                    SemanticType::Reference(r) => r.clone(),
                    _ => unreachable!(),
                };
                for p in &pos[1..] {
                    if let SemanticType::Reference(r) = p {
                        match intersect_references(&merged, r, lifetimes) {
                            Some(m) => merged = m,
                            None => return true,
                        }
                    }
                }
                if self.term_void(&merged.element, lifetimes, open) {
                    return true;
                }
                conjunct.neg.iter().any(|n| match n {
                    SemanticType::Reference(s) => {
                        self.reference_within(&merged, s, lifetimes, open)
                    }
                    _ => false,
                })
            }
            AtomKind::Callable => {
                let mut merged = match pos[0] {
                    SemanticType::Callable(c) => c.clone(),
                    _ => unreachable!(),
                };
                for p in &pos[1..] {
                    if let SemanticType::Callable(c) = p {
                        match intersect_callables(&merged, c) {
                            Some(m) => merged = m,
                            None => return true,
                        }
                    }
                }
                conjunct.neg.iter().any(|n| match n {
                    SemanticType::Callable(s) => {
                        self.callable_within(&merged, s, lifetimes, open)
                    }
                    _ => false,
                })
            }
        }
    }

    /// Structural record subtyping: every value of `r` is a value of `s`
    fn record_within(
        &self,
        r: &RecordType,
        s: &RecordType,
        lifetimes: &dyn LifetimeRelation,
        open: &mut OpenSet,
    ) -> bool {
        if !s.open {
            // A closed supertype admits no unknown or extra fields
            if r.open {
                return false;
            }
            if r.field_names().any(|name| s.field(name).is_none()) {
                return false;
            }
        }
        for (name, sty) in &s.fields {
            match r.field(name) {
                Some(rty) => {
                    if !self.subtype_within(rty, sty, lifetimes, open) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }

    /// Reference subtyping: invariant elements, nested lifetime
    fn reference_within(
        &self,
        r: &ReferenceType,
        s: &ReferenceType,
        lifetimes: &dyn LifetimeRelation,
        open: &mut OpenSet,
    ) -> bool {
        self.subtype_within(&r.element, &s.element, lifetimes, open)
            && self.subtype_within(&s.element, &r.element, lifetimes, open)
            && lifetime_within(s.lifetime.as_deref(), r.lifetime.as_deref(), lifetimes)
    }

    /// Callable subtyping: contravariant parameters, covariant returns,
    /// functions usable where methods are expected
    fn callable_within(
        &self,
        c: &SemanticSignature,
        s: &SemanticSignature,
        lifetimes: &dyn LifetimeRelation,
        open: &mut OpenSet,
    ) -> bool {
        let kind_ok = c.kind == s.kind
            || (c.kind == CallableKind::Function && s.kind == CallableKind::Method);
        if !kind_ok
            || c.parameters.len() != s.parameters.len()
            || c.returns.len() != s.returns.len()
        {
            return false;
        }
        for (cp, sp) in c.parameters.iter().zip(&s.parameters) {
            if !self.subtype_within(sp, cp, lifetimes, open) {
                return false;
            }
        }
        for (cr, sr) in c.returns.iter().zip(&s.returns) {
            if !self.subtype_within(cr, sr, lifetimes, open) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Module;

    fn empty_module() -> Module {
        Module::default()
    }

    fn void(ty: SemanticType) -> bool {
        let module = empty_module();
        let oracle = EmptinessOracle::strict(&module);
        oracle.is_void(&ty, &NoLifetimes)
    }

    #[test]
    fn test_primitive_disjointness() {
        assert!(void(SemanticType::intersect(
            SemanticType::Int,
            SemanticType::Bool
        )));
        assert!(void(SemanticType::intersect(
            SemanticType::Int,
            SemanticType::Null
        )));
        assert!(void(SemanticType::intersect(
            SemanticType::Byte,
            SemanticType::Int
        )));
        assert!(!void(SemanticType::Int));
        assert!(void(SemanticType::Void));
        assert!(!void(SemanticType::Any));
    }

    #[test]
    fn test_negation_rules() {
        // int ∧ ¬int
        assert!(void(SemanticType::difference(
            SemanticType::Int,
            SemanticType::Int
        )));
        // int ∧ ¬null is just int
        assert!(!void(SemanticType::difference(
            SemanticType::Int,
            SemanticType::Null
        )));
        // (int|null) ∧ ¬int ∧ ¬null
        assert!(void(SemanticType::difference(
            SemanticType::difference(
                SemanticType::union(vec![SemanticType::Int, SemanticType::Null]),
                SemanticType::Int
            ),
            SemanticType::Null
        )));
    }

    #[test]
    fn test_array_rules() {
        let int_array = SemanticType::array(SemanticType::Int);
        let bool_array = SemanticType::array(SemanticType::Bool);
        // int[] ∧ bool[] reduces to (int∧bool)[], inhabited by []
        assert!(!void(SemanticType::intersect(
            int_array.clone(),
            bool_array.clone()
        )));
        // int[] ∧ ¬int[] is void
        assert!(void(SemanticType::difference(
            int_array.clone(),
            int_array.clone()
        )));
        // int[] ∧ ¬bool[] is not
        assert!(!void(SemanticType::difference(int_array.clone(), bool_array)));
        // int[] ∧ int is void: kinds differ
        assert!(void(SemanticType::intersect(int_array, SemanticType::Int)));
    }

    #[test]
    fn test_record_rules() {
        let r1 = SemanticType::record(false, vec![("f".to_string(), SemanticType::Int)]);
        let r2 = SemanticType::record(false, vec![("g".to_string(), SemanticType::Int)]);
        let open = SemanticType::record(true, vec![("f".to_string(), SemanticType::Int)]);
        // {int f} ∧ {int g}: f missing from a closed record
        assert!(void(SemanticType::intersect(r1.clone(), r2)));
        // {int f} ∧ {int f, ...}
        assert!(!void(SemanticType::intersect(r1.clone(), open.clone())));
        // {int f} <: {int f, ...}
        assert!(void(SemanticType::difference(r1.clone(), open.clone())));
        // {int f, ...} is not within {int f}
        assert!(!void(SemanticType::difference(open, r1.clone())));
        // a record with a void field is void
        let broken =
            SemanticType::record(false, vec![("f".to_string(), SemanticType::Void)]);
        assert!(void(broken));
        assert!(!void(r1));
    }

    #[test]
    fn test_reference_rules() {
        let r_int = SemanticType::reference(SemanticType::Int, None);
        let r_bool = SemanticType::reference(SemanticType::Bool, None);
        assert!(void(SemanticType::difference(r_int.clone(), r_int.clone())));
        // element types are invariant, so neither direction collapses
        assert!(!void(SemanticType::difference(r_int.clone(), r_bool)));
        // &int of void element type is void
        let r_void = SemanticType::reference(SemanticType::Void, None);
        assert!(void(r_void));
        // lifetime nesting: &this:int is not usable as plain &int
        let r_this = SemanticType::reference(SemanticType::Int, Some("this".to_string()));
        assert!(!void(SemanticType::difference(r_this.clone(), r_int.clone())));
        // but the default lifetime is usable anywhere
        assert!(void(SemanticType::difference(r_int, r_this)));
    }

    #[test]
    fn test_callable_rules() {
        let f = SemanticSignature {
            kind: CallableKind::Function,
            lifetimes: vec![],
            parameters: vec![SemanticType::Int],
            returns: vec![SemanticType::Int],
        };
        let m = SemanticSignature {
            kind: CallableKind::Method,
            lifetimes: vec![],
            parameters: vec![SemanticType::Int],
            returns: vec![SemanticType::Int],
        };
        let fc = SemanticType::Callable(f);
        let mc = SemanticType::Callable(m);
        // function <: method but not vice versa
        assert!(void(SemanticType::difference(fc.clone(), mc.clone())));
        assert!(!void(SemanticType::difference(mc, fc.clone())));
        // contravariance: (any)->int <: (int)->int
        let wide = SemanticType::Callable(SemanticSignature {
            kind: CallableKind::Function,
            lifetimes: vec![],
            parameters: vec![SemanticType::Any],
            returns: vec![SemanticType::Int],
        });
        assert!(void(SemanticType::difference(wide.clone(), fc.clone())));
        assert!(!void(SemanticType::difference(fc, wide)));
    }

    #[test]
    fn test_pure_negation_conjunct() {
        // ¬int alone is inhabited
        assert!(!void(SemanticType::negation(SemanticType::Int)));
        // ¬any is void
        assert!(void(SemanticType::negation(SemanticType::Any)));
    }
}
