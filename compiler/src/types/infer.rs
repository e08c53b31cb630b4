//! Callable binding
//!
//! Resolves an invocation against its candidate set: arity filtering,
//! lifetime binding by structural matching of declared lifetime variables
//! against argument reference lifetimes, relaxed subtype checking of each
//! argument, and most-specific selection among the survivors. Zero or
//! multiple surviving candidates is an ambiguity the caller reports.

use crate::ast::{Module, Signature, Type};
use crate::common::DeclId;
use crate::types::emptiness::LifetimeRelation;
use crate::types::semantic::SemanticType;
use crate::types::subtype::SubtypeOperator;
use rustc_hash::FxHashMap;

/// The outcome of a successful binding: the chosen declaration and its
/// signature with lifetime variables substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallBinding {
    pub decl: DeclId,
    pub signature: Signature,
}

/// Binds invocations to a unique callable signature
pub struct CallableResolver<'m> {
    subtype: SubtypeOperator<'m>,
}

type LifetimeBinding = FxHashMap<String, Option<String>>;

impl<'m> CallableResolver<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self {
            subtype: SubtypeOperator::relaxed(module),
        }
    }

    fn module(&self) -> &'m Module {
        self.subtype.module()
    }

    /// Resolve `candidates` against fully typed arguments, or `None` when
    /// zero or multiple candidates remain.
    pub fn bind(
        &self,
        candidates: &[DeclId],
        arguments: &[SemanticType],
        lifetimes: &dyn LifetimeRelation,
    ) -> Option<CallBinding> {
        let mut viable: Vec<CallBinding> = Vec::new();
        for &decl in candidates {
            let Some(signature) = self.module().callable_signature(decl) else {
                continue;
            };
            if let Some(bound) = self.try_candidate(&signature, arguments, lifetimes) {
                viable.push(CallBinding {
                    decl,
                    signature: bound,
                });
            }
        }
        // Prefer the candidate whose parameter tuple is below every other
        // survivor's.
        let mut winners = viable.iter().enumerate().filter(|(_, candidate)| {
            viable.iter().all(|other| {
                self.parameters_subtype(&candidate.signature, &other.signature, lifetimes)
            })
        });
        let (index, _) = winners.next()?;
        if winners.next().is_some() {
            return None;
        }
        Some(viable.swap_remove(index))
    }

    fn try_candidate(
        &self,
        signature: &Signature,
        arguments: &[SemanticType],
        lifetimes: &dyn LifetimeRelation,
    ) -> Option<Signature> {
        if signature.parameters.len() != arguments.len() {
            return None;
        }
        let mut binding = LifetimeBinding::default();
        for (parameter, argument) in signature.parameters.iter().zip(arguments) {
            if !bind_lifetimes(parameter, argument, &signature.lifetimes, &mut binding) {
                return None;
            }
        }
        let bound = Signature {
            kind: signature.kind,
            lifetimes: Vec::new(),
            parameters: signature
                .parameters
                .iter()
                .map(|p| substitute(p, &binding))
                .collect(),
            returns: signature
                .returns
                .iter()
                .map(|r| substitute(r, &binding))
                .collect(),
        };
        for (parameter, argument) in bound.parameters.iter().zip(arguments) {
            let parameter: SemanticType = parameter.into();
            if !self.subtype.is_subtype(argument, &parameter, lifetimes) {
                return None;
            }
        }
        Some(bound)
    }

    fn parameters_subtype(
        &self,
        a: &Signature,
        b: &Signature,
        lifetimes: &dyn LifetimeRelation,
    ) -> bool {
        a.parameters.len() == b.parameters.len()
            && a.parameters.iter().zip(&b.parameters).all(|(pa, pb)| {
                self.subtype
                    .is_subtype(&pa.into(), &pb.into(), lifetimes)
            })
    }
}

/// Unify declared lifetime variables against the argument's concrete
/// lifetimes by walking matching structure. Conflicting bindings fail the
/// candidate; unrelated structure is simply skipped.
fn bind_lifetimes(
    parameter: &Type,
    argument: &SemanticType,
    variables: &[String],
    binding: &mut LifetimeBinding,
) -> bool {
    match (parameter, argument) {
        (Type::Reference { element, lifetime }, SemanticType::Reference(r)) => {
            if let Some(name) = lifetime {
                if variables.contains(name) {
                    match binding.get(name) {
                        Some(existing) if *existing != r.lifetime => return false,
                        Some(_) => {}
                        None => {
                            binding.insert(name.clone(), r.lifetime.clone());
                        }
                    }
                }
            }
            bind_lifetimes(element, &r.element, variables, binding)
        }
        (Type::Array(element), SemanticType::Array(a)) => {
            bind_lifetimes(element, &a.element, variables, binding)
        }
        (Type::Record { fields, .. }, SemanticType::Record(rec)) => {
            for (name, field) in fields {
                if let Some(arg_field) = rec.field(name) {
                    if !bind_lifetimes(field, arg_field, variables, binding) {
                        return false;
                    }
                }
            }
            true
        }
        (Type::Callable(sig), SemanticType::Callable(s)) => {
            for (p, a) in sig.parameters.iter().zip(&s.parameters) {
                if !bind_lifetimes(p, a, variables, binding) {
                    return false;
                }
            }
            for (r, a) in sig.returns.iter().zip(&s.returns) {
                if !bind_lifetimes(r, a, variables, binding) {
                    return false;
                }
            }
            true
        }
        _ => true,
    }
}

/// Replace bound lifetime variables throughout a type
fn substitute(ty: &Type, binding: &LifetimeBinding) -> Type {
    match ty {
        Type::Reference { element, lifetime } => {
            let lifetime = match lifetime {
                Some(name) => match binding.get(name) {
                    Some(bound) => bound.clone(),
                    None => Some(name.clone()),
                },
                None => None,
            };
            Type::Reference {
                element: Box::new(substitute(element, binding)),
                lifetime,
            }
        }
        Type::Array(element) => Type::array(substitute(element, binding)),
        Type::Record { open, fields } => Type::Record {
            open: *open,
            fields: fields
                .iter()
                .map(|(name, field)| (name.clone(), substitute(field, binding)))
                .collect(),
        },
        Type::Callable(sig) => Type::Callable(Signature {
            kind: sig.kind,
            lifetimes: sig.lifetimes.clone(),
            parameters: sig
                .parameters
                .iter()
                .map(|p| substitute(p, binding))
                .collect(),
            returns: sig.returns.iter().map(|r| substitute(r, binding)).collect(),
        }),
        Type::Union(members) => {
            Type::Union(members.iter().map(|m| substitute(m, binding)).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        Block, CallableKind, Decl, FunctionOrMethodDecl, Modifiers, VariableDecl,
    };
    use crate::common::{NodeId, Path, Span, VarId};
    use crate::types::emptiness::NoLifetimes;

    fn param(var: u32, ty: Type) -> VariableDecl {
        VariableDecl {
            id: NodeId::dummy(),
            var: VarId(var),
            name: format!("p{}", var),
            ty,
            initialiser: None,
            span: Span::dummy(),
        }
    }

    fn function(name: &str, params: Vec<VariableDecl>, returns: Vec<VariableDecl>) -> Decl {
        Decl::FunctionOrMethod(FunctionOrMethodDecl {
            id: NodeId::dummy(),
            kind: CallableKind::Function,
            name: Path::simple(name),
            modifiers: Modifiers::default(),
            lifetimes: Vec::new(),
            parameters: params,
            returns,
            requires: Vec::new(),
            ensures: Vec::new(),
            body: Block::default(),
            span: Span::dummy(),
        })
    }

    #[test]
    fn test_unique_candidate() {
        let module = Module {
            declarations: vec![function(
                "f",
                vec![param(1, Type::Int)],
                vec![param(2, Type::Bool)],
            )],
            roots: vec![DeclId(0)],
        };
        let resolver = CallableResolver::new(&module);
        let binding = resolver
            .bind(&[DeclId(0)], &[SemanticType::Int], &NoLifetimes)
            .unwrap();
        assert_eq!(binding.decl, DeclId(0));
        assert_eq!(binding.signature.returns, vec![Type::Bool]);
    }

    #[test]
    fn test_arity_filter() {
        let module = Module {
            declarations: vec![function("f", vec![param(1, Type::Int)], vec![])],
            roots: vec![DeclId(0)],
        };
        let resolver = CallableResolver::new(&module);
        assert!(resolver.bind(&[DeclId(0)], &[], &NoLifetimes).is_none());
    }

    #[test]
    fn test_most_specific_overload() {
        // f(int) and f(int|null): an int argument picks the narrower one
        let module = Module {
            declarations: vec![
                function("f", vec![param(1, Type::Int)], vec![]),
                function(
                    "f",
                    vec![param(2, Type::union(vec![Type::Int, Type::Null]))],
                    vec![],
                ),
            ],
            roots: vec![DeclId(0), DeclId(1)],
        };
        let resolver = CallableResolver::new(&module);
        let binding = resolver
            .bind(
                &[DeclId(0), DeclId(1)],
                &[SemanticType::Int],
                &NoLifetimes,
            )
            .unwrap();
        assert_eq!(binding.decl, DeclId(0));
        // a null argument only fits the union overload
        let binding = resolver
            .bind(
                &[DeclId(0), DeclId(1)],
                &[SemanticType::Null],
                &NoLifetimes,
            )
            .unwrap();
        assert_eq!(binding.decl, DeclId(1));
    }

    #[test]
    fn test_ambiguous_duplicates() {
        let module = Module {
            declarations: vec![
                function("f", vec![param(1, Type::Int)], vec![]),
                function("f", vec![param(2, Type::Int)], vec![]),
            ],
            roots: vec![DeclId(0), DeclId(1)],
        };
        let resolver = CallableResolver::new(&module);
        assert!(resolver
            .bind(&[DeclId(0), DeclId(1)], &[SemanticType::Int], &NoLifetimes)
            .is_none());
    }

    #[test]
    fn test_lifetime_binding() {
        // method g(&a:int x) -> (&a:int r) called with &this:int
        let mut decl = match function(
            "g",
            vec![param(
                1,
                Type::Reference {
                    element: Box::new(Type::Int),
                    lifetime: Some("a".to_string()),
                },
            )],
            vec![param(
                2,
                Type::Reference {
                    element: Box::new(Type::Int),
                    lifetime: Some("a".to_string()),
                },
            )],
        ) {
            Decl::FunctionOrMethod(d) => d,
            _ => unreachable!(),
        };
        decl.kind = CallableKind::Method;
        decl.lifetimes = vec!["a".to_string()];
        let module = Module {
            declarations: vec![Decl::FunctionOrMethod(decl)],
            roots: vec![DeclId(0)],
        };
        let resolver = CallableResolver::new(&module);
        let arg = SemanticType::reference(SemanticType::Int, Some("this".to_string()));
        let binding = resolver.bind(&[DeclId(0)], &[arg], &NoLifetimes).unwrap();
        assert_eq!(
            binding.signature.returns,
            vec![Type::Reference {
                element: Box::new(Type::Int),
                lifetime: Some("this".to_string()),
            }]
        );
    }
}
