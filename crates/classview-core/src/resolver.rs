//! Inheritance resolution.
//!
//! Runs after the walk, over the whole flat class list. For each class it
//! follows declared bases transitively (pre-order, declaration order) and
//! copies every ancestor's own members in, tagged with the chain that
//! reached it.
//!
//! Diamonds are not collapsed: an ancestor reachable along two paths is
//! visited twice and its members appear once per path, the way
//! non-virtual multiple inheritance duplicates subobjects. Cycles are not
//! detected as such; the depth limit catches them.

use crate::error::{ModelError, Result};
use crate::model::{class_name_eq, trim_class_name, BaseChain, ClassModel};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// A base class that has no model in the translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedBase {
    /// The base as declared, without leading separators.
    pub base: String,
    /// The class that declares the base.
    pub for_class: String,
}

impl From<UnresolvedBase> for ModelError {
    fn from(missing: UnresolvedBase) -> Self {
        ModelError::BaseNotFound {
            base: missing.base,
            for_class: missing.for_class,
        }
    }
}

/// Outcome of following one base edge.
pub type BaseResolution = std::result::Result<BaseChain, UnresolvedBase>;

/// Looks up bases among a fixed set of classes.
pub struct InheritanceResolver<'a> {
    classes: &'a [Arc<ClassModel>],
    max_depth: usize,
}

impl<'a> InheritanceResolver<'a> {
    pub fn new(classes: &'a [Arc<ClassModel>], max_depth: usize) -> Self {
        Self { classes, max_depth }
    }

    /// Finds the model for `qualified`, as declared by `from`.
    ///
    /// A class never resolves to itself. When several records share the
    /// name (forward declarations), a complete definition wins.
    pub fn lookup(&self, qualified: &str, from: &ClassModel) -> Option<&'a Arc<ClassModel>> {
        if class_name_eq(qualified, &from.full_name) {
            return None;
        }
        let mut matches = self.classes.iter().filter(|c| c.is_named(qualified));
        let first = matches.next()?;
        if first.meta.complete_definition {
            return Some(first);
        }
        matches
            .find(|c| c.meta.complete_definition)
            .or(Some(first))
    }

    /// Every base chain of `target`, in pre-order.
    ///
    /// Missing bases come back as per-edge errors alongside the chains
    /// that did resolve. The whole call fails only when a chain grows past
    /// the depth limit.
    pub fn resolve_bases(&self, target: &ClassModel) -> Result<Vec<BaseResolution>> {
        let mut out = Vec::new();
        self.descend(target, target, &BaseChain::new(), &mut out)?;
        Ok(out)
    }

    fn descend(
        &self,
        target: &ClassModel,
        class: &ClassModel,
        chain: &BaseChain,
        out: &mut Vec<BaseResolution>,
    ) -> Result<()> {
        for base in &class.meta.bases {
            let declared = base.qual_type();
            let Some(ancestor) = self.lookup(declared, class) else {
                out.push(Err(UnresolvedBase {
                    base: trim_class_name(declared).to_string(),
                    for_class: class.full_name.clone(),
                }));
                continue;
            };

            let extended = chain.extended(Arc::clone(ancestor));
            if extended.len() > self.max_depth {
                return Err(ModelError::InheritanceCycleOrTooDeep {
                    class: target.full_name.clone(),
                    limit: self.max_depth,
                });
            }

            out.push(Ok(extended.clone()));
            self.descend(target, ancestor, &extended, out)?;
        }
        Ok(())
    }
}

/// Classes with inherited members filled in.
#[derive(Debug, Default)]
pub struct ResolvedClasses {
    pub classes: Vec<ClassModel>,
    /// Distinct base edges that could not be resolved.
    pub unresolved: Vec<UnresolvedBase>,
}

/// Resolves inheritance for every class of a walk.
///
/// Lookups run against the walk's output as-is, so only own members are
/// ever copied and each copy carries exactly one chain.
pub fn resolve_inheritance(classes: Vec<ClassModel>, max_depth: usize) -> Result<ResolvedClasses> {
    let snapshot: Vec<Arc<ClassModel>> = classes.into_iter().map(Arc::new).collect();
    let resolver = InheritanceResolver::new(&snapshot, max_depth);
    let mut resolved = ResolvedClasses::default();

    for class in &snapshot {
        let mut model = ClassModel::clone(class);

        for edge in resolver.resolve_bases(class)? {
            match edge {
                Ok(chain) => inherit_members(&mut model, &chain),
                Err(missing) => {
                    if !resolved.unresolved.contains(&missing) {
                        warn!(
                            "Base class {} of {} not found",
                            missing.base, missing.for_class
                        );
                        resolved.unresolved.push(missing);
                    }
                }
            }
        }

        debug!(
            "Resolved {}: {} methods, {} fields",
            model.full_name,
            model.methods.len(),
            model.fields.len()
        );
        resolved.classes.push(model);
    }

    Ok(resolved)
}

/// Copies the chain's terminal ancestor's own members into `class`.
fn inherit_members(class: &mut ClassModel, chain: &BaseChain) {
    let Some(ancestor) = chain.terminal() else {
        return;
    };

    class.fields.extend(ancestor.own_fields().map(|f| {
        let mut f = f.clone();
        f.base_chain = Some(chain.clone());
        f
    }));
    class.methods.extend(ancestor.own_methods().map(|m| {
        let mut m = m.clone();
        m.base_chain = Some(chain.clone());
        m
    }));
}
