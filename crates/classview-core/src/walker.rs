//! Parse-tree walker.
//!
//! One depth-first pass over the AST collects every record into a flat
//! list of `ClassModel`s. The walk carries a `WalkContext` (namespace
//! qualifiers plus the stack of classes being built) that is created per
//! call, so concurrent walks never share state.
//!
//! Namespace and class scopes are held by a `ScopeGuard`. Its `Drop`
//! pops the namespace or finishes the class, which gives post-order
//! completion and keeps sibling subtrees from seeing stale scope.

use crate::driver::Driver;
use crate::error::{ModelError, Result};
use crate::model::{ClassMeta, ClassModel, FieldMeta, FieldModel, MethodMeta, MethodModel};
use crate::node::{AstNode, DeclKind};
use futures_util::future::{BoxFuture, FutureExt};
use std::ops::{Deref, DerefMut};
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct WalkContext {
    qualifiers: Vec<String>,
    classes: Vec<ClassModel>,
    result: Vec<ClassModel>,
}

enum Scope {
    None,
    Namespace,
    Class,
}

/// Mutable access to the context for the duration of one node's
/// children. Dropping it undoes whatever `enter` pushed.
struct ScopeGuard<'c> {
    ctx: &'c mut WalkContext,
    scope: Scope,
}

impl Deref for ScopeGuard<'_> {
    type Target = WalkContext;

    fn deref(&self) -> &WalkContext {
        &*self.ctx
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut WalkContext {
        &mut *self.ctx
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        match self.scope {
            Scope::None => {}
            Scope::Namespace => {
                self.ctx.qualifiers.pop();
            }
            Scope::Class => {
                if let Some(class) = self.ctx.classes.pop() {
                    debug!(
                        "Collected {} ({} methods, {} fields)",
                        class.full_name,
                        class.methods.len(),
                        class.fields.len()
                    );
                    self.ctx.result.push(class);
                }
            }
        }
    }
}

/// Collects classes from a clang AST, demangling method names through
/// the driver as it goes.
pub struct AstWalker<'d> {
    driver: &'d dyn Driver,
}

impl<'d> AstWalker<'d> {
    pub fn new(driver: &'d dyn Driver) -> Self {
        Self { driver }
    }

    /// Walks a translation unit and returns its classes in completion
    /// order (a nested class comes before its enclosing class).
    ///
    /// Demangle requests go out one at a time in traversal order.
    pub async fn collect_classes(&self, root: &AstNode) -> Result<Vec<ClassModel>> {
        if root.decl_kind() != DeclKind::TranslationUnit {
            return Err(ModelError::UnexpectedRootKind(root.kind.clone()));
        }
        if root.inner.is_empty() {
            return Err(ModelError::EmptyUnit);
        }

        let mut ctx = WalkContext::default();
        self.walk(root, &mut ctx).await;
        Ok(ctx.result)
    }

    fn walk<'a>(&'a self, node: &'a AstNode, ctx: &'a mut WalkContext) -> BoxFuture<'a, ()> {
        async move {
            let mut scope = self.enter(node, ctx).await;
            for child in &node.inner {
                self.walk(child, &mut scope).await;
            }
        }
        .boxed()
    }

    async fn enter<'c>(&self, node: &AstNode, ctx: &'c mut WalkContext) -> ScopeGuard<'c> {
        let scope = match node.decl_kind() {
            DeclKind::Namespace => match non_empty(&node.name) {
                Some(name) => {
                    ctx.qualifiers.push(name.to_string());
                    Scope::Namespace
                }
                // Anonymous namespaces add no qualifier.
                None => Scope::None,
            },
            DeclKind::Record => open_class(node, ctx),
            kind @ (DeclKind::Method | DeclKind::Constructor | DeclKind::Destructor) => {
                self.add_method(node, kind, ctx).await;
                Scope::None
            }
            DeclKind::Field => {
                add_field(node, ctx);
                Scope::None
            }
            DeclKind::TranslationUnit | DeclKind::Other => Scope::None,
        };
        ScopeGuard { ctx, scope }
    }

    async fn add_method(&self, node: &AstNode, kind: DeclKind, ctx: &mut WalkContext) {
        let raw = node.name.as_deref().unwrap_or("");
        let demangled = self.driver.demangle(node.mangled_name.as_deref()).await;

        // Out-of-line definitions show up at namespace scope.
        let Some(class) = ctx.classes.last_mut() else {
            trace!("{} {} has no enclosing class", kind, raw);
            return;
        };
        let name = demangled.as_deref().unwrap_or(raw).trim().to_string();

        let meta = MethodMeta {
            is_virtual: node.is_virtual,
            pure: node.pure,
            constexpr: node.constexpr,
            is_ctor: kind == DeclKind::Constructor,
            is_dtor: kind == DeclKind::Destructor,
            qual_type: node.qual_type().map(str::to_string),
        };
        let full_name = format!("{}::{}", class.full_name, raw.trim());
        class.methods.push(MethodModel::new(name, full_name, meta));
    }
}

fn open_class(node: &AstNode, ctx: &mut WalkContext) -> Scope {
    let Some(name) = non_empty(&node.name) else {
        return Scope::None;
    };

    // Clang repeats every class inside itself as an implicit record of
    // the same name.
    if ctx.classes.last().is_some_and(|top| top.name == name) {
        return Scope::None;
    }

    let full_name = format!("{}::{}", ctx.qualifiers.join("::"), name);
    let meta = ClassMeta {
        bases: node.bases.clone(),
        tag_used: node.tag_used.clone(),
        complete_definition: node.complete_definition,
    };
    ctx.classes.push(ClassModel::new(name, &full_name, meta));
    Scope::Class
}

fn add_field(node: &AstNode, ctx: &mut WalkContext) {
    if let Some(class) = ctx.classes.last_mut() {
        let meta = FieldMeta {
            qual_type: node.qual_type().map(str::to_string),
        };
        class
            .fields
            .push(FieldModel::new(node.name.as_deref().unwrap_or(""), meta));
    }
}

fn non_empty(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|n| !n.is_empty())
}
