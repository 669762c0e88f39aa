//! Translation-unit pipeline: compile, decode, walk, resolve.
//!
//! Each call builds a fresh model from scratch. Nothing is cached between
//! runs, so a caller that starts a newer refresh can simply drop or
//! ignore the result of an older one.

use crate::config::DEFAULT_MAX_INHERITANCE_DEPTH;
use crate::driver::Driver;
use crate::error::{ModelError, Result};
use crate::model::ClassModel;
use crate::node::AstNode;
use crate::resolver::{resolve_inheritance, UnresolvedBase};
use crate::walker::AstWalker;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// Everything known about one source file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationUnitModel {
    pub file_name: String,
    pub classes: Vec<ClassModel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<UnresolvedBase>,
}

impl TranslationUnitModel {
    /// Puts every class's members into canonical display order.
    pub fn sort_members(&mut self) {
        for class in &mut self.classes {
            class.sort_members();
        }
    }

    pub fn find_class(&self, qualified: &str) -> Option<&ClassModel> {
        self.classes.iter().find(|c| c.is_named(qualified))
    }
}

/// Builds `TranslationUnitModel`s using a driver.
pub struct ModelBuilder<'d> {
    driver: &'d dyn Driver,
    max_inheritance_depth: usize,
}

impl<'d> ModelBuilder<'d> {
    pub fn new(driver: &'d dyn Driver) -> Self {
        Self {
            driver,
            max_inheritance_depth: DEFAULT_MAX_INHERITANCE_DEPTH,
        }
    }

    pub fn with_max_inheritance_depth(mut self, depth: usize) -> Self {
        self.max_inheritance_depth = depth;
        self
    }

    /// Compiles `args` and builds the model of the resulting AST.
    pub async fn build(&self, file_name: &str, args: &[String]) -> Result<TranslationUnitModel> {
        let start = Instant::now();
        let text = self
            .driver
            .compile(args)
            .await
            .ok_or(ModelError::CompileFailed)?;
        info!(
            "Compiled {} in {}ms",
            file_name,
            start.elapsed().as_millis()
        );
        self.build_from_ast_text(file_name, &text).await
    }

    /// Builds from an AST dump that is already on hand.
    pub async fn build_from_ast_text(
        &self,
        file_name: &str,
        text: &str,
    ) -> Result<TranslationUnitModel> {
        let root = AstNode::from_json(text)?;
        self.build_from_ast(file_name, &root).await
    }

    pub async fn build_from_ast(
        &self,
        file_name: &str,
        root: &AstNode,
    ) -> Result<TranslationUnitModel> {
        let classes = AstWalker::new(self.driver).collect_classes(root).await?;
        let resolved = resolve_inheritance(classes, self.max_inheritance_depth)?;
        info!(
            "Built model of {}: {} classes, {} unresolved bases",
            file_name,
            resolved.classes.len(),
            resolved.unresolved.len()
        );

        Ok(TranslationUnitModel {
            file_name: file_name.to_string(),
            classes: resolved.classes,
            unresolved: resolved.unresolved,
        })
    }
}
