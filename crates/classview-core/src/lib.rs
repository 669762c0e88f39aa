//! ClassView Core - C++ class models from clang AST dumps
//!
//! This crate turns the JSON AST that `clang -Xclang -ast-dump=json`
//! prints into a flat list of classes with their methods, fields and
//! inherited members. The compiler and demangler sit behind the
//! [`Driver`] trait so the model building itself never touches a process.
//!
//! # Example
//!
//! ```no_run
//! use classview_core::{ClangDriver, ModelBuilder};
//! use std::path::Path;
//!
//! # async fn run() -> classview_core::Result<()> {
//! let driver = ClangDriver::from_bin_dir(Path::new("/usr/lib/llvm-17/bin"))?;
//! let args = vec!["-std=c++17".to_string(), "src/shape.cpp".to_string()];
//! let mut model = ModelBuilder::new(&driver).build("src/shape.cpp", &args).await?;
//! model.sort_members();
//! for class in &model.classes {
//!     println!("{}: {} methods", class.full_name, class.methods.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod model;
pub mod node;
pub mod resolver;
pub mod unit;
pub mod walker;

#[cfg(test)]
mod test_support;

pub use config::ClassViewConfig;
pub use driver::{ClangDriver, Driver};
pub use error::{ErrorKind, ModelError, Result};
pub use model::{
    compare_members, BaseChain, ClassMeta, ClassModel, FieldMeta, FieldModel, Member, MethodMeta,
    MethodModel,
};
pub use node::{AstNode, DeclKind};
pub use resolver::{resolve_inheritance, InheritanceResolver, ResolvedClasses, UnresolvedBase};
pub use unit::{ModelBuilder, TranslationUnitModel};
pub use walker::AstWalker;
