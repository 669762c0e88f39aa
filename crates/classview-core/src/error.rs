//! Error types for model construction.
//!
//! Whole-unit failures (bad root, empty unit, compiler failure) stop the
//! pipeline and surface as one message. `BaseNotFound` is per edge and is
//! recovered by the resolver, which logs it and keeps going.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for functions that can fail while building a model.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Things that can go wrong between the compiler and the finished model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The parse tree did not start at a translation unit.
    #[error("expected TranslationUnitDecl, got {0}")]
    UnexpectedRootKind(String),

    /// The translation unit has no declarations at all.
    #[error("empty translation unit")]
    EmptyUnit,

    /// The compiler exited non-zero or could not be spawned.
    #[error("failed to compile source file")]
    CompileFailed,

    /// The compiler produced output that is not an AST dump.
    #[error("compiler did not output valid AST json: {0}")]
    InvalidAst(#[from] serde_json::Error),

    /// A declared base class has no model in this translation unit.
    #[error("base class '{base}' of '{for_class}' not found")]
    BaseNotFound { base: String, for_class: String },

    /// Base resolution went past the depth limit. Either the input
    /// contains an inheritance cycle or the hierarchy is absurdly deep.
    #[error("inheritance of '{class}' is cyclic or deeper than {limit} levels")]
    InheritanceCycleOrTooDeep { class: String, limit: usize },

    /// A required executable is missing from the tools directory.
    #[error("tool not found at '{0}'")]
    ToolNotFound(PathBuf),

    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in '{path}': {reason}")]
    Config { path: PathBuf, reason: String },
}

/// Flat classification of [`ModelError`], handy for matching in callers
/// that only care about what went wrong, not the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnexpectedRootKind,
    EmptyUnit,
    CompileFailed,
    InvalidAst,
    BaseNotFound,
    InheritanceCycleOrTooDeep,
    ToolNotFound,
    Io,
    Config,
}

impl ModelError {
    /// Creates an IO error with the path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedRootKind(_) => ErrorKind::UnexpectedRootKind,
            Self::EmptyUnit => ErrorKind::EmptyUnit,
            Self::CompileFailed => ErrorKind::CompileFailed,
            Self::InvalidAst(_) => ErrorKind::InvalidAst,
            Self::BaseNotFound { .. } => ErrorKind::BaseNotFound,
            Self::InheritanceCycleOrTooDeep { .. } => ErrorKind::InheritanceCycleOrTooDeep,
            Self::ToolNotFound(_) => ErrorKind::ToolNotFound,
            Self::Io { .. } => ErrorKind::Io,
            Self::Config { .. } => ErrorKind::Config,
        }
    }
}
