//! Parse-tree node representation.
//!
//! An `AstNode` mirrors one object of clang's `-ast-dump=json` output.
//! Only the handful of fields the walker looks at are decoded; everything
//! else in the dump is ignored by serde. Every field except `kind` is
//! optional, and a missing `kind` decodes as an empty string so it falls
//! through as an unrecognized declaration.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// The declaration kinds the walker reacts to.
///
/// Clang emits a few hundred node kinds. Anything not listed here maps to
/// `Other` and is traversed without structural effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    TranslationUnit,
    Namespace,
    /// `class`, `struct` or `union`.
    Record,
    Method,
    Constructor,
    Destructor,
    Field,
    Other,
}

impl DeclKind {
    pub fn from_tag(kind: &str) -> Self {
        match kind {
            "TranslationUnitDecl" => Self::TranslationUnit,
            "NamespaceDecl" => Self::Namespace,
            "CXXRecordDecl" => Self::Record,
            "CXXMethodDecl" => Self::Method,
            "CXXConstructorDecl" => Self::Constructor,
            "CXXDestructorDecl" => Self::Destructor,
            "FieldDecl" => Self::Field,
            _ => Self::Other,
        }
    }

}

impl std::fmt::Display for DeclKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TranslationUnit => "TranslationUnitDecl",
            Self::Namespace => "NamespaceDecl",
            Self::Record => "CXXRecordDecl",
            Self::Method => "CXXMethodDecl",
            Self::Constructor => "CXXConstructorDecl",
            Self::Destructor => "CXXDestructorDecl",
            Self::Field => "FieldDecl",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// The `type` object clang attaches to typed declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qual_type: Option<String>,
}

/// One entry of a record's `bases` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseSpecifier {
    #[serde(default)]
    pub access: String,

    #[serde(rename = "type", default)]
    pub ty: QualType,

    /// `virtual` inheritance. Recorded, not acted on.
    #[serde(default)]
    pub is_virtual: bool,
}

impl BaseSpecifier {
    /// The base class as the compiler spelled it, e.g. `::ns::Base`.
    pub fn qual_type(&self) -> &str {
        self.ty.qual_type.as_deref().unwrap_or("")
    }
}

/// A node of the clang JSON AST.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNode {
    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub inner: Vec<AstNode>,

    #[serde(default)]
    pub mangled_name: Option<String>,

    #[serde(rename = "type", default)]
    pub ty: Option<QualType>,

    #[serde(rename = "virtual", default)]
    pub is_virtual: bool,

    #[serde(default)]
    pub pure: bool,

    #[serde(default)]
    pub constexpr: bool,

    #[serde(default)]
    pub bases: Vec<BaseSpecifier>,

    /// `class`, `struct` or `union` on records.
    #[serde(default)]
    pub tag_used: Option<String>,

    /// False for forward declarations.
    #[serde(default)]
    pub complete_definition: bool,
}

impl AstNode {
    /// Decodes a full AST dump.
    ///
    /// Function bodies nest far deeper than serde_json's default limit
    /// (a long `a && b && ...` chain is enough), so the limit is lifted and
    /// the stack grows on demand instead.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let node = AstNode::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(node)
    }

    pub fn decl_kind(&self) -> DeclKind {
        DeclKind::from_tag(&self.kind)
    }

    pub fn qual_type(&self) -> Option<&str> {
        self.ty.as_ref()?.qual_type.as_deref()
    }
}
