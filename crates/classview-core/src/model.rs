//! The class model built from one translation unit.
//!
//! A walk produces a flat list of `ClassModel`s holding only their own
//! members. The resolver later copies inherited members in, tagging each
//! copy with the `BaseChain` it came through. Own members never carry a
//! chain, so `base_chain.is_some()` is the "inherited" test.

use crate::node::BaseSpecifier;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::cmp::Ordering;
use std::sync::Arc;

/// Strips every leading `::` from a class name.
///
/// Names built by the walker and qualified types reported by clang can
/// disagree on leading separators (`::Base` vs `Base`).
pub fn trim_class_name(name: &str) -> &str {
    let mut name = name;
    while let Some(rest) = name.strip_prefix("::") {
        name = rest;
    }
    name
}

/// Class identity: equal after leading separators are stripped.
pub fn class_name_eq(a: &str, b: &str) -> bool {
    trim_class_name(a) == trim_class_name(b)
}

/// Record metadata carried over from the parse tree.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMeta {
    /// Declared bases in declaration order.
    pub bases: Vec<BaseSpecifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_used: Option<String>,
    pub complete_definition: bool,
}

/// Flags of a method, constructor or destructor.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodMeta {
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub pure: bool,
    pub constexpr: bool,
    pub is_ctor: bool,
    pub is_dtor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qual_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qual_type: Option<String>,
}

/// Inheritance path of a copied member, nearest ancestor first.
///
/// Ancestors are shared snapshots of the classes as the walker built
/// them (own members only). Serialized as a list of full names.
#[derive(Debug, Clone, Default)]
pub struct BaseChain(Vec<Arc<ClassModel>>);

impl BaseChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new chain with `ancestor` appended.
    pub fn extended(&self, ancestor: Arc<ClassModel>) -> Self {
        let mut links = self.0.clone();
        links.push(ancestor);
        Self(links)
    }

    /// The farthest ancestor, i.e. the class whose members this chain
    /// pulls in.
    pub fn terminal(&self) -> Option<&ClassModel> {
        self.0.last().map(|c| c.as_ref())
    }

    pub fn full_names(&self) -> Vec<&str> {
        self.0.iter().map(|c| c.full_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for BaseChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for ancestor in &self.0 {
            seq.serialize_element(&ancestor.full_name)?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodModel {
    /// Demangled signature when available, raw name otherwise.
    pub name: String,
    pub full_name: String,
    pub meta: MethodMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_chain: Option<BaseChain>,
}

impl MethodModel {
    pub fn new(name: impl Into<String>, full_name: impl Into<String>, meta: MethodMeta) -> Self {
        Self {
            name: name.into(),
            full_name: full_name.into(),
            meta,
            base_chain: None,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldModel {
    pub name: String,
    pub meta: FieldMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_chain: Option<BaseChain>,
}

impl FieldModel {
    pub fn new(name: impl Into<String>, meta: FieldMeta) -> Self {
        Self {
            name: name.into(),
            meta,
            base_chain: None,
        }
    }
}

/// Common view over fields and methods for display and ordering.
pub trait Member {
    fn name(&self) -> &str;
    fn qual_type(&self) -> Option<&str>;
    fn base_chain(&self) -> Option<&BaseChain>;

    /// True for members copied in from a base class.
    fn is_inherited(&self) -> bool {
        self.base_chain().is_some_and(|chain| !chain.is_empty())
    }

    /// Short text shown next to the member name.
    fn description(&self) -> &str {
        self.qual_type().unwrap_or("").trim()
    }
}

impl Member for MethodModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn qual_type(&self) -> Option<&str> {
        self.meta.qual_type.as_deref()
    }

    fn base_chain(&self) -> Option<&BaseChain> {
        self.base_chain.as_ref()
    }
}

impl Member for FieldModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn qual_type(&self) -> Option<&str> {
        self.meta.qual_type.as_deref()
    }

    fn base_chain(&self) -> Option<&BaseChain> {
        self.base_chain.as_ref()
    }
}

/// Canonical member order: origin chain, then name, then type.
///
/// Own members (no chain) come before inherited ones and a chain sorts
/// before any longer chain it prefixes.
pub fn compare_members<M: Member>(a: &M, b: &M) -> Ordering {
    chain_names(a)
        .cmp(&chain_names(b))
        .then_with(|| a.name().cmp(b.name()))
        .then_with(|| a.qual_type().unwrap_or("").cmp(b.qual_type().unwrap_or("")))
}

fn chain_names<M: Member>(member: &M) -> Vec<&str> {
    member
        .base_chain()
        .map(BaseChain::full_names)
        .unwrap_or_default()
}

/// A class, struct or union of the translation unit.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassModel {
    pub name: String,
    /// Namespace-qualified name, never with a leading `::`.
    pub full_name: String,
    pub methods: Vec<MethodModel>,
    pub fields: Vec<FieldModel>,
    pub meta: ClassMeta,
}

impl ClassModel {
    /// Creates an empty class. Leading separators are stripped from both
    /// names.
    pub fn new(name: &str, full_name: &str, meta: ClassMeta) -> Self {
        Self {
            name: trim_class_name(name).to_string(),
            full_name: trim_class_name(full_name).to_string(),
            methods: Vec::new(),
            fields: Vec::new(),
            meta,
        }
    }

    /// Whether this class is the one `qualified` refers to.
    pub fn is_named(&self, qualified: &str) -> bool {
        class_name_eq(&self.full_name, qualified)
    }

    pub fn own_methods(&self) -> impl Iterator<Item = &MethodModel> {
        self.methods.iter().filter(|m| m.base_chain.is_none())
    }

    pub fn own_fields(&self) -> impl Iterator<Item = &FieldModel> {
        self.fields.iter().filter(|f| f.base_chain.is_none())
    }

    /// Sorts both member lists into canonical order.
    pub fn sort_members(&mut self) {
        self.fields.sort_by(compare_members);
        self.methods.sort_by(compare_members);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: &str) -> FieldModel {
        FieldModel::new(
            name,
            FieldMeta {
                qual_type: Some(ty.to_string()),
            },
        )
    }

    fn chain_of(names: &[&str]) -> BaseChain {
        names.iter().fold(BaseChain::new(), |chain, name| {
            chain.extended(Arc::new(ClassModel::new(name, name, ClassMeta::default())))
        })
    }

    #[test]
    fn test_trim_class_name() {
        assert_eq!(trim_class_name("::A::B"), "A::B");
        assert_eq!(trim_class_name("::::Foo"), "Foo");
        assert_eq!(trim_class_name("Foo"), "Foo");
        assert!(class_name_eq("::ns::Base", "ns::Base"));
        assert!(!class_name_eq("ns::Base", "Base"));
    }

    #[test]
    fn test_new_strips_leading_separator() {
        let class = ClassModel::new("Foo", "::Foo", ClassMeta::default());
        assert_eq!(class.full_name, "Foo");
        assert!(class.is_named("::Foo"));
    }

    #[test]
    fn test_member_ordering() {
        let mut class = ClassModel::new("D", "D", ClassMeta::default());

        let mut from_b2 = field("a", "int");
        from_b2.base_chain = Some(chain_of(&["B2"]));
        let mut from_b1_a = field("a", "int");
        from_b1_a.base_chain = Some(chain_of(&["B1", "A"]));
        let mut from_b1 = field("z", "int");
        from_b1.base_chain = Some(chain_of(&["B1"]));

        class.fields = vec![
            from_b2,
            field("y", "int"),
            from_b1_a,
            field("x", "long"),
            from_b1,
            field("x", "char"),
        ];
        class.sort_members();

        let order: Vec<(Vec<&str>, &str, &str)> = class
            .fields
            .iter()
            .map(|f| {
                (
                    f.base_chain.as_ref().map(|c| c.full_names()).unwrap_or_default(),
                    f.name.as_str(),
                    f.description(),
                )
            })
            .collect();

        assert_eq!(
            order,
            vec![
                (vec![], "x", "char"),
                (vec![], "x", "long"),
                (vec![], "y", "int"),
                (vec!["B1"], "z", "int"),
                (vec!["B1", "A"], "a", "int"),
                (vec!["B2"], "a", "int"),
            ]
        );
    }

    #[test]
    fn test_chain_serializes_as_names() {
        let mut f = field("f", "int");
        f.base_chain = Some(chain_of(&["B1", "A"]));
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["baseChain"], serde_json::json!(["B1", "A"]));
        assert!(f.is_inherited());

        let own = serde_json::to_value(field("g", "int")).unwrap();
        assert!(own.get("baseChain").is_none());
    }
}
