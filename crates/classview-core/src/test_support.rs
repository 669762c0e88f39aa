//! Deterministic stand-ins for the external tools.

use crate::driver::Driver;
use crate::node::AstNode;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A driver that never spawns anything.
///
/// `compile` hands back a canned dump; `demangle` looks symbols up in a
/// table and records every request in order.
#[derive(Default)]
pub(crate) struct FakeDriver {
    pub output: Option<String>,
    pub symbols: HashMap<String, String>,
    pub demangle_calls: Mutex<Vec<Option<String>>>,
}

impl FakeDriver {
    pub fn with_symbols(pairs: &[(&str, &str)]) -> Self {
        Self {
            symbols: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_output(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Option<String>> {
        self.demangle_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Driver for FakeDriver {
    async fn compile(&self, _args: &[String]) -> Option<String> {
        self.output.clone()
    }

    async fn demangle(&self, mangled: Option<&str>) -> Option<String> {
        self.demangle_calls
            .lock()
            .unwrap()
            .push(mangled.map(str::to_string));
        self.symbols.get(mangled?).cloned()
    }
}

/// Builds an `AstNode` from inline JSON.
pub(crate) fn ast(value: serde_json::Value) -> AstNode {
    serde_json::from_value(value).unwrap()
}

/// A translation unit whose only function nests `depth` binary
/// operators, next to a plain class.
pub(crate) fn deep_unit(depth: usize) -> String {
    let mut text = String::from(
        r#"{"kind":"TranslationUnitDecl","inner":[{"kind":"CXXRecordDecl","name":"Foo","inner":[{"kind":"FieldDecl","name":"x","type":{"qualType":"int"}}]},{"kind":"FunctionDecl","name":"f","inner":["#,
    );
    for _ in 0..depth {
        text.push_str(r#"{"kind":"BinaryOperator","opcode":"&&","inner":["#);
    }
    text.push_str(r#"{"kind":"IntegerLiteral","value":"1"}"#);
    for _ in 0..depth {
        text.push_str("]}");
    }
    text.push_str("]}]}");
    text
}
