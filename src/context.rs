//! Scan-wide context handed to every rule check.
//!
//! Rules treat the context as opaque and read-only. The library fills it
//! with `variable` block defaults so checks that want to look through a
//! `var.*` reference can, but nothing requires them to.

use std::collections::BTreeMap;

use crate::hcl::{Block, Value};

#[derive(Debug, Clone, Default)]
pub struct Context {
    variables: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `variable "name" { default = ... }` declarations from the
    /// parsed tree.
    pub fn from_blocks(blocks: &[Block]) -> Self {
        let mut variables = BTreeMap::new();
        for block in blocks {
            if block.kind() != "variable" {
                continue;
            }
            let Some(name) = block.labels().first() else {
                continue;
            };
            if let Some(default) = block.get_attribute("default") {
                variables.insert(name.clone(), default.value().clone());
            }
        }
        Self { variables }
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}
