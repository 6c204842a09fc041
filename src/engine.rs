//! Execution engine: applies every registered rule to every matching block.
//!
//! One scan walks the block tree once. Each (rule, block) check runs
//! behind a panic boundary, so a broken rule costs its own coverage and
//! nothing else. Checks may not rely on the order rules run in.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use crate::context::Context;
use crate::hcl::Block;
use crate::rules::{registry, Registry, ResultSet, ResultSink, RuleFault, ScanResult};

pub struct RuleEngine<'r> {
    registry: &'r Registry,
}

impl RuleEngine<'static> {
    /// Engine over the process-wide built-in registry.
    pub fn new() -> Self {
        Self {
            registry: registry(),
        }
    }
}

impl Default for RuleEngine<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> RuleEngine<'r> {
    /// Engine over an explicit registry.
    pub fn with_registry(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Run every applicable rule against every block in the tree,
    /// including nested blocks at any depth. Scanning the same input twice
    /// produces result sets with identical membership.
    pub fn scan(&self, blocks: &[Block], ctx: &Context) -> ResultSet {
        let collected: Mutex<Vec<ScanResult>> = Mutex::new(Vec::new());
        let mut faults = Vec::new();

        visit(blocks, &mut |block| {
            for rule in self.registry.rules() {
                if !rule.applies_to(block) {
                    continue;
                }
                debug!(rule = %rule.id(), block = %block.full_name(), "running check");
                let sink = ResultSink::new(rule, &collected);
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| (rule.check)(&sink, block, ctx)));
                if let Err(payload) = outcome {
                    let message = panic_message(payload);
                    warn!(
                        rule = %rule.id(),
                        block = %block.full_name(),
                        "check failed: {message}"
                    );
                    faults.push(RuleFault {
                        rule_id: rule.id(),
                        block: block.full_name(),
                        range: block.range().clone(),
                        message,
                    });
                }
            }
        });

        let results = collected
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        ResultSet::new(results, faults)
    }
}

fn visit<'a>(blocks: &'a [Block], f: &mut impl FnMut(&'a Block)) {
    for block in blocks {
        f(block);
        visit(block.nested_blocks(), f);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
