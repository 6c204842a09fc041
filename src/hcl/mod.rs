//! Block model for parsed Terraform-style configuration.
//!
//! The parser produces a tree of [`Block`]s. Rules consume the tree
//! read-only: attribute lookups, nested-block lookups, and literal
//! comparisons are the whole query surface.

mod parser;

use serde::{Deserialize, Serialize};

pub use parser::parse;

/// Source span of a block or attribute, line-granular.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub file: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start_line == self.end_line {
            write!(f, "{}:{}", self.file, self.start_line)
        } else {
            write!(f, "{}:{}-{}", self.file, self.start_line, self.end_line)
        }
    }
}

/// An attribute value. Literals support equality against expected strings;
/// anything the parser cannot resolve to a literal stays as `Expr` raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Number(f64),
    Bool(bool),
    List(Vec<Value>),
    Expr(String),
}

/// One `name = value` entry inside a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    value: Value,
    range: Range,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Value, range: Range) -> Self {
        Self {
            name: name.into(),
            value,
            range,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    /// True when the value is exactly the given string literal.
    pub fn equals(&self, expected: &str) -> bool {
        matches!(&self.value, Value::Str(s) if s == expected)
    }

    /// True for a string literal containing `needle`, or a list with an
    /// element equal to `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        match &self.value {
            Value::Str(s) => s.contains(needle),
            Value::List(items) => items
                .iter()
                .any(|v| matches!(v, Value::Str(s) if s == needle)),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// String elements of a list value; a bare string literal counts as a
    /// one-element list.
    pub fn string_items(&self) -> Vec<&str> {
        match &self.value {
            Value::Str(s) => vec![s.as_str()],
            Value::List(items) => items
                .iter()
                .filter_map(|v| match v {
                    Value::Str(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self.value, Value::Bool(true))
    }

    /// True when the value is a string literal written in the file itself,
    /// as opposed to a reference resolved elsewhere.
    pub fn is_literal_string(&self) -> bool {
        matches!(self.value, Value::Str(_))
    }
}

/// One parsed declaration: a kind (`resource`, `data`, `variable`, or any
/// nested block name), ordered labels, attributes, and nested blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    kind: String,
    labels: Vec<String>,
    attributes: Vec<Attribute>,
    nested: Vec<Block>,
    range: Range,
}

impl Block {
    pub fn new(
        kind: impl Into<String>,
        labels: Vec<String>,
        attributes: Vec<Attribute>,
        nested: Vec<Block>,
        range: Range,
    ) -> Self {
        Self {
            kind: kind.into(),
            labels,
            attributes,
            nested,
            range,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn nested_blocks(&self) -> &[Block] {
        &self.nested
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// First nested block with the given kind.
    pub fn get_block(&self, kind: &str) -> Option<&Block> {
        self.nested.iter().find(|b| b.kind == kind)
    }

    /// All nested blocks with the given kind, in document order.
    pub fn get_blocks(&self, kind: &str) -> Vec<&Block> {
        self.nested.iter().filter(|b| b.kind == kind).collect()
    }

    /// Display identity: `aws_s3_bucket.my_bucket` for resources,
    /// `data.aws_iam_policy_document.x` for data sources, the kind plus
    /// labels otherwise.
    pub fn full_name(&self) -> String {
        match self.kind.as_str() {
            "resource" if !self.labels.is_empty() => self.labels.join("."),
            _ if self.labels.is_empty() => self.kind.clone(),
            _ => format!("{}.{}", self.kind, self.labels.join(".")),
        }
    }
}
