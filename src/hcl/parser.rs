//! Grammar-driven parser turning HCL source text into a [`Block`] tree.

use pest::iterators::Pair;
use pest::Parser as _;
use pest_derive::Parser;

use crate::error::{GuardError, Result};

use super::{Attribute, Block, Range, Value};

#[derive(Parser)]
#[grammar = "hcl/grammar.pest"]
struct HclParser;

/// Parse configuration source into top-level blocks. `file` is used for
/// ranges and error messages only; the text itself is the input.
pub fn parse(file: &str, src: &str) -> Result<Vec<Block>> {
    let pairs = HclParser::parse(Rule::file, src).map_err(|e| GuardError::Parse {
        file: file.to_string(),
        message: e.to_string(),
    })?;

    let mut blocks = Vec::new();
    for pair in pairs {
        if pair.as_rule() == Rule::file {
            for inner in pair.into_inner() {
                if inner.as_rule() == Rule::block {
                    blocks.push(build_block(file, inner));
                }
            }
        }
    }
    Ok(blocks)
}

fn build_block(file: &str, pair: Pair<'_, Rule>) -> Block {
    let range = range_of(file, &pair);

    let mut kind = String::new();
    let mut labels = Vec::new();
    let mut attributes = Vec::new();
    let mut nested = Vec::new();

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::ident => kind = part.as_str().to_string(),
            Rule::string => labels.push(unquote(part)),
            Rule::body => {
                for item in part.into_inner() {
                    match item.as_rule() {
                        Rule::block => nested.push(build_block(file, item)),
                        Rule::attribute => {
                            if let Some(attr) = build_attribute(file, item) {
                                attributes.push(attr);
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    Block::new(kind, labels, attributes, nested, range)
}

fn build_attribute(file: &str, pair: Pair<'_, Rule>) -> Option<Attribute> {
    let range = range_of(file, &pair);

    let mut name = None;
    let mut value = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::ident => name = Some(part.as_str().to_string()),
            Rule::value => value = Some(build_value(part)),
            _ => {}
        }
    }
    Some(Attribute::new(name?, value?, range))
}

fn build_value(pair: Pair<'_, Rule>) -> Value {
    let Some(inner) = pair.into_inner().next() else {
        return Value::Expr(String::new());
    };
    match inner.as_rule() {
        Rule::string => Value::Str(unquote(inner)),
        Rule::number => Value::Number(inner.as_str().parse().unwrap_or(0.0)),
        Rule::boolean => Value::Bool(inner.as_str() == "true"),
        Rule::array => Value::List(inner.into_inner().map(build_value).collect()),
        _ => Value::Expr(inner.as_str().trim().to_string()),
    }
}

fn range_of(file: &str, pair: &Pair<'_, Rule>) -> Range {
    let span = pair.as_span();
    Range {
        file: file.to_string(),
        start_line: span.start_pos().line_col().0,
        end_line: span.end_pos().line_col().0,
    }
}

fn unquote(pair: Pair<'_, Rule>) -> String {
    let raw = pair
        .into_inner()
        .next()
        .map(|inner| inner.as_str())
        .unwrap_or_default();
    unescape(raw)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
