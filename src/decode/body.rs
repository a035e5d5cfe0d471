//! Schema-driven decoding of HCL bodies.
//!
//! A [`BodyDecoder`] walks one body. Every attribute or block the caller asks
//! for is recorded as part of the schema; anything left over when
//! [`BodyDecoder::finish`] runs is reported as unsupported. Problems never
//! abort the walk: the decoder substitutes a default value and keeps going so
//! that a single pass reports everything.

use std::collections::BTreeSet;

use hcl::eval::{Context, Evaluate};
use hcl::{Attribute, Block, Body, Structure, Value};

use super::diagnostics::{Diagnostic, Diagnostics};

/// A type that can be decoded from an HCL body.
///
/// Implementations always return a value, falling back to defaults for
/// fields that failed; the decoder's diagnostics tell whether it is usable.
pub trait Decode: Sized {
    fn decode(decoder: &mut BodyDecoder<'_>) -> Self;
}

/// Walks a single HCL body against a closed schema.
pub struct BodyDecoder<'a> {
    body: &'a Body,
    ctx: &'a Context<'a>,
    subject: String,
    known_attributes: BTreeSet<String>,
    known_blocks: BTreeSet<String>,
    diagnostics: Diagnostics,
}

impl<'a> BodyDecoder<'a> {
    /// Create a decoder for `body`. `subject` names the body in diagnostics.
    pub fn new(body: &'a Body, ctx: &'a Context<'a>, subject: impl Into<String>) -> Self {
        Self {
            body,
            ctx,
            subject: subject.into(),
            known_attributes: BTreeSet::new(),
            known_blocks: BTreeSet::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Record an error against this body.
    pub fn error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        let diagnostic = Diagnostic::error(summary, detail).with_subject(self.subject.clone());
        self.diagnostics.push(diagnostic);
    }

    /// Decode a required string attribute. Returns an empty string on failure.
    pub fn required_string(&mut self, name: &str) -> String {
        match self.attribute(name) {
            Some(attr) => self.string_value(attr).unwrap_or_default(),
            None => {
                self.missing_argument(name);
                String::new()
            }
        }
    }

    pub fn optional_string(&mut self, name: &str) -> Option<String> {
        let attr = self.attribute(name)?;
        self.string_value(attr)
    }

    /// Decode an optional string attribute, falling back to `default`.
    pub fn string_or(&mut self, name: &str, default: &str) -> String {
        self.optional_string(name)
            .unwrap_or_else(|| default.to_string())
    }

    /// Decode an optional bool attribute. Absent means `false`.
    pub fn optional_bool(&mut self, name: &str) -> bool {
        match self.attribute(name) {
            Some(attr) => self.bool_value(attr).unwrap_or(false),
            None => false,
        }
    }

    /// Decode a required list of strings, preserving declaration order.
    pub fn required_string_list(&mut self, name: &str) -> Vec<String> {
        match self.attribute(name) {
            Some(attr) => self.string_list_value(attr).unwrap_or_default(),
            None => {
                self.missing_argument(name);
                Vec::new()
            }
        }
    }

    pub fn optional_string_list(&mut self, name: &str) -> Option<Vec<String>> {
        let attr = self.attribute(name)?;
        self.string_list_value(attr)
    }

    /// All blocks of type `name`, in declaration order (0..n).
    pub fn blocks(&mut self, name: &str) -> Vec<&'a Block> {
        self.known_blocks.insert(name.to_string());
        let body = self.body;
        body.blocks().filter(|b| b.identifier() == name).collect()
    }

    /// A block of type `name` allowed zero or one times.
    pub fn optional_block(&mut self, name: &str) -> Option<&'a Block> {
        let blocks = self.blocks(name);
        if blocks.len() > 1 {
            self.error(
                format!("Duplicate {} block", name),
                format!(
                    "Only one {} block is allowed, but {} were defined.",
                    name,
                    blocks.len()
                ),
            );
        }
        blocks.into_iter().next()
    }

    /// A block of type `name` required exactly once.
    pub fn required_block(&mut self, name: &str) -> Option<&'a Block> {
        let block = self.optional_block(name);
        if block.is_none() {
            self.error(
                format!("Missing {} block", name),
                format!("A {} block is required.", name),
            );
        }
        block
    }

    /// The single label of `block`, e.g. the connector type.
    pub fn single_label(&mut self, block: &'a Block) -> Option<&'a str> {
        match block.labels() {
            [label] => Some(label.as_str()),
            [] => {
                self.error(
                    format!("Missing name for {}", block.identifier()),
                    format!("All {} blocks must have 1 label.", block.identifier()),
                );
                None
            }
            [_, extra, ..] => {
                self.error(
                    format!("Extraneous label for {}", block.identifier()),
                    format!(
                        "Only 1 label is expected for {} blocks, found extra label \"{}\".",
                        block.identifier(),
                        extra.as_str()
                    ),
                );
                None
            }
        }
    }

    /// Decode an unlabelled block into `T`, merging its diagnostics.
    pub fn decode_block<T: Decode>(&mut self, block: &'a Block) -> T {
        if let Some(label) = block.labels().first() {
            self.error(
                format!("Extraneous label for {}", block.identifier()),
                format!(
                    "No labels are expected for {} blocks, found \"{}\".",
                    block.identifier(),
                    label.as_str()
                ),
            );
        }
        self.decode_block_body(block)
    }

    /// Decode the body of `block` into `T` without checking its labels.
    pub fn decode_block_body<T: Decode>(&mut self, block: &'a Block) -> T {
        let mut nested = self.nested(block);
        let value = T::decode(&mut nested);
        self.diagnostics.extend(nested.finish());
        value
    }

    /// Decode every block of type `name` (0..n), in declaration order.
    pub fn decode_blocks<T: Decode>(&mut self, name: &str) -> Vec<T> {
        let blocks = self.blocks(name);
        blocks
            .into_iter()
            .map(|block| self.decode_block(block))
            .collect()
    }

    pub fn decode_optional_block<T: Decode>(&mut self, name: &str) -> Option<T> {
        let block = self.optional_block(name)?;
        Some(self.decode_block(block))
    }

    pub fn decode_required_block<T: Decode>(&mut self, name: &str) -> Option<T> {
        let block = self.required_block(name)?;
        Some(self.decode_block(block))
    }

    /// Report unknown attributes and blocks and return all diagnostics.
    pub fn finish(mut self) -> Diagnostics {
        let body = self.body;
        for structure in body.iter() {
            match structure {
                Structure::Attribute(attr) if !self.known_attributes.contains(attr.key()) => {
                    let detail = if self.known_blocks.contains(attr.key()) {
                        format!(
                            "An argument named \"{}\" is not expected here. Did you mean to define a block of type \"{}\"?",
                            attr.key(),
                            attr.key()
                        )
                    } else {
                        format!("An argument named \"{}\" is not expected here.", attr.key())
                    };
                    self.error("Unsupported argument", detail);
                }
                Structure::Block(block) if !self.known_blocks.contains(block.identifier()) => {
                    self.error(
                        "Unsupported block type",
                        format!(
                            "Blocks of type \"{}\" are not expected here.",
                            block.identifier()
                        ),
                    );
                }
                _ => {}
            }
        }
        self.diagnostics
    }

    fn nested(&self, block: &'a Block) -> BodyDecoder<'a> {
        BodyDecoder::new(
            block.body(),
            self.ctx,
            format!("{} > {}", self.subject, describe_block(block)),
        )
    }

    fn attribute(&mut self, name: &str) -> Option<&'a Attribute> {
        self.known_attributes.insert(name.to_string());
        let body = self.body;
        let mut matches = body.attributes().filter(|a| a.key() == name);
        let first = matches.next()?;
        if matches.next().is_some() {
            self.error(
                "Duplicate argument",
                format!(
                    "The argument \"{}\" was already set. Each argument may be set only once.",
                    name
                ),
            );
        }
        Some(first)
    }

    fn missing_argument(&mut self, name: &str) {
        self.error(
            "Missing required argument",
            format!(
                "The argument \"{}\" is required, but no definition was found.",
                name
            ),
        );
    }

    fn incorrect_type(&mut self, name: &str, wanted: &str, got: &str) {
        self.error(
            "Incorrect attribute value type",
            format!(
                "Inappropriate value for attribute \"{}\": {} required, got {}.",
                name, wanted, got
            ),
        );
    }

    fn evaluate(&mut self, attr: &Attribute) -> Option<Value> {
        match attr.expr().evaluate(self.ctx) {
            Ok(Value::Null) => {
                self.error(
                    "Invalid value",
                    format!("The argument \"{}\" must not be null.", attr.key()),
                );
                None
            }
            Ok(value) => Some(value),
            Err(err) => {
                self.error(
                    "Invalid expression",
                    format!("Evaluating argument \"{}\": {}", attr.key(), err),
                );
                None
            }
        }
    }

    fn string_value(&mut self, attr: &Attribute) -> Option<String> {
        let value = self.evaluate(attr)?;
        let got = type_name(&value);
        match scalar_to_string(value) {
            Some(s) => Some(s),
            None => {
                self.incorrect_type(attr.key(), "string", got);
                None
            }
        }
    }

    fn bool_value(&mut self, attr: &Attribute) -> Option<bool> {
        match self.evaluate(attr)? {
            Value::Bool(b) => Some(b),
            Value::String(s) if s == "true" => Some(true),
            Value::String(s) if s == "false" => Some(false),
            other => {
                self.incorrect_type(attr.key(), "bool", type_name(&other));
                None
            }
        }
    }

    fn string_list_value(&mut self, attr: &Attribute) -> Option<Vec<String>> {
        let items = match self.evaluate(attr)? {
            Value::Array(items) => items,
            other => {
                self.incorrect_type(attr.key(), "list of string", type_name(&other));
                return None;
            }
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let got = type_name(&item);
            match scalar_to_string(item) {
                Some(s) => out.push(s),
                None => {
                    self.incorrect_type(
                        &format!("{}[{}]", attr.key(), index),
                        "string",
                        got,
                    );
                    return None;
                }
            }
        }
        Some(out)
    }
}

/// Numbers and bools convert to strings, everything else is a type mismatch.
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Human readable block reference: identifier followed by quoted labels.
pub fn describe_block(block: &Block) -> String {
    let mut out = block.identifier().to_string();
    for label in block.labels() {
        out.push_str(&format!(" \"{}\"", label.as_str()));
    }
    out
}
