//! Annotation schema: declared fields, composite types and their flattened
//! dotted names.
//!
//! A schema is plain input to the query engine. It is resolved once when it
//! is built; nothing here is mutated afterwards.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::error::Diagnostic;
use crate::types::{Scalar, Value};

/// A single field declaration as written in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type", default = "default_type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDecl>>,
    /// Pattern a `text` value must match from its first character.
    #[serde(rename = "regex-validation", default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

fn default_type() -> String {
    "text".to_string()
}

/// A named composite type whose fields are spliced in wherever it is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDecl {
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Multiclass,
    Multilabel,
    /// A map of label to count; any sub-key below it is a valid field.
    Counts,
    /// Reference to a declared composite type, or an unresolved tag.
    Composite(String),
}

impl FieldKind {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "text" => FieldKind::Text,
            "multiclass" => FieldKind::Multiclass,
            "multilabel" => FieldKind::Multilabel,
            "counts" => FieldKind::Counts,
            other => FieldKind::Composite(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Multiclass => "multiclass",
            FieldKind::Multilabel => "multilabel",
            FieldKind::Counts => "counts",
            FieldKind::Composite(name) => name,
        }
    }

    pub fn is_classification(&self) -> bool {
        matches!(self, FieldKind::Multiclass | FieldKind::Multilabel)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf field after composite types have been expanded.
///
/// `name` is the dotted path (`review.text`), `path` its segments.
#[derive(Debug, Clone)]
pub struct FlatField {
    pub name: String,
    pub path: Vec<String>,
    pub kind: FieldKind,
    pub values: BTreeSet<String>,
    pub pattern: Option<Regex>,
}

impl FlatField {
    /// Whether `value` is an acceptable label for this field.
    ///
    /// Classification labels must be declared values, and only `multilabel`
    /// takes a list. Text must match the field's pattern when it has one.
    /// `counts` takes a mapping of numbers. Unresolved composite leaves take
    /// anything.
    pub fn accepts(&self, value: &Value) -> bool {
        match (&self.kind, value) {
            (FieldKind::Multiclass | FieldKind::Multilabel, Value::Scalar(Scalar::Text(label))) => {
                self.values.contains(label)
            }
            (FieldKind::Multilabel, Value::Sequence(labels)) => labels
                .iter()
                .all(|label| matches!(label, Value::Scalar(Scalar::Text(l)) if self.values.contains(l))),
            (FieldKind::Text, Value::Scalar(Scalar::Text(text))) => match &self.pattern {
                Some(pattern) => pattern.is_match(text),
                None => true,
            },
            (FieldKind::Counts, Value::Mapping(counts)) => {
                counts.values().all(|count| matches!(count, Value::Scalar(Scalar::Number(_))))
            }
            (FieldKind::Composite(_), _) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "SchemaDecl")]
pub struct Schema {
    fields: Vec<FlatField>,
    index: HashMap<String, usize>,
    diagnostics: Vec<Diagnostic>,
}

impl From<SchemaDecl> for Schema {
    fn from(decl: SchemaDecl) -> Self {
        Self::new(decl.fields, decl.types)
    }
}

impl Schema {
    pub fn new(fields: Vec<FieldDecl>, types: Vec<TypeDecl>) -> Self {
        let table: HashMap<&str, &TypeDecl> = types.iter().map(|t| (t.name.as_str(), t)).collect();
        let mut resolver = Resolver { types: &table, fields: Vec::new(), diagnostics: Vec::new() };
        resolver.flatten(&fields, &[], &mut Vec::new());

        let Resolver { fields: flat, diagnostics, .. } = resolver;
        let index = flat.iter().enumerate().map(|(i, f)| (f.name.clone(), i)).collect();
        Self { fields: flat, index, diagnostics }
    }

    /// All leaf fields in declaration order.
    pub fn fields(&self) -> &[FlatField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FlatField> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Dotted names of every leaf field declared as `text`, including those
    /// nested inside composite types. Bare query terms search these.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Text).map(|f| f.name.as_str())
    }

    /// Whether a dotted name refers to a declared field.
    ///
    /// Sub-keys of a `counts` field (`votes.positive`) are accepted too.
    pub fn has_field(&self, name: &str) -> bool {
        if self.index.contains_key(name) {
            return true;
        }
        match name.rsplit_once('.') {
            Some((parent, _)) => self.field(parent).is_some_and(|f| f.kind == FieldKind::Counts),
            None => false,
        }
    }

    /// Checks a label before it is written. Undeclared fields accept nothing.
    pub fn validate(&self, field: &str, value: &Value) -> bool {
        self.field(field).is_some_and(|f| f.accepts(value))
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

struct Resolver<'a> {
    types: &'a HashMap<&'a str, &'a TypeDecl>,
    fields: Vec<FlatField>,
    diagnostics: Vec<Diagnostic>,
}

impl Resolver<'_> {
    /// `active` holds the composite types currently being expanded.
    fn flatten(&mut self, decls: &[FieldDecl], prefix: &[String], active: &mut Vec<String>) {
        let types = self.types;
        let mut seen = HashSet::new();
        for decl in decls {
            let mut path = prefix.to_vec();
            path.push(decl.name.clone());
            if !seen.insert(decl.name.as_str()) {
                self.report(Diagnostic::DuplicateField(path.join(".")));
                continue;
            }

            if let Some(nested) = &decl.fields {
                self.flatten(nested, &path, active);
                continue;
            }

            let kind = FieldKind::parse(&decl.type_name);
            if let FieldKind::Composite(type_name) = &kind {
                let field = path.join(".");
                if active.contains(type_name) {
                    self.report(Diagnostic::CyclicType { field, type_name: type_name.clone() });
                } else if let Some(ty) = types.get(type_name.as_str()) {
                    active.push(type_name.clone());
                    self.flatten(&ty.fields, &path, active);
                    active.pop();
                    continue;
                } else {
                    self.report(Diagnostic::UnresolvedType { field, type_name: type_name.clone() });
                }
            }

            let name = path.join(".");
            let pattern = decl.regex.as_deref().and_then(|p| self.compile(&name, p));
            self.fields.push(FlatField {
                name,
                path,
                kind,
                values: decl.values.clone().unwrap_or_default(),
                pattern,
            });
        }
    }

    /// Anchored at the start only, so `[a-z]+` accepts `abc1`.
    fn compile(&mut self, field: &str, pattern: &str) -> Option<Regex> {
        match Regex::new(&format!("^(?:{pattern})")) {
            Ok(re) => Some(re),
            Err(err) => {
                self.report(Diagnostic::InvalidPattern { field: field.to_string(), message: err.to_string() });
                None
            }
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}
