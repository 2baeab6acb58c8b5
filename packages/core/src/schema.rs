//! Compiled shape-expression schema, in the ShExJ JSON shape.
//!
//! This is the read-only input of the materializer. Only the parts the walk
//! needs are modelled precisely; facets and other node-constraint details
//! the walk never inspects are ignored on deserialisation.
//!
//! Shape expressions and triple expressions may both appear as bare string
//! labels. A shape label names an entry of [`Schema::shapes`]; a triple
//! expression label names the `id` of a triple expression declared inline
//! somewhere in the schema, found with [`Schema::triple_expr`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::term::{Prefixes, Term};

/// A schema: named shapes, an optional start shape, and declared prefixes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prefixes: Prefixes,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    /// Label of the shape materialization starts from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(default)]
    pub shapes: BTreeMap<String, ShapeExpr>,
}

impl Schema {
    /// Parse a schema from its ShExJ JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a shape by label.
    pub fn shape(&self, label: &str) -> Result<&ShapeExpr, MapError> {
        self.shapes
            .get(label)
            .ok_or_else(|| MapError::UnknownShape(label.to_string()))
    }

    /// The start label and its shape.
    pub fn start_shape(&self) -> Result<(&str, &ShapeExpr), MapError> {
        let label = self.start.as_deref().ok_or(MapError::NoStart)?;
        Ok((label, self.shape(label)?))
    }

    /// Look up a labelled triple expression by its `id`.
    pub fn triple_expr(&self, label: &str) -> Result<&TripleExpr, MapError> {
        self.shapes
            .values()
            .find_map(|expr| find_in_shape_expr(expr, label))
            .ok_or_else(|| MapError::UnknownTripleExpr(label.to_string()))
    }
}

/// A shape expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeExpr {
    Shape(Shape),
    NodeConstraint(NodeConstraint),
    ShapeAnd(ShapeJunction),
    ShapeOr(ShapeJunction),
    ShapeNot(ShapeNot),
    /// A shape whose definition lives outside this schema.
    ShapeExternal,
}

/// Either a reference to a labelled shape or an inline expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapeExprRef {
    Reference(String),
    Inline(Box<ShapeExpr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeJunction {
    pub shape_exprs: Vec<ShapeExprRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeNot {
    pub shape_expr: Box<ShapeExprRef>,
}

/// A shape: an optional triple expression plus shape-level attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<TripleExprRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sem_acts: Option<Vec<SemAct>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
}

/// A triple expression inside a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TripleExpr {
    TripleConstraint(TripleConstraint),
    EachOf(TripleGroup),
    OneOf(TripleGroup),
}

impl TripleExpr {
    /// The label other expressions may use to refer to this one.
    pub fn id(&self) -> Option<&str> {
        match self {
            TripleExpr::TripleConstraint(tc) => tc.id.as_deref(),
            TripleExpr::EachOf(group) | TripleExpr::OneOf(group) => group.id.as_deref(),
        }
    }
}

/// Either a reference to a labelled triple expression or an inline one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TripleExprRef {
    Reference(String),
    Inline(Box<TripleExpr>),
}

/// The body of an `EachOf` or `OneOf`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripleGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub expressions: Vec<TripleExprRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sem_acts: Option<Vec<SemAct>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
}

/// A constraint on the triples with a given predicate.
///
/// `max == Some(-1)` means unbounded, as in ShExJ.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripleConstraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub predicate: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub negated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_expr: Option<ShapeExprRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sem_acts: Option<Vec<SemAct>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
}

impl TripleConstraint {
    /// Semantic actions on this constraint that belong to extension `name`.
    pub fn sem_acts_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SemAct> + 'a {
        self.sem_acts
            .iter()
            .flatten()
            .filter(move |act| act.name == name)
    }

    /// The object pinned by an inline value set with exactly one concrete
    /// term, e.g. `ex:status [ex:Active]`.
    pub fn fixed_value(&self) -> Option<&Term> {
        let Some(ShapeExprRef::Inline(expr)) = &self.value_expr else {
            return None;
        };
        let ShapeExpr::NodeConstraint(nc) = expr.as_ref() else {
            return None;
        };
        match nc.values.as_deref() {
            Some([only]) => only.as_term(),
            _ => None,
        }
    }
}

/// A constraint on a single node: kind, datatype, or enumerated values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConstraint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_kind: Option<NodeKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<ValueSetValue>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Iri,
    Bnode,
    Nonliteral,
    Literal,
}

/// One entry of a value set: a concrete term or a stem/range pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueSetValue {
    Term(Term),
    Stem(StemValue),
}

impl ValueSetValue {
    pub fn as_term(&self) -> Option<&Term> {
        match self {
            ValueSetValue::Term(t) => Some(t),
            ValueSetValue::Stem(_) => None,
        }
    }
}

/// Value-set patterns that match a family of terms rather than one term.
///
/// Range stems and exclusions may be wildcards or nested objects; they are
/// kept as raw JSON because nothing here interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StemValue {
    IriStem {
        stem: String,
    },
    IriStemRange {
        stem: serde_json::Value,
        exclusions: Vec<serde_json::Value>,
    },
    LiteralStem {
        stem: String,
    },
    LiteralStemRange {
        stem: serde_json::Value,
        exclusions: Vec<serde_json::Value>,
    },
    Language {
        #[serde(rename = "languageTag")]
        language_tag: String,
    },
    LanguageStem {
        stem: String,
    },
    LanguageStemRange {
        stem: serde_json::Value,
        exclusions: Vec<serde_json::Value>,
    },
}

/// A semantic action: the extension it belongs to and its code string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemAct {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl SemAct {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: Some(code.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub predicate: String,
    pub object: Term,
}

// --- triple expression lookup ------------------------------------------------

fn find_in_shape_expr<'a>(expr: &'a ShapeExpr, id: &str) -> Option<&'a TripleExpr> {
    match expr {
        ShapeExpr::Shape(shape) => match &shape.expression {
            Some(TripleExprRef::Inline(te)) => find_in_triple_expr(te, id),
            _ => None,
        },
        ShapeExpr::ShapeAnd(j) | ShapeExpr::ShapeOr(j) => {
            j.shape_exprs.iter().find_map(|e| find_in_shape_expr_ref(e, id))
        }
        ShapeExpr::ShapeNot(not) => find_in_shape_expr_ref(&not.shape_expr, id),
        ShapeExpr::NodeConstraint(_) | ShapeExpr::ShapeExternal => None,
    }
}

fn find_in_shape_expr_ref<'a>(expr: &'a ShapeExprRef, id: &str) -> Option<&'a TripleExpr> {
    match expr {
        ShapeExprRef::Inline(inner) => find_in_shape_expr(inner, id),
        ShapeExprRef::Reference(_) => None,
    }
}

fn find_in_triple_expr<'a>(expr: &'a TripleExpr, id: &str) -> Option<&'a TripleExpr> {
    if expr.id() == Some(id) {
        return Some(expr);
    }
    match expr {
        TripleExpr::TripleConstraint(tc) => tc
            .value_expr
            .as_ref()
            .and_then(|e| find_in_shape_expr_ref(e, id)),
        TripleExpr::EachOf(group) | TripleExpr::OneOf(group) => {
            group.expressions.iter().find_map(|e| match e {
                TripleExprRef::Inline(te) => find_in_triple_expr(te, id),
                TripleExprRef::Reference(_) => None,
            })
        }
    }
}

// --- tests -------------------------------------------------------------------
