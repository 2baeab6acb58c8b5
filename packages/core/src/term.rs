//! RDF terms and the small construction helpers the materializer uses.
//!
//! Terms serialise the way ShExJ writes them: IRIs as bare strings, blank
//! nodes as `"_:label"` strings, and literals as objects with `value` and an
//! optional `type` or `language`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Prefix name → IRI base, as declared by a schema.
pub type Prefixes = BTreeMap<String, String>;

/// An RDF term: IRI, blank node, or literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "WireTerm", into = "WireTerm")]
pub enum Term {
    /// An absolute IRI, stored without angle brackets.
    Iri(String),
    /// A blank node, stored without the `_:` prefix.
    BlankNode(String),
    Literal(Literal),
}

/// A literal value with an optional datatype IRI or language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Literal {
    /// A plain (`xsd:string`) literal.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Build a literal from a value and a modifier.
    ///
    /// A modifier starting with `@` is a language tag; any other non-empty
    /// modifier is taken as a datatype IRI. An empty modifier yields a plain
    /// literal.
    pub fn with_modifier(value: impl Into<String>, modifier: &str) -> Self {
        let mut lit = Self::new(value);
        if let Some(lang) = modifier.strip_prefix('@') {
            lit.language = Some(lang.to_ascii_lowercase());
        } else if !modifier.is_empty() {
            lit.datatype = Some(modifier.to_string());
        }
        lit
    }
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// A blank node. A leading `_:` on `label` is dropped.
    pub fn blank(label: impl Into<String>) -> Self {
        let label = label.into();
        match label.strip_prefix("_:") {
            Some(rest) => Term::BlankNode(rest.to_string()),
            None => Term::BlankNode(label),
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::new(value))
    }
}

/// Expand a prefixed name such as `ex:name` against `prefixes`.
///
/// Returns [`MapError::UnknownPrefix`] when the prefix is not declared or
/// `pname` has no `:` at all.
pub fn expand_prefixed_name(pname: &str, prefixes: &Prefixes) -> Result<String, MapError> {
    let unknown = |prefix: &str| MapError::UnknownPrefix {
        prefix: prefix.to_string(),
        name: pname.to_string(),
    };
    let (prefix, local) = pname.split_once(':').ok_or_else(|| unknown(pname))?;
    let base = prefixes.get(prefix).ok_or_else(|| unknown(prefix))?;
    Ok(format!("{base}{local}"))
}

/// Formats the term in N-Triples syntax.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::BlankNode(label) => write!(f, "_:{label}"),
            Term::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", escape(&self.value))?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")
        } else if let Some(dt) = &self.datatype {
            write!(f, "^^<{dt}>")
        } else {
            Ok(())
        }
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

// --- wire form ---------------------------------------------------------------

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireTerm {
    Node(String),
    Literal(Literal),
}

impl From<WireTerm> for Term {
    fn from(w: WireTerm) -> Self {
        match w {
            WireTerm::Node(s) if s.starts_with("_:") => Term::blank(s),
            WireTerm::Node(s) => Term::Iri(s),
            WireTerm::Literal(lit) => Term::Literal(lit),
        }
    }
}

impl From<Term> for WireTerm {
    fn from(t: Term) -> Self {
        match t {
            Term::Iri(iri) => WireTerm::Node(iri),
            Term::BlankNode(label) => WireTerm::Node(format!("_:{label}")),
            Term::Literal(lit) => WireTerm::Literal(lit),
        }
    }
}

// --- tests -------------------------------------------------------------------
