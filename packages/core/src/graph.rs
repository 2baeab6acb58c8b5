use std::collections::HashSet;

use crate::term::{Prefixes, Term};

/// One edge of the output graph.
///
/// `object` is `None` when a Map action referenced an identifier that had no
/// binding; materialization records the edge rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Option<Term>,
}

/// An append-only set of triples produced by materialization.
///
/// Identical triples are stored once; otherwise triples keep the order in
/// which they were added. Prefixes are informational only and never affect
/// triple content.
#[derive(Debug, Default, Clone)]
pub struct OutputGraph {
    prefixes: Prefixes,
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
}

impl OutputGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `prefixes` into the graph's prefix table. Later entries win.
    pub fn add_prefixes(&mut self, prefixes: &Prefixes) {
        for (name, iri) in prefixes {
            self.prefixes.insert(name.clone(), iri.clone());
        }
    }

    pub fn prefixes(&self) -> &Prefixes {
        &self.prefixes
    }

    /// Add `(subject, predicate, object)` and return `subject`, so nested
    /// additions can chain off the node they just described.
    pub fn add(&mut self, subject: Term, predicate: impl Into<String>, object: Option<Term>) -> Term {
        let triple = Triple {
            subject: subject.clone(),
            predicate: predicate.into(),
            object,
        };
        if self.seen.insert(triple.clone()) {
            self.triples.push(triple);
        }
        subject
    }

    /// Total number of distinct triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.seen.contains(triple)
    }

    /// Iterate over triples in insertion order.
    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Bound objects of `subject` along `predicate`, in insertion order.
    pub fn objects(&self, subject: &Term, predicate: &str) -> Vec<&Term> {
        self.triples
            .iter()
            .filter(|t| &t.subject == subject && t.predicate == predicate)
            .filter_map(|t| t.object.as_ref())
            .collect()
    }

    /// Distinct subjects in first-seen order.
    pub fn subjects(&self) -> Vec<&Term> {
        let mut seen: HashSet<&Term> = HashSet::new();
        self.triples
            .iter()
            .map(|t| &t.subject)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Triples whose object was left unbound.
    pub fn unbound(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter().filter(|t| t.object.is_none())
    }
}

// --- tests -------------------------------------------------------------------
