//! Template graph materialization.
//!
//! A [`Materializer`] replays a schema's shape graph from its start shape
//! and emits triples into an [`OutputGraph`]. For each triple constraint:
//!
//! 1. If it carries Map actions, one triple per action is emitted, with the
//!    object taken from the bindings under the action's resolved identifier.
//! 2. Otherwise, if its value expression pins exactly one term, that term is
//!    the object.
//! 3. Otherwise a fresh blank node becomes the object, and the walk descends
//!    into the value expression with that node as subject.
//!
//! References to labelled shapes and triple expressions are expanded under
//! the current subject. The subject is passed down each call rather than
//! held in shared state, and the labels currently being expanded are tracked
//! so that a schema that would expand forever fails with
//! [`MapError::ShapeCycle`].

use crate::code::resolve_code;
use crate::error::MapError;
use crate::extension::MAP_EXT;
use crate::graph::OutputGraph;
use crate::schema::{Schema, TripleConstraint};
use crate::semact::Bindings;
use crate::term::Term;
use crate::visitor::{walk_reference, walk_triple_constraint, walk_triple_reference, ShapeVisitor};

/// Source of fresh blank-node labels.
pub trait BlankNodeSource {
    /// The next label, with or without a leading `_:`.
    fn next_label(&mut self) -> String;
}

/// Any `FnMut() -> String` closure can act as a label source.
impl<F: FnMut() -> String> BlankNodeSource for F {
    fn next_label(&mut self) -> String {
        self()
    }
}

/// Counting label source: `b0`, `b1`, … by default.
///
/// The count is never reset, so repeated materializations through one
/// [`Materializer`] never reuse a label.
#[derive(Debug, Clone)]
pub struct BNodeCounter {
    prefix: String,
    next: u64,
}

impl BNodeCounter {
    pub fn new() -> Self {
        Self::with_prefix("b")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl Default for BNodeCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl BlankNodeSource for BNodeCounter {
    fn next_label(&mut self) -> String {
        let label = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        label
    }
}

/// Materializes output graphs from one schema.
pub struct Materializer<'s, B = BNodeCounter> {
    schema: &'s Schema,
    bnodes: B,
}

impl<'s> Materializer<'s, BNodeCounter> {
    /// A materializer using the default counting label source.
    pub fn new(schema: &'s Schema) -> Self {
        Self::with_bnodes(schema, BNodeCounter::new())
    }
}

impl<'s, B: BlankNodeSource> Materializer<'s, B> {
    pub fn with_bnodes(schema: &'s Schema, bnodes: B) -> Self {
        Self { schema, bnodes }
    }

    /// Walk the schema from its start shape and emit triples into `target`
    /// (a fresh graph when `None`).
    ///
    /// `create_root` is the subject of the start shape; a fresh blank node
    /// is used when `None`. The schema's prefixes are copied onto the
    /// target.
    ///
    /// Identifiers with no entry in `bindings` produce a triple whose object
    /// is `None`; they are logged but not treated as errors.
    ///
    /// # Errors
    ///
    /// - [`MapError::NoStart`] / [`MapError::UnknownShape`] for a start or
    ///   reference the schema does not define.
    /// - [`MapError::MalformedCode`] / [`MapError::UnknownPrefix`] for a bad
    ///   Map action code.
    /// - [`MapError::ShapeCycle`] when expansion would not terminate.
    pub fn materialize(
        &mut self,
        bindings: &Bindings,
        create_root: Option<Term>,
        target: Option<OutputGraph>,
    ) -> Result<OutputGraph, MapError> {
        let schema = self.schema;
        let (label, start) = schema.start_shape()?;

        let mut target = target.unwrap_or_default();
        target.add_prefixes(&schema.prefixes);

        let root = match create_root {
            Some(root) => root,
            None => Term::blank(self.bnodes.next_label()),
        };
        tracing::debug!(start = %label, root = %root, "materializing");

        let mut walk = Walk {
            schema,
            bindings,
            bnodes: &mut self.bnodes,
            target: &mut target,
            active: vec![label],
        };
        walk.visit_shape_expr(start, &root)?;
        Ok(target)
    }
}

// --- walk --------------------------------------------------------------------

struct Walk<'s, 'a, B> {
    schema: &'s Schema,
    bindings: &'a Bindings,
    bnodes: &'a mut B,
    target: &'a mut OutputGraph,
    /// Shape and triple expression labels on the current expansion path.
    active: Vec<&'s str>,
}

impl<'s, B: BlankNodeSource> Walk<'s, '_, B> {
    fn enter(&mut self, label: &'s str) -> Result<(), MapError> {
        if self.active.contains(&label) {
            return Err(MapError::ShapeCycle(label.to_string()));
        }
        self.active.push(label);
        Ok(())
    }
}

impl<'s, B: BlankNodeSource> ShapeVisitor<'s> for Walk<'s, '_, B> {
    type Focus = Term;
    type Error = MapError;

    fn schema(&self) -> &'s Schema {
        self.schema
    }

    fn visit_reference(&mut self, label: &'s str, subject: &Term) -> Result<(), MapError> {
        self.enter(label)?;
        let result = walk_reference(self, label, subject);
        self.active.pop();
        result
    }

    fn visit_triple_reference(&mut self, label: &'s str, subject: &Term) -> Result<(), MapError> {
        self.enter(label)?;
        let result = walk_triple_reference(self, label, subject);
        self.active.pop();
        result
    }

    fn visit_triple_constraint(&mut self, tc: &'s TripleConstraint, subject: &Term) -> Result<(), MapError> {
        let mut acts = tc.sem_acts_named(MAP_EXT).peekable();

        if acts.peek().is_some() {
            for act in acts {
                let id = resolve_code(act.code.as_deref().unwrap_or(""), &self.schema.prefixes)?;
                let object = self.bindings.get(&id).cloned();
                if object.is_none() {
                    tracing::warn!(id = %id, predicate = %tc.predicate, "no binding for map identifier");
                }
                self.target.add(subject.clone(), &tc.predicate, object);
            }
            return Ok(());
        }

        if let Some(value) = tc.fixed_value() {
            self.target.add(subject.clone(), &tc.predicate, Some(value.clone()));
            return Ok(());
        }

        let node = Term::blank(self.bnodes.next_label());
        self.target.add(subject.clone(), &tc.predicate, Some(node.clone()));
        walk_triple_constraint(self, tc, &node)
    }
}

// --- tests -------------------------------------------------------------------
