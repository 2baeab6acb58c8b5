//! The Map extension's binding recorder.
//!
//! [`register`] installs a [`MapDispatcher`] into a validator's dispatch
//! table. Each time a constraint tagged with a Map action matches, the
//! dispatcher resolves the action code and records the matched object under
//! the resolved identifier. After validation, [`done`] drops the results
//! entry again if nothing was captured.
//!
//! Repeated captures of one identifier keep only the last value.
//! TODO: track multiplicity so repeated captures can be replayed as
//! multiple triples.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::code::resolve_code;
use crate::error::MapError;
use crate::schema::{Schema, TripleConstraint};
use crate::semact::{SemActContext, SemActDispatcher, SharedBindings, ValidatorHost};
use crate::term::Prefixes;
use crate::visitor::{walk_reference, walk_triple_constraint, ShapeVisitor};

/// Extension IRI identifying Map semantic actions.
pub const MAP_EXT: &str = "http://shex.io/extensions/Map/#";

/// Records `ctx.object` under the identifier each action code resolves to.
pub struct MapDispatcher {
    prefixes: Prefixes,
    results: SharedBindings,
}

impl MapDispatcher {
    pub fn new(prefixes: Prefixes, results: SharedBindings) -> Self {
        Self { prefixes, results }
    }
}

impl SemActDispatcher for MapDispatcher {
    fn dispatch(&self, code: &str, ctx: &SemActContext) -> Result<bool, MapError> {
        let id = resolve_code(code, &self.prefixes)?;
        tracing::debug!(id = %id, object = %ctx.object, "map binding captured");
        self.results.borrow_mut().insert(id, ctx.object.clone());
        Ok(true)
    }
}

/// Install the Map extension into `validator`.
///
/// Returns the (initially empty) results map; it fills as validation
/// proceeds.
pub fn register<V: ValidatorHost + ?Sized>(validator: &mut V) -> SharedBindings {
    let prefixes = validator.prefixes().clone();
    let results: SharedBindings = Rc::new(RefCell::new(Default::default()));

    let table = validator.sem_act_handler();
    table.results.insert(MAP_EXT.to_string(), Rc::clone(&results));
    table.register(MAP_EXT, Box::new(MapDispatcher::new(prefixes, Rc::clone(&results))));
    results
}

/// Post-validation cleanup: remove the results entry when no binding was
/// captured, so its presence signals that the extension engaged.
pub fn done<V: ValidatorHost + ?Sized>(validator: &mut V) {
    let table = validator.sem_act_handler();
    let empty = table
        .results
        .get(MAP_EXT)
        .is_some_and(|results| results.borrow().is_empty());
    if empty {
        tracing::debug!("no map bindings captured; results entry removed");
        table.remove_results(MAP_EXT);
    }
}

/// Every identifier that Map actions in `schema` refer to.
///
/// All labelled shapes are scanned, reachable from the start shape or not.
/// Fails on the first malformed code or unknown prefix, which makes this a
/// cheap pre-flight check before validation or materialization.
pub fn binding_keys(schema: &Schema) -> Result<BTreeSet<String>, MapError> {
    let mut collector = KeyCollector {
        schema,
        entered: BTreeSet::new(),
        keys: BTreeSet::new(),
    };
    for label in schema.shapes.keys() {
        collector.visit_reference(label, &())?;
    }
    Ok(collector.keys)
}

struct KeyCollector<'s> {
    schema: &'s Schema,
    entered: BTreeSet<&'s str>,
    keys: BTreeSet<String>,
}

impl<'s> ShapeVisitor<'s> for KeyCollector<'s> {
    type Focus = ();
    type Error = MapError;

    fn schema(&self) -> &'s Schema {
        self.schema
    }

    fn visit_reference(&mut self, label: &'s str, focus: &()) -> Result<(), MapError> {
        if !self.entered.insert(label) {
            return Ok(());
        }
        walk_reference(self, label, focus)
    }

    /// Labelled triple expressions are scanned where they are declared.
    fn visit_triple_reference(&mut self, _label: &'s str, _focus: &()) -> Result<(), MapError> {
        Ok(())
    }

    fn visit_triple_constraint(&mut self, tc: &'s TripleConstraint, focus: &()) -> Result<(), MapError> {
        for act in tc.sem_acts_named(MAP_EXT) {
            let code = act.code.as_deref().unwrap_or("");
            self.keys.insert(resolve_code(code, &self.schema.prefixes)?);
        }
        walk_triple_constraint(self, tc, focus)
    }
}

// --- tests -------------------------------------------------------------------
