//! Shared helpers for the ShEx Map conformance test suite.
//!
//! Provides [`Driver`], a small host validator that walks a schema over an
//! in-memory data graph and fires semantic actions on every matched triple,
//! and [`capture`], which runs the Map recorder through a full
//! register / validate / done cycle.
//!
//! The driver only checks predicates, fixed values, and minimum
//! cardinalities. It exists to exercise the host contract, not to be a
//! conforming ShEx validator.

use std::collections::HashSet;

use shexmap::visitor::{
    walk_reference, walk_triple_constraint, walk_triple_reference, ShapeVisitor,
};
use shexmap::{
    Bindings, MapError, OutputGraph, Prefixes, Schema, SemActContext, SemActHandler,
    TripleConstraint, ValidatorHost, MAP_EXT,
};

/// A minimal validator over `data` for one schema.
pub struct Driver<'s> {
    schema: &'s Schema,
    data: OutputGraph,
    table: SemActHandler,
}

impl<'s> Driver<'s> {
    pub fn new(schema: &'s Schema, data: OutputGraph) -> Self {
        Self {
            schema,
            data,
            table: SemActHandler::new(),
        }
    }

    /// Validate `focus` against the start shape, dispatching actions as
    /// constraints match. Returns whether every constraint was satisfied.
    pub fn validate(&mut self, focus: &shexmap::Term) -> Result<bool, MapError> {
        let (label, start) = self.schema.start_shape()?;
        let mut check = Check {
            schema: self.schema,
            data: &self.data,
            table: &self.table,
            entered: HashSet::from([(label, focus.clone())]),
            expanding: Vec::new(),
            conforms: true,
        };
        check.visit_shape_expr(start, focus)?;
        tracing::debug!(focus = %focus, conforms = check.conforms, "validation finished");
        Ok(check.conforms)
    }
}

impl ValidatorHost for Driver<'_> {
    fn prefixes(&self) -> &Prefixes {
        &self.schema.prefixes
    }

    fn sem_act_handler(&mut self) -> &mut SemActHandler {
        &mut self.table
    }
}

/// Validate `focus` in `data` with the Map recorder installed and return
/// the captured bindings, or `None` when no Map action fired.
pub fn capture(
    schema: &Schema,
    data: OutputGraph,
    focus: &shexmap::Term,
) -> Result<(bool, Option<Bindings>), MapError> {
    let mut driver = Driver::new(schema, data);
    shexmap::register(&mut driver);
    let conforms = driver.validate(focus)?;
    shexmap::done(&mut driver);

    let bindings = driver
        .sem_act_handler()
        .results_for(MAP_EXT)
        .map(|results| results.borrow().clone());
    Ok((conforms, bindings))
}

/// Parse a ShExJ schema fixture.
///
/// # Panics
///
/// Panics if `json` is not a valid schema.
pub fn schema(json: &str) -> Schema {
    Schema::from_json(json).expect("fixture schema should parse")
}

// --- walk --------------------------------------------------------------------

struct Check<'s, 'd> {
    schema: &'s Schema,
    data: &'d OutputGraph,
    table: &'d SemActHandler,
    /// (shape, focus) pairs already checked; cyclic data would otherwise
    /// recurse forever.
    entered: HashSet<(&'s str, shexmap::Term)>,
    /// Triple expression labels currently being checked.
    expanding: Vec<&'s str>,
    conforms: bool,
}

impl<'s> ShapeVisitor<'s> for Check<'s, '_> {
    type Focus = shexmap::Term;
    type Error = MapError;

    fn schema(&self) -> &'s Schema {
        self.schema
    }

    fn visit_reference(&mut self, label: &'s str, focus: &shexmap::Term) -> Result<(), MapError> {
        if !self.entered.insert((label, focus.clone())) {
            return Ok(());
        }
        walk_reference(self, label, focus)
    }

    fn visit_triple_reference(&mut self, label: &'s str, focus: &shexmap::Term) -> Result<(), MapError> {
        if self.expanding.contains(&label) {
            return Ok(());
        }
        self.expanding.push(label);
        let result = walk_triple_reference(self, label, focus);
        self.expanding.pop();
        result
    }

    fn visit_triple_constraint(
        &mut self,
        tc: &'s TripleConstraint,
        focus: &shexmap::Term,
    ) -> Result<(), MapError> {
        let fixed = tc.fixed_value();
        let matched: Vec<shexmap::Term> = self
            .data
            .objects(focus, &tc.predicate)
            .into_iter()
            .filter(|o| fixed.map_or(true, |v| v == *o))
            .cloned()
            .collect();

        if (matched.len() as i64) < tc.min.unwrap_or(1) {
            self.conforms = false;
        }

        let acts = tc.sem_acts.as_deref().unwrap_or(&[]);
        for object in matched {
            let ctx = SemActContext::triple(focus.clone(), &tc.predicate, object.clone());
            if !self.table.dispatch_all(acts, &ctx)? {
                self.conforms = false;
            }
            walk_triple_constraint(self, tc, &object)?;
        }
        Ok(())
    }
}
