//! Host-side semantic-action dispatch table.
//!
//! A validator keeps one [`SemActHandler`]. Extensions install a
//! [`SemActDispatcher`] under their extension IRI; when a constraint carrying
//! an action of that extension matches, the validator calls
//! [`SemActHandler::dispatch_all`] with the action list and the matched
//! triple. Per-extension results live in [`SemActHandler::results`], keyed by
//! the same IRI.
//!
//! Dispatch is synchronous and single-threaded: it runs inline in whatever
//! call the validator uses to check a constraint, which is why results are
//! shared through `Rc<RefCell<_>>` rather than a lock.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::error::MapError;
use crate::schema::SemAct;
use crate::term::{Prefixes, Term};

/// Canonical identifier → bound term.
pub type Bindings = BTreeMap<String, Term>;

/// A [`Bindings`] map shared between the dispatch table and its observers.
pub type SharedBindings = Rc<RefCell<Bindings>>;

/// The triple a validator matched when it fired an action.
#[derive(Debug, Clone, PartialEq)]
pub struct SemActContext {
    pub subject: Option<Term>,
    pub predicate: Option<String>,
    /// The term bound at this point in validation.
    pub object: Term,
}

impl SemActContext {
    /// A context carrying only the bound object.
    pub fn object(object: Term) -> Self {
        Self {
            subject: None,
            predicate: None,
            object,
        }
    }

    pub fn triple(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: Some(subject),
            predicate: Some(predicate.into()),
            object,
        }
    }
}

/// An extension's action handler.
pub trait SemActDispatcher {
    /// Handle one action invocation.
    ///
    /// `Ok(false)` tells the validator the constraint should fail; errors
    /// abort the validation pass.
    fn dispatch(&self, code: &str, ctx: &SemActContext) -> Result<bool, MapError>;
}

/// What a validator must expose for an extension to install itself.
pub trait ValidatorHost {
    /// Prefixes declared by the schema being validated.
    fn prefixes(&self) -> &Prefixes;

    fn sem_act_handler(&mut self) -> &mut SemActHandler;
}

/// Extension IRI → handler, plus per-extension results.
#[derive(Default)]
pub struct SemActHandler {
    handlers: HashMap<String, Box<dyn SemActDispatcher>>,
    pub results: HashMap<String, SharedBindings>,
}

impl SemActHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` for extension `name`, replacing any earlier one.
    pub fn register(&mut self, name: impl Into<String>, handler: Box<dyn SemActDispatcher>) {
        let name = name.into();
        tracing::debug!(extension = %name, "semantic action handler registered");
        self.handlers.insert(name, handler);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Dispatch one action.
    ///
    /// Actions of unregistered extensions are skipped and count as success.
    pub fn dispatch(&self, name: &str, code: &str, ctx: &SemActContext) -> Result<bool, MapError> {
        match self.handlers.get(name) {
            Some(handler) => handler.dispatch(code, ctx),
            None => {
                tracing::debug!(extension = %name, "no handler registered; action skipped");
                Ok(true)
            }
        }
    }

    /// Dispatch every action in `acts` in order, stopping at the first one
    /// that fails or errors.
    pub fn dispatch_all(&self, acts: &[SemAct], ctx: &SemActContext) -> Result<bool, MapError> {
        for act in acts {
            if !self.dispatch(&act.name, act.code.as_deref().unwrap_or(""), ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Results recorded by extension `name`, if it has any.
    pub fn results_for(&self, name: &str) -> Option<&SharedBindings> {
        self.results.get(name)
    }

    /// Drop the results entry of extension `name`, returning it if present.
    pub fn remove_results(&mut self, name: &str) -> Option<SharedBindings> {
        self.results.remove(name)
    }
}

impl fmt::Debug for SemActHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("SemActHandler")
            .field("handlers", &names)
            .field("results", &self.results)
            .finish()
    }
}

// --- tests -------------------------------------------------------------------
