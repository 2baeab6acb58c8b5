//! Error type shared by the recorder, the resolver, and the materializer.

use thiserror::Error;

use crate::code::CODE_PATTERN;
use crate::extension::MAP_EXT;

/// Errors raised while resolving action codes or walking a schema.
///
/// All variants are fatal to the pass that raised them: a validation or
/// materialization run that sees one of these must abort.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The action code did not match [`CODE_PATTERN`].
    #[error("Invocation error: {} code {:?} didn't match /{}/", MAP_EXT, .code, CODE_PATTERN)]
    MalformedCode { code: String },

    /// A `prefix:local` code or prefixed name used a prefix the schema does
    /// not declare.
    #[error("unknown prefix {prefix:?} in {name:?}")]
    UnknownPrefix { prefix: String, name: String },

    /// A shape reference named a label absent from the schema.
    #[error("shape {0:?} is not defined in the schema")]
    UnknownShape(String),

    /// A triple expression reference named an `id` no expression carries.
    #[error("triple expression {0:?} is not defined in the schema")]
    UnknownTripleExpr(String),

    /// Materialization was requested on a schema without a start shape.
    #[error("schema has no start shape")]
    NoStart,

    /// The walk re-entered a shape or triple expression that is already
    /// being materialized.
    #[error("{0:?} refers back to itself; materialization would not terminate")]
    ShapeCycle(String),
}
