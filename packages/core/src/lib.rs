//! The ShEx Map semantic-action extension.
//!
//! Map actions attached to triple constraints name the identifier under
//! which a matched value should be remembered. This crate provides both
//! halves of the round trip:
//!
//! - a **recorder** that a validator registers to capture bindings while it
//!   validates an input graph, and
//! - a **materializer** that replays a (possibly different) schema with a
//!   bindings map to build a new output graph.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`term`] | RDF terms: [`Term`], [`Literal`], prefixed-name expansion |
//! | [`schema`] | ShExJ schema model: [`Schema`], [`ShapeExpr`], [`TripleConstraint`] |
//! | [`visitor`] | Overridable structural walk over a schema |
//! | [`code`] | Map action code resolution via [`resolve_code`] |
//! | [`semact`] | Validator-side dispatch table: [`SemActHandler`] |
//! | [`extension`] | Binding recorder: [`register`], [`done`], [`binding_keys`] |
//! | [`materialize`] | [`Materializer`] and blank-node sources |
//! | [`graph`] | The [`OutputGraph`] materialization writes into |
//! | [`render`] | N-Triples and Turtle rendering |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use shexmap::{Bindings, Materializer, Schema, Term};
//!
//! let schema = Schema::from_json(&std::fs::read_to_string("person.json")?)?;
//!
//! let mut bindings = Bindings::new();
//! bindings.insert("http://ex/person.name".into(), Term::literal("Alice"));
//!
//! let graph = Materializer::new(&schema).materialize(&bindings, None, None)?;
//! print!("{}", shexmap::render::render_turtle(&graph));
//! ```

pub mod code;
pub mod error;
pub mod extension;
pub mod graph;
pub mod materialize;
pub mod render;
pub mod schema;
pub mod semact;
pub mod term;
pub mod visitor;

pub use code::{resolve_code, CODE_PATTERN};
pub use error::MapError;
pub use extension::{binding_keys, done, register, MapDispatcher, MAP_EXT};
pub use graph::{OutputGraph, Triple};
pub use materialize::{BNodeCounter, BlankNodeSource, Materializer};
pub use schema::{
    NodeConstraint, SemAct, Schema, Shape, ShapeExpr, ShapeExprRef, TripleConstraint, TripleExpr,
    TripleExprRef,
};
pub use semact::{
    Bindings, SemActContext, SemActDispatcher, SemActHandler, SharedBindings, ValidatorHost,
};
pub use term::{expand_prefixed_name, Literal, Prefixes, Term};
pub use visitor::ShapeVisitor;
