//! Resolution of Map action codes to binding identifiers.
//!
//! A code is either an absolute IRI in angle brackets or a `prefix:local`
//! pair; surrounding spaces are tolerated. Both the recorder and the
//! materializer resolve codes through [`resolve_code`], so a binding captured
//! during validation is found again under the same key at replay time.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::MapError;
use crate::term::{expand_prefixed_name, Prefixes};

/// Grammar every Map action code must fully match.
pub const CODE_PATTERN: &str = r"^ *(?:<([^>]*)>|([^:]*):([^ ]*)) *$";

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CODE_PATTERN).expect("invalid code regex"));

/// Resolve `code` to its canonical IRI.
///
/// `<iri>` yields `iri` verbatim; `p:local` yields `prefixes[p] + local`.
///
/// # Errors
///
/// [`MapError::MalformedCode`] when `code` does not match [`CODE_PATTERN`];
/// [`MapError::UnknownPrefix`] when `p` is not declared.
pub fn resolve_code(code: &str, prefixes: &Prefixes) -> Result<String, MapError> {
    let caps = CODE_RE.captures(code).ok_or_else(|| MapError::MalformedCode {
        code: code.to_string(),
    })?;

    if let Some(iri) = caps.get(1) {
        return Ok(iri.as_str().to_string());
    }

    // The alternation guarantees groups 2 and 3 participate together.
    let prefix = caps.get(2).map_or("", |m| m.as_str());
    let local = caps.get(3).map_or("", |m| m.as_str());
    expand_prefixed_name(&format!("{prefix}:{local}"), prefixes)
}

// --- tests -------------------------------------------------------------------
