//! Text rendering of an [`OutputGraph`].
//!
//! Two forms are produced: N-Triples, one triple per line, and a compact
//! Turtle rendering that uses the graph's prefixes and groups triples by
//! subject. Triples whose object is unbound cannot be written as RDF; both
//! renderers emit them as comment lines so they stay visible.

use std::collections::HashMap;

use crate::graph::{OutputGraph, Triple};
use crate::term::{Prefixes, Term};

/// Render `graph` as N-Triples.
///
/// ```text
/// _:b0 <http://ex/name> "Alice" .
/// # unbound: _:b0 <http://ex/age>
/// ```
pub fn render_ntriples(graph: &OutputGraph) -> String {
    let mut out = String::new();
    for t in graph.triples() {
        match &t.object {
            Some(o) => out.push_str(&format!("{} <{}> {} .\n", t.subject, t.predicate, o)),
            None => out.push_str(&format!("# unbound: {} <{}>\n", t.subject, t.predicate)),
        }
    }
    out
}

/// Render `graph` as Turtle.
///
/// ```text
/// @prefix ex: <http://ex/> .
///
/// _:b0 ex:name "Alice" ;
///     ex:address _:b1 .
///
/// _:b1 ex:city "Paris" .
/// ```
pub fn render_turtle(graph: &OutputGraph) -> String {
    let prefixes = graph.prefixes();
    let mut out = String::new();

    for (name, iri) in prefixes {
        out.push_str(&format!("@prefix {name}: <{iri}> .\n"));
    }

    for (subject, triples) in group_by_subject(graph) {
        out.push('\n');

        let (bound, unbound): (Vec<&Triple>, Vec<&Triple>) =
            triples.into_iter().partition(|t| t.object.is_some());

        let subj = compact_term(subject, prefixes);
        for t in &unbound {
            out.push_str(&format!(
                "# unbound: {} {}\n",
                subj,
                compact_iri(&t.predicate, prefixes)
            ));
        }

        for (i, t) in bound.iter().enumerate() {
            if i == 0 {
                out.push_str(&subj);
                out.push(' ');
            } else {
                out.push_str("    ");
            }
            let object = t.object.as_ref().map(|o| compact_term(o, prefixes)).unwrap_or_default();
            let end = if i + 1 == bound.len() { " ." } else { " ;" };
            out.push_str(&format!(
                "{} {}{}\n",
                compact_iri(&t.predicate, prefixes),
                object,
                end
            ));
        }
    }

    out
}

// --- helpers -----------------------------------------------------------------

/// Triples grouped by subject in one pass. Subjects keep first-seen order.
fn group_by_subject(graph: &OutputGraph) -> Vec<(&Term, Vec<&Triple>)> {
    let mut index: HashMap<&Term, usize> = HashMap::new();
    let mut groups: Vec<(&Term, Vec<&Triple>)> = Vec::new();
    for t in graph.triples() {
        let slot = *index.entry(&t.subject).or_insert_with(|| {
            groups.push((&t.subject, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(t);
    }
    groups
}

fn compact_term(term: &Term, prefixes: &Prefixes) -> String {
    match term {
        Term::Iri(iri) => compact_iri(iri, prefixes),
        other => other.to_string(),
    }
}

/// `ex:local` when a prefix matches and the local part is a plain name,
/// `<iri>` otherwise. The longest matching namespace wins.
fn compact_iri(iri: &str, prefixes: &Prefixes) -> String {
    prefixes
        .iter()
        .filter_map(|(name, ns)| {
            let local = iri.strip_prefix(ns.as_str())?;
            is_plain_local(local).then_some((name, ns.len(), local))
        })
        .max_by_key(|(_, len, _)| *len)
        .map(|(name, _, local)| format!("{name}:{local}"))
        .unwrap_or_else(|| format!("<{iri}>"))
}

fn is_plain_local(local: &str) -> bool {
    !local.is_empty()
        && !local.ends_with('.')
        && local
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !local.starts_with(['.', '-'])
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> OutputGraph {
        let mut g = OutputGraph::new();
        g.add_prefixes(&Prefixes::from([("ex".into(), "http://ex/".into())]));
        let b0 = Term::blank("b0");
        let b1 = Term::blank("b1");
        g.add(b0.clone(), "http://ex/name", Some(Term::literal("Alice")));
        g.add(b0.clone(), "http://ex/address", Some(b1.clone()));
        g.add(b0.clone(), "http://ex/age", None);
        g.add(b1, "http://ex/city", Some(Term::literal("Paris")));
        g
    }

    #[test]
    fn ntriples_lines() {
        let nt = render_ntriples(&graph());
        let lines: Vec<&str> = nt.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"_:b0 <http://ex/name> "Alice" ."#,
                "_:b0 <http://ex/address> _:b1 .",
                "# unbound: _:b0 <http://ex/age>",
                r#"_:b1 <http://ex/city> "Paris" ."#,
            ]
        );
    }

    #[test]
    fn turtle_groups_by_subject() {
        let ttl = render_turtle(&graph());
        assert!(ttl.starts_with("@prefix ex: <http://ex/> .\n"));
        assert!(ttl.contains("_:b0 ex:name \"Alice\" ;\n    ex:address _:b1 .\n"));
        assert!(ttl.contains("# unbound: _:b0 ex:age\n"));
        assert!(ttl.contains("_:b1 ex:city \"Paris\" .\n"));
    }

    #[test]
    fn turtle_regroups_interleaved_subjects() {
        let mut g = OutputGraph::new();
        let a = Term::iri("http://ex/a");
        let b = Term::iri("http://ex/b");
        g.add(a.clone(), "http://ex/p", Some(Term::literal("1")));
        g.add(b.clone(), "http://ex/p", Some(Term::literal("2")));
        g.add(a, "http://ex/q", Some(Term::literal("3")));
        g.add(b, "http://ex/q", Some(Term::literal("4")));

        let groups = group_by_subject(&g);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1.len(), 2);

        let ttl = render_turtle(&g);
        assert_eq!(
            ttl,
            "\n<http://ex/a> <http://ex/p> \"1\" ;\n    <http://ex/q> \"3\" .\n\
             \n<http://ex/b> <http://ex/p> \"2\" ;\n    <http://ex/q> \"4\" .\n"
        );
    }

    #[test]
    fn compaction_falls_back_to_full_iri() {
        let p = Prefixes::from([("ex".into(), "http://ex/".into())]);
        assert_eq!(compact_iri("http://ex/a", &p), "ex:a");
        assert_eq!(compact_iri("http://ex/a/b", &p), "<http://ex/a/b>");
        assert_eq!(compact_iri("http://other/a", &p), "<http://other/a>");
        assert_eq!(compact_iri("http://ex/", &p), "<http://ex/>");
    }
}
