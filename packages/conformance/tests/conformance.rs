//! End-to-end tests for the ShEx Map extension.
//!
//! Each test validates a source data graph against a Map-annotated source
//! schema through [`shexmap_conformance::capture`], then materializes a
//! target schema from the captured bindings and inspects the result.
//!
//! # Coverage
//!
//! | Test | Behaviour |
//! |------|-----------|
//! | `person_round_trip` | capture from one vocabulary, materialize into another |
//! | `nested_source_flattens_into_target` | bindings captured below the focus node |
//! | `no_map_actions_leaves_no_results` | `done` removes an unused results entry |
//! | `repeated_capture_keeps_last_value` | last-write-wins on repeated identifiers |
//! | `malformed_code_aborts_validation` | bad code raises during capture |
//! | `binding_keys_match_captured_keys` | pre-flight key listing agrees with capture |
//! | `missing_capture_yields_unbound_triple` | absent bindings are not errors |
//! | `rendered_output_is_stable` | N-Triples rendering of a materialized graph |

use shexmap::render::render_ntriples;
use shexmap::{binding_keys, Bindings, MapError, Materializer, OutputGraph, Term};
use shexmap_conformance::{capture, schema};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const SOURCE: &str = r#"{
    "type": "Schema",
    "prefixes": { "my": "http://my.example/#", "ex": "http://ex.example/#" },
    "start": "http://ex.example/#Patient",
    "shapes": {
        "http://ex.example/#Patient": {
            "type": "Shape",
            "expression": {
                "type": "EachOf",
                "expressions": [
                    {
                        "type": "TripleConstraint",
                        "predicate": "http://ex.example/#given",
                        "semActs": [ { "name": "http://shex.io/extensions/Map/#", "code": "my:given" } ]
                    },
                    {
                        "type": "TripleConstraint",
                        "predicate": "http://ex.example/#family",
                        "semActs": [ { "name": "http://shex.io/extensions/Map/#", "code": "<http://my.example/#family>" } ]
                    },
                    {
                        "type": "TripleConstraint",
                        "predicate": "http://ex.example/#address",
                        "min": 0,
                        "valueExpr": "http://ex.example/#Address"
                    }
                ]
            }
        },
        "http://ex.example/#Address": {
            "type": "Shape",
            "expression": {
                "type": "TripleConstraint",
                "predicate": "http://ex.example/#city",
                "semActs": [ { "name": "http://shex.io/extensions/Map/#", "code": "my:city" } ]
            }
        }
    }
}"#;

const TARGET: &str = r#"{
    "type": "Schema",
    "prefixes": { "my": "http://my.example/#", "foaf": "http://xmlns.com/foaf/0.1/" },
    "start": "http://target.example/#Person",
    "shapes": {
        "http://target.example/#Person": {
            "type": "Shape",
            "expression": {
                "type": "EachOf",
                "expressions": [
                    {
                        "type": "TripleConstraint",
                        "predicate": "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
                        "valueExpr": { "type": "NodeConstraint", "values": [ "http://xmlns.com/foaf/0.1/Person" ] }
                    },
                    {
                        "type": "TripleConstraint",
                        "predicate": "http://xmlns.com/foaf/0.1/givenName",
                        "semActs": [ { "name": "http://shex.io/extensions/Map/#", "code": "my:given" } ]
                    },
                    {
                        "type": "TripleConstraint",
                        "predicate": "http://xmlns.com/foaf/0.1/familyName",
                        "semActs": [ { "name": "http://shex.io/extensions/Map/#", "code": "my:family" } ]
                    },
                    {
                        "type": "TripleConstraint",
                        "predicate": "http://xmlns.com/foaf/0.1/based_near",
                        "valueExpr": "http://target.example/#Place"
                    }
                ]
            }
        },
        "http://target.example/#Place": {
            "type": "Shape",
            "expression": {
                "type": "TripleConstraint",
                "predicate": "http://xmlns.com/foaf/0.1/name",
                "semActs": [ { "name": "http://shex.io/extensions/Map/#", "code": "my:city" } ]
            }
        }
    }
}"#;

fn ex(local: &str) -> String {
    format!("http://ex.example/#{local}")
}

fn foaf(local: &str) -> String {
    format!("http://xmlns.com/foaf/0.1/{local}")
}

fn patient_data() -> (Term, OutputGraph) {
    let patient = Term::iri("http://data.example/patient/1");
    let addr = Term::blank("a1");
    let mut data = OutputGraph::new();
    data.add(patient.clone(), ex("given"), Some(Term::literal("Ann")));
    data.add(patient.clone(), ex("family"), Some(Term::literal("Smith")));
    data.add(patient.clone(), ex("address"), Some(addr.clone()));
    data.add(addr, ex("city"), Some(Term::literal("Boston")));
    (patient, data)
}

fn captured(source: &str, data: OutputGraph, focus: &Term) -> Bindings {
    let (conforms, bindings) = capture(&schema(source), data, focus).unwrap();
    assert!(conforms, "source data should conform");
    bindings.expect("map actions should have fired")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn person_round_trip() {
    let (patient, data) = patient_data();
    let bindings = captured(SOURCE, data, &patient);

    assert_eq!(bindings.len(), 3);
    assert_eq!(
        bindings.get("http://my.example/#given"),
        Some(&Term::literal("Ann"))
    );

    let target = schema(TARGET);
    let person = Term::iri("http://data.example/person/1");
    let graph = Materializer::new(&target)
        .materialize(&bindings, Some(person.clone()), None)
        .unwrap();

    let given = graph.objects(&person, &foaf("givenName"));
    assert_eq!(given, vec![&Term::literal("Ann")]);
    let family = graph.objects(&person, &foaf("familyName"));
    assert_eq!(family, vec![&Term::literal("Smith")]);
    let types = graph.objects(&person, "http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
    assert_eq!(types, vec![&Term::iri(foaf("Person"))]);
}

#[test]
fn nested_source_flattens_into_target() {
    let (patient, data) = patient_data();
    let bindings = captured(SOURCE, data, &patient);

    let target = schema(TARGET);
    let person = Term::iri("http://data.example/person/1");
    let graph = Materializer::new(&target)
        .materialize(&bindings, Some(person.clone()), None)
        .unwrap();

    let places: Vec<Term> = graph
        .objects(&person, &foaf("based_near"))
        .into_iter()
        .cloned()
        .collect();
    assert_eq!(places, vec![Term::blank("b0")]);
    let names = graph.objects(&places[0], &foaf("name"));
    assert_eq!(names, vec![&Term::literal("Boston")]);
    assert_eq!(graph.len(), 5);
}

#[test]
fn no_map_actions_leaves_no_results() {
    let plain = r#"{
        "start": "http://ex.example/#S",
        "shapes": { "http://ex.example/#S": { "type": "Shape", "expression": {
            "type": "TripleConstraint", "predicate": "http://ex.example/#given" } } }
    }"#;
    let (patient, data) = patient_data();
    let (conforms, bindings) = capture(&schema(plain), data, &patient).unwrap();
    assert!(conforms);
    assert_eq!(bindings, None);
}

#[test]
fn repeated_capture_keeps_last_value() {
    let (patient, mut data) = patient_data();
    data.add(patient.clone(), ex("given"), Some(Term::literal("Annie")));
    let bindings = captured(SOURCE, data, &patient);
    assert_eq!(
        bindings.get("http://my.example/#given"),
        Some(&Term::literal("Annie"))
    );
}

#[test]
fn malformed_code_aborts_validation() {
    let bad = SOURCE.replace("\"my:given\"", "\"my given\"");
    let (patient, data) = patient_data();
    let err = capture(&schema(&bad), data, &patient).unwrap_err();
    assert_eq!(
        err,
        MapError::MalformedCode {
            code: "my given".into()
        }
    );
}

#[test]
fn binding_keys_match_captured_keys() {
    let (patient, data) = patient_data();
    let bindings = captured(SOURCE, data, &patient);
    let keys = binding_keys(&schema(SOURCE)).unwrap();
    assert!(keys.iter().eq(bindings.keys()));
    assert_eq!(keys, binding_keys(&schema(TARGET)).unwrap());
}

#[test]
fn missing_capture_yields_unbound_triple() {
    let patient = Term::iri("http://data.example/patient/2");
    let mut data = OutputGraph::new();
    data.add(patient.clone(), ex("given"), Some(Term::literal("Bo")));
    data.add(patient.clone(), ex("family"), Some(Term::literal("Li")));
    let bindings = captured(SOURCE, data, &patient);
    assert!(!bindings.contains_key("http://my.example/#city"));

    let target = schema(TARGET);
    let graph = Materializer::new(&target)
        .materialize(&bindings, None, None)
        .unwrap();
    let unbound: Vec<_> = graph.unbound().map(|t| t.predicate.as_str()).collect();
    assert_eq!(unbound, vec![foaf("name")]);
}

#[test]
fn rendered_output_is_stable() {
    let (patient, data) = patient_data();
    let bindings = captured(SOURCE, data, &patient);

    let target = schema(TARGET);
    let graph = Materializer::new(&target)
        .materialize(&bindings, None, None)
        .unwrap();
    let nt = render_ntriples(&graph);
    assert_eq!(
        nt,
        "_:b0 <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://xmlns.com/foaf/0.1/Person> .\n\
         _:b0 <http://xmlns.com/foaf/0.1/givenName> \"Ann\" .\n\
         _:b0 <http://xmlns.com/foaf/0.1/familyName> \"Smith\" .\n\
         _:b0 <http://xmlns.com/foaf/0.1/based_near> _:b1 .\n\
         _:b1 <http://xmlns.com/foaf/0.1/name> \"Boston\" .\n"
    );
}
