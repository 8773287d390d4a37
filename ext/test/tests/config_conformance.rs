//! Config conformance tests: JSON route documents, good and bad.
//!
//! Run with: cargo test -p logroute-test --test config_conformance

#![cfg(feature = "fixtures")]

use logroute::{Event, Level, NodeHandle, RouteConfig, RouteError, RouteGraph};
use logroute_test::Journal;
use std::collections::HashMap;

/// Graph with `names` as recording sinks.
fn graph_with(names: &[&str]) -> (RouteGraph, HashMap<String, NodeHandle>, Journal) {
    let journal = Journal::new();
    let mut graph = RouteGraph::new();
    let sinks = names
        .iter()
        .map(|name| (name.to_string(), graph.insert_sink(journal.sink(*name))))
        .collect();
    (graph, sinks, journal)
}

fn load(json: &str, names: &[&str]) -> Result<(RouteGraph, NodeHandle, Journal), RouteError> {
    let config = RouteConfig::from_json(json)?;
    let (mut graph, sinks, journal) = graph_with(names);
    let root = config.load(&mut graph, &sinks)?;
    Ok((graph, root, journal))
}

#[test]
fn json_routes_load_and_dispatch() {
    let json = r#"{
        "root": "main",
        "nodes": {
            "main": {
                "type": "dispatch",
                "rules": [
                    { "when": { "type": "severity", "level": "WARNING" }, "to": "loud",
                      "continue_when": { "type": "true" } },
                    { "when": { "type": "message", "match": { "exact": "ping" } } },
                    { "to": "all" }
                ]
            }
        }
    }"#;
    let (graph, root, journal) = load(json, &["loud", "all"]).unwrap();

    graph.route(root, &Event::new().with_severity(Level::Error));
    assert_eq!(journal.take(), vec!["loud", "all"]);

    graph.route(
        root,
        &Event::new().with_message(logroute::TextMessage::new("ping")),
    );
    assert!(journal.take().is_empty());

    // dispatch stamps; the severity rule still decides.
    graph.dispatch(root, Event::new().with_severity(Level::Debug));
    assert_eq!(journal.take(), vec!["all"]);
}

#[test]
fn root_may_name_a_sink() {
    let (graph, root, journal) = load(r#"{ "root": "only" }"#, &["only"]).unwrap();
    graph.route(root, &Event::new());
    assert_eq!(journal.take(), vec!["only"]);
}

/// Each document must fail with the given error, and leave the graph untouched.
#[test]
fn invalid_documents_are_rejected() {
    let cases: &[(&str, fn(&RouteError) -> bool)] = &[
        (r#"{ "root": "main", "extra": 1 }"#, |e| {
            matches!(e, RouteError::InvalidConfig { .. })
        }),
        (r#"{ "root": "main", "nodes": { "main": { "type": "fan" } } }"#, |e| {
            matches!(e, RouteError::InvalidConfig { .. })
        }),
        (r#"{ "root": "missing" }"#, |e| {
            matches!(e, RouteError::UnknownReference { name } if name == "missing")
        }),
        (
            r#"{ "root": "main", "nodes": { "main": { "type": "broadcast", "children": ["ghost"] } } }"#,
            |e| matches!(e, RouteError::UnknownReference { name } if name == "ghost"),
        ),
        (r#"{ "root": "out", "nodes": { "out": { "type": "null" } } }"#, |e| {
            matches!(e, RouteError::DuplicateName { name } if name == "out")
        }),
        (
            r#"{ "root": "main", "nodes": { "main": { "type": "dispatch", "rules": [
                { "when": { "type": "severity" }, "to": "out" } ] } } }"#,
            |e| matches!(e, RouteError::MissingThreshold),
        ),
        (
            r#"{ "root": "main", "nodes": { "main": { "type": "dispatch", "rules": [
                { "when": { "type": "origin", "match": { "regex": "(" } }, "to": "out" } ] } } }"#,
            |e| matches!(e, RouteError::InvalidPattern { pattern, .. } if pattern == "("),
        ),
        (
            r#"{ "root": "main", "nodes": { "main": { "type": "dispatch", "rules": [
                { "when": { "type": "message", "match": { "prefix": "a", "suffix": "b" } } } ] } } }"#,
            |e| matches!(e, RouteError::InvalidConfig { .. }),
        ),
        (
            r#"{ "root": "main", "nodes": { "main": { "type": "dispatch", "rules": [
                { "when": { "type": "severity", "level": "LOUD" } } ] } } }"#,
            |e| matches!(e, RouteError::UnknownLevel(_)),
        ),
    ];

    for (json, expected) in cases {
        let (mut graph, sinks, _journal) = graph_with(&["out"]);
        let before = graph.len();
        let error = RouteConfig::from_json(json)
            .and_then(|config| config.load(&mut graph, &sinks))
            .expect_err(json);
        assert!(expected(&error), "unexpected error {error:?} for {json}");
        assert_eq!(graph.len(), before, "graph changed for {json}");
    }
}
