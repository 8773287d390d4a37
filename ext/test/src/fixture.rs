//! Conformance fixture runner
//!
//! A fixture names a set of recording sinks, a [`RouteConfig`] wired to
//! them, and cases: an event plus the sinks it must reach, in order.
//!
//! ```yaml
//! name: severity_split
//! sinks: [alerts, console]
//! routes:
//!   root: main
//!   nodes:
//!     main:
//!       type: dispatch
//!       rules:
//!         - when: { type: severity, level: ERROR }
//!           to: alerts
//!         - to: console
//! cases:
//!   - name: error goes to alerts
//!     event: { level: ERROR }
//!     expect: [alerts]
//! ```

use crate::{Journal, Rank};
use chrono::{DateTime, Utc};
use logroute::{CodeOrigin, Event, Level, NodeHandle, RouteConfig, RouteError, RouteGraph, TextMessage};
use serde::Deserialize;
use std::collections::HashMap;

/// A complete test fixture.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Recording sinks, inserted in this order before the routes.
    #[serde(default)]
    pub sinks: Vec<String>,
    pub routes: RouteConfig,
    /// Expected [`RouteGraph::outline`] from the root, if given.
    #[serde(default)]
    pub outline: Option<String>,
    pub cases: Vec<TestCase>,
}

/// One event and the sinks it must reach.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub event: EventConfig,
    /// Sink names in delivery order; empty means "dropped".
    #[serde(default)]
    pub expect: Vec<String>,
}

/// Facets of a test event. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventConfig {
    /// Severity as a level name.
    #[serde(default)]
    pub level: Option<Level>,
    /// Severity as a bare rank. Takes precedence over `level`.
    #[serde(default)]
    pub rank: Option<i32>,
    /// One-line message.
    #[serde(default)]
    pub message: Option<String>,
    /// Multi-line message. Takes precedence over `message`.
    #[serde(default)]
    pub lines: Option<Vec<String>>,
    /// Origin string.
    #[serde(default)]
    pub origin: Option<String>,
    /// RFC 3339 timestamp. Events are routed unstamped.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EventConfig {
    /// Build the event.
    #[must_use]
    pub fn build(&self) -> Event {
        let mut event = Event::new();
        if let Some(rank) = self.rank {
            event = event.with_severity(Rank(rank));
        } else if let Some(level) = self.level {
            event = event.with_severity(level);
        }
        if let Some(lines) = &self.lines {
            event = event.with_message(TextMessage::from_lines(lines.iter().cloned()));
        } else if let Some(text) = &self.message {
            event = event.with_message(TextMessage::new(text.as_str()));
        }
        if let Some(origin) = &self.origin {
            event = event.with_origin(CodeOrigin::new(origin.as_str(), "", ""));
        }
        if let Some(at) = self.timestamp {
            event = event.with_timestamp(at);
        }
        event
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case.
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
}

/// A fixture's graph, loaded and ready for events.
#[derive(Debug)]
pub struct LoadedFixture {
    pub graph: RouteGraph,
    pub root: NodeHandle,
    pub journal: Journal,
}

impl Fixture {
    /// Parse a fixture from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Insert the sinks and load the routes into a fresh graph.
    ///
    /// # Errors
    ///
    /// Any [`RouteError`] from [`RouteConfig::load`].
    pub fn load(&self) -> Result<LoadedFixture, RouteError> {
        let journal = Journal::new();
        let mut graph = RouteGraph::new();
        let sinks: HashMap<String, NodeHandle> = self
            .sinks
            .iter()
            .map(|name| (name.clone(), graph.insert_sink(journal.sink(name.as_str()))))
            .collect();
        let root = self.routes.load(&mut graph, &sinks)?;
        Ok(LoadedFixture {
            graph,
            root,
            journal,
        })
    }

    /// Run all test cases and return results.
    ///
    /// # Errors
    ///
    /// Any [`RouteError`] from loading the routes.
    pub fn run(&self) -> Result<Vec<CaseResult>, RouteError> {
        let loaded = self.load()?;
        Ok(self
            .cases
            .iter()
            .map(|case| {
                loaded.graph.route(loaded.root, &case.event.build());
                let actual = loaded.journal.take();
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect,
                    expected: case.expect.clone(),
                    actual,
                }
            })
            .collect())
    }

    /// Run all test cases and panic on the first failure.
    pub fn run_and_assert(&self) {
        if let Some(expected) = &self.outline {
            let loaded = self
                .load()
                .unwrap_or_else(|e| panic!("fixture '{}' failed to load: {e}", self.name));
            assert_eq!(
                &loaded.graph.outline(loaded.root),
                expected,
                "fixture '{}': outline mismatch",
                self.name
            );
        }

        let results = self
            .run()
            .unwrap_or_else(|e| panic!("fixture '{}' failed to load: {e}", self.name));
        for result in results {
            assert!(
                result.passed,
                "fixture '{}', case '{}': expected {:?}, got {:?}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPLIT: &str = r#"
name: split
sinks: [alerts, console]
routes:
  root: main
  nodes:
    main:
      type: dispatch
      rules:
        - when: { type: severity, level: ERROR }
          to: alerts
        - to: console
cases:
  - name: error
    event: { level: ERROR }
    expect: [alerts]
  - name: info
    event: { level: INFO }
    expect: [console]
  - name: wrongly expected
    event: { level: DEBUG }
    expect: [alerts]
"#;

    #[test]
    fn parse_and_run() {
        let fixture = Fixture::from_yaml(SPLIT).unwrap();
        assert_eq!(fixture.sinks, vec!["alerts", "console"]);

        let results = fixture.run().unwrap();
        let passed: Vec<bool> = results.iter().map(|r| r.passed).collect();
        assert_eq!(passed, vec![true, true, false]);
        assert_eq!(results[2].actual, vec!["console"]);
    }

    #[test]
    fn multi_document() {
        let yaml = format!("{SPLIT}\n---\n{SPLIT}");
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
    }

    #[test]
    fn event_config_builds_facets() {
        let config: EventConfig = serde_yaml::from_str(
            "{ rank: 9, level: INFO, lines: [a, b], message: ignored, origin: net, timestamp: 2024-01-01T00:00:00Z }",
        )
        .unwrap();
        let event = config.build();
        assert_eq!(event.severity().map(|s| s.rank()), Some(9));
        assert_eq!(event.message().map(|m| m.lines()), Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(event.origin().map(|o| o.describe().into_owned()), Some("net".to_string()));
        assert!(event.timestamp().is_some());

        let empty = EventConfig::default().build();
        assert!(empty.severity().is_none() && empty.timestamp().is_none());
    }

    #[test]
    fn unresolved_route_fails_to_load() {
        let fixture = Fixture::from_yaml(
            "name: broken\nroutes: { root: nowhere }\ncases: []\n",
        )
        .unwrap();
        assert!(matches!(
            fixture.run(),
            Err(RouteError::UnknownReference { name }) if name == "nowhere"
        ));
    }
}
