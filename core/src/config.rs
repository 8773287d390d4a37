//! Config types for building routing graphs from JSON/YAML.
//!
//! These types mirror the runtime types but are serde-deserializable. Node
//! and sink references are by name; [`RouteConfig::load`] resolves them.
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type |
//! |-------------|-------------|
//! | [`RouteConfig`] | nodes of a [`RouteGraph`] |
//! | [`NodeConfig`] | [`NodeKind`] |
//! | [`RuleConfig`] | [`Rule`] |
//! | [`PredicateConfig`] | [`Predicate<Event>`] |
//! | [`StringMatcherConfig`] | [`StringMatcher`] |
//!
//! ```yaml
//! root: main
//! nodes:
//!   main:
//!     type: dispatch
//!     rules:
//!       - when: { type: severity, relation: ">=", level: ERROR }
//!         to: alerts
//!         continue_when: { type: "true" }
//!       - to: console
//! ```

use crate::{
    Broadcast, Event, FacetPredicate, Level, MessageFacet, MessageMatch, NodeHandle, NodeKind,
    OrderRelation, OriginFacet, OriginMatch, Predicate, RouteError, RouteGraph, Rule,
    RuleDispatch, Severity, SeverityOrder, StringMatcher, TimeWindow, TimestampFacet,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// A named set of routing nodes plus the entry point.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Name of the node (or sink) events enter at.
    pub root: String,

    /// Routing nodes by name. Loaded in name order.
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeConfig>,
}

/// Configuration for one routing node.
///
/// ```json
/// { "type": "broadcast", "children": ["a", "b"] }
/// { "type": "dispatch", "rules": [{ "when": { ... }, "to": "a" }] }
/// { "type": "null" }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeConfig {
    /// Fan out to every child.
    Broadcast {
        /// Child names, in order.
        #[serde(default)]
        children: Vec<String>,
    },
    /// Ordered rule evaluation.
    Dispatch {
        /// Rules, in order.
        #[serde(default)]
        rules: Vec<RuleConfig>,
    },
    /// Drop everything.
    Null,
}

/// Configuration for a [`Rule`]. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Gate; absent means "always".
    #[serde(default)]
    pub when: Option<PredicateConfig>,

    /// Target name; absent means "nowhere".
    #[serde(default)]
    pub to: Option<String>,

    /// Continuation; absent means "stop after this rule".
    #[serde(default)]
    pub continue_when: Option<PredicateConfig>,
}

/// Configuration for an event predicate.
///
/// Uses `#[serde(tag = "type")]` for discriminated union deserialization:
///
/// ```json
/// { "type": "true" }
/// { "type": "any", "predicates": [...] }
/// { "type": "severity", "relation": "<", "threshold": 2, "missing": true }
/// { "type": "message", "match": { "contains": "timeout", "ignore_case": true } }
/// { "type": "timestamp", "not_before": "2024-01-01T00:00:00Z" }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredicateConfig {
    /// Always matches.
    True,
    /// Never matches.
    False,
    /// Every child matches (empty ⇒ true).
    All {
        /// Child predicates.
        #[serde(default)]
        predicates: Vec<PredicateConfig>,
    },
    /// Some child matches (empty ⇒ false).
    Any {
        /// Child predicates.
        #[serde(default)]
        predicates: Vec<PredicateConfig>,
    },
    /// No child matches (empty ⇒ true).
    None {
        /// Child predicates.
        #[serde(default)]
        predicates: Vec<PredicateConfig>,
    },
    /// Severity rank compared to a threshold.
    Severity {
        /// Comparison; defaults to `>=`.
        #[serde(default)]
        relation: OrderRelation,
        /// Numeric threshold. Takes precedence over `level`.
        #[serde(default)]
        threshold: Option<i32>,
        /// Threshold given as a level name, resolved when the predicate is built.
        #[serde(default)]
        level: Option<String>,
        /// Answer for events without severity.
        #[serde(default)]
        missing: bool,
    },
    /// Some message line matches.
    Message {
        /// Text match; absent answers `missing`.
        #[serde(default, rename = "match")]
        matcher: Option<StringMatcherConfig>,
        /// Answer for events without message.
        #[serde(default)]
        missing: bool,
    },
    /// The origin string matches.
    Origin {
        /// Text match; absent answers `missing`.
        #[serde(default, rename = "match")]
        matcher: Option<StringMatcherConfig>,
        /// Answer for events without origin.
        #[serde(default)]
        missing: bool,
    },
    /// The timestamp lies inside inclusive bounds.
    Timestamp {
        /// Earliest matching instant (RFC 3339).
        #[serde(default)]
        not_before: Option<DateTime<Utc>>,
        /// Latest matching instant (RFC 3339).
        #[serde(default)]
        not_after: Option<DateTime<Utc>>,
        /// Answer for events without timestamp.
        #[serde(default)]
        missing: bool,
    },
}

/// Configuration for a [`StringMatcher`]: exactly one of the pattern fields.
///
/// ```json
/// { "prefix": "net.", "ignore_case": true }
/// { "regex": "^retry \\d+$" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StringMatcherConfig {
    /// Whole-string equality.
    #[serde(default)]
    pub exact: Option<String>,
    /// Prefix.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Suffix.
    #[serde(default)]
    pub suffix: Option<String>,
    /// Substring.
    #[serde(default)]
    pub contains: Option<String>,
    /// Regular expression (unanchored search).
    #[serde(default)]
    pub regex: Option<String>,
    /// ASCII case-insensitive matching.
    #[serde(default)]
    pub ignore_case: bool,
}

impl StringMatcherConfig {
    /// Compile into a runtime [`StringMatcher`].
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidConfig`] unless exactly one pattern field is set
    /// - [`RouteError::InvalidPattern`] if the regex does not compile
    pub fn compile(&self) -> Result<StringMatcher, RouteError> {
        let ignore_case = self.ignore_case;
        let set = [&self.exact, &self.prefix, &self.suffix, &self.contains, &self.regex]
            .iter()
            .filter(|field| field.is_some())
            .count();
        if set > 1 {
            return Err(Self::ambiguous());
        }

        if let Some(v) = &self.exact {
            return Ok(StringMatcher::exact(v.as_str(), ignore_case));
        }
        if let Some(v) = &self.prefix {
            return Ok(StringMatcher::prefix(v.as_str(), ignore_case));
        }
        if let Some(v) = &self.suffix {
            return Ok(StringMatcher::suffix(v.as_str(), ignore_case));
        }
        if let Some(v) = &self.contains {
            return Ok(StringMatcher::contains(v.as_str(), ignore_case));
        }
        if let Some(pattern) = &self.regex {
            let compiled = if ignore_case {
                StringMatcher::regex_ignore_case(pattern)
            } else {
                StringMatcher::regex(pattern)
            };
            return compiled.map_err(|e| RouteError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            });
        }
        Err(Self::ambiguous())
    }

    fn ambiguous() -> RouteError {
        RouteError::InvalidConfig {
            reason: "string match needs exactly one of exact, prefix, suffix, contains, regex"
                .to_string(),
        }
    }
}

impl PredicateConfig {
    /// Build the runtime predicate.
    ///
    /// # Errors
    ///
    /// - [`RouteError::MissingThreshold`] for a severity without threshold or level
    /// - [`RouteError::UnknownLevel`] for a level name outside the built-in set
    /// - [`RouteError::InvalidConfig`] / [`RouteError::InvalidPattern`] for bad text matches
    pub fn build(&self) -> Result<Predicate<Event>, RouteError> {
        Ok(match self {
            Self::True => Predicate::True,
            Self::False => Predicate::False,
            Self::All { predicates } => Predicate::All(build_children(predicates)?),
            Self::Any { predicates } => Predicate::Any(build_children(predicates)?),
            Self::None { predicates } => Predicate::None(build_children(predicates)?),
            Self::Severity {
                relation,
                threshold,
                level,
                missing,
            } => {
                let level = level.as_deref().map(str::parse::<Level>).transpose()?;
                let threshold = threshold
                    .or_else(|| level.map(|l| l.rank()))
                    .ok_or(RouteError::MissingThreshold)?;
                SeverityOrder::new(threshold, *relation, *missing).into()
            }
            Self::Message { matcher, missing } => match matcher {
                Some(m) => {
                    FacetPredicate::<MessageFacet>::new(MessageMatch(m.compile()?).into(), *missing)
                        .into()
                }
                None => FacetPredicate::<MessageFacet>::unset(*missing).into(),
            },
            Self::Origin { matcher, missing } => match matcher {
                Some(m) => {
                    FacetPredicate::<OriginFacet>::new(OriginMatch(m.compile()?).into(), *missing)
                        .into()
                }
                None => FacetPredicate::<OriginFacet>::unset(*missing).into(),
            },
            Self::Timestamp {
                not_before,
                not_after,
                missing,
            } => {
                let window = TimeWindow {
                    not_before: *not_before,
                    not_after: *not_after,
                };
                FacetPredicate::<TimestampFacet>::new(window.into(), *missing).into()
            }
        })
    }
}

fn build_children(
    predicates: &[PredicateConfig],
) -> Result<Vec<Option<Predicate<Event>>>, RouteError> {
    predicates.iter().map(|p| p.build().map(Some)).collect()
}

type Resolver<'a> = dyn Fn(&str) -> Result<NodeHandle, RouteError> + 'a;

impl RuleConfig {
    fn build(&self, resolve: &Resolver<'_>) -> Result<Rule, RouteError> {
        Ok(Rule {
            condition: self.when.as_ref().map(PredicateConfig::build).transpose()?,
            target: self.to.as_deref().map(resolve).transpose()?,
            continue_when: self
                .continue_when
                .as_ref()
                .map(PredicateConfig::build)
                .transpose()?,
        })
    }
}

impl NodeConfig {
    fn build(&self, resolve: &Resolver<'_>) -> Result<NodeKind, RouteError> {
        Ok(match self {
            Self::Broadcast { children } => NodeKind::Broadcast(Broadcast::new(
                children
                    .iter()
                    .map(|name| resolve(name).map(Some))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Self::Dispatch { rules } => NodeKind::Dispatch(RuleDispatch::new(
                rules
                    .iter()
                    .map(|rule| rule.build(resolve).map(Some))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Self::Null => NodeKind::Null,
        })
    }
}

impl RouteConfig {
    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if the document does not parse.
    pub fn from_json(text: &str) -> Result<Self, RouteError> {
        serde_json::from_str(text).map_err(|e| RouteError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    /// Build the configured nodes into `graph` and return the root handle.
    ///
    /// `sinks` names nodes already in the graph (usually sinks) that config
    /// nodes may refer to. Names may be referenced before they are defined,
    /// and nodes may refer to each other cyclically. Nothing is inserted
    /// unless the whole config resolves.
    ///
    /// # Errors
    ///
    /// - [`RouteError::DuplicateName`] if a node reuses a sink name
    /// - [`RouteError::UnknownNode`] if a sink handle is not in `graph`
    /// - [`RouteError::UnknownReference`] for an unresolved name
    /// - any predicate build error
    pub fn load(
        &self,
        graph: &mut RouteGraph,
        sinks: &HashMap<String, NodeHandle>,
    ) -> Result<NodeHandle, RouteError> {
        let mut names: HashMap<&str, NodeHandle> =
            HashMap::with_capacity(sinks.len() + self.nodes.len());
        for (name, &handle) in sinks {
            if graph.node(handle).is_none() {
                return Err(RouteError::UnknownNode { handle });
            }
            names.insert(name.as_str(), handle);
        }

        // Config nodes are inserted in name order right after the existing ones.
        let base = graph.len();
        for (offset, name) in self.nodes.keys().enumerate() {
            if names.insert(name.as_str(), NodeHandle(base + offset)).is_some() {
                return Err(RouteError::DuplicateName { name: name.clone() });
            }
        }

        let resolve = |name: &str| {
            names
                .get(name)
                .copied()
                .ok_or_else(|| RouteError::UnknownReference {
                    name: name.to_string(),
                })
        };
        let root = resolve(self.root.as_str())?;
        let kinds = self
            .nodes
            .values()
            .map(|node| node.build(&resolve))
            .collect::<Result<Vec<_>, _>>()?;

        for kind in kinds {
            graph.insert(kind);
        }
        tracing::debug!(nodes = self.nodes.len(), root = %self.root, "route config loaded");
        Ok(root)
    }
}
