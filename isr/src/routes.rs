//! Route policy table.
//!
//! Maps request paths to a [`RoutePolicy`] using an ordered list of
//! [actix-router](https://docs.rs/actix-router) patterns. The first rule that
//! matches wins; paths under a bypass prefix never take part in ISR.
//!
//! ```yaml
//! default: Disabled
//! bypass: ["/_build/", "/assets/"]
//! rules:
//!   - path: /
//!     policy: Permanent
//!   - path: /blog/{slug}
//!     policy: { Interval: 60 }
//!   - path: /search
//!     policy: { Interval: 10 }
//!     query: true
//! ```

use actix_router::ResourceDef;
use isr_core::{PolicyResolver, RoutePolicy};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A single route rule as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Path pattern, e.g. `/blog/{slug}` or `/docs/{tail}*`.
    pub path: String,
    /// Policy applied to matching paths.
    pub policy: RoutePolicy,
    /// Whether the query string is part of the cache key.
    #[serde(default)]
    pub query: bool,
}

impl RouteRule {
    /// Creates a query-insensitive rule.
    pub fn new(path: impl Into<String>, policy: RoutePolicy) -> Self {
        RouteRule {
            path: path.into(),
            policy,
            query: false,
        }
    }

    /// Makes the query string part of the cache key.
    pub fn with_query(self) -> Self {
        RouteRule {
            query: true,
            ..self
        }
    }

    fn compile(self) -> Result<CompiledRule, ConfigError> {
        validate_pattern(&self.path)?;
        let resource = ResourceDef::new(self.path.as_str());
        Ok(CompiledRule {
            rule: self,
            resource,
        })
    }
}

/// Most dynamic segments one pattern may hold.
const MAX_DYNAMIC_SEGMENTS: usize = 16;

/// Rejects patterns that `ResourceDef` would panic on.
fn validate_pattern(pattern: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason,
    };
    if pattern.is_empty() {
        return Err(invalid("pattern is empty".to_owned()));
    }
    if !pattern.starts_with('/') {
        return Err(invalid("pattern must start with '/'".to_owned()));
    }

    let mut segments = 0;
    let mut depth = 0usize;
    let mut start = 0;
    for (at, c) in pattern.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    start = at + 1;
                }
                depth += 1;
            }
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| invalid("unbalanced braces".to_owned()))?;
                if depth == 0 {
                    segments += 1;
                    validate_segment(&pattern[start..at]).map_err(invalid)?;
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(invalid("unbalanced braces".to_owned()));
    }
    if segments > MAX_DYNAMIC_SEGMENTS {
        return Err(invalid(format!(
            "more than {MAX_DYNAMIC_SEGMENTS} dynamic segments"
        )));
    }
    Ok(())
}

/// Checks one `{name}` or `{name:regex}` segment.
fn validate_segment(segment: &str) -> Result<(), String> {
    let (name, expr) = match segment.split_once(':') {
        Some((name, expr)) => (name, Some(expr)),
        None => (segment, None),
    };
    if name.is_empty() {
        return Err("dynamic segment has no name".to_owned());
    }
    if let Some(expr) = expr {
        Regex::new(expr).map_err(|error| format!("segment {name:?}: {error}"))?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: RouteRule,
    resource: ResourceDef,
}

/// Serialized form of a [`RouteTable`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct RouteTableConfig {
    default: RoutePolicy,
    bypass: Vec<String>,
    rules: Vec<RouteRule>,
}

/// Ordered route rules resolving paths to policies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RouteTableConfig", into = "RouteTableConfig")]
pub struct RouteTable {
    default: RoutePolicy,
    bypass: Vec<String>,
    rules: Vec<CompiledRule>,
}

impl RouteTable {
    /// Creates a builder for a route table.
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Parses a route table from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RouteTableConfig = serde_saphyr::from_str(yaml)?;
        Self::try_from(config)
    }

    /// Returns the policy applied when no rule matches.
    pub fn default_policy(&self) -> RoutePolicy {
        self.default
    }

    fn is_bypassed(&self, path: &str) -> bool {
        self.bypass.iter().any(|prefix| path.starts_with(prefix))
    }

    fn matching(&self, path: &str) -> Option<&RouteRule> {
        if self.is_bypassed(path) {
            return None;
        }
        self.rules
            .iter()
            .find(|compiled| compiled.resource.is_match(path))
            .map(|compiled| &compiled.rule)
    }
}

impl PolicyResolver for RouteTable {
    fn resolve(&self, path: &str) -> RoutePolicy {
        if self.is_bypassed(path) {
            return RoutePolicy::Disabled;
        }
        self.matching(path)
            .map_or(self.default, |rule| rule.policy)
    }

    fn query_sensitive(&self, path: &str) -> bool {
        self.matching(path).is_some_and(|rule| rule.query)
    }
}

impl TryFrom<RouteTableConfig> for RouteTable {
    type Error = ConfigError;

    fn try_from(config: RouteTableConfig) -> Result<Self, Self::Error> {
        if let Some(prefix) = config.bypass.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::InvalidBypass(prefix.clone()));
        }
        let rules = config
            .rules
            .into_iter()
            .map(RouteRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RouteTable {
            default: config.default,
            bypass: config.bypass,
            rules,
        })
    }
}

impl From<RouteTable> for RouteTableConfig {
    fn from(table: RouteTable) -> Self {
        RouteTableConfig {
            default: table.default,
            bypass: table.bypass,
            rules: table.rules.into_iter().map(|c| c.rule).collect(),
        }
    }
}

/// Builder for [`RouteTable`].
#[derive(Debug, Clone, Default)]
pub struct RouteTableBuilder {
    config: RouteTableConfig,
}

impl RouteTableBuilder {
    /// Sets the policy for paths no rule matches.
    pub fn default_policy(mut self, policy: RoutePolicy) -> Self {
        self.config.default = policy;
        self
    }

    /// Adds a path prefix that always bypasses ISR.
    pub fn bypass(mut self, prefix: impl Into<String>) -> Self {
        self.config.bypass.push(prefix.into());
        self
    }

    /// Appends a rule. Rules are tried in insertion order.
    pub fn rule(mut self, rule: RouteRule) -> Self {
        self.config.rules.push(rule);
        self
    }

    /// Shorthand for a query-insensitive rule.
    pub fn route(self, path: impl Into<String>, policy: RoutePolicy) -> Self {
        self.rule(RouteRule::new(path, policy))
    }

    /// Validates the rules and compiles their patterns.
    pub fn build(self) -> Result<RouteTable, ConfigError> {
        RouteTable::try_from(self.config)
    }
}
