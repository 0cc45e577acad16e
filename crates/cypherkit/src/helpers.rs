// CypherKit - Cypher query construction and batch composition
//
// Copyright (c) 2026 CypherKit contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Identifier escaping and pattern construction.
//!
//! These are the pure building blocks consumed by the query accumulator and
//! the batch compiler: identifier quoting, literal-map stringification, and
//! node/relationship/search pattern rendering.

use std::borrow::Cow;

use crate::error::{CypherError, Result};
use crate::syntax::{is_regex_flag, is_reserved_keyword};
use crate::value::Map;

/// Check if an identifier can be emitted without backticks.
///
/// Safe identifiers start with an ASCII letter or underscore and contain
/// only ASCII letters, digits, and underscores.
fn is_safe_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };

    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape an identifier for use in a query.
///
/// Returns the identifier unchanged when it is safe and not a reserved
/// keyword; otherwise wraps it in backticks, doubling any embedded backtick.
/// The unchanged path is zero-copy.
///
/// # Examples
///
/// ```
/// use cypherkit::helpers::escape_identifier;
///
/// assert_eq!(escape_identifier("name"), "name");
/// assert_eq!(escape_identifier("MATCH"), "`MATCH`");
/// assert_eq!(escape_identifier("weird space"), "`weird space`");
/// ```
pub fn escape_identifier(s: &str) -> Cow<'_, str> {
    if is_safe_identifier(s) && !is_reserved_keyword(s) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(format!("`{}`", s.replace('`', "``")))
    }
}

/// Render a property map as an inline literal map.
///
/// Keys render in insertion order, each passed through [`escape_identifier`].
/// A value renders as the `{key}` parameter placeholder when its key appears
/// in `param_keys`, otherwise as a JSON-style literal.
///
/// # Examples
///
/// ```
/// use cypherkit::helpers::escape_literal_map;
/// use cypherkit::props;
///
/// let map = props! {"name" => "Milk", "stock" => 12};
/// assert_eq!(
///     escape_literal_map(&map, &[]),
///     r#"{name: "Milk", stock: 12}"#
/// );
/// assert_eq!(
///     escape_literal_map(&map, &["stock".to_string()]),
///     r#"{name: "Milk", stock: {stock}}"#
/// );
/// ```
pub fn escape_literal_map(map: &Map, param_keys: &[String]) -> String {
    let entries: Vec<String> = map
        .iter()
        .map(|(k, v)| {
            let rendered = if param_keys.iter().any(|p| p == k) {
                format!("{{{}}}", k)
            } else {
                v.json_literal()
            };
            format!("{}: {}", escape_identifier(k), rendered)
        })
        .collect();

    format!("{{{}}}", entries.join(", "))
}

/// Inline data carried by a node or relationship pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternData {
    /// A parameter placeholder name, rendered as `{name}`.
    Param(String),
    /// A literal property map, rendered via [`escape_literal_map`].
    Map(Map),
}

impl From<&str> for PatternData {
    fn from(v: &str) -> Self {
        PatternData::Param(v.to_string())
    }
}

impl From<String> for PatternData {
    fn from(v: String) -> Self {
        PatternData::Param(v)
    }
}

impl From<Map> for PatternData {
    fn from(v: Map) -> Self {
        PatternData::Map(v)
    }
}

impl PatternData {
    fn render(&self, param_keys: &[String]) -> String {
        match self {
            PatternData::Param(name) => format!("{{{}}}", name),
            PatternData::Map(map) => escape_literal_map(map, param_keys),
        }
    }
}

/// Descriptor for a node pattern.
///
/// All parts are optional; an empty descriptor renders as `()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSpec {
    /// Bound variable name.
    pub identifier: Option<String>,
    /// Labels, in order.
    pub labels: Vec<String>,
    /// Inline data: a parameter placeholder or a literal map.
    pub data: Option<PatternData>,
    /// Keys of `data` map entries to render as placeholders.
    pub param_keys: Vec<String>,
}

impl NodeSpec {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bound identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Append a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Append multiple labels.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(|l| l.into()));
        self
    }

    /// Set the inline data.
    pub fn with_data(mut self, data: impl Into<PatternData>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Select which map entries render as placeholders.
    pub fn with_param_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_keys.extend(keys.into_iter().map(|k| k.into()));
        self
    }
}

impl From<&str> for NodeSpec {
    fn from(identifier: &str) -> Self {
        NodeSpec::new().with_identifier(identifier)
    }
}

impl From<String> for NodeSpec {
    fn from(identifier: String) -> Self {
        NodeSpec::new().with_identifier(identifier)
    }
}

/// Build a node pattern string, e.g. `(n:Item {props})`.
pub fn node_pattern(spec: &NodeSpec) -> String {
    let mut pattern = String::from("(");

    if let Some(identifier) = &spec.identifier {
        pattern.push_str(&escape_identifier(identifier));
    }

    for label in &spec.labels {
        pattern.push(':');
        pattern.push_str(&escape_identifier(label));
    }

    if let Some(data) = &spec.data {
        if spec.identifier.is_some() || !spec.labels.is_empty() {
            pattern.push(' ');
        }
        pattern.push_str(&data.render(&spec.param_keys));
    }

    pattern.push(')');
    pattern
}

/// Direction of a relationship pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// `(a)<-[...]-(b)`
    In,
    /// `(a)-[...]->(b)`
    Out,
    /// `(a)-[...]-(b)`
    #[default]
    Undirected,
}

/// Descriptor for a relationship pattern.
///
/// The bracket section collapses entirely when identifier, types, and data
/// are all absent; the default descriptor renders as `--`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipSpec {
    /// Source node pattern.
    pub source: Option<NodeSpec>,
    /// Target node pattern.
    pub target: Option<NodeSpec>,
    /// Bound variable name.
    pub identifier: Option<String>,
    /// Relationship types, pipe-joined when more than one.
    pub types: Vec<String>,
    /// Arrow direction.
    pub direction: Direction,
    /// Inline data: a parameter placeholder or a literal map.
    pub data: Option<PatternData>,
    /// Keys of `data` map entries to render as placeholders.
    pub param_keys: Vec<String>,
}

impl RelationshipSpec {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source node.
    pub fn with_source(mut self, source: impl Into<NodeSpec>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the target node.
    pub fn with_target(mut self, target: impl Into<NodeSpec>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the bound identifier.
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Append a relationship type.
    pub fn with_type(mut self, rel_type: impl Into<String>) -> Self {
        self.types.push(rel_type.into());
        self
    }

    /// Append multiple relationship types.
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(types.into_iter().map(|t| t.into()));
        self
    }

    /// Set the direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the inline data.
    pub fn with_data(mut self, data: impl Into<PatternData>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Select which map entries render as placeholders.
    pub fn with_param_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_keys.extend(keys.into_iter().map(|k| k.into()));
        self
    }
}

impl From<&str> for RelationshipSpec {
    fn from(identifier: &str) -> Self {
        RelationshipSpec::new().with_identifier(identifier)
    }
}

impl From<String> for RelationshipSpec {
    fn from(identifier: String) -> Self {
        RelationshipSpec::new().with_identifier(identifier)
    }
}

/// Build a relationship pattern string, e.g. `(a)-[r:KNOWS {props}]->(b)`.
pub fn relationship_pattern(spec: &RelationshipSpec) -> String {
    let mut pattern = String::new();

    if let Some(source) = &spec.source {
        pattern.push_str(&node_pattern(source));
    }

    pattern.push_str(if spec.direction == Direction::In {
        "<-"
    } else {
        "-"
    });

    let has_bracket = spec.identifier.is_some() || !spec.types.is_empty() || spec.data.is_some();

    if has_bracket {
        pattern.push('[');

        if let Some(identifier) = &spec.identifier {
            pattern.push_str(&escape_identifier(identifier));
        }

        let types: Vec<String> = spec
            .types
            .iter()
            .map(|t| format!(":{}", escape_identifier(t)))
            .collect();
        pattern.push_str(&types.join("|"));

        if let Some(data) = &spec.data {
            if spec.identifier.is_some() || !spec.types.is_empty() {
                pattern.push(' ');
            }
            pattern.push_str(&data.render(&spec.param_keys));
        }

        pattern.push(']');
    }

    pattern.push_str(if spec.direction == Direction::Out {
        "->"
    } else {
        "-"
    });

    if let Some(target) = &spec.target {
        pattern.push_str(&node_pattern(target));
    }

    pattern
}

/// Options for [`search_pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Single-character mode flags, or `None` to omit the flag group.
    pub flags: Option<String>,
    /// Wrap the query in `.*` so it matches anywhere.
    pub partial: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            flags: Some("ius".to_string()),
            partial: true,
        }
    }
}

impl SearchOptions {
    /// Default options: case-insensitive unicode dotall, partial match.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the flag set.
    pub fn with_flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    /// Drop the flag group entirely.
    pub fn without_flags(mut self) -> Self {
        self.flags = None;
        self
    }

    /// Match the whole value instead of any substring.
    pub fn exact(mut self) -> Self {
        self.partial = false;
        self
    }
}

/// Build a text-search regular expression pattern.
///
/// The query text is escaped so it matches literally; flags render as a
/// leading `(?flags)` group and are validated against the allowed set.
///
/// # Errors
///
/// Returns [`CypherError::InvalidArgument`] on an unknown flag character.
pub fn search_pattern(query: &str, opts: &SearchOptions) -> Result<String> {
    if let Some(flags) = &opts.flags {
        for c in flags.chars() {
            if !is_regex_flag(c) {
                return Err(CypherError::InvalidArgument {
                    operation: "search_pattern",
                    message: format!("invalid flag '{}' in \"{}\"", c, flags),
                });
            }
        }
    }

    let mut pattern = String::new();

    if let Some(flags) = &opts.flags {
        if !flags.is_empty() {
            pattern.push_str(&format!("(?{})", flags));
        }
    }

    if opts.partial {
        pattern.push_str(".*");
    }

    pattern.push_str(&regex::escape(query));

    if opts.partial {
        pattern.push_str(".*");
    }

    Ok(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;

    #[test]
    fn test_escape_identifier_safe() {
        assert_eq!(escape_identifier("name"), "name");
        assert_eq!(escape_identifier("_name"), "_name");
        assert_eq!(escape_identifier("name123"), "name123");
        // Zero-copy on the safe path.
        assert!(matches!(escape_identifier("name"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_identifier_unsafe() {
        assert_eq!(escape_identifier("123name"), "`123name`");
        assert_eq!(escape_identifier("name-dash"), "`name-dash`");
        assert_eq!(escape_identifier("name tick`"), "`name tick```");
        assert_eq!(escape_identifier(""), "``");
    }

    #[test]
    fn test_escape_identifier_keywords() {
        assert_eq!(escape_identifier("match"), "`match`");
        assert_eq!(escape_identifier("RETURN"), "`RETURN`");
        assert_eq!(escape_identifier("Set"), "`Set`");
    }

    #[test]
    fn test_escape_literal_map_order_and_quoting() {
        let map = props! {"zebra" => 1, "where" => true, "bad key" => "v"};
        assert_eq!(
            escape_literal_map(&map, &[]),
            r#"{zebra: 1, `where`: true, `bad key`: "v"}"#
        );
    }

    #[test]
    fn test_escape_literal_map_param_keys() {
        let map = props! {"name" => "ignored", "age" => 3};
        let rendered = escape_literal_map(&map, &["name".to_string()]);
        assert_eq!(rendered, "{name: {name}, age: 3}");
    }

    #[test]
    fn test_node_pattern_parts() {
        assert_eq!(node_pattern(&NodeSpec::new()), "()");
        assert_eq!(node_pattern(&NodeSpec::from("n")), "(n)");
        assert_eq!(
            node_pattern(&NodeSpec::from("n").with_label("Item")),
            "(n:Item)"
        );
        assert_eq!(
            node_pattern(&NodeSpec::from("n").with_labels(["A", "B"])),
            "(n:A:B)"
        );
        assert_eq!(
            node_pattern(&NodeSpec::from("n").with_data("props")),
            "(n {props})"
        );
        assert_eq!(
            node_pattern(&NodeSpec::new().with_data("props")),
            "({props})"
        );
    }

    #[test]
    fn test_node_pattern_literal_data() {
        let spec = NodeSpec::from("n").with_data(props! {"name" => "Milk"});
        assert_eq!(node_pattern(&spec), r#"(n {name: "Milk"})"#);
    }

    #[test]
    fn test_relationship_pattern_directions() {
        let base = RelationshipSpec::new()
            .with_source("a")
            .with_target("b")
            .with_type("KNOWS");

        assert_eq!(
            relationship_pattern(&base.clone().with_direction(Direction::Out)),
            "(a)-[:KNOWS]->(b)"
        );
        assert_eq!(
            relationship_pattern(&base.clone().with_direction(Direction::In)),
            "(a)<-[:KNOWS]-(b)"
        );
        assert_eq!(relationship_pattern(&base), "(a)-[:KNOWS]-(b)");
    }

    #[test]
    fn test_relationship_pattern_collapses_bracket() {
        let spec = RelationshipSpec::new()
            .with_source("a")
            .with_target("b")
            .with_direction(Direction::Out);
        assert_eq!(relationship_pattern(&spec), "(a)->(b)");

        assert_eq!(relationship_pattern(&RelationshipSpec::new()), "--");
    }

    #[test]
    fn test_relationship_pattern_multiple_types() {
        let spec = RelationshipSpec::new()
            .with_identifier("r")
            .with_types(["LIKES", "KNOWS"]);
        assert_eq!(relationship_pattern(&spec), "-[r:LIKES|:KNOWS]-");
    }

    #[test]
    fn test_relationship_pattern_data_spacing() {
        let spec = RelationshipSpec::new().with_type("KNOWS").with_data("rp");
        assert_eq!(relationship_pattern(&spec), "-[:KNOWS {rp}]-");

        let bare = RelationshipSpec::new().with_data("rp");
        assert_eq!(relationship_pattern(&bare), "-[{rp}]-");
    }

    #[test]
    fn test_relationship_pattern_nested_specs() {
        let spec = RelationshipSpec::new()
            .with_source(NodeSpec::from("a").with_label("Person"))
            .with_target(NodeSpec::from("b").with_label("Person"))
            .with_identifier("r")
            .with_type("KNOWS")
            .with_direction(Direction::Out);
        assert_eq!(
            relationship_pattern(&spec),
            "(a:Person)-[r:KNOWS]->(b:Person)"
        );
    }

    #[test]
    fn test_search_pattern_defaults() {
        let pattern = search_pattern("milk", &SearchOptions::default()).unwrap();
        assert_eq!(pattern, "(?ius).*milk.*");
    }

    #[test]
    fn test_search_pattern_escapes_query() {
        let pattern = search_pattern("a.b*c", &SearchOptions::default()).unwrap();
        assert_eq!(pattern, r"(?ius).*a\.b\*c.*");
    }

    #[test]
    fn test_search_pattern_exact_without_flags() {
        let opts = SearchOptions::new().without_flags().exact();
        assert_eq!(search_pattern("milk", &opts).unwrap(), "milk");
    }

    #[test]
    fn test_search_pattern_rejects_unknown_flag() {
        let opts = SearchOptions::new().with_flags("ig");
        let err = search_pattern("milk", &opts).unwrap_err();
        assert!(matches!(err, CypherError::InvalidArgument { .. }));
        assert!(err.to_string().contains('g'));
    }
}
