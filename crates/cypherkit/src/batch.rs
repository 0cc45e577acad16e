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

//! The batch compiler.
//!
//! A [`Batch`] records graph mutation intents (new nodes, new
//! relationships, property updates, and pattern-based relationship
//! deletions) against both newly-created and pre-existing entities, then compiles
//! them into one ordered, parameterized statement sequence.
//!
//! # Identifier scheme
//!
//! Every entity gets a batch-unique variable name and, when it carries
//! properties, a parameter name derived from it:
//!
//! | Entity                 | Identifier | Parameter |
//! |------------------------|------------|-----------|
//! | New node (local id k)  | `n{k}`     | `pn{k}`   |
//! | Existing node (id x)   | `e{x}`     | `pe{x}`   |
//! | New relationship       | `r{k}`     | `pr{k}`   |
//! | Unlink (position i)    | `u{i}`     | none      |
//!
//! The distinct prefixes keep nodes, relationships, and unlink bindings out
//! of each other's namespace regardless of the caller-supplied external ids.
//!
//! # Compilation order
//!
//! `query()` reserves a MATCH segment, then a CREATE segment, and appends
//! update/delete clauses after both, so every identifier a structural clause
//! references is already bound:
//!
//! 1. `MATCH` + `WHERE id(..) = ..` per referenced existing node;
//! 2. `MATCH` per unlink relationship pattern;
//! 3. `CREATE` per new node (inline parameter when it has properties),
//!    each followed by one `SET node:Label` per label, in label order;
//! 4. `CREATE` per new relationship;
//! 5. `SET node += {param}` per updated existing node;
//! 6. `DELETE` per unlink.
//!
//! Within each step, emission follows the order the entities entered the
//! batch. Compilation never mutates the batch; calling `query()` twice
//! yields byte-identical output.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CypherError, Result};
use crate::helpers::{
    escape_identifier, node_pattern, relationship_pattern, Direction, NodeSpec, RelationshipSpec,
};
use crate::query::{BuiltQuery, Query};
use crate::value::{json_quote, Map, Value};

/// Process-wide batch instance counter, used only for ownership checks on
/// entity handles.
static BATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// A caller-supplied id of an entity that already exists in the database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExternalId {
    /// A numeric database id.
    Int(i64),
    /// A textual database id.
    Text(String),
}

impl ExternalId {
    /// Render the id as a query literal: numbers bare, text JSON-quoted.
    fn literal(&self) -> String {
        match self {
            ExternalId::Int(i) => i.to_string(),
            ExternalId::Text(s) => json_quote(s),
        }
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalId::Int(i) => write!(f, "{}", i),
            ExternalId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ExternalId {
    fn from(v: i64) -> Self {
        ExternalId::Int(v)
    }
}

impl From<i32> for ExternalId {
    fn from(v: i32) -> Self {
        ExternalId::Int(v as i64)
    }
}

impl From<&str> for ExternalId {
    fn from(v: &str) -> Self {
        ExternalId::Text(v.to_string())
    }
}

impl From<String> for ExternalId {
    fn from(v: String) -> Self {
        ExternalId::Text(v)
    }
}

/// Handle to a node recorded in a [`Batch`].
///
/// Handles are only valid with the batch that minted them; passing one to
/// another batch is rejected by an identity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    batch: u64,
    index: usize,
}

/// Handle to a relationship recorded in a [`Batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelRef {
    batch: u64,
    index: usize,
}

/// A node argument: either a handle minted by this batch or the external id
/// of a pre-existing node.
#[derive(Debug, Clone)]
pub enum NodeInput {
    /// A handle returned by [`Batch::create`] or [`Batch::update`].
    Handle(NodeRef),
    /// The database id of an existing node.
    External(ExternalId),
}

impl From<NodeRef> for NodeInput {
    fn from(v: NodeRef) -> Self {
        NodeInput::Handle(v)
    }
}

impl From<ExternalId> for NodeInput {
    fn from(v: ExternalId) -> Self {
        NodeInput::External(v)
    }
}

impl From<i64> for NodeInput {
    fn from(v: i64) -> Self {
        NodeInput::External(v.into())
    }
}

impl From<i32> for NodeInput {
    fn from(v: i32) -> Self {
        NodeInput::External(v.into())
    }
}

impl From<&str> for NodeInput {
    fn from(v: &str) -> Self {
        NodeInput::External(v.into())
    }
}

impl From<String> for NodeInput {
    fn from(v: String) -> Self {
        NodeInput::External(v.into())
    }
}

/// An ordered list of labels for a new node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels(Vec<String>);

impl Labels {
    /// No labels.
    pub fn none() -> Self {
        Self::default()
    }
}

impl From<&str> for Labels {
    fn from(v: &str) -> Self {
        Labels(vec![v.to_string()])
    }
}

impl From<String> for Labels {
    fn from(v: String) -> Self {
        Labels(vec![v])
    }
}

impl From<Vec<String>> for Labels {
    fn from(v: Vec<String>) -> Self {
        Labels(v)
    }
}

impl From<Vec<&str>> for Labels {
    fn from(v: Vec<&str>) -> Self {
        Labels(v.into_iter().map(|l| l.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Labels {
    fn from(v: [&str; N]) -> Self {
        Labels(v.into_iter().map(|l| l.to_string()).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum NodeKind {
    New,
    Existing { id: ExternalId },
}

#[derive(Debug, Clone)]
struct NodeEntry {
    kind: NodeKind,
    identifier: String,
    properties: Map,
    labels: Vec<String>,
    // Set when update() touched an existing node, even with an empty map.
    updated: bool,
}

#[derive(Debug, Clone)]
struct RelEntry {
    identifier: String,
    source: usize,
    target: usize,
    rel_type: String,
    properties: Map,
}

#[derive(Debug, Clone)]
struct UnlinkEntry {
    source: usize,
    target: usize,
    rel_type: String,
}

/// An in-memory collection of graph mutation intents, compiled on demand
/// into an ordered, parameterized statement sequence.
///
/// # Examples
///
/// ```
/// use cypherkit::{props, Batch};
///
/// let mut batch = Batch::new();
/// let dairy = batch.create(props! {"name" => "Dairy"}, "Category");
/// let milk = batch.create(props! {"name" => "Milk"}, "Item");
/// batch.relate(dairy, "AGGREGATES", milk, props! {})?;
///
/// let built = batch.build();
/// assert_eq!(
///     built.statements,
///     vec![
///         "CREATE (n0 {pn0})",
///         "SET n0:Category",
///         "CREATE (n1 {pn1})",
///         "SET n1:Item",
///         "CREATE (n0)-[r0:AGGREGATES]->(n1)",
///     ]
/// );
/// # Ok::<(), cypherkit::CypherError>(())
/// ```
#[derive(Debug)]
pub struct Batch {
    id: u64,
    node_seq: u64,
    rel_seq: u64,
    nodes: Vec<NodeEntry>,
    // identifier -> index into nodes, so repeated references to one external
    // id reuse a single entry.
    existing: HashMap<String, usize>,
    rels: Vec<RelEntry>,
    unlinks: Vec<UnlinkEntry>,
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

impl Batch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self {
            id: BATCH_SEQ.fetch_add(1, Ordering::Relaxed),
            node_seq: 0,
            rel_seq: 0,
            nodes: Vec::new(),
            existing: HashMap::new(),
            rels: Vec::new(),
            unlinks: Vec::new(),
        }
    }

    /// Record a new node with the given properties and labels.
    ///
    /// An empty property map means the node is created bare; labels become
    /// one `SET` clause each at compile time, in the order supplied.
    pub fn create(&mut self, properties: Map, labels: impl Into<Labels>) -> NodeRef {
        let identifier = format!("n{}", self.node_seq);
        self.node_seq += 1;

        self.nodes.push(NodeEntry {
            kind: NodeKind::New,
            identifier,
            properties,
            labels: labels.into().0,
            updated: false,
        });

        NodeRef {
            batch: self.id,
            index: self.nodes.len() - 1,
        }
    }

    /// Merge properties onto a node (shallow, later write wins).
    ///
    /// Given a handle, the merge applies to that node; given an external id,
    /// the corresponding existing node is resolved (or registered) first.
    /// Updates to new nodes fold into their creation-time property snapshot;
    /// updates to existing nodes compile to a `SET node += {param}` clause.
    ///
    /// # Errors
    ///
    /// Returns [`CypherError::InvalidArgument`] when the handle belongs to
    /// another batch.
    pub fn update(&mut self, node: impl Into<NodeInput>, properties: Map) -> Result<NodeRef> {
        let input = node.into();
        self.check_node_input("Batch::update", &input)?;

        let index = self.resolve_node(input);
        let entry = &mut self.nodes[index];
        entry.properties.extend(properties);
        if matches!(entry.kind, NodeKind::Existing { .. }) {
            entry.updated = true;
        }

        Ok(NodeRef {
            batch: self.id,
            index,
        })
    }

    /// Record a new relationship from `source` to `target`.
    ///
    /// Both endpoints may be handles or external ids; external endpoints are
    /// resolved (or registered) as existing nodes. An empty property map
    /// means the relationship carries no inline parameter.
    ///
    /// # Errors
    ///
    /// Returns [`CypherError::InvalidArgument`] when `rel_type` is empty or
    /// an endpoint handle belongs to another batch. On error the batch is
    /// left unchanged.
    pub fn relate(
        &mut self,
        source: impl Into<NodeInput>,
        rel_type: &str,
        target: impl Into<NodeInput>,
        properties: Map,
    ) -> Result<RelRef> {
        let source = source.into();
        let target = target.into();

        if rel_type.is_empty() {
            return Err(CypherError::InvalidArgument {
                operation: "Batch::relate",
                message: "the relationship type must be a non-empty string".to_string(),
            });
        }
        self.check_node_input("Batch::relate", &source)?;
        self.check_node_input("Batch::relate", &target)?;

        let source = self.resolve_node(source);
        let target = self.resolve_node(target);

        let identifier = format!("r{}", self.rel_seq);
        self.rel_seq += 1;

        self.rels.push(RelEntry {
            identifier,
            source,
            target,
            rel_type: rel_type.to_string(),
            properties,
        });

        Ok(RelRef {
            batch: self.id,
            index: self.rels.len() - 1,
        })
    }

    /// Record the deletion of relationships matching
    /// `(source)-[:rel_type]->(target)`.
    ///
    /// The deletion is pattern-based: it does not touch any [`RelRef`]
    /// recorded through [`Batch::relate`], even one with the same endpoints
    /// and type.
    ///
    /// # Errors
    ///
    /// Returns [`CypherError::InvalidArgument`] when `rel_type` is empty or
    /// an endpoint handle belongs to another batch. On error the batch is
    /// left unchanged.
    pub fn unrelate(
        &mut self,
        source: impl Into<NodeInput>,
        rel_type: &str,
        target: impl Into<NodeInput>,
    ) -> Result<()> {
        let source = source.into();
        let target = target.into();

        if rel_type.is_empty() {
            return Err(CypherError::InvalidArgument {
                operation: "Batch::unrelate",
                message: "the relationship type must be a non-empty string".to_string(),
            });
        }
        self.check_node_input("Batch::unrelate", &source)?;
        self.check_node_input("Batch::unrelate", &target)?;

        let source = self.resolve_node(source);
        let target = self.resolve_node(target);

        self.unlinks.push(UnlinkEntry {
            source,
            target,
            rel_type: rel_type.to_string(),
        });

        Ok(())
    }

    /// The identifier a node handle is bound to in the compiled query.
    ///
    /// # Errors
    ///
    /// Returns [`CypherError::InvalidArgument`] when the handle belongs to
    /// another batch.
    pub fn node_identifier(&self, node: NodeRef) -> Result<&str> {
        if node.batch != self.id {
            return Err(CypherError::InvalidArgument {
                operation: "Batch::node_identifier",
                message: "the node reference belongs to another batch".to_string(),
            });
        }
        Ok(&self.nodes[node.index].identifier)
    }

    /// The identifier a relationship handle is bound to in the compiled
    /// query.
    ///
    /// # Errors
    ///
    /// Returns [`CypherError::InvalidArgument`] when the handle belongs to
    /// another batch.
    pub fn relationship_identifier(&self, rel: RelRef) -> Result<&str> {
        if rel.batch != self.id {
            return Err(CypherError::InvalidArgument {
                operation: "Batch::relationship_identifier",
                message: "the relationship reference belongs to another batch".to_string(),
            });
        }
        Ok(&self.rels[rel.index].identifier)
    }

    /// Compile the batch into a [`Query`].
    ///
    /// Compilation is read-only and deterministic: given the same recorded
    /// intents it produces the same clause sequence and parameter map every
    /// time, and the batch can keep being mutated and recompiled afterwards.
    pub fn query(&self) -> Query {
        let query = Query::new();
        let match_segment = query.segment();
        let create_segment = query.segment();

        for entry in &self.nodes {
            match &entry.kind {
                NodeKind::Existing { id } => {
                    let pattern = node_pattern(&NodeSpec::from(entry.identifier.as_str()));
                    match_segment.push_raw(format!("MATCH {}", pattern));
                    match_segment.push_raw(format!(
                        "WHERE id({}) = {}",
                        escape_identifier(&entry.identifier),
                        id.literal()
                    ));
                }
                NodeKind::New => {
                    let mut spec = NodeSpec::from(entry.identifier.as_str());
                    if !entry.properties.is_empty() {
                        let param = format!("p{}", entry.identifier);
                        spec = spec.with_data(param.as_str());
                        query.set_param(param, Value::Map(entry.properties.clone()));
                    }
                    create_segment.push_raw(format!("CREATE {}", node_pattern(&spec)));

                    for label in &entry.labels {
                        create_segment.push_raw(format!(
                            "SET {}:{}",
                            escape_identifier(&entry.identifier),
                            escape_identifier(label)
                        ));
                    }
                }
            }
        }

        for rel in &self.rels {
            let mut spec = RelationshipSpec::new()
                .with_source(self.nodes[rel.source].identifier.as_str())
                .with_target(self.nodes[rel.target].identifier.as_str())
                .with_identifier(rel.identifier.as_str())
                .with_type(rel.rel_type.as_str())
                .with_direction(Direction::Out);
            if !rel.properties.is_empty() {
                let param = format!("p{}", rel.identifier);
                spec = spec.with_data(param.as_str());
                query.set_param(param, Value::Map(rel.properties.clone()));
            }
            create_segment.push_raw(format!("CREATE {}", relationship_pattern(&spec)));
        }

        for (i, unlink) in self.unlinks.iter().enumerate() {
            let spec = RelationshipSpec::new()
                .with_source(self.nodes[unlink.source].identifier.as_str())
                .with_target(self.nodes[unlink.target].identifier.as_str())
                .with_identifier(format!("u{}", i))
                .with_type(unlink.rel_type.as_str())
                .with_direction(Direction::Out);
            match_segment.push_raw(format!("MATCH {}", relationship_pattern(&spec)));
        }

        for entry in &self.nodes {
            if entry.updated {
                let param = format!("p{}", entry.identifier);
                query.push_raw(format!(
                    "SET {} += {{{}}}",
                    escape_identifier(&entry.identifier),
                    param
                ));
                query.set_param(param, Value::Map(entry.properties.clone()));
            }
        }

        for i in 0..self.unlinks.len() {
            query.push_raw(format!("DELETE u{}", i));
        }

        query
    }

    /// Compile and return text, parameters, and statement list.
    pub fn build(&self) -> BuiltQuery {
        self.query().build()
    }

    /// Compile and return the statement list.
    pub fn statements(&self) -> Vec<String> {
        self.query().statements()
    }

    /// Compile and return the parameter map.
    pub fn params(&self) -> Map {
        self.query().params()
    }

    /// Compile and return the query text.
    pub fn compile(&self) -> String {
        self.query().compile()
    }

    fn check_node_input(&self, operation: &'static str, input: &NodeInput) -> Result<()> {
        if let NodeInput::Handle(handle) = input {
            if handle.batch != self.id {
                return Err(CypherError::InvalidArgument {
                    operation,
                    message: "the node reference belongs to another batch".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Resolve a pre-checked input to a node slot, registering existing
    /// nodes on first reference.
    fn resolve_node(&mut self, input: NodeInput) -> usize {
        match input {
            NodeInput::Handle(handle) => handle.index,
            NodeInput::External(id) => {
                let identifier = format!("e{}", id);
                if let Some(&index) = self.existing.get(&identifier) {
                    return index;
                }

                self.nodes.push(NodeEntry {
                    kind: NodeKind::Existing { id },
                    identifier: identifier.clone(),
                    properties: Map::new(),
                    labels: Vec::new(),
                    updated: false,
                });
                let index = self.nodes.len() - 1;
                self.existing.insert(identifier, index);
                index
            }
        }
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compile())
    }
}
