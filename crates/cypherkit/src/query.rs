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

//! The query accumulator.
//!
//! A [`Query`] stores an ordered sequence of clause lines plus a parameter
//! map, and supports hierarchical composition through segments: a segment is
//! a child accumulator spliced into its parent's position at compile time.
//! Because a segment handle stays usable after siblings have been appended,
//! callers can reserve a section early and fill it once its content is known.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{CypherError, Result};
use crate::expression::Expression;
use crate::helpers::{escape_literal_map, relationship_pattern, RelationshipSpec};
use crate::syntax::Clause;
use crate::value::{Map, Value};

/// One part of a clause line.
#[derive(Debug, Clone)]
pub enum QueryPart {
    /// A raw clause body.
    Text(String),
    /// A compiled boolean predicate.
    Expression(Expression),
    /// A relationship pattern descriptor, rendered via
    /// [`relationship_pattern`].
    Relationship(RelationshipSpec),
}

impl From<&str> for QueryPart {
    fn from(v: &str) -> Self {
        QueryPart::Text(v.to_string())
    }
}

impl From<String> for QueryPart {
    fn from(v: String) -> Self {
        QueryPart::Text(v)
    }
}

impl From<Expression> for QueryPart {
    fn from(v: Expression) -> Self {
        QueryPart::Expression(v)
    }
}

impl From<RelationshipSpec> for QueryPart {
    fn from(v: RelationshipSpec) -> Self {
        QueryPart::Relationship(v)
    }
}

/// One-or-many clause parts.
///
/// Built implicitly from a single string, expression, or relationship
/// descriptor, or from a vector or array of any of those.
#[derive(Debug, Clone, Default)]
pub struct Parts(Vec<QueryPart>);

impl From<&str> for Parts {
    fn from(v: &str) -> Self {
        Parts(vec![v.into()])
    }
}

impl From<String> for Parts {
    fn from(v: String) -> Self {
        Parts(vec![v.into()])
    }
}

impl From<Expression> for Parts {
    fn from(v: Expression) -> Self {
        Parts(vec![v.into()])
    }
}

impl From<RelationshipSpec> for Parts {
    fn from(v: RelationshipSpec) -> Self {
        Parts(vec![v.into()])
    }
}

impl From<QueryPart> for Parts {
    fn from(v: QueryPart) -> Self {
        Parts(vec![v])
    }
}

impl<T: Into<QueryPart>> From<Vec<T>> for Parts {
    fn from(v: Vec<T>) -> Self {
        Parts(v.into_iter().map(|p| p.into()).collect())
    }
}

impl<T: Into<QueryPart>, const N: usize> From<[T; N]> for Parts {
    fn from(v: [T; N]) -> Self {
        Parts(v.into_iter().map(|p| p.into()).collect())
    }
}

/// The inner query of a FOREACH clause.
#[derive(Debug, Clone)]
pub enum ForeachInner {
    /// A literal update-clause string.
    Literal(String),
    /// A nested query; its statements are space-joined and its parameters
    /// merged into the enclosing accumulator.
    Query(Query),
}

impl From<&str> for ForeachInner {
    fn from(v: &str) -> Self {
        ForeachInner::Literal(v.to_string())
    }
}

impl From<String> for ForeachInner {
    fn from(v: String) -> Self {
        ForeachInner::Literal(v)
    }
}

impl From<Query> for ForeachInner {
    fn from(v: Query) -> Self {
        ForeachInner::Query(v)
    }
}

impl From<&Query> for ForeachInner {
    fn from(v: &Query) -> Self {
        ForeachInner::Query(v.clone())
    }
}

/// The compiled output of [`Query::build`].
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    /// The newline-joined, semicolon-terminated query text.
    pub query: String,
    /// The merged parameter map.
    pub params: Map,
    /// The flattened clause lines, in document order.
    pub statements: Vec<String>,
}

#[derive(Debug)]
enum Part {
    Clause(String),
    Segment(Query),
}

#[derive(Debug, Default)]
struct Inner {
    parts: Vec<Part>,
    params: Map,
}

/// An ordered, nestable accumulator of clause lines and parameters.
///
/// `Query` is a cheap handle: cloning it yields another handle to the same
/// underlying accumulator, which is what makes segment handles usable after
/// they have been appended to a parent. Accumulators are single-threaded
/// values; wrap them externally if concurrent access is ever needed.
///
/// # Examples
///
/// ```
/// use cypherkit::Query;
///
/// let query = Query::new();
/// let matches = query.segment();
/// query.return_("n").unwrap();
/// // The reserved segment can still be filled afterwards.
/// matches.match_("(n:Item)").unwrap();
///
/// assert_eq!(query.compile(), "MATCH (n:Item)\nRETURN n;");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    inner: Rc<RefCell<Inner>>,
}

/// Defines one thin clause wrapper over [`Query::clause`].
macro_rules! clause_method {
    ($(#[$meta:meta])* $method:ident => $variant:ident) => {
        $(#[$meta])*
        pub fn $method(&self, parts: impl Into<Parts>) -> Result<&Self> {
            self.clause(Clause::$variant, parts)
        }
    };
}

impl Query {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and append a child segment, returning its handle.
    ///
    /// The child occupies the position it was appended at; clauses added to
    /// it later are spliced there in the final document order.
    pub fn segment(&self) -> Query {
        let child = Query::new();
        self.inner
            .borrow_mut()
            .parts
            .push(Part::Segment(child.clone()));
        child
    }

    /// Emit a clause line.
    ///
    /// Parts are validated non-empty and joined with `", "` after the
    /// clause keyword. Relationship descriptors render through
    /// [`relationship_pattern`]; expressions must not compile empty.
    ///
    /// # Errors
    ///
    /// Returns [`CypherError::Structural`] when no part is given or a part
    /// is empty.
    pub fn clause(&self, clause: Clause, parts: impl Into<Parts>) -> Result<&Self> {
        self.emit(Some(clause), parts.into(), None)
    }

    /// Emit a clause line and merge a parameter mapping.
    pub fn clause_with_params(
        &self,
        clause: Clause,
        parts: impl Into<Parts>,
        params: Map,
    ) -> Result<&Self> {
        self.emit(Some(clause), parts.into(), Some(params))
    }

    /// Emit an argument-less clause as a bare keyword.
    ///
    /// # Errors
    ///
    /// Returns [`CypherError::Structural`] for clauses that require parts.
    pub fn bare(&self, clause: Clause) -> Result<&Self> {
        if !clause.allows_empty() {
            return Err(CypherError::Structural {
                operation: clause.keyword(),
                message: "this clause requires at least one part".to_string(),
            });
        }
        self.push_raw(clause.keyword());
        Ok(self)
    }

    /// Append an arbitrary part with no leading keyword.
    pub fn add(&self, parts: impl Into<Parts>) -> Result<&Self> {
        self.emit(None, parts.into(), None)
    }

    clause_method! {
        /// Emit an `ASSERT` clause.
        assert => Assert
    }
    clause_method! {
        /// Emit a `CALL` clause.
        call => Call
    }
    clause_method! {
        /// Emit a `CASE` clause.
        case => Case
    }
    clause_method! {
        /// Emit a `CREATE` clause.
        create => Create
    }
    clause_method! {
        /// Emit a `CREATE CONSTRAINT ON` clause.
        create_constraint_on => CreateConstraintOn
    }
    clause_method! {
        /// Emit a `CREATE INDEX ON` clause.
        create_index_on => CreateIndexOn
    }
    clause_method! {
        /// Emit a `CREATE UNIQUE` clause.
        create_unique => CreateUnique
    }
    clause_method! {
        /// Emit a `DELETE` clause.
        delete => Delete
    }
    clause_method! {
        /// Emit a `DETACH DELETE` clause.
        detach_delete => DetachDelete
    }
    clause_method! {
        /// Emit a `DROP CONSTRAINT ON` clause.
        drop_constraint_on => DropConstraintOn
    }
    clause_method! {
        /// Emit a `DROP INDEX ON` clause.
        drop_index_on => DropIndexOn
    }
    clause_method! {
        /// Emit an `ELSE` clause.
        else_ => Else
    }
    clause_method! {
        /// Emit a `LIMIT` clause.
        limit => Limit
    }
    clause_method! {
        /// Emit a `LOAD CSV FROM` clause.
        load_csv_from => LoadCsvFrom
    }
    clause_method! {
        /// Emit a `LOAD CSV WITH HEADERS FROM` clause.
        load_csv_with_headers_from => LoadCsvWithHeadersFrom
    }
    clause_method! {
        /// Emit a `MATCH` clause.
        match_ => Match
    }
    clause_method! {
        /// Emit a `MERGE` clause.
        merge => Merge
    }
    clause_method! {
        /// Emit an `ON CREATE SET` clause.
        on_create_set => OnCreateSet
    }
    clause_method! {
        /// Emit an `ON MATCH SET` clause.
        on_match_set => OnMatchSet
    }
    clause_method! {
        /// Emit an `OPTIONAL MATCH` clause.
        optional_match => OptionalMatch
    }
    clause_method! {
        /// Emit an `ORDER BY` clause.
        order_by => OrderBy
    }
    clause_method! {
        /// Emit a `REMOVE` clause.
        remove => Remove
    }
    clause_method! {
        /// Emit a `RETURN` clause.
        return_ => Return
    }
    clause_method! {
        /// Emit a `SET` clause.
        set => Set
    }
    clause_method! {
        /// Emit a `SKIP` clause.
        skip => Skip
    }
    clause_method! {
        /// Emit a `START` clause.
        start => Start
    }
    clause_method! {
        /// Emit a `THEN` clause.
        then => Then
    }
    clause_method! {
        /// Emit an `UNWIND` clause.
        unwind => Unwind
    }
    clause_method! {
        /// Emit a `USING INDEX` clause.
        using_index => UsingIndex
    }
    clause_method! {
        /// Emit a `WITH` clause.
        with => With
    }
    clause_method! {
        /// Emit a `WHERE` clause.
        where_ => Where
    }
    clause_method! {
        /// Emit a `WHERE NOT` clause.
        where_not => WhereNot
    }

    /// Emit a bare `UNION` clause.
    pub fn union(&self) -> &Self {
        self.push_raw(Clause::Union.keyword());
        self
    }

    /// Emit a bare `UNION ALL` clause.
    pub fn union_all(&self) -> &Self {
        self.push_raw(Clause::UnionAll.keyword());
        self
    }

    /// Emit a bare `EXPLAIN` clause.
    pub fn explain(&self) -> &Self {
        self.push_raw(Clause::Explain.keyword());
        self
    }

    /// Emit a bare `PROFILE` clause.
    pub fn profile(&self) -> &Self {
        self.push_raw(Clause::Profile.keyword());
        self
    }

    /// Emit a `FOREACH` clause: `FOREACH (header | inner)`.
    ///
    /// The inner query is a literal string or a nested [`Query`] whose
    /// statements are space-joined and whose parameters merge into this
    /// accumulator.
    ///
    /// # Errors
    ///
    /// Returns [`CypherError::Structural`] when the header is empty or the
    /// inner query has no content.
    pub fn foreach(&self, parts: impl Into<Parts>, inner: impl Into<ForeachInner>) -> Result<&Self> {
        let parts = parts.into();
        let rendered = render_parts("FOREACH", &parts)?;

        let (inner_text, inner_params) = match inner.into() {
            ForeachInner::Literal(s) => {
                if s.is_empty() {
                    return Err(CypherError::Structural {
                        operation: "FOREACH",
                        message: "the inner query must not be empty".to_string(),
                    });
                }
                (s, None)
            }
            ForeachInner::Query(q) => {
                let statements = q.statements();
                if statements.is_empty() {
                    return Err(CypherError::Structural {
                        operation: "FOREACH",
                        message: "the inner query must not be empty".to_string(),
                    });
                }
                (statements.join(" "), Some(q.params()))
            }
        };

        let line = format!("FOREACH ({} | {})", rendered.join(","), inner_text);
        let mut guard = self.inner.borrow_mut();
        guard.parts.push(Part::Clause(line));
        if let Some(params) = inner_params {
            guard.params.extend(params);
        }
        drop(guard);
        Ok(self)
    }

    /// Flatten the segment tree into clause lines, in document order.
    pub fn statements(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_statements(&mut out);
        out
    }

    /// Merge and return the parameter map.
    ///
    /// Child segment maps are merged first, in segment order; parameters set
    /// directly on this accumulator override same-named child parameters.
    pub fn params(&self) -> Map {
        let mut out = Map::new();
        self.collect_params(&mut out);
        out
    }

    /// Look up one merged parameter.
    pub fn param(&self, key: &str) -> Option<Value> {
        self.params().get(key).cloned()
    }

    /// Set one parameter on this accumulator.
    pub fn set_param(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.inner.borrow_mut().params.insert(key.into(), value.into());
        self
    }

    /// Merge a parameter mapping into this accumulator (later writes win).
    pub fn merge_params(&self, params: Map) -> &Self {
        self.inner.borrow_mut().params.extend(params);
        self
    }

    /// Compile to the final text: statements newline-joined, terminated by a
    /// single semicolon.
    pub fn compile(&self) -> String {
        let mut out = self.statements().join("\n");
        out.push(';');
        out
    }

    /// Compile, substituting `{name}` placeholders with literal renderings
    /// of the matching parameters.
    ///
    /// Map parameters render via [`escape_literal_map`], other values as
    /// JSON-style literals. Placeholders with no matching parameter are left
    /// untouched.
    pub fn interpolate(&self) -> String {
        let text = self.compile();
        let params = self.params();

        let mut out = String::with_capacity(text.len());
        let mut rest = text.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            if let Some(end) = after.find('}') {
                let name = &after[..end];
                if is_param_name(name) {
                    if let Some(value) = params.get(name) {
                        let literal = match value {
                            Value::Map(map) => escape_literal_map(map, &[]),
                            other => other.json_literal(),
                        };
                        out.push_str(&literal);
                        rest = &after[end + 1..];
                        continue;
                    }
                }
            }

            out.push('{');
            rest = after;
        }

        out.push_str(rest);
        out
    }

    /// Compile text, parameters, and statement list in one call.
    pub fn build(&self) -> BuiltQuery {
        BuiltQuery {
            query: self.compile(),
            params: self.params(),
            statements: self.statements(),
        }
    }

    /// Append a pre-rendered clause line.
    ///
    /// Only for callers that construct lines through the pattern helpers and
    /// therefore cannot produce an empty part.
    pub(crate) fn push_raw(&self, line: impl Into<String>) {
        self.inner.borrow_mut().parts.push(Part::Clause(line.into()));
    }

    fn emit(&self, clause: Option<Clause>, parts: Parts, params: Option<Map>) -> Result<&Self> {
        let operation = clause.map_or("add", |c| c.keyword());
        let rendered = render_parts(operation, &parts)?;

        let mut line = String::new();
        if let Some(clause) = clause {
            line.push_str(clause.keyword());
            line.push(' ');
        }
        line.push_str(&rendered.join(", "));

        let mut guard = self.inner.borrow_mut();
        guard.parts.push(Part::Clause(line));
        if let Some(params) = params {
            guard.params.extend(params);
        }
        drop(guard);
        Ok(self)
    }

    fn collect_statements(&self, out: &mut Vec<String>) {
        for part in &self.inner.borrow().parts {
            match part {
                Part::Clause(line) => out.push(line.clone()),
                Part::Segment(child) => child.collect_statements(out),
            }
        }
    }

    fn collect_params(&self, out: &mut Map) {
        let inner = self.inner.borrow();
        for part in &inner.parts {
            if let Part::Segment(child) = part {
                child.collect_params(out);
            }
        }
        for (key, value) in &inner.params {
            out.insert(key.clone(), value.clone());
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compile())
    }
}

fn is_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn render_parts(operation: &'static str, parts: &Parts) -> Result<Vec<String>> {
    if parts.0.is_empty() {
        return Err(CypherError::Structural {
            operation,
            message: "at least one part is required".to_string(),
        });
    }

    parts
        .0
        .iter()
        .map(|part| match part {
            QueryPart::Text(s) => {
                if s.is_empty() {
                    Err(CypherError::Structural {
                        operation,
                        message: "parts must not be empty".to_string(),
                    })
                } else {
                    Ok(s.clone())
                }
            }
            QueryPart::Expression(e) => {
                let compiled = e.compile();
                if compiled.is_empty() {
                    Err(CypherError::Structural {
                        operation,
                        message: "expression part compiles to the empty string".to_string(),
                    })
                } else {
                    Ok(compiled)
                }
            }
            QueryPart::Relationship(spec) => Ok(relationship_pattern(spec)),
        })
        .collect()
}
