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

//! Boolean predicate composition.
//!
//! An [`Expression`] is an ordered sequence of operands joined by `AND`,
//! `OR`, or `XOR`. Operands are raw predicate strings or nested expressions;
//! nesting compiles to a parenthesized sub-expression.

use std::fmt;

/// Boolean operator joining two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Logical conjunction.
    And,
    /// Logical disjunction.
    Or,
    /// Logical exclusive disjunction.
    Xor,
}

impl Operator {
    fn keyword(self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Xor => "XOR",
        }
    }
}

/// An operand of an [`Expression`].
#[derive(Debug, Clone)]
pub enum Operand {
    /// A raw predicate string, emitted as-is.
    Raw(String),
    /// A nested expression, emitted parenthesized (dropped when empty).
    Nested(Expression),
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Raw(v.to_string())
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Raw(v)
    }
}

impl From<Expression> for Operand {
    fn from(v: Expression) -> Self {
        Operand::Nested(v)
    }
}

/// A composable boolean predicate.
///
/// The first emitted operand's operator is never rendered, so the three
/// builder methods are interchangeable for the initial operand.
///
/// # Examples
///
/// ```
/// use cypherkit::Expression;
///
/// let predicate = Expression::new()
///     .and("a.age > 30")
///     .or(Expression::new().and("b.deleted").and("c.hidden"));
/// assert_eq!(predicate.compile(), "a.age > 30 OR (b.deleted AND c.hidden)");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Expression {
    parts: Vec<(Operator, Operand)>,
}

impl Expression {
    /// Create an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an expression seeded with a first operand.
    pub fn with(operand: impl Into<Operand>) -> Self {
        Self::new().and(operand)
    }

    /// Append an operand joined with `AND`.
    pub fn and(mut self, operand: impl Into<Operand>) -> Self {
        self.parts.push((Operator::And, operand.into()));
        self
    }

    /// Append an operand joined with `OR`.
    pub fn or(mut self, operand: impl Into<Operand>) -> Self {
        self.parts.push((Operator::Or, operand.into()));
        self
    }

    /// Append an operand joined with `XOR`.
    pub fn xor(mut self, operand: impl Into<Operand>) -> Self {
        self.parts.push((Operator::Xor, operand.into()));
        self
    }

    /// Whether the expression compiles to the empty string.
    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|(_, operand)| match operand {
            Operand::Raw(s) => s.is_empty(),
            Operand::Nested(e) => e.is_empty(),
        })
    }

    /// Compile the expression to a predicate string.
    ///
    /// Empty operands are dropped rather than emitting stray operators or
    /// empty parentheses.
    pub fn compile(&self) -> String {
        let mut out = String::new();

        for (operator, operand) in &self.parts {
            let compiled = match operand {
                Operand::Raw(s) => {
                    if s.is_empty() {
                        continue;
                    }
                    s.clone()
                }
                Operand::Nested(e) => {
                    let inner = e.compile();
                    if inner.is_empty() {
                        continue;
                    }
                    format!("({})", inner)
                }
            };

            if !out.is_empty() {
                out.push(' ');
                out.push_str(operator.keyword());
                out.push(' ');
            }
            out.push_str(&compiled);
        }

        out
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.compile())
    }
}
