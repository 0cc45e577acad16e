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

//! Cypher syntax tables: clause keywords, reserved words, and regex flags.
//!
//! The clause set is a static registration table. [`crate::query::Query`]
//! consults it through [`Clause::keyword`] and [`Clause::allows_empty`]
//! instead of synthesizing one code path per keyword.

use serde::{Deserialize, Serialize};

/// A clause keyword supported by the query accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Clause {
    Assert,
    Call,
    Case,
    Create,
    CreateConstraintOn,
    CreateIndexOn,
    CreateUnique,
    Delete,
    DetachDelete,
    DropConstraintOn,
    DropIndexOn,
    Else,
    Explain,
    Foreach,
    Limit,
    LoadCsvFrom,
    LoadCsvWithHeadersFrom,
    Match,
    Merge,
    OnCreateSet,
    OnMatchSet,
    OptionalMatch,
    OrderBy,
    Profile,
    Remove,
    Return,
    Set,
    Skip,
    Start,
    Then,
    Union,
    UnionAll,
    Unwind,
    UsingIndex,
    With,
    Where,
    WhereNot,
}

impl Clause {
    /// Every supported clause, in keyword order.
    pub const ALL: &'static [Clause] = &[
        Clause::Assert,
        Clause::Call,
        Clause::Case,
        Clause::Create,
        Clause::CreateConstraintOn,
        Clause::CreateIndexOn,
        Clause::CreateUnique,
        Clause::Delete,
        Clause::DetachDelete,
        Clause::DropConstraintOn,
        Clause::DropIndexOn,
        Clause::Else,
        Clause::Explain,
        Clause::Foreach,
        Clause::Limit,
        Clause::LoadCsvFrom,
        Clause::LoadCsvWithHeadersFrom,
        Clause::Match,
        Clause::Merge,
        Clause::OnCreateSet,
        Clause::OnMatchSet,
        Clause::OptionalMatch,
        Clause::OrderBy,
        Clause::Profile,
        Clause::Remove,
        Clause::Return,
        Clause::Set,
        Clause::Skip,
        Clause::Start,
        Clause::Then,
        Clause::Union,
        Clause::UnionAll,
        Clause::Unwind,
        Clause::UsingIndex,
        Clause::With,
        Clause::Where,
        Clause::WhereNot,
    ];

    /// The keyword text emitted at the start of the clause line.
    pub fn keyword(self) -> &'static str {
        match self {
            Clause::Assert => "ASSERT",
            Clause::Call => "CALL",
            Clause::Case => "CASE",
            Clause::Create => "CREATE",
            Clause::CreateConstraintOn => "CREATE CONSTRAINT ON",
            Clause::CreateIndexOn => "CREATE INDEX ON",
            Clause::CreateUnique => "CREATE UNIQUE",
            Clause::Delete => "DELETE",
            Clause::DetachDelete => "DETACH DELETE",
            Clause::DropConstraintOn => "DROP CONSTRAINT ON",
            Clause::DropIndexOn => "DROP INDEX ON",
            Clause::Else => "ELSE",
            Clause::Explain => "EXPLAIN",
            Clause::Foreach => "FOREACH",
            Clause::Limit => "LIMIT",
            Clause::LoadCsvFrom => "LOAD CSV FROM",
            Clause::LoadCsvWithHeadersFrom => "LOAD CSV WITH HEADERS FROM",
            Clause::Match => "MATCH",
            Clause::Merge => "MERGE",
            Clause::OnCreateSet => "ON CREATE SET",
            Clause::OnMatchSet => "ON MATCH SET",
            Clause::OptionalMatch => "OPTIONAL MATCH",
            Clause::OrderBy => "ORDER BY",
            Clause::Profile => "PROFILE",
            Clause::Remove => "REMOVE",
            Clause::Return => "RETURN",
            Clause::Set => "SET",
            Clause::Skip => "SKIP",
            Clause::Start => "START",
            Clause::Then => "THEN",
            Clause::Union => "UNION",
            Clause::UnionAll => "UNION ALL",
            Clause::Unwind => "UNWIND",
            Clause::UsingIndex => "USING INDEX",
            Clause::With => "WITH",
            Clause::Where => "WHERE",
            Clause::WhereNot => "WHERE NOT",
        }
    }

    /// Whether the clause may be emitted without any part, as a bare keyword.
    pub fn allows_empty(self) -> bool {
        matches!(
            self,
            Clause::Explain | Clause::Profile | Clause::Union | Clause::UnionAll
        )
    }
}

/// Check if a word is reserved in the statement grammar.
///
/// The set is every space-separated word of the supported clause keywords
/// plus the operator and literal words (AND, OR, XOR, TRUE, NULL, ...).
/// Matching is case-insensitive.
pub fn is_reserved_keyword(word: &str) -> bool {
    matches!(
        word.to_uppercase().as_str(),
        "ALL"
            | "AND"
            | "AS"
            | "ASC"
            | "ASSERT"
            | "BY"
            | "CALL"
            | "CASE"
            | "CONSTRAINT"
            | "CONTAINS"
            | "CREATE"
            | "CSV"
            | "DELETE"
            | "DESC"
            | "DETACH"
            | "DROP"
            | "ELSE"
            | "ENDS"
            | "EXPLAIN"
            | "FALSE"
            | "FIELDTERMINATOR"
            | "FOREACH"
            | "FROM"
            | "HEADERS"
            | "INDEX"
            | "IS"
            | "LIMIT"
            | "LOAD"
            | "MATCH"
            | "MERGE"
            | "NOT"
            | "NULL"
            | "ON"
            | "OPTIONAL"
            | "OR"
            | "ORDER"
            | "PROFILE"
            | "REMOVE"
            | "RETURN"
            | "SET"
            | "SKIP"
            | "START"
            | "STARTS"
            | "THEN"
            | "TRUE"
            | "UNION"
            | "UNIQUE"
            | "UNWIND"
            | "USING"
            | "WHERE"
            | "WITH"
            | "XOR"
            | "YIELD"
    )
}

/// Check if a character is an accepted search-pattern flag.
///
/// The allowed set mirrors the flag characters understood by the target
/// language's regular expression engine.
pub fn is_regex_flag(c: char) -> bool {
    matches!(c, 'i' | 'x' | 'm' | 's' | 'u' | 'd')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_keywords() {
        assert_eq!(Clause::Match.keyword(), "MATCH");
        assert_eq!(Clause::OptionalMatch.keyword(), "OPTIONAL MATCH");
        assert_eq!(Clause::DetachDelete.keyword(), "DETACH DELETE");
        assert_eq!(Clause::LoadCsvWithHeadersFrom.keyword(), "LOAD CSV WITH HEADERS FROM");
    }

    #[test]
    fn test_allows_empty() {
        assert!(Clause::Union.allows_empty());
        assert!(Clause::UnionAll.allows_empty());
        assert!(Clause::Explain.allows_empty());
        assert!(Clause::Profile.allows_empty());

        assert!(!Clause::Match.allows_empty());
        assert!(!Clause::Where.allows_empty());
    }

    #[test]
    fn test_all_table_is_complete() {
        // Every keyword word must be reserved, so identifiers that shadow a
        // clause word get escaped.
        for clause in Clause::ALL {
            for word in clause.keyword().split(' ') {
                assert!(is_reserved_keyword(word), "missing keyword: {}", word);
            }
        }
    }

    #[test]
    fn test_reserved_keyword_case_insensitive() {
        assert!(is_reserved_keyword("match"));
        assert!(is_reserved_keyword("Match"));
        assert!(is_reserved_keyword("MATCH"));
        assert!(is_reserved_keyword("xor"));
        assert!(is_reserved_keyword("fieldterminator"));

        assert!(!is_reserved_keyword("name"));
        assert!(!is_reserved_keyword("User"));
    }

    #[test]
    fn test_regex_flags() {
        for flag in ['i', 'x', 'm', 's', 'u', 'd'] {
            assert!(is_regex_flag(flag));
        }
        assert!(!is_regex_flag('g'));
        assert!(!is_regex_flag('y'));
        assert!(!is_regex_flag('I'));
    }
}
