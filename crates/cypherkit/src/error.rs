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

//! Error types for query construction and loading.

use thiserror::Error;

/// Error type for CypherKit operations.
///
/// Every failure is raised synchronously at the call that introduced the bad
/// input. Compilation (`Batch::query`, `Query::compile`) never fails.
#[derive(Debug, Error)]
pub enum CypherError {
    /// A caller-supplied argument was rejected: malformed properties, an
    /// empty relationship type, an invalid search flag, or an entity handle
    /// that belongs to another batch.
    #[error("{operation}: {message}")]
    InvalidArgument {
        /// The operation that rejected the argument.
        operation: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// Two named query blocks collide within one loaded file.
    #[error("duplicate query name '{name}' in '{origin}'")]
    DuplicateName {
        /// The colliding block name.
        name: String,
        /// The file (or other source description) the collision occurred in.
        origin: String,
    },

    /// A clause was assembled in a way the statement grammar forbids, e.g.
    /// an empty part passed to a clause that requires one, or a FOREACH
    /// without a usable inner query.
    #[error("{operation}: {message}")]
    Structural {
        /// The clause or operation that was misused.
        operation: &'static str,
        /// What the grammar requires.
        message: String,
    },

    /// I/O failure while loading query files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CypherKit operations.
pub type Result<T> = std::result::Result<T, CypherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_names_operation() {
        let err = CypherError::InvalidArgument {
            operation: "Batch::relate",
            message: "relationship type must be a non-empty string".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Batch::relate"));
        assert!(msg.contains("non-empty"));
    }

    #[test]
    fn test_duplicate_name_display() {
        let err = CypherError::DuplicateName {
            name: "by-name".to_string(),
            origin: "queries/users.cypher".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("by-name"));
        assert!(msg.contains("users.cypher"));
    }

    #[test]
    fn test_structural_display() {
        let err = CypherError::Structural {
            operation: "FOREACH",
            message: "an inner query is required".to_string(),
        };
        assert!(err.to_string().contains("FOREACH"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CypherError = io_err.into();
        assert!(matches!(err, CypherError::Io(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }
}
