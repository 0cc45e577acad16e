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

//! Annotated query-file loading.
//!
//! Query files hold one or more blocks delimited by `// name: <name>`
//! marker lines:
//!
//! ```cypher
//! // name: by-title
//! MATCH (b:Book {title: {title}})
//! RETURN b;
//!
//! // name: all
//! MATCH (b:Book) RETURN b;
//! ```
//!
//! Line comments are stripped from block bodies and blank lines dropped, so
//! a loaded body is the bare statement text.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{CypherError, Result};

/// The file extension conventionally used for query files.
pub const DEFAULT_EXTENSION: &str = "cypher";

/// One parsed block of a query file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBlock {
    /// The declared name, if the block had a name marker.
    pub name: Option<String>,
    /// The statement text, comment-stripped and newline-joined.
    pub body: String,
}

/// The result of loading one query source.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedQueries {
    /// The source held exactly one unnamed block.
    Single(String),
    /// The source held named blocks; unnamed blocks are keyed by their
    /// position rendered as a string.
    Named(IndexMap<String, String>),
}

impl LoadedQueries {
    /// Get a block body by name (`Named` sources only).
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            LoadedQueries::Single(_) => None,
            LoadedQueries::Named(map) => map.get(name).map(|s| s.as_str()),
        }
    }

    /// Get the single body of an unnamed source.
    pub fn single(&self) -> Option<&str> {
        match self {
            LoadedQueries::Single(body) => Some(body),
            LoadedQueries::Named(_) => None,
        }
    }
}

/// Extract the declared name from a `// name: <name>` marker line.
fn block_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("//")?;
    let trimmed = rest.trim_start();
    // The marker requires whitespace between the comment slashes and the
    // name key.
    if trimmed.len() == rest.len() {
        return None;
    }
    if !trimmed.get(..5)?.eq_ignore_ascii_case("name:") {
        return None;
    }
    Some(trimmed[5..].trim())
}

/// Parse a query source into its blocks.
///
/// A new block starts at every name marker line; content before the first
/// marker forms an unnamed block. Sources without any marker parse as one
/// unnamed block.
pub fn parse(source: &str) -> Vec<QueryBlock> {
    let mut blocks: Vec<QueryBlock> = Vec::new();
    let mut current: Option<QueryBlock> = None;

    for line in source.lines() {
        if let Some(name) = block_name(line) {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            current = Some(QueryBlock {
                name: Some(name.to_string()),
                body: String::new(),
            });
            continue;
        }

        let mut text = line.trim();
        if let Some(comment) = text.find("//") {
            text = text[..comment].trim_end();
        }
        if text.is_empty() {
            continue;
        }

        let block = current.get_or_insert(QueryBlock {
            name: None,
            body: String::new(),
        });
        if !block.body.is_empty() {
            block.body.push('\n');
        }
        block.body.push_str(text);
    }

    if let Some(block) = current.take() {
        blocks.push(block);
    }
    if blocks.is_empty() {
        blocks.push(QueryBlock {
            name: None,
            body: String::new(),
        });
    }

    blocks
}

/// Load queries from in-memory source text.
///
/// `origin` names the source in error messages (typically the file path).
///
/// # Errors
///
/// Returns [`CypherError::DuplicateName`] when two blocks resolve to the
/// same key.
pub fn load_str(source: &str, origin: &str) -> Result<LoadedQueries> {
    let blocks = parse(source);

    if blocks.len() == 1 && blocks[0].name.is_none() {
        let body = blocks.into_iter().next().map(|b| b.body).unwrap_or_default();
        return Ok(LoadedQueries::Single(body));
    }

    let mut map = IndexMap::new();
    for (i, block) in blocks.into_iter().enumerate() {
        let key = block.name.unwrap_or_else(|| i.to_string());
        if map.contains_key(&key) {
            return Err(CypherError::DuplicateName {
                name: key,
                origin: origin.to_string(),
            });
        }
        map.insert(key, block.body);
    }

    Ok(LoadedQueries::Named(map))
}

/// Load queries from a single file.
///
/// # Errors
///
/// Returns [`CypherError::Io`] on read failure and
/// [`CypherError::DuplicateName`] on colliding block names.
pub fn load_file(path: impl AsRef<Path>) -> Result<LoadedQueries> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;
    load_str(&source, &path.display().to_string())
}

/// Load every matching query file of a directory, keyed by file stem.
///
/// `extension` filters the files considered (a leading dot is tolerated);
/// entries are processed in sorted filename order so the result is
/// reproducible across platforms.
///
/// # Errors
///
/// Returns [`CypherError::Io`] on directory or file read failure and
/// [`CypherError::DuplicateName`] on colliding block names within a file.
pub fn load_dir(
    dir: impl AsRef<Path>,
    extension: &str,
) -> Result<IndexMap<String, LoadedQueries>> {
    let extension = extension.trim_start_matches('.');

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |e| e == extension) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut out = IndexMap::new();
    for path in paths {
        let stem = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => continue,
        };
        out.insert(stem, load_file(&path)?);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_name_marker() {
        assert_eq!(block_name("// name: all"), Some("all"));
        assert_eq!(block_name("  // NAME: Upper  "), Some("Upper"));
        assert_eq!(block_name("//  name:spaced"), Some("spaced"));

        // No whitespace after the slashes.
        assert_eq!(block_name("//name: nope"), None);
        assert_eq!(block_name("MATCH (n)"), None);
        assert_eq!(block_name("// note: not a name"), None);
    }

    #[test]
    fn test_parse_single_unnamed_block() {
        let blocks = parse("MATCH (n)\nRETURN n;");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, None);
        assert_eq!(blocks[0].body, "MATCH (n)\nRETURN n;");
    }

    #[test]
    fn test_parse_strips_comments_and_blank_lines() {
        let source = "MATCH (n) // find them all\n\n  RETURN n;  \n";
        let blocks = parse(source);
        assert_eq!(blocks[0].body, "MATCH (n)\nRETURN n;");
    }

    #[test]
    fn test_parse_named_blocks() {
        let source = "// name: first\nRETURN 1;\n// name: second\nRETURN 2;";
        let blocks = parse(source);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name.as_deref(), Some("first"));
        assert_eq!(blocks[0].body, "RETURN 1;");
        assert_eq!(blocks[1].name.as_deref(), Some("second"));
        assert_eq!(blocks[1].body, "RETURN 2;");
    }

    #[test]
    fn test_parse_unnamed_prefix_block() {
        let source = "RETURN 0;\n// name: one\nRETURN 1;";
        let blocks = parse(source);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name, None);
        assert_eq!(blocks[0].body, "RETURN 0;");
    }

    #[test]
    fn test_parse_empty_source() {
        let blocks = parse("");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body, "");
    }

    #[test]
    fn test_load_str_single() {
        let loaded = load_str("MATCH (n) RETURN n;", "inline").unwrap();
        assert_eq!(loaded.single(), Some("MATCH (n) RETURN n;"));
        assert_eq!(loaded.get("anything"), None);
    }

    #[test]
    fn test_load_str_named() {
        let source = "// name: all\nMATCH (n) RETURN n;\n// name: none\nRETURN 0;";
        let loaded = load_str(source, "inline").unwrap();
        assert_eq!(loaded.get("all"), Some("MATCH (n) RETURN n;"));
        assert_eq!(loaded.get("none"), Some("RETURN 0;"));
        assert_eq!(loaded.single(), None);
    }

    #[test]
    fn test_load_str_single_named_block_is_named() {
        let loaded = load_str("// name: only\nRETURN 1;", "inline").unwrap();
        assert_eq!(loaded.get("only"), Some("RETURN 1;"));
    }

    #[test]
    fn test_load_str_unnamed_block_keyed_by_index() {
        let source = "RETURN 0;\n// name: one\nRETURN 1;";
        let loaded = load_str(source, "inline").unwrap();
        assert_eq!(loaded.get("0"), Some("RETURN 0;"));
        assert_eq!(loaded.get("one"), Some("RETURN 1;"));
    }

    #[test]
    fn test_load_str_duplicate_name() {
        let source = "// name: twice\nRETURN 1;\n// name: twice\nRETURN 2;";
        let err = load_str(source, "queries.cypher").unwrap_err();
        match err {
            CypherError::DuplicateName { name, origin } => {
                assert_eq!(name, "twice");
                assert_eq!(origin, "queries.cypher");
            }
            other => panic!("expected DuplicateName, got {:?}", other),
        }
    }

    #[test]
    fn test_load_file_and_dir() {
        let dir = std::env::temp_dir().join(format!("cypherkit-loader-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        fs::write(dir.join("books.cypher"), "// name: all\nMATCH (b:Book) RETURN b;").unwrap();
        fs::write(dir.join("users.cypher"), "MATCH (u:User) RETURN u;").unwrap();
        fs::write(dir.join("ignored.txt"), "not a query").unwrap();

        let loaded = load_file(dir.join("users.cypher")).unwrap();
        assert_eq!(loaded.single(), Some("MATCH (u:User) RETURN u;"));

        let all = load_dir(&dir, DEFAULT_EXTENSION).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(
            all.get("books").and_then(|l| l.get("all")),
            Some("MATCH (b:Book) RETURN b;")
        );
        assert_eq!(
            all.get("users").and_then(|l| l.single()),
            Some("MATCH (u:User) RETURN u;")
        );
        // Sorted filename order.
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["books", "users"]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_dir_extension_with_dot() {
        let dir = std::env::temp_dir().join(format!("cypherkit-loader-dot-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("q.cql"), "RETURN 1;").unwrap();

        let all = load_dir(&dir, ".cql").unwrap();
        assert_eq!(all.get("q").and_then(|l| l.single()), Some("RETURN 1;"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_file_missing_is_io_error() {
        let err = load_file("/nonexistent/queries.cypher").unwrap_err();
        assert!(matches!(err, CypherError::Io(_)));
    }
}
