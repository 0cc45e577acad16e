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

//! Cypher query construction and batch composition.
//!
//! CypherKit builds textual graph queries incrementally, clause by clause,
//! with safely escaped identifiers and separated parameter bindings, and
//! compiles sets of graph mutation intents into ordered, parameterized
//! statement sequences.
//!
//! # Components
//!
//! - [`helpers`]: identifier escaping, literal-map stringification, and
//!   node/relationship/search pattern builders.
//! - [`Expression`]: boolean predicate composition (`AND`/`OR`/`XOR`,
//!   nestable).
//! - [`Query`]: an ordered, nestable accumulator of clause lines plus a
//!   merged parameter map, with one method per clause keyword.
//! - [`Batch`]: the batch compiler. Records node/relationship mutations
//!   against new and pre-existing entities, then compiles them into a
//!   correctly-ordered `MATCH`/`CREATE`/`SET`/`DELETE` sequence.
//! - [`loader`]: reads annotated `.cypher` files split into named blocks.
//!
//! # Example: building a query by hand
//!
//! ```
//! use cypherkit::{Expression, Query};
//!
//! let query = Query::new();
//! query.match_("(b:Book)")?;
//! query.where_(Expression::with("b.title = {title}").or("b.year > 2000"))?;
//! query.return_("b")?;
//! query.set_param("title", "Dune");
//!
//! assert_eq!(
//!     query.compile(),
//!     "MATCH (b:Book)\nWHERE b.title = {title} OR b.year > 2000\nRETURN b;"
//! );
//! # Ok::<(), cypherkit::CypherError>(())
//! ```
//!
//! # Example: compiling a batch
//!
//! ```
//! use cypherkit::{props, Batch};
//!
//! let mut batch = Batch::new();
//! let item = batch.create(props! {"name" => "Milk"}, "Item");
//! batch.relate(item, "AGGREGATES", 45, props! {})?;
//!
//! let built = batch.build();
//! assert_eq!(
//!     built.statements,
//!     vec![
//!         "MATCH (e45)",
//!         "WHERE id(e45) = 45",
//!         "CREATE (n0 {pn0})",
//!         "SET n0:Item",
//!         "CREATE (n0)-[r0:AGGREGATES]->(e45)",
//!     ]
//! );
//! # Ok::<(), cypherkit::CypherError>(())
//! ```
//!
//! Queries are produced as text plus a flat parameter map intended for
//! bind-parameter execution; CypherKit itself never talks to a database.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod batch;
pub mod error;
pub mod expression;
pub mod helpers;
pub mod loader;
pub mod query;
pub mod syntax;
pub mod value;

// Re-export main types at crate root for convenience
pub use batch::{Batch, ExternalId, Labels, NodeInput, NodeRef, RelRef};
pub use error::{CypherError, Result};
pub use expression::{Expression, Operand, Operator};
pub use helpers::{
    escape_identifier, escape_literal_map, node_pattern, relationship_pattern, search_pattern,
    Direction, NodeSpec, PatternData, RelationshipSpec, SearchOptions,
};
pub use loader::{load_dir, load_file, load_str, LoadedQueries, QueryBlock};
pub use query::{BuiltQuery, ForeachInner, Parts, Query, QueryPart};
pub use syntax::{is_reserved_keyword, Clause};
pub use value::{Map, Value};
