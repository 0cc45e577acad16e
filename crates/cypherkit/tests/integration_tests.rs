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

//! End-to-end tests across the public API: batches compiled to full query
//! text, manual query composition, and query-file loading.

use cypherkit::{
    load_dir, load_file, props, Batch, CypherError, Direction, Expression, NodeSpec, Query,
    RelationshipSpec, Value,
};

#[test]
fn test_batch_end_to_end_text_and_params() {
    let mut batch = Batch::new();

    let dairy = batch.create(
        props! {"name" => "Dairy products"},
        ["ClassifiedItem", "ClassifiedProduct"],
    );
    let milk = batch.create(props! {"name" => "Milk"}, "Item");
    let cheese = batch.create(props! {"name" => "Cheese"}, "Item");

    batch.relate(dairy, "AGGREGATES", milk, props! {}).unwrap();
    batch.relate(dairy, "AGGREGATES", cheese, props! {}).unwrap();
    batch.relate(45, "AGGREGATES", cheese, props! {}).unwrap();

    batch.update(45, props! {"note" => "Here you go."}).unwrap();
    batch.unrelate(45, "AGGREGATES", 46).unwrap();

    let built = batch.build();

    assert_eq!(
        built.query,
        "MATCH (e45)\n\
         WHERE id(e45) = 45\n\
         MATCH (e46)\n\
         WHERE id(e46) = 46\n\
         MATCH (e45)-[u0:AGGREGATES]->(e46)\n\
         CREATE (n0 {pn0})\n\
         SET n0:ClassifiedItem\n\
         SET n0:ClassifiedProduct\n\
         CREATE (n1 {pn1})\n\
         SET n1:Item\n\
         CREATE (n2 {pn2})\n\
         SET n2:Item\n\
         CREATE (n0)-[r0:AGGREGATES]->(n1)\n\
         CREATE (n0)-[r1:AGGREGATES]->(n2)\n\
         CREATE (e45)-[r2:AGGREGATES]->(n2)\n\
         SET e45 += {pe45}\n\
         DELETE u0;"
    );

    assert_eq!(
        built.params.get("pe45"),
        Some(&Value::Map(props! {"note" => "Here you go."}))
    );
    assert_eq!(built.params.len(), 4);
}

#[test]
fn test_batch_query_interpolates_parameters() {
    let mut batch = Batch::new();
    batch.create(props! {"name" => "Milk", "stock" => 2}, "Item");

    let interpolated = batch.query().interpolate();
    assert_eq!(
        interpolated,
        "CREATE (n0 {name: \"Milk\", stock: 2})\nSET n0:Item;"
    );
}

#[test]
fn test_manual_query_with_reserved_segment() {
    // Reserve a MATCH section up front, decide later what it must contain.
    let query = Query::new();
    let matches = query.segment();

    query.create("(b:Book {props})").unwrap();
    query.set_param("props", props! {"title" => "Dune"});
    query.return_("a, b").unwrap();

    matches.match_("(a:Author)").unwrap();
    matches
        .where_(Expression::with("a.name = {author}").and("a.active"))
        .unwrap();
    matches.set_param("author", "Frank Herbert");

    assert_eq!(
        query.compile(),
        "MATCH (a:Author)\n\
         WHERE a.name = {author} AND a.active\n\
         CREATE (b:Book {props})\n\
         RETURN a, b;"
    );

    let params = query.params();
    assert_eq!(params.get("author"), Some(&Value::from("Frank Herbert")));
    assert!(params.contains_key("props"));
}

#[test]
fn test_query_with_pattern_descriptors() {
    let query = Query::new();

    let knows = RelationshipSpec::new()
        .with_source(NodeSpec::from("a").with_label("Person"))
        .with_target(NodeSpec::from("b").with_label("Person"))
        .with_identifier("r")
        .with_type("KNOWS")
        .with_direction(Direction::Out);

    query.match_(knows).unwrap();
    query.where_("r.since < 2000").unwrap();
    query.return_(["a", "b", "r"]).unwrap();

    assert_eq!(
        query.compile(),
        "MATCH (a:Person)-[r:KNOWS]->(b:Person)\n\
         WHERE r.since < 2000\n\
         RETURN a, b, r;"
    );
}

#[test]
fn test_union_composition() {
    let query = Query::new();
    query.match_("(a:Actor)").unwrap().return_("a.name AS name").unwrap();
    query.union();
    query.match_("(d:Director)").unwrap().return_("d.name AS name").unwrap();

    assert_eq!(
        query.compile(),
        "MATCH (a:Actor)\nRETURN a.name AS name\nUNION\nMATCH (d:Director)\nRETURN d.name AS name;"
    );
}

#[test]
fn test_foreach_with_nested_query() {
    let inner = Query::new();
    inner.set("n.marked = {flag}").unwrap();
    inner.set_param("flag", true);

    let query = Query::new();
    query.match_("p = (a)-[*]->(b)").unwrap();
    query.foreach("n IN nodes(p)", inner).unwrap();

    assert_eq!(
        query.compile(),
        "MATCH p = (a)-[*]->(b)\nFOREACH (n IN nodes(p) | SET n.marked = {flag});"
    );
    assert_eq!(query.param("flag"), Some(Value::Bool(true)));
}

#[test]
fn test_batch_survives_repeated_compilation_with_mutation_between() {
    let mut batch = Batch::new();
    let a = batch.create(props! {"name" => "A"}, "Node");

    let first = batch.compile();
    assert_eq!(first, "CREATE (n0 {pn0})\nSET n0:Node;");

    // Compilation did not consume the batch; keep mutating it.
    batch.relate(a, "SELF", a, props! {}).unwrap();
    let second = batch.compile();
    assert_eq!(
        second,
        "CREATE (n0 {pn0})\nSET n0:Node\nCREATE (n0)-[r0:SELF]->(n0);"
    );
}

#[test]
fn test_loader_roundtrip_into_query() {
    let dir = std::env::temp_dir().join(format!("cypherkit-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("books.cypher"),
        "// name: by-title\n\
         MATCH (b:Book {title: {title}}) // title comes from the caller\n\
         RETURN b;\n\
         \n\
         // name: all\n\
         MATCH (b:Book)\n\
         RETURN b;\n",
    )
    .unwrap();

    let queries = load_file(dir.join("books.cypher")).unwrap();
    assert_eq!(
        queries.get("by-title"),
        Some("MATCH (b:Book {title: {title}})\nRETURN b;")
    );

    // A loaded body slots into an accumulator as a raw part.
    let query = Query::new();
    query.add(queries.get("all").unwrap()).unwrap();
    assert_eq!(query.statements(), vec!["MATCH (b:Book)\nRETURN b;"]);

    let by_dir = load_dir(&dir, "cypher").unwrap();
    assert!(by_dir.contains_key("books"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_loader_duplicate_name_is_rejected() {
    let dir = std::env::temp_dir().join(format!("cypherkit-it-dup-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("dup.cypher");
    std::fs::write(&path, "// name: q\nRETURN 1;\n// name: q\nRETURN 2;").unwrap();

    let err = load_file(&path).unwrap_err();
    match err {
        CypherError::DuplicateName { name, origin } => {
            assert_eq!(name, "q");
            assert!(origin.ends_with("dup.cypher"));
        }
        other => panic!("expected DuplicateName, got {:?}", other),
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_errors_never_surface_at_compile_time() {
    let mut batch = Batch::new();

    // Every rejected mutation leaves the batch compilable.
    let a = batch.create(props! {}, "Item");
    assert!(batch.relate(a, "", a, props! {}).is_err());

    let mut other = Batch::new();
    let foreign = other.create(props! {}, "Item");
    assert!(batch.update(foreign, props! {"x" => 1}).is_err());

    // Compilation still works and reflects only the recorded intents.
    assert_eq!(batch.statements(), vec!["CREATE (n0)", "SET n0:Item"]);
}
