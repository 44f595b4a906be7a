//! Pairing lifecycle of elements and variables through a session

use arangraph::client::executor::DatabaseError;
use arangraph::graph::{DocumentMeta, ElementData, PropertyManager};
use arangraph::{
    ArangoGraph, Cardinality, GraphConfig, GraphError, GraphVariables, PairingState, PropertyValue,
    ScriptedDatabase, Vertex,
};
use serde_json::json;
use std::sync::Arc;

fn open() -> (Arc<ScriptedDatabase>, ArangoGraph) {
    let db = Arc::new(ScriptedDatabase::new());
    db.push_rows(vec![json!({
        "name": "modern",
        "edgeDefinitions": [
            {"collection": "modern_knows", "from": ["modern_person"], "to": ["modern_person"]}
        ],
        "orphanCollections": []
    })])
    .push_rows(vec![json!({"_id": "graph_variables/modern", "_key": "modern", "_rev": "v1", "schema": 1})]);
    let config = GraphConfig::new("modern")
        .with_vertex_collection("person")
        .with_edge_collection("knows");
    let graph = ArangoGraph::open(db.clone(), config).unwrap();
    (db, graph)
}

#[test]
fn test_vertex_lifecycle() {
    let (db, graph) = open();
    assert!(db.created_graphs().is_empty());

    let mut marko = Vertex::new("person");
    assert!(matches!(marko.handle(), Err(GraphError::ElementNotPaired(_))));
    assert!(matches!(marko.revision(), Err(GraphError::ElementNotPaired(_))));

    marko.set_property("name", "marko");
    marko.add_property("alias", "mark", Cardinality::List);
    marko.add_property("alias", "okram", Cardinality::List);

    db.push_rows(vec![json!({"_id": "modern_person/1", "_key": "1", "_rev": "r1"})]);
    graph.insert_vertex(&mut marko).unwrap();
    assert_eq!(marko.data().state(), PairingState::Paired);
    assert_eq!(marko.key(), Some("1"));
    assert_eq!(marko.revision().unwrap(), "r1");

    let sent = db.last_query().unwrap();
    assert_eq!(sent.bind_vars["document"]["name"], json!("marko"));
    assert_eq!(sent.bind_vars["document"]["alias"], json!(["mark", "okram"]));

    assert!(matches!(
        graph.insert_vertex(&mut marko),
        Err(GraphError::ElementAlreadyPaired(_))
    ));

    marko.set_property("age", 29);
    db.push_rows(vec![json!({"_id": "modern_person/1", "_key": "1", "_rev": "r2"})]);
    graph.update_vertex(&mut marko).unwrap();
    assert_eq!(marko.revision().unwrap(), "r2");
    let sent = db.last_query().unwrap();
    assert_eq!(sent.query, "REPLACE @document IN @@col0 OPTIONS {ignoreRevs: false}\nRETURN NEW");
    assert_eq!(sent.bind_vars["document"]["_rev"], json!("r1"));

    db.push_rows(vec![json!({"_key": "1"})]);
    graph.remove_vertex(&mut marko).unwrap();
    let sent = db.last_query().unwrap();
    assert!(sent.query.starts_with(
        "LET edges0 = (FOR e IN @@col0 FILTER e._from == @handle OR e._to == @handle REMOVE e IN @@col0)"
    ));
    assert_eq!(sent.bind_vars["handle"], json!("modern_person/1"));
    assert_eq!(sent.bind_vars["@col1"], json!("modern_person"));
    assert_eq!(marko.data().state(), PairingState::Removed);
    assert!(graph.update_vertex(&mut marko).is_err());
}

#[test]
fn test_update_of_missing_document() {
    let (db, graph) = open();
    let data = ElementData::loaded(
        DocumentMeta::new("modern_person/9", "9", "r1"),
        "person",
        "modern_person",
    )
    .unwrap();
    let mut vertex = Vertex::from_parts(data, PropertyManager::new());
    db.push_error(DatabaseError::new("document not found").with_error_num(1202));
    let err = graph.update_vertex(&mut vertex).unwrap_err();
    assert!(matches!(err, GraphError::ElementNotFound(ref s) if s.contains("modern_person/9")));
    assert_eq!(vertex.revision().unwrap(), "r1");
}

#[test]
fn test_variables_lifecycle() {
    let (db, graph) = open();
    let mut variables = graph.variables().unwrap();
    assert_eq!(variables.get("schema"), Some(&PropertyValue::Integer(1)));
    let executed = db.executed().len();

    variables.set("schema", 2);
    db.push_rows(vec![json!({"_id": "graph_variables/modern", "_key": "modern", "_rev": "v2"})]);
    graph.update_variables(&mut variables).unwrap();
    assert_eq!(graph.variables().unwrap().data().revision().unwrap(), "v2");
    assert_eq!(db.executed().len(), executed + 1);

    // A failed delete still evicts the cache and unpairs the document.
    db.push_error(DatabaseError::new("connection reset"));
    assert!(matches!(graph.delete_variables(&mut variables), Err(GraphError::Database(_))));
    assert!(!variables.is_paired());

    db.push_rows(vec![json!({"_id": "graph_variables/modern", "_key": "modern", "_rev": "v3"})]);
    assert_eq!(graph.variables().unwrap().data().revision().unwrap(), "v3");

    let mut fresh = GraphVariables::new("modern");
    db.push_rows(vec![json!({"_id": "graph_variables/modern", "_key": "modern", "_rev": "v4"})]);
    graph.insert_variables(&mut fresh).unwrap();
    assert!(fresh.is_paired());
    assert_eq!(graph.variables().unwrap().data().revision().unwrap(), "v4");
}
