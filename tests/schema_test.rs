use arangraph::schema::SchemaValidator;
use arangraph::{EdgeDefinition, GraphDefinition, GraphError};

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn configured() -> (Vec<String>, Vec<EdgeDefinition>) {
    (
        names(&["person", "software"]),
        vec![
            EdgeDefinition::new("knows", ["person"], ["person"]),
            EdgeDefinition::new("created", ["person"], ["software"]),
        ],
    )
}

fn live(vertices: &[&str], definitions: Vec<EdgeDefinition>) -> GraphDefinition {
    GraphDefinition::new("modern", definitions, &names(vertices), &[])
}

fn validate(vertices: &[String], definitions: &[EdgeDefinition], live: &GraphDefinition) -> Result<(), GraphError> {
    SchemaValidator::new(vertices, &[], definitions).validate(live)
}

#[test]
fn test_identical_schemas_validate() {
    let (vertices, definitions) = configured();
    let graph = live(&["person", "software"], definitions.clone());
    assert!(validate(&vertices, &definitions, &graph).is_ok());
}

#[test]
fn test_vertex_collection_removed_from_either_side() {
    let (vertices, definitions) = configured();

    // Live side lacks a collection the configuration names.
    let graph = live(&["person"], vec![EdgeDefinition::new("knows", ["person"], ["person"])]);
    let err = validate(&vertices, &definitions[..1], &graph).unwrap_err();
    assert!(matches!(err, GraphError::MissingVertexCollection(ref c) if c == "software"));
    assert!(err.to_string().contains("software"));

    // Configuration lacks a collection the live graph has.
    let graph = live(&["person", "software"], definitions.clone());
    let err = validate(&names(&["person"]), &definitions, &graph).unwrap_err();
    assert!(matches!(err, GraphError::SurplusVertexCollection(ref c) if c == "software"));
    assert!(err.to_string().contains("software"));
}

#[test]
fn test_edge_definition_removed_from_either_side() {
    let (vertices, definitions) = configured();

    let graph = live(&["person", "software"], definitions.clone());
    let err = validate(&vertices, &definitions[..1], &graph).unwrap_err();
    assert!(err.is_schema_mismatch());
    assert!(err.to_string().contains("created"));

    let graph = live(&["person", "software"], definitions[..1].to_vec());
    let err = validate(&vertices, &definitions, &graph).unwrap_err();
    assert!(matches!(err, GraphError::SurplusEdgeDefinition(ref c) if c == "created"));
}

#[test]
fn test_incompatible_endpoints() {
    let (vertices, definitions) = configured();
    let graph = live(
        &["person", "software"],
        vec![
            EdgeDefinition::new("knows", ["person"], ["person"]),
            EdgeDefinition::new("created", ["person", "software"], ["software"]),
        ],
    );
    let err = validate(&vertices, &definitions, &graph).unwrap_err();
    match err {
        GraphError::IncompatibleEdgeDefinition { collection, expected, found } => {
            assert_eq!(collection, "created");
            assert_eq!(expected, "created:person->software");
            assert_eq!(found, "created:person,software->software");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_relations_resolve_against_configuration() {
    let vertices = names(&["person", "software"]);
    let edges = names(&["knows", "created"]);

    let mesh = EdgeDefinition::resolve(&[], &vertices, &edges).unwrap();
    assert_eq!(mesh.len(), 2);
    assert_eq!(mesh[0].to_string(), "knows:person,software->person,software");

    let err = EdgeDefinition::resolve(&names(&["likes:person->person"]), &vertices, &edges).unwrap_err();
    assert!(matches!(err, GraphError::UnknownCollection { ref collection, .. } if collection == "likes"));

    assert!(matches!(
        EdgeDefinition::parse_relation("bad"),
        Err(GraphError::MalformedRelation(_))
    ));
}
