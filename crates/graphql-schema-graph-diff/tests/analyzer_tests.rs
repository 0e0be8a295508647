#![allow(unused_crate_dependencies)]

use graphql_schema_graph_diff::{
    AddedInterfaceToObjectDetail, AnalyzeError, DiffConfig, EditOperation, EditOperationAnalyzer, EditOperationKind,
    ElementRef, GraphSide, ObjectChangeDetail, SchemaChange, SchemaGraph, SchemaGraphBuilder, TypeChangeDetail,
    TypeDefinition, TypeSystem, Vertex, VertexKind, IS_BUILT_IN_SCALAR,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[ctor::ctor]
fn setup_logging() {
    let filter = tracing_subscriber::filter::EnvFilter::builder()
        .parse(std::env::var("RUST_LOG").unwrap_or("graphql_schema_graph_diff=debug".to_string()))
        .unwrap();
    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .without_time()
        .init();
}

fn object_and_interface() -> TypeSystem {
    let mut type_system = TypeSystem::default();
    type_system
        .push_type(TypeDefinition::object("O", &[], Vec::new()))
        .push_type(TypeDefinition::interface("I", &[], Vec::new()));
    type_system
}

fn graph(vertices: &[(VertexKind, &str)]) -> SchemaGraph {
    let mut builder = SchemaGraphBuilder::new();

    for (kind, name) in vertices {
        builder.push_vertex(Vertex::new(*kind, *name, *name));
    }

    builder.finish().unwrap()
}

#[rstest]
#[case::canonical(false)]
#[case::reversed(true)]
fn added_interface_is_attached_to_the_object(#[case] reversed: bool) {
    let type_system = object_and_interface();
    let old_graph = graph(&[(VertexKind::Object, "O"), (VertexKind::Interface, "I")]);

    let mut builder = SchemaGraphBuilder::new();
    let object = builder.push_vertex(Vertex::new(VertexKind::Object, "O", "O"));
    let interface = builder.push_vertex(Vertex::new(VertexKind::Interface, "I", "I"));

    let edge = if reversed {
        builder.push_edge(interface, object, "implements I").unwrap()
    } else {
        builder.push_edge(object, interface, "implements I").unwrap()
    };

    let new_graph = builder.finish().unwrap();
    let config = DiffConfig::default();

    let analysis = EditOperationAnalyzer::new(&type_system, &type_system, &old_graph, &new_graph, &config)
        .analyze(&[EditOperation::InsertEdge { target: edge }])
        .unwrap();

    assert_eq!(
        analysis.changes,
        vec![SchemaChange::ObjectChanged {
            name: "O".to_owned(),
            details: vec![ObjectChangeDetail::AddedInterfaceToObject(AddedInterfaceToObjectDetail {
                interface_name: "I".to_owned(),
            })],
        }]
    );
    assert!(analysis.unclassified.is_empty());
}

#[test]
fn interface_implementing_an_interface_is_unclassified() {
    let mut type_system = TypeSystem::default();
    type_system
        .push_type(TypeDefinition::interface("Node", &[], Vec::new()))
        .push_type(TypeDefinition::interface("Entity", &["Node"], Vec::new()));

    let old_graph = graph(&[(VertexKind::Interface, "Node"), (VertexKind::Interface, "Entity")]);

    let mut builder = SchemaGraphBuilder::new();
    let node = builder.push_vertex(Vertex::new(VertexKind::Interface, "Node", "Node"));
    let entity = builder.push_vertex(Vertex::new(VertexKind::Interface, "Entity", "Entity"));
    let edge = builder.push_edge(entity, node, "implements Node").unwrap();
    let new_graph = builder.finish().unwrap();

    let config = DiffConfig::default();
    let analysis = EditOperationAnalyzer::new(&type_system, &type_system, &old_graph, &new_graph, &config)
        .analyze(&[EditOperation::InsertEdge { target: edge }])
        .unwrap();

    assert!(analysis.changes.is_empty());
    assert_eq!(analysis.unclassified.len(), 1);
    assert_eq!(analysis.unclassified[0].operation, EditOperationKind::InsertEdge);
    assert_eq!(
        analysis.unclassified[0].one,
        ElementRef {
            kind: VertexKind::Interface,
            path: "Entity".to_owned()
        }
    );
}

#[test]
fn inserted_interface_covers_its_implements_edge() {
    let mut old_schema = TypeSystem::default();
    old_schema.push_type(TypeDefinition::interface("Node", &[], Vec::new()));

    let mut new_schema = TypeSystem::default();
    new_schema
        .push_type(TypeDefinition::interface("Node", &[], Vec::new()))
        .push_type(TypeDefinition::interface("Entity", &["Node"], Vec::new()));

    let old_graph = graph(&[(VertexKind::Interface, "Node")]);

    let mut builder = SchemaGraphBuilder::new();
    let node = builder.push_vertex(Vertex::new(VertexKind::Interface, "Node", "Node"));
    let entity = builder.push_vertex(Vertex::new(VertexKind::Interface, "Entity", "Entity"));
    let edge = builder.push_edge(entity, node, "implements Node").unwrap();
    let new_graph = builder.finish().unwrap();

    let config = DiffConfig::default();
    let analysis = EditOperationAnalyzer::new(&old_schema, &new_schema, &old_graph, &new_graph, &config)
        .analyze(&[
            EditOperation::InsertVertex { target: entity },
            EditOperation::InsertEdge { target: edge },
        ])
        .unwrap();

    assert_eq!(
        analysis.changes,
        vec![SchemaChange::InterfaceAdded {
            name: "Entity".to_owned()
        }]
    );
    assert!(analysis.unclassified.is_empty());
}

#[rstest]
#[case("String")]
#[case("Int")]
#[case("Float")]
#[case("Boolean")]
#[case("ID")]
fn built_in_scalars_are_never_reported(#[case] name: &str) {
    let type_system = TypeSystem::default();
    let empty = SchemaGraphBuilder::new().finish().unwrap();

    let mut builder = SchemaGraphBuilder::new();
    let scalar = builder.push_vertex(Vertex::new(VertexKind::Scalar, name, name).with_property(IS_BUILT_IN_SCALAR, "true"));
    let with_scalar = builder.finish().unwrap();

    let config = DiffConfig::default();

    let added = EditOperationAnalyzer::new(&type_system, &type_system, &empty, &with_scalar, &config)
        .analyze(&[EditOperation::InsertVertex { target: scalar }])
        .unwrap();

    let removed = EditOperationAnalyzer::new(&type_system, &type_system, &with_scalar, &empty, &config)
        .analyze(&[EditOperation::DeleteVertex { source: scalar }])
        .unwrap();

    assert!(added.changes.is_empty());
    assert!(removed.changes.is_empty());
}

#[test]
fn custom_scalar_is_reported() {
    let mut type_system = TypeSystem::default();
    type_system.push_type(TypeDefinition::scalar("Date"));

    let empty = SchemaGraphBuilder::new().finish().unwrap();
    let mut builder = SchemaGraphBuilder::new();
    let scalar = builder.push_vertex(Vertex::new(VertexKind::Scalar, "Date", "Date"));
    let new_graph = builder.finish().unwrap();

    let config = DiffConfig::default();
    let analysis = EditOperationAnalyzer::new(&TypeSystem::default(), &type_system, &empty, &new_graph, &config)
        .analyze(&[EditOperation::InsertVertex { target: scalar }])
        .unwrap();

    assert_eq!(
        analysis.changes,
        vec![SchemaChange::ScalarAdded {
            name: "Date".to_owned()
        }]
    );
}

#[test]
fn composites_come_after_simple_changes_in_first_seen_order() {
    let mut old_schema = TypeSystem::default();
    old_schema
        .push_type(TypeDefinition::object("Old", &[], Vec::new()))
        .push_type(TypeDefinition::interface("I", &[], Vec::new()));

    let mut new_schema = TypeSystem::default();
    new_schema
        .push_type(TypeDefinition::object("New", &[], Vec::new()))
        .push_type(TypeDefinition::interface("I", &[], Vec::new()).with_description("An interface"))
        .push_type(TypeDefinition::scalar("Date"));

    let mut builder = SchemaGraphBuilder::new();
    let old_object = builder.push_vertex(Vertex::new(VertexKind::Object, "Old", "Old"));
    let old_interface = builder.push_vertex(Vertex::new(VertexKind::Interface, "I", "I"));
    let old_graph = builder.finish().unwrap();

    let mut builder = SchemaGraphBuilder::new();
    let new_object = builder.push_vertex(Vertex::new(VertexKind::Object, "New", "New"));
    let new_interface =
        builder.push_vertex(Vertex::new(VertexKind::Interface, "I", "I").with_property("description", "An interface"));
    let date = builder.push_vertex(Vertex::new(VertexKind::Scalar, "Date", "Date"));
    let implements = builder.push_edge(new_object, new_interface, "implements I").unwrap();
    let new_graph = builder.finish().unwrap();

    let config = DiffConfig::default();
    let analysis = EditOperationAnalyzer::new(&old_schema, &new_schema, &old_graph, &new_graph, &config)
        .analyze(&[
            EditOperation::ChangeVertex {
                source: old_interface,
                target: new_interface,
            },
            EditOperation::ChangeVertex {
                source: old_object,
                target: new_object,
            },
            EditOperation::InsertVertex { target: date },
            EditOperation::InsertEdge { target: implements },
        ])
        .unwrap();

    insta::assert_debug_snapshot!(analysis.changes, @r#"
    [
        ScalarAdded {
            name: "Date",
        },
        ObjectChanged {
            name: "New",
            details: [
                Renamed {
                    old_name: "Old",
                },
                AddedInterfaceToObject(
                    AddedInterfaceToObjectDetail {
                        interface_name: "I",
                    },
                ),
            ],
        },
        InterfaceChanged {
            name: "I",
            details: [
                PropertyChanged(
                    PropertyChange {
                        key: "description",
                        old: None,
                        new: Some(
                            "An interface",
                        ),
                    },
                ),
            ],
        },
    ]
    "#);
}

#[test]
fn renamed_field_reports_its_container() {
    let mut builder = SchemaGraphBuilder::new();
    let query = builder.push_vertex(Vertex::new(VertexKind::Object, "Query", "Query"));
    let user = builder.push_vertex(Vertex::new(VertexKind::Field, "user", "Query.user"));
    builder.push_edge(query, user, "field").unwrap();
    let old_graph = builder.finish().unwrap();

    let mut builder = SchemaGraphBuilder::new();
    let query = builder.push_vertex(Vertex::new(VertexKind::Object, "Query", "Query"));
    let person = builder.push_vertex(Vertex::new(VertexKind::Field, "person", "Query.person"));
    builder.push_edge(query, person, "field").unwrap();
    let new_graph = builder.finish().unwrap();

    let type_system = TypeSystem::default();
    let config = DiffConfig::default();
    let analysis = EditOperationAnalyzer::new(&type_system, &type_system, &old_graph, &new_graph, &config)
        .analyze(&[EditOperation::ChangeVertex {
            source: user,
            target: person,
        }])
        .unwrap();

    assert_eq!(
        analysis.changes,
        vec![SchemaChange::FieldChanged {
            name: "person".to_owned(),
            container: "Query".to_owned(),
            details: vec![TypeChangeDetail::Renamed {
                old_name: "user".to_owned()
            }],
        }]
    );
}

#[test]
fn unknown_vertex_fails_the_analysis() {
    let type_system = object_and_interface();
    let small = graph(&[(VertexKind::Object, "O")]);
    let large = graph(&[
        (VertexKind::Object, "O"),
        (VertexKind::Interface, "I"),
        (VertexKind::Scalar, "Date"),
    ]);
    let (unknown, _) = large.vertices().last().unwrap();

    let config = DiffConfig::default();
    let error = EditOperationAnalyzer::new(&type_system, &type_system, &small, &small, &config)
        .analyze(&[EditOperation::InsertVertex { target: unknown }])
        .unwrap_err();

    assert_eq!(
        error,
        AnalyzeError::MissingVertex {
            operation: EditOperationKind::InsertVertex,
            id: 2,
            side: GraphSide::New,
        }
    );
}

#[test]
fn type_missing_from_its_type_system_fails_the_analysis() {
    let empty = SchemaGraphBuilder::new().finish().unwrap();
    let with_object = graph(&[(VertexKind::Object, "Ghost")]);
    let (ghost, _) = with_object.vertices().next().unwrap();

    let config = DiffConfig::default();
    let error = EditOperationAnalyzer::new(&TypeSystem::default(), &TypeSystem::default(), &empty, &with_object, &config)
        .analyze(&[EditOperation::InsertVertex { target: ghost }])
        .unwrap_err();

    insta::assert_snapshot!(error, @"The OBJECT Ghost is not defined in the new type system");
}
