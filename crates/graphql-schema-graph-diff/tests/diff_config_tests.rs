#![allow(unused_crate_dependencies)]

use graphql_schema_graph_diff::{diff, diff_with_config, DiffConfig};

#[test]
fn added_fields_inside_added_types() {
    let source = r#"
        type Query {
            hello: String!
        }
    "#;

    let target = r#"
        type Query {
            hello: String!
        }

        interface Greeter {
            goodbye: String!
        }

        type Mutation implements Greeter {
            goodDaySir: String!
            goodbye: String!
        }
    "#;

    let diff = diff_with_config(
        source,
        target,
        DiffConfig::default().with_additions_inside_type_definitions(true),
    )
    .unwrap();

    insta::assert_debug_snapshot!(diff, @r#"
    SchemaDiff {
        changes: [
            ObjectAdded {
                name: "Mutation",
            },
            InterfaceAdded {
                name: "Greeter",
            },
            FieldAdded {
                name: "goodDaySir",
                container: "Mutation",
            },
            FieldAdded {
                name: "goodbye",
                container: "Greeter",
            },
            FieldAdded {
                name: "goodbye",
                container: "Mutation",
            },
            ObjectChanged {
                name: "Mutation",
                details: [
                    AddedInterfaceToObject(
                        AddedInterfaceToObjectDetail {
                            interface_name: "Greeter",
                        },
                    ),
                ],
            },
        ],
        unclassified: [],
        approximate: false,
    }
    "#);
}

#[test]
fn nested_additions_are_not_reported_by_default() {
    let source = r#"
        type Query {
            hello: String!
        }
    "#;

    let target = r#"
        type Query {
            hello: String!
        }

        interface Greeter {
            goodbye: String!
        }

        type Mutation implements Greeter {
            goodDaySir: String! @deprecated
            goodbye: String!
        }
    "#;

    let diff = diff(source, target).unwrap();

    insta::assert_debug_snapshot!(diff.changes, @r#"
    [
        ObjectAdded {
            name: "Mutation",
        },
        InterfaceAdded {
            name: "Greeter",
        },
    ]
    "#);
}

#[test]
fn added_values_inside_added_enums() {
    let source = r#"
        type Query {
            hello: String!
        }
    "#;

    let target = r#"
        enum MyEnum {
            A
            B
        }
    "#;

    let diff = diff_with_config(
        source,
        target,
        DiffConfig::default().with_additions_inside_type_definitions(true),
    )
    .unwrap();

    insta::assert_debug_snapshot!(diff.changes, @r#"
    [
        ObjectRemoved {
            name: "Query",
        },
        EnumAdded {
            name: "MyEnum",
        },
        EnumValueAdded {
            name: "A",
            enum_name: "MyEnum",
        },
        EnumValueAdded {
            name: "B",
            enum_name: "MyEnum",
        },
    ]
    "#);
}

#[test]
fn removed_fields_inside_removed_input_objects() {
    let source = r#"
        type Query {
            hello: String!
        }

        input MyInput {
            a: Int!
            b: String!
        }
    "#;

    let target = r#"
        type Query {
            hello: String!
        }
    "#;

    let diff = diff_with_config(
        source,
        target,
        DiffConfig::default().with_removals_inside_type_definitions(true),
    )
    .unwrap();

    insta::assert_debug_snapshot!(diff.changes, @r#"
    [
        InputObjectRemoved {
            name: "MyInput",
        },
        InputFieldRemoved {
            name: "a",
            container: "MyInput",
        },
        InputFieldRemoved {
            name: "b",
            container: "MyInput",
        },
    ]
    "#);

    let diff = graphql_schema_graph_diff::diff(source, target).unwrap();

    insta::assert_debug_snapshot!(diff.changes, @r#"
    [
        InputObjectRemoved {
            name: "MyInput",
        },
    ]
    "#);
}

#[test]
fn default_config() {
    let config = DiffConfig::default();

    assert!(!config.additions_inside_type_definitions());
    assert!(!config.removals_inside_type_definitions());
    assert_eq!(config.search_budget().max_expansions, 200_000);
    assert_eq!(config.search_budget().time_limit, None);
    assert!(config.worker_threads() >= 1);
}
