#![allow(unused_crate_dependencies)]

use std::num::NonZeroUsize;

use graphql_schema_graph_diff::{
    diff_schemas_detailed, DiffConfig, EditOperationKind, SchemaChange, SearchBudget, TypeChangeDetail, TypeSystem,
};
use indoc::indoc;
use pretty_assertions::assert_eq;

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

const RENAMES_OLD: &str = indoc! {r#"
    type Query {
        user(id: ID!): User
    }

    type User {
        id: ID!
        name: String
    }

    enum Status {
        DRAFT
        PUBLISHED
    }
"#};

const RENAMES_NEW: &str = indoc! {r#"
    type Query {
        account(id: ID!): Account
    }

    type Account {
        id: ID!
        displayName: String
    }

    enum State {
        DRAFT
        LIVE
    }
"#};

fn parse(sdl: &str) -> TypeSystem {
    TypeSystem::from_sdl(sdl).unwrap()
}

fn workers(count: usize) -> NonZeroUsize {
    NonZeroUsize::new(count).unwrap()
}

#[test]
fn worker_count_does_not_change_the_result() {
    let (old, new) = (parse(RENAMES_OLD), parse(RENAMES_NEW));

    let reports: Vec<_> = [1, 2, 4]
        .into_iter()
        .map(|count| {
            let config = DiffConfig::default().with_worker_threads(workers(count));
            diff_schemas_detailed(&old, &new, &config).unwrap()
        })
        .collect();

    assert!(!reports[0].edit_script.is_approximate());

    for report in &reports[1..] {
        assert_eq!(report.edit_script, reports[0].edit_script);
        assert_eq!(report.diff, reports[0].diff);
    }
}

#[test]
fn renamed_field_is_a_single_vertex_change() {
    let old = parse("type Query { user: String }");
    let new = parse("type Query { person: String }");

    let report = diff_schemas_detailed(&old, &new, &DiffConfig::default()).unwrap();

    let kinds: Vec<_> = report.edit_script.operations().iter().map(|op| op.kind()).collect();
    assert_eq!(kinds, [EditOperationKind::ChangeVertex]);
    assert_eq!(report.edit_script.cost(), 1);

    assert_eq!(
        report.diff.changes,
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
fn renamed_types_keep_their_contents_matched() {
    let (old, new) = (parse(RENAMES_OLD), parse(RENAMES_NEW));
    let config = DiffConfig::default().with_worker_threads(workers(1));

    let report = diff_schemas_detailed(&old, &new, &config).unwrap();

    let renamed: Vec<_> = report
        .diff
        .changes
        .iter()
        .filter_map(|change| match change {
            SchemaChange::EnumChanged { name, details } => Some((name.as_str(), details.clone())),
            _ => None,
        })
        .collect();

    assert_eq!(
        renamed,
        vec![(
            "State",
            vec![TypeChangeDetail::Renamed {
                old_name: "Status".to_owned()
            }]
        )]
    );

    assert!(report
        .edit_script
        .operations()
        .iter()
        .all(|operation| operation.kind() != EditOperationKind::DeleteVertex));
}

#[test]
fn exhausted_budget_falls_back_to_the_anchored_mapping() {
    let old = parse("type Query { user: String }");
    let new = parse("type Query { person: String }");

    let config = DiffConfig::default()
        .with_worker_threads(workers(1))
        .with_search_budget(SearchBudget::new(0));

    let report = diff_schemas_detailed(&old, &new, &config).unwrap();

    assert!(report.edit_script.is_approximate());
    assert!(report.diff.approximate);
    assert!(report.edit_script.operations().iter().all(|operation| !matches!(
        operation.kind(),
        EditOperationKind::ChangeVertex | EditOperationKind::ChangeEdge
    )));

    let mut changes = report.diff.changes.clone();
    changes.sort_by(|a, b| a.name().cmp(b.name()));

    assert_eq!(
        changes,
        vec![
            SchemaChange::FieldAdded {
                name: "person".to_owned(),
                container: "Query".to_owned(),
            },
            SchemaChange::FieldRemoved {
                name: "user".to_owned(),
                container: "Query".to_owned(),
            },
        ]
    );
}

#[test]
fn schema_diffed_against_itself_has_an_empty_script() {
    let schema = parse(RENAMES_OLD);

    let report = diff_schemas_detailed(&schema, &schema, &DiffConfig::default()).unwrap();

    assert!(report.edit_script.is_empty());
    assert!(report.diff.is_empty());
    assert_eq!(report.old_graph.vertex_count(), report.new_graph.vertex_count());
    assert_eq!(report.old_graph.edge_count(), report.new_graph.edge_count());
}

#[test]
fn generous_time_limit_does_not_exhaust_the_search() {
    let (old, new) = (parse(RENAMES_OLD), parse(RENAMES_NEW));
    let config = DiffConfig::default()
        .with_search_budget(SearchBudget::default().with_time_limit(std::time::Duration::from_secs(600)));

    let report = diff_schemas_detailed(&old, &new, &config).unwrap();

    assert!(!report.diff.approximate);
}

#[test]
fn field_moved_to_another_type_is_removed_and_added() {
    let old = parse("type Foo { id: ID x: String } type Qux { y: String }");
    let new = parse("type Foo { x: String } type Qux { y: String key: ID }");

    let report = diff_schemas_detailed(&old, &new, &DiffConfig::default()).unwrap();

    assert!(!report.diff.approximate);
    assert!(report.diff.unclassified.is_empty());
    assert_eq!(
        report.diff.changes,
        vec![
            SchemaChange::FieldRemoved {
                name: "id".to_owned(),
                container: "Foo".to_owned(),
            },
            SchemaChange::FieldAdded {
                name: "key".to_owned(),
                container: "Qux".to_owned(),
            },
        ]
    );
}

#[test]
fn ten_renamed_fields_fit_in_the_default_budget() {
    let fields = |prefix: &str, ty: &str| {
        (0..10)
            .map(|index| format!("{prefix}{index}: {ty}"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let old = parse(&format!("type Foo {{ {} }}", fields("old", "String")));
    let new = parse(&format!("type Foo {{ {} }}", fields("new", "Int")));

    let report = diff_schemas_detailed(&old, &new, &DiffConfig::default()).unwrap();

    assert!(!report.edit_script.is_approximate());
    assert_eq!(report.edit_script.cost(), 21);

    let expected: Vec<_> = (0..10)
        .map(|index| SchemaChange::FieldChanged {
            name: format!("new{index}"),
            container: "Foo".to_owned(),
            details: vec![TypeChangeDetail::Renamed {
                old_name: format!("old{index}"),
            }],
        })
        .collect();

    assert_eq!(report.diff.changes, expected);
    assert_eq!(report.diff.unclassified.len(), 10);
    assert!(report
        .diff
        .unclassified
        .iter()
        .all(|edge| edge.operation == EditOperationKind::ChangeEdge));
}
