mod common;

use std::collections::BTreeSet;

use recordgrid::state::projection::{self, PaginationMode, ServerDelegation};
use recordgrid::state::statement::{self, Statement, StatementStatus};
use recordgrid::state::view_state::{SortMode, ViewState};

use common::{client_grid, grid_with, ids, memory_store, statement};

fn mixed_status() -> Vec<Statement> {
    (1..=6)
        .map(|id| {
            let mut s = statement(id, &format!("Property {id}"), "Owner");
            if id % 2 == 0 {
                s.status = StatementStatus::Final;
            }
            s
        })
        .collect()
}

fn project(records: &[Statement], view: &ViewState, mode: PaginationMode) -> Vec<u64> {
    let delegation = ServerDelegation {
        facet_columns: vec!["status".to_string()],
    };
    projection::project(
        records,
        &statement::statement_columns(),
        view,
        &[],
        mode,
        &delegation,
    )
    .into_iter()
    .map(|idx| records[idx].id)
    .collect()
}

#[test]
fn test_no_sort_keeps_input_order() {
    let records = mixed_status();
    let view = ViewState::defaults(&statement::statement_columns());
    assert_eq!(
        project(&records, &view, PaginationMode::Client),
        vec![1, 2, 3, 4, 5, 6]
    );
}

#[test]
fn test_sort_is_stable_in_both_directions() {
    let records = mixed_status();
    let mut view = ViewState::defaults(&statement::statement_columns());

    view.toggle_sort("status", SortMode::Single);
    assert_eq!(
        project(&records, &view, PaginationMode::Client),
        vec![1, 3, 5, 2, 4, 6]
    );

    view.toggle_sort("status", SortMode::Single);
    assert_eq!(
        project(&records, &view, PaginationMode::Client),
        vec![2, 4, 6, 1, 3, 5]
    );
}

#[test]
fn test_string_sort_ignores_case() {
    let records = vec![
        statement(1, "beta", "Owner"),
        statement(2, "Alpha", "Owner"),
        statement(3, "gamma", "Owner"),
    ];
    let mut view = ViewState::defaults(&statement::statement_columns());
    view.toggle_sort("propertyName", SortMode::Single);
    assert_eq!(project(&records, &view, PaginationMode::Client), vec![2, 1, 3]);
}

#[test]
fn test_numeric_sort_descending() {
    let records = common::statements(4);
    let mut view = ViewState::defaults(&statement::statement_columns());
    view.toggle_sort("totalRevenue", SortMode::Single);
    view.toggle_sort("totalRevenue", SortMode::Single);
    assert_eq!(
        project(&records, &view, PaginationMode::Client),
        vec![4, 3, 2, 1]
    );
}

#[test]
fn test_multi_sort_breaks_ties_with_later_keys() {
    let mut records = mixed_status();
    records[0].property_name = "Zulu".to_string();
    let mut view = ViewState::defaults(&statement::statement_columns());
    view.toggle_sort("status", SortMode::Multi);
    view.toggle_sort("propertyName", SortMode::Multi);
    assert_eq!(
        project(&records, &view, PaginationMode::Client),
        vec![3, 5, 1, 2, 4, 6]
    );
}

#[test]
fn test_global_search_matches_searchable_columns_in_client_mode() {
    let mut records = vec![
        statement(1, "Seaside Loft", "Harbor Holdings"),
        statement(2, "Pine Cabin", "Maple & Co"),
        statement(3, "Old Mill", "J. Rivera"),
    ];
    records[2].group_name = Some("Harbor Group".to_string());

    let mut view = ViewState::defaults(&statement::statement_columns());
    view.set_global_filter("  HARBOR ");
    assert_eq!(project(&records, &view, PaginationMode::Client), vec![1, 3]);
}

#[test]
fn test_global_search_skipped_in_server_mode() {
    let records = vec![
        statement(1, "Seaside Loft", "Harbor Holdings"),
        statement(2, "Pine Cabin", "Maple & Co"),
    ];
    let mut view = ViewState::defaults(&statement::statement_columns());
    view.set_global_filter("harbor");
    assert_eq!(project(&records, &view, PaginationMode::Server), vec![1, 2]);
}

#[test]
fn test_delegated_facet_skipped_in_server_mode_only() {
    let records = mixed_status();
    let mut view = ViewState::defaults(&statement::statement_columns());
    view.set_column_filter("status", BTreeSet::from(["final".to_string()]));

    assert_eq!(
        project(&records, &view, PaginationMode::Server),
        vec![1, 2, 3, 4, 5, 6]
    );
    assert_eq!(project(&records, &view, PaginationMode::Client), vec![2, 4, 6]);
}

#[test]
fn test_local_facet_applies_in_server_mode() {
    let records = mixed_status();
    let mut view = ViewState::defaults(&statement::statement_columns());
    view.set_column_filter("ownerName", BTreeSet::from(["Nobody".to_string()]));
    assert!(project(&records, &view, PaginationMode::Server).is_empty());
}

#[test]
fn test_filtering_is_idempotent() {
    let records = mixed_status();
    let mut view = ViewState::defaults(&statement::statement_columns());
    view.set_column_filter("status", BTreeSet::from(["draft".to_string()]));
    view.set_global_filter("property");

    let once = project(&records, &view, PaginationMode::Client);
    let filtered: Vec<Statement> = records
        .iter()
        .filter(|s| once.contains(&s.id))
        .cloned()
        .collect();
    let twice = project(&filtered, &view, PaginationMode::Client);
    assert_eq!(once, twice);
}

#[test]
fn test_marker_filter_runs_in_every_mode() {
    let mut records = mixed_status();
    records[1].warnings = vec!["missing-expenses".to_string()];
    records[4].warnings = vec!["missing-expenses".to_string()];

    let mut grid = grid_with(memory_store(), PaginationMode::Server);
    grid.set_records(records, 6);
    grid.add_marker(statement::warning_marker("missing-expenses"));
    assert_eq!(ids(&grid.rows()), vec![2, 5]);

    grid.remove_marker("warning:missing-expenses");
    assert_eq!(grid.rows().len(), 6);
}

#[test]
fn test_facet_values_are_distinct_and_sorted() {
    let grid = client_grid(mixed_status());
    assert_eq!(grid.facet_values("status"), vec!["draft", "final"]);
    assert!(grid.facet_values("missing").is_empty());
}
