mod common;

use std::collections::BTreeSet;

use recordgrid::state::grid::{Grid, GridConfig, LoadState};
use recordgrid::state::pagination::PAGE_SIZE_OPTIONS;
use recordgrid::state::projection::PaginationMode;
use recordgrid::state::statement;

use common::{date, grid_with, memory_store, statements};

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

#[test]
fn test_config_defaults() {
    let config = GridConfig::default();
    assert_eq!(config.mode, PaginationMode::Server);
    assert_eq!(config.page_size, 15);
    assert_eq!(config.page_size_options, PAGE_SIZE_OPTIONS.to_vec());
}

#[test]
fn test_server_query_pairs() {
    let mut config = GridConfig::new(statement::GRID_KEY, PaginationMode::Server);
    config.server_facets = vec!["status".to_string()];
    let mut grid = Grid::new(config, statement::statement_columns(), memory_store());

    grid.set_search(" seaside ");
    grid.set_column_filter(
        "status",
        BTreeSet::from(["draft".to_string(), "final".to_string()]),
    );
    grid.set_column_filter("ownerName", BTreeSet::from(["Harbor".to_string()]));
    grid.set_tags(vec!["coast".to_string()]);
    grid.set_date_range(Some((date(2026, 1, 1), date(2026, 1, 31))));
    grid.toggle_sort("totalRevenue");
    grid.toggle_sort("totalRevenue");
    grid.set_records(statements(15), 40);
    grid.on_pagination_change(1, 15);

    assert_eq!(
        grid.query().to_query_pairs(),
        vec![
            pair("pageIndex", "1"),
            pair("pageSize", "15"),
            pair("search", "seaside"),
            pair("status", "draft"),
            pair("status", "final"),
            pair("tags", "coast"),
            pair("startDate", "2026-01-01"),
            pair("endDate", "2026-01-31"),
            pair("sortField", "totalRevenue"),
            pair("sortDirection", "desc"),
        ]
    );
}

#[test]
fn test_empty_query_has_only_paging() {
    let grid = grid_with(memory_store(), PaginationMode::Server);
    assert_eq!(
        grid.query().to_query_pairs(),
        vec![pair("pageIndex", "0"), pair("pageSize", "15")]
    );
}

#[test]
fn test_failed_load_then_retry() {
    let mut grid = grid_with(memory_store(), PaginationMode::Server);
    grid.set_records(statements(5), 5);
    grid.toggle_row(1);
    let generation = grid.generation();

    grid.fail_loading("timeout");
    assert_eq!(grid.load_state(), &LoadState::Failed("timeout".to_string()));
    assert!(grid.rows().is_empty());
    assert_eq!(grid.selected_count(), 0);
    assert_eq!(grid.pagination_state().page_count(), 0);
    assert!(grid.generation() > generation);

    let query = grid.retry();
    assert_eq!(grid.load_state(), &LoadState::Loading);
    assert_eq!(query.page_index, 0);

    grid.set_records(statements(5), 5);
    assert_eq!(grid.load_state(), &LoadState::Loaded);
}

#[test]
fn test_visibility_menu_lists_hideable_columns() {
    let mut grid = grid_with(memory_store(), PaginationMode::Server);
    grid.toggle_column_visibility("groupName");

    let menu: Vec<(String, bool)> = grid
        .visibility_menu()
        .into_iter()
        .map(|(c, visible)| (c.id.clone(), visible))
        .collect();
    assert_eq!(menu.len(), 9);
    assert!(menu.iter().all(|(id, _)| id != statement::SELECT_COLUMN));
    assert!(menu.contains(&("groupName".to_string(), false)));
    assert!(menu.contains(&("ownerName".to_string(), true)));
}

#[test]
fn test_rows_render_through_columns() {
    let mut grid = grid_with(memory_store(), PaginationMode::Server);
    grid.set_records(statements(1), 1);

    let row = grid.rows()[0];
    let period = grid.column("period").unwrap();
    assert_eq!(period.render(row), "2026-01-01 - 2026-01-31");
    let revenue = grid.column("totalRevenue").unwrap();
    assert_eq!(revenue.render(row), "1001.00");
}

#[test]
fn test_clear_filters_resets_everything_session_only() {
    let mut grid = grid_with(memory_store(), PaginationMode::Client);
    grid.set_records(statements(30), 0);
    grid.set_search("property 2");
    grid.add_marker(statement::warning_marker("missing-expenses"));
    grid.set_tags(vec!["coast".to_string()]);
    assert!(grid.filtered_records().is_empty());

    grid.clear_filters();
    assert!(grid.markers().is_empty());
    assert!(grid.query().tags.is_empty());
    assert_eq!(grid.filtered_records().len(), 30);
}
