mod common;

use recordgrid::state::pagination::{self, PageItem, PageRequest, PaginationState};
use recordgrid::state::projection::PaginationMode;

use common::{client_grid, grid_with, ids, memory_store, statements};

#[test]
fn test_client_pages_of_twenty_five() {
    let mut grid = client_grid(statements(25));

    let state = grid.pagination_state();
    assert_eq!(state.page_size, 15);
    assert_eq!(state.page_count(), 2);
    assert!(state.can_next_page());
    assert!(!state.can_previous_page());
    assert_eq!(ids(&grid.rows()), (1..=15).collect::<Vec<u64>>());

    assert_eq!(
        grid.next_page(),
        Some(PageRequest {
            page_index: 1,
            page_size: 15
        })
    );
    let state = grid.pagination_state();
    assert!(!state.can_next_page());
    assert!(state.can_previous_page());
    assert_eq!(ids(&grid.rows()), (16..=25).collect::<Vec<u64>>());
    assert_eq!(grid.next_page(), None);
}

#[test]
fn test_empty_total_has_no_pages() {
    let state = PaginationState::new(0, 15, 0);
    assert_eq!(state.page_count(), 0);
    assert!(!state.can_next_page());
    assert!(!state.can_previous_page());
    assert_eq!(state.row_range_label(), None);
    assert!(state.page_items().is_empty());
}

#[test]
fn test_page_size_change_resets_index() {
    let state = PaginationState::new(3, 15, 200);
    assert_eq!(
        state.request(3, 50),
        PageRequest {
            page_index: 0,
            page_size: 50
        }
    );
    assert_eq!(
        state.request(5, 15),
        PageRequest {
            page_index: 5,
            page_size: 15
        }
    );
}

#[test]
fn test_server_mode_emits_request_and_keeps_rows() {
    let mut grid = grid_with(memory_store(), PaginationMode::Server);
    grid.set_records(statements(15), 40);

    let state = grid.pagination_state();
    assert_eq!(state.page_count(), 3);
    assert_eq!(grid.rows().len(), 15);

    let request = grid.on_pagination_change(2, 15);
    assert_eq!(request.page_index, 2);
    assert_eq!(grid.query().page_index, 2);

    let request = grid.on_pagination_change(2, 25);
    assert_eq!(request.page_index, 0);
    assert_eq!(grid.query().page_size, 25);
}

#[test]
fn test_client_page_clamped_when_records_shrink() {
    let mut grid = client_grid(statements(40));
    grid.go_to_page(2);
    assert_eq!(grid.pagination_state().page_index, 2);

    grid.set_records(statements(10), 0);
    assert_eq!(grid.pagination_state().page_index, 0);
    assert_eq!(grid.rows().len(), 10);
}

#[test]
fn test_filter_change_returns_to_first_page() {
    let mut grid = client_grid(statements(40));
    grid.go_to_page(1);
    grid.set_search("property");
    assert_eq!(grid.pagination_state().page_index, 0);
}

#[test]
fn test_row_range_label() {
    assert_eq!(
        PaginationState::new(1, 15, 25).row_range_label(),
        Some((16, 25, 25))
    );
    assert_eq!(
        PaginationState::new(0, 15, 25).row_range_label(),
        Some((1, 15, 25))
    );
}

#[test]
fn test_page_items_collapse_gaps() {
    use PageItem::{Ellipsis, Page};

    assert_eq!(pagination::page_items(1, 0), vec![Page(0)]);
    assert_eq!(
        pagination::page_items(3, 1),
        vec![Page(0), Page(1), Page(2)]
    );
    assert_eq!(
        pagination::page_items(10, 0),
        vec![Page(0), Page(1), Ellipsis, Page(9)]
    );
    assert_eq!(
        pagination::page_items(10, 5),
        vec![Page(0), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(9)]
    );
    assert_eq!(
        pagination::page_items(10, 9),
        vec![Page(0), Ellipsis, Page(8), Page(9)]
    );
}

#[test]
fn test_go_to_ignores_out_of_range() {
    let state = PaginationState::new(0, 15, 25);
    assert_eq!(state.go_to(5), None);
    assert_eq!(state.go_to(0), None);
    assert_eq!(state.go_to(1).map(|r| r.page_index), Some(1));
}

#[test]
fn test_server_page_clamped_when_total_shrinks() {
    let mut grid = grid_with(memory_store(), PaginationMode::Server);
    grid.set_records(statements(15), 30);
    grid.next_page();
    assert_eq!(grid.pagination_state().page_index, 1);

    let refetch = grid.set_records(Vec::new(), 15);
    assert_eq!(
        refetch,
        Some(PageRequest {
            page_index: 0,
            page_size: 15
        })
    );
    let state = grid.pagination_state();
    assert!(state.page_index < state.page_count());
    assert!(!state.can_previous_page());
    assert_eq!(grid.query().page_index, 0);

    assert_eq!(grid.set_records(statements(15), 15), None);
    assert_eq!(grid.pagination_state().row_range_label(), Some((1, 15, 15)));
}

#[test]
fn test_server_reload_within_range_keeps_page() {
    let mut grid = grid_with(memory_store(), PaginationMode::Server);
    grid.set_records(statements(15), 45);
    grid.go_to_page(2);
    assert_eq!(grid.set_records(statements(10), 40), None);
    assert_eq!(grid.pagination_state().page_index, 2);
}

#[test]
fn test_row_range_label_past_last_page() {
    assert_eq!(PaginationState::new(1, 15, 15).row_range_label(), None);
    assert_eq!(PaginationState::new(2, 10, 21).row_range_label(), Some((21, 21, 21)));
}
