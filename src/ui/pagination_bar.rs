use dioxus::prelude::*;

use crate::state::grid::Grid;
use crate::state::pagination::PageItem;
use crate::state::statement::Statement;
use crate::ui::actions;

#[component]
pub fn PaginationBar(grid: Signal<Grid<Statement>>, backend: Signal<Vec<Statement>>) -> Element {
    let mut grid = grid;

    let (state, items, options) = {
        let g = grid.read();
        let state = g.pagination_state();
        (state, state.page_items(), g.config().page_size_options.clone())
    };
    let range_label = match state.row_range_label() {
        Some((start, end, total)) => format!("Showing {start} to {end} of {total}"),
        None => "No results".to_string(),
    };

    rsx! {
        div { class: "pagination", id: "pagination",
            span { class: "pagination-range", "{range_label}" }
            select {
                class: "toolbar-select toolbar-select-sm",
                id: "select-page-size",
                value: "{state.page_size}",
                onchange: move |evt| {
                    if let Ok(size) = evt.value().parse::<usize>() {
                        let index = grid.read().pagination_state().page_index;
                        grid.write().on_pagination_change(index, size);
                        actions::refresh(grid, backend);
                    }
                },
                for size in options {
                    option { value: "{size}", "{size} / page" }
                }
            }
            button {
                class: "toolbar-btn",
                id: "btn-prev-page",
                disabled: !state.can_previous_page(),
                onclick: move |_| {
                    if grid.write().previous_page().is_some() {
                        actions::refresh(grid, backend);
                    }
                },
                "Prev"
            }
            for item in items {
                if let PageItem::Page(index) = item {
                    button {
                        class: if index == state.page_index { "page-btn current" } else { "page-btn" },
                        onclick: move |_| {
                            if grid.write().go_to_page(index).is_some() {
                                actions::refresh(grid, backend);
                            }
                        },
                        "{index + 1}"
                    }
                } else {
                    span { class: "page-ellipsis", "…" }
                }
            }
            button {
                class: "toolbar-btn",
                id: "btn-next-page",
                disabled: !state.can_next_page(),
                onclick: move |_| {
                    if grid.write().next_page().is_some() {
                        actions::refresh(grid, backend);
                    }
                },
                "Next"
            }
        }
    }
}
