use dioxus::prelude::*;

use crate::state::data_model::Record;
use crate::state::grid::{Grid, LoadState};
use crate::state::interaction::GestureOutcome;
use crate::state::statement::{self, Statement};
use crate::state::view_state::SortDirection;
use crate::ui::actions;

#[derive(Clone, PartialEq)]
struct HeaderView {
    id: String,
    label: String,
    width: f64,
    class: String,
}

#[derive(Clone, PartialEq)]
struct RowView {
    id: u64,
    selected: bool,
    cells: Vec<(String, String)>,
}

#[component]
pub fn Table(grid: Signal<Grid<Statement>>, backend: Signal<Vec<Statement>>) -> Element {
    let mut grid = grid;
    let mut backend = backend;
    let mut hover = use_signal::<Option<String>>(|| None);

    let (headers, rows, load_state, all_selected, partial) = {
        let g = grid.read();
        let interaction = g.interaction();
        let headers: Vec<HeaderView> = g
            .visible_columns()
            .into_iter()
            .map(|c| {
                let live_width = interaction
                    .resizing_column()
                    .filter(|(id, _)| *id == c.id)
                    .map(|(_, w)| w);
                HeaderView {
                    id: c.id.clone(),
                    label: c.header.clone(),
                    width: live_width.unwrap_or_else(|| g.view().width(c)),
                    class: header_class(
                        c.sortable,
                        g.view().sort_direction(&c.id),
                        interaction.dragging_source() == Some(c.id.as_str()),
                        interaction.is_valid_drop_target(c),
                        interaction.drop_target() == Some(c.id.as_str()),
                    ),
                }
            })
            .collect();
        let columns = g.visible_columns();
        let rows: Vec<RowView> = g
            .rows()
            .into_iter()
            .map(|record| RowView {
                id: record.record_id(),
                selected: g.is_row_selected(&record.record_id()),
                cells: columns
                    .iter()
                    .map(|c| (c.id.clone(), c.render(record)))
                    .collect(),
            })
            .collect();
        (
            headers,
            rows,
            g.load_state().clone(),
            g.is_all_selected(),
            g.is_partially_selected(),
        )
    };

    if let LoadState::Failed(message) = load_state {
        return rsx! {
            div { class: "load-error", id: "load-error",
                p { "Could not load statements: {message}" }
                button {
                    class: "toolbar-btn",
                    id: "btn-retry",
                    onclick: move |_| {
                        grid.write().retry();
                        actions::refresh(grid, backend);
                    },
                    "Retry"
                }
            }
        };
    }

    rsx! {
        div {
            class: "table-container",
            id: "table-container",
            onmousemove: move |evt| {
                if grid.read().interaction().is_idle() {
                    return;
                }
                let x = evt.client_coordinates().x;
                let target = hover.read().clone();
                grid.write().header_pointer_move(x, target.as_deref());
            },
            onmouseup: move |_| {
                if !grid.read().interaction().is_idle() {
                    let outcome = grid.write().header_pointer_up(None);
                    after_gesture(outcome, grid, backend);
                }
            },
            onmouseleave: move |_| {
                grid.write().cancel_header_gesture();
            },
            table {
                thead {
                    tr {
                        for header in headers {
                            th {
                                key: "{header.id}",
                                class: "{header.class}",
                                id: format!("col-{}", header.id),
                                style: "width: {header.width}px; min-width: {header.width}px;",
                                onmouseenter: {
                                    let id = header.id.clone();
                                    move |_| hover.set(Some(id.clone()))
                                },
                                onmousedown: {
                                    let id = header.id.clone();
                                    move |evt: MouseEvent| {
                                        if id == statement::SELECT_COLUMN {
                                            return;
                                        }
                                        let offset = evt.element_coordinates().x;
                                        let x = evt.client_coordinates().x;
                                        grid.write().header_pointer_down(&id, offset, x);
                                    }
                                },
                                onmouseup: {
                                    let id = header.id.clone();
                                    move |_| {
                                        if !grid.read().interaction().is_idle() {
                                            let outcome = grid.write().header_pointer_up(Some(&id));
                                            after_gesture(outcome, grid, backend);
                                        }
                                    }
                                },
                                if header.id == statement::SELECT_COLUMN {
                                    input {
                                        r#type: "checkbox",
                                        id: "select-all",
                                        checked: all_selected,
                                        class: if partial { "partial" } else { "" },
                                        onchange: move |_| grid.write().toggle_all_on_page(),
                                    }
                                } else {
                                    span { class: "header-label", "{header.label}" }
                                    span { class: "resize-handle" }
                                }
                            }
                        }
                    }
                }
                tbody {
                    if rows.is_empty() {
                        tr {
                            td { class: "empty-message", id: "empty-message", "No statements found." }
                        }
                    }
                    for (display_index, row) in rows.into_iter().enumerate() {
                        tr {
                            key: "{row.id}",
                            class: row_class(display_index, row.selected),
                            id: format!("row-{}", row.id),
                            for (column, text) in row.cells {
                                if column == statement::SELECT_COLUMN {
                                    td { class: "row-select",
                                        input {
                                            r#type: "checkbox",
                                            checked: row.selected,
                                            onchange: move |_| grid.write().toggle_row(row.id),
                                        }
                                    }
                                } else if column == statement::ACTIONS_COLUMN {
                                    td { class: "row-actions",
                                        button {
                                            class: "link-btn",
                                            onclick: move |_| {
                                                backend.write().retain(|s| s.id != row.id);
                                                actions::refresh(grid, backend);
                                            },
                                            "Delete"
                                        }
                                    }
                                } else {
                                    td { class: "cell", "{text}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A sort change reorders rows across pages, so the page is refetched.
fn after_gesture(
    outcome: GestureOutcome,
    grid: Signal<Grid<Statement>>,
    backend: Signal<Vec<Statement>>,
) {
    if let GestureOutcome::SortToggled(_) = outcome {
        actions::refresh(grid, backend);
    }
}

fn header_class(
    sortable: bool,
    direction: Option<SortDirection>,
    dragging: bool,
    valid_target: bool,
    hovered_target: bool,
) -> String {
    let mut classes = vec!["header"];
    if sortable {
        classes.push("sortable");
    }
    match direction {
        Some(SortDirection::Asc) => classes.push("sorted-asc"),
        Some(SortDirection::Desc) => classes.push("sorted-desc"),
        None => {}
    }
    if dragging {
        classes.push("drag-source");
    }
    if valid_target {
        classes.push("drop-target");
    }
    if hovered_target {
        classes.push("drop-hover");
    }
    classes.join(" ")
}

fn row_class(display_index: usize, selected: bool) -> String {
    let mut class = if display_index % 2 == 0 { "even" } else { "odd" }.to_string();
    if selected {
        class.push_str(" selected-row");
    }
    class
}
