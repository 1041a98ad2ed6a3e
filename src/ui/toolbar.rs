use chrono::{Datelike, Local, NaiveDate};
use dioxus::prelude::*;

use crate::state::form::{ModalForm, Notice};
use crate::state::grid::Grid;
use crate::state::selection::BulkAction;
use crate::state::statement::{self, GenerateStatementDraft, Statement, StatementStatus};
use crate::ui::actions;

const MISSING_EXPENSES: &str = "missing-expenses";

#[component]
pub fn Toolbar(
    grid: Signal<Grid<Statement>>,
    backend: Signal<Vec<Statement>>,
    notice: Signal<Option<Notice>>,
    modal: Signal<ModalForm<GenerateStatementDraft>>,
) -> Element {
    let mut grid = grid;
    let mut modal = modal;
    let mut show_columns = use_signal(|| false);

    let (search, status_filter, marker_on, columns_menu, selected, can_bulk, processing) = {
        let g = grid.read();
        let status_filter = g
            .view()
            .column_filters
            .get("status")
            .cloned()
            .unwrap_or_default();
        let columns_menu: Vec<(String, String, bool)> = g
            .visibility_menu()
            .into_iter()
            .map(|(c, visible)| (c.id.clone(), c.header.clone(), visible))
            .collect();
        (
            g.view().global_filter.clone(),
            status_filter,
            g.markers().iter().any(|m| m.id.ends_with(MISSING_EXPENSES)),
            columns_menu,
            g.selected_count(),
            g.can_dispatch_bulk(),
            g.bulk_processing(),
        )
    };

    rsx! {
        div { class: "toolbar",
            div { class: "toolbar-group",
                input {
                    class: "toolbar-input",
                    id: "input-search",
                    placeholder: "Search property, owner or group",
                    value: "{search}",
                    oninput: move |evt| {
                        grid.write().set_search(&evt.value());
                        actions::refresh(grid, backend);
                    },
                }
                for status in [StatementStatus::Draft, StatementStatus::Final] {
                    label { class: "toolbar-check",
                        input {
                            r#type: "checkbox",
                            id: format!("filter-status-{}", status.as_str()),
                            checked: status_filter.contains(status.as_str()),
                            onchange: move |_| {
                                grid.write().toggle_filter_value("status", status.as_str());
                                actions::refresh(grid, backend);
                            },
                        }
                        "{status.as_str()}"
                    }
                }
                label { class: "toolbar-check",
                    input {
                        r#type: "checkbox",
                        id: "filter-missing-expenses",
                        checked: marker_on,
                        onchange: move |_| {
                            let marker = statement::warning_marker(MISSING_EXPENSES);
                            let active = grid.read().markers().iter().any(|m| m.id == marker.id);
                            if active {
                                grid.write().remove_marker(&marker.id);
                            } else {
                                grid.write().add_marker(marker);
                            }
                        },
                    }
                    "Missing expenses"
                }
            }
            div { class: "toolbar-separator" }

            div { class: "toolbar-group",
                button {
                    class: "toolbar-btn",
                    id: "btn-columns",
                    onclick: move |_| {
                        let open = *show_columns.read();
                        show_columns.set(!open);
                    },
                    "Columns"
                }
                if *show_columns.read() {
                    div { class: "columns-menu", id: "columns-menu",
                        for (id, header, visible) in columns_menu {
                            label { class: "toolbar-check",
                                input {
                                    r#type: "checkbox",
                                    checked: visible,
                                    onchange: move |_| {
                                        grid.write().toggle_column_visibility(&id);
                                    },
                                }
                                "{header}"
                            }
                        }
                        button {
                            class: "link-btn",
                            onclick: move |_| grid.write().show_all_columns(),
                            "Show all"
                        }
                    }
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-reset-order",
                    onclick: move |_| grid.write().reset_column_order(),
                    "Reset order"
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-reset-widths",
                    onclick: move |_| grid.write().reset_column_widths(),
                    "Reset widths"
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-export-view",
                    onclick: move |_| {
                        spawn(async move {
                            actions::export_filtered(grid, notice).await;
                        });
                    },
                    "Export view"
                }
                button {
                    class: "toolbar-btn toolbar-btn-primary",
                    id: "btn-generate",
                    onclick: move |_| modal.write().open(default_generate_draft()),
                    "Generate"
                }
            }

            if selected > 0 {
                div { class: "toolbar-separator" }
                div { class: "toolbar-group bulk-actions", id: "bulk-actions",
                    span { class: "selected-count", "{selected} selected" }
                    for action in BulkAction::all().iter().copied() {
                        button {
                            class: if action.is_destructive() { "toolbar-btn danger" } else { "toolbar-btn" },
                            id: format!("btn-bulk-{}", action.name()),
                            disabled: !can_bulk,
                            onclick: move |_| {
                                let Some(request) = grid.write().start_bulk(action) else {
                                    return;
                                };
                                spawn(async move {
                                    actions::run_bulk(grid, backend, notice, request).await;
                                });
                            },
                            "{action.label()}"
                        }
                    }
                    if processing {
                        span { class: "bulk-processing", "Working…" }
                    }
                }
            }
        }
    }
}

/// Seeds the generate modal with the previous calendar month.
fn default_generate_draft() -> GenerateStatementDraft {
    let today = Local::now().date_naive();
    let first_this_month = today.with_day(1).unwrap_or(today);
    let end = first_this_month.pred_opt().unwrap_or(first_this_month);
    let start = NaiveDate::from_ymd_opt(end.year(), end.month(), 1).unwrap_or(end);
    GenerateStatementDraft {
        start_date: Some(start),
        end_date: Some(end),
        ..GenerateStatementDraft::default()
    }
}
