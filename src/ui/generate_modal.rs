use std::collections::BTreeMap;

use chrono::NaiveDate;
use dioxus::prelude::*;

use crate::state::form::{ModalForm, ModalPhase, Notice};
use crate::state::grid::Grid;
use crate::state::statement::{CalculationType, GenerateStatementDraft, Statement};
use crate::ui::actions;

#[component]
pub fn GenerateModal(
    modal: Signal<ModalForm<GenerateStatementDraft>>,
    grid: Signal<Grid<Statement>>,
    backend: Signal<Vec<Statement>>,
    notice: Signal<Option<Notice>>,
) -> Element {
    let mut modal = modal;

    let (phase, draft, error, progress) = {
        let m = modal.read();
        (
            m.phase(),
            m.draft().clone(),
            m.notice().map(|n| n.message.clone()),
            m.progress(),
        )
    };
    if phase == ModalPhase::Closed {
        return rsx! {};
    }

    let (owners, properties) = {
        let all = backend.read();
        let owners: BTreeMap<u64, String> =
            all.iter().map(|s| (s.owner_id, s.owner_name.clone())).collect();
        let properties: BTreeMap<u64, String> = all
            .iter()
            .filter(|s| draft.owner_id.map(|o| o == s.owner_id).unwrap_or(true))
            .filter_map(|s| s.property_id.map(|p| (p, s.property_name.clone())))
            .collect();
        (owners, properties)
    };
    let submitting = phase == ModalPhase::Submitting;
    let start_value = draft.start_date.map(|d| d.to_string()).unwrap_or_default();
    let end_value = draft.end_date.map(|d| d.to_string()).unwrap_or_default();
    let owner_value = draft.owner_id.map(|o| o.to_string()).unwrap_or_default();

    rsx! {
        div { class: "modal-backdrop", id: "generate-modal",
            div { class: "modal",
                h2 { "Generate statements" }

                label { class: "toolbar-check",
                    input {
                        r#type: "checkbox",
                        id: "generate-all",
                        checked: draft.generate_all,
                        disabled: submitting,
                        onchange: move |evt| {
                            let checked = evt.checked();
                            modal.write().update(|d| d.generate_all = checked);
                        },
                    }
                    "All owners"
                }

                select {
                    class: "toolbar-select",
                    id: "select-owner",
                    disabled: submitting || draft.generate_all,
                    value: "{owner_value}",
                    onchange: move |evt| {
                        let owner = evt.value().parse::<u64>().ok();
                        modal.write().update(|d| {
                            d.owner_id = owner;
                            d.property_ids.clear();
                        });
                    },
                    option { value: "", "Select owner" }
                    for (id, name) in owners {
                        option { value: "{id}", "{name}" }
                    }
                }

                if !draft.generate_all {
                    div { class: "property-list", id: "property-list",
                        for (id, name) in properties {
                            label { class: "toolbar-check",
                                input {
                                    r#type: "checkbox",
                                    checked: draft.property_ids.contains(&id),
                                    disabled: submitting,
                                    onchange: move |_| {
                                        modal.write().update(|d| toggle_property(d, id));
                                    },
                                }
                                "{name}"
                            }
                        }
                    }
                }

                div { class: "date-range",
                    input {
                        r#type: "date",
                        id: "input-start-date",
                        value: "{start_value}",
                        disabled: submitting,
                        onchange: move |evt| {
                            let date = parse_date(&evt.value());
                            modal.write().update(|d| d.start_date = date);
                        },
                    }
                    input {
                        r#type: "date",
                        id: "input-end-date",
                        value: "{end_value}",
                        disabled: submitting,
                        onchange: move |evt| {
                            let date = parse_date(&evt.value());
                            modal.write().update(|d| d.end_date = date);
                        },
                    }
                }

                select {
                    class: "toolbar-select",
                    id: "select-calculation",
                    disabled: submitting,
                    value: "{draft.calculation_type.as_str()}",
                    onchange: move |evt| {
                        let calculation = if evt.value() == CalculationType::Calendar.as_str() {
                            CalculationType::Calendar
                        } else {
                            CalculationType::Checkout
                        };
                        modal.write().update(|d| d.calculation_type = calculation);
                    },
                    option { value: "checkout", "Checkout based" }
                    option { value: "calendar", "Calendar based" }
                }

                if let Some(message) = error {
                    p { class: "form-error", id: "generate-error", "{message}" }
                }

                if let Some(progress) = progress {
                    div { class: "progress", id: "generate-progress",
                        div {
                            class: "progress-bar",
                            style: "width: {progress.percent()}%;",
                        }
                        span { "{progress.current} / {progress.total}" }
                    }
                }

                div { class: "modal-actions",
                    button {
                        class: "toolbar-btn",
                        id: "btn-generate-cancel",
                        onclick: move |_| modal.write().close(),
                        "Close"
                    }
                    button {
                        class: "toolbar-btn toolbar-btn-primary",
                        id: "btn-generate-submit",
                        disabled: submitting,
                        onclick: move |_| {
                            spawn(actions::submit_generate(modal, grid, backend, notice));
                        },
                        if submitting { "Generating…" } else { "Generate" }
                    }
                }
            }
        }
    }
}

fn toggle_property(draft: &mut GenerateStatementDraft, id: u64) {
    match draft.property_ids.iter().position(|p| *p == id) {
        Some(pos) => {
            draft.property_ids.remove(pos);
        }
        None => draft.property_ids.push(id),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
