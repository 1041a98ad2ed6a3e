use std::path::PathBuf;
use std::rc::Rc;

use chrono::{Datelike, NaiveDate};
use dioxus::prelude::*;

use crate::io::store::{FileStore, KeyValueStore};
use crate::state::form::{ModalForm, Notice, NoticeLevel};
use crate::state::grid::{Grid, GridConfig};
use crate::state::projection::PaginationMode;
use crate::state::statement::{
    self, CalculationType, GenerateStatementDraft, Statement, StatementStatus,
};
use crate::ui::actions;
use crate::ui::generate_modal::GenerateModal;
use crate::ui::pagination_bar::PaginationBar;
use crate::ui::table::Table;
use crate::ui::toolbar::Toolbar;

const STYLES: Asset = asset!("/assets/styles.css");

pub const STORE_ENV: &str = "RECORDGRID_STORE";
const DEFAULT_STORE_FILE: &str = "recordgrid-view.json";

pub fn store_path() -> PathBuf {
    std::env::var(STORE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_FILE))
}

pub fn statements_grid(store: Rc<dyn KeyValueStore>) -> Grid<Statement> {
    let mut config = GridConfig::new(statement::GRID_KEY, PaginationMode::Server);
    config.server_facets = vec!["status".to_string()];
    Grid::new(config, statement::statement_columns(), store)
}

#[component]
pub fn App() -> Element {
    let backend = use_signal(demo_statements);
    let grid = use_signal(|| {
        let mut grid = statements_grid(Rc::new(FileStore::new(store_path())));
        let (rows, total) = actions::fetch_page(&demo_statements(), &grid.query());
        grid.set_records(rows, total);
        grid
    });
    let notice = use_signal::<Option<Notice>>(|| None);
    let modal = use_signal(ModalForm::<GenerateStatementDraft>::new);

    let toast = notice.read().as_ref().map(|n| {
        let class = match n.level {
            NoticeLevel::Error => "toast toast-error",
            NoticeLevel::Success => "toast toast-success",
            NoticeLevel::Info => "toast",
        };
        (class, n.message.clone())
    });

    rsx! {
        document::Stylesheet { href: STYLES }
        div { class: "app",
            Toolbar { grid, backend, notice, modal }
            Table { grid, backend }
            PaginationBar { grid, backend }
            if let Some((class, message)) = toast {
                div { class: "{class}", id: "toast", "{message}" }
            }
            GenerateModal { modal, grid, backend, notice }
        }
    }
}

/// Sample statements for the desktop shell.
pub fn demo_statements() -> Vec<Statement> {
    let owners = [(1, "Harbor Holdings"), (2, "Maple & Co"), (3, "J. Rivera")];
    let properties = [
        (1, "Seaside Loft", Some("Coast")),
        (2, "Pine Cabin", Some("Mountain")),
        (3, "Old Mill House", None),
        (4, "Downtown Studio, Unit 4", Some("City")),
        (5, "Lakeview \"Grand\" Suite", Some("Lake")),
    ];
    let base = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap_or_default();

    (0..25u64)
        .map(|i| {
            let (owner_id, owner_name) = owners[(i % 3) as usize];
            let (property_id, property_name, group) = properties[(i % 5) as usize];
            let period_start = base + chrono::Duration::weeks(i as i64);
            let revenue = 800.0 + (i as f64 * 137.5) % 2200.0;
            Statement {
                id: i + 1,
                owner_id,
                owner_name: owner_name.to_string(),
                property_id: Some(property_id),
                property_name: property_name.to_string(),
                group_name: group.map(str::to_string),
                period_start,
                period_end: period_start + chrono::Duration::days(6),
                status: if i % 4 == 0 {
                    StatementStatus::Final
                } else {
                    StatementStatus::Draft
                },
                calculation_type: if period_start.month() % 2 == 0 {
                    CalculationType::Calendar
                } else {
                    CalculationType::Checkout
                },
                total_revenue: revenue,
                net_payout: revenue * 0.8,
                warnings: if i % 6 == 0 {
                    vec!["missing-expenses".to_string()]
                } else {
                    Vec::new()
                },
            }
        })
        .collect()
}
