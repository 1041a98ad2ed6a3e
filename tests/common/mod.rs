#![allow(dead_code)]

use std::rc::Rc;

use chrono::NaiveDate;

use recordgrid::io::store::{KeyValueStore, MemoryStore};
use recordgrid::state::grid::{Grid, GridConfig};
use recordgrid::state::projection::PaginationMode;
use recordgrid::state::statement::{self, CalculationType, Statement, StatementStatus};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn statement(id: u64, property: &str, owner: &str) -> Statement {
    Statement {
        id,
        owner_id: id % 3 + 1,
        owner_name: owner.to_string(),
        property_id: Some(id),
        property_name: property.to_string(),
        group_name: None,
        period_start: date(2026, 1, 1),
        period_end: date(2026, 1, 31),
        status: StatementStatus::Draft,
        calculation_type: CalculationType::Checkout,
        total_revenue: 1000.0 + id as f64,
        net_payout: 800.0,
        warnings: Vec::new(),
    }
}

/// `count` statements named "Property 01".."Property NN".
pub fn statements(count: u64) -> Vec<Statement> {
    (1..=count)
        .map(|id| statement(id, &format!("Property {id:02}"), "Owner"))
        .collect()
}

pub fn memory_store() -> Rc<dyn KeyValueStore> {
    Rc::new(MemoryStore::new())
}

pub fn grid_with(store: Rc<dyn KeyValueStore>, mode: PaginationMode) -> Grid<Statement> {
    let config = GridConfig::new(statement::GRID_KEY, mode);
    Grid::new(config, statement::statement_columns(), store)
}

pub fn client_grid(records: Vec<Statement>) -> Grid<Statement> {
    let mut grid = grid_with(memory_store(), PaginationMode::Client);
    grid.set_records(records, 0);
    grid
}

pub fn ids(records: &[&Statement]) -> Vec<u64> {
    records.iter().map(|s| s.id).collect()
}
