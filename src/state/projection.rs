use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::state::column::ColumnDescriptor;
use crate::state::data_model;
use crate::state::view_state::{SortDirection, ViewState};

/// Where search and facet filters are evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PaginationMode {
    /// The host sends search and status filters upstream and pushes one
    /// page of already-filtered records.
    #[default]
    Server,
    /// All records are in memory; filtering and slicing happen locally.
    Client,
}

/// An ad-hoc predicate over computed record fields. Always client-side.
pub struct MarkerFilter<R> {
    pub id: String,
    pub label: String,
    predicate: Rc<dyn Fn(&R) -> bool>,
}

impl<R> Clone for MarkerFilter<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            predicate: Rc::clone(&self.predicate),
        }
    }
}

impl<R> fmt::Debug for MarkerFilter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerFilter")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl<R> MarkerFilter<R> {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        predicate: impl Fn(&R) -> bool + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            predicate: Rc::new(predicate),
        }
    }

    pub fn matches(&self, record: &R) -> bool {
        (self.predicate)(record)
    }
}

/// Column ids whose facet filters the server applies in server mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerDelegation {
    pub facet_columns: Vec<String>,
}

/// Returns indices into `records` for the rows to render, in display order.
/// Inputs are never mutated.
pub fn project<R>(
    records: &[R],
    columns: &[ColumnDescriptor<R>],
    view: &ViewState,
    markers: &[MarkerFilter<R>],
    mode: PaginationMode,
    delegation: &ServerDelegation,
) -> Vec<usize> {
    let needle = view.global_filter.to_lowercase();
    let search_locally = mode == PaginationMode::Client && !needle.is_empty();
    let searchable: Vec<&ColumnDescriptor<R>> = columns.iter().filter(|c| c.searchable).collect();

    let facets: Vec<(&ColumnDescriptor<R>, &BTreeSet<String>)> = view
        .column_filters
        .iter()
        .filter(|(_, allowed)| !allowed.is_empty())
        .filter(|(id, _)| {
            mode == PaginationMode::Client || !delegation.facet_columns.contains(*id)
        })
        .filter_map(|(id, allowed)| {
            columns
                .iter()
                .find(|c| &c.id == id)
                .map(|column| (column, allowed))
        })
        .collect();

    let mut rows: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| markers.iter().all(|m| m.matches(record)))
        .filter(|(_, record)| {
            !search_locally
                || searchable
                    .iter()
                    .any(|c| data_model::value_contains(&c.value(record), &needle))
        })
        .filter(|(_, record)| {
            facets.iter().all(|(column, allowed)| {
                allowed.contains(&data_model::display_value(&column.value(record)))
            })
        })
        .map(|(idx, _)| idx)
        .collect();

    let sorts: Vec<(&ColumnDescriptor<R>, SortDirection)> = view
        .sorting
        .iter()
        .filter_map(|spec| {
            columns
                .iter()
                .find(|c| c.id == spec.column && c.sortable)
                .map(|c| (c, spec.direction))
        })
        .collect();

    if !sorts.is_empty() {
        // sort_by is stable: equal keys keep their input order in both directions.
        rows.sort_by(|a, b| {
            sorts
                .iter()
                .fold(Ordering::Equal, |acc, (column, direction)| {
                    acc.then_with(|| {
                        let ord = data_model::compare_values(
                            &column.value(&records[*a]),
                            &column.value(&records[*b]),
                        );
                        match direction {
                            SortDirection::Asc => ord,
                            SortDirection::Desc => ord.reverse(),
                        }
                    })
                })
        });
    }

    rows
}

/// Sorted distinct display values of a column, for facet checkboxes.
pub fn facet_values<R>(records: &[R], column: &ColumnDescriptor<R>) -> Vec<String> {
    let values: BTreeSet<String> = records
        .iter()
        .map(|record| data_model::display_value(&column.value(record)))
        .collect();
    values.into_iter().collect()
}
