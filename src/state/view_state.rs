use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::io::store::{self, KeyValueStore};
use crate::state::column::ColumnDescriptor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Single,
    Multi,
}

/// Per-grid UI configuration. Visibility, order, sizing and the single
/// sort are persisted; filters and search are session-only.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ViewState {
    pub column_order: Vec<String>,
    pub column_visibility: BTreeMap<String, bool>,
    pub column_sizing: BTreeMap<String, f64>,
    pub sorting: Vec<SortSpec>,
    pub global_filter: String,
    pub column_filters: BTreeMap<String, BTreeSet<String>>,
}

impl ViewState {
    pub fn defaults<R>(columns: &[ColumnDescriptor<R>]) -> Self {
        Self {
            column_order: columns.iter().map(|c| c.id.clone()).collect(),
            ..Self::default()
        }
    }

    pub fn is_visible(&self, column: &str) -> bool {
        self.column_visibility.get(column).copied().unwrap_or(true)
    }

    pub fn width<R>(&self, column: &ColumnDescriptor<R>) -> f64 {
        self.column_sizing
            .get(&column.id)
            .map(|w| column.clamp_width(*w))
            .unwrap_or(column.size)
    }

    /// Returns false when the column is unknown or can't be hidden.
    pub fn set_visibility<R>(
        &mut self,
        columns: &[ColumnDescriptor<R>],
        column: &str,
        visible: bool,
    ) -> bool {
        let Some(descriptor) = find(columns, column) else {
            return false;
        };
        if !descriptor.hideable {
            return false;
        }
        if visible {
            self.column_visibility.remove(column);
        } else {
            self.column_visibility.insert(column.to_string(), false);
        }
        true
    }

    pub fn toggle_visibility<R>(&mut self, columns: &[ColumnDescriptor<R>], column: &str) -> bool {
        let next = !self.is_visible(column);
        self.set_visibility(columns, column, next)
    }

    pub fn show_all_columns(&mut self) {
        self.column_visibility.clear();
    }

    /// Moves `source` to the slot currently held by `target`. Both must be
    /// draggable; anything else leaves the order untouched.
    pub fn move_column<R>(
        &mut self,
        columns: &[ColumnDescriptor<R>],
        source: &str,
        target: &str,
    ) -> bool {
        if source == target {
            return false;
        }
        let draggable = |id: &str| find(columns, id).map(|c| c.draggable).unwrap_or(false);
        if !draggable(source) || !draggable(target) {
            return false;
        }

        let mut order = self.column_order.clone();
        let (Some(from), Some(to)) = (
            order.iter().position(|id| id == source),
            order.iter().position(|id| id == target),
        ) else {
            return false;
        };
        let moved = order.remove(from);
        order.insert(to, moved);

        let order = normalize_order(&order, columns);
        if order == self.column_order {
            return false;
        }
        self.column_order = order;
        true
    }

    pub fn reset_order<R>(&mut self, columns: &[ColumnDescriptor<R>]) {
        self.column_order = columns.iter().map(|c| c.id.clone()).collect();
    }

    /// Stores the clamped width and returns it.
    pub fn set_width<R>(&mut self, column: &ColumnDescriptor<R>, width: f64) -> f64 {
        let width = column.clamp_width(width);
        self.column_sizing.insert(column.id.clone(), width);
        width
    }

    pub fn reset_sizing(&mut self) {
        self.column_sizing.clear();
    }

    /// Single mode keeps one active sort and flips its direction on repeat
    /// clicks. Multi mode flips an existing entry and moves it to the end;
    /// a new column is appended ascending.
    pub fn toggle_sort(&mut self, column: &str, mode: SortMode) {
        let existing = self.sorting.iter().position(|s| s.column == column);
        match mode {
            SortMode::Single => {
                let direction = match existing.map(|idx| self.sorting[idx].direction) {
                    Some(direction) => direction.toggled(),
                    None => SortDirection::Asc,
                };
                self.sorting = vec![SortSpec {
                    column: column.to_string(),
                    direction,
                }];
            }
            SortMode::Multi => {
                let direction = match existing {
                    Some(idx) => self.sorting.remove(idx).direction.toggled(),
                    None => SortDirection::Asc,
                };
                self.sorting.push(SortSpec {
                    column: column.to_string(),
                    direction,
                });
            }
        }
    }

    pub fn clear_sort(&mut self) {
        self.sorting.clear();
    }

    pub fn sort_direction(&self, column: &str) -> Option<SortDirection> {
        self.sorting
            .iter()
            .find(|s| s.column == column)
            .map(|s| s.direction)
    }

    pub fn set_global_filter(&mut self, text: &str) {
        self.global_filter = text.trim().to_string();
    }

    pub fn set_column_filter(&mut self, column: &str, values: BTreeSet<String>) {
        if values.is_empty() {
            self.column_filters.remove(column);
        } else {
            self.column_filters.insert(column.to_string(), values);
        }
    }

    pub fn toggle_filter_value(&mut self, column: &str, value: &str) {
        let mut values = self.column_filters.remove(column).unwrap_or_default();
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        self.set_column_filter(column, values);
    }

    pub fn clear_filters(&mut self) {
        self.global_filter.clear();
        self.column_filters.clear();
    }
}

/// Rebuilds a full permutation of the declared column ids from a persisted
/// order. Unknown and duplicate ids are dropped, missing draggable ids are
/// appended, and non-draggable columns stay in their declared slots.
pub fn normalize_order<R>(persisted: &[String], columns: &[ColumnDescriptor<R>]) -> Vec<String> {
    let draggable: Vec<&str> = columns
        .iter()
        .filter(|c| c.draggable)
        .map(|c| c.id.as_str())
        .collect();

    let mut seen = BTreeSet::new();
    let mut moving: Vec<String> = persisted
        .iter()
        .filter(|id| draggable.contains(&id.as_str()))
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();
    for id in &draggable {
        if !seen.contains(id) {
            moving.push(id.to_string());
        }
    }

    let mut moving = moving.into_iter();
    columns
        .iter()
        .map(|c| {
            if c.draggable {
                moving.next().unwrap_or_else(|| c.id.clone())
            } else {
                c.id.clone()
            }
        })
        .collect()
}

fn find<'a, R>(columns: &'a [ColumnDescriptor<R>], id: &str) -> Option<&'a ColumnDescriptor<R>> {
    columns.iter().find(|c| c.id == id)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slice {
    Visibility,
    Order,
    Sizing,
    Sort,
}

/// Persists view-state slices under `<grid>_column_{visibility|order|sizing}`
/// and `<grid>_sort_{field|direction}`, one key per slice.
#[derive(Clone)]
pub struct ViewStateStore {
    grid_key: String,
    store: Rc<dyn KeyValueStore>,
}

impl std::fmt::Debug for ViewStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewStateStore")
            .field("grid_key", &self.grid_key)
            .finish_non_exhaustive()
    }
}

impl ViewStateStore {
    pub fn new(grid_key: impl Into<String>, store: Rc<dyn KeyValueStore>) -> Self {
        Self {
            grid_key: grid_key.into(),
            store,
        }
    }

    pub fn grid_key(&self) -> &str {
        &self.grid_key
    }

    pub fn key(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.grid_key)
    }

    /// Never fails: every slice that is absent or corrupt falls back to the
    /// descriptor defaults on its own.
    pub fn load<R>(&self, columns: &[ColumnDescriptor<R>]) -> ViewState {
        let mut state = ViewState::defaults(columns);
        let backend = self.store.as_ref();

        if let Some(visibility) =
            store::load_slice::<BTreeMap<String, bool>>(backend, &self.key("column_visibility"))
        {
            state.column_visibility = visibility
                .into_iter()
                .filter(|(id, visible)| {
                    !visible && find(columns, id).map(|c| c.hideable).unwrap_or(false)
                })
                .collect();
        }

        if let Some(order) = store::load_slice::<Vec<String>>(backend, &self.key("column_order")) {
            state.column_order = normalize_order(&order, columns);
        }

        if let Some(sizing) =
            store::load_slice::<BTreeMap<String, f64>>(backend, &self.key("column_sizing"))
        {
            state.column_sizing = sizing
                .into_iter()
                .filter_map(|(id, width)| {
                    let column = find(columns, &id)?;
                    column.resizable.then(|| (id, column.clamp_width(width)))
                })
                .collect();
        }

        let field = store::load_slice::<String>(backend, &self.key("sort_field"));
        let direction = store::load_slice::<SortDirection>(backend, &self.key("sort_direction"));
        if let Some(field) = field {
            if find(columns, &field).map(|c| c.sortable).unwrap_or(false) {
                state.sorting = vec![SortSpec {
                    column: field,
                    direction: direction.unwrap_or(SortDirection::Asc),
                }];
            }
        }

        state
    }

    pub fn save(&self, state: &ViewState, slice: Slice) {
        let backend = self.store.as_ref();
        match slice {
            Slice::Visibility => store::save_slice(
                backend,
                &self.key("column_visibility"),
                &state.column_visibility,
            ),
            Slice::Order => {
                store::save_slice(backend, &self.key("column_order"), &state.column_order)
            }
            Slice::Sizing => {
                store::save_slice(backend, &self.key("column_sizing"), &state.column_sizing)
            }
            Slice::Sort => match state.sorting.first() {
                Some(spec) => {
                    store::save_slice(backend, &self.key("sort_field"), &spec.column);
                    store::save_slice(backend, &self.key("sort_direction"), &spec.direction);
                }
                None => {
                    store::clear_slice(backend, &self.key("sort_field"));
                    store::clear_slice(backend, &self.key("sort_direction"));
                }
            },
        }
    }
}
