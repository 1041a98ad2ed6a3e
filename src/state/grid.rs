use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use chrono::NaiveDate;
use tracing::debug;

use crate::io::csv_export::{self, CsvField};
use crate::io::store::KeyValueStore;
use crate::state::column::ColumnDescriptor;
use crate::state::data_model::Record;
use crate::state::interaction::{self, ColumnInteraction, GestureOutcome, HeaderZone};
use crate::state::pagination::{self, PageRequest, PaginationState};
use crate::state::projection::{self, MarkerFilter, PaginationMode, ServerDelegation};
use crate::state::selection::{BulkAction, BulkCoordinator, BulkRequest};
use crate::state::view_state::{Slice, SortMode, SortSpec, ViewState, ViewStateStore};

#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    pub grid_key: String,
    pub mode: PaginationMode,
    pub sort_mode: SortMode,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub resize_handle_width: f64,
    pub drag_threshold: f64,
    /// Facet columns the server filters on in server mode.
    pub server_facets: Vec<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_key: "grid".to_string(),
            mode: PaginationMode::Server,
            sort_mode: SortMode::Single,
            page_size: pagination::DEFAULT_PAGE_SIZE,
            page_size_options: pagination::PAGE_SIZE_OPTIONS.to_vec(),
            resize_handle_width: interaction::RESIZE_HANDLE_WIDTH,
            drag_threshold: interaction::DRAG_THRESHOLD,
            server_facets: Vec::new(),
        }
    }
}

impl GridConfig {
    pub fn new(grid_key: impl Into<String>, mode: PaginationMode) -> Self {
        Self {
            grid_key: grid_key.into(),
            mode,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Query parameters for the host's list request in server mode.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ServerQuery {
    pub page_index: usize,
    pub page_size: usize,
    pub search: Option<String>,
    pub filters: BTreeMap<String, Vec<String>>,
    pub tags: Vec<String>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub sort: Option<SortSpec>,
}

impl ServerQuery {
    /// Flat key/value pairs; list values repeat their key.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("pageIndex".to_string(), self.page_index.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        for (key, values) in &self.filters {
            for value in values {
                pairs.push((key.clone(), value.clone()));
            }
        }
        for tag in &self.tags {
            pairs.push(("tags".to_string(), tag.clone()));
        }
        if let Some((start, end)) = self.date_range {
            pairs.push(("startDate".to_string(), start.format("%Y-%m-%d").to_string()));
            pairs.push(("endDate".to_string(), end.format("%Y-%m-%d").to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sortField".to_string(), sort.column.clone()));
            pairs.push(("sortDirection".to_string(), sort.direction.as_str().to_string()));
        }
        pairs
    }
}

/// Headless record grid: view state, projection, pagination, header
/// gestures and bulk selection over records pushed in by the host.
pub struct Grid<R: Record> {
    config: GridConfig,
    columns: Vec<ColumnDescriptor<R>>,
    store: ViewStateStore,
    view: ViewState,
    records: Vec<R>,
    pagination: PaginationState,
    selection: BulkCoordinator<R::Id>,
    interaction: ColumnInteraction,
    markers: Vec<MarkerFilter<R>>,
    tags: BTreeSet<String>,
    date_range: Option<(NaiveDate, NaiveDate)>,
    load_state: LoadState,
    generation: u64,
}

impl<R: Record> Grid<R> {
    pub fn new(
        config: GridConfig,
        columns: Vec<ColumnDescriptor<R>>,
        store: Rc<dyn KeyValueStore>,
    ) -> Self {
        let store = ViewStateStore::new(config.grid_key.clone(), store);
        let view = store.load(&columns);
        let pagination = PaginationState::new(0, config.page_size, 0);
        let interaction = ColumnInteraction::new(config.resize_handle_width, config.drag_threshold);
        Self {
            config,
            columns,
            store,
            view,
            records: Vec::new(),
            pagination,
            selection: BulkCoordinator::new(),
            interaction,
            markers: Vec::new(),
            tags: BTreeSet::new(),
            date_range: None,
            load_state: LoadState::Idle,
            generation: 0,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn columns(&self) -> &[ColumnDescriptor<R>] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDescriptor<R>> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// Bumped each time the record set is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interaction(&self) -> &ColumnInteraction {
        &self.interaction
    }

    // ---- data lifecycle ----

    pub fn begin_loading(&mut self) {
        self.load_state = LoadState::Loading;
    }

    /// Replaces the record set. `total` is authoritative in server mode and
    /// ignored in client mode. Any selection is dropped.
    ///
    /// In server mode a page that no longer exists under the new `total` is
    /// moved to the last page, and the request for that page is returned so
    /// the host can refetch.
    pub fn set_records(&mut self, records: Vec<R>, total: usize) -> Option<PageRequest> {
        self.records = records;
        self.pagination.total = total;
        self.selection.clear();
        self.interaction.cancel();
        self.load_state = LoadState::Loaded;
        self.generation += 1;
        match self.config.mode {
            PaginationMode::Client => {
                self.clamp_client_page();
                None
            }
            PaginationMode::Server => self.clamp_server_page(),
        }
    }

    /// A failed fetch leaves an empty, still renderable grid.
    pub fn fail_loading(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(grid = %self.config.grid_key, %message, "grid load failed");
        self.records.clear();
        self.pagination.total = 0;
        self.selection.clear();
        self.load_state = LoadState::Failed(message);
        self.generation += 1;
    }

    pub fn retry(&mut self) -> ServerQuery {
        self.load_state = LoadState::Loading;
        self.query()
    }

    // ---- columns ----

    /// Every column in display order, hidden ones included.
    pub fn ordered_columns(&self) -> Vec<&ColumnDescriptor<R>> {
        self.view
            .column_order
            .iter()
            .filter_map(|id| self.column(id))
            .collect()
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor<R>> {
        self.ordered_columns()
            .into_iter()
            .filter(|c| self.view.is_visible(&c.id))
            .collect()
    }

    /// Hideable columns with their checked state, for the columns menu.
    pub fn visibility_menu(&self) -> Vec<(&ColumnDescriptor<R>, bool)> {
        self.ordered_columns()
            .into_iter()
            .filter(|c| c.hideable)
            .map(|c| (c, self.view.is_visible(&c.id)))
            .collect()
    }

    pub fn column_width(&self, id: &str) -> Option<f64> {
        self.column(id).map(|c| self.view.width(c))
    }

    pub fn toggle_column_visibility(&mut self, id: &str) -> bool {
        let changed = self.view.toggle_visibility(&self.columns, id);
        if changed {
            self.store.save(&self.view, Slice::Visibility);
        }
        changed
    }

    pub fn show_all_columns(&mut self) {
        self.view.show_all_columns();
        self.store.save(&self.view, Slice::Visibility);
    }

    pub fn move_column(&mut self, source: &str, target: &str) -> bool {
        let changed = self.view.move_column(&self.columns, source, target);
        if changed {
            self.store.save(&self.view, Slice::Order);
        }
        changed
    }

    pub fn reset_column_order(&mut self) {
        self.view.reset_order(&self.columns);
        self.store.save(&self.view, Slice::Order);
    }

    /// Returns the stored width after clamping, or `None` for a fixed or
    /// unknown column.
    pub fn resize_column(&mut self, id: &str, width: f64) -> Option<f64> {
        let column = self.columns.iter().find(|c| c.id == id && c.resizable)?;
        let width = self.view.set_width(column, width);
        self.store.save(&self.view, Slice::Sizing);
        Some(width)
    }

    pub fn reset_column_widths(&mut self) {
        self.view.reset_sizing();
        self.store.save(&self.view, Slice::Sizing);
    }

    // ---- sort, search and filters ----

    pub fn toggle_sort(&mut self, id: &str) -> bool {
        if !self.column(id).map(|c| c.sortable).unwrap_or(false) {
            return false;
        }
        self.view.toggle_sort(id, self.config.sort_mode);
        if self.config.sort_mode == SortMode::Single {
            self.store.save(&self.view, Slice::Sort);
        }
        true
    }

    pub fn clear_sort(&mut self) {
        self.view.clear_sort();
        self.store.save(&self.view, Slice::Sort);
    }

    pub fn set_search(&mut self, text: &str) {
        if self.view.global_filter == text.trim() {
            return;
        }
        self.view.set_global_filter(text);
        self.filters_changed();
    }

    pub fn set_column_filter(&mut self, column: &str, values: BTreeSet<String>) {
        self.view.set_column_filter(column, values);
        self.filters_changed();
    }

    pub fn toggle_filter_value(&mut self, column: &str, value: &str) {
        self.view.toggle_filter_value(column, value);
        self.filters_changed();
    }

    pub fn clear_filters(&mut self) {
        self.view.clear_filters();
        self.markers.clear();
        self.tags.clear();
        self.date_range = None;
        self.filters_changed();
    }

    pub fn set_tags(&mut self, tags: impl IntoIterator<Item = String>) {
        self.tags = tags.into_iter().collect();
        self.filters_changed();
    }

    pub fn set_date_range(&mut self, range: Option<(NaiveDate, NaiveDate)>) {
        self.date_range = range;
        self.filters_changed();
    }

    pub fn add_marker(&mut self, marker: MarkerFilter<R>) {
        self.markers.retain(|m| m.id != marker.id);
        self.markers.push(marker);
        self.filters_changed();
    }

    pub fn remove_marker(&mut self, id: &str) {
        self.markers.retain(|m| m.id != id);
        self.filters_changed();
    }

    pub fn markers(&self) -> &[MarkerFilter<R>] {
        &self.markers
    }

    pub fn facet_values(&self, column: &str) -> Vec<String> {
        self.column(column)
            .map(|c| projection::facet_values(&self.records, c))
            .unwrap_or_default()
    }

    fn filters_changed(&mut self) {
        self.selection.clear();
        self.pagination.page_index = 0;
    }

    // ---- projection and pagination ----

    fn delegation(&self) -> ServerDelegation {
        ServerDelegation {
            facet_columns: self.config.server_facets.clone(),
        }
    }

    /// Indices of every record passing the filters, in display order.
    pub fn projected_indices(&self) -> Vec<usize> {
        projection::project(
            &self.records,
            &self.columns,
            &self.view,
            &self.markers,
            self.config.mode,
            &self.delegation(),
        )
    }

    /// The filtered and sorted view across all locally held records.
    pub fn filtered_records(&self) -> Vec<&R> {
        self.projected_indices()
            .into_iter()
            .map(|idx| &self.records[idx])
            .collect()
    }

    /// Rows for the current page.
    pub fn rows(&self) -> Vec<&R> {
        let indices = self.projected_indices();
        let range = match self.config.mode {
            PaginationMode::Server => 0..indices.len(),
            PaginationMode::Client => self.pagination_state().slice_range(indices.len()),
        };
        indices[range]
            .iter()
            .map(|idx| &self.records[*idx])
            .collect()
    }

    pub fn pagination_state(&self) -> PaginationState {
        match self.config.mode {
            PaginationMode::Server => self.pagination,
            PaginationMode::Client => PaginationState {
                total: self.projected_indices().len(),
                ..self.pagination
            },
        }
    }

    /// Applies a page change and returns the request for the host to fetch
    /// (server mode) or simply re-render (client mode).
    pub fn on_pagination_change(&mut self, page_index: usize, page_size: usize) -> PageRequest {
        let request = self.pagination.request(page_index, page_size);
        self.pagination.apply(request);
        if self.config.mode == PaginationMode::Client {
            self.clamp_client_page();
        }
        request
    }

    pub fn next_page(&mut self) -> Option<PageRequest> {
        let request = self.pagination_state().next_page()?;
        self.pagination.apply(request);
        Some(request)
    }

    pub fn previous_page(&mut self) -> Option<PageRequest> {
        let request = self.pagination_state().previous_page()?;
        self.pagination.apply(request);
        Some(request)
    }

    pub fn go_to_page(&mut self, page_index: usize) -> Option<PageRequest> {
        let request = self.pagination_state().go_to(page_index)?;
        self.pagination.apply(request);
        Some(request)
    }

    fn clamp_server_page(&mut self) -> Option<PageRequest> {
        let count = self.pagination.page_count();
        if count == 0 || self.pagination.page_index < count {
            return None;
        }
        let request = PageRequest {
            page_index: count - 1,
            page_size: self.pagination.page_size,
        };
        debug!(
            grid = %self.config.grid_key,
            from = self.pagination.page_index,
            to = request.page_index,
            "page out of range after reload"
        );
        self.pagination.apply(request);
        Some(request)
    }

    fn clamp_client_page(&mut self) {
        let count = self.pagination_state().page_count();
        if count == 0 {
            self.pagination.page_index = 0;
        } else if self.pagination.page_index >= count {
            self.pagination.page_index = count - 1;
        }
    }

    pub fn query(&self) -> ServerQuery {
        let mut filters = BTreeMap::new();
        for column in &self.config.server_facets {
            if let Some(values) = self.view.column_filters.get(column) {
                filters.insert(column.clone(), values.iter().cloned().collect());
            }
        }
        ServerQuery {
            page_index: self.pagination.page_index,
            page_size: self.pagination.page_size,
            search: (!self.view.global_filter.is_empty()).then(|| self.view.global_filter.clone()),
            filters,
            tags: self.tags.iter().cloned().collect(),
            date_range: self.date_range,
            sort: self.view.sorting.first().cloned(),
        }
    }

    // ---- header gestures ----

    pub fn header_pointer_down(&mut self, id: &str, offset_x: f64, client_x: f64) -> HeaderZone {
        let Some(column) = self.columns.iter().find(|c| c.id == id) else {
            return HeaderZone::Body;
        };
        let width = self.view.width(column);
        self.interaction
            .pointer_down(column, offset_x, width, client_x)
    }

    pub fn header_pointer_move(&mut self, client_x: f64, hover: Option<&str>) -> Option<f64> {
        let hover = hover.and_then(|id| self.columns.iter().find(|c| c.id == id));
        self.interaction.pointer_move(client_x, hover)
    }

    /// Finishes the gesture and applies its effect.
    pub fn header_pointer_up(&mut self, target: Option<&str>) -> GestureOutcome {
        let target = target.and_then(|id| self.columns.iter().find(|c| c.id == id));
        let outcome = self.interaction.pointer_up(target);
        match &outcome {
            GestureOutcome::SortToggled(column) => {
                self.toggle_sort(column);
            }
            GestureOutcome::Reordered { source, target } => {
                self.move_column(source, target);
            }
            GestureOutcome::Resized { column, width } => {
                self.resize_column(column, *width);
            }
            GestureOutcome::None | GestureOutcome::Cancelled => {}
        }
        outcome
    }

    pub fn cancel_header_gesture(&mut self) -> GestureOutcome {
        self.interaction.cancel()
    }

    // ---- selection and bulk actions ----

    pub fn page_ids(&self) -> Vec<R::Id> {
        self.rows().iter().map(|r| r.record_id()).collect()
    }

    pub fn is_row_selected(&self, id: &R::Id) -> bool {
        self.selection.is_selected(id)
    }

    pub fn toggle_row(&mut self, id: R::Id) {
        self.selection.toggle(id);
    }

    pub fn toggle_all_on_page(&mut self) {
        let ids = self.page_ids();
        self.selection.toggle_all(&ids);
    }

    pub fn is_all_selected(&self) -> bool {
        self.selection.all_selected(&self.page_ids())
    }

    pub fn is_partially_selected(&self) -> bool {
        self.selection.partially_selected(&self.page_ids())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_ids(&self) -> Vec<R::Id> {
        self.selection.selected_ids()
    }

    pub fn selected_count(&self) -> usize {
        self.selection.selected_count()
    }

    pub fn set_bulk_processing(&mut self, processing: bool) {
        self.selection.set_processing(processing);
    }

    pub fn bulk_processing(&self) -> bool {
        self.selection.processing()
    }

    pub fn can_dispatch_bulk(&self) -> bool {
        self.selection.can_dispatch()
    }

    pub fn dispatch_bulk(&self, action: BulkAction) -> Option<BulkRequest<R::Id>> {
        self.selection.dispatch(action)
    }

    /// Dispatches and marks the bulk action in flight in one step, so a
    /// repeated trigger gets `None` until the host clears the flag.
    pub fn start_bulk(&mut self, action: BulkAction) -> Option<BulkRequest<R::Id>> {
        let request = self.selection.dispatch(action)?;
        self.selection.set_processing(true);
        Some(request)
    }

    /// CSV of the filtered view, in the order of `fields`.
    pub fn export_csv(&self, fields: &[CsvField<R>]) -> String {
        csv_export::to_csv(self.filtered_records(), fields)
    }
}
