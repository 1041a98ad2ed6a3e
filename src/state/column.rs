use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::state::data_model;

pub type Accessor<R> = Rc<dyn Fn(&R) -> Value>;
pub type Renderer<R> = Rc<dyn Fn(&R) -> String>;

pub const DEFAULT_SIZE: f64 = 150.0;
pub const DEFAULT_MIN_SIZE: f64 = 40.0;
pub const DEFAULT_MAX_SIZE: f64 = 800.0;

/// One grid column: a stable id, how to read a sort/search key out of a
/// record, width constraints and capability flags.
pub struct ColumnDescriptor<R> {
    pub id: String,
    pub header: String,
    accessor: Accessor<R>,
    render: Option<Renderer<R>>,
    pub size: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub sortable: bool,
    pub hideable: bool,
    pub resizable: bool,
    pub draggable: bool,
    pub searchable: bool,
}

impl<R> Clone for ColumnDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: Rc::clone(&self.accessor),
            render: self.render.clone(),
            size: self.size,
            min_size: self.min_size,
            max_size: self.max_size,
            sortable: self.sortable,
            hideable: self.hideable,
            resizable: self.resizable,
            draggable: self.draggable,
            searchable: self.searchable,
        }
    }
}

impl<R> fmt::Debug for ColumnDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("min_size", &self.min_size)
            .field("max_size", &self.max_size)
            .field("sortable", &self.sortable)
            .field("hideable", &self.hideable)
            .field("draggable", &self.draggable)
            .finish_non_exhaustive()
    }
}

impl<R> ColumnDescriptor<R> {
    pub fn new(
        id: impl Into<String>,
        header: impl Into<String>,
        accessor: impl Fn(&R) -> Value + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: Rc::new(accessor),
            render: None,
            size: DEFAULT_SIZE,
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            sortable: true,
            hideable: true,
            resizable: true,
            draggable: true,
            searchable: false,
        }
    }

    /// A structural column such as the row selector or the actions cell.
    /// It can't be hidden, sorted, dragged or searched.
    pub fn fixed(id: impl Into<String>, header: impl Into<String>, size: f64) -> Self {
        let mut column = Self::new(id, header, |_: &R| Value::Null);
        column.size = size;
        column.min_size = size;
        column.max_size = size;
        column.sortable = false;
        column.hideable = false;
        column.resizable = false;
        column.draggable = false;
        column
    }

    pub fn with_render(mut self, render: impl Fn(&R) -> String + 'static) -> Self {
        self.render = Some(Rc::new(render));
        self
    }

    /// Width constraints. `min` and `max` are swapped if given reversed, and
    /// `size` is pulled into the range.
    pub fn with_size(mut self, size: f64, min: f64, max: f64) -> Self {
        let (min, max) = ordered_bounds(min, max);
        self.min_size = min;
        self.max_size = max;
        let size = if size.is_nan() { DEFAULT_SIZE } else { size };
        self.size = size.clamp(min, max);
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn not_hideable(mut self) -> Self {
        self.hideable = false;
        self.draggable = false;
        self
    }

    pub fn not_resizable(mut self) -> Self {
        self.resizable = false;
        self
    }

    pub fn value(&self, record: &R) -> Value {
        (self.accessor)(record)
    }

    pub fn render(&self, record: &R) -> String {
        match &self.render {
            Some(render) => render(record),
            None => data_model::display_value(&self.value(record)),
        }
    }

    /// `(min, max)` with NaN bounds opened up and reversed bounds swapped.
    pub fn width_bounds(&self) -> (f64, f64) {
        ordered_bounds(self.min_size, self.max_size)
    }

    pub fn clamp_width(&self, width: f64) -> f64 {
        let (min, max) = self.width_bounds();
        let width = if width.is_nan() { self.size } else { width };
        if width.is_nan() {
            return min;
        }
        width.clamp(min, max)
    }
}

fn ordered_bounds(min: f64, max: f64) -> (f64, f64) {
    let min = if min.is_nan() { 0.0 } else { min };
    let max = if max.is_nan() { f64::INFINITY } else { max };
    if min <= max {
        (min, max)
    } else {
        (max, min)
    }
}
