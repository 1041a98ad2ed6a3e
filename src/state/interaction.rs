use tracing::debug;

use crate::state::column::ColumnDescriptor;

pub const RESIZE_HANDLE_WIDTH: f64 = 6.0;
pub const DRAG_THRESHOLD: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderZone {
    Body,
    ResizeHandle,
}

/// Classifies a pointer-down by its offset from the header's left edge.
/// The trailing `handle_width` pixels belong to the resize handle.
pub fn hit_test(offset_x: f64, header_width: f64, handle_width: f64) -> HeaderZone {
    if offset_x >= header_width - handle_width && offset_x <= header_width {
        HeaderZone::ResizeHandle
    } else {
        HeaderZone::Body
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    Pressed {
        column: String,
        origin_x: f64,
        sortable: bool,
        draggable: bool,
    },
    Dragging {
        source: String,
        hover: Option<String>,
    },
    Resizing {
        column: String,
        origin_x: f64,
        start_width: f64,
        min: f64,
        max: f64,
        width: f64,
    },
}

/// What a completed pointer gesture asks the grid to do.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
    None,
    SortToggled(String),
    Reordered { source: String, target: String },
    Resized { column: String, width: f64 },
    Cancelled,
}

/// Header pointer state machine. One pointer-down starts exactly one of
/// click-to-sort, drag-to-reorder or edge-drag-to-resize.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnInteraction {
    gesture: Gesture,
    handle_width: f64,
    drag_threshold: f64,
}

impl Default for ColumnInteraction {
    fn default() -> Self {
        Self::new(RESIZE_HANDLE_WIDTH, DRAG_THRESHOLD)
    }
}

impl ColumnInteraction {
    pub fn new(handle_width: f64, drag_threshold: f64) -> Self {
        Self {
            gesture: Gesture::Idle,
            handle_width,
            drag_threshold,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    pub fn pointer_down<R>(
        &mut self,
        column: &ColumnDescriptor<R>,
        offset_x: f64,
        current_width: f64,
        client_x: f64,
    ) -> HeaderZone {
        let zone = hit_test(offset_x, current_width, self.handle_width);
        self.gesture = match zone {
            HeaderZone::ResizeHandle if column.resizable => {
                let (min, max) = column.width_bounds();
                Gesture::Resizing {
                    column: column.id.clone(),
                    origin_x: client_x,
                    start_width: current_width,
                    min,
                    max,
                    width: current_width,
                }
            }
            // A press on a fixed column's handle does nothing at all.
            HeaderZone::ResizeHandle => Gesture::Idle,
            HeaderZone::Body => Gesture::Pressed {
                column: column.id.clone(),
                origin_x: client_x,
                sortable: column.sortable,
                draggable: column.draggable,
            },
        };
        zone
    }

    /// Tracks movement. Returns the live width while resizing.
    pub fn pointer_move<R>(
        &mut self,
        client_x: f64,
        hover: Option<&ColumnDescriptor<R>>,
    ) -> Option<f64> {
        match &mut self.gesture {
            Gesture::Idle => None,
            Gesture::Pressed {
                column,
                origin_x,
                draggable,
                ..
            } => {
                if *draggable && (client_x - *origin_x).abs() >= self.drag_threshold {
                    let source = std::mem::take(column);
                    let hover = valid_target(&source, hover);
                    self.gesture = Gesture::Dragging { source, hover };
                }
                None
            }
            Gesture::Dragging { source, hover: current } => {
                *current = valid_target(source, hover);
                None
            }
            Gesture::Resizing {
                origin_x,
                start_width,
                min,
                max,
                width,
                ..
            } => {
                let next = *start_width + client_x - *origin_x;
                if !next.is_nan() {
                    *width = next.clamp(*min, *max);
                }
                Some(*width)
            }
        }
    }

    pub fn pointer_up<R>(&mut self, target: Option<&ColumnDescriptor<R>>) -> GestureOutcome {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => GestureOutcome::None,
            Gesture::Pressed {
                column, sortable, ..
            } => {
                if sortable {
                    GestureOutcome::SortToggled(column)
                } else {
                    GestureOutcome::None
                }
            }
            Gesture::Dragging { source, .. } => match valid_target(&source, target) {
                Some(target) => GestureOutcome::Reordered { source, target },
                None => {
                    debug!(column = %source, "column drag dropped outside a target");
                    GestureOutcome::Cancelled
                }
            },
            Gesture::Resizing { column, width, .. } => GestureOutcome::Resized { column, width },
        }
    }

    /// Drops whatever gesture is in progress without any state change.
    pub fn cancel(&mut self) -> GestureOutcome {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => GestureOutcome::None,
            _ => GestureOutcome::Cancelled,
        }
    }

    pub fn dragging_source(&self) -> Option<&str> {
        match &self.gesture {
            Gesture::Dragging { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn drop_target(&self) -> Option<&str> {
        match &self.gesture {
            Gesture::Dragging { hover, .. } => hover.as_deref(),
            _ => None,
        }
    }

    pub fn resizing_column(&self) -> Option<(&str, f64)> {
        match &self.gesture {
            Gesture::Resizing { column, width, .. } => Some((column, *width)),
            _ => None,
        }
    }

    /// While dragging, every draggable column other than the source is a
    /// valid drop target.
    pub fn is_valid_drop_target<R>(&self, column: &ColumnDescriptor<R>) -> bool {
        match &self.gesture {
            Gesture::Dragging { source, .. } => valid_target(source, Some(column)).is_some(),
            _ => false,
        }
    }
}

fn valid_target<R>(source: &str, target: Option<&ColumnDescriptor<R>>) -> Option<String> {
    target
        .filter(|column| column.draggable && column.id != source)
        .map(|column| column.id.clone())
}
