//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! This module defines the types consumed by the input engine. `Tool` and
//! `Modifiers` capture the user's intent at the time of a pointer event.
//! `UiState` is the persistent editor state the renderer reads (selection,
//! style defaults, previews). `InputState` is the active gesture tracked
//! between pointer-down and pointer-up, carrying the context needed to
//! compute deltas and commit a single history snapshot on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::HashSet;

use crate::camera::Point;
use crate::doc::{CanvasElement, ElementId, FontWeight, Style, TextAlign};
use crate::geometry::Bounds;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default).
    #[default]
    Select,
    /// Draw a straight line segment.
    Line,
    /// Draw a directed arrow.
    Arrow,
    /// Draw a rectangle.
    Rectangle,
    /// Draw a circle from its centre.
    Circle,
    /// Place a text element.
    Text,
    /// Place a point.
    Point,
    /// Build a polygon one vertex per click.
    Polygon,
    /// Drag to pan the camera.
    Pan,
}

impl Tool {
    /// Whether this tool sizes a shape by dragging from an anchor.
    #[must_use]
    pub fn is_drag_shape(self) -> bool {
        matches!(self, Self::Line | Self::Arrow | Self::Rectangle | Self::Circle)
    }

    /// Whether a single click with this tool places an element.
    #[must_use]
    pub fn is_click_shape(self) -> bool {
        matches!(self, Self::Text | Self::Point)
    }

    /// CSS cursor for the canvas while this tool is active.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Select => "default",
            Self::Pan => "grab",
            Self::Text => "text",
            _ => "crosshair",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`, `"a"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// Whether this is `name`, ignoring ASCII case (so `"Z"` with Shift matches `"z"`).
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }

    /// Unit nudge direction for arrow keys and WASD.
    #[must_use]
    pub fn nudge_direction(&self) -> Option<(f64, f64)> {
        match self.0.as_str() {
            "ArrowLeft" | "a" | "A" => Some((-1.0, 0.0)),
            "ArrowRight" | "d" | "D" => Some((1.0, 0.0)),
            "ArrowUp" | "w" | "W" => Some((0.0, -1.0)),
            "ArrowDown" | "s" | "S" => Some((0.0, 1.0)),
            _ => None,
        }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// A polygon under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonDraft {
    /// Placed vertices in world coordinates.
    pub points: Vec<Point>,
    /// Where the preview segment currently ends (pointer position, possibly constrained).
    pub cursor: Option<Point>,
}

impl PolygonDraft {
    /// The placed vertex within `radius` of `pt`, nearest first.
    #[must_use]
    pub fn vertex_near(&self, pt: Point, radius: f64) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.distance(pt)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// The last two placed vertices, `(previous, last)`.
    #[must_use]
    pub fn last_segment(&self) -> Option<(Point, Point)> {
        match self.points.as_slice() {
            [.., prev, last] => Some((*prev, *last)),
            _ => None,
        }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone)]
pub struct UiState {
    /// Currently active drawing tool.
    pub tool: Tool,
    /// Style applied to newly created elements.
    pub style: Style,
    /// Font size for new text elements.
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub text_align: TextAlign,
    /// Ids of the selected elements.
    pub selected_ids: HashSet<ElementId>,
    /// World-space selection rectangle while a marquee drag is active.
    pub marquee: Option<Bounds>,
    /// Uncommitted preview of the shape being drawn.
    pub temp_element: Option<CanvasElement>,
    pub polygon_draft: Option<PolygonDraft>,
    /// Fixed turn in degrees applied to the next polygon edge.
    pub angle_constraint: Option<f64>,
    /// Vertex under the pointer, highlighted by the renderer.
    pub hover_vertex: Option<(ElementId, usize)>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            style: Style::default(),
            font_size: 16.0,
            font_weight: FontWeight::default(),
            text_align: TextAlign::default(),
            selected_ids: HashSet::new(),
            marquee: None,
            temp_element: None,
            polygon_draft: None,
            angle_constraint: None,
            hover_vertex: None,
        }
    }
}

impl UiState {
    #[must_use]
    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selected_ids.contains(id)
    }

    /// Replace the selection with a single element.
    pub fn select_only(&mut self, id: ElementId) {
        self.selected_ids.clear();
        self.selected_ids.insert(id);
    }

    /// Add or remove one element from the selection.
    pub fn toggle_selected(&mut self, id: ElementId) {
        if !self.selected_ids.remove(&id) {
            self.selected_ids.insert(id);
        }
    }
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas and
/// emit final actions on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning the canvas.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
    /// The user is dragging a selection marquee over empty canvas.
    SelectingBox {
        /// World-space corner where the drag started.
        start_world: Point,
        /// Add to the existing selection instead of replacing it.
        additive: bool,
    },
    /// The user is moving every selected element together.
    DraggingGroup {
        /// World-space pointer position at pointer-down.
        start_world: Point,
        /// Each selected element as it was before the drag. The live
        /// position is always `original + (pointer - start_world)`.
        originals: Vec<CanvasElement>,
        /// Whether any pointer-move changed geometry.
        moved: bool,
    },
    /// The user is sizing a new shape from an anchor.
    Drawing {
        /// World-space point where the drag started.
        anchor_world: Point,
    },
    /// The user is repositioning one vertex of a polygon or angle.
    DraggingVertex {
        id: ElementId,
        index: usize,
        /// Vertex position at pointer-down, restored on cancel.
        original: Point,
        moved: bool,
    },
}
