//! Document model: canvas elements, their shapes and styles, and the canvas data.
//!
//! This module defines what is on the canvas. Each [`CanvasElement`] pairs a
//! shared [`Style`] with a per-kind [`Shape`] payload, so code that reads
//! geometry matches on the shape instead of probing optional fields.
//! [`CanvasData`] is the ordered element list plus canvas-wide flags; it is
//! the unit of undo/redo snapshotting and the JSON blob persisted for a
//! diagram.
//!
//! The JSON layout is camelCase with style and shape fields flattened onto the
//! element object and a `type` tag naming the shape kind.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;

/// Unique identifier for a canvas element.
pub type ElementId = Uuid;

/// The kind of a canvas element, without its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Line,
    Arrow,
    Rectangle,
    Circle,
    Text,
    Point,
    Polygon,
    Angle,
}

impl ElementKind {
    /// Lowercase tag used in JSON and SVG `data-kind` attributes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Text => "text",
            Self::Point => "point",
            Self::Polygon => "polygon",
            Self::Angle => "angle",
        }
    }

    /// Parse a lowercase tag. Returns `None` for unknown kinds.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "line" => Some(Self::Line),
            "arrow" => Some(Self::Arrow),
            "rectangle" => Some(Self::Rectangle),
            "circle" => Some(Self::Circle),
            "text" => Some(Self::Text),
            "point" => Some(Self::Point),
            "polygon" => Some(Self::Polygon),
            "angle" => Some(Self::Angle),
            _ => None,
        }
    }
}

/// Horizontal alignment of a text element relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Font weight of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Bold => "bold",
        }
    }
}

/// Style attributes shared by every element kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    /// Stroke color as a CSS color string.
    pub stroke_color: String,
    /// Fill color as a CSS color string; `"none"` or `"transparent"` means unfilled.
    pub fill_color: String,
    /// Stroke width in world units.
    pub stroke_width: f64,
    /// Draw the stroke dashed.
    pub dashed: bool,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_color: "#000000".to_owned(),
            fill_color: "transparent".to_owned(),
            stroke_width: 2.0,
            dashed: false,
            opacity: 1.0,
        }
    }
}

impl Style {
    /// Whether the fill color paints anything.
    #[must_use]
    pub fn has_fill(&self) -> bool {
        is_paint(&self.fill_color)
    }

    /// This style with the fill removed, as used for open polygons.
    #[must_use]
    pub fn unfilled(&self) -> Self {
        Self { fill_color: "none".to_owned(), ..self.clone() }
    }
}

/// Whether a CSS color string paints anything.
#[must_use]
pub fn is_paint(color: &str) -> bool {
    let c = color.trim();
    !(c.is_empty() || c.eq_ignore_ascii_case("none") || c.eq_ignore_ascii_case("transparent"))
}

/// Per-kind geometry of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Shape {
    /// Straight segment from `(x, y)` to `(x2, y2)`.
    Line { x: f64, y: f64, x2: f64, y2: f64 },
    /// Segment with an arrowhead at `(x2, y2)`.
    Arrow { x: f64, y: f64, x2: f64, y2: f64 },
    /// Axis-aligned rectangle with top-left corner `(x, y)`.
    Rectangle { x: f64, y: f64, width: f64, height: f64 },
    /// Circle centred on `(x, y)`.
    Circle { x: f64, y: f64, radius: f64 },
    /// Text anchored at `(x, y)` (top of the first line).
    Text {
        x: f64,
        y: f64,
        text: String,
        font_size: f64,
        #[serde(default)]
        font_weight: FontWeight,
        #[serde(default)]
        text_align: TextAlign,
    },
    /// Filled dot centred on `(x, y)`.
    Point { x: f64, y: f64, radius: f64 },
    /// Closed (filled) polygon or open polyline through `points`.
    Polygon {
        points: Vec<Point>,
        #[serde(default = "default_closed")]
        closed: bool,
    },
    /// Angle annotation: `points` is `[previous, vertex]`. The arc is centred
    /// on the vertex, starts at the heading previous→vertex and sweeps
    /// `angle_value` degrees (positive is clockwise on screen).
    Angle { points: Vec<Point>, angle_value: f64, arc_radius: f64 },
}

fn default_closed() -> bool {
    true
}

impl Shape {
    /// The kind tag for this shape.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Line { .. } => ElementKind::Line,
            Self::Arrow { .. } => ElementKind::Arrow,
            Self::Rectangle { .. } => ElementKind::Rectangle,
            Self::Circle { .. } => ElementKind::Circle,
            Self::Text { .. } => ElementKind::Text,
            Self::Point { .. } => ElementKind::Point,
            Self::Polygon { .. } => ElementKind::Polygon,
            Self::Angle { .. } => ElementKind::Angle,
        }
    }

    /// Primary anchor: `(x, y)` for anchored shapes, the first point otherwise.
    #[must_use]
    pub fn anchor(&self) -> Point {
        match self {
            Self::Line { x, y, .. }
            | Self::Arrow { x, y, .. }
            | Self::Rectangle { x, y, .. }
            | Self::Circle { x, y, .. }
            | Self::Text { x, y, .. }
            | Self::Point { x, y, .. } => Point::new(*x, *y),
            Self::Polygon { points, .. } | Self::Angle { points, .. } => points.first().copied().unwrap_or_default(),
        }
    }

    /// Editable vertices of polygon and angle shapes; empty for other kinds.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        match self {
            Self::Polygon { points, .. } | Self::Angle { points, .. } => points,
            _ => &[],
        }
    }

    /// Mutable access to polygon and angle vertices.
    pub fn vertices_mut(&mut self) -> Option<&mut Vec<Point>> {
        match self {
            Self::Polygon { points, .. } | Self::Angle { points, .. } => Some(points),
            _ => None,
        }
    }

    /// Translate every coordinate of the shape by `(dx, dy)`.
    ///
    /// Secondary geometry (`x2, y2` and polygon/angle points) moves in
    /// lockstep with the anchor.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Self::Line { x, y, x2, y2 } | Self::Arrow { x, y, x2, y2 } => {
                *x += dx;
                *y += dy;
                *x2 += dx;
                *y2 += dy;
            }
            Self::Rectangle { x, y, .. }
            | Self::Circle { x, y, .. }
            | Self::Text { x, y, .. }
            | Self::Point { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
            Self::Polygon { points, .. } | Self::Angle { points, .. } => {
                for p in points.iter_mut() {
                    *p = p.offset(dx, dy);
                }
            }
        }
    }
}

/// A single element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    /// Unique identifier for this element.
    pub id: ElementId,
    /// Paint order at creation time (the element count when it was added).
    #[serde(default)]
    pub z_index: i64,
    #[serde(flatten)]
    pub style: Style,
    #[serde(flatten)]
    pub shape: Shape,
}

impl CanvasElement {
    /// Create an element with a fresh id.
    #[must_use]
    pub fn new(shape: Shape, style: Style, z_index: i64) -> Self {
        Self { id: Uuid::new_v4(), z_index, style, shape }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.shape.kind()
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.shape.translate(dx, dy);
    }

    /// A copy of this element translated by `(dx, dy)`, keeping its id.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let mut out = self.clone();
        out.translate(dx, dy);
        out
    }
}

/// The full content of one diagram canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasData {
    /// Elements in paint order (later entries draw on top).
    #[serde(default)]
    pub elements: Vec<CanvasElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_to_grid: Option<bool>,
}

impl CanvasData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse canvas data from a JSON value (the persisted blob).
    ///
    /// # Errors
    ///
    /// Returns the serde error if the value does not match the layout.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Serialize to a JSON value for persistence.
    ///
    /// # Errors
    ///
    /// Returns the serde error if serialization fails.
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id == *id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut CanvasElement> {
        self.elements.iter_mut().find(|e| e.id == *id)
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Append an element on top of the paint order.
    pub fn push(&mut self, element: CanvasElement) {
        self.elements.push(element);
    }

    /// Replace an element with the same id. Returns false if it doesn't exist.
    pub fn replace(&mut self, element: CanvasElement) -> bool {
        let Some(slot) = self.get_mut(&element.id) else {
            return false;
        };
        *slot = element;
        true
    }

    /// Remove every element whose id is in `ids`, returning the removed ids in paint order.
    pub fn remove_ids(&mut self, ids: &HashSet<ElementId>) -> Vec<ElementId> {
        let removed = self
            .elements
            .iter()
            .filter(|e| ids.contains(&e.id))
            .map(|e| e.id)
            .collect::<Vec<_>>();
        self.elements.retain(|e| !ids.contains(&e.id));
        removed
    }

    /// The z-index a newly created element receives.
    #[must_use]
    pub fn next_z_index(&self) -> i64 {
        i64::try_from(self.elements.len()).unwrap_or(i64::MAX)
    }

    /// Whether snapping to the grid is enabled.
    #[must_use]
    pub fn snaps_to_grid(&self) -> bool {
        self.snap_to_grid.unwrap_or(false)
    }

    /// Whether the grid is drawn.
    #[must_use]
    pub fn shows_grid(&self) -> bool {
        self.grid_enabled.unwrap_or(false)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
