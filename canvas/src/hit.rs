//! Hit-testing: which element or vertex lies under a point, and which elements
//! a marquee selects.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::{ANGLE_LABEL_GAP, HIT_TOLERANCE, TEXT_HEIGHT_FACTOR, TEXT_WIDTH_FACTOR, VERTEX_HIT_RADIUS_PX};
use crate::doc::{CanvasData, CanvasElement, ElementId, Shape, TextAlign};
use crate::geometry::{self, Bounds};

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// The element body or stroke.
    Body,
    /// A polygon or angle vertex, by index into its points.
    Vertex(usize),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Test which element (if any) is under `world_pt`, checking vertices first.
///
/// Elements later in paint order win over earlier ones.
#[must_use]
pub fn hit_test(world_pt: Point, data: &CanvasData, camera: &Camera) -> Option<Hit> {
    if let Some(hit) = vertex_hit(world_pt, data, camera) {
        return Some(hit);
    }
    data.elements
        .iter()
        .rev()
        .find(|el| is_point_in_element(world_pt, el))
        .map(|el| Hit { element_id: el.id, part: HitPart::Body })
}

/// Find the polygon/angle vertex within the zoom-scaled vertex radius of `world_pt`.
///
/// The topmost element wins; within one element the nearest vertex wins.
#[must_use]
pub fn vertex_hit(world_pt: Point, data: &CanvasData, camera: &Camera) -> Option<Hit> {
    let radius = camera.screen_dist_to_world(VERTEX_HIT_RADIUS_PX);
    for el in data.elements.iter().rev() {
        let nearest = el
            .shape
            .vertices()
            .iter()
            .enumerate()
            .map(|(i, v)| (i, v.distance(world_pt)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = nearest {
            return Some(Hit { element_id: el.id, part: HitPart::Vertex(index) });
        }
    }
    None
}

/// Whether `pt` lies on or within [`HIT_TOLERANCE`] of the element.
#[must_use]
pub fn is_point_in_element(pt: Point, el: &CanvasElement) -> bool {
    match &el.shape {
        Shape::Rectangle { .. } | Shape::Text { .. } => element_bounds(el).expand(HIT_TOLERANCE).contains(pt),
        Shape::Circle { x, y, radius } | Shape::Point { x, y, radius } => {
            pt.distance(Point::new(*x, *y)) <= radius + HIT_TOLERANCE
        }
        Shape::Line { x, y, x2, y2 } | Shape::Arrow { x, y, x2, y2 } => {
            geometry::distance_to_segment(pt, Point::new(*x, *y), Point::new(*x2, *y2)) <= HIT_TOLERANCE
        }
        Shape::Polygon { points, closed } => {
            if *closed && geometry::point_in_polygon(pt, points) {
                return true;
            }
            near_path(pt, points, *closed)
        }
        Shape::Angle { points, arc_radius, .. } => {
            let Some(vertex) = points.last() else {
                return false;
            };
            pt.distance(*vertex) <= arc_radius + HIT_TOLERANCE
        }
    }
}

/// Whether the element falls inside (or crosses) the axis-aligned selection box.
#[must_use]
pub fn is_element_in_selection_box(el: &CanvasElement, selection: &Bounds) -> bool {
    match &el.shape {
        Shape::Rectangle { .. } | Shape::Circle { .. } => element_bounds(el).overlaps(selection),
        Shape::Line { x, y, x2, y2 } | Shape::Arrow { x, y, x2, y2 } => {
            geometry::segment_touches_bounds(Point::new(*x, *y), Point::new(*x2, *y2), selection)
        }
        Shape::Polygon { points, closed } => path_touches_bounds(points, *closed, selection),
        Shape::Angle { points, .. } => path_touches_bounds(points, false, selection),
        Shape::Text { x, y, .. } | Shape::Point { x, y, .. } => selection.contains(Point::new(*x, *y)),
    }
}

/// Per-kind bounding box, used for selection outlines and box tests.
#[must_use]
pub fn element_bounds(el: &CanvasElement) -> Bounds {
    match &el.shape {
        Shape::Line { x, y, x2, y2 } | Shape::Arrow { x, y, x2, y2 } => {
            Bounds::from_corners(Point::new(*x, *y), Point::new(*x2, *y2))
        }
        Shape::Rectangle { x, y, width, height } => {
            Bounds::from_corners(Point::new(*x, *y), Point::new(x + width, y + height))
        }
        Shape::Circle { x, y, radius } | Shape::Point { x, y, radius } => {
            let r = radius.abs();
            Bounds { min_x: x - r, min_y: y - r, max_x: x + r, max_y: y + r }
        }
        Shape::Text { x, y, text, font_size, text_align, .. } => text_bounds(*x, *y, text, *font_size, *text_align),
        Shape::Polygon { points, .. } => Bounds::from_points(points).unwrap_or_default(),
        Shape::Angle { points, arc_radius, .. } => {
            let reach = arc_radius + ANGLE_LABEL_GAP;
            let vertex = points.last().copied().unwrap_or_default();
            Bounds {
                min_x: vertex.x - reach,
                min_y: vertex.y - reach,
                max_x: vertex.x + reach,
                max_y: vertex.y + reach,
            }
        }
    }
}

/// Estimated text extents: fixed-width characters, one box line per text line.
fn text_bounds(x: f64, y: f64, text: &str, font_size: f64, align: TextAlign) -> Bounds {
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0).max(1);
    let line_count = text.lines().count().max(1);
    #[allow(clippy::cast_precision_loss)]
    let (w, h) = (
        longest as f64 * font_size * TEXT_WIDTH_FACTOR,
        line_count as f64 * font_size * TEXT_HEIGHT_FACTOR,
    );
    let left = match align {
        TextAlign::Left => x,
        TextAlign::Center => x - w / 2.0,
        TextAlign::Right => x - w,
    };
    Bounds { min_x: left, min_y: y, max_x: left + w, max_y: y + h }
}

fn segments(points: &[Point], closed: bool) -> impl Iterator<Item = (Point, Point)> + '_ {
    let closing = if closed && points.len() > 2 {
        points.last().copied().zip(points.first().copied())
    } else {
        None
    };
    points.windows(2).map(|w| (w[0], w[1])).chain(closing)
}

fn near_path(pt: Point, points: &[Point], closed: bool) -> bool {
    if let [only] = points {
        return pt.distance(*only) <= HIT_TOLERANCE;
    }
    segments(points, closed).any(|(a, b)| geometry::distance_to_segment(pt, a, b) <= HIT_TOLERANCE)
}

fn path_touches_bounds(points: &[Point], closed: bool, selection: &Bounds) -> bool {
    if points.iter().any(|p| selection.contains(*p)) {
        return true;
    }
    segments(points, closed).any(|(a, b)| geometry::segment_touches_bounds(a, b, selection))
}
