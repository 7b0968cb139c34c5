//! Pure 2D geometry: bounding boxes, segment distance and segment intersection.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::camera::Point;

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounds spanning two arbitrary corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    /// Smallest bounds containing all `points`. `None` when `points` is empty.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut b = Self::from_corners(*first, *first);
        for p in rest {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
        }
        Some(b)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Grow the bounds by `amount` on every side.
    #[must_use]
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            min_x: self.min_x - amount,
            min_y: self.min_y - amount,
            max_x: self.max_x + amount,
            max_y: self.max_y + amount,
        }
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Whether two bounds share any area (touching edges count).
    #[must_use]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x && self.max_x >= other.min_x && self.min_y <= other.max_y && self.max_y >= other.min_y
    }

    /// The four edges as segments, clockwise from the top.
    #[must_use]
    pub fn edges(&self) -> [(Point, Point); 4] {
        let tl = Point::new(self.min_x, self.min_y);
        let tr = Point::new(self.max_x, self.min_y);
        let br = Point::new(self.max_x, self.max_y);
        let bl = Point::new(self.min_x, self.max_y);
        [(tl, tr), (tr, br), (br, bl), (bl, tl)]
    }
}

/// Distance from `p` to the closest point on segment `a`–`b`.
///
/// The projection parameter is clamped to the segment, so points beyond an
/// endpoint measure their distance to that endpoint.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * abx, a.y + t * aby))
}

/// Parametric segment intersection test.
///
/// Returns false when the segments are parallel (determinant exactly zero);
/// otherwise true when both parameters fall in `[0, 1]`.
#[must_use]
pub fn lines_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let det = (a2.x - a1.x) * (b2.y - b1.y) - (b2.x - b1.x) * (a2.y - a1.y);
    if det == 0.0 {
        return false;
    }
    let lambda = ((b2.y - b1.y) * (b2.x - a1.x) + (b1.x - b2.x) * (b2.y - a1.y)) / det;
    let gamma = ((a1.y - a2.y) * (b2.x - a1.x) + (a2.x - a1.x) * (b2.y - a1.y)) / det;
    (0.0..=1.0).contains(&lambda) && (0.0..=1.0).contains(&gamma)
}

/// Whether segment `a`–`b` touches the box: an endpoint inside or an edge crossing.
#[must_use]
pub fn segment_touches_bounds(a: Point, b: Point, bounds: &Bounds) -> bool {
    if bounds.contains(a) || bounds.contains(b) {
        return true;
    }
    bounds
        .edges()
        .iter()
        .any(|(e1, e2)| lines_intersect(a, b, *e1, *e2))
}

/// Even-odd point-in-polygon test.
#[must_use]
pub fn point_in_polygon(p: Point, points: &[Point]) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > p.y) != (pj.y > p.y) && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Heading of the vector `from`→`to` in radians (screen axes, y down).
#[must_use]
pub fn heading(from: Point, to: Point) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// The point `distance` away from `origin` along `angle` radians.
#[must_use]
pub fn polar(origin: Point, angle: f64, distance: f64) -> Point {
    Point::new(origin.x + distance * angle.cos(), origin.y + distance * angle.sin())
}

/// Round a coordinate to the nearest multiple of `step`.
#[must_use]
pub fn snap(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Snap both coordinates of a point to a `step` grid.
#[must_use]
pub fn snap_point(p: Point, step: f64) -> Point {
    Point::new(snap(p.x, step), snap(p.y, step))
}
