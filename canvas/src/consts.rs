//! Shared numeric constants for the canvas crate.

// ── Hit-testing ─────────────────────────────────────────────────

/// World-space slop for point-in-element tests.
pub const HIT_TOLERANCE: f64 = 5.0;

/// Screen-space radius in pixels for grabbing a polygon or angle vertex.
pub const VERTEX_HIT_RADIUS_PX: f64 = 8.0;

/// Screen-space radius in pixels within which a polygon click targets an
/// existing vertex instead of placing a new one.
pub const VERTEX_SNAP_RADIUS_PX: f64 = 10.0;

// ── Camera ──────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 8.0;

/// Zoom multiplier per 100px of wheel travel.
pub const WHEEL_ZOOM_STEP: f64 = 1.1;

// ── Editing ─────────────────────────────────────────────────────

/// Keyboard nudge distance in world units.
pub const NUDGE_STEP: f64 = 1.0;

/// Keyboard nudge distance with Shift held.
pub const NUDGE_STEP_FAST: f64 = 10.0;

/// Offset applied to duplicated elements.
pub const DUPLICATE_OFFSET: f64 = 10.0;

/// Grid spacing in world units, used for drawing and snapping.
pub const GRID_SIZE: f64 = 20.0;

/// Maximum number of undo snapshots retained.
pub const HISTORY_LIMIT: usize = 100;

// ── Shapes ──────────────────────────────────────────────────────

/// Default radius of a point element.
pub const POINT_RADIUS: f64 = 4.0;

/// Default arc radius of an angle annotation.
pub const ANGLE_ARC_RADIUS: f64 = 24.0;

/// Gap between an angle arc and its degree label.
pub const ANGLE_LABEL_GAP: f64 = 12.0;

/// Arrowhead length in world units.
pub const ARROW_SIZE: f64 = 12.0;

/// Arrowhead half-angle in radians (~30°).
pub const ARROW_ANGLE: f64 = std::f64::consts::PI / 6.0;

/// Width-per-character factor used to estimate text extents.
pub const TEXT_WIDTH_FACTOR: f64 = 0.6;

/// Line-height factor used to estimate text extents.
pub const TEXT_HEIGHT_FACTOR: f64 = 1.2;
