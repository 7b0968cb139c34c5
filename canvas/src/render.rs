//! Rendering: draws the full canvas scene to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives read-only views of the canvas, editor state and camera and
//! produces pixels. It does not mutate any application state.
//!
//! Layers, bottom first: background, grid, elements in array order, the
//! in-progress preview, polygon draft, marquee, then selection UI.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::{Camera, Point};
use crate::consts::{
    ANGLE_LABEL_GAP, ARROW_ANGLE, ARROW_SIZE, GRID_SIZE, TEXT_HEIGHT_FACTOR, VERTEX_SNAP_RADIUS_PX,
};
use crate::doc::{CanvasData, CanvasElement, Shape, Style, TextAlign};
use crate::geometry;
use crate::hit;
use crate::input::{PolygonDraft, UiState};

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;
/// Vertex handle radius in screen pixels.
const HANDLE_RADIUS_PX: f64 = 5.0;
/// Gap between an element and its selection box in screen pixels.
const SELECTION_PAD_PX: f64 = 4.0;

const SELECTION_COLOR: &str = "#1E90FF";
const GRID_COLOR: &str = "#e5e7eb";
const SNAP_COLOR: &str = "#16a34a";

/// Draw the full scene.
///
/// `viewport_w` and `viewport_h` are in CSS pixels. `dpr` is the device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    data: &CanvasData,
    ui: &UiState,
    camera: &Camera,
    viewport_w: f64,
    viewport_h: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    // Layer 1: clear, background in screen space, then the world transform.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);
    if let Some(bg) = &data.background_color {
        ctx.set_fill_style_str(bg);
        ctx.fill_rect(0.0, 0.0, viewport_w, viewport_h);
    }
    ctx.translate(camera.pan_x, camera.pan_y)?;
    ctx.scale(camera.zoom, camera.zoom)?;

    if data.shows_grid() {
        draw_grid(ctx, camera, viewport_w, viewport_h);
    }

    // Layer 2: elements in array order.
    for el in &data.elements {
        draw_element(ctx, el)?;
    }

    // Layer 3: previews.
    if let Some(temp) = &ui.temp_element {
        draw_element(ctx, temp)?;
    }
    if let Some(draft) = &ui.polygon_draft {
        draw_polygon_draft(ctx, draft, &ui.style, camera.zoom)?;
    }
    if let Some(m) = ui.marquee {
        draw_marquee(ctx, m, camera.zoom)?;
    }

    // Layer 4: selection UI.
    for el in data.elements.iter().filter(|el| ui.is_selected(&el.id)) {
        draw_selection(ctx, el, camera.zoom)?;
    }
    if let Some((id, index)) = ui.hover_vertex {
        if let Some(p) = data.get(&id).and_then(|el| el.shape.vertices().get(index)) {
            draw_handle(ctx, *p, camera.zoom, true)?;
        }
    }

    Ok(())
}

fn draw_grid(ctx: &CanvasRenderingContext2d, camera: &Camera, viewport_w: f64, viewport_h: f64) {
    let top_left = camera.screen_to_world(Point::new(0.0, 0.0));
    let bottom_right = camera.screen_to_world(Point::new(viewport_w, viewport_h));
    let start_x = (top_left.x / GRID_SIZE).floor() * GRID_SIZE;
    let start_y = (top_left.y / GRID_SIZE).floor() * GRID_SIZE;

    ctx.save();
    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(1.0 / camera.zoom);
    ctx.begin_path();
    let mut x = start_x;
    while x <= bottom_right.x {
        ctx.move_to(x, top_left.y);
        ctx.line_to(x, bottom_right.y);
        x += GRID_SIZE;
    }
    let mut y = start_y;
    while y <= bottom_right.y {
        ctx.move_to(top_left.x, y);
        ctx.line_to(bottom_right.x, y);
        y += GRID_SIZE;
    }
    ctx.stroke();
    ctx.restore();
}

// =============================================================
// Elements
// =============================================================

fn draw_element(ctx: &CanvasRenderingContext2d, el: &CanvasElement) -> Result<(), JsValue> {
    let style = &el.style;
    ctx.save();
    ctx.set_global_alpha(style.opacity);
    apply_stroke_style(ctx, style)?;

    match &el.shape {
        Shape::Line { x, y, x2, y2 } => {
            ctx.begin_path();
            ctx.move_to(*x, *y);
            ctx.line_to(*x2, *y2);
            ctx.stroke();
        }
        Shape::Arrow { x, y, x2, y2 } => {
            ctx.begin_path();
            ctx.move_to(*x, *y);
            ctx.line_to(*x2, *y2);
            ctx.stroke();
            let angle = geometry::heading(Point::new(*x, *y), Point::new(*x2, *y2));
            draw_arrowhead(ctx, *x2, *y2, angle);
        }
        Shape::Rectangle { x, y, width, height } => {
            if style.has_fill() {
                ctx.set_fill_style_str(&style.fill_color);
                ctx.fill_rect(*x, *y, *width, *height);
            }
            ctx.stroke_rect(*x, *y, *width, *height);
        }
        Shape::Circle { x, y, radius } => {
            ctx.begin_path();
            ctx.arc(*x, *y, radius.abs(), 0.0, 2.0 * PI)?;
            if style.has_fill() {
                ctx.set_fill_style_str(&style.fill_color);
                ctx.fill();
            }
            ctx.stroke();
        }
        Shape::Point { x, y, radius } => {
            let fill = if style.has_fill() { &style.fill_color } else { &style.stroke_color };
            ctx.begin_path();
            ctx.arc(*x, *y, radius.abs(), 0.0, 2.0 * PI)?;
            ctx.set_fill_style_str(fill);
            ctx.fill();
        }
        Shape::Text { x, y, text, font_size, font_weight, text_align } => {
            ctx.set_font(&format!("{} {font_size}px sans-serif", font_weight.as_str()));
            ctx.set_text_align(match text_align {
                TextAlign::Left => "left",
                TextAlign::Center => "center",
                TextAlign::Right => "right",
            });
            ctx.set_text_baseline("top");
            ctx.set_fill_style_str(&style.stroke_color);
            let mut top = *y;
            for line in text.split('\n') {
                ctx.fill_text(line, *x, top)?;
                top += font_size * TEXT_HEIGHT_FACTOR;
            }
        }
        Shape::Polygon { points, closed } => {
            trace_path(ctx, points);
            if *closed {
                ctx.close_path();
                if style.has_fill() {
                    ctx.set_fill_style_str(&style.fill_color);
                    ctx.fill();
                }
            }
            ctx.stroke();
        }
        Shape::Angle { points, angle_value, arc_radius } => {
            draw_angle(ctx, style, points, *angle_value, *arc_radius)?;
        }
    }

    ctx.restore();
    Ok(())
}

/// Open barbs at the tip, matching the SVG export.
fn draw_arrowhead(ctx: &CanvasRenderingContext2d, tip_x: f64, tip_y: f64, angle: f64) {
    let x1 = tip_x - ARROW_SIZE * (angle - ARROW_ANGLE).cos();
    let y1 = tip_y - ARROW_SIZE * (angle - ARROW_ANGLE).sin();
    let x2 = tip_x - ARROW_SIZE * (angle + ARROW_ANGLE).cos();
    let y2 = tip_y - ARROW_SIZE * (angle + ARROW_ANGLE).sin();

    ctx.begin_path();
    ctx.move_to(x1, y1);
    ctx.line_to(tip_x, tip_y);
    ctx.line_to(x2, y2);
    ctx.stroke();
}

fn draw_angle(
    ctx: &CanvasRenderingContext2d,
    style: &Style,
    points: &[Point],
    angle_value: f64,
    arc_radius: f64,
) -> Result<(), JsValue> {
    let [prev, vertex] = points else {
        return Ok(());
    };
    let start = geometry::heading(*prev, *vertex);
    let sweep = angle_value.to_radians();

    ctx.begin_path();
    ctx.arc_with_anticlockwise(vertex.x, vertex.y, arc_radius, start, start + sweep, angle_value < 0.0)?;
    ctx.stroke();

    let label = geometry::polar(*vertex, start + sweep / 2.0, arc_radius + ANGLE_LABEL_GAP);
    ctx.set_font("12px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_fill_style_str(&style.stroke_color);
    ctx.fill_text(&format!("{}°", angle_value.abs()), label.x, label.y)?;
    Ok(())
}

// =============================================================
// Previews
// =============================================================

fn draw_polygon_draft(
    ctx: &CanvasRenderingContext2d,
    draft: &PolygonDraft,
    style: &Style,
    zoom: f64,
) -> Result<(), JsValue> {
    let Some(first) = draft.points.first() else {
        return Ok(());
    };

    ctx.save();
    ctx.set_global_alpha(style.opacity);
    apply_stroke_style(ctx, style)?;
    trace_path(ctx, &draft.points);
    ctx.stroke();

    if let (Some(last), Some(cursor)) = (draft.points.last(), draft.cursor) {
        let dash = SELECTION_DASH_PX / zoom;
        ctx.set_line_dash(&dash_array(dash, dash))?;
        ctx.begin_path();
        ctx.move_to(last.x, last.y);
        ctx.line_to(cursor.x, cursor.y);
        ctx.stroke();
    }
    ctx.restore();

    for p in &draft.points {
        draw_handle(ctx, *p, zoom, false)?;
    }

    let closes = draft.points.len() >= 3
        && draft.cursor.is_some_and(|c| c.distance(*first) <= VERTEX_SNAP_RADIUS_PX / zoom);
    if closes {
        ctx.save();
        ctx.set_stroke_style_str(SNAP_COLOR);
        ctx.set_line_width(2.0 / zoom);
        ctx.begin_path();
        ctx.arc(first.x, first.y, VERTEX_SNAP_RADIUS_PX / zoom, 0.0, 2.0 * PI)?;
        ctx.stroke();
        ctx.restore();
    }
    Ok(())
}

fn draw_marquee(ctx: &CanvasRenderingContext2d, marquee: geometry::Bounds, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    let dash_world = SELECTION_DASH_PX / zoom;
    ctx.set_line_dash(&dash_array(dash_world, dash_world))?;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_fill_style_str("rgba(30, 144, 255, 0.12)");
    ctx.set_line_width(1.0 / zoom);
    ctx.fill_rect(marquee.min_x, marquee.min_y, marquee.width(), marquee.height());
    ctx.stroke_rect(marquee.min_x, marquee.min_y, marquee.width(), marquee.height());
    ctx.restore();
    Ok(())
}

// =============================================================
// Selection UI
// =============================================================

fn draw_selection(ctx: &CanvasRenderingContext2d, el: &CanvasElement, zoom: f64) -> Result<(), JsValue> {
    let b = hit::element_bounds(el).expand(SELECTION_PAD_PX / zoom);

    ctx.save();
    let dash_world = SELECTION_DASH_PX / zoom;
    ctx.set_line_dash(&dash_array(dash_world, dash_world))?;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / zoom);
    ctx.stroke_rect(b.min_x, b.min_y, b.width(), b.height());
    ctx.restore();

    for p in el.shape.vertices() {
        draw_handle(ctx, *p, zoom, false)?;
    }
    Ok(())
}

fn draw_handle(ctx: &CanvasRenderingContext2d, p: Point, zoom: f64, hovered: bool) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_fill_style_str(if hovered { SELECTION_COLOR } else { "#fff" });
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / zoom);
    ctx.begin_path();
    ctx.arc(p.x, p.y, HANDLE_RADIUS_PX / zoom, 0.0, 2.0 * PI)?;
    ctx.fill();
    ctx.stroke();
    ctx.restore();
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

/// Apply stroke color, width and dash from the element style.
fn apply_stroke_style(ctx: &CanvasRenderingContext2d, style: &Style) -> Result<(), JsValue> {
    ctx.set_stroke_style_str(&style.stroke_color);
    ctx.set_line_width(style.stroke_width);
    if style.dashed {
        ctx.set_line_dash(&dash_array(6.0, 4.0))?;
    }
    Ok(())
}

fn dash_array(on: f64, off: f64) -> js_sys::Array {
    let arr = js_sys::Array::new();
    arr.push(&on.into());
    arr.push(&off.into());
    arr
}

fn trace_path(ctx: &CanvasRenderingContext2d, points: &[Point]) {
    ctx.begin_path();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        ctx.move_to(first.x, first.y);
    }
    for p in iter {
        ctx.line_to(p.x, p.y);
    }
}
