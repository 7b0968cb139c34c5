//! SVG export of a canvas, and re-import of the same markup.
//!
//! The markup mirrors the renderer shape by shape. Every element becomes one
//! top-level node tagged with `data-id` and `data-kind`; arrows and angle
//! annotations are `<g>` groups. The SVG is a display cache: [`CanvasData`]
//! stays authoritative, and [`from_svg`] only needs to understand what
//! [`to_svg`] writes.

#[cfg(test)]
#[path = "svg_test.rs"]
mod svg_test;

use roxmltree::{Document, Node};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{ANGLE_LABEL_GAP, ARROW_ANGLE, ARROW_SIZE, TEXT_HEIGHT_FACTOR};
use crate::doc::{CanvasData, CanvasElement, ElementKind, FontWeight, Shape, Style, TextAlign};
use crate::geometry;

/// Dash pattern for dashed strokes, in world units.
const DASH: &str = "6 4";

/// Errors from [`from_svg`].
#[derive(Debug, thiserror::Error)]
pub enum SvgError {
    #[error("invalid SVG markup: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),
    #[error("unknown element kind {0:?}")]
    UnknownKind(String),
    #[error("<{tag}> is missing attribute {attr}")]
    MissingAttribute { tag: String, attr: &'static str },
    #[error("attribute {attr} has invalid value {value:?}")]
    InvalidNumber { attr: &'static str, value: String },
    #[error("invalid element id {0:?}")]
    InvalidId(String),
}

// =============================================================
// Export
// =============================================================

/// Render `data` as a standalone SVG document of the given size.
#[must_use]
pub fn to_svg(data: &CanvasData, width: f64, height: f64) -> String {
    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
    );
    if let Some(bg) = &data.background_color {
        out.push_str(&format!("  <rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n", escape_xml(bg)));
    }
    for el in &data.elements {
        out.push_str("  ");
        out.push_str(&element_markup(el));
        out.push('\n');
    }
    out.push_str("</svg>\n");
    out
}

fn element_markup(el: &CanvasElement) -> String {
    let head = format!("data-id=\"{}\" data-kind=\"{}\" data-z-index=\"{}\"", el.id, el.kind().as_str(), el.z_index);
    let style = &el.style;
    match &el.shape {
        Shape::Line { x, y, x2, y2 } => {
            format!("<line {head} x1=\"{x}\" y1=\"{y}\" x2=\"{x2}\" y2=\"{y2}\"{}/>", stroke_attrs(style, &style.fill_color))
        }
        Shape::Arrow { x, y, x2, y2 } => {
            let tip = Point::new(*x2, *y2);
            let (left, right) = arrowhead(Point::new(*x, *y), tip);
            format!(
                "<g {head}{}><line x1=\"{x}\" y1=\"{y}\" x2=\"{x2}\" y2=\"{y2}\"/><polyline points=\"{}\" fill=\"none\"/></g>",
                stroke_attrs(style, &style.fill_color),
                points_attr(&[left, tip, right]),
            )
        }
        Shape::Rectangle { x, y, width, height } => format!(
            "<rect {head} x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\"{}/>",
            stroke_attrs(style, &style.fill_color)
        ),
        Shape::Circle { x, y, radius } => {
            format!("<circle {head} cx=\"{x}\" cy=\"{y}\" r=\"{radius}\"{}/>", stroke_attrs(style, &style.fill_color))
        }
        Shape::Point { x, y, radius } => {
            let fill = if style.has_fill() { &style.fill_color } else { &style.stroke_color };
            format!(
                "<circle {head} {} cx=\"{x}\" cy=\"{y}\" r=\"{radius}\"{}/>",
                data_fill(style),
                stroke_attrs(style, fill)
            )
        }
        Shape::Text { x, y, text, font_size, font_weight, text_align } => {
            let anchor = match text_align {
                TextAlign::Left => "start",
                TextAlign::Center => "middle",
                TextAlign::Right => "end",
            };
            let line_height = font_size * TEXT_HEIGHT_FACTOR;
            let spans = text
                .split('\n')
                .enumerate()
                .map(|(i, line)| {
                    let dy = if i == 0 { 0.0 } else { line_height };
                    format!("<tspan x=\"{x}\" dy=\"{dy}\">{}</tspan>", escape_xml(line))
                })
                .collect::<String>();
            format!(
                "<text {head} {} data-stroke-width=\"{}\" data-dashed=\"{}\" x=\"{x}\" y=\"{y}\" font-size=\"{font_size}\" font-weight=\"{}\" text-anchor=\"{anchor}\" dominant-baseline=\"hanging\" fill=\"{}\" opacity=\"{}\">{spans}</text>",
                data_fill(style),
                style.stroke_width,
                style.dashed,
                font_weight.as_str(),
                escape_xml(&style.stroke_color),
                style.opacity,
            )
        }
        Shape::Polygon { points, closed } => {
            let (tag, fill) = if *closed { ("polygon", style.fill_color.as_str()) } else { ("polyline", "none") };
            format!("<{tag} {head} points=\"{}\"{}/>", points_attr(points), stroke_attrs(style, fill))
        }
        Shape::Angle { points, angle_value, arc_radius } => {
            angle_markup(&head, style, points, *angle_value, *arc_radius)
        }
    }
}

/// Shapes whose SVG `fill` is not the element's fill colour keep it here.
fn data_fill(style: &Style) -> String {
    format!("data-fill-color=\"{}\"", escape_xml(&style.fill_color))
}

fn angle_markup(head: &str, style: &Style, points: &[Point], angle_value: f64, arc_radius: f64) -> String {
    let data = format!("data-points=\"{}\" data-angle-value=\"{angle_value}\" data-arc-radius=\"{arc_radius}\"", points_attr(points));
    let [prev, vertex] = points else {
        return format!("<g {head} {data}{}/>", stroke_attrs(style, "none"));
    };
    let start_heading = geometry::heading(*prev, *vertex);
    let sweep_rad = angle_value.to_radians();
    let start = geometry::polar(*vertex, start_heading, arc_radius);
    let end = geometry::polar(*vertex, start_heading + sweep_rad, arc_radius);
    let large_arc = u8::from(angle_value.abs() > 180.0);
    let sweep = u8::from(angle_value > 0.0);
    let label = geometry::polar(*vertex, start_heading + sweep_rad / 2.0, arc_radius + ANGLE_LABEL_GAP);
    format!(
        "<g {head} {data}{}><path d=\"M {} {} A {arc_radius} {arc_radius} 0 {large_arc} {sweep} {} {}\"/><text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\" stroke=\"none\" fill=\"{}\">{}°</text></g>",
        stroke_attrs(style, "none"),
        start.x,
        start.y,
        end.x,
        end.y,
        label.x,
        label.y,
        escape_xml(&style.stroke_color),
        angle_value.abs(),
    )
}

/// The two barb ends of an arrowhead at `tip`, pointing away from `tail`.
fn arrowhead(tail: Point, tip: Point) -> (Point, Point) {
    let angle = geometry::heading(tail, tip);
    let barb = |offset: f64| {
        Point::new(tip.x - ARROW_SIZE * (angle + offset).cos(), tip.y - ARROW_SIZE * (angle + offset).sin())
    };
    (barb(-ARROW_ANGLE), barb(ARROW_ANGLE))
}

fn stroke_attrs(style: &Style, fill: &str) -> String {
    let mut attrs = format!(
        " stroke=\"{}\" stroke-width=\"{}\" fill=\"{}\" opacity=\"{}\"",
        escape_xml(&style.stroke_color),
        style.stroke_width,
        escape_xml(fill),
        style.opacity
    );
    if style.dashed {
        attrs.push_str(&format!(" stroke-dasharray=\"{DASH}\""));
    }
    attrs
}

fn points_attr(points: &[Point]) -> String {
    points.iter().map(|p| format!("{},{}", p.x, p.y)).collect::<Vec<_>>().join(" ")
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}

// =============================================================
// Import
// =============================================================

/// Parse markup produced by [`to_svg`] back into elements, in document order.
///
/// Nodes without a `data-kind` attribute (background, arrowhead parts,
/// labels) are skipped.
///
/// # Errors
///
/// Returns [`SvgError`] for malformed XML, a non-`<svg>` root, unknown kinds,
/// and missing or unparsable geometry attributes.
pub fn from_svg(markup: &str) -> Result<Vec<CanvasElement>, SvgError> {
    let doc = Document::parse(markup)?;
    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(SvgError::NotSvg(root.tag_name().name().to_owned()));
    }
    root.children()
        .filter(|n| n.is_element() && n.has_attribute("data-kind"))
        .enumerate()
        .map(|(index, node)| parse_element(node, index))
        .collect()
}

fn parse_element(node: Node<'_, '_>, index: usize) -> Result<CanvasElement, SvgError> {
    let kind_raw = node.attribute("data-kind").unwrap_or_default();
    let kind = ElementKind::parse(kind_raw).ok_or_else(|| SvgError::UnknownKind(kind_raw.to_owned()))?;

    let id = match node.attribute("data-id") {
        Some(raw) => Uuid::parse_str(raw).map_err(|_| SvgError::InvalidId(raw.to_owned()))?,
        None => Uuid::new_v4(),
    };
    let z_index = match node.attribute("data-z-index") {
        Some(raw) => raw.parse().map_err(|_| SvgError::InvalidNumber { attr: "data-z-index", value: raw.to_owned() })?,
        None => i64::try_from(index).unwrap_or(i64::MAX),
    };

    let mut style = parse_style(node)?;
    let shape = match kind {
        ElementKind::Line => {
            Shape::Line { x: num(node, "x1")?, y: num(node, "y1")?, x2: num(node, "x2")?, y2: num(node, "y2")? }
        }
        ElementKind::Arrow => {
            let shaft = child(node, "line")?;
            Shape::Arrow { x: num(shaft, "x1")?, y: num(shaft, "y1")?, x2: num(shaft, "x2")?, y2: num(shaft, "y2")? }
        }
        ElementKind::Rectangle => Shape::Rectangle {
            x: num(node, "x")?,
            y: num(node, "y")?,
            width: num(node, "width")?,
            height: num(node, "height")?,
        },
        ElementKind::Circle => Shape::Circle { x: num(node, "cx")?, y: num(node, "cy")?, radius: num(node, "r")? },
        ElementKind::Point => {
            if style.fill_color == style.stroke_color {
                style.fill_color = Style::default().fill_color;
            }
            Shape::Point { x: num(node, "cx")?, y: num(node, "cy")?, radius: num(node, "r")? }
        }
        ElementKind::Text => {
            if let Some(fill) = node.attribute("fill") {
                style.stroke_color = fill.to_owned();
            }
            style.fill_color = Style::default().fill_color;
            parse_text(node)?
        }
        ElementKind::Polygon => Shape::Polygon {
            points: parse_points(node, "points")?,
            closed: node.tag_name().name() == "polygon",
        },
        ElementKind::Angle => Shape::Angle {
            points: parse_points(node, "data-points")?,
            angle_value: num(node, "data-angle-value")?,
            arc_radius: num(node, "data-arc-radius")?,
        },
    };
    if let Some(fill) = node.attribute("data-fill-color") {
        fill.clone_into(&mut style.fill_color);
    }
    if let Some(width) = opt_num(node, "data-stroke-width")? {
        style.stroke_width = width;
    }
    if let Some(dashed) = node.attribute("data-dashed") {
        style.dashed = dashed == "true";
    }
    Ok(CanvasElement { id, z_index, style, shape })
}

fn parse_text(node: Node<'_, '_>) -> Result<Shape, SvgError> {
    let spans = node.children().filter(|c| c.tag_name().name() == "tspan").collect::<Vec<_>>();
    let text = if spans.is_empty() {
        node.text().unwrap_or_default().to_owned()
    } else {
        spans.iter().map(|s| s.text().unwrap_or_default()).collect::<Vec<_>>().join("\n")
    };
    let font_weight = match node.attribute("font-weight") {
        Some("bold") => FontWeight::Bold,
        _ => FontWeight::Normal,
    };
    let text_align = match node.attribute("text-anchor") {
        Some("middle") => TextAlign::Center,
        Some("end") => TextAlign::Right,
        _ => TextAlign::Left,
    };
    Ok(Shape::Text { x: num(node, "x")?, y: num(node, "y")?, text, font_size: num(node, "font-size")?, font_weight, text_align })
}

fn parse_style(node: Node<'_, '_>) -> Result<Style, SvgError> {
    let defaults = Style::default();
    Ok(Style {
        stroke_color: node.attribute("stroke").map_or(defaults.stroke_color, str::to_owned),
        fill_color: node.attribute("fill").map_or(defaults.fill_color, str::to_owned),
        stroke_width: opt_num(node, "stroke-width")?.unwrap_or(defaults.stroke_width),
        dashed: node.has_attribute("stroke-dasharray"),
        opacity: opt_num(node, "opacity")?.unwrap_or(defaults.opacity),
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &'static str) -> Result<Node<'a, 'input>, SvgError> {
    node.children()
        .find(|c| c.tag_name().name() == tag)
        .ok_or_else(|| SvgError::MissingAttribute { tag: node.tag_name().name().to_owned(), attr: tag })
}

fn num(node: Node<'_, '_>, attr: &'static str) -> Result<f64, SvgError> {
    opt_num(node, attr)?.ok_or_else(|| SvgError::MissingAttribute { tag: node.tag_name().name().to_owned(), attr })
}

fn opt_num(node: Node<'_, '_>, attr: &'static str) -> Result<Option<f64>, SvgError> {
    node.attribute(attr)
        .map(|raw| parse_f64(raw, attr))
        .transpose()
}

fn parse_f64(raw: &str, attr: &'static str) -> Result<f64, SvgError> {
    raw.trim()
        .parse()
        .map_err(|_| SvgError::InvalidNumber { attr, value: raw.to_owned() })
}

fn parse_points(node: Node<'_, '_>, attr: &'static str) -> Result<Vec<Point>, SvgError> {
    let raw = node
        .attribute(attr)
        .ok_or_else(|| SvgError::MissingAttribute { tag: node.tag_name().name().to_owned(), attr })?;
    raw.split_whitespace()
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| SvgError::InvalidNumber { attr, value: pair.to_owned() })?;
            Ok(Point::new(parse_f64(x, attr)?, parse_f64(y, attr)?))
        })
        .collect()
}
