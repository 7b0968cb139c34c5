#![allow(clippy::float_cmp)]

use super::*;

fn el(shape: Shape) -> CanvasElement {
    CanvasElement::new(shape, Style::default(), 0)
}

fn data_of(elements: Vec<CanvasElement>) -> CanvasData {
    CanvasData { elements, ..CanvasData::default() }
}

fn round_trip(elements: Vec<CanvasElement>) -> Vec<CanvasElement> {
    let markup = to_svg(&data_of(elements), 800.0, 600.0);
    from_svg(&markup).unwrap()
}

// =============================================================
// Export
// =============================================================

#[test]
fn empty_canvas_is_bare_svg() {
    let markup = to_svg(&CanvasData::default(), 800.0, 600.0);
    assert!(markup.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"800\" height=\"600\""));
    assert!(markup.trim_end().ends_with("</svg>"));
    assert!(!markup.contains("data-kind"));
}

#[test]
fn background_becomes_full_rect() {
    let data = CanvasData { background_color: Some("#fafafa".into()), ..CanvasData::default() };
    assert!(to_svg(&data, 10.0, 10.0).contains("<rect width=\"100%\" height=\"100%\" fill=\"#fafafa\"/>"));
}

#[test]
fn elements_carry_id_and_kind() {
    let line = el(Shape::Line { x: 0.0, y: 0.0, x2: 1.0, y2: 1.0 });
    let markup = to_svg(&data_of(vec![line.clone()]), 100.0, 100.0);
    assert!(markup.contains(&format!("data-id=\"{}\"", line.id)));
    assert!(markup.contains("data-kind=\"line\""));
}

#[test]
fn arrow_has_arrowhead_polyline() {
    let arrow = el(Shape::Arrow { x: 0.0, y: 0.0, x2: 100.0, y2: 0.0 });
    let markup = to_svg(&data_of(vec![arrow]), 100.0, 100.0);
    assert!(markup.contains("<polyline points=\""));
    // Tip is the middle point of the barb polyline.
    assert!(markup.contains(" 100,0 "));
}

#[test]
fn dashed_style_emits_dasharray() {
    let mut line = el(Shape::Line { x: 0.0, y: 0.0, x2: 1.0, y2: 1.0 });
    line.style.dashed = true;
    let markup = to_svg(&data_of(vec![line]), 10.0, 10.0);
    assert!(markup.contains("stroke-dasharray=\"6 4\""));
}

#[test]
fn text_is_escaped_and_split_into_lines() {
    let text = el(Shape::Text {
        x: 0.0,
        y: 0.0,
        text: "a < b\n\"q\" & r".into(),
        font_size: 10.0,
        font_weight: FontWeight::Bold,
        text_align: TextAlign::Center,
    });
    let markup = to_svg(&data_of(vec![text]), 10.0, 10.0);
    assert!(markup.contains(">a &lt; b</tspan>"));
    assert!(markup.contains(">&quot;q&quot; &amp; r</tspan>"));
    assert!(markup.contains("text-anchor=\"middle\""));
    assert!(markup.contains("font-weight=\"bold\""));
}

#[test]
fn open_polygon_is_unfilled_polyline() {
    let poly = el(Shape::Polygon { points: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)], closed: false });
    let markup = to_svg(&data_of(vec![poly]), 10.0, 10.0);
    assert!(markup.contains("<polyline data-id"));
    assert!(markup.contains("fill=\"none\""));
}

#[test]
fn angle_sweep_flag_follows_sign() {
    let make = |deg: f64| {
        el(Shape::Angle {
            points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            angle_value: deg,
            arc_radius: 20.0,
        })
    };
    let positive = to_svg(&data_of(vec![make(90.0)]), 10.0, 10.0);
    let negative = to_svg(&data_of(vec![make(-90.0)]), 10.0, 10.0);
    assert!(positive.contains("A 20 20 0 0 1 "));
    assert!(negative.contains("A 20 20 0 0 0 "));
    assert!(positive.contains(">90°</text>"));
}

#[test]
fn reflex_angle_uses_large_arc() {
    let angle = el(Shape::Angle {
        points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
        angle_value: 270.0,
        arc_radius: 20.0,
    });
    assert!(to_svg(&data_of(vec![angle]), 10.0, 10.0).contains("A 20 20 0 1 1 "));
}

// =============================================================
// Round trip
// =============================================================

#[test]
fn round_trip_preserves_exact_basic_geometry() {
    let mut rect = el(Shape::Rectangle { x: 10.5, y: -3.25, width: 0.1 + 0.2, height: 42.0 });
    rect.style = Style { stroke_color: "#123456".into(), fill_color: "#abcdef".into(), stroke_width: 3.0, dashed: true, opacity: 0.5 };
    let elements = vec![
        el(Shape::Line { x: 1.0, y: 2.0, x2: 3.0, y2: 4.0 }),
        rect,
        el(Shape::Circle { x: 7.0, y: 8.0, radius: 9.5 }),
    ];
    assert_eq!(round_trip(elements.clone()), elements);
}

#[test]
fn round_trip_preserves_kind_of_every_shape() {
    let elements = vec![
        el(Shape::Line { x: 0.0, y: 0.0, x2: 1.0, y2: 1.0 }),
        el(Shape::Arrow { x: 0.0, y: 0.0, x2: 50.0, y2: 20.0 }),
        el(Shape::Rectangle { x: 0.0, y: 0.0, width: 5.0, height: 5.0 }),
        el(Shape::Circle { x: 0.0, y: 0.0, radius: 5.0 }),
        el(Shape::Text {
            x: 1.0,
            y: 2.0,
            text: "two\nlines".into(),
            font_size: 14.0,
            font_weight: FontWeight::Normal,
            text_align: TextAlign::Right,
        }),
        el(Shape::Point { x: 3.0, y: 3.0, radius: 4.0 }),
        el(Shape::Polygon {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)],
            closed: true,
        }),
        el(Shape::Polygon { points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)], closed: false }),
        el(Shape::Angle {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            angle_value: -45.0,
            arc_radius: 24.0,
        }),
    ];
    let parsed = round_trip(elements.clone());
    assert_eq!(parsed.len(), elements.len());
    for (before, after) in elements.iter().zip(&parsed) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.kind(), after.kind());
        assert_eq!(before.shape, after.shape);
    }
}

#[test]
fn round_trip_keeps_z_index_and_text_color() {
    let mut text = CanvasElement::new(
        Shape::Text {
            x: 0.0,
            y: 0.0,
            text: "x".into(),
            font_size: 12.0,
            font_weight: FontWeight::Normal,
            text_align: TextAlign::Left,
        },
        Style::default(),
        7,
    );
    text.style.stroke_color = "#ff0000".into();
    let parsed = round_trip(vec![text]);
    assert_eq!(parsed[0].z_index, 7);
    assert_eq!(parsed[0].style.stroke_color, "#ff0000");
}

#[test]
fn round_trip_keeps_point_fill_equal_to_stroke() {
    let style = Style { stroke_color: "#123456".into(), fill_color: "#123456".into(), ..Style::default() };
    let point = CanvasElement::new(Shape::Point { x: 3.0, y: 4.0, radius: 2.0 }, style.clone(), 0);
    let parsed = round_trip(vec![point]);
    assert_eq!(parsed[0].style, style);
}

#[test]
fn round_trip_keeps_unfilled_point_unfilled() {
    let point = el(Shape::Point { x: 3.0, y: 4.0, radius: 2.0 });
    let parsed = round_trip(vec![point]);
    assert_eq!(parsed[0].style.fill_color, Style::default().fill_color);
}

#[test]
fn round_trip_keeps_text_stroke_width_and_dash() {
    let style = Style { stroke_width: 4.5, dashed: true, fill_color: "#eeeeee".into(), ..Style::default() };
    let text = CanvasElement::new(
        Shape::Text {
            x: 1.0,
            y: 2.0,
            text: "label".into(),
            font_size: 14.0,
            font_weight: FontWeight::Normal,
            text_align: TextAlign::Left,
        },
        style.clone(),
        0,
    );
    let parsed = round_trip(vec![text]);
    assert_eq!(parsed[0].style, style);
}

#[test]
fn legacy_point_markup_without_data_fill_falls_back() {
    let markup = r##"<svg xmlns="http://www.w3.org/2000/svg"><circle data-kind="point" cx="1" cy="2" r="3" stroke="#000" fill="#000"/></svg>"##;
    let parsed = from_svg(markup).unwrap();
    assert_eq!(parsed[0].style.fill_color, Style::default().fill_color);
}

// =============================================================
// Import errors
// =============================================================

#[test]
fn from_svg_rejects_malformed_xml() {
    assert!(matches!(from_svg("<svg><line></svg>"), Err(SvgError::Xml(_))));
}

#[test]
fn from_svg_rejects_non_svg_root() {
    assert!(matches!(from_svg("<html/>"), Err(SvgError::NotSvg(tag)) if tag == "html"));
}

#[test]
fn from_svg_rejects_unknown_kind() {
    let markup = "<svg><rect data-kind=\"hexagon\"/></svg>";
    assert!(matches!(from_svg(markup), Err(SvgError::UnknownKind(k)) if k == "hexagon"));
}

#[test]
fn from_svg_reports_missing_geometry() {
    let markup = "<svg><line data-kind=\"line\" x1=\"0\" y1=\"0\" x2=\"1\"/></svg>";
    assert!(matches!(from_svg(markup), Err(SvgError::MissingAttribute { attr: "y2", .. })));
}

#[test]
fn from_svg_reports_bad_numbers() {
    let markup = "<svg><circle data-kind=\"circle\" cx=\"zero\" cy=\"0\" r=\"1\"/></svg>";
    assert!(matches!(from_svg(markup), Err(SvgError::InvalidNumber { attr: "cx", .. })));
}

#[test]
fn from_svg_skips_untagged_nodes_and_assigns_missing_ids() {
    let markup = "<svg><rect width=\"100%\" height=\"100%\"/><circle data-kind=\"circle\" cx=\"1\" cy=\"2\" r=\"3\"/></svg>";
    let parsed = from_svg(markup).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].shape, Shape::Circle { x: 1.0, y: 2.0, radius: 3.0 });
    assert_eq!(parsed[0].z_index, 0);
}

#[test]
fn from_svg_rejects_bad_id() {
    let markup = "<svg><circle data-id=\"nope\" data-kind=\"circle\" cx=\"1\" cy=\"2\" r=\"3\"/></svg>";
    assert!(matches!(from_svg(markup), Err(SvgError::InvalidId(_))));
}
