use super::*;

#[test]
fn api_url_joins_without_double_slash() {
    assert_eq!(api_url("http://localhost:3000/", "/healthz"), "http://localhost:3000/healthz");
    assert_eq!(api_url("http://localhost:3000", "/api/diagrams"), "http://localhost:3000/api/diagrams");
}

#[test]
fn list_query_is_empty_without_filters() {
    assert_eq!(list_query(None, None, None), "");
}

#[test]
fn list_query_encodes_filters() {
    let subject = Uuid::nil();
    let query = list_query(Some(subject), Some("logic gate".to_owned()), Some("a&b".to_owned()));
    assert_eq!(query, format!("subject_id={subject}&diagram_type=logic%20gate&tag=a%26b"));
}

#[test]
fn encode_query_value_keeps_unreserved() {
    assert_eq!(encode_query_value("AZaz09-_.~"), "AZaz09-_.~");
    assert_eq!(encode_query_value("é"), "%C3%A9");
}

#[test]
fn diagram_body_omits_absent_fields() {
    let body = diagram_body(DiagramFieldArgs::default()).unwrap();
    assert!(body.is_empty());
}

#[test]
fn diagram_body_includes_present_fields() {
    let fields = DiagramFieldArgs {
        diagram_type: Some("flowchart".to_owned()),
        tags: vec!["cpu".to_owned(), "memory".to_owned()],
        width: Some(400),
        ..DiagramFieldArgs::default()
    };
    let body = diagram_body(fields).unwrap();
    assert_eq!(body["diagram_type"], "flowchart");
    assert_eq!(body["tags"], serde_json::json!(["cpu", "memory"]));
    assert_eq!(body["width"], 400);
    assert!(!body.contains_key("height"));
}

#[test]
fn diagram_body_reports_missing_canvas_file() {
    let fields = DiagramFieldArgs { canvas: Some("/nonexistent/canvas.json".to_owned()), ..DiagramFieldArgs::default() };
    assert!(matches!(diagram_body(fields), Err(CliError::Read { .. })));
}

#[test]
fn parse_canvas_accepts_empty_document() {
    let data = parse_canvas("{}").unwrap();
    assert!(data.is_empty());
}

#[test]
fn parse_canvas_rejects_bad_json() {
    assert!(matches!(parse_canvas("{"), Err(CliError::InvalidJson(_))));
}

#[test]
fn version_summaries_count_elements() {
    let versions = serde_json::json!([
        { "version_ts": 2, "created_at": 20, "canvas_data": { "elements": [{}, {}] }, "svg_data": "<svg/>" },
        { "version_ts": 1, "created_at": 10, "canvas_data": null, "svg_data": null },
    ]);
    let summaries = version_summaries(&versions);
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0]["elements"], 2);
    assert_eq!(summaries[0]["has_svg"], true);
    assert_eq!(summaries[1]["elements"], 0);
    assert_eq!(summaries[1]["has_svg"], false);
}

#[test]
fn version_summaries_tolerate_non_array() {
    assert!(version_summaries(&Value::Null).is_empty());
}

#[test]
fn cli_parses_render_and_diagram_commands() {
    let cli = Cli::try_parse_from(["diagram-cli", "render", "in.json", "--width", "320"]).unwrap();
    assert!(matches!(cli.command, Command::Render(RenderArgs { width, .. }) if (width - 320.0).abs() < f64::EPSILON));

    let cli = Cli::try_parse_from([
        "diagram-cli",
        "diagram",
        "create",
        "--title",
        "Adder",
        "--tag",
        "logic",
        "--tag",
        "gates",
    ])
    .unwrap();
    let Command::Diagram(DiagramCommand { command: DiagramSubcommand::Create { title, fields } }) = cli.command else {
        panic!("expected diagram create");
    };
    assert_eq!(title, "Adder");
    assert_eq!(fields.tags, vec!["logic", "gates"]);
}
