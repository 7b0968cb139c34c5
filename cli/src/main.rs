#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::fs;
use std::io::{self, Read};

use canvas::doc::CanvasData;
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("could not read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("invalid SVG: {0}")]
    Svg(#[from] canvas::svg::SvgError),
    #[error("diagram has no cached SVG")]
    NoSvg,
}

#[derive(Parser, Debug)]
#[command(name = "diagram-cli", about = "Diagram renderer and diagram store CLI")]
struct Cli {
    #[arg(long, env = "DIAGRAM_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the store is up.
    Ping,
    /// Render a canvas JSON file to SVG without contacting the store.
    Render(RenderArgs),
    /// Parse exported SVG back into canvas JSON.
    Import {
        #[arg(default_value = "-", help = "Input file path, or - for stdin")]
        input: String,
    },
    Diagram(DiagramCommand),
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    #[arg(long, short, help = "Output file path; stdout when omitted")]
    output: Option<String>,

    #[arg(long, default_value_t = 800.0)]
    width: f64,

    #[arg(long, default_value_t = 600.0)]
    height: f64,
}

#[derive(Args, Debug)]
struct DiagramCommand {
    #[command(subcommand)]
    command: DiagramSubcommand,
}

#[derive(Subcommand, Debug)]
enum DiagramSubcommand {
    List {
        #[arg(long)]
        subject_id: Option<Uuid>,
        #[arg(long)]
        diagram_type: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    Read {
        diagram_id: Uuid,
    },
    Create {
        #[arg(long)]
        title: String,
        #[command(flatten)]
        fields: DiagramFieldArgs,
    },
    Update {
        diagram_id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: DiagramFieldArgs,
    },
    Delete {
        diagram_id: Uuid,
    },
    /// Fetch the cached SVG.
    Svg {
        diagram_id: Uuid,
        #[arg(long, short)]
        output: Option<String>,
    },
    Versions {
        diagram_id: Uuid,
    },
    Version {
        diagram_id: Uuid,
        version_ts: i64,
    },
    Restore {
        diagram_id: Uuid,
        version_ts: i64,
    },
}

#[derive(Args, Debug, Default)]
struct DiagramFieldArgs {
    #[arg(long)]
    subject_id: Option<Uuid>,
    #[arg(long)]
    diagram_type: Option<String>,
    /// Repeat for several tags.
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long, help = "Canvas JSON file to store")]
    canvas: Option<String>,
    #[arg(long)]
    width: Option<i32>,
    #[arg(long)]
    height: Option<i32>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let base_url = cli.base_url;

    match cli.command {
        Command::Ping => run_ping(&base_url).await,
        Command::Render(args) => run_render(args),
        Command::Import { input } => run_import(&input),
        Command::Diagram(diagram) => run_diagram(&base_url, diagram).await,
    }
}

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let response = reqwest::get(api_url(base_url, "/healthz")).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

fn run_render(args: RenderArgs) -> Result<(), CliError> {
    let data = parse_canvas(&read_input(&args.input)?)?;
    let svg = canvas::svg::to_svg(&data, args.width, args.height);
    write_output(args.output.as_deref(), &svg)?;
    eprintln!("rendered {} elements", data.len());
    Ok(())
}

fn run_import(input: &str) -> Result<(), CliError> {
    let elements = canvas::svg::from_svg(&read_input(input)?)?;
    let data = CanvasData { elements, ..CanvasData::default() };
    print_json(&data.to_value()?)
}

async fn run_diagram(base_url: &str, diagram: DiagramCommand) -> Result<(), CliError> {
    let json = match diagram.command {
        DiagramSubcommand::List { subject_id, diagram_type, tag } => {
            let query = list_query(subject_id, diagram_type, tag);
            let path = if query.is_empty() { "/api/diagrams".to_owned() } else { format!("/api/diagrams?{query}") };
            api_request(base_url, reqwest::Method::GET, &path, None).await?
        }
        DiagramSubcommand::Read { diagram_id } => {
            let path = format!("/api/diagrams/{diagram_id}");
            api_request(base_url, reqwest::Method::GET, &path, None).await?
        }
        DiagramSubcommand::Create { title, fields } => {
            let mut body = diagram_body(fields)?;
            body.insert("title".to_owned(), Value::String(title));
            api_request(base_url, reqwest::Method::POST, "/api/diagrams", Some(Value::Object(body))).await?
        }
        DiagramSubcommand::Update { diagram_id, title, fields } => {
            let mut body = diagram_body(fields)?;
            if let Some(title) = title {
                body.insert("title".to_owned(), Value::String(title));
            }
            let path = format!("/api/diagrams/{diagram_id}");
            api_request(base_url, reqwest::Method::PATCH, &path, Some(Value::Object(body))).await?
        }
        DiagramSubcommand::Delete { diagram_id } => {
            let path = format!("/api/diagrams/{diagram_id}");
            api_request(base_url, reqwest::Method::DELETE, &path, None).await?;
            eprintln!("deleted diagram: {diagram_id}");
            return Ok(());
        }
        DiagramSubcommand::Svg { diagram_id, output } => {
            let path = format!("/api/diagrams/{diagram_id}");
            let row = api_request(base_url, reqwest::Method::GET, &path, None).await?;
            let svg = row.get("svg_data").and_then(Value::as_str).ok_or(CliError::NoSvg)?;
            return write_output(output.as_deref(), svg);
        }
        DiagramSubcommand::Versions { diagram_id } => {
            let path = format!("/api/diagrams/{diagram_id}/versions");
            let versions = api_request(base_url, reqwest::Method::GET, &path, None).await?;
            Value::Array(version_summaries(&versions))
        }
        DiagramSubcommand::Version { diagram_id, version_ts } => {
            let path = format!("/api/diagrams/{diagram_id}/versions/{version_ts}");
            api_request(base_url, reqwest::Method::GET, &path, None).await?
        }
        DiagramSubcommand::Restore { diagram_id, version_ts } => {
            let path = format!("/api/diagrams/{diagram_id}/versions/{version_ts}/restore");
            api_request(base_url, reqwest::Method::POST, &path, None).await?
        }
    };
    print_json(&json)
}

async fn api_request(
    base_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
) -> Result<Value, CliError> {
    let client = reqwest::Client::new();
    let request = client.request(method, api_url(base_url, path));
    let request = if let Some(json) = body { request.json(&json) } else { request };

    let response = request.send().await?;
    let status = response.status();
    let value = response.json::<Value>().await.unwrap_or_else(|_| Value::Null);

    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: value.to_string() });
    }

    Ok(value)
}

fn api_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

fn list_query(subject_id: Option<Uuid>, diagram_type: Option<String>, tag: Option<String>) -> String {
    let mut parts = Vec::new();
    if let Some(subject_id) = subject_id {
        parts.push(format!("subject_id={subject_id}"));
    }
    if let Some(diagram_type) = diagram_type {
        parts.push(format!("diagram_type={}", encode_query_value(&diagram_type)));
    }
    if let Some(tag) = tag {
        parts.push(format!("tag={}", encode_query_value(&tag)));
    }
    parts.join("&")
}

/// Percent-encode everything outside the URL-unreserved set.
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// Request body fields shared by create and update. Absent flags are omitted.
fn diagram_body(fields: DiagramFieldArgs) -> Result<Map<String, Value>, CliError> {
    let mut body = Map::new();
    if let Some(subject_id) = fields.subject_id {
        body.insert("subject_id".to_owned(), Value::String(subject_id.to_string()));
    }
    if let Some(diagram_type) = fields.diagram_type {
        body.insert("diagram_type".to_owned(), Value::String(diagram_type));
    }
    if !fields.tags.is_empty() {
        body.insert("tags".to_owned(), Value::Array(fields.tags.into_iter().map(Value::String).collect()));
    }
    if let Some(path) = fields.canvas {
        let data = parse_canvas(&read_input(&path)?)?;
        body.insert("canvas_data".to_owned(), data.to_value()?);
    }
    if let Some(width) = fields.width {
        body.insert("width".to_owned(), Value::from(width));
    }
    if let Some(height) = fields.height {
        body.insert("height".to_owned(), Value::from(height));
    }
    Ok(body)
}

/// Drop the bulky content from a version list, keeping what identifies each entry.
fn version_summaries(versions: &Value) -> Vec<Value> {
    versions
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    let elements = row
                        .get("canvas_data")
                        .and_then(|c| c.get("elements"))
                        .and_then(Value::as_array)
                        .map_or(0, Vec::len);
                    serde_json::json!({
                        "version_ts": row.get("version_ts").cloned().unwrap_or(Value::Null),
                        "created_at": row.get("created_at").cloned().unwrap_or(Value::Null),
                        "elements": elements,
                        "has_svg": row.get("svg_data").is_some_and(|v| !v.is_null()),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_canvas(raw: &str) -> Result<CanvasData, CliError> {
    Ok(CanvasData::from_value(serde_json::from_str::<Value>(raw)?)?)
}

fn read_input(path: &str) -> Result<String, CliError> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Read { path: "stdin".to_owned(), source })?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })
}

fn write_output(path: Option<&str>, content: &str) -> Result<(), CliError> {
    match path {
        Some(path) => {
            fs::write(path, content).map_err(|source| CliError::Write { path: path.to_owned(), source })?;
            eprintln!("wrote {path}");
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
