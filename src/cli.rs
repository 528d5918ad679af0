use crate::config::load_config;
use crate::extract::{HierarchyExtractor, Record, parse_records};
use crate::ir::{Connection, Direction};
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_svg};
use crate::surface::DiagramSurface;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sflow", version, about = "Schema diagrams with hierarchical auto-layout")]
pub struct Args {
    /// Input records (JSON array) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Label of the root node
    #[arg(short = 'r', long = "root", default_value = "root")]
    pub root: String,

    /// Layout direction
    #[arg(short = 'd', long = "direction", value_enum, default_value = "tb")]
    pub direction: DirectionArg,

    /// Highlight a node, as if it had been clicked (last one wins)
    #[arg(short = 's', long = "select")]
    pub select: Vec<String>,

    /// Add an edge, as if dragged: SRC[:HANDLE]=DST[:HANDLE]
    #[arg(long = "connect", value_parser = parse_connection)]
    pub connect: Vec<Connection>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Write the computed layout as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum DirectionArg {
    Tb,
    Lr,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Tb => Direction::TopBottom,
            DirectionArg::Lr => Direction::LeftRight,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    execute(args)
}

/// Runs one invocation: records in, diagram (and optional layout dump) out.
pub fn execute(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let records = read_records(args.input.as_deref())?;

    let mut surface = DiagramSurface::new(&records, &HierarchyExtractor, &args.root, &config)?;
    let direction = Direction::from(args.direction);
    if direction != surface.direction() {
        surface.relayout(direction)?;
    }
    for connection in args.connect {
        surface.connect(connection)?;
    }
    for id in &args.select {
        surface.click_node(id)?;
    }

    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &surface)?;
    }

    let svg = render_svg(&surface, &config.theme);
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => write_png(&svg, args.output.as_deref(), &config)?,
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: Option<&Path>, config: &crate::config::Config) -> Result<()> {
    let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    crate::render::write_output_png(svg, output, &config.surface)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: Option<&Path>, _config: &crate::config::Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "schema_flow=warn",
        1 => "schema_flow=debug",
        _ => "schema_flow=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_records(path: Option<&Path>) -> Result<Vec<Record>> {
    let input = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    parse_records(&input)
}

fn parse_connection(raw: &str) -> Result<Connection, String> {
    let (source, target) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SRC[:HANDLE]=DST[:HANDLE], got `{raw}`"))?;
    let (source, source_handle) = split_endpoint(source)?;
    let (target, target_handle) = split_endpoint(target)?;
    Ok(Connection {
        source,
        target,
        source_handle,
        target_handle,
    })
}

fn split_endpoint(raw: &str) -> Result<(String, Option<String>), String> {
    let raw = raw.trim();
    let (id, handle) = match raw.split_once(':') {
        Some((id, handle)) => (id.trim(), Some(handle.trim().to_string())),
        None => (raw, None),
    };
    if id.is_empty() {
        return Err(format!("empty node id in `{raw}`"));
    }
    Ok((id.to_string(), handle.filter(|h| !h.is_empty())))
}
