use futures::executor::block_on;
use ovstopo::render::{
    ForceLayoutGraph, GraphLink, GraphNode, HeadlessError, HeadlessViewer, NodeSelector, Point,
    PositionCache, render_logical_svg, render_physical_svg,
};
use ovstopo::{
    DirectorySource, HostSelection, ViewerConfig, load_logical_topology, load_topology,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::Path;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Load(ovstopo::Error),
    Render(ovstopo_render::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Load(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ovstopo::Error> for CliError {
    fn from(value: ovstopo::Error) -> Self {
        Self::Load(value)
    }
}

impl From<ovstopo_render::Error> for CliError {
    fn from(value: ovstopo_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        match value {
            HeadlessError::Load(err) => Self::Load(err),
            HeadlessError::Render(err) => Self::Render(err),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Topology,
    Logical,
    Layout,
    Render,
}

#[derive(Debug, Clone, Copy, Default)]
enum View {
    #[default]
    Physical,
    Logical,
}

impl FromStr for View {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physical" => Ok(Self::Physical),
            "logical" => Ok(Self::Logical),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    view: Option<View>,
    input: Option<String>,
    pretty: bool,
    perspective: bool,
    ticks: Option<usize>,
    width: Option<f64>,
    height: Option<f64>,
    config: Option<String>,
    positions: Option<String>,
    tenant: Option<String>,
    out: Option<String>,
}

#[derive(Serialize)]
struct TenantOut<'a> {
    tenant: &'a str,
    hosts: HostSelection,
}

#[derive(Serialize)]
struct PhysicalOut<'a> {
    nodes: &'a [GraphNode],
    links: &'a [GraphLink],
    transform: [f64; 6],
    perspective: bool,
    background: Option<[Point; 4]>,
}

impl<'a> From<&'a ForceLayoutGraph> for PhysicalOut<'a> {
    fn from(graph: &'a ForceLayoutGraph) -> Self {
        Self {
            nodes: graph.nodes(),
            links: graph.links(),
            transform: graph.transform().to_svg_components(),
            perspective: graph.is_perspective(),
            background: graph.background(),
        }
    }
}

fn usage() -> &'static str {
    "ovstopo-cli\n\
\n\
USAGE:\n\
  ovstopo-cli topology [--pretty] [--out <path>] <dir>\n\
  ovstopo-cli logical [--pretty] [--tenant <id>] [--out <path>] <dir>\n\
  ovstopo-cli layout physical|logical [--pretty] [--ticks <n>] [--width <w>] [--height <h>] [--config <file.json>] [--positions <file.json>] [--tenant <id>] [--perspective] [--out <path>] <dir>\n\
  ovstopo-cli render physical|logical [--ticks <n>] [--width <w>] [--height <h>] [--config <file.json>] [--positions <file.json>] [--tenant <id>] [--perspective] [--out <path>] <dir>\n\
\n\
NOTES:\n\
  - <dir> holds inventory.json, network-topology.json and the Neutron collections\n\
    (networks.json, subnets.json, routers.json, ports.json, floatingips.json).\n\
  - --view physical|logical is an alternative to the positional view.\n\
  - --config is deep-merged over the built-in defaults; --width/--height win over it.\n\
  - --positions reads cached node positions (if the file exists) and writes them back.\n\
  - --tenant dims every physical node that does not host one of the tenant's ports.\n\
  - Output goes to stdout unless --out is given. Set RUST_LOG for diagnostics.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_canvas_dim(raw: &str) -> Result<f64, CliError> {
    let v = raw.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "topology" => args.command = Command::Topology,
            "logical" if matches!(args.command, Command::Layout | Command::Render) => {
                if args.view.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.view = Some(View::Logical);
            }
            "logical" => args.command = Command::Logical,
            "physical" if matches!(args.command, Command::Layout | Command::Render) => {
                if args.view.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.view = Some(View::Physical);
            }
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--perspective" => args.perspective = true,
            "--ticks" => {
                let n = next_value(&mut it)?;
                args.ticks = Some(n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--width" => args.width = Some(parse_canvas_dim(next_value(&mut it)?)?),
            "--height" => args.height = Some(parse_canvas_dim(next_value(&mut it)?)?),
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--positions" => args.positions = Some(next_value(&mut it)?.clone()),
            "--tenant" => args.tenant = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--view" => {
                let view = next_value(&mut it)?;
                args.view = Some(view.parse::<View>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn to_json(value: &impl Serialize, pretty: bool) -> Result<String, CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    Ok(text)
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::debug!(path, bytes = text.len(), "wrote output");
            Ok(())
        }
    }
}

fn build_viewer(args: &Args) -> Result<HeadlessViewer, CliError> {
    let mut cfg = ViewerConfig::default();
    if let Some(path) = args.config.as_deref() {
        let text = std::fs::read_to_string(path)?;
        let overrides: Value = serde_json::from_str(&text)?;
        cfg.deep_merge(&overrides);
    }
    if let Some(w) = args.width {
        cfg.set_value("canvas.width", json!(w));
    }
    if let Some(h) = args.height {
        cfg.set_value("canvas.height", json!(h));
    }

    let mut viewer = HeadlessViewer::from_config(&cfg)?.with_perspective(args.perspective);
    if let Some(ticks) = args.ticks {
        viewer = viewer.with_max_ticks(ticks);
    }
    Ok(viewer)
}

fn physical_graph(
    viewer: &HeadlessViewer,
    source: &DirectorySource,
    args: &Args,
) -> Result<ForceLayoutGraph, CliError> {
    let positions = match args.positions.as_deref() {
        Some(path) => Some(PositionCache::load(Path::new(path))?),
        None => None,
    };

    let graph = match args.tenant.as_deref() {
        Some(tenant) => {
            let (topo, logical) = block_on(load_logical_topology(source, source))?;
            let mut graph = viewer.layout_topology(&topo, positions)?;
            let selection = logical.extract_by_tenant(tenant);
            let ids: Vec<&str> = selection.node_ids().collect();
            graph.filter_node(&ids, NodeSelector::All, true);
            graph.filter_link();
            graph
        }
        None => viewer.layout_physical_sync(source, positions)?,
    };

    if let Some(path) = args.positions.as_deref() {
        graph.position_cache().save(Path::new(path))?;
    }
    Ok(graph)
}

fn run(args: Args) -> Result<(), CliError> {
    let Some(dir) = args.input.as_deref() else {
        return Err(CliError::Usage(usage()));
    };
    let source = DirectorySource::new(dir);
    let out = args.out.as_deref();

    match args.command {
        Command::Topology => {
            let topo = block_on(load_topology(&source))?;
            write_text(&to_json(&topo, args.pretty)?, out)
        }
        Command::Logical => {
            let (_, logical) = block_on(load_logical_topology(&source, &source))?;
            let text = match args.tenant.as_deref() {
                Some(tenant) => to_json(
                    &TenantOut {
                        tenant,
                        hosts: logical.extract_by_tenant(tenant),
                    },
                    args.pretty,
                )?,
                None => to_json(&logical, args.pretty)?,
            };
            write_text(&text, out)
        }
        Command::Layout | Command::Render => {
            let viewer = build_viewer(&args)?;
            let render = matches!(args.command, Command::Render);
            let text = match args.view.unwrap_or_default() {
                View::Physical => {
                    let graph = physical_graph(&viewer, &source, &args)?;
                    if render {
                        render_physical_svg(&graph)
                    } else {
                        to_json(&PhysicalOut::from(&graph), args.pretty)?
                    }
                }
                View::Logical => {
                    let layout = viewer.layout_logical_sync(&source, &source)?;
                    if render {
                        render_logical_svg(&layout)
                    } else {
                        to_json(&layout, args.pretty)?
                    }
                }
            };
            write_text(&text, out)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
