mod output;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use layerscope_core::computations::{Computation, RectsComputation, ZOrderPathsComputation};
use layerscope_core::model::{GEOMETRY_PROPERTIES, HierarchyTreeNode, TreeNode};
use layerscope_core::parsers::{Resolution, hierarchy_from_json};
use layerscope_protocol::TraceRect;
use log::info;

#[derive(Parser)]
#[command(name = "layerscope")]
#[command(about = "Compute the rects a surface viewer draws for one frame dump")]
struct Cli {
    /// Frame dump with `displays` and `layers` arrays
    frame: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Derive `zOrderPath` from `z` and `zOrderRelativeOf` first
    #[arg(long)]
    z_order: bool,

    /// Build layer properties on demand and run the eager pass explicitly
    #[arg(long)]
    lazy: bool,

    /// Leave display rects out of the output
    #[arg(long)]
    layers_only: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    let data = std::fs::read(&cli.frame)
        .with_context(|| format!("failed to read {}", cli.frame.display()))?;
    let resolution = if cli.lazy {
        Resolution::Lazy
    } else {
        Resolution::Eager
    };
    let mut root = hierarchy_from_json(&data, resolution)
        .with_context(|| format!("failed to load frame from {}", cli.frame.display()))?;

    if cli.lazy {
        root.resolve_eager_dfs(GEOMETRY_PROPERTIES)
            .context("eager property pass failed")?;
    }
    if cli.z_order {
        ZOrderPathsComputation::new()
            .set_root(&mut root)
            .execute_in_place()
            .context("z-order path computation failed")?;
    }
    RectsComputation::new()
        .set_root(&mut root)
        .execute_in_place()
        .context("rects computation failed")?;

    let rects = collect_rects(&root, cli.layers_only);
    info!("{} rects from {}", rects.len(), cli.frame.display());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Table => output::write_table(&mut out, &rects)?,
        OutputFormat::Json => output::write_json(&mut out, &rects)?,
    }
    out.flush()?;
    Ok(())
}

/// Displays first, then layers of each stack from the top down.
fn collect_rects(root: &HierarchyTreeNode, layers_only: bool) -> Vec<TraceRect> {
    let mut layers: Vec<TraceRect> = root
        .filter_dfs(|node| !node.is_root())
        .iter()
        .flat_map(|node| node.rects().iter().cloned())
        .collect();
    layers.sort_by(|a, b| a.group_id.cmp(&b.group_id).then(b.depth.cmp(&a.depth)));

    if layers_only {
        return layers;
    }
    root.rects().iter().cloned().chain(layers).collect()
}
