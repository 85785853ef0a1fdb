use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::fmt::SubscriberBuilder;

mod place;
mod provenance;
mod scene;

use provenance::RunRecord;
use scene::Scene;

#[derive(Parser)]
#[command(name = "pal-cli")]
#[command(about = "Label candidate generation over JSON scenes")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Generate candidates for every feature of a scene
    Place {
        #[arg(long)]
        input: PathBuf,
        /// Candidate table, `.csv` or `.parquet`
        #[arg(long)]
        out: PathBuf,
        /// Map extent for size penalties, `xmin,ymin,xmax,ymax` (default: scene bounds)
        #[arg(long)]
        extent: Option<String>,
        /// Cancel the pass after this many milliseconds
        #[arg(long)]
        budget_ms: Option<u64>,
    },
    /// Write a synthetic scene
    Demo {
        #[arg(long, default_value_t = 2025)]
        seed: u64,
        #[arg(long, default_value_t = 10)]
        points: usize,
        #[arg(long, default_value_t = 10)]
        lines: usize,
        #[arg(long, default_value_t = 10)]
        polygons: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the run record of this build
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Place {
            input,
            out,
            extent,
            budget_ms,
        } => place(input, out, extent, budget_ms),
        Action::Demo {
            seed,
            points,
            lines,
            polygons,
            out,
        } => demo(seed, points, lines, polygons, out),
        Action::Report => report(),
    }
}

fn place(input: PathBuf, out: PathBuf, extent: Option<String>, budget_ms: Option<u64>) -> Result<()> {
    let scene = Scene::load(&input)?;
    let parts = scene.build_parts()?;
    let extent = match extent.as_deref() {
        Some(s) => place::parse_extent(s)?,
        None => place::scene_extent(&parts).context("scene has no valid feature parts")?,
    };
    tracing::info!(input = %input.display(), features = scene.features.len(), parts = parts.len(), "place");

    let mut table = place::candidate_table(&parts, scene.settings, extent, budget_ms.map(Duration::from_millis))?;
    place::write_table(&mut table.df, &out)?;
    let summary = place::summarize(&table.df)?;
    tracing::info!(
        out = %out.display(),
        candidates = table.df.height(),
        features = summary.height(),
        canceled = table.canceled,
        "candidates written"
    );
    println!("{summary}");

    RunRecord::new(
        "place",
        serde_json::json!({
            "extent": [extent.xmin, extent.ymin, extent.xmax, extent.ymax],
            "budget_ms": budget_ms,
            "settings": scene.settings,
        }),
    )
    .with_input(&input)?
    .with_results(serde_json::json!({
        "parts": parts.len(),
        "features": summary.height(),
        "candidates": table.df.height(),
        "canceled": table.canceled,
    }))
    .write_sidecar(&out)?;
    Ok(())
}

fn demo(seed: u64, points: usize, lines: usize, polygons: usize, out: PathBuf) -> Result<()> {
    let cfg = pal::api::SynthCfg::default();
    let geometries = pal::api::draw_scene(&cfg, seed, points, lines, polygons);
    let scene = Scene::synthetic(geometries, &cfg);
    scene.save(&out)?;
    tracing::info!(seed, features = scene.features.len(), out = %out.display(), "demo scene written");

    RunRecord::new(
        "demo",
        serde_json::json!({
            "seed": seed,
            "points": points,
            "lines": lines,
            "polygons": polygons,
            "synth": cfg,
        }),
    )
    .with_results(serde_json::json!({ "features": scene.features.len() }))
    .write_sidecar(&out)?;
    Ok(())
}

fn report() -> Result<()> {
    let record = RunRecord::new("report", serde_json::json!({}));
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
