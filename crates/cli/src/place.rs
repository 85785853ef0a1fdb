//! Candidate generation over a scene and the candidate table.

use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use pal::api::{BBox, FeaturePart, Pal, PalSettings};
use polars::prelude::*;

/// Column buffers, one row per candidate.
#[derive(Default)]
struct Rows {
    feature_id: Vec<i64>,
    part: Vec<u32>,
    x: Vec<f64>,
    y: Vec<f64>,
    width: Vec<f64>,
    height: Vec<f64>,
    angle: Vec<f64>,
    cost: Vec<f64>,
    quadrant: Vec<&'static str>,
    reversed: Vec<bool>,
    glyphs: Vec<u32>,
}

/// Candidate rows of one placement pass.
pub struct CandidateTable {
    pub df: DataFrame,
    /// The time budget ran out and the table is partial.
    pub canceled: bool,
}

/// Generate candidates for every part and collect them into a table.
///
/// Size penalties are applied against `extent`. With a time budget, the
/// pass is canceled once the budget runs out; parts reached after that
/// contribute whatever their generators produced before noticing.
pub fn candidate_table(
    parts: &[FeaturePart],
    settings: PalSettings,
    extent: BBox,
    budget: Option<Duration>,
) -> Result<CandidateTable> {
    let start = Instant::now();
    let out_of_time = || budget.is_some_and(|b| start.elapsed() > b);
    let pal = Pal::with_feedback(settings, &out_of_time);

    let mut rows = Rows::default();
    for (i, fp) in parts.iter().enumerate() {
        let mut candidates = fp.create_candidates(&pal);
        fp.add_size_penalty(&mut candidates, extent);
        tracing::debug!(feature = fp.feature_id(), part = i, candidates = candidates.len(), "part done");
        for c in &candidates {
            rows.feature_id.push(fp.feature_id());
            rows.part.push(i as u32);
            rows.x.push(c.x());
            rows.y.push(c.y());
            rows.width.push(c.width());
            rows.height.push(c.height());
            rows.angle.push(c.alpha());
            rows.cost.push(c.cost());
            rows.quadrant.push(c.quadrant().as_str());
            rows.reversed.push(c.reversed());
            rows.glyphs.push(c.part_count() as u32);
        }
    }
    let canceled = pal.is_canceled();
    if canceled {
        tracing::warn!(elapsed_ms = start.elapsed().as_millis() as u64, "time budget exhausted, table is partial");
    }

    let df = df!(
        "feature_id" => rows.feature_id,
        "part" => rows.part,
        "x" => rows.x,
        "y" => rows.y,
        "width" => rows.width,
        "height" => rows.height,
        "angle" => rows.angle,
        "cost" => rows.cost,
        "quadrant" => rows.quadrant,
        "reversed" => rows.reversed,
        "glyphs" => rows.glyphs,
    )?;
    Ok(CandidateTable { df, canceled })
}

/// Union of the part bounding boxes; `None` for an empty scene.
pub fn scene_extent(parts: &[FeaturePart]) -> Option<BBox> {
    parts.iter().map(|p| p.bbox()).reduce(|a, b| a.union(&b))
}

/// Parse `xmin,ymin,xmax,ymax`.
pub fn parse_extent(s: &str) -> Result<BBox> {
    let v: Vec<f64> = s
        .split(',')
        .map(|t| t.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("parsing extent {s:?}"))?;
    let [xmin, ymin, xmax, ymax] = v[..] else {
        bail!("extent needs four comma-separated numbers, got {}", v.len());
    };
    if xmin > xmax || ymin > ymax {
        bail!("extent {s:?} has min above max");
    }
    Ok(BBox::new(xmin, ymin, xmax, ymax))
}

/// Per-feature candidate count and best cost, sorted by feature id.
pub fn summarize(df: &DataFrame) -> Result<DataFrame> {
    let summary = df
        .clone()
        .lazy()
        .group_by([col("feature_id")])
        .agg([
            col("cost").count().alias("candidates"),
            col("cost").min().alias("best_cost"),
        ])
        .sort_by_exprs([col("feature_id")], SortMultipleOptions::default())
        .collect()?;
    Ok(summary)
}

/// Write CSV or Parquet, chosen by the file extension.
pub fn write_table(df: &mut DataFrame, out: &Path) -> Result<()> {
    let parquet = match out.extension().and_then(|e| e.to_str()) {
        Some("parquet") => true,
        Some("csv") | None => false,
        Some(other) => bail!("unsupported output extension {other:?} (csv or parquet)"),
    };
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    if parquet {
        ParquetWriter::new(&mut file).finish(df)?;
    } else {
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
    }
    Ok(())
}
