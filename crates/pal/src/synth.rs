//! Seeded synthetic features for benchmarks and demo scenes.
//!
//! Purpose
//! - Draw reproducible points, polylines and star-shaped polygons inside a
//!   square map extent, so the generators can be exercised at scale without
//!   real map data.
//!
//! Model
//! - Polygons: `n` angles on [0, 2π) with bounded angular and radial jitter
//!   around a random center. The ring is star-shaped around the center and
//!   usually concave, which exercises polygon splitting.
//! - Polylines: a random walk with bounded heading changes.
//! - Determinism uses a replay token `(seed, index)` mixed into one RNG, so a
//!   single feature can be redrawn without replaying the whole scene.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geom::{GeometryType, Vec2};

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64 finalizer
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Synthetic scene configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthCfg {
    /// Side of the square extent `[0, extent]²`.
    pub extent: f64,
    /// Polygon vertex count range (inclusive).
    pub polygon_vertices: (usize, usize),
    /// Polygon radius range before jitter.
    pub polygon_radius: (f64, f64),
    /// Angular jitter as a fraction of the base spacing. Clamped to [0, 0.49].
    pub angle_jitter_frac: f64,
    /// Relative radial jitter, radii are `r * (1 + u)` with `|u| <= radial_jitter`.
    pub radial_jitter: f64,
    /// Polyline vertex count range (inclusive).
    pub line_vertices: (usize, usize),
    pub line_step: f64,
    /// Largest heading change between polyline segments, radians.
    pub max_turn: f64,
}

impl Default for SynthCfg {
    fn default() -> Self {
        Self {
            extent: 1000.0,
            polygon_vertices: (6, 16),
            polygon_radius: (20.0, 80.0),
            angle_jitter_frac: 0.3,
            radial_jitter: 0.4,
            line_vertices: (3, 12),
            line_step: 25.0,
            max_turn: PI / 3.0,
        }
    }
}

/// One synthetic geometry, ready to become a feature part.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SynthGeometry {
    pub kind: GeometryType,
    pub coords: Vec<Vec2>,
}

/// Draw a point uniformly inside the extent.
pub fn draw_point(cfg: &SynthCfg, tok: ReplayToken) -> SynthGeometry {
    let mut rng = tok.to_std_rng();
    SynthGeometry {
        kind: GeometryType::Point,
        coords: vec![uniform_point(&mut rng, cfg.extent)],
    }
}

/// Draw a polyline by random walk, clamped to the extent.
pub fn draw_polyline(cfg: &SynthCfg, tok: ReplayToken) -> SynthGeometry {
    let mut rng = tok.to_std_rng();
    let (lo, hi) = ordered_range(cfg.line_vertices, 2);
    let n = rng.gen_range(lo..=hi);
    let mut p = uniform_point(&mut rng, cfg.extent);
    let mut heading = rng.gen::<f64>() * 2.0 * PI;
    let mut coords = Vec::with_capacity(n);
    coords.push(p);
    for _ in 1..n {
        heading += (rng.gen::<f64>() * 2.0 - 1.0) * cfg.max_turn;
        let step = cfg.line_step * (0.5 + rng.gen::<f64>());
        p = clamp_to_extent(p + Vec2::new(heading.cos(), heading.sin()) * step, cfg.extent);
        coords.push(p);
    }
    coords.dedup();
    if coords.len() < 2 {
        // walk stuck in a corner; fall back to a short horizontal stroke
        let q = clamp_to_extent(coords[0] + Vec2::new(cfg.line_step, 0.0), cfg.extent);
        let q = if q == coords[0] { coords[0] - Vec2::new(cfg.line_step, 0.0) } else { q };
        coords.push(q);
    }
    SynthGeometry {
        kind: GeometryType::Line,
        coords,
    }
}

/// Draw a star-shaped polygon (counter-clockwise, open ring).
pub fn draw_polygon_radial(cfg: &SynthCfg, tok: ReplayToken) -> SynthGeometry {
    let mut rng = tok.to_std_rng();
    let (lo, hi) = ordered_range(cfg.polygon_vertices, 3);
    let n = rng.gen_range(lo..=hi);
    let (rmin, rmax) = (
        cfg.polygon_radius.0.min(cfg.polygon_radius.1).max(1e-6),
        cfg.polygon_radius.0.max(cfg.polygon_radius.1).max(1e-6),
    );
    let r0 = if rmax > rmin { rng.gen_range(rmin..=rmax) } else { rmin };
    let margin = (r0 * (1.0 + cfg.radial_jitter.max(0.0))).min(cfg.extent / 2.0);
    let center = Vec2::new(
        margin + rng.gen::<f64>() * (cfg.extent - 2.0 * margin).max(0.0),
        margin + rng.gen::<f64>() * (cfg.extent - 2.0 * margin).max(0.0),
    );
    let aj = cfg.angle_jitter_frac.clamp(0.0, 0.49);
    let rj = cfg.radial_jitter.clamp(0.0, 0.95);
    let delta = 2.0 * PI / n as f64;
    let phase = rng.gen::<f64>() * 2.0 * PI;
    let coords = (0..n)
        .map(|k| {
            let th = phase + k as f64 * delta + (rng.gen::<f64>() * 2.0 - 1.0) * aj * delta;
            let r = r0 * (1.0 + (rng.gen::<f64>() * 2.0 - 1.0) * rj);
            clamp_to_extent(center + Vec2::new(th.cos(), th.sin()) * r, cfg.extent)
        })
        .collect();
    SynthGeometry {
        kind: GeometryType::Polygon,
        coords,
    }
}

/// Draw `points + lines + polygons` geometries; token indices run
/// consecutively from 0 in that order.
pub fn draw_scene(cfg: &SynthCfg, seed: u64, points: usize, lines: usize, polygons: usize) -> Vec<SynthGeometry> {
    let tok = |index: usize| ReplayToken {
        seed,
        index: index as u64,
    };
    let mut out = Vec::with_capacity(points + lines + polygons);
    out.extend((0..points).map(|i| draw_point(cfg, tok(i))));
    out.extend((0..lines).map(|i| draw_polyline(cfg, tok(points + i))));
    out.extend((0..polygons).map(|i| draw_polygon_radial(cfg, tok(points + lines + i))));
    out
}

fn uniform_point(rng: &mut StdRng, extent: f64) -> Vec2 {
    Vec2::new(rng.gen::<f64>() * extent, rng.gen::<f64>() * extent)
}

fn clamp_to_extent(p: Vec2, extent: f64) -> Vec2 {
    Vec2::new(p.x.clamp(0.0, extent), p.y.clamp(0.0, extent))
}

fn ordered_range((a, b): (usize, usize), floor: usize) -> (usize, usize) {
    let lo = a.min(b).max(floor);
    (lo, a.max(b).max(lo))
}
