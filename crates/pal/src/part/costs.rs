//! Named cost constants, one table per generator family.
//!
//! Lower cost is better. Tests assert tie-break ordering against these
//! values, so change them together with the tests.

pub mod point {
    /// Candidate centered exactly on the anchor.
    pub const CENTERED: f64 = 0.00005;
    /// Single over-point candidate.
    pub const OVER_POINT: f64 = 0.0001;
    /// First ordered position; later positions add `ORDERED_STEP` each.
    pub const ORDERED_BASE: f64 = 0.0001;
    pub const ORDERED_STEP: f64 = 0.001;
    /// Radial sweep: `AROUND_BASE + AROUND_SPAN * icost / (n - 1)`.
    pub const AROUND_BASE: f64 = 0.0001;
    pub const AROUND_SPAN: f64 = 0.002;
    /// Default candidate count of the radial sweep.
    pub const AROUND_DEFAULT_COUNT: usize = 16;
}

pub mod line {
    /// Chord/width ratio above which a window counts as straight.
    pub const STRAIGHT_RATIO: f64 = 0.98;
    pub const STRAIGHT: f64 = 0.0001;
    /// Jagged windows cost `(1 - ratio) / JAGGED_DIVISOR`.
    pub const JAGGED_DIVISOR: f64 = 100.0;
    pub const SEGMENT_CENTER_WEIGHT: f64 = 0.0005;
    pub const LINE_ANCHOR_WEIGHT: f64 = 0.0005;
    pub const SEGMENT_LENGTH_WEIGHT: f64 = 0.0005;
    pub const SEGMENT_ANGLE_WEIGHT: f64 = 0.0001;
    /// Anchor distance divisor of the midpoint and horizontal generators.
    pub const ANCHOR_DIVISOR: f64 = 1000.0;
    /// Initial cost of midpoint candidates added after straight-segment ones.
    pub const MIDPOINT_FALLBACK: f64 = 0.01;
    pub const BELOW: f64 = 0.001;
    pub const ON_LINE: f64 = 0.002;
    /// Anchor percent range in which placement counts as flexible.
    pub const FLEXIBLE_MIN: f64 = 0.1;
    pub const FLEXIBLE_MAX: f64 = 0.9;
    /// Hard-break bounds on the vertex angle, degrees.
    pub const HARD_BREAK_MIN_DEG: f64 = 135.0;
    pub const HARD_BREAK_MAX_DEG: f64 = 225.0;
}

pub mod curved {
    pub const MIN: f64 = 0.0001;
    pub const ANGLE_DIVISOR: f64 = 100.0;
    pub const ANCHOR_DIVISOR_FLEXIBLE: f64 = 100.0;
    pub const ANCHOR_DIVISOR_PINNED: f64 = 10.0;
    pub const GLYPH: f64 = 0.0001;
    pub const BELOW: f64 = 0.001;
    pub const ON_LINE: f64 = 0.002;
    /// Overrun never exceeds this share of the label width.
    pub const MAX_OVERRUN_SHARE: f64 = 0.95;
    /// Glyphs are shifted from baseline to mean line by this share of half the height.
    pub const BASELINE_SHIFT: f64 = 0.9;
}

pub mod polygon {
    pub const INTERIOR: f64 = 0.0001;
    pub const MAX_TRY: usize = 10;
    pub const MAX_TRY_WITH_ZONE: usize = 7;
    /// First-try spacing is scaled by this factor when a maximum is set.
    pub const FIRST_TRY_SPACING: f64 = 0.8;
    /// Boxes larger than this multiple of the feature bbox area are skipped.
    pub const OVERSIZED_BOX: f64 = 5.0;
    pub const EXTERIOR_MIN_COUNT: usize = 16;
}

pub mod penalty {
    /// Priority of always-shown features.
    pub const ALWAYS_SHOW_PRIORITY: f64 = -0.2;
    pub const SIZE_DIVISOR: f64 = 100.0;
    /// Lines shorter than the extent's larger side divided by this are penalized.
    pub const LINE_EXTENT_FRACTION: f64 = 4.0;
    /// Polygons smaller than the extent area divided by this are penalized.
    pub const POLYGON_EXTENT_FRACTION: f64 = 16.0;
}
