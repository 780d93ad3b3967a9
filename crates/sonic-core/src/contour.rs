//! Marching-squares contour extraction.
//!
//! Corner bits are `top-left = 8`, `top-right = 4`, `bottom-right = 2`,
//! `bottom-left = 1`, set when the corner value is strictly above the iso
//! level. The saddle cases 5 and 10 always take their fixed two-segment
//! form; the cell center is never consulted.

use crate::config::ContourParams;
use crate::field::Field;
use crate::render::surface::Rgba;
use crate::species::Species;
use glam::Vec2;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

use Edge::{Bottom, Left, Right, Top};

/// Edge pairs joined by a segment, indexed by case.
pub const CASE_TABLE: [&[(Edge, Edge)]; 16] = [
    &[],
    &[(Left, Bottom)],
    &[(Right, Bottom)],
    &[(Left, Right)],
    &[(Top, Right)],
    &[(Top, Left), (Right, Bottom)],
    &[(Top, Bottom)],
    &[(Top, Left)],
    &[(Top, Left)],
    &[(Top, Bottom)],
    &[(Top, Right), (Left, Bottom)],
    &[(Top, Right)],
    &[(Left, Right)],
    &[(Right, Bottom)],
    &[(Left, Bottom)],
    &[],
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

pub type CellSegments = SmallVec<[Segment; 2]>;

/// Case index for corners ordered `[top-left, top-right, bottom-right, bottom-left]`.
#[inline]
pub fn case_index(corners: [f32; 4], iso: f32) -> u8 {
    let [tl, tr, br, bl] = corners;
    ((tl > iso) as u8) << 3 | ((tr > iso) as u8) << 2 | ((br > iso) as u8) << 1 | (bl > iso) as u8
}

/// Fraction along an edge from `a` to `b` where the iso level crosses.
///
/// Equal endpoints have no crossing; the midpoint is returned so that no
/// NaN or infinity reaches the geometry.
#[inline]
pub fn edge_fraction(a: f32, b: f32, iso: f32) -> f32 {
    let denom = b - a;
    if denom.abs() < f32::EPSILON {
        return 0.5;
    }
    (iso - a) / denom
}

/// Segments for one cell whose top-left corner sits at `origin` (pixels).
pub fn cell_segments(corners: [f32; 4], iso: f32, origin: Vec2, cell: Vec2) -> CellSegments {
    let case = case_index(corners, iso) as usize;
    let pairs = CASE_TABLE[case];
    let mut out = CellSegments::new();
    if pairs.is_empty() {
        return out;
    }
    let [tl, tr, br, bl] = corners;
    let point = |edge: Edge| match edge {
        Top => origin + Vec2::new(edge_fraction(tl, tr, iso) * cell.x, 0.0),
        Bottom => origin + Vec2::new(edge_fraction(bl, br, iso) * cell.x, cell.y),
        Left => origin + Vec2::new(0.0, edge_fraction(tl, bl, iso) * cell.y),
        Right => origin + Vec2::new(cell.x, edge_fraction(tr, br, iso) * cell.y),
    };
    for &(e0, e1) in pairs {
        out.push(Segment {
            a: point(e0),
            b: point(e1),
        });
    }
    out
}

/// Iso threshold of `level` out of `levels`.
#[inline]
pub fn iso_for_level(level: usize, levels: usize, params: &ContourParams) -> f32 {
    params.iso_base + level_t(level, levels) * params.iso_span
}

/// Interpolation parameter of a level, `level / levels`.
#[inline]
pub fn level_t(level: usize, levels: usize) -> f32 {
    level as f32 / levels.max(1) as f32
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelStyle {
    pub color: Rgba,
    pub width: f32,
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Stroke for a base-pass level: faint and cool at the bottom, brighter and
/// warmer towards the top. Independent of the data.
pub fn level_style(level: usize, levels: usize) -> LevelStyle {
    let t = level_t(level, levels);
    LevelStyle {
        color: Rgba::from_255(
            lerp(0.0, 20.0, t),
            lerp(60.0, 180.0, t),
            lerp(140.0, 255.0, t),
            lerp(40.0, 120.0, t),
        ),
        width: lerp(0.3, 0.9, t),
    }
}

/// Walk every cell (optionally filtered) and append the level's segments.
pub fn extract_level<F>(field: &Field, iso: f32, cell: Vec2, mut include: F, out: &mut Vec<Segment>)
where
    F: FnMut(usize, usize) -> bool,
{
    for r in 0..field.rows() {
        for c in 0..field.cols() {
            if !include(r, c) {
                continue;
            }
            let origin = Vec2::new(c as f32 * cell.x, r as f32 * cell.y);
            out.extend(cell_segments(field.cell_corners(r, c), iso, origin, cell));
        }
    }
}

/// Convenience wrapper returning all segments for one level.
pub fn level_segments(field: &Field, iso: f32, cell: Vec2) -> Vec<Segment> {
    let mut out = Vec::new();
    extract_level(field, iso, cell, |_, _| true, &mut out);
    out
}

/// Region around a species whose contours are re-extracted in its colour.
#[derive(Clone, Copy, Debug)]
pub struct GlowRegion {
    pub center: Vec2,
    pub radius: f32,
    pub proximity: f32,
    pub color: [u8; 3],
}

impl GlowRegion {
    /// `None` when the species is not close enough to glow.
    pub fn for_species(species: &Species, proximity: f32, params: &ContourParams) -> Option<Self> {
        if proximity <= params.glow_min_proximity {
            return None;
        }
        Some(Self {
            center: species.position(),
            radius: species.radius * params.glow_radius_factor,
            proximity,
            color: species.color,
        })
    }

    /// Linear falloff at the cell center, `None` for cells outside the region.
    pub fn cell_falloff(&self, field: &Field, row: usize, col: usize) -> Option<f32> {
        let center = Vec2::new(
            (col as f32 + 0.5) / field.cols() as f32,
            (row as f32 + 0.5) / field.rows() as f32,
        );
        let d = center.distance(self.center);
        (d <= self.radius).then(|| 1.0 - d / self.radius)
    }

    /// Glow alpha in [0,255] units: `proximity² · falloff² · scale`, tapered
    /// slightly towards the lower levels.
    pub fn alpha(&self, falloff: f32, level_t: f32, scale: f32) -> f32 {
        let p = self.proximity;
        p * p * falloff * falloff * scale * (0.6 + 0.4 * level_t)
    }
}
