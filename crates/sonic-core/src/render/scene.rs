//! Contour drawing: the base pass over every level, then a glow pass near
//! each species in proximity.

use super::surface::{Rgba, Surface};
use crate::config::ContourParams;
use crate::contour::{
    cell_segments, extract_level, iso_for_level, level_style, level_t, GlowRegion, Segment,
};
use crate::field::Field;
use crate::proximity::ProximityMap;
use glam::Vec2;

/// Segment counts drawn by one call to [`draw_contours`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContourStats {
    pub base_segments: usize,
    pub glow_segments: usize,
}

/// Cell size in pixels when `field` is stretched over `surface`.
#[inline]
pub fn cell_size<S: Surface + ?Sized>(surface: &S, field: &Field) -> Vec2 {
    Vec2::new(
        surface.width() / field.cols().max(1) as f32,
        surface.height() / field.rows().max(1) as f32,
    )
}

pub fn draw_contours<S: Surface + ?Sized>(
    surface: &mut S,
    field: &Field,
    map: &ProximityMap<'_>,
    params: &ContourParams,
) -> ContourStats {
    let cell = cell_size(surface, field);
    let levels = params.levels;
    let mut stats = ContourStats::default();
    let mut segments: Vec<Segment> = Vec::new();

    for level in 0..levels {
        let iso = iso_for_level(level, levels, params);
        let style = level_style(level, levels);
        segments.clear();
        extract_level(field, iso, cell, |_, _| true, &mut segments);
        for s in &segments {
            surface.stroke_line(s.a, s.b, style.color, style.width);
        }
        stats.base_segments += segments.len();
    }

    for entry in map.iter() {
        let Some(region) = GlowRegion::for_species(entry.species, entry.proximity, params) else {
            continue;
        };
        for level in 0..levels {
            let iso = iso_for_level(level, levels, params);
            let t = level_t(level, levels);
            for r in 0..field.rows() {
                for c in 0..field.cols() {
                    let Some(falloff) = region.cell_falloff(field, r, c) else {
                        continue;
                    };
                    let origin = Vec2::new(c as f32 * cell.x, r as f32 * cell.y);
                    let segs = cell_segments(field.cell_corners(r, c), iso, origin, cell);
                    if segs.is_empty() {
                        continue;
                    }
                    let alpha = region.alpha(falloff, t, params.glow_alpha_scale);
                    let color = Rgba::rgb8(region.color, alpha);
                    for s in &segs {
                        surface.stroke_line(s.a, s.b, color, params.glow_stroke_width);
                    }
                    stats.glow_segments += segs.len();
                }
            }
        }
    }
    stats
}
