//! Species markers, hover tooltips and the sonar burst.

use super::surface::{Rgba, Surface};
use crate::constants::*;
use crate::proximity::ProximityMap;
use crate::species::Species;
use fnv::FnvHashMap;
use glam::Vec2;
use std::f32::consts::PI;

/// Radius of the idle breathing ring for marker `index` at `frame`.
#[inline]
pub fn breath_radius(frame: u64, index: usize) -> f32 {
    let phase = frame as f32 * 0.02 + index as f32 * 1.3;
    6.0 + 4.0 * (phase.sin() + 1.0) * 0.5
}

/// Upward hop of a marker `elapsed_ms` after its last ping; zero once the
/// hop is over.
#[inline]
pub fn jump_offset(elapsed_ms: f64) -> f32 {
    let j = (1.0 - elapsed_ms / PING_JUMP_MS).max(0.0) as f32;
    (j * PI).sin() * PING_JUMP_PX * j
}

/// Radius and alpha (0..=255) of ripple ring `ring` (0 or 1) at `frame`.
#[inline]
pub fn ripple(frame: u64, ring: u64, near: f32) -> (f32, f32) {
    let t = ((frame + ring * 60) % 120) as f32 / 120.0;
    (t * 60.0, (1.0 - t) * 140.0 * near)
}

/// Top-left corner of a tooltip box of `size` for a marker at `anchor` on a
/// `bounds` sized surface. Prefers up-and-right, flips left past the right
/// margin and below past the top margin, then clamps to the margins.
pub fn tooltip_origin(anchor: Vec2, size: Vec2, bounds: Vec2) -> Vec2 {
    let m = TOOLTIP_MARGIN_PX;
    let mut x = anchor.x + 15.0;
    let mut y = anchor.y - 35.0;
    if x + size.x > bounds.x - m {
        x = anchor.x - size.x - 15.0;
    }
    if x < m {
        x = m;
    }
    if y < m {
        y = anchor.y + 35.0;
    }
    if y + size.y > bounds.y - m {
        y = bounds.y - size.y - m;
    }
    Vec2::new(x, y)
}

/// Pointer-independent inputs to [`draw_markers`].
pub struct MarkerFrame<'a> {
    pub frame: u64,
    pub now_ms: f64,
    pub pointer: Vec2,
    pub proximity: &'a ProximityMap<'a>,
    pub pings: &'a VisualPings,
}

pub fn draw_markers<S: Surface + ?Sized>(
    surface: &mut S,
    species: &[Species],
    f: &MarkerFrame<'_>,
) {
    let (w, h) = (surface.width(), surface.height());
    for (index, sp) in species.iter().enumerate() {
        let near = f.proximity.proximity(&sp.id);
        let hop = f
            .pings
            .elapsed_since(&sp.id, f.now_ms)
            .map_or(0.0, jump_offset);
        let pos = sp.screen_position(w, h) - Vec2::new(0.0, hop);

        let breath = Rgba::rgb8(sp.color, 40.0 + near * 80.0);
        surface.stroke_circle(pos, breath_radius(f.frame, index), breath, 1.0);

        let size = 5.0 + near * 4.0;
        surface.fill_polygon(&diamond(pos, size * 2.0), Rgba::rgb8(sp.color, 70.0));
        surface.fill_polygon(&diamond(pos, size), Rgba::rgb8(sp.color, 180.0 + near * 75.0));

        if near > RIPPLE_MIN_PROXIMITY {
            for ring in 0..2 {
                let (radius, alpha) = ripple(f.frame, ring, near);
                surface.stroke_circle(pos, radius, Rgba::rgb8(sp.color, alpha), 1.0);
            }
        }

        if f.pointer.distance(pos) < HOVER_RADIUS_PX {
            draw_tooltip(surface, sp, pos);
        }
    }
}

fn diamond(c: Vec2, half: f32) -> [Vec2; 4] {
    [
        c - Vec2::new(0.0, half),
        c + Vec2::new(half, 0.0),
        c + Vec2::new(0.0, half),
        c - Vec2::new(half, 0.0),
    ]
}

fn draw_tooltip<S: Surface + ?Sized>(surface: &mut S, sp: &Species, anchor: Vec2) {
    let text = sp.tooltip_text();
    let size = Vec2::new(
        surface.text_width(&text, TOOLTIP_TEXT_PX) + TOOLTIP_PADDING_PX * 2.0,
        TOOLTIP_HEIGHT_PX,
    );
    let origin = tooltip_origin(anchor, size, Vec2::new(surface.width(), surface.height()));
    surface.fill_round_rect(
        origin.x,
        origin.y,
        size.x,
        size.y,
        3.0,
        Rgba::rgb8(BACKGROUND_RGB, 220.0),
    );
    surface.fill_text(
        &text,
        origin.x + TOOLTIP_PADDING_PX,
        origin.y + size.y - 6.0,
        TOOLTIP_TEXT_PX,
        Rgba::rgb8(sp.color, 230.0),
    );
}

/// One expanding ring of the sonar burst.
#[derive(Clone, Copy, Debug)]
pub struct BurstRing {
    pub max_diameter_px: f32,
    pub duration_ms: f64,
    pub delay_ms: f64,
    pub start_opacity: f32,
}

pub const BURST_RINGS: [BurstRing; 3] = [
    BurstRing {
        max_diameter_px: 160.0,
        duration_ms: 1200.0,
        delay_ms: 0.0,
        start_opacity: 0.8,
    },
    BurstRing {
        max_diameter_px: 240.0,
        duration_ms: 1600.0,
        delay_ms: 150.0,
        start_opacity: 0.5,
    },
    BurstRing {
        max_diameter_px: 120.0,
        duration_ms: 900.0,
        delay_ms: 50.0,
        start_opacity: 0.3,
    },
];

impl BurstRing {
    /// Radius and opacity `elapsed_ms` after the burst started; `None` before
    /// the ring's delay or after it has faded out.
    pub fn at(&self, elapsed_ms: f64) -> Option<(f32, f32)> {
        let local = elapsed_ms - self.delay_ms;
        if local < 0.0 || local >= self.duration_ms {
            return None;
        }
        let t = (local / self.duration_ms) as f32;
        let eased = 1.0 - (1.0 - t) * (1.0 - t);
        Some((
            self.max_diameter_px * 0.5 * eased,
            self.start_opacity * (1.0 - eased),
        ))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SonarBurst {
    pub origin: Vec2,
    pub color: [u8; 3],
    pub started_ms: f64,
    /// Last center event that kept this burst alive.
    pub refreshed_ms: f64,
}

impl SonarBurst {
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, now_ms: f64) {
        let elapsed = now_ms - self.started_ms;
        for ring in &BURST_RINGS {
            if let Some((radius, opacity)) = ring.at(elapsed) {
                let color = Rgba::rgb8(self.color, 255.0).with_alpha(opacity);
                surface.stroke_circle(self.origin, radius, color, 1.0);
            }
        }
    }
}

/// Visual side of center-reached events: the per-species marker hop and
/// the screen-space sonar burst.
///
/// Unlike the audio cue this is not cooled down; every center event is
/// recorded. A burst keeps animating while events keep arriving and is
/// cleared [`SONAR_BURST_MS`] after the last one.
#[derive(Clone, Debug, Default)]
pub struct VisualPings {
    marks: FnvHashMap<String, f64>,
    burst: Option<SonarBurst>,
}

impl VisualPings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, species: &Species, pointer: Vec2, now_ms: f64) {
        self.marks.insert(species.id.clone(), now_ms);
        match &mut self.burst {
            Some(burst) => {
                burst.origin = pointer;
                burst.color = species.color;
                burst.refreshed_ms = now_ms;
            }
            None => {
                self.burst = Some(SonarBurst {
                    origin: pointer,
                    color: species.color,
                    started_ms: now_ms,
                    refreshed_ms: now_ms,
                });
            }
        }
    }

    pub fn elapsed_since(&self, species_id: &str, now_ms: f64) -> Option<f64> {
        self.marks.get(species_id).map(|&t| now_ms - t)
    }

    pub fn burst(&self) -> Option<&SonarBurst> {
        self.burst.as_ref()
    }

    /// Drop the burst once its hold time has passed.
    pub fn expire(&mut self, now_ms: f64) {
        if self
            .burst
            .as_ref()
            .is_some_and(|b| now_ms - b.refreshed_ms >= SONAR_BURST_MS)
        {
            self.burst = None;
        }
    }

    pub fn draw_burst<S: Surface + ?Sized>(&self, surface: &mut S, now_ms: f64) {
        if let Some(burst) = &self.burst {
            burst.draw(surface, now_ms);
        }
    }

    pub fn reset(&mut self) {
        self.marks.clear();
        self.burst = None;
    }
}
