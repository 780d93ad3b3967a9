mod common;

use common::species;
use glam::Vec2;
use sonic_core::render::markers::{jump_offset, tooltip_origin, BURST_RINGS};
use sonic_core::render::{draw_contours, Compositor, Raster, Rgba, Surface, VisualPings};
use sonic_core::{Category, CompositorParams, ContourParams, Field, ProximityMap};

/// Surface that records operations by name, tagged with its own label.
#[derive(Default)]
struct TraceSurface {
    label: &'static str,
    ops: Vec<String>,
}

impl TraceSurface {
    fn named(label: &'static str) -> Self {
        Self {
            label,
            ops: Vec::new(),
        }
    }
}

impl Surface for TraceSurface {
    fn size(&self) -> (u32, u32) {
        (64, 32)
    }
    fn clear(&mut self) {
        self.ops.push("clear".into());
    }
    fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, c: Rgba) {
        self.ops.push(format!("fill {:.3}", c.a));
    }
    fn stroke_line(&mut self, _a: Vec2, _b: Vec2, _c: Rgba, _w: f32) {
        self.ops.push("line".into());
    }
    fn stroke_circle(&mut self, _c: Vec2, _r: f32, _col: Rgba, _w: f32) {
        self.ops.push("circle".into());
    }
    fn fill_polygon(&mut self, _p: &[Vec2], _c: Rgba) {
        self.ops.push("poly".into());
    }
    fn fill_text(&mut self, _t: &str, _x: f32, _y: f32, _s: f32, _c: Rgba) {
        self.ops.push("text".into());
    }
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.len() as f32 * size * 0.5
    }
    fn draw_surface(&mut self, src: &Self, alpha: f32, blur: f32) {
        self.ops
            .push(format!("draw {} a={:.2} blur={}", src.label, alpha, blur));
    }
}

#[test]
fn compositor_layers_in_fixed_order() {
    let mut comp = Compositor::new(
        TraceSurface::named("ghost"),
        TraceSurface::named("contour"),
        CompositorParams::default(),
    );
    assert_eq!(comp.ghost().ops, vec!["clear", "fill 1.000"]);

    let mut screen = TraceSurface::named("screen");
    comp.compose(&mut screen);
    assert_eq!(
        screen.ops,
        vec![
            "draw ghost a=1.00 blur=0",
            "draw contour a=1.00 blur=0",
            "draw contour a=0.25 blur=6",
            "draw contour a=0.12 blur=16",
        ]
    );
    assert_eq!(
        comp.ghost().ops[2..],
        ["fill 0.078", "draw contour a=0.55 blur=0"]
    );
}

#[test]
fn contour_pass_draws_base_and_glow() {
    let rows: Vec<Vec<f32>> = (0..5)
        .map(|_| (0..7).map(|c| c as f32 / 6.0).collect())
        .collect();
    let field = Field::from_rows(&rows).unwrap();
    let mut surface = TraceSurface::named("contour");
    let params = ContourParams::default();

    let empty = draw_contours(&mut surface, &field, &ProximityMap::new(), &params);
    assert!(empty.base_segments > 0);
    assert_eq!(empty.glow_segments, 0);
    assert_eq!(surface.ops.len(), empty.base_segments);

    let sp = species("a", Category::Fish, 0.5, 0.5, 0.4, 0.5);
    let mut map = ProximityMap::new();
    map.insert(&sp, 0.8);
    let lit = draw_contours(&mut surface, &field, &map, &params);
    assert_eq!(lit.base_segments, empty.base_segments);
    assert!(lit.glow_segments > 0);
    assert!(lit.glow_segments <= lit.base_segments);
}

#[test]
fn raster_strokes_and_composites() {
    let mut a = Raster::new(32, 32);
    a.stroke_line(Vec2::new(2.0, 16.0), Vec2::new(30.0, 16.0), Rgba::new(1.0, 0.0, 0.0, 1.0), 1.0);
    let px = a.pixel(10, 16).unwrap();
    assert!((px[0] - 1.0).abs() < 1e-6 && (px[3] - 1.0).abs() < 1e-6);
    assert_eq!(a.pixel(10, 5).unwrap()[3], 0.0);

    let mut screen = Raster::new(32, 32);
    screen.draw_surface(&a, 0.5, 0.0);
    assert!((screen.pixel(10, 16).unwrap()[3] - 0.5).abs() < 1e-6);

    let mut blurred = Raster::new(32, 32);
    blurred.draw_surface(&a, 1.0, 6.0);
    assert!(blurred.pixel(10, 13).unwrap()[3] > 0.0);
    assert!(blurred.pixel(10, 16).unwrap()[3] < 1.0);
    // box blur conserves coverage away from the borders
    assert!((blurred.total_alpha() - a.total_alpha()).abs() / a.total_alpha() < 0.2);

    let bytes = screen.to_rgba8();
    let i = (16 * 32 + 10) * 4;
    assert_eq!(&bytes[i..i + 4], &[255, 0, 0, 128]);
}

#[test]
fn raster_fills_convex_polygons() {
    let mut r = Raster::new(20, 20);
    let diamond = [
        Vec2::new(10.0, 2.0),
        Vec2::new(18.0, 10.0),
        Vec2::new(10.0, 18.0),
        Vec2::new(2.0, 10.0),
    ];
    r.fill_polygon(&diamond, Rgba::new(0.0, 1.0, 0.0, 1.0));
    assert_eq!(r.pixel(10, 10).unwrap()[3], 1.0);
    assert_eq!(r.pixel(1, 1).unwrap()[3], 0.0);
    assert_eq!(r.pixel(18, 18).unwrap()[3], 0.0);
}

#[test]
fn tooltip_prefers_up_right_and_flips_at_edges() {
    let bounds = Vec2::new(400.0, 300.0);
    let size = Vec2::new(100.0, 22.0);
    assert_eq!(tooltip_origin(Vec2::new(100.0, 100.0), size, bounds), Vec2::new(115.0, 65.0));
    // too close to the right edge: flips left of the marker
    assert_eq!(tooltip_origin(Vec2::new(350.0, 100.0), size, bounds), Vec2::new(235.0, 65.0));
    // too close to the top: drops below
    assert_eq!(tooltip_origin(Vec2::new(100.0, 20.0), size, bounds), Vec2::new(115.0, 55.0));
    // wider than the room on both sides: clamped to the left margin
    let wide = Vec2::new(390.0, 22.0);
    assert_eq!(tooltip_origin(Vec2::new(50.0, 100.0), wide, bounds).x, 10.0);
    // near the bottom after flipping: clamped to the bottom margin
    let short = Vec2::new(400.0, 30.0);
    assert_eq!(tooltip_origin(Vec2::new(100.0, 5.0), size, short).y, -2.0);
}

#[test]
fn ping_jump_rises_and_settles() {
    assert!(jump_offset(0.0).abs() < 1e-4);
    assert!(jump_offset(300.0) > 0.0);
    assert_eq!(jump_offset(600.0), 0.0);
    assert_eq!(jump_offset(10_000.0), 0.0);
}

#[test]
fn burst_rings_expand_and_fade() {
    let ring = BURST_RINGS[1];
    assert!(ring.at(100.0).is_none(), "still in its delay");
    let (r0, o0) = ring.at(150.0).unwrap();
    assert_eq!(r0, 0.0);
    assert!((o0 - 0.5).abs() < 1e-6);
    let (r1, o1) = ring.at(900.0).unwrap();
    assert!(r1 > 0.0 && r1 < 120.0);
    assert!(o1 < o0);
    assert!(ring.at(1750.0).is_none());
}

#[test]
fn burst_restarts_only_after_it_expires() {
    let sp = species("a", Category::Fish, 0.5, 0.5, 0.1, 0.5);
    let mut pings = VisualPings::new();
    pings.record(&sp, Vec2::new(1.0, 1.0), 0.0);
    pings.record(&sp, Vec2::new(2.0, 2.0), 500.0);
    let burst = pings.burst().unwrap();
    assert_eq!(burst.started_ms, 0.0);
    assert_eq!(burst.refreshed_ms, 500.0);
    assert_eq!(pings.elapsed_since("a", 700.0), Some(200.0));

    pings.expire(2499.0);
    assert!(pings.burst().is_some());
    pings.expire(2500.0);
    assert!(pings.burst().is_none());

    pings.record(&sp, Vec2::new(3.0, 3.0), 3000.0);
    assert_eq!(pings.burst().unwrap().started_ms, 3000.0);

    pings.reset();
    assert!(pings.burst().is_none());
    assert_eq!(pings.elapsed_since("a", 4000.0), None);
}
