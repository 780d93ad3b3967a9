//! Long-lived per-frame driver shared by the web and native front-ends.
//!
//! The controller owns everything visual. Audio stays with the host, which
//! subscribes to the proximity, center and depth callbacks and forwards them
//! to its [`AudioSession`](crate::audio::AudioSession).

use crate::config::SonicConfig;
use crate::field::{Field, FieldGenerator, FieldInput};
use crate::proximity::{detect, ProximityMap, Viewport};
use crate::render::markers::{draw_markers, MarkerFrame};
use crate::render::scene::{draw_contours, ContourStats};
use crate::render::{Compositor, Surface, VisualPings};
use crate::species::{Catalog, Species};
use glam::Vec2;

pub type DepthCallback = Box<dyn FnMut(f32)>;
pub type ProximityCallback = Box<dyn FnMut(&ProximityMap<'_>, f64)>;
pub type CenterCallback = Box<dyn FnMut(&Species, f64)>;

/// Host subscriptions. Each slot is optional; empty slots are skipped.
#[derive(Default)]
pub struct FrameCallbacks {
    on_depth: Option<DepthCallback>,
    on_proximity: Option<ProximityCallback>,
    on_center: Option<CenterCallback>,
}

impl FrameCallbacks {
    pub fn set_on_depth(&mut self, f: impl FnMut(f32) + 'static) {
        self.on_depth = Some(Box::new(f));
    }

    pub fn set_on_proximity(&mut self, f: impl FnMut(&ProximityMap<'_>, f64) + 'static) {
        self.on_proximity = Some(Box::new(f));
    }

    pub fn set_on_center(&mut self, f: impl FnMut(&Species, f64) + 'static) {
        self.on_center = Some(Box::new(f));
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    /// Pointer in screen pixels.
    pub pointer: Vec2,
    pub dragging: bool,
    pub viewport: Viewport,
    /// Host clock in milliseconds.
    pub now_ms: f64,
}

/// Summary of one frame, mostly for logging and tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub depth: f32,
    pub proximity: Vec<(String, f32)>,
    pub centers: Vec<String>,
    pub stats: ContourStats,
}

pub struct SonicField<S: Surface> {
    catalog: Catalog,
    generator: FieldGenerator,
    config: SonicConfig,
    time: f64,
    frame_count: u64,
    prev_pointer: Option<Vec2>,
    pings: VisualPings,
    compositor: Compositor<S>,
    callbacks: FrameCallbacks,
    last_field: Option<Field>,
}

impl<S: Surface> SonicField<S> {
    /// `ghost` and `contour` are offscreen buffers matching the screen size.
    pub fn new(catalog: Catalog, config: SonicConfig, ghost: S, contour: S) -> Self {
        log::info!(
            "[field] {} species, {}x{} grid, {} levels",
            catalog.len(),
            config.field.cols,
            config.field.rows,
            config.contour.levels
        );
        Self {
            generator: FieldGenerator::new(config.field.clone()),
            compositor: Compositor::new(ghost, contour, config.compositor.clone()),
            catalog,
            config,
            time: 0.0,
            frame_count: 0,
            prev_pointer: None,
            pings: VisualPings::new(),
            callbacks: FrameCallbacks::default(),
            last_field: None,
        }
    }

    pub fn callbacks_mut(&mut self) -> &mut FrameCallbacks {
        &mut self.callbacks
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SonicConfig {
        &self.config
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn noise_time(&self) -> f64 {
        self.time
    }

    pub fn visual_pings(&self) -> &VisualPings {
        &self.pings
    }

    pub fn compositor(&self) -> &Compositor<S> {
        &self.compositor
    }

    /// Field produced by the most recent frame.
    pub fn last_field(&self) -> Option<&Field> {
        self.last_field.as_ref()
    }

    pub fn resize(&mut self, ghost: S, contour: S) {
        let (w, h) = ghost.size();
        log::info!("[field] resized to {}x{}", w, h);
        self.compositor.resize(ghost, contour);
        self.prev_pointer = None;
    }

    /// Forget ping marks and any running burst. Called when the audio
    /// session is torn down so the next session starts clean.
    pub fn reset_session_state(&mut self) {
        self.pings.reset();
    }

    pub fn frame(&mut self, input: FrameInput, screen: &mut S) -> FrameReport {
        self.time += self.config.field.noise_step_per_frame;
        self.frame_count += 1;

        let speed = self
            .prev_pointer
            .map_or(0.0, |prev| prev.distance(input.pointer));
        let field = self.generator.generate(
            &FieldInput {
                time: self.time,
                pointer: input.viewport.normalize(input.pointer),
                pointer_speed: speed,
                dragging: input.dragging,
            },
            self.catalog.species(),
        );

        let scan = detect(
            input.pointer,
            input.viewport,
            self.catalog.species(),
            &self.config.proximity,
        );

        for sp in &scan.centers {
            self.pings.record(sp, input.pointer, input.now_ms);
            if let Some(cb) = self.callbacks.on_center.as_mut() {
                cb(sp, input.now_ms);
            }
        }
        if let Some(cb) = self.callbacks.on_proximity.as_mut() {
            cb(&scan.map, input.now_ms);
        }

        let depth =
            field.sample_at_pointer(input.pointer, input.viewport.width, input.viewport.height);
        if let Some(cb) = self.callbacks.on_depth.as_mut() {
            cb(depth);
        }

        let contour = self.compositor.contour_mut();
        contour.clear();
        let stats = draw_contours(contour, &field, &scan.map, &self.config.contour);
        draw_markers(
            contour,
            self.catalog.species(),
            &MarkerFrame {
                frame: self.frame_count,
                now_ms: input.now_ms,
                pointer: input.pointer,
                proximity: &scan.map,
                pings: &self.pings,
            },
        );

        self.compositor.compose(screen);
        self.pings.expire(input.now_ms);
        self.pings.draw_burst(screen, input.now_ms);

        self.prev_pointer = Some(input.pointer);

        let report = FrameReport {
            depth,
            proximity: scan
                .map
                .iter()
                .map(|e| (e.species.id.clone(), e.proximity))
                .collect(),
            centers: scan.centers.iter().map(|s| s.id.clone()).collect(),
            stats,
        };
        self.last_field = Some(field);
        report
    }
}
