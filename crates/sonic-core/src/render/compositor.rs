//! Frame compositing with a decaying ghost trail and a two-step bloom.
//!
//! Per frame, in order:
//!
//! 1. the ghost buffer is washed with the background at a low alpha so
//!    old strokes fade over a few dozen frames;
//! 2. the ghost, then the fresh contour buffer, are drawn to the screen;
//! 3. the contour buffer is fed into the ghost at reduced alpha;
//! 4. blurred copies of the contour buffer are layered on top.

use super::surface::{Rgba, Surface};
use crate::config::CompositorParams;

pub struct Compositor<S: Surface> {
    ghost: S,
    contour: S,
    params: CompositorParams,
}

impl<S: Surface> Compositor<S> {
    /// Takes ownership of two offscreen buffers of the screen's size.
    pub fn new(ghost: S, contour: S, params: CompositorParams) -> Self {
        let mut c = Self {
            ghost,
            contour,
            params,
        };
        c.paint_ghost_background();
        c
    }

    fn background(&self) -> Rgba {
        Rgba::rgb8(self.params.background, 255.0)
    }

    fn paint_ghost_background(&mut self) {
        let bg = self.background();
        let (w, h) = (self.ghost.width(), self.ghost.height());
        self.ghost.clear();
        self.ghost.fill_rect(0.0, 0.0, w, h, bg);
    }

    /// Replace both buffers after the screen changed size. Trails restart.
    pub fn resize(&mut self, ghost: S, contour: S) {
        self.ghost = ghost;
        self.contour = contour;
        self.paint_ghost_background();
    }

    pub fn params(&self) -> &CompositorParams {
        &self.params
    }

    pub fn ghost(&self) -> &S {
        &self.ghost
    }

    pub fn contour(&self) -> &S {
        &self.contour
    }

    /// Buffer the frame's contours and markers are drawn into.
    pub fn contour_mut(&mut self) -> &mut S {
        &mut self.contour
    }

    pub fn compose(&mut self, screen: &mut S) {
        let (w, h) = (self.ghost.width(), self.ghost.height());
        let decay = self.background().with_alpha(self.params.ghost_decay_alpha);
        self.ghost.fill_rect(0.0, 0.0, w, h, decay);

        screen.draw_surface(&self.ghost, 1.0, 0.0);
        screen.draw_surface(&self.contour, 1.0, 0.0);

        self.ghost
            .draw_surface(&self.contour, self.params.ghost_feed_alpha, 0.0);

        for &(alpha, blur) in &self.params.bloom {
            screen.draw_surface(&self.contour, alpha, blur);
        }
    }
}
