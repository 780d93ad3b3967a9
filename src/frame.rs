use crate::dom;
use crate::input::PointerState;
use crate::render::CanvasSurface;
use instant::Instant;
use sonic_core::render::Surface;
use sonic_core::{FrameInput, SonicField, Viewport};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub field: SonicField<CanvasSurface>,
    pub screen: CanvasSurface,
    pub document: web::Document,
    pub pointer: Rc<RefCell<PointerState>>,
    pub clock: Instant,
}

impl FrameContext {
    pub fn frame(&mut self) {
        self.track_canvas_size();
        let (w, h) = self.screen.size();
        let pointer = *self.pointer.borrow();
        let now_ms = self.clock.elapsed().as_secs_f64() * 1000.0;
        let input = FrameInput {
            pointer: pointer.frame_position(),
            dragging: pointer.dragging,
            viewport: Viewport::new(w as f32, h as f32),
            now_ms,
        };
        let report = self.field.frame(input, &mut self.screen);
        if !report.centers.is_empty() {
            log::info!("[frame] center reached: {}", report.centers.join(", "));
        }
    }

    /// Reallocate the offscreen buffers when the canvas backing size moves.
    fn track_canvas_size(&mut self) {
        let after = dom::sync_canvas_backing_size(self.screen.canvas());
        if self.field.compositor().ghost().size() == after {
            return;
        }
        let ghost = CanvasSurface::offscreen(&self.document, after.0, after.1);
        let contour = CanvasSurface::offscreen(&self.document, after.0, after.1);
        match (ghost, contour) {
            (Ok(ghost), Ok(contour)) => self.field.resize(ghost, contour),
            (Err(e), _) | (_, Err(e)) => log::error!("[frame] offscreen resize failed: {:?}", e),
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
