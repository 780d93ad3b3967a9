use crate::dom;
use crate::input::PointerState;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn wire_input_handlers(canvas: &web::HtmlCanvasElement, pointer: &Rc<RefCell<PointerState>>) {
    wire_pointermove(canvas, pointer);
    wire_pointerdown(canvas, pointer);
    wire_pointerup(canvas, pointer);
}

fn wire_pointermove(canvas: &web::HtmlCanvasElement, pointer: &Rc<RefCell<PointerState>>) {
    let canvas_in = canvas.clone();
    let pointer = pointer.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let pos = dom::pointer_canvas_px(&ev, &canvas_in);
        pointer.borrow_mut().moved(pos);
    }) as Box<dyn FnMut(_)>);
    _ = canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerdown(canvas: &web::HtmlCanvasElement, pointer: &Rc<RefCell<PointerState>>) {
    let canvas_in = canvas.clone();
    let pointer = pointer.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let pos = dom::pointer_canvas_px(&ev, &canvas_in);
        pointer.borrow_mut().pressed(pos);
        _ = canvas_in.set_pointer_capture(ev.pointer_id());
    }) as Box<dyn FnMut(_)>);
    _ = canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerup(canvas: &web::HtmlCanvasElement, pointer: &Rc<RefCell<PointerState>>) {
    let pointer_up = pointer.clone();
    let closure = Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
        pointer_up.borrow_mut().released();
    }) as Box<dyn FnMut(_)>);
    // pointercancel ends a drag the same way
    for event in ["pointerup", "pointercancel"] {
        _ = canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
