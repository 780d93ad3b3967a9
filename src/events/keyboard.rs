use crate::input::{key_action, KeyAction};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Route start/stop keys to `on_action`. Keys with no mapping pass through
/// untouched.
pub fn wire_global_keydown(on_action: Rc<dyn Fn(KeyAction)>) {
    let Some(window) = web::window() else {
        return;
    };
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        if ev.repeat() {
            return;
        }
        if let Some(action) = key_action(&ev.key()) {
            ev.prevent_default();
            on_action(action);
        }
    }) as Box<dyn FnMut(_)>);
    _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    closure.forget();
}
