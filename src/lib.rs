#![cfg(target_arch = "wasm32")]
use crate::audio::AudioState;
use crate::constants::*;
use crate::input::{KeyAction, PointerState};
use crate::render::CanvasSurface;
use sonic_core::{AudioSession, Catalog, DepthReadout, SonicConfig, SonicField};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod overlay;
mod render;

/// Optional JSON embedded in the page under `id`.
fn embedded_json(document: &web::Document, id: &str) -> Option<String> {
    document
        .get_element_by_id(id)
        .and_then(|el| el.text_content())
        .filter(|t| !t.trim().is_empty())
}

fn load_config(document: &web::Document) -> SonicConfig {
    match embedded_json(document, CONFIG_SCRIPT_ID) {
        Some(text) => SonicConfig::from_json(&text).unwrap_or_else(|e| {
            log::warn!("[init] ignoring page config: {:#}", e);
            SonicConfig::default()
        }),
        None => SonicConfig::default(),
    }
}

fn load_catalog(document: &web::Document) -> Catalog {
    match embedded_json(document, CATALOG_SCRIPT_ID) {
        Some(text) => Catalog::from_json(&text).unwrap_or_else(|e| {
            log::warn!("[init] ignoring page catalog: {}", e);
            Catalog::builtin()
        }),
        None => Catalog::builtin(),
    }
}

/// Route the controller's per-frame events into the audio session and HUD.
fn wire_field_callbacks(
    field: &mut SonicField<CanvasSurface>,
    audio: &Rc<RefCell<AudioState>>,
    document: &web::Document,
) {
    let callbacks = field.callbacks_mut();

    let audio_zones = audio.clone();
    callbacks.set_on_proximity(move |map, now_ms| {
        audio_zones
            .borrow_mut()
            .with_live(|session, backend| session.update_zones(map, now_ms, backend));
    });

    let audio_ping = audio.clone();
    callbacks.set_on_center(move |species, now_ms| {
        audio_ping.borrow_mut().with_live(|session, backend| {
            if let Some(hz) = session.ping(species, now_ms, backend) {
                log::info!("[ping] {} at {:.1} Hz", species.id, hz);
            }
        });
    });

    let audio_depth = audio.clone();
    let doc_hud = document.clone();
    let mut shown: Option<[String; 3]> = None;
    callbacks.set_on_depth(move |depth| {
        audio_depth
            .borrow_mut()
            .with_live(|session, backend| session.modulate_filter(depth, backend));
        let readout = DepthReadout::new(depth);
        let lines = readout.lines();
        if shown.as_ref() != Some(&lines) {
            overlay::update_hud(&doc_hud, &readout);
            shown = Some(lines);
        }
    });
}

fn start_audio(audio: &Rc<RefCell<AudioState>>, document: &web::Document) {
    match audio.borrow_mut().start() {
        Ok(()) => overlay::hide(document),
        Err(e) => log::error!("[audio] start failed: {:?}", e),
    }
}

fn stop_audio(
    audio: &Rc<RefCell<AudioState>>,
    frame_ctx: &Rc<RefCell<frame::FrameContext>>,
    document: &web::Document,
) {
    if !audio.borrow().is_started() {
        return;
    }
    audio.borrow_mut().teardown();
    frame_ctx.borrow_mut().field.reset_session_state();
    overlay::show(document);
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("sonic-field starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", CANVAS_ID))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    let (w, h) = dom::sync_canvas_backing_size(&canvas);

    let config = load_config(&document);
    let catalog = load_catalog(&document);
    let session = AudioSession::new(config.mixer.clone(), config.ping.clone());
    let audio = Rc::new(RefCell::new(AudioState::new(session)));

    let screen = CanvasSurface::new(canvas.clone())?;
    let ghost = CanvasSurface::offscreen(&document, w, h)?;
    let contour = CanvasSurface::offscreen(&document, w, h)?;
    let mut field = SonicField::new(catalog, config, ghost, contour);
    wire_field_callbacks(&mut field, &audio, &document);

    let pointer = Rc::new(RefCell::new(PointerState::default()));
    events::wire_input_handlers(&canvas, &pointer);

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        field,
        screen,
        document: document.clone(),
        pointer,
        clock: instant::Instant::now(),
    }));

    {
        let audio_click = audio.clone();
        let doc_click = document.clone();
        dom::add_click_listener(&document, START_OVERLAY_ID, move || {
            start_audio(&audio_click, &doc_click);
        });
    }
    {
        let audio_keys = audio.clone();
        let frame_keys = frame_ctx.clone();
        let doc_keys = document.clone();
        events::wire_global_keydown(Rc::new(move |action: KeyAction| match action {
            KeyAction::StartAudio => start_audio(&audio_keys, &doc_keys),
            KeyAction::StopAudio => stop_audio(&audio_keys, &frame_keys, &doc_keys),
        }));
    }

    overlay::show(&document);
    overlay::show_hud(&document, true);
    frame::start_loop(frame_ctx);
    Ok(())
}
