use crate::constants::{HUD_ID, START_OVERLAY_ID};
use sonic_core::DepthReadout;
use web_sys as web;

#[inline]
pub fn show(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(START_OVERLAY_ID) {
        _ = el.class_list().remove_1("hidden");
        // fallback for pages without the CSS class
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(START_OVERLAY_ID) {
        _ = el.class_list().add_1("hidden");
        _ = el.set_attribute("style", "display:none");
    }
}

/// Write the depth readout into the HUD element, one line per row.
pub fn update_hud(document: &web::Document, readout: &DepthReadout) {
    if let Some(el) = document.get_element_by_id(HUD_ID) {
        let [depth, freq, layer] = readout.lines();
        let html = format!(
            "<div style='color: #7fd8ff; font: 11px \"DM Mono\", monospace; letter-spacing: 0.08em; opacity: 0.8;'>{}<br>{}<br>{}</div>",
            depth, freq, layer
        );
        el.set_inner_html(&html);
    }
}

pub fn show_hud(document: &web::Document, visible: bool) {
    if let Some(el) = document.get_element_by_id(HUD_ID) {
        let style = if visible { "" } else { "display:none" };
        _ = el.set_attribute("style", style);
    }
}
