//! DOM renderer: the wheel is a rotated `#roulette-inner` element
//!
//! Sectors are SVG paths, the spin is a CSS transform transition.

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement};

use super::{WheelRenderer, rotation_from_matrix, wheel_markup, wheel_shapes};
use crate::wheel::WeightPartition;

const SPIN_EASING: &str = "cubic-bezier(0.2, 0.1, 0.25, 1.0)";

pub struct DomRenderer {
    inner: HtmlElement,
}

impl DomRenderer {
    /// Attach to the `#roulette-inner` element
    pub fn attach(document: &Document) -> Result<Self, JsValue> {
        let inner = document
            .get_element_by_id("roulette-inner")
            .ok_or_else(|| JsValue::from_str("missing #roulette-inner"))?
            .dyn_into::<HtmlElement>()?;
        Ok(Self { inner })
    }

    /// Element whose `transitionend` marks the end of a spin
    pub fn element(&self) -> &HtmlElement {
        &self.inner
    }

    /// Keep labels upright after the wheel stopped at `rotation_deg`
    pub fn counter_rotate_labels(&self, rotation_deg: f64) {
        let Ok(labels) = self.inner.query_selector_all(".section-label") else {
            return;
        };
        for i in 0..labels.length() {
            if let Some(label) = labels.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
                let _ = label.style().set_property(
                    "transform",
                    &format!("translate(-50%, -50%) rotate({}deg)", -rotation_deg),
                );
            }
        }
    }

    fn set_transition(&self, value: &str) {
        let _ = self.inner.style().set_property("transition", value);
    }

    fn set_rotation(&self, rotation_deg: f64) {
        let _ = self
            .inner
            .style()
            .set_property("transform", &format!("rotate({}deg)", rotation_deg));
    }
}

impl WheelRenderer for DomRenderer {
    fn draw(&mut self, partition: Option<&WeightPartition>) {
        self.set_transition("none");
        match partition {
            Some(p) => self.inner.set_inner_html(&wheel_markup(&wheel_shapes(p))),
            None => self
                .inner
                .set_inner_html(r#"<div class="roulette-message">No items configured</div>"#),
        }
        self.set_rotation(0.0);
    }

    fn rotation_deg(&self) -> f64 {
        let transform = web_sys::window()
            .and_then(|w| w.get_computed_style(&self.inner).ok().flatten())
            .and_then(|style| style.get_property_value("transform").ok())
            .unwrap_or_default();
        rotation_from_matrix(&transform).unwrap_or_else(|| {
            log::warn!("Unreadable transform {:?}, assuming 0°", transform);
            0.0
        })
    }

    fn snap_to(&mut self, rotation_deg: f64) {
        self.set_transition("none");
        self.set_rotation(rotation_deg);
    }

    fn animate_to(&mut self, rotation_deg: f64, duration_ms: u32) {
        self.set_transition(&format!(
            "transform {}s {}",
            f64::from(duration_ms) / 1000.0,
            SPIN_EASING
        ));
        self.set_rotation(rotation_deg);
    }
}
