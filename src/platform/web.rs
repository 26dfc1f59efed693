//! Browser bindings: canvas surface, Telegram launch data, DOM helpers

use std::f64::consts::PI;

use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::backend::PlayerIdentity;
use crate::view::{BEAN_RADII, SceneView};

/// The game canvas and its 2D context
pub struct Surface {
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
}

impl Surface {
    /// Bind to the canvas with the given element id. Missing window,
    /// document, canvas or 2D context is fatal.
    pub fn bind(canvas_id: &str) -> Result<Self, JsValue> {
        let document = document()?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no #{canvas_id} element")))?
            .dyn_into()
            .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        Ok(Self { canvas, ctx })
    }

    /// Match the backing store to the displayed size
    pub fn resize(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let dpr = window.device_pixel_ratio();
        self.canvas
            .set_width((self.canvas.client_width() as f64 * dpr) as u32);
        self.canvas
            .set_height((self.canvas.client_height() as f64 * dpr) as u32);
        Ok(())
    }

    /// Paint one frame, scaling the logical viewport to the canvas
    pub fn draw(&self, view: &SceneView) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        ctx.set_transform(w / view.width as f64, 0.0, 0.0, h / view.height as f64, 0.0, 0.0)?;
        ctx.clear_rect(0.0, 0.0, view.width as f64, view.height as f64);

        let sky = ctx.create_linear_gradient(0.0, 0.0, 0.0, view.height as f64);
        sky.add_color_stop(0.0, view.sky_top)?;
        sky.add_color_stop(1.0, view.sky_bottom)?;
        ctx.set_fill_style_canvas_gradient(&sky);
        ctx.fill_rect(0.0, 0.0, view.width as f64, view.height as f64);

        for rect in view.platforms.iter().chain(&view.enemies) {
            ctx.set_global_alpha(rect.opacity as f64);
            ctx.set_fill_style_str(rect.color);
            ctx.fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
        }
        ctx.set_global_alpha(1.0);

        ctx.set_fill_style_str(crate::theme::BEAN_COLOR);
        for bean in &view.beans {
            ctx.begin_path();
            ctx.ellipse(
                bean.x as f64,
                bean.y as f64,
                BEAN_RADII.0 as f64,
                BEAN_RADII.1 as f64,
                PI / 4.0,
                0.0,
                2.0 * PI,
            )?;
            ctx.fill();
        }

        let player = &view.player;
        ctx.set_font(&format!("{}px sans-serif", player.size));
        ctx.fill_text(player.glyph, player.x as f64, player.y as f64)?;
        Ok(())
    }
}

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

/// Set the text of an element, if present
pub fn set_text(id: &str, text: &str) {
    if let Some(el) = document().ok().and_then(|d| d.get_element_by_id(id)) {
        el.set_text_content(Some(text));
    }
}

/// Toggle the `hidden` class on an element, if present
pub fn set_visible(id: &str, visible: bool) {
    if let Some(el) = document().ok().and_then(|d| d.get_element_by_id(id)) {
        let _ = el.class_list().toggle_with_force("hidden", !visible);
    }
}

/// Toggle the `active` class (settings switches)
pub fn set_active(id: &str, active: bool) {
    if let Some(el) = document().ok().and_then(|d| d.get_element_by_id(id)) {
        let _ = el.class_list().toggle_with_force("active", active);
    }
}

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn call_method(target: &JsValue, name: &str) {
    if let Some(f) = get(target, name).and_then(|f| f.dyn_into::<Function>().ok()) {
        let _ = f.call0(target);
    }
}

/// `window.Telegram.WebApp`, when launched inside Telegram
fn telegram_web_app() -> Option<JsValue> {
    let window: JsValue = web_sys::window()?.into();
    get(&window, "Telegram").and_then(|tg| get(&tg, "WebApp"))
}

/// Tell Telegram the app is ready and take the full height
pub fn telegram_ready() {
    match telegram_web_app() {
        Some(app) => {
            call_method(&app, "ready");
            call_method(&app, "expand");
        }
        None => log::info!("Not running inside Telegram"),
    }
}

/// Player identity from the Telegram launch parameters
pub fn telegram_identity() -> PlayerIdentity {
    let Some(user) = telegram_web_app()
        .and_then(|app| get(&app, "initDataUnsafe"))
        .and_then(|data| get(&data, "user"))
    else {
        return PlayerIdentity::default();
    };

    let defaults = PlayerIdentity::default();
    PlayerIdentity {
        id: get(&user, "id").and_then(|v| v.as_f64()).map(|id| id as i64),
        username: get(&user, "username")
            .and_then(|v| v.as_string())
            .unwrap_or(defaults.username),
        first_name: get(&user, "first_name").and_then(|v| v.as_string()),
    }
}

/// iOS gates orientation events behind `DeviceOrientationEvent.requestPermission()`.
/// Returns the promise when the browser asks, `None` when no prompt is needed.
pub fn orientation_permission_request() -> Option<js_sys::Promise> {
    let window: JsValue = web_sys::window()?.into();
    let ctor = get(&window, "DeviceOrientationEvent")?;
    let request = get(&ctor, "requestPermission")?.dyn_into::<Function>().ok()?;
    request.call0(&ctor).ok()?.dyn_into().ok()
}
