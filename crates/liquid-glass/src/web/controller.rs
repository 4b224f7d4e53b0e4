//! WASM exports for liquid glass panels
//!
//! [`GlassController`] owns the engine and drives it from browser events:
//! window resize and scroll, plus one animation frame loop that delivers
//! completed captures and decodes, fires timers and measures panels.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, Window};

use crate::engine::GlassEngine;
use crate::error::GlassError;
use crate::panel::{ButtonOptions, PanelId, PanelOptions};

use super::dom_host::DomHost;
use super::rasterizer::Html2CanvasRasterizer;
use super::surface::GpuContext;
use super::{js_error, Completion, Mailbox};

type Engine = GlassEngine<DomHost, Html2CanvasRasterizer>;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn to_js(error: GlassError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Open the GPU device and start a controller on the current page
///
/// WebGPU is preferred and WebGL2 is used when it is missing. A browser with
/// neither still gets a controller; its panels keep the fallback styling.
#[wasm_bindgen]
pub async fn create_controller() -> Result<GlassController, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let gpu = match GpuContext::new(&document).await {
        Ok(gpu) => Some(Rc::new(gpu)),
        Err(e) => {
            log::warn!("{}; panels keep their fallback styling", e);
            None
        }
    };
    GlassController::start(gpu)
}

/// Glass controller for WASM - wraps GlassEngine with a JS-friendly API
#[wasm_bindgen]
pub struct GlassController {
    engine: Rc<RefCell<Engine>>,
    mailbox: Mailbox,
    window: Window,
    running: Rc<Cell<bool>>,
    listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
    frame: FrameCallback,
    frame_request: Rc<Cell<i32>>,
}

impl GlassController {
    fn start(gpu: Option<Rc<GpuContext>>) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let mailbox = Mailbox::new();
        let host = DomHost::new(gpu, mailbox.clone())?;
        let rasterizer = Html2CanvasRasterizer::new(mailbox.clone());
        let engine = Rc::new(RefCell::new(GlassEngine::new(host, rasterizer)));

        let on_resize = {
            let engine = engine.clone();
            Closure::<dyn FnMut()>::new(move || {
                engine.borrow_mut().on_resize(js_sys::Date::now());
            })
        };
        let on_scroll = {
            let engine = engine.clone();
            Closure::<dyn FnMut()>::new(move || {
                engine.borrow_mut().on_scroll();
            })
        };
        let listeners = vec![("resize", on_resize), ("scroll", on_scroll)];
        for (event, callback) in &listeners {
            window.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        }

        let running = Rc::new(Cell::new(true));
        let frame_request = Rc::new(Cell::new(0));
        // The loop closure holds its own cell; Drop empties it to free the closure
        let frame: FrameCallback = Rc::new(RefCell::new(None));
        {
            let engine = engine.clone();
            let mailbox = mailbox.clone();
            let running = running.clone();
            let request = frame_request.clone();
            let window = window.clone();
            let next = frame.clone();
            *frame.borrow_mut() = Some(Closure::<dyn FnMut()>::new(move || {
                if !running.get() {
                    return;
                }
                pump(&engine, &mailbox);
                if !running.get() {
                    return;
                }
                if let Some(callback) = next.borrow().as_ref() {
                    match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                        Ok(id) => request.set(id),
                        Err(e) => log::error!("animation frame loop stopped: {}", js_error(&e)),
                    }
                }
            }));
        }
        if let Some(callback) = frame.borrow().as_ref() {
            frame_request.set(window.request_animation_frame(callback.as_ref().unchecked_ref())?);
        }

        log::info!("liquid glass controller started");
        Ok(Self {
            engine,
            mailbox,
            window,
            running,
            listeners,
            frame,
            frame_request,
        })
    }
}

/// One animation frame: deliver completions, fire timers, measure panels
fn pump(engine: &RefCell<Engine>, mailbox: &Mailbox) {
    let now = js_sys::Date::now();
    let mut loaded = Vec::new();
    {
        let mut engine = engine.borrow_mut();
        for completion in mailbox.drain() {
            match completion {
                Completion::Captured(ticket, result) => engine.resolve_capture(ticket, result),
                Completion::Decoded(ticket, result) => engine.resolve_decode(ticket, result, now),
                Completion::Loaded(callback) => loaded.push(callback),
            }
        }
        engine.tick(now);
        engine.on_animation_frame();
    }

    // The page may call back into the controller from onLoad
    for callback in loaded {
        if let Err(e) = callback.call0(&JsValue::NULL) {
            log::warn!("onLoad callback threw: {}", js_error(&e));
        }
    }
}

#[wasm_bindgen]
impl GlassController {
    // =========================================================================
    // Panels
    // =========================================================================

    /// Create a glass container from JSON options
    ///
    /// `on_load` runs once the panel's shader is drawing. The new element is
    /// returned by `element` and must be placed in the page by the caller.
    #[wasm_bindgen]
    pub fn create_panel(
        &self,
        options_json: &str,
        on_load: Option<js_sys::Function>,
    ) -> Result<u64, JsValue> {
        let mut options = PanelOptions::from_json(options_json).map_err(to_js)?;
        if let Some(callback) = on_load {
            let mailbox = self.mailbox.clone();
            options = options.on_load(move || mailbox.post(Completion::Loaded(callback)));
        }
        Ok(self.engine.borrow_mut().create_panel(options).0)
    }

    /// Create a glass button; it renders once added to a glass parent
    #[wasm_bindgen]
    pub fn create_button(&self, options_json: &str) -> Result<u64, JsValue> {
        let options = ButtonOptions::from_json(options_json).map_err(to_js)?;
        Ok(self.engine.borrow_mut().create_button(options).0)
    }

    /// Element of a panel, to append to the page or fill with content
    #[wasm_bindgen]
    pub fn element(&self, id: u64) -> Option<HtmlElement> {
        self.engine.borrow().host().element(PanelId(id)).cloned()
    }

    /// Destroy a panel and every panel nested in it
    #[wasm_bindgen]
    pub fn destroy_panel(&self, id: u64) -> Result<(), JsValue> {
        self.engine.borrow_mut().destroy_panel(PanelId(id)).map_err(to_js)
    }

    // =========================================================================
    // Panel Tree
    // =========================================================================

    #[wasm_bindgen]
    pub fn add_child(&self, parent: u64, child: u64) -> Result<(), JsValue> {
        self.engine
            .borrow_mut()
            .add_child(PanelId(parent), PanelId(child))
            .map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn remove_child(&self, parent: u64, child: u64) -> Result<(), JsValue> {
        self.engine
            .borrow_mut()
            .remove_child(PanelId(parent), PanelId(child))
            .map_err(to_js)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Shader state of a panel, e.g. `"ready"` or `"fallback"`
    #[wasm_bindgen]
    pub fn panel_state(&self, id: u64) -> Option<String> {
        self.engine
            .borrow()
            .panel(PanelId(id))
            .map(|p| p.state().name().to_string())
    }

    #[wasm_bindgen]
    pub fn panel_count(&self) -> usize {
        self.engine.borrow().panel_count()
    }

    /// Whether a page capture is in flight
    #[wasm_bindgen]
    pub fn is_capturing(&self) -> bool {
        self.engine.borrow().coordinator().is_capturing()
    }
}

impl Drop for GlassController {
    fn drop(&mut self) {
        self.running.set(false);
        let _ = self.window.cancel_animation_frame(self.frame_request.get());
        self.frame.borrow_mut().take();
        log::info!("liquid glass controller stopped");
        for (event, callback) in &self.listeners {
            let _ = self
                .window
                .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn dropping_controller_frees_engine_and_frame_loop() {
        let controller = GlassController::start(None).expect("controller");
        let engine = Rc::downgrade(&controller.engine);
        let frame = Rc::downgrade(&controller.frame);
        let running_loop = frame.upgrade().expect("frame loop");
        assert!(running_loop.borrow().is_some());
        drop(running_loop);

        drop(controller);
        assert!(engine.upgrade().is_none());
        assert!(frame.upgrade().is_none());
    }
}
