//! html2canvas page capture

use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement};

use crate::error::SnapshotError;
use crate::snapshot::{
    CaptureOptions, CaptureTicket, EncodedSnapshot, ImageData, PageRasterizer, PageSnapshot,
};

use super::{js_error, Completion, Mailbox};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_name = html2canvas)]
    fn html2canvas(element: &HtmlElement, options: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

/// Snapshot backed by the canvas html2canvas rendered into
pub struct CanvasSnapshot {
    canvas: HtmlCanvasElement,
}

impl CanvasSnapshot {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }
}

impl PageSnapshot for CanvasSnapshot {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn encode(&self) -> Result<EncodedSnapshot, SnapshotError> {
        // toDataURL throws a SecurityError on a tainted canvas
        self.canvas
            .to_data_url()
            .map(EncodedSnapshot::DataUrl)
            .map_err(|_| SnapshotError::Tainted)
    }

    fn pixels(&self) -> Result<ImageData, SnapshotError> {
        let context = self
            .canvas
            .get_context("2d")
            .map_err(|e| SnapshotError::Rasterizer(js_error(&e)))?
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| SnapshotError::Rasterizer("snapshot canvas has no 2d context".into()))?;
        let (width, height) = (self.width(), self.height());
        let data = context
            .get_image_data(0.0, 0.0, width as f64, height as f64)
            .map_err(|_| SnapshotError::Tainted)?;
        ImageData::new(width, height, data.data().0)
    }
}

/// Closures html2canvas calls back into while capturing
struct CaptureHooks {
    _ignore: Closure<dyn Fn(Element) -> bool>,
    _on_clone: Closure<dyn Fn(Document)>,
}

/// Page rasterizer calling the global `html2canvas`
pub struct Html2CanvasRasterizer {
    mailbox: Mailbox,
}

impl Html2CanvasRasterizer {
    /// Create a rasterizer posting its results to `mailbox`
    pub fn new(mailbox: Mailbox) -> Self {
        Self { mailbox }
    }

    fn start(options: &CaptureOptions) -> Result<(js_sys::Promise, CaptureHooks), SnapshotError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(SnapshotError::Unavailable)?;
        let body = document
            .body()
            .ok_or_else(|| SnapshotError::Rasterizer("page has no body".into()))?;

        let json = serde_json::to_string(options)
            .map_err(|e| SnapshotError::Rasterizer(e.to_string()))?;
        let js_options =
            js_sys::JSON::parse(&json).map_err(|e| SnapshotError::Rasterizer(js_error(&e)))?;

        let ignore_classes = options.ignore_classes.clone();
        let ignore = Closure::<dyn Fn(Element) -> bool>::new(move |element: Element| {
            let classes = element.class_list();
            ignore_classes.iter().any(|c| classes.contains(c))
        });

        let hidden = options.hide_on_clone.clone();
        let on_clone = Closure::<dyn Fn(Document)>::new(move |clone: Document| {
            for selector in &hidden {
                let Ok(nodes) = clone.query_selector_all(selector) else {
                    continue;
                };
                for i in 0..nodes.length() {
                    if let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
                        let _ = element.style().set_property("opacity", "0");
                    }
                }
            }
        });

        let hook_values: [(&str, &JsValue); 2] = [
            ("ignoreElements", ignore.as_ref()),
            ("onclone", on_clone.as_ref()),
        ];
        for (key, hook) in hook_values {
            js_sys::Reflect::set(&js_options, &JsValue::from_str(key), hook)
                .map_err(|e| SnapshotError::Rasterizer(js_error(&e)))?;
        }

        let promise =
            html2canvas(&body, &js_options).map_err(|e| SnapshotError::Rasterizer(js_error(&e)))?;
        Ok((
            promise,
            CaptureHooks {
                _ignore: ignore,
                _on_clone: on_clone,
            },
        ))
    }
}

impl PageRasterizer for Html2CanvasRasterizer {
    fn is_available(&self) -> bool {
        web_sys::window().map_or(false, |window| {
            js_sys::Reflect::has(&window, &JsValue::from_str("html2canvas")).unwrap_or(false)
        })
    }

    fn capture(&mut self, ticket: CaptureTicket, options: &CaptureOptions) {
        let mailbox = self.mailbox.clone();
        let (promise, hooks) = match Self::start(options) {
            Ok(started) => started,
            Err(e) => {
                mailbox.post(Completion::Captured(ticket, Err(e)));
                return;
            }
        };

        spawn_local(async move {
            let result = JsFuture::from(promise).await;
            drop(hooks);
            let snapshot = match result {
                Ok(value) => value
                    .dyn_into::<HtmlCanvasElement>()
                    .map(|canvas| Rc::new(CanvasSnapshot::new(canvas)) as Rc<dyn PageSnapshot>)
                    .map_err(|_| SnapshotError::Rasterizer("html2canvas returned no canvas".into())),
                Err(e) => Err(SnapshotError::Rasterizer(js_error(&e))),
            };
            mailbox.post(Completion::Captured(ticket, snapshot));
        });
    }
}
