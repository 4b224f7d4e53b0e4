//! DOM implementation of the layout host

use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Event, HtmlCanvasElement, HtmlElement, HtmlImageElement,
    Window,
};

use crate::error::SnapshotError;
use crate::host::{DecodeTicket, LayoutHost, ShapeStyle, SurfaceSpec};
use crate::math::Rect;
use crate::panel::PanelId;
use crate::snapshot::{EncodedSnapshot, ImageData};

use super::surface::{GpuContext, WgpuSurface};
use super::{js_error, Completion, Mailbox};

/// Inline style of the canvas stacked under a panel's content
const CANVAS_STYLE: [(&str, &str); 9] = [
    ("position", "absolute"),
    ("top", "0"),
    ("left", "0"),
    ("width", "100%"),
    ("height", "100%"),
    ("border-radius", "inherit"),
    ("pointer-events", "none"),
    ("z-index", "-1"),
    ("display", "block"),
];

/// Layout host backed by the page's DOM
pub struct DomHost {
    window: Window,
    document: Document,
    gpu: Option<Rc<GpuContext>>,
    mailbox: Mailbox,
    elements: HashMap<PanelId, HtmlElement>,
    /// Detached canvas handed out when element creation fails
    spare: HtmlCanvasElement,
}

impl DomHost {
    /// Create a host on the current page
    ///
    /// `gpu` is `None` when the browser offers no WebGPU device; panels then
    /// keep their fallback styling.
    pub fn new(gpu: Option<Rc<GpuContext>>, mailbox: Mailbox) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let spare = document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?;
        Ok(Self {
            window,
            document,
            gpu,
            mailbox,
            elements: HashMap::new(),
            spare,
        })
    }

    /// The panel's element, for the page to place and fill with content
    pub fn element(&self, panel: PanelId) -> Option<&HtmlElement> {
        self.elements.get(&panel)
    }

    fn build_panel(
        &self,
        spec: &SurfaceSpec,
    ) -> Result<(HtmlElement, HtmlCanvasElement), JsValue> {
        let element = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlElement>()?;
        element.set_class_name(&spec.classes.join(" "));
        element
            .style()
            .set_property("border-radius", &format!("{}px", spec.border_radius))?;

        let canvas = self
            .document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()?;
        let style = canvas.style();
        for (property, value) in CANVAS_STYLE {
            style.set_property(property, value)?;
        }
        style.set_property("opacity", &spec.opacity.to_string())?;
        style.set_property("transition", spec.transition)?;
        element.append_child(&canvas)?;
        Ok((element, canvas))
    }

    /// Load a data URL into an image element and read its pixels back
    fn decode_data_url(&self, ticket: DecodeTicket, url: &str) -> Result<(), JsValue> {
        let image = HtmlImageElement::new()?;
        let loaded = image.clone();
        let document = self.document.clone();
        let mailbox = self.mailbox.clone();

        let on_settled = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let result = if event.type_() == "load" {
                read_image(&document, &loaded)
            } else {
                Err(SnapshotError::Decode("image element rejected the snapshot".into()))
            };
            mailbox.post(Completion::Decoded(ticket, result));
        })
        .into_js_value();
        image.set_onload(Some(on_settled.unchecked_ref()));
        image.set_onerror(Some(on_settled.unchecked_ref()));
        image.set_src(url);
        Ok(())
    }
}

/// Draw a loaded image onto a scratch canvas and read its RGBA pixels
fn read_image(document: &Document, image: &HtmlImageElement) -> Result<ImageData, SnapshotError> {
    let (width, height) = (image.natural_width(), image.natural_height());
    let canvas = document
        .create_element("canvas")
        .and_then(|e| e.dyn_into::<HtmlCanvasElement>().map_err(JsValue::from))
        .map_err(|e| SnapshotError::Decode(js_error(&e)))?;
    canvas.set_width(width);
    canvas.set_height(height);
    let context = canvas
        .get_context("2d")
        .map_err(|e| SnapshotError::Decode(js_error(&e)))?
        .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or_else(|| SnapshotError::Decode("scratch canvas has no 2d context".into()))?;
    context
        .draw_image_with_html_image_element(image, 0.0, 0.0)
        .map_err(|e| SnapshotError::Decode(js_error(&e)))?;
    let data = context
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(|_| SnapshotError::Tainted)?;
    ImageData::new(width, height, data.data().0)
}

impl LayoutHost for DomHost {
    type Surface = WgpuSurface;

    fn create_surface(&mut self, panel: PanelId, spec: &SurfaceSpec) -> WgpuSurface {
        match self.build_panel(spec) {
            Ok((element, canvas)) => {
                self.elements.insert(panel, element);
                WgpuSurface::new(canvas, self.gpu.clone())
            }
            Err(e) => {
                log::error!("cannot create element of panel {}: {}", panel, js_error(&e));
                WgpuSurface::new(self.spare.clone(), None)
            }
        }
    }

    fn measure(&self, panel: PanelId) -> Option<Rect> {
        let element = self.elements.get(&panel)?;
        if !element.is_connected() {
            return None;
        }
        let rect = element.get_bounding_client_rect();
        Some(Rect::new(
            rect.x() as f32,
            rect.y() as f32,
            rect.width() as f32,
            rect.height() as f32,
        ))
    }

    fn apply_shape(&mut self, panel: PanelId, shape: &ShapeStyle) {
        let Some(element) = self.elements.get(&panel) else {
            return;
        };
        let style = element.style();
        let mut properties = vec![("border-radius", format!("{}px", shape.border_radius))];
        if let Some(width) = shape.width {
            properties.push(("width", format!("{}px", width)));
        }
        if let Some(height) = shape.height {
            properties.push(("height", format!("{}px", height)));
        }
        for (property, value) in properties {
            if let Err(e) = style.set_property(property, &value) {
                log::warn!("cannot set {} of panel {}: {}", property, panel, js_error(&e));
            }
        }
    }

    fn attach_child(&mut self, parent: PanelId, child: PanelId) {
        let (Some(parent_el), Some(child_el)) = (self.elements.get(&parent), self.elements.get(&child))
        else {
            return;
        };
        if let Err(e) = parent_el.append_child(child_el) {
            log::warn!("cannot attach panel {} to {}: {}", child, parent, js_error(&e));
        }
    }

    fn detach_child(&mut self, parent: PanelId, child: PanelId) {
        let (Some(parent_el), Some(child_el)) = (self.elements.get(&parent), self.elements.get(&child))
        else {
            return;
        };
        let _ = parent_el.remove_child(child_el);
    }

    fn scroll_offset(&self) -> f32 {
        self.window.scroll_y().unwrap_or(0.0) as f32
    }

    fn page_height(&self) -> f32 {
        self.document
            .document_element()
            .map_or(0.0, |root| root.scroll_height() as f32)
    }

    fn viewport_height(&self) -> f32 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0) as f32
    }

    fn decode_image(&mut self, ticket: DecodeTicket, image: EncodedSnapshot) {
        match image {
            EncodedSnapshot::Raw(pixels) => {
                self.mailbox.post(Completion::Decoded(ticket, Ok(pixels)));
            }
            EncodedSnapshot::DataUrl(url) => {
                if let Err(e) = self.decode_data_url(ticket, &url) {
                    let error = SnapshotError::Decode(js_error(&e));
                    self.mailbox.post(Completion::Decoded(ticket, Err(error)));
                }
            }
        }
    }

    fn release_panel(&mut self, panel: PanelId) {
        if let Some(element) = self.elements.remove(&panel) {
            element.remove();
        }
    }
}
