//! Browser tests for the DOM host and completion mailbox
//!
//! Run with `wasm-pack test --headless --firefox -- --features wasm`.

#![cfg(all(target_arch = "wasm32", feature = "wasm"))]

use std::rc::Rc;

use liquid_glass::web::{init_logging, Completion, DomHost, GpuContext, Mailbox};
use liquid_glass::{
    DecodeTicket, EncodedSnapshot, ImageData, LayoutHost, PanelId, RenderSurface, ShapeStyle,
    SurfaceSpec,
};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn spec(classes: Vec<&'static str>) -> SurfaceSpec {
    SurfaceSpec {
        classes,
        border_radius: 12.0,
        opacity: 0.0,
        transition: "opacity 0.5s ease",
    }
}

fn body() -> web_sys::HtmlElement {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
        .expect("test page has a body")
}

// =============================================================================
// Mailbox
// =============================================================================

#[wasm_bindgen_test]
fn mailbox_drains_in_post_order() {
    let mailbox = Mailbox::new();
    let sender = mailbox.clone();
    sender.post(Completion::Loaded(js_sys::Function::new_no_args("")));
    sender.post(Completion::Decoded(DecodeTicket::default(), Ok(ImageData::filled(1, 1, [0; 4]))));

    let drained = mailbox.drain();
    assert_eq!(drained.len(), 2);
    assert!(matches!(drained[0], Completion::Loaded(_)));
    assert!(matches!(drained[1], Completion::Decoded(..)));
    assert!(mailbox.drain().is_empty());
}

#[wasm_bindgen_test]
fn logging_init_is_idempotent() {
    init_logging("debug");
    init_logging("warn");
    log::warn!("logger installed");
}

// =============================================================================
// DOM Host
// =============================================================================

#[wasm_bindgen_test]
fn surface_element_carries_classes_and_hidden_canvas() {
    let mut host = DomHost::new(None, Mailbox::new()).expect("host");
    let surface = host.create_surface(PanelId(1), &spec(vec!["glass-container", "glass-container-pill"]));

    let element = host.element(PanelId(1)).expect("element").clone();
    assert_eq!(element.class_name(), "glass-container glass-container-pill");
    assert_eq!(surface.opacity(), 0.0);
    assert!(element.first_element_child().is_some());
}

#[wasm_bindgen_test]
fn measure_requires_connected_element() {
    let mut host = DomHost::new(None, Mailbox::new()).expect("host");
    let _surface = host.create_surface(PanelId(1), &spec(vec!["glass-container"]));
    assert!(host.measure(PanelId(1)).is_none());

    let element = host.element(PanelId(1)).expect("element").clone();
    body().append_child(&element).expect("append");
    host.apply_shape(
        PanelId(1),
        &ShapeStyle {
            width: Some(120),
            height: Some(120),
            border_radius: 60.0,
        },
    );

    let rect = host.measure(PanelId(1)).expect("measured");
    assert_eq!(rect.width, 120.0);
    assert_eq!(rect.height, 120.0);

    host.release_panel(PanelId(1));
    assert!(host.element(PanelId(1)).is_none());
    assert!(!element.is_connected());
}

#[wasm_bindgen_test]
fn attach_moves_child_element_under_parent() {
    let mut host = DomHost::new(None, Mailbox::new()).expect("host");
    let _parent = host.create_surface(PanelId(1), &spec(vec!["glass-container"]));
    let _child = host.create_surface(PanelId(2), &spec(vec!["glass-container", "glass-button"]));

    host.attach_child(PanelId(1), PanelId(2));
    let parent = host.element(PanelId(1)).expect("parent").clone();
    let child = host.element(PanelId(2)).expect("child").clone();
    assert!(parent.contains(Some(&child)));

    host.detach_child(PanelId(1), PanelId(2));
    assert!(!parent.contains(Some(&child)));
}

#[wasm_bindgen_test]
fn detached_surface_stays_alive() {
    let mut host = DomHost::new(None, Mailbox::new()).expect("host");
    let _parent = host.create_surface(PanelId(1), &spec(vec!["glass-container"]));
    let child = host.create_surface(PanelId(2), &spec(vec!["glass-container", "glass-button"]));
    let parent = host.element(PanelId(1)).expect("parent").clone();
    body().append_child(&parent).expect("append");

    host.attach_child(PanelId(1), PanelId(2));
    assert!(child.canvas().is_connected());
    assert!(child.is_alive());

    host.detach_child(PanelId(1), PanelId(2));
    assert!(!child.canvas().is_connected());
    assert!(child.is_alive());

    host.attach_child(PanelId(1), PanelId(2));
    assert!(child.is_alive());
    host.release_panel(PanelId(1));
}

#[wasm_bindgen_test]
async fn detached_surface_skips_draw() {
    let document = web_sys::window().and_then(|w| w.document()).expect("document");
    let Ok(gpu) = GpuContext::new(&document).await else {
        log::warn!("no GPU adapter in this browser");
        return;
    };
    let mut host = DomHost::new(Some(Rc::new(gpu)), Mailbox::new()).expect("host");
    let mut surface = host.create_surface(PanelId(1), &spec(vec!["glass-container"]));
    surface.resize(40, 40);

    // Out of the page: nothing is presented and the surface stays usable
    assert!(surface.draw(6).is_ok());
    assert!(surface.is_alive());
    host.release_panel(PanelId(1));
}

#[wasm_bindgen_test]
fn raw_snapshot_decodes_immediately() {
    let mailbox = Mailbox::new();
    let mut host = DomHost::new(None, mailbox.clone()).expect("host");
    host.decode_image(
        DecodeTicket::default(),
        EncodedSnapshot::Raw(ImageData::filled(2, 2, [255, 0, 0, 255])),
    );

    let drained = mailbox.drain();
    assert_eq!(drained.len(), 1);
    match &drained[0] {
        Completion::Decoded(_, Ok(image)) => assert_eq!(image.pixel(1, 1), Some([255, 0, 0, 255])),
        _ => panic!("expected a decoded image"),
    }
}
