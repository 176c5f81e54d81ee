#![cfg(target_arch = "wasm32")]
use serde_wasm_bindgen as swb;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

use scroll_reveal_core::{Phase, SkipReason, Snapshot};
use scroll_reveal_wasm::{abi_version, install, RevealHandle};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn body_has(class: &str) -> bool {
    document().body().unwrap().class_list().contains(class)
}

/// Append `<section id=..>` with `n` `.card` children to the body.
fn mount(id: &str, n: usize) -> Vec<Element> {
    let doc = document();
    let section = doc.create_element("section").unwrap();
    section.set_id(id);
    let cards: Vec<Element> = (0..n)
        .map(|_| {
            let el = doc.create_element("div").unwrap();
            el.set_class_name("card");
            section.append_child(&el).unwrap();
            el
        })
        .collect();
    doc.body().unwrap().append_child(&section).unwrap();
    cards
}

fn cfg(json: &str) -> JsValue {
    js_sys::JSON::parse(json).unwrap()
}

fn snapshot(handle: &RevealHandle) -> Snapshot {
    swb::from_value(handle.snapshot().unwrap()).unwrap()
}

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn install_classifies_and_staggers() {
    let cards = mount("wasm-stagger", 6);
    let handle = install(cfg(
        r##"{ "selectors": ["#wasm-stagger .card"], "classes": { "init": "wasm-stagger-init" } }"##,
    ))
    .unwrap();

    let snap = snapshot(&handle);
    assert_eq!(snap.targets, 6);
    assert_eq!(snap.delays_ms, vec![0, 60, 120, 180, 240, 240]);
    assert_eq!(snap.phase, Phase::Watching);
    let delays: Vec<String> = cards
        .iter()
        .map(|card| {
            assert!(card.class_list().contains("reveal"));
            let style = card.dyn_ref::<HtmlElement>().unwrap().style();
            style.get_property_value("transition-delay").unwrap()
        })
        .collect();
    assert_eq!(delays, ["0ms", "60ms", "120ms", "180ms", "240ms", "240ms"]);
    assert!(body_has("wasm-stagger-init"));
}

#[wasm_bindgen_test]
fn page_without_targets_clears_flag_immediately() {
    let handle = install(cfg(
        r##"{ "selectors": ["#wasm-absent .card"], "classes": { "init": "wasm-absent-init" } }"##,
    ))
    .unwrap();
    let snap = snapshot(&handle);
    assert_eq!(snap.phase, Phase::Skipped(SkipReason::NoTargets));
    assert!(!snap.init_flag);
    assert!(!body_has("wasm-absent-init"));

    let events: js_sys::Array = handle.events().unwrap().unchecked_into();
    assert_eq!(events.length(), 3);
}

#[wasm_bindgen_test]
fn invalid_config_is_rejected() {
    assert!(install(cfg(r#"{ "watch": { "threshold": 2 } }"#)).is_err());
    assert!(install(cfg(r#"{ "watch": { "root_margin": "1em" } }"#)).is_err());
    assert!(install(cfg(r#"{ "selectors": ["a > > b"] }"#)).is_err());
}

#[wasm_bindgen_test]
async fn load_fallback_clears_init_flag() {
    mount("wasm-fallback", 1);
    let handle = install(cfg(
        r##"{ "selectors": ["#wasm-fallback .card"], "classes": { "init": "wasm-fallback-init" } }"##,
    ))
    .unwrap();
    assert!(body_has("wasm-fallback-init"));
    sleep(250).await;
    assert!(!body_has("wasm-fallback-init"));
    assert!(!snapshot(&handle).init_flag);
}

#[wasm_bindgen_test]
async fn visible_target_is_revealed_once() {
    let cards = mount("wasm-visible", 1);
    cards[0]
        .set_attribute(
            "style",
            "position:fixed;top:0;left:0;width:100px;height:100px",
        )
        .unwrap();
    let handle = install(cfg(
        r##"{ "selectors": ["#wasm-visible .card"], "classes": { "init": "wasm-visible-init" } }"##,
    ))
    .unwrap();
    sleep(250).await;
    assert!(cards[0].class_list().contains("in"));
    let snap = snapshot(&handle);
    assert_eq!(snap.revealed, 1);
    assert_eq!(snap.phase, Phase::Settled);
}

#[wasm_bindgen_test]
fn polling_fallback_reveals_without_intersection_observer() {
    let window: JsValue = web_sys::window().unwrap().into();
    let key = JsValue::from_str("IntersectionObserver");
    let native = js_sys::Reflect::get(&window, &key).unwrap();
    assert!(js_sys::Reflect::delete_property(window.unchecked_ref(), &key).unwrap());

    let polled = mount("wasm-polled", 1);
    polled[0]
        .set_attribute(
            "style",
            "position:fixed;top:0;left:0;width:100px;height:100px",
        )
        .unwrap();
    mount("wasm-unpolled", 1);

    let with_polling = install(cfg(
        r##"{ "selectors": ["#wasm-polled .card"], "polling_fallback": true,
             "classes": { "init": "wasm-polled-init" } }"##,
    ));
    let without_polling = install(cfg(
        r##"{ "selectors": ["#wasm-unpolled .card"], "classes": { "init": "wasm-unpolled-init" } }"##,
    ));

    js_sys::Reflect::set(&window, &key, &native).unwrap();

    let handle = with_polling.unwrap();
    assert!(polled[0].class_list().contains("in"));
    let snap = snapshot(&handle);
    assert_eq!(snap.revealed, 1);
    assert_eq!(snap.phase, Phase::Settled);

    assert!(without_polling.is_err());
    assert!(!body_has("wasm-unpolled-init"));
}
