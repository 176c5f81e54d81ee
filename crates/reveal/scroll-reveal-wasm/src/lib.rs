use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::Array;
use log::{error, warn};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Element, Window};

use scroll_reveal_core::{Config, RevealController, RevealError, SetupOutcome};

mod logger;
mod page;

use page::{Callbacks, WebPage};

/// Controller plus the page it drives. Lives for the rest of the page.
struct Runtime {
    controller: RevealController<Element>,
    page: WebPage,
}

type Shared = Rc<RefCell<Runtime>>;

thread_local! {
    static ACTIVE: RefCell<Vec<Shared>> = const { RefCell::new(Vec::new()) };
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn to_js(e: RevealError) -> JsError {
    JsError::new(&e.to_string())
}

/// Run `f` against the runtime if it is still alive and not already borrowed.
fn with_runtime(
    rt: &Weak<RefCell<Runtime>>,
    f: impl FnOnce(&mut RevealController<Element>, &mut WebPage),
) {
    let Some(rt) = rt.upgrade() else {
        return;
    };
    let Ok(mut guard) = rt.try_borrow_mut() else {
        warn!("reveal runtime busy; callback skipped");
        return;
    };
    let Runtime { controller, page } = &mut *guard;
    f(controller, page);
}

fn on_intersect(rt: &Weak<RefCell<Runtime>>, entries: Array) {
    with_runtime(rt, |controller, host| {
        controller.handle_intersections(host, page::entries_from_js(&entries));
    });
}

fn on_scroll(rt: &Weak<RefCell<Runtime>>) {
    with_runtime(rt, |controller, host| {
        let batch = host.poll();
        if !batch.is_empty() {
            controller.handle_intersections(host, batch);
        }
    });
}

fn finish_load(rt: &Weak<RefCell<Runtime>>) {
    with_runtime(rt, |controller, host| controller.complete_load_fallback(host));
}

fn build_runtime(cfg: Config) -> Result<Shared, JsError> {
    let window = web_sys::window().ok_or_else(|| JsError::new("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsError::new("window has no document"))?;
    let polling = cfg.polling_fallback;
    Ok(Rc::new_cyclic(|weak: &Weak<RefCell<Runtime>>| {
        let w_intersect = weak.clone();
        let w_scroll = weak.clone();
        let callbacks = Callbacks {
            on_intersect: Closure::new(move |entries: Array| on_intersect(&w_intersect, entries)),
            on_scroll: Closure::new(move || on_scroll(&w_scroll)),
        };
        RefCell::new(Runtime {
            controller: RevealController::new(cfg),
            page: WebPage::new(window, document, polling, callbacks),
        })
    }))
}

fn set_timeout(window: &Window, ms: u32, f: impl FnOnce() + 'static) -> Result<(), JsValue> {
    let timeout = i32::try_from(ms)
        .map_err(|_| JsValue::from_str(&format!("timeout {ms}ms out of range")))?;
    let cb = Closure::once_into_js(f);
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), timeout)
        .map(|_| ())
}

/// Clear the init flag `ms` after the full-load event, or `ms` from now if the
/// page has already `loaded`.
fn arm_load_fallback(rt: &Shared, ms: u32, loaded: bool) {
    let weak = Rc::downgrade(rt);
    let window = rt.borrow().page.window().clone();
    let armed = if loaded {
        let w = weak.clone();
        set_timeout(&window, ms, move || finish_load(&w))
    } else {
        let win = window.clone();
        let w = weak.clone();
        let on_load = Closure::once_into_js(move || {
            let w2 = w.clone();
            if set_timeout(&win, ms, move || finish_load(&w2)).is_err() {
                finish_load(&w);
            }
        });
        let opts = AddEventListenerOptions::new();
        opts.set_once(true);
        window.add_event_listener_with_callback_and_add_event_listener_options(
            "load",
            on_load.unchecked_ref(),
            &opts,
        )
    };
    if let Err(e) = armed {
        warn!("load fallback not armed ({}); clearing now", page::js_message(&e));
        finish_load(&weak);
    }
}

fn run(rt: &Shared) -> Result<SetupOutcome, RevealError> {
    let outcome = {
        let mut guard = rt.borrow_mut();
        let Runtime { controller, page } = &mut *guard;
        controller.start(page)?
    };
    if let SetupOutcome::Watching {
        load_fallback_ms, ..
    } = outcome
    {
        let loaded = rt.borrow().page.document().ready_state() == "complete";
        arm_load_fallback(rt, load_fallback_ms, loaded);
        // A polling watcher has no initial notification.
        if rt.borrow().page.is_polling() {
            on_scroll(&Rc::downgrade(rt));
        }
    }
    Ok(outcome)
}

/// Handle to an installed reveal controller, for inspection from JS.
#[wasm_bindgen]
pub struct RevealHandle {
    rt: Shared,
}

#[wasm_bindgen]
impl RevealHandle {
    /// Controller snapshot: `{ phase, targets, revealed, pending, groups, init_flag, delays_ms }`.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        let snap = self.rt.borrow().controller.snapshot();
        swb::to_value(&snap).map_err(|e| JsError::new(&format!("snapshot error: {e}")))
    }

    /// Drain the controller event log as an array of `{ kind, ... }` objects.
    pub fn events(&self) -> Result<JsValue, JsError> {
        let events = self.rt.borrow_mut().controller.drain_events();
        swb::to_value(&events).map_err(|e| JsError::new(&format!("events error: {e}")))
    }

    /// Clear the init flag now, as the load fallback would.
    #[wasm_bindgen(js_name = releaseInitFlag)]
    pub fn release_init_flag(&self) {
        finish_load(&Rc::downgrade(&self.rt));
    }
}

/// Install scroll reveal on the current document.
///
/// Pass a config object (see `Config`; all fields optional) or undefined/null
/// for defaults. Setup runs on `DOMContentLoaded`, or immediately when the
/// document has already been parsed, in which case setup errors are thrown.
#[wasm_bindgen]
pub fn install(config: JsValue) -> Result<RevealHandle, JsError> {
    console_error_panic_hook::set_once();

    let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
        Config::default()
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
    };
    cfg.validate().map_err(to_js)?;
    logger::init(&cfg.log_level);

    let rt = build_runtime(cfg)?;
    ACTIVE.with(|a| a.borrow_mut().push(rt.clone()));

    let document = rt.borrow().page.document().clone();
    if document.ready_state() == "loading" {
        let weak = Rc::downgrade(&rt);
        let on_ready = Closure::once_into_js(move || {
            if let Some(rt) = weak.upgrade() {
                if let Err(e) = run(&rt) {
                    error!("reveal setup failed: {e}");
                }
            }
        });
        let opts = AddEventListenerOptions::new();
        opts.set_once(true);
        document
            .add_event_listener_with_callback_and_add_event_listener_options(
                "DOMContentLoaded",
                on_ready.unchecked_ref(),
                &opts,
            )
            .map_err(|e| JsError::new(&format!("DOMContentLoaded: {}", page::js_message(&e))))?;
    } else {
        run(&rt).map_err(to_js)?;
    }

    Ok(RevealHandle { rt })
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}


#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;
    use web_sys::Event;

    wasm_bindgen_test_configure!(run_in_browser);

    async fn sleep(ms: i32) {
        let promise = js_sys::Promise::new(&mut |resolve, _| {
            web_sys::window()
                .unwrap()
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                .unwrap();
        });
        JsFuture::from(promise).await.unwrap();
    }

    fn body_has(class: &str) -> bool {
        let document = web_sys::window().unwrap().document().unwrap();
        document.body().unwrap().class_list().contains(class)
    }

    #[wasm_bindgen_test]
    async fn load_event_arms_delayed_flag_clear() {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        let section = document.create_element("section").unwrap();
        section.set_id("wasm-load-event");
        let card = document.create_element("div").unwrap();
        card.set_class_name("card");
        section.append_child(&card).unwrap();
        document.body().unwrap().append_child(&section).unwrap();

        let cfg = Config {
            selectors: vec!["#wasm-load-event .card".into()],
            classes: scroll_reveal_core::ClassNames {
                init: "wasm-load-event-init".into(),
                ..Default::default()
            },
            ..Config::default()
        };
        let rt = build_runtime(cfg).unwrap();
        {
            let mut guard = rt.borrow_mut();
            let Runtime { controller, page } = &mut *guard;
            controller.start(page).unwrap();
        }
        arm_load_fallback(&rt, 60, false);

        sleep(100).await;
        assert!(body_has("wasm-load-event-init"), "cleared before load fired");

        window
            .dispatch_event(&Event::new("load").unwrap())
            .unwrap();
        assert!(body_has("wasm-load-event-init"));

        sleep(150).await;
        assert!(!body_has("wasm-load-event-init"));
        assert!(!rt.borrow().controller.init_flag());
    }

    #[wasm_bindgen_test]
    fn oversized_timeout_is_rejected() {
        let window = web_sys::window().unwrap();
        assert!(set_timeout(&window, u32::MAX, || {}).is_err());
        assert!(set_timeout(&window, 0, || {}).is_ok());
    }
}
