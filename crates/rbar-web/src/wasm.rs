#![forbid(unsafe_code)]

//! `wasm-bindgen` exports wiring resizable bars to the live page.
//!
//! Only compiled on `wasm32` targets.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use js_sys::{Array, Reflect};
use rbar_core::{BarConfig, ControllerDispatch, ListenerCommand, PointerButton};
use rbar_dom::ResizableBar;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, MouseEvent, Node, Window};

use crate::dom::{WebDocument, WebSessionStorage};
use crate::host::{DispatchLog, HostEffects};

type WebBars = ResizableBar<WebDocument, WebSessionStorage>;
type MouseClosure = Closure<dyn FnMut(MouseEvent)>;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn console_warn(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(warn) = Reflect::get(&console, &"warn".into()) else {
        return;
    };
    let Ok(warn_fn) = warn.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = warn_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

/// Callbacks handed to the browser. They hold a weak reference to the host so
/// dropping the handle releases everything.
struct Listeners {
    press: MouseClosure,
    mouse_move: MouseClosure,
    mouse_up: MouseClosure,
    frame: Closure<dyn FnMut(f64)>,
    load: Closure<dyn FnMut(Event)>,
}

impl Listeners {
    fn new(host: &Weak<Host>) -> Self {
        let press = {
            let host = host.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                if let Some(host) = host.upgrade() {
                    host.on_press(&event);
                }
            })
        };
        let mouse_move = {
            let host = host.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                if let Some(host) = host.upgrade() {
                    host.on_mouse_move(&event);
                }
            })
        };
        let mouse_up = {
            let host = host.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
                if let Some(host) = host.upgrade() {
                    host.on_mouse_up();
                }
            })
        };
        let frame = {
            let host = host.clone();
            Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
                if let Some(host) = host.upgrade() {
                    host.on_frame();
                }
            })
        };
        let load = {
            let host = host.clone();
            Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                if let Some(host) = host.upgrade() {
                    host.render();
                }
            })
        };
        Self {
            press,
            mouse_move,
            mouse_up,
            frame,
            load,
        }
    }
}

struct Host {
    window: Window,
    bars: RefCell<WebBars>,
    log: RefCell<DispatchLog>,
    listeners: RefCell<Option<Listeners>>,
    /// Border and button nodes carrying the press listener.
    pressables: RefCell<Vec<Node>>,
    window_listeners_attached: Cell<bool>,
    destroyed: Cell<bool>,
}

impl Host {
    fn with_listeners(&self, f: impl FnOnce(&Listeners)) {
        if let Some(listeners) = self.listeners.borrow().as_ref() {
            f(listeners);
        }
    }

    /// Render newly marked bars and hook their controls.
    fn render(&self) -> Vec<String> {
        if self.destroyed.get() {
            return Vec::new();
        }
        let discovered = self.bars.borrow_mut().render();
        let bars = self.bars.borrow();
        self.with_listeners(|listeners| {
            let callback: &js_sys::Function = listeners.press.as_ref().unchecked_ref();
            let mut pressables = self.pressables.borrow_mut();
            for id in &discovered {
                let Some(controls) = bars.renderer().controls(id.as_str()) else {
                    continue;
                };
                for node in [&controls.border, &controls.button] {
                    match node.add_event_listener_with_callback("mousedown", callback) {
                        Ok(()) => pressables.push(node.clone()),
                        Err(err) => {
                            console_warn(&format!(
                                "resizable bar {id}: press listener not attached: {err:?}"
                            ));
                        }
                    }
                }
            }
        });
        discovered.iter().map(|id| id.as_str().to_owned()).collect()
    }

    fn on_press(&self, event: &MouseEvent) {
        if self.destroyed.get() {
            return;
        }
        let Some(target) = event
            .current_target()
            .and_then(|target| target.dyn_into::<Node>().ok())
        else {
            return;
        };
        let button = PointerButton::from_dom(event.button());
        let dispatch = self
            .bars
            .borrow_mut()
            .press(&target, button, event.page_x());
        if let Some(dispatch) = dispatch {
            self.apply(&dispatch, Some(event));
        }
    }

    fn on_mouse_move(&self, event: &MouseEvent) {
        if self.destroyed.get() {
            return;
        }
        let dispatch = self.bars.borrow_mut().pointer_move(event.page_x());
        self.apply(&dispatch, Some(event));
    }

    fn on_frame(&self) {
        if self.destroyed.get() {
            return;
        }
        let dispatch = self.bars.borrow_mut().animation_frame();
        self.apply(&dispatch, None);
    }

    fn on_mouse_up(&self) {
        if self.destroyed.get() {
            return;
        }
        let dispatch = self.bars.borrow_mut().release();
        self.apply(&dispatch, None);
    }

    fn apply(&self, dispatch: &ControllerDispatch, event: Option<&MouseEvent>) {
        self.log.borrow_mut().push(dispatch);
        let effects = HostEffects::of(dispatch);
        if effects.prevent_default {
            if let Some(event) = event {
                event.prevent_default();
            }
        }
        match effects.listeners {
            Some(ListenerCommand::Attach) => self.attach_window_listeners(),
            Some(ListenerCommand::Detach) => self.detach_window_listeners(),
            None => {}
        }
        if effects.request_frame {
            self.with_listeners(|listeners| {
                if let Err(err) = self
                    .window
                    .request_animation_frame(listeners.frame.as_ref().unchecked_ref())
                {
                    console_warn(&format!("resizable bar: animation frame not requested: {err:?}"));
                }
            });
        }
    }

    fn attach_window_listeners(&self) {
        if self.window_listeners_attached.replace(true) {
            return;
        }
        self.with_listeners(|listeners| {
            let _ = self.window.add_event_listener_with_callback(
                "mousemove",
                listeners.mouse_move.as_ref().unchecked_ref(),
            );
            let _ = self.window.add_event_listener_with_callback(
                "mouseup",
                listeners.mouse_up.as_ref().unchecked_ref(),
            );
        });
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        let dispatch = self.bars.borrow_mut().release();
        self.log.borrow_mut().push(&dispatch);
        self.detach_window_listeners();
        self.with_listeners(|listeners| {
            let press: &js_sys::Function = listeners.press.as_ref().unchecked_ref();
            for node in self.pressables.borrow_mut().drain(..) {
                let _ = node.remove_event_listener_with_callback("mousedown", press);
            }
            let _ = self
                .window
                .remove_event_listener_with_callback("load", listeners.load.as_ref().unchecked_ref());
        });
    }

    fn detach_window_listeners(&self) {
        if !self.window_listeners_attached.replace(false) {
            return;
        }
        self.with_listeners(|listeners| {
            let _ = self.window.remove_event_listener_with_callback(
                "mousemove",
                listeners.mouse_move.as_ref().unchecked_ref(),
            );
            let _ = self.window.remove_event_listener_with_callback(
                "mouseup",
                listeners.mouse_up.as_ref().unchecked_ref(),
            );
        });
    }
}

/// Handle returned to JavaScript. Keep it alive for as long as the bars are
/// interactive.
#[wasm_bindgen]
pub struct ResizableBarHandle {
    host: Rc<Host>,
}

#[wasm_bindgen]
impl ResizableBarHandle {
    /// Render bars added to the document since the last render. Returns their ids.
    #[wasm_bindgen]
    pub fn render(&self) -> Array {
        self.host
            .render()
            .into_iter()
            .map(JsValue::from)
            .collect()
    }

    /// Re-synchronize one bar's attributes from its current record.
    #[wasm_bindgen(js_name = updateBar)]
    pub fn update_bar(&self, id: &str) {
        self.host.bars.borrow_mut().update_bar(id);
    }

    /// Drain formatted dispatch log lines.
    #[wasm_bindgen(js_name = takeLogs)]
    pub fn take_logs(&self) -> Array {
        self.host
            .log
            .borrow_mut()
            .take()
            .into_iter()
            .map(JsValue::from)
            .collect()
    }

    /// Abort any drag and unhook every listener. The bars stay rendered but no
    /// longer react to input.
    pub fn destroy(&self) {
        self.host.destroy();
    }

    /// Whether [`Self::destroy`] has run.
    #[wasm_bindgen(getter)]
    pub fn destroyed(&self) -> bool {
        self.host.destroyed.get()
    }
}

/// Install resizable bars on the current page.
///
/// `options` is an optional JSON object with camelCase configuration keys.
/// Pre-hydration styles are inserted immediately; bars render on `load`, or
/// right away when the page has already loaded.
#[wasm_bindgen(js_name = installResizableBar)]
pub fn install_resizable_bar(options: Option<String>) -> Result<ResizableBarHandle, JsValue> {
    install_panic_hook();

    let config = BarConfig::from_json(options.as_deref().unwrap_or_default())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let ready = document.ready_state() == "complete";

    let storage = WebSessionStorage::from_window(&window);
    let bars = ResizableBar::new(config, WebDocument::new(document), storage)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let host = Rc::new(Host {
        window,
        bars: RefCell::new(bars),
        log: RefCell::new(DispatchLog::default()),
        listeners: RefCell::new(None),
        pressables: RefCell::new(Vec::new()),
        window_listeners_attached: Cell::new(false),
        destroyed: Cell::new(false),
    });
    *host.listeners.borrow_mut() = Some(Listeners::new(&Rc::downgrade(&host)));

    host.bars.borrow_mut().init();
    if ready {
        host.render();
    } else {
        host.with_listeners(|listeners| {
            if let Err(err) = host
                .window
                .add_event_listener_with_callback("load", listeners.load.as_ref().unchecked_ref())
            {
                console_error(&format!("resizable bar: load listener not attached: {err:?}"));
            }
        });
    }
    Ok(ResizableBarHandle { host })
}
