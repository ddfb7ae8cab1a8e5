use std::cell::RefCell;
use std::rc::{Rc, Weak};

use beadring_core::{
    BeadCatalogEntry, CatalogItem, CatalogMap, DesignerAction, DesignerRules, LongPressScheduler,
    Point, TimerTicket, ViewportProvider, ViewportSize, BEAD_CATALOG,
};
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::{Element, PointerEvent};

use crate::app_core::{AppCore, AppSubscription};
use crate::input::{
    client_to_viewport, ClientRect, InputEvent, InputEventKind, PointerId, PointerKind,
};

type TicketSink = Rc<RefCell<Option<Weak<AppCore<GlooScheduler>>>>>;

/// Long-press timers backed by `setTimeout`. Dropping the returned
/// `Timeout` clears it.
#[derive(Clone)]
pub struct GlooScheduler {
    sink: TicketSink,
}

impl LongPressScheduler for GlooScheduler {
    type Handle = Timeout;

    fn schedule(&mut self, ticket: TimerTicket, delay_ms: u32) -> Timeout {
        let sink = Rc::clone(&self.sink);
        Timeout::new(delay_ms, move || {
            let core = sink.borrow().as_ref().and_then(Weak::upgrade);
            if let Some(core) = core {
                core.long_press(ticket);
            }
        })
    }
}

fn host_rect(host: &Element) -> ClientRect {
    let rect = host.get_bounding_client_rect();
    ClientRect {
        left: rect.left() as f32,
        top: rect.top() as f32,
        width: rect.width() as f32,
        height: rect.height() as f32,
    }
}

fn window_size() -> ViewportSize {
    let Some(window) = web_sys::window() else {
        return ViewportSize::default();
    };
    let width = window.inner_width().ok().and_then(|value| value.as_f64());
    let height = window.inner_height().ok().and_then(|value| value.as_f64());
    ViewportSize::new(width.unwrap_or(0.0) as f32, height.unwrap_or(0.0) as f32)
}

/// The designer's viewport is the host element's box, so pointer
/// coordinates and the delete zone share one space. Falls back to the window
/// while the host has not been laid out.
#[derive(Clone, Debug)]
pub struct HostViewport {
    host: Element,
}

impl HostViewport {
    pub fn new(host: Element) -> Self {
        Self { host }
    }
}

impl ViewportProvider for HostViewport {
    fn viewport_size(&self) -> ViewportSize {
        let rect = host_rect(&self.host);
        if rect.is_empty() {
            return window_size();
        }
        ViewportSize::new(rect.width, rect.height)
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// The designer as seen from the page script.
#[wasm_bindgen]
pub struct DesignerHandle {
    core: Rc<AppCore<GlooScheduler>>,
    host: Element,
    _resize: EventListener,
    subscription: Option<AppSubscription>,
}

#[wasm_bindgen]
impl DesignerHandle {
    /// `catalog_json` is an array of catalog items; the built-in catalog is
    /// used when absent. `rules_toml` overrides the default rules.
    #[wasm_bindgen(constructor)]
    pub fn new(
        host: Element,
        catalog_json: Option<String>,
        rules_toml: Option<String>,
    ) -> Result<DesignerHandle, JsValue> {
        let catalog: CatalogMap = match catalog_json {
            Some(json) => serde_json::from_str::<Vec<CatalogItem>>(&json)
                .map_err(to_js)?
                .into_iter()
                .collect(),
            None => BEAD_CATALOG.iter().map(BeadCatalogEntry::to_item).collect(),
        };
        let rules = match rules_toml {
            Some(text) => DesignerRules::from_toml_str(&text).map_err(to_js)?,
            None => DesignerRules::default(),
        };
        let sink: TicketSink = Rc::new(RefCell::new(None));
        let scheduler = GlooScheduler {
            sink: Rc::clone(&sink),
        };
        let viewport = HostViewport::new(host.clone());
        let core = AppCore::new(catalog, rules, scheduler, &viewport);
        *sink.borrow_mut() = Some(Rc::downgrade(&core));

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let resize = {
            let core = Rc::downgrade(&core);
            let viewport = viewport.clone();
            EventListener::new(&window, "resize", move |_| {
                if let Some(core) = core.upgrade() {
                    core.set_viewport(viewport.viewport_size());
                }
            })
        };
        gloo::console::log!("beadring: designer ready");
        Ok(DesignerHandle {
            core,
            host,
            _resize: resize,
            subscription: None,
        })
    }

    /// Registers the page's re-render callback. Replaces any earlier one.
    pub fn on_change(&mut self, callback: Function) {
        self.subscription = None;
        let subscription = self.core.subscribe(Rc::new(move || {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                gloo::console::warn!("beadring: change listener failed", err);
            }
        }));
        self.subscription = Some(subscription);
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.core.snapshot()).map_err(to_js)
    }

    /// Returns the projected fit as JSON, or throws the decline message.
    pub fn append(&self, catalog_id: &str) -> Result<String, JsValue> {
        let status = self.core.append(catalog_id).map_err(to_js)?;
        serde_json::to_string(&status).map_err(to_js)
    }

    pub fn dispatch(&self, action_json: &str) -> Result<(), JsValue> {
        let action: DesignerAction = serde_json::from_str(action_json).map_err(to_js)?;
        self.core.apply_action(action);
        Ok(())
    }

    pub fn pointer_down(&self, event: &PointerEvent) {
        self.route(event, InputEventKind::Down);
    }

    pub fn pointer_move(&self, event: &PointerEvent) {
        self.route(event, InputEventKind::Move);
    }

    pub fn pointer_up(&self, event: &PointerEvent) {
        self.route(event, InputEventKind::Up);
    }

    pub fn pointer_cancel(&self, event: &PointerEvent) {
        self.route(event, InputEventKind::Cancel);
    }

    /// Re-reads the host box, e.g. after the page changes its layout
    /// without a window resize.
    pub fn refresh_viewport(&self) {
        self.core.set_viewport(HostViewport::new(self.host.clone()).viewport_size());
    }

    /// Top edge of the rendered delete panel, relative to the host element.
    pub fn set_delete_panel_top(&self, top_y: Option<f32>) {
        self.core.set_delete_panel_top(top_y);
    }

    pub fn remove_selected(&self) -> bool {
        self.core.remove_selected()
    }

    pub fn clear(&self) {
        self.core.clear();
    }

    pub fn set_gap_mm(&self, gap_mm: f32) {
        self.core.set_gap_mm(gap_mm);
    }

    pub fn set_wrist_size_cm(&self, wrist_size_cm: f32) {
        self.core.set_wrist_size_cm(wrist_size_cm);
    }

    pub fn dismiss_toast(&self) {
        self.core.dismiss_toast();
    }
}

impl DesignerHandle {
    fn route(&self, event: &PointerEvent, kind: InputEventKind) {
        let client = Point::new(event.client_x() as f32, event.client_y() as f32);
        let Some(point) = client_to_viewport(client, host_rect(&self.host)) else {
            return;
        };
        self.core.handle_input(InputEvent {
            kind,
            pointer_id: PointerId(event.pointer_id()),
            pointer_kind: PointerKind::from_pointer_type(&event.pointer_type()),
            is_primary: event.is_primary(),
            view_x: point.x,
            view_y: point.y,
            time_ms: event.time_stamp() as f32,
        });
    }
}

impl Drop for DesignerHandle {
    fn drop(&mut self) {
        self.subscription = None;
        self.core.teardown();
    }
}
