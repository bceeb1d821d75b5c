//! Browser host: runs [`PageBehaviors`] against the live document.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Array, Function, Reflect};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, Window};

use super::*;

thread_local! {
    static SESSION: RefCell<Option<Rc<RefCell<WebSession>>>> = const { RefCell::new(None) };
}

fn js_error(context: &str, err: JsValue) -> Error {
    let detail = err.as_string().unwrap_or_else(|| format!("{err:?}"));
    Error::Host(format!("{context}: {detail}"))
}

struct TimerSlot {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

struct ListenerSlot {
    target: EventTarget,
    kind: EventKind,
    callback: Closure<dyn FnMut(Event)>,
}

/// [`PageHost`] over `window` and `document`.
///
/// Callbacks hold a weak handle to the owning [`WebSession`] and route back
/// into it when they fire.
pub struct WebPage {
    window: Window,
    document: Document,
    session: Weak<RefCell<WebSession>>,
    timers: HashMap<TimerId, TimerSlot>,
    listeners: HashMap<SubscriptionId, ListenerSlot>,
    // Closures that may still be on the JS stack; dropped on the next registration.
    retired: Vec<Box<dyn std::any::Any>>,
    next_timer_id: i64,
    next_subscription_id: u64,
}

impl WebPage {
    fn new(window: Window, document: Document, session: Weak<RefCell<WebSession>>) -> Self {
        Self {
            window,
            document,
            session,
            timers: HashMap::new(),
            listeners: HashMap::new(),
            retired: Vec::new(),
            next_timer_id: 1,
            next_subscription_id: 1,
        }
    }

    fn retire_timer(&mut self, timer: TimerId) {
        if let Some(slot) = self.timers.remove(&timer) {
            self.retired.push(Box::new(slot));
        }
    }

    fn rich_dismiss_constructor(&self) -> Option<Function> {
        let bootstrap = Reflect::get(&self.window, &JsValue::from_str("bootstrap")).ok()?;
        if bootstrap.is_undefined() || bootstrap.is_null() {
            return None;
        }
        Reflect::get(&bootstrap, &JsValue::from_str("Alert"))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }
}

impl PageHost for WebPage {
    type Node = Element;

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(|err| js_error("querySelectorAll", err))?;
        Ok((0..list.length())
            .filter_map(|idx| list.item(idx))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn matches_selector(&self, node: &Element, selector: &str) -> Result<bool> {
        node.matches(selector).map_err(|err| js_error("matches", err))
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn class_contains(&self, node: &Element, class_name: &str) -> bool {
        node.class_list().contains(class_name)
    }

    fn class_add(&mut self, node: &Element, class_name: &str) -> Result<()> {
        node.class_list()
            .add_1(class_name)
            .map_err(|err| js_error("classList.add", err))
    }

    fn class_remove(&mut self, node: &Element, class_name: &str) -> Result<()> {
        node.class_list()
            .remove_1(class_name)
            .map_err(|err| js_error("classList.remove", err))
    }

    fn inner_width(&self) -> i64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .map_or(0, |width| width as i64)
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }

    fn has_rich_dismiss(&self) -> bool {
        self.rich_dismiss_constructor().is_some()
    }

    fn rich_dismiss(&mut self, node: &Element) -> std::result::Result<(), DismissError> {
        let describe = |err: JsValue| DismissError(err.as_string().unwrap_or_else(|| format!("{err:?}")));
        let constructor = self
            .rich_dismiss_constructor()
            .ok_or_else(|| DismissError("window.bootstrap.Alert is not available".into()))?;
        let instance = Reflect::construct(&constructor, &Array::of1(node)).map_err(|err| {
            warn!(error = ?err, "bootstrap.Alert constructor threw");
            describe(err)
        })?;
        let close = Reflect::get(&instance, &JsValue::from_str("close"))
            .map_err(describe)?
            .dyn_into::<Function>()
            .map_err(|_| DismissError("alert instance has no close()".into()))?;
        close.call0(&instance).map(|_| ()).map_err(describe)
    }

    fn set_timeout(&mut self, delay_ms: i64, task: PageTask<Element>) -> Result<TimerId> {
        self.retired.clear();
        let id = TimerId(self.next_timer_id);
        self.next_timer_id += 1;

        let session = self.session.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            WebSession::fire_timer(&session, id, task.clone());
        });
        let delay = i32::try_from(delay_ms.max(0)).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay,
            )
            .map_err(|err| js_error("setTimeout", err))?;
        self.timers.insert(
            id,
            TimerSlot {
                handle,
                _callback: callback,
            },
        );
        Ok(id)
    }

    fn clear_timeout(&mut self, timer: TimerId) -> bool {
        let Some(slot) = self.timers.remove(&timer) else {
            return false;
        };
        self.window.clear_timeout_with_handle(slot.handle);
        self.retired.push(Box::new(slot));
        true
    }

    fn subscribe(&mut self, target: ListenTarget<Element>, kind: EventKind) -> Result<SubscriptionId> {
        self.retired.clear();
        let target: EventTarget = match target {
            ListenTarget::Window => self.window.clone().into(),
            ListenTarget::Document => self.document.clone().into(),
            ListenTarget::Element(element) => element.into(),
        };
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;

        let session = self.session.clone();
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            WebSession::deliver_event(&session, id, kind, &event);
        });
        target
            .add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref())
            .map_err(|err| js_error("addEventListener", err))?;
        self.listeners.insert(
            id,
            ListenerSlot {
                target,
                kind,
                callback,
            },
        );
        Ok(id)
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        let Some(slot) = self.listeners.remove(&subscription) else {
            return false;
        };
        let _ = slot.target.remove_event_listener_with_callback(
            slot.kind.as_str(),
            slot.callback.as_ref().unchecked_ref(),
        );
        self.retired.push(Box::new(slot));
        true
    }
}

impl Drop for WebPage {
    fn drop(&mut self) {
        for (_, slot) in self.timers.drain() {
            self.window.clear_timeout_with_handle(slot.handle);
        }
        for (_, slot) in self.listeners.drain() {
            let _ = slot.target.remove_event_listener_with_callback(
                slot.kind.as_str(),
                slot.callback.as_ref().unchecked_ref(),
            );
        }
    }
}

/// The live page together with the behaviors installed on it.
pub struct WebSession {
    page: WebPage,
    behaviors: Option<PageBehaviors<Element>>,
}

impl WebSession {
    pub fn install(config: &BehaviorConfig) -> Result<Rc<RefCell<Self>>> {
        let window = web_sys::window().ok_or_else(|| Error::Host("no global window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| Error::Host("window has no document".into()))?;

        let session = Rc::new_cyclic(|weak| {
            RefCell::new(Self {
                page: WebPage::new(window, document, weak.clone()),
                behaviors: None,
            })
        });
        {
            let mut guard = session.borrow_mut();
            let Self { page, behaviors } = &mut *guard;
            *behaviors = Some(PageBehaviors::install(page, config)?);
        }
        Ok(session)
    }

    pub fn teardown(&mut self) -> usize {
        let Self { page, behaviors } = self;
        behaviors
            .take()
            .map_or(0, |mut behaviors| behaviors.teardown(page))
    }

    fn fire_timer(session: &Weak<RefCell<Self>>, timer: TimerId, task: PageTask<Element>) {
        let Some(session) = session.upgrade() else {
            return;
        };
        let Ok(mut guard) = session.try_borrow_mut() else {
            warn!(timer = timer.0, "timer fired while the page session was busy");
            return;
        };
        let Self { page, behaviors } = &mut *guard;
        page.retire_timer(timer);
        if let Some(behaviors) = behaviors.as_mut() {
            if let Err(err) = behaviors.run_task(page, timer, task) {
                warn!(%err, timer = timer.0, "page task failed");
            }
        }
    }

    fn deliver_event(
        session: &Weak<RefCell<Self>>,
        subscription: SubscriptionId,
        kind: EventKind,
        event: &Event,
    ) {
        let Some(session) = session.upgrade() else {
            return;
        };
        let Ok(mut guard) = session.try_borrow_mut() else {
            warn!(event = kind.as_str(), "event delivered while the page session was busy");
            return;
        };
        let Self { page, behaviors } = &mut *guard;
        let Some(behaviors) = behaviors.as_mut() else {
            return;
        };

        let mut page_event = match kind {
            EventKind::Click => {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                    return;
                };
                PageEvent::Click(ClickEvent::new(target))
            }
            EventKind::Resize => PageEvent::Resize,
        };
        if let Err(err) = behaviors.dispatch(page, subscription, &mut page_event) {
            warn!(%err, event = kind.as_str(), "event handler failed");
        }
        if let PageEvent::Click(click) = &page_event {
            if click.default_prevented() {
                event.prevent_default();
            }
            if click.propagation_stopped() {
                event.stop_propagation();
            }
        }
    }
}

fn install_default() -> std::result::Result<(), JsValue> {
    let session = WebSession::install(&BehaviorConfig::default())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    SESSION.with(|slot| *slot.borrow_mut() = Some(session));
    Ok(())
}

/// Installs the behaviors once the document has been parsed.
#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("window has no document"))?;
    if document.ready_state() != "loading" {
        return install_default();
    }

    let on_ready = Closure::once_into_js(move || {
        if let Err(err) = install_default() {
            warn!(error = ?err, "page behaviors failed to install");
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
}

/// Removes every listener and pending timer installed by [`start`].
#[wasm_bindgen(js_name = teardownPageBehaviors)]
pub fn teardown() -> usize {
    SESSION.with(|slot| {
        slot.borrow_mut()
            .take()
            .map_or(0, |session| session.borrow_mut().teardown())
    })
}
