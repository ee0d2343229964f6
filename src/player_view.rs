use std::cell::RefCell;
use std::rc::{Rc, Weak};

use deskfolio_core::player::{
    MediaEntry, OpenOutcome, Player, PlayerEvent, RestoreSkip, ViewMode, PERSIST_INTERVAL_MS,
};
use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Interval;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};

use crate::dom::{event_target, set_position, toggle_class, touch_point};
use crate::media::{MediaSignal, SignalSink, WebMedia};
use crate::storage::LocalStorage;

const GLYPH_EXPAND: &str = "\u{26f6}";
const GLYPH_RESTORE: &str = "\u{2750}";

struct Chrome {
    overlay: HtmlElement,
    player: HtmlElement,
    title: Element,
    content: Element,
    header: Option<Element>,
    minimize_btn: Option<Element>,
    expand_btn: Option<Element>,
    close_btn: Option<Element>,
}

impl Chrome {
    fn find(document: &Document) -> Result<Self, String> {
        let by_id = |id: &str| document.get_element_by_id(id);
        let html = |id: &str| -> Result<HtmlElement, String> {
            by_id(id)
                .and_then(|element| element.dyn_into::<HtmlElement>().ok())
                .ok_or_else(|| format!("missing #{id}"))
        };
        Ok(Self {
            overlay: html("modalOverlay")?,
            player: html("modalPlayer")?,
            title: by_id("modalTitle").ok_or("missing #modalTitle")?,
            content: by_id("modalContent").ok_or("missing #modalContent")?,
            header: document.query_selector(".modal-header").ok().flatten(),
            minimize_btn: by_id("minimizeBtn"),
            expand_btn: by_id("expandBtn"),
            close_btn: by_id("closeBtn"),
        })
    }

    fn rendered_origin(&self) -> (f32, f32) {
        let rect = self.player.get_bounding_client_rect();
        (rect.left() as f32, rect.top() as f32)
    }
}

/// The page's modal player: DOM chrome bound to one [`Player`].
pub(crate) struct PlayerView {
    player: RefCell<Player<WebMedia, LocalStorage>>,
    chrome: Chrome,
    listeners: RefCell<Vec<EventListener>>,
    interval: RefCell<Option<Interval>>,
}

impl PlayerView {
    pub(crate) fn mount(
        document: &Document,
        page_key: &str,
        library: Vec<MediaEntry>,
    ) -> Result<Rc<Self>, String> {
        let chrome = Chrome::find(document)?;
        let view = Rc::new_cyclic(|weak: &Weak<PlayerView>| {
            let signal_view = weak.clone();
            let sink: SignalSink = Rc::new(move |signal| {
                if let Some(view) = signal_view.upgrade() {
                    view.on_media_signal(signal);
                }
            });
            let backend = WebMedia::new(document.clone(), chrome.content.clone(), sink);
            PlayerView {
                player: RefCell::new(Player::new(page_key, library, backend, LocalStorage)),
                chrome,
                listeners: RefCell::new(Vec::new()),
                interval: RefCell::new(None),
            }
        });
        view.attach_listeners(document);

        let tick_view = Rc::downgrade(&view);
        let interval = Interval::new(PERSIST_INTERVAL_MS, move || {
            if let Some(view) = tick_view.upgrade() {
                view.player.borrow_mut().tick();
                view.report();
            }
        });
        *view.interval.borrow_mut() = Some(interval);

        let restored = view.player.borrow_mut().restore();
        if restored.is_none() {
            gloo::console::log!("player: cold start");
        }
        view.render();
        Ok(view)
    }

    pub(crate) fn open_media(&self, media_ref: u32) {
        let result = self.player.borrow_mut().open(media_ref);
        match result {
            Ok(OpenOutcome::AlreadyOpen) => return,
            Ok(_) => {}
            Err(err) => gloo::console::warn!("player: open rejected", err.to_string()),
        }
        self.render();
    }

    pub(crate) fn close(&self) {
        self.player.borrow_mut().close();
        self.render();
    }

    fn toggle_minimize(&self) {
        self.player.borrow_mut().toggle_minimize();
        self.render();
    }

    fn toggle_fullscreen(&self) {
        self.player.borrow_mut().toggle_fullscreen();
        self.render();
    }

    fn on_media_signal(&self, signal: MediaSignal) {
        let handled = {
            let mut player = self.player.borrow_mut();
            match signal {
                MediaSignal::Autoplay { generation, played } => {
                    player.autoplay_settled(generation, played)
                }
                MediaSignal::Failed {
                    generation,
                    message,
                } => player.media_failed(generation, &message),
            }
        };
        if handled {
            self.render();
        }
    }

    fn begin_reposition(&self, point: (f32, f32), target: Option<Element>) -> bool {
        let on_button = target
            .and_then(|element| element.closest(".modal-btn").ok().flatten())
            .is_some();
        if on_button {
            return false;
        }
        let origin = self.chrome.rendered_origin();
        let started = self.player.borrow_mut().begin_reposition(point, origin);
        if started {
            self.render();
        }
        started
    }

    fn reposition(&self, point: (f32, f32)) -> bool {
        let moved = self.player.borrow_mut().reposition(point);
        if moved.is_some() {
            self.apply_position();
        }
        moved.is_some()
    }

    fn end_reposition(&self) {
        if !self.player.borrow().is_repositioning() {
            return;
        }
        let origin = self.chrome.rendered_origin();
        self.player.borrow_mut().end_reposition(Some(origin));
        self.apply_position();
    }

    fn flush(&self) {
        self.player.borrow_mut().flush();
        self.report();
    }

    fn render(&self) {
        self.report();
        let player = self.player.borrow();
        let state = player.state();
        let chrome = &self.chrome;
        toggle_class(&chrome.overlay, "active", state.is_open());
        toggle_class(&chrome.player, "minimized", state.is_minimized());
        toggle_class(&chrome.player, "fullscreen", state.is_fullscreen());
        if let Some(button) = chrome.expand_btn.as_ref() {
            let glyph = match state.view_mode {
                ViewMode::Fullscreen => GLYPH_RESTORE,
                ViewMode::Normal | ViewMode::Minimized => GLYPH_EXPAND,
            };
            button.set_text_content(Some(glyph));
        }
        match state.active.as_ref() {
            Some(active) => {
                chrome.title.set_text_content(Some(active.title.as_str()));
                self.render_notice(active.notice.as_deref());
            }
            None => {
                chrome.title.set_text_content(Some(""));
                self.render_notice(None);
            }
        }
        drop(player);
        self.apply_position();
    }

    fn render_notice(&self, notice: Option<&str>) {
        let existing = self.chrome.content.query_selector(".media-notice").ok().flatten();
        match (notice, existing) {
            (Some(text), Some(element)) => element.set_text_content(Some(text)),
            (Some(text), None) => {
                let Some(document) = self.chrome.content.owner_document() else {
                    return;
                };
                let Ok(element) = document.create_element("div") else {
                    return;
                };
                element.set_class_name("media-notice");
                let _ = element.set_attribute("role", "alert");
                element.set_text_content(Some(text));
                let _ = self.chrome.content.append_child(&element);
            }
            (None, Some(element)) => element.remove(),
            (None, None) => {}
        }
    }

    fn apply_position(&self) {
        let position = self.player.borrow().effective_chrome_position();
        let style = self.chrome.player.style();
        match position {
            Some(position) => {
                let _ = style.set_property("position", "fixed");
                let _ = style.set_property("transform", "none");
                set_position(&self.chrome.player, position);
            }
            None => {
                for property in ["position", "left", "top", "transform"] {
                    let _ = style.remove_property(property);
                }
            }
        }
    }

    fn report(&self) {
        let events = self.player.borrow_mut().drain_events();
        for event in events {
            match event {
                PlayerEvent::Opened {
                    media_ref,
                    generation,
                } => gloo::console::log!("player: opened", media_ref, generation as f64),
                PlayerEvent::Switched { from, to } => {
                    gloo::console::log!("player: switched", from, to)
                }
                PlayerEvent::Closed { media_ref } => {
                    gloo::console::log!("player: closed", media_ref)
                }
                PlayerEvent::Restored {
                    media_ref,
                    position_seconds,
                } => gloo::console::log!("player: restore applied", media_ref, position_seconds),
                PlayerEvent::RestoreSkipped(reason) => {
                    let reason = match reason {
                        RestoreSkip::Unreadable(err) => format!("storage: {err}"),
                        RestoreSkip::Malformed(err) => format!("malformed record: {err}"),
                        RestoreSkip::OtherPage(page) => format!("record belongs to {page}"),
                        RestoreSkip::UnknownMedia(media_ref) => format!("unknown media {media_ref}"),
                        RestoreSkip::KindMismatch(media_ref) => {
                            format!("media kind changed for {media_ref}")
                        }
                    };
                    gloo::console::log!("player: restore skipped", reason)
                }
                PlayerEvent::AutoplayBlocked { media_ref } => {
                    gloo::console::log!("player: autoplay prevented", media_ref)
                }
                PlayerEvent::MediaFailed { media_ref, message } => {
                    gloo::console::error!("player: media failed", media_ref, message)
                }
                PlayerEvent::PersistFailed { reason } => {
                    gloo::console::warn!("player: persist failed", reason)
                }
            }
        }
    }

    fn attach_listeners(self: &Rc<Self>, document: &Document) {
        let mut listeners = Vec::new();
        let Some(window) = web_sys::window() else {
            return;
        };
        let active = EventListenerOptions::enable_prevent_default();

        let buttons: [(Option<&Element>, fn(&PlayerView)); 3] = [
            (self.chrome.minimize_btn.as_ref(), PlayerView::toggle_minimize),
            (self.chrome.expand_btn.as_ref(), PlayerView::toggle_fullscreen),
            (self.chrome.close_btn.as_ref(), PlayerView::close),
        ];
        for (button, action) in buttons {
            let Some(button) = button else {
                continue;
            };
            let click_view = Rc::downgrade(self);
            listeners.push(EventListener::new(button, "click", move |event| {
                event.stop_propagation();
                if let Some(view) = click_view.upgrade() {
                    action(&view);
                }
            }));
            let touch_view = Rc::downgrade(self);
            listeners.push(EventListener::new_with_options(
                button,
                "touchend",
                active,
                move |event| {
                    event.prevent_default();
                    event.stop_propagation();
                    if let Some(view) = touch_view.upgrade() {
                        action(&view);
                    }
                },
            ));
        }

        let overlay_view = Rc::downgrade(self);
        listeners.push(EventListener::new(
            &self.chrome.overlay,
            "click",
            move |event: &Event| {
                let Some(view) = overlay_view.upgrade() else {
                    return;
                };
                let on_overlay = event
                    .target()
                    .and_then(|target| target.dyn_into::<Element>().ok())
                    .map(|target| target.is_same_node(Some(view.chrome.overlay.as_ref())))
                    .unwrap_or(false);
                if on_overlay {
                    view.close();
                }
            },
        ));

        let key_view = Rc::downgrade(self);
        listeners.push(EventListener::new(document, "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if event.key() != "Escape" {
                return;
            }
            if let Some(view) = key_view.upgrade() {
                if view.player.borrow().state().is_open() {
                    view.close();
                }
            }
        }));

        if let Some(header) = self.chrome.header.as_ref() {
            let mouse_view = Rc::downgrade(self);
            listeners.push(EventListener::new_with_options(
                header,
                "mousedown",
                active,
                move |event| {
                    let Some(event) = event.dyn_ref::<MouseEvent>() else {
                        return;
                    };
                    let Some(view) = mouse_view.upgrade() else {
                        return;
                    };
                    let point = (event.client_x() as f32, event.client_y() as f32);
                    if view.begin_reposition(point, event_target(event)) {
                        event.prevent_default();
                    }
                },
            ));
            let touch_view = Rc::downgrade(self);
            listeners.push(EventListener::new_with_options(
                header,
                "touchstart",
                active,
                move |event| {
                    let Some(event) = event.dyn_ref::<TouchEvent>() else {
                        return;
                    };
                    let Some(view) = touch_view.upgrade() else {
                        return;
                    };
                    let Some(point) = touch_point(event) else {
                        return;
                    };
                    if view.begin_reposition(point, event_target(event)) {
                        event.prevent_default();
                    }
                },
            ));
        }

        let move_view = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &window,
            "mousemove",
            active,
            move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                if let Some(view) = move_view.upgrade() {
                    view.reposition((event.client_x() as f32, event.client_y() as f32));
                }
            },
        ));
        let touch_move_view = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &window,
            "touchmove",
            active,
            move |event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                let (Some(view), Some(point)) = (touch_move_view.upgrade(), touch_point(event)) else {
                    return;
                };
                if view.reposition(point) {
                    event.prevent_default();
                }
            },
        ));
        for name in ["mouseup", "touchend", "touchcancel"] {
            let up_view = Rc::downgrade(self);
            listeners.push(EventListener::new(&window, name, move |_| {
                if let Some(view) = up_view.upgrade() {
                    view.end_reposition();
                }
            }));
        }

        let unload_view = Rc::downgrade(self);
        listeners.push(EventListener::new(&window, "beforeunload", move |_| {
            if let Some(view) = unload_view.upgrade() {
                view.flush();
            }
        }));

        *self.listeners.borrow_mut() = listeners;
    }
}
