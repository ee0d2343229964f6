use std::cell::RefCell;
use std::rc::{Rc, Weak};

use deskfolio_core::board::{DraggableItem, IconBoard, MoveOutcome, ReleaseOutcome, TargetAction};
use deskfolio_core::gesture::InputKind;
use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, MouseEvent, TouchEvent, Window};

use crate::dom::{now_ms, set_position, toggle_class, touch_point, viewport};

const DRAGGING_CLASS: &str = "dragging";

pub(crate) type OpenMedia = Box<dyn Fn(u32)>;

/// Renders one page's icons into `#iconsWrapper` and feeds pointer input
/// into its [`IconBoard`].
pub(crate) struct IconView {
    this: Weak<IconView>,
    window: Window,
    document: Document,
    wrapper: Element,
    board: RefCell<IconBoard>,
    nodes: RefCell<Vec<(u32, HtmlElement)>>,
    item_listeners: RefCell<Vec<EventListener>>,
    window_listeners: RefCell<Vec<EventListener>>,
    open_media: OpenMedia,
}

impl IconView {
    pub(crate) fn mount(
        window: Window,
        document: Document,
        wrapper: Element,
        board: IconBoard,
        open_media: OpenMedia,
    ) -> Rc<Self> {
        let view = Rc::new_cyclic(|this| IconView {
            this: this.clone(),
            window,
            document,
            wrapper,
            board: RefCell::new(board),
            nodes: RefCell::new(Vec::new()),
            item_listeners: RefCell::new(Vec::new()),
            window_listeners: RefCell::new(Vec::new()),
            open_media,
        });
        view.attach_window_listeners();
        view.render();
        view
    }

    /// Lays the icons out for the current viewport and rebuilds every node.
    pub(crate) fn render(&self) {
        let (width, height) = viewport(&self.window);
        self.board.borrow_mut().relayout(width, height);

        self.item_listeners.borrow_mut().clear();
        self.nodes.borrow_mut().clear();
        self.wrapper.set_inner_html("");

        let board = self.board.borrow();
        let dragging = board.is_dragging().then(|| board.active_id()).flatten();
        let mut nodes = Vec::with_capacity(board.items().len());
        let mut listeners = Vec::with_capacity(board.items().len() * 2);
        for item in board.items() {
            let node = match self.build_node(item) {
                Ok(node) => node,
                Err(err) => {
                    gloo::console::warn!("icons: skipped item", item.id, err);
                    continue;
                }
            };
            if dragging == Some(item.id) {
                toggle_class(&node, DRAGGING_CLASS, true);
            }
            listeners.extend(self.press_listeners(&node, item.id));
            let _ = self.wrapper.append_child(&node);
            nodes.push((item.id, node));
        }
        drop(board);

        *self.nodes.borrow_mut() = nodes;
        *self.item_listeners.borrow_mut() = listeners;
    }

    fn build_node(&self, item: &DraggableItem) -> Result<HtmlElement, String> {
        let create = |tag: &str, class: &str| -> Result<Element, String> {
            let element = self
                .document
                .create_element(tag)
                .map_err(|err| format!("create {tag}: {err:?}"))?;
            element.set_class_name(class);
            Ok(element)
        };
        let node = create("div", "draggable-icon")?
            .dyn_into::<HtmlElement>()
            .map_err(|_| "icon node is not an HTML element".to_string())?;
        node.set_id(&format!("icon-{}", item.id));
        let _ = node.dataset().set("iconId", &item.id.to_string());

        let content = create("div", "icon-content")?;
        let image_wrapper = create("div", "icon-image-wrapper")?;
        let image = create("img", "icon-image")?;
        let _ = image.set_attribute("src", &item.image);
        let _ = image.set_attribute("alt", &item.title);
        let _ = image.set_attribute("draggable", "false");
        let title = create("span", "icon-title")?;
        title.set_text_content(Some(item.title.as_str()));

        let _ = image_wrapper.append_child(&image);
        let _ = content.append_child(&image_wrapper);
        let _ = content.append_child(&title);
        let _ = node.append_child(&content);
        set_position(&node, item.position);
        Ok(node)
    }

    fn press_listeners(&self, node: &HtmlElement, id: u32) -> [EventListener; 2] {
        let mouse_view = self.this.clone();
        let mouse = EventListener::new_with_options(
            node,
            "mousedown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                if event.button() != 0 {
                    return;
                }
                if let Some(view) = mouse_view.upgrade() {
                    let point = (event.client_x() as f32, event.client_y() as f32);
                    view.press(id, InputKind::Mouse, point, event);
                }
            },
        );
        let touch_view = self.this.clone();
        let touch = EventListener::new_with_options(
            node,
            "touchstart",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<TouchEvent>() else {
                    return;
                };
                let (Some(view), Some(point)) = (touch_view.upgrade(), touch_point(event)) else {
                    return;
                };
                view.press(id, InputKind::Touch, point, event);
            },
        );
        [mouse, touch]
    }

    fn press(&self, id: u32, kind: InputKind, point: (f32, f32), event: &Event) {
        let mut board = self.board.borrow_mut();
        if !board.press(id, kind, point, now_ms()) {
            return;
        }
        if board.policies().for_kind(kind).suppresses_on_press() {
            event.prevent_default();
        }
    }

    fn motion(&self, kind: InputKind, point: (f32, f32), event: &Event) {
        let outcome = {
            let mut board = self.board.borrow_mut();
            let live_kind = board.session().map(|session| session.kind());
            if live_kind != Some(kind) {
                return;
            }
            board.motion(point)
        };
        if outcome.suppress_default() {
            event.prevent_default();
        }
        if let MoveOutcome::Dragged { id, position } = outcome {
            if let Some(node) = self.node(id) {
                toggle_class(&node, DRAGGING_CLASS, true);
                set_position(&node, position);
            }
        }
    }

    fn release(&self, kind: InputKind, event: &Event) {
        let outcome = {
            let mut board = self.board.borrow_mut();
            let live_kind = board.session().map(|session| session.kind());
            if live_kind != Some(kind) {
                return;
            }
            board.release(now_ms())
        };
        if let Some(id) = outcome.item_id() {
            if let Some(node) = self.node(id) {
                toggle_class(&node, DRAGGING_CLASS, false);
            }
        }
        match outcome {
            ReleaseOutcome::Idle => {}
            ReleaseOutcome::Tap { id, action, .. } => {
                // Keeps the browser from replaying the tap as mouse events.
                if kind == InputKind::Touch {
                    event.prevent_default();
                }
                self.fire(id, action);
            }
            ReleaseOutcome::Dropped { id, position, .. } => {
                gloo::console::log!("icons: dropped", id, position.0, position.1);
            }
        }
    }

    fn cancel(&self) {
        let cancelled = self.board.borrow_mut().cancel();
        if let Some(node) = cancelled.and_then(|id| self.node(id)) {
            toggle_class(&node, DRAGGING_CLASS, false);
        }
    }

    fn fire(&self, id: u32, action: TargetAction) {
        match action {
            TargetAction::Navigate(href) => {
                gloo::console::log!("icons: navigate", id, href.clone());
                if let Err(err) = self.window.location().set_href(&href) {
                    gloo::console::error!("icons: navigation failed", err);
                }
            }
            TargetAction::OpenMedia(media_ref) => (self.open_media)(media_ref),
        }
    }

    fn node(&self, id: u32) -> Option<HtmlElement> {
        self.nodes
            .borrow()
            .iter()
            .find(|(node_id, _)| *node_id == id)
            .map(|(_, node)| node.clone())
    }

    fn attach_window_listeners(&self) {
        let options = EventListenerOptions::enable_prevent_default();
        let window = &self.window;
        let mut listeners = Vec::new();

        let view = self.this.clone();
        listeners.push(EventListener::new_with_options(
            window,
            "mousemove",
            options,
            move |event| {
                let (Some(view), Some(mouse)) = (view.upgrade(), event.dyn_ref::<MouseEvent>())
                else {
                    return;
                };
                let point = (mouse.client_x() as f32, mouse.client_y() as f32);
                view.motion(InputKind::Mouse, point, event);
            },
        ));
        let view = self.this.clone();
        listeners.push(EventListener::new_with_options(
            window,
            "touchmove",
            options,
            move |event| {
                let (Some(view), Some(touch)) = (view.upgrade(), event.dyn_ref::<TouchEvent>())
                else {
                    return;
                };
                let Some(point) = touch_point(touch) else {
                    return;
                };
                view.motion(InputKind::Touch, point, event);
            },
        ));
        for (name, kind) in [("mouseup", InputKind::Mouse), ("touchend", InputKind::Touch)] {
            let view = self.this.clone();
            listeners.push(EventListener::new_with_options(
                window,
                name,
                options,
                move |event| {
                    if let Some(view) = view.upgrade() {
                        view.release(kind, event);
                    }
                },
            ));
        }
        for name in ["touchcancel", "blur"] {
            let view = self.this.clone();
            listeners.push(EventListener::new(window, name, move |_| {
                if let Some(view) = view.upgrade() {
                    view.cancel();
                }
            }));
        }
        let view = self.this.clone();
        listeners.push(EventListener::new(window, "resize", move |_| {
            if let Some(view) = view.upgrade() {
                view.render();
            }
        }));

        *self.window_listeners.borrow_mut() = listeners;
    }
}
