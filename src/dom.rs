use js_sys::Date;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, TouchEvent, Window};

pub(crate) fn now_ms() -> f64 {
    Date::now()
}

pub(crate) fn viewport(window: &Window) -> (f32, f32) {
    let read = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0) as f32
    };
    (read(window.inner_width()), read(window.inner_height()))
}

pub(crate) fn toggle_class(element: &Element, class: &str, on: bool) {
    let _ = element.class_list().toggle_with_force(class, on);
}

pub(crate) fn set_position(element: &HtmlElement, (left, top): (f32, f32)) {
    let style = element.style();
    let _ = style.set_property("left", &format!("{left}px"));
    let _ = style.set_property("top", &format!("{top}px"));
}

pub(crate) fn event_target(event: &Event) -> Option<Element> {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
}

/// First active touch, in client coordinates.
pub(crate) fn touch_point(event: &TouchEvent) -> Option<(f32, f32)> {
    let touch = event.touches().get(0)?;
    Some((touch.client_x() as f32, touch.client_y() as f32))
}
