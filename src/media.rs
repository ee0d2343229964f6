use std::rc::Rc;

use deskfolio_core::persisted::MediaKind;
use deskfolio_core::player::{MediaBackend, MediaEntry};
use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, HtmlMediaElement};

const DEFAULT_ART_GLYPH: &str = "\u{266a}";

/// Asynchronous outcomes of the attached element, tagged with the player
/// generation that attached it.
pub(crate) enum MediaSignal {
    Autoplay { generation: u64, played: bool },
    Failed { generation: u64, message: String },
}

pub(crate) type SignalSink = Rc<dyn Fn(MediaSignal)>;

/// `<audio>`/`<video>` element living inside the modal content box.
pub(crate) struct WebMedia {
    document: Document,
    content: Element,
    element: Option<HtmlMediaElement>,
    listeners: Vec<EventListener>,
    sink: SignalSink,
}

impl WebMedia {
    pub(crate) fn new(document: Document, content: Element, sink: SignalSink) -> Self {
        Self {
            document,
            content,
            element: None,
            listeners: Vec::new(),
            sink,
        }
    }

    fn build(&self, entry: &MediaEntry) -> Result<HtmlMediaElement, String> {
        let element = self
            .document
            .create_element(entry.kind.tag_name())
            .map_err(|err| format!("create {}: {err:?}", entry.kind.tag_name()))?
            .dyn_into::<HtmlMediaElement>()
            .map_err(|_| "created element is not a media element".to_string())?;
        element.set_controls(true);
        let _ = element.set_attribute("preload", "auto");
        if entry.kind == MediaKind::Video {
            let _ = element.set_attribute("playsinline", "");
        }
        element.set_src(&entry.src);
        Ok(element)
    }

    fn album_art(&self, entry: &MediaEntry) -> Option<Element> {
        let art = self.document.create_element("div").ok()?;
        art.set_class_name("album-art");
        match entry.artwork.as_deref() {
            Some(src) => {
                let _ = art.set_attribute("style", &format!("background-image: url('{src}');"));
            }
            None => {
                let glyph = entry.icon.as_deref().unwrap_or(DEFAULT_ART_GLYPH);
                art.set_text_content(Some(glyph));
            }
        }
        Some(art)
    }
}

impl MediaBackend for WebMedia {
    fn attach(&mut self, entry: &MediaEntry, generation: u64) {
        self.content.set_inner_html("");
        let element = match self.build(entry) {
            Ok(element) => element,
            Err(err) => {
                gloo::console::error!("media: attach failed", err);
                // Reported from a task so the player is not re-entered.
                let sink = self.sink.clone();
                let message = format!("Could not load \"{}\".", entry.title);
                spawn_local(async move {
                    sink(MediaSignal::Failed {
                        generation,
                        message,
                    });
                });
                return;
            }
        };

        let sink = self.sink.clone();
        let title = entry.title.clone();
        let src = entry.src.clone();
        let error_listener = EventListener::new(&element, "error", move |event| {
            let code = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlMediaElement>().ok())
                .and_then(|media| media.error())
                .map(|error| error.code())
                .unwrap_or(0);
            gloo::console::error!("media: load error", code, src.clone());
            sink(MediaSignal::Failed {
                generation,
                message: format!("Could not load \"{title}\". Please check that the file exists."),
            });
        });
        self.listeners.push(error_listener);

        if entry.kind == MediaKind::Audio {
            if let Some(art) = self.album_art(entry) {
                let _ = self.content.append_child(&art);
            }
        }
        let _ = self.content.append_child(&element);
        self.element = Some(element);
    }

    fn request_play(&mut self, generation: u64) {
        let Some(element) = self.element.clone() else {
            return;
        };
        let sink = self.sink.clone();
        spawn_local(async move {
            let played = match element.play() {
                Ok(promise) => JsFuture::from(promise).await.is_ok(),
                Err(_) => false,
            };
            sink(MediaSignal::Autoplay { generation, played });
        });
    }

    fn seek(&mut self, seconds: f64) {
        if let Some(element) = self.element.as_ref() {
            element.set_current_time(seconds);
        }
    }

    fn position(&self) -> Option<f64> {
        self.element.as_ref().map(|element| element.current_time())
    }

    fn is_playing(&self) -> bool {
        self.element
            .as_ref()
            .map(|element| !element.paused() && !element.ended())
            .unwrap_or(false)
    }

    fn release(&mut self) {
        self.listeners.clear();
        if let Some(element) = self.element.take() {
            let _ = element.pause();
            let _ = element.remove_attribute("src");
            element.load();
        }
        self.content.set_inner_html("");
    }
}
