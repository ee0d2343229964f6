use std::cell::RefCell;
use std::rc::Rc;

use deskfolio_core::catalog::{default_page, page_by_slug, PageEntry};

use crate::icon_view::{IconView, OpenMedia};
use crate::player_view::PlayerView;

struct MountedPage {
    _icons: Option<Rc<IconView>>,
    _player: Option<Rc<PlayerView>>,
}

thread_local! {
    static MOUNTED_PAGE: RefCell<Option<MountedPage>> = RefCell::new(None);
}

fn selected_page(document: &web_sys::Document) -> Option<&'static PageEntry> {
    let slug = document.body().and_then(|body| body.dataset().get("page"));
    match slug.as_deref().map(str::trim).filter(|slug| !slug.is_empty()) {
        Some(slug) => page_by_slug(slug).or_else(|| {
            gloo::console::warn!("page: unknown slug, using default", slug.to_string());
            default_page()
        }),
        None => default_page(),
    }
}

/// Builds the icon grid and, when the page has a media library, the modal
/// player. Components whose DOM anchors are missing are skipped.
pub(crate) fn mount() -> Result<(), String> {
    let window = web_sys::window().ok_or("window unavailable")?;
    let document = window.document().ok_or("document unavailable")?;
    let page = selected_page(&document).ok_or("site catalog has no default page")?;
    let page_key = window
        .location()
        .pathname()
        .map_err(|err| format!("location unavailable: {err:?}"))?;

    let player = if page.media.is_empty() {
        None
    } else {
        match PlayerView::mount(&document, &page_key, page.library()) {
            Ok(view) => Some(view),
            Err(err) => {
                gloo::console::warn!("page: player not mounted", err);
                None
            }
        }
    };

    let open_media: OpenMedia = match player.as_ref() {
        Some(view) => {
            let view = Rc::downgrade(view);
            Box::new(move |media_ref| {
                if let Some(view) = view.upgrade() {
                    view.open_media(media_ref);
                }
            })
        }
        None => Box::new(|media_ref| {
            gloo::console::warn!("page: no player for media", media_ref);
        }),
    };

    let icons = match document.get_element_by_id("iconsWrapper") {
        Some(wrapper) => {
            let board = page.board().map_err(|err| err.to_string())?;
            Some(IconView::mount(
                window.clone(),
                document.clone(),
                wrapper,
                board,
                open_media,
            ))
        }
        None => {
            gloo::console::warn!("page: missing #iconsWrapper");
            None
        }
    };

    MOUNTED_PAGE.with(|slot| {
        *slot.borrow_mut() = Some(MountedPage {
            _icons: icons,
            _player: player,
        });
    });
    gloo::console::log!("page: mounted", page.slug);
    Ok(())
}
