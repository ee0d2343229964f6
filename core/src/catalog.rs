use crate::board::{BoardError, DraggableItem, IconBoard, TargetAction};
use crate::gesture::{CommitMetric, DragPolicy, PolicySet};
use crate::persisted::MediaKind;
use crate::player::MediaEntry;

#[derive(Clone, Copy, Debug)]
pub enum ActionEntry {
    Navigate(&'static str),
    OpenMedia(u32),
}

#[derive(Clone, Copy, Debug)]
pub struct ItemEntry {
    pub id: u32,
    pub title: &'static str,
    pub image: &'static str,
    pub action: ActionEntry,
}

#[derive(Clone, Copy, Debug)]
pub struct MediaCatalogEntry {
    pub id: u32,
    pub title: &'static str,
    pub kind: MediaKind,
    pub src: &'static str,
    pub artwork: Option<&'static str>,
    pub icon: Option<&'static str>,
}

/// One page of the site. `depth` counts the directories between the site
/// root and the page's HTML file.
#[derive(Clone, Copy, Debug)]
pub struct PageEntry {
    pub slug: &'static str,
    pub title: &'static str,
    pub depth: u32,
    pub items: &'static [ItemEntry],
    pub media: &'static [MediaCatalogEntry],
}

include!(concat!(env!("OUT_DIR"), "/site_catalog.rs"));

pub fn page_by_slug(slug: &str) -> Option<&'static PageEntry> {
    let trimmed = slug.trim();
    SITE_PAGES
        .iter()
        .find(|page| page.slug.eq_ignore_ascii_case(trimmed))
}

pub fn default_page() -> Option<&'static PageEntry> {
    page_by_slug(DEFAULT_PAGE_SLUG)
}

/// Resolves a site-root-relative asset path for a page `depth` directories
/// below the root. Absolute paths and URLs are returned unchanged.
pub fn asset_url(depth: u32, path: &str) -> String {
    let absolute = path.starts_with('/')
        || path.starts_with("http://")
        || path.starts_with("https://")
        || path.starts_with("data:");
    if absolute {
        return path.to_string();
    }
    let mut url = "../".repeat(depth as usize);
    url.push_str(path);
    url
}

impl PageEntry {
    pub fn items(&self) -> Vec<DraggableItem> {
        self.items
            .iter()
            .map(|entry| DraggableItem {
                id: entry.id,
                title: entry.title.to_string(),
                image: asset_url(self.depth, entry.image),
                action: match entry.action {
                    ActionEntry::Navigate(href) => TargetAction::Navigate(href.to_string()),
                    ActionEntry::OpenMedia(media_ref) => TargetAction::OpenMedia(media_ref),
                },
                position: (0.0, 0.0),
            })
            .collect()
    }

    pub fn library(&self) -> Vec<MediaEntry> {
        self.media
            .iter()
            .map(|entry| MediaEntry {
                id: entry.id,
                title: entry.title.to_string(),
                kind: entry.kind,
                src: asset_url(self.depth, entry.src),
                artwork: entry.artwork.map(|path| asset_url(self.depth, path)),
                icon: entry.icon.map(str::to_string),
            })
            .collect()
    }

    pub fn board(&self) -> Result<IconBoard, BoardError> {
        IconBoard::new(self.items(), GESTURE_POLICIES)
    }
}
