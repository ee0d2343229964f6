use std::collections::HashSet;
use std::env;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Deserialize)]
struct CatalogFile {
    default_page: Option<String>,
    gestures: Option<GestureTable>,
    pages: Vec<PageEntry>,
}

#[derive(Deserialize, Default)]
struct GestureTable {
    mouse: Option<PolicyEntry>,
    touch: Option<PolicyEntry>,
}

#[derive(Deserialize)]
struct PolicyEntry {
    policy: String,
    metric: Option<String>,
    threshold: Option<f32>,
}

#[derive(Deserialize)]
struct PageEntry {
    slug: String,
    title: Option<String>,
    #[serde(default)]
    depth: u32,
    #[serde(default)]
    items: Vec<ItemEntry>,
    #[serde(default)]
    media: Vec<MediaEntry>,
}

#[derive(Deserialize)]
struct ItemEntry {
    id: u32,
    title: String,
    image: String,
    navigate: Option<String>,
    open_media: Option<u32>,
}

#[derive(Deserialize)]
struct MediaEntry {
    id: u32,
    title: String,
    kind: String,
    src: String,
    artwork: Option<String>,
    icon: Option<String>,
}

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("missing CARGO_MANIFEST_DIR"));
    let workspace_root = manifest_dir.parent().unwrap_or(&manifest_dir);
    let env_path = workspace_root.join(".env");
    let env_local_path = workspace_root.join(".env.local");

    let _ = dotenvy::from_filename(&env_local_path);
    let _ = dotenvy::from_filename(&env_path);

    println!("cargo:rerun-if-env-changed=SITE_CATALOG_PATH");
    println!("cargo:rerun-if-changed={}", env_path.display());
    println!("cargo:rerun-if-changed={}", env_local_path.display());

    let catalog_path = resolve_catalog_path(workspace_root);
    println!("cargo:rerun-if-changed={}", catalog_path.display());

    let contents = fs::read_to_string(&catalog_path).unwrap_or_else(|err| {
        panic!(
            "failed to read site catalog at {}: {err}",
            catalog_path.display()
        )
    });

    let catalog: CatalogFile = toml::from_str(&contents).unwrap_or_else(|err| {
        panic!(
            "failed to parse site catalog at {}: {err}",
            catalog_path.display()
        )
    });

    if catalog.pages.is_empty() {
        panic!("site catalog {} has no pages", catalog_path.display());
    }

    validate_pages(&catalog.pages, &catalog_path);

    let default_page = catalog
        .default_page
        .as_deref()
        .unwrap_or(catalog.pages[0].slug.as_str());
    if !catalog.pages.iter().any(|page| page.slug == default_page) {
        panic!(
            "default_page '{}' not found in {}",
            default_page,
            catalog_path.display()
        );
    }

    let gestures = catalog.gestures.unwrap_or_default();
    let mouse_policy = policy_expr(gestures.mouse.as_ref(), "mouse", &catalog_path);
    let touch_policy = policy_expr(gestures.touch.as_ref(), "touch", &catalog_path);

    let mut output = String::new();
    writeln!(
        &mut output,
        "pub const DEFAULT_PAGE_SLUG: &str = {};",
        rust_string(default_page)
    )
    .unwrap();
    writeln!(&mut output).unwrap();
    writeln!(&mut output, "pub const GESTURE_POLICIES: PolicySet = PolicySet {{").unwrap();
    writeln!(&mut output, "    mouse: {mouse_policy},").unwrap();
    writeln!(&mut output, "    touch: {touch_policy},").unwrap();
    writeln!(&mut output, "}};").unwrap();
    writeln!(&mut output).unwrap();
    writeln!(&mut output, "pub const SITE_PAGES: &[PageEntry] = &[").unwrap();

    for page in &catalog.pages {
        let title = page.title.as_deref().unwrap_or(page.slug.as_str());
        writeln!(&mut output, "    PageEntry {{").unwrap();
        writeln!(&mut output, "        slug: {},", rust_string(&page.slug)).unwrap();
        writeln!(&mut output, "        title: {},", rust_string(title)).unwrap();
        writeln!(&mut output, "        depth: {},", page.depth).unwrap();
        writeln!(&mut output, "        items: &[").unwrap();
        for item in &page.items {
            let action = match (&item.navigate, item.open_media) {
                (Some(href), None) => format!("ActionEntry::Navigate({})", rust_string(href)),
                (None, Some(media_id)) => format!("ActionEntry::OpenMedia({media_id})"),
                _ => unreachable!("validated above"),
            };
            writeln!(&mut output, "            ItemEntry {{").unwrap();
            writeln!(&mut output, "                id: {},", item.id).unwrap();
            writeln!(&mut output, "                title: {},", rust_string(&item.title)).unwrap();
            writeln!(&mut output, "                image: {},", rust_string(&item.image)).unwrap();
            writeln!(&mut output, "                action: {action},").unwrap();
            writeln!(&mut output, "            }},").unwrap();
        }
        writeln!(&mut output, "        ],").unwrap();
        writeln!(&mut output, "        media: &[").unwrap();
        for media in &page.media {
            let kind = match media.kind.as_str() {
                "audio" => "MediaKind::Audio",
                _ => "MediaKind::Video",
            };
            let artwork = match &media.artwork {
                Some(path) => format!("Some({})", rust_string(path)),
                None => "None".to_string(),
            };
            let icon = match &media.icon {
                Some(glyph) => format!("Some({})", rust_string(glyph)),
                None => "None".to_string(),
            };
            writeln!(&mut output, "            MediaCatalogEntry {{").unwrap();
            writeln!(&mut output, "                id: {},", media.id).unwrap();
            writeln!(&mut output, "                title: {},", rust_string(&media.title)).unwrap();
            writeln!(&mut output, "                kind: {kind},").unwrap();
            writeln!(&mut output, "                src: {},", rust_string(&media.src)).unwrap();
            writeln!(&mut output, "                artwork: {artwork},").unwrap();
            writeln!(&mut output, "                icon: {icon},").unwrap();
            writeln!(&mut output, "            }},").unwrap();
        }
        writeln!(&mut output, "        ],").unwrap();
        writeln!(&mut output, "    }},").unwrap();
    }

    writeln!(&mut output, "];").unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("missing OUT_DIR"));
    let out_path = out_dir.join("site_catalog.rs");
    fs::write(&out_path, output).unwrap_or_else(|err| {
        panic!("failed to write {}: {err}", out_path.display())
    });
}

fn resolve_catalog_path(workspace_root: &Path) -> PathBuf {
    let env_value = env::var("SITE_CATALOG_PATH").ok();
    let raw_path = match env_value {
        Some(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => workspace_root.join("site/catalog.toml"),
    };
    if raw_path.is_relative() {
        workspace_root.join(raw_path)
    } else {
        raw_path
    }
}

fn rust_string(value: &str) -> String {
    format!("{:?}", value)
}

fn policy_expr(entry: Option<&PolicyEntry>, label: &str, catalog_path: &Path) -> String {
    let Some(entry) = entry else {
        return match label {
            "touch" => "DragPolicy::deferred_touch()".to_string(),
            _ => "DragPolicy::immediate()".to_string(),
        };
    };
    if let Some(threshold) = entry.threshold {
        if !threshold.is_finite() || threshold <= 0.0 {
            panic!(
                "{label} gesture threshold must be positive in {}",
                catalog_path.display()
            );
        }
    }
    match entry.policy.as_str() {
        "immediate" => {
            if entry.metric.is_some() {
                panic!(
                    "{label} gesture policy 'immediate' takes no metric in {}",
                    catalog_path.display()
                );
            }
            let threshold = entry.threshold.unwrap_or(5.0);
            format!("DragPolicy::Immediate {{ threshold: {threshold:?} }}")
        }
        "deferred" => {
            let (metric, default_threshold) = match entry.metric.as_deref().unwrap_or("distance") {
                "distance" => ("CommitMetric::Distance", 5.0),
                "axis" => ("CommitMetric::Axis", 15.0),
                other => panic!(
                    "unknown {label} gesture metric '{other}' in {}",
                    catalog_path.display()
                ),
            };
            let threshold = entry.threshold.unwrap_or(default_threshold);
            format!("DragPolicy::Deferred {{ threshold: {threshold:?}, metric: {metric} }}")
        }
        other => panic!(
            "unknown {label} gesture policy '{other}' in {}",
            catalog_path.display()
        ),
    }
}

fn validate_pages(pages: &[PageEntry], catalog_path: &Path) {
    let mut slugs = HashSet::new();

    for page in pages {
        if page.slug.trim().is_empty() {
            panic!("page slug cannot be empty in {}", catalog_path.display());
        }
        if !slugs.insert(page.slug.clone()) {
            panic!(
                "duplicate page slug '{}' in {}",
                page.slug,
                catalog_path.display()
            );
        }

        let mut media_ids = HashSet::new();
        for media in &page.media {
            if !media_ids.insert(media.id) {
                panic!(
                    "page '{}' has duplicate media id {} in {}",
                    page.slug,
                    media.id,
                    catalog_path.display()
                );
            }
            if media.kind != "audio" && media.kind != "video" {
                panic!(
                    "media {} on page '{}' has unknown kind '{}' in {}",
                    media.id,
                    page.slug,
                    media.kind,
                    catalog_path.display()
                );
            }
            validate_asset_path(&media.src, &page.slug, catalog_path);
            if let Some(artwork) = &media.artwork {
                validate_asset_path(artwork, &page.slug, catalog_path);
            }
            if media.icon.as_deref().is_some_and(|glyph| glyph.trim().is_empty()) {
                panic!(
                    "media {} on page '{}' has an empty icon in {}",
                    media.id,
                    page.slug,
                    catalog_path.display()
                );
            }
        }

        let mut item_ids = HashSet::new();
        for item in &page.items {
            if !item_ids.insert(item.id) {
                panic!(
                    "page '{}' has duplicate item id {} in {}",
                    page.slug,
                    item.id,
                    catalog_path.display()
                );
            }
            validate_asset_path(&item.image, &page.slug, catalog_path);
            match (&item.navigate, item.open_media) {
                (Some(href), None) => {
                    if href.trim().is_empty() {
                        panic!(
                            "item {} on page '{}' has an empty navigate target in {}",
                            item.id,
                            page.slug,
                            catalog_path.display()
                        );
                    }
                }
                (None, Some(media_id)) => {
                    if !media_ids.contains(&media_id) {
                        panic!(
                            "item {} on page '{}' opens unknown media {} in {}",
                            item.id,
                            page.slug,
                            media_id,
                            catalog_path.display()
                        );
                    }
                }
                _ => panic!(
                    "item {} on page '{}' must set exactly one of navigate or open_media in {}",
                    item.id,
                    page.slug,
                    catalog_path.display()
                ),
            }
        }
    }
}

fn validate_asset_path(path: &str, page: &str, catalog_path: &Path) {
    if path.trim().is_empty() {
        panic!(
            "asset path on page '{}' cannot be empty in {}",
            page,
            catalog_path.display()
        );
    }
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("data:") {
        panic!(
            "asset '{}' on page '{}' must be a site-relative path in {}",
            path,
            page,
            catalog_path.display()
        );
    }
}
