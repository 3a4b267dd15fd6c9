//! Portfolio content catalog
//!
//! The catalog is read-only input: an ordered list of items per category,
//! parsed from the portfolio data file. The preview modal only ever reads it.

use crate::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Catalog section an item is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Games,
    Websites,
    Photos,
    Videos,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Games,
        Category::Websites,
        Category::Photos,
        Category::Videos,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Games => "games",
            Category::Websites => "websites",
            Category::Photos => "photos",
            Category::Videos => "videos",
        }
    }

    pub fn parse(name: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Tab label
    pub fn label(self) -> &'static str {
        match self {
            Category::Games => "Games",
            Category::Websites => "Websites",
            Category::Photos => "Photos",
            Category::Videos => "Videos",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier, unique within its category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item type, one per catalog variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Game,
    Website,
    Photo,
    Video,
}

/// Opaque locator of a game build consumed by the embedded engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineAssetRef {
    #[serde(rename = "game_folder")]
    pub folder: String,
    pub build_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    #[default]
    Playable,
    ComingSoon,
}

impl DisplayStatus {
    /// Card badge text
    pub fn badge(self) -> &'static str {
        match self {
            DisplayStatus::Playable => "Playable",
            DisplayStatus::ComingSoon => "Coming Soon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameItem {
    pub id: ItemId,
    #[serde(rename = "name", alias = "title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub overview: String,
    #[serde(rename = "image", alias = "thumbnail")]
    pub thumbnail_url: String,
    #[serde(flatten)]
    pub engine_asset_ref: EngineAssetRef,
    #[serde(default, rename = "status")]
    pub display_status: DisplayStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteItem {
    pub id: ItemId,
    #[serde(rename = "name", alias = "title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "image", alias = "thumbnail")]
    pub thumbnail_url: String,
    #[serde(rename = "url")]
    pub target_url: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "image", alias = "src")]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub camera: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    #[serde(rename = "video_url", alias = "src")]
    pub media_url: String,
    #[serde(default, rename = "duration")]
    pub duration_secs: Option<u32>,
    #[serde(default)]
    pub resolution: Option<String>,
}

/// One entry of the portfolio
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogItem {
    Game(GameItem),
    Website(WebsiteItem),
    Photo(PhotoItem),
    Video(VideoItem),
}

impl CatalogItem {
    pub fn id(&self) -> ItemId {
        match self {
            CatalogItem::Game(g) => g.id,
            CatalogItem::Website(w) => w.id,
            CatalogItem::Photo(p) => p.id,
            CatalogItem::Video(v) => v.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            CatalogItem::Game(g) => &g.title,
            CatalogItem::Website(w) => &w.title,
            CatalogItem::Photo(p) => &p.title,
            CatalogItem::Video(v) => &v.title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            CatalogItem::Game(g) => &g.description,
            CatalogItem::Website(w) => &w.description,
            CatalogItem::Photo(p) => &p.description,
            CatalogItem::Video(v) => &v.description,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            CatalogItem::Game(_) => ItemKind::Game,
            CatalogItem::Website(_) => ItemKind::Website,
            CatalogItem::Photo(_) => ItemKind::Photo,
            CatalogItem::Video(_) => ItemKind::Video,
        }
    }

    /// The category this item type is listed under
    pub fn category(&self) -> Category {
        match self {
            CatalogItem::Game(_) => Category::Games,
            CatalogItem::Website(_) => Category::Websites,
            CatalogItem::Photo(_) => Category::Photos,
            CatalogItem::Video(_) => Category::Videos,
        }
    }

    /// Image shown on the card
    pub fn card_image_url(&self) -> &str {
        match self {
            CatalogItem::Game(g) => &g.thumbnail_url,
            CatalogItem::Website(w) => &w.thumbnail_url,
            CatalogItem::Photo(p) => &p.image_url,
            CatalogItem::Video(v) => &v.thumbnail_url,
        }
    }

    /// Badge shown on the card
    pub fn badge(&self) -> &str {
        match self {
            CatalogItem::Game(g) => g.display_status.badge(),
            CatalogItem::Website(_) => "Live",
            CatalogItem::Photo(p) => &p.category,
            CatalogItem::Video(v) => &v.category,
        }
    }

    /// Short text shown on the card
    pub fn summary(&self) -> &str {
        match self {
            CatalogItem::Game(g) if !g.overview.is_empty() => &g.overview,
            other => other.description(),
        }
    }
}

/// Raw layout of the portfolio data file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    games: Vec<GameItem>,
    websites: Vec<WebsiteItem>,
    photos: Vec<PhotoItem>,
    videos: Vec<VideoItem>,
}

/// Immutable, categorized list of portfolio items
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    games: Vec<CatalogItem>,
    websites: Vec<CatalogItem>,
    photos: Vec<CatalogItem>,
    videos: Vec<CatalogItem>,
}

impl Catalog {
    /// Build a catalog from items, validating id uniqueness per category
    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Result<Self, AppError> {
        let mut catalog = Catalog::default();
        for item in items {
            catalog.list_mut(item.category()).push(item);
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse the portfolio data file contents
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let file: CatalogFile = serde_json::from_str(json)?;

        let items = file
            .games
            .into_iter()
            .map(CatalogItem::Game)
            .chain(file.websites.into_iter().map(CatalogItem::Website))
            .chain(file.photos.into_iter().map(CatalogItem::Photo))
            .chain(file.videos.into_iter().map(CatalogItem::Video));

        Self::from_items(items)
    }

    /// Load the portfolio data file from disk
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(
            games = catalog.len(Category::Games),
            websites = catalog.len(Category::Websites),
            photos = catalog.len(Category::Photos),
            videos = catalog.len(Category::Videos),
            "Catalog loaded from {:?}",
            path
        );
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), AppError> {
        for category in Category::ALL {
            let mut seen = HashSet::new();
            for item in self.items_by_category(category) {
                if !seen.insert(item.id()) {
                    return Err(AppError::Catalog(format!(
                        "duplicate id {} in {}",
                        item.id(),
                        category
                    )));
                }
            }
        }
        Ok(())
    }

    fn list_mut(&mut self, category: Category) -> &mut Vec<CatalogItem> {
        match category {
            Category::Games => &mut self.games,
            Category::Websites => &mut self.websites,
            Category::Photos => &mut self.photos,
            Category::Videos => &mut self.videos,
        }
    }

    /// Ordered items of one category
    pub fn items_by_category(&self, category: Category) -> &[CatalogItem] {
        match category {
            Category::Games => &self.games,
            Category::Websites => &self.websites,
            Category::Photos => &self.photos,
            Category::Videos => &self.videos,
        }
    }

    /// Find an item and its index within the category
    pub fn find(&self, category: Category, id: ItemId) -> Option<(usize, &CatalogItem)> {
        self.items_by_category(category)
            .iter()
            .enumerate()
            .find(|(_, item)| item.id() == id)
    }

    pub fn len(&self, category: Category) -> usize {
        self.items_by_category(category).len()
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.len(*c) == 0)
    }
}
