//! Preview surface rendering
//!
//! Turns a catalog item plus the live session state into a [`PreviewSurface`],
//! a view-independent description of what the modal shows. Dispatch is
//! exhaustive over the item variants.

use crate::catalog::{CatalogItem, ItemKind};
use crate::media::PlaybackView;
use app_fs::{sanitize_filename, with_extension, SanitizeMode};

/// Which media surface is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    ImageViewer,
    VideoPlayer,
    WebsiteLauncher,
    GameMount,
}

impl SurfaceKind {
    pub fn for_kind(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Photo => SurfaceKind::ImageViewer,
            ItemKind::Video => SurfaceKind::VideoPlayer,
            ItemKind::Website => SurfaceKind::WebsiteLauncher,
            ItemKind::Game => SurfaceKind::GameMount,
        }
    }
}

/// Lifecycle of the game mount
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GamePhase {
    /// Thumbnail with a play button
    Idle,
    Loading { progress: f32 },
    Running,
}

/// Type-specific content of a surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceBody {
    Photo {
        image_url: String,
        zoom: f32,
        category: String,
        camera: Option<String>,
        location: Option<String>,
    },
    Video {
        media_url: String,
        thumbnail_url: String,
        playback: PlaybackView,
    },
    /// Websites open in a new browsing context; nothing is embedded
    Website {
        preview_url: String,
        target_url: String,
        technologies: Vec<String>,
    },
    Game {
        thumbnail_url: String,
        phase: GamePhase,
    },
}

/// Controls offered on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewAction {
    Download,
    Fullscreen,
    PlayPause,
    Mute,
    Visit,
    Share,
    PlayGame,
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

impl PreviewAction {
    pub fn label(self) -> &'static str {
        match self {
            PreviewAction::Download => "Download",
            PreviewAction::Fullscreen => "Fullscreen",
            PreviewAction::PlayPause => "Play / Pause",
            PreviewAction::Mute => "Mute",
            PreviewAction::Visit => "Visit Website",
            PreviewAction::Share => "Share",
            PreviewAction::PlayGame => "Play Game",
            PreviewAction::ZoomIn => "Zoom In",
            PreviewAction::ZoomOut => "Zoom Out",
            PreviewAction::ZoomReset => "Reset Zoom",
        }
    }
}

/// Structured description of the modal contents
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSurface {
    pub kind: SurfaceKind,
    pub title: String,
    pub description: String,
    pub body: SurfaceBody,
    pub actions: Vec<PreviewAction>,
    /// `(index, len)` within the open category
    pub position: Option<(usize, usize)>,
}

impl PreviewSurface {
    pub fn visibility(&self) -> SurfaceVisibility {
        SurfaceVisibility::of(self.kind)
    }

    pub fn has_action(&self, action: PreviewAction) -> bool {
        self.actions.contains(&action)
    }

    /// 1-based "n / len" counter
    pub fn counter(&self) -> Option<String> {
        self.position.map(|(index, len)| format!("{} / {}", index + 1, len))
    }
}

/// Which of the four surfaces is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceVisibility {
    pub image_viewer: bool,
    pub video_player: bool,
    pub website_launcher: bool,
    pub game_mount: bool,
}

impl SurfaceVisibility {
    pub fn of(kind: SurfaceKind) -> Self {
        Self {
            image_viewer: kind == SurfaceKind::ImageViewer,
            video_player: kind == SurfaceKind::VideoPlayer,
            website_launcher: kind == SurfaceKind::WebsiteLauncher,
            game_mount: kind == SurfaceKind::GameMount,
        }
    }

    pub fn visible_count(&self) -> usize {
        [self.image_viewer, self.video_player, self.website_launcher, self.game_mount]
            .iter()
            .filter(|v| **v)
            .count()
    }
}

/// Bounded zoom scale with fixed steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    scale: f32,
    min: f32,
    max: f32,
    step: f32,
}

impl ZoomState {
    pub fn new(min: f32, max: f32, step: f32) -> Self {
        Self { scale: min, min, max, step }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.scale = (self.scale + self.step).min(self.max);
        self.scale
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.scale = (self.scale - self.step).max(self.min);
        self.scale
    }

    pub fn reset(&mut self) {
        self.scale = self.min;
    }

    pub fn is_reset(&self) -> bool {
        self.scale <= self.min
    }
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::new(1.0, 3.0, 0.25)
    }
}

/// Session state the surface depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub zoom: f32,
    pub playback: PlaybackView,
    pub game_phase: GamePhase,
    pub position: Option<(usize, usize)>,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            playback: PlaybackView::default(),
            game_phase: GamePhase::Idle,
            position: None,
        }
    }
}

/// Produce the surface for `item`
pub fn render(item: &CatalogItem, ctx: &RenderContext) -> PreviewSurface {
    let (body, actions) = match item {
        CatalogItem::Photo(photo) => (
            SurfaceBody::Photo {
                image_url: photo.image_url.clone(),
                zoom: ctx.zoom,
                category: photo.category.clone(),
                camera: photo.camera.clone(),
                location: photo.location.clone(),
            },
            vec![
                PreviewAction::ZoomIn,
                PreviewAction::ZoomOut,
                PreviewAction::ZoomReset,
                PreviewAction::Download,
                PreviewAction::Fullscreen,
            ],
        ),
        CatalogItem::Video(video) => (
            SurfaceBody::Video {
                media_url: video.media_url.clone(),
                thumbnail_url: video.thumbnail_url.clone(),
                playback: ctx.playback,
            },
            vec![
                PreviewAction::PlayPause,
                PreviewAction::Mute,
                PreviewAction::Download,
                PreviewAction::Fullscreen,
            ],
        ),
        CatalogItem::Website(site) => (
            SurfaceBody::Website {
                preview_url: site.thumbnail_url.clone(),
                target_url: site.target_url.clone(),
                technologies: site.technologies.clone(),
            },
            vec![PreviewAction::Visit, PreviewAction::Share],
        ),
        CatalogItem::Game(game) => {
            let actions = match ctx.game_phase {
                GamePhase::Idle => vec![PreviewAction::PlayGame],
                GamePhase::Loading { .. } | GamePhase::Running => vec![PreviewAction::Fullscreen],
            };
            (
                SurfaceBody::Game {
                    thumbnail_url: game.thumbnail_url.clone(),
                    phase: ctx.game_phase,
                },
                actions,
            )
        }
    };

    let description = match item {
        CatalogItem::Game(game) if !game.overview.is_empty() => game.overview.clone(),
        other => other.description().to_string(),
    };

    PreviewSurface {
        kind: SurfaceKind::for_kind(item.kind()),
        title: item.title().to_string(),
        description,
        body,
        actions,
        position: ctx.position,
    }
}

/// Downloadable asset URL of an item
pub fn download_url(item: &CatalogItem) -> Option<&str> {
    match item {
        CatalogItem::Photo(photo) => Some(&photo.image_url),
        CatalogItem::Video(video) => Some(&video.media_url),
        CatalogItem::Website(_) | CatalogItem::Game(_) => None,
    }
}

/// Save-as name for a downloadable item: sanitized title plus the URL's extension
pub fn download_filename(item: &CatalogItem) -> String {
    let fallback = match item {
        CatalogItem::Video(_) => "mp4",
        _ => "jpg",
    };

    let ext = download_url(item)
        .and_then(url_extension)
        .unwrap_or(fallback);

    let name = sanitize_filename(item.title(), SanitizeMode::Underscore);
    with_extension(&name, ext)
}

fn url_extension(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}
