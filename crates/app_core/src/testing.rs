//! Test doubles shared by the unit tests

use crate::config::ViewerConfig;
use crate::controller::{DisplayControl, ModalController};
use crate::engine::{Engine, EngineConfig, EngineError, EngineHandle, MountPoint, ProgressFn};
use crate::error::AppError;
use crate::media::{MediaElement, MediaFactory, MediaLoad, PlayOutcome};
use crate::notify::{NotificationLevel, NotificationSink};
use app_fs::{ActionError, DownloadOutcome, ExternalActions};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const SAMPLE_CATALOG: &str = r#"{
    "games": [
        {
            "id": 1,
            "name": "Sky Surfers",
            "description": "An endless runner above the clouds.",
            "overview": "Dodge the canyon.",
            "image": "/images/games/Game1.jpg",
            "game_folder": "sky_surfers",
            "build_name": "sky_surfers"
        },
        {
            "id": 2,
            "name": "Neon Drift",
            "description": "Arcade racing at night.",
            "image": "/images/games/Game2.jpg",
            "game_folder": "neon_drift",
            "build_name": "NeonDrift"
        },
        {
            "id": 3,
            "name": "Deep Orbit",
            "description": "Gravity puzzles.",
            "image": "/images/games/Game3.jpg",
            "game_folder": "deep_orbit",
            "build_name": "DeepOrbit",
            "status": "coming_soon"
        }
    ],
    "websites": [
        {
            "id": 1,
            "name": "ReelSpot",
            "description": "Short film festival site.",
            "image": "/images/websites/reelspot.jpg",
            "url": "https://example.com/reelspot/",
            "technologies": ["HTML", "CSS", "JavaScript"]
        },
        {
            "id": 2,
            "name": "Pixel Forge",
            "description": "Studio landing page.",
            "image": "/images/websites/pixelforge.jpg",
            "url": "https://example.com/pixelforge/"
        }
    ],
    "photos": [
        {
            "id": 1,
            "title": "The Heart Of Love",
            "description": "Two hands, one heart.",
            "image": "/images/photos/heart.jpg",
            "category": "Love"
        },
        {
            "id": 2,
            "title": "The Peacock",
            "description": "Morning display.",
            "image": "/images/photos/peacock.jpg",
            "category": "Animals",
            "camera": "X-T30",
            "location": "Bhopal"
        }
    ],
    "videos": [
        {
            "id": 1,
            "title": "Brand Showcase",
            "description": "Product reel.",
            "category": "Commercial",
            "thumbnail": "/images/videos/video1-thumb.jpg",
            "video_url": "/videos/video1.mp4",
            "duration": 95
        },
        {
            "id": 2,
            "title": "Travel Diary",
            "description": "Two weeks on the road.",
            "category": "Travel",
            "thumbnail": "/images/videos/video2-thumb.jpg",
            "video_url": "/videos/video2.mp4",
            "resolution": "1080p"
        }
    ]
}"#;

// ========================================
// Media
// ========================================

/// Observable state of a [`FakeMedia`]
#[derive(Debug, Clone, Default)]
pub struct MediaProbe {
    pub paused: bool,
    pub muted: bool,
    pub source: Option<String>,
    pub plays: usize,
    pub detaches: usize,
}

pub type SharedProbe = Arc<Mutex<MediaProbe>>;

pub struct FakeMedia {
    probe: SharedProbe,
    source: Option<String>,
    load: MediaLoad,
    play: PlayOutcome,
}

impl FakeMedia {
    pub fn new(source: &str) -> Self {
        Self::with(source, MediaLoad::FirstFrame, PlayOutcome::Playing)
    }

    pub fn with(source: &str, load: MediaLoad, play: PlayOutcome) -> Self {
        let probe = MediaProbe {
            paused: true,
            source: Some(source.to_string()),
            ..MediaProbe::default()
        };
        Self {
            probe: Arc::new(Mutex::new(probe)),
            source: Some(source.to_string()),
            load,
            play,
        }
    }

    pub fn probe(&self) -> SharedProbe {
        self.probe.clone()
    }
}

impl MediaElement for FakeMedia {
    fn load(&mut self) -> Result<MediaLoad, AppError> {
        Ok(self.load)
    }

    fn play(&mut self) -> PlayOutcome {
        let mut probe = self.probe.lock();
        probe.plays += 1;
        if self.play == PlayOutcome::Playing {
            probe.paused = false;
        }
        self.play
    }

    fn pause(&mut self) {
        self.probe.lock().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.probe.lock().paused
    }

    fn set_muted(&mut self, muted: bool) {
        self.probe.lock().muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.probe.lock().muted
    }

    fn detach_source(&mut self) {
        self.source = None;
        let mut probe = self.probe.lock();
        probe.source = None;
        probe.detaches += 1;
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Factory handing out [`FakeMedia`] elements and keeping their probes
#[derive(Clone)]
pub struct FakeFactory {
    pub created: Arc<Mutex<Vec<(String, SharedProbe)>>>,
    load: MediaLoad,
    play: PlayOutcome,
    fail: bool,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self {
            created: Arc::new(Mutex::new(Vec::new())),
            load: MediaLoad::FirstFrame,
            play: PlayOutcome::Playing,
            fail: false,
        }
    }

    pub fn buffering(mut self) -> Self {
        self.load = MediaLoad::Buffering;
        self
    }

    pub fn blocking_autoplay(mut self) -> Self {
        self.play = PlayOutcome::Blocked;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn probe(&self, index: usize) -> SharedProbe {
        self.created.lock()[index].1.clone()
    }

    pub fn count(&self) -> usize {
        self.created.lock().len()
    }
}

impl MediaFactory for FakeFactory {
    fn create(&mut self, media_url: &str) -> Result<Box<dyn MediaElement>, AppError> {
        if self.fail {
            return Err(AppError::MediaLoad(format!("{} unavailable", media_url)));
        }

        let media = FakeMedia::with(media_url, self.load, self.play);
        self.created.lock().push((media_url.to_string(), media.probe()));
        Ok(Box::new(media))
    }
}

// ========================================
// Engine
// ========================================

pub struct FakeEngineHandle {
    shutdowns: Arc<AtomicUsize>,
    fail_shutdown: bool,
}

impl FakeEngineHandle {
    pub fn new() -> Self {
        Self {
            shutdowns: Arc::new(AtomicUsize::new(0)),
            fail_shutdown: false,
        }
    }

    pub fn failing_shutdown() -> Self {
        Self {
            fail_shutdown: true,
            ..Self::new()
        }
    }

    pub fn shutdowns(&self) -> Arc<AtomicUsize> {
        self.shutdowns.clone()
    }
}

impl EngineHandle for FakeEngineHandle {
    fn shutdown(&mut self) -> Result<(), EngineError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        if self.fail_shutdown {
            Err(EngineError::Shutdown("already gone".into()))
        } else {
            Ok(())
        }
    }

    fn is_running(&self) -> bool {
        self.shutdowns.load(Ordering::SeqCst) == 0
    }
}

/// Engine reporting progress 0, 0.5, 1 then succeeding (or failing)
#[derive(Clone)]
pub struct FakeEngine {
    pub shutdowns: Arc<AtomicUsize>,
    fail: bool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            shutdowns: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl Engine for FakeEngine {
    async fn instantiate(
        &self,
        _mount: &MountPoint,
        _config: &EngineConfig,
        progress: ProgressFn,
    ) -> Result<Box<dyn EngineHandle>, EngineError> {
        if self.fail {
            return Err(EngineError::Unavailable);
        }

        for p in [0.0, 0.5, 1.0] {
            progress(p);
            tokio::task::yield_now().await;
        }

        Ok(Box::new(FakeEngineHandle {
            shutdowns: self.shutdowns.clone(),
            fail_shutdown: false,
        }))
    }
}

// ========================================
// Notifications, actions, display
// ========================================

#[derive(Clone, Default)]
pub struct RecordingSink {
    pub messages: Arc<Mutex<Vec<(String, NotificationLevel)>>>,
}

impl RecordingSink {
    pub fn levels(&self) -> Vec<NotificationLevel> {
        self.messages.lock().iter().map(|(_, level)| *level).collect()
    }

    pub fn last(&self) -> Option<(String, NotificationLevel)> {
        self.messages.lock().last().cloned()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.messages.lock().iter().filter(|(_, l)| *l == level).count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, message: &str, level: NotificationLevel) {
        self.messages.lock().push((message.to_string(), level));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionCall {
    Download { url: String, filename: String },
    OpenUrl(String),
    CopyText(String),
}

#[derive(Clone, Default)]
pub struct FakeActions {
    pub calls: Arc<Mutex<Vec<ActionCall>>>,
    pub fail: bool,
}

impl FakeActions {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl ExternalActions for FakeActions {
    fn download(&self, url: &str, filename: &str) -> app_fs::Result<DownloadOutcome> {
        self.calls.lock().push(ActionCall::Download {
            url: url.to_string(),
            filename: filename.to_string(),
        });
        if self.fail {
            return Err(ActionError::NotFound(url.into()));
        }
        Ok(DownloadOutcome::Saved(filename.into()))
    }

    fn open_url(&self, url: &str) -> app_fs::Result<()> {
        self.calls.lock().push(ActionCall::OpenUrl(url.to_string()));
        if self.fail {
            return Err(ActionError::Open {
                url: url.to_string(),
                reason: "no browser".into(),
            });
        }
        Ok(())
    }

    fn copy_text(&self, text: &str) -> app_fs::Result<()> {
        self.calls.lock().push(ActionCall::CopyText(text.to_string()));
        if self.fail {
            return Err(ActionError::Clipboard("locked".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeDisplay {
    pub requests: Arc<Mutex<Vec<bool>>>,
    pub fail: bool,
}

impl DisplayControl for FakeDisplay {
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), AppError> {
        self.requests.lock().push(fullscreen);
        if self.fail {
            return Err(AppError::Fullscreen("no window".into()));
        }
        Ok(())
    }
}

// ========================================
// Controller fixture
// ========================================

/// Handles onto the doubles wired into a test controller
pub struct Doubles {
    pub media: FakeFactory,
    pub notes: RecordingSink,
    pub actions: FakeActions,
    pub display: FakeDisplay,
}

pub fn controller_with(media: FakeFactory, actions: FakeActions, display: FakeDisplay) -> (ModalController, Doubles) {
    let notes = RecordingSink::default();
    let controller = ModalController::new(
        Box::new(media.clone()),
        Box::new(notes.clone()),
        Box::new(actions.clone()),
        Box::new(display.clone()),
    )
    .with_viewer_config(ViewerConfig::default());

    (
        controller,
        Doubles {
            media,
            notes,
            actions,
            display,
        },
    )
}

pub fn controller() -> (ModalController, Doubles) {
    controller_with(FakeFactory::new(), FakeActions::default(), FakeDisplay::default())
}
