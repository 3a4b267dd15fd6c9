//! Preview modal controller
//!
//! Owns the single [`ModalSession`] and drives it through
//! `Closed -> OpenIdle -> OpenLoading -> OpenActive`. Every transition that
//! leaves an item tears down that item's resource before anything new is
//! mounted, and every asynchronous result is checked against the ticket it
//! was issued with so late results cannot touch a newer session.

use crate::catalog::{Catalog, CatalogItem, Category, DisplayStatus, ItemId};
use crate::command::{Command, CommandId};
use crate::config::{EngineSettings, ViewerConfig};
use crate::engine::{EngineConfig, EngineLoadRequest, LoadEvent, LoadEventKind, MountPoint};
use crate::error::AppError;
use crate::media::{MediaFactory, MediaLoad, PlayOutcome, PlaybackView};
use crate::navigation::{step_index, Direction};
use crate::notify::{NotificationLevel, NotificationSink};
use crate::registry::{LoadTicket, ResourceHandle, ResourceKind, ResourceRegistry};
use crate::renderer::{self, PreviewSurface};
use crate::session::{ModalSession, SessionState};
use app_fs::{DownloadOutcome, ExternalActions};

/// Window-level display mode
pub trait DisplayControl: Send {
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), AppError>;
}

/// Why the modal was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    CloseControl,
    Overlay,
    Escape,
    /// Resource acquisition failed
    Failure,
}

type TransitionHook = Box<dyn FnMut(SessionState, SessionState) + Send>;

pub struct ModalController {
    session: Option<ModalSession>,
    media: Box<dyn MediaFactory>,
    notifier: Box<dyn NotificationSink>,
    actions: Box<dyn ExternalActions>,
    display: Box<dyn DisplayControl>,
    viewer: ViewerConfig,
    engine: EngineSettings,
    mount: MountPoint,
    hooks: Vec<TransitionHook>,
}

impl ModalController {
    pub fn new(
        media: Box<dyn MediaFactory>,
        notifier: Box<dyn NotificationSink>,
        actions: Box<dyn ExternalActions>,
        display: Box<dyn DisplayControl>,
    ) -> Self {
        Self {
            session: None,
            media,
            notifier,
            actions,
            display,
            viewer: ViewerConfig::default(),
            engine: EngineSettings::default(),
            mount: MountPoint::default(),
            hooks: Vec::new(),
        }
    }

    pub fn with_viewer_config(mut self, viewer: ViewerConfig) -> Self {
        self.viewer = viewer;
        self
    }

    pub fn with_engine_settings(mut self, engine: EngineSettings) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_mount_point(mut self, mount: MountPoint) -> Self {
        self.mount = mount;
        self
    }

    /// Register a callback fired on every state change
    pub fn on_transition(&mut self, hook: impl FnMut(SessionState, SessionState) + Send + 'static) {
        self.hooks.push(Box::new(hook));
    }

    // ========================================
    // Queries
    // ========================================

    pub fn state(&self) -> SessionState {
        self.session.as_ref().map(|s| s.state).unwrap_or_default()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    pub fn session(&self) -> Option<&ModalSession> {
        self.session.as_ref()
    }

    pub fn current_item(&self) -> Option<&CatalogItem> {
        self.session.as_ref().and_then(|s| s.current_item())
    }

    /// Ticket of the resource being loaded or shown
    pub fn resource_ticket(&self) -> Option<LoadTicket> {
        self.session.as_ref().and_then(|s| s.resources.ticket())
    }

    pub fn surface(&self) -> Option<PreviewSurface> {
        let session = self.session.as_ref()?;
        let item = session.current_item()?;
        Some(renderer::render(item, &session.render_context()))
    }

    // ========================================
    // Open / navigate / close
    // ========================================

    /// Open the preview on item `id` of `category`
    pub fn open(&mut self, catalog: &Catalog, category: Category, id: ItemId) -> Result<(), AppError> {
        let Some((index, _)) = catalog.find(category, id) else {
            let err = AppError::ItemNotFound { category, id };
            self.report(&err);
            return Err(err);
        };

        self.open_at(category, catalog.items_by_category(category).to_vec(), index)
    }

    /// Open the preview on `items[index]`; `items` becomes the navigation snapshot
    pub fn open_at(&mut self, category: Category, items: Vec<CatalogItem>, index: usize) -> Result<(), AppError> {
        if items.is_empty() {
            let err = AppError::EmptyCategory(category);
            self.report(&err);
            return Err(err);
        }
        if index >= items.len() {
            let err = AppError::IndexOutOfRange {
                category,
                index,
                len: items.len(),
            };
            self.report(&err);
            return Err(err);
        }

        let bounds = self.viewer.zoom_bounds();
        let session = self.session.get_or_insert_with(|| ModalSession::new(bounds));
        session.resources.release();
        session.bump_generation();
        session.items_snapshot = items;
        session.active_category = Some(category);
        session.active_index = index;
        session.reset_item_state();

        tracing::info!(
            %category,
            index,
            title = session.items_snapshot[index].title(),
            generation = session.generation(),
            "Preview opened"
        );

        self.set_state(SessionState::OpenIdle);
        self.enter_item();
        Ok(())
    }

    /// Move to the neighbouring item, wrapping at both ends.
    ///
    /// Returns false when nothing changed (closed, or a single-item category).
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let Some(session) = self.session.as_mut().filter(|s| s.state.is_open()) else {
            return false;
        };
        let Some(next) = step_index(session.active_index, session.items_snapshot.len(), direction) else {
            return false;
        };

        session.resources.release();
        session.bump_generation();
        session.active_index = next;
        session.reset_item_state();

        tracing::debug!(?direction, index = next, generation = session.generation(), "Preview navigated");

        self.set_state(SessionState::OpenIdle);
        self.enter_item();
        true
    }

    pub fn next(&mut self) -> bool {
        self.navigate(Direction::Next)
    }

    pub fn prev(&mut self) -> bool {
        self.navigate(Direction::Prev)
    }

    /// Close the preview. Safe to call in any state.
    pub fn close(&mut self, reason: CloseReason) {
        let Some(session) = self.session.as_mut().filter(|s| s.state.is_open()) else {
            return;
        };

        let prev = session.state;
        let was_fullscreen = session.fullscreen;
        session.reset();

        if was_fullscreen {
            if let Err(e) = self.display.set_fullscreen(false) {
                tracing::warn!("Failed to leave fullscreen on close: {}", e);
            }
        }

        tracing::info!(?reason, "Preview closed");
        self.fire(prev, SessionState::Closed);
    }

    /// Mount the per-item resource, if the item needs one immediately
    fn enter_item(&mut self) {
        let media_url = match self.current_item() {
            Some(CatalogItem::Video(video)) => video.media_url.clone(),
            _ => return,
        };
        self.mount_video(&media_url);
    }

    fn mount_video(&mut self, media_url: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let generation = session.generation();
        let media = &mut self.media;
        let acquired = session.resources.acquire(ResourceKind::Video, generation, || {
            media.create(media_url).map(ResourceHandle::Video)
        });

        let loaded = acquired.and_then(|_| match session.resources.media_mut() {
            Some(element) => {
                element.set_muted(self.viewer.start_muted);
                element.load()
            }
            None => Err(AppError::MediaLoad("video element missing".to_string())),
        });

        match loaded {
            Ok(MediaLoad::FirstFrame) => {
                self.sync_playback();
                self.set_state(SessionState::OpenActive);
                self.autoplay();
            }
            Ok(MediaLoad::Buffering) => {
                self.sync_playback();
                self.set_state(SessionState::OpenLoading);
            }
            Err(e) => {
                tracing::warn!(url = media_url, "Video mount failed: {}", e);
                self.report(&e);
                self.close(CloseReason::Failure);
            }
        }
    }

    // ========================================
    // Asynchronous resource results
    // ========================================

    /// Start instantiating the game engine for the open game.
    ///
    /// Only a playable game in `OpenIdle` starts a load; everything else is a no-op.
    pub fn start_heavy_load(&mut self) -> Option<EngineLoadRequest> {
        let session = self.session.as_mut()?;
        if session.state != SessionState::OpenIdle {
            return None;
        }

        let game = match session.current_item()? {
            CatalogItem::Game(game) => game.clone(),
            _ => return None,
        };

        if game.display_status == DisplayStatus::ComingSoon {
            self.notifier
                .notify(&format!("{} is coming soon", game.title), NotificationLevel::Info);
            return None;
        }

        let generation = session.generation();
        let ticket = match session.resources.reserve(ResourceKind::Engine, generation) {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::warn!("Engine load not started: {}", e);
                return None;
            }
        };
        session.load_progress = 0.0;

        let config = EngineConfig::from_asset_ref(&game.engine_asset_ref, &game.title, &self.engine);
        tracing::info!(?ticket, game = %game.title, "Engine load started");

        self.set_state(SessionState::OpenLoading);
        Some(EngineLoadRequest {
            ticket,
            mount: self.mount.clone(),
            config,
        })
    }

    pub fn play_game(&mut self) -> Option<EngineLoadRequest> {
        self.start_heavy_load()
    }

    /// Record load progress; ignored unless `ticket` is the pending load
    pub fn load_progress(&mut self, ticket: LoadTicket, progress: f32) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state != SessionState::OpenLoading || !session.resources.is_pending(ticket) {
            return;
        }

        let progress = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };
        session.load_progress = session.load_progress.max(progress);
    }

    /// A resource finished loading. Stale results are disposed untouched.
    pub fn resource_ready(&mut self, ticket: LoadTicket, handle: ResourceHandle) {
        let stale = match self.session.as_mut() {
            Some(session) if session.state == SessionState::OpenLoading => {
                match session.resources.fulfill(ticket, handle) {
                    Ok(()) => {
                        session.load_progress = 1.0;
                        None
                    }
                    Err(handle) => Some(handle),
                }
            }
            _ => Some(handle),
        };

        match stale {
            None => {
                tracing::info!(?ticket, "Resource ready");
                self.set_state(SessionState::OpenActive);
            }
            Some(handle) => {
                tracing::debug!(?ticket, "Stale resource result discarded");
                ResourceRegistry::dispose(handle);
            }
        }
    }

    /// A resource failed to load; the modal closes with an error
    pub fn resource_failed(&mut self, ticket: LoadTicket, error: AppError) {
        let current = self
            .session
            .as_mut()
            .map(|s| s.resources.abandon(ticket))
            .unwrap_or(false);

        if !current {
            tracing::debug!(?ticket, "Stale load failure ignored: {}", error);
            return;
        }

        tracing::warn!(?ticket, "Resource load failed: {}", error);
        self.report(&error);
        self.close(CloseReason::Failure);
    }

    /// Apply one event from the engine loader
    pub fn handle_load_event(&mut self, event: LoadEvent) {
        let LoadEvent { ticket, kind } = event;
        match kind {
            LoadEventKind::Progress(p) => self.load_progress(ticket, p),
            LoadEventKind::Ready(handle) => self.resource_ready(ticket, handle),
            LoadEventKind::Failed(e) => self.resource_failed(ticket, AppError::EngineLoad(e.to_string())),
        }
    }

    /// The buffering video produced its first frame
    pub fn media_ready(&mut self, ticket: LoadTicket) {
        let current = self.session.as_ref().is_some_and(|s| {
            s.state == SessionState::OpenLoading && ticket.kind == ResourceKind::Video && s.resources.is_current(ticket)
        });
        if !current {
            tracing::debug!(?ticket, "Stale media readiness ignored");
            return;
        }

        self.set_state(SessionState::OpenActive);
        self.autoplay();
    }

    pub fn media_failed(&mut self, ticket: LoadTicket, error: AppError) {
        let current = self
            .session
            .as_ref()
            .is_some_and(|s| s.state.is_open() && s.resources.is_current(ticket));
        if !current {
            tracing::debug!(?ticket, "Stale media failure ignored: {}", error);
            return;
        }

        self.report(&error);
        self.close(CloseReason::Failure);
    }

    // ========================================
    // Surface actions
    // ========================================

    fn photo_session(&mut self) -> Option<&mut ModalSession> {
        self.session
            .as_mut()
            .filter(|s| matches!(s.current_item(), Some(CatalogItem::Photo(_))))
    }

    pub fn zoom_in(&mut self) {
        if let Some(session) = self.photo_session() {
            session.zoom.zoom_in();
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(session) = self.photo_session() {
            session.zoom.zoom_out();
        }
    }

    pub fn zoom_reset(&mut self) {
        if let Some(session) = self.photo_session() {
            session.zoom.reset();
        }
    }

    fn autoplay(&mut self) {
        if self.viewer.autoplay_video {
            self.play_video();
        }
    }

    fn play_video(&mut self) {
        let Some(element) = self.session.as_mut().and_then(|s| s.resources.media_mut()) else {
            return;
        };

        match element.play() {
            PlayOutcome::Playing => {
                self.set_needs_gesture(false);
            }
            PlayOutcome::Blocked => {
                tracing::debug!("Autoplay blocked, waiting for user gesture");
                self.set_needs_gesture(true);
                self.notifier.notify("Click play to start the video", NotificationLevel::Info);
            }
        }
    }

    fn set_needs_gesture(&mut self, needs: bool) {
        if let Some(session) = self.session.as_mut() {
            session.playback.needs_user_gesture = needs;
        }
        self.sync_playback();
    }

    fn sync_playback(&mut self) {
        if let Some(session) = self.session.as_mut() {
            let needs = session.playback.needs_user_gesture;
            if let Some(element) = session.resources.media() {
                session.playback = PlaybackView::of(element, needs);
            }
        }
    }

    pub fn toggle_play(&mut self) {
        let paused = match self.session.as_ref().filter(|s| s.state == SessionState::OpenActive) {
            Some(session) => match session.resources.media() {
                Some(element) => element.is_paused(),
                None => return,
            },
            None => return,
        };

        if paused {
            self.play_video();
        } else if let Some(element) = self.session.as_mut().and_then(|s| s.resources.media_mut()) {
            element.pause();
            self.sync_playback();
        }
    }

    pub fn toggle_mute(&mut self) {
        if let Some(element) = self.session.as_mut().and_then(|s| s.resources.media_mut()) {
            let muted = element.is_muted();
            element.set_muted(!muted);
            self.sync_playback();
        }
    }

    /// Save the current photo or video
    pub fn download(&mut self) {
        let Some(item) = self.current_item() else {
            return;
        };
        let Some(url) = renderer::download_url(item).map(str::to_string) else {
            return;
        };
        let filename = renderer::download_filename(item);

        match self.actions.download(&url, &filename) {
            Ok(DownloadOutcome::Saved(path)) => {
                tracing::info!("Downloaded {} to {:?}", url, path);
                self.notifier
                    .notify(&format!("Saved {}", filename), NotificationLevel::Success);
            }
            Ok(DownloadOutcome::Delegated(url)) => {
                tracing::info!("Download of {} handed to the browser", url);
                self.notifier.notify("Download started", NotificationLevel::Success);
            }
            Err(e) => self.report(&AppError::from(e)),
        }
    }

    /// Open the current website in a new browsing context
    pub fn visit(&mut self) {
        let Some(CatalogItem::Website(site)) = self.current_item() else {
            return;
        };
        let url = site.target_url.clone();

        if let Err(e) = self.actions.open_url(&url) {
            self.report(&AppError::from(e));
        }
    }

    /// Copy the current website's address to the clipboard
    pub fn share(&mut self) {
        let Some(CatalogItem::Website(site)) = self.current_item() else {
            return;
        };
        let url = site.target_url.clone();

        match self.actions.copy_text(&url) {
            Ok(()) => self.notifier.notify("Link copied to clipboard", NotificationLevel::Success),
            Err(e) => self.report(&AppError::from(e)),
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        let Some(session) = self.session.as_mut().filter(|s| s.state.is_open()) else {
            return;
        };
        let target = !session.fullscreen;

        match self.display.set_fullscreen(target) {
            Ok(()) => {
                if let Some(session) = self.session.as_mut() {
                    session.fullscreen = target;
                }
            }
            Err(e) => self.report(&e),
        }
    }

    /// Run a command; returns an engine load request when the command starts one
    pub fn execute(&mut self, catalog: &Catalog, cmd: &Command) -> Option<EngineLoadRequest> {
        let id = cmd.id.as_str();
        if CommandId::requires_open_modal(id) && !self.is_open() {
            tracing::trace!("Command {} ignored, preview closed", id);
            return None;
        }

        match id {
            CommandId::MODAL_OPEN => {
                let category = cmd.params.string_value.as_deref().and_then(Category::parse);
                let item = cmd.params.int_value.and_then(|v| u32::try_from(v).ok());
                match (category, item) {
                    (Some(category), Some(id)) => {
                        let _ = self.open(catalog, category, ItemId(id));
                    }
                    _ => tracing::warn!("Malformed open command: {:?}", cmd.params),
                }
            }
            CommandId::MODAL_CLOSE => self.close(CloseReason::Escape),
            CommandId::MODAL_NEXT => {
                self.navigate(Direction::Next);
            }
            CommandId::MODAL_PREV => {
                self.navigate(Direction::Prev);
            }
            CommandId::VIEW_ZOOM_IN => self.zoom_in(),
            CommandId::VIEW_ZOOM_OUT => self.zoom_out(),
            CommandId::VIEW_ZOOM_RESET => self.zoom_reset(),
            CommandId::VIEW_TOGGLE_FULLSCREEN => self.toggle_fullscreen(),
            CommandId::MEDIA_TOGGLE_PLAY => self.toggle_play(),
            CommandId::MEDIA_TOGGLE_MUTE => self.toggle_mute(),
            CommandId::MEDIA_DOWNLOAD => self.download(),
            CommandId::GAME_PLAY => return self.play_game(),
            CommandId::WEBSITE_VISIT => self.visit(),
            CommandId::WEBSITE_SHARE => self.share(),
            other => tracing::warn!("Unknown command: {}", other),
        }
        None
    }

    // ========================================
    // Internals
    // ========================================

    fn set_state(&mut self, next: SessionState) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let prev = session.state;
        if prev == next {
            return;
        }
        session.state = next;
        self.fire(prev, next);
    }

    fn fire(&mut self, prev: SessionState, next: SessionState) {
        tracing::debug!(%prev, %next, "Modal transition");
        for hook in &mut self.hooks {
            hook(prev, next);
        }
    }

    fn report(&mut self, error: &AppError) {
        self.notifier.notify(&error.user_message(), NotificationLevel::Error);
    }
}

impl Drop for ModalController {
    fn drop(&mut self) {
        self.close(CloseReason::CloseControl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, ActionCall, FakeActions, FakeDisplay, FakeEngineHandle, FakeFactory, SAMPLE_CATALOG};
    use parking_lot::Mutex;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn catalog() -> Catalog {
        Catalog::from_json(SAMPLE_CATALOG).unwrap()
    }

    fn record_transitions(controller: &mut ModalController) -> Arc<Mutex<Vec<SessionState>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        controller.on_transition(move |_, next| sink.lock().push(next));
        seen
    }

    #[test]
    fn test_open_photo_is_idle() {
        let (mut controller, _) = testing::controller();
        controller.open(&catalog(), Category::Photos, ItemId(2)).unwrap();

        assert_eq!(controller.state(), SessionState::OpenIdle);
        let session = controller.session().unwrap();
        assert_eq!(session.active_index, 1);
        assert_eq!(session.active_category, Some(Category::Photos));
        assert_eq!(controller.surface().unwrap().title, "The Peacock");
    }

    #[test]
    fn test_open_unknown_item_leaves_session() {
        let (mut controller, doubles) = testing::controller();
        let catalog = catalog();
        controller.open(&catalog, Category::Photos, ItemId(1)).unwrap();

        let err = controller.open(&catalog, Category::Photos, ItemId(42)).unwrap_err();
        assert!(matches!(err, AppError::ItemNotFound { .. }));
        assert_eq!(controller.state(), SessionState::OpenIdle);
        assert_eq!(controller.current_item().unwrap().title(), "The Heart Of Love");
        assert_eq!(doubles.notes.count(NotificationLevel::Error), 1);
    }

    #[test]
    fn test_open_empty_category() {
        let (mut controller, doubles) = testing::controller();
        let err = controller.open_at(Category::Games, Vec::new(), 0).unwrap_err();

        assert!(matches!(err, AppError::EmptyCategory(Category::Games)));
        assert_eq!(controller.state(), SessionState::Closed);
        assert_eq!(doubles.notes.count(NotificationLevel::Error), 1);
    }

    #[test]
    fn test_navigation_wraps() {
        let (mut controller, _) = testing::controller();
        controller.open(&catalog(), Category::Games, ItemId(1)).unwrap();

        assert!(controller.prev());
        assert_eq!(controller.current_item().unwrap().title(), "Deep Orbit");
        assert!(controller.next());
        assert_eq!(controller.current_item().unwrap().title(), "Sky Surfers");

        for _ in 0..3 {
            controller.next();
        }
        assert_eq!(controller.session().unwrap().active_index, 0);
    }

    #[test]
    fn test_navigate_single_item_is_noop() {
        let (mut controller, _) = testing::controller();
        let items = catalog().items_by_category(Category::Photos)[..1].to_vec();
        controller.open_at(Category::Photos, items, 0).unwrap();

        let generation = controller.session().unwrap().generation();
        assert!(!controller.next());
        assert_eq!(controller.session().unwrap().generation(), generation);
    }

    #[test]
    fn test_navigate_when_closed_is_noop() {
        let (mut controller, _) = testing::controller();
        assert!(!controller.next());
        assert_eq!(controller.state(), SessionState::Closed);
    }

    #[test]
    fn test_photo_and_website_never_load() {
        let (mut controller, _) = testing::controller();
        let seen = record_transitions(&mut controller);
        let catalog = catalog();

        controller.open(&catalog, Category::Photos, ItemId(1)).unwrap();
        assert!(controller.start_heavy_load().is_none());
        controller.next();
        controller.next();
        controller.open(&catalog, Category::Websites, ItemId(2)).unwrap();
        assert!(controller.play_game().is_none());
        controller.prev();
        controller.close(CloseReason::CloseControl);

        assert!(!seen.lock().contains(&SessionState::OpenLoading));
        assert!(!seen.lock().contains(&SessionState::OpenActive));
    }

    #[test]
    fn test_zoom_bounds_and_reset_on_navigate() {
        let (mut controller, _) = testing::controller();
        controller.open(&catalog(), Category::Photos, ItemId(1)).unwrap();

        for _ in 0..12 {
            controller.zoom_in();
        }
        assert_eq!(controller.session().unwrap().zoom.scale(), 3.0);
        controller.zoom_out();
        assert_eq!(controller.session().unwrap().zoom.scale(), 2.75);

        controller.next();
        assert_eq!(controller.session().unwrap().zoom.scale(), 1.0);

        for _ in 0..5 {
            controller.zoom_out();
        }
        assert_eq!(controller.session().unwrap().zoom.scale(), 1.0);
    }

    #[test]
    fn test_zoom_ignored_for_non_photos() {
        let (mut controller, _) = testing::controller();
        controller.open(&catalog(), Category::Websites, ItemId(1)).unwrap();
        controller.zoom_in();
        assert_eq!(controller.session().unwrap().zoom.scale(), 1.0);
    }

    #[test]
    fn test_video_navigation_pauses_previous() {
        let (mut controller, doubles) = testing::controller();
        controller.open(&catalog(), Category::Videos, ItemId(1)).unwrap();

        assert_eq!(controller.state(), SessionState::OpenActive);
        let v1 = doubles.media.probe(0);
        assert!(!v1.lock().paused);

        controller.next();

        assert_eq!(controller.state(), SessionState::OpenActive);
        assert!(v1.lock().paused);
        assert!(v1.lock().source.is_none());
        assert_eq!(doubles.media.count(), 2);
        assert_eq!(doubles.media.created.lock()[1].0, "/videos/video2.mp4");
        assert!(!doubles.media.probe(1).lock().paused);
    }

    #[test]
    fn test_buffering_video_waits_for_first_frame() {
        let (mut controller, doubles) =
            testing::controller_with(FakeFactory::new().buffering(), FakeActions::default(), FakeDisplay::default());
        controller.open(&catalog(), Category::Videos, ItemId(2)).unwrap();

        assert_eq!(controller.state(), SessionState::OpenLoading);
        let ticket = controller.resource_ticket().unwrap();

        controller.media_ready(ticket);
        assert_eq!(controller.state(), SessionState::OpenActive);
        assert!(!doubles.media.probe(0).lock().paused);
    }

    #[test]
    fn test_stale_media_ready_ignored() {
        let (mut controller, doubles) =
            testing::controller_with(FakeFactory::new().buffering(), FakeActions::default(), FakeDisplay::default());
        controller.open(&catalog(), Category::Videos, ItemId(1)).unwrap();
        let old = controller.resource_ticket().unwrap();

        controller.next();
        controller.media_ready(old);

        assert_eq!(controller.state(), SessionState::OpenLoading);
        assert!(doubles.media.probe(1).lock().paused);
    }

    #[test]
    fn test_blocked_autoplay_needs_gesture() {
        let (mut controller, doubles) = testing::controller_with(
            FakeFactory::new().blocking_autoplay(),
            FakeActions::default(),
            FakeDisplay::default(),
        );
        controller.open(&catalog(), Category::Videos, ItemId(1)).unwrap();

        assert_eq!(controller.state(), SessionState::OpenActive);
        assert!(controller.session().unwrap().playback.needs_user_gesture);
        assert_eq!(doubles.notes.last().unwrap().1, NotificationLevel::Info);
        assert_eq!(doubles.notes.count(NotificationLevel::Error), 0);
    }

    #[test]
    fn test_video_create_failure_closes() {
        let (mut controller, doubles) =
            testing::controller_with(FakeFactory::new().failing(), FakeActions::default(), FakeDisplay::default());
        controller.open(&catalog(), Category::Videos, ItemId(1)).unwrap();

        assert_eq!(controller.state(), SessionState::Closed);
        assert_eq!(doubles.notes.count(NotificationLevel::Error), 1);
    }

    #[test]
    fn test_toggle_play_and_mute() {
        let (mut controller, doubles) = testing::controller();
        controller.open(&catalog(), Category::Videos, ItemId(1)).unwrap();
        let probe = doubles.media.probe(0);

        controller.toggle_play();
        assert!(probe.lock().paused);
        assert!(controller.session().unwrap().playback.paused);

        controller.toggle_play();
        assert!(!probe.lock().paused);

        controller.toggle_mute();
        assert!(probe.lock().muted);
        assert!(controller.session().unwrap().playback.muted);
    }

    #[test]
    fn test_game_load_scenario() {
        let (mut controller, _) = testing::controller();
        let seen = record_transitions(&mut controller);
        controller.open(&catalog(), Category::Games, ItemId(1)).unwrap();
        assert_eq!(controller.state(), SessionState::OpenIdle);

        let request = controller.start_heavy_load().unwrap();
        assert_eq!(controller.state(), SessionState::OpenLoading);
        assert_eq!(request.mount.id(), "game-canvas");
        assert_eq!(request.config.code_url, "games/sky_surfers/Build/sky_surfers.wasm");

        // second request while loading is ignored
        assert!(controller.start_heavy_load().is_none());

        for p in [0.0, 0.25, 0.1, 0.75, 1.0] {
            controller.load_progress(request.ticket, p);
        }
        assert_eq!(controller.session().unwrap().load_progress, 1.0);

        let handle = FakeEngineHandle::new();
        let shutdowns = handle.shutdowns();
        controller.resource_ready(request.ticket, ResourceHandle::Engine(Box::new(handle)));
        assert_eq!(controller.state(), SessionState::OpenActive);

        controller.close(CloseReason::Escape);
        controller.close(CloseReason::Escape);
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(
            *seen.lock(),
            vec![
                SessionState::OpenIdle,
                SessionState::OpenLoading,
                SessionState::OpenActive,
                SessionState::Closed
            ]
        );
    }

    #[test]
    fn test_coming_soon_game_does_not_load() {
        let (mut controller, doubles) = testing::controller();
        controller.open(&catalog(), Category::Games, ItemId(3)).unwrap();

        assert!(controller.play_game().is_none());
        assert_eq!(controller.state(), SessionState::OpenIdle);
        assert_eq!(doubles.notes.last().unwrap().1, NotificationLevel::Info);
    }

    #[test]
    fn test_stale_engine_result_after_navigate() {
        let (mut controller, _) = testing::controller();
        controller.open(&catalog(), Category::Games, ItemId(1)).unwrap();
        let first = controller.start_heavy_load().unwrap();

        controller.next();
        assert_eq!(controller.state(), SessionState::OpenIdle);
        let second = controller.start_heavy_load().unwrap();

        let late = FakeEngineHandle::new();
        let late_shutdowns = late.shutdowns();
        controller.load_progress(first.ticket, 0.9);
        controller.resource_ready(first.ticket, ResourceHandle::Engine(Box::new(late)));

        assert_eq!(late_shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(controller.state(), SessionState::OpenLoading);
        assert_eq!(controller.session().unwrap().load_progress, 0.0);
        assert_eq!(controller.current_item().unwrap().title(), "Neon Drift");

        let current = FakeEngineHandle::new();
        controller.resource_ready(second.ticket, ResourceHandle::Engine(Box::new(current)));
        assert_eq!(controller.state(), SessionState::OpenActive);
    }

    #[test]
    fn test_stale_engine_result_after_close() {
        let (mut controller, doubles) = testing::controller();
        controller.open(&catalog(), Category::Games, ItemId(2)).unwrap();
        let request = controller.start_heavy_load().unwrap();
        controller.close(CloseReason::Overlay);

        let late = FakeEngineHandle::new();
        let shutdowns = late.shutdowns();
        controller.resource_ready(request.ticket, ResourceHandle::Engine(Box::new(late)));
        controller.resource_failed(request.ticket, AppError::EngineLoad("late".into()));

        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(controller.state(), SessionState::Closed);
        assert_eq!(doubles.notes.count(NotificationLevel::Error), 0);
    }

    #[test]
    fn test_engine_failure_closes_with_error() {
        let (mut controller, doubles) = testing::controller();
        controller.open(&catalog(), Category::Games, ItemId(1)).unwrap();
        let request = controller.start_heavy_load().unwrap();

        controller.handle_load_event(LoadEvent {
            ticket: request.ticket,
            kind: LoadEventKind::Failed(crate::engine::EngineError::Unavailable),
        });

        assert_eq!(controller.state(), SessionState::Closed);
        let (message, level) = doubles.notes.last().unwrap();
        assert_eq!(level, NotificationLevel::Error);
        assert!(message.contains("Game engine not initialized"));
    }

    #[test]
    fn test_close_cleans_up_from_every_state() {
        let catalog = catalog();

        // idle
        let (mut controller, _) = testing::controller();
        controller.open(&catalog, Category::Photos, ItemId(1)).unwrap();
        controller.close(CloseReason::CloseControl);
        assert_eq!(controller.state(), SessionState::Closed);
        assert!(controller.surface().is_none());

        // loading (engine pending)
        let (mut controller, _) = testing::controller();
        controller.open(&catalog, Category::Games, ItemId(1)).unwrap();
        controller.start_heavy_load().unwrap();
        controller.close(CloseReason::Escape);
        assert!(controller.session().unwrap().resources.is_empty());

        // loading (video buffering)
        let (mut controller, doubles) =
            testing::controller_with(FakeFactory::new().buffering(), FakeActions::default(), FakeDisplay::default());
        controller.open(&catalog, Category::Videos, ItemId(1)).unwrap();
        controller.close(CloseReason::Overlay);
        assert!(doubles.media.probe(0).lock().source.is_none());

        // active video
        let (mut controller, doubles) = testing::controller();
        controller.open(&catalog, Category::Videos, ItemId(2)).unwrap();
        controller.close(CloseReason::CloseControl);
        let probe = doubles.media.probe(0);
        assert!(probe.lock().paused);
        assert_eq!(probe.lock().detaches, 1);

        // closed
        controller.close(CloseReason::CloseControl);
        assert_eq!(probe.lock().detaches, 1);
        assert_eq!(controller.state(), SessionState::Closed);
    }

    #[test]
    fn test_generation_survives_close() {
        let (mut controller, _) = testing::controller();
        let catalog = catalog();
        controller.open(&catalog, Category::Photos, ItemId(1)).unwrap();
        controller.next();
        let before = controller.session().unwrap().generation();

        controller.close(CloseReason::CloseControl);
        controller.open(&catalog, Category::Photos, ItemId(1)).unwrap();
        assert!(controller.session().unwrap().generation() > before);
    }

    #[test]
    fn test_fullscreen_exits_on_close() {
        let (mut controller, doubles) = testing::controller();
        controller.open(&catalog(), Category::Photos, ItemId(1)).unwrap();

        controller.toggle_fullscreen();
        assert!(controller.session().unwrap().fullscreen);
        controller.close(CloseReason::Escape);

        assert_eq!(*doubles.display.requests.lock(), vec![true, false]);
    }

    #[test]
    fn test_fullscreen_failure_reports() {
        let display = FakeDisplay {
            fail: true,
            ..FakeDisplay::default()
        };
        let (mut controller, doubles) = testing::controller_with(FakeFactory::new(), FakeActions::default(), display);
        controller.open(&catalog(), Category::Photos, ItemId(1)).unwrap();

        controller.toggle_fullscreen();
        assert!(!controller.session().unwrap().fullscreen);
        assert_eq!(doubles.notes.count(NotificationLevel::Error), 1);
    }

    #[test]
    fn test_download_visit_share() {
        let (mut controller, doubles) = testing::controller();
        let catalog = catalog();

        controller.open(&catalog, Category::Photos, ItemId(2)).unwrap();
        controller.download();
        controller.open(&catalog, Category::Websites, ItemId(1)).unwrap();
        controller.download();
        controller.visit();
        controller.share();

        assert_eq!(
            *doubles.actions.calls.lock(),
            vec![
                ActionCall::Download {
                    url: "/images/photos/peacock.jpg".into(),
                    filename: "The Peacock.jpg".into(),
                },
                ActionCall::OpenUrl("https://example.com/reelspot/".into()),
                ActionCall::CopyText("https://example.com/reelspot/".into()),
            ]
        );
        assert_eq!(doubles.notes.count(NotificationLevel::Success), 2);
    }

    #[test]
    fn test_action_failure_keeps_session() {
        let (mut controller, doubles) =
            testing::controller_with(FakeFactory::new(), FakeActions::failing(), FakeDisplay::default());
        controller.open(&catalog(), Category::Photos, ItemId(1)).unwrap();

        controller.download();
        assert_eq!(controller.state(), SessionState::OpenIdle);
        assert_eq!(doubles.notes.count(NotificationLevel::Error), 1);
    }

    #[test]
    fn test_execute_commands() {
        let (mut controller, _) = testing::controller();
        let catalog = catalog();

        // navigation ignored while closed
        assert!(controller.execute(&catalog, &Command::new(CommandId::MODAL_NEXT)).is_none());
        assert_eq!(controller.state(), SessionState::Closed);

        controller.execute(&catalog, &Command::open("games", 2));
        assert_eq!(controller.current_item().unwrap().title(), "Neon Drift");

        let request = controller.execute(&catalog, &Command::new(CommandId::GAME_PLAY));
        assert!(request.is_some());
        assert_eq!(controller.state(), SessionState::OpenLoading);

        controller.execute(&catalog, &Command::new(CommandId::MODAL_PREV));
        assert_eq!(controller.current_item().unwrap().title(), "Sky Surfers");

        controller.execute(&catalog, &Command::new(CommandId::MODAL_CLOSE));
        assert_eq!(controller.state(), SessionState::Closed);
    }

    #[test]
    fn test_surface_follows_session() {
        let (mut controller, _) = testing::controller();
        assert!(controller.surface().is_none());

        controller.open(&catalog(), Category::Games, ItemId(1)).unwrap();
        let surface = controller.surface().unwrap();
        assert!(surface.visibility().game_mount);
        assert_eq!(surface.position, Some((0, 3)));

        controller.start_heavy_load().unwrap();
        let surface = controller.surface().unwrap();
        assert!(matches!(
            surface.body,
            crate::renderer::SurfaceBody::Game {
                phase: crate::renderer::GamePhase::Loading { .. },
                ..
            }
        ));
    }
}
