//! Modal session state

use crate::catalog::{CatalogItem, Category};
use crate::media::PlaybackView;
use crate::registry::ResourceRegistry;
use crate::renderer::{GamePhase, RenderContext, ZoomState};
use std::fmt;

/// Lifecycle state of the preview modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Closed,
    /// Open, showing the item; no heavyweight resource loading
    OpenIdle,
    /// Open, a video buffers or a game instantiates
    OpenLoading,
    /// Open, the item's resource is live
    OpenActive,
}

impl SessionState {
    pub fn is_open(self) -> bool {
        self != SessionState::Closed
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Closed => "closed",
            SessionState::OpenIdle => "idle",
            SessionState::OpenLoading => "loading",
            SessionState::OpenActive => "active",
        };
        f.write_str(name)
    }
}

/// The single live preview
pub struct ModalSession {
    pub state: SessionState,
    generation: u64,
    pub active_category: Option<Category>,
    pub active_index: usize,
    /// Copy of the category list taken at open time
    pub items_snapshot: Vec<CatalogItem>,
    pub zoom: ZoomState,
    pub playback: PlaybackView,
    pub load_progress: f32,
    pub fullscreen: bool,
    pub resources: ResourceRegistry,
    zoom_bounds: (f32, f32, f32),
}

impl ModalSession {
    pub fn new(zoom_bounds: (f32, f32, f32)) -> Self {
        let (min, max, step) = zoom_bounds;
        Self {
            state: SessionState::Closed,
            generation: 0,
            active_category: None,
            active_index: 0,
            items_snapshot: Vec::new(),
            zoom: ZoomState::new(min, max, step),
            playback: PlaybackView::default(),
            load_progress: 0.0,
            fullscreen: false,
            resources: ResourceRegistry::new(),
            zoom_bounds,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new generation; results tagged with older ones become stale
    pub fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn current_item(&self) -> Option<&CatalogItem> {
        if self.state.is_open() {
            self.items_snapshot.get(self.active_index)
        } else {
            None
        }
    }

    /// Clear per-item view state when a new item is shown
    pub fn reset_item_state(&mut self) {
        let (min, max, step) = self.zoom_bounds;
        self.zoom = ZoomState::new(min, max, step);
        self.playback = PlaybackView::default();
        self.load_progress = 0.0;
    }

    /// Return to the closed state. The generation counter survives.
    pub fn reset(&mut self) {
        self.resources.release();
        self.state = SessionState::Closed;
        self.active_category = None;
        self.active_index = 0;
        self.items_snapshot.clear();
        self.fullscreen = false;
        self.reset_item_state();
    }

    pub fn game_phase(&self) -> GamePhase {
        match self.state {
            SessionState::OpenLoading => GamePhase::Loading {
                progress: self.load_progress,
            },
            SessionState::OpenActive => GamePhase::Running,
            _ => GamePhase::Idle,
        }
    }

    pub fn render_context(&self) -> RenderContext {
        RenderContext {
            zoom: self.zoom.scale(),
            playback: self.playback,
            game_phase: self.game_phase(),
            position: self
                .state
                .is_open()
                .then_some((self.active_index, self.items_snapshot.len())),
        }
    }
}

impl fmt::Debug for ModalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalSession")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("active_category", &self.active_category)
            .field("active_index", &self.active_index)
            .field("items", &self.items_snapshot.len())
            .field("zoom", &self.zoom.scale())
            .field("load_progress", &self.load_progress)
            .field("fullscreen", &self.fullscreen)
            .field("resource", &self.resources.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_generation() {
        let mut session = ModalSession::new((1.0, 3.0, 0.25));
        session.bump_generation();
        session.bump_generation();
        session.state = SessionState::OpenIdle;
        session.active_index = 4;
        session.zoom.zoom_in();
        session.fullscreen = true;

        session.reset();

        assert_eq!(session.state, SessionState::Closed);
        assert_eq!(session.generation(), 2);
        assert_eq!(session.active_index, 0);
        assert_eq!(session.zoom.scale(), 1.0);
        assert!(!session.fullscreen);
        assert!(session.current_item().is_none());
    }

    #[test]
    fn test_game_phase() {
        let mut session = ModalSession::new((1.0, 3.0, 0.25));
        session.state = SessionState::OpenLoading;
        session.load_progress = 0.3;
        assert_eq!(session.game_phase(), GamePhase::Loading { progress: 0.3 });

        session.state = SessionState::OpenActive;
        assert_eq!(session.game_phase(), GamePhase::Running);
    }
}
