//! Playable media element boundary
//!
//! The controller never talks to a concrete player. It drives anything
//! implementing [`MediaElement`], created through a [`MediaFactory`].

use crate::error::AppError;

/// Result of loading a media source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaLoad {
    /// First frame is available right away
    FirstFrame,
    /// Data is still arriving; readiness is reported later
    Buffering,
}

/// Result of a play request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Playing,
    /// Playback refused until the user interacts (autoplay policy)
    Blocked,
}

/// A playable video element
pub trait MediaElement: Send {
    /// Start loading the assigned source
    fn load(&mut self) -> Result<MediaLoad, AppError>;

    fn play(&mut self) -> PlayOutcome;

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    fn is_muted(&self) -> bool;

    /// Drop the source so the element stops fetching data
    fn detach_source(&mut self);

    fn source(&self) -> Option<&str>;
}

/// Creates media elements for a source URL
pub trait MediaFactory: Send {
    fn create(&mut self, media_url: &str) -> Result<Box<dyn MediaElement>, AppError>;
}

/// Snapshot of the playback controls shown on a video surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackView {
    pub paused: bool,
    pub muted: bool,
    /// Autoplay was refused; the surface shows a click-to-play affordance
    pub needs_user_gesture: bool,
}

impl Default for PlaybackView {
    fn default() -> Self {
        Self {
            paused: true,
            muted: false,
            needs_user_gesture: false,
        }
    }
}

impl PlaybackView {
    /// Read the current state of an element
    pub fn of(element: &dyn MediaElement, needs_user_gesture: bool) -> Self {
        Self {
            paused: element.is_paused(),
            muted: element.is_muted(),
            needs_user_gesture,
        }
    }
}
