//! Command system for user actions

use serde::{Deserialize, Serialize};

/// Command identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Modal commands
    pub const MODAL_OPEN: &'static str = "modal.open";
    pub const MODAL_CLOSE: &'static str = "modal.close";
    pub const MODAL_NEXT: &'static str = "modal.next";
    pub const MODAL_PREV: &'static str = "modal.prev";

    // View commands
    pub const VIEW_ZOOM_IN: &'static str = "view.zoom_in";
    pub const VIEW_ZOOM_OUT: &'static str = "view.zoom_out";
    pub const VIEW_ZOOM_RESET: &'static str = "view.zoom_reset";
    pub const VIEW_TOGGLE_FULLSCREEN: &'static str = "view.toggle_fullscreen";

    // Media commands
    pub const MEDIA_TOGGLE_PLAY: &'static str = "media.toggle_play";
    pub const MEDIA_TOGGLE_MUTE: &'static str = "media.toggle_mute";
    pub const MEDIA_DOWNLOAD: &'static str = "media.download";

    // Game / website commands
    pub const GAME_PLAY: &'static str = "game.play";
    pub const WEBSITE_VISIT: &'static str = "website.visit";
    pub const WEBSITE_SHARE: &'static str = "website.share";

    // App commands
    pub const APP_EXIT: &'static str = "app.exit";

    /// Commands that only make sense while a preview is open
    pub fn requires_open_modal(id: &str) -> bool {
        !matches!(id, Self::MODAL_OPEN | Self::APP_EXIT)
    }
}

/// Command with optional parameters
#[derive(Debug, Clone)]
pub struct Command {
    pub id: CommandId,
    pub params: CommandParams,
}

/// Command parameters
#[derive(Debug, Clone, Default)]
pub struct CommandParams {
    pub int_value: Option<i64>,
    pub string_value: Option<String>,
}

impl Command {
    pub fn new(id: &str) -> Self {
        Self {
            id: CommandId::new(id),
            params: CommandParams::default(),
        }
    }

    pub fn with_int(mut self, value: i64) -> Self {
        self.params.int_value = Some(value);
        self
    }

    pub fn with_string(mut self, value: &str) -> Self {
        self.params.string_value = Some(value.to_string());
        self
    }

    /// `modal.open` for item `id` of `category`
    pub fn open(category: &str, id: u32) -> Self {
        Self::new(CommandId::MODAL_OPEN)
            .with_string(category)
            .with_int(i64::from(id))
    }

    pub fn is(&self, id: &str) -> bool {
        self.id.as_str() == id
    }
}
