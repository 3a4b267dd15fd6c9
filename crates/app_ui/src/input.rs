//! Input handling and keybinding resolution

use app_core::{Command, CommandId, Direction, SwipeTracker};
use std::collections::HashMap;
use winit::event::{ElementState, KeyEvent, MouseButton, Touch, TouchPhase};
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Input handler that maps keys, mouse buttons and swipes to commands
pub struct InputHandler {
    /// Key bindings: key string -> command IDs
    bindings: HashMap<String, Vec<String>>,

    /// Current modifier state
    modifiers: ModifiersState,

    /// Whether the preview modal is showing
    modal_open: bool,

    swipe: SwipeTracker,

    /// Finger being tracked for a swipe
    touch_id: Option<u64>,
}

impl InputHandler {
    /// Create a new input handler with bindings
    pub fn new(bindings: HashMap<String, Vec<String>>, swipe_threshold: f32) -> Self {
        // Invert the bindings map: command -> keys becomes key -> commands.
        // One key may drive several commands (Return plays a game or visits a site).
        let mut key_to_commands: HashMap<String, Vec<String>> = HashMap::new();

        for (command, keys) in bindings {
            for key in keys {
                key_to_commands
                    .entry(key.to_lowercase())
                    .or_default()
                    .push(command.clone());
            }
        }
        for commands in key_to_commands.values_mut() {
            commands.sort();
        }

        Self {
            bindings: key_to_commands,
            modifiers: ModifiersState::empty(),
            modal_open: false,
            swipe: SwipeTracker::new(swipe_threshold),
            touch_id: None,
        }
    }

    /// Update modifier state
    pub fn update_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    /// Track whether the modal is open; closing drops any half-finished swipe
    pub fn set_modal_open(&mut self, open: bool) {
        self.modal_open = open;
        if !open {
            self.swipe.cancel();
            self.touch_id = None;
        }
    }

    pub fn modal_open(&self) -> bool {
        self.modal_open
    }

    /// Handle a key event and return the corresponding commands
    pub fn handle_key(&self, event: &KeyEvent) -> Vec<Command> {
        if event.state != ElementState::Pressed {
            return Vec::new();
        }
        self.commands_for_key(&event.logical_key)
    }

    /// Resolve a logical key against the bindings
    pub fn commands_for_key(&self, key: &Key) -> Vec<Command> {
        let key_str = key_to_string(key);
        if key_str.is_empty() {
            return Vec::new();
        }
        let full_key = self.build_key_string(&key_str);

        tracing::debug!("Key pressed: {}", full_key);

        self.bindings
            .get(&full_key.to_lowercase())
            .map(|ids| {
                ids.iter()
                    .filter(|id| self.accepts(id))
                    .map(|id| Command::new(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Build a key string with modifiers
    fn build_key_string(&self, key: &str) -> String {
        let mut parts = Vec::new();

        if self.modifiers.control_key() {
            parts.push("Ctrl");
        }
        if self.modifiers.alt_key() {
            parts.push("Alt");
        }
        // Shift is already folded into character keys ("+" rather than "Shift+=")
        if self.modifiers.shift_key() && key.chars().count() > 1 {
            parts.push("Shift");
        }
        if self.modifiers.super_key() {
            parts.push("Super");
        }

        parts.push(key);
        parts.join("+")
    }

    fn accepts(&self, id: &str) -> bool {
        self.modal_open || !CommandId::requires_open_modal(id)
    }

    /// Handle mouse button
    pub fn handle_mouse_button(&self, button: MouseButton, state: ElementState) -> Option<Command> {
        if state != ElementState::Pressed || !self.modal_open {
            return None;
        }

        match button {
            MouseButton::Back => Some(Command::new(CommandId::MODAL_PREV)),
            MouseButton::Forward => Some(Command::new(CommandId::MODAL_NEXT)),
            _ => None,
        }
    }

    /// Handle a winit touch event
    pub fn handle_touch(&mut self, touch: &Touch) -> Option<Command> {
        self.touch(
            touch.id,
            touch.phase,
            touch.location.x as f32,
            touch.location.y as f32,
        )
    }

    /// Feed one touch sample; a completed swipe yields a navigation command
    pub fn touch(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) -> Option<Command> {
        if !self.modal_open {
            return None;
        }

        match phase {
            TouchPhase::Started => {
                // Only the first finger counts; a second one aborts the gesture
                if self.touch_id.is_none() {
                    self.touch_id = Some(id);
                    self.swipe.touch_start(x, y);
                } else {
                    self.swipe.cancel();
                }
                None
            }
            TouchPhase::Moved => None,
            TouchPhase::Ended => {
                if self.touch_id != Some(id) {
                    return None;
                }
                self.touch_id = None;
                self.swipe.touch_end(x, y).map(|direction| match direction {
                    Direction::Next => Command::new(CommandId::MODAL_NEXT),
                    Direction::Prev => Command::new(CommandId::MODAL_PREV),
                })
            }
            TouchPhase::Cancelled => {
                if self.touch_id == Some(id) {
                    self.touch_id = None;
                    self.swipe.cancel();
                }
                None
            }
        }
    }
}

/// Convert a logical key to a string
fn key_to_string(key: &Key) -> String {
    match key {
        Key::Named(named) => match named {
            NamedKey::Space => "Space".to_string(),
            NamedKey::Enter => "Return".to_string(),
            NamedKey::Tab => "Tab".to_string(),
            NamedKey::Escape => "Escape".to_string(),
            NamedKey::Backspace => "Backspace".to_string(),
            NamedKey::Delete => "Delete".to_string(),
            NamedKey::Home => "Home".to_string(),
            NamedKey::End => "End".to_string(),
            NamedKey::PageUp => "PageUp".to_string(),
            NamedKey::PageDown => "PageDown".to_string(),
            NamedKey::ArrowUp => "Up".to_string(),
            NamedKey::ArrowDown => "Down".to_string(),
            NamedKey::ArrowLeft => "Left".to_string(),
            NamedKey::ArrowRight => "Right".to_string(),
            NamedKey::F11 => "F11".to_string(),
            NamedKey::F12 => "F12".to_string(),
            _ => format!("{:?}", named),
        },
        Key::Character(c) => c.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_core::AppConfig;

    fn handler(open: bool) -> InputHandler {
        let mut handler = InputHandler::new(AppConfig::default().keybindings, 50.0);
        handler.set_modal_open(open);
        handler
    }

    fn ids(commands: Vec<Command>) -> Vec<String> {
        commands.into_iter().map(|c| c.id.0).collect()
    }

    #[test]
    fn test_arrows_navigate_when_open() {
        let handler = handler(true);
        assert_eq!(
            ids(handler.commands_for_key(&Key::Named(NamedKey::ArrowRight))),
            vec![CommandId::MODAL_NEXT]
        );
        assert_eq!(
            ids(handler.commands_for_key(&Key::Named(NamedKey::ArrowLeft))),
            vec![CommandId::MODAL_PREV]
        );
        assert_eq!(
            ids(handler.commands_for_key(&Key::Named(NamedKey::Escape))),
            vec![CommandId::MODAL_CLOSE]
        );
    }

    #[test]
    fn test_modal_keys_ignored_when_closed() {
        let handler = handler(false);
        assert!(handler.commands_for_key(&Key::Named(NamedKey::ArrowRight)).is_empty());
        assert!(handler.commands_for_key(&Key::Named(NamedKey::Escape)).is_empty());
        assert_eq!(
            ids(handler.commands_for_key(&Key::Character("q".into()))),
            vec![CommandId::APP_EXIT]
        );
    }

    #[test]
    fn test_shared_key_yields_every_command() {
        let handler = handler(true);
        assert_eq!(
            ids(handler.commands_for_key(&Key::Named(NamedKey::Enter))),
            vec![CommandId::GAME_PLAY, CommandId::WEBSITE_VISIT]
        );
    }

    #[test]
    fn test_shifted_character_keeps_its_symbol() {
        let mut handler = handler(true);
        handler.update_modifiers(ModifiersState::SHIFT);
        assert_eq!(
            ids(handler.commands_for_key(&Key::Character("+".into()))),
            vec![CommandId::VIEW_ZOOM_IN]
        );
    }

    #[test]
    fn test_mouse_back_forward() {
        let handler = handler(true);
        let back = handler.handle_mouse_button(MouseButton::Back, ElementState::Pressed);
        assert_eq!(back.map(|c| c.id.0), Some(CommandId::MODAL_PREV.to_string()));
        assert!(handler.handle_mouse_button(MouseButton::Back, ElementState::Released).is_none());
        assert!(handler.handle_mouse_button(MouseButton::Left, ElementState::Pressed).is_none());
    }

    #[test]
    fn test_swipe_left_goes_next() {
        let mut handler = handler(true);
        assert!(handler.touch(1, TouchPhase::Started, 300.0, 200.0).is_none());
        assert!(handler.touch(1, TouchPhase::Moved, 260.0, 200.0).is_none());
        let cmd = handler.touch(1, TouchPhase::Ended, 200.0, 205.0);
        assert_eq!(cmd.map(|c| c.id.0), Some(CommandId::MODAL_NEXT.to_string()));
    }

    #[test]
    fn test_short_swipe_and_cancel() {
        let mut handler = handler(true);
        handler.touch(1, TouchPhase::Started, 100.0, 100.0);
        assert!(handler.touch(1, TouchPhase::Ended, 140.0, 100.0).is_none());

        handler.touch(2, TouchPhase::Started, 100.0, 100.0);
        handler.touch(2, TouchPhase::Cancelled, 300.0, 100.0);
        assert!(handler.touch(2, TouchPhase::Ended, 300.0, 100.0).is_none());
    }

    #[test]
    fn test_swipe_ignored_when_closed() {
        let mut handler = handler(false);
        handler.touch(1, TouchPhase::Started, 100.0, 100.0);
        assert!(handler.touch(1, TouchPhase::Ended, 300.0, 100.0).is_none());
    }
}
