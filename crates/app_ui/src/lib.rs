//! Folio Viewer UI Layer
//!
//! Provides:
//! - egui components for the catalog grid, preview modal and toasts
//! - wgpu rendering pipeline
//! - Input handling (keys, mouse buttons, touch swipes)
//! - Texture cache for catalog images

pub mod renderer;
pub mod components;
pub mod input;
pub mod theme;
pub mod textures;

pub use renderer::Renderer;
pub use input::InputHandler;
pub use theme::Theme;
pub use textures::{TextureCache, TextureState};
