//! UI Components

pub mod catalog_grid;
pub mod preview_modal;
pub mod toasts;
pub mod status_bar;

pub use catalog_grid::{CatalogGrid, CatalogAction, NavigateDirection};
pub use preview_modal::{PreviewModal, ModalAction, command_for};
pub use toasts::Toasts;
pub use status_bar::{StatusBar, StatusInfo};
