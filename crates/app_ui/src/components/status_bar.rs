//! Status bar component

use app_core::{ModalController, SessionState};
use egui::Ui;

/// Status bar information
#[derive(Debug, Clone, Default)]
pub struct StatusInfo {
    /// Active catalog category
    pub category: String,

    /// Item title while a preview is open
    pub title: String,

    /// "n / len" within the category
    pub position: String,

    /// Modal state
    pub state: String,

    /// Photo zoom, empty for other items
    pub zoom: String,

    /// Additional status message
    pub message: String,
}

impl StatusInfo {
    /// Fill the preview fields from the controller
    pub fn from_controller(category: &str, controller: &ModalController) -> Self {
        let mut info = Self {
            category: category.to_string(),
            ..Self::default()
        };

        let Some(session) = controller.session().filter(|s| s.state != SessionState::Closed) else {
            return info;
        };

        info.state = session.state.to_string();
        if let Some(item) = session.current_item() {
            info.title = item.title().to_string();
            info.position = format!("{} / {}", session.active_index + 1, session.items_snapshot.len());
            if matches!(item, app_core::CatalogItem::Photo(_)) {
                info.zoom = format!("{:.0}%", session.zoom.scale() * 100.0);
            }
        }
        if session.state == SessionState::OpenLoading && session.load_progress > 0.0 {
            info.message = format!("Loading {:.0}%", session.load_progress * 100.0);
        }
        info
    }
}

/// Status bar component
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar
    pub fn ui(ui: &mut Ui, info: &StatusInfo) {
        ui.horizontal(|ui| {
            ui.label(&info.category);

            if !info.title.is_empty() {
                ui.separator();
                ui.label(&info.title);
            }

            if !info.position.is_empty() {
                ui.separator();
                ui.label(&info.position);
            }

            if !info.zoom.is_empty() {
                ui.separator();
                ui.label(format!("Zoom: {}", info.zoom));
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if !info.state.is_empty() {
                    ui.label(&info.state);
                }
                if !info.message.is_empty() {
                    ui.separator();
                    ui.label(&info.message);
                }
            });
        });
    }
}
