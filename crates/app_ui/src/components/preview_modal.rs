//! Preview modal component
//!
//! Draws a [`PreviewSurface`] over a dimmed backdrop. The component holds no
//! session state: everything it shows comes from the surface, and every
//! interaction comes back as a [`ModalAction`] for the controller to apply.

use crate::textures::{TextureCache, TextureState};
use crate::theme::Theme;
use app_core::{
    CloseReason, Command, CommandId, GamePhase, PlaybackView, PreviewAction, PreviewSurface,
    SurfaceBody,
};
use egui::{Rect, Ui, Vec2};

/// Longest edge of photos decoded for the modal
const PREVIEW_MAX_SIZE: u32 = 2048;

/// Interaction reported by the modal
#[derive(Debug, Clone)]
pub enum ModalAction {
    Close(CloseReason),
    Command(Command),
}

/// Command a surface control triggers
pub fn command_for(action: PreviewAction) -> &'static str {
    match action {
        PreviewAction::Download => CommandId::MEDIA_DOWNLOAD,
        PreviewAction::Fullscreen => CommandId::VIEW_TOGGLE_FULLSCREEN,
        PreviewAction::PlayPause => CommandId::MEDIA_TOGGLE_PLAY,
        PreviewAction::Mute => CommandId::MEDIA_TOGGLE_MUTE,
        PreviewAction::Visit => CommandId::WEBSITE_VISIT,
        PreviewAction::Share => CommandId::WEBSITE_SHARE,
        PreviewAction::PlayGame => CommandId::GAME_PLAY,
        PreviewAction::ZoomIn => CommandId::VIEW_ZOOM_IN,
        PreviewAction::ZoomOut => CommandId::VIEW_ZOOM_OUT,
        PreviewAction::ZoomReset => CommandId::VIEW_ZOOM_RESET,
    }
}

/// Largest size with the image's aspect ratio that fits `available`
pub fn fit_size(image: [u32; 2], available: Vec2) -> Vec2 {
    if image[0] == 0 || image[1] == 0 || available.x <= 0.0 || available.y <= 0.0 {
        return Vec2::ZERO;
    }
    let size = Vec2::new(image[0] as f32, image[1] as f32);
    let scale = (available.x / size.x).min(available.y / size.y);
    size * scale
}

/// Dialog rectangle inside the screen, leaving a margin for the nav arrows
pub fn content_rect(screen: Rect, fullscreen: bool) -> Rect {
    if fullscreen {
        return screen.shrink(8.0);
    }
    let width = (screen.width() - 160.0).clamp(240.0, 1200.0).min(screen.width());
    let height = (screen.height() - 80.0).clamp(200.0, 900.0).min(screen.height());
    Rect::from_center_size(screen.center(), Vec2::new(width, height))
}

/// Preview modal component
#[derive(Default)]
pub struct PreviewModal;

impl PreviewModal {
    pub fn new() -> Self {
        Self
    }

    /// Render the modal for `surface` and collect interactions
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        surface: &PreviewSurface,
        fullscreen: bool,
        textures: &mut TextureCache,
        theme: &Theme,
    ) -> Vec<ModalAction> {
        let mut actions = Vec::new();
        let screen = ctx.screen_rect();
        let content = content_rect(screen, fullscreen);

        egui::Area::new(egui::Id::new("preview_modal"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                let backdrop = ui.interact(screen, ui.id().with("backdrop"), egui::Sense::click());
                ui.painter().rect_filled(screen, 0.0, theme.overlay);
                ui.painter().rect_filled(content, 8.0, theme.surface);

                let navigable = surface.position.map(|(_, len)| len > 1).unwrap_or(false);
                if navigable {
                    self.nav_buttons(ui, screen, content, &mut actions);
                }

                ui.allocate_new_ui(egui::UiBuilder::new().max_rect(content.shrink(16.0)), |ui| {
                    self.header(ui, surface, theme, &mut actions);
                    ui.separator();
                    self.body(ui, surface, textures, theme, &mut actions);
                    self.action_row(ui, surface, &mut actions);
                });

                if backdrop.clicked() {
                    let outside = backdrop
                        .interact_pointer_pos()
                        .map(|pos| !content.contains(pos))
                        .unwrap_or(false);
                    if outside {
                        actions.push(ModalAction::Close(CloseReason::Overlay));
                    }
                }
            });

        actions
    }

    fn nav_buttons(&self, ui: &mut Ui, screen: Rect, content: Rect, actions: &mut Vec<ModalAction>) {
        let size = Vec2::new(48.0, 48.0);
        let prev_center = egui::pos2((screen.min.x + content.min.x) / 2.0, content.center().y);
        let next_center = egui::pos2((screen.max.x + content.max.x) / 2.0, content.center().y);

        for (center, label, id) in [
            (prev_center, "◀", CommandId::MODAL_PREV),
            (next_center, "▶", CommandId::MODAL_NEXT),
        ] {
            let rect = Rect::from_center_size(center, size);
            let button = egui::Button::new(egui::RichText::new(label).size(22.0));
            if ui.put(rect, button).clicked() {
                actions.push(ModalAction::Command(Command::new(id)));
            }
        }
    }

    fn header(&self, ui: &mut Ui, surface: &PreviewSurface, theme: &Theme, actions: &mut Vec<ModalAction>) {
        ui.horizontal(|ui| {
            ui.heading(&surface.title);
            if let Some(counter) = surface.counter() {
                ui.label(egui::RichText::new(counter).color(theme.text_secondary));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✕").on_hover_text("Close").clicked() {
                    actions.push(ModalAction::Close(CloseReason::CloseControl));
                }
            });
        });
        if !surface.description.is_empty() {
            ui.label(&surface.description);
        }
    }

    fn body(
        &self,
        ui: &mut Ui,
        surface: &PreviewSurface,
        textures: &mut TextureCache,
        theme: &Theme,
        actions: &mut Vec<ModalAction>,
    ) {
        // Leave room for the action row
        let height = (ui.available_height() - 48.0).max(64.0);
        let area = Vec2::new(ui.available_width(), height);

        match &surface.body {
            SurfaceBody::Photo {
                image_url,
                zoom,
                category,
                camera,
                location,
            } => {
                let meta_height = 24.0;
                let image_area = Vec2::new(area.x, (area.y - meta_height).max(32.0));
                let state = textures.get(image_url, Some(PREVIEW_MAX_SIZE));
                egui::ScrollArea::both()
                    .id_salt("photo_scroll")
                    .max_width(image_area.x)
                    .max_height(image_area.y)
                    .show(ui, |ui| match &state {
                        TextureState::Ready { texture, size } => {
                            let fitted = fit_size(*size, image_area) * *zoom;
                            ui.add(egui::Image::new((texture.id(), fitted)));
                        }
                        other => placeholder(ui, image_area, other, theme),
                    });

                ui.horizontal(|ui| {
                    ui.label(format!("📁 {}", category));
                    if let Some(camera) = camera {
                        ui.label(format!("📷 {}", camera));
                    }
                    if let Some(location) = location {
                        ui.label(format!("📍 {}", location));
                    }
                    ui.label(format!("{:.0}%", zoom * 100.0));
                });
            }

            SurfaceBody::Video {
                thumbnail_url,
                playback,
                ..
            } => {
                let state = textures.get(thumbnail_url, Some(PREVIEW_MAX_SIZE));
                let clicked = media_frame(ui, area, &state, theme, Some(video_caption(playback)));
                if clicked {
                    actions.push(ModalAction::Command(Command::new(CommandId::MEDIA_TOGGLE_PLAY)));
                }
            }

            SurfaceBody::Website {
                preview_url,
                target_url,
                technologies,
            } => {
                let image_area = Vec2::new(area.x, (area.y - 40.0).max(32.0));
                let state = textures.get(preview_url, Some(PREVIEW_MAX_SIZE));
                if media_frame(ui, image_area, &state, theme, None) {
                    actions.push(ModalAction::Command(Command::new(CommandId::WEBSITE_VISIT)));
                }
                ui.horizontal_wrapped(|ui| {
                    ui.hyperlink_to(target_url.as_str(), target_url.as_str());
                    for tech in technologies {
                        ui.label(egui::RichText::new(tech).color(theme.accent).small());
                    }
                });
            }

            SurfaceBody::Game { thumbnail_url, phase } => match phase {
                GamePhase::Idle => {
                    let state = textures.get(thumbnail_url, Some(PREVIEW_MAX_SIZE));
                    if media_frame(ui, area, &state, theme, Some("▶ Play Game".to_string())) {
                        actions.push(ModalAction::Command(Command::new(CommandId::GAME_PLAY)));
                    }
                }
                GamePhase::Loading { progress } => {
                    ui.allocate_ui(area, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(area.y / 3.0);
                            ui.label("Loading game…");
                            ui.add(
                                egui::ProgressBar::new(progress.clamp(0.0, 1.0))
                                    .show_percentage()
                                    .desired_width(area.x * 0.6),
                            );
                        });
                    });
                }
                GamePhase::Running => {
                    ui.allocate_ui(area, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(area.y / 3.0);
                            ui.label(egui::RichText::new("Game running").color(theme.success).size(18.0));
                            ui.label("Close the preview to stop it.");
                        });
                    });
                }
            },
        }
    }

    fn action_row(&self, ui: &mut Ui, surface: &PreviewSurface, actions: &mut Vec<ModalAction>) {
        ui.separator();
        ui.horizontal(|ui| {
            for action in &surface.actions {
                if ui.button(action.label()).clicked() {
                    actions.push(ModalAction::Command(Command::new(command_for(*action))));
                }
            }
        });
    }
}

fn video_caption(playback: &PlaybackView) -> String {
    let state = if playback.needs_user_gesture {
        "▶ Click to play"
    } else if playback.paused {
        "▶ Paused"
    } else {
        "⏸ Playing"
    };
    if playback.muted {
        format!("{}  🔇", state)
    } else {
        state.to_string()
    }
}

/// Image filling `area` with an optional caption; returns true when clicked
fn media_frame(ui: &mut Ui, area: Vec2, state: &TextureState, theme: &Theme, caption: Option<String>) -> bool {
    let (rect, response) = ui.allocate_exact_size(area, egui::Sense::click());
    let painter = ui.painter();

    match state {
        TextureState::Ready { texture, size } => {
            let image_rect = Rect::from_center_size(rect.center(), fit_size(*size, area));
            let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), image_rect, uv, egui::Color32::WHITE);
        }
        TextureState::Loading => {
            painter.rect_filled(rect, 4.0, theme.primary);
            painter.text(rect.center(), egui::Align2::CENTER_CENTER, "Loading…", egui::FontId::proportional(16.0), theme.text_secondary);
        }
        TextureState::Unavailable => {
            painter.rect_filled(rect, 4.0, theme.primary);
        }
    }

    if let Some(caption) = caption {
        let pos = rect.center_bottom() - Vec2::new(0.0, 24.0);
        painter.text(pos, egui::Align2::CENTER_CENTER, caption, egui::FontId::proportional(18.0), egui::Color32::WHITE);
    }

    response.clicked()
}

fn placeholder(ui: &mut Ui, area: Vec2, state: &TextureState, theme: &Theme) {
    let (rect, _) = ui.allocate_exact_size(area, egui::Sense::hover());
    ui.painter().rect_filled(rect, 4.0, theme.primary);
    let text = if state.is_loading() { "Loading…" } else { "Image unavailable" };
    ui.painter().text(rect.center(), egui::Align2::CENTER_CENTER, text, egui::FontId::proportional(16.0), theme.text_secondary);
}
