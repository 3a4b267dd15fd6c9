//! Catalog grid component
//! Category tabs over a grid of portfolio cards

use crate::textures::TextureCache;
use crate::theme::Theme;
use app_core::{Catalog, CatalogItem, Category};
use egui::{Rect, Response, Ui, Vec2};

/// Action returned from grid interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogAction {
    /// Another category tab was picked
    SelectCategory(Category),
    /// Open the preview for an item of the active category
    Open { category: Category, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateDirection {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

/// Catalog grid component
pub struct CatalogGrid {
    pub category: Category,
    /// Card thumbnail edge in points
    pub card_size: f32,
    /// Keyboard-selected card
    pub selected: Option<usize>,
    columns: usize,
}

impl Default for CatalogGrid {
    fn default() -> Self {
        Self::new(256)
    }
}

impl CatalogGrid {
    pub fn new(thumbnail_size: u32) -> Self {
        Self {
            category: Category::Games,
            card_size: (thumbnail_size as f32 * 0.75).clamp(120.0, 320.0),
            selected: None,
            columns: 4,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Switch the visible category, dropping the selection
    pub fn select_category(&mut self, category: Category) {
        if self.category != category {
            self.category = category;
            self.selected = None;
        }
    }

    /// Move the selection within a grid of `item_count` cards
    pub fn navigate(&mut self, direction: NavigateDirection, item_count: usize) -> Option<usize> {
        if item_count == 0 {
            self.selected = None;
            return None;
        }

        let cols = self.columns.max(1);
        let Some(current) = self.selected.filter(|i| *i < item_count) else {
            self.selected = Some(0);
            return self.selected;
        };

        let next = match direction {
            NavigateDirection::Up => current.checked_sub(cols).unwrap_or(current),
            NavigateDirection::Down => {
                if current + cols < item_count {
                    current + cols
                } else {
                    current
                }
            }
            NavigateDirection::Left => current.saturating_sub(1),
            NavigateDirection::Right => (current + 1).min(item_count - 1),
            NavigateDirection::Home => 0,
            NavigateDirection::End => item_count - 1,
        };

        self.selected = Some(next);
        self.selected
    }

    fn calculate_columns(&mut self, available_width: f32) {
        let item_width = self.card_size + 16.0;
        self.columns = (available_width / item_width).max(1.0) as usize;
    }

    /// Render tabs and cards. `interactive` is false while the modal covers the grid.
    pub fn ui(
        &mut self,
        ui: &mut Ui,
        catalog: &Catalog,
        textures: &mut TextureCache,
        theme: &Theme,
        interactive: bool,
    ) -> Option<CatalogAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            for category in Category::ALL {
                let label = format!("{} ({})", category.label(), catalog.len(category));
                if ui.selectable_label(self.category == category, label).clicked() {
                    action = Some(CatalogAction::SelectCategory(category));
                }
            }
        });
        ui.separator();

        if let Some(CatalogAction::SelectCategory(category)) = action {
            self.select_category(category);
        }

        let category = self.category;
        let items = catalog.items_by_category(category);
        self.calculate_columns(ui.available_width());

        if interactive && action.is_none() {
            action = self.handle_keyboard(ui, items.len());
        }

        if items.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(format!("No {} yet", category.as_str()));
            });
            return action;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new("catalog_grid")
                    .num_columns(self.columns)
                    .spacing(Vec2::new(8.0, 8.0))
                    .show(ui, |ui| {
                        for (idx, item) in items.iter().enumerate() {
                            let is_selected = self.selected == Some(idx);
                            let response = self.render_card(ui, item, is_selected, textures, theme);

                            if interactive && response.clicked() {
                                self.selected = Some(idx);
                                action = Some(CatalogAction::Open { category, index: idx });
                            }

                            if (idx + 1) % self.columns == 0 {
                                ui.end_row();
                            }
                        }
                    });
            });

        action
    }

    fn handle_keyboard(&mut self, ui: &Ui, item_count: usize) -> Option<CatalogAction> {
        let pressed = ui.input(|i| {
            [
                (egui::Key::ArrowUp, NavigateDirection::Up),
                (egui::Key::ArrowDown, NavigateDirection::Down),
                (egui::Key::ArrowLeft, NavigateDirection::Left),
                (egui::Key::ArrowRight, NavigateDirection::Right),
                (egui::Key::Home, NavigateDirection::Home),
                (egui::Key::End, NavigateDirection::End),
            ]
            .into_iter()
            .find(|(key, _)| i.key_pressed(*key))
            .map(|(_, dir)| dir)
        });

        if let Some(direction) = pressed {
            self.navigate(direction, item_count);
            return None;
        }

        if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            if let Some(index) = self.selected.filter(|i| *i < item_count) {
                return Some(CatalogAction::Open {
                    category: self.category,
                    index,
                });
            }
        }

        None
    }

    fn render_card(
        &self,
        ui: &mut Ui,
        item: &CatalogItem,
        is_selected: bool,
        textures: &mut TextureCache,
        theme: &Theme,
    ) -> Response {
        let card_size = Vec2::new(self.card_size + 8.0, self.card_size * 0.75 + 56.0);
        let (rect, response) = ui.allocate_exact_size(card_size, egui::Sense::click());

        if !ui.is_rect_visible(rect) {
            return response;
        }

        let texture = textures.get(item.card_image_url(), Some(self.card_size.ceil() as u32));
        let painter = ui.painter();

        let bg = if response.hovered() {
            theme.card.gamma_multiply(1.2)
        } else {
            theme.card
        };
        painter.rect_filled(rect, 6.0, bg);

        if is_selected {
            painter.rect_stroke(rect, 6.0, egui::Stroke::new(2.0, theme.accent));
        }

        let thumb_rect = Rect::from_min_size(
            rect.min + Vec2::new(4.0, 4.0),
            Vec2::new(self.card_size, self.card_size * 0.75),
        );

        match texture.texture() {
            Some(texture) => {
                let uv = Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(texture.id(), thumb_rect, uv, egui::Color32::WHITE);
            }
            None => {
                painter.rect_filled(thumb_rect, 4.0, theme.primary);
                let icon = if texture.is_loading() { "…" } else { "🖼" };
                painter.text(
                    thumb_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    icon,
                    egui::FontId::proportional(28.0),
                    theme.text_secondary,
                );
            }
        }

        // Badge in the top-right corner of the thumbnail
        let badge = item.badge();
        if !badge.is_empty() {
            let pos = thumb_rect.right_top() + Vec2::new(-6.0, 6.0);
            let galley = painter.layout_no_wrap(
                badge.to_string(),
                egui::FontId::proportional(11.0),
                egui::Color32::WHITE,
            );
            let badge_rect = Rect::from_min_size(
                pos - Vec2::new(galley.size().x + 8.0, 0.0),
                galley.size() + Vec2::new(8.0, 4.0),
            );
            painter.rect_filled(badge_rect, 4.0, theme.accent);
            painter.galley(badge_rect.min + Vec2::new(4.0, 2.0), galley, egui::Color32::WHITE);
        }

        let title_pos = egui::pos2(rect.min.x + 6.0, thumb_rect.max.y + 6.0);
        painter.text(
            title_pos,
            egui::Align2::LEFT_TOP,
            truncate(item.title(), (self.card_size / 8.0) as usize),
            egui::FontId::proportional(14.0),
            theme.text,
        );
        painter.text(
            title_pos + Vec2::new(0.0, 20.0),
            egui::Align2::LEFT_TOP,
            truncate(item.summary(), (self.card_size / 6.5) as usize),
            egui::FontId::proportional(11.0),
            theme.text_secondary,
        );

        response.on_hover_text(item.description())
    }
}

/// Shorten to `max_chars` characters, marking the cut with an ellipsis
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_starts_at_first_card() {
        let mut grid = CatalogGrid::default();
        assert_eq!(grid.navigate(NavigateDirection::Right, 5), Some(0));
        assert_eq!(grid.navigate(NavigateDirection::Right, 5), Some(1));
        assert_eq!(grid.navigate(NavigateDirection::End, 5), Some(4));
        assert_eq!(grid.navigate(NavigateDirection::Right, 5), Some(4));
        assert_eq!(grid.navigate(NavigateDirection::Home, 5), Some(0));
        assert_eq!(grid.navigate(NavigateDirection::Left, 5), Some(0));
    }

    #[test]
    fn test_navigate_rows() {
        let mut grid = CatalogGrid::default();
        grid.columns = 3;
        grid.selected = Some(1);
        assert_eq!(grid.navigate(NavigateDirection::Down, 7), Some(4));
        assert_eq!(grid.navigate(NavigateDirection::Down, 7), Some(4));
        assert_eq!(grid.navigate(NavigateDirection::Up, 7), Some(1));
        assert_eq!(grid.navigate(NavigateDirection::Up, 7), Some(1));
    }

    #[test]
    fn test_navigate_empty_and_category_switch() {
        let mut grid = CatalogGrid::default();
        assert_eq!(grid.navigate(NavigateDirection::Down, 0), None);

        grid.selected = Some(2);
        grid.select_category(Category::Photos);
        assert_eq!(grid.category, Category::Photos);
        assert_eq!(grid.selected, None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Sky Surfers", 20), "Sky Surfers");
        assert_eq!(truncate("An endless runner", 8), "An endl…");
        assert_eq!(truncate("héllo wörld", 6), "héllo…");
    }
}
