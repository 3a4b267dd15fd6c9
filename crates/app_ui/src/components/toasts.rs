//! Toast stack for notifications
//! Newest toast sits at the bottom-right corner; older ones stack above it

use crate::theme::Theme;
use app_core::{Notification, NotificationLevel};
use egui::{Rect, Vec2};
use std::time::{Duration, Instant};

const TOAST_WIDTH: f32 = 320.0;
const TOAST_HEIGHT: f32 = 44.0;
const TOAST_GAP: f32 = 8.0;
const MARGIN: f32 = 16.0;

fn icon(level: NotificationLevel) -> &'static str {
    match level {
        NotificationLevel::Info => "ℹ",
        NotificationLevel::Success => "✔",
        NotificationLevel::Error => "⚠",
    }
}

/// Rectangle of the toast `slot` places above the newest one
pub fn toast_rect(screen: Rect, slot: usize) -> Rect {
    let width = TOAST_WIDTH.min(screen.width() - 2.0 * MARGIN).max(0.0);
    let bottom = screen.max.y - MARGIN - slot as f32 * (TOAST_HEIGHT + TOAST_GAP);
    Rect::from_min_max(
        egui::pos2(screen.max.x - MARGIN - width, bottom - TOAST_HEIGHT),
        egui::pos2(screen.max.x - MARGIN, bottom),
    )
}

/// Opacity for a toast of age `age` living `ttl`: fades over the last 400ms
pub fn fade(age: Duration, ttl: Duration) -> f32 {
    let fade_window = Duration::from_millis(400).min(ttl);
    let remaining = ttl.saturating_sub(age);
    if remaining >= fade_window || fade_window.is_zero() {
        1.0
    } else {
        remaining.as_secs_f32() / fade_window.as_secs_f32()
    }
}

/// Toast stack component
pub struct Toasts;

impl Toasts {
    /// Draw `visible` (oldest first); returns the id of a clicked toast
    pub fn show(
        ctx: &egui::Context,
        visible: &[Notification],
        ttl: Duration,
        theme: &Theme,
    ) -> Option<u64> {
        if visible.is_empty() {
            return None;
        }

        let screen = ctx.screen_rect();
        let now = Instant::now();
        let mut dismissed = None;

        egui::Area::new(egui::Id::new("toasts"))
            .order(egui::Order::Tooltip)
            .fixed_pos(screen.min)
            .interactable(true)
            .show(ctx, |ui| {
                for (slot, toast) in visible.iter().rev().enumerate() {
                    let rect = toast_rect(screen, slot);
                    let alpha = fade(now.saturating_duration_since(toast.created_at), ttl);
                    let accent = theme.level_color(toast.level);

                    let response = ui.interact(rect, ui.id().with(toast.id), egui::Sense::click());
                    let painter = ui.painter();
                    painter.rect_filled(rect, 6.0, theme.surface.gamma_multiply(alpha));
                    painter.rect_filled(
                        Rect::from_min_size(rect.min, Vec2::new(4.0, rect.height())),
                        2.0,
                        accent.gamma_multiply(alpha),
                    );
                    painter.text(
                        rect.left_center() + Vec2::new(16.0, 0.0),
                        egui::Align2::LEFT_CENTER,
                        format!("{}  {}", icon(toast.level), toast.message),
                        egui::FontId::proportional(14.0),
                        theme.text.gamma_multiply(alpha),
                    );

                    if response.clicked() {
                        dismissed = Some(toast.id);
                    }
                }
            });

        if dismissed.is_none() && visible.iter().any(|t| fade(now.saturating_duration_since(t.created_at), ttl) < 1.0) {
            ctx.request_repaint();
        }

        dismissed
    }
}
