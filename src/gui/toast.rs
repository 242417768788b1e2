//! Toast notifications for non-fatal errors and status messages.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::error::AppError;
use egui::{Align2, Area, Color32, Context, Frame, Id, Order, RichText, Vec2};

/// Toasts kept per window; older ones are dropped first.
const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Warning,
    Error,
}

impl ToastLevel {
    fn icon(&self) -> &'static str {
        match self {
            ToastLevel::Warning => "⚠",
            ToastLevel::Error => "✖",
        }
    }

    fn color(&self) -> Color32 {
        match self {
            ToastLevel::Warning => Color32::from_rgb(255, 200, 80),
            ToastLevel::Error => Color32::from_rgb(255, 100, 100),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration: Duration::from_secs(6),
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }

    fn remaining_fraction(&self) -> f32 {
        let elapsed = self.created_at.elapsed().as_secs_f32();
        let total = self.duration.as_secs_f32();
        1.0 - (elapsed / total).clamp(0.0, 1.0)
    }
}

/// Per-window queue of visible toasts, newest last.
#[derive(Debug)]
pub struct Toasts {
    toasts: VecDeque<Toast>,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
        }
    }

    pub fn add(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.pop_front();
        }
    }

    /// Shows `error` under its title; recoverable kinds are shown as warnings.
    pub fn report(&mut self, error: &AppError) {
        let level = if error.is_recoverable() {
            ToastLevel::Warning
        } else {
            ToastLevel::Error
        };
        self.add(Toast::new(format!("{}: {}", error.title(), error), level));
    }

    pub fn last(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    /// Draws the queue in the bottom-right corner of the viewport `ctx` belongs to.
    pub fn show(&mut self, ctx: &Context, salt: impl std::hash::Hash) {
        self.toasts.retain(|t| !t.is_expired());

        if self.toasts.is_empty() {
            return;
        }

        ctx.request_repaint();

        let margin = 12.0;
        let toast_width = 320.0;
        let toast_spacing = 6.0;
        let base_id = Id::new("toast").with(salt);

        let mut y_offset = 0.0;
        let mut to_remove = Vec::new();

        for (i, toast) in self.toasts.iter().enumerate().rev() {
            let response = Area::new(base_id.with(i))
                .order(Order::Foreground)
                .anchor(Align2::RIGHT_BOTTOM, Vec2::new(-margin, -margin - y_offset))
                .show(ctx, |ui| {
                    let opacity = toast.remaining_fraction().max(0.3);
                    let color = toast.level.color().gamma_multiply(opacity);

                    Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, color))
                        .inner_margin(10.0)
                        .rounding(6.0)
                        .show(ui, |ui| {
                            ui.set_max_width(toast_width);
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(toast.level.icon()).color(color).size(16.0));
                                ui.label(&toast.message);
                                if ui.small_button("×").clicked() {
                                    to_remove.push(i);
                                }
                            });
                        });
                });

            y_offset += response.response.rect.height() + toast_spacing;
        }

        // Indices were collected newest-first, so removal keeps earlier indices valid.
        for i in to_remove {
            self.toasts.remove(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_level_follows_error_kind() {
        let mut toasts = Toasts::new();
        toasts.report(&AppError::NoSelection);
        assert_eq!(toasts.last().unwrap().level, ToastLevel::Warning);
        toasts.report(&AppError::Gui("event loop".into()));
        let last = toasts.last().unwrap();
        assert_eq!(last.level, ToastLevel::Error);
        assert!(last.message.starts_with("GUI error"));
        assert!(last.message.contains("event loop"));
    }

    #[test]
    fn test_toasts_max_limit() {
        let mut toasts = Toasts::new();
        for i in 0..MAX_TOASTS + 1 {
            toasts.add(Toast::new(i.to_string(), ToastLevel::Warning));
        }
        assert_eq!(toasts.len(), MAX_TOASTS);
        assert_eq!(toasts.toasts.front().unwrap().message, "1");
    }

    #[test]
    fn test_toast_expiration() {
        let mut toast = Toast::new("Test", ToastLevel::Error);
        toast.duration = Duration::from_millis(1);
        std::thread::sleep(Duration::from_millis(5));
        assert!(toast.is_expired());
    }
}
