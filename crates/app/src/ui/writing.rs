use eframe::egui::{self, Align2, FontId, Rect, RichText, Vec2};
use unicode_segmentation::UnicodeSegmentation;

use crate::theme::Theme;

const PREVIEW_GRAPHEMES: usize = 100;
const RISE_DISTANCE: f32 = 200.0;

pub const PLACEHOLDER: &str = "Write your thoughts, feelings, or worries here...";
pub const PRIVACY_NOTE: &str =
    "Your thoughts are anonymous and private. Each day brings a fresh sky.";

/// What the user did with the writing area this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritingEvent {
    None,
    Release,
}

/// First 100 grapheme clusters of `text`, followed by an ellipsis.
pub fn preview(text: &str) -> String {
    let mut out: String = text.graphemes(true).take(PREVIEW_GRAPHEMES).collect();
    out.push_str("...");
    out
}

/// Id of the text box, so its focus can be checked before it is drawn.
pub fn text_id() -> egui::Id {
    egui::Id::new("release_text")
}

/// The text box and release button. `releasing` carries the progress and
/// text of an in-flight release, if any; while it is set input is locked.
pub fn show(
    ui: &mut egui::Ui,
    text: &mut String,
    releasing: Option<(f32, &str)>,
    theme: &Theme,
) -> WritingEvent {
    let locked = releasing.is_some();
    let mut event = WritingEvent::None;

    // Ctrl+Enter only counts while typing, and is eaten before the text box
    // can turn it into a newline
    let focused = ui.memory(|m| m.has_focus(text_id()));
    let shortcut = focused
        && !locked
        && ui.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::Enter));

    let edit = ui.add_enabled(
        !locked,
        egui::TextEdit::multiline(text)
            .id(text_id())
            .hint_text(PLACEHOLDER)
            .desired_rows(7)
            .desired_width(f32::INFINITY)
            .font(egui::TextStyle::Body),
    );

    let can_release = !locked && !text.trim().is_empty();
    if shortcut && can_release {
        event = WritingEvent::Release;
    }

    ui.add_space(16.0);
    ui.vertical_centered(|ui| {
        let label = if locked {
            "✨ Releasing..."
        } else {
            "✨ Release Into The Sky"
        };
        let button = egui::Button::new(RichText::new(label).size(18.0).color(theme.button_text()))
            .fill(theme.button)
            .min_size(Vec2::new(260.0, 44.0));
        if ui.add_enabled(can_release, button).clicked() {
            event = WritingEvent::Release;
        }
    });

    ui.add_space(12.0);
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(PRIVACY_NOTE).small().color(theme.text_muted));
    });

    if let Some((progress, pending)) = releasing {
        paint_rising(ui, edit.rect, pending, progress, theme);
    }

    event
}

/// The words shrink, fade and float up out of the box.
fn paint_rising(ui: &egui::Ui, rect: Rect, text: &str, progress: f32, theme: &Theme) {
    let painter = ui.painter_at(rect.expand(RISE_DISTANCE));
    painter.rect_filled(rect, 8.0, theme.background.gamma_multiply(0.6));

    let eased = 1.0 - (1.0 - progress).powi(2);
    let pos = rect.center() - Vec2::new(0.0, RISE_DISTANCE * eased);
    let size = 20.0 * (1.0 - 0.7 * eased);
    let color = theme.text.gamma_multiply(1.0 - eased);
    painter.text(
        pos,
        Align2::CENTER_CENTER,
        preview(text),
        FontId::proportional(size),
        color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl_enter() -> egui::Event {
        egui::Event::Key {
            key: egui::Key::Enter,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::COMMAND,
        }
    }

    fn frame(ctx: &egui::Context, text: &mut String, events: Vec<egui::Event>) -> WritingEvent {
        let input = egui::RawInput {
            events,
            ..Default::default()
        };
        let theme = Theme::night();
        let mut event = WritingEvent::None;
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                event = show(ui, text, None, &theme);
            });
        });
        event
    }

    #[test]
    fn test_shortcut_ignored_without_focus() {
        let ctx = egui::Context::default();
        let mut text = "a heavy day".to_string();
        frame(&ctx, &mut text, Vec::new());
        assert_eq!(frame(&ctx, &mut text, vec![ctrl_enter()]), WritingEvent::None);
    }

    #[test]
    fn test_shortcut_releases_from_focused_text() {
        let ctx = egui::Context::default();
        let mut text = "a heavy day".to_string();
        frame(&ctx, &mut text, Vec::new());
        ctx.memory_mut(|m| m.request_focus(text_id()));
        frame(&ctx, &mut text, Vec::new());

        assert_eq!(frame(&ctx, &mut text, vec![ctrl_enter()]), WritingEvent::Release);
        assert_eq!(text, "a heavy day");
    }

    #[test]
    fn test_shortcut_needs_text() {
        let ctx = egui::Context::default();
        let mut text = "   ".to_string();
        frame(&ctx, &mut text, Vec::new());
        ctx.memory_mut(|m| m.request_focus(text_id()));
        frame(&ctx, &mut text, Vec::new());
        assert_eq!(frame(&ctx, &mut text, vec![ctrl_enter()]), WritingEvent::None);
    }

    #[test]
    fn test_preview_short_text() {
        assert_eq!(preview("let go"), "let go...");
    }

    #[test]
    fn test_preview_truncates_to_100_graphemes() {
        let long = "a".repeat(250);
        let out = preview(&long);
        assert_eq!(out.len(), 103);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_preview_keeps_clusters_whole() {
        // Family emoji is one grapheme built from several code points
        let family = "👨‍👩‍👧";
        let text = family.repeat(120);
        let out = preview(&text);
        assert_eq!(out.graphemes(true).count(), 103);
        assert!(out.starts_with(family));
    }
}
