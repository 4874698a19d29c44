use eframe::egui::{self, RichText};

use crate::theme::Theme;

pub const TITLE: &str = "You've let it go";
pub const MESSAGE: &str =
    "You are not alone — even if no one sees your words, they are transformed into light.";

/// The affirmation dialog shown after each release. Returns `true` once the
/// user dismisses it by button, Escape or a click on the backdrop.
pub fn show(ctx: &egui::Context, affirmation: &str, theme: &Theme) -> bool {
    let mut dismissed = false;

    let response = egui::Modal::new(egui::Id::new("affirmation"))
        .backdrop_color(theme.backdrop)
        .frame(
            egui::Frame::popup(&ctx.style())
                .fill(theme.card)
                .inner_margin(egui::Margin::same(24)),
        )
        .show(ctx, |ui| {
            ui.set_max_width(420.0);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("🌟").size(36.0));
                ui.add_space(8.0);
                ui.label(RichText::new(TITLE).size(22.0).strong().color(theme.text));
                ui.add_space(8.0);
                ui.label(RichText::new(MESSAGE).color(theme.text_muted));
                ui.add_space(12.0);
                ui.label(RichText::new(affirmation).italics().size(16.0).color(theme.accent));
                ui.add_space(16.0);

                let button = egui::Button::new(
                    RichText::new("Continue").color(theme.button_text()),
                )
                .fill(theme.button)
                .min_size(egui::vec2(140.0, 36.0));
                if ui.add(button).clicked() {
                    dismissed = true;
                }
            });
        });

    dismissed || response.should_close()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ctx: &egui::Context, events: Vec<egui::Event>) -> bool {
        let input = egui::RawInput {
            events,
            ..Default::default()
        };
        let mut dismissed = false;
        let _ = ctx.run(input, |ctx| {
            dismissed = show(ctx, "You are worthy of peace.", &Theme::night());
        });
        dismissed
    }

    #[test]
    fn test_stays_open_until_dismissed() {
        let ctx = egui::Context::default();
        assert!(!frame(&ctx, Vec::new()));
        assert!(!frame(&ctx, Vec::new()));
    }

    #[test]
    fn test_escape_dismisses() {
        let ctx = egui::Context::default();
        frame(&ctx, Vec::new());
        let escape = egui::Event::Key {
            key: egui::Key::Escape,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        };
        assert!(frame(&ctx, vec![escape]));
    }

    #[test]
    fn test_message_copy() {
        assert_eq!(TITLE, "You've let it go");
        assert!(MESSAGE.starts_with("You are not alone"));
        assert!(MESSAGE.ends_with("they are transformed into light."));
    }
}
