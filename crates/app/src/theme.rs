use eframe::egui::{self, Color32};

/// Semantic colors for the night sky
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    // Backgrounds
    pub background: Color32,
    pub card: Color32,
    pub backdrop: Color32,

    // Text
    pub text: Color32,
    pub text_muted: Color32,

    // Interactive elements
    pub button: Color32,
    pub button_hover: Color32,
    pub border: Color32,

    // Sky
    pub accent: Color32,
    pub star: Color32,
    pub particle: Color32,
}

impl Theme {
    /// Deep blue night (default)
    pub fn night() -> Self {
        Self {
            background: Color32::from_rgb(11, 16, 38),
            card: Color32::from_rgb(24, 31, 64),
            backdrop: Color32::from_black_alpha(128),

            text: Color32::from_rgb(226, 232, 255),
            text_muted: Color32::from_rgb(140, 150, 190),

            button: Color32::from_rgb(92, 84, 180),
            button_hover: Color32::from_rgb(112, 104, 205),
            border: Color32::from_rgb(48, 56, 96),

            accent: Color32::from_rgb(250, 214, 120),
            star: Color32::from_rgb(255, 240, 190),
            particle: Color32::from_rgba_unmultiplied(200, 210, 255, 90),
        }
    }

    /// Pure black and white with a yellow accent
    pub fn high_contrast() -> Self {
        Self {
            background: Color32::BLACK,
            card: Color32::BLACK,
            backdrop: Color32::from_black_alpha(200),

            text: Color32::WHITE,
            text_muted: Color32::WHITE,

            button: Color32::from_rgb(255, 255, 0),
            button_hover: Color32::WHITE,
            border: Color32::WHITE,

            accent: Color32::from_rgb(255, 255, 0),
            star: Color32::WHITE,
            particle: Color32::from_rgba_unmultiplied(255, 255, 255, 140),
        }
    }

    pub fn for_contrast(high_contrast: bool) -> Self {
        if high_contrast {
            Self::high_contrast()
        } else {
            Self::night()
        }
    }

    /// Text drawn on top of `button`
    pub fn button_text(&self) -> Color32 {
        if self.button.r() as u32 + self.button.g() as u32 + self.button.b() as u32 > 450 {
            Color32::BLACK
        } else {
            self.text
        }
    }

    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.background;
        visuals.window_fill = self.card;
        visuals.window_stroke = egui::Stroke::new(1.0, self.border);
        visuals.extreme_bg_color = self.card;
        visuals.override_text_color = Some(self.text);
        visuals.widgets.inactive.weak_bg_fill = self.button;
        visuals.widgets.hovered.weak_bg_fill = self.button_hover;
        visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, self.border);
        visuals.selection.bg_fill = self.button;
        ctx.set_visuals(visuals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_contrast() {
        assert_eq!(Theme::for_contrast(false), Theme::night());
        assert_eq!(Theme::for_contrast(true), Theme::high_contrast());
    }

    #[test]
    fn test_button_text_is_readable() {
        assert_eq!(Theme::high_contrast().button_text(), Color32::BLACK);
        assert_eq!(Theme::night().button_text(), Theme::night().text);
    }
}
