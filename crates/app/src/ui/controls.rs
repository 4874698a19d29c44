use eframe::egui::{self, RichText};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    ToggleAmbient,
    ToggleMute,
    ToggleContrast,
}

/// Snapshot of the toggles the header shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub playing: bool,
    pub muted: bool,
    pub high_contrast: bool,
    /// `Some(false)` once the audio device failed to open
    pub audio_available: Option<bool>,
}

pub fn ambient_label(playing: bool) -> &'static str {
    if playing { "⏸ Pause Ambient" } else { "▶ Play Ambient" }
}

pub fn mute_label(muted: bool) -> &'static str {
    if muted { "🔇 Unmute" } else { "🔊 Mute" }
}

pub fn contrast_label(high_contrast: bool) -> &'static str {
    if high_contrast { "Normal Contrast" } else { "High Contrast" }
}

pub fn show(ui: &mut egui::Ui, state: ControlState, theme: &Theme) -> Option<ControlEvent> {
    let mut event = None;

    ui.horizontal(|ui| {
        ui.label(RichText::new("✨ Star Release").size(20.0).color(theme.accent));

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button(contrast_label(state.high_contrast)).clicked() {
                event = Some(ControlEvent::ToggleContrast);
            }
            if ui.button(mute_label(state.muted)).clicked() {
                event = Some(ControlEvent::ToggleMute);
            }
            if ui.button(ambient_label(state.playing)).clicked() {
                event = Some(ControlEvent::ToggleAmbient);
            }
            if state.audio_available == Some(false) {
                ui.label(RichText::new("audio unavailable").small().color(theme.text_muted));
            }
        });
    });

    event
}
