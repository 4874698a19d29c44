use std::collections::HashMap;
use std::time::Instant;

use eframe::egui::{self, RichText};
use star_core::{
    EngineBackend, FileStore, PlacementBounds, Sky, SystemClock, pick_random_affirmation,
};

use crate::config::Config;
use crate::theme::Theme;
use crate::ui::controls::{self, ControlEvent, ControlState};
use crate::ui::particles::{PARTICLE_COUNT, Particles};
use crate::ui::writing::{self, WritingEvent};
use crate::ui::{modal, stars};

const SUBTITLE: &str = "Release what's on your heart. \
    Transform your thoughts into stars and watch them rise into the endless sky.";

pub type AppSky = Sky<FileStore, SystemClock, EngineBackend>;

pub struct StarReleaseApp {
    sky: AppSky,
    config: Config,
    theme: Theme,
    text: String,
    particles: Particles,
    affirmation: Option<&'static str>,
    /// Frame time each star released this session appeared, for the grow-in
    star_births: HashMap<String, f64>,
}

impl StarReleaseApp {
    pub fn new(cc: &eframe::CreationContext<'_>, sky: AppSky, config: Config) -> Self {
        let theme = Theme::for_contrast(config.high_contrast);
        theme.apply(&cc.egui_ctx);

        Self {
            sky,
            config,
            theme,
            text: String::new(),
            particles: Particles::new(PARTICLE_COUNT, &mut rand::thread_rng()),
            affirmation: None,
            star_births: HashMap::new(),
        }
    }

    fn release(&mut self) {
        if let Err(e) = self.sky.begin_release(&self.text, Instant::now()) {
            log::debug!("release ignored: {e}");
        }
    }

    fn handle_control(&mut self, ctx: &egui::Context, event: ControlEvent) {
        match event {
            ControlEvent::ToggleAmbient => {
                self.sky.audio_mut().toggle_ambient();
            }
            ControlEvent::ToggleMute => {
                self.sky.audio_mut().toggle_mute();
            }
            ControlEvent::ToggleContrast => {
                self.config.high_contrast = !self.config.high_contrast;
                self.theme = Theme::for_contrast(self.config.high_contrast);
                self.theme.apply(ctx);
                self.config.save();
            }
        }
    }

    fn paint_sky(&self, ctx: &egui::Context, time: f64) {
        let rect = ctx.screen_rect();
        let painter = ctx.layer_painter(egui::LayerId::background());
        painter.rect_filled(rect, 0.0, self.theme.background);
        self.particles.paint(&painter, rect, time, self.theme.particle);
        stars::paint(
            &painter,
            rect,
            self.sky.ledger().stars(),
            &self.star_births,
            time,
            self.theme.star,
        );
    }

    fn show_counter(&self, ctx: &egui::Context) {
        egui::Area::new(egui::Id::new("star_counter"))
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(24.0, -24.0))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(self.theme.card.gamma_multiply(0.8))
                    .stroke(egui::Stroke::new(1.0, self.theme.border))
                    .corner_radius(8.0)
                    .inner_margin(egui::Margin::same(12))
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new("Stars Released Today")
                                .small()
                                .color(self.theme.text_muted),
                        );
                        ui.label(
                            RichText::new(self.sky.ledger().count().to_string())
                                .size(28.0)
                                .strong()
                                .color(self.theme.accent),
                        );
                    });
            });
    }
}

impl eframe::App for StarReleaseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let time = ctx.input(|i| i.time);
        let screen = ctx.screen_rect();
        let bounds = PlacementBounds {
            width: screen.width() as f64,
            height: screen.height() as f64,
        };

        if let Some(added) = self.sky.tick(now, bounds) {
            self.star_births.insert(added.star.id, time);
            self.text.clear();
            self.affirmation = Some(pick_random_affirmation());
        }

        self.paint_sky(ctx, time);

        let transparent = egui::Frame::new().inner_margin(egui::Margin::same(16));

        egui::TopBottomPanel::top("header")
            .frame(transparent)
            .show_separator_line(false)
            .show(ctx, |ui| {
                let state = ControlState {
                    playing: self.sky.audio().is_playing(),
                    muted: self.sky.audio().is_muted(),
                    high_contrast: self.config.high_contrast,
                    audio_available: self.sky.audio().is_available(),
                };
                if let Some(event) = controls::show(ui, state, &self.theme) {
                    self.handle_control(ctx, event);
                }
            });

        let release = self.sky.release();
        let releasing = release.progress(now).zip(release.pending_text());
        let mut event = WritingEvent::None;
        egui::CentralPanel::default()
            .frame(transparent)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.25);
                    ui.label(
                        RichText::new("This is your space to let go")
                            .size(28.0)
                            .color(self.theme.text),
                    );
                    ui.add_space(12.0);
                    ui.set_max_width(640.0);
                    ui.label(RichText::new(SUBTITLE).size(16.0).color(self.theme.text_muted));
                    ui.add_space(24.0);
                    event = writing::show(ui, &mut self.text, releasing, &self.theme);
                });
            });
        // The modal owns input while it is open
        if event == WritingEvent::Release && self.affirmation.is_none() {
            self.release();
        }

        self.show_counter(ctx);

        if let Some(affirmation) = self.affirmation {
            if modal::show(ctx, affirmation, &self.theme) {
                self.affirmation = None;
            }
        }

        ctx.request_repaint();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.sky.close();
        log::info!("star release closed");
    }
}
