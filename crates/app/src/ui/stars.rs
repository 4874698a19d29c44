use std::collections::HashMap;

use eframe::egui::{self, Color32, Pos2, Rect};
use star_core::Star;

const TWINKLE_PERIOD: f64 = 2.0;
const GROW_SECONDS: f64 = 0.5;
const STAR_RADIUS: f32 = 2.5;
const GLOW_RADIUS: f32 = 7.0;

/// Opacity between 0.6 and 1.0, cycling every two seconds. `phase` keeps
/// neighbouring stars from pulsing in lockstep.
pub fn twinkle(time: f64, phase: f64) -> f32 {
    let t = ((time + phase) / TWINKLE_PERIOD).rem_euclid(1.0);
    let wave = 0.5 - 0.5 * (t * std::f64::consts::TAU).cos();
    (0.6 + 0.4 * wave) as f32
}

/// Ease-out growth from 0 to 1 over half a second after a star appears.
pub fn grow(age: f64) -> f32 {
    let t = (age / GROW_SECONDS).clamp(0.0, 1.0);
    (1.0 - (1.0 - t).powi(3)) as f32
}

/// Paints today's stars. `born` maps ids of stars released this session to
/// the frame time they appeared; everything else is drawn fully grown.
pub fn paint(
    painter: &egui::Painter,
    rect: Rect,
    stars: &[Star],
    born: &HashMap<String, f64>,
    time: f64,
    color: Color32,
) {
    for (i, star) in stars.iter().enumerate() {
        let scale = born.get(&star.id).map_or(1.0, |t| grow(time - t));
        if scale <= 0.0 {
            continue;
        }

        // Stars placed in a wider window stay on screen after a resize
        let x = (star.x as f32).min(rect.width() - STAR_RADIUS);
        let y = (star.y as f32).min(rect.height() - STAR_RADIUS);
        let center = Pos2::new(rect.left() + x, rect.top() + y);
        let alpha = twinkle(time, i as f64 * 0.37);

        painter.circle_filled(center, GLOW_RADIUS * scale, color.gamma_multiply(alpha * 0.15));
        painter.circle_filled(center, STAR_RADIUS * scale, color.gamma_multiply(alpha));
    }
}
