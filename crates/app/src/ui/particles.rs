use eframe::egui::{self, Color32, Pos2, Rect};
use rand::Rng;

pub const PARTICLE_COUNT: usize = 20;
const BOB_PERIOD: f64 = 8.0;
const BOB_AMPLITUDE: f32 = 10.0;
const RADIUS: f32 = 1.5;

/// A mote of dust drifting in front of the sky, placed in viewport-relative
/// coordinates so it survives window resizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub delay: f64,
}

pub struct Particles {
    particles: Vec<Particle>,
}

impl Particles {
    pub fn new(count: usize, rng: &mut impl Rng) -> Self {
        let particles = (0..count)
            .map(|_| Particle {
                x: rng.gen_range(0.0..1.0),
                y: rng.gen_range(0.0..1.0),
                delay: rng.gen_range(0.0..BOB_PERIOD),
            })
            .collect();
        Self { particles }
    }

    pub fn paint(&self, painter: &egui::Painter, rect: Rect, time: f64, color: Color32) {
        for particle in &self.particles {
            let center = Pos2::new(
                rect.left() + particle.x * rect.width(),
                rect.top() + particle.y * rect.height() + bob_offset(time, particle.delay),
            );
            painter.circle_filled(center, RADIUS, color);
        }
    }
}

/// Vertical offset easing between -10 and +10 px and back every 8 s.
pub fn bob_offset(time: f64, delay: f64) -> f32 {
    let phase = ((time - delay) / BOB_PERIOD).rem_euclid(1.0);
    let eased = -(phase * std::f64::consts::TAU).cos() as f32;
    eased * BOB_AMPLITUDE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_particles_are_in_viewport() {
        let mut rng = StdRng::seed_from_u64(3);
        let particles = Particles::new(PARTICLE_COUNT, &mut rng);
        assert_eq!(particles.particles.len(), PARTICLE_COUNT);
        for p in &particles.particles {
            assert!((0.0..1.0).contains(&p.x));
            assert!((0.0..1.0).contains(&p.y));
            assert!((0.0..BOB_PERIOD).contains(&p.delay));
        }
    }

    #[test]
    fn test_bob_cycle() {
        assert!((bob_offset(0.0, 0.0) + 10.0).abs() < 1e-4);
        assert!((bob_offset(4.0, 0.0) - 10.0).abs() < 1e-4);
        assert!((bob_offset(8.0, 0.0) + 10.0).abs() < 1e-4);
        assert!((bob_offset(5.0, 1.0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_bob_before_delay_is_bounded() {
        for i in 0..100 {
            let offset = bob_offset(i as f64 * 0.1, 7.5);
            assert!(offset.abs() <= BOB_AMPLITUDE + 1e-4);
        }
    }
}
