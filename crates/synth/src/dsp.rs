//! Per-sample building blocks. Nothing in here allocates, so all of it is
//! safe to run inside the output callback.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

/// Phase-accumulating oscillator. Frequency is passed per sample so it can
/// follow a ramp.
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    phase: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn next(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = match self.waveform {
            Waveform::Sine => (self.phase * TAU).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
        };
        self.phase = (self.phase + frequency / sample_rate).fract();
        value
    }
}

/// Integrated white noise, leaky so it stays centered.
#[derive(Debug, Clone)]
pub struct BrownNoise {
    last: f32,
    rng: SmallRng,
}

impl BrownNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            last: 0.0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn next(&mut self) -> f32 {
        let white: f32 = self.rng.gen_range(-1.0..1.0);
        self.last = (self.last + 0.02 * white) / 1.02;
        // Scale back up to roughly unit range
        (self.last * 3.5).clamp(-1.0, 1.0)
    }
}

/// RBJ cookbook low-pass biquad.
#[derive(Debug, Clone)]
pub struct LowPass {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl LowPass {
    pub fn new(cutoff: f32, q: f32, sample_rate: f32) -> Self {
        let cutoff = cutoff.clamp(1.0, sample_rate * 0.49);
        let w0 = 2.0 * PI * cutoff / sample_rate;
        let alpha = w0.sin() / (2.0 * q);
        let cos_w0 = w0.cos();
        let a0 = 1.0 + alpha;

        Self {
            b0: (1.0 - cos_w0) / 2.0 / a0,
            b1: (1.0 - cos_w0) / a0,
            b2: (1.0 - cos_w0) / 2.0 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    pub fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Exponential ramp from `from` to `to` over a fixed number of samples,
/// holding `to` afterwards. Both ends must be positive.
#[derive(Debug, Clone)]
pub struct ExpRamp {
    value: f32,
    target: f32,
    factor: f32,
    remaining: u64,
}

impl ExpRamp {
    pub fn new(from: f32, to: f32, samples: u64) -> Self {
        let from = from.max(f32::MIN_POSITIVE);
        let to = to.max(f32::MIN_POSITIVE);
        if samples == 0 {
            return Self::constant(to);
        }
        Self {
            value: from,
            target: to,
            factor: (to / from).powf(1.0 / samples as f32),
            remaining: samples,
        }
    }

    pub fn constant(value: f32) -> Self {
        Self {
            value,
            target: value,
            factor: 1.0,
            remaining: 0,
        }
    }

    pub fn next(&mut self) -> f32 {
        let current = self.value;
        if self.remaining > 0 {
            self.remaining -= 1;
            self.value = if self.remaining == 0 {
                self.target
            } else {
                self.value * self.factor
            };
        }
        current
    }
}

/// Slow sine used to swell a voice's amplitude. Output sits in
/// `[1 - depth, 1]`.
#[derive(Debug, Clone)]
pub struct Lfo {
    osc: Oscillator,
    rate: f32,
    depth: f32,
}

impl Lfo {
    pub fn new(rate: f32, depth: f32) -> Self {
        Self {
            osc: Oscillator::new(Waveform::Sine),
            rate,
            depth: depth.clamp(0.0, 1.0),
        }
    }

    pub fn next(&mut self, sample_rate: f32) -> f32 {
        let unipolar = 0.5 + 0.5 * self.osc.next(self.rate, sample_rate);
        1.0 - self.depth * (1.0 - unipolar)
    }
}

/// One-pole smoother so gain changes don't click.
#[derive(Debug, Clone)]
pub struct Smoothed {
    current: f32,
    target: f32,
    coefficient: f32,
}

impl Smoothed {
    pub fn new(value: f32, time_constant: f32, sample_rate: f32) -> Self {
        Self {
            current: value,
            target: value,
            coefficient: (-1.0 / (time_constant * sample_rate).max(1.0)).exp(),
        }
    }

    pub fn set(&mut self, target: f32) {
        self.target = target;
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn next(&mut self) -> f32 {
        self.current = self.target + (self.current - self.target) * self.coefficient;
        if (self.current - self.target).abs() < 1e-6 {
            self.current = self.target;
        }
        self.current
    }
}
