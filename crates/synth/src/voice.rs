use star_transport::VoiceRole;

use crate::dsp::{BrownNoise, ExpRamp, Lfo, LowPass, Oscillator, Waveform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Source {
    Tone(Waveform),
    BrownNoise,
}

/// Tunable parameters for one generator role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recipe {
    pub source: Source,
    /// Start and end frequency in Hz. Equal for steady tones.
    pub frequency: (f32, f32),
    /// Start and end level. Equal for steady tones.
    pub level: (f32, f32),
    /// Seconds until the voice ends itself; `None` runs until stopped.
    pub duration: Option<f32>,
    /// Linear fade-in in seconds.
    pub attack: f32,
    pub lowpass: Option<f32>,
    /// Amplitude LFO rate in Hz.
    pub tremolo: Option<f32>,
}

impl Recipe {
    pub fn for_role(role: VoiceRole) -> Self {
        match role {
            VoiceRole::Wind => Recipe {
                source: Source::BrownNoise,
                frequency: (0.0, 0.0),
                level: (0.8, 0.8),
                duration: None,
                attack: 3.0,
                lowpass: Some(200.0),
                tremolo: None,
            },
            VoiceRole::Drone => Recipe {
                source: Source::Tone(Waveform::Sine),
                frequency: (110.0, 110.0),
                level: (0.5, 0.5),
                duration: None,
                attack: 2.0,
                lowpass: None,
                tremolo: None,
            },
            VoiceRole::Harmonic1 => Recipe {
                source: Source::Tone(Waveform::Sine),
                frequency: (165.0, 165.0),
                level: (0.2, 0.2),
                duration: None,
                attack: 2.5,
                lowpass: None,
                tremolo: None,
            },
            VoiceRole::Harmonic2 => Recipe {
                source: Source::Tone(Waveform::Sine),
                frequency: (220.0, 220.0),
                level: (0.12, 0.12),
                duration: None,
                attack: 3.0,
                lowpass: None,
                tremolo: None,
            },
            VoiceRole::Breathing => Recipe {
                source: Source::Tone(Waveform::Sine),
                frequency: (55.0, 55.0),
                level: (0.4, 0.4),
                duration: None,
                attack: 4.0,
                lowpass: None,
                tremolo: Some(0.08),
            },
            VoiceRole::Chime => Recipe {
                source: Source::Tone(Waveform::Sine),
                frequency: (800.0, 200.0),
                level: (0.1, 0.01),
                duration: Some(1.0),
                attack: 0.0,
                lowpass: None,
                tremolo: None,
            },
            VoiceRole::ChimeHarmonic => Recipe {
                source: Source::Tone(Waveform::Sine),
                frequency: (1600.0, 400.0),
                level: (0.04, 0.004),
                duration: Some(0.8),
                attack: 0.0,
                lowpass: None,
                tremolo: None,
            },
            VoiceRole::ChimeShimmer => Recipe {
                source: Source::Tone(Waveform::Triangle),
                frequency: (2400.0, 2000.0),
                level: (0.02, 0.001),
                duration: Some(0.3),
                attack: 0.0,
                lowpass: None,
                tremolo: None,
            },
        }
    }
}

enum Generator {
    Tone(Oscillator),
    Noise(BrownNoise),
}

/// A live sound generator built from a [`Recipe`].
pub struct Voice {
    role: VoiceRole,
    generator: Generator,
    frequency: ExpRamp,
    level: ExpRamp,
    filter: Option<LowPass>,
    tremolo: Option<Lfo>,
    attack_samples: u64,
    elapsed: u64,
    length: Option<u64>,
    stopped: bool,
    sample_rate: f32,
}

impl Voice {
    pub fn new(role: VoiceRole, sample_rate: u32, seed: u64) -> Self {
        Self::from_recipe(role, Recipe::for_role(role), sample_rate, seed)
    }

    pub fn from_recipe(role: VoiceRole, recipe: Recipe, sample_rate: u32, seed: u64) -> Self {
        let sr = sample_rate as f32;
        let length = recipe.duration.map(|d| (d * sr).round() as u64);
        let ramp_samples = length.unwrap_or(0);

        let generator = match recipe.source {
            Source::Tone(waveform) => Generator::Tone(Oscillator::new(waveform)),
            Source::BrownNoise => Generator::Noise(BrownNoise::new(seed)),
        };

        Self {
            role,
            generator,
            frequency: ExpRamp::new(recipe.frequency.0, recipe.frequency.1, ramp_samples),
            level: ExpRamp::new(recipe.level.0, recipe.level.1, ramp_samples),
            filter: recipe.lowpass.map(|cutoff| LowPass::new(cutoff, 0.707, sr)),
            tremolo: recipe.tremolo.map(|rate| Lfo::new(rate, 1.0)),
            attack_samples: (recipe.attack * sr).round() as u64,
            elapsed: 0,
            length,
            stopped: false,
            sample_rate: sr,
        }
    }

    pub fn role(&self) -> VoiceRole {
        self.role
    }

    /// Idempotent; a stopped voice renders silence and reports finished.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_finished(&self) -> bool {
        self.stopped || self.length.is_some_and(|len| self.elapsed >= len)
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }

        let frequency = self.frequency.next();
        let raw = match &mut self.generator {
            Generator::Tone(osc) => osc.next(frequency, self.sample_rate),
            Generator::Noise(noise) => noise.next(),
        };
        let filtered = match &mut self.filter {
            Some(filter) => filter.process(raw),
            None => raw,
        };

        let mut gain = self.level.next();
        if self.elapsed < self.attack_samples {
            gain *= self.elapsed as f32 / self.attack_samples as f32;
        }
        if let Some(lfo) = &mut self.tremolo {
            gain *= lfo.next(self.sample_rate);
        }

        self.elapsed += 1;
        filtered * gain
    }
}
