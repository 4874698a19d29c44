use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Interleaved PCM audio, used for the background track.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Sample at `frame` for output channel `channel`, wrapping the channel
    /// index so mono material feeds every output channel.
    pub fn sample(&self, frame: usize, channel: usize) -> f32 {
        let channels = self.channels as usize;
        if channels == 0 {
            return 0.0;
        }
        self.samples
            .get(frame * channels + channel % channels)
            .copied()
            .unwrap_or(0.0)
    }
}

/// The role a sound generator plays. Ambient roles are routed through the
/// master bus, one-shot roles go straight to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VoiceRole {
    Wind,
    Drone,
    Harmonic1,
    Harmonic2,
    Breathing,
    Chime,
    ChimeHarmonic,
    ChimeShimmer,
}

impl VoiceRole {
    pub const AMBIENT: [VoiceRole; 5] = [
        VoiceRole::Wind,
        VoiceRole::Drone,
        VoiceRole::Harmonic1,
        VoiceRole::Harmonic2,
        VoiceRole::Breathing,
    ];

    pub const CHIME: [VoiceRole; 3] = [
        VoiceRole::Chime,
        VoiceRole::ChimeHarmonic,
        VoiceRole::ChimeShimmer,
    ];

    pub fn is_one_shot(&self) -> bool {
        matches!(
            self,
            VoiceRole::Chime | VoiceRole::ChimeHarmonic | VoiceRole::ChimeShimmer
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            VoiceRole::Wind => "wind",
            VoiceRole::Drone => "drone",
            VoiceRole::Harmonic1 => "harmonic-1",
            VoiceRole::Harmonic2 => "harmonic-2",
            VoiceRole::Breathing => "breathing-lfo",
            VoiceRole::Chime => "chime",
            VoiceRole::ChimeHarmonic => "chime-harmonic",
            VoiceRole::ChimeShimmer => "chime-shimmer",
        }
    }
}

/// Handle to a live voice inside the mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

/// Messages sent from the control thread to the audio thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    StartVoice { id: VoiceId, role: VoiceRole },
    StopVoice { id: VoiceId },
    StopAll,
    SetMasterGain(f32),
    SetTrackVolume(f32),
    PlayTrack,
    PauseTrack,
}

/// Messages reported back from the audio thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    VoiceFinished(VoiceId),
}

/// Resample a buffer to the output device rate.
pub fn resample_audio(buffer: &AudioBuffer, target_sample_rate: u32) -> anyhow::Result<AudioBuffer> {
    if buffer.sample_rate == target_sample_rate || buffer.is_empty() {
        return Ok(AudioBuffer {
            samples: buffer.samples.clone(),
            sample_rate: target_sample_rate,
            channels: buffer.channels,
        });
    }

    let channels = buffer.channels as usize;
    let input_frames = buffer.frames();
    let ratio = target_sample_rate as f64 / buffer.sample_rate as f64;

    // rubato wants planar input
    let mut planar = vec![Vec::with_capacity(input_frames); channels];
    for frame in buffer.samples.chunks_exact(channels) {
        for (ch, sample) in frame.iter().enumerate() {
            planar[ch].push(*sample);
        }
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, input_frames, channels)?;
    let delay = resampler.output_delay();
    let expected = (input_frames as f64 * ratio).ceil() as usize;
    let mut output = resampler.process(&planar, None)?;

    // Flush the filter tail, otherwise the end of the file is cut off
    while output.first().map_or(0, Vec::len) < delay + expected {
        let tail = resampler.process_partial(None::<&[Vec<f32>]>, None)?;
        if tail.first().is_none_or(|c| c.is_empty()) {
            break;
        }
        for (channel, rest) in output.iter_mut().zip(tail) {
            channel.extend(rest);
        }
    }

    // Skip the filter delay so a looped track starts on its first sample
    let available = output.first().map_or(0, Vec::len);
    let end = available.min(delay + expected);
    let start = delay.min(end);
    let mut samples = Vec::with_capacity((end - start) * channels);
    for frame_idx in start..end {
        for channel in &output {
            samples.push(channel[frame_idx]);
        }
    }

    Ok(AudioBuffer {
        samples,
        sample_rate: target_sample_rate,
        channels: buffer.channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(frequency: f32, sample_rate: u32, frames: usize) -> AudioBuffer {
        let samples = (0..frames)
            .map(|i| (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
            .collect();
        AudioBuffer {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    #[test]
    fn test_frames_and_duration() {
        let buffer = AudioBuffer {
            samples: vec![0.0; 88200],
            sample_rate: 44100,
            channels: 2,
        };
        assert_eq!(buffer.frames(), 44100);
        assert!((buffer.duration_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_wraps_mono_across_channels() {
        let buffer = AudioBuffer {
            samples: vec![0.25, 0.5],
            sample_rate: 44100,
            channels: 1,
        };
        assert_eq!(buffer.sample(1, 0), 0.5);
        assert_eq!(buffer.sample(1, 1), 0.5);
        assert_eq!(buffer.sample(5, 0), 0.0);
    }

    #[test]
    fn test_zero_channel_buffer_is_empty() {
        let buffer = AudioBuffer {
            samples: vec![1.0],
            sample_rate: 44100,
            channels: 0,
        };
        assert!(buffer.is_empty());
        assert_eq!(buffer.sample(0, 0), 0.0);
    }

    #[test]
    fn test_one_shot_roles() {
        for role in VoiceRole::AMBIENT {
            assert!(!role.is_one_shot(), "{} should be continuous", role.name());
        }
        for role in VoiceRole::CHIME {
            assert!(role.is_one_shot(), "{} should be one-shot", role.name());
        }
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let buffer = sine(440.0, 48000, 480);
        let out = resample_audio(&buffer, 48000).expect("resample");
        assert_eq!(out.samples, buffer.samples);
    }

    #[test]
    fn test_resample_changes_length() {
        let buffer = sine(440.0, 44100, 44100);
        let out = resample_audio(&buffer, 48000).expect("resample");
        assert_eq!(out.sample_rate, 48000);
        assert_eq!(out.frames(), 48000);
    }

    #[test]
    fn test_resample_keeps_phase_and_tail() {
        let buffer = sine(440.0, 44100, 44100);
        let out = resample_audio(&buffer, 48000).expect("resample");

        // Mid-file the output lines up with the same sine at the new rate
        let reference = sine(440.0, 48000, 48000);
        for i in 1000..1100 {
            let diff = (out.samples[i] - reference.samples[i]).abs();
            assert!(diff < 0.1, "frame {i} off by {diff}");
        }

        // Neither end is swallowed by the filter delay
        let head = out.samples[..100].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let tail = out.samples[out.samples.len() - 200..]
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(head > 0.5, "head peak {head}");
        assert!(tail > 0.8, "tail peak {tail}");
    }
}
