use std::ops::Deref;
use std::sync::Arc;

use star_transport::{AudioBuffer, Command, VoiceId};

use crate::dsp::Smoothed;
use crate::voice::Voice;

const GAIN_SMOOTHING_SECONDS: f32 = 0.05;
const VOICE_CAPACITY: usize = 64;

/// Looping playback position over a shared buffer.
struct TrackPlayer<B> {
    buffer: B,
    frame: usize,
}

/// Everything the output callback renders: ambient voices through the
/// master gain, one-shot voices straight to the output, and an optional
/// looping background track with its own volume.
///
/// `B` is the shared handle used for the track; the engine uses a
/// `basedrop::Shared` so the old buffer is never freed on the audio thread.
pub struct Mixer<B = Arc<AudioBuffer>>
where
    B: Deref<Target = AudioBuffer>,
{
    sample_rate: u32,
    voices: Vec<(VoiceId, Voice)>,
    master_gain: Smoothed,
    track: Option<TrackPlayer<B>>,
    track_volume: Smoothed,
    track_playing: bool,
}

impl<B> Mixer<B>
where
    B: Deref<Target = AudioBuffer>,
{
    pub fn new(sample_rate: u32, master_gain: f32, track_volume: f32) -> Self {
        let sr = sample_rate as f32;
        Self {
            sample_rate,
            voices: Vec::with_capacity(VOICE_CAPACITY),
            master_gain: Smoothed::new(master_gain, GAIN_SMOOTHING_SECONDS, sr),
            track: None,
            track_volume: Smoothed::new(track_volume, GAIN_SMOOTHING_SECONDS, sr),
            track_playing: false,
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::StartVoice { id, role } => {
                // Reusing an id replaces the old voice rather than doubling it
                self.voices.retain(|(existing, _)| *existing != id);
                self.voices
                    .push((id, Voice::new(role, self.sample_rate, id.0)));
            }
            Command::StopVoice { id } => {
                if let Some((_, voice)) = self.voices.iter_mut().find(|(v, _)| *v == id) {
                    voice.stop();
                }
            }
            Command::StopAll => {
                for (_, voice) in &mut self.voices {
                    voice.stop();
                }
                self.track_playing = false;
            }
            Command::SetMasterGain(gain) => self.master_gain.set(gain.max(0.0)),
            Command::SetTrackVolume(volume) => self.track_volume.set(volume.clamp(0.0, 1.0)),
            Command::PlayTrack => self.track_playing = self.track.is_some(),
            Command::PauseTrack => self.track_playing = false,
        }
    }

    /// Swap in a new background track, returning the previous one so the
    /// caller decides where it gets dropped.
    pub fn set_track(&mut self, buffer: B) -> Option<B> {
        let previous = self.track.replace(TrackPlayer { buffer, frame: 0 });
        previous.map(|player| player.buffer)
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn has_voice(&self, id: VoiceId) -> bool {
        self.voices.iter().any(|(v, _)| *v == id)
    }

    /// Fill an interleaved output buffer. `finished` is called once for
    /// every voice that ended or was stopped during this block.
    pub fn process(&mut self, data: &mut [f32], channels: usize, mut finished: impl FnMut(VoiceId)) {
        let channels = channels.max(1);

        for frame in data.chunks_mut(channels) {
            let mut master = 0.0f32;
            let mut direct = 0.0f32;
            for (_, voice) in &mut self.voices {
                let sample = voice.next_sample();
                if voice.role().is_one_shot() {
                    direct += sample;
                } else {
                    master += sample;
                }
            }

            let voice_mix = master * self.master_gain.next() + direct;
            let track_gain = self.track_volume.next();

            match &mut self.track {
                Some(player) if self.track_playing && !player.buffer.is_empty() => {
                    for (ch, out) in frame.iter_mut().enumerate() {
                        let track_sample = player.buffer.sample(player.frame, ch);
                        *out = (voice_mix + track_sample * track_gain).clamp(-1.0, 1.0);
                    }
                    player.frame = (player.frame + 1) % player.buffer.frames();
                }
                _ => {
                    for out in frame.iter_mut() {
                        *out = voice_mix.clamp(-1.0, 1.0);
                    }
                }
            }
        }

        self.voices.retain(|(id, voice)| {
            if voice.is_finished() {
                finished(*id);
                false
            } else {
                true
            }
        });
    }
}

/// Output of an offline render.
#[derive(Debug, Clone, Default)]
pub struct Render {
    pub samples: Vec<f32>,
    pub finished: Vec<VoiceId>,
}

/// Render `frames` frames offline in callback-sized blocks.
pub fn render<B>(mixer: &mut Mixer<B>, frames: usize, channels: usize) -> Render
where
    B: Deref<Target = AudioBuffer>,
{
    const BLOCK_FRAMES: usize = 512;
    let channels = channels.max(1);
    let mut out = Render {
        samples: vec![0.0; frames * channels],
        finished: Vec::new(),
    };

    for block in out.samples.chunks_mut(BLOCK_FRAMES * channels) {
        mixer.process(block, channels, |id| out.finished.push(id));
    }
    out
}
