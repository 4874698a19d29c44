use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use star_engine::{AudioEngineHandle, EngineConfig};
use star_synth::{ambient_gain, track_volume};
use star_transport::{Command, Status, VoiceId, VoiceRole};

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio engine unavailable: {0}")]
    Unavailable(String),

    #[error("audio engine is not keeping up with commands")]
    QueueFull,
}

/// The sound-producing side of an [`AudioSession`].
pub trait AudioBackend {
    fn start_voice(&mut self, role: VoiceRole) -> Result<VoiceId, AudioError>;
    /// Stopping a voice that already ended must succeed.
    fn stop_voice(&mut self, id: VoiceId) -> Result<(), AudioError>;
    fn set_master_gain(&mut self, gain: f32) -> Result<(), AudioError>;
    fn set_track_volume(&mut self, volume: f32) -> Result<(), AudioError>;
    fn play_track(&mut self) -> Result<(), AudioError>;
    fn pause_track(&mut self) -> Result<(), AudioError>;
    /// Voices that ended since the last call.
    fn poll_finished(&mut self) -> Vec<VoiceId>;
}

/// Settings for opening the real output device.
#[derive(Debug, Clone, Default)]
pub struct AudioConfig {
    pub background_track: Option<PathBuf>,
    pub start_muted: bool,
}

/// [`AudioBackend`] over the cpal output stream.
pub struct EngineBackend {
    engine: AudioEngineHandle,
    next_id: u64,
}

impl EngineBackend {
    pub fn open(config: &AudioConfig) -> anyhow::Result<Self> {
        let mut engine = star_engine::start(EngineConfig {
            master_gain: ambient_gain(config.start_muted),
            track_volume: track_volume(config.start_muted),
        })?;

        if let Some(path) = &config.background_track {
            match star_decode::load_background_track(path, engine.sample_rate()) {
                Ok(buffer) => {
                    log::info!(
                        "background track {} loaded, {:.1}s",
                        path.display(),
                        buffer.duration_seconds()
                    );
                    engine.set_track(buffer)?;
                }
                // The synthesized layers still play without it
                Err(e) => log::warn!("background track unavailable: {e:#}"),
            }
        }

        Ok(Self { engine, next_id: 0 })
    }

    fn send(&mut self, command: Command) -> Result<(), AudioError> {
        self.engine.send(command).map_err(|_| AudioError::QueueFull)
    }
}

impl AudioBackend for EngineBackend {
    fn start_voice(&mut self, role: VoiceRole) -> Result<VoiceId, AudioError> {
        let id = VoiceId(self.next_id);
        self.send(Command::StartVoice { id, role })?;
        self.next_id += 1;
        Ok(id)
    }

    fn stop_voice(&mut self, id: VoiceId) -> Result<(), AudioError> {
        self.send(Command::StopVoice { id })
    }

    fn set_master_gain(&mut self, gain: f32) -> Result<(), AudioError> {
        self.send(Command::SetMasterGain(gain))
    }

    fn set_track_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.send(Command::SetTrackVolume(volume))
    }

    fn play_track(&mut self) -> Result<(), AudioError> {
        self.send(Command::PlayTrack)
    }

    fn pause_track(&mut self) -> Result<(), AudioError> {
        self.send(Command::PauseTrack)
    }

    fn poll_finished(&mut self) -> Vec<VoiceId> {
        self.engine
            .poll()
            .into_iter()
            .map(|status| match status {
                Status::VoiceFinished(id) => id,
            })
            .collect()
    }
}

impl Drop for EngineBackend {
    fn drop(&mut self) {
        let _ = self.engine.send(Command::StopAll);
        log::debug!("closing audio engine");
    }
}

type BackendFactory<B> = Box<dyn FnOnce() -> anyhow::Result<B>>;

enum Backend<B> {
    Pending(BackendFactory<B>),
    Ready(B),
    Unavailable,
    Closed,
}

/// Ambient soundscape and release chime state. The backend is only opened
/// on first use; if that fails every toggle still updates state, it just
/// makes no sound.
pub struct AudioSession<B: AudioBackend> {
    backend: Backend<B>,
    is_playing: bool,
    is_muted: bool,
    ambient: BTreeMap<VoiceRole, VoiceId>,
    chimes: BTreeSet<VoiceId>,
}

impl AudioSession<EngineBackend> {
    /// Session over the default output device.
    pub fn with_engine(config: AudioConfig) -> Self {
        let muted = config.start_muted;
        Self::new(move || EngineBackend::open(&config), muted)
    }
}

impl<B: AudioBackend> AudioSession<B> {
    pub fn new(factory: impl FnOnce() -> anyhow::Result<B> + 'static, muted: bool) -> Self {
        Self {
            backend: Backend::Pending(Box::new(factory)),
            is_playing: false,
            is_muted: muted,
            ambient: BTreeMap::new(),
            chimes: BTreeSet::new(),
        }
    }

    /// A session with no sound at all.
    pub fn silent(muted: bool) -> Self {
        Self {
            backend: Backend::Unavailable,
            is_playing: false,
            is_muted: muted,
            ambient: BTreeMap::new(),
            chimes: BTreeSet::new(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    /// `None` until the backend has been opened.
    pub fn is_available(&self) -> Option<bool> {
        match self.backend {
            Backend::Pending(_) => None,
            Backend::Ready(_) => Some(true),
            Backend::Unavailable | Backend::Closed => Some(false),
        }
    }

    pub fn backend(&self) -> Option<&B> {
        match &self.backend {
            Backend::Ready(backend) => Some(backend),
            _ => None,
        }
    }

    pub fn ambient_voices(&self) -> &BTreeMap<VoiceRole, VoiceId> {
        &self.ambient
    }

    pub fn chime_voices(&self) -> &BTreeSet<VoiceId> {
        &self.chimes
    }

    pub fn active_voice_count(&self) -> usize {
        self.ambient.len() + self.chimes.len()
    }

    fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend = match std::mem::replace(&mut self.backend, Backend::Closed) {
            Backend::Pending(factory) => match factory() {
                Ok(mut backend) => {
                    log::info!("audio engine started");
                    apply_levels(&mut backend, self.is_muted);
                    Backend::Ready(backend)
                }
                Err(e) => {
                    log::warn!("audio disabled: {e:#}");
                    Backend::Unavailable
                }
            },
            other => other,
        };

        match &mut self.backend {
            Backend::Ready(backend) => Some(backend),
            _ => None,
        }
    }

    /// Switch the ambient soundscape on or off. Returns whether it is now
    /// playing.
    pub fn toggle_ambient(&mut self) -> bool {
        if self.is_playing {
            self.stop_ambient();
            self.is_playing = false;
            return false;
        }

        let muted = self.is_muted;
        let Some(backend) = self.backend_mut() else {
            self.is_playing = true;
            return true;
        };

        let mut started = BTreeMap::new();
        let mut failure = None;
        for role in VoiceRole::AMBIENT {
            match backend.start_voice(role) {
                Ok(id) => {
                    started.insert(role, id);
                }
                Err(e) => {
                    failure = Some((role, e));
                    break;
                }
            }
        }

        if let Some((role, e)) = failure {
            log::warn!("could not start {} layer: {e}", role.name());
            for id in started.values() {
                let _ = backend.stop_voice(*id);
            }
            return false;
        }

        apply_levels(backend, muted);
        if let Err(e) = backend.play_track() {
            log::warn!("could not start background track: {e}");
        }

        self.ambient = started;
        self.is_playing = true;
        log::debug!("ambient started with {} layers", self.ambient.len());
        true
    }

    /// Flip the mute flag and apply it to the master bus and the track.
    /// Generators keep running. Returns whether it is now muted.
    pub fn toggle_mute(&mut self) -> bool {
        self.is_muted = !self.is_muted;
        let muted = self.is_muted;
        // Levels are applied when a pending backend opens
        if let Backend::Ready(backend) = &mut self.backend {
            apply_levels(backend, muted);
        }
        muted
    }

    /// Fire the release chime. Each call gets its own voices, so
    /// overlapping chimes decay independently.
    pub fn play_release_sound(&mut self) {
        let Some(backend) = self.backend_mut() else {
            return;
        };

        let mut started = Vec::with_capacity(VoiceRole::CHIME.len());
        for role in VoiceRole::CHIME {
            match backend.start_voice(role) {
                Ok(id) => started.push(id),
                Err(e) => log::warn!("could not start {} voice: {e}", role.name()),
            }
        }
        self.chimes.extend(started);
    }

    /// Forget voices the engine has finished with.
    pub fn poll(&mut self) {
        let Backend::Ready(backend) = &mut self.backend else {
            return;
        };
        for id in backend.poll_finished() {
            if !self.chimes.remove(&id) {
                self.ambient.retain(|_, live| *live != id);
            }
        }
    }

    /// Stop everything and release the engine. Safe to call more than once.
    pub fn close(&mut self) {
        self.stop_ambient();
        if let Backend::Ready(backend) = &mut self.backend {
            for id in std::mem::take(&mut self.chimes) {
                let _ = backend.stop_voice(id);
            }
        }
        self.chimes.clear();
        self.is_playing = false;
        if !matches!(self.backend, Backend::Closed) {
            log::debug!("audio session closed");
        }
        self.backend = Backend::Closed;
    }

    fn stop_ambient(&mut self) {
        let ambient = std::mem::take(&mut self.ambient);
        let Backend::Ready(backend) = &mut self.backend else {
            return;
        };
        for (role, id) in ambient {
            if let Err(e) = backend.stop_voice(id) {
                log::warn!("could not stop {} layer: {e}", role.name());
            }
        }
        if let Err(e) = backend.pause_track() {
            log::warn!("could not pause background track: {e}");
        }
    }
}

impl<B: AudioBackend> Drop for AudioSession<B> {
    fn drop(&mut self) {
        self.close();
    }
}

fn apply_levels<B: AudioBackend>(backend: &mut B, muted: bool) {
    if let Err(e) = backend.set_master_gain(ambient_gain(muted)) {
        log::warn!("could not set master gain: {e}");
    }
    if let Err(e) = backend.set_track_volume(track_volume(muted)) {
        log::warn!("could not set track volume: {e}");
    }
}
