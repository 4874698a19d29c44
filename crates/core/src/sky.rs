use std::time::Instant;

use star_ledger::{Clock, KeyValueStore, PlacementBounds, StarAdded, StarLedger};

use crate::audio::{AudioBackend, AudioSession};
use crate::release::{ReleaseController, ReleaseError};

/// Everything a front end drives: today's ledger, the audio session and
/// the pending release.
pub struct Sky<S, C, B: AudioBackend> {
    ledger: StarLedger<S, C>,
    audio: AudioSession<B>,
    release: ReleaseController,
}

impl<S, C, B> Sky<S, C, B>
where
    S: KeyValueStore,
    C: Clock,
    B: AudioBackend,
{
    pub fn new(ledger: StarLedger<S, C>, audio: AudioSession<B>) -> Self {
        Self::with_release(ledger, audio, ReleaseController::default())
    }

    pub fn with_release(
        ledger: StarLedger<S, C>,
        audio: AudioSession<B>,
        release: ReleaseController,
    ) -> Self {
        Self {
            ledger,
            audio,
            release,
        }
    }

    pub fn ledger(&self) -> &StarLedger<S, C> {
        &self.ledger
    }

    pub fn audio(&self) -> &AudioSession<B> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioSession<B> {
        &mut self.audio
    }

    pub fn release(&self) -> &ReleaseController {
        &self.release
    }

    pub fn begin_release(&mut self, text: &str, now: Instant) -> Result<(), ReleaseError> {
        self.release.begin(text, now)?;
        log::debug!("release started");
        Ok(())
    }

    /// Advance timers. When a pending release comes due its star is added
    /// and the chime played; the result is returned so the caller can show
    /// its confirmation.
    pub fn tick(&mut self, now: Instant, bounds: PlacementBounds) -> Option<StarAdded> {
        self.audio.poll();
        self.ledger.refresh();

        // The text is dropped here, only the star outlives the release
        self.release.poll(now)?;
        let added = self.ledger.add_star(bounds);
        self.audio.play_release_sound();
        log::info!("star released, {} today", added.count);
        Some(added)
    }

    /// Stop all sound and let go of the audio device.
    pub fn close(&mut self) {
        self.audio.close();
    }
}
