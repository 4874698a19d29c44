pub mod affirmations;
pub mod audio;
pub mod release;
pub mod sky;

pub use affirmations::{AFFIRMATIONS, pick_random_affirmation};
pub use audio::{AudioBackend, AudioConfig, AudioError, AudioSession, EngineBackend};
pub use release::{RELEASE_DELAY, ReleaseController, ReleaseError};
pub use sky::Sky;

pub use star_ledger::{
    Clock, DayKey, FileStore, KeyValueStore, MemoryStore, PlacementBounds, Star, StarAdded,
    StarLedger, StoreError, SystemClock,
};
pub use star_transport::{VoiceId, VoiceRole};
