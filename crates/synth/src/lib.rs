pub mod dsp;
mod mixer;
mod voice;

pub use mixer::{Mixer, Render, render};
pub use voice::{Recipe, Source, Voice};

/// Master bus level while unmuted.
pub const AMBIENT_GAIN: f32 = 0.1;
/// Background track volume while unmuted.
pub const TRACK_VOLUME: f32 = 0.3;

/// Master gain for the given mute state.
pub fn ambient_gain(muted: bool) -> f32 {
    if muted { 0.0 } else { AMBIENT_GAIN }
}

/// Background track volume for the given mute state.
pub fn track_volume(muted: bool) -> f32 {
    if muted { 0.0 } else { TRACK_VOLUME }
}
