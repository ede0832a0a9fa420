pub mod analyzer;
pub mod block;
pub mod mapper;
pub mod midi;
pub mod oscillator;
pub mod playback;
pub mod scale;
pub mod synth;
pub mod visualization;
pub mod voice;

pub use playback::{PlaybackController, PlaybackState};
pub use synth::SynthesisEngine;
