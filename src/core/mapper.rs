//! Block → note mapping. Pure and deterministic.

use crate::core::block::ValidBlock;
use crate::core::scale::{midi_note_to_freq, Scale};

/// Shortest note length in seconds.
pub const MIN_DURATION_SECS: f32 = 0.25;
/// Gas that buys one second of sound.
pub const GAS_PER_SECOND: f64 = 2_000_000.0;

/// A note derived from one block.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pub pitch: u8,
    pub frequency_hz: f32,
    pub velocity: f32,
    pub duration_secs: f32,
    pub origin_block: u64,
    pub gas_used: u64,
}

pub fn map(block: &ValidBlock, scale: &Scale) -> NoteEvent {
    let pitch = scale.pitch_for(block.number);

    NoteEvent {
        pitch,
        frequency_hz: midi_note_to_freq(pitch),
        velocity: velocity_from_hash_byte(block.hash_byte),
        duration_secs: duration_from_gas(block.gas_used),
        origin_block: block.number,
        gas_used: block.gas_used,
    }
}

/// Folds the byte into the upper half of the MIDI velocity range.
pub fn velocity_from_hash_byte(byte: u8) -> f32 {
    ((byte % 64) as f32 + 64.0) / 127.0
}

pub fn duration_from_gas(gas_used: u64) -> f32 {
    ((gas_used as f64 / GAS_PER_SECOND) as f32).max(MIN_DURATION_SECS)
}
