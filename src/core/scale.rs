use serde::{Deserialize, Serialize};

use crate::error::SonifyError;

/// Number of pitches in every scale.
pub const SCALE_LEN: usize = 8;

/// C major, C4 to C5.
pub const DEFAULT_SCALE: [u8; SCALE_LEN] = [60, 62, 64, 65, 67, 69, 71, 72];

/// Convert MIDI note number to frequency in Hz
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0f32.powf((note as f32 - 69.0) / 12.0)
}

/// Ordered set of `SCALE_LEN` pitches that blocks are mapped onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Scale {
    pitches: Vec<u8>,
}

impl Scale {
    pub fn new(pitches: Vec<u8>) -> Result<Self, SonifyError> {
        if pitches.len() != SCALE_LEN {
            return Err(SonifyError::InvalidScale(format!(
                "expected {} pitches, got {}",
                SCALE_LEN,
                pitches.len()
            )));
        }
        if let Some(bad) = pitches.iter().find(|&&p| p > 127) {
            return Err(SonifyError::InvalidScale(format!(
                "pitch {} is outside the MIDI range",
                bad
            )));
        }
        Ok(Self { pitches })
    }

    pub fn pitches(&self) -> &[u8] {
        &self.pitches
    }

    /// Pitch for a block number, wrapping around the scale.
    pub fn pitch_for(&self, number: u64) -> u8 {
        let index = (number % self.pitches.len() as u64) as usize;
        self.pitches[index]
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            pitches: DEFAULT_SCALE.to_vec(),
        }
    }
}

impl TryFrom<Vec<u8>> for Scale {
    type Error = SonifyError;

    fn try_from(pitches: Vec<u8>) -> Result<Self, Self::Error> {
        Scale::new(pitches)
    }
}

impl From<Scale> for Vec<u8> {
    fn from(scale: Scale) -> Self {
        scale.pitches
    }
}
