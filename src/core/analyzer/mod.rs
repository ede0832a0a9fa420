use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Number of time-domain bins exposed for drawing.
pub const ANALYSIS_SIZE: usize = 2048;
/// Byte value of a silent sample.
pub const SILENCE: u8 = 128;

/// Rolling window of the most recent output samples, stored as unsigned
/// bytes centred on 128.
pub struct Analyzer {
    pub current_waveform_samples: VecDeque<u8>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            current_waveform_samples: std::iter::repeat(SILENCE).take(ANALYSIS_SIZE).collect(),
        }
    }

    pub fn push(&mut self, sample: f32) {
        if self.current_waveform_samples.len() >= ANALYSIS_SIZE {
            self.current_waveform_samples.pop_front();
        }
        self.current_waveform_samples.push_back(sample_to_byte(sample));
    }

    /// Oldest first, always `ANALYSIS_SIZE` long.
    pub fn snapshot(&self) -> Vec<u8> {
        self.current_waveform_samples.iter().copied().collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared between the audio callback (writer) and the UI thread (reader).
pub type SharedAnalyzer = Arc<Mutex<Analyzer>>;

pub fn shared_analyzer() -> SharedAnalyzer {
    Arc::new(Mutex::new(Analyzer::new()))
}

/// Maps [-1, 1] onto [0, 255], clamping anything outside.
pub fn sample_to_byte(sample: f32) -> u8 {
    (128.0 * (1.0 + sample)).floor().clamp(0.0, 255.0) as u8
}
