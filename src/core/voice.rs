use crate::core::mapper::NoteEvent;
use crate::core::oscillator::{Envelope, SineOscillator};

/// One sounding note: a sine oscillator under an attack/decay envelope.
/// Finishes by itself once the envelope has run out.
pub struct Voice {
    pub origin_block: u64,
    pub oscillator: SineOscillator,
    pub envelope: Envelope,
    pub elapsed_samples: u64,
    pub stop_sample: u64,
    sample_rate: f32,
}

impl Voice {
    pub fn new(event: &NoteEvent, sample_rate: f32) -> Self {
        let envelope = Envelope::new(event.velocity, event.duration_secs);
        let stop_sample = (envelope.length() as f64 * sample_rate as f64).round() as u64;

        Self {
            origin_block: event.origin_block,
            oscillator: SineOscillator::new(event.frequency_hz, sample_rate),
            envelope,
            elapsed_samples: 0,
            stop_sample,
            sample_rate,
        }
    }

    pub fn is_active(&self) -> bool {
        self.elapsed_samples < self.stop_sample
    }

    pub fn next_sample(&mut self) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        let gain = self.envelope.value_at(self.time());
        self.elapsed_samples += 1;
        self.oscillator.next_sample() * gain
    }

    fn time(&self) -> f32 {
        (self.elapsed_samples as f64 / self.sample_rate as f64) as f32
    }
}
