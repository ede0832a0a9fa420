mod envelope;

pub use self::envelope::{Envelope, EnvelopeStage, ATTACK_SECS};

use std::f32::consts::PI;

/// Phase-accumulating sine oscillator.
#[derive(Debug, Clone)]
pub struct SineOscillator {
    pub phase: f32,
    pub phase_increment: f32,
}

impl SineOscillator {
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_increment: frequency / sample_rate,
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        let value = (2.0 * PI * self.phase).sin();
        self.phase = (self.phase + self.phase_increment) % 1.0;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_starts_at_zero_and_peaks_at_quarter_period() {
        // 4 samples per period
        let mut osc = SineOscillator::new(11_025.0, 44_100.0);
        assert!(osc.next_sample().abs() < 1e-6);
        assert!((osc.next_sample() - 1.0).abs() < 1e-6);
        assert!(osc.next_sample().abs() < 1e-5);
        assert!((osc.next_sample() + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_phase_stays_wrapped() {
        let mut osc = SineOscillator::new(523.25, 48_000.0);
        for _ in 0..100_000 {
            osc.next_sample();
            assert!(osc.phase >= 0.0 && osc.phase < 1.0);
        }
    }
}
