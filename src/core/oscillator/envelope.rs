/// Fixed attack length of every voice.
pub const ATTACK_SECS: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Idle,
}

/// Linear attack to `peak`, then linear decay back to silence.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub attack: f32,
    pub peak: f32,
    pub decay: f32,
}

impl Envelope {
    pub fn new(peak: f32, decay: f32) -> Self {
        Self {
            attack: ATTACK_SECS,
            peak,
            decay,
        }
    }

    /// Seconds from start until the gain is back at zero.
    pub fn length(&self) -> f32 {
        self.attack + self.decay
    }

    pub fn stage_at(&self, time: f32) -> EnvelopeStage {
        if time < self.attack {
            EnvelopeStage::Attack
        } else if time < self.length() {
            EnvelopeStage::Decay
        } else {
            EnvelopeStage::Idle
        }
    }

    pub fn value_at(&self, time: f32) -> f32 {
        match self.stage_at(time) {
            EnvelopeStage::Attack => self.peak * (time / self.attack).max(0.0),
            EnvelopeStage::Decay => {
                let progress = (time - self.attack) / self.decay;
                self.peak * (1.0 - progress)
            }
            EnvelopeStage::Idle => 0.0,
        }
    }
}
