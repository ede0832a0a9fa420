//! Audio-thread side of the engine: drains note messages, runs voices and
//! feeds the analysis buffer.

use crossbeam_channel::Receiver;

use crate::core::analyzer::SharedAnalyzer;
use crate::core::voice::Voice;
use crate::messaging::SynthMessage;

pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

pub struct Mixer {
    pub sample_rate: f32,
    pub volume: f32,
    pub voices: Vec<Voice>,
    receiver: Receiver<SynthMessage>,
    analyzer: SharedAnalyzer,
}

impl Mixer {
    pub fn new(receiver: Receiver<SynthMessage>, analyzer: SharedAnalyzer, volume: f32) -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            volume: volume.clamp(0.0, 1.0),
            voices: Vec::new(),
            receiver,
            analyzer,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    pub fn process_messages(&mut self) {
        while let Ok(msg) = self.receiver.try_recv() {
            match msg {
                SynthMessage::PlayNote(event) => {
                    self.voices.push(Voice::new(&event, self.sample_rate));
                }
                SynthMessage::SetVolume(volume) => {
                    self.volume = volume.clamp(0.0, 1.0);
                }
            }
        }
    }

    /// Fill `out` with mono frames. Voices sum without limit; only the final
    /// output is clamped.
    pub fn render(&mut self, out: &mut [f32]) {
        self.process_messages();

        let mut analyzer = self.analyzer.lock().ok();
        for frame in out.iter_mut() {
            let mut sample = 0.0;
            for voice in self.voices.iter_mut() {
                sample += voice.next_sample();
            }

            if let Some(analyzer) = analyzer.as_mut() {
                analyzer.push(sample);
            }
            *frame = (sample * self.volume).clamp(-1.0, 1.0);
        }
        drop(analyzer);

        self.voices.retain(|voice| voice.is_active());
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}
