pub mod device;
pub mod mixer;

use crossbeam_channel::{unbounded, Sender};
use log::{debug, info};

use crate::core::analyzer::{shared_analyzer, SharedAnalyzer, ANALYSIS_SIZE, SILENCE};
use crate::core::mapper::NoteEvent;
use crate::core::visualization::WaveformSource;
use crate::error::SonifyError;
use crate::messaging::SynthMessage;
use device::{AudioBackend, OutputStream};
use mixer::Mixer;

/// Lifecycle of the engine's output context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Closed,
    Running,
    Suspended,
}

/// Owns the audio output context and turns note events into voices.
///
/// Voices are rendered on the backend's audio thread; this side only queues
/// notes and reads back the analysis buffer, so nothing here blocks.
pub struct SynthesisEngine {
    backend: Box<dyn AudioBackend>,
    stream: Option<Box<dyn OutputStream>>,
    sender: Option<Sender<SynthMessage>>,
    analyzer: SharedAnalyzer,
    state: ContextState,
    volume: f32,
    last_played: Option<NoteEvent>,
    notes_played: u64,
}

impl SynthesisEngine {
    pub fn new(backend: Box<dyn AudioBackend>, volume: f32) -> Self {
        Self {
            backend,
            stream: None,
            sender: None,
            analyzer: shared_analyzer(),
            state: ContextState::Closed,
            volume: volume.clamp(0.0, 1.0),
            last_played: None,
            notes_played: 0,
        }
    }

    /// Open the output context if there is none, or resume a suspended one.
    /// Calling it on a running engine does nothing.
    pub fn initialize(&mut self) -> Result<(), SonifyError> {
        match self.state {
            ContextState::Running => Ok(()),
            ContextState::Suspended => {
                if let Some(stream) = self.stream.as_mut() {
                    stream.resume()?;
                }
                self.state = ContextState::Running;
                info!("Audio context resumed");
                Ok(())
            }
            ContextState::Closed => {
                let (sender, receiver) = unbounded();
                let analyzer = shared_analyzer();
                let mixer = Mixer::new(receiver, analyzer.clone(), self.volume);

                let mut stream = self.backend.open(mixer)?;
                stream.resume()?;
                info!("Audio context opened at {}Hz", stream.sample_rate());

                self.stream = Some(stream);
                self.sender = Some(sender);
                self.analyzer = analyzer;
                self.state = ContextState::Running;
                Ok(())
            }
        }
    }

    /// Queue a one-shot voice for `event`.
    pub fn play_note(&mut self, event: &NoteEvent) -> Result<(), SonifyError> {
        let sender = self.sender.as_ref().ok_or(SonifyError::NotInitialized)?;
        sender
            .send(SynthMessage::PlayNote(event.clone()))
            .map_err(|_| SonifyError::Stream("audio callback has gone away".to_string()))?;

        debug!(
            "Playing block {}: pitch {} ({:.2} Hz) for {:.2}s",
            event.origin_block, event.pitch, event.frequency_hz, event.duration_secs
        );
        self.last_played = Some(event.clone());
        self.notes_played += 1;
        Ok(())
    }

    /// Pause processing; voices and the context are kept.
    pub fn suspend(&mut self) -> Result<(), SonifyError> {
        if self.state != ContextState::Running {
            return Ok(());
        }
        if let Some(stream) = self.stream.as_mut() {
            stream.suspend()?;
        }
        self.state = ContextState::Suspended;
        info!("Audio context suspended");
        Ok(())
    }

    /// Release the output context. The engine needs `initialize` again
    /// before it can play.
    pub fn shutdown(&mut self) {
        if self.state == ContextState::Closed {
            return;
        }
        self.sender = None;
        self.stream = None;
        self.state = ContextState::Closed;
        info!("Audio context closed");
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sender) = &self.sender {
            sender.send(SynthMessage::SetVolume(self.volume)).ok();
        }
    }

    /// Latest time-domain frame, oldest sample first.
    pub fn analysis_snapshot(&self) -> Vec<u8> {
        match self.analyzer.lock() {
            Ok(analyzer) => analyzer.snapshot(),
            Err(_) => vec![SILENCE; ANALYSIS_SIZE],
        }
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn last_played(&self) -> Option<&NoteEvent> {
        self.last_played.as_ref()
    }

    pub fn notes_played(&self) -> u64 {
        self.notes_played
    }
}

impl WaveformSource for SynthesisEngine {
    fn analysis_snapshot(&self) -> Vec<u8> {
        SynthesisEngine::analysis_snapshot(self)
    }
}
