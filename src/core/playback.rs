//! Start/stop state machine tying the block feed, the engine and the
//! waveform loop together.

use std::time::Instant;

use log::{debug, error, info, warn};

use crate::core::block::BlockData;
use crate::core::mapper::{self, NoteEvent};
use crate::core::midi::MidiNoteOut;
use crate::core::scale::Scale;
use crate::core::synth::SynthesisEngine;
use crate::core::visualization::{DrawSurface, FrameHandle, FrameScheduler, VisualizationLoop};
use crate::error::SonifyError;
use crate::messaging::{BlockSource, BlockSubscription, Chain};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
}

/// What the UI shows.
#[derive(Debug, Clone, Copy)]
pub struct DisplayState<'a> {
    pub state: PlaybackState,
    pub chain: Chain,
    pub last_note: Option<&'a NoteEvent>,
    pub notes_played: u64,
}

/// Owns every piece of mutable playback state. All methods run on the UI
/// thread and finish synchronously.
pub struct PlaybackController {
    state: PlaybackState,
    engine: SynthesisEngine,
    visualizer: VisualizationLoop,
    scale: Scale,
    source: Box<dyn BlockSource>,
    subscription: Option<BlockSubscription>,
    chain: Chain,
    last_note: Option<NoteEvent>,
    last_block_number: Option<u64>,
    midi: MidiNoteOut,
    torn_down: bool,
}

impl PlaybackController {
    pub fn new(
        engine: SynthesisEngine,
        source: Box<dyn BlockSource>,
        scale: Scale,
        chain: Chain,
    ) -> Self {
        let mut controller = Self {
            state: PlaybackState::Idle,
            engine,
            visualizer: VisualizationLoop::new(),
            scale,
            source,
            subscription: None,
            chain,
            last_note: None,
            last_block_number: None,
            midi: MidiNoteOut::new(),
            torn_down: false,
        };
        controller.subscribe();
        controller
    }

    fn subscribe(&mut self) {
        self.subscription = None;
        match self.source.watch(self.chain) {
            Ok(subscription) => {
                info!("Subscribed to {} (chain id {})", self.chain.name(), self.chain.id());
                self.subscription = Some(subscription);
            }
            Err(err) => warn!("No block feed for {}: {}", self.chain.name(), err),
        }
    }

    /// Idle → Playing. Fails, leaving the controller idle, when the audio
    /// device cannot be opened.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> Result<(), SonifyError> {
        if self.torn_down {
            return Err(SonifyError::NotInitialized);
        }
        if self.state == PlaybackState::Playing {
            return Ok(());
        }

        if let Err(err) = self.engine.initialize() {
            error!("Cannot start playback: {}", err);
            return Err(err);
        }
        self.state = PlaybackState::Playing;
        self.visualizer.begin(scheduler);
        info!("Playback started on {}", self.chain.name());
        Ok(())
    }

    /// Playing → Idle. The audio context is only suspended.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.state == PlaybackState::Idle {
            return;
        }
        self.state = PlaybackState::Idle;
        self.visualizer.halt(scheduler);
        if let Err(err) = self.engine.suspend() {
            warn!("Failed to suspend audio: {}", err);
        }
        self.midi.all_notes_off();
        info!("Playback stopped");
    }

    /// Map and play one block head. Ignored unless playing, when number or
    /// hash is missing, or when the head was already played.
    pub fn on_block_data(&mut self, block: &BlockData) -> Option<&NoteEvent> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        let Some(valid) = block.validated() else {
            debug!("Skipping block without number or hash: {:?}", block.number);
            return None;
        };
        if self.last_block_number == Some(valid.number) {
            return None;
        }

        if let Some(hash) = &block.hash {
            debug!("Block {} {}", valid.number, hash.to_hex());
        }
        let event = mapper::map(&valid, &self.scale);
        if let Err(err) = self.engine.play_note(&event) {
            warn!("Block {} not played: {}", event.origin_block, err);
        }
        self.midi.send_note(&event, Instant::now());

        self.last_block_number = Some(valid.number);
        self.last_note = Some(event);
        self.last_note.as_ref()
    }

    /// Take the newest head from the feed, if any.
    pub fn pump_blocks(&mut self) -> Option<&NoteEvent> {
        let subscription = self.subscription.as_ref()?;
        let Some(block) = subscription.latest() else {
            if subscription.is_closed() {
                warn!("Block feed for {} ended", self.chain.name());
                self.subscription = None;
            }
            return None;
        };
        self.on_block_data(&block)
    }

    /// A display frame fired. Returns whether the waveform was redrawn.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        surface: &mut dyn DrawSurface,
        scheduler: &mut dyn FrameScheduler,
    ) -> bool {
        let playing = self.state == PlaybackState::Playing;
        self.visualizer
            .tick(handle, playing, &self.engine, surface, scheduler)
    }

    /// Switch chains. Returns `false` if `chain` is already watched.
    pub fn select_chain(&mut self, chain: Chain) -> bool {
        if self.torn_down || (chain == self.chain && self.subscription.is_some()) {
            return false;
        }
        self.chain = chain;
        self.last_block_number = None;
        self.subscribe();
        true
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.engine.set_volume(volume);
    }

    pub fn connect_midi(&mut self, port_name: &str) -> Result<(), SonifyError> {
        self.midi.connect_to_port(port_name)
    }

    /// Housekeeping that runs on every UI frame.
    pub fn service(&mut self, now: Instant) {
        self.midi.service(now);
    }

    /// Release the audio context and the feed. Only the first call has any
    /// effect; dropping the controller does the same.
    pub fn teardown(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.torn_down {
            return;
        }
        self.visualizer.halt(scheduler);
        self.release();
    }

    fn release(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.state = PlaybackState::Idle;
        self.visualizer.abandon();
        self.midi.disconnect();
        self.subscription = None;
        self.engine.shutdown();
        info!("Playback controller torn down");
    }

    pub fn display(&self) -> DisplayState<'_> {
        DisplayState {
            state: self.state,
            chain: self.chain,
            last_note: self.last_note.as_ref(),
            notes_played: self.engine.notes_played(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn last_note(&self) -> Option<&NoteEvent> {
        self.last_note.as_ref()
    }

    pub fn engine(&self) -> &SynthesisEngine {
        &self.engine
    }

    pub fn visualizer(&self) -> &VisualizationLoop {
        &self.visualizer
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.release();
    }
}
