// Drives the playback controller end to end without an audio device.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Sender};

use blocktone::core::block::{BlockData, BlockHash};
use blocktone::core::scale::Scale;
use blocktone::core::synth::device::{OfflineBackend, OfflineRenderer};
use blocktone::core::synth::ContextState;
use blocktone::core::visualization::{DrawSurface, FrameHandle, FrameScheduler, Rgb};
use blocktone::core::{PlaybackController, PlaybackState, SynthesisEngine};
use blocktone::messaging::{BlockSource, BlockSubscription, Chain};
use blocktone::SonifyError;

/// Block source whose feeds are pushed by the test.
#[derive(Clone, Default)]
struct ScriptedSource {
    feeds: Arc<Mutex<HashMap<Chain, Sender<BlockData>>>>,
    watches: Arc<Mutex<Vec<Chain>>>,
}

impl ScriptedSource {
    fn push(&self, chain: Chain, block: BlockData) -> bool {
        let feeds = self.feeds.lock().unwrap();
        match feeds.get(&chain) {
            Some(sender) => sender.send(block).is_ok(),
            None => false,
        }
    }

    /// Drop the producing side of `chain`'s feed.
    fn hang_up(&self, chain: Chain) {
        self.feeds.lock().unwrap().remove(&chain);
    }

    fn watches(&self) -> Vec<Chain> {
        self.watches.lock().unwrap().clone()
    }
}

impl BlockSource for ScriptedSource {
    fn watch(&mut self, chain: Chain) -> Result<BlockSubscription, SonifyError> {
        let (tx, rx) = unbounded();
        self.feeds.lock().unwrap().insert(chain, tx);
        self.watches.lock().unwrap().push(chain);
        Ok(BlockSubscription::new(chain, rx))
    }
}

#[derive(Default)]
struct ManualClock {
    next: u64,
    pending: Vec<FrameHandle>,
    cancelled: Vec<FrameHandle>,
}

impl ManualClock {
    /// Hand out the frame that would fire next, as the display would.
    fn fire(&mut self) -> Option<FrameHandle> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl FrameScheduler for ManualClock {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
        self.cancelled.push(handle);
    }
}

#[derive(Default)]
struct Canvas {
    frames: usize,
    lines: usize,
}

impl DrawSurface for Canvas {
    fn size(&self) -> (f32, f32) {
        (1024.0, 256.0)
    }

    fn clear(&mut self, _color: Rgb) {
        self.frames += 1;
        self.lines = 0;
    }

    fn line(&mut self, _from: [f32; 2], _to: [f32; 2], _color: Rgb) {
        self.lines += 1;
    }
}

fn block(number: u64, second_byte: u8, gas_used: u64) -> BlockData {
    BlockData::new(number, BlockHash::from_bytes(vec![0xab, second_byte, 0x01]), gas_used)
}

fn setup() -> (PlaybackController, OfflineRenderer, ScriptedSource) {
    let backend = OfflineBackend::new(8_000.0);
    let renderer = backend.renderer();
    let source = ScriptedSource::default();
    let engine = SynthesisEngine::new(Box::new(backend), 1.0);
    let controller = PlaybackController::new(
        engine,
        Box::new(source.clone()),
        Scale::default(),
        Chain::Ethereum,
    );
    (controller, renderer, source)
}

#[test]
fn test_start_plays_incoming_blocks() {
    let (mut controller, renderer, source) = setup();
    let mut clock = ManualClock::default();

    controller.start(&mut clock).unwrap();
    assert_eq!(controller.state(), PlaybackState::Playing);

    assert!(source.push(Chain::Ethereum, block(8, 0x0a, 500_000)));
    let note = controller.pump_blocks().cloned().unwrap();
    assert_eq!(note.pitch, 60);
    assert!((note.frequency_hz - 261.63).abs() < 0.01);
    assert!((note.velocity - 74.0 / 127.0).abs() < 1e-6);
    assert_eq!(note.duration_secs, 0.25);
    assert_eq!(note.origin_block, 8);

    assert_eq!(renderer.render(128).len(), 128);
    assert_eq!(renderer.active_voices(), 1);
    assert_eq!(controller.engine().last_played(), Some(&note));
}

#[test]
fn test_blocks_ignored_while_idle() {
    let (mut controller, renderer, source) = setup();

    assert!(source.push(Chain::Ethereum, block(15, 1, 10_000_000)));
    assert!(controller.pump_blocks().is_none());
    assert!(controller.last_note().is_none());
    assert_eq!(renderer.contexts_opened(), 0);

    let mut clock = ManualClock::default();
    controller.start(&mut clock).unwrap();
    controller.stop(&mut clock);
    assert!(controller.on_block_data(&block(16, 1, 0)).is_none());
    assert!(controller.last_note().is_none());
}

#[test]
fn test_missing_number_or_hash_is_skipped() {
    let (mut controller, _renderer, _source) = setup();
    let mut clock = ManualClock::default();
    controller.start(&mut clock).unwrap();

    let no_hash = BlockData { number: Some(3), hash: None, gas_used: 1 };
    let no_number = BlockData {
        number: None,
        hash: Some(BlockHash::from_bytes(vec![1, 2])),
        gas_used: 1,
    };
    assert!(controller.on_block_data(&no_hash).is_none());
    assert!(controller.on_block_data(&no_number).is_none());
    assert!(controller.last_note().is_none());
    assert_eq!(controller.state(), PlaybackState::Playing);
}

#[test]
fn test_same_head_is_not_replayed() {
    let (mut controller, renderer, _source) = setup();
    let mut clock = ManualClock::default();
    controller.start(&mut clock).unwrap();

    assert!(controller.on_block_data(&block(20, 1, 0)).is_some());
    assert!(controller.on_block_data(&block(20, 1, 0)).is_none());
    assert!(controller.on_block_data(&block(21, 1, 0)).is_some());
    renderer.render(1);
    assert_eq!(renderer.active_voices(), 2);
}

#[test]
fn test_long_gas_gives_long_note_and_voices_overlap() {
    let (mut controller, renderer, _source) = setup();
    let mut clock = ManualClock::default();
    controller.start(&mut clock).unwrap();

    let note = controller.on_block_data(&block(15, 0, 10_000_000)).cloned().unwrap();
    assert_eq!(note.pitch, 72);
    assert!((note.frequency_hz - 523.25).abs() < 0.01);
    assert_eq!(note.duration_secs, 5.0);

    for number in 100..110 {
        controller.on_block_data(&block(number, 0, 10_000_000));
    }
    renderer.render(16);
    assert_eq!(renderer.active_voices(), 11);
}

#[test]
fn test_start_without_audio_stays_idle() {
    let source = ScriptedSource::default();
    let engine = SynthesisEngine::new(Box::new(OfflineBackend::unavailable()), 1.0);
    let mut controller =
        PlaybackController::new(engine, Box::new(source), Scale::default(), Chain::Base);
    let mut clock = ManualClock::default();

    let result = controller.start(&mut clock);
    assert!(matches!(result, Err(SonifyError::DeviceUnavailable(_))));
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert!(clock.pending.is_empty());
    assert!(!controller.visualizer().is_active());
}

#[test]
fn test_redundant_transitions_are_no_ops() {
    let (mut controller, renderer, _source) = setup();
    let mut clock = ManualClock::default();

    controller.stop(&mut clock);
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert!(clock.cancelled.is_empty());

    controller.start(&mut clock).unwrap();
    controller.start(&mut clock).unwrap();
    assert_eq!(renderer.contexts_opened(), 1);
    assert_eq!(clock.pending.len(), 1);

    controller.stop(&mut clock);
    controller.stop(&mut clock);
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(controller.engine().state(), ContextState::Suspended);
    assert_eq!(clock.cancelled.len(), 1);
}

#[test]
fn test_frames_draw_while_playing() {
    let (mut controller, renderer, _source) = setup();
    let mut clock = ManualClock::default();
    let mut canvas = Canvas::default();

    controller.start(&mut clock).unwrap();
    controller.on_block_data(&block(3, 7, 4_000_000));
    renderer.render(4096);

    for _ in 0..3 {
        let handle = clock.fire().unwrap();
        assert!(controller.on_frame(handle, &mut canvas, &mut clock));
    }
    assert_eq!(canvas.frames, 3);
    assert_eq!(canvas.lines, 2047);
    assert_eq!(controller.visualizer().frames_drawn(), 3);
}

#[test]
fn test_stop_cancels_pending_frame_and_stale_tick_does_nothing() {
    let (mut controller, _renderer, _source) = setup();
    let mut clock = ManualClock::default();
    let mut canvas = Canvas::default();

    controller.start(&mut clock).unwrap();
    let stale = clock.pending[0];
    controller.stop(&mut clock);

    assert!(clock.pending.is_empty());
    assert_eq!(clock.cancelled, vec![stale]);
    assert!(!controller.on_frame(stale, &mut canvas, &mut clock));
    assert_eq!(canvas.frames, 0);
    assert!(clock.pending.is_empty());
}

#[test]
fn test_restart_resumes_same_context() {
    let (mut controller, renderer, _source) = setup();
    let mut clock = ManualClock::default();

    controller.start(&mut clock).unwrap();
    controller.stop(&mut clock);
    assert!(renderer.render(32).is_empty());

    controller.start(&mut clock).unwrap();
    assert_eq!(renderer.contexts_opened(), 1);
    assert_eq!(renderer.render(32).len(), 32);
    assert_eq!(clock.pending.len(), 1);
}

#[test]
fn test_chain_switch_resubscribes_and_keeps_last_note() {
    let (mut controller, _renderer, source) = setup();
    let mut clock = ManualClock::default();
    controller.start(&mut clock).unwrap();
    controller.on_block_data(&block(1, 1, 0));

    assert!(!controller.select_chain(Chain::Ethereum));
    assert!(controller.select_chain(Chain::Arbitrum));
    assert_eq!(source.watches(), vec![Chain::Ethereum, Chain::Arbitrum]);
    assert_eq!(controller.chain(), Chain::Arbitrum);
    assert_eq!(controller.last_note().map(|n| n.origin_block), Some(1));

    assert!(source.push(Chain::Arbitrum, block(500, 1, 0)));
    assert_eq!(controller.pump_blocks().map(|n| n.origin_block), Some(500));
}

#[test]
fn test_new_chain_plays_head_with_same_number() {
    let (mut controller, renderer, source) = setup();
    let mut clock = ManualClock::default();
    controller.start(&mut clock).unwrap();

    assert!(source.push(Chain::Ethereum, block(900, 1, 0)));
    assert_eq!(controller.pump_blocks().map(|n| n.origin_block), Some(900));

    assert!(controller.select_chain(Chain::Optimism));
    assert!(source.push(Chain::Optimism, block(900, 2, 0)));
    assert_eq!(controller.pump_blocks().map(|n| n.origin_block), Some(900));
    renderer.render(16);
    assert_eq!(renderer.active_voices(), 2);
}

#[test]
fn test_feed_hangup_still_delivers_final_head() {
    let (mut controller, _renderer, source) = setup();
    let mut clock = ManualClock::default();
    controller.start(&mut clock).unwrap();

    for number in 1..=50 {
        assert!(source.push(Chain::Ethereum, block(number, 1, 0)));
    }
    source.hang_up(Chain::Ethereum);

    assert_eq!(controller.pump_blocks().map(|n| n.origin_block), Some(50));
    assert!(controller.is_subscribed());
    assert!(controller.pump_blocks().is_none());
    assert!(!controller.is_subscribed());
}

#[test]
fn test_teardown_releases_once() {
    let (mut controller, renderer, _source) = setup();
    let mut clock = ManualClock::default();
    controller.start(&mut clock).unwrap();
    let pending = clock.pending[0];

    controller.teardown(&mut clock);
    assert!(controller.is_torn_down());
    assert!(!renderer.is_open());
    assert_eq!(controller.engine().state(), ContextState::Closed);
    assert_eq!(clock.cancelled, vec![pending]);
    assert!(!controller.is_subscribed());

    controller.teardown(&mut clock);
    assert_eq!(clock.cancelled.len(), 1);
    assert!(matches!(controller.start(&mut clock), Err(SonifyError::NotInitialized)));
}

#[test]
fn test_drop_closes_audio_context() {
    let (mut controller, renderer, _source) = setup();
    let mut clock = ManualClock::default();
    controller.start(&mut clock).unwrap();
    assert!(renderer.is_open());

    drop(controller);
    assert!(!renderer.is_open());
}

#[test]
fn test_display_reflects_state() {
    let (mut controller, _renderer, _source) = setup();
    let mut clock = ManualClock::default();

    let display = controller.display();
    assert_eq!(display.state, PlaybackState::Idle);
    assert_eq!(display.chain, Chain::Ethereum);
    assert!(display.last_note.is_none());
    assert_eq!(display.notes_played, 0);

    controller.start(&mut clock).unwrap();
    controller.on_block_data(&block(9, 2, 3_000_000));
    let display = controller.display();
    assert_eq!(display.state, PlaybackState::Playing);
    let note = display.last_note.unwrap();
    assert_eq!(note.origin_block, 9);
    assert_eq!(note.gas_used, 3_000_000);
    assert_eq!(note.pitch, 62);
    assert_eq!(display.notes_played, 1);
}
