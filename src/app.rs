use std::time::{Duration, Instant};

use eframe::egui;
use log::{info, warn};

use blocktone::config::Settings;
use blocktone::core::midi::MidiNoteOut;
use blocktone::core::synth::device::CpalBackend;
use blocktone::core::{PlaybackController, SynthesisEngine};
use blocktone::messaging::SimulatedBlockSource;

use crate::ui::components::WaveformCanvas;
use crate::ui::frame_clock::EguiFrameClock;
use crate::ui::panels::{now_playing, transport, transport::TransportAction};

/// Feed polling interval while no animation frame is pending.
const IDLE_POLL: Duration = Duration::from_millis(50);

pub struct SonifierApp {
    controller: PlaybackController,
    clock: EguiFrameClock,
    canvas: WaveformCanvas,
    settings: Settings,
    last_error: Option<String>,
}

impl SonifierApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::load_or_default();
        info!(
            "Loaded settings: chain {}, scale {:?}",
            settings.chain.name(),
            settings.scale.pitches()
        );

        let backend = CpalBackend::new(settings.output_device.clone());
        let engine = SynthesisEngine::new(Box::new(backend), settings.volume);
        let mut controller = PlaybackController::new(
            engine,
            Box::new(SimulatedBlockSource::new()),
            settings.scale.clone(),
            settings.chain,
        );

        if let Some(port) = &settings.midi_output_port {
            if let Err(err) = controller.connect_midi(port) {
                warn!(
                    "MIDI mirror disabled: {} (available ports: {:?})",
                    err,
                    MidiNoteOut::list_ports()
                );
            }
        }

        Self {
            controller,
            clock: EguiFrameClock::new(cc.egui_ctx.clone()),
            canvas: WaveformCanvas::new(1024.0, 240.0),
            settings,
            last_error: None,
        }
    }

    fn apply(&mut self, action: TransportAction) {
        match action {
            TransportAction::Start => match self.controller.start(&mut self.clock) {
                Ok(()) => self.last_error = None,
                Err(err) => self.last_error = Some(err.to_string()),
            },
            TransportAction::Stop => self.controller.stop(&mut self.clock),
            TransportAction::SelectChain(chain) => {
                if self.controller.select_chain(chain) {
                    self.settings.chain = chain;
                    if let Err(err) = self.settings.save() {
                        warn!("Failed to save settings: {:#}", err);
                    }
                }
            }
            TransportAction::SetVolume(volume) => {
                self.settings.volume = volume;
                self.controller.set_volume(volume);
            }
        }
    }
}

impl eframe::App for SonifierApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.pump_blocks();
        self.controller.service(Instant::now());
        if let Some(handle) = self.clock.take_due() {
            self.controller
                .on_frame(handle, &mut self.canvas, &mut self.clock);
        }

        let mut actions = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("blocktone");
            ui.add_space(8.0);

            let display = self.controller.display();
            actions = transport::show(ui, display.state, display.chain, self.settings.volume);
            if let Some(err) = &self.last_error {
                ui.colored_label(egui::Color32::LIGHT_RED, err);
            }

            ui.separator();
            now_playing::show(ui, &display);
            ui.add_space(8.0);
            self.canvas.show(ui);
        });

        for action in actions {
            self.apply(action);
        }

        ctx.request_repaint_after(IDLE_POLL);
    }
}

impl Drop for SonifierApp {
    fn drop(&mut self) {
        self.controller.teardown(&mut self.clock);
        if let Err(err) = self.settings.save() {
            warn!("Failed to save settings: {:#}", err);
        }
    }
}
