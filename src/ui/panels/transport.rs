use egui::{ComboBox, Slider, Ui};

use blocktone::core::PlaybackState;
use blocktone::messaging::Chain;

/// What the user asked for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportAction {
    Start,
    Stop,
    SelectChain(Chain),
    SetVolume(f32),
}

pub fn show(ui: &mut Ui, state: PlaybackState, chain: Chain, volume: f32) -> Vec<TransportAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        let label = match state {
            PlaybackState::Idle => "▶ Start",
            PlaybackState::Playing => "⏹ Stop",
        };
        if ui.button(label).clicked() {
            actions.push(match state {
                PlaybackState::Idle => TransportAction::Start,
                PlaybackState::Playing => TransportAction::Stop,
            });
        }

        ui.separator();

        let mut selected = chain;
        ComboBox::from_label("Chain")
            .selected_text(selected.name())
            .show_ui(ui, |ui| {
                for option in Chain::ALL {
                    ui.selectable_value(&mut selected, option, option.name());
                }
            });
        if selected != chain {
            actions.push(TransportAction::SelectChain(selected));
        }

        ui.separator();

        let mut level = volume;
        if ui.add(Slider::new(&mut level, 0.0..=1.0).text("Volume")).changed() {
            actions.push(TransportAction::SetVolume(level));
        }
    });

    actions
}
