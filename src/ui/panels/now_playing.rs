use egui::{Grid, RichText, Ui};

use blocktone::core::playback::DisplayState;
use blocktone::core::PlaybackState;
use blocktone::utils::helpers::{format_count, format_frequency, format_time, note_name};

pub fn show(ui: &mut Ui, display: &DisplayState<'_>) {
    let status = match display.state {
        PlaybackState::Idle => RichText::new("Idle"),
        PlaybackState::Playing => RichText::new("Playing").strong(),
    };
    ui.horizontal(|ui| {
        ui.label(status);
        ui.label(format!("· {} (chain {})", display.chain.name(), display.chain.id()));
    });

    let Some(note) = display.last_note else {
        ui.label("Waiting for the next block…");
        return;
    };

    Grid::new("now_playing").num_columns(2).striped(true).show(ui, |ui| {
        ui.label("Block");
        ui.label(format_count(note.origin_block));
        ui.end_row();

        ui.label("Pitch");
        ui.label(format!("{} ({})", note_name(note.pitch), note.pitch));
        ui.end_row();

        ui.label("Frequency");
        ui.label(format_frequency(note.frequency_hz));
        ui.end_row();

        ui.label("Duration");
        ui.label(format_time(note.duration_secs));
        ui.end_row();

        ui.label("Gas used");
        ui.label(format_count(note.gas_used));
        ui.end_row();

        ui.label("Notes played");
        ui.label(format_count(display.notes_played));
        ui.end_row();
    });
}
