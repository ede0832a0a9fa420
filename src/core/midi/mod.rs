mod output;

pub use output::{note_off_message, note_on_message, velocity_to_midi, MidiNoteOut};
