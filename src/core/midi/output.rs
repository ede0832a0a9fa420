use std::time::{Duration, Instant};

use log::{info, warn};
use midir::{MidiOutput, MidiOutputConnection};

use crate::core::mapper::NoteEvent;
use crate::core::oscillator::ATTACK_SECS;
use crate::error::SonifyError;

const CLIENT_NAME: &str = "blocktone MIDI Output";

pub fn velocity_to_midi(velocity: f32) -> u8 {
    (velocity * 127.0).round().clamp(0.0, 127.0) as u8
}

pub fn note_on_message(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
}

pub fn note_off_message(channel: u8, note: u8) -> [u8; 3] {
    [0x80 | (channel & 0x0F), note & 0x7F, 0]
}

/// Mirrors played notes to a MIDI output port. Note-offs are sent from
/// [`MidiNoteOut::service`] once each note's length has passed.
pub struct MidiNoteOut {
    connection: Option<MidiOutputConnection>,
    channel: u8,
    pending_offs: Vec<(u8, Instant)>,
}

impl MidiNoteOut {
    pub fn new() -> Self {
        Self {
            connection: None,
            channel: 0,
            pending_offs: Vec::new(),
        }
    }

    /// List all available MIDI output ports
    pub fn list_ports() -> Vec<String> {
        match MidiOutput::new(CLIENT_NAME) {
            Ok(midi_out) => midi_out
                .ports()
                .iter()
                .filter_map(|port| midi_out.port_name(port).ok())
                .collect(),
            Err(err) => {
                warn!("Error initializing MIDI output: {}", err);
                Vec::new()
            }
        }
    }

    pub fn connect_to_port(&mut self, port_name: &str) -> Result<(), SonifyError> {
        self.disconnect();

        let midi_out = MidiOutput::new(CLIENT_NAME)
            .map_err(|e| SonifyError::DeviceUnavailable(format!("MIDI output: {}", e)))?;
        let port = midi_out
            .ports()
            .into_iter()
            .find(|port| midi_out.port_name(port).map(|name| name == port_name).unwrap_or(false))
            .ok_or_else(|| SonifyError::DeviceUnavailable(format!("MIDI port '{}' not found", port_name)))?;

        let conn = midi_out
            .connect(&port, "blocktone-notes")
            .map_err(|e| SonifyError::DeviceUnavailable(format!("MIDI connect: {}", e)))?;
        info!("Mirroring notes to MIDI port '{}'", port_name);
        self.connection = Some(conn);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.all_notes_off();
        if let Some(conn) = self.connection.take() {
            conn.close();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn send_note(&mut self, event: &NoteEvent, now: Instant) {
        let Some(conn) = self.connection.as_mut() else {
            return;
        };
        let message = note_on_message(self.channel, event.pitch, velocity_to_midi(event.velocity));
        if let Err(err) = conn.send(&message) {
            warn!("Failed to send MIDI note on: {}", err);
            return;
        }
        let length = Duration::from_secs_f32(ATTACK_SECS + event.duration_secs);
        self.pending_offs.push((event.pitch, now + length));
    }

    /// Send note-offs that have come due.
    pub fn service(&mut self, now: Instant) {
        let channel = self.channel;
        let conn = &mut self.connection;
        self.pending_offs.retain(|&(note, due)| {
            if due > now {
                return true;
            }
            if let Some(conn) = conn.as_mut() {
                conn.send(&note_off_message(channel, note)).ok();
            }
            false
        });
    }

    /// Release every sounding note, however long it still had to run.
    pub fn all_notes_off(&mut self) {
        for (note, _) in self.pending_offs.drain(..) {
            if let Some(conn) = self.connection.as_mut() {
                conn.send(&note_off_message(self.channel, note)).ok();
            }
        }
    }

    pub fn pending_note_offs(&self) -> usize {
        self.pending_offs.len()
    }
}

impl Default for MidiNoteOut {
    fn default() -> Self {
        Self::new()
    }
}
