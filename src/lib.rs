//! Block sonification: maps chain blocks to notes, synthesizes them and
//! exposes a live waveform for drawing.

pub mod config;
pub mod core;
pub mod error;
pub mod messaging;
pub mod utils;

pub use error::SonifyError;
