mod waveform_canvas;

pub use waveform_canvas::WaveformCanvas;
