//! Audio output backends. A backend opens one output context around a
//! [`Mixer`]; the returned stream can be paused and resumed, and dropping it
//! closes the context.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, Stream};
use log::{error, info};

use super::mixer::Mixer;
use crate::error::SonifyError;

pub trait AudioBackend {
    /// Build an output context that pulls audio from `mixer`. The context
    /// starts suspended.
    fn open(&mut self, mixer: Mixer) -> Result<Box<dyn OutputStream>, SonifyError>;
}

pub trait OutputStream {
    fn sample_rate(&self) -> f32;
    fn resume(&mut self) -> Result<(), SonifyError>;
    fn suspend(&mut self) -> Result<(), SonifyError>;
}

/// System audio through cpal.
#[derive(Debug, Clone, Default)]
pub struct CpalBackend {
    /// Preferred output device name; the host default when `None` or missing.
    pub output_device: Option<String>,
}

impl CpalBackend {
    pub fn new(output_device: Option<String>) -> Self {
        Self { output_device }
    }

    fn pick_device(&self, host: &cpal::Host) -> Option<cpal::Device> {
        if let Some(wanted) = &self.output_device {
            let found = host.output_devices().ok().and_then(|mut devices| {
                devices.find(|d| d.name().map(|n| &n == wanted).unwrap_or(false))
            });
            match found {
                Some(device) => return Some(device),
                None => info!("Output device '{}' not found, using default", wanted),
            }
        }
        host.default_output_device()
    }
}

impl AudioBackend for CpalBackend {
    fn open(&mut self, mut mixer: Mixer) -> Result<Box<dyn OutputStream>, SonifyError> {
        let host = cpal::default_host();
        info!("Using audio host: {}", host.id().name());

        let device = self
            .pick_device(&host)
            .ok_or_else(|| SonifyError::DeviceUnavailable("No output device available".to_string()))?;
        let config = device
            .default_output_config()
            .map_err(|e| SonifyError::DeviceUnavailable(e.to_string()))?;

        let sample_format = config.sample_format();
        let config = cpal::StreamConfig::from(config);
        let sample_rate = config.sample_rate.0 as f32;
        info!(
            "Using output device {} @ {}Hz, {} channels",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            config.channels
        );
        mixer.set_sample_rate(sample_rate);

        let stream = match sample_format {
            SampleFormat::F32 => create_stream::<f32>(&device, &config, mixer),
            SampleFormat::I16 => create_stream::<i16>(&device, &config, mixer),
            SampleFormat::U16 => create_stream::<u16>(&device, &config, mixer),
            other => Err(SonifyError::DeviceUnavailable(format!(
                "Unsupported sample format {:?}",
                other
            ))),
        }?;

        // cpal streams may start running as soon as they are built
        stream.pause().ok();

        Ok(Box::new(CpalStream { stream, sample_rate }))
    }
}

struct CpalStream {
    stream: Stream,
    sample_rate: f32,
}

impl OutputStream for CpalStream {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn resume(&mut self) -> Result<(), SonifyError> {
        self.stream.play().map_err(|e| SonifyError::Stream(e.to_string()))
    }

    fn suspend(&mut self) -> Result<(), SonifyError> {
        self.stream.pause().map_err(|e| SonifyError::Stream(e.to_string()))
    }
}

fn create_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: Mixer,
) -> Result<Stream, SonifyError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut scratch: Vec<f32> = Vec::new();
    let err_fn = |err| error!("an error occurred on the audio stream: {}", err);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let frames = data.len() / channels;
                scratch.resize(frames, 0.0);
                mixer.render(&mut scratch);

                for (frame, value) in data.chunks_mut(channels).zip(scratch.iter()) {
                    let value_t = T::from_sample(*value);
                    for sample in frame.iter_mut() {
                        *sample = value_t;
                    }
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| SonifyError::Stream(e.to_string()))
}

#[derive(Default)]
struct OfflineState {
    mixer: Option<Mixer>,
    running: bool,
    contexts_opened: usize,
}

/// Backend without a device: audio is produced only when
/// [`OfflineRenderer::render`] is called. Used for headless runs and tests.
pub struct OfflineBackend {
    sample_rate: f32,
    available: bool,
    shared: Arc<Mutex<OfflineState>>,
}

impl OfflineBackend {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            available: true,
            shared: Arc::new(Mutex::new(OfflineState::default())),
        }
    }

    /// A backend whose `open` always fails, as on a machine without audio.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(super::mixer::DEFAULT_SAMPLE_RATE)
        }
    }

    pub fn renderer(&self) -> OfflineRenderer {
        OfflineRenderer {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl AudioBackend for OfflineBackend {
    fn open(&mut self, mut mixer: Mixer) -> Result<Box<dyn OutputStream>, SonifyError> {
        if !self.available {
            return Err(SonifyError::DeviceUnavailable("offline backend disabled".to_string()));
        }
        mixer.set_sample_rate(self.sample_rate);

        let mut state = self
            .shared
            .lock()
            .map_err(|_| SonifyError::DeviceUnavailable("offline state poisoned".to_string()))?;
        state.mixer = Some(mixer);
        state.running = false;
        state.contexts_opened += 1;

        Ok(Box::new(OfflineStream {
            shared: Arc::clone(&self.shared),
            sample_rate: self.sample_rate,
        }))
    }
}

struct OfflineStream {
    shared: Arc<Mutex<OfflineState>>,
    sample_rate: f32,
}

impl OfflineStream {
    fn set_running(&mut self, running: bool) -> Result<(), SonifyError> {
        let mut state = self
            .shared
            .lock()
            .map_err(|_| SonifyError::Stream("offline state poisoned".to_string()))?;
        state.running = running;
        Ok(())
    }
}

impl OutputStream for OfflineStream {
    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn resume(&mut self) -> Result<(), SonifyError> {
        self.set_running(true)
    }

    fn suspend(&mut self) -> Result<(), SonifyError> {
        self.set_running(false)
    }
}

impl Drop for OfflineStream {
    fn drop(&mut self) {
        if let Ok(mut state) = self.shared.lock() {
            state.mixer = None;
            state.running = false;
        }
    }
}

/// Pulls audio out of an [`OfflineBackend`] context.
#[derive(Clone)]
pub struct OfflineRenderer {
    shared: Arc<Mutex<OfflineState>>,
}

impl OfflineRenderer {
    /// Render `frames` mono samples. Returns nothing while the context is
    /// suspended or closed.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let Ok(mut state) = self.shared.lock() else {
            return Vec::new();
        };
        if !state.running {
            return Vec::new();
        }
        match state.mixer.as_mut() {
            Some(mixer) => {
                let mut out = vec![0.0; frames];
                mixer.render(&mut out);
                out
            }
            None => Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.shared.lock().map(|s| s.mixer.is_some()).unwrap_or(false)
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().map(|s| s.running).unwrap_or(false)
    }

    pub fn contexts_opened(&self) -> usize {
        self.shared.lock().map(|s| s.contexts_opened).unwrap_or(0)
    }

    pub fn active_voices(&self) -> usize {
        self.shared
            .lock()
            .ok()
            .and_then(|s| s.mixer.as_ref().map(|m| m.active_voices()))
            .unwrap_or(0)
    }
}
