//! Waveform drawing loop.
//!
//! The loop is driven by a [`FrameScheduler`] (the display's refresh clock).
//! Every tick carries the handle it was scheduled under; a tick whose handle
//! is no longer the pending one, or that arrives after playback stopped, is
//! dropped without touching the engine or the surface.

/// Opaque id of one requested display frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Display refresh clock.
pub trait FrameScheduler {
    /// Ask for one callback on the next display frame.
    fn request_frame(&mut self) -> FrameHandle;
    /// Withdraw a request made with [`FrameScheduler::request_frame`].
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Anything that can hand out the current time-domain frame.
pub trait WaveformSource {
    fn analysis_snapshot(&self) -> Vec<u8>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A 2-D surface the loop draws onto.
pub trait DrawSurface {
    fn size(&self) -> (f32, f32);
    fn clear(&mut self, color: Rgb);
    fn line(&mut self, from: [f32; 2], to: [f32; 2], color: Rgb);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: [f32; 2],
    pub to: [f32; 2],
    pub color: Rgb,
}

/// Color for a normalized amplitude: green when quiet, red-magenta when loud.
pub fn amplitude_color(v: f32) -> Rgb {
    let a = v.abs().min(1.0);
    Rgb::new(
        (a * 255.0) as u8,
        (255.0 - a * 255.0) as u8,
        (a * 127.0) as u8,
    )
}

/// Turn byte samples into line segments spanning a `width` × `height` box.
/// Each segment takes the color of the point it ends on.
pub fn waveform_segments(samples: &[u8], width: f32, height: f32) -> Vec<Segment> {
    if samples.is_empty() {
        return Vec::new();
    }

    let slice_width = width / samples.len() as f32;
    let mut segments = Vec::with_capacity(samples.len().saturating_sub(1));
    let mut previous: Option<[f32; 2]> = None;

    for (i, &sample) in samples.iter().enumerate() {
        let v = sample as f32 / 128.0 - 1.0;
        let point = [i as f32 * slice_width, (v + 1.0) * height / 2.0];

        if let Some(from) = previous {
            segments.push(Segment {
                from,
                to: point,
                color: amplitude_color(v),
            });
        }
        previous = Some(point);
    }

    segments
}

/// Self-rescheduling, cancellable draw loop.
#[derive(Debug, Default)]
pub struct VisualizationLoop {
    pending: Option<FrameHandle>,
    active: bool,
    frames_drawn: u64,
}

impl VisualizationLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the first frame. Does nothing if already running.
    pub fn begin(&mut self, scheduler: &mut dyn FrameScheduler) {
        if self.active {
            return;
        }
        self.active = true;
        self.pending = Some(scheduler.request_frame());
    }

    /// Stop the loop and withdraw the pending frame, if any.
    pub fn halt(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.active = false;
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
    }

    /// Stop without a scheduler at hand. The outstanding request is
    /// forgotten, so when it fires it is recognized as stale.
    pub fn abandon(&mut self) {
        self.active = false;
        self.pending = None;
    }

    /// Run one frame. Returns whether anything was drawn.
    pub fn tick(
        &mut self,
        handle: FrameHandle,
        playing: bool,
        source: &dyn WaveformSource,
        surface: &mut dyn DrawSurface,
        scheduler: &mut dyn FrameScheduler,
    ) -> bool {
        if self.pending != Some(handle) {
            return false;
        }
        self.pending = None;
        if !self.active || !playing {
            self.active = false;
            return false;
        }

        let samples = source.analysis_snapshot();
        let (width, height) = surface.size();
        surface.clear(Rgb::BLACK);
        for segment in waveform_segments(&samples, width, height) {
            surface.line(segment.from, segment.to, segment.color);
        }
        self.frames_drawn += 1;

        self.pending = Some(scheduler.request_frame());
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}
