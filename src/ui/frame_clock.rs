use blocktone::core::visualization::{FrameHandle, FrameScheduler};

/// Frame scheduler backed by egui repaints. A requested frame becomes due
/// on the next `update`.
pub struct EguiFrameClock {
    ctx: egui::Context,
    next: u64,
    pending: Option<FrameHandle>,
}

impl EguiFrameClock {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            next: 0,
            pending: None,
        }
    }

    /// The frame to run now, if one was requested and not cancelled.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameScheduler for EguiFrameClock {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        self.ctx.request_repaint();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}
