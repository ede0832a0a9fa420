use egui::{Color32, Pos2, Sense, Stroke, Ui, Vec2};

use blocktone::core::visualization::{DrawSurface, Rgb};

fn to_color32(color: Rgb) -> Color32 {
    Color32::from_rgb(color.r, color.g, color.b)
}

/// Retained drawing surface: keeps the last frame drawn into it and paints
/// it on every UI pass, scaled to the space it gets.
pub struct WaveformCanvas {
    width: f32,
    height: f32,
    background: Color32,
    lines: Vec<([f32; 2], [f32; 2], Color32)>,
    stroke_width: f32,
}

impl WaveformCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background: Color32::BLACK,
            lines: Vec::new(),
            stroke_width: 1.5,
        }
    }

    pub fn show(&mut self, ui: &mut Ui) {
        let desired = Vec2::new(ui.available_width(), self.height);
        let (response, painter) = ui.allocate_painter(desired, Sense::hover());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, self.background);

        let sx = if self.width > 0.0 { rect.width() / self.width } else { 1.0 };
        let sy = if self.height > 0.0 { rect.height() / self.height } else { 1.0 };
        let to_screen = |p: [f32; 2]| Pos2::new(rect.left() + p[0] * sx, rect.top() + p[1] * sy);

        for (from, to, color) in &self.lines {
            painter.line_segment(
                [to_screen(*from), to_screen(*to)],
                Stroke::new(self.stroke_width, *color),
            );
        }

        // next frame is drawn at the width we actually got
        self.width = rect.width().max(1.0);
    }
}

impl DrawSurface for WaveformCanvas {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgb) {
        self.background = to_color32(color);
        self.lines.clear();
    }

    fn line(&mut self, from: [f32; 2], to: [f32; 2], color: Rgb) {
        self.lines.push((from, to, to_color32(color)));
    }
}
