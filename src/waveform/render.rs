/// Logical drawing area plus the display's pixel density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Surface {
    /// Device pixels backing the surface, never zero.
    pub fn backing_size(&self) -> (u32, u32) {
        let ratio = self.ratio();
        let w = (self.width.max(0.0) * ratio).floor().max(1.0);
        let h = (self.height.max(0.0) * ratio).floor().max(1.0);
        (w as u32, h as u32)
    }

    fn ratio(&self) -> f64 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        }
    }
}

/// One primitive of the painted waveform, in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Horizontal line across `x0..x1` at height `y`.
    Line { x0: f64, x1: f64, y: f64, played: bool },
    /// Filled rectangle with its top-left corner at `(x, y)`.
    Bar {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        played: bool,
    },
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    /// Painted in order; later shapes cover earlier ones.
    pub shapes: Vec<Shape>,
}

/// Lay out the waveform for `progress` on `surface`.
///
/// Without peaks this is a flat midline drawn twice: full width unplayed,
/// then the played part on top. With peaks each value becomes a bar centred
/// on the midline, `max(2, v * h)` tall and `bar_fill` of its slot wide (at
/// least one pixel). Bar `i` is played when `i / N <= progress`.
pub fn render(peaks: Option<&[f32]>, progress: f64, surface: Surface, bar_fill: f64) -> Scene {
    let ratio = surface.ratio();
    let (bw, bh) = surface.backing_size();
    let width = f64::from(bw);
    let height = f64::from(bh);
    let mid = height / 2.0;
    let progress = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };

    let shapes = match peaks {
        Some(peaks) if !peaks.is_empty() => {
            let n = peaks.len();
            let slot = width / n as f64;
            let bar_width = (slot * bar_fill).max(ratio);
            let min_height = 2.0 * ratio;

            peaks
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let v = if v.is_finite() { f64::from(*v).clamp(0.0, 1.0) } else { 0.0 };
                    let bar_height = (v * height).max(min_height);
                    Shape::Bar {
                        x: i as f64 * slot,
                        y: mid - bar_height / 2.0,
                        width: bar_width,
                        height: bar_height,
                        played: (i as f64 / n as f64) <= progress,
                    }
                })
                .collect()
        }
        _ => vec![
            Shape::Line {
                x0: 0.0,
                x1: width,
                y: mid,
                played: false,
            },
            Shape::Line {
                x0: 0.0,
                x1: width * progress,
                y: mid,
                played: true,
            },
        ],
    };

    Scene {
        width: bw,
        height: bh,
        shapes,
    }
}

/// Map a pointer x (logical units, relative to the surface) onto a ratio.
pub fn pointer_ratio(x: f64, width: f64) -> f64 {
    if width <= 0.0 || !x.is_finite() {
        return 0.0;
    }
    (x / width).clamp(0.0, 1.0)
}
