use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        Widget,
        canvas::{Canvas, Line},
    },
};

use crate::waveform::{Scene, Shape, Surface, render};

/// Braille dots per terminal cell, horizontally.
const DOTS_X: f64 = 2.0;

/// Draws a [`Scene`] with braille dots: one logical unit per half cell
/// horizontally and per row vertically, at a pixel ratio of 2, which maps
/// device pixels onto braille dots one to one.
pub struct WaveformWidget<'a> {
    peaks: Option<&'a [f32]>,
    progress: f64,
    bar_fill: f64,
    played: Color,
    unplayed: Color,
}

impl<'a> WaveformWidget<'a> {
    pub fn new(peaks: Option<&'a [f32]>, progress: f64, bar_fill: f64) -> Self {
        Self {
            peaks,
            progress,
            bar_fill,
            played: Color::LightRed,
            unplayed: Color::DarkGray,
        }
    }

    pub fn played(mut self, color: Color) -> Self {
        self.played = color;
        self
    }

    pub fn unplayed(mut self, color: Color) -> Self {
        self.unplayed = color;
        self
    }

    pub fn surface(area: Rect) -> Surface {
        Surface {
            width: f64::from(area.width),
            height: f64::from(area.height) * 2.0,
            pixel_ratio: DOTS_X,
        }
    }

    pub fn scene(&self, area: Rect) -> Scene {
        render(self.peaks, self.progress, Self::surface(area), self.bar_fill)
    }
}

impl Widget for WaveformWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let scene = self.scene(area);
        let w = f64::from(scene.width);
        let h = f64::from(scene.height);
        let color = |played: bool| if played { self.played } else { self.unplayed };

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, w])
            .y_bounds([0.0, h])
            .paint(|ctx| {
                // Canvas y grows upwards, scene y grows downwards.
                for shape in &scene.shapes {
                    match *shape {
                        Shape::Line { x0, x1, y, played } => {
                            if x1 > x0 {
                                ctx.draw(&Line::new(x0, h - y, x1, h - y, color(played)));
                            }
                        }
                        Shape::Bar {
                            x,
                            y,
                            width,
                            height,
                            played,
                        } => {
                            let mut px = x.floor();
                            while px < x + width {
                                ctx.draw(&Line::new(px, h - y, px, h - (y + height), color(played)));
                                px += 1.0;
                            }
                        }
                    }
                }
            })
            .render(area, buf);
    }
}
