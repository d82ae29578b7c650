use std::f64::consts::PI;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line, Points},
        Block, Borders,
    },
    Frame,
};

use super::{MirrorLabel, ViewState, Visualizer};
use crate::artwork::Artwork;
use crate::audio::Samples;
use crate::color::Gradient;
use crate::windower;

/// Logical drawing space, mapped onto the largest centered square of cells.
pub const CANVAS_UNITS: f64 = 500.0;
/// Angularly spaced data points around the circle.
pub const SPOKE_COUNT: usize = 90;
/// Inner radius every spoke starts from.
const BASE_RADIUS: f64 = 150.0;
/// Radial travel of a full-scale deflection.
const MAX_DEFLECTION: f64 = 70.0;

pub struct RadialVisualizer {
    artwork: Artwork,
}

impl RadialVisualizer {
    pub fn new(artwork: Artwork) -> Self {
        Self { artwork }
    }
}

impl Visualizer for RadialVisualizer {
    fn name(&self) -> &str {
        "Radial Pulse"
    }

    fn draw(
        &self,
        f: &mut Frame,
        area: Rect,
        samples: &Samples<'_>,
        gradient: &Gradient,
        view: &ViewState,
    ) {
        let square = centered_square(area);
        if square.width < 3 || square.height < 3 {
            return;
        }

        let status = if view.playing {
            "playing"
        } else if view.overlay {
            "paused"
        } else {
            "space: play"
        };
        let mirror = match view.mirror {
            MirrorLabel::Unsupported => "mirror unavailable",
            MirrorLabel::Off => "p: mirror",
            MirrorLabel::On => "mirroring",
        };
        let border = if view.playing {
            Color::Magenta
        } else {
            Color::Blue
        };

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .title(format!(" Style: {} | {status} | {mirror} ", self.name()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
            .marker(Marker::HalfBlock)
            .x_bounds([0.0, CANVAS_UNITS])
            .y_bounds([0.0, CANVAS_UNITS])
            .paint(|ctx| {
                for (color, coords) in self.artwork.points(view.overlay) {
                    ctx.draw(&Points {
                        coords: coords.as_slice(),
                        color: *color,
                    });
                }
                if !view.overlay {
                    return;
                }

                let center = CANVAS_UNITS / 2.0;
                for i in 0..SPOKE_COUNT {
                    let value = windower::deflection(samples, i, SPOKE_COUNT) as f64;
                    let angle = 2.0 * PI * i as f64 / SPOKE_COUNT as f64;
                    let distance = BASE_RADIUS + value * MAX_DEFLECTION;
                    let color = gradient.at(((value + 1.0) / 2.0) as f32);
                    ctx.draw(&Line {
                        x1: center + angle.cos() * BASE_RADIUS,
                        y1: center + angle.sin() * BASE_RADIUS,
                        x2: center + angle.cos() * distance,
                        y2: center + angle.sin() * distance,
                        color,
                    });
                }
            });

        f.render_widget(canvas, square);
    }
}

/// The largest centered region whose half-block pixel grid is square: cells
/// are twice as tall as wide, so the region itself is twice as wide as tall.
fn centered_square(area: Rect) -> Rect {
    let height = area.height.min(area.width / 2);
    let width = height * 2;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
