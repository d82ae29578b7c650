use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{
        canvas::{Canvas, Line},
        Block, Borders,
    },
    Frame,
};

use super::{ViewState, Visualizer};
use crate::audio::{BIN_COUNT, Samples};
use crate::color::Gradient;
use crate::windower;

/// Vertical center of the 100-unit logical range.
const WAVE_MID: f64 = 50.0;
/// Vertical travel of a full-scale deflection.
const WAVE_HEIGHT: f64 = 40.0;
/// Braille dots between consecutive points, so one point per cell column.
const POINT_INTERVAL: usize = 2;
/// Cap on the derived point count. Past half the buffer length the widened
/// windows collapse to zero samples and every deflection reads as silence.
const MAX_POINTS: usize = BIN_COUNT / 2;

pub struct WaveformVisualizer;

impl Visualizer for WaveformVisualizer {
    fn name(&self) -> &str {
        "Waveform"
    }

    fn draw(
        &self,
        f: &mut Frame,
        area: Rect,
        samples: &Samples<'_>,
        gradient: &Gradient,
        view: &ViewState,
    ) {
        if area.width < 3 || area.height < 3 {
            return;
        }
        let inner_width = area.width as usize - 2;
        let points = (inner_width * 2 / POINT_INTERVAL).clamp(2, MAX_POINTS);

        let status = if view.playing { "playing" } else { "space: play" };
        let border = if view.playing {
            Color::Magenta
        } else {
            Color::Blue
        };

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .title(format!(" Style: {} | {status} ", self.name()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .style(Style::default().bg(Color::Rgb(17, 17, 17))),
            )
            .x_bounds([0.0, (points - 1) as f64])
            .y_bounds([0.0, 100.0])
            .paint(|ctx| {
                let mut prev: Option<(f64, f64)> = None;
                for i in 0..points {
                    let value = windower::deflection(samples, i, points) as f64;
                    let x = i as f64;
                    let y = WAVE_MID + value * WAVE_HEIGHT;
                    if let Some((x1, y1)) = prev {
                        let t = i as f32 / (points - 1) as f32;
                        ctx.draw(&Line {
                            x1,
                            y1,
                            x2: x,
                            y2: y,
                            color: gradient.at(t),
                        });
                    }
                    prev = Some((x, y));
                }
            });

        f.render_widget(canvas, area);
    }
}
