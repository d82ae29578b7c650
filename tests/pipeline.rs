//! End-to-end rendering checks against an in-memory terminal.

use image::{DynamicImage, RgbImage};
use pulseviz::artwork::Artwork;
use pulseviz::audio::Samples;
use pulseviz::color::ColorCycler;
use pulseviz::visualizers::{
    radial::RadialVisualizer, waveform::WaveformVisualizer, MirrorLabel, ViewState, Visualizer,
};
use ratatui::{
    backend::TestBackend, buffer::Buffer, layout::Rect, style::Color, Frame, Terminal,
};

fn overlay_view(playing: bool) -> ViewState {
    ViewState {
        playing,
        overlay: true,
        mirror: MirrorLabel::Off,
    }
}

fn render(width: u16, height: u16, draw: impl Fn(&mut Frame, Rect)) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|f| {
            let area = f.area();
            draw(f, area);
        })
        .unwrap();
    terminal.backend().buffer().clone()
}

fn render_radial(samples: &Samples<'_>, view: &ViewState) -> Buffer {
    let art = Artwork::from_image(&DynamicImage::ImageRgb8(RgbImage::new(16, 16)));
    let viz = RadialVisualizer::new(art);
    let gradient = ColorCycler::new().gradient();
    render(80, 24, |f, area| viz.draw(f, area, samples, &gradient, view))
}

fn render_waveform(samples: &Samples<'_>, view: &ViewState) -> Buffer {
    let viz = WaveformVisualizer;
    let gradient = ColorCycler::new().gradient();
    render(80, 24, |f, area| viz.draw(f, area, samples, &gradient, view))
}

/// Half-block pixel positions carrying exactly `color`, as (x, y) with two
/// vertical pixels per cell row.
fn pixels_of(buf: &Buffer, color: Color) -> Vec<(f64, f64)> {
    let mut out = Vec::new();
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            let cell = buf.cell((x, y)).unwrap();
            if cell.fg == color {
                out.push((x as f64, (y * 2) as f64));
            }
            if cell.bg == color {
                out.push((x as f64, (y * 2 + 1) as f64));
            }
        }
    }
    out
}

/// Terminal rows containing braille content.
fn braille_rows(buf: &Buffer) -> Vec<u16> {
    let mut rows = Vec::new();
    for y in 0..buf.area.height {
        for x in 0..buf.area.width {
            let cell = buf.cell((x, y)).unwrap();
            if cell
                .symbol()
                .chars()
                .next()
                .is_some_and(|c| ('\u{2800}'..='\u{28FF}').contains(&c))
            {
                rows.push(y);
                break;
            }
        }
    }
    rows
}

#[test]
fn radial_spokes_hug_the_base_ring_for_silence() {
    let zeros = vec![0.0f32; 1024];
    let buf = render_radial(&Samples::Float(&zeros), &overlay_view(true));

    // Zero deflection puts every spoke at the base radius with the gradient
    // sampled at its midpoint.
    let spoke_color = ColorCycler::new().gradient().at(0.5);
    let pixels = pixels_of(&buf, spoke_color);
    assert!(
        pixels.len() >= 30,
        "expected a ring of spoke pixels, found {}",
        pixels.len()
    );

    let n = pixels.len() as f64;
    let cx = pixels.iter().map(|p| p.0).sum::<f64>() / n;
    let cy = pixels.iter().map(|p| p.1).sum::<f64>() / n;
    let radii: Vec<f64> = pixels
        .iter()
        .map(|&(x, y)| ((x - cx).powi(2) + (y - cy).powi(2)).sqrt())
        .collect();
    let min = radii.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = radii.iter().cloned().fold(0.0f64, f64::max);
    assert!(
        max - min < 4.0,
        "flat samples should draw a thin ring, radii spread {min:.1}..{max:.1}"
    );
    assert!(
        (8.0..20.0).contains(&min),
        "ring radius out of range: {min:.1}"
    );
}

#[test]
fn spokes_only_appear_with_overlay() {
    let zeros = vec![0.0f32; 1024];
    let view = ViewState {
        playing: false,
        overlay: false,
        mirror: MirrorLabel::Off,
    };
    let buf = render_radial(&Samples::Float(&zeros), &view);
    let spoke_color = ColorCycler::new().gradient().at(0.5);
    assert!(
        pixels_of(&buf, spoke_color).is_empty(),
        "no spokes before the overlay is enabled"
    );
}

#[test]
fn loud_samples_light_more_cells_than_silence() {
    let zeros = vec![0.0f32; 1024];
    let ones = vec![1.0f32; 1024];
    let quiet = render_radial(&Samples::Float(&zeros), &overlay_view(true));
    let loud = render_radial(&Samples::Float(&ones), &overlay_view(true));

    let gradient = ColorCycler::new().gradient();
    let quiet_pixels = pixels_of(&quiet, gradient.at(0.5)).len();
    let loud_pixels = pixels_of(&loud, gradient.at(1.0)).len();
    assert!(
        loud_pixels > quiet_pixels,
        "full-scale deflection should stroke longer spokes ({loud_pixels} vs {quiet_pixels})"
    );
}

#[test]
fn radial_draw_is_idempotent() {
    let samples: Vec<f32> = (0..1024).map(|i| ((i % 64) as f32 / 32.0) - 1.0).collect();
    let a = render_radial(&Samples::Float(&samples), &overlay_view(true));
    let b = render_radial(&Samples::Float(&samples), &overlay_view(true));
    assert_eq!(a, b);
}

#[test]
fn waveform_draw_is_idempotent() {
    let samples: Vec<f32> = (0..1024).map(|i| ((i % 128) as f32 / 64.0) - 1.0).collect();
    let a = render_waveform(&Samples::Float(&samples), &overlay_view(true));
    let b = render_waveform(&Samples::Float(&samples), &overlay_view(true));
    assert_eq!(a, b);
}

#[test]
fn waveform_is_flat_for_silence() {
    let zeros = vec![0.0f32; 1024];
    let buf = render_waveform(&Samples::Float(&zeros), &overlay_view(true));
    let rows = braille_rows(&buf);
    assert_eq!(
        rows.len(),
        1,
        "flat samples should land every point on one row, got {rows:?}"
    );
    assert!(
        (8..=15).contains(&rows[0]),
        "flat line should sit at mid height, got row {}",
        rows[0]
    );
}

#[test]
fn equilibrium_bytes_render_flat() {
    // A byte tap at rest sits at 128, which normalizes to just above zero.
    let bytes = vec![128u8; 1024];
    let buf = render_waveform(&Samples::Byte(&bytes), &overlay_view(true));
    let rows = braille_rows(&buf);
    assert_eq!(rows.len(), 1, "equilibrium bytes should stay flat: {rows:?}");
}

#[test]
fn wide_frames_keep_full_scale_deflection() {
    // Wide enough to derive more points than half the sample buffer; the
    // point cap keeps every averaging window wide enough to see the signal.
    let ones = vec![1.0f32; 1024];
    let zeros = vec![0.0f32; 1024];
    let viz = WaveformVisualizer;
    let gradient = ColorCycler::new().gradient();
    let view = overlay_view(true);
    let loud = render(520, 24, |f, area| {
        viz.draw(f, area, &Samples::Float(&ones), &gradient, &view)
    });
    let silent = render(520, 24, |f, area| {
        viz.draw(f, area, &Samples::Float(&zeros), &gradient, &view)
    });

    let loud_rows = braille_rows(&loud);
    let silent_rows = braille_rows(&silent);
    assert_eq!(loud_rows.len(), 1, "full-scale input stays one flat row: {loud_rows:?}");
    assert_eq!(silent_rows.len(), 1);
    assert!(
        loud_rows[0] < silent_rows[0],
        "full-scale input should ride above the center line ({loud_rows:?} vs {silent_rows:?})"
    );
}
