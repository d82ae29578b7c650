use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use pulseviz::artwork::Artwork;
use pulseviz::audio::{SampleSource, Track};
use pulseviz::color::{ColorCycler, Gradient};
use pulseviz::frame::{FRAME_INTERVAL, FrameClock, RenderLoop};
use pulseviz::logging;
use pulseviz::mirror::{self, FileMirror, MirrorSink};
use pulseviz::state::{Controls, Transport};
use pulseviz::visualizers::{
    radial::RadialVisualizer, waveform::WaveformVisualizer, MirrorLabel, ViewState, Visualizer,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "pulseviz")]
#[command(about = "Audio visualizer with radial pulse and waveform styles", long_about = None)]
struct Args {
    /// WAV file to play
    #[arg(value_name = "AUDIO")]
    audio: PathBuf,

    /// Album art for the radial style
    #[arg(long, value_name = "IMAGE")]
    artwork: Option<PathBuf>,

    /// Visual style: radial (default) or waveform
    #[arg(long, value_name = "STYLE", default_value = "radial")]
    style: String,

    /// Directory the mirror file is written to (defaults to the runtime dir)
    #[arg(long, value_name = "DIR")]
    mirror_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Style {
    Radial,
    Waveform,
}

impl Args {
    fn parse_style(&self) -> Style {
        match self.style.to_lowercase().as_str() {
            "radial" => Style::Radial,
            "waveform" => Style::Waveform,
            other => {
                eprintln!("Warning: unknown style '{}', using radial", other);
                Style::Radial
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init()?;

    // 1. Load assets, before the terminal is touched so failures stay readable
    let track = Track::load(&args.audio)?;
    tracing::info!(
        "loaded {} ({:.1}s at {} Hz)",
        args.audio.display(),
        track.duration_secs(),
        track.sample_rate
    );

    let style = args.parse_style();
    let visualizer: Box<dyn Visualizer> = match style {
        Style::Radial => {
            let path = args
                .artwork
                .as_ref()
                .context("--artwork is required for the radial style")?;
            Box::new(RadialVisualizer::new(Artwork::load(path)?))
        }
        Style::Waveform => Box::new(WaveformVisualizer),
    };
    let source = SampleSource::new(track);
    let mirror = FileMirror::detect(args.mirror_dir);

    // 2. Setup Terminal UI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(
        &mut terminal,
        visualizer.as_ref(),
        source,
        mirror,
        style == Style::Radial,
    );

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    visualizer: &dyn Visualizer,
    mut source: SampleSource,
    mut mirror: FileMirror,
    radial: bool,
) -> Result<()> {
    let mut controls = Controls::new();
    let mut cycler = ColorCycler::new();
    let mut clock = FrameClock::new(FRAME_INTERVAL, Instant::now());
    let mut render_loop = RenderLoop::new();

    // Static first frame: the artwork (or an empty wave) sits there until
    // the first gesture unlocks playback.
    let view = view_state(&controls, false, &mirror);
    present(
        terminal,
        visualizer,
        &mut source,
        &cycler.gradient(),
        &view,
        &mut mirror,
    )?;

    // 3. Main Render Loop
    loop {
        let mut chrome_dirty = false;
        if event::poll(clock.budget(Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char(' ') => {
                            // One-time stream setup rides on the first press;
                            // the gesture handling itself is uniform.
                            if !render_loop.is_running() {
                                source.setup()?;
                                render_loop.start();
                            }
                            controls.gesture(&mut source, radial);
                            chrome_dirty = true;
                        }
                        KeyCode::Char('p') if radial && mirror.is_supported() => {
                            if mirror.is_active() {
                                mirror.disable();
                            } else if let Err(err) = mirror.enable() {
                                tracing::warn!("could not enable mirroring: {err:#}");
                            }
                            chrome_dirty = true;
                        }
                        _ => {}
                    }
                }
            }
        }

        let playing = source.is_playing();
        if controls.refresh(playing) {
            chrome_dirty = true;
        }

        // Paused frames stay frozen; chrome changes repaint once, off-frame.
        if chrome_dirty && !playing {
            let view = view_state(&controls, playing, &mirror);
            present(
                terminal,
                visualizer,
                &mut source,
                &cycler.gradient(),
                &view,
                &mut mirror,
            )?;
        }

        if !clock.tick(Instant::now()) {
            continue;
        }
        if !render_loop.on_frame(playing) {
            continue;
        }

        let view = view_state(&controls, playing, &mirror);
        present(
            terminal,
            visualizer,
            &mut source,
            &cycler.gradient(),
            &view,
            &mut mirror,
        )?;
        cycler.advance();
    }

    if mirror.is_active() {
        mirror.disable();
    }
    tracing::debug!(
        "session: {} frames scheduled, {} drawn",
        render_loop.frames(),
        render_loop.draws()
    );
    Ok(())
}

fn view_state(controls: &Controls, playing: bool, mirror: &FileMirror) -> ViewState {
    ViewState {
        playing,
        overlay: controls.overlay_enabled(),
        mirror: if !mirror.is_supported() {
            MirrorLabel::Unsupported
        } else if mirror.is_active() {
            MirrorLabel::On
        } else {
            MirrorLabel::Off
        },
    }
}

/// Draws one frame and, when mirroring is on, pushes its text snapshot.
fn present(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    visualizer: &dyn Visualizer,
    source: &mut SampleSource,
    gradient: &Gradient,
    view: &ViewState,
    mirror: &mut FileMirror,
) -> Result<()> {
    let samples = source.read();
    let completed = terminal.draw(|f| {
        let area = f.area();
        visualizer.draw(f, area, &samples, gradient, view);
    })?;
    if mirror.is_active() {
        let text = mirror::snapshot(completed.buffer);
        if let Err(err) = mirror.push(&text) {
            tracing::warn!("mirror write failed, disabling: {err:#}");
            mirror.disable();
        }
    }
    Ok(())
}
