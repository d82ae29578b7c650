use ratatui::{layout::Rect, Frame};

use crate::audio::Samples;
use crate::color::Gradient;

pub mod radial;
pub mod waveform;

/// Mirror control state surfaced in the frame chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorLabel {
    Unsupported,
    Off,
    On,
}

/// Per-frame state the visualizers key their chrome and layers off.
pub struct ViewState {
    pub playing: bool,
    pub overlay: bool,
    pub mirror: MirrorLabel,
}

pub trait Visualizer {
    fn name(&self) -> &str;
    fn draw(
        &self,
        f: &mut Frame,
        area: Rect,
        samples: &Samples<'_>,
        gradient: &Gradient,
        view: &ViewState,
    );
}
