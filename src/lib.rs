//! Terminal audio visualizer: a radial pulse over album art, or a
//! full-width waveform, both driven by live playback samples.

pub mod artwork;
pub mod audio;
pub mod color;
pub mod frame;
pub mod logging;
pub mod mirror;
pub mod state;
pub mod visualizers;
pub mod windower;
