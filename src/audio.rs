//! WAV playback through cpal with a sample tap for the visualizers.
//!
//! The output callback is also the analysis point: every sample it plays is
//! pushed into a fixed-length ring, and `SampleSource::read` snapshots that
//! ring for the frame being drawn. Playback state is a pair of atomic flags
//! the callback observes, so play and pause never block on the audio thread.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow, bail};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use crate::state::Transport;

/// Analysis buffer length. Also the tap ring length, so one read covers the
/// most recent `BIN_COUNT` played samples.
pub const BIN_COUNT: usize = 1024;

/// One frame's worth of samples, borrowed from the source's snapshot buffer.
///
/// Most output formats let cpal convert from f32, so the tap carries the
/// pre-conversion float. A u8-only device gets the converted bytes instead,
/// and consumers normalize them at aggregation time.
pub enum Samples<'a> {
    Float(&'a [f32]),
    Byte(&'a [u8]),
}

impl Samples<'_> {
    pub fn len(&self) -> usize {
        match self {
            Samples::Float(buf) => buf.len(),
            Samples::Byte(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded WAV file: mono f32 samples at the file's rate.
pub struct Track {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Track {
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let spec = reader.spec();
        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };
        let samples = downmix(&interleaved, spec.channels as usize);
        if samples.is_empty() {
            bail!("{} contains no audio frames", path.display());
        }
        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
        })
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Averages interleaved channels down to mono.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => interleaved.to_vec(),
        n => interleaved
            .chunks_exact(n)
            .map(|frame| frame.iter().sum::<f32>() / n as f32)
            .collect(),
    }
}

/// Flags shared between the UI thread and the output callback.
#[derive(Default)]
struct Shared {
    playing: AtomicBool,
    finished: AtomicBool,
    rewind: AtomicBool,
}

/// Fixed-length ring the callback writes played samples into.
struct Ring<T> {
    buf: Vec<T>,
    pos: usize,
}

impl<T: Copy> Ring<T> {
    fn new(len: usize, fill: T) -> Self {
        Self {
            buf: vec![fill; len],
            pos: 0,
        }
    }

    fn push(&mut self, value: T) {
        self.buf[self.pos] = value;
        self.pos = (self.pos + 1) % self.buf.len();
    }

    /// Copies the contents oldest-to-newest into `out`.
    fn copy_ordered(&self, out: &mut [T]) {
        let split = self.buf.len() - self.pos;
        out[..split].copy_from_slice(&self.buf[self.pos..]);
        out[split..].copy_from_slice(&self.buf[..self.pos]);
    }
}

/// The tap variant picked at stream setup, with its preallocated snapshot.
enum Pipeline {
    Float {
        ring: Arc<Mutex<Ring<f32>>>,
        snap: Vec<f32>,
    },
    Byte {
        ring: Arc<Mutex<Ring<u8>>>,
        snap: Vec<u8>,
    },
}

impl Pipeline {
    fn snapshot(&mut self) -> Samples<'_> {
        match self {
            Pipeline::Float { ring, snap } => {
                ring.lock().unwrap().copy_ordered(snap);
                Samples::Float(snap)
            }
            Pipeline::Byte { ring, snap } => {
                ring.lock().unwrap().copy_ordered(snap);
                Samples::Byte(snap)
            }
        }
    }
}

struct Active {
    pipeline: Pipeline,
    _stream: cpal::Stream,
}

/// The playback side of the visualizer: a track, an output stream once set
/// up, and the tap the render loop reads from.
///
/// Construction only stores the track. `setup` opens the device and starts
/// the stream, and is deferred until the first user gesture.
pub struct SampleSource {
    samples: Arc<Vec<f32>>,
    sample_rate: u32,
    shared: Arc<Shared>,
    active: Option<Active>,
}

impl SampleSource {
    pub fn new(track: Track) -> Self {
        Self {
            samples: Arc::new(track.samples),
            sample_rate: track.sample_rate,
            shared: Arc::new(Shared::default()),
            active: None,
        }
    }

    /// One-time stream setup. Negotiates the device's native sample format
    /// at the track's rate; there is no fallback path, a failure here means
    /// the visualization never starts.
    pub fn setup(&mut self) -> Result<()> {
        if self.active.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no audio output device available"))?;
        let supported = device.default_output_config()?;
        let format = supported.sample_format();
        let config = cpal::StreamConfig {
            channels: supported.channels(),
            sample_rate: self.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };
        tracing::info!(
            "output: {} ({format}, {} ch, {} Hz)",
            device.description()?,
            config.channels,
            self.sample_rate
        );

        let active = match format {
            cpal::SampleFormat::F32 => self.spawn_float::<f32>(&device, &config)?,
            cpal::SampleFormat::I16 => self.spawn_float::<i16>(&device, &config)?,
            cpal::SampleFormat::U16 => self.spawn_float::<u16>(&device, &config)?,
            cpal::SampleFormat::I32 => self.spawn_float::<i32>(&device, &config)?,
            cpal::SampleFormat::U8 => self.spawn_byte(&device, &config)?,
            other => bail!("unsupported output sample format {other}"),
        };
        self.active = Some(active);
        Ok(())
    }

    /// True when the device took the u8 path and reads return byte samples.
    pub fn uses_normalized_bytes(&self) -> bool {
        matches!(
            self.active,
            Some(Active {
                pipeline: Pipeline::Byte { .. },
                ..
            })
        )
    }

    /// Snapshots the tap ring for this frame. Never allocates. Before setup,
    /// or while paused, the data is empty or stale; callers only read while
    /// playing.
    pub fn read(&mut self) -> Samples<'_> {
        match &mut self.active {
            Some(active) => active.pipeline.snapshot(),
            None => Samples::Float(&[]),
        }
    }

    fn spawn_float<T>(&self, device: &cpal::Device, config: &cpal::StreamConfig) -> Result<Active>
    where
        T: SizedSample + FromSample<f32>,
    {
        let ring = Arc::new(Mutex::new(Ring::new(BIN_COUNT, 0.0f32)));
        let samples = Arc::clone(&self.samples);
        let shared = Arc::clone(&self.shared);
        let tap = Arc::clone(&ring);
        let channels = config.channels as usize;
        let mut cursor = 0usize;
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if !callback_gate(&shared, &mut cursor) {
                    data.fill(T::EQUILIBRIUM);
                    return;
                }
                let mut tap = tap.lock().unwrap();
                for frame in data.chunks_mut(channels) {
                    let value = next_value(&samples, &shared, &mut cursor);
                    frame.fill(T::from_sample(value));
                    tap.push(value);
                }
            },
            |err| tracing::error!("audio stream error: {err}"),
            None,
        )?;
        stream.play()?;
        Ok(Active {
            pipeline: Pipeline::Float {
                ring,
                snap: vec![0.0; BIN_COUNT],
            },
            _stream: stream,
        })
    }

    fn spawn_byte(&self, device: &cpal::Device, config: &cpal::StreamConfig) -> Result<Active> {
        let ring = Arc::new(Mutex::new(Ring::new(BIN_COUNT, u8::EQUILIBRIUM)));
        let samples = Arc::clone(&self.samples);
        let shared = Arc::clone(&self.shared);
        let tap = Arc::clone(&ring);
        let channels = config.channels as usize;
        let mut cursor = 0usize;
        let stream = device.build_output_stream(
            config,
            move |data: &mut [u8], _: &cpal::OutputCallbackInfo| {
                if !callback_gate(&shared, &mut cursor) {
                    data.fill(u8::EQUILIBRIUM);
                    return;
                }
                let mut tap = tap.lock().unwrap();
                for frame in data.chunks_mut(channels) {
                    let value = u8::from_sample(next_value(&samples, &shared, &mut cursor));
                    frame.fill(value);
                    tap.push(value);
                }
            },
            |err| tracing::error!("audio stream error: {err}"),
            None,
        )?;
        stream.play()?;
        tracing::warn!("device is 8-bit only, visualizing normalized byte samples");
        Ok(Active {
            pipeline: Pipeline::Byte {
                ring,
                snap: vec![u8::EQUILIBRIUM; BIN_COUNT],
            },
            _stream: stream,
        })
    }
}

/// Per-callback playback check shared by both stream variants. The acquire
/// pairs with the release in `play`, so a rewind requested before `playing`
/// was raised is applied before any sample leaves the cursor.
fn callback_gate(shared: &Shared, cursor: &mut usize) -> bool {
    if !shared.playing.load(Ordering::Acquire) {
        return false;
    }
    if shared.rewind.swap(false, Ordering::Relaxed) {
        *cursor = 0;
    }
    true
}

/// Advances the track cursor by one sample. At the end of the track, flips
/// the shared flags so the transport reads as stopped and the next play
/// restarts from the beginning.
fn next_value(samples: &[f32], shared: &Shared, cursor: &mut usize) -> f32 {
    if *cursor < samples.len() {
        let v = samples[*cursor];
        *cursor += 1;
        v
    } else {
        shared.playing.store(false, Ordering::Relaxed);
        shared.finished.store(true, Ordering::Relaxed);
        0.0
    }
}

impl Transport for SampleSource {
    fn play(&mut self) {
        if self.shared.finished.swap(false, Ordering::Relaxed) {
            self.shared.rewind.store(true, Ordering::Relaxed);
        }
        // Release pairs with the callback's acquire, so the rewind request
        // is visible no later than the flag.
        self.shared.playing.store(true, Ordering::Release);
    }

    fn pause(&mut self) {
        self.shared.playing.store(false, Ordering::Relaxed);
    }

    fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Relaxed)
    }
}
