//! Playback state and the interaction controller.

/// What the user last asked playback to do. `Idle` only exists before the
/// first gesture; after that the state ping-pongs between `Playing` and
/// `Paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Idle,
    Playing,
    Paused,
}

/// The play/pause/is-playing surface of the audio source. Split out so the
/// controller can be driven by a fake in tests.
pub trait Transport {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
}

/// Tracks the playback state machine and the overlay flag the radial style
/// flips on at the first gesture.
pub struct Controls {
    playback: Playback,
    overlay_enabled: bool,
}

impl Controls {
    pub fn new() -> Self {
        Self {
            playback: Playback::Idle,
            overlay_enabled: false,
        }
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn overlay_enabled(&self) -> bool {
        self.overlay_enabled
    }

    /// Latches the overlay on. It never turns back off for the session.
    fn enable_overlay(&mut self) {
        self.overlay_enabled = true;
    }

    /// The space-bar gesture. The first one (and only the first) enables the
    /// overlay when the style is radial; every gesture toggles playback.
    pub fn gesture(&mut self, transport: &mut dyn Transport, radial: bool) {
        if self.playback == Playback::Idle && radial {
            self.enable_overlay();
        }
        self.toggle(transport);
    }

    /// The every-gesture action: pause if playing, otherwise play.
    pub fn toggle(&mut self, transport: &mut dyn Transport) {
        if transport.is_playing() {
            transport.pause();
            self.playback = Playback::Paused;
        } else {
            transport.play();
            self.playback = Playback::Playing;
        }
    }

    /// Reconciles with the transport when playback stops on its own at the
    /// end of the track. Returns true when the state was demoted.
    pub fn refresh(&mut self, playing: bool) -> bool {
        if self.playback == Playback::Playing && !playing {
            self.playback = Playback::Paused;
            return true;
        }
        false
    }
}
