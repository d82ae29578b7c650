//! The hue-rotating gradient that colors both visual styles.

use ratatui::style::Color;

/// Degrees of hue added per drawn frame.
pub const HUE_STEP: f32 = 0.5;

// The two tuned gradient stops: a saturated blue rolling over to a deep
// pink, both shifted together by the accumulated hue.
const STOP_FROM: Hsl = Hsl {
    h: 214.0,
    s: 0.97,
    l: 0.59,
};
const STOP_TO: Hsl = Hsl {
    h: 336.0,
    s: 0.88,
    l: 0.46,
};

#[derive(Debug, Clone, Copy)]
pub struct Hsl {
    /// Hue in degrees, any value; wrapped modulo 360 on conversion.
    pub h: f32,
    /// Saturation, 0 to 1.
    pub s: f32,
    /// Lightness, 0 to 1.
    pub l: f32,
}

/// Accumulates the hue offset. Grows without bound and is never reset;
/// wrapping happens at the conversion to RGB.
pub struct ColorCycler {
    hue: f32,
}

impl ColorCycler {
    pub fn new() -> Self {
        Self { hue: 0.0 }
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Called once per drawn frame, after the frame used the current hue.
    pub fn advance(&mut self) {
        self.hue += HUE_STEP;
    }

    /// The gradient for the current frame. Pure: the same cycler state
    /// always produces the same colors.
    pub fn gradient(&self) -> Gradient {
        Gradient {
            from: Hsl {
                h: STOP_FROM.h + self.hue,
                ..STOP_FROM
            },
            to: Hsl {
                h: STOP_TO.h + self.hue,
                ..STOP_TO
            },
        }
    }
}

/// A two-stop linear gradient sampled per drawn segment, since terminal
/// cells take one concrete color rather than a gradient-valued stroke.
pub struct Gradient {
    pub from: Hsl,
    pub to: Hsl,
}

impl Gradient {
    /// Color at position `t` in [0, 1] along the gradient.
    pub fn at(&self, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let h = self.from.h + (self.to.h - self.from.h) * t;
        let s = self.from.s + (self.to.s - self.from.s) * t;
        let l = self.from.l + (self.to.l - self.from.l) * t;
        hsl_to_color(h, s, l)
    }
}

fn hsl_to_color(h: f32, s: f32, l: f32) -> Color {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Color::Rgb(
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}
