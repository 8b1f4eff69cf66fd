use std::fmt;

/// Color shown when there is nothing to rank against.
pub const PENDING_COLOR: &str = "#c5ae08";
pub const SLOW_COLOR: Rgb = Rgb::new(11.0, 75.0, 215.0);
pub const FAST_COLOR: Rgb = Rgb::new(255.0, 0.0, 191.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    fn lerp(self, other: Rgb, ratio: f64) -> Rgb {
        let channel = |from: f64, to: f64| from + (to - from) * ratio;
        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedColor {
    /// No speed yet, or no baseline to compare against.
    Pending,
    Rgb(Rgb),
}

impl fmt::Display for SpeedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedColor::Pending => f.write_str(PENDING_COLOR),
            SpeedColor::Rgb(Rgb { r, g, b }) => write!(f, "rgb({r}, {g}, {b})"),
        }
    }
}

/// Maps a node's speed onto the slow→fast gradient, relative to the feed's
/// highest speed. The ratio is not clamped.
pub fn speed_color(speed: Option<f64>, highest_speed: Option<f64>) -> SpeedColor {
    let (Some(speed), Some(highest)) = (speed, highest_speed) else {
        return SpeedColor::Pending;
    };
    if highest == 0.0 || !highest.is_finite() || !speed.is_finite() {
        return SpeedColor::Pending;
    }
    SpeedColor::Rgb(SLOW_COLOR.lerp(FAST_COLOR, speed / highest))
}
