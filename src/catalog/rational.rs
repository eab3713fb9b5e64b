use ffmpeg_next::Rational;

/// Frame rate used when a clip reports none (or something degenerate).
pub const FALLBACK_FPS: f64 = 30.0;

/// A clip frame rate, kept as the rational the container reported.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClipRate {
    pub num: i32,
    pub den: i32,
}

impl ClipRate {
    pub const FALLBACK: ClipRate = ClipRate { num: 30, den: 1 };

    pub fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Frames per second, falling back to 30 for rates at or below 0.001.
    pub fn fps(self) -> f64 {
        if self.den == 0 {
            return FALLBACK_FPS;
        }
        let fps = f64::from(self.num) / f64::from(self.den);
        if fps.is_finite() && fps > 1e-3 {
            fps
        } else {
            FALLBACK_FPS
        }
    }

    pub fn is_usable(self) -> bool {
        self.den != 0 && f64::from(self.num) / f64::from(self.den) > 1e-3
    }
}

impl From<Rational> for ClipRate {
    fn from(value: Rational) -> Self {
        Self {
            num: value.numerator(),
            den: value.denominator(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntsc_rate() {
        let rate = ClipRate::new(30000, 1001);
        assert!((rate.fps() - 29.97).abs() < 0.001);
        assert!(rate.is_usable());
    }

    #[test]
    fn degenerate_rates_fall_back() {
        assert_eq!(ClipRate::new(0, 1).fps(), FALLBACK_FPS);
        assert_eq!(ClipRate::new(1, 0).fps(), FALLBACK_FPS);
        assert!(!ClipRate::new(0, 0).is_usable());
    }
}
