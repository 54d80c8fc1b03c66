/*!
    Exact frame rates.
*/

use std::fmt;
use std::time::Duration;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/**
    A frame rate as frames per `den` seconds, such as 30000/1001 for
    525/60 video.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    /**
        # Panics

        Panics if `den` is zero.
    */
    pub const fn new(num: u32, den: u32) -> Self {
        assert!(den != 0, "denominator cannot be zero");
        Self { num, den }
    }

    /**
        How long one frame lasts at this rate, truncated to whole
        nanoseconds. Zero for a zero rate.
    */
    pub const fn period(self) -> Duration {
        if self.num == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.den as u64 * NANOS_PER_SEC / self.num as u64)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_periods() {
        assert_eq!(Rational::new(25, 1).period(), Duration::from_millis(40));
        assert_eq!(
            Rational::new(30000, 1001).period(),
            Duration::from_nanos(33_366_666)
        );
        assert_eq!(Rational::new(0, 1).period(), Duration::ZERO);
    }

    #[test]
    fn displays_as_fraction() {
        assert_eq!(Rational::new(30000, 1001).to_string(), "30000/1001");
    }

    #[test]
    #[should_panic(expected = "denominator cannot be zero")]
    fn zero_denominator_panics() {
        let _ = Rational::new(1, 0);
    }
}
