//! Timing profiles for spin animation

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{RouletteError, RouletteResult};

/// Timing profile for spins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// Studio mode (short, fixed length for testing)
    Studio,
    /// Custom timing multiplier
    Custom,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::Normal
    }
}

/// Spin timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinTiming {
    /// Profile type
    pub profile: TimingProfile,

    /// Layout settle delay between Starting and Running (ms)
    pub start_delay_ms: f64,

    /// Shortest scroll duration (ms)
    pub min_duration_ms: f64,

    /// Longest scroll duration (ms)
    pub max_duration_ms: f64,

    /// Grace delay between motion end and outcome read-back (ms)
    pub settle_delay_ms: f64,

    /// Display refresh interval assumed by headless runs (ms)
    pub frame_interval_ms: f64,
}

impl SpinTiming {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            start_delay_ms: 100.0,
            min_duration_ms: 3000.0,
            max_duration_ms: 5000.0,
            settle_delay_ms: 500.0,
            frame_interval_ms: 1000.0 / 60.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            start_delay_ms: 50.0,
            min_duration_ms: 1500.0,
            max_duration_ms: 2500.0,
            settle_delay_ms: 250.0,
            frame_interval_ms: 1000.0 / 60.0,
        }
    }

    /// Studio mode (fixed length, coarse frames)
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            start_delay_ms: 0.0,
            min_duration_ms: 600.0,
            max_duration_ms: 600.0,
            settle_delay_ms: 100.0,
            frame_interval_ms: 50.0,
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster). Frame interval is a display
    /// property and is not scaled.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            profile: TimingProfile::Custom,
            start_delay_ms: self.start_delay_ms * factor,
            min_duration_ms: self.min_duration_ms * factor,
            max_duration_ms: self.max_duration_ms * factor,
            settle_delay_ms: self.settle_delay_ms * factor,
            frame_interval_ms: self.frame_interval_ms,
        }
    }

    /// Draw a scroll duration uniformly from `[min, max]`
    pub fn draw_duration<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max_duration_ms <= self.min_duration_ms {
            return self.min_duration_ms;
        }
        rng.random_range(self.min_duration_ms..=self.max_duration_ms)
    }

    /// Longest possible wall time of one spin
    pub fn max_total_ms(&self) -> f64 {
        self.start_delay_ms + self.max_duration_ms + self.settle_delay_ms
    }

    pub fn validate(&self) -> RouletteResult<()> {
        let fields = [
            ("start delay", self.start_delay_ms),
            ("min duration", self.min_duration_ms),
            ("max duration", self.max_duration_ms),
            ("settle delay", self.settle_delay_ms),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(RouletteError::config(format!(
                    "{} must be a finite non-negative duration, got {}",
                    name, value
                )));
            }
        }
        if self.max_duration_ms < self.min_duration_ms {
            return Err(RouletteError::config(format!(
                "duration range is inverted: {} > {}",
                self.min_duration_ms, self.max_duration_ms
            )));
        }
        if !(self.frame_interval_ms.is_finite() && self.frame_interval_ms > 0.0) {
            return Err(RouletteError::config("frame interval must be positive"));
        }
        Ok(())
    }
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self::normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_timing_profiles() {
        let normal = SpinTiming::normal();
        let turbo = SpinTiming::turbo();
        let studio = SpinTiming::studio();

        assert!(turbo.max_duration_ms < normal.min_duration_ms + 1.0);
        assert!(turbo.settle_delay_ms < normal.settle_delay_ms);
        assert_eq!(studio.min_duration_ms, studio.max_duration_ms);

        for profile in [TimingProfile::Normal, TimingProfile::Turbo, TimingProfile::Studio] {
            assert!(SpinTiming::from_profile(profile).validate().is_ok());
        }
    }

    #[test]
    fn test_duration_stays_in_range() {
        let timing = SpinTiming::normal();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let d = timing.draw_duration(&mut rng);
            assert!((3000.0..=5000.0).contains(&d));
        }
        assert_eq!(SpinTiming::studio().draw_duration(&mut rng), 600.0);
    }

    #[test]
    fn test_scaled() {
        let half = SpinTiming::normal().scaled(0.5);
        assert_eq!(half.profile, TimingProfile::Custom);
        assert_eq!(half.min_duration_ms, 1500.0);
        assert_eq!(half.settle_delay_ms, 250.0);
        assert_eq!(half.frame_interval_ms, SpinTiming::normal().frame_interval_ms);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut timing = SpinTiming::normal();
        timing.min_duration_ms = 6000.0;
        assert!(timing.validate().is_err());
    }
}
