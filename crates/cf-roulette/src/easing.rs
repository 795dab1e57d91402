//! Easing — the four-phase spin curve
//!
//! Maps linear time progress `t ∈ [0, 1]` to travelled distance `d ∈ [0, 1]`.
//!
//! ```text
//! time      0 ──── 0.2 ──────── 0.6 ──── 0.8 ──── 1.0
//! distance  0 ──── 0.2 ──────── 0.6 ──── 0.8 ──── 1.0
//!           launch   cruise       brake    settle
//!           out-sine linear       out-cubic in-out-back
//! ```
//!
//! Every easing function maps 0 → 0 and 1 → 1, so each segment starts
//! exactly where the previous one ended.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Easing function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    OutSine,
    OutCubic,
    InOutBack,
}

const BACK_C1: f64 = 1.70158;
const BACK_C2: f64 = BACK_C1 * 1.525;

impl Easing {
    /// Apply to local progress `t ∈ [0, 1]`
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::OutSine => (t * PI / 2.0).sin(),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (2.0 * t - 2.0) + BACK_C2) + 2.0)
                        / 2.0
                }
            }
        }
    }
}

/// One piece of a piecewise curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EasingSegment {
    /// Time fraction at which this segment ends
    pub until: f64,
    /// Distance fraction reached at `until`
    pub reach: f64,
    pub easing: Easing,
}

/// Launch, cruise, brake, settle
pub const SPIN_CURVE: [EasingSegment; 4] = [
    EasingSegment {
        until: 0.2,
        reach: 0.2,
        easing: Easing::OutSine,
    },
    EasingSegment {
        until: 0.6,
        reach: 0.6,
        easing: Easing::Linear,
    },
    EasingSegment {
        until: 0.8,
        reach: 0.8,
        easing: Easing::OutCubic,
    },
    EasingSegment {
        until: 1.0,
        reach: 1.0,
        easing: Easing::InOutBack,
    },
];

/// Evaluate a piecewise curve. Input is clamped to `[0, 1]`; the end points
/// map to exactly 0 and 1.
pub fn evaluate_curve(segments: &[EasingSegment], t: f64) -> f64 {
    if t.is_nan() || t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let mut start_time = 0.0;
    let mut start_distance = 0.0;
    for segment in segments {
        if t < segment.until {
            let span = segment.until - start_time;
            let local = if span > 0.0 { (t - start_time) / span } else { 1.0 };
            return start_distance + (segment.reach - start_distance) * segment.easing.apply(local);
        }
        start_time = segment.until;
        start_distance = segment.reach;
    }
    1.0
}

/// Eased distance fraction of the spin curve at time fraction `t`
pub fn phased_progress(t: f64) -> f64 {
    evaluate_curve(&SPIN_CURVE, t)
}

/// Index of the curve segment active at `t` (0 = launch … 3 = settle)
pub fn curve_segment(t: f64) -> usize {
    SPIN_CURVE
        .iter()
        .position(|s| t < s.until)
        .unwrap_or(SPIN_CURVE.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_easing_end_points() {
        for easing in [Easing::Linear, Easing::OutSine, Easing::OutCubic, Easing::InOutBack] {
            assert_abs_diff_eq!(easing.apply(0.0), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(easing.apply(1.0), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_curve_end_points_exact() {
        assert_eq!(phased_progress(0.0), 0.0);
        assert_eq!(phased_progress(1.0), 1.0);
        assert_eq!(phased_progress(-0.5), 0.0);
        assert_eq!(phased_progress(7.0), 1.0);
        assert_eq!(phased_progress(f64::NAN), 0.0);
    }

    #[test]
    fn test_continuity_at_boundaries() {
        let eps = 1e-9;
        for boundary in [0.2, 0.6, 0.8] {
            let before = phased_progress(boundary - eps);
            let after = phased_progress(boundary + eps);
            assert_abs_diff_eq!(before, after, epsilon = 1e-6);
            assert_abs_diff_eq!(phased_progress(boundary), boundary, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_segment_fractions() {
        // Cruise is linear: 40% of distance over 40% of time
        assert_abs_diff_eq!(phased_progress(0.4), 0.4, epsilon = 1e-12);
        // Launch is front-loaded
        assert!(phased_progress(0.1) > 0.1);
        // Brake is front-loaded too
        assert!(phased_progress(0.7) > 0.7);
    }

    #[test]
    fn test_monotonic_until_settle() {
        let mut prev = 0.0;
        for i in 0..=800 {
            let t = i as f64 / 1000.0;
            let d = phased_progress(t);
            assert!(d + 1e-12 >= prev, "curve went backwards at t={}", t);
            prev = d;
        }
    }

    #[test]
    fn test_settle_stays_near_range() {
        for i in 800..=1000 {
            let d = phased_progress(i as f64 / 1000.0);
            assert!(d > 0.75 && d < 1.05, "settle out of range: {}", d);
        }
    }

    #[test]
    fn test_curve_segment() {
        assert_eq!(curve_segment(0.0), 0);
        assert_eq!(curve_segment(0.2), 1);
        assert_eq!(curve_segment(0.79), 2);
        assert_eq!(curve_segment(0.9), 3);
        assert_eq!(curve_segment(1.0), 3);
    }
}
