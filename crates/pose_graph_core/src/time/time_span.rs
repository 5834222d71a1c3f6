use std::{
    cmp::Ordering,
    ops::{Add, AddAssign, Mul, Sub},
};

use serde::{Deserialize, Serialize};

/// A span of time measured in simulation ticks.
///
/// Ticks are the canonical unit: there are [`TimeSpan::TICKS_PER_SECOND`] ticks in a second,
/// and every other constructor converts into ticks up front. Spans are totally ordered
/// using the IEEE total order of the underlying tick count.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSpan {
    ticks: f32,
}

impl TimeSpan {
    pub const TICKS_PER_SECOND: f32 = 20.;
    pub const ZERO: Self = Self::from_ticks(0.);

    pub const fn from_ticks(ticks: f32) -> Self {
        Self { ticks }
    }

    pub const fn from_seconds(seconds: f32) -> Self {
        Self::from_ticks(seconds * Self::TICKS_PER_SECOND)
    }

    /// Time taken by `frames` frames at a rate of `frames_per_second`.
    pub const fn from_frames(frames: f32, frames_per_second: f32) -> Self {
        Self::from_seconds(frames / frames_per_second)
    }

    pub const fn from_60_fps(frames: f32) -> Self {
        Self::from_frames(frames, 60.)
    }

    pub const fn from_30_fps(frames: f32) -> Self {
        Self::from_frames(frames, 30.)
    }

    pub const fn from_24_fps(frames: f32) -> Self {
        Self::from_frames(frames, 24.)
    }

    pub const fn in_ticks(&self) -> f32 {
        self.ticks
    }

    pub const fn in_seconds(&self) -> f32 {
        self.ticks / Self::TICKS_PER_SECOND
    }

    pub fn is_zero(&self) -> bool {
        self.ticks == 0.
    }

    pub fn max(self, other: Self) -> Self {
        if self >= other { self } else { other }
    }

    pub fn min(self, other: Self) -> Self {
        if self <= other { self } else { other }
    }
}

impl PartialEq for TimeSpan {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeSpan {}

impl PartialOrd for TimeSpan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeSpan {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ticks.total_cmp(&other.ticks)
    }
}

impl Add for TimeSpan {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::from_ticks(self.ticks + rhs.ticks)
    }
}

impl AddAssign for TimeSpan {
    fn add_assign(&mut self, rhs: Self) {
        self.ticks += rhs.ticks;
    }
}

impl Sub for TimeSpan {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::from_ticks(self.ticks - rhs.ticks)
    }
}

impl Mul<f32> for TimeSpan {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::from_ticks(self.ticks * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_and_frames_convert_to_ticks() {
        assert_eq!(TimeSpan::from_seconds(1.5).in_ticks(), 30.);
        assert_eq!(TimeSpan::from_60_fps(60.), TimeSpan::from_ticks(20.));
        assert_eq!(TimeSpan::from_24_fps(12.).in_seconds(), 0.5);
        assert!((TimeSpan::from_30_fps(1.).in_ticks() - 2. / 3.).abs() < 1e-6);
    }

    #[test]
    fn spans_are_totally_ordered() {
        let mut spans = vec![
            TimeSpan::from_ticks(3.),
            TimeSpan::from_seconds(0.),
            TimeSpan::from_ticks(-1.),
        ];
        spans.sort();
        assert_eq!(
            spans,
            vec![
                TimeSpan::from_ticks(-1.),
                TimeSpan::ZERO,
                TimeSpan::from_ticks(3.)
            ]
        );
        assert_eq!(
            TimeSpan::from_ticks(2.).max(TimeSpan::from_ticks(5.)),
            TimeSpan::from_ticks(5.)
        );
    }
}
