use crate::{interpolation::linear::InterpolateLinear, time::TimeSpan};

#[derive(Clone, Debug, PartialEq)]
pub struct Keyframe<T> {
    pub time: TimeSpan,
    pub value: T,
}

/// Keyframes of one property, kept sorted by time.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline<T> {
    keyframes: Vec<Keyframe<T>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            keyframes: Vec::new(),
        }
    }
}

impl<T: Clone> Timeline<T> {
    /// Inserts a keyframe, replacing any keyframe at exactly the same time.
    pub fn insert(&mut self, time: TimeSpan, value: T) {
        match self.keyframes.binary_search_by(|keyframe| keyframe.time.cmp(&time)) {
            Ok(index) => self.keyframes[index].value = value,
            Err(index) => self.keyframes.insert(index, Keyframe { time, value }),
        }
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    /// Indices of the keyframes around `time`, clamped to the first/last keyframe.
    fn surrounding(&self, time: f32) -> Option<(usize, usize)> {
        let last = self.keyframes.len().checked_sub(1)?;
        let time = TimeSpan::from_ticks(time);
        Some(
            match self.keyframes.binary_search_by(|keyframe| keyframe.time.cmp(&time)) {
                Ok(i) => (i, i),
                Err(0) => (0, 0),
                Err(i) if i > last => (last, last),
                Err(i) => (i - 1, i),
            },
        )
    }

    /// Value of the latest keyframe at or before `time`.
    pub fn sample_stepped(&self, time: f32) -> Option<T> {
        let (prev, _) = self.surrounding(time)?;
        Some(self.keyframes[prev].value.clone())
    }
}

impl<T: Clone + InterpolateLinear> Timeline<T> {
    /// Linearly interpolated value at `time` (ticks). Times outside the keyframe range hold
    /// the nearest keyframe.
    pub fn sample(&self, time: f32) -> Option<T> {
        let (prev, next) = self.surrounding(time)?;
        let prev = &self.keyframes[prev];
        let next = &self.keyframes[next];
        let span = next.time.in_ticks() - prev.time.in_ticks();
        if span <= 0. {
            return Some(prev.value.clone());
        }
        let f = (time - prev.time.in_ticks()) / span;
        Some(prev.value.interpolate_linear(&next.value, f))
    }
}
