mod clip_store;
mod timeline;

pub use clip_store::*;
pub use timeline::*;

use std::fmt::Display;

use bevy_math::{Quat, Vec3};
use bevy_platform::collections::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{joint::JointChannel, time::TimeSpan};

/// Identifier of an [`AnimationSequence`] in a [`ClipStore`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(pub String);

impl From<&str> for ClipId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ClipId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keyframe timelines of a single joint.
#[derive(Clone, Debug, Default)]
pub struct JointTimelines {
    pub translation: Timeline<Vec3>,
    pub rotation: Timeline<Quat>,
    pub scale: Timeline<Vec3>,
    /// Stepped: a visibility key holds until the next one.
    pub visibility: Timeline<bool>,
}

impl JointTimelines {
    pub fn sample(&self, time: f32) -> JointChannel {
        JointChannel {
            translation: self.translation.sample(time).unwrap_or(Vec3::ZERO),
            rotation: self.rotation.sample(time).unwrap_or(Quat::IDENTITY),
            scale: self.scale.sample(time).unwrap_or(Vec3::ONE),
            visible: self.visibility.sample_stepped(time).unwrap_or(true),
        }
    }
}

/// A baked animation clip: per-joint keyframe timelines, a length, and named instantaneous
/// time markers. A marker name may occur at several times.
#[derive(Clone, Debug, Default)]
pub struct AnimationSequence {
    length: TimeSpan,
    joints: HashMap<String, JointTimelines>,
    markers: IndexMap<String, Vec<TimeSpan>>,
}

impl AnimationSequence {
    pub fn builder(length: TimeSpan) -> AnimationSequenceBuilder {
        AnimationSequenceBuilder {
            sequence: AnimationSequence {
                length,
                ..Default::default()
            },
        }
    }

    pub fn length(&self) -> TimeSpan {
        self.length
    }

    pub fn is_animating(&self, joint: &str) -> bool {
        self.joints.contains_key(joint)
    }

    /// Maps an elapsed time (ticks) onto the clip: wrapped when looping, clamped otherwise.
    pub fn clip_time(&self, time: TimeSpan, looping: bool) -> f32 {
        let length = self.length.in_ticks();
        let time = time.in_ticks();
        if length <= 0. {
            0.
        } else if looping {
            time.rem_euclid(length)
        } else {
            time.clamp(0., length)
        }
    }

    /// Channel of `joint` at `time`, or `None` when the clip does not animate that joint.
    pub fn sample_channel(&self, joint: &str, time: TimeSpan, looping: bool) -> Option<JointChannel> {
        let timelines = self.joints.get(joint)?;
        Some(timelines.sample(self.clip_time(time, looping)))
    }

    pub fn marker_times(&self, marker: &str) -> &[TimeSpan] {
        self.markers.get(marker).map(Vec::as_slice).unwrap_or_default()
    }

    /// Names of the markers that lie in the half-open range `(start, end]`.
    ///
    /// When `looping`, both bounds are wrapped onto the clip, so a range that crosses the
    /// loop point matches markers on either side of it; a range spanning a whole loop or
    /// more matches every marker.
    pub fn markers_in_range(&self, start: TimeSpan, end: TimeSpan, looping: bool) -> Vec<&str> {
        let start = start.in_ticks();
        let end = end.in_ticks();
        if end <= start {
            return Vec::new();
        }
        let length = self.length.in_ticks();

        let in_range: Box<dyn Fn(f32) -> bool> = if !looping {
            Box::new(move |t| start < t && t <= end)
        } else if length <= 0. {
            return Vec::new();
        } else if end - start >= length {
            Box::new(|_| true)
        } else {
            let wrapped_start = start.rem_euclid(length);
            let wrapped_end = end.rem_euclid(length);
            if wrapped_start < wrapped_end {
                Box::new(move |t| {
                    let t = t.rem_euclid(length);
                    wrapped_start < t && t <= wrapped_end
                })
            } else {
                Box::new(move |t| {
                    let t = t.rem_euclid(length);
                    t > wrapped_start || t <= wrapped_end
                })
            }
        };

        self.markers
            .iter()
            .filter(|(_, times)| times.iter().any(|time| in_range(time.in_ticks())))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

pub struct AnimationSequenceBuilder {
    sequence: AnimationSequence,
}

impl AnimationSequenceBuilder {
    fn joint(&mut self, joint: impl Into<String>) -> &mut JointTimelines {
        self.sequence.joints.entry(joint.into()).or_default()
    }

    pub fn translation_keyframe(mut self, joint: impl Into<String>, time: TimeSpan, value: Vec3) -> Self {
        self.joint(joint).translation.insert(time, value);
        self
    }

    pub fn rotation_keyframe(mut self, joint: impl Into<String>, time: TimeSpan, value: Quat) -> Self {
        self.joint(joint).rotation.insert(time, value);
        self
    }

    pub fn scale_keyframe(mut self, joint: impl Into<String>, time: TimeSpan, value: Vec3) -> Self {
        self.joint(joint).scale.insert(time, value);
        self
    }

    pub fn visibility_keyframe(mut self, joint: impl Into<String>, time: TimeSpan, visible: bool) -> Self {
        self.joint(joint).visibility.insert(time, visible);
        self
    }

    pub fn time_marker(mut self, marker: impl Into<String>, time: TimeSpan) -> Self {
        let times = self.sequence.markers.entry(marker.into()).or_default();
        times.push(time);
        times.sort();
        self
    }

    pub fn build(self) -> AnimationSequence {
        self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip() -> AnimationSequence {
        AnimationSequence::builder(TimeSpan::from_ticks(20.))
            .translation_keyframe("body", TimeSpan::ZERO, Vec3::ZERO)
            .translation_keyframe("body", TimeSpan::from_ticks(20.), Vec3::new(20., 0., 0.))
            .visibility_keyframe("head", TimeSpan::ZERO, true)
            .visibility_keyframe("head", TimeSpan::from_ticks(10.), false)
            .time_marker("step", TimeSpan::from_ticks(3.))
            .time_marker("step", TimeSpan::from_ticks(13.))
            .time_marker("start", TimeSpan::ZERO)
            .build()
    }

    #[test]
    fn sampling_wraps_or_clamps() {
        let clip = clip();
        let looped = clip
            .sample_channel("body", TimeSpan::from_ticks(25.), true)
            .unwrap();
        assert!((looped.translation.x - 5.).abs() < 1e-5);
        let clamped = clip
            .sample_channel("body", TimeSpan::from_ticks(25.), false)
            .unwrap();
        assert!((clamped.translation.x - 20.).abs() < 1e-5);
        assert!(clip.sample_channel("arm_L", TimeSpan::ZERO, true).is_none());
    }

    #[test]
    fn visibility_is_stepped() {
        let clip = clip();
        let at = |t| {
            clip.sample_channel("head", TimeSpan::from_ticks(t), false)
                .unwrap()
                .visible
        };
        assert!(at(9.9));
        assert!(!at(10.));
        assert!(!at(15.));
    }

    #[test]
    fn marker_range_is_half_open() {
        let clip = clip();
        let range = |a: f32, b: f32, looping| {
            clip.markers_in_range(TimeSpan::from_ticks(a), TimeSpan::from_ticks(b), looping)
        };
        assert_eq!(range(2., 3., false), vec!["step"]);
        assert!(range(3., 4., false).is_empty());
        assert!(range(0., 1., false).is_empty());
        assert_eq!(range(22., 23., true), vec!["step"]);
        assert!(range(22., 23., false).is_empty());
    }

    #[test]
    fn looping_marker_range_crosses_loop_point() {
        let clip = clip();
        let markers = clip.markers_in_range(TimeSpan::from_ticks(19.5), TimeSpan::from_ticks(20.5), true);
        assert_eq!(markers, vec!["start"]);
        let everything = clip.markers_in_range(TimeSpan::from_ticks(1.), TimeSpan::from_ticks(30.), true);
        assert_eq!(everything, vec!["step", "start"]);
    }
}
