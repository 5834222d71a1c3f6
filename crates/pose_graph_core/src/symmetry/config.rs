use bevy_math::{Quat, Vec3};
use regex::Regex;

use super::serial::PatternMapperSerial;
use crate::errors::AnimationResult;

/// Maps a joint name to the name of its left/right counterpart.
///
/// The regex has three capture groups: everything before the side key, the side key itself
/// (`key_1` or `key_2`), and everything after it. Flipping swaps the key and keeps the rest.
#[derive(Debug, Clone)]
pub struct PatternMapper {
    pub key_1: String,
    pub key_2: String,
    pub pattern_before: String,
    pub pattern_after: String,
    pub regex: Regex,
}

impl PatternMapper {
    pub fn new(
        key_1: impl Into<String>,
        key_2: impl Into<String>,
        pattern_before: impl Into<String>,
        pattern_after: impl Into<String>,
    ) -> AnimationResult<Self> {
        PatternMapperSerial {
            key_1: key_1.into(),
            key_2: key_2.into(),
            pattern_before: pattern_before.into(),
            pattern_after: pattern_after.into(),
        }
        .to_value()
    }

    pub fn flip(&self, input: &str) -> Option<String> {
        let captures = self.regex.captures(input)?;
        let key_capture = captures.get(2)?.as_str();
        let replacement_key = if key_capture == self.key_1 {
            &self.key_2
        } else {
            &self.key_1
        };
        Some(
            self.regex
                .replace(input, format!("${{1}}{replacement_key}${{3}}"))
                .into(),
        )
    }
}

/// Plane a pose is mirrored about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SymmetryMode {
    /// Mirror about the plane perpendicular to the X axis.
    #[default]
    MirrorX,
}

impl SymmetryMode {
    pub fn apply_position(&self, mut input: Vec3) -> Vec3 {
        match self {
            SymmetryMode::MirrorX => input.x *= -1.,
        }
        input
    }

    pub fn apply_quat(&self, mut input: Quat) -> Quat {
        match self {
            SymmetryMode::MirrorX => {
                input.x *= -1.;
                input.w *= -1.;
                -input
            }
        }
    }
}
