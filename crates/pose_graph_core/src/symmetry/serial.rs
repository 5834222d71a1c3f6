use regex::{Regex, escape};
use serde::{Deserialize, Serialize};

use super::PatternMapper;
use crate::errors::AnimationResult;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct PatternMapperSerial {
    pub key_1: String,
    pub key_2: String,
    pub pattern_before: String,
    pub pattern_after: String,
}

impl Default for PatternMapperSerial {
    fn default() -> Self {
        Self {
            key_1: "L".into(),
            key_2: "R".into(),
            pattern_before: r"^.*".into(),
            pattern_after: r"$".into(),
        }
    }
}

impl PatternMapperSerial {
    pub fn to_value(&self) -> AnimationResult<PatternMapper> {
        let regex = Regex::new(&format!(
            "({})({}|{})({})",
            &self.pattern_before,
            escape(&self.key_1),
            escape(&self.key_2),
            &self.pattern_after,
        ))?;

        Ok(PatternMapper {
            key_1: self.key_1.clone(),
            key_2: self.key_2.clone(),
            pattern_before: self.pattern_before.clone(),
            pattern_after: self.pattern_after.clone(),
            regex,
        })
    }
}
