use serde::{Deserialize, Serialize};

/// Settings a match is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Points needed to win the match.
    pub length: u32,
    /// Seed for the dice. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl MatchConfig {
    pub fn new(length: u32) -> Self {
        MatchConfig { length: length.max(1), seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig::new(1)
    }
}
