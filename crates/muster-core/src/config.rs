//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Characters that may not appear in a team name.
pub const DEFAULT_ILLEGAL_NAME_CHARS: &str = ",.<>?/;:'\"[{]}=+~`!@#$%^&*()";

/// Default maximum number of members per team (founder included).
pub const DEFAULT_MAX_TEAM_SIZE: usize = 4;

/// Default maximum team-name length, in characters.
pub const DEFAULT_MAX_NAME_LEN: usize = 80;

/// Rules enforced by the team registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum team size, founder included
    pub max_team_size: usize,

    /// Characters rejected in team names
    pub illegal_name_chars: String,

    /// Maximum team-name length in characters
    pub max_name_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_team_size: DEFAULT_MAX_TEAM_SIZE,
            illegal_name_chars: DEFAULT_ILLEGAL_NAME_CHARS.to_string(),
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }
}
