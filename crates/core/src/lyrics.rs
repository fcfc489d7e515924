//! Canned lyric assistance.

use crate::state::Action;
use serde::{Deserialize, Serialize};

pub const SUGGESTIONS: [&str; 4] = [
    "Shadows dancing on the ceiling",
    "Whispers lost in the wind",
    "Heartbeat syncing with the rain",
    "Neon lights fading away",
];

pub const RHYME_TARGET: &str = "Ceiling";
pub const RHYMES: [&str; 5] = ["Ceiling", "Feeling", "Healing", "Reeling", "Kneeling"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LyricsMode {
    #[default]
    Write,
    Assist,
}

/// Append a suggestion or rhyme as a new line.
pub fn add_line(line: &str) -> Action {
    Action::AppendLyricLine {
        line: line.to_string(),
    }
}
