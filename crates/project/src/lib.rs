//! Durable storage of the persisted slice of studio state.
//!
//! The record written here is a whitelist: only the fields of
//! [`PersistedState`] survive a restart. Transport flags, the current view,
//! modal visibility and lyrics are session-only and are never written.

mod load;
mod save;
mod storage;

use onbeat_model::{LibraryTrack, SavedArrangement, SessionTrack, SongBlock, Theme};
use serde::{Deserialize, Serialize};

pub use load::load_state;
pub use save::save_state;
pub use storage::{FileStorage, MemoryStorage, Storage};

/// Namespace the persisted record is stored under.
pub const STORAGE_KEY: &str = "onbeat-storage";

/// Layout version of the stored record.
pub const STORAGE_VERSION: u32 = 0;

/// The whitelisted fields. Every field is optional so that records written
/// by older builds (or edited by hand) merge over the defaults field by
/// field instead of failing to load. [`load_state`] decodes each field on
/// its own, so one bad field only drops that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_tracks: Option<Vec<SessionTrack>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_blocks: Option<Vec<SongBlock>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_arrangements: Option<Vec<SavedArrangement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_library: Option<Vec<LibraryTrack>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_arrangement: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_vocal_chain: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_buffer_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_save: Option<bool>,
}

/// On-disk envelope around [`PersistedState`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    pub state: PersistedState,
    #[serde(default)]
    pub version: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported storage version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("Malformed storage record: {0}")]
    Malformed(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use onbeat_model::{BlockType, TrackKind};

    fn sample_state() -> PersistedState {
        PersistedState {
            theme: Some(Theme::Light),
            session_tracks: Some(vec![SessionTrack::new("t1", "Audio 1", TrackKind::Beat)]),
            song_blocks: Some(vec![SongBlock::new("b1", BlockType::Verse)]),
            saved_arrangements: Some(vec![]),
            user_library: Some(vec![LibraryTrack::new("Neon Horizon", "3:45")]),
            show_arrangement: Some(false),
            show_vocal_chain: Some(true),
            audio_buffer_size: Some(512),
            ai_model_version: Some("v2_stable".to_string()),
            auto_save: Some(false),
        }
    }

    #[test]
    fn test_persisted_state_serialization_roundtrip() {
        let state = sample_state();

        let json = serde_json::to_string(&state).expect("serialize");
        let decoded: PersistedState = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(decoded, state);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = serde_json::to_value(sample_state()).expect("serialize");

        assert_eq!(json["theme"], "light");
        assert_eq!(json["audioBufferSize"], 512);
        assert_eq!(json["showVocalChain"], true);
        assert_eq!(json["sessionTracks"][0]["type"], "beat");
        assert!(json.get("isPlaying").is_none());
    }

    #[test]
    fn test_missing_fields_decode_as_none() {
        let decoded: PersistedState =
            serde_json::from_str(r#"{"theme":"dark"}"#).expect("deserialize");

        assert_eq!(decoded.theme, Some(Theme::Dark));
        assert!(decoded.session_tracks.is_none());
        assert!(decoded.auto_save.is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let decoded: PersistedState =
            serde_json::from_str(r#"{"isPlaying":true,"currentView":"studio"}"#)
                .expect("deserialize");

        assert_eq!(decoded, PersistedState::default());
    }
}
