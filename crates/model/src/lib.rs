//! Plain data types shared across the OnBeat crates.
//!
//! Everything here is serde-friendly and free of behaviour beyond small
//! constructors; the state transitions live in `onbeat_core`.

mod block;
mod settings;
mod track;
mod ui;

pub use block::{BlockType, DEFAULT_BLOCK_WIDTH, MIN_BLOCK_WIDTH, SavedArrangement, SongBlock};
pub use settings::{BUFFER_SIZES, SettingKey, SettingValue, Settings};
pub use track::{
    DEFAULT_PAN, DEFAULT_VOLUME, LibraryTrack, SessionTrack, TrackKind, TrackPatch, display_title,
};
pub use ui::{Modal, Theme, View, VocalPreset};

/// Generate a fresh identifier for blocks, arrangements and session tracks.
pub fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
