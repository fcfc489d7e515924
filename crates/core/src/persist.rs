//! Conversion between the live state and its persisted whitelist.

use crate::arrangement::Arrangement;
use crate::session::SessionTracks;
use crate::state::StudioState;
use onbeat_project::PersistedState;

/// Extract the whitelisted fields.
pub fn partialize(state: &StudioState) -> PersistedState {
    PersistedState {
        theme: Some(state.theme),
        session_tracks: Some(state.session.tracks().to_vec()),
        song_blocks: Some(state.arrangement.blocks().to_vec()),
        saved_arrangements: Some(state.arrangement.saved().to_vec()),
        user_library: Some(state.library.clone()),
        show_arrangement: Some(state.panels.arrangement),
        show_vocal_chain: Some(state.panels.vocal_chain),
        audio_buffer_size: Some(state.settings.audio_buffer_size),
        ai_model_version: Some(state.settings.ai_model_version.clone()),
        auto_save: Some(state.settings.auto_save),
    }
}

/// Merge whatever fields `persisted` carries over `defaults`. Missing fields
/// keep their default, and nothing outside the whitelist is ever taken from
/// storage.
pub fn restore(persisted: PersistedState, defaults: StudioState) -> StudioState {
    let mut state = defaults;

    if let Some(theme) = persisted.theme {
        state.theme = theme;
    }
    if let Some(tracks) = persisted.session_tracks {
        state.session = SessionTracks::new(tracks);
    }
    if persisted.song_blocks.is_some() || persisted.saved_arrangements.is_some() {
        let (blocks, saved) = std::mem::take(&mut state.arrangement).into_parts();
        state.arrangement = Arrangement::new(
            persisted.song_blocks.unwrap_or(blocks),
            persisted.saved_arrangements.unwrap_or(saved),
        );
    }
    if let Some(library) = persisted.user_library {
        state.library = library;
    }
    if let Some(show) = persisted.show_arrangement {
        state.panels.arrangement = show;
    }
    if let Some(show) = persisted.show_vocal_chain {
        state.panels.vocal_chain = show;
    }
    if let Some(size) = persisted.audio_buffer_size {
        state.settings.audio_buffer_size = size;
    }
    if let Some(version) = persisted.ai_model_version {
        state.settings.ai_model_version = version;
    }
    if let Some(auto_save) = persisted.auto_save {
        state.settings.auto_save = auto_save;
    }

    state
}
