use crate::{PersistedState, ProjectError, STORAGE_KEY, STORAGE_VERSION, Storage};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Read the persisted record, if one exists.
///
/// Returns `Ok(None)` when nothing has been stored yet. Fields are decoded
/// one at a time: a field with the wrong shape is logged and left out, the
/// rest still load. Text that is not JSON at all, an envelope without a
/// `state` object, or a newer layout version is an error; callers decide
/// whether to fall back to defaults.
pub fn load_state(storage: &dyn Storage) -> Result<Option<PersistedState>, ProjectError> {
    let Some(contents) = storage.read(STORAGE_KEY)? else {
        return Ok(None);
    };

    let record: Value = serde_json::from_str(&contents)?;
    let version = match record.get("version") {
        None | Some(Value::Null) => 0,
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or(ProjectError::Malformed("version is not a number"))?,
    };
    if version > STORAGE_VERSION {
        return Err(ProjectError::Version {
            found: version,
            expected: STORAGE_VERSION,
        });
    }
    let Some(fields) = record.get("state").and_then(Value::as_object) else {
        return Err(ProjectError::Malformed("missing state object"));
    };

    tracing::debug!(version, "loaded studio state");
    Ok(Some(decode_fields(fields)))
}

fn decode_fields(fields: &Map<String, Value>) -> PersistedState {
    PersistedState {
        theme: field(fields, "theme"),
        session_tracks: field(fields, "sessionTracks"),
        song_blocks: field(fields, "songBlocks"),
        saved_arrangements: field(fields, "savedArrangements"),
        user_library: field(fields, "userLibrary"),
        show_arrangement: field(fields, "showArrangement"),
        show_vocal_chain: field(fields, "showVocalChain"),
        audio_buffer_size: field(fields, "audioBufferSize"),
        ai_model_version: field(fields, "aiModelVersion"),
        auto_save: field(fields, "autoSave"),
    }
}

fn field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key).filter(|v| !v.is_null())?;
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!("skipping stored field {key}: {e}");
            None
        }
    }
}
