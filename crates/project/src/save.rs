use crate::{PersistedState, ProjectError, STORAGE_KEY, STORAGE_VERSION, Storage, StoredRecord};

/// Serialize the whitelisted state and write it under [`STORAGE_KEY`].
pub fn save_state(storage: &mut dyn Storage, state: &PersistedState) -> Result<(), ProjectError> {
    let record = StoredRecord {
        state: state.clone(),
        version: STORAGE_VERSION,
    };
    let contents = serde_json::to_string_pretty(&record)?;
    storage.write(STORAGE_KEY, &contents)?;

    tracing::debug!(bytes = contents.len(), "persisted studio state");
    Ok(())
}
