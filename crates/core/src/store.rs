//! The studio store: single owner of [`StudioState`], with change
//! notification and optional persistence.

use crate::persist::{partialize, restore};
use crate::state::{Action, AudioFile, Slices, StudioState};
use onbeat_model::{
    BlockType, LibraryTrack, Modal, SettingKey, SettingValue, TrackKind, TrackPatch, View,
    VocalPreset,
};
use onbeat_project::{ProjectError, Storage, load_state, save_state};
use std::sync::{Arc, Mutex};

/// Callback invoked with the new state after a dispatch that touched one of
/// the subscriber's slices.
pub type Subscriber = Box<dyn FnMut(&StudioState) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type SharedStorage = Arc<Mutex<Box<dyn Storage>>>;

pub struct Store {
    state: StudioState,
    subscribers: Vec<(SubscriptionId, Slices, Subscriber)>,
    next_subscription: u64,
    storage: Option<SharedStorage>,
}

impl Store {
    pub fn new() -> Self {
        Self::from_state(StudioState::default())
    }

    pub fn from_state(state: StudioState) -> Self {
        Self {
            state,
            subscribers: Vec::new(),
            next_subscription: 0,
            storage: None,
        }
    }

    /// Build a store from whatever `storage` holds and keep it in sync from
    /// then on. A missing record yields defaults. A record that cannot be
    /// read at all also yields defaults, but storage is then left detached
    /// so the unreadable record is not overwritten.
    pub fn restored(storage: Box<dyn Storage>) -> Self {
        match load_state(storage.as_ref()) {
            Ok(persisted) => {
                let state = match persisted {
                    Some(persisted) => {
                        tracing::info!("restored persisted studio state");
                        restore(persisted, StudioState::default())
                    }
                    None => StudioState::default(),
                };
                let mut store = Self::from_state(state);
                store.attach_storage(storage);
                store
            }
            Err(e) => {
                tracing::warn!("unreadable persisted state, autosave disabled: {e}");
                Self::new()
            }
        }
    }

    /// Write the persisted whitelist to `storage` after every change to a
    /// persisted slice.
    pub fn attach_storage(&mut self, storage: Box<dyn Storage>) {
        let shared: SharedStorage = Arc::new(Mutex::new(storage));
        let writer = Arc::clone(&shared);
        self.subscribe(
            Slices::PERSISTED,
            Box::new(move |state| {
                let Ok(mut storage) = writer.lock() else {
                    tracing::warn!("storage lock poisoned, skipping write");
                    return;
                };
                if let Err(e) = save_state(storage.as_mut(), &partialize(state)) {
                    tracing::warn!("failed to persist studio state: {e}");
                }
            }),
        );
        self.storage = Some(shared);
    }

    /// Write the persisted whitelist now. Without attached storage this does
    /// nothing.
    pub fn save(&self) -> Result<(), ProjectError> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        let mut storage = storage
            .lock()
            .map_err(|_| std::io::Error::other("storage lock poisoned"))?;
        save_state(storage.as_mut(), &partialize(&self.state))
    }

    pub fn state(&self) -> &StudioState {
        &self.state
    }

    /// Apply `action` and notify interested subscribers. Returns the slices
    /// it touched.
    pub fn dispatch(&mut self, action: Action) -> Slices {
        tracing::trace!(?action, "dispatch");
        let touched = self.state.apply(action);
        if touched.is_empty() {
            return touched;
        }
        for (_, interest, callback) in &mut self.subscribers {
            if interest.intersects(touched) {
                callback(&self.state);
            }
        }
        touched
    }

    pub fn subscribe(&mut self, interest: Slices, callback: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, interest, callback));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _, _)| *sub != id);
        self.subscribers.len() != before
    }

    // Convenience wrappers, one per action.

    pub fn set_view(&mut self, view: View) {
        self.dispatch(Action::SetView { view });
    }

    pub fn set_active_track(&mut self, track: Option<LibraryTrack>) {
        self.dispatch(Action::SetActiveTrack { track });
    }

    pub fn toggle_play(&mut self) {
        self.dispatch(Action::TogglePlay);
    }

    pub fn toggle_record(&mut self) {
        self.dispatch(Action::ToggleRecord);
    }

    pub fn toggle_metronome(&mut self) {
        self.dispatch(Action::ToggleMetronome);
    }

    pub fn toggle_monitoring(&mut self) {
        self.dispatch(Action::ToggleMonitoring);
    }

    pub fn toggle_count_in(&mut self) {
        self.dispatch(Action::ToggleCountIn);
    }

    pub fn toggle_theme(&mut self) {
        self.dispatch(Action::ToggleTheme);
    }

    pub fn toggle_lyrics(&mut self) {
        self.dispatch(Action::ToggleLyrics);
    }

    pub fn toggle_console(&mut self) {
        self.dispatch(Action::ToggleConsole);
    }

    pub fn toggle_arrangement(&mut self) {
        self.dispatch(Action::ToggleArrangement);
    }

    pub fn toggle_vocal_chain(&mut self) {
        self.dispatch(Action::ToggleVocalChain);
    }

    pub fn set_modal(&mut self, modal: Modal, open: bool) {
        self.dispatch(Action::SetModal { modal, open });
    }

    pub fn add_to_library(&mut self, track: LibraryTrack) {
        self.dispatch(Action::AddToLibrary { track });
    }

    pub fn remove_from_library(&mut self, title: impl Into<String>) {
        self.dispatch(Action::RemoveFromLibrary {
            title: title.into(),
        });
    }

    pub fn add_block(&mut self, kind: BlockType) {
        self.dispatch(Action::AddBlock { kind });
    }

    pub fn remove_block(&mut self, id: impl Into<String>) {
        self.dispatch(Action::RemoveBlock { id: id.into() });
    }

    pub fn resize_block(&mut self, id: impl Into<String>, width: f64) {
        self.dispatch(Action::ResizeBlock {
            id: id.into(),
            width,
        });
    }

    pub fn drag_block(&mut self, id: impl Into<String>, delta: f64) {
        self.dispatch(Action::DragBlock {
            id: id.into(),
            delta,
        });
    }

    pub fn save_arrangement(&mut self, name: impl Into<String>) {
        self.dispatch(Action::SaveArrangement { name: name.into() });
    }

    pub fn load_arrangement(&mut self, id: impl Into<String>) {
        self.dispatch(Action::LoadArrangement { id: id.into() });
    }

    pub fn delete_arrangement(&mut self, id: impl Into<String>) {
        self.dispatch(Action::DeleteArrangement { id: id.into() });
    }

    pub fn add_session_track(&mut self, kind: TrackKind) {
        self.dispatch(Action::AddSessionTrack { kind });
    }

    pub fn remove_session_track(&mut self, id: impl Into<String>) {
        self.dispatch(Action::RemoveSessionTrack { id: id.into() });
    }

    pub fn update_session_track(&mut self, id: impl Into<String>, patch: TrackPatch) {
        self.dispatch(Action::UpdateSessionTrack {
            id: id.into(),
            patch,
        });
    }

    pub fn import_audio_to_track(&mut self, id: impl Into<String>, file: AudioFile) {
        self.dispatch(Action::ImportAudioToTrack { id: id.into(), file });
    }

    pub fn set_setting(&mut self, key: SettingKey, value: SettingValue) {
        self.dispatch(Action::SetSetting { key, value });
    }

    pub fn set_input(&mut self, id: impl Into<String>) {
        self.dispatch(Action::SetInput { id: id.into() });
    }

    pub fn set_preset(&mut self, preset: VocalPreset) {
        self.dispatch(Action::SetPreset { preset });
    }

    pub fn set_lyrics(&mut self, text: impl Into<String>) {
        self.dispatch(Action::SetLyrics { text: text.into() });
    }

    pub fn append_lyric_line(&mut self, line: impl Into<String>) {
        self.dispatch(Action::AppendLyricLine { line: line.into() });
    }

    pub fn activate_buffer(&mut self) {
        self.dispatch(Action::ActivateBuffer);
    }

    pub fn dump_buffer(&mut self) {
        self.dispatch(Action::DumpBuffer);
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Slice;
    use onbeat_model::Theme;
    use onbeat_project::{FileStorage, MemoryStorage, STORAGE_KEY};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(store: &mut Store, interest: Slices) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        store.subscribe(
            interest,
            Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );
        calls
    }

    #[test]
    fn test_only_interested_subscribers_are_notified() {
        let mut store = Store::new();
        let transport = counter(&mut store, Slice::Transport.into());
        let library = counter(&mut store, Slice::Library.into());

        store.toggle_play();
        store.toggle_metronome();
        store.add_to_library(LibraryTrack::new("Song", "1:00"));

        assert_eq!(transport.load(Ordering::SeqCst), 2);
        assert_eq!(library.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_noop_dispatch_notifies_nobody() {
        let mut store = Store::new();
        let all = counter(&mut store, Slices::ALL);

        store.remove_block("missing");
        store.dump_buffer();

        assert_eq!(all.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut store = Store::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let id = store.subscribe(
            Slice::Theme.into(),
            Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );

        store.toggle_theme();
        assert!(store.unsubscribe(id));
        store.toggle_theme();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_subscriber_sees_new_state() {
        let mut store = Store::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        store.subscribe(
            Slice::Theme.into(),
            Box::new(move |state| {
                *sink.lock().expect("lock") = Some(state.theme);
            }),
        );

        store.toggle_theme();
        assert_eq!(*seen.lock().expect("lock"), Some(Theme::Light));
    }

    #[test]
    fn test_save_mutate_load_restores_blocks() {
        let mut store = Store::new();
        store.add_block(BlockType::Intro);
        store.add_block(BlockType::Chorus);
        store.save_arrangement("Take 1");
        let snapshot = store.state().arrangement.blocks().to_vec();
        let saved_id = store.state().arrangement.saved()[0].id.clone();

        let first = snapshot[0].id.clone();
        store.remove_block(first);
        store.add_block(BlockType::Outro);
        store.resize_block(snapshot[1].id.clone(), 40.0);
        store.load_arrangement(saved_id);

        assert_eq!(store.state().arrangement.blocks(), snapshot.as_slice());
    }

    #[test]
    fn test_added_tracks_have_distinct_ids_and_defaults() {
        let mut store = Store::new();
        store.add_session_track(TrackKind::Beat);
        store.add_session_track(TrackKind::Vocal);

        let tracks = store.state().session.tracks();
        let (beat, vocal) = (&tracks[2], &tracks[3]);
        assert_ne!(beat.id, vocal.id);
        for track in [beat, vocal] {
            assert_eq!((track.vol, track.pan), (75, 50));
            assert!(!track.muted && !track.solo);
        }
    }

    #[test]
    fn test_changes_are_written_to_attached_storage() {
        let storage = MemoryStorage::new();
        let mut store = Store::new();
        store.attach_storage(Box::new(storage.clone()));

        store.toggle_play();
        assert!(storage.get(STORAGE_KEY).is_none());

        store.toggle_theme();
        let raw = storage.get(STORAGE_KEY).expect("written");
        assert!(raw.contains("\"theme\": \"light\""));
        assert!(!raw.contains("isPlaying"));
    }

    #[test]
    fn test_restored_from_file_storage() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut store = Store::restored(Box::new(FileStorage::new(dir.path())));
            store.toggle_theme();
            store.add_to_library(LibraryTrack::new("Kept", "1:00"));
            store.toggle_play();
        }

        let store = Store::restored(Box::new(FileStorage::new(dir.path())));
        assert_eq!(store.state().theme, Theme::Light);
        assert_eq!(store.state().library[0].title, "Kept");
        assert!(!store.state().transport.is_playing);
    }

    #[test]
    fn test_corrupt_record_falls_back_to_defaults() {
        let storage = MemoryStorage::new();
        storage.insert(STORAGE_KEY, "{ not json");

        let mut store = Store::restored(Box::new(storage.clone()));
        assert_eq!(store.state(), &StudioState::default());

        store.add_block(BlockType::Intro);
        assert_eq!(storage.get(STORAGE_KEY).as_deref(), Some("{ not json"));
    }

    #[test]
    fn test_bad_field_keeps_rest_of_record() {
        let storage = MemoryStorage::new();
        storage.insert(
            STORAGE_KEY,
            r#"{"state":{"theme":"sepia","userLibrary":[{"title":"Keep","duration":"2:00"}]}}"#,
        );

        let mut store = Store::restored(Box::new(storage.clone()));
        assert_eq!(store.state().theme, Theme::Dark);
        assert_eq!(store.state().library.len(), 1);

        store.add_block(BlockType::Intro);
        let raw = storage.get(STORAGE_KEY).expect("written");
        assert!(raw.contains("Keep"));
        assert!(raw.contains("\"theme\": \"dark\""));
    }

    #[test]
    fn test_newer_record_is_left_untouched() {
        let storage = MemoryStorage::new();
        let newer = r#"{"state":{"userLibrary":[]},"version":9}"#;
        storage.insert(STORAGE_KEY, newer);

        let mut store = Store::restored(Box::new(storage.clone()));
        store.toggle_theme();
        assert_eq!(storage.get(STORAGE_KEY).as_deref(), Some(newer));
    }

    #[test]
    fn test_explicit_save_writes_record() {
        let storage = MemoryStorage::new();
        let mut store = Store::new();
        store.attach_storage(Box::new(storage.clone()));

        store.save().expect("save");
        assert!(storage.get(STORAGE_KEY).is_some());
        assert!(Store::new().save().is_ok());
    }
}
