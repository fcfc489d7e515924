//! The working session's channel list.

use onbeat_model::{SessionTrack, TrackKind, TrackPatch, display_title, fresh_id};

/// Ordered collection of session tracks. Ids are unique within the
/// collection; everything else is free-form.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTracks {
    tracks: Vec<SessionTrack>,
}

impl SessionTracks {
    pub fn new(tracks: Vec<SessionTrack>) -> Self {
        Self { tracks }
    }

    /// The two channels every fresh session starts with.
    pub fn seeded() -> Self {
        Self::new(vec![
            SessionTrack::new("t1", "Audio 1", TrackKind::Beat),
            SessionTrack::new("t2", "Vocals 1", TrackKind::Vocal),
        ])
    }

    pub fn tracks(&self) -> &[SessionTrack] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SessionTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Title for the next track of `kind`: the prefix followed by the number
    /// of tracks of that kind present right now, plus one. Removing and
    /// re-adding tracks can therefore repeat a title.
    ///
    /// The count is per kind, not over all tracks: with the two seeded
    /// tracks, adding a vocal must produce "Vocals 2", which a total count
    /// ("Vocals 3") would break.
    pub fn next_title(&self, kind: TrackKind) -> String {
        let count = self.tracks.iter().filter(|t| t.kind == kind).count();
        format!("{} {}", kind.title_prefix(), count + 1)
    }

    /// Append a track with default mixer values. Returns the new id.
    pub fn add(&mut self, kind: TrackKind) -> String {
        let id = loop {
            let candidate = fresh_id();
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };
        let title = self.next_title(kind);
        self.tracks.push(SessionTrack::new(id.clone(), title, kind));
        id
    }

    /// Remove the track with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != id);
        self.tracks.len() != before
    }

    /// Merge `patch` into the track with `id`. Values are stored as given;
    /// the mixer UI only ever produces 0..=100 for volume and pan.
    pub fn update(&mut self, id: &str, patch: &TrackPatch) -> bool {
        match self.tracks.iter_mut().find(|t| t.id == id) {
            Some(track) => {
                track.merge(patch);
                true
            }
            None => false,
        }
    }

    /// Point the track at a new audio source and retitle it after the file.
    pub fn import_audio(&mut self, id: &str, file_name: &str, source: &str) -> bool {
        match self.tracks.iter_mut().find(|t| t.id == id) {
            Some(track) => {
                track.file_url = Some(source.to_string());
                track.title = display_title(file_name);
                true
            }
            None => false,
        }
    }

    /// Whether any track is soloed. When true, only soloed tracks are audible.
    pub fn any_solo(&self) -> bool {
        self.tracks.iter().any(|t| t.solo)
    }

    /// Audibility of a track given the mute and solo flags of the whole set.
    pub fn is_audible(&self, id: &str) -> bool {
        let any_solo = self.any_solo();
        self.get(id)
            .map(|t| !t.muted && (!any_solo || t.solo))
            .unwrap_or(false)
    }
}

impl Default for SessionTracks {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_tracks() {
        let tracks = SessionTracks::seeded();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks.tracks()[0].title, "Audio 1");
        assert_eq!(tracks.tracks()[1].title, "Vocals 1");
        assert_eq!(tracks.tracks()[1].kind, TrackKind::Vocal);
    }

    #[test]
    fn test_add_assigns_unique_ids_and_defaults() {
        let mut tracks = SessionTracks::seeded();
        let a = tracks.add(TrackKind::Beat);
        let b = tracks.add(TrackKind::Vocal);

        assert_ne!(a, b);
        for id in [&a, &b] {
            let track = tracks.get(id).expect("added");
            assert_eq!((track.vol, track.pan, track.muted, track.solo), (75, 50, false, false));
            assert!(track.file_url.is_none());
        }
    }

    #[test]
    fn test_titles_count_tracks_of_same_kind() {
        let mut tracks = SessionTracks::seeded();
        let id = tracks.add(TrackKind::Vocal);
        assert_eq!(tracks.get(&id).expect("added").title, "Vocals 2");

        let id = tracks.add(TrackKind::Beat);
        assert_eq!(tracks.get(&id).expect("added").title, "Audio 2");
    }

    #[test]
    fn test_titles_can_repeat_after_removal() {
        let mut tracks = SessionTracks::seeded();
        let second = tracks.add(TrackKind::Beat);
        assert_eq!(tracks.get(&second).expect("added").title, "Audio 2");

        tracks.remove(&second);
        let again = tracks.add(TrackKind::Beat);
        assert_eq!(tracks.get(&again).expect("added").title, "Audio 2");
        assert_ne!(second, again);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut tracks = SessionTracks::seeded();
        let before = tracks.clone();

        assert!(!tracks.update("missing", &TrackPatch::volume(10)));
        assert!(!tracks.remove("missing"));
        assert!(!tracks.import_audio("missing", "a.wav", "file:///a.wav"));
        assert_eq!(tracks, before);
    }

    #[test]
    fn test_update_stores_values_without_clamping() {
        let mut tracks = SessionTracks::seeded();
        tracks.update("t1", &TrackPatch::volume(140));
        tracks.update("t2", &TrackPatch::pan(-20));

        assert_eq!(tracks.get("t1").expect("t1").vol, 140);
        assert_eq!(tracks.get("t2").expect("t2").pan, -20);
    }

    #[test]
    fn test_import_audio_sets_source_and_title_only() {
        let mut tracks = SessionTracks::seeded();
        tracks.update("t2", &TrackPatch::volume(30));

        assert!(tracks.import_audio("t2", "hook_take2.wav", "file:///tmp/hook_take2.wav"));

        let track = tracks.get("t2").expect("t2");
        assert_eq!(track.title, "hook_take2");
        assert_eq!(track.file_url.as_deref(), Some("file:///tmp/hook_take2.wav"));
        assert_eq!(track.vol, 30);
        assert_eq!(track.kind, TrackKind::Vocal);
    }

    #[test]
    fn test_solo_audibility() {
        let mut tracks = SessionTracks::seeded();
        assert!(tracks.is_audible("t1"));
        assert!(tracks.is_audible("t2"));

        tracks.update("t2", &TrackPatch::solo(true));
        assert!(!tracks.is_audible("t1"));
        assert!(tracks.is_audible("t2"));

        tracks.update("t2", &TrackPatch::muted(true));
        assert!(!tracks.is_audible("t2"));
        assert!(!tracks.is_audible("missing"));
    }
}
