//! The user's library of finished tracks.

use onbeat_model::{LibraryTrack, display_title};
use serde::{Deserialize, Serialize};

/// Artist tag carried by tracks produced by the generator.
pub const GENERATED_ARTIST: &str = "OnBeat AI";
/// Duration shown for uploads whose length could not be determined.
pub const FALLBACK_UPLOAD_DURATION: &str = "2:30";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryFilter {
    #[default]
    All,
    Beats,
    Vocals,
}

impl LibraryFilter {
    pub fn matches(&self, track: &LibraryTrack) -> bool {
        let generated = track.artist.as_deref() == Some(GENERATED_ARTIST);
        match self {
            LibraryFilter::All => true,
            LibraryFilter::Beats => generated,
            LibraryFilter::Vocals => !generated,
        }
    }
}

/// Newest first.
pub fn add(library: &mut Vec<LibraryTrack>, track: LibraryTrack) {
    library.insert(0, track);
}

/// Remove every track titled `title`. Titles are not unique, so one call
/// can remove several entries.
pub fn remove_by_title(library: &mut Vec<LibraryTrack>, title: &str) -> bool {
    let before = library.len();
    library.retain(|t| t.title != title);
    library.len() != before
}

pub fn filtered<'a>(
    library: &'a [LibraryTrack],
    filter: LibraryFilter,
) -> impl Iterator<Item = &'a LibraryTrack> + 'a {
    library.iter().filter(move |t| filter.matches(t))
}

/// Library entry for a file the user uploaded.
pub fn upload(file_name: &str, source: &str, duration: Option<String>) -> LibraryTrack {
    LibraryTrack {
        title: display_title(file_name),
        date: Some("Just now".to_string()),
        bpm: Some("120".to_string()),
        key_sig: Some("Cm".to_string()),
        duration: duration.unwrap_or_else(|| FALLBACK_UPLOAD_DURATION.to_string()),
        artist: Some("User Upload".to_string()),
        file_url: Some(source.to_string()),
        ..Default::default()
    }
}
