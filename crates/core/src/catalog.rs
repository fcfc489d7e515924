//! The built-in beat catalog behind the Discover feed and the swipe deck.

use crate::state::Action;
use onbeat_model::{LibraryTrack, View};
use serde::{Deserialize, Serialize};

/// Duration given to a beat picked from the Discover feed.
pub const DISCOVER_DURATION: &str = "3:45";
/// Duration given to a beat swiped up from the deck.
pub const SWIPE_DURATION: &str = "3:00";

pub const CATEGORIES: [&str; 14] = [
    "Trending",
    "Hip Hop",
    "R&B",
    "Cinematic",
    "Lo-Fi",
    "Pop",
    "Afrobeats",
    "Trap",
    "Soul",
    "Drill",
    "House",
    "Techno",
    "Reggaeton",
    "Phonk",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBeat {
    pub id: u32,
    pub title: &'static str,
    pub artist: &'static str,
    pub bpm: &'static str,
    pub key_sig: &'static str,
    pub tags: &'static [&'static str],
}

impl CatalogBeat {
    const fn new(
        id: u32,
        title: &'static str,
        artist: &'static str,
        bpm: &'static str,
        key_sig: &'static str,
        tags: &'static [&'static str],
    ) -> Self {
        Self {
            id,
            title,
            artist,
            bpm,
            key_sig,
            tags,
        }
    }

    pub fn to_track(&self, duration: &str) -> LibraryTrack {
        LibraryTrack {
            id: Some(self.id.to_string()),
            artist: Some(self.artist.to_string()),
            bpm: Some(self.bpm.to_string()),
            key_sig: Some(self.key_sig.to_string()),
            ..LibraryTrack::new(self.title, duration)
        }
    }
}

pub const FEATURED: [CatalogBeat; 2] = [
    CatalogBeat::new(101, "Neon Horizon", "Future Bass", "128", "Am", &[]),
    CatalogBeat::new(102, "Sunset Boulevard", "Retro Wave", "110", "F", &[]),
];

pub const BEATS: [CatalogBeat; 8] = [
    CatalogBeat::new(1, "Midnight Tokyo", "Lofi Gods", "85", "Cm", &["Chill", "Night"]),
    CatalogBeat::new(2, "Drill Season", "Metro 808", "140", "Fm", &["Dark", "Hard"]),
    CatalogBeat::new(3, "Golden Hour", "Sunset Vibes", "110", "E", &["Summer", "Happy"]),
    CatalogBeat::new(4, "Cyberpunk City", "Synthwave X", "128", "Am", &["Retro", "Synth"]),
    CatalogBeat::new(5, "Deep Ocean", "Ambient Flow", "60", "G#m", &["Atmospheric"]),
    CatalogBeat::new(6, "Club Banger", "Pop Charts", "124", "Bm", &["Party", "Dance"]),
    CatalogBeat::new(7, "Soulful Keys", "Jazz Cats", "90", "C#m", &["Smooth", "Piano"]),
    CatalogBeat::new(8, "Dark Knight", "Orchestra", "70", "Dm", &["Epic", "Orchestral"]),
];

/// Actions for opening a catalog beat in the studio.
pub fn open_in_studio(beat: &CatalogBeat) -> [Action; 2] {
    [
        Action::SetActiveTrack {
            track: Some(beat.to_track(DISCOVER_DURATION)),
        },
        Action::SetView { view: View::Studio },
    ]
}

/// Preview button on a feed card: pause/resume if the beat is already the
/// active track, otherwise make it active (which starts playback).
pub fn preview(beat: &CatalogBeat, active: Option<&LibraryTrack>) -> Action {
    match active {
        Some(track) if track.title == beat.title => Action::TogglePlay,
        _ => Action::SetActiveTrack {
            track: Some(beat.to_track(DISCOVER_DURATION)),
        },
    }
}

/// The scrolling beat grid on the Discover page. Reaching the bottom loads
/// another copy of the catalog under fresh ids.
#[derive(Debug, Clone)]
pub struct DiscoverFeed {
    beats: Vec<CatalogBeat>,
    category: &'static str,
    rng: fastrand::Rng,
}

impl DiscoverFeed {
    pub fn new(rng: fastrand::Rng) -> Self {
        Self {
            beats: BEATS.to_vec(),
            category: CATEGORIES[0],
            rng,
        }
    }

    pub fn beats(&self) -> &[CatalogBeat] {
        &self.beats
    }

    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Select a category chip. Unknown names are ignored.
    pub fn set_category(&mut self, name: &str) -> bool {
        match CATEGORIES.iter().find(|c| **c == name) {
            Some(category) => {
                self.category = *category;
                true
            }
            None => false,
        }
    }

    pub fn load_more(&mut self) {
        let more: Vec<CatalogBeat> = BEATS
            .iter()
            .map(|beat| CatalogBeat {
                // Catalog ids stay below 1000; keep copies clear of them.
                id: self.rng.u32(1000..),
                ..beat.clone()
            })
            .collect();
        self.beats.extend(more);
    }
}

impl Default for DiscoverFeed {
    fn default() -> Self {
        Self::new(fastrand::Rng::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
}

/// A one-at-a-time deck of beats: left or right moves on, up loads the
/// current beat into the studio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeDeck {
    cards: Vec<CatalogBeat>,
    index: usize,
}

impl SwipeDeck {
    pub fn new(cards: Vec<CatalogBeat>) -> Self {
        Self { cards, index: 0 }
    }

    pub fn current(&self) -> Option<&CatalogBeat> {
        self.cards.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.cards.len()
    }

    /// Apply a swipe. Returns the actions to dispatch; empty for left/right
    /// and for any swipe on an exhausted deck.
    pub fn swipe(&mut self, direction: SwipeDirection) -> Vec<Action> {
        let Some(beat) = self.current() else {
            return Vec::new();
        };
        match direction {
            SwipeDirection::Up => vec![
                Action::SetActiveTrack {
                    track: Some(LibraryTrack::new(beat.title, SWIPE_DURATION)),
                },
                Action::SetView { view: View::Studio },
            ],
            SwipeDirection::Left | SwipeDirection::Right => {
                self.index += 1;
                Vec::new()
            }
        }
    }

    /// "Start Over".
    pub fn restart(&mut self) {
        self.index = 0;
    }
}

impl Default for SwipeDeck {
    fn default() -> Self {
        let picks = [1, 2, 3, 5];
        Self::new(
            BEATS
                .iter()
                .filter(|b| picks.contains(&b.id))
                .cloned()
                .collect(),
        )
    }
}
